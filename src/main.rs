use clap::Parser;
use ret::config::schema::RetModelSchema;
use ret::domain::ports::Storage;
use ret::utils::error::RetError;
use ret::utils::{logger, validation::Validate};
use ret::{builtin_registry, BatchRunner, CliConfig, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting RET batch runner");
    tracing::info!("📁 Loading model file from: {}", args.model_file.display());

    if let Err(e) = args.validate() {
        fail(&e);
    }

    // 載入模型檔
    let mut schema = match RetModelSchema::from_file(&args.model_file) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("❌ Failed to load model file '{}': {}", args.model_file.display(), e);
            eprintln!("💡 Make sure the file exists and is valid TOML or JSON");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    args.apply_overrides(&mut schema);

    if let Err(e) = schema.validate() {
        tracing::error!("❌ Model file validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        fail(&e);
    }

    let registry = builtin_registry();
    let definition = match registry.get(&schema.model_name) {
        Ok(definition) => definition,
        Err(e) => fail(&e),
    };

    tracing::info!("✅ Model file loaded and validated successfully");
    display_config_summary(&schema, &args);

    let output_dir = args.output_dir();
    let runner = BatchRunner::new(LocalStorage::new(&output_dir), definition, schema)
        .with_jobs(args.jobs)
        .with_archive(args.archive)
        .with_monitoring(args.monitor);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No models will be run");
        perform_dry_run(&runner)?;
        return Ok(());
    }

    if args.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match runner.run().await {
        Ok(summary) => {
            println!("✅ Batch completed successfully!");
            println!(
                "📊 {} experiments, {} runs, {} steps",
                summary.experiments, summary.runs, summary.total_steps
            );
            println!("📁 Output saved to: {}", summary.output_path.display());
            if let Some(archive) = summary.archive {
                println!("🗜️ Archive: {}", archive.display());
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Batch failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            fail(&e);
        }
    }

    Ok(())
}

fn fail(e: &RetError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    std::process::exit(e.exit_code())
}

fn display_config_summary(schema: &RetModelSchema, args: &CliConfig) {
    println!("📋 Batch Summary:");
    println!("  Model: {}", schema.model_name);
    println!("  Time: {} to {} every {}s", schema.time.start_time, schema.time.end_time, schema.time.time_step.num_seconds());
    println!("  Experiments: {} x {} iterations", schema.n_experiments, schema.iterations);
    println!("  Max Steps: {}", schema.max_steps);
    println!("  Playback: {}", schema.playback_writer);
    println!("  Jobs: {}", args.jobs);
    if let Some(seed) = schema.random_state {
        println!("  Random State: {}", seed);
    }
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

fn perform_dry_run(runner: &BatchRunner<LocalStorage>) -> Result<(), Box<dyn std::error::Error>> {
    let (fixed, samples) = runner.plan()?;

    println!("🔍 Dry Run Analysis:");
    println!();
    println!("🗺️ Space: x [{}, {}], y [{}, {}], {}d", fixed.space.x_min, fixed.space.x_max, fixed.space.y_min, fixed.space.y_max, fixed.space.dimensions);

    if !fixed.scenario.is_empty() {
        println!();
        println!("⚙️ Scenario Parameters:");
        for (name, value) in &fixed.scenario {
            println!("  {}: {}", name, value);
        }
    }

    println!();
    println!("🧪 Experiments:");
    for (index, sample) in samples.iter().enumerate() {
        let values: Vec<String> = sample.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        println!("  #{}: {}", index, if values.is_empty() { "(no variable parameters)".to_string() } else { values.join(", ") });
    }

    let sampled = samples.first().map(|s| s.len()).unwrap_or_default();
    println!();
    println!("💾 Output: {}", runner.storage().root().display());
    println!("  {} variable parameters sampled", sampled);
    Ok(())
}
