use clap::Parser;
use ret::shortcut::{create_shortcut, DesktopEntry, ShortcutLocation, ShortcutTargets};
use ret::utils::logger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "create_retplay_shortcut")]
#[command(about = "Add a RetPlay launcher to the application menu and/or desktop")]
struct Args {
    /// Where to put the shortcut
    #[arg(long, value_enum, default_value = "both")]
    location: ShortcutLocation,

    /// retplay executable; defaults to the one next to this program
    #[arg(long)]
    retplay: Option<PathBuf>,

    /// Playback source the shortcut always opens
    #[arg(long)]
    playback: Option<String>,

    /// Icon file for the shortcut
    #[arg(long)]
    icon: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let retplay = match args.retplay {
        Some(path) => path,
        None => std::env::current_exe()?.with_file_name("retplay"),
    };
    let entry = DesktopEntry::retplay(&retplay, args.playback.as_deref(), args.icon.as_deref());

    let result = ShortcutTargets::for_current_user().and_then(|targets| create_shortcut(&entry, args.location, &targets));
    match result {
        Ok(paths) => {
            for path in paths {
                println!("✅ Shortcut created: {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
