use anyhow::Result;
use httpmock::prelude::*;
use ret::core::agents::{AgentOptions, RetAgent};
use ret::core::model::ModelOptions;
use ret::domain::Affiliation;
use ret::playback::{JsonResults, PlaybackWriterKind};
use ret::retplay::{start_server, AppState, PlaybackSource, RemotePlayback};
use ret::testing::MockModel2d;
use std::sync::Arc;

/// Three recorded steps of a two-agent run.
fn recorded_run() -> JsonResults {
    let mut model = MockModel2d::with_options(ModelOptions {
        playback_writer: Some(PlaybackWriterKind::JsonWriter),
        random_state: Some(0),
        ..Default::default()
    });
    RetAgent::new(&mut model, (100.0, 100.0), "Blue 1", Affiliation::Friendly, AgentOptions::default()).unwrap();
    RetAgent::new(&mut model, (900.0, 900.0), "Red 1", Affiliation::Hostile, AgentOptions::default()).unwrap();
    for _ in 0..3 {
        model.step().unwrap();
    }
    model.playback_writer.unwrap().json_results
}

#[tokio::test]
async fn test_remote_playback_fetch() {
    let server = MockServer::start();
    let results = recorded_run();
    let body = results.json().unwrap();

    let playback_mock = server.mock(|when, then| {
        when.method(GET).path("/runs/latest/playback.json");
        then.status(200)
            .header("content-type", "application/json")
            .body(body.clone());
    });

    let url = url::Url::parse(&server.url("/runs/latest/playback.json")).unwrap();
    let source = RemotePlayback::new(url);
    let loaded = source.load().await.unwrap();

    playback_mock.assert();
    assert_eq!(loaded, results);
    assert!(source.describe().ends_with("/runs/latest/playback.json"));
}

#[tokio::test]
async fn test_remote_playback_http_error() {
    let server = MockServer::start();
    let missing_mock = server.mock(|when, then| {
        when.method(GET).path("/missing.json");
        then.status(404).body("not found");
    });

    let url = url::Url::parse(&server.url("/missing.json")).unwrap();
    let result = RemotePlayback::new(url).load().await;

    missing_mock.assert();
    let err = result.unwrap_err();
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_server_routes() -> Result<()> {
    let results = recorded_run();
    let state = Arc::new(AppState::new(results.clone(), "Engagement")?);
    let addr = start_server(state, None, "127.0.0.1", 0).await?;
    let base = format!("http://{}", addr);
    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(health["status"], "ok");

    let page = client.get(&base).send().await?.text().await?;
    assert!(page.contains("RetPlay"));
    assert!(page.contains("Engagement"));

    let playback = client
        .get(format!("{}/api/playback", base))
        .send()
        .await?
        .text()
        .await?;
    assert_eq!(JsonResults::from_json(&playback)?, results);

    let summary: serde_json::Value = client
        .get(format!("{}/api/summary", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(summary["steps"], 3);
    assert_eq!(summary["agents"], 2);

    let step = client.get(format!("{}/api/steps/2", base)).send().await?;
    assert_eq!(step.status(), reqwest::StatusCode::OK);
    let step: serde_json::Value = step.json().await?;
    assert_eq!(step["step_number"], 2);

    let missing = client.get(format!("{}/api/steps/99", base)).send().await?;
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    let error: serde_json::Value = missing.json().await?;
    assert_eq!(error["error"], "Step 99 not found");

    Ok(())
}

#[tokio::test]
async fn test_server_rejects_bad_host() {
    let state = Arc::new(AppState::new(JsonResults::default(), "Empty").unwrap());
    assert!(start_server(state, None, "not a host", 0).await.is_err());
}
