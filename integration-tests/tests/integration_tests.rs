// End-to-end tests: configuration document -> scheduler engine -> real
// HTTP poll executor -> mock monitor service.
//
// These run against real time with short intervals, so assertions are on
// lower bounds and post-stop stability rather than exact tick counts.

use anyhow::Result;
use common::executor::{HttpPollExecutor, PollExecutor};
use common::monitors;
use common::scheduler::{SchedulerConfig, SchedulerEngine};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn monitor_document(server: &MockServer, collection: &str, interval_ms: u64) -> String {
    json!({
        "connection_config": {
            "app_base_url": server.address().to_string(),
            "monitor_path": "api/v1"
        },
        "monitor_configs": [
            {
                "collection": collection,
                "contract_address": "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d",
                "event_type": "created",
                "interval_ms": interval_ms,
                "events_limit_each_call": 50,
                "max_events_to_gather": 500,
                "discord_webhook_tokens": ["token-a"],
                "enabled": true
            }
        ]
    })
    .to_string()
}

async fn start_engine(
    raw_document: &str,
) -> Result<(Arc<SchedulerEngine>, usize)> {
    let (connection, monitor_configs) = monitors::load(raw_document)?;

    let executor: Arc<dyn PollExecutor> = Arc::new(HttpPollExecutor::new(5)?);
    let engine = Arc::new(SchedulerEngine::new(
        SchedulerConfig {
            shutdown_grace_seconds: 1,
        },
        executor,
    ));

    let job_count = engine.start(connection, monitor_configs).await?;
    Ok((engine, job_count))
}

#[tokio::test]
async fn test_bored_apes_scenario_reaches_the_monitor_service() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/retrieve_events"))
        .and(body_json(json!({
            "contract_address": "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d",
            "event_type": "created",
            "limit": 50,
            "max_events_to_gather": 500,
            "discord_web_tokens": ["token-a"]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(2..)
        .mount(&server)
        .await;

    let document = monitor_document(&server, "bored-apes", 100);
    let (engine, job_count) = start_engine(&document).await?;
    assert_eq!(job_count, 1);
    assert_eq!(engine.job_names().await, vec!["monitor_bored-apes".to_string()]);

    // A handful of 100ms ticks
    tokio::time::sleep(Duration::from_millis(650)).await;
    engine.stop().await;

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_failing_service_does_not_kill_the_job() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/retrieve_events"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let document = monitor_document(&server, "bored-apes", 100);
    let (engine, _) = start_engine(&document).await?;

    tokio::time::sleep(Duration::from_millis(650)).await;
    engine.stop().await;

    // Every failed tick still polled the service again
    let received = server.received_requests().await.unwrap();
    assert!(
        received.len() >= 3,
        "expected the timer to survive failures, saw {} calls",
        received.len()
    );
    Ok(())
}

#[tokio::test]
async fn test_stop_halts_all_outbound_calls() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/retrieve_events"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let document = monitor_document(&server, "bored-apes", 100);
    let (engine, _) = start_engine(&document).await?;

    tokio::time::sleep(Duration::from_millis(350)).await;
    engine.stop().await;
    assert!(engine.job_names().await.is_empty());

    let calls_at_stop = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(500)).await;
    let calls_after = server.received_requests().await.unwrap().len();

    assert_eq!(calls_after, calls_at_stop);
    Ok(())
}
