use profile_guard::domain::{Level, LogEvent, Package, Stack};
use profile_guard::reporter::{LogReporter, ReporterConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reporter(collector_url: String) -> LogReporter {
    LogReporter::new(ReporterConfig {
        collector_url,
        timeout: Some(Duration::from_secs(5)),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_every_tag_combination_round_trips() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/log"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let reporter = reporter(mock_server.uri());
    let mut sent = Vec::new();

    for stack in Stack::ALL {
        for level in Level::ALL {
            for package in Package::ALL {
                let message = format!("{stack}/{level}/{package} \"quoted\" ünïcode\n");
                let reply = reporter.report(*stack, *level, *package, message.clone()).await;
                assert_eq!(reply, Some(json!({"ok": true})));
                sent.push(LogEvent::new(*stack, *level, *package, message));
            }
        }
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), sent.len());

    for (request, expected) in requests.iter().zip(&sent) {
        let received: LogEvent = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(&received, expected);
        assert_eq!(
            request.headers.get("content-type").unwrap(),
            "application/json"
        );
    }
}

#[tokio::test]
async fn test_connection_refused_returns_none() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let reporter = reporter(format!("http://{addr}"));
    let reply = reporter
        .report(Stack::Frontend, Level::Error, Package::Api, "nobody home")
        .await;

    assert!(reply.is_none());
    let stats = reporter.stats();
    assert_eq!(stats.attempted, 1);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_collector_error_returns_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/log"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reporter = reporter(mock_server.uri());
    let reply = reporter
        .report(Stack::Backend, Level::Fatal, Package::Db, "primary lost")
        .await;

    assert!(reply.is_none());
}

#[tokio::test]
async fn test_request_timeout_is_contained() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/log"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let reporter = LogReporter::new(ReporterConfig {
        collector_url: mock_server.uri(),
        timeout: Some(Duration::from_millis(100)),
        ..Default::default()
    })
    .unwrap();

    let reply = reporter
        .report(Stack::Frontend, Level::Warn, Package::Hook, "slow collector")
        .await;

    assert!(reply.is_none());
    assert_eq!(reporter.stats().failed, 1);
}

#[tokio::test]
async fn test_detached_reports_complete_without_join() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/log"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(10)
        .mount(&mock_server)
        .await;

    let reporter = reporter(mock_server.uri());
    for i in 0..10 {
        // Handles dropped on purpose.
        let _ = reporter.dispatch(LogEvent::frontend(
            Level::Debug,
            Package::State,
            format!("state change {i}"),
        ));
    }

    assert!(reporter.shutdown(Duration::from_secs(5)).await);
    assert_eq!(reporter.stats().delivered, 10);
}
