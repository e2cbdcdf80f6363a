use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chat_engine::{
    Answer, AskError, EngineConfig, EngineEvent, EngineHandle, HealthReport, KeyValueStore,
    MemoryKeyValueStore, QaClient, SESSION_KEY,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingClient {
    asked: Mutex<Vec<(String, String)>>,
    health_calls: Mutex<usize>,
}

#[async_trait::async_trait]
impl QaClient for RecordingClient {
    async fn ask(&self, query: &str, session_id: &str) -> Result<Answer, AskError> {
        self.asked
            .lock()
            .unwrap()
            .push((query.to_string(), session_id.to_string()));
        if query == "fail" {
            return Err(AskError::HttpStatus(500));
        }
        Ok(Answer {
            answer: format!("echo: {query}"),
            sources: Vec::new(),
        })
    }

    async fn health(&self) -> HealthReport {
        *self.health_calls.lock().unwrap() += 1;
        HealthReport::Running
    }
}

fn next_ask(engine: &EngineHandle) -> Result<Answer, AskError> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(EngineEvent::AskCompleted(result)) =
            engine.recv_timeout(Duration::from_millis(50))
        {
            return result;
        }
    }
    panic!("no ask completion within deadline");
}

#[test]
fn ask_uses_one_session_id_for_all_requests() {
    let client = Arc::new(RecordingClient::default());
    let mut store = MemoryKeyValueStore::new();
    store.set(SESSION_KEY, "stored-session").unwrap();
    let engine = EngineHandle::with_client(
        client.clone(),
        Duration::from_secs(3600),
        Box::new(store),
    )
    .unwrap();

    engine.ask("first");
    assert_eq!(next_ask(&engine).unwrap().answer, "echo: first");
    engine.ask("fail");
    assert_eq!(next_ask(&engine).unwrap_err(), AskError::HttpStatus(500));

    let asked = client.asked.lock().unwrap().clone();
    assert_eq!(
        asked,
        vec![
            ("first".to_string(), "stored-session".to_string()),
            ("fail".to_string(), "stored-session".to_string()),
        ]
    );
}

#[test]
fn health_is_polled_immediately_and_on_interval() {
    let client = Arc::new(RecordingClient::default());
    let engine = EngineHandle::with_client(
        client.clone(),
        Duration::from_millis(40),
        Box::new(MemoryKeyValueStore::new()),
    )
    .unwrap();

    let mut reports = 0;
    let deadline = Instant::now() + Duration::from_secs(5);
    while reports < 3 && Instant::now() < deadline {
        if let Some(EngineEvent::Health(report)) = engine.recv_timeout(Duration::from_millis(50)) {
            assert_eq!(report, HealthReport::Running);
            reports += 1;
        }
    }
    assert_eq!(reports, 3);

    engine.shutdown();
    std::thread::sleep(Duration::from_millis(100));
    let calls_after_shutdown = *client.health_calls.lock().unwrap();
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(*client.health_calls.lock().unwrap(), calls_after_shutdown);
}

#[test]
fn engine_talks_to_real_endpoints() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "answer": "Hi", "source": ["doc1"] })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
            .mount(&server)
            .await;
        server
    });

    let engine = EngineHandle::new(EngineConfig {
        client: chat_engine::ClientSettings::new(server.uri()),
        health_interval: Duration::from_secs(3600),
        store: Box::new(MemoryKeyValueStore::new()),
    })
    .unwrap();

    engine.ask("Hello");
    let answer = next_ask(&engine).unwrap();
    assert_eq!(answer.sources, vec!["doc1".to_string()]);
    drop(engine);
    drop(server);
}
