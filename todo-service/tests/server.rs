//! End-to-end check over a real socket.
//!
//! # Design
//! Builds the full `Application` (config, store connect, schema, bind) on a
//! random port in a background runtime, then drives it with ureq like any
//! external client would.

use secrecy::Secret;
use serde_json::Value;
use todo_service::config::{Config, DatabaseConfig};
use todo_service::Application;

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Returns the status and the body parsed as JSON (or `Null` if empty).
fn call(agent: &ureq::Agent, method: &str, url: &str, body: Option<&str>) -> (u16, Value) {
    let mut response = match (method, body) {
        ("GET", _) => agent.get(url).call(),
        ("DELETE", _) => agent.delete(url).call(),
        ("POST", Some(body)) => agent
            .post(url)
            .content_type("application/json")
            .send(body.as_bytes()),
        ("PUT", Some(body)) => agent
            .put(url)
            .content_type("application/json")
            .send(body.as_bytes()),
        other => panic!("unsupported request {other:?}"),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string().unwrap_or_default();
    let json = serde_json::from_str(&text).unwrap_or(Value::Null);
    (status, json)
}

fn spawn_app() -> String {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        log_level: "debug".to_string(),
        database: DatabaseConfig {
            url: Secret::new("sqlite::memory:".to_string()),
            max_connections: 1,
        },
    };

    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let app = Application::build(config).await.unwrap();
            tx.send(app.port()).unwrap();
            app.run_until_stopped().await
        })
        .unwrap();
    });

    let port = rx.recv().expect("application failed to start");
    format!("http://127.0.0.1:{port}")
}

#[test]
fn concrete_scenario_over_http() {
    let base = spawn_app();
    let agent = agent();

    let (status, created) = call(
        &agent,
        "POST",
        &format!("{base}/todos"),
        Some(r#"{"action":"write spec"}"#),
    );
    assert_eq!(status, 200);
    assert_eq!(created["id"], 1);
    assert_eq!(created["action"], "write spec");
    assert_eq!(created["completed"], false);

    let (status, fetched) = call(&agent, "GET", &format!("{base}/todos/1"), None);
    assert_eq!(status, 200);
    assert_eq!(fetched, created);

    let (status, deleted) = call(&agent, "DELETE", &format!("{base}/todos/1"), None);
    assert_eq!(status, 200);
    assert_eq!(deleted, created);

    let (status, _) = call(&agent, "GET", &format!("{base}/todos/1"), None);
    assert_eq!(status, 404);

    let (status, body) = call(&agent, "POST", &format!("{base}/todos"), Some("nope"));
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Bad request");

    let (status, todos) = call(&agent, "GET", &format!("{base}/todos"), None);
    assert_eq!(status, 200);
    assert_eq!(todos, Value::Array(Vec::new()));
}
