#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use db::store::MemoryStore;
use db::test_utils::setup_test_db;
use serde_json::{Value, json};
use services::anomaly_service::AnomalyService;
use services::auth::DbAuthProvider;
use services::router::Page;
use services::ui::{UiEffect, UiSink};
use services::AttendanceApp;
use tokio::sync::mpsc::UnboundedReceiver;

/// Request bodies received by a fake anomaly service.
pub type Captured = Arc<Mutex<Vec<Value>>>;

#[derive(Clone)]
struct FakeService {
    status: StatusCode,
    answer: Value,
    delay: Duration,
    seen: Captured,
}

async fn detect(State(fake): State<FakeService>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    fake.seen.lock().unwrap().push(body);
    tokio::time::sleep(fake.delay).await;
    (fake.status, Json(fake.answer.clone()))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "timestamp": "2025-10-17T09:30:00"}))
}

/// Starts an anomaly service on a random local port that answers every
/// detection request with `status` and `answer`.
pub async fn spawn_anomaly_service(status: StatusCode, answer: Value) -> (String, Captured) {
    spawn_fake(status, answer, Duration::ZERO).await
}

/// Like [`spawn_anomaly_service`], but every detection answer is held back
/// for `delay`.
pub async fn spawn_slow_anomaly_service(delay: Duration, answer: Value) -> (String, Captured) {
    spawn_fake(StatusCode::OK, answer, delay).await
}

async fn spawn_fake(status: StatusCode, answer: Value, delay: Duration) -> (String, Captured) {
    let seen: Captured = Arc::default();
    let app = Router::new()
        .route("/detect-anomalies", post(detect))
        .route("/health", get(health))
        .with_state(FakeService {
            status,
            answer,
            delay,
            seen: seen.clone(),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

/// A base URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn sample_answer() -> Value {
    json!({
        "message": "Analysis complete",
        "total_records": 4,
        "anomaly_count": 1,
        "anomaly_rate": "25.00%",
        "results": [
            {
                "record": {"studentId": "u1", "studentName": "ali", "lecture": "CS101",
                           "timestamp": "2025-10-17T09:30:00.000Z", "sessionId": "S1"},
                "anomaly": {"is_anomaly": false, "anomaly_type": "normal",
                            "anomaly_score": 0.1, "severity": "low", "reason": "normal"}
            },
            {
                "record": {"studentId": "u2", "studentName": "veli", "lecture": "CS101",
                           "timestamp": "2025-10-17T23:10:00.000Z", "sessionId": "S1"},
                "anomaly": {"is_anomaly": true, "anomaly_type": "time_anomaly",
                            "anomaly_score": 0.8, "severity": "high",
                            "reason": "Attendance outside class hours"}
            }
        ]
    })
}

pub struct TestApp {
    pub app: AttendanceApp,
    pub auth: Arc<DbAuthProvider>,
    pub store: Arc<MemoryStore>,
    pub effects: UnboundedReceiver<UiEffect>,
}

impl TestApp {
    pub async fn new(anomaly_url: &str) -> Self {
        let auth = Arc::new(DbAuthProvider::new(setup_test_db().await));
        let store = Arc::new(MemoryStore::new());
        let (ui, effects) = UiSink::channel();
        let app = AttendanceApp::new(
            auth.clone(),
            store.clone(),
            AnomalyService::new(anomaly_url, 100),
            ui,
            Page::Entry,
        );
        Self {
            app,
            auth,
            store,
            effects,
        }
    }

    pub fn drain(&mut self) -> Vec<UiEffect> {
        let mut out = Vec::new();
        while let Ok(effect) = self.effects.try_recv() {
            out.push(effect);
        }
        out
    }
}
