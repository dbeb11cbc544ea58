use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;

use super::{DocumentStore, StoreError, ensure_path};

/// Document store speaking the realtime-database REST dialect:
/// `GET`/`PUT {base}/{path}.json`, and `POST` for appends, which answers
/// `{"name": "<generated key>"}`.
#[derive(Clone)]
pub struct RestStore {
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path)
    }

    fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(StoreError::Status(status.as_u16()))
        }
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        ensure_path(path)?;
        let response = Self::check(self.client.get(self.url(path)).send().await?)?;
        let value: Value = response.json().await?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        ensure_path(path)?;
        Self::check(self.client.put(self.url(path)).json(&value).send().await?)?;
        Ok(())
    }

    async fn push(&self, parent: &str, value: Value) -> Result<String, StoreError> {
        ensure_path(parent)?;
        let response = Self::check(self.client.post(self.url(parent)).json(&value).send().await?)?;
        let body: PushResponse = response.json().await?;
        Ok(body.name)
    }

    async fn children(&self, parent: &str) -> Result<Vec<(String, Value)>, StoreError> {
        match self.get(parent).await? {
            Some(Value::Object(map)) => {
                let mut entries: Vec<(String, Value)> = map.into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                Ok(entries)
            }
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::get,
    };
    use serde_json::{Map, json};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    type Docs = Arc<Mutex<BTreeMap<String, Value>>>;

    fn doc_path(raw: &str) -> String {
        raw.trim_end_matches(".json").to_owned()
    }

    async fn read(State(docs): State<Docs>, Path(raw): Path<String>) -> Json<Value> {
        let path = doc_path(&raw);
        let docs = docs.lock().unwrap();
        if let Some(v) = docs.get(&path) {
            return Json(v.clone());
        }
        let prefix = format!("{path}/");
        let children: Map<String, Value> = docs
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(&prefix).map(|key| (key.to_owned(), v.clone())))
            .collect();
        if children.is_empty() {
            Json(Value::Null)
        } else {
            Json(Value::Object(children))
        }
    }

    async fn write(
        State(docs): State<Docs>,
        Path(raw): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        docs.lock().unwrap().insert(doc_path(&raw), body.clone());
        Json(body)
    }

    async fn append(
        State(docs): State<Docs>,
        Path(raw): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let mut docs = docs.lock().unwrap();
        let key = format!("k{}", docs.len());
        docs.insert(format!("{}/{}", doc_path(&raw), key), body);
        Json(json!({ "name": key }))
    }

    async fn spawn_fake_rtdb() -> String {
        let docs: Docs = Arc::default();
        let app = Router::new()
            .route("/{*path}", get(read).put(write).post(append))
            .with_state(docs);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn round_trips_documents_over_http() {
        let store = RestStore::new(format!("{}/", spawn_fake_rtdb().await));

        assert_eq!(store.get("users/u1").await.unwrap(), None);
        store
            .set("users/u1", json!({"role": "teacher"}))
            .await
            .unwrap();
        assert_eq!(
            store.get("users/u1").await.unwrap(),
            Some(json!({"role": "teacher"}))
        );
    }

    #[tokio::test]
    async fn push_returns_server_generated_name_and_children_lists_it() {
        let store = RestStore::new(spawn_fake_rtdb().await);

        let key = store
            .push("test-yoklamalar", json!({"message": "hi"}))
            .await
            .unwrap();
        assert_eq!(key, "k0");

        let children = store.children("test-yoklamalar").await.unwrap();
        assert_eq!(children, vec![("k0".to_string(), json!({"message": "hi"}))]);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let app = Router::new().route(
            "/{*path}",
            get(|| async { (StatusCode::UNAUTHORIZED, "Permission denied") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let store = RestStore::new(format!("http://{addr}"));
        let err = store.get("users/u1").await.unwrap_err();
        assert!(matches!(err, StoreError::Status(401)));
    }
}
