//! The HTTP/JSON surface over a [`Container`], built with `axum`.
//!
//! `{"result": 0}` means success, `{"result": 1}` means failure, matching
//! the wire contract of the line protocol's `Success`/`Failure` tokens.

use crate::container::Container;
use axum::extract::{Form, Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct InsertForm {
    name: String,
    value: String,
    expire: String,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    result: u8,
    queries: u64,
    memories: u64,
    bulk_count: usize,
}

#[derive(Debug, Serialize)]
struct BulkStatusResponse {
    result: u8,
    len: usize,
    bytes: usize,
    queries: u64,
    memories: u64,
}

async fn get_bulk(State(container): State<Arc<Container>>, Path(id): Path<String>) -> Json<Value> {
    let (items, present) = container.get(&id);
    if !present {
        log::warn!("HTTP GET /bulk/{id}: bulk not found");
        return Json(json!({"result": 1}));
    }
    let strings: Vec<String> = items
        .iter()
        .map(|(_, item)| String::from_utf8_lossy(&item.payload).into_owned())
        .collect();
    Json(json!({"result": 0, "items": strings}))
}

async fn post_bulk(
    State(container): State<Arc<Container>>,
    Path(id): Path<String>,
    Form(form): Form<InsertForm>,
) -> Json<Value> {
    let Ok(expire_secs) = form.expire.parse::<u64>() else {
        log::warn!("HTTP POST /bulk/{id}: invalid expire {:?}", form.expire);
        return Json(json!({"result": 1}));
    };
    match container.add(&id, form.name.as_bytes(), form.value.into_bytes(), Duration::from_secs(expire_secs))
    {
        Ok(()) => Json(json!({"result": 0})),
        Err(e) => {
            log::error!("HTTP POST /bulk/{id} failed: {e}");
            Json(json!({"result": 1}))
        }
    }
}

async fn delete_bulk(State(container): State<Arc<Container>>, Path(id): Path<String>) -> Json<Value> {
    container.remove(&id);
    Json(json!({"result": 0}))
}

async fn status_root(State(container): State<Arc<Container>>) -> Json<StatusResponse> {
    let snapshot = container.analytics().snapshot();
    Json(StatusResponse {
        result: 0,
        queries: snapshot.queries,
        memories: snapshot.memories,
        bulk_count: container.bulk_names().len(),
    })
}

async fn status_bulk(State(container): State<Arc<Container>>, Path(id): Path<String>) -> Json<Value> {
    match container.get_bulk(&id) {
        Some(bulk) => {
            let snapshot = bulk.analytics().snapshot();
            Json(serde_json::to_value(BulkStatusResponse {
                result: 0,
                len: bulk.len(),
                bytes: bulk.bytes(),
                queries: snapshot.queries,
                memories: snapshot.memories,
            })
            .unwrap_or_else(|_| json!({"result": 1})))
        }
        None => {
            log::warn!("HTTP GET /status/{id}: bulk not found");
            Json(json!({"result": 1}))
        }
    }
}

/// Builds the router without binding a socket, so tests can drive it with
/// `tower::ServiceExt::oneshot`.
#[must_use]
pub fn router(container: Arc<Container>) -> Router {
    Router::new()
        .route("/bulk/:id", get(get_bulk).post(post_bulk).delete(delete_bulk))
        .route("/status/", get(status_root))
        .route("/status/:id", get(status_bulk))
        .with_state(container)
}

/// Binds a TCP listener on `port` and serves the HTTP surface until the
/// process exits.
///
/// # Errors
/// Returns an error if the listener cannot be bound.
pub async fn serve(container: Arc<Container>, port: u16) -> std::io::Result<()> {
    let app = router(container);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    log::info!("HTTP listening on :{port}");
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::EngineKind;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn get_on_missing_bulk_reports_failure() {
        let container = Container::new("http-t1", EngineKind::Ordered);
        let app = router(container.clone());
        let resp = app
            .oneshot(Request::builder().uri("/bulk/absent").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["result"], 1);
        container.shutdown();
    }

    #[tokio::test]
    async fn post_then_get_round_trips() {
        let container = Container::new("http-t2", EngineKind::Ordered);
        let app = router(container.clone());
        let body = "name=k&value=hello&expire=5";
        let post = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/bulk/b")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(post).await["result"], 0);

        let get = app
            .oneshot(Request::builder().uri("/bulk/b").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(get).await;
        assert_eq!(json["result"], 0);
        assert_eq!(json["items"][0], "hello");
        container.shutdown();
    }

    #[tokio::test]
    async fn delete_drops_bulk() {
        let container = Container::new("http-t3", EngineKind::Ordered);
        container.add("b", b"", b"v".to_vec(), Duration::from_secs(5)).unwrap();
        let app = router(container.clone());
        let resp = app
            .oneshot(
                Request::builder().method("DELETE").uri("/bulk/b").body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["result"], 0);
        assert!(!container.has("b"));
        container.shutdown();
    }

    #[tokio::test]
    async fn status_root_reports_counters() {
        let container = Container::new("http-t4", EngineKind::Ordered);
        container.add("b", b"", b"hello".to_vec(), Duration::from_secs(5)).unwrap();
        let app = router(container.clone());
        let resp = app
            .oneshot(Request::builder().uri("/status/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["result"], 0);
        assert_eq!(json["memories"], 5);
        container.shutdown();
    }
}
