//! Patient API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Layers (outermost → innermost):
//! 1. Access log → 2. CORS → handlers

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the patient API router.
///
/// `allowed_origins` are exact origins (scheme + host + port). Entries that
/// are not valid header values are skipped with a warning.
pub fn patient_api_router(ctx: ApiContext, allowed_origins: &[String]) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    // The static reset route takes priority over `:id`.
    Router::new()
        .route("/", get(endpoints::health::check))
        .route("/api/patients", get(endpoints::patients::list))
        .route(
            "/api/patients/reset-run-status",
            post(endpoints::patients::reset_run_status),
        )
        .route(
            "/api/patients/:id",
            get(endpoints::patients::detail).patch(endpoints::patients::update),
        )
        .with_state(ctx)
        .layer(cors_layer(allowed_origins))
        .layer(axum::middleware::from_fn(middleware::access::log_access))
}

/// Credentials are allowed, so methods and headers mirror the request
/// instead of using `*`.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::DEFAULT_ALLOWED_ORIGINS;
    use crate::models::{RunStatus, StatusEntry};
    use crate::patients::test_support::{jane_doe, seeded_store};
    use crate::store::PanelStore;

    fn origins() -> Vec<String> {
        DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
    }

    fn app(store: &PanelStore) -> Router {
        patient_api_router(ApiContext::new(store.clone()), &origins())
    }

    fn make_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_check_returns_ok() {
        let (store, _dir) = seeded_store(&[], &[]);
        let (status, json) = send(app(&store), make_request("GET", "/", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["message"].as_str().unwrap().contains("running"));
    }

    #[tokio::test]
    async fn list_empty_store_returns_empty_array() {
        let (store, _dir) = seeded_store(&[], &[]);
        let (status, json) = send(app(&store), make_request("GET", "/api/patients", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn unknown_patient_returns_404_regardless_of_ledger() {
        let (store, _dir) =
            seeded_store(&[jane_doe()], &[StatusEntry::new("ghost", RunStatus::Completed)]);

        let (status, json) =
            send(app(&store), make_request("GET", "/api/patients/ghost", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["message"], "Patient ghost not found");

        let (status, _) = send(
            app(&store),
            make_request("PATCH", "/api/patients/ghost", Some(json!({"phone": "1"}))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn jane_doe_walkthrough() {
        let (store, _dir) = seeded_store(&[jane_doe()], &[]);

        let (status, list) = send(app(&store), make_request("GET", "/api/patients", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["fullName"], "Jane Doe");
        assert_eq!(list[0]["runStatus"], "NOT_RUN");

        let (status, detail) = send(
            app(&store),
            make_request("PATCH", "/api/patients/p1", Some(json!({"runStatus": "IN_FLOW"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["runStatus"], "IN_FLOW");
        assert_eq!(
            store.ledger.load().unwrap(),
            vec![StatusEntry::new("p1", RunStatus::InFlow)]
        );

        let (_, detail) = send(app(&store), make_request("GET", "/api/patients/p1", None)).await;
        assert_eq!(detail["runStatus"], "IN_FLOW");
        assert_eq!(detail["last_name"], "Doe");
        assert_eq!(detail["demographic"], "Jane Doe, F, 1990-01-01");

        let (_, detail) = send(
            app(&store),
            make_request("PATCH", "/api/patients/p1", Some(json!({"last_name": "Smith"}))),
        )
        .await;
        assert_eq!(detail["demographic"], "Jane Smith, F, 1990-01-01");
        assert_eq!(detail["rawHeidi"]["demographic_string"], "Jane Smith, F, 1990-01-01");
        assert_eq!(detail["runStatus"], "IN_FLOW");

        let (status, reset) = send(
            app(&store),
            make_request("POST", "/api/patients/reset-run-status", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reset["count"], 1);
        assert!(reset["message"].is_string());
        assert_eq!(
            store.ledger.load().unwrap(),
            vec![StatusEntry::new("p1", RunStatus::NotRun)]
        );
    }

    #[tokio::test]
    async fn empty_patch_returns_unchanged_detail() {
        let (store, _dir) = seeded_store(&[jane_doe()], &[]);

        let (_, before) = send(app(&store), make_request("GET", "/api/patients/p1", None)).await;
        let (status, after) = send(
            app(&store),
            make_request("PATCH", "/api/patients/p1", Some(json!({}))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn patch_ignores_unknown_and_read_only_fields() {
        let (store, _dir) = seeded_store(&[jane_doe()], &[]);

        let (status, detail) = send(
            app(&store),
            make_request(
                "PATCH",
                "/api/patients/p1",
                Some(json!({"gender": "male", "id": "p2", "favourite_colour": "blue"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["id"], "p1");
        assert_eq!(detail["gender"], "female");
        assert!(detail["rawHeidi"].get("favourite_colour").is_none());
    }

    #[tokio::test]
    async fn invalid_run_status_is_rejected_without_writes() {
        let (store, _dir) = seeded_store(&[jane_doe()], &[]);
        let before = std::fs::read(store.records.path()).unwrap();

        let (status, json) = send(
            app(&store),
            make_request(
                "PATCH",
                "/api/patients/p1",
                Some(json!({"first_name": "Janet", "runStatus": "DONE"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "UNPROCESSABLE");
        assert_eq!(std::fs::read(store.records.path()).unwrap(), before);
        assert!(store.ledger.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_unprocessable() {
        let (store, _dir) = seeded_store(&[jane_doe()], &[]);
        let before = std::fs::read(store.records.path()).unwrap();
        let req = Request::builder()
            .method("PATCH")
            .uri("/api/patients/p1")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, json) = send(app(&store), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "UNPROCESSABLE");
        assert_eq!(std::fs::read(store.records.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn missing_body_and_content_type_is_unprocessable() {
        let (store, _dir) = seeded_store(&[jane_doe()], &[]);

        let (status, json) =
            send(app(&store), make_request("PATCH", "/api/patients/p1", None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "UNPROCESSABLE");
        assert!(store.ledger.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_record_document_is_internal_error() {
        let (store, _dir) = seeded_store(&[], &[]);
        std::fs::write(store.records.path(), r#"[{"id": "p1"}]"#).unwrap();

        let (status, json) = send(app(&store), make_request("GET", "/api/patients", None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "INTERNAL");
    }

    #[tokio::test]
    async fn reset_route_does_not_match_detail() {
        let (store, _dir) = seeded_store(&[jane_doe()], &[]);
        let (status, _) = send(
            app(&store),
            make_request("GET", "/api/patients/reset-run-status", None),
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn cors_preflight_from_allowed_origin() {
        let (store, _dir) = seeded_store(&[jane_doe()], &[]);
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/patients/p1")
            .header("Origin", "http://localhost:5173")
            .header("Access-Control-Request-Method", "PATCH")
            .header("Access-Control-Request-Headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app(&store).oneshot(req).await.unwrap();
        let headers = response.headers();

        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(headers.get("access-control-allow-credentials").unwrap(), "true");
        assert_eq!(headers.get("access-control-allow-methods").unwrap(), "PATCH");
    }

    #[tokio::test]
    async fn cors_ignores_unlisted_origin() {
        let (store, _dir) = seeded_store(&[jane_doe()], &[]);
        let req = Request::builder()
            .method("GET")
            .uri("/api/patients")
            .header("Origin", "http://evil.test")
            .body(Body::empty())
            .unwrap();

        let response = app(&store).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
