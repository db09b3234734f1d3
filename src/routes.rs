//! Router construction for the public and private listeners.

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// Public listener: health only.
pub fn public_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Private listener: profile API plus health.
pub fn private_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/profile", post(handlers::profiles::create_profile))
        .route(
            "/api/v1/profile/{id}",
            get(handlers::profiles::get_profile).delete(handlers::profiles::delete_profile),
        )
        .route(
            "/api/v1/profiles/{id}",
            put(handlers::profiles::update_profile),
        )
        .route(
            "/api/v1/users/search",
            post(handlers::profiles::search_profiles),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        clock::FixedClock,
        keys::{FixedKeyGenerator, KeyPair},
        services::search::SearchOptions,
        store::memory::MemoryProfileStore,
    };

    fn state_with(store: Arc<MemoryProfileStore>) -> AppState {
        AppState {
            store,
            clock: Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())),
            keys: Arc::new(FixedKeyGenerator(KeyPair {
                public_key: "pub-hex".into(),
                private_key: "priv-hex".into(),
            })),
            search: SearchOptions::default(),
        }
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn create_get_update_flow() {
        let store = Arc::new(MemoryProfileStore::new());
        let app = private_router(state_with(store.clone()));

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/profile",
            Some(json!({"user_first_name": "A", "user_last_name": "B", "id": 77})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 1);
        assert_eq!(created["user_public_key"], "pub-hex");
        assert!(created.get("user_private_key").is_none());
        assert_eq!(created["created_at"], "2025-06-01T09:00:00Z");

        let (status, fetched) = send(&app, Method::GET, "/api/v1/profile/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["user_first_name"], "A");

        let (status, updated) = send(
            &app,
            Method::PUT,
            "/api/v1/profiles/1",
            Some(json!({"user_last_name": "C", "id": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], 1);
        assert_eq!(updated["user_first_name"], "A");
        assert_eq!(updated["user_last_name"], "C");
    }

    #[tokio::test]
    async fn delete_is_soft_unless_hard_is_true() {
        let store = Arc::new(MemoryProfileStore::new());
        let app = private_router(state_with(store.clone()));
        send(&app, Method::POST, "/api/v1/profile", Some(json!({}))).await;

        let (status, body) = send(&app, Method::DELETE, "/api/v1/profile/1?hard=yes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"result": "ok"}));
        assert_eq!(store.rows().len(), 1);
        assert!(store.rows()[0].deleted_at.is_some());

        let (status, body) = send(&app, Method::GET, "/api/v1/profile/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "profile_not_found");

        let (status, _) = send(&app, Method::DELETE, "/api/v1/profile/1?hard=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn search_rejects_unknown_fields_without_querying() {
        let store = Arc::new(MemoryProfileStore::new());
        let app = private_router(state_with(store.clone()));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/users/search",
            Some(json!([{"user_first_name": "Ann"}, {"salary": 10}])),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_field");
        assert!(store.searches().is_empty());
    }

    #[tokio::test]
    async fn search_returns_profiles_without_private_keys() {
        let store = Arc::new(MemoryProfileStore::new());
        let app = private_router(state_with(store.clone()));
        send(&app, Method::POST, "/api/v1/profile", Some(json!({"user_first_name": "Ann"}))).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/users/search",
            Some(json!([{"user_first_name": "Ann"}])),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let profiles = body.as_array().unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].get("user_private_key").is_none());

        let searches = store.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].params[0].name, "user_first_name0");
    }

    #[tokio::test]
    async fn rejected_json_bodies_use_the_error_payload() {
        let store = Arc::new(MemoryProfileStore::new());
        let app = private_router(state_with(store.clone()));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/users/search",
            Some(json!({"user_first_name": "Ann"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "decode_error");
        assert!(store.searches().is_empty());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/users/search",
            Some(json!([1, 2])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "decode_error");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/profile",
            Some(json!({"user_first_name": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "decode_error");
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn malformed_patch_is_bad_request() {
        let store = Arc::new(MemoryProfileStore::new());
        let app = private_router(state_with(store.clone()));
        send(&app, Method::POST, "/api/v1/profile", Some(json!({}))).await;

        let (status, body) = send(&app, Method::PUT, "/api/v1/profiles/1", Some(json!([1]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "decode_error");
    }

    #[tokio::test]
    async fn health_reports_unavailable_database() {
        let app = public_router(state_with(Arc::new(MemoryProfileStore::unavailable())));

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "connection_unavailable");
    }

    #[tokio::test]
    async fn public_router_does_not_expose_the_api() {
        let app = public_router(state_with(Arc::new(MemoryProfileStore::new())));

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = send(&app, Method::GET, "/api/v1/profile/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
