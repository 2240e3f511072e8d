use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use crate::docs::ApiDoc;
use axum::Router;
use crate::state::AppState;
use crate::middleware::cors::cors_layer;
use tower_http::services::ServeDir;

pub fn configure_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api_routes().merge(crate::modules::launch::router()))
        .merge(crate::modules::launch::socket_router())
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(cors_layer(&state.config.cors_allow_origins))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", axum::routing::get(|| async { "ok" }))
}

#[cfg(test)]
mod tests {
    use crate::config::settings::{AppConfig, CorsOrigins};
    use crate::state::AppState;
    use axum::{
        body::{self, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app(config: AppConfig) -> Router {
        crate::app::create_app(AppState::new(config))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn validate_request(url: &str) -> Request<Body> {
        Request::post("/api/v1/validate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "url": url }).to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_app(AppConfig::default())
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(bytes.as_ref(), b"ok");
    }

    #[tokio::test]
    async fn validate_returns_video_id() {
        let response = test_app(AppConfig::default())
            .oneshot(validate_request("https://youtube.com/watch?v=abc123"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "status": "success",
                "message": "URL is valid",
                "data": {
                    "video_id": "abc123",
                    "canonical_url": "https://www.youtube.com/watch?v=abc123"
                }
            })
        );
    }

    #[tokio::test]
    async fn validate_rejects_bad_urls() {
        let app = test_app(AppConfig::default());

        let response = app
            .clone()
            .oneshot(validate_request("not-a-url"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert!(body["message"]
            .as_str()
            .expect("message")
            .starts_with("Invalid YouTube URL"));

        let response = app.oneshot(validate_request("")).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["message"]
            .as_str()
            .expect("message")
            .contains("URL is required"));
    }

    #[tokio::test]
    async fn cors_allows_only_listed_origins() {
        let app = test_app(AppConfig {
            cors_allow_origins: CorsOrigins::List(vec!["http://tv.local".to_string()]),
            ..AppConfig::default()
        });

        let preflight = |origin: &str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/v1/validate")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .expect("request")
        };

        let allowed = app
            .clone()
            .oneshot(preflight("http://tv.local"))
            .await
            .expect("response");
        assert!(allowed.status().is_success());
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://tv.local"
        );

        let denied = app
            .oneshot(preflight("http://elsewhere.local"))
            .await
            .expect("response");
        assert!(denied
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn any_origin_by_default() {
        let response = test_app(AppConfig::default())
            .oneshot(
                Request::get("/api/v1/health")
                    .header(header::ORIGIN, "http://anywhere.local")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn serves_static_front_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<h1>tvcast</h1>").expect("write");

        let app = test_app(AppConfig {
            static_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        });

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(bytes.as_ref(), b"<h1>tvcast</h1>");

        let missing = app
            .oneshot(Request::get("/nope.js").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn socket_route_requires_upgrade() {
        let response = test_app(AppConfig::default())
            .oneshot(Request::get("/ws").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert!(response.status().is_client_error());
    }
}
