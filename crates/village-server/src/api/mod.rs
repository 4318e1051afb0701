pub mod docs;
pub mod error;
pub mod music;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use village_db::AppState;

use crate::config::ServerConfig;
use docs::ApiDoc;

#[derive(Serialize, ToSchema)]
pub struct ApiStatus {
    status: &'static str,
    version: &'static str,
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses((status = 200, description = "Service is up", body = ApiStatus))
)]
pub async fn healthz() -> Json<ApiStatus> {
    Json(ApiStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(tower_http::cors::Any);

    if origins.is_empty() {
        // No allowed origins: browsers only get same-origin access
        tracing::warn!("CORS_ORIGINS not set, cross-origin requests will be refused");
        return layer;
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    tracing::info!("CORS allowed origins: {:?}", origins);
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Builds the full application: JSON routes, uploaded file serving and the
/// interactive API docs at `/api`.
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let music_routes = Router::new()
        .route("/music", get(music::list_music).post(music::create_music))
        .route("/music/search", get(music::search_music))
        .route("/music/artist/{wallet_address}", get(music::list_by_artist))
        .route("/music/genre/{genre}", get(music::list_by_genre))
        .route(
            "/music/{music_id}",
            get(music::get_music)
                .put(music::update_music)
                .delete(music::delete_music),
        );

    let user_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{wallet_address}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(music_routes)
        .merge(user_routes)
        .nest_service(
            &format!("/{}", users::UPLOADS_PREFIX),
            ServeDir::new(&config.upload_dir),
        )
        .merge(SwaggerUi::new("/api").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use chrono::NaiveDate;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use village_db::catalog::{music, users};
    use village_db::AppState;
    use village_media::LocalStorage;
    use village_migration::{Migrator, MigratorTrait};

    use crate::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};

    const BOUNDARY: &str = "village-test-boundary";

    pub struct TestApp {
        pub router: Router,
        pub db: DatabaseConnection,
        pub storage: Arc<LocalStorage>,
        pub config: ServerConfig,
        _upload_dir: TempDir,
    }

    impl TestApp {
        pub async fn new() -> Self {
            Self::with_limit(DEFAULT_MAX_UPLOAD_BYTES).await
        }

        pub async fn with_limit(max_upload_bytes: usize) -> Self {
            let mut opt = ConnectOptions::new("sqlite::memory:");
            opt.max_connections(1).min_connections(1).sqlx_logging(false);
            let db = Database::connect(opt).await.unwrap();
            Migrator::up(&db, None).await.unwrap();

            let upload_dir = TempDir::new().unwrap();
            let storage = Arc::new(LocalStorage::new(upload_dir.path()));
            let config = ServerConfig {
                port: 0,
                upload_dir: upload_dir.path().to_path_buf(),
                cors_origins: vec!["http://localhost:5173".to_string()],
                max_upload_bytes,
            };
            let state = Arc::new(AppState {
                db: db.clone(),
                storage: storage.clone(),
            });

            Self {
                router: super::router(state, &config),
                db,
                storage,
                config,
                _upload_dir: upload_dir,
            }
        }

        pub async fn register(&self, wallet: &str, username: &str) {
            users::create(
                &self.db,
                users::NewUser {
                    wallet_address: wallet.into(),
                    username: username.into(),
                    profile: None,
                    background: None,
                },
            )
            .await
            .unwrap();
        }

        pub async fn publish(&self, wallet: &str, title: &str) {
            music::create(
                &self.db,
                music::NewMusic {
                    title: title.into(),
                    album: "Alb1".into(),
                    release_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    genre: "Rock".into(),
                    duration: 180,
                    mp3_cid: "Qm1".into(),
                    cover_image_cid: "Qm2".into(),
                    wallet_address: wallet.into(),
                    token_address: "0xT".into(),
                    pool_address: "0xP".into(),
                },
            )
            .await
            .unwrap();
        }

        /// Files currently stored under one image directory.
        pub fn stored_files(&self, dir: &str) -> Vec<PathBuf> {
            match std::fs::read_dir(self.config.upload_dir.join(dir)) {
                Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
                Err(_) => Vec::new(),
            }
        }
    }

    pub enum FormPart<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    impl<'a> FormPart<'a> {
        pub fn text(name: &'a str, value: &'a str) -> Self {
            FormPart::Text(name, value)
        }

        pub fn file(name: &'a str, file_name: &'a str, data: &'a [u8]) -> Self {
            FormPart::File(name, file_name, data)
        }
    }

    pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        if body.is_null() {
            builder.body(Body::empty()).unwrap()
        } else {
            builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        }
    }

    pub fn multipart_request(method: Method, uri: &str, parts: &[FormPart<'_>]) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                FormPart::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                FormPart::File(name, file_name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    /// Sends a request through the router and decodes the JSON body, or
    /// `Value::Null` when the body is not JSON.
    pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{json_request, multipart_request, send, FormPart, TestApp};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_healthz() {
        let app = TestApp::new().await;
        let (status, body) = send(&app, json_request(Method::GET, "/healthz", Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = TestApp::new().await;
        let (status, body) = send(
            &app,
            json_request(Method::GET, "/api-docs/openapi.json", Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "Startup Village API");
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let app = TestApp::new().await;
        let response = app
            .router
            .clone()
            .oneshot(json_request(Method::GET, "/healthz", Value::Null))
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = TestApp::new().await;
        let request = Request::builder()
            .method(Method::GET)
            .uri("/music")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_uploaded_images_are_served() {
        let app = TestApp::new().await;
        let png: &[u8] = b"\x89PNG\r\n\x1a\nservable";
        let (_, created) = send(
            &app,
            multipart_request(
                Method::POST,
                "/users",
                &[
                    FormPart::text("wallet_address", "0xA"),
                    FormPart::text("username", "alice"),
                    FormPart::file("profile", "me.png", png),
                ],
            ),
        )
        .await;
        let uri = format!("/{}", created["profile"].as_str().unwrap());

        let response = app
            .router
            .clone()
            .oneshot(json_request(Method::GET, &uri, Value::Null))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], png);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let app = TestApp::with_limit(1024).await;
        let big = [b"\x89PNG".as_slice(), &[0u8; 4096]].concat();
        let (status, _) = send(
            &app,
            multipart_request(
                Method::POST,
                "/users",
                &[
                    FormPart::text("wallet_address", "0xA"),
                    FormPart::text("username", "alice"),
                    FormPart::file("profile", "big.png", &big),
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(app.stored_files("profiles").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = TestApp::new().await;
        let (status, _) = send(&app, json_request(Method::GET, "/nope", Value::Null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
