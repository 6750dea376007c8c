// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTPS admission webhook serving the pod mutation endpoint.

pub mod pod;

use crate::config::ServerConfig;
use crate::constants::webhook::MUTATE_POD_PATH;
use crate::error::{InjectorError, Result};
use crate::injector::Injector;
use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::sync::Arc;
use tracing::info;

/// Shared state for webhook handlers
#[derive(Debug, Clone)]
pub struct WebhookState {
    pub injector: Injector,
}

impl WebhookState {
    pub fn new(injector: Injector) -> Self {
        Self { injector }
    }
}

/// Build the webhook router with the mutation and health endpoints
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(MUTATE_POD_PATH, post(pod::mutate_handler))
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ok" }))
        .with_state(state)
}

/// Load the serving certificate and serve admission requests until the server fails
pub async fn serve(config: &ServerConfig, injector: Injector) -> Result<()> {
    let tls_config = RustlsConfig::from_pem_file(&config.tls_cert_file, &config.tls_key_file)
        .await
        .map_err(|e| {
            InjectorError::Tls(format!(
                "Failed to load certificate {} / key {}: {}",
                config.tls_cert_file.display(),
                config.tls_key_file.display(),
                e
            ))
        })?;

    let app = webhook_router(Arc::new(WebhookState::new(injector)));

    info!(addr = %config.bind_address, path = MUTATE_POD_PATH, "Starting admission webhook server");
    axum_server::bind_rustls(config.bind_address, tls_config)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InjectorConfig;
    use axum::body::Body;
    use bytes::Bytes;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn make_router() -> Router {
        webhook_router(Arc::new(WebhookState::new(Injector::new(
            InjectorConfig::default(),
        ))))
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for path in ["/healthz", "/readyz"] {
            let response = make_router()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let body: Bytes = response.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(&body[..], b"ok");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = make_router()
            .oneshot(Request::post("/validate").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_fails_without_certificates() {
        let config = ServerConfig {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            tls_cert_file: PathBuf::from("/nonexistent/tls.crt"),
            tls_key_file: PathBuf::from("/nonexistent/tls.key"),
        };

        let result = serve(&config, Injector::new(InjectorConfig::default())).await;
        assert!(matches!(result, Err(InjectorError::Tls(_))));
    }
}
