//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all dispatch handler
//! - Wire up middleware (tracing, limits, timeouts, request ID)
//! - Bind server to listener and shut down gracefully
//! - Swap in a new dispatcher when the configuration changes
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::{request_context, MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::resources::{build_dispatcher, CatalogError, ResourceCatalog};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ArcSwap<Dispatcher<ResourceCatalog>>>,
    pub max_body_bytes: usize,
}

/// HTTP front end for the dispatcher.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server, building the resource model from `config`.
    pub fn new(config: RouterConfig) -> Result<Self, Vec<CatalogError>> {
        let dispatcher = build_dispatcher(&config)?;
        let state = AppState {
            dispatcher: Arc::new(ArcSwap::from_pointee(dispatcher)),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self { router, config, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving or for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Each configuration received on `config_updates` replaces the resource
    /// model. Listener and timeout settings only change on restart.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let dispatcher = Arc::clone(&self.state.dispatcher);
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match build_dispatcher(&config) {
                    Ok(next) => {
                        dispatcher.store(Arc::new(next));
                        metrics::record_config_reload("applied");
                        tracing::info!(resources = config.resources.len(), "Resource model reloaded");
                    }
                    Err(errors) => {
                        metrics::record_config_reload("rejected");
                        for error in &errors {
                            tracing::error!(error = %error, "Rejected reloaded resource model");
                        }
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve, invoke and represent one request.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let method_str = parts.method.to_string();
    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let entity = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            metrics::record_request(&method_str, 413, start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let context = match request_context(&parts.method, &parts.uri, &parts.headers, !entity.is_empty()) {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected request headers");
            let response = e.into_response();
            metrics::record_request(&method_str, response.status().as_u16(), start_time);
            return response;
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %context.method,
        path = %context.path,
        "Dispatching request"
    );

    let dispatcher = state.dispatcher.load();
    let response = match dispatcher.dispatch(&context, &entity) {
        Ok(dispatched) => dispatched.into_response(),
        Err(e) => {
            if e.status().is_client_error() {
                tracing::warn!(request_id = %request_id, path = %context.path, error = %e, "Request not dispatched");
            }
            metrics::record_resolution_failure(e.kind());
            e.into_response()
        }
    };

    metrics::record_request(&method_str, response.status().as_u16(), start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    fn config() -> RouterConfig {
        crate::config::parse_config(
            r#"
            [[resources]]
            name = "ping"
            path = "/ping"
            methods = [{ name = "pong", response = { media_type = "text/plain", body = "pong" } }]
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_through_router() {
        let server = HttpServer::new(config()).unwrap();
        let response = server
            .router()
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"pong");
    }

    #[tokio::test]
    async fn test_dispatcher_swap_is_visible() {
        let server = HttpServer::new(config()).unwrap();
        let router = server.router();

        let mut next = config();
        next.resources[0].path = Some("/pong".to_string());
        server.state().dispatcher.store(Arc::new(build_dispatcher(&next).unwrap()));

        let old = router
            .clone()
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(old.status(), StatusCode::NOT_FOUND);

        let new = router
            .oneshot(Request::get("/pong").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(new.status(), StatusCode::OK);
    }
}
