//! Resource router server.
//!
//! Usage: `resource-router [CONFIG.toml]`
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http (axum, request id, limits)
//!                         │
//!                         ▼
//!                     dispatch ──▶ routing::Resolver
//!                         │           1. root resource   (template tie-break)
//!                         │           2. locator chain   (sub-resources)
//!                         │           3. handler method  (verb, consumes, produces)
//!                         ▼
//!                     resources (declared handlers)
//!                         │
//!                         ▼
//!                     negotiation (media type, language, charset)
//!     ◀────────────── http response (Content-Type, Content-Language, Allow)
//!
//!     Cross-cutting: config (+ watcher) · observability · lifecycle
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    match resource_router::lifecycle::start(config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("resource-router: {e}");
            ExitCode::FAILURE
        }
    }
}
