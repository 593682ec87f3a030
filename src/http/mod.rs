//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, body limit)
//!     → request.rs (request ID, headers → RequestContext)
//!     → dispatch::Dispatcher (resolve, invoke, negotiate)
//!     → response.rs (status, Content-Type, Content-Language, Allow)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_context, MakeRequestUuid, RequestError, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
