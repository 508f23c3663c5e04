//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID, axum request → InboundRequest)
//!     → proxy::ProxyHandler (pipeline)
//!     → response.rs (ProxyResult → axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{inbound_request, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
