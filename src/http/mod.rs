//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → handlers.rs (parse, call BankService)
//!     → types.rs (response bodies)
//!     → response.rs (error → status + {detail, error_code})
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod types;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{build_router, AppState, HttpServer};
