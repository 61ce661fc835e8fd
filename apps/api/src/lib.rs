//! # Shelf API
//!
//! HTTP/JSON surface over the book catalog.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Shelf API Server                              │
//! │                                                                         │
//! │  Client ───► axum (8080) ───► routes::books ───► CatalogService        │
//! │                 │                                      │                │
//! │                 │  trace / cors / request-id / timeout ▼                │
//! │                 │                                   SQLite              │
//! │                 ▼                                                       │
//! │           { statusCode, message, data }                                 │
//! │           { statusCode, code, message, detail, traceId }                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `SHELF_HOST` - bind address (default: 0.0.0.0)
//! - `SHELF_PORT` - HTTP port (default: 8080)
//! - `SHELF_DB_PATH` - SQLite file (default: platform data dir)
//! - `SHELF_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `SHELF_REQUEST_TIMEOUT_MS` - per-request timeout (default: 10000)
//! - `RUST_LOG` - log filter

pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use response::ApiResponse;
pub use router::{app, RouterBuilder};
pub use state::AppState;

// =============================================================================
// End-to-end Tests
// =============================================================================
