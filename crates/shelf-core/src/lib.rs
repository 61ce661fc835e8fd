//! # shelf-core: Pure Domain Logic for Shelf
//!
//! This crate holds the book catalog's domain model and the reservation
//! state machine as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shelf Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/api (axum HTTP server)                     │   │
//! │  │      /api/v1/books, /reserve, /unreserve, /history             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           shelf-db (CatalogService, repositories)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shelf-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌─────────────┐  ┌───────────┐                │   │
//! │  │   │   types   │  │ reservation │  │ validation│                │   │
//! │  │   │   Book    │  │  reserve    │  │   rules   │                │   │
//! │  │   │  History  │  │  unreserve  │  │           │                │   │
//! │  │   └───────────┘  └─────────────┘  └───────────┘                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Book, ReservationHistoryEntry, ReservationState
//! - [`reservation`] - The reserve/unreserve state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use shelf_core::{reservation, NewBook};
//!
//! let book = NewBook::new("Dune", "Frank Herbert").with_id(1);
//!
//! let change = reservation::reserve(&book, "for Alice", Utc::now()).unwrap();
//! assert!(change.book.is_reserved);
//!
//! // A second reserve is a conflict, not a no-op
//! assert!(reservation::reserve(&change.book, "for Bob", Utc::now()).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod reservation;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use reservation::{ReservationChange, UNRESERVED_COMMENT};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum author length in characters.
pub const MAX_AUTHOR_LEN: usize = 200;
