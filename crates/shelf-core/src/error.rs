//! # Error Types
//!
//! Domain-specific error types for shelf-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shelf-core errors (this file)                                         │
//! │  ├── CoreError        - Missing book, wrong reservation state          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shelf-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CatalogError     - Core | Storage, classified by Outcome          │
//! │                                                                         │
//! │  HTTP errors (in apps/api)                                             │
//! │  └── ApiError         - What clients see (status + envelope)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CatalogError → ApiError → Client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
///
/// Every variant is an expected, typed outcome. None of them mean storage
/// broke; that is `DbError`'s job.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No book with this id.
    #[error("Book not found: {0}")]
    BookNotFound(i64),

    /// Reserve requested on a book that is already reserved.
    ///
    /// ## When This Occurs
    /// ```text
    /// reserve(1, "for Alice")  ──► Ok
    /// reserve(1, "for Bob")    ──► AlreadyReserved { book_id: 1 }
    /// ```
    /// Also raised when a concurrent writer reserved the book between our
    /// read and our guarded write.
    #[error("Book {book_id} is already reserved")]
    AlreadyReserved { book_id: i64 },

    /// Unreserve requested on a book that is not reserved.
    #[error("Book {book_id} is not reserved")]
    NotReserved { book_id: i64 },

    /// A full-record update tried to change reservation state.
    /// Reservation state only moves through reserve/unreserve.
    #[error("Book {book_id} reservation state can only change through reserve/unreserve")]
    StateChangeViaUpdate { book_id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for "wrong state" outcomes (reported as Conflict).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CoreError::AlreadyReserved { .. }
                | CoreError::NotReserved { .. }
                | CoreError::StateChangeViaUpdate { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Path id and body id disagree.
    #[error("Id mismatch: path has {path_id}, body has {body_id}")]
    IdMismatch { path_id: i64, body_id: i64 },

    /// Fields that contradict each other.
    #[error("{field} is inconsistent: {reason}")]
    Inconsistent { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
