//! # Validation Module
//!
//! Input validation for books.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  └── Malformed bodies rejected before any use case runs                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── title/author present and bounded                                  │
//! │  └── available ⇒ no comment                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK constraints                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shelf_core::validation::{validate_title, validate_matching_ids};
//!
//! assert!(validate_title("Dune").is_ok());
//! assert!(validate_matching_ids(1, 2).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Book, NewBook};
use crate::{MAX_AUTHOR_LEN, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_bounded(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a book title.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use shelf_core::validation::validate_title;
///
/// assert!(validate_title("Dune").is_ok());
/// assert!(validate_title("   ").is_err());
/// ```
pub fn validate_title(title: &str) -> ValidationResult<()> {
    required_bounded("title", title, MAX_TITLE_LEN)
}

/// Validates an author name. Same rules as [`validate_title`].
pub fn validate_author(author: &str) -> ValidationResult<()> {
    required_bounded("author", author, MAX_AUTHOR_LEN)
}

// =============================================================================
// Record Validators
// =============================================================================

/// Checks that an available book carries no reservation comment.
pub fn validate_reservation_consistency(
    is_reserved: bool,
    reservation_comment: &str,
) -> ValidationResult<()> {
    if !is_reserved && !reservation_comment.is_empty() {
        return Err(ValidationError::Inconsistent {
            field: "reservationComment".to_string(),
            reason: "must be empty when the book is not reserved".to_string(),
        });
    }
    Ok(())
}

/// Validates a book before insert.
pub fn validate_new_book(book: &NewBook) -> ValidationResult<()> {
    validate_title(&book.title)?;
    validate_author(&book.author)?;
    validate_reservation_consistency(book.is_reserved, &book.reservation_comment)
}

/// Validates a full record before update.
pub fn validate_book(book: &Book) -> ValidationResult<()> {
    validate_title(&book.title)?;
    validate_author(&book.author)?;
    validate_reservation_consistency(book.is_reserved, &book.reservation_comment)
}

/// Checks that the id in the request path matches the id in the body.
pub fn validate_matching_ids(path_id: i64, body_id: i64) -> ValidationResult<()> {
    if path_id != body_id {
        return Err(ValidationError::IdMismatch { path_id, body_id });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
