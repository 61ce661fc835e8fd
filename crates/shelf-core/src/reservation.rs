//! # Reservation Engine
//!
//! Pure state-transition logic for book reservations.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │               reserve(comment)                                          │
//! │   ┌───────────┐ ─────────────────────────► ┌───────────┐               │
//! │   │ Available │                            │ Reserved  │               │
//! │   │ comment="" │ ◄───────────────────────── │ comment=c │               │
//! │   └───────────┘          unreserve          └───────────┘               │
//! │                                                                         │
//! │   reserve on Reserved    ──► AlreadyReserved (Conflict, no change)      │
//! │   unreserve on Available ──► NotReserved     (Conflict, no change)      │
//! │                                                                         │
//! │   Every successful transition yields exactly one history entry:        │
//! │     reserve   → { is_reserved: true,  comment: c }                     │
//! │     unreserve → { is_reserved: false, comment: "Unreserved" }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches storage or reads the clock. The caller loads the
//! book, passes the transition time, and persists the returned
//! [`ReservationChange`] as one unit.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{Book, NewHistoryEntry, ReservationState};

/// Comment recorded on every unreserve history entry.
pub const UNRESERVED_COMMENT: &str = "Unreserved";

/// The result of a successful transition: the book as it should be stored
/// and the history entry to append alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationChange {
    pub book: Book,
    pub entry: NewHistoryEntry,
    /// State the stored row must still be in for the write to apply.
    pub from: ReservationState,
    pub to: ReservationState,
}

/// Turns a missing lookup into `BookNotFound`.
///
/// ## Example
/// ```rust
/// use shelf_core::reservation::require_book;
/// use shelf_core::CoreError;
///
/// assert!(matches!(require_book(None, 9), Err(CoreError::BookNotFound(9))));
/// ```
pub fn require_book(found: Option<Book>, id: i64) -> CoreResult<Book> {
    found.ok_or(CoreError::BookNotFound(id))
}

/// Reserves an available book.
///
/// ## Arguments
/// * `book` - Current stored state
/// * `comment` - Free-text reservation note, stored as given (may be empty)
/// * `at` - Transition timestamp
///
/// ## Returns
/// * `Ok(ReservationChange)` - Book now reserved with `comment`
/// * `Err(CoreError::AlreadyReserved)` - Book was already reserved
pub fn reserve(book: &Book, comment: &str, at: DateTime<Utc>) -> CoreResult<ReservationChange> {
    if book.is_reserved {
        return Err(CoreError::AlreadyReserved { book_id: book.id });
    }

    let updated = Book {
        is_reserved: true,
        reservation_comment: comment.to_string(),
        ..book.clone()
    };

    Ok(ReservationChange {
        entry: NewHistoryEntry {
            book_id: book.id,
            is_reserved: true,
            comment: comment.to_string(),
            changed_at: at,
        },
        book: updated,
        from: ReservationState::Available,
        to: ReservationState::Reserved,
    })
}

/// Releases a reserved book. Clears the comment and records
/// [`UNRESERVED_COMMENT`] in history.
pub fn unreserve(book: &Book, at: DateTime<Utc>) -> CoreResult<ReservationChange> {
    if !book.is_reserved {
        return Err(CoreError::NotReserved { book_id: book.id });
    }

    let updated = Book {
        is_reserved: false,
        reservation_comment: String::new(),
        ..book.clone()
    };

    Ok(ReservationChange {
        entry: NewHistoryEntry {
            book_id: book.id,
            is_reserved: false,
            comment: UNRESERVED_COMMENT.to_string(),
            changed_at: at,
        },
        book: updated,
        from: ReservationState::Reserved,
        to: ReservationState::Available,
    })
}

/// Checks that a full-record update leaves reservation state alone.
///
/// `stored` is the current row, `incoming` the replacement.
pub fn ensure_state_unchanged(stored: &Book, incoming: &Book) -> CoreResult<()> {
    if stored.is_reserved != incoming.is_reserved
        || stored.reservation_comment != incoming.reservation_comment
    {
        return Err(CoreError::StateChangeViaUpdate { book_id: stored.id });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
