//! # Domain Types
//!
//! Core domain types used throughout Shelf.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────────────┐      │
//! │  │        Book          │        │  ReservationHistoryEntry     │      │
//! │  │  ──────────────────  │  1..n  │  ──────────────────────────  │      │
//! │  │  id (i64)            │◄╌╌╌╌╌╌╌│  id (i64)                    │      │
//! │  │  title               │  weak  │  book_id (no FK, survives    │      │
//! │  │  author              │        │           book deletion)     │      │
//! │  │  is_reserved         │        │  is_reserved (state after)   │      │
//! │  │  reservation_comment │        │  comment                     │      │
//! │  └──────────────────────┘        │  changed_at                  │      │
//! │                                  └──────────────────────────────┘      │
//! │                                                                         │
//! │  ┌──────────────────────┐                                              │
//! │  │  ReservationState    │   Available ◄──── unreserve ────┐           │
//! │  │  Available           │       │                          │           │
//! │  │  Reserved            │       └────── reserve ──────► Reserved      │
//! │  └──────────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Ids are assigned by storage on insert (SQLite rowid). `NewBook` and
//! `NewHistoryEntry` are the insert shapes without an id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Book
// =============================================================================

/// A catalog item that can be reserved.
///
/// ## Invariant
/// `is_reserved == false` implies `reservation_comment` is empty.
/// The only code paths that flip `is_reserved` are
/// [`reserve`](crate::reservation::reserve) and
/// [`unreserve`](crate::reservation::unreserve).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Book {
    /// Storage-assigned identifier.
    pub id: i64,

    /// Display title. Non-empty.
    pub title: String,

    /// Author name. Non-empty.
    pub author: String,

    /// Whether the book is currently held.
    pub is_reserved: bool,

    /// Free text attached to the current reservation. Empty when available.
    #[serde(default)]
    pub reservation_comment: String,
}

impl Book {
    /// Returns the reservation state derived from `is_reserved`.
    #[inline]
    pub fn state(&self) -> ReservationState {
        ReservationState::from(self.is_reserved)
    }

    /// Checks the state invariant (available books carry no comment).
    pub fn is_consistent(&self) -> bool {
        self.is_reserved || self.reservation_comment.is_empty()
    }
}

/// Insert shape for a book. The id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub is_reserved: bool,
    #[serde(default)]
    pub reservation_comment: String,
}

impl NewBook {
    /// Creates an available book with no comment.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        NewBook {
            title: title.into(),
            author: author.into(),
            is_reserved: false,
            reservation_comment: String::new(),
        }
    }

    /// Attaches the id assigned by storage.
    pub fn with_id(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            is_reserved: self.is_reserved,
            reservation_comment: self.reservation_comment,
        }
    }
}

// =============================================================================
// Reservation State
// =============================================================================

/// The two states a book can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ReservationState {
    Available,
    Reserved,
}

impl ReservationState {
    /// The stored `is_reserved` flag for this state.
    #[inline]
    pub const fn is_reserved(self) -> bool {
        matches!(self, ReservationState::Reserved)
    }
}

impl From<bool> for ReservationState {
    fn from(is_reserved: bool) -> Self {
        if is_reserved {
            ReservationState::Reserved
        } else {
            ReservationState::Available
        }
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationState::Available => write!(f, "available"),
            ReservationState::Reserved => write!(f, "reserved"),
        }
    }
}

// =============================================================================
// Reservation History
// =============================================================================

/// Immutable audit record of one state transition.
///
/// `is_reserved` is the state AFTER the transition. Entries are never
/// updated or deleted, and outlive the book they refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReservationHistoryEntry {
    pub id: i64,
    pub book_id: i64,
    pub is_reserved: bool,
    pub comment: String,
    #[ts(as = "String")]
    pub changed_at: DateTime<Utc>,
}

/// Insert shape for a history entry, produced by the Reservation Engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub book_id: i64,
    pub is_reserved: bool,
    pub comment: String,
    pub changed_at: DateTime<Utc>,
}

impl NewHistoryEntry {
    /// Attaches the id assigned by storage.
    pub fn with_id(self, id: i64) -> ReservationHistoryEntry {
        ReservationHistoryEntry {
            id,
            book_id: self.book_id,
            is_reserved: self.is_reserved,
            comment: self.comment,
            changed_at: self.changed_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
