//! # Catalog Service
//!
//! The book catalog's use cases: storage plus the Reservation Engine.
//!
//! ## Reserve Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reserve(id, comment)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  take write lock ─────────────── one writer per service at a time      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ── books.get_by_id(id) ──► None? ──► NotFound                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  reservation::reserve(&book, comment, now) ──► reserved? ──► Conflict  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  books.apply_change()  (WHERE is_reserved = 0) ──► 0 rows? ──► re-read │
//! │       │                      gone ──► NotFound, moved ──► Conflict     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  history.insert(entry)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT  ← book row and history entry land together, or not at all     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Outcomes
//! Every failure is classified by [`CatalogError::kind`]:
//!
//! | Outcome            | Raised by                                          |
//! |--------------------|----------------------------------------------------|
//! | `NotFound`         | get/update/delete/reserve/unreserve on missing id  |
//! | `Conflict`         | double reserve, unreserve of available book,       |
//! |                    | state change through update, lost guarded write    |
//! | `ValidationFailed` | bad title/author, inconsistent record              |
//! | `StorageFailure`   | anything the database itself reports               |

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use shelf_core::reservation::{self, ReservationChange};
use shelf_core::validation::{validate_book, validate_new_book};
use shelf_core::{Book, CoreError, NewBook, ReservationHistoryEntry, ValidationError};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{BookRepository, HistoryRepository, MutableRepository, Repository};
use crate::unit_of_work::UnitOfWork;

// =============================================================================
// Errors
// =============================================================================

/// Failure categories a caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    Conflict,
    ValidationFailed,
    StorageFailure,
}

/// Errors returned by [`CatalogService`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Expected domain outcome (missing book, wrong state, bad input).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The database failed.
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl CatalogError {
    /// Classifies the error.
    pub fn kind(&self) -> Outcome {
        match self {
            CatalogError::Core(CoreError::BookNotFound(_)) => Outcome::NotFound,
            CatalogError::Core(
                CoreError::AlreadyReserved { .. }
                | CoreError::NotReserved { .. }
                | CoreError::StateChangeViaUpdate { .. },
            ) => Outcome::Conflict,
            CatalogError::Core(CoreError::Validation(_)) => Outcome::ValidationFailed,
            CatalogError::Storage(_) => Outcome::StorageFailure,
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        CatalogError::Core(CoreError::Validation(err))
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// A committed transition: the book as stored and the history entry
/// appended with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub book: Book,
    pub entry: ReservationHistoryEntry,
}

// =============================================================================
// Service
// =============================================================================

/// Catalog use cases over one [`Database`].
///
/// Clones share the database pool and the write lock.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = CatalogService::new(db);
/// let dune = catalog.add(NewBook::new("Dune", "Frank Herbert")).await?;
/// catalog.reserve(dune.id, "for Alice").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
    write_lock: Arc<Mutex<()>>,
}

impl CatalogService {
    /// Creates a service over an open database.
    pub fn new(db: Database) -> Self {
        CatalogService {
            db,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Every book, ordered by id.
    pub async fn list_all(&self) -> CatalogResult<Vec<Book>> {
        let mut conn = self.db.connection().await?;
        Ok(BookRepository::new(&mut conn).list_all().await?)
    }

    /// One book, or `NotFound`.
    pub async fn get_by_id(&self, id: i64) -> CatalogResult<Book> {
        let mut conn = self.db.connection().await?;
        let found = BookRepository::new(&mut conn).get_by_id(id).await?;
        Ok(reservation::require_book(found, id)?)
    }

    /// Books currently reserved.
    pub async fn list_reserved(&self) -> CatalogResult<Vec<Book>> {
        let mut conn = self.db.connection().await?;
        Ok(BookRepository::new(&mut conn)
            .list_by_reservation(true)
            .await?)
    }

    /// Books currently available.
    pub async fn list_available(&self) -> CatalogResult<Vec<Book>> {
        let mut conn = self.db.connection().await?;
        Ok(BookRepository::new(&mut conn)
            .list_by_reservation(false)
            .await?)
    }

    /// History for a book id, oldest first. Empty is a valid answer, and the
    /// book does not need to exist any more.
    pub async fn get_history(&self, book_id: i64) -> CatalogResult<Vec<ReservationHistoryEntry>> {
        let mut conn = self.db.connection().await?;
        Ok(HistoryRepository::new(&mut conn)
            .find_by_book_id(book_id)
            .await?)
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Adds a book. Reservation fields are stored as supplied, provided they
    /// are consistent (an available book has no comment).
    pub async fn add(&self, book: NewBook) -> CatalogResult<Book> {
        validate_new_book(&book)?;

        let _guard = self.write_lock.lock().await;
        let mut uow = self.db.begin().await?;
        let stored = uow.books().insert(book).await?;
        uow.commit().await?;

        info!(id = stored.id, title = %stored.title, "Book added");
        Ok(stored)
    }

    /// Replaces title and author of an existing book.
    ///
    /// The incoming reservation fields must match what is stored; reservation
    /// state only moves through [`reserve`](Self::reserve) and
    /// [`unreserve`](Self::unreserve).
    pub async fn update(&self, book: Book) -> CatalogResult<Book> {
        validate_book(&book)?;

        let _guard = self.write_lock.lock().await;
        let mut uow = self.db.begin().await?;

        let found = uow.books().get_by_id(book.id).await?;
        let stored = reservation::require_book(found, book.id)?;
        reservation::ensure_state_unchanged(&stored, &book)?;

        uow.books().update(&book).await?;
        uow.commit().await?;

        info!(id = book.id, "Book updated");
        Ok(book)
    }

    /// Removes a book. Its history stays.
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut uow = self.db.begin().await?;

        let found = uow.books().get_by_id(id).await?;
        reservation::require_book(found, id)?;

        uow.books().delete(id).await?;
        uow.commit().await?;

        info!(id, "Book deleted");
        Ok(())
    }

    /// Reserves an available book with a comment (may be empty).
    pub async fn reserve(&self, id: i64, comment: &str) -> CatalogResult<Transition> {
        self.transition(id, |book| {
            reservation::reserve(book, comment, Utc::now())
        })
        .await
    }

    /// Releases a reserved book.
    pub async fn unreserve(&self, id: i64) -> CatalogResult<Transition> {
        self.transition(id, |book| reservation::unreserve(book, Utc::now()))
            .await
    }

    /// Load, decide, persist book + history, commit.
    async fn transition<F>(&self, id: i64, decide: F) -> CatalogResult<Transition>
    where
        F: FnOnce(&Book) -> Result<ReservationChange, CoreError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut uow = self.db.begin().await?;

        let found = uow.books().get_by_id(id).await?;
        let book = reservation::require_book(found, id)?;

        let change = match decide(&book) {
            Ok(change) => change,
            Err(e) => {
                debug!(id, error = %e, "Reservation transition rejected");
                return Err(e.into());
            }
        };

        if !uow.books().apply_change(&change).await? {
            // Row moved or vanished under us (another process); nothing is written
            let err = lost_write(&mut uow, &change).await?;
            warn!(id, from = %change.from, error = %err, "Guarded reservation write lost");
            return Err(err.into());
        }

        let entry = uow.history().insert(change.entry).await?;
        uow.commit().await?;

        info!(
            id,
            state = %change.to,
            history_id = entry.id,
            "Reservation state changed"
        );

        Ok(Transition {
            book: change.book,
            entry,
        })
    }
}

/// Explains a guarded write that matched no row: the book is gone
/// (`BookNotFound`) or already in the target state (a conflict).
async fn lost_write(uow: &mut UnitOfWork, change: &ReservationChange) -> DbResult<CoreError> {
    let book_id = change.book.id;
    if uow.books().get_by_id(book_id).await?.is_none() {
        return Ok(CoreError::BookNotFound(book_id));
    }

    Ok(if change.to.is_reserved() {
        CoreError::AlreadyReserved { book_id }
    } else {
        CoreError::NotReserved { book_id }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use shelf_core::UNRESERVED_COMMENT;

    async fn catalog() -> CatalogService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CatalogService::new(db)
    }

    async fn catalog_with_dune() -> (CatalogService, Book) {
        let catalog = catalog().await;
        let dune = catalog
            .add(NewBook::new("Dune", "Frank Herbert"))
            .await
            .unwrap();
        (catalog, dune)
    }

    fn assert_consistent(books: &[Book]) {
        for book in books {
            assert!(book.is_consistent(), "inconsistent book: {book:?}");
        }
    }

    #[tokio::test]
    async fn test_add_then_get_round_trip() {
        let (catalog, dune) = catalog_with_dune().await;

        assert_eq!(dune.id, 1);
        let fetched = catalog.get_by_id(dune.id).await.unwrap();
        assert_eq!(fetched, dune);
        assert!(!fetched.is_reserved);
        assert_eq!(fetched.reservation_comment, "");
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_input() {
        let catalog = catalog().await;

        let err = catalog.add(NewBook::new("", "Someone")).await.unwrap_err();
        assert_eq!(err.kind(), Outcome::ValidationFailed);

        let mut inconsistent = NewBook::new("Dune", "Frank Herbert");
        inconsistent.reservation_comment = "stray".to_string();
        let err = catalog.add(inconsistent).await.unwrap_err();
        assert_eq!(err.kind(), Outcome::ValidationFailed);

        assert!(catalog.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_keeps_supplied_reservation_state() {
        let catalog = catalog().await;
        let mut held = NewBook::new("Emma", "Jane Austen");
        held.is_reserved = true;
        held.reservation_comment = "shelf copy".to_string();

        let stored = catalog.add(held).await.unwrap();
        assert!(stored.is_reserved);
        assert_eq!(catalog.list_reserved().await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_get_missing_book_is_not_found() {
        let catalog = catalog().await;
        let err = catalog.get_by_id(404).await.unwrap_err();
        assert_eq!(err.kind(), Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_reserve_available_book() {
        let (catalog, dune) = catalog_with_dune().await;

        let transition = catalog.reserve(dune.id, "for Alice").await.unwrap();
        assert!(transition.book.is_reserved);
        assert_eq!(transition.book.reservation_comment, "for Alice");
        assert_eq!(transition.entry.book_id, dune.id);
        assert!(transition.entry.is_reserved);
        assert_eq!(transition.entry.comment, "for Alice");

        let stored = catalog.get_by_id(dune.id).await.unwrap();
        assert_eq!(stored, transition.book);

        let history = catalog.get_history(dune.id).await.unwrap();
        assert_eq!(history, vec![transition.entry]);
    }

    #[tokio::test]
    async fn test_double_reserve_conflicts_without_side_effects() {
        let (catalog, dune) = catalog_with_dune().await;
        catalog.reserve(dune.id, "for Alice").await.unwrap();

        let err = catalog.reserve(dune.id, "for Bob").await.unwrap_err();
        assert_eq!(err.kind(), Outcome::Conflict);

        let stored = catalog.get_by_id(dune.id).await.unwrap();
        assert_eq!(stored.reservation_comment, "for Alice");
        assert_eq!(catalog.get_history(dune.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreserve_clears_comment_and_logs() {
        let (catalog, dune) = catalog_with_dune().await;
        catalog.reserve(dune.id, "for Alice").await.unwrap();

        let transition = catalog.unreserve(dune.id).await.unwrap();
        assert!(!transition.book.is_reserved);
        assert_eq!(transition.book.reservation_comment, "");
        assert!(!transition.entry.is_reserved);
        assert_eq!(transition.entry.comment, UNRESERVED_COMMENT);

        let history = catalog.get_history(dune.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].changed_at <= history[1].changed_at);
    }

    #[tokio::test]
    async fn test_unreserve_available_book_conflicts() {
        let (catalog, dune) = catalog_with_dune().await;

        let err = catalog.unreserve(dune.id).await.unwrap_err();
        assert_eq!(err.kind(), Outcome::Conflict);
        assert!(catalog.get_history(dune.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transitions_on_missing_book_are_not_found() {
        let catalog = catalog().await;
        assert_eq!(
            catalog.reserve(9, "x").await.unwrap_err().kind(),
            Outcome::NotFound
        );
        assert_eq!(catalog.unreserve(9).await.unwrap_err().kind(), Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_lost_write_on_deleted_book_is_not_found() {
        let (catalog, dune) = catalog_with_dune().await;
        let change = reservation::reserve(&dune, "for Alice", Utc::now()).unwrap();

        // Row removed between the read and the guarded write
        catalog.delete(dune.id).await.unwrap();

        let mut uow = catalog.database().begin().await.unwrap();
        assert!(!uow.books().apply_change(&change).await.unwrap());
        let err = lost_write(&mut uow, &change).await.unwrap();

        assert!(matches!(err, CoreError::BookNotFound(id) if id == dune.id));
        assert_eq!(CatalogError::from(err).kind(), Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_lost_write_on_moved_book_is_conflict() {
        let (catalog, dune) = catalog_with_dune().await;
        let stale = reservation::reserve(&dune, "for Bob", Utc::now()).unwrap();

        catalog.reserve(dune.id, "for Alice").await.unwrap();

        let mut uow = catalog.database().begin().await.unwrap();
        assert!(!uow.books().apply_change(&stale).await.unwrap());
        let err = lost_write(&mut uow, &stale).await.unwrap();

        assert!(matches!(err, CoreError::AlreadyReserved { .. }));
        assert_eq!(CatalogError::from(err).kind(), Outcome::Conflict);
    }

    #[test]
    fn test_every_core_error_has_its_outcome() {
        let cases = [
            (CoreError::BookNotFound(1), Outcome::NotFound),
            (CoreError::AlreadyReserved { book_id: 1 }, Outcome::Conflict),
            (CoreError::NotReserved { book_id: 1 }, Outcome::Conflict),
            (CoreError::StateChangeViaUpdate { book_id: 1 }, Outcome::Conflict),
            (
                CoreError::Validation(ValidationError::IdMismatch {
                    path_id: 1,
                    body_id: 2,
                }),
                Outcome::ValidationFailed,
            ),
        ];

        for (err, outcome) in cases {
            assert_eq!(CatalogError::from(err).kind(), outcome);
        }
        assert_eq!(
            CatalogError::from(DbError::PoolExhausted).kind(),
            Outcome::StorageFailure
        );
    }

    #[tokio::test]
    async fn test_reserve_accepts_any_comment() {
        let catalog = catalog().await;
        let crlf = "line one\r\nline two".to_string();
        let long = "x".repeat(501);

        for comment in [crlf, long] {
            let book = catalog
                .add(NewBook::new("Dune", "Frank Herbert"))
                .await
                .unwrap();
            catalog.reserve(book.id, &comment).await.unwrap();

            let stored = catalog.get_by_id(book.id).await.unwrap();
            assert!(stored.is_reserved);
            assert_eq!(stored.reservation_comment, comment);
            assert_eq!(catalog.get_history(book.id).await.unwrap()[0].comment, comment);
        }
    }

    #[tokio::test]
    async fn test_reserved_and_available_partition_catalog() {
        let catalog = catalog().await;
        for (title, author) in [
            ("Dune", "Frank Herbert"),
            ("Emma", "Jane Austen"),
            ("Ulysses", "James Joyce"),
        ] {
            catalog.add(NewBook::new(title, author)).await.unwrap();
        }
        catalog.reserve(2, "for Carol").await.unwrap();

        let reserved = catalog.list_reserved().await.unwrap();
        let available = catalog.list_available().await.unwrap();
        assert_eq!(reserved.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(available.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 3]);

        let all = catalog.list_all().await.unwrap();
        assert_eq!(all.len(), reserved.len() + available.len());
        assert_consistent(&all);
    }

    #[tokio::test]
    async fn test_update_replaces_descriptive_fields() {
        let (catalog, dune) = catalog_with_dune().await;

        let mut edited = dune.clone();
        edited.title = "Dune (1965)".to_string();
        let updated = catalog.update(edited.clone()).await.unwrap();

        assert_eq!(updated, edited);
        assert_eq!(catalog.get_by_id(dune.id).await.unwrap().title, "Dune (1965)");
    }

    #[tokio::test]
    async fn test_update_cannot_change_reservation_state() {
        let (catalog, dune) = catalog_with_dune().await;

        let mut flipped = dune.clone();
        flipped.is_reserved = true;
        flipped.reservation_comment = "sneaky".to_string();

        let err = catalog.update(flipped).await.unwrap_err();
        assert_eq!(err.kind(), Outcome::Conflict);
        assert!(!catalog.get_by_id(dune.id).await.unwrap().is_reserved);
        assert!(catalog.get_history(dune.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_book_is_not_found() {
        let catalog = catalog().await;
        let ghost = NewBook::new("Ghost", "Nobody").with_id(5);
        assert_eq!(
            catalog.update(ghost).await.unwrap_err().kind(),
            Outcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_keeps_history() {
        let (catalog, dune) = catalog_with_dune().await;
        catalog.reserve(dune.id, "for Alice").await.unwrap();

        catalog.delete(dune.id).await.unwrap();

        assert_eq!(
            catalog.get_by_id(dune.id).await.unwrap_err().kind(),
            Outcome::NotFound
        );
        assert_eq!(catalog.get_history(dune.id).await.unwrap().len(), 1);
        assert_eq!(
            catalog.delete(dune.id).await.unwrap_err().kind(),
            Outcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_dune_scenario() {
        let (catalog, dune) = catalog_with_dune().await;
        assert_eq!(dune.id, 1);

        catalog.reserve(1, "for Alice").await.unwrap();
        let book = catalog.get_by_id(1).await.unwrap();
        assert!(book.is_reserved);
        assert_eq!(book.reservation_comment, "for Alice");

        let err = catalog.reserve(1, "for Bob").await.unwrap_err();
        assert_eq!(err.kind(), Outcome::Conflict);

        catalog.unreserve(1).await.unwrap();
        let book = catalog.get_by_id(1).await.unwrap();
        assert!(!book.is_reserved);
        assert_eq!(book.reservation_comment, "");

        let history = catalog.get_history(1).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].is_reserved);
        assert_eq!(history[0].comment, "for Alice");
        assert!(!history[1].is_reserved);
        assert_eq!(history[1].comment, "Unreserved");

        catalog.delete(1).await.unwrap();
        assert_eq!(
            catalog.get_by_id(1).await.unwrap_err().kind(),
            Outcome::NotFound
        );
        assert_eq!(catalog.get_history(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_reserves_have_one_winner() {
        let (catalog, dune) = catalog_with_dune().await;
        let id = dune.id;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let catalog = catalog.clone();
                tokio::spawn(async move {
                    let comment = format!("reader {i}");
                    catalog.reserve(id, &comment).await
                })
            })
            .collect();

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(e) => {
                    assert_eq!(e.kind(), Outcome::Conflict);
                    conflicts += 1;
                }
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(catalog.get_history(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_classified() {
        let (catalog, dune) = catalog_with_dune().await;
        catalog.database().close().await;

        let err = catalog.reserve(dune.id, "for Alice").await.unwrap_err();
        assert_eq!(err.kind(), Outcome::StorageFailure);
    }
}
