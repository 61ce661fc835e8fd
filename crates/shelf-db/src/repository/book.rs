//! # Book Repository
//!
//! Database operations for books.
//!
//! ## Key Operations
//! - CRUD through [`Repository`] / [`MutableRepository`]
//! - Scans by reservation state
//! - Guarded state change for reserve/unreserve
//!
//! ## Guarded State Change
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE books SET is_reserved = <to>, reservation_comment = <c>        │
//! │  WHERE id = <id> AND is_reserved = <from>                              │
//! │                                                                         │
//! │  rows_affected = 1  → we own the transition                            │
//! │  rows_affected = 0  → someone else moved the book first (or it was     │
//! │                       deleted); caller reports Conflict and rolls back │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::debug;

use shelf_core::{Book, NewBook, ReservationChange};

use super::{MutableRepository, Repository};
use crate::error::{DbError, DbResult};

const BOOK_COLUMNS: &str = "id, title, author, is_reserved, reservation_comment";

/// Repository for book rows, bound to one connection.
///
/// ## Usage
/// ```rust,ignore
/// let mut uow = db.begin().await?;
/// let book = uow.books().get_by_id(1).await?;
/// ```
#[derive(Debug)]
pub struct BookRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> BookRepository<'c> {
    /// Creates a BookRepository over a borrowed connection.
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        BookRepository { conn }
    }

    /// Lists books in the given reservation state, ordered by id.
    pub async fn list_by_reservation(&mut self, is_reserved: bool) -> DbResult<Vec<Book>> {
        debug!(is_reserved, "Listing books by reservation state");

        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE is_reserved = ?1 ORDER BY id");
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(is_reserved)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(books)
    }

    /// Persists a reservation transition if the row is still in `change.from`.
    ///
    /// ## Returns
    /// * `Ok(true)` - Row updated
    /// * `Ok(false)` - Row missing or already moved on
    pub async fn apply_change(&mut self, change: &ReservationChange) -> DbResult<bool> {
        debug!(
            id = change.book.id,
            from = %change.from,
            to = %change.to,
            "Applying reservation change"
        );

        let result = sqlx::query(
            r#"
            UPDATE books SET
                is_reserved = ?2,
                reservation_comment = ?3
            WHERE id = ?1 AND is_reserved = ?4
            "#,
        )
        .bind(change.book.id)
        .bind(change.to.is_reserved())
        .bind(&change.book.reservation_comment)
        .bind(change.from.is_reserved())
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl<'c> Repository<Book> for BookRepository<'c> {
    type Id = i64;
    type New = NewBook;

    async fn get_by_id(&mut self, id: i64) -> DbResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(book)
    }

    async fn list_all(&mut self) -> DbResult<Vec<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id");
        let books = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&mut *self.conn)
            .await?;

        debug!(count = books.len(), "Listed books");
        Ok(books)
    }

    async fn insert(&mut self, new: NewBook) -> DbResult<Book> {
        debug!(title = %new.title, "Inserting book");

        let id = sqlx::query(
            r#"
            INSERT INTO books (title, author, is_reserved, reservation_comment)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&new.title)
        .bind(&new.author)
        .bind(new.is_reserved)
        .bind(&new.reservation_comment)
        .execute(&mut *self.conn)
        .await?
        .last_insert_rowid();

        Ok(new.with_id(id))
    }

    async fn count(&mut self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl<'c> MutableRepository<Book> for BookRepository<'c> {
    async fn update(&mut self, book: &Book) -> DbResult<()> {
        debug!(id = book.id, "Updating book");

        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = ?2,
                author = ?3,
                is_reserved = ?4,
                reservation_comment = ?5
            WHERE id = ?1
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.is_reserved)
        .bind(&book.reservation_comment)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", book.id));
        }

        Ok(())
    }

    async fn delete(&mut self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting book");

        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use shelf_core::reservation;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let db = setup().await;
        let mut conn = db.connection().await.unwrap();
        let mut books = BookRepository::new(&mut conn);

        let dune = books
            .insert(NewBook::new("Dune", "Frank Herbert"))
            .await
            .unwrap();
        let emma = books.insert(NewBook::new("Emma", "Jane Austen")).await.unwrap();

        assert_eq!(dune.id, 1);
        assert_eq!(emma.id, 2);
        assert_eq!(books.get_by_id(1).await.unwrap(), Some(dune));
        assert_eq!(books.get_by_id(99).await.unwrap(), None);
        assert_eq!(books.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_by_reservation() {
        let db = setup().await;
        let mut conn = db.connection().await.unwrap();
        let mut books = BookRepository::new(&mut conn);

        books.insert(NewBook::new("Dune", "Frank Herbert")).await.unwrap();
        let mut held = NewBook::new("Emma", "Jane Austen");
        held.is_reserved = true;
        held.reservation_comment = "for Carol".to_string();
        books.insert(held).await.unwrap();

        let reserved = books.list_by_reservation(true).await.unwrap();
        let available = books.list_by_reservation(false).await.unwrap();

        assert_eq!(reserved.len(), 1);
        assert_eq!(reserved[0].title, "Emma");
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].title, "Dune");
    }

    #[tokio::test]
    async fn test_apply_change_is_guarded() {
        let db = setup().await;
        let mut conn = db.connection().await.unwrap();
        let mut books = BookRepository::new(&mut conn);

        let dune = books
            .insert(NewBook::new("Dune", "Frank Herbert"))
            .await
            .unwrap();
        let change = reservation::reserve(&dune, "for Alice", Utc::now()).unwrap();

        assert!(books.apply_change(&change).await.unwrap());
        // Same change again: row is no longer in the `from` state
        assert!(!books.apply_change(&change).await.unwrap());

        let stored = books.get_by_id(dune.id).await.unwrap().unwrap();
        assert!(stored.is_reserved);
        assert_eq!(stored.reservation_comment, "for Alice");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let db = setup().await;
        let mut conn = db.connection().await.unwrap();
        let mut books = BookRepository::new(&mut conn);

        let ghost = NewBook::new("Ghost", "Nobody").with_id(7);
        assert!(matches!(
            books.update(&ghost).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(books.delete(7).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_schema_rejects_inconsistent_row() {
        let db = setup().await;
        let mut conn = db.connection().await.unwrap();
        let mut books = BookRepository::new(&mut conn);

        let mut bad = NewBook::new("Dune", "Frank Herbert");
        bad.reservation_comment = "stray".to_string();

        assert!(matches!(
            books.insert(bad).await,
            Err(DbError::ConstraintViolation { .. })
        ));
    }
}
