//! # Reservation History Repository
//!
//! Append-only log of reservation transitions. There is no update or delete
//! here, and the schema rejects both with triggers.

use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::debug;

use shelf_core::{NewHistoryEntry, ReservationHistoryEntry};

use super::Repository;
use crate::error::DbResult;

const HISTORY_COLUMNS: &str = "id, book_id, is_reserved, comment, changed_at";

/// Repository for reservation history rows, bound to one connection.
#[derive(Debug)]
pub struct HistoryRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> HistoryRepository<'c> {
    /// Creates a HistoryRepository over a borrowed connection.
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        HistoryRepository { conn }
    }

    /// All entries for one book, oldest first (`changed_at`, then `id`).
    ///
    /// Works for ids whose book has been deleted.
    pub async fn find_by_book_id(&mut self, book_id: i64) -> DbResult<Vec<ReservationHistoryEntry>> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM reservation_history \
             WHERE book_id = ?1 ORDER BY changed_at, id"
        );
        let entries = sqlx::query_as::<_, ReservationHistoryEntry>(&sql)
            .bind(book_id)
            .fetch_all(&mut *self.conn)
            .await?;

        debug!(book_id, count = entries.len(), "Loaded reservation history");
        Ok(entries)
    }
}

#[async_trait]
impl<'c> Repository<ReservationHistoryEntry> for HistoryRepository<'c> {
    type Id = i64;
    type New = NewHistoryEntry;

    async fn get_by_id(&mut self, id: i64) -> DbResult<Option<ReservationHistoryEntry>> {
        let sql = format!("SELECT {HISTORY_COLUMNS} FROM reservation_history WHERE id = ?1");
        let entry = sqlx::query_as::<_, ReservationHistoryEntry>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(entry)
    }

    async fn list_all(&mut self) -> DbResult<Vec<ReservationHistoryEntry>> {
        let sql = format!("SELECT {HISTORY_COLUMNS} FROM reservation_history ORDER BY changed_at, id");
        let entries = sqlx::query_as::<_, ReservationHistoryEntry>(&sql)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(entries)
    }

    /// Appends one entry.
    async fn insert(&mut self, new: NewHistoryEntry) -> DbResult<ReservationHistoryEntry> {
        debug!(
            book_id = new.book_id,
            is_reserved = new.is_reserved,
            "Appending reservation history"
        );

        let id = sqlx::query(
            r#"
            INSERT INTO reservation_history (book_id, is_reserved, comment, changed_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(new.book_id)
        .bind(new.is_reserved)
        .bind(&new.comment)
        .bind(new.changed_at)
        .execute(&mut *self.conn)
        .await?
        .last_insert_rowid();

        Ok(new.with_id(id))
    }

    async fn count(&mut self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservation_history")
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn entry(book_id: i64, is_reserved: bool, comment: &str, secs: i64) -> NewHistoryEntry {
        NewHistoryEntry {
            book_id,
            is_reserved,
            comment: comment.to_string(),
            changed_at: at(secs),
        }
    }

    #[tokio::test]
    async fn test_find_by_book_id_filters_and_orders() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.connection().await.unwrap();
        let mut history = HistoryRepository::new(&mut conn);

        // Inserted out of time order on purpose
        history.insert(entry(1, false, "Unreserved", 20)).await.unwrap();
        history.insert(entry(2, true, "other book", 5)).await.unwrap();
        history.insert(entry(1, true, "for Alice", 10)).await.unwrap();

        let entries = history.find_by_book_id(1).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].comment, "for Alice");
        assert_eq!(entries[0].changed_at, at(10));
        assert_eq!(entries[1].comment, "Unreserved");
        assert!(entries.iter().all(|e| e.book_id == 1));

        assert_eq!(history.count().await.unwrap(), 3);
        assert!(history.find_by_book_id(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_timestamp_ordered_by_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.connection().await.unwrap();
        let mut history = HistoryRepository::new(&mut conn);

        let first = history.insert(entry(1, true, "a", 0)).await.unwrap();
        let second = history.insert(entry(1, false, "b", 0)).await.unwrap();

        let ids: Vec<i64> = history
            .find_by_book_id(1)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(history.get_by_id(second.id).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_history_rows_cannot_be_edited() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.connection().await.unwrap();
        HistoryRepository::new(&mut conn)
            .insert(entry(1, true, "for Alice", 0))
            .await
            .unwrap();

        let result = sqlx::query("DELETE FROM reservation_history")
            .execute(&mut *conn)
            .await
            .map_err(DbError::from);
        assert!(matches!(result, Err(DbError::ConstraintViolation { .. })));
    }

    #[tokio::test]
    async fn test_history_outlives_deleted_book() {
        use crate::repository::{BookRepository, MutableRepository};
        use shelf_core::NewBook;

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.connection().await.unwrap();

        let book = BookRepository::new(&mut conn)
            .insert(NewBook::new("Dune", "Frank Herbert"))
            .await
            .unwrap();
        HistoryRepository::new(&mut conn)
            .insert(entry(book.id, true, "for Alice", 0))
            .await
            .unwrap();

        BookRepository::new(&mut conn).delete(book.id).await.unwrap();

        let entries = HistoryRepository::new(&mut conn)
            .find_by_book_id(book.id)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);

        let result = sqlx::query("UPDATE reservation_history SET comment = 'edited'")
            .execute(&mut *conn)
            .await
            .map_err(DbError::from);
        assert!(matches!(result, Err(DbError::ConstraintViolation { .. })));
    }
}
