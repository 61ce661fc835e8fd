//! # Unit of Work
//!
//! One SQLite transaction plus the typed repositories bound to it.
//!
//! ```text
//! let mut uow = db.begin().await?;          BEGIN
//! uow.books().apply_change(&change)         UPDATE books ...
//! uow.history().insert(change.entry)        INSERT INTO reservation_history ...
//! uow.commit().await?;                      COMMIT   (both or neither)
//! ```
//!
//! Dropping a `UnitOfWork` without committing rolls everything back.

use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{BookRepository, HistoryRepository};

/// An open transaction with one repository per entity collection.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        UnitOfWork { tx }
    }

    /// Book repository bound to this transaction.
    pub fn books(&mut self) -> BookRepository<'_> {
        BookRepository::new(&mut self.tx)
    }

    /// History repository bound to this transaction.
    pub fn history(&mut self) -> HistoryRepository<'_> {
        HistoryRepository::new(&mut self.tx)
    }

    /// Commits every write made through this unit of work.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Discards every write made through this unit of work.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::Repository;
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use shelf_core::{NewBook, NewHistoryEntry};

    #[tokio::test]
    async fn test_commit_persists_both_writes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        let book = uow
            .books()
            .insert(NewBook::new("Dune", "Frank Herbert"))
            .await
            .unwrap();
        uow.history()
            .insert(NewHistoryEntry {
                book_id: book.id,
                is_reserved: true,
                comment: "for Alice".to_string(),
                changed_at: Utc::now(),
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let mut uow = db.begin().await.unwrap();
        assert_eq!(uow.books().count().await.unwrap(), 1);
        assert_eq!(uow.history().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        uow.books()
            .insert(NewBook::new("Dune", "Frank Herbert"))
            .await
            .unwrap();
        uow.rollback().await.unwrap();

        let mut uow = db.begin().await.unwrap();
        assert_eq!(uow.books().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_drop_without_commit_discards_writes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        {
            let mut uow = db.begin().await.unwrap();
            uow.books()
                .insert(NewBook::new("Dune", "Frank Herbert"))
                .await
                .unwrap();
        }

        let mut conn = db.connection().await.unwrap();
        let mut books = crate::BookRepository::new(&mut conn);
        assert_eq!(books.count().await.unwrap(), 0);
    }
}
