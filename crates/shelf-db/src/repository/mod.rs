//! # Repository Module
//!
//! Storage Port for Shelf: one typed repository per entity collection.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CatalogService                                                        │
//! │       │                                                                 │
//! │       │  uow.books().get_by_id(1)                                      │
//! │       ▼                                                                 │
//! │  Repository<E>            (every entity)                               │
//! │  ├── get_by_id(id)                                                     │
//! │  ├── list_all()                                                        │
//! │  └── insert(new)                                                       │
//! │                                                                         │
//! │  MutableRepository<E>     (books only, history is append-only)         │
//! │  ├── update(entity)                                                    │
//! │  └── delete(id)                                                        │
//! │                                                                         │
//! │  Named queries live on the concrete repositories:                      │
//! │  ├── BookRepository::list_by_reservation(bool)                         │
//! │  ├── BookRepository::apply_change(&ReservationChange)                  │
//! │  └── HistoryRepository::find_by_book_id(id)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  &mut SqliteConnection (a pooled connection or an open transaction)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories borrow a connection rather than owning the pool, so the same
//! repository code runs inside a [`UnitOfWork`](crate::UnitOfWork) or on a
//! plain read connection.
//!
//! ## Available Repositories
//!
//! - [`BookRepository`] - Book CRUD and guarded state changes
//! - [`HistoryRepository`] - Append-only reservation log

pub mod book;
pub mod history;

pub use book::BookRepository;
pub use history::HistoryRepository;

use async_trait::async_trait;

use crate::error::DbResult;

/// Read and append access to one entity collection.
#[async_trait]
pub trait Repository<E: Send + Sync>: Send {
    /// Identity type of the entity.
    type Id: Send + Sync + Copy + std::fmt::Display;

    /// Insert shape (entity without storage-assigned fields).
    type New: Send;

    /// Looks up one entity. `Ok(None)` when absent.
    async fn get_by_id(&mut self, id: Self::Id) -> DbResult<Option<E>>;

    /// Every entity, in storage-native order.
    async fn list_all(&mut self) -> DbResult<Vec<E>>;

    /// Inserts and returns the stored entity with its assigned id.
    async fn insert(&mut self, new: Self::New) -> DbResult<E>;

    /// Number of stored entities.
    async fn count(&mut self) -> DbResult<i64>;
}

/// Full-record replacement and removal, for collections that allow it.
#[async_trait]
pub trait MutableRepository<E: Send + Sync>: Repository<E> {
    /// Replaces the stored record. `DbError::NotFound` if absent.
    async fn update(&mut self, entity: &E) -> DbResult<()>;

    /// Removes the record. `DbError::NotFound` if absent.
    async fn delete(&mut self, id: Self::Id) -> DbResult<()>;
}
