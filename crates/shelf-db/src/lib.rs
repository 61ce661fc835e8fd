//! # shelf-db: Storage and Catalog Service for Shelf
//!
//! This crate provides database access and the catalog use cases.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shelf Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /api/v1/books/1/reserve)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shelf-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐                                           │   │
//! │  │   │ CatalogService │  list, get, add, update, delete,          │   │
//! │  │   │  (catalog.rs)  │  reserve, unreserve, history              │   │
//! │  │   └───────┬────────┘                                           │   │
//! │  │           │ uses shelf_core::reservation for every decision     │   │
//! │  │           ▼                                                     │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  BookRepo     │    │  (embedded)  │  │   │
//! │  │   │   UnitOfWork  │◄───│  HistoryRepo  │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (file, WAL mode)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Storage Port: generic traits and the two repositories
//! - [`unit_of_work`] - Transaction-scoped repository access
//! - [`catalog`] - The use cases
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelf_db::{CatalogService, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("shelf.db")).await?;
//! let catalog = CatalogService::new(db);
//!
//! let books = catalog.list_available().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{CatalogError, CatalogResult, CatalogService, Outcome, Transition};
pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};
pub use repository::{BookRepository, HistoryRepository, MutableRepository, Repository};
pub use unit_of_work::UnitOfWork;
