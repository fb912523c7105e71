//! # tiffin-db: Database Layer for Tiffin
//!
//! This crate provides database access for the Tiffin backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tiffin Data Flow                               │
//! │                                                                         │
//! │  HTTP Handler (POST /api/billing/settle-table)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tiffin-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (order.rs ..) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ InvoiceRepo   │    │ ...          │  │   │
//! │  │   │ Management    │    │ TableRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (restaurant, order, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tiffin_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tiffin.db")).await?;
//!
//! let open = db.orders().open_for_table(&tenant_id, "T1").await?;
//! let invoice_no = db.restaurants().next_invoice_no(&tenant_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::invoice::InvoiceRepository;
pub use repository::order::{OrderFilter, OrderRepository};
pub use repository::restaurant::RestaurantRepository;
pub use repository::table::TableRepository;
