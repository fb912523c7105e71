//! # Repository Module
//!
//! Database repository implementations for Tiffin.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                          │
//! │       │                                                                 │
//! │       │  db.orders().open_for_table(&tenant, "T1")                     │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create(&self, order, items)                                       │
//! │  ├── get(&self, restaurant_id, id)                                     │
//! │  ├── update_status(&self, ..., from, to)                               │
//! │  └── open_for_table(&self, restaurant_id, table_no)                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Tenant scoping is enforced at one layer                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`restaurant::RestaurantRepository`] - Tenant settings + invoice sequencing
//! - [`table::TableRepository`] - Physical tables and public tokens
//! - [`order::OrderRepository`] - Orders and line items
//! - [`invoice::InvoiceRepository`] - Invoices, payments, settlement

pub mod invoice;
pub mod order;
pub mod restaurant;
pub mod table;
