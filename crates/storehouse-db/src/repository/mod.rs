//! # Repository Module
//!
//! Database repository implementations for Storehouse.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(42)                                    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── create / get_by_id / list / update / deactivate                    │
//! │  └── find_in / decrement_stock / increment_stock / set_stock            │
//! │       │                      ▲                                          │
//! │       │  SQL                 └── used on the engine's transaction       │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pool-level methods take `&self`; helpers that must join a caller's
//! transaction are associated functions taking `&mut SqliteConnection`.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and stock helpers
//! - [`CategoryRepository`](category::CategoryRepository) - Product categories
//! - [`CustomerRepository`](directory::CustomerRepository) / [`SupplierRepository`](directory::SupplierRepository) - Directories
//! - [`StockRepository`](stock::StockRepository) - Ledger, adjustments, inventory views
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Sales and purchases read side

pub mod category;
pub mod directory;
pub mod invoice;
pub mod product;
pub mod stock;
