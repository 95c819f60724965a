//! Persistence for Storehouse.
//!
//! [`Database`] owns a sqlx SQLite pool and hands out one repository per
//! table group. Everything that moves stock goes through a single
//! transaction:
//!
//! ```text
//! POST /api/sales ──► InvoiceEngine::create ──► BEGIN
//!                                               ├─ insert invoice + lines
//!                                               ├─ apply stock deltas
//!                                               ├─ append ledger rows
//!                                               └─ COMMIT (or ROLLBACK)
//! ```
//!
//! Reads (`sales()`, `purchases()`, `products()`, `stock()`) go straight to
//! the pool. The schema lives in `migrations/sqlite/` and is applied on
//! [`Database::new`].
//!
//! ```rust,ignore
//! use storehouse_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storehouse.db")).await?;
//! let created = db.engine().create(&draft).await?;
//! let sale = db.sales().get_by_id(created.id).await?;
//! ```

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use engine::{CreatedInvoice, InvoiceEngine};
pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::directory::{CustomerRepository, SupplierRepository};
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::stock::{
    AdjustmentOutcome, MovementFilter, MovementPage, MovementSummary, PageRequest,
    StockReport, StockRepository,
};
