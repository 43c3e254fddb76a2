//! # ticketdesk-store
//!
//! Durable ticket-system settings, one record per tenant.
//!
//! This crate provides:
//! - [`SettingsStore`] - The read/upsert contract the wizard engine writes through
//! - [`SqliteSettingsStore`] - SQLite storage with versioned migrations
//! - [`MemorySettingsStore`] - In-process implementation for tests and dry runs
//!
//! Upserts are partial: fields missing from a [`SettingsPatch`] keep their
//! stored value, and a tenant without a row gets one with nulls elsewhere.
//!
//! ## Example
//!
//! ```no_run
//! use ticketdesk_core::{CategoryId, TenantId};
//! use ticketdesk_store::{SettingsPatch, SettingsStore, SqliteSettingsStore};
//!
//! #[tokio::main]
//! async fn main() -> ticketdesk_store::Result<()> {
//!     let store = SqliteSettingsStore::open("ticket_settings.db")?;
//!
//!     let tenant = TenantId(112233);
//!     store.upsert(tenant, &SettingsPatch::new().category(CategoryId(42))).await?;
//!
//!     let settings = store.read(tenant).await?;
//!     println!("{:?}", settings);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod sqlite;
pub mod store;

// Re-export main types
pub use error::{Result, StoreError};
pub use memory::MemorySettingsStore;
pub use models::{SettingsPatch, TenantSettings};
pub use sqlite::SqliteSettingsStore;
pub use store::SettingsStore;
