//! # ticketdesk-core
//!
//! Core types, errors, and utilities shared by the ticketdesk crates.
//!
//! This crate provides:
//! - [`TicketdeskError`] - Error type for configuration, I/O and startup failures
//! - [`logging`] - Tracing setup and log management utilities
//! - [`types`] - Platform identifiers and selectable entity types
//!
//! ## Example
//!
//! ```no_run
//! use ticketdesk_core::{logging, TenantId};
//!
//! fn main() -> ticketdesk_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let tenant: TenantId = "112233445566778899".parse()?;
//!     tracing::info!(%tenant, "ticketdesk started");
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export main types for convenience
pub use error::{Result, TicketdeskError};
pub use logging::{LogGuard, init_logging};
pub use types::{
    AdminId, CategoryId, ChannelId, EntityKind, EntityOption, EntityRef, RoleId, TenantId,
};
