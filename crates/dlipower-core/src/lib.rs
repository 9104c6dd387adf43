//! Outlet-level operations for Digital Loggers web power switches.
//!
//! Sits between `dlipower-api` (raw HTTP and page parsing) and the CLI:
//!
//! - **[`PowerSwitch`]**: facade owning the device client. Resolves outlet
//!   names and numbers, confirms every mutation with a fresh status read,
//!   and fans a [`Command`] out over several outlets with
//!   [`apply`](PowerSwitch::apply).
//!
//! - **[`Outlet`]**: a handle borrowing the switch, for code that walks
//!   the outlet list.
//!
//! - **[`SwitchConfig`]**: connection settings. Core never reads config
//!   files; `dlipower-config` builds this.

pub mod command;
pub mod config;
pub mod error;
pub mod outlet;
pub mod resolver;
pub mod switch;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandOutcome, CommandResult};
pub use config::SwitchConfig;
pub use error::CoreError;
pub use outlet::Outlet;
pub use resolver::{OutletSelector, resolve};
pub use switch::PowerSwitch;

pub use dlipower_api::{Credentials, OutletRecord, OutletState, Scheme};
