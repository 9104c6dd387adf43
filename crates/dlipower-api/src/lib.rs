// dlipower-api: Async Rust client for the Digital Loggers web power switch.
//
// Covers the device's HTTP surface: transport construction, challenge
// login, the retrying fetch loop, and the status page parser. Outlet
// resolution and command fan-out live one layer up in `dlipower-core`.

pub mod auth;
pub mod client;
pub mod error;
pub mod model;
pub mod parser;
pub mod transport;

pub use auth::{Credentials, Scheme, Session};
pub use client::DeviceClient;
pub use error::Error;
pub use model::{OutletRecord, OutletState};
pub use parser::{PageLayout, ParsedPage, parse_status};
pub use transport::TransportConfig;
