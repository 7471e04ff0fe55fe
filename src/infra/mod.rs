//! Infrastructure adapters: the HTTP content client and telemetry.

pub mod client;
pub mod telemetry;
