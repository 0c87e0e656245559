//! Value types shared by the rule store, the detector client, the engine and
//! the HTTP server.

pub mod metric;
pub mod monitor;
pub mod types;
