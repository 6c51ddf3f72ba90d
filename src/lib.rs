//! Host telemetry daemon: samples processor, memory, network, disk and
//! battery state once per second and streams each reading as one JSON line
//! to a single TCP client.

pub mod config;
pub mod format;
pub mod logging;
pub mod server;
pub mod system;
pub mod wire;
