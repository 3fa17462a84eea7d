//! Metric adapters
//!
//! Portable readings come from `sysinfo`; everything else goes through the
//! [`PlatformProbe`](crate::platform::PlatformProbe). Adapters build their
//! own `sysinfo` handles per call and keep no state between requests.

pub mod cpu;
pub mod memory;
pub mod network;
pub mod power;
pub mod process;
pub mod sampling;
pub mod software;
pub mod storage;
pub mod system;
