//! Snapshot, finding and envelope types

mod application;
mod availability;
mod battery;
mod category;
mod cpu;
mod diagnosis;
mod finding;
mod logs;
mod memory;
mod motherboard;
mod network;
mod process;
mod storage;
mod system;
mod units;

pub use application::*;
pub use availability::*;
pub use battery::*;
pub use category::*;
pub use cpu::*;
pub use diagnosis::*;
pub use finding::*;
pub use logs::*;
pub use memory::*;
pub use motherboard::*;
pub use network::*;
pub use process::*;
pub use storage::*;
pub use system::*;
pub use units::*;
