//! Memory information collection

use sysinfo::System;

use crate::types::{percent_of, round2, ByteSize, MemorySnapshot, Metric, ProcessRecord, SwapUsage};

pub fn used_percent(used: u64, total: u64) -> Metric<f64> {
    Metric::from_option(
        percent_of(used, total).map(round2),
        "total memory not reported",
    )
}

/// Get memory (RAM and swap) information
pub fn memory_snapshot(sys: &System, top_processes: Option<Vec<ProcessRecord>>) -> MemorySnapshot {
    let total = sys.total_memory();
    let used = sys.used_memory();
    let swap_total = sys.total_swap();
    let swap_used = sys.used_swap();

    MemorySnapshot {
        total: ByteSize::new(total),
        used: ByteSize::new(used),
        available: ByteSize::new(sys.available_memory()),
        free: ByteSize::new(sys.free_memory()),
        used_percent: used_percent(used, total),
        swap: SwapUsage {
            total: ByteSize::new(swap_total),
            used: ByteSize::new(swap_used),
            free: ByteSize::new(sys.free_swap()),
            used_percent: Metric::from_option(
                percent_of(swap_used, swap_total).map(round2),
                "no swap configured",
            ),
        },
        top_processes,
    }
}
