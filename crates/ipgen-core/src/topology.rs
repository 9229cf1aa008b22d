//! Interconnect topology: counts, select width and per-master select ports.

use serde::Serialize;

use crate::fanout::{port_name, select_width, PortInstance};

/// Derived shape of an N-slave, M-master interconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterconnectTopology {
    pub slave_count: u32,
    pub master_count: u32,
    pub select_width: u32,
    /// One select input per addressed master, `m<NN>_select`.
    pub selects: Vec<PortInstance>,
}

impl InterconnectTopology {
    pub fn new(slave_count: u32, master_count: u32) -> Self {
        let select_width = select_width(slave_count);
        let count = master_count as usize;
        let selects = (0..count)
            .map(|i| PortInstance::input(format!("{}_select", port_name("m", i, count)), select_width))
            .collect();
        Self {
            slave_count,
            master_count,
            select_width,
            selects,
        }
    }
}
