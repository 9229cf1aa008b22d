//! The IP generators shipped with ipgen.
//!
//! Each generator owns its parameter schema, port manifest and sub-core
//! description; everything else comes from `ipgen-core`.

pub mod axi_dpram;
pub mod axi_spi_slave;
pub mod axis_interconnect;
pub mod fifo;
pub mod interfaces;

use ipgen_core::IpGenerator;

pub use axi_dpram::AxiDpram;
pub use axi_spi_slave::AxiSpiSlave;
pub use axis_interconnect::AxisInterconnect;
pub use fifo::Fifo;

/// Every generator, in name order.
pub fn catalog() -> Vec<Box<dyn IpGenerator>> {
    vec![
        Box::new(AxiDpram),
        Box::new(AxiSpiSlave),
        Box::new(AxisInterconnect),
        Box::new(Fifo),
    ]
}

/// Look up a generator by its [`IpGenerator::ip_name`].
pub fn find(name: &str) -> Option<Box<dyn IpGenerator>> {
    let found = catalog().into_iter().find(|g| g.ip_name() == name);
    if found.is_none() {
        tracing::debug!(name, "no such generator");
    }
    found
}
