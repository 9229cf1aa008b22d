//! Dual-port RAM behind two independent AXI4 slave ports.

use ipgen_core::assemble::{ClockDomain, PortManifest, SubCore, SubCoreFactory};
use ipgen_core::fanout::{Direction, PortGroup};
use ipgen_core::{Configuration, IpGenerator, ParameterSchema, ParameterSpec, Result};
use semver::Version;

use crate::interfaces;

pub struct AxiDpram;

impl AxiDpram {
    fn ports(&self, config: &Configuration) -> Result<[PortGroup; 2]> {
        let axi = interfaces::axi4(false).resolve(config)?;
        Ok([
            PortGroup::single(&axi, "s_axi_a", Direction::Consumer),
            PortGroup::single(&axi, "s_axi_b", Direction::Consumer),
        ])
    }
}

/// Memory size in bytes: `2^addr_width * data_width / 8`.
fn size(addr_width: u32, data_width: u32) -> i64 {
    (1_i64 << addr_width) * i64::from(data_width / 8)
}

impl IpGenerator for AxiDpram {
    fn ip_name(&self) -> &'static str {
        "axi_dpram"
    }

    fn description(&self) -> &'static str {
        "AXI4 dual-port RAM"
    }

    fn version(&self) -> Version {
        Version::new(1, 0, 0)
    }

    fn default_build_name(&self) -> &'static str {
        "axi_dpram_wrapper"
    }

    fn schema(&self) -> Result<ParameterSchema> {
        ParameterSchema::new(
            self.ip_name(),
            vec![
                ParameterSpec::choice("data_width", &[8, 16, 32, 64, 128, 256], 32)
                    .help("DPRAM data width"),
                ParameterSpec::range("addr_width", 8, 16, 16).help("DPRAM address width"),
                ParameterSpec::range("id_width", 1, 32, 32).help("DPRAM ID width"),
                ParameterSpec::range("a_pip_out", 0, 1, 0).help("Port A pipeline output"),
                ParameterSpec::range("b_pip_out", 0, 1, 0).help("Port B pipeline output"),
                ParameterSpec::range("a_interleave", 0, 1, 0).help("Port A interleave"),
                ParameterSpec::range("b_interleave", 0, 1, 0).help("Port B interleave"),
            ],
        )
    }

    fn manifest(&self, config: &Configuration) -> Result<PortManifest> {
        Ok(PortManifest::new()
            .domain(ClockDomain::new("a", "a_clk", "a_rst"))
            .domain(ClockDomain::new("b", "b_clk", "b_rst"))
            .groups(self.ports(config)?))
    }
}

impl SubCoreFactory for AxiDpram {
    fn instantiate(&self, config: &Configuration) -> Result<SubCore> {
        let data_width = config.require_width("data_width")?;
        let addr_width = config.require_width("addr_width")?;
        let [a, b] = self.ports(config)?;
        Ok(SubCore::new("axi_dpram", "dpram")
            .parameter("DATA_WIDTH", i64::from(data_width))
            .parameter("ADDR_WIDTH", i64::from(addr_width))
            .parameter("ID_WIDTH", config.require_int("id_width")?)
            .parameter("A_PIPELINE_OUTPUT", config.require_int("a_pip_out")?)
            .parameter("B_PIPELINE_OUTPUT", config.require_int("b_pip_out")?)
            .parameter("A_INTERLEAVE", config.require_int("a_interleave")?)
            .parameter("B_INTERLEAVE", config.require_int("b_interleave")?)
            .parameter("SIZE", size(addr_width, data_width))
            .input("a_clk", 1)
            .input("a_rst", 1)
            .input("b_clk", 1)
            .input("b_rst", 1)
            .interface(&a)
            .interface(&b))
    }
}

#[cfg(test)]
mod tests {
    use ipgen_core::fanout::PortDirection;
    use ipgen_core::pipeline::generate;
    use ipgen_core::{RawConfig, Value};

    use super::*;

    fn config(pairs: &[(&str, Value)]) -> RawConfig {
        AxiDpram.schema().unwrap().overlay(pairs.iter().map(|(k, v)| (k.to_string(), *v)))
    }

    #[test]
    fn memory_size() {
        assert_eq!(size(16, 32), 262_144);
        assert_eq!(size(8, 8), 256);
        assert_eq!(size(16, 256), 2_097_152);
    }

    #[test]
    fn two_independent_domains() {
        let g = generate(&AxiDpram, &config(&[]), "axi_dpram_wrapper").unwrap();
        let m = &g.module;
        assert_eq!(m.domains().len(), 2);
        assert_eq!(m.domain("a").unwrap().clock.binds_to, "a_clk");
        assert_eq!(m.domain("b").unwrap().clock.binds_to, "b_clk");
        assert_eq!(m.groups().len(), 2);
        assert_eq!(m.port("s_axi_a_awaddr").unwrap().width, 16);
        assert_eq!(m.port("s_axi_b_wstrb").unwrap().width, 4);
        assert_eq!(m.port("s_axi_a_rdata").unwrap().direction, PortDirection::Output);
        assert!(m.port("s_axi_a_awuser").is_none());
    }

    #[test]
    fn size_parameter_follows_widths() {
        let raw = config(&[("data_width", Value::Int(64)), ("addr_width", Value::Int(10))]);
        let g = generate(&AxiDpram, &raw, "dpram").unwrap();
        let size = g
            .module
            .core()
            .parameters
            .iter()
            .find(|(k, _)| k == "SIZE")
            .map(|(_, v)| *v);
        assert_eq!(size, Some(Value::Int(8192)));
    }
}
