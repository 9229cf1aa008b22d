//! SPI slave bridging to an AXI4 master port.

use ipgen_core::assemble::{ClockDomain, PortManifest, SubCore, SubCoreFactory};
use ipgen_core::fanout::{Direction, PortGroup, PortInstance};
use ipgen_core::{Configuration, IpGenerator, ParameterSchema, ParameterSpec, Result};
use semver::Version;

use crate::interfaces;

pub struct AxiSpiSlave;

struct Buses {
    axi: PortGroup,
    spi: PortGroup,
}

impl AxiSpiSlave {
    fn buses(&self, config: &Configuration) -> Result<Buses> {
        let axi = interfaces::axi4(true).resolve(config)?;
        let spi = interfaces::spi().resolve(config)?;
        Ok(Buses {
            axi: PortGroup::single(&axi, "axi_master", Direction::Producer),
            spi: PortGroup::single(&spi, "spi", Direction::Consumer),
        })
    }
}

impl IpGenerator for AxiSpiSlave {
    fn ip_name(&self) -> &'static str {
        "axi_spi_slave"
    }

    fn description(&self) -> &'static str {
        "SPI slave with AXI4 master port"
    }

    fn version(&self) -> Version {
        Version::new(1, 0, 0)
    }

    fn default_build_name(&self) -> &'static str {
        "axi_spi_slave_wrapper"
    }

    fn schema(&self) -> Result<ParameterSchema> {
        ParameterSchema::new(
            self.ip_name(),
            vec![
                ParameterSpec::choice("addr_width", &[8, 16, 32, 64], 32).help("Address width"),
                ParameterSpec::choice("data_width", &[8, 16, 32, 64], 64).help("Data width"),
                ParameterSpec::range("user_width", 1, 8, 6).help("User width"),
                ParameterSpec::range("id_width", 1, 16, 3).help("ID width"),
                ParameterSpec::choice("dummy_cycles", &[16, 32], 32).help("Dummy cycles"),
            ],
        )
    }

    fn manifest(&self, config: &Configuration) -> Result<PortManifest> {
        let Buses { axi, spi } = self.buses(config)?;
        Ok(PortManifest::new()
            .domain(ClockDomain::new("sys", "axi_aclk", "axi_aresetn"))
            .group(axi)
            .group(spi)
            .port(PortInstance::input("test_mode", 1)))
    }
}

impl SubCoreFactory for AxiSpiSlave {
    fn instantiate(&self, config: &Configuration) -> Result<SubCore> {
        let Buses { axi, spi } = self.buses(config)?;
        Ok(SubCore::new("axi_spi_slave", "spi_slave")
            .parameter("AXI_ADDR_WIDTH", config.require_int("addr_width")?)
            .parameter("AXI_DATA_WIDTH", config.require_int("data_width")?)
            .parameter("AXI_USER_WIDTH", config.require_int("user_width")?)
            .parameter("AXI_ID_WIDTH", config.require_int("id_width")?)
            .parameter("DUMMY_CYCLES", config.require_int("dummy_cycles")?)
            .input("axi_aclk", 1)
            .input("axi_aresetn", 1)
            .interface(&axi)
            .interface(&spi)
            .input("test_mode", 1))
    }
}
