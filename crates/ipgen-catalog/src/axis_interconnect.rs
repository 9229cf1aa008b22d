//! AXI4-Stream crossbar between `s_count` slave and `m_count` master ports.

use ipgen_core::assemble::{ClockDomain, PortManifest, SubCore, SubCoreFactory};
use ipgen_core::fanout::{derive, keep_width, Direction, PortGroup};
use ipgen_core::topology::InterconnectTopology;
use ipgen_core::{Configuration, IpGenerator, ParameterSchema, ParameterSpec, Result};
use semver::Version;

use crate::interfaces;

pub struct AxisInterconnect;

struct Layout {
    topology: InterconnectTopology,
    slaves: Vec<PortGroup>,
    masters: Vec<PortGroup>,
}

impl AxisInterconnect {
    fn layout(&self, config: &Configuration) -> Result<Layout> {
        let s_count = config.require_width("s_count")?;
        let m_count = config.require_width("m_count")?;
        let stream = interfaces::axi_stream().resolve(config)?;
        Ok(Layout {
            topology: InterconnectTopology::new(s_count, m_count),
            slaves: derive(&stream, "s", "_axis", s_count as usize, Direction::Consumer),
            masters: derive(&stream, "m", "_axis", m_count as usize, Direction::Producer),
        })
    }
}

impl IpGenerator for AxisInterconnect {
    fn ip_name(&self) -> &'static str {
        "axis_interconnect"
    }

    fn description(&self) -> &'static str {
        "AXI4-Stream interconnect"
    }

    fn version(&self) -> Version {
        Version::new(1, 0, 0)
    }

    fn default_build_name(&self) -> &'static str {
        "axis_interconnect_wrapper"
    }

    fn schema(&self) -> Result<ParameterSchema> {
        ParameterSchema::new(
            self.ip_name(),
            vec![
                ParameterSpec::choice("data_width", &[8, 16, 32, 64, 128, 256, 512, 1024], 8)
                    .help("Data width"),
                ParameterSpec::flag("last_en", true).help("Last enable"),
                ParameterSpec::flag("id_en", true).help("ID enable"),
                ParameterSpec::flag("dest_en", true).help("Destination enable"),
                ParameterSpec::flag("user_en", true).help("User enable"),
                ParameterSpec::range("s_count", 2, 16, 4).help("Slave interfaces"),
                ParameterSpec::range("m_count", 1, 16, 4).help("Master interfaces"),
                ParameterSpec::range("id_width", 1, 8, 8)
                    .enabled_when("id_en")
                    .help("ID width"),
                ParameterSpec::range("dest_width", 1, 8, 8)
                    .enabled_when("dest_en")
                    .help("Destination width"),
                ParameterSpec::range("user_width", 1, 1024, 1)
                    .enabled_when("user_en")
                    .help("User width"),
            ],
        )
    }

    fn manifest(&self, config: &Configuration) -> Result<PortManifest> {
        let Layout {
            topology,
            slaves,
            masters,
        } = self.layout(config)?;
        Ok(PortManifest::new()
            .domain(ClockDomain::new("sys", "clk", "rst"))
            .groups(slaves)
            .groups(masters)
            .ports(topology.selects))
    }
}

impl SubCoreFactory for AxisInterconnect {
    fn instantiate(&self, config: &Configuration) -> Result<SubCore> {
        let Layout {
            topology,
            slaves,
            masters,
        } = self.layout(config)?;
        let data_width = config.require_width("data_width")?;

        let mut core = SubCore::new("axis_interconnect", "interconnect")
            .parameter("S_COUNT", i64::from(topology.slave_count))
            .parameter("M_COUNT", i64::from(topology.master_count))
            .parameter("DATA_WIDTH", i64::from(data_width))
            .parameter("KEEP_WIDTH", i64::from(keep_width(data_width)))
            .parameter("LAST_ENABLE", config.require_flag("last_en")?);
        for (flag, enable, width, width_param) in [
            ("id_en", "ID_ENABLE", "id_width", "ID_WIDTH"),
            ("dest_en", "DEST_ENABLE", "dest_width", "DEST_WIDTH"),
            ("user_en", "USER_ENABLE", "user_width", "USER_WIDTH"),
        ] {
            core = core.parameter(enable, config.require_flag(flag)?);
            if let Some(w) = config.active_int(width) {
                core = core.parameter(width_param, w);
            }
        }
        core = core
            .parameter("SELECT_WIDTH", i64::from(topology.select_width))
            .input("clk", 1)
            .input("rst", 1);

        let core = slaves.iter().chain(&masters).fold(core, |c, g| c.interface(g));
        Ok(topology
            .selects
            .iter()
            .fold(core, |c, p| c.input(p.name.clone(), p.width)))
    }
}
