//! Synchronous or asynchronous FIFO with optional programmable flags.

use ipgen_core::assemble::{ClockDomain, PortManifest, SubCore, SubCoreFactory};
use ipgen_core::fanout::PortInstance;
use ipgen_core::{Configuration, IpGenerator, ParameterSchema, ParameterSpec, Result};
use semver::Version;

pub struct Fifo;

impl Fifo {
    /// One `sys` domain when synchronous, else independent write and read domains.
    fn domains(&self, synchronous: bool) -> Vec<ClockDomain> {
        if synchronous {
            vec![ClockDomain::new("sys", "clk", "rst")]
        } else {
            vec![
                ClockDomain::new("wr", "wrt_clock", "wrt_rst").drives("wr_clk", "wr_rst"),
                ClockDomain::new("rd", "rd_clock", "rd_rst").drives("rd_clk", "rd_rst"),
            ]
        }
    }

    fn data_ports(&self, config: &Configuration) -> Result<Vec<PortInstance>> {
        let width = config.require_width("data_width")?;
        let mut ports = vec![
            PortInstance::input("din", width),
            PortInstance::output("dout", width),
            PortInstance::input("wr_en", 1).binds_to("wren"),
            PortInstance::input("rd_en", 1).binds_to("rden"),
            PortInstance::output("full", 1),
            PortInstance::output("empty", 1),
            PortInstance::output("underflow", 1),
            PortInstance::output("overflow", 1),
        ];
        if config.require_flag("full_threshold")? {
            ports.push(PortInstance::output("prog_full", 1));
        }
        if config.require_flag("empty_threshold")? {
            ports.push(PortInstance::output("prog_empty", 1));
        }
        Ok(ports)
    }
}

impl IpGenerator for Fifo {
    fn ip_name(&self) -> &'static str {
        "fifo"
    }

    fn description(&self) -> &'static str {
        "Synchronous/asynchronous FIFO"
    }

    fn version(&self) -> Version {
        Version::new(1, 0, 0)
    }

    fn default_build_name(&self) -> &'static str {
        "FIFO_wrapper"
    }

    fn schema(&self) -> Result<ParameterSchema> {
        ParameterSchema::new(
            self.ip_name(),
            vec![
                ParameterSpec::range("data_width", 1, 128, 36).help("FIFO write/read width"),
                ParameterSpec::range("depth", 2, 32768, 1024).help("FIFO depth"),
                ParameterSpec::range("full_value", 1, 4094, 1010)
                    .enabled_when("full_threshold")
                    .help("Programmable full level"),
                ParameterSpec::range("empty_value", 0, 4094, 20)
                    .enabled_when("empty_threshold")
                    .help("Programmable empty level"),
                ParameterSpec::flag("synchronous", true).help("Synchronous / asynchronous clock"),
                ParameterSpec::flag("first_word_fall_through", false).help("First word fall through"),
                ParameterSpec::flag("full_threshold", false).help("Programmable full flag"),
                ParameterSpec::flag("empty_threshold", false).help("Programmable empty flag"),
                ParameterSpec::flag("BRAM", false).help("Block or distributed RAM"),
            ],
        )
    }

    fn manifest(&self, config: &Configuration) -> Result<PortManifest> {
        let synchronous = config.require_flag("synchronous")?;
        Ok(PortManifest::new()
            .ports(self.data_ports(config)?)
            .domains(self.domains(synchronous)))
    }
}

impl SubCoreFactory for Fifo {
    fn instantiate(&self, config: &Configuration) -> Result<SubCore> {
        let width = config.require_width("data_width")?;
        let synchronous = config.require_flag("synchronous")?;
        let full_threshold = config.require_flag("full_threshold")?;
        let empty_threshold = config.require_flag("empty_threshold")?;

        let mut core = SubCore::new("fifo", "fifo")
            .parameter("DATA_WIDTH", i64::from(width))
            .parameter("DEPTH", config.require_int("depth")?)
            .parameter("SYNC", synchronous)
            .parameter("FIRST_WORD_FALL_THROUGH", config.require_flag("first_word_fall_through")?)
            .parameter("FULL_THRESHOLD", full_threshold)
            .parameter("EMPTY_THRESHOLD", empty_threshold);
        if let Some(v) = config.active_int("full_value") {
            core = core.parameter("FULL_VALUE", v);
        }
        if let Some(v) = config.active_int("empty_value") {
            core = core.parameter("EMPTY_VALUE", v);
        }
        core = core.parameter("BRAM", config.require_flag("BRAM")?);

        core = if synchronous {
            core.input("clk", 1).input("rst", 1)
        } else {
            core.input("wr_clk", 1)
                .input("wr_rst", 1)
                .input("rd_clk", 1)
                .input("rd_rst", 1)
        };

        core = core
            .input("din", width)
            .output("dout", width)
            .input("wren", 1)
            .input("rden", 1)
            .output("full", 1)
            .output("empty", 1)
            .output("underflow", 1)
            .output("overflow", 1);
        if full_threshold {
            core = core.output("prog_full", 1);
        }
        if empty_threshold {
            core = core.output("prog_empty", 1);
        }
        Ok(core)
    }
}
