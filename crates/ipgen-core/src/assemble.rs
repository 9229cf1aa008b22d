//! Wrapper assembly: binding a port manifest to an opaque sub-core.
//!
//! Assembly is the second phase of generation. The generator first describes
//! every boundary port as pure data in a [`PortManifest`]; [`assemble`] then
//! binds each port 1:1 to a signal of the sub-core instance in a single pass.
//! Any port without a signal, signal without a port, or signal bound twice is
//! an [`AssemblyError`].

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::config::Configuration;
use crate::error::{AssemblyError, Result};
use crate::fanout::{PortDirection, PortGroup, PortInstance};
use crate::schema::Value;

/// A clock/reset pair driven from the wrapper boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockDomain {
    pub name: String,
    pub clock: PortInstance,
    pub reset: PortInstance,
}

impl ClockDomain {
    /// A domain with 1-bit clock and reset inputs bound to same-named core signals.
    pub fn new(name: impl Into<String>, clock: impl Into<String>, reset: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clock: PortInstance::input(clock, 1),
            reset: PortInstance::input(reset, 1),
        }
    }

    /// Bind the domain to differently named core clock and reset signals.
    pub fn drives(mut self, core_clock: impl Into<String>, core_reset: impl Into<String>) -> Self {
        self.clock = self.clock.binds_to(core_clock);
        self.reset = self.reset.binds_to(core_reset);
        self
    }
}

/// Every boundary port of a wrapper, before binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortManifest {
    domains: Vec<ClockDomain>,
    groups: Vec<PortGroup>,
    ports: Vec<PortInstance>,
}

impl PortManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(mut self, domain: ClockDomain) -> Self {
        self.domains.push(domain);
        self
    }

    pub fn domains(mut self, domains: impl IntoIterator<Item = ClockDomain>) -> Self {
        self.domains.extend(domains);
        self
    }

    pub fn group(mut self, group: PortGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn groups(mut self, groups: impl IntoIterator<Item = PortGroup>) -> Self {
        self.groups.extend(groups);
        self
    }

    pub fn port(mut self, port: PortInstance) -> Self {
        self.ports.push(port);
        self
    }

    pub fn ports(mut self, ports: impl IntoIterator<Item = PortInstance>) -> Self {
        self.ports.extend(ports);
        self
    }

    /// All ports: domain clocks and resets, then groups, then scalar ports.
    pub fn iter_ports(&self) -> impl Iterator<Item = &PortInstance> {
        ordered_ports(&self.domains, &self.groups, &self.ports)
    }
}

fn ordered_ports<'a>(
    domains: &'a [ClockDomain],
    groups: &'a [PortGroup],
    ports: &'a [PortInstance],
) -> impl Iterator<Item = &'a PortInstance> {
    domains
        .iter()
        .flat_map(|d| [&d.clock, &d.reset])
        .chain(groups.iter().flat_map(|g| g.ports.iter()))
        .chain(ports.iter())
}

/// A signal of the sub-core, seen from the sub-core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreSignal {
    pub name: String,
    pub width: u32,
    pub direction: PortDirection,
}

/// Opaque handle of the core instantiated inside a wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubCore {
    pub module: String,
    pub instance: String,
    pub parameters: Vec<(String, Value)>,
    pub signals: Vec<CoreSignal>,
}

impl SubCore {
    pub fn new(module: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            instance: instance.into(),
            parameters: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn input(mut self, name: impl Into<String>, width: u32) -> Self {
        self.signals.push(CoreSignal {
            name: name.into(),
            width,
            direction: PortDirection::Input,
        });
        self
    }

    pub fn output(mut self, name: impl Into<String>, width: u32) -> Self {
        self.signals.push(CoreSignal {
            name: name.into(),
            width,
            direction: PortDirection::Output,
        });
        self
    }

    /// Expose one signal per port of `group`, under the port's name.
    pub fn interface(mut self, group: &PortGroup) -> Self {
        self.signals.extend(group.ports.iter().map(|p| CoreSignal {
            name: p.name.clone(),
            width: p.width,
            direction: p.direction,
        }));
        self
    }
}

/// Produces the sub-core instance for a configuration.
pub trait SubCoreFactory {
    fn instantiate(&self, config: &Configuration) -> Result<SubCore>;
}

/// One port ↔ sub-core signal connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub port: String,
    pub signal: String,
}

/// A fully bound wrapper module. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrapperModule {
    name: String,
    domains: Vec<ClockDomain>,
    groups: Vec<PortGroup>,
    ports: Vec<PortInstance>,
    core: SubCore,
    bindings: Vec<Binding>,
}

impl WrapperModule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domains(&self) -> &[ClockDomain] {
        &self.domains
    }

    pub fn domain(&self, name: &str) -> Option<&ClockDomain> {
        self.domains.iter().find(|d| d.name == name)
    }

    pub fn groups(&self) -> &[PortGroup] {
        &self.groups
    }

    /// Scalar ports outside any domain or group.
    pub fn ports(&self) -> &[PortInstance] {
        &self.ports
    }

    pub fn core(&self) -> &SubCore {
        &self.core
    }

    /// Bindings in port order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Every boundary port in declaration order.
    pub fn all_ports(&self) -> impl Iterator<Item = &PortInstance> {
        ordered_ports(&self.domains, &self.groups, &self.ports)
    }

    pub fn port(&self, name: &str) -> Option<&PortInstance> {
        self.all_ports().find(|p| p.name == name)
    }

    pub fn port_count(&self) -> usize {
        self.all_ports().count()
    }
}

/// Bind `manifest` to the sub-core produced by `factory`.
pub fn assemble<F: SubCoreFactory + ?Sized>(
    name: &str,
    config: &Configuration,
    manifest: PortManifest,
    factory: &F,
) -> Result<WrapperModule> {
    let core = factory.instantiate(config)?;

    let mut signals = BTreeMap::new();
    for s in &core.signals {
        if signals.insert(s.name.as_str(), s).is_some() {
            return Err(AssemblyError::DuplicateSignal {
                core: core.module.clone(),
                signal: s.name.clone(),
            }
            .into());
        }
    }

    let mut seen = BTreeSet::new();
    let mut drivers: BTreeMap<&str, &str> = BTreeMap::new();
    let mut bindings = Vec::new();
    for port in manifest.iter_ports() {
        if !seen.insert(port.name.as_str()) {
            return Err(AssemblyError::DuplicatePort {
                port: port.name.clone(),
            }
            .into());
        }
        let signal: &CoreSignal = *signals
            .get(port.binds_to.as_str())
            .ok_or_else(|| AssemblyError::UnboundPort {
                port: port.name.clone(),
                signal: port.binds_to.clone(),
                core: core.module.clone(),
            })?;
        if let Some(first) = drivers.insert(signal.name.as_str(), port.name.as_str()) {
            return Err(AssemblyError::Redriven {
                signal: signal.name.clone(),
                first: first.to_string(),
                second: port.name.clone(),
            }
            .into());
        }
        if signal.width != port.width {
            return Err(AssemblyError::WidthMismatch {
                port: port.name.clone(),
                port_width: port.width,
                signal: signal.name.clone(),
                signal_width: signal.width,
            }
            .into());
        }
        if signal.direction != port.direction {
            return Err(AssemblyError::DirectionMismatch {
                port: port.name.clone(),
                signal: signal.name.clone(),
            }
            .into());
        }
        bindings.push(Binding {
            port: port.name.clone(),
            signal: signal.name.clone(),
        });
    }

    if let Some(s) = core
        .signals
        .iter()
        .find(|s| !drivers.contains_key(s.name.as_str()))
    {
        return Err(AssemblyError::UnboundSignal {
            core: core.module.clone(),
            signal: s.name.clone(),
        }
        .into());
    }

    debug!(
        module = name,
        core = %core.module,
        ports = bindings.len(),
        domains = manifest.domains.len(),
        "assembled wrapper"
    );

    Ok(WrapperModule {
        name: name.to_string(),
        domains: manifest.domains,
        groups: manifest.groups,
        ports: manifest.ports,
        core,
        bindings,
    })
}
