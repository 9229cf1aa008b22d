//! Port fan-out: interface templates expanded into named, sized port groups.
//!
//! Fan-out runs in two steps. [`InterfaceTemplate::resolve`] evaluates every
//! symbolic width against a configuration and drops signals whose presence flag
//! is off; [`derive`] then repeats the resolved interface `count` times with
//! deterministic names.

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::error::AssemblyError;

/// Role of an interface instance on the wrapper boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Drives the interface (master).
    Producer,
    /// Receives the interface (slave).
    Consumer,
}

/// Signal flow relative to the interface's producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    /// Producer to consumer (valid, data, address...).
    Forward,
    /// Consumer to producer (ready, response...).
    Reverse,
}

/// Direction of a port on the wrapper module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl Direction {
    /// Boundary direction of a signal with the given flow.
    pub fn port_direction(self, flow: Flow) -> PortDirection {
        match (self, flow) {
            (Direction::Producer, Flow::Forward) | (Direction::Consumer, Flow::Reverse) => {
                PortDirection::Output
            }
            (Direction::Producer, Flow::Reverse) | (Direction::Consumer, Flow::Forward) => {
                PortDirection::Input
            }
        }
    }
}

/// Symbolic signal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidthExpr {
    Const(u32),
    /// The value of an integer field.
    Field(String),
    /// `ceil(field / 8)`: byte-enable width of a data bus.
    Keep(String),
    /// `ceil(log2(max(field, 2)))`: select width for `field` targets.
    Select(String),
}

impl WidthExpr {
    pub fn field(name: impl Into<String>) -> Self {
        WidthExpr::Field(name.into())
    }

    pub fn keep(name: impl Into<String>) -> Self {
        WidthExpr::Keep(name.into())
    }

    pub fn select(name: impl Into<String>) -> Self {
        WidthExpr::Select(name.into())
    }

    /// Evaluate against `config`. Inert fields cannot size a signal.
    pub fn eval(&self, config: &Configuration) -> Result<u32, (String, String)> {
        let name = match self {
            WidthExpr::Const(w) => return Ok(*w),
            WidthExpr::Field(name) | WidthExpr::Keep(name) | WidthExpr::Select(name) => name,
        };
        let fail = |detail: &str| (name.clone(), detail.to_string());
        if config.is_inert(name) {
            return Err(fail("field is disabled"));
        }
        let value = config
            .int(name)
            .ok_or_else(|| fail("not an integer field of this configuration"))?;
        let value = u32::try_from(value).map_err(|_| fail("value does not fit a width"))?;
        Ok(match self {
            WidthExpr::Keep(_) => keep_width(value),
            WidthExpr::Select(_) => select_width(value),
            _ => value,
        })
    }
}

/// One signal of an interface template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalTemplate {
    pub name: String,
    pub width: WidthExpr,
    pub flow: Flow,
    /// Boolean field that must be `true` for the signal to exist.
    pub present_when: Option<String>,
}

impl SignalTemplate {
    pub fn forward(name: impl Into<String>, width: WidthExpr) -> Self {
        Self {
            name: name.into(),
            width,
            flow: Flow::Forward,
            present_when: None,
        }
    }

    pub fn reverse(name: impl Into<String>, width: WidthExpr) -> Self {
        Self {
            name: name.into(),
            width,
            flow: Flow::Reverse,
            present_when: None,
        }
    }

    pub fn when(mut self, flag: impl Into<String>) -> Self {
        self.present_when = Some(flag.into());
        self
    }
}

/// A named collection of signal templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceTemplate {
    pub name: String,
    pub signals: Vec<SignalTemplate>,
}

impl InterfaceTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals: Vec::new(),
        }
    }

    pub fn signal(mut self, signal: SignalTemplate) -> Self {
        self.signals.push(signal);
        self
    }

    /// Evaluate widths and presence conditions against `config`.
    pub fn resolve(&self, config: &Configuration) -> Result<ResolvedInterface, AssemblyError> {
        let mut signals = Vec::with_capacity(self.signals.len());
        for s in &self.signals {
            if let Some(flag) = &s.present_when {
                match config.flag(flag) {
                    Some(true) => {}
                    Some(false) => continue,
                    None => {
                        return Err(AssemblyError::TemplateField {
                            interface: self.name.clone(),
                            signal: s.name.clone(),
                            field: flag.clone(),
                            detail: "not a boolean field of this configuration".into(),
                        })
                    }
                }
            }
            let width = s.width.eval(config).map_err(|(field, detail)| {
                AssemblyError::TemplateField {
                    interface: self.name.clone(),
                    signal: s.name.clone(),
                    field,
                    detail,
                }
            })?;
            if width == 0 {
                return Err(AssemblyError::TemplateField {
                    interface: self.name.clone(),
                    signal: s.name.clone(),
                    field: String::new(),
                    detail: "width evaluates to zero".into(),
                });
            }
            signals.push(ResolvedSignal {
                name: s.name.clone(),
                width,
                flow: s.flow,
            });
        }
        Ok(ResolvedInterface {
            name: self.name.clone(),
            signals,
        })
    }
}

/// A signal with a concrete width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSignal {
    pub name: String,
    pub width: u32,
    pub flow: Flow,
}

/// An interface template resolved against one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInterface {
    pub name: String,
    pub signals: Vec<ResolvedSignal>,
}

/// A concrete port on the wrapper boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInstance {
    pub name: String,
    pub width: u32,
    pub direction: PortDirection,
    /// Sub-core signal this port is wired to.
    pub binds_to: String,
}

impl PortInstance {
    pub fn input(name: impl Into<String>, width: u32) -> Self {
        let name = name.into();
        Self {
            binds_to: name.clone(),
            name,
            width,
            direction: PortDirection::Input,
        }
    }

    pub fn output(name: impl Into<String>, width: u32) -> Self {
        let name = name.into();
        Self {
            binds_to: name.clone(),
            name,
            width,
            direction: PortDirection::Output,
        }
    }

    /// Wire this port to a differently named sub-core signal.
    pub fn binds_to(mut self, signal: impl Into<String>) -> Self {
        self.binds_to = signal.into();
        self
    }
}

/// One instance of an interface on the wrapper boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortGroup {
    /// Bus name, the common prefix of every port (`s00_axis`).
    pub bus: String,
    /// Instance index within a fanned-out sequence.
    pub index: Option<usize>,
    pub interface: String,
    pub direction: Direction,
    pub ports: Vec<PortInstance>,
}

impl PortGroup {
    /// A single, unindexed instance named `bus`.
    pub fn single(interface: &ResolvedInterface, bus: impl Into<String>, direction: Direction) -> Self {
        Self::build(interface, bus.into(), None, direction)
    }

    fn build(
        interface: &ResolvedInterface,
        bus: String,
        index: Option<usize>,
        direction: Direction,
    ) -> Self {
        let ports = interface
            .signals
            .iter()
            .map(|s| {
                let name = format!("{bus}_{}", s.name);
                match direction.port_direction(s.flow) {
                    PortDirection::Input => PortInstance::input(name, s.width),
                    PortDirection::Output => PortInstance::output(name, s.width),
                }
            })
            .collect();
        Self {
            bus,
            index,
            interface: interface.name.clone(),
            direction,
            ports,
        }
    }
}

/// Instance name `prefix` + index suffix.
///
/// The suffix is the two-digit zero-padded index below 10 (`00`..`09`) and the
/// plain decimal index from 10 on, so names sort the same lexically and
/// numerically for any count up to 100.
pub fn port_name(prefix: &str, index: usize, total_count: usize) -> String {
    debug_assert!(index < total_count, "index {index} out of {total_count}");
    if index < 10 {
        format!("{prefix}0{index}")
    } else {
        format!("{prefix}{index}")
    }
}

/// `ceil(data_width / 8)`.
pub fn keep_width(data_width: u32) -> u32 {
    data_width.div_ceil(8)
}

/// `ceil(log2(max(slave_count, 2)))`; at least one bit.
pub fn select_width(slave_count: u32) -> u32 {
    let n = slave_count.max(2);
    u32::BITS - (n - 1).leading_zeros()
}

/// Repeat `interface` `count` times as buses `<prefix>NN<tail>`.
pub fn derive(
    interface: &ResolvedInterface,
    prefix: &str,
    tail: &str,
    count: usize,
    direction: Direction,
) -> Vec<PortGroup> {
    (0..count)
        .map(|i| {
            let bus = format!("{}{tail}", port_name(prefix, i, count));
            PortGroup::build(interface, bus, Some(i), direction)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::schema::Value;

    fn config(pairs: &[(&str, Value)], inert: &[&str]) -> Configuration {
        let values: BTreeMap<String, Value> =
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let inert: BTreeSet<String> = inert.iter().map(|s| s.to_string()).collect();
        Configuration::from_parts(values, inert)
    }

    fn stream() -> InterfaceTemplate {
        InterfaceTemplate::new("axis")
            .signal(SignalTemplate::forward("tvalid", WidthExpr::Const(1)))
            .signal(SignalTemplate::reverse("tready", WidthExpr::Const(1)))
            .signal(SignalTemplate::forward("tdata", WidthExpr::field("data_width")))
            .signal(SignalTemplate::forward("tkeep", WidthExpr::keep("data_width")))
            .signal(SignalTemplate::forward("tuser", WidthExpr::field("user_width")).when("user_en"))
    }

    #[test]
    fn names_pad_below_ten() {
        assert_eq!(port_name("s", 0, 12), "s00");
        assert_eq!(port_name("s", 9, 12), "s09");
        assert_eq!(port_name("s", 10, 12), "s10");
        assert_eq!(port_name("m", 11, 12), "m11");
        assert_eq!(port_name("m", 3, 4), "m03");
    }

    #[test]
    fn names_are_distinct() {
        let names: BTreeSet<String> = (0..12).map(|i| port_name("s", i, 12)).collect();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn derived_widths() {
        assert_eq!(keep_width(8), 1);
        assert_eq!(keep_width(9), 2);
        assert_eq!(keep_width(36), 5);
        assert_eq!(keep_width(1024), 128);
        assert_eq!(select_width(1), 1);
        assert_eq!(select_width(2), 1);
        assert_eq!(select_width(3), 2);
        assert_eq!(select_width(4), 2);
        assert_eq!(select_width(16), 4);
        assert_eq!(select_width(17), 5);
    }

    #[test]
    fn resolve_evaluates_widths_and_presence() {
        let c = config(
            &[
                ("data_width", Value::Int(32)),
                ("user_en", Value::Bool(false)),
                ("user_width", Value::Int(4)),
            ],
            &["user_width"],
        );
        let r = stream().resolve(&c).unwrap();
        let widths: Vec<(&str, u32)> = r.signals.iter().map(|s| (s.name.as_str(), s.width)).collect();
        assert_eq!(widths, [("tvalid", 1), ("tready", 1), ("tdata", 32), ("tkeep", 4)]);
    }

    #[test]
    fn resolve_rejects_inert_width() {
        let c = config(
            &[
                ("data_width", Value::Int(32)),
                ("user_en", Value::Bool(true)),
                ("user_width", Value::Int(4)),
            ],
            &["user_width"],
        );
        let err = stream().resolve(&c).unwrap_err();
        assert!(matches!(err, AssemblyError::TemplateField { ref field, .. } if field == "user_width"));
    }

    #[test]
    fn resolve_rejects_unknown_field() {
        let c = config(&[("user_en", Value::Bool(false))], &[]);
        assert!(stream().resolve(&c).is_err());
    }

    #[test]
    fn derive_names_and_directions() {
        let c = config(
            &[("data_width", Value::Int(8)), ("user_en", Value::Bool(false))],
            &[],
        );
        let r = stream().resolve(&c).unwrap();
        let groups = derive(&r, "s", "_axis", 12, Direction::Consumer);
        assert_eq!(groups.len(), 12);
        assert_eq!(groups[9].bus, "s09_axis");
        assert_eq!(groups[10].bus, "s10_axis");
        assert_eq!(groups[10].index, Some(10));

        let s0 = &groups[0];
        assert_eq!(s0.ports[0].name, "s00_axis_tvalid");
        assert_eq!(s0.ports[0].direction, PortDirection::Input);
        assert_eq!(s0.ports[1].name, "s00_axis_tready");
        assert_eq!(s0.ports[1].direction, PortDirection::Output);
        assert_eq!(s0.ports[0].binds_to, "s00_axis_tvalid");

        let m = derive(&r, "m", "_axis", 1, Direction::Producer);
        assert_eq!(m[0].ports[0].direction, PortDirection::Output);
        assert_eq!(m[0].ports[1].direction, PortDirection::Input);
    }

    #[test]
    fn derive_is_deterministic() {
        let c = config(
            &[("data_width", Value::Int(64)), ("user_en", Value::Bool(false))],
            &[],
        );
        let r = stream().resolve(&c).unwrap();
        assert_eq!(
            derive(&r, "s", "_axis", 16, Direction::Consumer),
            derive(&r, "s", "_axis", 16, Direction::Consumer)
        );
    }

    #[test]
    fn single_group_has_no_index() {
        let c = config(
            &[("data_width", Value::Int(16)), ("user_en", Value::Bool(false))],
            &[],
        );
        let g = PortGroup::single(&stream().resolve(&c).unwrap(), "axis_in", Direction::Consumer);
        assert_eq!(g.index, None);
        assert_eq!(g.ports[2].name, "axis_in_tdata");
        assert_eq!(g.ports[2].width, 16);
    }
}
