use ipgen_catalog::{catalog, find};
use ipgen_core::pipeline::generate;
use ipgen_core::serialize::{export_template, import_config, ConfigDocument, DEPENDENCIES_KEY};
use ipgen_core::{Domain, GenError, IpGenerator, ParameterSchema, ParameterSpec, RawConfig, Value};

/// Defaults of `generator` with `pairs` applied.
fn config(generator: &dyn IpGenerator, pairs: &[(&str, Value)]) -> RawConfig {
    generator
        .schema()
        .unwrap()
        .overlay(pairs.iter().map(|(k, v)| (k.to_string(), *v)))
}

/// Defaults with `field = value` and the field's governing flag on, so the
/// value is checked strictly.
fn probe(schema: &ParameterSchema, spec: &ParameterSpec, value: i64) -> RawConfig {
    let mut edits = vec![(spec.name.clone(), Value::Int(value))];
    if let Some(flag) = &spec.enabled_when {
        edits.push((flag.clone(), Value::Bool(true)));
    }
    schema.overlay(edits)
}

fn rejected_field(generator: &dyn IpGenerator, config: &RawConfig) -> Vec<String> {
    let schema = generator.schema().unwrap();
    match ipgen_core::validate(&schema, config) {
        Err(GenError::Configuration(report)) => report.fields().into_iter().map(String::from).collect(),
        other => panic!("{}: expected a configuration error, got {other:?}", generator.ip_name()),
    }
}

#[test]
fn every_schema_is_well_formed() {
    for g in catalog() {
        let schema = g.schema().unwrap();
        assert_eq!(schema.name(), g.ip_name());
        assert!(!schema.params().is_empty());
    }
}

#[test]
fn range_fields_accept_bounds_inclusive() {
    for g in catalog() {
        let schema = g.schema().unwrap();
        for spec in schema.params() {
            let Domain::Range { min, max } = spec.domain else {
                continue;
            };
            for v in min..=max {
                let validated = ipgen_core::validate(&schema, &probe(&schema, spec, v))
                    .unwrap_or_else(|e| panic!("{}.{} = {v}: {e}", g.ip_name(), spec.name));
                assert!(validated.warnings.is_empty());
            }
            for v in [min - 1, max + 1] {
                assert_eq!(rejected_field(g.as_ref(), &probe(&schema, spec, v)), [spec.name.clone()]);
            }
        }
    }
}

#[test]
fn choice_fields_accept_members_only() {
    for g in catalog() {
        let schema = g.schema().unwrap();
        for spec in schema.params() {
            let Domain::Choices(choices) = &spec.domain else {
                continue;
            };
            let ints: Vec<i64> = choices.iter().filter_map(|c| c.as_int()).collect();
            if ints.is_empty() {
                continue;
            }
            for &v in &ints {
                assert!(ipgen_core::validate(&schema, &probe(&schema, spec, v)).is_ok());
            }
            let outside = [0, ints[0] + 1, ints[ints.len() - 1] * 2];
            for v in outside.into_iter().filter(|v| !ints.contains(v)) {
                assert_eq!(rejected_field(g.as_ref(), &probe(&schema, spec, v)), [spec.name.clone()]);
            }
        }
    }
}

#[test]
fn every_schema_round_trips() {
    for g in catalog() {
        let schema = g.schema().unwrap();
        let defaults = schema.defaults();
        let text = export_template(&schema).to_pretty_string().unwrap();
        let imported = import_config(&schema, &ConfigDocument::parse(&text).unwrap()).unwrap();
        assert_eq!(imported.config, defaults, "{}", g.ip_name());
    }
}

#[test]
fn template_lists_dependencies() {
    let schema = find("axis_interconnect").unwrap().schema().unwrap();
    let json = export_template(&schema).to_json();
    assert_eq!(json[DEPENDENCIES_KEY]["id_width"], "id_en");
    assert_eq!(json[DEPENDENCIES_KEY]["user_width"], "user_en");
    assert_eq!(json["s_count"], 4);

    let fifo = find("fifo").unwrap().schema().unwrap();
    let json = export_template(&fifo).to_json();
    assert_eq!(json[DEPENDENCIES_KEY]["full_value"], "full_threshold");
}

#[test]
fn fifo_synchronous_has_one_domain() {
    let fifo = find("fifo").unwrap();
    let raw = config(
        fifo.as_ref(),
        &[
            ("data_width", Value::Int(36)),
            ("depth", Value::Int(1024)),
            ("synchronous", Value::Bool(true)),
        ],
    );
    let m = generate(fifo.as_ref(), &raw, "FIFO_wrapper").unwrap().module;
    assert_eq!(m.domains().len(), 1);
    assert!(m.domain("sys").is_some());
    for port in ["wrt_clock", "wrt_rst", "rd_clock", "rd_rst"] {
        assert!(m.port(port).is_none(), "{port}");
    }
    assert_eq!(m.port("dout").unwrap().width, 36);
}

#[test]
fn fifo_asynchronous_has_independent_domains() {
    let fifo = find("fifo").unwrap();
    let raw = config(
        fifo.as_ref(),
        &[
            ("data_width", Value::Int(36)),
            ("depth", Value::Int(1024)),
            ("synchronous", Value::Bool(false)),
        ],
    );
    let m = generate(fifo.as_ref(), &raw, "FIFO_wrapper").unwrap().module;
    assert_eq!(m.domains().len(), 2);
    let wr = m.domain("wr").unwrap();
    let rd = m.domain("rd").unwrap();
    assert_eq!(wr.clock.name, "wrt_clock");
    assert_eq!(rd.clock.name, "rd_clock");
    assert_ne!(wr.clock.binds_to, rd.clock.binds_to);
    assert_ne!(wr.reset.binds_to, rd.reset.binds_to);
    assert!(m.port("clk").is_none());
}

#[test]
fn interconnect_four_by_four_selects() {
    let ic = find("axis_interconnect").unwrap();
    let raw = config(ic.as_ref(), &[("s_count", Value::Int(4)), ("m_count", Value::Int(4))]);
    let m = generate(ic.as_ref(), &raw, "axis_interconnect_wrapper").unwrap().module;
    let selects: Vec<_> = m.ports().iter().filter(|p| p.name.ends_with("_select")).collect();
    assert_eq!(selects.len(), 4);
    assert!(selects.iter().all(|p| p.width == 2));
}

#[test]
fn generation_is_idempotent() {
    for g in catalog() {
        let raw = config(g.as_ref(), &[]);
        let a = generate(g.as_ref(), &raw, g.default_build_name()).unwrap();
        let b = generate(g.as_ref(), &raw, g.default_build_name()).unwrap();
        assert_eq!(a.module, b.module, "{}", g.ip_name());
    }
}

#[test]
fn inert_fields_do_not_change_the_module() {
    let ic = find("axis_interconnect").unwrap();
    let base = config(ic.as_ref(), &[("id_en", Value::Bool(false)), ("id_width", Value::Int(3))]);
    let changed = config(ic.as_ref(), &[("id_en", Value::Bool(false)), ("id_width", Value::Int(5))]);
    let a = generate(ic.as_ref(), &base, "w").unwrap();
    let b = generate(ic.as_ref(), &changed, "w").unwrap();
    assert_eq!(a.module, b.module);

    let fifo = find("fifo").unwrap();
    let out_of_domain = config(fifo.as_ref(), &[("full_value", Value::Int(9999))]);
    let c = generate(fifo.as_ref(), &out_of_domain, "w").unwrap();
    let d = generate(fifo.as_ref(), &config(fifo.as_ref(), &[]), "w").unwrap();
    assert_eq!(c.warnings.len(), 1);
    assert_eq!(c.warnings[0].field, "full_value");
    assert_eq!(c.module, d.module);
}

#[test]
fn every_violation_is_reported() {
    let fifo = find("fifo").unwrap();
    let raw = config(
        fifo.as_ref(),
        &[
            ("data_width", Value::Int(0)),
            ("depth", Value::Int(1)),
            ("synchronous", Value::Int(1)),
        ],
    );
    let mut fields = rejected_field(fifo.as_ref(), &raw);
    fields.sort();
    assert_eq!(fields, ["data_width", "depth", "synchronous"]);
}

#[test]
fn unknown_field_is_rejected() {
    let dpram = find("axi_dpram").unwrap();
    let err = generate(dpram.as_ref(), &config(dpram.as_ref(), &[("depth", Value::Int(4))]), "w").unwrap_err();
    assert!(matches!(err, GenError::UnknownField { ref field, .. } if field == "depth"));
}
