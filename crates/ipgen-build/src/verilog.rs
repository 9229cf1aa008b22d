//! Verilog rendering of an assembled wrapper module.
//!
//! Output depends only on the module, so identical configurations produce
//! byte-identical files.

use ipgen_core::fanout::{PortDirection, PortInstance};
use ipgen_core::platform::HdlLanguage;
use ipgen_core::{Value, WrapperModule};

const INDENT: &str = "    ";

fn range(width: u32) -> String {
    if width > 1 {
        format!("[{}:0] ", width - 1)
    } else {
        String::new()
    }
}

fn declaration(port: &PortInstance, net: &str) -> String {
    let dir = match port.direction {
        PortDirection::Input => "input ",
        PortDirection::Output => "output",
    };
    format!("{dir} {net} {}{}", range(port.width), port.name)
}

fn literal(value: Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Bool(b) => u8::from(b).to_string(),
    }
}

/// Render `module` as a top-level wrapper instantiating its sub-core.
pub fn render(module: &WrapperModule, language: HdlLanguage) -> String {
    let net = match language {
        HdlLanguage::Verilog => "wire",
        HdlLanguage::SystemVerilog => "logic",
    };
    let mut out = String::new();
    out.push_str(&format!(
        "// {} wrapper generated by ipgen; do not edit.\n\n",
        module.core().module
    ));

    let ports: Vec<String> = module.all_ports().map(|p| declaration(p, net)).collect();
    out.push_str(&format!("module {} (\n", module.name()));
    for (i, decl) in ports.iter().enumerate() {
        let sep = if i + 1 < ports.len() { "," } else { "" };
        out.push_str(&format!("{INDENT}{decl}{sep}\n"));
    }
    out.push_str(");\n\n");

    let core = module.core();
    if core.parameters.is_empty() {
        out.push_str(&format!("{} {} (\n", core.module, core.instance));
    } else {
        out.push_str(&format!("{} #(\n", core.module));
        for (i, (name, value)) in core.parameters.iter().enumerate() {
            let sep = if i + 1 < core.parameters.len() { "," } else { "" };
            out.push_str(&format!("{INDENT}.{name}({}){sep}\n", literal(*value)));
        }
        out.push_str(&format!(") {} (\n", core.instance));
    }
    let bindings = module.bindings();
    for (i, b) in bindings.iter().enumerate() {
        let sep = if i + 1 < bindings.len() { "," } else { "" };
        out.push_str(&format!("{INDENT}.{}({}){sep}\n", b.signal, b.port));
    }
    out.push_str(");\n\nendmodule\n");
    out
}

#[cfg(test)]
mod tests {
    use ipgen_core::assemble::{assemble, ClockDomain, PortManifest, SubCore, SubCoreFactory};
    use ipgen_core::{Configuration, ParameterSchema, ParameterSpec, Result};

    use super::*;

    struct Counter;

    impl SubCoreFactory for Counter {
        fn instantiate(&self, _config: &Configuration) -> Result<SubCore> {
            Ok(SubCore::new("counter", "u_counter")
                .parameter("WIDTH", 8_i64)
                .parameter("WRAP", true)
                .input("clk", 1)
                .input("rst", 1)
                .output("count", 8)
                .input("inc", 1))
        }
    }

    fn module() -> WrapperModule {
        let config = ParameterSchema::new("counter", vec![ParameterSpec::flag("wrap", true)])
            .unwrap()
            .defaults();
        let manifest = PortManifest::new()
            .domain(ClockDomain::new("sys", "clk", "rst"))
            .port(PortInstance::output("count", 8))
            .port(PortInstance::input("enable", 1).binds_to("inc"));
        assemble("counter_wrapper", &config, manifest, &Counter).unwrap()
    }

    #[test]
    fn renders_ports_parameters_and_bindings() {
        let text = render(&module(), HdlLanguage::Verilog);
        let expected = "\
// counter wrapper generated by ipgen; do not edit.

module counter_wrapper (
    input  wire clk,
    input  wire rst,
    output wire [7:0] count,
    input  wire enable
);

counter #(
    .WIDTH(8),
    .WRAP(1)
) u_counter (
    .clk(clk),
    .rst(rst),
    .count(count),
    .inc(enable)
);

endmodule
";
        assert_eq!(text, expected);
    }

    #[test]
    fn systemverilog_uses_logic() {
        let text = render(&module(), HdlLanguage::SystemVerilog);
        assert!(text.contains("output logic [7:0] count,"));
        assert!(!text.contains("wire"));
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(
            render(&module(), HdlLanguage::Verilog),
            render(&module(), HdlLanguage::Verilog)
        );
    }
}
