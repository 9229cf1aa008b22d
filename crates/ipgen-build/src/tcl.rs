//! Raptor project script.

use ipgen_core::PlatformDescriptor;

/// Script creating design `name` from `files` (paths relative to the build
/// root), with `name` as top module.
pub fn render(name: &str, platform: &PlatformDescriptor, files: &[String]) -> String {
    let mut files: Vec<&str> = files.iter().map(String::as_str).collect();
    files.sort_unstable();
    files.dedup();

    let mut out = String::new();
    out.push_str(&format!("# {} project for {name}\n", platform.toolchain));
    out.push_str(&format!("create_design {name}\n"));
    out.push_str(&format!("target_device {}\n", platform.device.to_uppercase()));
    out.push_str("add_include_path ./src\n");
    out.push_str("add_library_path ./src\n");
    out.push_str("add_library_ext .v .sv\n");
    for f in files {
        out.push_str(&format!("add_design_file ./{f}\n"));
    }
    out.push_str(&format!("set_top_module {name}\n"));
    out.push_str("synthesize\n");
    out
}
