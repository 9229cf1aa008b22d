mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{ArgMatches, Command, CommandFactory, FromArgMatches, Parser};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use manifest::IpgenManifest;

/// Parametrized FPGA IP wrapper generator.
///
/// Generator subcommands (`ipgen fifo ...`) are added from the catalog at
/// startup; see `ipgen list`.
#[derive(Parser)]
#[command(name = "ipgen", version, about, subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() {
    let result = cli_command().and_then(|cmd| run(cmd.get_matches()));
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// The full command line: `list` plus one subcommand per catalog generator.
fn cli_command() -> Result<Command> {
    let mut cmd = Cli::command().subcommand(
        Command::new("list").about("List available generators with their versions"),
    );
    for generator in ipgen_catalog::catalog() {
        cmd = cmd.subcommand(commands::generate::command(generator.as_ref())?);
    }
    Ok(cmd)
}

fn run(matches: ArgMatches) -> Result<()> {
    let cli = Cli::from_arg_matches(&matches)?;
    init_logging(cli.verbose);
    let cwd = std::env::current_dir().context("reading current directory")?;
    dispatch(&matches, &cwd)
}

fn dispatch(matches: &ArgMatches, cwd: &Path) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => commands::list::run(),
        Some((name, sub)) => {
            let generator = ipgen_catalog::find(name)
                .with_context(|| format!("unknown generator '{name}'. Use 'ipgen list' to see available generators."))?;
            let (manifest, project_dir) = load_manifest_optional(cwd)?;
            let project_dir = project_dir.unwrap_or_else(|| cwd.to_path_buf());
            commands::generate::run(generator.as_ref(), sub, manifest.as_ref(), &project_dir, cwd)
        }
        None => bail!("no command given. Use 'ipgen --help' for usage."),
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `-v`.
fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

fn load_manifest_optional(cwd: &Path) -> Result<(Option<IpgenManifest>, Option<PathBuf>)> {
    match IpgenManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => {
            debug!(path = %dir.display(), "using ipgen.toml");
            Ok((Some(manifest), Some(dir)))
        }
        None => Ok((None, None)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    use ipgen_build::{BuildRecord, ContentHash};
    use ipgen_core::Value;

    fn invoke(cwd: &Path, args: &[&str]) -> Result<()> {
        let argv = std::iter::once("ipgen").chain(args.iter().copied());
        let matches = cli_command()?.try_get_matches_from(argv)?;
        dispatch(&matches, cwd)
    }

    fn read_record(path: &Path) -> BuildRecord {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn every_generator_has_a_subcommand() {
        let cmd = cli_command().unwrap();
        let names: Vec<&str> = cmd.get_subcommands().map(|c| c.get_name()).collect();
        assert_eq!(
            names,
            ["list", "axi_dpram", "axi_spi_slave", "axis_interconnect", "fifo"]
        );
        cmd.debug_assert();
    }

    #[test]
    fn list_runs() {
        let dir = tempfile::tempdir().unwrap();
        invoke(dir.path(), &["list"]).unwrap();
    }

    /// Sources → build tree → record with digests.
    #[test]
    fn fifo_build_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let rtl = dir.path().join("rtl").join("fifo");
        std::fs::create_dir_all(&rtl).unwrap();
        std::fs::write(rtl.join("async_fifo.v"), "module async_fifo; endmodule\n").unwrap();
        std::fs::write(rtl.join("README"), "not hdl\n").unwrap();

        invoke(
            dir.path(),
            &["fifo", "--data_width", "16", "--synchronous", "false", "--build"],
        )
        .unwrap();

        let root = dir.path().join("FIFO_wrapper");
        assert!(root.join("sim").is_dir());
        assert!(root.join("src/async_fifo.v").is_file());
        assert!(!root.join("src/README").exists());

        let tcl = std::fs::read_to_string(root.join("FIFO_wrapper.tcl")).unwrap();
        assert!(tcl.contains("add_design_file ./src/async_fifo.v"));
        assert!(tcl.contains("add_design_file ./src/FIFO_wrapper.v"));
        assert!(tcl.contains("set_top_module FIFO_wrapper"));

        let wrapper = std::fs::read(root.join("src/FIFO_wrapper.v")).unwrap();
        let record = read_record(&root.join("FIFO_wrapper.json"));
        assert_eq!(record.ip, "fifo");
        assert_eq!(record.module, "FIFO_wrapper");
        assert_eq!(record.configuration["data_width"], Value::Int(16));
        assert_eq!(record.configuration["synchronous"], Value::Bool(false));
        assert_eq!(record.files["src/FIFO_wrapper.v"], ContentHash::compute(&wrapper));
    }

    #[test]
    fn manifest_supplies_build_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ipgen.toml"),
            "[platform]\nlanguage = \"systemverilog\"\n\n[build]\ndir = \"out\"\n",
        )
        .unwrap();
        let nested = dir.path().join("work");
        std::fs::create_dir_all(&nested).unwrap();

        invoke(&nested, &["axis_interconnect", "--build", "--build-name", "xbar.sv"]).unwrap();

        let root = dir.path().join("out").join("xbar");
        assert!(root.join("src/xbar.sv").is_file());
        let record = read_record(&root.join("xbar.json"));
        assert_eq!(record.module, "xbar");
        assert_eq!(record.platform.device, "gemini");
    }

    #[test]
    fn json_document_with_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("dpram.json");
        std::fs::write(&json, r#"{ "data_width": 64, "addr_width": 10 }"#).unwrap();
        let out = dir.path().join("build");

        invoke(
            dir.path(),
            &[
                "axi_dpram",
                "--json",
                json.to_str().unwrap(),
                "--addr_width",
                "12",
                "--build",
                "--build-dir",
                out.to_str().unwrap(),
            ],
        )
        .unwrap();

        let record = read_record(&out.join("axi_dpram_wrapper/axi_dpram_wrapper.json"));
        assert_eq!(record.configuration["data_width"], Value::Int(64));
        assert_eq!(record.configuration["addr_width"], Value::Int(12));
    }

    #[test]
    fn invalid_values_fail_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let err = invoke(
            dir.path(),
            &["fifo", "--data_width", "0", "--depth", "1", "--build"],
        )
        .unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("'data_width' = 0"));
        assert!(text.contains("'depth' = 1"));
        assert!(!dir.path().join("FIFO_wrapper").exists());
    }

    #[test]
    fn build_names_outside_the_build_dir_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        let precious = dir.path().join("precious.v");
        std::fs::write(&precious, "keep").unwrap();

        for name in ["..", ".", "", "a/../b", "my-wrapper"] {
            let err = invoke(&work, &["fifo", "--build", "--build-name", name]).unwrap_err();
            assert!(format!("{err:#}").contains("invalid build name"), "{name:?}: {err:#}");
        }
        assert!(precious.is_file());
        assert!(work.is_dir());
        assert_eq!(std::fs::read_dir(&work).unwrap().count(), 0);
    }

    #[test]
    fn template_skips_the_build() {
        let dir = tempfile::tempdir().unwrap();
        invoke(dir.path(), &["fifo", "--json-template", "--build"]).unwrap();
        assert!(!dir.path().join("FIFO_wrapper").exists());
    }
}
