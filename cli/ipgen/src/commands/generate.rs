//! `ipgen <generator>` — configure, generate and optionally build one wrapper.
//!
//! Each generator subcommand is built from the generator's schema at startup,
//! one `--<field>` flag per parameter, so the command line cannot drift from
//! what the validator accepts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Args, Command, FromArgMatches};

use ipgen_build::{module_name, IpBuilder};
use ipgen_core::pipeline::{self, BuildRequest};
use ipgen_core::serialize::{self, ConfigDocument};
use ipgen_core::{validate, IpGenerator, ParamKind, RawConfig, Value};

use crate::manifest::IpgenManifest;

/// Options shared by every generator subcommand.
#[derive(Debug, Clone, Default, Args)]
#[command(next_help_heading = "Build options")]
pub struct BuildArgs {
    /// Write the build tree (sources, project script, wrapper and record)
    #[arg(long)]
    pub build: bool,

    /// Parent directory of the build tree [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Wrapper module and build folder name
    #[arg(long, value_name = "NAME")]
    pub build_name: Option<String>,

    /// Load parameter values from a JSON document
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Print the effective configuration as a JSON document and exit
    #[arg(long)]
    pub json_template: bool,

    /// Directory holding the core's HDL sources
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,
}

/// The clap subcommand for `generator`.
pub fn command(generator: &dyn IpGenerator) -> Result<Command> {
    let schema = generator
        .schema()
        .with_context(|| format!("loading schema of {}", generator.ip_name()))?;

    let mut cmd = Command::new(generator.ip_name())
        .about(generator.description())
        .version(generator.version().to_string());

    for spec in schema.params() {
        let mut help = format!("[{}] (default: {})", spec.domain, spec.default);
        if !spec.help.is_empty() {
            help = format!("{} {help}", spec.help);
        }
        if let Some(flag) = &spec.enabled_when {
            help.push_str(&format!(" (requires --{flag} true)"));
        }

        let arg = Arg::new(spec.name.clone())
            .long(spec.name.clone())
            .action(ArgAction::Set)
            .help(help)
            .help_heading(spec.group());
        let arg = match spec.kind {
            ParamKind::Integer => arg.value_name("INT").value_parser(value_parser!(i64)),
            ParamKind::Boolean => arg.value_name("BOOL").value_parser(BoolishValueParser::new()),
        };
        cmd = cmd.arg(arg);
    }

    Ok(BuildArgs::augment_args(cmd))
}

/// Parameter values given explicitly on the command line.
pub fn overrides(generator: &dyn IpGenerator, matches: &ArgMatches) -> Result<RawConfig> {
    let schema = generator.schema()?;
    let mut raw = RawConfig::new();
    for spec in schema.params() {
        let value = match spec.kind {
            ParamKind::Integer => matches.get_one::<i64>(&spec.name).copied().map(Value::Int),
            ParamKind::Boolean => matches.get_one::<bool>(&spec.name).copied().map(Value::Bool),
        };
        if let Some(value) = value {
            raw.insert(spec.name.clone(), value);
        }
    }
    Ok(raw)
}

/// Schema defaults, overlaid by the JSON document at `json`, then by `overrides`.
pub fn resolve(
    generator: &dyn IpGenerator,
    json: Option<&Path>,
    overrides: RawConfig,
) -> Result<RawConfig> {
    let schema = generator.schema()?;
    let mut raw = match json {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let document = ConfigDocument::parse(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            serialize::overlay_document(&schema, &document)
                .with_context(|| format!("loading {}", path.display()))?
        }
        None => schema.defaults().to_raw(),
    };
    raw.extend(overrides);
    Ok(raw)
}

/// The validated configuration `raw` as a pretty-printed JSON document.
pub fn template(generator: &dyn IpGenerator, raw: &RawConfig) -> Result<String> {
    let schema = generator.schema()?;
    let validated = validate(&schema, raw)?;
    Ok(serialize::export_config(&schema, &validated.config).to_pretty_string()?)
}

/// Where to build, from flags first, then `ipgen.toml`, then built-in defaults.
///
/// The build directory defaults to `cwd`; the source directory to
/// `<project>/rtl/<ip_name>`.
pub fn build_request(
    generator: &dyn IpGenerator,
    args: &BuildArgs,
    manifest: Option<&IpgenManifest>,
    project_dir: &Path,
    cwd: &Path,
) -> BuildRequest {
    let build_dir = args
        .build_dir
        .clone()
        .or_else(|| manifest.and_then(|m| m.build_dir(project_dir)))
        .unwrap_or_else(|| cwd.to_path_buf());
    let source_dir = args
        .source_dir
        .clone()
        .or_else(|| manifest.and_then(|m| m.source_dir(project_dir, generator.ip_name())))
        .unwrap_or_else(|| project_dir.join("rtl").join(generator.ip_name()));
    let build_name = args
        .build_name
        .clone()
        .unwrap_or_else(|| generator.default_build_name().to_string());
    let platform = manifest.map(IpgenManifest::platform).unwrap_or_default();

    BuildRequest {
        build_dir,
        build_name,
        source_dir,
        platform,
    }
}

/// Run one generator subcommand.
pub fn run(
    generator: &dyn IpGenerator,
    matches: &ArgMatches,
    manifest: Option<&IpgenManifest>,
    project_dir: &Path,
    cwd: &Path,
) -> Result<()> {
    let args = BuildArgs::from_arg_matches(matches)?;
    let raw = resolve(generator, args.json.as_deref(), overrides(generator, matches)?)?;

    if args.json_template {
        print!("{}", template(generator, &raw)?);
        return Ok(());
    }

    let request = build_request(generator, &args, manifest, project_dir, cwd);
    let name = module_name(&request.build_name)
        .with_context(|| format!("checking --build-name for {}", generator.ip_name()))?;
    let generation = pipeline::generate(generator, &raw, &name)
        .with_context(|| format!("generating {}", generator.ip_name()))?;
    let module = &generation.module;
    println!(
        "Generated {} ({} {}): {} ports, {} clock domain(s)",
        module.name(),
        generator.ip_name(),
        generator.version(),
        module.port_count(),
        module.domains().len()
    );

    if !args.build {
        return Ok(());
    }

    let mut builder = IpBuilder::new(
        generator.ip_name(),
        generator.version(),
        request.platform.clone(),
    )
    .with_configuration(generation.config.to_raw());
    pipeline::build(&mut builder, &request, &generation)
        .with_context(|| format!("building {}", request.build_name))?;
    if let Some(layout) = builder.layout() {
        println!("Built {} in {}", layout.name, layout.root.display());
    }
    Ok(())
}
