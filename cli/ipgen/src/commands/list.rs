//! `ipgen list` — generator catalog listing.

use anyhow::Result;

/// List every generator with its version and description.
pub fn run() -> Result<()> {
    println!("Available generators:");
    println!();
    for generator in ipgen_catalog::catalog() {
        let name = generator.ip_name();
        let version = generator.version().to_string();
        println!("  {name:<20} {version:<8} {}", generator.description());
    }
    println!();
    println!("Use 'ipgen <generator> --help' for its parameters.");
    Ok(())
}
