//! Environment diagnostics

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::staging::StagingRepo;

/// Check that the fleet tools and a staging directory are available
pub fn execute(config: &Config) -> Result<()> {
    println!("{}", "Running diagnostics...".bold());

    let mut issues_found = 0;

    for tool in config.tools.all() {
        match which::which(tool) {
            Ok(path) => println!("  {} {tool} ({})", "✓".green(), path.display()),
            Err(_) => {
                println!("  {} {tool} not found on PATH", "✗".red());
                issues_found += 1;
            }
        }
    }

    let staging = StagingRepo::new(config.staging_paths.clone());
    match staging.locate() {
        Ok(path) => println!("  {} staging repo {}", "✓".green(), path.display()),
        Err(e) => {
            println!("  {} {e}", "✗".red());
            issues_found += 1;
        }
    }

    if issues_found == 0 {
        println!("\n{}", "No issues found!".green().bold());
    } else {
        println!(
            "\n{} {}",
            "Found".yellow().bold(),
            format!("{issues_found} issue(s)").yellow().bold()
        );
    }
    Ok(())
}
