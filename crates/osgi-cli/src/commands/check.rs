//! Check command implementation

use colored::Colorize;
use osgi_index::UnresolvedReport;

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the check command
///
/// Fails if any module misses a mandatory dependency.
pub fn run_check(ctx: &Context) -> Result<()> {
    let reports: Vec<UnresolvedReport> = ctx
        .manager
        .project()
        .modules()
        .iter()
        .filter(|module| module.has_bundle_facet())
        .map(|module| ctx.manager.unresolved(module))
        .filter(|report| !report.is_resolved() || !report.missing_optional_bundles.is_empty())
        .collect();
    let failing = reports.iter().filter(|r| !r.is_resolved()).count();

    if ctx.json {
        ctx.print_json(&reports)?;
    } else {
        for report in &reports {
            print_report(report);
        }
        if failing == 0 {
            println!("{} All bundle dependencies resolved", "OK".green().bold());
        }
    }

    if failing > 0 {
        return Err(CliError::user(format!(
            "{failing} module(s) with unresolved dependencies"
        )));
    }
    Ok(())
}

fn print_report(report: &UnresolvedReport) {
    println!("{}", report.module.cyan().bold());
    for bundle in &report.missing_bundles {
        println!("  {} Require-Bundle {}", "missing".red(), bundle);
    }
    for package in &report.missing_packages {
        println!("  {} Import-Package {}", "missing".red(), package);
    }
    if let Some(host) = &report.missing_fragment_host {
        println!("  {} Fragment-Host {}", "missing".red(), host);
    }
    for bundle in &report.missing_optional_bundles {
        println!("  {} Require-Bundle {} (optional)", "absent".yellow(), bundle);
    }
}
