//! Bundles command implementation

use colored::Colorize;

use crate::context::{BundleSummary, Context};
use crate::error::Result;

/// Run the bundles command
pub fn run_bundles(ctx: &Context) -> Result<()> {
    let mut bundles: Vec<BundleSummary> = ctx
        .manager
        .cache()
        .holders()
        .filter_map(|holder| ctx.summarize_holder(holder))
        .collect();
    bundles.sort();

    if ctx.json {
        return ctx.print_json(&bundles);
    }

    println!("{}", "Indexed Bundles".bold());
    println!();
    for bundle in &bundles {
        let host = bundle
            .fragment_host
            .as_deref()
            .map(|host| format!(" fragment of {host}"))
            .unwrap_or_default();
        println!(
            "  {:<32} {:<12} {} {}{}",
            bundle.bundle.green(),
            bundle.version,
            bundle.kind.dimmed(),
            bundle.owner,
            host.dimmed()
        );
    }
    println!();
    println!("{} {} bundles indexed.", "Total:".dimmed(), bundles.len());
    Ok(())
}
