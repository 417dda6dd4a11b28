//! Provides command implementation

use colored::Colorize;

use crate::context::{BundleSummary, Context};
use crate::error::Result;

/// Run the provides command
pub fn run_provides(ctx: &Context, package: &str) -> Result<()> {
    let mut providers: Vec<BundleSummary> = ctx
        .manager
        .cache()
        .who_provides(package)
        .iter()
        .filter_map(|holder| ctx.summarize_holder(holder))
        .collect();
    providers.sort();

    if ctx.json {
        return ctx.print_json(&providers);
    }

    if providers.is_empty() {
        println!("No bundle exports {}", package.cyan());
        return Ok(());
    }
    println!("{} {}", "Providers of".bold(), package.cyan().bold());
    for provider in &providers {
        println!(
            "  {} {} ({} {})",
            provider.bundle.green(),
            provider.version,
            provider.kind.dimmed(),
            provider.owner
        );
    }
    Ok(())
}
