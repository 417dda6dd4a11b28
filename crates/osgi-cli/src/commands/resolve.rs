//! Resolve command implementation

use colored::Colorize;
use serde::Serialize;

use crate::context::{Context, EntitySummary};
use crate::error::Result;

#[derive(Serialize)]
struct ResolveOutput<'a> {
    module: &'a str,
    dependencies: Vec<EntitySummary>,
}

/// Run the resolve command
pub fn run_resolve(ctx: &Context, module_name: &str) -> Result<()> {
    let module = ctx.find_module(module_name)?;
    let mut dependencies: Vec<EntitySummary> = ctx
        .manager
        .resolve_dependencies_of(&module)
        .iter()
        .map(|object| ctx.summarize(object))
        .collect();
    dependencies.sort();

    if ctx.json {
        return ctx.print_json(&ResolveOutput {
            module: module.name(),
            dependencies,
        });
    }

    if !module.has_bundle_facet() {
        println!(
            "{} {} is not a bundle",
            "note:".yellow().bold(),
            module.name().cyan()
        );
        return Ok(());
    }
    if dependencies.is_empty() {
        println!("{} has no bundle dependencies", module.name().cyan());
        return Ok(());
    }

    println!("{} {}", "Dependencies of".bold(), module.name().cyan().bold());
    for dependency in &dependencies {
        let bundle = match (&dependency.bundle, &dependency.version) {
            (Some(bundle), Some(version)) => format!("{bundle} {version}"),
            _ => String::new(),
        };
        println!(
            "  {:<8} {:<24} {}",
            dependency.kind.dimmed(),
            dependency.name.green(),
            bundle.dimmed()
        );
    }
    Ok(())
}
