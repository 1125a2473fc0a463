//! Registry listing and introspection commands.

use anyhow::{Result, bail};
use ronda_composer::Composer;
use ronda_strategies::{StrategyCategory, available_strategies};

fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {title:^60} ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// List enabled strategies.
pub(crate) fn list_strategies(composer: &Composer, verbose: bool) -> Result<()> {
    banner("Enabled Strategies");

    let strategies = composer.catalog().strategies();
    if strategies.is_empty() {
        println!("No strategies enabled.\n");
        return Ok(());
    }

    for entry in strategies {
        if verbose {
            println!(
                "  {:20} {:12} class: {:16} keys: {}{}",
                entry.name,
                entry.role,
                entry.class.as_deref().unwrap_or("-"),
                entry.required_keys.join(", "),
                entry
                    .filter
                    .map(|f| format!("  filter: {f}"))
                    .unwrap_or_default()
            );
        } else {
            println!("  {}", entry.name);
        }
    }
    println!();

    if !verbose {
        println!("Use --verbose for roles, classes and filters.\n");
    }
    Ok(())
}

/// List configured combinations.
pub(crate) fn list_combinations(composer: &Composer, verbose: bool) -> Result<()> {
    banner("Combinations");

    for info in composer.catalog().combinations()? {
        if verbose {
            println!(
                "  {:20} {:17} [{}]",
                info.name,
                info.method,
                info.strategies.join(", ")
            );
        } else {
            println!("  {}", info.name);
        }
    }
    println!();
    Ok(())
}

/// Describe one combination.
pub(crate) fn show_combination(composer: &Composer, name: &str) -> Result<()> {
    let info = composer.get_combination_info(name)?;
    banner("Combination");

    println!("Name:        {}", info.name);
    if let Some(description) = &info.description {
        println!("Description: {description}");
    }
    println!("Method:      {}", info.method);
    println!("Strategies:  {}", info.strategies.join(", "));
    if info.filters.is_empty() {
        println!("Filters:     none");
    } else {
        println!("Filters:     {}", info.filters.join(" AND "));
    }
    if !info.weights.is_empty() {
        let weights: Vec<String> = info
            .weights
            .iter()
            .map(|(strategy, weight)| format!("{strategy}={weight}"))
            .collect();
        println!("Weights:     {}", weights.join(", "));
    }
    println!("Threshold:   {}", info.threshold);
    println!("On failure:  {}", info.on_failure);
    println!();
    Ok(())
}

/// List configured filters with their descriptions.
pub(crate) fn list_filters(composer: &Composer) -> Result<()> {
    banner("Filters");

    for (name, description) in composer.catalog().filters() {
        println!("{name}:");
        println!("{}", serde_json::to_string_pretty(&description)?);
        println!();
    }
    Ok(())
}

/// List built-in strategy classes, optionally filtered by category.
pub(crate) fn list_classes(category: Option<&str>) -> Result<()> {
    let category = match category.map(str::to_lowercase).as_deref() {
        None => None,
        Some("trend") => Some(StrategyCategory::Trend),
        Some("reversion") => Some(StrategyCategory::Reversion),
        Some("momentum") => Some(StrategyCategory::Momentum),
        Some(other) => bail!("Unknown category '{other}' (expected trend, reversion or momentum)"),
    };

    banner("Strategy Classes");

    for info in available_strategies()
        .into_iter()
        .filter(|info| category.is_none_or(|c| info.category == c))
    {
        println!("  {:16} - {}", info.class, info.description);
        println!("  {:16}   columns: {}", "", info.required_columns.join(", "));
    }
    println!();
    Ok(())
}
