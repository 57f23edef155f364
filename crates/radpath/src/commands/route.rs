use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::config::Config;
use crate::route::overlay::{RouteStats, overlay as offset_steps};
use crate::route::serialize::{edges_to_string, output_to_string, parse_edges};
use crate::route::types::{RouteOutput, Segment};
use crate::route::{choose_double_edges, dedupe_edges, plan_route, route_output};

/// Read and validate an edge list file.
fn read_edges(file: &Path) -> Result<Vec<Segment>> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let edges = parse_edges(&contents)
        .with_context(|| format!("Invalid edge list in {}", file.display()))?;
    Ok(edges)
}

fn write_result(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, format!("{json}\n"))
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

/// Run the route command.
pub fn run(
    file: &Path,
    output: Option<&Path>,
    pretty: bool,
    map_width: Option<f64>,
    quiet: bool,
) -> Result<()> {
    let config = Config::load_or_default();
    let edges = read_edges(file)?;

    let result = route_output(&edges, &config.planner());
    let json = output_to_string(&result, pretty || config.pretty())?;
    write_result(&json, output)?;

    if let Some(failure) = &result.error {
        if !quiet {
            eprintln!("{}", failure.kind.headline().red().bold());
        }
        anyhow::bail!("{}", failure.message);
    }
    if !quiet {
        print_summary(&edges, &result, map_width, output);
    }
    Ok(())
}

fn print_summary(
    edges: &[Segment],
    result: &RouteOutput,
    map_width: Option<f64>,
    output: Option<&Path>,
) {
    let edges = dedupe_edges(edges);
    let steps = result.path.as_deref().unwrap_or_default();
    let stats = RouteStats::measure(&edges, &result.double_edges, steps);

    eprintln!(
        "{} {} segment(s), {} walked twice, {} step(s)",
        "Route planned:".green().bold(),
        edges.len(),
        result.double_edges.len(),
        steps.len()
    );
    if !result.loop_breaks.is_empty() {
        eprintln!("  Loops closed: {}", result.loop_breaks.len());
    }
    eprintln!(
        "  Distance: {:.1} ({:.1} retraced)",
        stats.total_length, stats.retraced_length
    );
    if let Some(widths) = map_width.and_then(|w| stats.map_widths(w)) {
        eprintln!("  Map width x {widths}");
    } else if map_width.is_some() {
        eprintln!("{}", "  Map width must be a positive number; skipped.".yellow());
    }
    if let Some(path) = output {
        eprintln!("  Written to {}", path.display());
    }
}

/// Run the double-edges command.
pub fn double_edges(file: &Path) -> Result<()> {
    let config = Config::load_or_default();
    let edges = dedupe_edges(&read_edges(file)?);
    let doubled = choose_double_edges(&edges, &config.planner())?;
    println!("{}", edges_to_string(&doubled)?);
    Ok(())
}

/// Run the overlay command.
pub fn overlay(file: &Path, offset: Option<f64>) -> Result<()> {
    let config = Config::load_or_default();
    let offset = offset.unwrap_or(config.offset());
    if !offset.is_finite() {
        anyhow::bail!("Invalid offset: {offset}");
    }
    let edges = read_edges(file)?;
    let route = plan_route(&edges, &config.planner())?;
    let segments = offset_steps(route.trail.steps(), &route.colours, offset);

    let json = if config.pretty() {
        serde_json::to_string_pretty(&segments)?
    } else {
        serde_json::to_string(&segments)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_read_edges_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, r#"{"edges": [[[0,0],[10,0]],[[10,0],[0,10]]]}"#).unwrap();
        let edges = read_edges(&path).unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn test_read_edges_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_edges(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_read_edges_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, "[[[0,0],[0.5,0]]]").unwrap();
        let err = read_edges(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Malformed input"));
    }

    #[test]
    fn test_write_result_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.json");
        write_result("{}", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
    }
}
