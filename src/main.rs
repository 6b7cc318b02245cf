use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use region_atlas::{
    load, AtlasConfig, GrowthSummary, Order, QuarterlySeries, Snapshot, SourceOutcome, Value,
};

const USAGE: &str = "\
Usage: region-atlas [--config <path>] [--json] <command> [args]

Commands:
  summary                 Load report and dataset overview (default)
  regions                 List all region keys
  region <name>           Show every field for one region
  growth <name>           Annual medians, YoY change, CAGR
  history <name>          Quarterly price history
  top <field> [n] [--asc] Leaderboard by a numeric field
  search <text>           Regions whose name contains <text>
  nearest <lat> <lng>     Region closest to a point

Environment:
  ATLAS_DATA_DIR          Data directory when no --config is given
  RUST_LOG                Log filter (default: info)";

struct Args {
    config: Option<PathBuf>,
    json: bool,
    ascending: bool,
    positional: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        json: false,
        ascending: false,
        positional: Vec::new(),
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => args.json = true,
            "--asc" => args.ascending = true,
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => args.positional.push(arg),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => AtlasConfig::from_file(path)?,
        None => {
            let data_dir = env::var("ATLAS_DATA_DIR").unwrap_or_else(|_| ".".to_string());
            AtlasConfig::with_data_dir(data_dir)
        }
    };

    let snapshot = load(&config).context("Failed to load datasets")?;

    let command = args.positional.first().map(String::as_str).unwrap_or("summary");
    let rest = &args.positional[args.positional.len().min(1)..];

    match command {
        "summary" => run_summary(&snapshot, args.json),
        "regions" => run_regions(&snapshot, args.json),
        "region" => run_region(&snapshot, arg(rest, 0, "region name")?, args.json),
        "growth" => run_growth(&snapshot, arg(rest, 0, "region name")?, args.json),
        "history" => run_history(&snapshot, arg(rest, 0, "region name")?, args.json),
        "top" => {
            let field = arg(rest, 0, "field")?;
            let n = match rest.get(1) {
                Some(n) => n.parse().with_context(|| format!("invalid count: {}", n))?,
                None => 10,
            };
            let order = if args.ascending { Order::Asc } else { Order::Desc };
            run_top(&snapshot, field, n, order, args.json)
        }
        "search" => run_search(&snapshot, &rest.join(" "), args.json),
        "nearest" => {
            let lat: f64 = arg(rest, 0, "latitude")?.parse().context("invalid latitude")?;
            let lng: f64 = arg(rest, 1, "longitude")?.parse().context("invalid longitude")?;
            run_nearest(&snapshot, lat, lng, args.json)
        }
        other => {
            eprintln!("{}", USAGE);
            bail!("unknown command: {}", other)
        }
    }
}

fn arg<'a>(rest: &'a [String], idx: usize, what: &str) -> Result<&'a str> {
    rest.get(idx)
        .map(String::as_str)
        .with_context(|| format!("missing argument: <{}>\n\n{}", what, USAGE))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    value
        .map(|v| format!("{:.2}{}", v, suffix))
        .unwrap_or_else(|| "N/A".to_string())
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_summary(snapshot: &Snapshot, json: bool) -> Result<()> {
    let overview = snapshot.overview();
    if json {
        return print_json(&overview);
    }

    println!("🗺️  Region Atlas {}", region_atlas::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Snapshot:     {}", overview.id);
    println!("Loaded at:    {}", overview.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Regions:      {}", overview.regions);
    println!("Columns:      {}", overview.columns.len());
    println!("With series:  {}", overview.with_series);

    println!("\n📂 Sources:");
    for source in &overview.report.sources {
        let status = match &source.outcome {
            SourceOutcome::Merged(m) => format!("✓ {}", m.summary()),
            SourceOutcome::Empty => "- empty or absent".to_string(),
            SourceOutcome::Unavailable { reason } => format!("⚠️  unavailable: {}", reason),
        };
        println!("   {:<14} {}", source.kind.name(), status);
    }

    let discarded = overview.report.discarded_columns();
    if !discarded.is_empty() {
        println!("\n🔀 Columns dropped by earlier sources:");
        for (kind, column) in discarded {
            println!("   {:<14} {}", kind.name(), column);
        }
    }

    for derived in &overview.report.derived {
        println!(
            "\n🧮 {}: {} filled, {} kept, {} unresolved",
            derived.target, derived.filled, derived.kept, derived.unresolved
        );
    }

    if !overview.report.duplicate_primary_keys.is_empty() {
        println!(
            "\n⚠️  {} duplicate region keys in master (first row kept)",
            overview.report.duplicate_primary_keys.len()
        );
    }
    Ok(())
}

fn run_regions(snapshot: &Snapshot, json: bool) -> Result<()> {
    let keys = snapshot.keys();
    if json {
        return print_json(&keys);
    }
    for key in &keys {
        println!("{}", key);
    }
    eprintln!("{} regions", keys.len());
    Ok(())
}

fn run_region(snapshot: &Snapshot, name: &str, json: bool) -> Result<()> {
    let view = snapshot.describe(name)?;
    if json {
        return print_json(&view);
    }

    println!("📍 {}", view.record.name());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Price tier:  {}", view.price_tier.label());
    println!("Risk level:  {:?}", view.risk_level);
    if let Some(c) = view.coordinate {
        println!("Location:    {:.4}, {:.4}", c.lat, c.lng);
    }
    println!();

    for column in snapshot.table().columns().iter().skip(1) {
        let value = view.record.get(column);
        let shown = match value {
            Value::Number(n) => format!("{:.2}", n),
            other => other.to_string(),
        };
        println!("   {:<40} {}", column, shown);
    }
    Ok(())
}

fn run_growth(snapshot: &Snapshot, name: &str, json: bool) -> Result<()> {
    let summary: Option<GrowthSummary> = snapshot.growth_summary(name)?;
    if json {
        return print_json(&summary);
    }

    let Some(summary) = summary else {
        println!("📈 {}: no series available", name);
        return Ok(());
    };

    println!("📈 {}", summary.summary());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   {:<6} {:>14} {:>14} {:>9}", "Year", "Median", "Change", "Change%");
    for point in &summary.annual {
        println!(
            "   {:<6} {:>14.0} {:>14} {:>9}",
            point.year,
            point.median,
            fmt_opt(point.change, ""),
            fmt_opt(point.change_pct, "%")
        );
    }

    match &summary.cagr {
        Some(c) => println!(
            "\nCAGR {}-{}: {:.2}% (total {:.2}%)",
            c.first_year, c.last_year, c.rate_pct, c.total_growth_pct
        ),
        None => println!("\nCAGR: unavailable"),
    }
    if let Some(best) = &summary.best_year {
        println!("Best year:  {} ({:+.2}%)", best.year, best.change_pct);
    }
    if let Some(worst) = &summary.worst_year {
        println!("Worst year: {} ({:+.2}%)", worst.year, worst.change_pct);
    }
    Ok(())
}

fn run_history(snapshot: &Snapshot, name: &str, json: bool) -> Result<()> {
    let history: Option<QuarterlySeries> = snapshot.quarterly_series(name)?;
    if json {
        return print_json(&history);
    }

    let Some(history) = history else {
        println!("🕒 {}: no series available", name);
        return Ok(());
    };

    println!("🕒 {} ({} quarters)", history.region, history.points.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for point in &history.points {
        println!("   {:<8} {:>14.0}", point.label, point.value);
    }
    println!("\nLow {:.0}  High {:.0}", history.low, history.high);
    if history.dropped > 0 {
        println!("{} observations with unparseable periods skipped", history.dropped);
    }
    Ok(())
}

fn run_top(snapshot: &Snapshot, field: &str, n: usize, order: Order, json: bool) -> Result<()> {
    if !snapshot.table().has_column(field) {
        bail!("unknown field: {}", field);
    }
    let ranked = snapshot.top_n(field, n, order);
    if json {
        return print_json(&ranked);
    }

    println!("🏆 {} ({:?}, {} of {} with a value)", field, order, ranked.len(), snapshot.count_with(field));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for r in &ranked {
        println!("   {:>3}. {:<30} {:>14.2}", r.rank, r.region, r.value);
    }
    Ok(())
}

fn run_search(snapshot: &Snapshot, text: &str, json: bool) -> Result<()> {
    let matches = snapshot.search(text);
    if json {
        return print_json(&matches);
    }
    for m in &matches {
        println!("{}", m);
    }
    eprintln!("{} matches", matches.len());
    Ok(())
}

fn run_nearest(snapshot: &Snapshot, lat: f64, lng: f64, json: bool) -> Result<()> {
    let nearest = snapshot.nearest(lat, lng);
    if json {
        return print_json(&nearest);
    }
    match nearest {
        Some((name, c)) => println!("📍 {} ({:.4}, {:.4})", name, c.lat, c.lng),
        None => println!("No coordinates loaded"),
    }
    Ok(())
}
