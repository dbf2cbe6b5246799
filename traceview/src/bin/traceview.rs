use clap::Parser;
use eyre::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use traceview::config::Config;
use traceview::{
    build_tree, calculate_statistics, filter_events, layout, max_depth, write_analysis,
    AnalysisExport, TraceData, Viewport,
};

#[derive(Parser)]
#[command(name = "traceview")]
#[command(about = "chrome trace analyzer: statistics, filtering and flame graph layout")]
#[command(version)]
struct Args {
    #[arg(help = "trace file path (chrome trace event format json)")]
    trace: String,

    #[arg(short, long, help = "analysis configuration file (toml format)")]
    config: Option<String>,

    #[arg(
        short,
        long,
        help = "write filtered events, statistics and metadata as json"
    )]
    output: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match &args.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("failed to load config path={path}"))?
        }
        None => Config::default(),
    };

    let data = TraceData::parse_file(&args.trace)
        .with_context(|| format!("failed to load trace path={}", args.trace))?;
    tracing::info!(
        events = data.metadata.event_count,
        processes = data.processes.len(),
        "loaded trace"
    );

    let events = data.all_events();
    let filtered = filter_events(&events, &config.filter);
    let statistics = calculate_statistics(&filtered);

    println!("trace: {}", args.trace);
    println!(
        "  events: {} total, {} grouped, {} after filters",
        data.metadata.event_count,
        events.len(),
        filtered.len()
    );
    if data.metadata.event_count > 0 && data.metadata.start_time.is_finite() {
        println!(
            "  time range: {:.1}us .. {:.1}us ({:.1}us)",
            data.metadata.start_time, data.metadata.end_time, data.metadata.total_duration
        );
    }
    for process in &data.processes {
        let events: usize = process.threads.iter().map(|t| t.events.len()).sum();
        println!(
            "  {} (pid {}): {} threads, {} events",
            process.name,
            process.pid,
            process.threads.len(),
            events
        );
    }
    println!("  average duration: {:.1}us", statistics.average_duration);
    if let Some(longest) = &statistics.longest_event {
        println!(
            "  longest: {} ({:.1}us)",
            longest.name,
            longest.dur.unwrap_or(0.0)
        );
    }
    for (category, count) in &statistics.category_distribution {
        let label = if category.is_empty() {
            "(none)"
        } else {
            category.as_str()
        };
        println!("  category {label}: {count}");
    }

    let mut roots = build_tree(&filtered);
    if !roots.is_empty() && data.metadata.start_time.is_finite() {
        let viewport = Viewport::new(data.metadata.start_time, data.metadata.end_time);
        layout(
            &mut roots,
            config.flame.width,
            viewport.start,
            viewport.end,
        );
        println!(
            "  flame graph: {} roots, max depth {}",
            roots.len(),
            max_depth(&roots)
        );
    }

    if let Some(path) = &args.output {
        let file =
            File::create(path).with_context(|| format!("failed to create output path={path}"))?;
        write_analysis(
            BufWriter::new(file),
            &AnalysisExport {
                events: &filtered,
                statistics: &statistics,
                filters: &config.filter,
                metadata: &data.metadata,
            },
        )?;
        tracing::info!(path = %path, events = filtered.len(), "wrote analysis export");
    }

    Ok(())
}
