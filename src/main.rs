use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use debate_lens::collapse::CollapseThresholds;
use debate_lens::filter::{Facet, FilterState};
use debate_lens::normalize::SentimentPole;
use debate_lens::orchestrator::{run, RunOptions};
use debate_lens::ranking::DebateSort;
use debate_lens::render::{render_dashboard_markdown, render_debate_list_markdown};

/// Debate Lens - derived views over policy-debate snapshots
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding debates.json and debate_<id>.json (overrides DEBATE_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Debate id to build the dashboard for
    #[arg(long)]
    debate: Option<String>,

    /// Sector filter ("all" for every sector)
    #[arg(long, default_value = "all")]
    sector: Facet<String>,

    /// Search query; every term must match
    #[arg(short, long, default_value = "")]
    query: String,

    /// Debate order: trending, popular or newest
    #[arg(long, default_value = "trending")]
    sort: DebateSort,

    /// Quote sentiment filter: all, positive, negative or neutral
    #[arg(long, default_value = "all")]
    quote_sentiment: Facet<SentimentPole>,

    /// Quote speaker filter ("all" for every speaker)
    #[arg(long, default_value = "all")]
    speaker: Facet<String>,

    /// Article sentiment filter: all, positive, negative or neutral
    #[arg(long, default_value = "all")]
    article_sentiment: Facet<SentimentPole>,

    /// Article source filter ("all" for every source)
    #[arg(long, default_value = "all")]
    source: Facet<String>,

    /// Write view JSON files into this directory
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Print the views as markdown to stdout
    #[arg(long)]
    markdown: bool,
}

fn resolve_data_dir(arg: Option<&str>) -> PathBuf {
    if let Some(dir) = arg {
        return PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("DEBATE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from("data")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("Starting debate_lens");

    let data_dir = resolve_data_dir(args.data_dir.as_deref());
    debug!("Using data directory: {}", data_dir.display());

    let filters = FilterState {
        sector: args.sector,
        query: args.query,
        sort: args.sort,
        quote_sentiment: args.quote_sentiment,
        speaker: args.speaker,
        article_sentiment: args.article_sentiment,
        source: args.source,
    };

    let opts = RunOptions {
        data_dir,
        output_dir: args.output_dir.map(PathBuf::from),
        debate_id: args.debate,
        filters,
        thresholds: CollapseThresholds::default(),
        now: Utc::now(),
    };

    let out = run(&opts)?;

    if args.markdown {
        println!("{}", render_debate_list_markdown(&out.list));
        if let Some(d) = &out.dashboard {
            println!("{}", render_dashboard_markdown(d));
        }
    }
    Ok(())
}
