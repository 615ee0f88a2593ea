use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::collapse::CollapseThresholds;
use crate::export::write_all_views;
use crate::filter::FilterState;
use crate::snapshot::{load_debate_detail, load_debate_list};
use crate::views::{build_dashboard, build_debate_list, DashboardView, DebateListView};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub data_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub debate_id: Option<String>,
    pub filters: FilterState,
    pub thresholds: CollapseThresholds,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub list: DebateListView,
    pub dashboard: Option<DashboardView>,
}

/// Load the snapshot, derive the views for the given selections and, when
/// an output directory is set, write them out.
pub fn run(opts: &RunOptions) -> Result<RunOutput> {
    let pipeline_start = std::time::Instant::now();
    info!(
        "Pipeline started - data_dir={}, debate={}, sort={}",
        opts.data_dir.display(),
        opts.debate_id.as_deref().unwrap_or("-"),
        opts.filters.sort
    );

    let debates = load_debate_list(&opts.data_dir)?;
    if debates.is_empty() {
        warn!("Debate list is empty - data_dir={}", opts.data_dir.display());
    }
    let list = build_debate_list(&debates, &opts.filters, opts.now);
    info!("Debate list built - total={}, listed={}", list.total, list.cards.len());

    let dashboard = match &opts.debate_id {
        Some(id) => {
            let detail = load_debate_detail(&opts.data_dir, id)?;
            let view = build_dashboard(&detail, &opts.filters, &opts.thresholds);
            info!(
                "Dashboard built - id={}, quotes={}, articles={}, network={}",
                view.id,
                view.quotes.matched,
                view.articles.matched,
                view.network.is_some()
            );
            Some(view)
        }
        None => {
            debug!("No debate selected, skipping dashboard");
            None
        }
    };

    if let Some(out) = &opts.output_dir {
        write_all_views(out, &list, dashboard.as_ref())?;
        info!("Views exported - dir={}", out.display());
    }

    info!(
        "Pipeline completed - duration={:.3}s",
        pipeline_start.elapsed().as_secs_f32()
    );
    Ok(RunOutput { list, dashboard })
}
