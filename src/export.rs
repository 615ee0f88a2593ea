// src/export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{fs, path::Path};
use tracing::debug;

use crate::snapshot::check_file_id;
use crate::views::{DashboardView, DebateListView};

pub const DEBATE_LIST_VIEW_FILE: &str = "views.debates.json";
pub const INDEX_FILE: &str = "views.index.json";

pub fn dashboard_view_file(id: &str) -> String {
    format!("views.dashboard.{}.json", id)
}

/// Write the derived views as JSON into `out_dir`, plus an index listing them.
pub fn write_all_views(out_dir: &Path, list: &DebateListView, dashboard: Option<&DashboardView>) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

    write_json(out_dir.join(DEBATE_LIST_VIEW_FILE), list)?;
    let mut files = vec![DEBATE_LIST_VIEW_FILE.to_string()];

    if let Some(d) = dashboard {
        let name = dashboard_view_file(check_file_id(&d.id)?);
        write_json(out_dir.join(&name), d)?;
        files.push(name);
    }

    let file_count = files.len() + 1;
    let idx = json!({
        "generated_at": list.generated_at,
        "version": 1,
        "counts": {
            "debates": list.total,
            "listed": list.cards.len(),
            "quotes": dashboard.map(|d| d.quotes.matched),
            "articles": dashboard.map(|d| d.articles.matched),
        },
        "files": files,
    });
    write_json(out_dir.join(INDEX_FILE), &idx)?;

    debug!("Views written - dir={}, files={}", out_dir.display(), file_count);
    Ok(())
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("write {:?}", path))
}
