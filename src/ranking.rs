use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::models::Debate;

/// Length of the "recently active" window behind the trending order.
pub const TRENDING_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateSort {
    /// Recent article volume first, then recency.
    #[default]
    Trending,
    /// All-time article count.
    Popular,
    /// Latest article date.
    Newest,
}

impl FromStr for DebateSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trending" => Ok(DebateSort::Trending),
            "popular" => Ok(DebateSort::Popular),
            "newest" => Ok(DebateSort::Newest),
            other => Err(format!("unknown sort '{}' (expected trending, popular or newest)", other)),
        }
    }
}

impl fmt::Display for DebateSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebateSort::Trending => write!(f, "trending"),
            DebateSort::Popular => write!(f, "popular"),
            DebateSort::Newest => write!(f, "newest"),
        }
    }
}

/// Article count if the debate saw an article inside the trending window, else 0.
pub fn recent_weight(d: &Debate, now: DateTime<Utc>) -> u32 {
    let cutoff = now - Duration::days(TRENDING_WINDOW_DAYS);
    match d.last_article_date {
        Some(date) if date >= cutoff => d.article_count,
        _ => 0,
    }
}

/// Trending comparator. Two recently active debates compare by recent
/// volume; a recently active debate beats an inactive one; two inactive
/// debates compare by last article date, missing dates last.
pub fn trending_cmp(a: &Debate, b: &Debate, now: DateTime<Utc>) -> Ordering {
    let ar = recent_weight(a, now);
    let br = recent_weight(b, now);
    match (ar > 0, br > 0) {
        (true, true) => br.cmp(&ar),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => b.last_article_date.cmp(&a.last_article_date),
    }
}

/// Stable sort of a copy of `debates`; `now` anchors the trending window.
pub fn sort_debates(debates: &[Debate], key: DebateSort, now: DateTime<Utc>) -> Vec<Debate> {
    let mut sorted = debates.to_vec();
    match key {
        DebateSort::Trending => sorted.sort_by(|a, b| trending_cmp(a, b, now)),
        DebateSort::Popular => sorted.sort_by(|a, b| b.article_count.cmp(&a.article_count)),
        // None < Some, so missing dates land last
        DebateSort::Newest => sorted.sort_by(|a, b| b.last_article_date.cmp(&a.last_article_date)),
    }
    debug!("Debates sorted - key={}, count={}", key, sorted.len());
    sorted
}
