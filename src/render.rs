// src/render.rs
use chrono::{DateTime, Duration, Utc};

use crate::normalize::SENTIMENT_THRESHOLD;
use crate::views::{DashboardView, DebateListView};

/// Scores beyond this are plain Positive/Negative rather than "Slightly".
const STRONG_SENTIMENT: f64 = 0.3;

pub fn sentiment_label(score: Option<f64>) -> &'static str {
    match score {
        None => "Mixed",
        Some(s) if s > STRONG_SENTIMENT => "Positive",
        Some(s) if s > SENTIMENT_THRESHOLD => "Slightly Positive",
        Some(s) if s < -STRONG_SENTIMENT => "Negative",
        Some(s) if s < -SENTIMENT_THRESHOLD => "Slightly Negative",
        Some(_) => "Neutral",
    }
}

/// "4 Mar 2025", or "Unknown date".
pub fn format_date(dt: Option<DateTime<Utc>>) -> String {
    match dt {
        Some(d) => d.format("%-d %b %Y").to_string(),
        None => "Unknown date".to_string(),
    }
}

/// "12m ago" under an hour, "5h ago" under a day, "3d ago" under a week,
/// otherwise the date. Timestamps ahead of `now` read as "0m ago".
pub fn relative_age(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - dt).max(Duration::zero());
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();
    if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        format_date(Some(dt))
    }
}

/// Compact money/quantity display: 1.5K, 2.0M, 3.1B, 4.0T. Zero or missing is "-".
pub fn format_amount(amount: Option<f64>, unit: Option<&str>) -> String {
    let amount = match amount {
        Some(a) if a != 0.0 => a,
        _ => return "-".to_string(),
    };
    let formatted = if amount >= 1e12 {
        format!("{:.1}T", amount / 1e12)
    } else if amount >= 1e9 {
        format!("{:.1}B", amount / 1e9)
    } else if amount >= 1e6 {
        format!("{:.1}M", amount / 1e6)
    } else if amount >= 1e3 {
        format!("{:.1}K", amount / 1e3)
    } else if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        let s = format!("{:.2}", amount);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    match unit {
        Some(u) if !u.trim().is_empty() => format!("{} {}", formatted, u.trim()),
        _ => formatted,
    }
}

/// Split on blank lines, dropping empty paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() > max_chars {
        let cut: String = title.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}

pub fn render_debate_list_markdown(v: &DebateListView) -> String {
    let mut md = String::new();
    md.push_str("# Policy Debates\n\n");
    md.push_str(&format!(
        "_{} of {} debates, sorted by {}_\n\n",
        v.cards.len(),
        v.total,
        v.sort
    ));

    if v.cards.is_empty() {
        md.push_str("No debates found.\n");
        return md;
    }

    for c in &v.cards {
        if c.sector.is_empty() {
            md.push_str(&format!("## {}\n", c.title));
        } else {
            md.push_str(&format!("## [{}] {}\n", c.sector, c.title));
        }
        md.push_str(&format!(
            "- {} articles, last {} ({})\n",
            c.article_count, c.date_display, c.sentiment_label
        ));
        if let Some(u) = &c.updated_display {
            md.push_str(&format!("- Updated {}\n", u));
        }
        if !c.top_companies.is_empty() {
            md.push_str(&format!("- Companies: {}\n", c.top_companies.join(", ")));
        }
        md.push('\n');
    }
    md
}

pub fn render_dashboard_markdown(d: &DashboardView) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", d.title));
    if !d.summary.trim().is_empty() {
        md.push_str(&format!("{}\n\n", d.summary.trim()));
    }

    md.push_str(&format!(
        "**{}** articles · **{}** sources · **{}** quotes · **{}** financial mentions\n\n",
        d.metrics.total_articles, d.metrics.sources, d.metrics.total_quotes, d.metrics.total_financial_mentions
    ));

    if let Some(brief) = &d.executive_brief {
        md.push_str("## Executive Brief\n");
        for p in brief {
            md.push_str(&format!("{}\n\n", p));
        }
    }

    if let Some(args) = &d.key_arguments {
        md.push_str("## Key Arguments\n");
        for a in &args.for_args {
            md.push_str(&format!("- For: {}\n", a));
        }
        for a in &args.against {
            md.push_str(&format!("- Against: {}\n", a));
        }
        md.push('\n');
    }

    if let Some(p) = &d.positions {
        md.push_str("## Positions\n");
        md.push_str(&format!(
            "{} total · {} support · {} neutral · {} oppose\n\n",
            p.counts.total, p.counts.support, p.counts.neutral, p.counts.oppose
        ));
        for (label, col) in [("Support", &p.support), ("Oppose", &p.oppose), ("Neutral", &p.neutral)] {
            if col.total() == 0 {
                continue;
            }
            md.push_str(&format!("### {}\n", label));
            for pos in &col.visible {
                md.push_str(&format!("- **{}** ({}): \"{}\"\n", pos.speaker, pos.confidence, pos.quote));
            }
            if col.needs_toggle() {
                md.push_str(&format!("- _+{} more_\n", col.hidden.len()));
            }
            md.push('\n');
        }
    }

    if let Some(net) = &d.network {
        md.push_str("## Quote Network\n");
        md.push_str(&format!(
            "{} speakers · {} entities · {} support · {} oppose · {} neutral edges\n\n",
            net.stats.total_speakers,
            net.stats.total_entities,
            net.stats.support_edges,
            net.stats.oppose_edges,
            net.stats.neutral_edges
        ));
        for (label, rows) in [
            ("Most active speakers", &net.top_speakers),
            ("Controversial", &net.controversial),
            ("Consensus", &net.consensus),
        ] {
            if rows.total() == 0 {
                continue;
            }
            md.push_str(&format!("### {}\n", label));
            for r in &rows.visible {
                md.push_str(&format!(
                    "- {}: {} support / {} neutral / {} oppose\n",
                    r.name, r.tally.support, r.tally.neutral, r.tally.oppose
                ));
            }
            if rows.needs_toggle() {
                md.push_str(&format!("- _+{} more_\n", rows.hidden.len()));
            }
            md.push('\n');
        }
    }

    md.push_str("## Quotes\n");
    if d.quotes.matched == 0 {
        md.push_str("No quotes found.\n\n");
    } else {
        for q in &d.quotes.list.visible {
            let mut sources = q.visible_sources.join(", ");
            if !q.hidden_sources.is_empty() {
                sources.push_str(&format!(" +{} more", q.hidden_sources.len()));
            }
            md.push_str(&format!(
                "- \"{}\" ({}, {}) [{}]\n",
                q.quote_text, q.speaker, q.sentiment, sources
            ));
        }
        if d.quotes.list.needs_toggle() {
            md.push_str(&format!("- _+{} more_\n", d.quotes.list.hidden.len()));
        }
        md.push('\n');
    }

    md.push_str("## Articles\n");
    if d.articles.matched == 0 {
        md.push_str("No articles found.\n");
    } else {
        for a in &d.articles.list.visible {
            md.push_str(&format!("- {} ({} · {}, {})\n", a.title, a.source_name, a.date_display, a.sentiment));
        }
        if d.articles.list.needs_toggle() {
            md.push_str(&format!("- _+{} more_\n", d.articles.list.hidden.len()));
        }
    }

    if d.financial.total() > 0 {
        md.push_str("\n## Financial Mentions\n");
        for f in &d.financial.visible {
            let times = if f.count > 1 { format!(" ({}×)", f.count) } else { String::new() };
            md.push_str(&format!(
                "- {}{}{}\n",
                format_amount(Some(f.amount), f.unit.as_deref()),
                f.context.as_deref().map(|c| format!(": {}", c)).unwrap_or_default(),
                times
            ));
        }
    }

    md
}
