use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::{fs, path::Path};
use tracing::{debug, info, warn};
use url::Url;

use crate::api_types::*;
use crate::models::*;

pub const DEBATE_LIST_FILE: &str = "debates.json";
pub const UNKNOWN_SPEAKER: &str = "Unknown";
pub const UNKNOWN_SOURCE: &str = "Unknown source";

pub fn debate_detail_file(id: &str) -> String {
    format!("debate_{}.json", id)
}

/// Debate ids are spliced into file names, so an id must not be able to
/// name anything outside its directory.
pub fn check_file_id(id: &str) -> Result<&str> {
    let unsafe_char = id.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if id.trim().is_empty() || id == "." || id == ".." || unsafe_char {
        bail!("Refusing unsafe debate id - id={:?}", id);
    }
    Ok(id)
}

/// Read `debates.json` from the data directory.
///
/// A document without a `debates` key is a valid, empty snapshot.
pub fn load_debate_list(data_dir: &Path) -> Result<Vec<Debate>> {
    let start = std::time::Instant::now();
    let path = data_dir.join(DEBATE_LIST_FILE);
    if !path.is_file() {
        bail!("Debate list not found - path={}", path.display());
    }
    let api: ApiDebateList = read_json(&path)?;

    let debates: Vec<Debate> = match api.debates {
        Some(ds) => ds.into_iter().map(convert_debate).collect(),
        None => {
            warn!("Debate list has no 'debates' key - path={}", path.display());
            Vec::new()
        }
    };

    info!(
        "Debate list loaded - debates={}, duration={:.3}s",
        debates.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(debates)
}

/// Read `debate_<id>.json` from the data directory.
pub fn load_debate_detail(data_dir: &Path, id: &str) -> Result<DebateDetail> {
    let start = std::time::Instant::now();
    let path = data_dir.join(debate_detail_file(check_file_id(id)?));
    let api: ApiDebateDetail = read_json(&path)?;
    let detail = convert_detail(api, id);

    info!(
        "Debate detail loaded - id={}, articles={}, quotes={}, positions={}, edges={}, duration={:.3}s",
        id,
        detail.articles.len(),
        detail.quotes.len(),
        detail.positions.len(),
        detail.network.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(detail)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("Reading snapshot {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Decoding JSON for {}", path.display()))
}

/* -------------------------------------------------------------------------- */
/* Conversion                                                                 */
/* -------------------------------------------------------------------------- */

pub fn convert_debate(a: ApiDebate) -> Debate {
    Debate {
        id: a.id.map(ApiId::into_string).unwrap_or_default(),
        title: a.title.unwrap_or_default().trim().to_string(),
        sector: a.sector.unwrap_or_default(),
        article_count: a.article_count.unwrap_or(0),
        last_article_date: a.last_article_date.as_deref().and_then(parse_timestamp),
        last_updated: a.last_updated.as_deref().and_then(parse_timestamp),
        avg_sentiment: a.avg_sentiment,
        top_companies: a.top_companies.unwrap_or_default(),
        top_politicians: a.top_politicians.unwrap_or_default(),
        top_organizations: a.top_organizations.unwrap_or_default(),
        summary: a.summary.unwrap_or_default(),
    }
}

pub fn convert_detail(api: ApiDebateDetail, id: &str) -> DebateDetail {
    let mut debate = api.debate.map(convert_debate).unwrap_or_else(|| convert_debate(ApiDebate::default()));
    if debate.id.is_empty() {
        debate.id = id.to_string();
    }

    let articles: Vec<Article> = api
        .articles
        .unwrap_or_default()
        .into_iter()
        .map(convert_article)
        .collect();

    let quotes = detect_quote_batch(api.quotes.unwrap_or_default());

    let positions = api.positions_grouped.map(flatten_positions).unwrap_or_default();

    let network: Vec<NetworkEdge> = api
        .quote_network
        .unwrap_or_default()
        .into_iter()
        .map(|e| NetworkEdge {
            from: non_blank(e.from).unwrap_or_else(|| UNKNOWN_SPEAKER.to_string()),
            to: non_blank(e.to).unwrap_or_else(|| "Unknown".to_string()),
            stance: non_blank(e.stance),
        })
        .collect();

    let bias_sources = api
        .source_bias
        .and_then(|b| b.zones)
        .map(flatten_bias_zones)
        .unwrap_or_default();

    let financial: Vec<FinancialAmount> = api
        .financial
        .and_then(|f| f.amounts)
        .unwrap_or_default()
        .into_iter()
        .map(|a| FinancialAmount {
            amount: a.amount.as_ref().and_then(parse_amount),
            unit: non_blank(a.unit),
            context: non_blank(a.context),
            reported_count: a.reported_count,
            count: a.count,
        })
        .collect();

    let entities = api
        .entities
        .map(|e| EntityLists {
            companies: convert_mentions(e.companies),
            politicians: convert_mentions(e.politicians),
            organizations: convert_mentions(e.organizations),
        })
        .unwrap_or_default();

    let summary_stats = api
        .summary_stats
        .map(|s| SummaryStats {
            total_articles: s.total_articles.unwrap_or(0),
            sources: s.sources.unwrap_or(0),
            total_quotes: s.total_quotes.unwrap_or(0),
            total_financial_mentions: s.total_financial_mentions.unwrap_or(0),
        })
        .unwrap_or_default();

    let popularity_trend = api
        .popularity_trend
        .unwrap_or_default()
        .into_iter()
        .map(|p| PopularityPoint {
            date: p.date.unwrap_or_default(),
            count: p.count.unwrap_or(0),
        })
        .collect();

    let sentiment_trend = api
        .sentiment_trend
        .unwrap_or_default()
        .into_iter()
        .map(|p| SentimentPoint {
            date: p.date.unwrap_or_default(),
            avg_sentiment: p.avg_sentiment,
        })
        .collect();

    let key_arguments = api
        .key_arguments
        .map(|k| KeyArguments {
            for_args: k.for_args.unwrap_or_default(),
            against: k.against.unwrap_or_default(),
        })
        .unwrap_or_default();

    let whats_at_stake = api
        .whats_at_stake
        .map(|w| WhatsAtStake {
            winners: w.winners.unwrap_or_default(),
            losers: w.losers.unwrap_or_default(),
            risks: w.risks.unwrap_or_default(),
            opportunities: w.opportunities.unwrap_or_default(),
        })
        .unwrap_or_default();

    DebateDetail {
        debate,
        quotes,
        articles,
        positions,
        network,
        bias_sources,
        financial,
        entities,
        summary_stats,
        popularity_trend,
        sentiment_trend,
        executive_brief: non_blank(api.executive_brief),
        policy_overview: non_blank(api.policy_overview),
        key_arguments,
        whats_at_stake,
    }
}

pub fn convert_article(a: ApiArticle) -> Article {
    let source_name = non_blank(a.source_name)
        .or_else(|| a.source_url.as_deref().and_then(outlet_from_url))
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    Article {
        id: a.id.map(ApiId::into_string).unwrap_or_default(),
        title: a.title.unwrap_or_default().trim().to_string(),
        source_name,
        source_url: a.source_url,
        published_date: a.published_date.as_deref().and_then(parse_timestamp),
        sentiment_label: non_blank(a.sentiment_label),
        sentiment_score: a.sentiment_score,
    }
}

/// Any non-empty `sources` array means the producer already merged quotes;
/// otherwise every record is a single article mention.
pub fn detect_quote_batch(quotes: Vec<ApiQuote>) -> QuoteBatch {
    let attributed = quotes
        .iter()
        .any(|q| q.sources.as_ref().is_some_and(|s| !s.is_empty()));

    debug!("Quote format detected - attributed={}, quotes={}", attributed, quotes.len());

    let usable = quotes
        .into_iter()
        .filter(|q| q.quote_text.as_deref().is_some_and(|t| !t.trim().is_empty()));

    if attributed {
        QuoteBatch::Attributed(
            usable
                .map(|q| AttributedQuote {
                    speaker: non_blank(q.speaker),
                    speaker_role: non_blank(q.speaker_role),
                    quote_text: q.quote_text.unwrap_or_default(),
                    tone: non_blank(q.sentiment).or(non_blank(q.stance)),
                    sources: q.sources.unwrap_or_default(),
                    reported_count: q.reported_count,
                })
                .collect(),
        )
    } else {
        QuoteBatch::PerArticle(
            usable
                .map(|q| RawQuote {
                    speaker: non_blank(q.speaker),
                    speaker_role: non_blank(q.speaker_role),
                    quote_text: q.quote_text.unwrap_or_default(),
                    tone: non_blank(q.sentiment).or(non_blank(q.stance)),
                    article_id: q.article_id.map(ApiId::into_string),
                })
                .collect(),
        )
    }
}

/// Positions arrive pre-grouped; a record's own stance wins over its group.
pub fn flatten_positions(g: ApiPositionsGrouped) -> Vec<Position> {
    let groups = [("support", g.support), ("oppose", g.oppose), ("neutral", g.neutral)];
    let mut out = Vec::new();
    for (group, list) in groups {
        for p in list.unwrap_or_default() {
            out.push(Position {
                speaker: non_blank(p.speaker).unwrap_or_else(|| UNKNOWN_SPEAKER.to_string()),
                role: non_blank(p.role),
                quote: non_blank(p.quote).or(non_blank(p.text)).unwrap_or_default(),
                reasoning: non_blank(p.reasoning),
                confidence: Confidence::parse_lenient(p.confidence.as_deref()),
                stance: non_blank(p.stance).or_else(|| Some(group.to_string())),
            });
        }
    }
    out
}

fn flatten_bias_zones(z: ApiBiasZones) -> Vec<BiasSource> {
    [z.positive, z.neutral, z.negative]
        .into_iter()
        .flat_map(|list| list.unwrap_or_default())
        .map(|s| BiasSource {
            source: non_blank(s.source).unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            article_count: s.article_count.unwrap_or(0),
            avg_sentiment: s.avg_sentiment.unwrap_or(0.0),
        })
        .collect()
}

fn convert_mentions(list: Option<Vec<ApiEntityMention>>) -> Vec<EntityMention> {
    list.unwrap_or_default()
        .into_iter()
        .filter_map(|m| {
            Some(EntityMention {
                name: non_blank(m.name)?,
                count: m.count.unwrap_or(0),
            })
        })
        .collect()
}

/* -------------------------------------------------------------------------- */
/* Helpers                                                                    */
/* -------------------------------------------------------------------------- */

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Amounts show up as numbers, numeric strings, or the literal string "null".
pub fn parse_amount(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("null") {
                None
            } else {
                s.replace(',', "").parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Lenient timestamp parsing: RFC 3339, naive date-time (taken as UTC),
/// bare `YYYY-MM-DD`, or a date embedded anywhere in the string.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    let date = extract_date(s)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn extract_date(s: &str) -> Option<NaiveDate> {
    static DATE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?P<y>\d{4})[/-](?P<m>\d{2})[/-](?P<d>\d{2})").expect("valid date regex")
    });
    let c = DATE_RE.captures(s)?;
    let y = c.name("y")?.as_str().parse().ok()?;
    let m = c.name("m")?.as_str().parse().ok()?;
    let d = c.name("d")?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Host of a source URL without the `www.` prefix.
pub fn outlet_from_url(src: &str) -> Option<String> {
    let u = Url::parse(src.trim()).ok()?;
    let host = u.host_str()?.trim_start_matches("www.");
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_stance_pole, StancePole};
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn timestamps_parse_in_every_supported_shape() {
        let rfc = parse_timestamp("2025-03-04T10:15:00+01:00").unwrap();
        assert_eq!(rfc.hour(), 9);

        let naive = parse_timestamp("2025-03-04T10:15:00.123").unwrap();
        assert_eq!(naive.minute(), 15);

        let bare = parse_timestamp("2025-03-04").unwrap();
        assert_eq!((bare.year(), bare.month(), bare.day()), (2025, 3, 4));

        let embedded = parse_timestamp("published 2025/03/04 morning").unwrap();
        assert_eq!(embedded.day(), 4);
    }

    #[test]
    fn ids_that_could_escape_the_directory_are_refused() {
        assert_eq!(check_file_id("42").unwrap(), "42");
        assert!(check_file_id("steel-tariffs_2025").is_ok());
        for bad in ["../x", "a/b", "a\\b", "..", "", "  ", "x\0y"] {
            assert!(check_file_id(bad).is_err(), "accepted {:?}", bad);
        }
        let err = load_debate_detail(Path::new("."), "../../etc/passwd").unwrap_err();
        assert!(err.to_string().contains("unsafe debate id"));
    }

    #[test]
    fn garbage_timestamps_are_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2025-13-45").is_none());
    }

    #[test]
    fn amounts_accept_numbers_and_numeric_strings() {
        assert_eq!(parse_amount(&json!(1500000)), Some(1_500_000.0));
        assert_eq!(parse_amount(&json!("2,500")), Some(2500.0));
        assert_eq!(parse_amount(&json!("null")), None);
        assert_eq!(parse_amount(&json!(null)), None);
        assert_eq!(parse_amount(&json!("about a lot")), None);
    }

    #[test]
    fn article_source_falls_back_to_host_then_unknown() {
        let named = convert_article(ApiArticle {
            source_name: Some("Reuters".into()),
            source_url: Some("https://www.other.com/x".into()),
            ..Default::default()
        });
        assert_eq!(named.source_name, "Reuters");

        let hosted = convert_article(ApiArticle {
            source_url: Some("https://www.handelsblatt.com/politik/1".into()),
            ..Default::default()
        });
        assert_eq!(hosted.source_name, "handelsblatt.com");

        let unknown = convert_article(ApiArticle::default());
        assert_eq!(unknown.source_name, UNKNOWN_SOURCE);
    }

    #[test]
    fn any_non_empty_sources_array_selects_attributed_format() {
        let quotes = vec![
            ApiQuote {
                quote_text: Some("a".into()),
                sources: Some(vec![]),
                ..Default::default()
            },
            ApiQuote {
                quote_text: Some("b".into()),
                sources: Some(vec!["FT".into()]),
                ..Default::default()
            },
        ];
        assert!(matches!(detect_quote_batch(quotes), QuoteBatch::Attributed(ref qs) if qs.len() == 2));

        let plain = vec![ApiQuote {
            quote_text: Some("a".into()),
            article_id: Some(ApiId::Number(7)),
            ..Default::default()
        }];
        match detect_quote_batch(plain) {
            QuoteBatch::PerArticle(qs) => assert_eq!(qs[0].article_id.as_deref(), Some("7")),
            other => panic!("unexpected batch {:?}", other),
        }
    }

    #[test]
    fn one_raw_stance_lands_on_one_pole_across_records() {
        let api: ApiDebateDetail = serde_json::from_value(json!({
            "quotes": [ { "quote_text": "q", "sentiment": " Support " } ],
            "quote_network": [ { "from": "A", "to": "B", "stance": " Support " } ],
            "positions_grouped": { "neutral": [ { "speaker": "A", "stance": " Support " } ] }
        }))
        .unwrap();
        let detail = convert_detail(api, "1");

        let quote_tone = match &detail.quotes {
            QuoteBatch::PerArticle(qs) => qs[0].tone.clone(),
            other => panic!("unexpected batch {:?}", other),
        };
        let quote_pole = normalize_stance_pole(quote_tone.as_deref());
        let edge_pole = normalize_stance_pole(detail.network[0].stance.as_deref());
        let position_pole = normalize_stance_pole(detail.positions[0].stance.as_deref());

        assert_eq!(quote_pole, StancePole::Support);
        assert_eq!(edge_pole, StancePole::Support);
        assert_eq!(position_pole, StancePole::Support);

        let net = crate::network::classify_network(&detail.network);
        assert_eq!(net.stats.support_edges, 1);
        assert_eq!(crate::summary::bucket_positions(&detail.positions).counts.support, 1);
    }

    #[test]
    fn sentiment_field_wins_over_legacy_stance() {
        let batch = detect_quote_batch(vec![ApiQuote {
            quote_text: Some("x".into()),
            sentiment: Some("negative".into()),
            stance: Some("support".into()),
            ..Default::default()
        }]);
        let QuoteBatch::PerArticle(qs) = batch else { panic!("expected per-article") };
        assert_eq!(qs[0].tone.as_deref(), Some("negative"));
    }

    #[test]
    fn quotes_without_text_are_dropped() {
        let batch = detect_quote_batch(vec![
            ApiQuote::default(),
            ApiQuote {
                quote_text: Some("   ".into()),
                ..Default::default()
            },
        ]);
        assert!(batch.is_empty());
    }

    #[test]
    fn positions_inherit_group_stance_only_when_missing() {
        let grouped = ApiPositionsGrouped {
            support: Some(vec![ApiPosition {
                speaker: Some("A".into()),
                text: Some("fallback text".into()),
                ..Default::default()
            }]),
            oppose: Some(vec![ApiPosition {
                stance: Some("positive".into()),
                confidence: Some("High".into()),
                ..Default::default()
            }]),
            neutral: None,
        };
        let flat = flatten_positions(grouped);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].stance.as_deref(), Some("support"));
        assert_eq!(flat[0].quote, "fallback text");
        assert_eq!(flat[1].stance.as_deref(), Some("positive"));
        assert_eq!(flat[1].speaker, UNKNOWN_SPEAKER);
        assert_eq!(flat[1].confidence, Confidence::High);
    }

    #[test]
    fn empty_detail_document_converts_to_empty_snapshot() {
        let detail = convert_detail(ApiDebateDetail::default(), "42");
        assert_eq!(detail.debate.id, "42");
        assert!(detail.quotes.is_empty());
        assert!(detail.articles.is_empty());
        assert!(detail.network.is_empty());
        assert_eq!(detail.summary_stats, SummaryStats::default());
        assert!(detail.executive_brief.is_none());
    }
}
