use serde::Serialize;
use tracing::debug;

use crate::models::{BiasSource, EntityLists, EntityMention, FinancialAmount, Position, SentimentPoint};
use crate::normalize::{classify_score, normalize_stance_pole, SentimentPole, StancePole};

/// Entity tags shown per category.
pub const ENTITY_TAG_LIMIT: usize = 10;

/* -------------------------------------------------------------------------- */
/* Source bias                                                                */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BiasSummary {
    pub total_count: usize,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BiasZones {
    pub positive: Vec<BiasSource>,
    pub neutral: Vec<BiasSource>,
    pub negative: Vec<BiasSource>,
    pub summary: BiasSummary,
}

/// Bucket outlets by average sentiment with the shared strict threshold.
/// Each zone keeps input order.
pub fn bucket_bias_sources(sources: &[BiasSource]) -> BiasZones {
    let mut zones = BiasZones::default();
    for s in sources {
        match classify_score(Some(s.avg_sentiment)) {
            SentimentPole::Positive => zones.positive.push(s.clone()),
            SentimentPole::Neutral => zones.neutral.push(s.clone()),
            SentimentPole::Negative => zones.negative.push(s.clone()),
        }
    }
    zones.summary = BiasSummary {
        total_count: sources.len(),
        positive_count: zones.positive.len(),
        neutral_count: zones.neutral.len(),
        negative_count: zones.negative.len(),
    };
    zones
}

/* -------------------------------------------------------------------------- */
/* Positions                                                                  */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionCounts {
    pub support: usize,
    pub oppose: usize,
    pub neutral: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PositionBuckets {
    pub support: Vec<Position>,
    pub oppose: Vec<Position>,
    pub neutral: Vec<Position>,
    pub counts: PositionCounts,
}

impl PositionBuckets {
    pub fn is_empty(&self) -> bool {
        self.counts.total == 0
    }
}

pub fn bucket_positions(positions: &[Position]) -> PositionBuckets {
    let mut b = PositionBuckets::default();
    for p in positions {
        match normalize_stance_pole(p.stance.as_deref()) {
            StancePole::Support => b.support.push(p.clone()),
            StancePole::Oppose => b.oppose.push(p.clone()),
            StancePole::Neutral => b.neutral.push(p.clone()),
        }
    }
    b.counts = PositionCounts {
        support: b.support.len(),
        oppose: b.oppose.len(),
        neutral: b.neutral.len(),
        total: positions.len(),
    };
    b
}

/* -------------------------------------------------------------------------- */
/* Financial mentions                                                         */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialMention {
    pub amount: f64,
    pub unit: Option<String>,
    pub context: Option<String>,
    pub count: u32,
}

/// Drop mentions without an amount and rank the rest by how often they
/// were reported. Zero counts fall through to the next field, then to 1.
pub fn summarize_financial(amounts: &[FinancialAmount]) -> Vec<FinancialMention> {
    let mut out: Vec<FinancialMention> = amounts
        .iter()
        .filter_map(|a| {
            let amount = a.amount?;
            let count = [a.reported_count, a.count]
                .into_iter()
                .flatten()
                .find(|&c| c > 0)
                .unwrap_or(1);
            Some(FinancialMention {
                amount,
                unit: a.unit.clone(),
                context: a.context.clone(),
                count,
            })
        })
        .collect();
    out.sort_by_key(|m| std::cmp::Reverse(m.count));
    debug!("Financial mentions summarized - input={}, kept={}", amounts.len(), out.len());
    out
}

/* -------------------------------------------------------------------------- */
/* Entities and trends                                                        */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityRollup {
    pub companies: Vec<EntityMention>,
    pub politicians: Vec<EntityMention>,
    pub organizations: Vec<EntityMention>,
}

/// First `limit` mentions per category, in producer order.
pub fn top_entities(entities: &EntityLists, limit: usize) -> EntityRollup {
    let take = |list: &[EntityMention]| list.iter().take(limit).cloned().collect::<Vec<_>>();
    EntityRollup {
        companies: take(&entities.companies),
        politicians: take(&entities.politicians),
        organizations: take(&entities.organizations),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPoint {
    pub date: String,
    pub avg_sentiment: Option<f64>,
    pub pole: SentimentPole,
}

/// Sentiment trend points tagged with their pole, for point colouring.
pub fn annotate_sentiment_trend(points: &[SentimentPoint]) -> Vec<ScoredPoint> {
    points
        .iter()
        .map(|p| ScoredPoint {
            date: p.date.clone(),
            avg_sentiment: p.avg_sentiment,
            pole: classify_score(p.avg_sentiment),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;

    fn outlet(name: &str, avg: f64) -> BiasSource {
        BiasSource {
            source: name.into(),
            article_count: 1,
            avg_sentiment: avg,
        }
    }

    fn position(speaker: &str, stance: Option<&str>) -> Position {
        Position {
            speaker: speaker.into(),
            role: None,
            quote: String::new(),
            reasoning: None,
            confidence: Confidence::default(),
            stance: stance.map(String::from),
        }
    }

    fn amount(v: Option<f64>, reported: Option<u32>, count: Option<u32>) -> FinancialAmount {
        FinancialAmount {
            amount: v,
            unit: None,
            context: None,
            reported_count: reported,
            count,
        }
    }

    #[test]
    fn bias_threshold_is_strict() {
        let zones = bucket_bias_sources(&[outlet("a", 0.16), outlet("b", 0.15), outlet("c", -0.2)]);
        assert_eq!(zones.positive, vec![outlet("a", 0.16)]);
        assert_eq!(zones.neutral, vec![outlet("b", 0.15)]);
        assert_eq!(zones.negative, vec![outlet("c", -0.2)]);
        assert_eq!(
            zones.summary,
            BiasSummary {
                total_count: 3,
                positive_count: 1,
                neutral_count: 1,
                negative_count: 1
            }
        );
    }

    #[test]
    fn bias_zones_keep_input_order() {
        let zones = bucket_bias_sources(&[outlet("z", 0.5), outlet("a", 0.9)]);
        let names: Vec<&str> = zones.positive.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn positions_bucket_with_the_shared_vocabulary() {
        let b = bucket_positions(&[
            position("a", Some("support")),
            position("b", Some("negative")),
            position("c", Some("positive")),
            position("d", None),
        ]);
        assert_eq!(b.counts, PositionCounts { support: 2, oppose: 1, neutral: 1, total: 4 });
        assert_eq!(b.support[1].speaker, "c");
        assert!(!b.is_empty());
        assert!(bucket_positions(&[]).is_empty());
    }

    #[test]
    fn financial_drops_missing_amounts_and_ranks_by_count() {
        let out = summarize_financial(&[
            amount(Some(1.0), None, None),
            amount(None, Some(9), None),
            amount(Some(2.0), Some(0), Some(3)),
            amount(Some(3.0), Some(5), Some(1)),
        ]);
        let got: Vec<(f64, u32)> = out.iter().map(|m| (m.amount, m.count)).collect();
        assert_eq!(got, vec![(3.0, 5), (2.0, 3), (1.0, 1)]);
    }

    #[test]
    fn entity_rollup_caps_each_category() {
        let many: Vec<EntityMention> = (0..15)
            .map(|i| EntityMention {
                name: format!("e{i}"),
                count: 1,
            })
            .collect();
        let lists = EntityLists {
            companies: many.clone(),
            politicians: many[..3].to_vec(),
            organizations: vec![],
        };
        let r = top_entities(&lists, ENTITY_TAG_LIMIT);
        assert_eq!(r.companies.len(), 10);
        assert_eq!(r.companies[0].name, "e0");
        assert_eq!(r.politicians.len(), 3);
        assert!(r.organizations.is_empty());
    }

    #[test]
    fn trend_points_get_score_poles() {
        let pts = annotate_sentiment_trend(&[
            SentimentPoint { date: "2025-01-01".into(), avg_sentiment: Some(0.4) },
            SentimentPoint { date: "2025-01-02".into(), avg_sentiment: None },
        ]);
        assert_eq!(pts[0].pole, SentimentPole::Positive);
        assert_eq!(pts[1].pole, SentimentPole::Neutral);
    }
}
