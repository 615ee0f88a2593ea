use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::models::NetworkEdge;
use crate::normalize::{normalize_stance_pole, StancePole};

/// Edge counts per stance pole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StanceTally {
    pub support: u32,
    pub oppose: u32,
    pub neutral: u32,
    pub total: u32,
}

/// Percentage split of a tally. Support and oppose are rounded; neutral
/// takes the remainder so the three always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StanceShares {
    pub support_pct: u32,
    pub oppose_pct: u32,
    pub neutral_pct: u32,
}

impl StanceTally {
    pub fn record(&mut self, pole: StancePole) {
        match pole {
            StancePole::Support => self.support += 1,
            StancePole::Oppose => self.oppose += 1,
            StancePole::Neutral => self.neutral += 1,
        }
        self.total += 1;
    }

    pub fn poles_present(&self) -> usize {
        [self.support, self.oppose, self.neutral]
            .iter()
            .filter(|&&c| c > 0)
            .count()
    }

    /// Both extreme poles present, whatever the neutral count.
    pub fn is_controversial(&self) -> bool {
        self.support > 0 && self.oppose > 0
    }

    /// Exactly one pole present.
    pub fn is_consensus(&self) -> bool {
        self.poles_present() == 1
    }

    /// The pole a consensus tally agrees on.
    pub fn sole_pole(&self) -> Option<StancePole> {
        if !self.is_consensus() {
            return None;
        }
        Some(if self.support > 0 {
            StancePole::Support
        } else if self.oppose > 0 {
            StancePole::Oppose
        } else {
            StancePole::Neutral
        })
    }

    pub fn shares(&self) -> StanceShares {
        let total = (self.support + self.oppose + self.neutral).max(1) as f64;
        let support_pct = (self.support as f64 / total * 100.0).round() as u32;
        let oppose_pct = (self.oppose as f64 / total * 100.0).round() as u32;
        StanceShares {
            support_pct,
            oppose_pct,
            neutral_pct: 100u32.saturating_sub(support_pct + oppose_pct),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerActivity {
    pub name: String,
    pub tally: StanceTally,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityActivity {
    pub name: String,
    pub tally: StanceTally,
    pub speakers: Vec<String>, // distinct, first-seen order
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub total_speakers: usize,
    pub total_entities: usize,
    pub support_edges: u32,
    pub oppose_edges: u32,
    pub neutral_edges: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkClassification {
    pub top_speakers: Vec<SpeakerActivity>,
    pub controversial: Vec<EntityActivity>,
    pub consensus: Vec<EntityActivity>,
    /// Entities in neither cohort: neutral plus exactly one extreme pole.
    pub unclassified: Vec<EntityActivity>,
    pub stats: NetworkStats,
}

/// Tally speaker→entity stance edges and split entities into cohorts.
///
/// Controversial entities drew both support and opposition and rank by
/// support + oppose. Consensus entities drew a single pole and rank by
/// total. Speakers rank by total edges. All rankings are stable, so ties
/// keep first-seen order.
pub fn classify_network(edges: &[NetworkEdge]) -> NetworkClassification {
    let mut speakers: Vec<SpeakerActivity> = Vec::new();
    let mut speaker_idx: HashMap<&str, usize> = HashMap::new();
    let mut entities: Vec<EntityActivity> = Vec::new();
    let mut entity_idx: HashMap<&str, usize> = HashMap::new();
    let mut stats = NetworkStats::default();

    for e in edges {
        let pole = normalize_stance_pole(e.stance.as_deref());
        match pole {
            StancePole::Support => stats.support_edges += 1,
            StancePole::Oppose => stats.oppose_edges += 1,
            StancePole::Neutral => stats.neutral_edges += 1,
        }

        let si = *speaker_idx.entry(e.from.as_str()).or_insert_with(|| {
            speakers.push(SpeakerActivity {
                name: e.from.clone(),
                tally: StanceTally::default(),
            });
            speakers.len() - 1
        });
        speakers[si].tally.record(pole);

        let ei = *entity_idx.entry(e.to.as_str()).or_insert_with(|| {
            entities.push(EntityActivity {
                name: e.to.clone(),
                tally: StanceTally::default(),
                speakers: Vec::new(),
            });
            entities.len() - 1
        });
        let entity = &mut entities[ei];
        entity.tally.record(pole);
        if !entity.speakers.iter().any(|s| s == &e.from) {
            entity.speakers.push(e.from.clone());
        }
    }

    stats.total_speakers = speakers.len();
    stats.total_entities = entities.len();

    let mut controversial = Vec::new();
    let mut consensus = Vec::new();
    let mut unclassified = Vec::new();
    for entity in entities {
        if entity.tally.is_controversial() {
            controversial.push(entity);
        } else if entity.tally.is_consensus() {
            consensus.push(entity);
        } else {
            unclassified.push(entity);
        }
    }

    controversial.sort_by_key(|e| std::cmp::Reverse(e.tally.support + e.tally.oppose));
    consensus.sort_by_key(|e| std::cmp::Reverse(e.tally.total));
    speakers.sort_by_key(|s| std::cmp::Reverse(s.tally.total));

    debug!(
        "Network classified - edges={}, speakers={}, entities={}, controversial={}, consensus={}, unclassified={}",
        edges.len(),
        stats.total_speakers,
        stats.total_entities,
        controversial.len(),
        consensus.len(),
        unclassified.len()
    );

    NetworkClassification {
        top_speakers: speakers,
        controversial,
        consensus,
        unclassified,
        stats,
    }
}
