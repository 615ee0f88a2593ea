use std::collections::HashMap;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::models::{Article, AttributedQuote, MergedQuote, QuoteBatch, RawQuote};
use crate::normalize::fold_key;
use crate::snapshot::{UNKNOWN_SOURCE, UNKNOWN_SPEAKER};

/// Identity of a logical quote: same speaker, same words.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteKey {
    pub speaker: String,
    pub text: String,
}

impl QuoteKey {
    pub fn new(speaker: Option<&str>, text: &str) -> Self {
        QuoteKey {
            speaker: fold_key(speaker.unwrap_or(UNKNOWN_SPEAKER)),
            text: fold_key(text),
        }
    }

    /// Stable id for the key. Fields are length-prefixed so no speaker/text
    /// split can collide with another.
    pub fn stable_id(&self) -> String {
        let seed = format!("{}:{}|{}", self.speaker.len(), self.speaker, self.text);
        format!("{:016x}", xxh3_64(seed.as_bytes()))
    }
}

/// Merge quote mentions into one record per logical quote.
///
/// Upstream-merged batches pass through with their own source lists.
/// Per-article batches are grouped by [`QuoteKey`]: the first speaker
/// spelling, role and tone win, and each mention's article source is added
/// once, in first-seen order. Output order is first-seen order of keys.
pub fn dedupe_quotes(batch: &QuoteBatch, articles: &[Article]) -> Vec<MergedQuote> {
    let merged = match batch {
        QuoteBatch::Attributed(quotes) => pass_through(quotes),
        QuoteBatch::PerArticle(quotes) => group_mentions(quotes, articles),
    };
    debug!("Quote dedupe - input={}, merged={}", batch.len(), merged.len());
    merged
}

fn pass_through(quotes: &[AttributedQuote]) -> Vec<MergedQuote> {
    quotes
        .iter()
        .map(|q| {
            let key = QuoteKey::new(q.speaker.as_deref(), &q.quote_text);
            let reported_count = match q.reported_count {
                Some(n) if n > 0 => n as usize,
                _ => q.sources.len().max(1),
            };
            MergedQuote {
                quote_id: key.stable_id(),
                speaker: q.speaker.clone().unwrap_or_else(|| UNKNOWN_SPEAKER.to_string()),
                speaker_role: q.speaker_role.clone(),
                quote_text: q.quote_text.clone(),
                tone: q.tone.clone(),
                sources: q.sources.clone(),
                reported_count,
            }
        })
        .collect()
}

fn group_mentions(quotes: &[RawQuote], articles: &[Article]) -> Vec<MergedQuote> {
    let source_of: HashMap<&str, &str> = articles
        .iter()
        .map(|a| (a.id.as_str(), a.source_name.as_str()))
        .collect();

    let mut index: HashMap<QuoteKey, usize> = HashMap::new();
    let mut out: Vec<MergedQuote> = Vec::new();

    for q in quotes {
        let key = QuoteKey::new(q.speaker.as_deref(), &q.quote_text);
        let source = q
            .article_id
            .as_deref()
            .and_then(|id| source_of.get(id).copied())
            .unwrap_or(UNKNOWN_SOURCE);

        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                out.push(MergedQuote {
                    quote_id: key.stable_id(),
                    speaker: q.speaker.clone().unwrap_or_else(|| UNKNOWN_SPEAKER.to_string()),
                    speaker_role: q.speaker_role.clone(),
                    quote_text: q.quote_text.clone(),
                    tone: q.tone.clone(),
                    sources: Vec::new(),
                    reported_count: 0,
                });
                index.insert(key, out.len() - 1);
                out.len() - 1
            }
        };

        let merged = &mut out[slot];
        if !merged.sources.iter().any(|s| s == source) {
            merged.sources.push(source.to_string());
        }
        merged.reported_count = merged.sources.len();
    }

    out
}
