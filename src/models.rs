use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debate {
    pub id: String,
    pub title: String,
    pub sector: String,
    pub article_count: u32,
    pub last_article_date: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub avg_sentiment: Option<f64>, // [-1.0, 1.0]
    pub top_companies: Vec<String>,
    pub top_politicians: Vec<String>,
    pub top_organizations: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub source_name: String, // resolved at ingestion, never empty
    pub source_url: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
    pub sentiment_label: Option<String>,
    pub sentiment_score: Option<f64>,
}

/// One quote per article mention; merged later by speaker + text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuote {
    pub speaker: Option<String>,
    pub speaker_role: Option<String>,
    pub quote_text: String,
    pub tone: Option<String>, // sentiment field, or stance for older producers
    pub article_id: Option<String>,
}

/// Quote already merged upstream, carrying its own source list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributedQuote {
    pub speaker: Option<String>,
    pub speaker_role: Option<String>,
    pub quote_text: String,
    pub tone: Option<String>,
    pub sources: Vec<String>,
    pub reported_count: Option<u32>,
}

/// Quote input shape, decided once when the snapshot is read.
#[derive(Debug, Clone)]
pub enum QuoteBatch {
    Attributed(Vec<AttributedQuote>),
    PerArticle(Vec<RawQuote>),
}

impl Default for QuoteBatch {
    fn default() -> Self {
        QuoteBatch::PerArticle(Vec::new())
    }
}

impl QuoteBatch {
    pub fn len(&self) -> usize {
        match self {
            QuoteBatch::Attributed(qs) => qs.len(),
            QuoteBatch::PerArticle(qs) => qs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedQuote {
    pub quote_id: String, // stable hash of speaker + text
    pub speaker: String,
    pub speaker_role: Option<String>,
    pub quote_text: String,
    pub tone: Option<String>,
    pub sources: Vec<String>,
    pub reported_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Unknown or missing labels fall back to `Low`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(format!("unknown confidence '{}'", other)),
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub speaker: String,
    pub role: Option<String>,
    pub quote: String,
    pub reasoning: Option<String>,
    pub confidence: Confidence,
    pub stance: Option<String>, // raw; the group name when the record had none
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub from: String,
    pub to: String,
    pub stance: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiasSource {
    pub source: String,
    pub article_count: u32,
    pub avg_sentiment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialAmount {
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub context: Option<String>,
    pub reported_count: Option<u32>,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityMention {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityLists {
    pub companies: Vec<EntityMention>,
    pub politicians: Vec<EntityMention>,
    pub organizations: Vec<EntityMention>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryStats {
    pub total_articles: u32,
    pub sources: u32,
    pub total_quotes: u32,
    pub total_financial_mentions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityPoint {
    pub date: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: String,
    pub avg_sentiment: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyArguments {
    #[serde(rename = "for")]
    pub for_args: Vec<String>,
    pub against: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhatsAtStake {
    pub winners: Vec<String>,
    pub losers: Vec<String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
}

/// Everything known about one debate, as read from its detail document.
#[derive(Debug, Clone)]
pub struct DebateDetail {
    pub debate: Debate,
    pub quotes: QuoteBatch,
    pub articles: Vec<Article>,
    pub positions: Vec<Position>,
    pub network: Vec<NetworkEdge>,
    pub bias_sources: Vec<BiasSource>,
    pub financial: Vec<FinancialAmount>,
    pub entities: EntityLists,
    pub summary_stats: SummaryStats,
    pub popularity_trend: Vec<PopularityPoint>,
    pub sentiment_trend: Vec<SentimentPoint>,
    pub executive_brief: Option<String>,
    pub policy_overview: Option<String>,
    pub key_arguments: KeyArguments,
    pub whats_at_stake: WhatsAtStake,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_defaults_to_low() {
        assert_eq!(Confidence::parse_lenient(None), Confidence::Low);
        assert_eq!(Confidence::parse_lenient(Some("very sure")), Confidence::Low);
        assert_eq!(Confidence::parse_lenient(Some(" HIGH ")), Confidence::High);
        assert_eq!(Confidence::parse_lenient(Some("Medium")), Confidence::Medium);
    }

    #[test]
    fn empty_quote_batch_is_per_article() {
        let b = QuoteBatch::default();
        assert!(b.is_empty());
        assert!(matches!(b, QuoteBatch::PerArticle(_)));
    }
}
