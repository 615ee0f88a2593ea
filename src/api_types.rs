use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Wire shapes of the snapshot documents. Every field is optional and decoded
// leniently: a missing or wrongly typed value becomes `None` instead of
// failing the whole document. Defaults are applied in `snapshot`.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiId {
    Text(String),
    Number(i64),
}

impl ApiId {
    pub fn into_string(self) -> String {
        match self {
            ApiId::Text(s) => s,
            ApiId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiDebateList {
    #[serde(default, deserialize_with = "lenient_list")]
    pub debates: Option<Vec<ApiDebate>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiDebate {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<ApiId>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub article_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_article_date: Option<String>, // ISO8601 or "YYYY-MM-DD"
    #[serde(default, deserialize_with = "lenient")]
    pub last_updated: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub avg_sentiment: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub top_companies: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub top_politicians: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub top_organizations: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiDebateDetail {
    #[serde(default, deserialize_with = "lenient")]
    pub debate: Option<ApiDebate>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub quotes: Option<Vec<ApiQuote>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub articles: Option<Vec<ApiArticle>>,
    #[serde(default, deserialize_with = "lenient")]
    pub positions_grouped: Option<ApiPositionsGrouped>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub quote_network: Option<Vec<ApiNetworkEdge>>,
    #[serde(default, deserialize_with = "lenient")]
    pub source_bias: Option<ApiSourceBias>,
    #[serde(default, deserialize_with = "lenient")]
    pub financial: Option<ApiFinancial>,
    #[serde(default, deserialize_with = "lenient")]
    pub entities: Option<ApiEntities>,
    #[serde(default, deserialize_with = "lenient")]
    pub summary_stats: Option<ApiSummaryStats>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub popularity_trend: Option<Vec<ApiPopularityPoint>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub sentiment_trend: Option<Vec<ApiSentimentPoint>>,
    #[serde(default, deserialize_with = "lenient")]
    pub executive_brief: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub policy_overview: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub key_arguments: Option<ApiKeyArguments>,
    #[serde(default, deserialize_with = "lenient")]
    pub whats_at_stake: Option<ApiWhatsAtStake>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiArticle {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<ApiId>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub source_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub source_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub published_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sentiment_label: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub sentiment_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiQuote {
    #[serde(default, deserialize_with = "lenient")]
    pub speaker: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub speaker_role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub quote_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sentiment: Option<String>, // newer producers
    #[serde(default, deserialize_with = "lenient")]
    pub stance: Option<String>, // legacy producers
    #[serde(default, deserialize_with = "lenient_list")]
    pub sources: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reported_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub article_id: Option<ApiId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiPositionsGrouped {
    #[serde(default, deserialize_with = "lenient_list")]
    pub support: Option<Vec<ApiPosition>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub oppose: Option<Vec<ApiPosition>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub neutral: Option<Vec<ApiPosition>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiPosition {
    #[serde(default, deserialize_with = "lenient")]
    pub speaker: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub quote: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub confidence: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stance: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiNetworkEdge {
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stance: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSourceBias {
    #[serde(default, deserialize_with = "lenient")]
    pub zones: Option<ApiBiasZones>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiBiasZones {
    #[serde(default, deserialize_with = "lenient_list")]
    pub positive: Option<Vec<ApiBiasSource>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub neutral: Option<Vec<ApiBiasSource>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub negative: Option<Vec<ApiBiasSource>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiBiasSource {
    #[serde(default, deserialize_with = "lenient")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub article_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub avg_sentiment: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiFinancial {
    #[serde(default, deserialize_with = "lenient_list")]
    pub amounts: Option<Vec<ApiFinancialAmount>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiFinancialAmount {
    #[serde(default)]
    pub amount: Option<serde_json::Value>, // number, numeric string, or "null"
    #[serde(default, deserialize_with = "lenient")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub context: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reported_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiEntities {
    #[serde(default, deserialize_with = "lenient_list")]
    pub companies: Option<Vec<ApiEntityMention>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub politicians: Option<Vec<ApiEntityMention>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub organizations: Option<Vec<ApiEntityMention>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiEntityMention {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSummaryStats {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_articles: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sources: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_quotes: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_financial_mentions: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiPopularityPoint {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSentimentPoint {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub avg_sentiment: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeyArguments {
    #[serde(default, deserialize_with = "lenient_list", rename = "for")]
    pub for_args: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub against: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiWhatsAtStake {
    #[serde(default, deserialize_with = "lenient_list")]
    pub winners: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub losers: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub risks: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub opportunities: Option<Vec<String>>,
}

/* -------------------------------------------------------------------------- */
/* Lenient field decoding                                                     */
/* -------------------------------------------------------------------------- */

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps the elements that decode and drops the rest, nulls included.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Counts also arrive as integral floats (`3.0`) or numeric strings.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(count)
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let score = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score.filter(|f| f.is_finite()))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<ApiId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Value::deserialize(deserializer)? {
        Value::String(s) => Some(ApiId::Text(s)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(ApiId::Number(i)),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(ApiId::Number(f as i64)),
                _ => Some(ApiId::Text(n.to_string())),
            },
        },
        _ => None,
    };
    Ok(id)
}
