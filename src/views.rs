use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::collapse::{split_visible, CollapseThresholds, Collapsed};
use crate::dedupe::dedupe_quotes;
use crate::filter::{
    apply_debate_filters, article_pole_counts, article_sentiment, filter_articles, filter_quotes, quote_pole_counts,
    source_options, speaker_options, Facet, FacetOption, FilterState, PoleCounts,
};
use crate::models::*;
use crate::network::{classify_network, EntityActivity, NetworkStats, SpeakerActivity, StanceShares, StanceTally};
use crate::normalize::{classify_score, normalize_sentiment_pole, SentimentPole, StancePole};
use crate::ranking::{recent_weight, DebateSort};
use crate::render::{format_date, relative_age, sentiment_label, split_paragraphs, truncate_title};
use crate::summary::{
    annotate_sentiment_trend, bucket_bias_sources, bucket_positions, summarize_financial, top_entities, BiasSummary,
    EntityRollup, FinancialMention, PositionCounts, ScoredPoint, ENTITY_TAG_LIMIT,
};

/// Sources listed inline on a quote card before "+N more".
pub const QUOTE_SOURCES_VISIBLE: usize = 3;
/// Companies shown on a debate card.
pub const CARD_COMPANIES: usize = 3;
pub const CARD_TITLE_CHARS: usize = 100;

/* -------------------------------------------------------------------------- */
/* Debate list                                                                */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Serialize)]
pub struct DebateCard {
    pub id: String,
    pub title: String,
    pub sector: String,
    pub article_count: u32,
    pub recent_weight: u32,
    pub last_article_date: Option<DateTime<Utc>>,
    pub date_display: String,
    pub updated_display: Option<String>,
    pub sentiment: SentimentPole,
    pub sentiment_label: String,
    pub top_companies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebateListView {
    pub generated_at: DateTime<Utc>,
    pub sort: DebateSort,
    pub sector: Option<String>,
    pub query: String,
    pub total: usize,
    pub sectors: Vec<String>,
    pub cards: Vec<DebateCard>,
}

pub fn debate_card(d: &Debate, now: DateTime<Utc>) -> DebateCard {
    DebateCard {
        id: d.id.clone(),
        title: truncate_title(&d.title, CARD_TITLE_CHARS),
        sector: d.sector.clone(),
        article_count: d.article_count,
        recent_weight: recent_weight(d, now),
        last_article_date: d.last_article_date,
        date_display: format_date(d.last_article_date),
        updated_display: d.last_updated.map(|t| relative_age(t, now)),
        sentiment: classify_score(d.avg_sentiment),
        sentiment_label: sentiment_label(d.avg_sentiment).to_string(),
        top_companies: d.top_companies.iter().take(CARD_COMPANIES).cloned().collect(),
    }
}

pub fn build_debate_list(debates: &[Debate], state: &FilterState, now: DateTime<Utc>) -> DebateListView {
    let filtered = apply_debate_filters(debates, state, now);
    let cards: Vec<DebateCard> = filtered.iter().map(|d| debate_card(d, now)).collect();
    let sectors: Vec<String> = debates
        .iter()
        .map(|d| d.sector.clone())
        .filter(|s| !s.is_empty())
        .unique()
        .collect();

    DebateListView {
        generated_at: now,
        sort: state.sort,
        sector: match &state.sector {
            Facet::All => None,
            Facet::Only(s) => Some(s.clone()),
        },
        query: state.query.clone(),
        total: debates.len(),
        sectors,
        cards,
    }
}

/* -------------------------------------------------------------------------- */
/* Dashboard                                                                  */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Serialize)]
pub struct QuoteCard {
    pub quote_id: String,
    pub speaker: String,
    pub speaker_role: Option<String>,
    pub quote_text: String,
    pub sentiment: SentimentPole,
    pub reported_count: usize,
    pub visible_sources: Vec<String>,
    pub hidden_sources: Vec<String>,
}

impl From<&MergedQuote> for QuoteCard {
    fn from(q: &MergedQuote) -> Self {
        let sources = split_visible(&q.sources, QUOTE_SOURCES_VISIBLE);
        QuoteCard {
            quote_id: q.quote_id.clone(),
            speaker: q.speaker.clone(),
            speaker_role: q.speaker_role.clone(),
            quote_text: q.quote_text.clone(),
            sentiment: normalize_sentiment_pole(q.tone.as_deref()),
            reported_count: q.reported_count,
            visible_sources: sources.visible,
            hidden_sources: sources.hidden,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleRow {
    pub id: String,
    pub title: String,
    pub source_name: String,
    pub source_url: Option<String>,
    pub date_display: String,
    pub sentiment_label: Option<String>,
    pub sentiment: SentimentPole,
}

impl From<&Article> for ArticleRow {
    fn from(a: &Article) -> Self {
        ArticleRow {
            id: a.id.clone(),
            title: a.title.clone(),
            source_name: a.source_name.clone(),
            source_url: a.source_url.clone(),
            date_display: format_date(a.published_date),
            sentiment_label: a.sentiment_label.clone(),
            sentiment: article_sentiment(a),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionsView {
    pub support: Collapsed<Position>,
    pub oppose: Collapsed<Position>,
    pub neutral: Collapsed<Position>,
    pub counts: PositionCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct BiasZoneView {
    pub zone: SentimentPole,
    pub label: String,
    pub count: usize,
    pub sources: Collapsed<BiasSource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BiasView {
    pub summary: BiasSummary,
    pub zones: Vec<BiasZoneView>, // non-empty zones only
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkRow {
    pub name: String,
    pub tally: StanceTally,
    pub shares: StanceShares,
    pub sole_pole: Option<StancePole>,
    pub speakers: Vec<String>,
}

impl From<&SpeakerActivity> for NetworkRow {
    fn from(s: &SpeakerActivity) -> Self {
        NetworkRow {
            name: s.name.clone(),
            tally: s.tally,
            shares: s.tally.shares(),
            sole_pole: s.tally.sole_pole(),
            speakers: Vec::new(),
        }
    }
}

impl From<&EntityActivity> for NetworkRow {
    fn from(e: &EntityActivity) -> Self {
        NetworkRow {
            name: e.name.clone(),
            tally: e.tally,
            shares: e.tally.shares(),
            sole_pole: e.tally.sole_pole(),
            speakers: e.speakers.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkView {
    pub top_speakers: Collapsed<NetworkRow>,
    pub controversial: Collapsed<NetworkRow>,
    pub consensus: Collapsed<NetworkRow>,
    pub stats: NetworkStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotesView {
    pub speakers: Vec<FacetOption>,
    /// Per-pole counts under the current speaker selection.
    pub pole_counts: PoleCounts,
    pub matched: usize,
    pub list: Collapsed<QuoteCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticlesView {
    pub sources: Vec<FacetOption>,
    /// Per-pole counts under the current source selection.
    pub pole_counts: PoleCounts,
    pub matched: usize,
    pub list: Collapsed<ArticleRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub metrics: SummaryStats,
    pub executive_brief: Option<Vec<String>>,
    pub key_arguments: Option<KeyArguments>,
    pub whats_at_stake: Option<WhatsAtStake>,
    pub positions: Option<PositionsView>,
    pub bias: Option<BiasView>,
    pub network: Option<NetworkView>,
    pub quotes: QuotesView,
    pub articles: ArticlesView,
    pub financial: Collapsed<FinancialMention>,
    pub entities: EntityRollup,
    pub popularity_trend: Vec<PopularityPoint>,
    pub sentiment_trend: Vec<ScoredPoint>,
}

/// Assemble every dashboard section from one debate snapshot and the
/// caller's filter selections. Sections with nothing to show are `None`.
pub fn build_dashboard(
    detail: &DebateDetail,
    state: &FilterState,
    thresholds: &CollapseThresholds,
) -> DashboardView {
    let merged = dedupe_quotes(&detail.quotes, &detail.articles);
    let quotes = filter_quotes(&merged, &state.quote_sentiment, &state.speaker);
    let quote_cards: Vec<QuoteCard> = quotes.iter().map(QuoteCard::from).collect();

    let articles = filter_articles(&detail.articles, &state.article_sentiment, &state.source);
    let article_rows: Vec<ArticleRow> = articles.iter().map(ArticleRow::from).collect();

    let view = DashboardView {
        id: detail.debate.id.clone(),
        title: detail.debate.title.clone(),
        summary: detail
            .policy_overview
            .clone()
            .unwrap_or_else(|| detail.debate.summary.clone()),
        metrics: detail.summary_stats.clone(),
        executive_brief: detail
            .executive_brief
            .as_deref()
            .map(split_paragraphs)
            .filter(|ps| !ps.is_empty()),
        key_arguments: Some(detail.key_arguments.clone())
            .filter(|k| !k.for_args.is_empty() || !k.against.is_empty()),
        whats_at_stake: Some(detail.whats_at_stake.clone()).filter(|w| {
            !w.winners.is_empty() || !w.losers.is_empty() || !w.risks.is_empty() || !w.opportunities.is_empty()
        }),
        positions: positions_view(&detail.positions, thresholds.positions),
        bias: bias_view(&detail.bias_sources, thresholds.bias_sources),
        network: network_view(&detail.network, thresholds.network),
        quotes: QuotesView {
            speakers: speaker_options(&merged),
            pole_counts: quote_pole_counts(&merged, &state.speaker),
            matched: quote_cards.len(),
            list: split_visible(&quote_cards, thresholds.quotes),
        },
        articles: ArticlesView {
            sources: source_options(&detail.articles),
            pole_counts: article_pole_counts(&detail.articles, &state.source),
            matched: article_rows.len(),
            list: split_visible(&article_rows, thresholds.articles),
        },
        financial: split_visible(&summarize_financial(&detail.financial), thresholds.financial),
        entities: top_entities(&detail.entities, ENTITY_TAG_LIMIT),
        popularity_trend: detail.popularity_trend.clone(),
        sentiment_trend: annotate_sentiment_trend(&detail.sentiment_trend),
    };

    debug!(
        "Dashboard built - id={}, quotes={}/{}, articles={}/{}",
        view.id,
        view.quotes.matched,
        merged.len(),
        view.articles.matched,
        detail.articles.len()
    );
    view
}

fn positions_view(positions: &[Position], threshold: usize) -> Option<PositionsView> {
    let buckets = bucket_positions(positions);
    if buckets.is_empty() {
        return None;
    }
    Some(PositionsView {
        support: split_visible(&buckets.support, threshold),
        oppose: split_visible(&buckets.oppose, threshold),
        neutral: split_visible(&buckets.neutral, threshold),
        counts: buckets.counts,
    })
}

fn bias_view(sources: &[BiasSource], threshold: usize) -> Option<BiasView> {
    let zones = bucket_bias_sources(sources);
    if zones.summary.total_count == 0 {
        return None;
    }
    let configs = [
        (SentimentPole::Positive, "Positive Coverage", &zones.positive),
        (SentimentPole::Neutral, "Neutral Coverage", &zones.neutral),
        (SentimentPole::Negative, "Negative Coverage", &zones.negative),
    ];
    let zone_views = configs
        .into_iter()
        .filter(|(_, _, list)| !list.is_empty())
        .map(|(zone, label, list)| BiasZoneView {
            zone,
            label: label.to_string(),
            count: list.len(),
            sources: split_visible(list, threshold),
        })
        .collect();
    Some(BiasView {
        summary: zones.summary.clone(),
        zones: zone_views,
    })
}

fn network_view(edges: &[NetworkEdge], threshold: usize) -> Option<NetworkView> {
    if edges.is_empty() {
        return None;
    }
    let net = classify_network(edges);
    let speakers: Vec<NetworkRow> = net.top_speakers.iter().map(NetworkRow::from).collect();
    let controversial: Vec<NetworkRow> = net.controversial.iter().map(NetworkRow::from).collect();
    let consensus: Vec<NetworkRow> = net.consensus.iter().map(NetworkRow::from).collect();
    Some(NetworkView {
        top_speakers: split_visible(&speakers, threshold),
        controversial: split_visible(&controversial, threshold),
        consensus: split_visible(&consensus, threshold),
        stats: net.stats,
    })
}
