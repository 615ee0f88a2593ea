use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use std::str::FromStr;
use tracing::debug;

use crate::models::{Article, Debate, MergedQuote};
use crate::normalize::{classify_by_label_and_score, normalize_sentiment_pole, SentimentPole};
use crate::ranking::{sort_debates, DebateSort};

/// One filter dimension: either unconstrained or pinned to a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Facet<T> {
    All,
    Only(T),
}

impl<T> Default for Facet<T> {
    fn default() -> Self {
        Facet::All
    }
}

impl<T: PartialEq> Facet<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(want) => want == value,
        }
    }
}

impl Facet<String> {
    pub fn matches_str(&self, value: &str) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(want) => want == value,
        }
    }
}

/// `"all"` (any case) is the unconstrained facet; anything else parses as `T`.
impl<T: FromStr> FromStr for Facet<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Facet::All)
        } else {
            s.parse().map(Facet::Only)
        }
    }
}

/// The caller's current selections. The engine never holds on to one;
/// every recomputation receives it by reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub sector: Facet<String>,
    pub query: String,
    pub sort: DebateSort,
    pub quote_sentiment: Facet<SentimentPole>,
    pub speaker: Facet<String>,
    pub article_sentiment: Facet<SentimentPole>,
    pub source: Facet<String>,
}

/* -------------------------------------------------------------------------- */
/* Selector options and counts                                                */
/* -------------------------------------------------------------------------- */

/// One selector entry: a value and how many records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub name: String,
    pub count: usize,
}

/// Records per sentiment pole, for labelling the sentiment selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoleCounts {
    pub all: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl PoleCounts {
    pub fn record(&mut self, pole: SentimentPole) {
        match pole {
            SentimentPole::Positive => self.positive += 1,
            SentimentPole::Neutral => self.neutral += 1,
            SentimentPole::Negative => self.negative += 1,
        }
        self.all += 1;
    }
}

/// Distinct names with their counts, sorted by name.
fn counted_options<'a>(names: impl Iterator<Item = &'a str>) -> Vec<FacetOption> {
    names
        .counts()
        .into_iter()
        .map(|(name, count)| FacetOption {
            name: name.to_string(),
            count,
        })
        .sorted_by(|a, b| a.name.cmp(&b.name))
        .collect()
}

/* -------------------------------------------------------------------------- */
/* Debates                                                                    */
/* -------------------------------------------------------------------------- */

pub fn filter_by_sector(debates: &[Debate], sector: &Facet<String>) -> Vec<Debate> {
    debates
        .iter()
        .filter(|d| sector.matches_str(&d.sector))
        .cloned()
        .collect()
}

/// Lowercased haystack a search query runs against.
pub fn searchable_text(d: &Debate) -> String {
    std::iter::once(d.title.as_str())
        .chain(std::iter::once(d.summary.as_str()))
        .chain(d.top_companies.iter().map(String::as_str))
        .chain(d.top_politicians.iter().map(String::as_str))
        .chain(d.top_organizations.iter().map(String::as_str))
        .chain(std::iter::once(d.sector.as_str()))
        .join(" ")
        .to_lowercase()
}

/// Every whitespace-separated term must occur somewhere in the debate's
/// searchable text. A blank query keeps everything.
pub fn search_debates(debates: &[Debate], query: &str) -> Vec<Debate> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return debates.to_vec();
    }
    let terms: Vec<&str> = query.split_whitespace().collect();

    debates
        .iter()
        .filter(|d| {
            let haystack = searchable_text(d);
            terms.iter().all(|t| haystack.contains(t))
        })
        .cloned()
        .collect()
}

/// Sector, then search, then sort.
pub fn apply_debate_filters(debates: &[Debate], state: &FilterState, now: DateTime<Utc>) -> Vec<Debate> {
    let by_sector = filter_by_sector(debates, &state.sector);
    let searched = search_debates(&by_sector, &state.query);
    let sorted = sort_debates(&searched, state.sort, now);
    debug!(
        "Debate filters applied - input={}, after_sector={}, after_search={}, sort={}",
        debates.len(),
        by_sector.len(),
        sorted.len(),
        state.sort
    );
    sorted
}

/* -------------------------------------------------------------------------- */
/* Quotes                                                                     */
/* -------------------------------------------------------------------------- */

/// Quotes matching both facets, most-reported first (ties keep input order).
pub fn filter_quotes(
    quotes: &[MergedQuote],
    sentiment: &Facet<SentimentPole>,
    speaker: &Facet<String>,
) -> Vec<MergedQuote> {
    let mut out: Vec<MergedQuote> = quotes
        .iter()
        .filter(|q| sentiment.matches(&normalize_sentiment_pole(q.tone.as_deref())))
        .filter(|q| speaker.matches_str(&q.speaker))
        .cloned()
        .collect();
    out.sort_by(|a, b| b.reported_count.cmp(&a.reported_count));
    debug!("Quote filters applied - input={}, output={}", quotes.len(), out.len());
    out
}

/// Speaker selector entries: merged quotes per speaker, sorted by name.
pub fn speaker_options(quotes: &[MergedQuote]) -> Vec<FacetOption> {
    counted_options(quotes.iter().map(|q| q.speaker.as_str()))
}

/// Quotes per sentiment pole among those matching the speaker facet.
pub fn quote_pole_counts(quotes: &[MergedQuote], speaker: &Facet<String>) -> PoleCounts {
    let mut counts = PoleCounts::default();
    for q in quotes.iter().filter(|q| speaker.matches_str(&q.speaker)) {
        counts.record(normalize_sentiment_pole(q.tone.as_deref()));
    }
    counts
}

/* -------------------------------------------------------------------------- */
/* Articles                                                                   */
/* -------------------------------------------------------------------------- */

pub fn article_sentiment(a: &Article) -> SentimentPole {
    classify_by_label_and_score(a.sentiment_label.as_deref(), a.sentiment_score)
}

pub fn filter_articles(
    articles: &[Article],
    sentiment: &Facet<SentimentPole>,
    source: &Facet<String>,
) -> Vec<Article> {
    let out: Vec<Article> = articles
        .iter()
        .filter(|a| sentiment.matches(&article_sentiment(a)))
        .filter(|a| source.matches_str(&a.source_name))
        .cloned()
        .collect();
    debug!("Article filters applied - input={}, output={}", articles.len(), out.len());
    out
}

/// Source selector entries: articles per source, sorted by name.
pub fn source_options(articles: &[Article]) -> Vec<FacetOption> {
    counted_options(articles.iter().map(|a| a.source_name.as_str()))
}

/// Articles per sentiment pole among those matching the source facet.
pub fn article_pole_counts(articles: &[Article], source: &Facet<String>) -> PoleCounts {
    let mut counts = PoleCounts::default();
    for a in articles.iter().filter(|a| source.matches_str(&a.source_name)) {
        counts.record(article_sentiment(a));
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn debate(id: &str, sector: &str, title: &str) -> Debate {
        Debate {
            id: id.into(),
            title: title.into(),
            sector: sector.into(),
            article_count: 1,
            last_article_date: None,
            last_updated: None,
            avg_sentiment: None,
            top_companies: vec![],
            top_politicians: vec![],
            top_organizations: vec![],
            summary: String::new(),
        }
    }

    fn quote(speaker: &str, tone: Option<&str>, count: usize) -> MergedQuote {
        MergedQuote {
            quote_id: format!("{speaker}-{count}"),
            speaker: speaker.into(),
            speaker_role: None,
            quote_text: "t".into(),
            tone: tone.map(String::from),
            sources: vec![],
            reported_count: count,
        }
    }

    fn article(source: &str, label: Option<&str>, score: Option<f64>) -> Article {
        Article {
            id: source.into(),
            title: String::new(),
            source_name: source.into(),
            source_url: None,
            published_date: None,
            sentiment_label: label.map(String::from),
            sentiment_score: score,
        }
    }

    #[test]
    fn facet_all_parses_case_insensitively() {
        assert_eq!("ALL".parse::<Facet<String>>().unwrap(), Facet::All);
        assert_eq!(
            "Steel".parse::<Facet<String>>().unwrap(),
            Facet::Only("Steel".to_string())
        );
        assert_eq!(
            "negative".parse::<Facet<SentimentPole>>().unwrap(),
            Facet::Only(SentimentPole::Negative)
        );
        assert!("angry".parse::<Facet<SentimentPole>>().is_err());
    }

    #[test]
    fn sector_is_exact_match() {
        let ds = vec![debate("1", "Steel", "a"), debate("2", "Energy", "b"), debate("3", "steel", "c")];
        let out = filter_by_sector(&ds, &Facet::Only("Steel".into()));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
        assert_eq!(filter_by_sector(&ds, &Facet::All).len(), 3);
    }

    #[test]
    fn search_requires_every_term() {
        let mut both = debate("1", "Energy", "Steel tariffs return");
        both.summary = "A debate".into();
        let only_steel = debate("2", "Energy", "Green steel subsidies");
        let across_fields = {
            let mut d = debate("3", "Steel", "Import duties");
            d.top_organizations = vec!["Tariff Commission".into()];
            d
        };
        let ds = vec![both, only_steel, across_fields];

        let hits = search_debates(&ds, "steel tariff");
        let ids: Vec<&str> = hits.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn blank_query_keeps_everything_in_order() {
        let ds = vec![debate("1", "a", "x"), debate("2", "b", "y")];
        assert_eq!(search_debates(&ds, "").len(), 2);
        assert_eq!(search_debates(&ds, "   ").len(), 2);
        assert_eq!(search_debates(&ds, "  ")[1].id, "2");
    }

    #[test]
    fn debate_filters_compose_with_and() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let ds = vec![
            debate("1", "Steel", "steel quotas"),
            debate("2", "Energy", "steel in power plants"),
            debate("3", "Steel", "scrap prices"),
        ];
        let state = FilterState {
            sector: Facet::Only("Steel".into()),
            query: "steel".into(),
            ..Default::default()
        };
        let out = apply_debate_filters(&ds, &state, now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
    }

    #[test]
    fn quotes_filter_on_both_dimensions_and_rank_by_reports() {
        let qs = vec![
            quote("A", Some("support"), 1),
            quote("A", Some("positive"), 3),
            quote("B", Some("positive"), 5),
            quote("A", Some("oppose"), 9),
        ];
        let out = filter_quotes(&qs, &Facet::Only(SentimentPole::Positive), &Facet::Only("A".into()));
        let counts: Vec<usize> = out.iter().map(|q| q.reported_count).collect();
        assert_eq!(counts, vec![3, 1]);

        let all = filter_quotes(&qs, &Facet::All, &Facet::All);
        let counts: Vec<usize> = all.iter().map(|q| q.reported_count).collect();
        assert_eq!(counts, vec![9, 5, 3, 1]);
    }

    #[test]
    fn quotes_without_tone_are_neutral() {
        let qs = vec![quote("A", None, 1), quote("B", Some("whatever"), 1)];
        let out = filter_quotes(&qs, &Facet::Only(SentimentPole::Neutral), &Facet::All);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn articles_filter_by_classified_sentiment_and_source() {
        let arts = vec![
            article("FT", Some("Positive"), Some(-0.9)),
            article("FT", None, Some(0.5)),
            article("WSJ", Some("negative"), None),
            article("FT", Some("neutral"), Some(0.0)),
        ];
        let pos_ft = filter_articles(&arts, &Facet::Only(SentimentPole::Positive), &Facet::Only("FT".into()));
        assert_eq!(pos_ft.len(), 2);
        let neg = filter_articles(&arts, &Facet::Only(SentimentPole::Negative), &Facet::All);
        assert_eq!(neg.len(), 1);
        assert_eq!(neg[0].source_name, "WSJ");
    }

    #[test]
    fn options_carry_counts_and_sort_by_name() {
        let opt = |name: &str, count| FacetOption {
            name: name.into(),
            count,
        };
        let qs = vec![quote("B", None, 1), quote("A", None, 1), quote("B", None, 2)];
        assert_eq!(speaker_options(&qs), vec![opt("A", 1), opt("B", 2)]);
        let arts = vec![article("WSJ", None, None), article("FT", None, None), article("WSJ", None, None)];
        assert_eq!(source_options(&arts), vec![opt("FT", 1), opt("WSJ", 2)]);
    }

    #[test]
    fn quote_pole_counts_follow_the_speaker_facet() {
        let qs = vec![
            quote("A", Some("support"), 1),
            quote("A", Some("negative"), 1),
            quote("A", None, 1),
            quote("B", Some("positive"), 1),
        ];
        let all = quote_pole_counts(&qs, &Facet::All);
        assert_eq!(
            all,
            PoleCounts {
                all: 4,
                positive: 2,
                neutral: 1,
                negative: 1
            }
        );
        let only_b = quote_pole_counts(&qs, &Facet::Only("B".into()));
        assert_eq!(
            only_b,
            PoleCounts {
                all: 1,
                positive: 1,
                neutral: 0,
                negative: 0
            }
        );
    }

    #[test]
    fn article_pole_counts_follow_the_source_facet() {
        let arts = vec![
            article("FT", Some("positive"), None),
            article("FT", None, Some(-0.5)),
            article("WSJ", None, Some(0.9)),
        ];
        let ft = article_pole_counts(&arts, &Facet::Only("FT".into()));
        assert_eq!((ft.all, ft.positive, ft.negative, ft.neutral), (2, 1, 1, 0));
        assert_eq!(article_pole_counts(&arts, &Facet::All).positive, 2);
        assert_eq!(article_pole_counts(&arts, &Facet::Only("BBC".into())), PoleCounts::default());
    }

    #[test]
    fn empty_inputs_give_empty_outputs() {
        assert!(filter_quotes(&[], &Facet::All, &Facet::All).is_empty());
        assert!(filter_articles(&[], &Facet::All, &Facet::All).is_empty());
        assert!(search_debates(&[], "x").is_empty());
    }
}
