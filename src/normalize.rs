use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// Scores strictly above `+SENTIMENT_THRESHOLD` are positive, strictly below
/// `-SENTIMENT_THRESHOLD` negative. Shared by every score-only classification.
pub const SENTIMENT_THRESHOLD: f64 = 0.15;

/// Debate-position pole of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StancePole {
    Support,
    Oppose,
    Neutral,
}

/// Emotional-tone pole of a statement or article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentPole {
    Positive,
    Negative,
    Neutral,
}

impl StancePole {
    pub fn as_str(self) -> &'static str {
        match self {
            StancePole::Support => "support",
            StancePole::Oppose => "oppose",
            StancePole::Neutral => "neutral",
        }
    }
}

impl SentimentPole {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentPole::Positive => "positive",
            SentimentPole::Negative => "negative",
            SentimentPole::Neutral => "neutral",
        }
    }
}

impl fmt::Display for StancePole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SentimentPole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentPole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentPole::Positive),
            "negative" => Ok(SentimentPole::Negative),
            "neutral" => Ok(SentimentPole::Neutral),
            other => Err(format!("unknown sentiment '{}' (expected positive, negative or neutral)", other)),
        }
    }
}

// support ≡ positive, oppose ≡ negative
impl From<StancePole> for SentimentPole {
    fn from(p: StancePole) -> Self {
        match p {
            StancePole::Support => SentimentPole::Positive,
            StancePole::Oppose => SentimentPole::Negative,
            StancePole::Neutral => SentimentPole::Neutral,
        }
    }
}

impl From<SentimentPole> for StancePole {
    fn from(p: SentimentPole) -> Self {
        match p {
            SentimentPole::Positive => StancePole::Support,
            SentimentPole::Negative => StancePole::Oppose,
            SentimentPole::Neutral => StancePole::Neutral,
        }
    }
}

/// Map a raw stance/sentiment word onto the three-way pole.
///
/// Producers disagree on vocabulary: some emit `support`/`oppose`, others
/// `positive`/`negative`. Both spellings land on the same pole, ignoring
/// case and surrounding whitespace; anything else, including a missing
/// value, is neutral.
pub fn normalize_stance_pole(raw: Option<&str>) -> StancePole {
    let Some(raw) = raw else {
        return StancePole::Neutral;
    };
    match raw.trim().to_lowercase().as_str() {
        "support" | "positive" => StancePole::Support,
        "oppose" | "negative" => StancePole::Oppose,
        _ => StancePole::Neutral,
    }
}

/// Same partition as [`normalize_stance_pole`], sentiment-named.
pub fn normalize_sentiment_pole(raw: Option<&str>) -> SentimentPole {
    normalize_stance_pole(raw).into()
}

/// Score-only classification with the shared threshold. Missing scores are neutral.
pub fn classify_score(score: Option<f64>) -> SentimentPole {
    match score {
        Some(s) if s > SENTIMENT_THRESHOLD => SentimentPole::Positive,
        Some(s) if s < -SENTIMENT_THRESHOLD => SentimentPole::Negative,
        _ => SentimentPole::Neutral,
    }
}

/// Article classification: a label mentioning "positive" or "negative" wins
/// over the numeric score, which is only consulted when the label is silent.
pub fn classify_by_label_and_score(label: Option<&str>, score: Option<f64>) -> SentimentPole {
    if let Some(label) = label {
        let l = label.to_lowercase();
        if l.contains("positive") {
            return SentimentPole::Positive;
        }
        if l.contains("negative") {
            return SentimentPole::Negative;
        }
    }
    classify_score(score)
}

/// NFC + lowercase + trimmed form used for identity comparisons.
pub fn fold_key(s: &str) -> String {
    s.trim().nfc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_vocabularies_reach_the_same_pole() {
        assert_eq!(normalize_stance_pole(Some("support")), StancePole::Support);
        assert_eq!(normalize_stance_pole(Some("Positive")), StancePole::Support);
        assert_eq!(normalize_stance_pole(Some("OPPOSE")), StancePole::Oppose);
        assert_eq!(normalize_stance_pole(Some("negative")), StancePole::Oppose);
    }

    #[test]
    fn padding_and_case_do_not_change_the_pole() {
        assert_eq!(normalize_stance_pole(Some(" support ")), StancePole::Support);
        assert_eq!(normalize_stance_pole(Some("\tNegative\n")), StancePole::Oppose);
        assert_eq!(normalize_sentiment_pole(Some("  POSITIVE")), SentimentPole::Positive);
        assert_eq!(normalize_stance_pole(Some("   ")), StancePole::Neutral);
    }

    #[test]
    fn unknown_empty_and_missing_are_neutral() {
        assert_eq!(normalize_stance_pole(None), StancePole::Neutral);
        assert_eq!(normalize_stance_pole(Some("")), StancePole::Neutral);
        assert_eq!(normalize_stance_pole(Some("mixed")), StancePole::Neutral);
        assert_eq!(normalize_sentiment_pole(Some("supportive")), SentimentPole::Neutral);
        assert_eq!(normalize_sentiment_pole(None), SentimentPole::Neutral);
    }

    #[test]
    fn sentiment_and_stance_partitions_agree() {
        for raw in ["support", "positive", "oppose", "negative", "neutral", "x", ""] {
            let stance = normalize_stance_pole(Some(raw));
            let sentiment = normalize_sentiment_pole(Some(raw));
            assert_eq!(SentimentPole::from(stance), sentiment, "raw={raw}");
        }
    }

    #[test]
    fn reapplying_output_label_is_idempotent() {
        for p in [StancePole::Support, StancePole::Oppose, StancePole::Neutral] {
            assert_eq!(normalize_stance_pole(Some(p.as_str())), p);
        }
        for p in [SentimentPole::Positive, SentimentPole::Negative, SentimentPole::Neutral] {
            assert_eq!(normalize_sentiment_pole(Some(p.as_str())), p);
        }
    }

    #[test]
    fn label_beats_score() {
        assert_eq!(
            classify_by_label_and_score(Some("Mostly Negative"), Some(0.9)),
            SentimentPole::Negative
        );
        assert_eq!(
            classify_by_label_and_score(Some("POSITIVE"), Some(-0.9)),
            SentimentPole::Positive
        );
    }

    #[test]
    fn silent_label_falls_back_to_score() {
        assert_eq!(classify_by_label_and_score(Some("mixed"), Some(0.2)), SentimentPole::Positive);
        assert_eq!(classify_by_label_and_score(None, Some(-0.2)), SentimentPole::Negative);
        assert_eq!(classify_by_label_and_score(Some("mixed"), None), SentimentPole::Neutral);
    }

    #[test]
    fn threshold_is_strict() {
        assert_eq!(classify_score(Some(0.16)), SentimentPole::Positive);
        assert_eq!(classify_score(Some(0.15)), SentimentPole::Neutral);
        assert_eq!(classify_score(Some(-0.15)), SentimentPole::Neutral);
        assert_eq!(classify_score(Some(-0.2)), SentimentPole::Negative);
        assert_eq!(classify_score(None), SentimentPole::Neutral);
    }
}
