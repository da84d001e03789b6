use serde::{Deserialize, Serialize};

/// A news article returned by a search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Headline of the article.
    pub title: String,
    /// Link to the article.
    pub url: String,
    /// Excerpt of the article body.
    pub body: String,
    /// The publisher.
    pub source: String,
    /// Link to a preview image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Publication date, either ISO-8601 or free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// How well the article answers the question, nominally 0 to 10.
    ///
    /// Only used for ranking and display. Values outside the nominal
    /// range are kept as is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    /// Why the article was considered relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_reason: Option<String>,
}

impl SearchResult {
    /// Returns the display tier of this result, if it has been scored.
    #[inline]
    pub fn relevance_tier(&self) -> Option<RelevanceTier> {
        self.relevance_score.map(RelevanceTier::from_score)
    }
}

/// A display category derived from a relevance score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelevanceTier {
    /// Scores of 4 or below.
    Low,
    /// Scores above 4, up to and including 7.
    Medium,
    /// Scores above 7.
    High,
}

impl RelevanceTier {
    /// Maps a score to its tier.
    #[inline]
    pub fn from_score(score: f64) -> Self {
        if score > 7.0 {
            RelevanceTier::High
        } else if score > 4.0 {
            RelevanceTier::Medium
        } else {
            RelevanceTier::Low
        }
    }

    /// Returns a lowercase label for this tier.
    #[inline]
    pub fn label(&self) -> &'static str {
        match self {
            RelevanceTier::Low => "low",
            RelevanceTier::Medium => "medium",
            RelevanceTier::High => "high",
        }
    }
}
