//! Extraction request value object

use serde::{Deserialize, Serialize};

/// Bibliographic item type of a paper in the reference library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    JournalArticle,
    Book,
    Thesis,
    ConferencePaper,
    Preprint,
    #[default]
    #[serde(other)]
    Other,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::JournalArticle => "journal_article",
            ItemType::Book => "book",
            ItemType::Thesis => "thesis",
            ItemType::ConferencePaper => "conference_paper",
            ItemType::Preprint => "preprint",
            ItemType::Other => "other",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = std::convert::Infallible;

    /// Accepts the snake_case names plus the common reference-manager
    /// spellings; anything unrecognised becomes [`ItemType::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Ok(match normalized.as_str() {
            "journal_article" | "journalarticle" | "article" => ItemType::JournalArticle,
            "book" | "book_section" => ItemType::Book,
            "thesis" | "dissertation" => ItemType::Thesis,
            "conference_paper" | "conferencepaper" | "inproceedings" => {
                ItemType::ConferencePaper
            }
            "preprint" => ItemType::Preprint,
            _ => ItemType::Other,
        })
    }
}

/// A per-paper extraction request (Value Object)
///
/// Created by the caller for each paper and never mutated by the council.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Stable identifier of the paper in the reference library
    pub paper_id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub item_type: ItemType,
    /// Full text of the paper as produced by PDF extraction
    pub text: String,
}

impl ExtractionRequest {
    pub fn new(
        paper_id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            paper_id: paper_id.into(),
            title: title.into(),
            authors: Vec::new(),
            year: None,
            item_type: ItemType::default(),
            text: text.into(),
        }
    }

    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_item_type(mut self, item_type: ItemType) -> Self {
        self.item_type = item_type;
        self
    }

    /// Short human-readable citation, e.g. `Smith, Jones (2021) "Title"`
    pub fn citation(&self) -> String {
        let authors = if self.authors.is_empty() {
            "Unknown".to_string()
        } else {
            self.authors.join(", ")
        };
        match self.year {
            Some(year) => format!("{} ({}) \"{}\"", authors, year, self.title),
            None => format!("{} \"{}\"", authors, self.title),
        }
    }
}
