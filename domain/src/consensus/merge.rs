//! Field-kind merge strategies.
//!
//! Each strategy takes the successful contributions in configuration order
//! plus a projection selecting the field to merge. Nested records are merged
//! by projecting into their inner fields, so every field of
//! [`StructuredExtraction`] resolves to exactly one of these functions.
//!
//! | Kind | Strategy |
//! |------|----------|
//! | long-form text | longest value; tie → higher weight → earlier provider |
//! | set-like list | ordered union, case-insensitive dedup, first-seen casing |
//! | structured list | union keyed on primary text; attributes from highest weight |
//! | numeric | weighted mean clamped to [0, 1] |

use crate::extraction::{KeyClaim, KeyFinding, StructuredExtraction};
use std::collections::{HashMap, HashSet};

/// One successful provider response taking part in a merge.
#[derive(Debug, Clone, Copy)]
pub struct Contribution<'a> {
    pub provider: &'a str,
    pub weight: f64,
    /// Position of the provider in the council configuration
    pub order: usize,
    pub confidence: f64,
    pub extraction: &'a StructuredExtraction,
}

impl Contribution<'_> {
    /// Whether this contribution wins a tie against `other`:
    /// higher weight first, then earlier configuration order.
    pub fn outranks(&self, other: &Contribution<'_>) -> bool {
        if self.weight != other.weight {
            return self.weight > other.weight;
        }
        self.order < other.order
    }
}

/// Comparison key for list entries: trimmed, lowercased.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Pick the longest value of a text field.
///
/// Length is counted in Unicode scalar values on the raw value; padding is
/// not discounted.
pub fn longest_text<F>(contributions: &[Contribution<'_>], field: F) -> String
where
    F: for<'e> Fn(&'e StructuredExtraction) -> &'e str,
{
    let mut best: Option<(&Contribution<'_>, &str, usize)> = None;

    for contribution in contributions {
        let value = field(contribution.extraction);
        let len = value.chars().count();

        let replace = match best {
            None => true,
            Some((current, _, current_len)) => {
                len > current_len || (len == current_len && contribution.outranks(current))
            }
        };
        if replace {
            best = Some((contribution, value, len));
        }
    }

    best.map(|(_, value, _)| value.to_string())
        .unwrap_or_default()
}

/// Ordered, case-insensitive union of a set-like list field.
///
/// Providers are visited in configuration order and each provider's own
/// order is kept; the first spelling seen for a term is the one retained.
pub fn union_set<F>(contributions: &[Contribution<'_>], field: F) -> Vec<String>
where
    F: for<'e> Fn(&'e StructuredExtraction) -> &'e [String],
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for contribution in contributions {
        for value in field(contribution.extraction) {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(normalize(trimmed)) {
                merged.push(trimmed.to_string());
            }
        }
    }

    merged
}

/// List entry with a primary text used for identity and optional secondary
/// attributes.
pub trait Keyed: Clone {
    fn key_text(&self) -> &str;

    fn has_attributes(&self) -> bool {
        false
    }

    /// Replace this entry's secondary attributes with `other`'s, keeping the
    /// primary text.
    fn adopt_attributes(&mut self, _other: &Self) {}
}

impl Keyed for String {
    fn key_text(&self) -> &str {
        self
    }
}

impl Keyed for KeyFinding {
    fn key_text(&self) -> &str {
        &self.finding
    }

    fn has_attributes(&self) -> bool {
        self.evidence_type.is_some()
    }

    fn adopt_attributes(&mut self, other: &Self) {
        self.evidence_type = other.evidence_type.clone();
    }
}

impl Keyed for KeyClaim {
    fn key_text(&self) -> &str {
        &self.claim
    }

    fn has_attributes(&self) -> bool {
        self.support.is_some()
    }

    fn adopt_attributes(&mut self, other: &Self) {
        self.support = other.support.clone();
    }
}

/// Union of a structured list keyed on normalized primary text.
///
/// Entries keep the position and spelling of their first appearance. When
/// several providers report the same entry, the attributes come from the
/// highest-ranked provider that supplied any.
pub fn union_keyed<T, F>(contributions: &[Contribution<'_>], field: F) -> Vec<T>
where
    T: Keyed,
    F: for<'e> Fn(&'e StructuredExtraction) -> &'e [T],
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<(T, Option<&Contribution<'_>>)> = Vec::new();

    for contribution in contributions {
        for item in field(contribution.extraction) {
            let key = normalize(item.key_text());
            if key.is_empty() {
                continue;
            }

            match index.get(&key) {
                Some(&position) => {
                    let (entry, owner) = &mut merged[position];
                    let takes_over = item.has_attributes()
                        && owner.is_none_or(|current| contribution.outranks(current));
                    if takes_over {
                        entry.adopt_attributes(item);
                        *owner = Some(contribution);
                    }
                }
                None => {
                    index.insert(key, merged.len());
                    let owner = item.has_attributes().then_some(contribution);
                    merged.push((item.clone(), owner));
                }
            }
        }
    }

    merged.into_iter().map(|(entry, _)| entry).collect()
}

/// Weighted mean of self-reported confidences, clamped to [0, 1].
///
/// Non-finite confidences count as 0.0 so the result is always defined.
pub fn weighted_confidence(contributions: &[Contribution<'_>]) -> f64 {
    let total_weight: f64 = contributions.iter().map(|c| c.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = contributions
        .iter()
        .map(|c| {
            let confidence = if c.confidence.is_finite() {
                c.confidence
            } else {
                0.0
            };
            confidence * c.weight
        })
        .sum();

    (weighted / total_weight).clamp(0.0, 1.0)
}
