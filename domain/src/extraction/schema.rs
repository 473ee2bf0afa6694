//! Structured extraction schema
//!
//! The record every provider fills in for a paper. Providers are independent
//! LLMs, so every field is optional on the wire and defaults when missing.
//! List entries that carry structure also accept a bare string, which is how
//! smaller models tend to answer.

use serde::{Deserialize, Serialize};

/// How a study approached its research questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Methodology {
    pub approach: String,
    pub data_sources: Vec<String>,
    pub analysis_methods: Vec<String>,
}

impl Methodology {
    pub fn is_empty(&self) -> bool {
        self.approach.trim().is_empty()
            && self.data_sources.is_empty()
            && self.analysis_methods.is_empty()
    }
}

/// A finding reported by the paper with the kind of evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FindingRepr")]
pub struct KeyFinding {
    pub finding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_type: Option<String>,
}

impl KeyFinding {
    pub fn new(finding: impl Into<String>) -> Self {
        Self {
            finding: finding.into(),
            evidence_type: None,
        }
    }

    pub fn with_evidence_type(mut self, evidence_type: impl Into<String>) -> Self {
        self.evidence_type = Some(evidence_type.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FindingRepr {
    Text(String),
    Record {
        #[serde(alias = "claim", alias = "text")]
        finding: String,
        #[serde(default, alias = "evidence")]
        evidence_type: Option<String>,
    },
}

impl From<FindingRepr> for KeyFinding {
    fn from(repr: FindingRepr) -> Self {
        match repr {
            FindingRepr::Text(finding) => KeyFinding::new(finding),
            FindingRepr::Record {
                finding,
                evidence_type,
            } => KeyFinding {
                finding,
                evidence_type,
            },
        }
    }
}

/// A central argument the authors make, with optional supporting pointer
/// (section, figure, citation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClaimRepr")]
pub struct KeyClaim {
    pub claim: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<String>,
}

impl KeyClaim {
    pub fn new(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            support: None,
        }
    }

    pub fn with_support(mut self, support: impl Into<String>) -> Self {
        self.support = Some(support.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClaimRepr {
    Text(String),
    Record {
        #[serde(alias = "text")]
        claim: String,
        #[serde(default, alias = "evidence")]
        support: Option<String>,
    },
}

impl From<ClaimRepr> for KeyClaim {
    fn from(repr: ClaimRepr) -> Self {
        match repr {
            ClaimRepr::Text(claim) => KeyClaim::new(claim),
            ClaimRepr::Record { claim, support } => KeyClaim { claim, support },
        }
    }
}

/// LLM-extracted structured summary of one paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredExtraction {
    pub thesis: String,
    pub research_questions: Vec<String>,
    pub methodology: Methodology,
    pub key_findings: Vec<KeyFinding>,
    pub key_claims: Vec<KeyClaim>,
    pub conclusions: String,
    pub limitations: Vec<String>,
    pub future_directions: Vec<String>,
    pub keywords: Vec<String>,
    pub discipline_tags: Vec<String>,
    /// Self-reported confidence of the extracting model (0.0 - 1.0)
    pub confidence: f64,
}

impl StructuredExtraction {
    /// Check the invariants a provider payload must satisfy before it is
    /// accepted as a successful extraction.
    pub fn validate(&self) -> Result<(), String> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence must be within [0, 1], got {}",
                self.confidence
            ));
        }
        if self.is_empty() {
            return Err("extraction contains no content".to_string());
        }
        Ok(())
    }

    /// True when no content field carries any information.
    pub fn is_empty(&self) -> bool {
        self.thesis.trim().is_empty()
            && self.conclusions.trim().is_empty()
            && self.research_questions.is_empty()
            && self.methodology.is_empty()
            && self.key_findings.is_empty()
            && self.key_claims.is_empty()
            && self.limitations.is_empty()
            && self.future_directions.is_empty()
            && self.keywords.is_empty()
            && self.discipline_tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_payload() {
        let json = r#"{
            "thesis": "Sampling bias distorts survey estimates.",
            "keywords": ["bias", "surveys"],
            "confidence": 0.7
        }"#;
        let extraction: StructuredExtraction = serde_json::from_str(json).unwrap();

        assert_eq!(extraction.keywords, vec!["bias", "surveys"]);
        assert!(extraction.key_findings.is_empty());
        assert!(extraction.methodology.is_empty());
        assert!((extraction.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_findings_accept_strings_and_records() {
        let json = r#"{
            "key_findings": [
                "Effect is small",
                {"finding": "Effect persists", "evidence_type": "longitudinal"},
                {"claim": "Aliased field", "evidence": "survey"}
            ],
            "key_claims": ["Plain claim", {"claim": "Supported", "support": "Fig. 2"}]
        }"#;
        let extraction: StructuredExtraction = serde_json::from_str(json).unwrap();

        assert_eq!(extraction.key_findings[0], KeyFinding::new("Effect is small"));
        assert_eq!(
            extraction.key_findings[1],
            KeyFinding::new("Effect persists").with_evidence_type("longitudinal")
        );
        assert_eq!(
            extraction.key_findings[2],
            KeyFinding::new("Aliased field").with_evidence_type("survey")
        );
        assert_eq!(extraction.key_claims[0], KeyClaim::new("Plain claim"));
        assert_eq!(
            extraction.key_claims[1],
            KeyClaim::new("Supported").with_support("Fig. 2")
        );
    }

    #[test]
    fn test_validate_confidence_range() {
        let mut extraction = StructuredExtraction {
            thesis: "Something".to_string(),
            confidence: 0.5,
            ..Default::default()
        };
        assert!(extraction.validate().is_ok());

        extraction.confidence = 1.2;
        assert!(extraction.validate().is_err());

        extraction.confidence = f64::NAN;
        assert!(extraction.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let extraction = StructuredExtraction {
            confidence: 0.9,
            ..Default::default()
        };
        assert!(extraction.is_empty());
        assert!(extraction.validate().is_err());
    }

    #[test]
    fn test_serialize_skips_missing_attributes() {
        let value = serde_json::to_value(KeyFinding::new("x")).unwrap();
        assert_eq!(value, serde_json::json!({"finding": "x"}));
    }
}
