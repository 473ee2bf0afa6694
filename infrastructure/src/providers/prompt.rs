//! Extraction prompt shared by every HTTP adapter

use council_domain::ExtractionRequest;

/// Default cap on paper text sent to a provider, in characters
pub const DEFAULT_MAX_TEXT_CHARS: usize = 60_000;

/// Templates for the extraction request
pub struct ExtractionPrompt;

impl ExtractionPrompt {
    pub fn system() -> &'static str {
        r#"You are a meticulous research assistant who reads academic papers and extracts their structure.
Respond with a single JSON object and nothing else. Do not wrap it in prose.
Only report what the paper states; leave a field empty rather than guessing.
Set "confidence" to a number between 0 and 1 describing how sure you are of the extraction as a whole."#
    }

    /// User prompt with the JSON schema and the (possibly truncated) paper text
    pub fn user(request: &ExtractionRequest, max_text_chars: usize) -> String {
        let (text, truncated) = truncate_chars(&request.text, max_text_chars);

        let mut prompt = format!(
            r#"Extract the structure of the following paper.

Paper: {}
Item type: {}
"#,
            request.citation(),
            request.item_type
        );

        prompt.push_str(
            r#"
Return JSON with exactly these keys:
{
  "thesis": "main argument in one or two sentences",
  "research_questions": ["..."],
  "methodology": {
    "approach": "overall design",
    "data_sources": ["..."],
    "analysis_methods": ["..."]
  },
  "key_findings": [{"finding": "...", "evidence_type": "empirical | theoretical | ..."}],
  "key_claims": [{"claim": "...", "support": "how the paper supports it"}],
  "conclusions": "...",
  "limitations": ["..."],
  "future_directions": ["..."],
  "keywords": ["..."],
  "discipline_tags": ["..."],
  "confidence": 0.0
}

--- PAPER TEXT ---
"#,
        );
        prompt.push_str(text);
        if truncated {
            prompt.push_str("\n[... text truncated ...]");
        }
        prompt.push_str("\n--- END PAPER TEXT ---");

        prompt
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => (&text[..end], true),
        None => (text, false),
    }
}
