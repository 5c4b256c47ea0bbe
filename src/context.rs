// Context assembly: annotate retrieved candidates with ingredient coverage
// and bound them to a budget before prompt rendering.
use crate::model::RecipeRecord;
use crate::query::SearchRequest;
use serde::{Deserialize, Serialize};

/// A record paired with its similarity score, as returned by retrieval.
/// Higher score means more relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: RecipeRecord,
    pub score: f32,
}

/// A candidate annotated with ingredient coverage.
///
/// Coverage is explanatory metadata for the generation step, not a ranking
/// key: candidates stay in the similarity order retrieval produced, since a
/// recipe covering fewer literal tokens can still be the better conceptual
/// match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub record: RecipeRecord,
    pub score: f32,
    /// Request ingredients found in the record's ingredients text.
    pub found: Vec<String>,
    /// Request ingredients the record does not mention.
    pub missing: Vec<String>,
}

impl CandidateMatch {
    /// Fraction of requested ingredients found in the record.
    pub fn coverage(&self) -> f32 {
        let requested = self.found.len() + self.missing.len();
        if requested == 0 {
            return 0.0;
        }
        self.found.len() as f32 / requested as f32
    }
}

/// The bounded, annotated candidate set handed to the generation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBundle {
    pub request: SearchRequest,
    pub matches: Vec<CandidateMatch>,
}

/// Assemble a context bundle from retrieval results.
///
/// Keeps at most `budget` candidates in their supplied order, annotates each
/// with coverage, and caps the ingredients/method text fields at
/// `max_field_chars` on whole-word boundaries. Deterministic for identical
/// inputs.
pub fn assemble(
    request: &SearchRequest,
    candidates: Vec<ScoredRecord>,
    budget: usize,
    max_field_chars: usize,
) -> ContextBundle {
    let matches = candidates
        .into_iter()
        .take(budget)
        .map(|candidate| annotate(request, candidate, max_field_chars))
        .collect();

    ContextBundle {
        request: request.clone(),
        matches,
    }
}

fn annotate(
    request: &SearchRequest,
    candidate: ScoredRecord,
    max_field_chars: usize,
) -> CandidateMatch {
    let mut record = candidate.record;

    // Literal containment only: fuzzy matching already happened upstream in
    // vector retrieval. This is the cheap check behind the "missing
    // ingredients" annotation.
    let haystack = record.ingredients.to_lowercase();
    let mut found = Vec::new();
    let mut missing = Vec::new();
    for term in &request.ingredients {
        if haystack.contains(term.as_str()) {
            found.push(term.clone());
        } else {
            missing.push(term.clone());
        }
    }

    record.ingredients = truncate_words(&record.ingredients, max_field_chars);
    record.method = truncate_words(&record.method, max_field_chars);

    CandidateMatch {
        record,
        score: candidate.score,
        found,
        missing,
    }
}

/// Truncate to at most `max_chars` characters without splitting a word,
/// appending an ellipsis when anything was cut.
fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let head: String = text.chars().take(max_chars).collect();
    let cut = head
        .rfind(char::is_whitespace)
        .map(|idx| head[..idx].trim_end().to_string())
        .unwrap_or(head);
    format!("{cut}...")
}
