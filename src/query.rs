// Query interpretation: raw interactive input -> structured search request.
//
// Grammar: `ingredient, ingredient, ... [filter:CATEGORY] [| free-text tail]`.
// The filter clause is detected and removed before the pipe split, so its
// position relative to the free-text delimiter does not matter. Parsing is
// fail-fast: an invalid request is rejected before any retrieval round trip.
use crate::error::{Error, Result};
use crate::model::Category;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A parsed search request.
///
/// Immutable once built; holds at least one ingredient term. Terms are
/// lowercased, deduplicated and kept in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub ingredients: Vec<String>,
    pub category: Option<Category>,
    /// Free-form constraint after the `|` delimiter, passed through verbatim
    /// to the generation step.
    pub constraint: Option<String>,
}

impl SearchRequest {
    /// The ingredient terms joined for embedding as a retrieval query.
    pub fn query_text(&self) -> String {
        self.ingredients.join(", ")
    }
}

/// Parse a raw query string.
///
/// Fails with [`Error::EmptyIngredients`] when no ingredient term remains
/// after parsing, and with [`Error::UnknownFilter`] when a `filter:` token is
/// present but not in the category set.
pub fn parse(raw: &str) -> Result<SearchRequest> {
    // Token runs to the next pipe delimiter or end of string.
    let filter_re = Regex::new(r"(?i)filter\s*:\s*([^|]*)").unwrap();

    let mut category = None;
    let remainder = match filter_re.captures(raw) {
        Some(caps) => {
            let token = caps[1].trim();
            let normalized = token.split_whitespace().collect::<Vec<_>>().join(" ");
            category = Some(
                Category::parse(&normalized)
                    .ok_or_else(|| Error::UnknownFilter(normalized.to_uppercase()))?,
            );
            let clause = caps.get(0).unwrap();
            format!("{}{}", &raw[..clause.start()], &raw[clause.end()..])
        }
        None => raw.to_string(),
    };

    let (ingredient_part, constraint) = match remainder.split_once('|') {
        Some((head, tail)) => {
            let tail = tail.trim();
            (
                head.to_string(),
                (!tail.is_empty()).then(|| tail.to_string()),
            )
        }
        None => (remainder, None),
    };

    let mut ingredients: Vec<String> = Vec::new();
    for term in ingredient_part.split(',') {
        let term = term.trim().to_lowercase();
        if term.is_empty() || ingredients.contains(&term) {
            continue;
        }
        ingredients.push(term);
    }

    if ingredients.is_empty() {
        return Err(Error::EmptyIngredients);
    }

    Ok(SearchRequest {
        ingredients,
        category,
        constraint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ingredient_list() {
        let request = parse("chicken, rice, garlic").unwrap();
        assert_eq!(request.ingredients, vec!["chicken", "rice", "garlic"]);
        assert_eq!(request.category, None);
        assert_eq!(request.constraint, None);
    }

    #[test]
    fn test_terms_normalized_and_deduplicated() {
        let request = parse("Chicken,  RICE , chicken,, rice").unwrap();
        assert_eq!(request.ingredients, vec!["chicken", "rice"]);
    }

    #[test]
    fn test_filter_clause() {
        let request = parse("chocolate, flour, butter filter:DESSERT & BAKING").unwrap();
        assert_eq!(request.category, Some(Category::DessertAndBaking));
        assert_eq!(request.ingredients, vec!["chocolate", "flour", "butter"]);
    }

    #[test]
    fn test_filter_clause_case_insensitive() {
        let request = parse("eggs filter:main meals").unwrap();
        assert_eq!(request.category, Some(Category::MainMeals));
    }

    #[test]
    fn test_free_text_constraint() {
        let request = parse("beef, onion, tomato | quick and easy under 30 minutes").unwrap();
        assert_eq!(request.ingredients, vec!["beef", "onion", "tomato"]);
        assert_eq!(
            request.constraint.as_deref(),
            Some("quick and easy under 30 minutes")
        );
    }

    #[test]
    fn test_filter_and_free_text_together() {
        let request = parse("beef, onion filter:BURGERS | for two people").unwrap();
        assert_eq!(request.category, Some(Category::Burgers));
        assert_eq!(request.ingredients, vec!["beef", "onion"]);
        assert_eq!(request.constraint.as_deref(), Some("for two people"));
    }

    #[test]
    fn test_filter_after_pipe_still_honoured() {
        // Position policy: the filter clause is extracted before the pipe split
        let request = parse("beef, onion | something quick filter:BURGERS").unwrap();
        assert_eq!(request.category, Some(Category::Burgers));
        assert_eq!(request.constraint.as_deref(), Some("something quick"));
    }

    #[test]
    fn test_no_ingredients_fails() {
        let err = parse("filter:MAIN MEALS").unwrap_err();
        assert!(matches!(err, Error::EmptyIngredients));

        let err = parse("  , , ").unwrap_err();
        assert!(matches!(err, Error::EmptyIngredients));
    }

    #[test]
    fn test_unknown_filter_fails() {
        let err = parse("eggs filter:BREAKFAST").unwrap_err();
        match err {
            Error::UnknownFilter(token) => assert_eq!(token, "BREAKFAST"),
            other => panic!("expected UnknownFilter, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_free_text_is_absent() {
        let request = parse("chicken |   ").unwrap();
        assert_eq!(request.constraint, None);
    }

    #[test]
    fn test_query_text_joins_terms() {
        let request = parse("chicken, rice").unwrap();
        assert_eq!(request.query_text(), "chicken, rice");
    }
}
