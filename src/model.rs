// Shared data model: the category set and the recipe record emitted by the
// extractor and indexed by the vector store.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Closed set of recipe categories.
///
/// The same set is recognized by the section classifier (category label
/// lines), validated by the query interpreter (`filter:` clauses) and stored
/// as filterable metadata in the vector table. Keep all three in sync by
/// going through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    StartersAndSalads,
    LightMeals,
    MainMeals,
    GourmetDogs,
    Burgers,
    DessertAndBaking,
    ColdSauces,
}

/// Label stored and displayed for records without a recognized category.
pub const UNCATEGORIZED: &str = "UNCATEGORIZED";

impl Category {
    pub const ALL: [Category; 7] = [
        Category::StartersAndSalads,
        Category::LightMeals,
        Category::MainMeals,
        Category::GourmetDogs,
        Category::Burgers,
        Category::DessertAndBaking,
        Category::ColdSauces,
    ];

    /// Canonical label as it appears in the source document and in filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::StartersAndSalads => "STARTERS & SALADS",
            Category::LightMeals => "LIGHT MEALS",
            Category::MainMeals => "MAIN MEALS",
            Category::GourmetDogs => "GOURMET DOGS",
            Category::Burgers => "BURGERS",
            Category::DessertAndBaking => "DESSERT & BAKING",
            Category::ColdSauces => "COLD SAUCES",
        }
    }

    /// Parse a label, case-insensitive and whitespace-normalized.
    ///
    /// Returns `None` for anything outside the closed set.
    pub fn parse(label: &str) -> Option<Category> {
        let normalized = label
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a record in the source document, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    /// 1-based page number.
    pub page: usize,
    /// 1-based line number within the page.
    pub line: usize,
}

/// One structured recipe extracted from the cookbook document.
///
/// Invariants (enforced by the segmenter, which drops violators instead of
/// emitting them): `header` and `ingredients` are non-empty. `tip` is `None`
/// when the source has no tip section at all, as opposed to a present but
/// blank one. Records are immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Stable identifier derived from the header text and sequence index.
    pub id: String,
    /// Display name of the recipe.
    pub header: String,
    /// Category from the closed set, `None` when uncategorized.
    pub category: Option<Category>,
    /// Raw ingredients text, verbatim from the source.
    pub ingredients: String,
    /// Raw method text, verbatim from the source.
    pub method: String,
    /// Optional tip text.
    pub tip: Option<String>,
    /// Where the record started in the source document.
    pub position: SourcePosition,
}

impl RecipeRecord {
    /// Label used for storage and display of the category.
    pub fn category_label(&self) -> &'static str {
        self.category.map(|c| c.as_str()).unwrap_or(UNCATEGORIZED)
    }
}

/// Derive a stable record identifier from the header text and the record's
/// sequence index within the segmentation pass.
pub fn record_id(header: &str, index: usize) -> String {
    let digest = Sha256::digest(header.as_bytes());
    let hash: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    format!("recipe-{index:03}-{hash}")
}
