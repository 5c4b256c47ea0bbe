// Line classification for cookbook text.
//
// The classifier assigns a structural role to each line as a single forward
// pass. The rules form a priority-ordered decision table (first match wins):
//
//   1. blank line                                   -> Blank
//   2. short uppercase line after a blank that is
//      a member of the closed category set          -> CategoryLabel
//   3. section-start keyword line                   -> IngredientsStart /
//                                                      MethodStart / TipStart
//   4. uppercase line after a blank                 -> Header
//   5. anything else                                -> Body
//
// Headers and category labels are both short uppercase lines, so the two are
// distinguished by membership in the closed category set (the same set the
// query interpreter validates against) guarded by a length threshold. A
// misclassified line costs at most one record; it never aborts the pass.
use crate::model::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Blank,
    CategoryLabel(Category),
    IngredientsStart,
    MethodStart,
    TipStart,
    Header,
    Body,
}

const INGREDIENTS_KEYWORDS: &[&str] = &["INGREDIENTS"];
const METHOD_KEYWORDS: &[&str] = &["METHOD"];
const TIP_KEYWORDS: &[&str] = &["CHEF'S TIP", "CHEFS TIP", "TIP"];

/// Stateful line classifier for one document pass.
///
/// The only mode the decision table needs is whether the previous line was
/// blank; page breaks count as blanks.
pub struct Classifier {
    label_max_len: usize,
    prev_blank: bool,
}

impl Classifier {
    pub fn new(label_max_len: usize) -> Self {
        Self {
            label_max_len,
            // Document start behaves like a preceding blank line.
            prev_blank: true,
        }
    }

    /// Record a page boundary; the next line is treated as blank-preceded.
    pub fn page_break(&mut self) {
        self.prev_blank = true;
    }

    /// Classify one line and update the mode.
    pub fn classify(&mut self, line: &str) -> LineRole {
        let role = self.decide(line);
        self.prev_blank = role == LineRole::Blank;
        role
    }

    fn decide(&self, line: &str) -> LineRole {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineRole::Blank;
        }

        if let Some(role) = section_start(trimmed) {
            return role;
        }

        if self.prev_blank && is_uppercase_line(trimmed) {
            if trimmed.len() < self.label_max_len {
                if let Some(category) = Category::parse(trimmed) {
                    return LineRole::CategoryLabel(category);
                }
            }
            return LineRole::Header;
        }

        LineRole::Body
    }
}

/// Match a line consisting of a section-start keyword, case-insensitive,
/// with optional trailing punctuation.
fn section_start(trimmed: &str) -> Option<LineRole> {
    let bare = trimmed.trim_end_matches([':', '.', '…']).trim_end();
    let upper = bare.to_uppercase();

    if INGREDIENTS_KEYWORDS.contains(&upper.as_str()) {
        Some(LineRole::IngredientsStart)
    } else if METHOD_KEYWORDS.contains(&upper.as_str()) {
        Some(LineRole::MethodStart)
    } else if TIP_KEYWORDS.contains(&upper.as_str()) {
        Some(LineRole::TipStart)
    } else {
        None
    }
}

/// A line of uppercase letters, digits, spaces and punctuation; at least one
/// letter, none of them lowercase.
fn is_uppercase_line(trimmed: &str) -> bool {
    trimmed.chars().any(|c| c.is_alphabetic()) && !trimmed.chars().any(|c| c.is_lowercase())
}
