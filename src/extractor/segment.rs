// Recipe segmentation: turns the classified line stream of one document into
// a sequence of structured recipe records.
use crate::error::{Error, Result};
use crate::extractor::classify::{Classifier, LineRole};
use crate::extractor::document::{source_lines, SourceLines};
use crate::model::{record_id, Category, RecipeRecord, SourcePosition};
use tracing::{debug, warn};

/// Section the accumulator is currently appending to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Target {
    #[default]
    Header,
    Ingredients,
    Method,
    Tip,
}

/// Working state for the record under construction.
#[derive(Debug, Default)]
struct Accumulator {
    header: String,
    ingredients: String,
    method: String,
    tip: Option<String>,
    target: Target,
    position: SourcePosition,
}

impl Accumulator {
    fn open(&mut self, target: Target) {
        self.target = target;
        if target == Target::Tip && self.tip.is_none() {
            // Tip section present, even if its body turns out blank.
            self.tip = Some(String::new());
        }
    }

    fn push_header(&mut self, text: &str) {
        if !self.header.is_empty() {
            self.header.push(' ');
        }
        self.header.push_str(text);
    }

    fn push_body(&mut self, text: &str) {
        let text = text.trim();
        match self.target {
            Target::Header => self.push_header(text),
            Target::Ingredients => push_line(&mut self.ingredients, text),
            Target::Method => push_line(&mut self.method, text),
            Target::Tip => {
                let tip = self.tip.get_or_insert_with(String::new);
                if !tip.is_empty() {
                    tip.push(' ');
                }
                tip.push_str(text);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.header.is_empty() && !self.has_section_content()
    }

    fn has_section_content(&self) -> bool {
        !self.ingredients.is_empty() || !self.method.is_empty() || self.tip.is_some()
    }

    fn into_record(self, category: Option<Category>, seq: usize) -> Result<RecipeRecord> {
        if self.header.is_empty() {
            return Err(Error::MalformedRecord(format!(
                "record at page {} line {} has no header",
                self.position.page, self.position.line
            )));
        }
        if self.ingredients.trim().is_empty() {
            return Err(Error::MalformedRecord(format!(
                "recipe '{}' at page {} has no ingredients",
                self.header, self.position.page
            )));
        }

        Ok(RecipeRecord {
            id: record_id(&self.header, seq),
            header: self.header,
            category,
            ingredients: self.ingredients,
            method: self.method,
            tip: self.tip,
            position: self.position,
        })
    }
}

/// Body lines within a section are joined with newlines, verbatim.
fn push_line(section: &mut String, text: &str) {
    if !section.is_empty() {
        section.push('\n');
    }
    section.push_str(text);
}

/// Segments cookbook documents into recipe records.
///
/// Segmentation is one deterministic forward pass with no external state:
/// re-running over the same text yields an identical record sequence, and
/// independent documents can be segmented concurrently.
pub struct Segmenter {
    label_max_len: usize,
}

impl Segmenter {
    pub fn new(label_max_len: usize) -> Self {
        Self { label_max_len }
    }

    /// Lazily iterate the records of one document.
    pub fn segment<'a>(&self, document: &'a str) -> Records<'a> {
        Records {
            lines: source_lines(document),
            classifier: Classifier::new(self.label_max_len),
            acc: Accumulator::default(),
            sticky: None,
            seq: 0,
            finished: false,
        }
    }
}

/// Iterator over the records of a single document.
pub struct Records<'a> {
    lines: SourceLines<'a>,
    classifier: Classifier,
    acc: Accumulator,
    /// Current category register, sticky until the next category label.
    sticky: Option<Category>,
    seq: usize,
    finished: bool,
}

impl Records<'_> {
    /// Emit the accumulator if it holds a valid record; drop it with a
    /// diagnostic otherwise. One bad record never aborts the pass.
    fn flush(&mut self) -> Option<RecipeRecord> {
        let acc = std::mem::take(&mut self.acc);
        if acc.is_empty() {
            return None;
        }
        if !acc.has_section_content() {
            debug!(header = %acc.header, "discarding pending header with no sections");
            return None;
        }
        match acc.into_record(self.sticky, self.seq) {
            Ok(record) => {
                self.seq += 1;
                debug!(id = %record.id, header = %record.header, "segmented recipe");
                Some(record)
            }
            Err(e) => {
                warn!("dropping record: {e}");
                None
            }
        }
    }
}

impl Iterator for Records<'_> {
    type Item = RecipeRecord;

    fn next(&mut self) -> Option<RecipeRecord> {
        if self.finished {
            return None;
        }

        while let Some(line) = self.lines.next() {
            if line.page_start {
                self.classifier.page_break();
            }
            match self.classifier.classify(line.text) {
                LineRole::Blank => {}
                LineRole::CategoryLabel(category) => {
                    // Flush first: the last recipe of the previous category
                    // keeps the old register value.
                    let flushed = self.flush();
                    self.sticky = Some(category);
                    if let Some(record) = flushed {
                        return Some(record);
                    }
                }
                LineRole::Header => {
                    let flushed = self.flush();
                    self.acc.position = line.position;
                    self.acc.push_header(line.text.trim());
                    if let Some(record) = flushed {
                        return Some(record);
                    }
                }
                LineRole::IngredientsStart => self.acc.open(Target::Ingredients),
                LineRole::MethodStart => self.acc.open(Target::Method),
                LineRole::TipStart => self.acc.open(Target::Tip),
                LineRole::Body => {
                    if self.acc.target == Target::Header && self.acc.header.is_empty() {
                        self.acc.position = line.position;
                    }
                    self.acc.push_body(line.text);
                }
            }
        }

        self.finished = true;
        self.flush()
    }
}
