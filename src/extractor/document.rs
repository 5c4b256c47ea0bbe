// Document loading and page/line bookkeeping for extracted cookbook text.
//
// The input is plain text produced by layout-preserving PDF extraction, with
// pages separated by form feed characters. This module strips those
// page-break artifacts and hands the classifier clean lines tagged with
// their source position.
use crate::error::Result;
use crate::model::SourcePosition;
use std::path::Path;

/// One line of extracted document text with its source position.
#[derive(Debug, Clone, Copy)]
pub struct SourceLine<'a> {
    pub position: SourcePosition,
    pub text: &'a str,
    /// True for the first line of every page after the first.
    pub page_start: bool,
}

/// Read a cookbook document from disk.
pub fn load_document(path: impl AsRef<Path>) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// Iterate over the document's lines with page/line positions, form feeds
/// stripped.
pub fn source_lines(document: &str) -> SourceLines<'_> {
    SourceLines {
        pages: document.split('\u{c}'),
        current: None,
        page: 0,
    }
}

pub struct SourceLines<'a> {
    pages: std::str::Split<'a, char>,
    current: Option<std::iter::Enumerate<std::str::Lines<'a>>>,
    page: usize,
}

impl<'a> Iterator for SourceLines<'a> {
    type Item = SourceLine<'a>;

    fn next(&mut self) -> Option<SourceLine<'a>> {
        loop {
            if let Some(lines) = &mut self.current {
                if let Some((idx, text)) = lines.next() {
                    return Some(SourceLine {
                        position: SourcePosition {
                            page: self.page,
                            line: idx + 1,
                        },
                        text,
                        page_start: idx == 0 && self.page > 1,
                    });
                }
            }
            let page_text = self.pages.next()?;
            self.page += 1;
            self.current = Some(page_text.lines().enumerate());
        }
    }
}
