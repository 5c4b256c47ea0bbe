// Cookbook extraction: document text -> classified lines -> recipe records
pub mod classify;
pub mod document;
pub mod segment;

// Re-exports
pub use classify::{Classifier, LineRole};
pub use document::{load_document, source_lines, SourceLine};
pub use segment::{Records, Segmenter};
