//! uxsynth Analyze: heuristic synthesis of usability-test transcripts.
//!
//! Keyword dictionaries, substring counts and sentence-length filters turn
//! raw transcript text into themes, pain points, quotes and
//! recommendations. No statistical model is involved; every stage is a
//! pure function of its input.

pub mod deck;
pub mod dictionary;
pub mod observer;
pub mod pain_points;
pub mod pipeline;
pub mod quotes;
pub mod recommendations;
pub mod sentences;
pub mod summary;
pub mod themes;

pub use deck::{build_deck, Deck, Slide, SlideKind};
pub use observer::{AnalysisObserver, TracingObserver};
pub use pipeline::{analyze, Analyzer};
pub use sentences::{split_paragraphs, split_sentences, Sentences};
