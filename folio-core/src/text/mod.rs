//! Text processing on extracted page text

pub mod sentences;

pub use sentences::{split_sentences, Sentence, SentenceIndex, SentencePageMap};
