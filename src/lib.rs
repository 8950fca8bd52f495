//! postmeta: publication metadata for Markdown posts generated from a git-tracked notes corpus
//!
//! One pass over the notes history yields creation/update times, a corpus-wide tag allocator
//! keeps the tag vocabulary bounded, and the assembler writes Hexo front matter in place.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod progress;
pub mod scan;
pub mod tags;
pub mod utils;

pub use error::{MetaError, MetaResult};
