//! postmeta: fill in Hexo front matter for posts generated from a notes repository
//!
//! Dates come from the notes' git history, tags from a keyword extractor under a corpus-wide
//! budget, covers from the post body or a stable default.

use anyhow::Result;

fn main() -> Result<()> {
    postmeta::cli::run()
}
