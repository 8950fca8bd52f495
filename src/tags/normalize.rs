//! Text cleanup and tokenization shared by every extraction strategy.

use crate::assemble::front_matter::strip_front_matter;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Markup noise and common English function words; never proposed as tags.
pub static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // markup and URL fragments
        "note_image", "images", "image", "img", "http", "https", "www", "true", "false", "null",
        "none", "png", "jpg", "jpeg", "gif", "svg", "webp", "html", "href", "src", "alt",
        // English
        "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
        "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can", "this",
        "that", "these", "those", "i", "you", "he", "she", "it", "its", "we", "they", "them",
        "our", "your", "my", "me", "us", "what", "which", "who", "whom", "whose", "where", "when",
        "why", "how", "all", "each", "every", "both", "few", "more", "most", "other", "some",
        "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "just",
        "also", "now", "here", "there", "then", "if", "else", "into", "about", "over", "after",
        "before", "up", "down", "out", "off", "again", "once", "any", "because", "while", "via",
    ]
    .into_iter()
    .collect()
});

static FENCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").expect("valid regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]+`").expect("valid regex"));
static MD_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"));
static MD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:https?://|\bwww\.)\S+").expect("valid regex"));

/// Remove front matter and the Markdown constructs that only produce noisy tokens.
pub fn clean_text(text: &str) -> String {
    let body = strip_front_matter(text);
    let clean = FENCED_CODE.replace_all(body, "\n");
    let clean = INLINE_CODE.replace_all(&clean, " ");
    let clean = MD_IMAGE.replace_all(&clean, " ");
    let clean = MD_LINK.replace_all(&clean, " $1 ");
    let clean = HTML_TAG.replace_all(&clean, " ");
    URL.replace_all(&clean, " ").into_owned()
}

fn is_han(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '+' | '#' | '.' | '-' | '/' | '\\')
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Run {
    Han,
    Word,
    Gap,
}

fn classify(c: char) -> Run {
    if is_han(c) {
        Run::Han
    } else if is_word_char(c) {
        Run::Word
    } else {
        Run::Gap
    }
}

/// Split already-cleaned text into tokens, in document order.
///
/// Word runs are lower-cased with sentence punctuation (`.`, `-`) trimmed from both ends, so
/// `Rust.` and `rust` agree while `c++`, `c#` and `node.js` survive. Han runs longer than four
/// characters become overlapping bigrams. No filtering happens here; see [`is_eligible_term`].
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut run: Vec<char> = Vec::new();
    let mut kind = Run::Gap;

    for c in text.chars().chain(std::iter::once(' ')) {
        let next = classify(c);
        if next != kind {
            flush(&run, kind, &mut tokens);
            run.clear();
            kind = next;
        }
        if next != Run::Gap {
            run.push(c);
        }
    }
    tokens
}

fn flush(run: &[char], kind: Run, tokens: &mut Vec<String>) {
    match kind {
        Run::Gap => {}
        Run::Han if run.len() <= 4 => tokens.push(run.iter().collect()),
        Run::Han => tokens.extend(run.windows(2).map(|pair| pair.iter().collect::<String>())),
        Run::Word => {
            let word: String = run.iter().collect();
            let word = word.trim_matches(|c| c == '.' || c == '-');
            if !word.is_empty() {
                tokens.push(word.to_lowercase());
            }
        }
    }
}

/// The term filter applied to candidates and again by the allocator.
pub fn is_eligible_term(term: &str) -> bool {
    let term = term.trim();
    if term.chars().count() < 2 {
        return false;
    }
    if term.chars().all(|c| c.is_numeric()) {
        return false;
    }
    if term.contains('/') || term.contains('\\') {
        return false;
    }
    !STOPWORDS.contains(term.to_lowercase().as_str())
}

/// Clean, tokenize and filter one document.
pub fn document_terms(text: &str) -> Vec<String> {
    tokenize(&clean_text(text)).into_iter().filter(|t| is_eligible_term(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_drops_markup_noise() {
        let text = "---\ntitle: x\n---\nSee [the docs](http://a.b/c) and ![img](p.png)\n\
                    ```\nlet code = 1;\n```\n`inline` <b>bold</b> https://x.y/z www.q.com end";
        let clean = clean_text(text);
        assert!(clean.contains("the docs"));
        assert!(clean.contains("bold"));
        assert!(clean.contains("end"));
        for gone in ["title", "http", "p.png", "code", "inline", "<b>", "x.y", "www"] {
            assert!(!clean.contains(gone), "{gone:?} survived in {clean:?}");
        }
    }

    #[test]
    fn test_tokenize_latin_and_punctuation() {
        assert_eq!(
            tokenize("Rust, C++ and C# with node.js. End-"),
            vec!["rust", "c++", "and", "c#", "with", "node.js", "end"]
        );
    }

    #[test]
    fn test_tokenize_han_runs() {
        assert_eq!(tokenize("缓存"), vec!["缓存"]);
        assert_eq!(tokenize("分布式缓存"), vec!["分布", "布式", "式缓", "缓存"]);
        assert_eq!(tokenize("用Rust写"), vec!["用", "rust", "写"]);
    }

    #[test]
    fn test_term_filter() {
        for rejected in ["a", "123", "a/b", "c:\\x", "The", "image", "NULL", " "] {
            assert!(!is_eligible_term(rejected), "{rejected:?} should be rejected");
        }
        for accepted in ["go", "rust", "v8", "缓存", "c++"] {
            assert!(is_eligible_term(accepted), "{accepted:?} should be accepted");
        }
    }

    #[test]
    fn test_document_terms_keeps_repeats_in_order() {
        assert_eq!(document_terms("Rust and rust, then go"), vec!["rust", "rust", "go"]);
    }
}
