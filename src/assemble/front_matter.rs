//! Front matter parsing and rendering, plus body escaping for the Hexo renderer.

use crate::domain::RawWrapMode;
use chrono::{Datelike, TimeZone};

const FENCES: [&str; 2] = ["---", ";;;"];

/// Split a leading `---` or `;;;` block from the body.
///
/// The block must open on the first line and close with a line holding the same fence; an
/// unclosed block is treated as ordinary body text.
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(fence) = FENCES
        .iter()
        .find(|f| content.starts_with(&format!("{f}\n")) || content.starts_with(&format!("{f}\r\n")))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for (i, line) in content.split_inclusive('\n').enumerate() {
        offset += line.len();
        if i > 0 && line.trim() == *fence {
            return (Some(&content[..offset]), &content[offset..]);
        }
    }
    (None, content)
}

/// The body without any front matter block.
pub fn strip_front_matter(content: &str) -> &str {
    split_front_matter(content).1
}

/// `Y-M-D HH:MM:SS` without zero-padding month and day (`2013-7-13 20:46:25`).
pub fn format_hexo_datetime<Tz: TimeZone>(epoch_seconds: i64, tz: &Tz) -> Option<String> {
    let dt = tz.timestamp_opt(epoch_seconds, 0).earliest()?;
    let naive = dt.naive_local();
    Some(format!(
        "{}-{}-{} {}",
        naive.year(),
        naive.month(),
        naive.day(),
        naive.format("%H:%M:%S")
    ))
}

fn json_quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn yaml_list(key: &str, values: &[String]) -> String {
    if values.is_empty() {
        return format!("{key}: []\n");
    }
    let mut out = format!("{key}:\n");
    for value in values {
        out.push_str("  - ");
        out.push_str(&json_quote(value));
        out.push('\n');
    }
    out
}

/// The generated header of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    pub updated: String,
    pub cover: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
}

impl FrontMatter {
    /// Render as a `---` block followed by one blank line.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        out.push_str(&format!("title: {}\n", json_quote(&self.title)));
        out.push_str(&format!("date: {}\n", json_quote(&self.date)));
        out.push_str(&format!("updated: {}\n", json_quote(&self.updated)));
        out.push_str(&format!("cover: {}\n", json_quote(&self.cover)));
        out.push_str(&yaml_list("tags", &self.tags));
        out.push_str(&yaml_list("categories", &self.categories));
        out.push_str("---\n\n");
        out
    }
}

pub fn should_raw_wrap(body: &str, mode: RawWrapMode) -> bool {
    match mode {
        RawWrapMode::Never => false,
        RawWrapMode::Always => true,
        RawWrapMode::Auto => body.contains("{%") || body.contains("{{") || body.contains("{#"),
    }
}

/// Wrap in `{% raw %}`/`{% endraw %}` unless both markers are already present.
pub fn wrap_raw(body: &str) -> String {
    if body.contains("{% raw %}") && body.contains("{% endraw %}") {
        return body.to_string();
    }
    let newline = if body.ends_with('\n') { "" } else { "\n" };
    format!("{{% raw %}}\n{body}{newline}{{% endraw %}}\n")
}

/// Replace `{{` and `}}` with HTML entities.
pub fn escape_curly(content: &str) -> String {
    content.replace("{{", "&#123;&#123;").replace("}}", "&#125;&#125;")
}
