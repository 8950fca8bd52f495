//! Image references in post bodies: rewriting relative URLs and picking the cover.

use crate::utils::{join_posix, normalize_path, posix_parent};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

static MD_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)!\[[^\]]*\]\(\s*<?([^\s)>]+)>?(?:\s+['"]?[^'"]*['"]?)?\s*\)"#)
        .expect("valid regex")
});
static MD_IMAGE_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(!\[[^\]]*\]\(\s*<?)([^\s)>]+)(>?)(\s*(?:['"][^'"]*['"])?\s*\))"#)
        .expect("valid regex")
});
static HTML_IMG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc=['"]([^'"]+)['"][^>]*>"#).expect("valid regex")
});

/// `http(s)://`, protocol-relative and `data:` URLs.
pub fn is_remote_or_data_url(url: &str) -> bool {
    let u = url.trim().to_ascii_lowercase();
    u.starts_with("http://") || u.starts_with("https://") || u.starts_with("//") || u.starts_with("data:")
}

/// Split a URL reference into (path, query, fragment).
fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    match rest.split_once('?') {
        Some((path, query)) => (path, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

/// Rewrites relative image URLs to live under a site-wide image root.
#[derive(Debug, Clone)]
pub struct ImageRewriter {
    root: String,
}

impl ImageRewriter {
    pub fn new(image_root_url: &str) -> Self {
        let root = image_root_url.trim().trim_end_matches('/');
        let root = if root.is_empty() { "/note_image" } else { root };
        Self { root: root.to_string() }
    }

    /// Rewrite one URL found in the note at `note_rel_path` (relative to the posts root).
    ///
    /// `./image/a.jpg` in `Java/x.md` becomes `<root>/Java/image/a.jpg`; query and fragment are
    /// kept. Remote, `data:` and site-absolute URLs, and URLs already under the root, are
    /// returned unchanged.
    pub fn rewrite_url(&self, note_rel_path: &str, url: &str) -> String {
        if url.is_empty() || is_remote_or_data_url(url) || url.trim_start().starts_with('/') {
            return url.to_string();
        }
        let (path, query, fragment) = split_url(url);
        let path = path.trim();
        if path.is_empty() {
            return url.to_string();
        }
        let bare_root = self.root.trim_start_matches('/');
        if !bare_root.is_empty() && path.starts_with(&format!("{bare_root}/")) {
            return url.to_string();
        }

        let joined = join_posix(posix_parent(note_rel_path), &normalize_path(path));
        let mut out = if joined.is_empty() { self.root.clone() } else { format!("{}/{}", self.root, joined) };
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    /// Rewrite every Markdown image and HTML `<img src>` in `body`.
    pub fn rewrite_body(&self, note_rel_path: &str, body: &str) -> String {
        let out = MD_IMAGE_PARTS.replace_all(body, |caps: &Captures| {
            let new_url = self.rewrite_url(note_rel_path, &caps[2]);
            format!("{}{}{}{}", &caps[1], new_url, &caps[3], &caps[4])
        });
        HTML_IMG
            .replace_all(&out, |caps: &Captures| {
                let (Some(tag), Some(src)) = (caps.get(0), caps.get(1)) else {
                    return caps[0].to_string();
                };
                let new_url = self.rewrite_url(note_rel_path, src.as_str());
                let (start, end) = (src.start() - tag.start(), src.end() - tag.start());
                let tag = tag.as_str();
                format!("{}{}{}", &tag[..start], new_url, &tag[end..])
            })
            .into_owned()
    }
}

/// The first image referenced in `body`, Markdown or HTML, whichever comes first.
pub fn first_image_url(body: &str) -> Option<String> {
    let md = MD_IMAGE
        .captures_iter(body)
        .find_map(|c| c.get(1).filter(|m| !m.as_str().trim().is_empty()).map(|m| (c.get(0), m)));
    let html = HTML_IMG
        .captures_iter(body)
        .find_map(|c| c.get(1).filter(|m| !m.as_str().trim().is_empty()).map(|m| (c.get(0), m)));

    let start = |whole: Option<regex::Match<'_>>| whole.map(|w| w.start()).unwrap_or(usize::MAX);
    let pick = match (md, html) {
        (Some(md), Some(html)) => {
            if start(html.0) < start(md.0) {
                html.1
            } else {
                md.1
            }
        }
        (Some(only), None) | (None, Some(only)) => only.1,
        (None, None) => return None,
    };
    Some(pick.as_str().trim().to_string())
}

/// Whether an image URL points at something that exists.
///
/// Remote and `data:` URLs count as existing. `/x` maps to `<site_root>/source/x`; relative paths
/// are tried next to the note and then under `<site_root>/source`.
pub fn local_image_exists(site_root: &Path, note_path: &Path, url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    if is_remote_or_data_url(url) {
        return true;
    }
    let (path, _, _) = split_url(url);
    let path = path.trim();
    let path = path.strip_prefix('<').and_then(|p| p.strip_suffix('>')).unwrap_or(path);
    let path = normalize_path(path);
    if path.is_empty() {
        return false;
    }

    let source = site_root.join("source");
    if let Some(abs) = path.strip_prefix('/') {
        return source.join(abs).exists();
    }
    let beside_note = note_path.parent().map(|dir| dir.join(&path).exists()).unwrap_or(false);
    beside_note || source.join(&path).exists()
}
