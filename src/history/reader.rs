//! Single-invocation `git log` reader.
//!
//! The whole history of the notes repository is requested in one `git log --name-status` call.
//! Its stdout is spooled to an anonymous temporary file rather than a pipe, then parsed back line
//! by line, so memory stays bounded and a large history can never stall the child on a full pipe.

use crate::domain::{Change, ChangeRecord, DateKind};
use crate::error::{MetaError, MetaResult};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Prefix of the per-commit header line emitted through `--format`.
pub const TIMESTAMP_MARKER: &str = "__TS__";

/// Pathspecs restricting the log to Markdown notes, recursively.
pub const NOTE_PATHSPECS: &[&str] = &[":(glob)**/*.md", ":(glob)**/*.markdown"];

/// A `git log` query over one repository directory.
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    root: PathBuf,
    date_kind: DateKind,
    pathspecs: Vec<String>,
}

impl HistoryQuery {
    pub fn new(root: &Path, date_kind: DateKind) -> Self {
        Self {
            root: root.to_path_buf(),
            date_kind,
            pathspecs: NOTE_PATHSPECS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the default note pathspecs.
    pub fn pathspecs(mut self, pathspecs: Vec<String>) -> Self {
        self.pathspecs = pathspecs;
        self
    }

    /// Arguments passed to `git`, in order.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "-C".to_string(),
            self.root.to_string_lossy().into_owned(),
            "-c".to_string(),
            "core.quotepath=false".to_string(),
            "--no-pager".to_string(),
            "log".to_string(),
            "--relative".to_string(),
            "-M".to_string(),
            "--name-status".to_string(),
            "--diff-filter=AMDR".to_string(),
            format!("--format={}{}", TIMESTAMP_MARKER, self.date_kind.format_placeholder()),
            "--".to_string(),
        ];
        args.extend(self.pathspecs.iter().cloned());
        args
    }

    /// Run the query.
    ///
    /// Fails only when git itself is missing. A failing or silent `git log` (not a repository,
    /// no commits yet) is reported as an empty history.
    pub fn run(&self) -> MetaResult<HistoryLog<Box<dyn BufRead + Send>>> {
        which::which("git").map_err(|_| MetaError::ToolUnavailable { tool: "git" })?;

        let args = self.command_args();
        tracing::debug!("running git {}", args.join(" "));

        let spool = tempfile::tempfile()?;
        let output = Command::new("git")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(spool.try_clone()?))
            .stderr(Stdio::piped())
            .output();
        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MetaError::ToolUnavailable { tool: "git" });
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                "git log exited with {} in {}; treating history as unavailable: {}",
                output.status,
                self.root.display(),
                stderr.trim()
            );
            return Ok(HistoryLog::empty());
        }

        let mut spool: File = spool;
        let total_bytes = spool.seek(SeekFrom::End(0))?;
        spool.seek(SeekFrom::Start(0))?;
        if total_bytes == 0 {
            tracing::warn!("git log returned no history for {}", self.root.display());
            return Ok(HistoryLog::empty());
        }
        tracing::debug!("spooled {} bytes of git log output", total_bytes);

        let reader: Box<dyn BufRead + Send> = Box::new(BufReader::new(spool));
        Ok(HistoryLog::new(reader).with_total_bytes(total_bytes))
    }
}

/// Counters collected while parsing a log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    pub lines_read: usize,
    pub records: usize,
    pub malformed: usize,
}

/// Streaming parser over `git log --name-status` output, yielding records newest first.
pub struct HistoryLog<R> {
    reader: R,
    buf: Vec<u8>,
    current_ts: Option<i64>,
    stats: LogStats,
    bytes_read: u64,
    total_bytes: u64,
}

impl HistoryLog<Box<dyn BufRead + Send>> {
    /// A log with no records ("no history available").
    pub fn empty() -> Self {
        HistoryLog::new(Box::new(std::io::empty()))
    }
}

impl<R: BufRead> HistoryLog<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            current_ts: None,
            stats: LogStats::default(),
            bytes_read: 0,
            total_bytes: 0,
        }
    }

    fn with_total_bytes(mut self, total_bytes: u64) -> Self {
        self.total_bytes = total_bytes;
        self
    }

    pub fn stats(&self) -> LogStats {
        self.stats
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Size of the spooled output, or 0 when unknown.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    fn skip_malformed(&mut self, line: &str) {
        self.stats.malformed += 1;
        let err =
            MetaError::MalformedHistoryOutput { line_no: self.stats.lines_read, line: line.to_string() };
        tracing::debug!("skipping: {}", err);
    }
}

impl<R: BufRead> Iterator for HistoryLog<R> {
    type Item = MetaResult<ChangeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            let n = match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(n) => n,
                Err(e) => return Some(Err(e.into())),
            };
            self.bytes_read += n as u64;
            self.stats.lines_read += 1;

            let raw = String::from_utf8_lossy(&self.buf);
            let line = raw.trim_end_matches(['\n', '\r']).to_string();
            if line.is_empty() {
                continue;
            }

            match parse_line(&line) {
                LogLine::Marker(Some(ts)) => self.current_ts = Some(ts),
                LogLine::Marker(None) => {
                    // Records up to the next marker would be misdated.
                    self.current_ts = None;
                    self.skip_malformed(&line);
                }
                LogLine::Change(change) => {
                    let Some(ts) = self.current_ts else {
                        self.skip_malformed(&line);
                        continue;
                    };
                    self.stats.records += 1;
                    return Some(Ok(ChangeRecord::new(ts, change)));
                }
                LogLine::Ignored => {}
                LogLine::Malformed => self.skip_malformed(&line),
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LogLine {
    Marker(Option<i64>),
    Change(Change),
    /// Well-formed but irrelevant (copy or type-change entries).
    Ignored,
    Malformed,
}

fn parse_line(line: &str) -> LogLine {
    if let Some(rest) = line.strip_prefix(TIMESTAMP_MARKER) {
        return LogLine::Marker(rest.trim().parse::<i64>().ok());
    }

    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 2 || parts[1].is_empty() {
        return LogLine::Malformed;
    }
    let status = parts[0];
    match status.chars().next() {
        Some('A') => LogLine::Change(Change::Added(unquote_path(parts[1]))),
        Some('M') => LogLine::Change(Change::Modified(unquote_path(parts[1]))),
        Some('D') => LogLine::Change(Change::Deleted(unquote_path(parts[1]))),
        Some('R') if parts.len() >= 3 && !parts[2].is_empty() => LogLine::Change(Change::Renamed {
            from: unquote_path(parts[1]),
            to: unquote_path(parts[2]),
        }),
        Some('C') | Some('T') => LogLine::Ignored,
        _ => LogLine::Malformed,
    }
}

/// Undo git's C-style quoting of unusual path names (`"a\tb.md"`, octal-escaped bytes).
pub fn unquote_path(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        return raw.to_string();
    };

    let bytes = inner.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' || i + 1 >= bytes.len() {
            out.push(b);
            i += 1;
            continue;
        }
        let esc = bytes[i + 1];
        i += 2;
        match esc {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'v' => out.push(0x0b),
            b'0'..=b'7' => {
                let mut value = u32::from(esc - b'0');
                let mut digits = 1;
                while digits < 3 && i < bytes.len() && (b'0'..=b'7').contains(&bytes[i]) {
                    value = value * 8 + u32::from(bytes[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push((value & 0xff) as u8);
            }
            other => out.push(other),
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
