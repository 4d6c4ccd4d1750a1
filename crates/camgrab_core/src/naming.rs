use std::fmt::Write;
use std::path::PathBuf;

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// `{Y}-{m}{d}/{H}/{y}{m}{d}-{H}{M}{S}-{f}`: one directory per day, one per hour,
/// microsecond resolution in the file stem.
pub const DEFAULT_SAVE_TEMPLATE: &str = "{Y}-{m}{d}/{H}/{y}{m}{d}-{H}{M}{S}-{f}";

const FALLBACK_STEM: &str = "grab";
const MAX_SEGMENT_LEN: usize = 80;

/// Relative path template for saved images, without extension.
///
/// Tokens: `{Y}` `{y}` `{m}` `{d}` `{H}` `{M}` `{S}` `{f}` (microseconds) and
/// `{u}` (short hash of the source URL). `/` separates directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveTemplate(String);

impl SaveTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render<T: Datelike + Timelike>(&self, timestamp: &T, url: &str) -> PathBuf {
        render_save_path(&self.0, timestamp, url)
    }
}

impl Default for SaveTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_TEMPLATE)
    }
}

/// Expand `template` for `timestamp` into a filesystem-safe relative path.
///
/// Unknown tokens are kept verbatim. Empty, `.` and `..` segments are dropped so
/// the result never escapes the save directory.
pub fn render_save_path<T: Datelike + Timelike>(template: &str, timestamp: &T, url: &str) -> PathBuf {
    let expanded = expand_tokens(template, timestamp, url);
    let mut path = PathBuf::new();
    for segment in expanded.split(['/', '\\']) {
        if let Some(clean) = sanitize_segment(segment) {
            path.push(clean);
        }
    }
    if path.as_os_str().is_empty() {
        path.push(FALLBACK_STEM);
    }
    path
}

fn expand_tokens<T: Datelike + Timelike>(template: &str, ts: &T, url: &str) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let mut lookahead = chars.clone();
        let (Some(token), Some('}')) = (lookahead.next(), lookahead.next()) else {
            out.push(c);
            continue;
        };
        let micros = ts.nanosecond() % 1_000_000_000 / 1_000;
        let _ = match token {
            'Y' => write!(out, "{:04}", ts.year()),
            'y' => write!(out, "{:02}", ts.year().rem_euclid(100)),
            'm' => write!(out, "{:02}", ts.month()),
            'd' => write!(out, "{:02}", ts.day()),
            'H' => write!(out, "{:02}", ts.hour()),
            'M' => write!(out, "{:02}", ts.minute()),
            'S' => write!(out, "{:02}", ts.second()),
            'f' => write!(out, "{micros:06}"),
            'u' => write!(out, "{}", short_hash(url)),
            _ => {
                out.push(c);
                continue;
            }
        };
        chars.next();
        chars.next();
    }
    out
}

fn sanitize_segment(input: &str) -> Option<String> {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut cleaned = cleaned.trim_matches(&[' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.len() > MAX_SEGMENT_LEN {
        let mut end = MAX_SEGMENT_LEN;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    Some(cleaned)
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// First four bytes of the SHA-256 of `input`, hex encoded.
pub fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
