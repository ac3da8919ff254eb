//! Title resolution over untrusted image headers
//!
//! Compiled game images often embed project metadata: MakeCode/pxt builds
//! carry a JSON blob whose `name` field is the project title. The blob sits
//! at an arbitrary offset inside the image and is frequently truncated or
//! surrounded by binary noise, so extraction is an ordered chain of
//! heuristics, each total over arbitrary input:
//!
//! 1. [`KeyValueScan`](TitleSource::KeyValueScan) - a direct
//!    `"key": "value"` pattern match over the lossily decoded text.
//! 2. [`EmbeddedObject`](TitleSource::EmbeddedObject) - strict JSON parse
//!    of bounded `{...}` spans that mention one of the known keys.
//! 3. [`PrintableRun`](TitleSource::PrintableRun) - a last-resort scan for
//!    plausible name runs, gated on project-tooling markers so random
//!    binaries never produce a title from noise.
//!
//! Decode failures, malformed JSON and absent metadata all fall through to
//! the next stage; the final fallback is simply `None`. Resolution never
//! returns an error.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default scan window: the largest header prefix handed to the resolver
///
/// Large enough to cover embedded project metadata in practice.
pub const TITLE_SCAN_WINDOW: u64 = 1024 * 1024;

/// Maximum byte span of one `{...}` candidate in the embedded-object scan
const OBJECT_SPAN_MAX: usize = 1024;

/// Metadata keys recognized by the strict heuristics, in priority order
const TITLE_KEYS: [&str; 3] = ["name", "title", "projectName"];

/// Marker tokens that gate the printable-run fallback
const TOOLING_MARKERS: [&str; 2] = ["makecode", "pxt"];

/// Length bounds on a printable-run candidate; longer runs are skipped
/// entirely, not truncated
const RUN_MIN: usize = 4;
const RUN_MAX: usize = 80;

/// `"<key>": "<value>"` with flexible whitespace around the colon. The
/// value is 2-100 units, where a backslash escapes the following
/// character; the first unescaped quote closes it.
static KEY_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)"(?:name|title|projectName)"\s*:\s*"((?:[^"\\]|\\.){2,100})""#)
        .expect("static pattern compiles")
});

/// Which heuristic produced a title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    /// Direct `"key": "value"` scan over the decoded text
    KeyValueScan,
    /// Strict parse of an embedded `{...}` object
    EmbeddedObject,
    /// Marker-gated printable-run fallback
    PrintableRun,
}

/// A resolved title and the heuristic that found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    /// Sanitized title text
    pub title: String,
    /// Heuristic that matched
    pub source: TitleSource,
}

/// Resolve a display title from the header bytes of an image
///
/// `header` is a bounded prefix of the image; the caller truncates to
/// its configured scan window ([`TITLE_SCAN_WINDOW`] by default).
/// Returns the first heuristic success, or `None` when nothing matched.
pub fn resolve_title(header: &[u8]) -> Option<ResolvedTitle> {
    let text = String::from_utf8_lossy(header);
    scan_key_values(&text)
        .or_else(|| scan_embedded_objects(&text))
        .or_else(|| scan_printable_runs(&text))
}

/// Heuristic 1: leftmost `"name"/"title"/"projectName": "..."` match
fn scan_key_values(text: &str) -> Option<ResolvedTitle> {
    for caps in KEY_VALUE_RE.captures_iter(text) {
        let title = sanitize(&caps[1]);
        if !title.is_empty() {
            debug!("title {:?} from key-value scan", title);
            return Some(ResolvedTitle {
                title,
                source: TitleSource::KeyValueScan,
            });
        }
    }
    None
}

/// Heuristic 2: strict-parse bounded `{...}` spans that mention a key
///
/// Each `{` is paired with the next `}`; spans longer than
/// [`OBJECT_SPAN_MAX`] are not candidates. Nested objects are recovered
/// naturally: the truncated outer span fails the strict parse and the
/// inner `{...}` is tried as its own candidate.
fn scan_embedded_objects(text: &str) -> Option<ResolvedTitle> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(rel) = text[from..].find('{') {
        let open = from + rel;
        from = open + 1;

        // Search the span as bytes: the decoded text may hold multi-byte
        // replacement characters, and the span cap is a byte offset.
        let span_end = (open + OBJECT_SPAN_MAX).min(bytes.len());
        let Some(close) = bytes[open..span_end].iter().position(|&b| b == b'}') else {
            continue;
        };
        let candidate = &text[open..open + close + 1];

        let lowered = candidate.to_ascii_lowercase();
        if !["\"name\"", "\"title\"", "\"projectname\""]
            .iter()
            .any(|key| lowered.contains(key))
        {
            continue;
        }

        match serde_json::from_str::<serde_json::Value>(candidate) {
            Ok(value) => {
                if let Some(title) = title_from_value(&value) {
                    debug!("title {:?} from embedded object at byte {}", title, open);
                    return Some(ResolvedTitle {
                        title,
                        source: TitleSource::EmbeddedObject,
                    });
                }
            }
            Err(err) => {
                debug!("embedded object at byte {} rejected: {}", open, err);
            }
        }
    }
    None
}

/// Extract the first recognized key with a non-empty string value
fn title_from_value(value: &serde_json::Value) -> Option<String> {
    let object = value.as_object()?;
    for key in TITLE_KEYS {
        for (name, field) in object {
            if !name.eq_ignore_ascii_case(key) {
                continue;
            }
            if let Some(text) = field.as_str() {
                let title = sanitize(text);
                if !title.is_empty() {
                    return Some(title);
                }
            }
        }
    }
    None
}

/// Heuristic 3: marker-gated scan for plausible name runs
fn scan_printable_runs(text: &str) -> Option<ResolvedTitle> {
    let lowered = text.to_ascii_lowercase();
    if !TOOLING_MARKERS.iter().any(|m| lowered.contains(m)) {
        return None;
    }

    let mut run = String::new();
    for ch in text.chars() {
        if is_run_char(ch) {
            run.push(ch);
            continue;
        }
        if let Some(title) = accept_run(&run) {
            return Some(ResolvedTitle {
                title,
                source: TitleSource::PrintableRun,
            });
        }
        run.clear();
    }
    accept_run(&run).map(|title| ResolvedTitle {
        title,
        source: TitleSource::PrintableRun,
    })
}

fn is_run_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == ' ' || ch == '-' || ch == '_'
}

/// A run qualifies if its length is in bounds, it is not itself a marker
/// token, and something survives sanitization
fn accept_run(run: &str) -> Option<String> {
    if run.len() < RUN_MIN || run.len() > RUN_MAX {
        return None;
    }
    if TOOLING_MARKERS.iter().any(|m| run.eq_ignore_ascii_case(m)) {
        return None;
    }
    let title = sanitize(run);
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Strip everything outside printable ASCII (32-126) and trim the result
fn sanitize(raw: &str) -> String {
    let printable: String = raw.chars().filter(|ch| matches!(ch, ' '..='~')).collect();
    printable.trim().to_string()
}
