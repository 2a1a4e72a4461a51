//! Diagnostic extraction and the published diagnostic set
//!
//! The shader compiler and renderer report errors as free text on stderr.
//! An ordered table of recognized patterns maps each line to zero or one
//! structured diagnostic, re-scanning the anchor source file where the
//! message names a symbol or line instead of a position. Extraction is a
//! pure function over the source text and the raw lines; reading files and
//! publishing into the [`DiagnosticCollection`] happen at the pipeline
//! boundary.

use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Zero-indexed position in a text document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Half-open text span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start_line: u32, start_char: u32, end_line: u32, end_char: u32) -> Self {
        Self {
            start: Position::new(start_line, start_char),
            end: Position::new(end_line, end_char),
        }
    }
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Information,
}

/// A source-anchored message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Create an information diagnostic
    pub fn info(range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity: Severity::Information,
        }
    }

    /// Fallback published when a failure batch matches no known pattern
    pub fn unrecognized_failure() -> Self {
        Self::error(
            Range::new(0, 0, 0, 0),
            "Toolchain reported a failure that could not be mapped to a source position; \
             see the log for the raw output",
        )
    }
}

/// Published diagnostics, keyed by source file.
///
/// At most one set per file; a publish replaces the whole entry, a clear
/// removes it. Files whose entry changed since the last [`take_dirty`] call
/// are tracked so an editor front-end can forward exactly those.
///
/// [`take_dirty`]: DiagnosticCollection::take_dirty
#[derive(Debug, Default)]
pub struct DiagnosticCollection {
    entries: HashMap<PathBuf, Vec<Diagnostic>>,
    dirty: BTreeSet<PathBuf>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the diagnostic set for a file
    pub fn set(&mut self, file: impl Into<PathBuf>, diagnostics: Vec<Diagnostic>) {
        let file = file.into();
        self.dirty.insert(file.clone());
        self.entries.insert(file, diagnostics);
    }

    /// Remove a file's diagnostic set entirely
    pub fn clear(&mut self, file: &Path) {
        if self.entries.remove(file).is_some() {
            self.dirty.insert(file.to_path_buf());
        }
    }

    /// Diagnostics currently published for a file, if any
    pub fn get(&self, file: &Path) -> Option<&[Diagnostic]> {
        self.entries.get(file).map(|d| d.as_slice())
    }

    /// Whether a file has a published set
    pub fn contains(&self, file: &Path) -> bool {
        self.entries.contains_key(file)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All published entries
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &[Diagnostic])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Files whose entry changed since the last call. A file absent from
    /// [`get`](Self::get) after appearing here was cleared.
    pub fn take_dirty(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}

/// Recognized failure-text families.
///
/// The wordings below generalize over Aqsis `aqsl` output; each variant is
/// matched independently against every line, so one line can feed several
/// handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPattern {
    /// "command ... failed" process-level noise; recognized but suppressed
    InternalFailure,
    /// The compiler gave up after too many errors; informational anchor at
    /// the top of the file
    CompilationAborted,
    /// "unresolved function NAME"; position recovered by re-scanning the
    /// source for a call-like use of NAME
    UnresolvedSymbol,
    /// "N : syntax error"; position recovered from line N of the source
    SyntaxError,
    /// "N : invalid arguments to function NAME"; position recovered from the
    /// argument list after NAME on line N
    InvalidArguments,
}

fn pattern_table() -> &'static [(Regex, ErrorPattern)] {
    static TABLE: OnceLock<Vec<(Regex, ErrorPattern)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            (
                Regex::new(r"(?i)\bcommand\b.*\bfailed\b").unwrap(),
                ErrorPattern::InternalFailure,
            ),
            (
                Regex::new(r"(?i)\bcompilation aborted\b").unwrap(),
                ErrorPattern::CompilationAborted,
            ),
            (
                Regex::new(r"(?i)\bunresolved (?:function|symbol) (\w+)").unwrap(),
                ErrorPattern::UnresolvedSymbol,
            ),
            (
                Regex::new(r"(\d+)\s*:\s*syntax error").unwrap(),
                ErrorPattern::SyntaxError,
            ),
            (
                Regex::new(r#"(?i)(\d+)\s*:\s*invalid arguments? to function [`"']?(\w+)"#)
                    .unwrap(),
                ErrorPattern::InvalidArguments,
            ),
        ]
    })
}

/// Result of running a failure batch through the pattern table
#[derive(Debug, Default)]
pub struct Extraction {
    /// Diagnostics recovered from recognized lines
    pub diagnostics: Vec<Diagnostic>,
    /// Lines matching no pattern at all
    pub unrecognized: Vec<String>,
    /// Count of lines that matched at least one pattern
    pub recognized: usize,
}

impl Extraction {
    /// Diagnostics to publish for a non-empty batch: the recovered set, or
    /// the generic fallback when not a single line was recognized. A batch
    /// that was recognized but yielded nothing (suppressed families,
    /// position-recovery misses) publishes nothing.
    pub fn into_published(self) -> Option<Vec<Diagnostic>> {
        if !self.diagnostics.is_empty() {
            Some(self.diagnostics)
        } else if self.recognized == 0 && !self.unrecognized.is_empty() {
            Some(vec![Diagnostic::unrecognized_failure()])
        } else {
            None
        }
    }
}

/// Map raw failure lines to diagnostics anchored in `source`.
///
/// Every non-empty line is tested against the whole pattern table; a line
/// matching nothing is recorded as unrecognized but never stops the batch.
pub fn extract_diagnostics(source: &str, error_lines: &[String]) -> Extraction {
    let mut extraction = Extraction::default();

    for line in error_lines.iter().filter(|l| !l.trim().is_empty()) {
        let mut matched = false;

        for (regex, pattern) in pattern_table() {
            let Some(captures) = regex.captures(line) else {
                continue;
            };
            matched = true;
            if let Some(diagnostic) = apply_pattern(*pattern, &captures, source, line) {
                extraction.diagnostics.push(diagnostic);
            }
        }

        if matched {
            extraction.recognized += 1;
        } else {
            log::warn!("unrecognized toolchain output: {}", line);
            extraction.unrecognized.push(line.clone());
        }
    }

    extraction
}

/// One pattern match to at most one diagnostic. Position-recovery misses
/// (line out of range, symbol not found) skip the diagnostic and log; they
/// never abort the batch.
fn apply_pattern(
    pattern: ErrorPattern,
    captures: &regex::Captures<'_>,
    source: &str,
    raw_line: &str,
) -> Option<Diagnostic> {
    match pattern {
        ErrorPattern::InternalFailure => None,

        ErrorPattern::CompilationAborted => {
            Some(Diagnostic::info(Range::new(0, 0, 0, 0), raw_line.trim()))
        }

        ErrorPattern::UnresolvedSymbol => {
            let symbol = captures.get(1)?.as_str();
            let (line, column) = match find_call_site(source, symbol) {
                Some(found) => found,
                None => {
                    log::debug!("symbol '{}' not found in anchor source", symbol);
                    return None;
                }
            };
            // Span the symbol name only, not its opening parenthesis
            let range = Range::new(line, column, line, column + symbol.len() as u32);
            Some(Diagnostic::error(range, raw_line.trim()))
        }

        ErrorPattern::SyntaxError => {
            let reported: usize = captures.get(1)?.as_str().parse().ok()?;
            let (line_idx, text) = source_line(source, reported)?;
            let indent = text.len() - text.trim_start().len();
            let range = Range::new(line_idx, indent as u32, line_idx, text.len() as u32);
            Some(Diagnostic::error(range, raw_line.trim()))
        }

        ErrorPattern::InvalidArguments => {
            let reported: usize = captures.get(1)?.as_str().parse().ok()?;
            let function = captures.get(2)?.as_str();
            let (line_idx, text) = source_line(source, reported)?;

            let call = format!("{}(", function);
            let Some(call_start) = text.find(&call) else {
                log::debug!(
                    "call to '{}' not found on line {} of anchor source",
                    function,
                    reported
                );
                return None;
            };

            // Span the argument-list interior
            let args_start = call_start + function.len() + 1;
            let args_end = text[args_start..]
                .find(')')
                .map(|i| args_start + i)
                .unwrap_or(text.len());
            let range = Range::new(line_idx, args_start as u32, line_idx, args_end as u32);
            Some(Diagnostic::error(range, raw_line.trim()))
        }
    }
}

/// First call-like use of `symbol` in the source, as (line, column)
fn find_call_site(source: &str, symbol: &str) -> Option<(u32, u32)> {
    let needle = format!("{}(", symbol);
    for (idx, line) in source.lines().enumerate() {
        if let Some(column) = line.find(&needle) {
            return Some((idx as u32, column as u32));
        }
    }
    None
}

/// Line `reported` of the source, 1-indexed as the toolchain counts,
/// returned with its 0-indexed position
fn source_line(source: &str, reported: usize) -> Option<(u32, &str)> {
    let index = reported.checked_sub(1)?;
    match source.lines().nth(index) {
        Some(text) => Some((index as u32, text)),
        None => {
            log::debug!("reported line {} is outside the anchor source", reported);
            None
        }
    }
}
