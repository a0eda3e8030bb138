//! The Generated Artifact contract shared by every generator, plus the
//! position/range primitives and edit operations consumed by the host
//! editor integration.

use serde::{Deserialize, Serialize};

use crate::bracket_utils::LineSpan;

/// Zero-based document position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Half-open document range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Whole-line range covering an inclusive line span.
    pub fn from_span<S: AsRef<str>>(span: LineSpan, lines: &[S]) -> Self {
        let end_len = lines.get(span.end).map(|l| l.as_ref().len()).unwrap_or(0);
        Self {
            start: Position::new(span.start, 0),
            end: Position::new(span.end, end_len),
        }
    }

    /// Smallest range covering both inputs.
    pub fn union(self, other: Range) -> Range {
        let start = if (other.start.line, other.start.character) < (self.start.line, self.start.character) {
            other.start
        } else {
            self.start
        };
        let end = if (other.end.line, other.end.character) > (self.end.line, self.end.character) {
            other.end
        } else {
            self.end
        };
        Range { start, end }
    }
}

/// The closed set of artifact kinds this core can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Constructor,
    ToString,
    Equality,
    CopyWith,
    FromMap,
    ToMap,
    FromJson,
    ToJson,
    /// `isX` boolean checkers plus the dispatch-method extension.
    EnumExtension,
}

impl ArtifactKind {
    pub const ALL: &'static [ArtifactKind] = &[
        ArtifactKind::Constructor,
        ArtifactKind::ToString,
        ArtifactKind::Equality,
        ArtifactKind::CopyWith,
        ArtifactKind::FromMap,
        ArtifactKind::ToMap,
        ArtifactKind::FromJson,
        ArtifactKind::ToJson,
        ArtifactKind::EnumExtension,
    ];
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::Constructor => "constructor",
            ArtifactKind::ToString => "to-string",
            ArtifactKind::Equality => "equality",
            ArtifactKind::CopyWith => "copy-with",
            ArtifactKind::FromMap => "from-map",
            ArtifactKind::ToMap => "to-map",
            ArtifactKind::FromJson => "from-json",
            ArtifactKind::ToJson => "to-json",
            ArtifactKind::EnumExtension => "enum-extension",
        };
        write!(f, "{}", name)
    }
}

/// Presence/currency of an artifact in the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactStatus {
    /// No matching region found; insertion at the anchor applies.
    Absent,
    /// A matching region exists and equals the generated text.
    Current,
    /// A matching region exists but differs; replacement applies.
    Stale,
}

/// One deterministic generator output plus its location/status metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    /// The idealized generated text.
    pub text: String,
    /// Generated text plus surrounding whitespace rules, ready to insert.
    pub insertion_text: String,
    /// Fallback insertion point used when no existing region is found.
    pub anchor: Position,
    /// Matched region in the live document, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    /// Detached regions of the same artifact (halves separated by other
    /// members); removed when `range` is replaced.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub secondary_ranges: Vec<Range>,
    pub status: ArtifactStatus,
}

impl GeneratedArtifact {
    pub fn is_present(&self) -> bool {
        !matches!(self.status, ArtifactStatus::Absent)
    }

    pub fn is_current(&self) -> bool {
        matches!(self.status, ArtifactStatus::Current)
    }
}

/// A proposed document edit. The host applies these atomically as one
/// batched edit; the core never mutates the document itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum EditOp {
    Insert { at: Position, text: String },
    Replace { range: Range, text: String },
    Remove { range: Range },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_union() {
        let a = Range {
            start: Position::new(2, 0),
            end: Position::new(4, 10),
        };
        let b = Range {
            start: Position::new(6, 0),
            end: Position::new(8, 3),
        };
        let u = a.union(b);
        assert_eq!(u.start, Position::new(2, 0));
        assert_eq!(u.end, Position::new(8, 3));
    }

    #[test]
    fn test_range_from_span() {
        let lines = vec!["class A {", "}", ""];
        let r = Range::from_span(LineSpan { start: 0, end: 1 }, &lines);
        assert_eq!(r.start, Position::new(0, 0));
        assert_eq!(r.end, Position::new(1, 1));
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ArtifactKind::CopyWith).unwrap();
        assert_eq!(json, "\"copy-with\"");
    }
}
