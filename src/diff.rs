//! Diff/Patch Engine: given a generated artifact and the live document,
//! determine presence and currency and propose an edit.
//!
//! Matching is anchored on a distinguishing key fragment of each artifact
//! kind, restricted to the owning declaration's body span. Both sides are
//! normalized for whitespace and trailing commas before comparison. A
//! failed range match is never an error: the artifact is simply classified
//! absent and the insertion path applies.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::artifact::{
    ArtifactKind, ArtifactStatus, EditOp, GeneratedArtifact, Position, Range,
};
use crate::bracket_utils::{locate_span, LineSpan};
use crate::generators::{self, capitalize};
use crate::model::ClassModel;
use crate::settings::Settings;

pub struct DiffEngine {
    checker_re: Regex,
    map_entry_re: Regex,
    bracket_open_re: Regex,
    bracket_close_re: Regex,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self {
            checker_re: Regex::new(r"bool\s+get\s+is([A-Z][\w$]*)\s*=>").unwrap(),
            map_entry_re: Regex::new(r"^'([^']+)'\s*:").unwrap(),
            bracket_open_re: Regex::new(r"\s*([(\[{])\s*").unwrap(),
            bracket_close_re: Regex::new(r"\s*([)\]}])").unwrap(),
        }
    }

    /// Whitespace- and trailing-comma-insensitive code equality.
    pub fn identical_code(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }

    /// Per-line normalization: collapsed whitespace, no spacing adjacent
    /// to brackets, no trailing comma, empty lines dropped.
    fn normalize(&self, text: &str) -> String {
        text.lines()
            .map(|l| {
                let collapsed = l.split_whitespace().collect::<Vec<_>>().join(" ");
                let tight = self.bracket_open_re.replace_all(&collapsed, "$1");
                let tight = self.bracket_close_re.replace_all(&tight, "$1");
                tight.trim_end_matches(',').to_string()
            })
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Analyze every artifact kind applicable to the model against the
    /// current document line list.
    pub fn analyze<S: AsRef<str>>(
        &self,
        lines: &[S],
        model: &ClassModel,
        settings: &Settings,
    ) -> Vec<GeneratedArtifact> {
        generators::applicable_kinds(model)
            .into_iter()
            .filter_map(|kind| self.analyze_kind(lines, model, settings, kind))
            .collect()
    }

    /// Analyze one artifact kind. None when the kind does not apply to the
    /// model or the owning declaration cannot be found in the document.
    pub fn analyze_kind<S: AsRef<str>>(
        &self,
        lines: &[S],
        model: &ClassModel,
        settings: &Settings,
        kind: ArtifactKind,
    ) -> Option<GeneratedArtifact> {
        let text = generators::generate(kind, model, settings)?;
        let body = self.declaration_span(lines, model)?;
        let post_class = is_post_class(kind, settings);

        let anchor = match kind {
            ArtifactKind::Constructor => Position::new(body.start + 1, 0),
            _ if post_class => Position::new(body.end + 1, 0),
            _ => Position::new(body.end, 0),
        };
        let insertion_text = if kind == ArtifactKind::Constructor {
            format!("{text}\n\n")
        } else {
            format!("\n{text}\n")
        };

        let (matched, detached) = if kind == ArtifactKind::Equality {
            match self.locate_equality(lines, body) {
                Some((span, extra)) => (Some(span), extra),
                None => (None, None),
            }
        } else if post_class {
            (self.locate_post_class(lines, model, settings, kind), None)
        } else {
            (self.locate_in_body(lines, body, model, kind), None)
        };

        let (range, status) = match matched {
            Some(span) => {
                let mut matched_text = join_span(lines, span);
                if let Some(extra) = detached {
                    matched_text.push('\n');
                    matched_text.push_str(&join_span(lines, extra));
                }
                let status = if self.identical_code(&text, &matched_text) {
                    ArtifactStatus::Current
                } else {
                    ArtifactStatus::Stale
                };
                (Some(Range::from_span(span, lines)), status)
            }
            None => (None, ArtifactStatus::Absent),
        };

        Some(GeneratedArtifact {
            kind,
            text,
            insertion_text,
            anchor,
            range,
            secondary_ranges: detached
                .map(|s| vec![Range::from_span(s, lines)])
                .unwrap_or_default(),
            status,
        })
    }

    /// Propose one edit per non-current artifact. Current artifacts
    /// produce nothing; the host applies the batch atomically.
    pub fn edits(&self, artifacts: &[GeneratedArtifact]) -> Vec<EditOp> {
        let mut ops = Vec::new();
        for a in artifacts {
            match a.status {
                ArtifactStatus::Current => {}
                ArtifactStatus::Absent => ops.push(EditOp::Insert {
                    at: a.anchor,
                    text: a.insertion_text.clone(),
                }),
                ArtifactStatus::Stale => {
                    if let Some(range) = a.range {
                        ops.push(EditOp::Replace {
                            range,
                            text: a.text.clone(),
                        });
                        // The replacement carries the whole artifact; any
                        // detached remainder region is removed.
                        for &extra in &a.secondary_ranges {
                            ops.push(EditOp::Remove { range: extra });
                        }
                    }
                }
            }
        }
        ops
    }

    // --- declaration and fragment location ---------------------------------

    /// Body span of the model's own declaration in the document.
    fn declaration_span<S: AsRef<str>>(&self, lines: &[S], model: &ClassModel) -> Option<LineSpan> {
        let decl_re = Regex::new(&format!(
            r"\b(class|enum)\s+{}\b",
            regex::escape(&model.name)
        ))
        .ok()?;
        let start = lines
            .iter()
            .position(|l| decl_re.is_match(l.as_ref()))?;
        locate_span(lines, start)
    }

    fn locate_in_body<S: AsRef<str>>(
        &self,
        lines: &[S],
        body: LineSpan,
        model: &ClassModel,
        kind: ArtifactKind,
    ) -> Option<LineSpan> {
        let start = (body.start + 1..body.end)
            .find(|&i| fragment_matches(lines[i].as_ref().trim(), kind, model))?;
        self.construct_span(lines, start, body.end)
    }

    /// Extension-shaped artifacts live after the declaration, at the top
    /// level of the document.
    fn locate_post_class<S: AsRef<str>>(
        &self,
        lines: &[S],
        model: &ClassModel,
        settings: &Settings,
        kind: ArtifactKind,
    ) -> Option<LineSpan> {
        let start = (0..lines.len())
            .find(|&i| fragment_matches(lines[i].as_ref().trim(), kind, model))?;
        let mut span = locate_span(lines, start)?;
        if kind == ArtifactKind::CopyWith && settings.accurate_copy_with {
            span = self.extend_copy_with_span(lines, span, model);
        }
        Some(span)
    }

    /// The accurate copy-mutation artifact is an extension plus an
    /// interface plus an implementation class; the matched span covers all
    /// three consecutive constructs.
    fn extend_copy_with_span<S: AsRef<str>>(
        &self,
        lines: &[S],
        mut span: LineSpan,
        model: &ClassModel,
    ) -> LineSpan {
        let followups = [
            format!("abstract class {}CopyWith", model.name),
            format!("class _{}CopyWithImpl", model.name),
        ];
        for prefix in &followups {
            let mut next = span.end + 1;
            while next < lines.len() && lines[next].as_ref().trim().is_empty() {
                next += 1;
            }
            if next >= lines.len() || !lines[next].as_ref().trim().starts_with(prefix.as_str()) {
                break;
            }
            match locate_span(lines, next) {
                Some(part) => span.end = part.end,
                None => break,
            }
        }
        span
    }

    /// Spans of the `operator ==` and `hashCode` members. Either half
    /// alone still counts as present (and compares stale). Adjacent halves
    /// merge into one span; halves separated by other members stay apart,
    /// so replacing the first never swallows what sits between them.
    fn locate_equality<S: AsRef<str>>(
        &self,
        lines: &[S],
        body: LineSpan,
    ) -> Option<(LineSpan, Option<LineSpan>)> {
        let op = (body.start + 1..body.end)
            .find(|&i| lines[i].as_ref().contains("bool operator ==("))
            .and_then(|i| self.construct_span(lines, i, body.end));
        let hash = (body.start + 1..body.end)
            .find(|&i| lines[i].as_ref().contains("int get hashCode"))
            .and_then(|i| self.construct_span(lines, i, body.end));
        match (op, hash) {
            (Some(a), Some(b)) => {
                let (first, second) = if a.start <= b.start { (a, b) } else { (b, a) };
                let adjacent = (first.end + 1..second.start)
                    .all(|i| lines[i].as_ref().trim().is_empty());
                if adjacent {
                    Some((
                        LineSpan {
                            start: first.start,
                            end: second.end,
                        },
                        None,
                    ))
                } else {
                    Some((first, Some(second)))
                }
            }
            (Some(a), None) => Some((a, None)),
            (None, Some(b)) => Some((b, None)),
            (None, None) => None,
        }
    }

    /// Full span of the construct starting at `start`, falling back to the
    /// single line for bracket-less members such as an arrow getter. An
    /// annotation line immediately above belongs to the construct.
    fn construct_span<S: AsRef<str>>(
        &self,
        lines: &[S],
        start: usize,
        limit: usize,
    ) -> Option<LineSpan> {
        let mut span = locate_span(lines, start).unwrap_or(LineSpan { start, end: start });
        if span.end > limit {
            // Ran past the enclosing body; the match is bogus.
            return None;
        }
        while span.start > 0 && lines[span.start - 1].as_ref().trim().starts_with('@') {
            span.start -= 1;
        }
        Some(span)
    }

    // --- per-item classification -------------------------------------------

    /// Per-member classification of `isX` checkers inside an existing
    /// dispatch extension. New members not yet reflected in the text are
    /// insertions, orphaned checkers are removals, the rest are candidates
    /// for per-item replacement.
    pub fn classify_checkers<S: AsRef<str>>(
        &self,
        lines: &[S],
        model: &ClassModel,
        settings: &Settings,
    ) -> ItemDiff {
        let expected = expected_checker_names(model);
        let span = self.locate_post_class(lines, model, settings, ArtifactKind::EnumExtension);

        let mut present: Vec<(String, usize)> = Vec::new();
        if let Some(span) = span {
            for i in span.start..=span.end.min(lines.len().saturating_sub(1)) {
                if let Some(caps) = self.checker_re.captures(lines[i].as_ref()) {
                    present.push((caps.get(1).unwrap().as_str().to_string(), i));
                }
            }
        }

        let mut diff = ItemDiff::default();
        for name in &expected {
            if !present.iter().any(|(p, _)| p == name) {
                diff.insertions.push(name.clone());
            } else {
                diff.replacements.push(name.clone());
            }
        }
        for (name, line) in &present {
            if !expected.contains(name) {
                diff.removals.push(name.clone());
                diff.removal_lines.push(*line);
            }
        }
        diff
    }

    /// Per-key classification of entries inside an existing `toMap` body.
    pub fn classify_map_entries<S: AsRef<str>>(
        &self,
        lines: &[S],
        model: &ClassModel,
    ) -> ItemDiff {
        let expected: Vec<String> = model
            .merged_params()
            .iter()
            .map(|p| p.map_key().to_string())
            .collect();

        let mut present: Vec<(String, usize)> = Vec::new();
        if let Some(body) = self.declaration_span(lines, model) {
            if let Some(span) = self.locate_in_body(lines, body, model, ArtifactKind::ToMap) {
                for i in span.start..=span.end {
                    if let Some(caps) = self.map_entry_re.captures(lines[i].as_ref().trim()) {
                        present.push((caps.get(1).unwrap().as_str().to_string(), i));
                    }
                }
            }
        }

        let mut diff = ItemDiff::default();
        for key in &expected {
            if !present.iter().any(|(p, _)| p == key) {
                diff.insertions.push(key.clone());
            } else {
                diff.replacements.push(key.clone());
            }
        }
        for (key, line) in &present {
            if !expected.contains(key) {
                diff.removals.push(key.clone());
                diff.removal_lines.push(*line);
            }
        }
        diff
    }

    /// Line-removal edits for orphaned per-item entries.
    pub fn removal_edits<S: AsRef<str>>(&self, lines: &[S], diff: &ItemDiff) -> Vec<EditOp> {
        diff.removal_lines
            .iter()
            .map(|&line| EditOp::Remove {
                range: Range::from_span(LineSpan { start: line, end: line }, lines),
            })
            .collect()
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-item classification of a multi-item artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDiff {
    /// Items in the model with no counterpart in the text.
    pub insertions: Vec<String>,
    /// Items in the text with no counterpart in the model.
    pub removals: Vec<String>,
    /// Items present on both sides, candidates for per-item replacement.
    pub replacements: Vec<String>,
    /// Document lines of the removal items, in `removals` order.
    #[serde(skip)]
    pub removal_lines: Vec<usize>,
}

fn join_span<S: AsRef<str>>(lines: &[S], span: LineSpan) -> String {
    lines[span.start..=span.end.min(lines.len() - 1)]
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_post_class(kind: ArtifactKind, settings: &Settings) -> bool {
    match kind {
        ArtifactKind::EnumExtension => true,
        ArtifactKind::CopyWith => settings.accurate_copy_with,
        _ => false,
    }
}

fn expected_checker_names(model: &ClassModel) -> Vec<String> {
    if model.is_enum() {
        model
            .enum_members()
            .iter()
            .map(|f| capitalize(&f.name))
            .collect()
    } else {
        model
            .factory_variants()
            .iter()
            .map(|v| capitalize(v.variant_name()))
            .collect()
    }
}

/// The distinguishing key fragment test for one artifact kind, applied to
/// a trimmed document line.
fn fragment_matches(trimmed: &str, kind: ArtifactKind, model: &ClassModel) -> bool {
    let name = &model.name;
    match kind {
        ArtifactKind::Constructor => {
            trimmed.starts_with(&format!("{name}(")) || trimmed.starts_with(&format!("const {name}("))
        }
        ArtifactKind::ToString => trimmed.contains("String toString("),
        ArtifactKind::Equality => {
            trimmed.contains("bool operator ==(") || trimmed.contains("int get hashCode")
        }
        ArtifactKind::CopyWith => {
            trimmed.starts_with(&format!("extension {name}CopyWithX on"))
                || trimmed.contains(&format!("{} copyWith(", model.type_with_generics()))
        }
        // The `factory` prefix keeps these from matching the calls inside
        // each other's bodies (`fromJson` delegates to `fromMap`).
        ArtifactKind::FromMap => trimmed.contains(&format!("factory {name}.fromMap(")),
        ArtifactKind::ToMap => trimmed.contains("Map<String, dynamic> toMap("),
        ArtifactKind::FromJson => trimmed.contains(&format!("factory {name}.fromJson(")),
        ArtifactKind::ToJson => trimmed.contains("String toJson("),
        ArtifactKind::EnumExtension => trimmed.starts_with(&format!("extension {name}X on")),
    }
}
