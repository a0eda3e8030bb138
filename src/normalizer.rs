//! Normalizer/Splitter: converts a raw declaration body into an ordered
//! sequence of single-line member statements.
//!
//! Comments and annotations are stripped, except two semantic comment
//! forms which are trimmed but retained as standalone statements:
//!
//! - `// @key: <name>` — external serialization key for the next field
//! - `// enum` or `// enum <A, B, C>` — marks the next field as enum-typed

use regex::Regex;

use crate::bracket_utils::locate_span;

/// Private separator combining an enum's head line with its member list,
/// so the model builder can recover both from statement index 0.
pub const ENUM_SEPARATOR: char = '\u{1}';

/// Statement splitter over raw, possibly invalid, user-edited text.
pub struct Normalizer {
    block_comment_re: Regex,
    key_hint_re: Regex,
    enum_hint_re: Regex,
    annotation_re: Regex,
    whitespace_re: Regex,
    open_bracket_re: Regex,
    close_bracket_re: Regex,
    head_keyword_re: Regex,
    enum_keyword_re: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            block_comment_re: Regex::new(r"(?s)/\*.*?\*/").unwrap(),

            // // @key: json_name
            key_hint_re: Regex::new(r"^//\s*@key:\s*(\S+)\s*$").unwrap(),

            // // enum  |  // enum <A, B, C>
            enum_hint_re: Regex::new(r"^//\s*enum(?:\s*<([^>]*)>)?\s*$").unwrap(),

            // Combined skip-pattern for pure annotation lines.
            annotation_re: Regex::new(r"^@[\w.]+(\(.*\))?\s*,?$").unwrap(),

            whitespace_re: Regex::new(r"\s+").unwrap(),
            open_bracket_re: Regex::new(r"\s*([(\[])\s*").unwrap(),
            close_bracket_re: Regex::new(r"\s*([)\]])").unwrap(),
            head_keyword_re: Regex::new(r"\b(class|enum)\s+[A-Za-z_$]").unwrap(),
            enum_keyword_re: Regex::new(r"\benum\s+[A-Za-z_$]").unwrap(),
        }
    }

    /// Split raw declaration text into single-line member statements.
    ///
    /// Malformed input containing no class/enum keyword yields an empty
    /// list; callers interpret this as "not a recognized declaration".
    /// Text following the first declaration's body (other declarations,
    /// existing extensions) is excluded via the bracket locator.
    pub fn split_statements(&self, raw: &str) -> Vec<String> {
        let without_blocks = self.block_comment_re.replace_all(raw, " ");
        let all_lines: Vec<&str> = without_blocks.lines().collect();
        let head = match all_lines
            .iter()
            .position(|l| self.head_keyword_re.is_match(l))
        {
            Some(i) => i,
            None => return Vec::new(),
        };
        let selected: &[&str] = match locate_span(&all_lines, head) {
            Some(span) => &all_lines[span.start..=span.end],
            None => &all_lines[head..],
        };
        let is_enum = self.enum_keyword_re.is_match(selected[0]);

        // Per-line comment handling: hints survive as protected pieces,
        // everything else after // is dropped, pure annotations vanish.
        let mut buffer = String::new();
        for line in selected.iter().copied() {
            let trimmed = line.trim();
            if self.key_hint_re.is_match(trimmed) || self.enum_hint_re.is_match(trimmed) {
                buffer.push(';');
                buffer.push_str(trimmed);
                buffer.push(';');
                continue;
            }
            let code = match line.find("//") {
                Some(i) => &line[..i],
                None => line,
            };
            if self.annotation_re.is_match(code.trim()) {
                continue;
            }
            buffer.push_str(code);
            buffer.push('\n');
        }

        // Isolate the class head by turning the first `{` into a separator.
        let head_split = match buffer.find('{') {
            Some(i) => {
                let mut b = buffer.clone();
                b.replace_range(i..i + 1, ";");
                b
            }
            None => buffer,
        };

        let mut statements: Vec<String> = head_split
            .split(';')
            .map(|s| self.clean_statement(s))
            .filter(|s| !s.is_empty())
            .collect();

        if is_enum && statements.len() >= 2 {
            let members = statements.remove(1);
            statements[0] = format!("{}{}{}", statements[0], ENUM_SEPARATOR, members);
        }

        statements
    }

    /// Collapse a raw candidate into one normalized line.
    fn clean_statement(&self, raw: &str) -> String {
        let mut s = raw.replace('\n', " ");

        // Hint comments pass through untouched apart from trimming.
        let trimmed = s.trim();
        if self.key_hint_re.is_match(trimmed) || self.enum_hint_re.is_match(trimmed) {
            return trimmed.to_string();
        }

        // A statement mixing `return` with braces is a control statement;
        // its braces are stripped rather than counted.
        if s.contains("return") && (s.contains('{') || s.contains('}')) {
            s = s.replace(['{', '}'], " ");
        }

        let s = self.whitespace_re.replace_all(&s, " ");
        let s = self.open_bracket_re.replace_all(&s, "$1");
        let s = self.close_bracket_re.replace_all(&s, "$1");

        // Stray brace artifacts produced by naive splitting.
        s.trim()
            .trim_start_matches(['}', '{'])
            .trim_end_matches(['}', '{'])
            .trim()
            .to_string()
    }

    /// Parse a retained external-key hint statement.
    pub fn parse_key_hint(&self, statement: &str) -> Option<String> {
        self.key_hint_re
            .captures(statement)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Parse a retained enum-type hint statement, returning the listed
    /// variant names (possibly empty).
    pub fn parse_enum_hint(&self, statement: &str) -> Option<Vec<String>> {
        let caps = self.enum_hint_re.captures(statement)?;
        let values = caps
            .get(1)
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Some(values)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
