//! Bracket-aware string splitting and the line-oriented Bracket-Range
//! Locator used to map constructs onto document regions.

use serde::{Deserialize, Serialize};

/// Split a string by a delimiter, ignoring delimiters inside balanced
/// brackets. Supports <>, (), [], {} so generic types such as
/// `Map<String, List<int>>` are never split internally.
pub fn split_respecting_brackets(s: &str, delimiter: char) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut angle: u32 = 0;
    let mut paren: u32 = 0;
    let mut square: u32 = 0;
    let mut curly: u32 = 0;

    for c in s.chars() {
        match c {
            '<' => angle += 1,
            '>' => angle = angle.saturating_sub(1),
            '(' => paren += 1,
            ')' => paren = paren.saturating_sub(1),
            '[' => square += 1,
            ']' => square = square.saturating_sub(1),
            '{' => curly += 1,
            '}' => curly = curly.saturating_sub(1),
            _ if c == delimiter && angle == 0 && paren == 0 && square == 0 && curly == 0 => {
                let piece = current.trim();
                if !piece.is_empty() {
                    result.push(piece.to_string());
                }
                current = String::new();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    if !current.trim().is_empty() {
        result.push(current.trim().to_string());
    }

    result
}

/// Byte index of the closing bracket matching the opener at `start`.
/// Handles nesting of the same bracket kind. None when unbalanced.
pub fn find_matching_bracket(s: &str, start: usize, open: char, close: char) -> Option<usize> {
    let mut iter = s[start..].char_indices();
    let (_, first) = iter.next()?;
    if first != open {
        return None;
    }
    let mut depth: u32 = 1;
    for (offset, c) in iter {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(start + offset);
            }
        }
    }
    None
}

/// Extract the content of the first balanced `(...)` span together with the
/// remainder of the string after it. None when no balanced span exists.
pub fn extract_parenthesized(s: &str) -> Option<(String, String)> {
    let open = s.find('(')?;
    let close = find_matching_bracket(s, open, '(', ')')?;
    let inner = s[open + 1..close].to_string();
    let rest = s[close + 1..].trim().to_string();
    Some((inner, rest))
}

/// Whether the string contains a balanced `(...)` span.
/// Used for enhanced-enum member detection.
pub fn has_balanced_parens(s: &str) -> bool {
    match s.find('(') {
        Some(open) => find_matching_bracket(s, open, '(', ')').is_some(),
        None => false,
    }
}

/// Inclusive line span of a multi-line construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

/// Which single bracket kind a construct is matched on. Generic-type angle
/// brackets are never counted; only literal `{}` or `()` nesting is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Curly,
    Paren,
}

/// A line is a pure comment when it contributes nothing to bracket depth.
pub fn is_comment_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("//") || t.starts_with("/*") || t.starts_with('*')
}

/// Compute the full multi-line span of a bracketed construct starting at
/// `start`, counting opening/closing occurrences of a single bracket kind
/// per line until the running counts are equal.
///
/// The first line decides the kind: a present `{` means a `{}`-bodied
/// construct, an otherwise present `(` means a `()`-signature construct.
/// When neither is present the match fails (logged, not thrown) and the
/// caller treats the construct as absent.
pub fn locate_span<S: AsRef<str>>(lines: &[S], start: usize) -> Option<LineSpan> {
    let first = lines.get(start)?.as_ref();
    let kind = if first.contains('{') {
        SpanKind::Curly
    } else if first.contains('(') {
        SpanKind::Paren
    } else {
        log::warn!("no bracket on starting line {}: {:?}", start, first.trim());
        return None;
    };
    let (open, close) = match kind {
        SpanKind::Curly => ('{', '}'),
        SpanKind::Paren => ('(', ')'),
    };

    let mut opened: usize = 0;
    let mut closed: usize = 0;
    for (i, line) in lines.iter().enumerate().skip(start) {
        let line = line.as_ref();
        if i > start && is_comment_line(line) {
            continue;
        }
        opened += line.matches(open).count();
        closed += line.matches(close).count();
        if opened > 0 && opened == closed {
            return Some(LineSpan { start, end: i });
        }
    }

    log::warn!("unbalanced {:?} construct starting at line {}", kind, start);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_split() {
        assert_eq!(split_respecting_brackets("a, b, c", ','), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_generic_not_split() {
        let result = split_respecting_brackets("Map<String, List<int>> data, int age", ',');
        assert_eq!(result, vec!["Map<String, List<int>> data", "int age"]);
    }

    #[test]
    fn test_default_value_list_not_split() {
        let result = split_respecting_brackets("List<int> xs = const [1, 2], int n", ',');
        assert_eq!(result, vec!["List<int> xs = const [1, 2]", "int n"]);
    }

    #[test]
    fn test_find_matching_bracket_nested() {
        assert_eq!(find_matching_bracket("f(a(b))", 1, '(', ')'), Some(6));
    }

    #[test]
    fn test_find_matching_bracket_unbalanced() {
        assert_eq!(find_matching_bracket("f(abc", 1, '(', ')'), None);
    }

    #[test]
    fn test_extract_parenthesized() {
        let (inner, rest) = extract_parenthesized("Point(this.x, this.y);").unwrap();
        assert_eq!(inner, "this.x, this.y");
        assert_eq!(rest, ";");
    }

    #[test]
    fn test_has_balanced_parens() {
        assert!(has_balanced_parens("a(1)"));
        assert!(!has_balanced_parens("b"));
        assert!(!has_balanced_parens("c(1"));
    }

    #[test]
    fn test_locate_curly_body() {
        let lines = vec!["class Point {", "  final int x;", "  final int y;", "}", ""];
        assert_eq!(locate_span(&lines, 0), Some(LineSpan { start: 0, end: 3 }));
    }

    #[test]
    fn test_locate_paren_signature() {
        let lines = vec!["  const Point(", "    this.x,", "    this.y,", "  );"];
        assert_eq!(locate_span(&lines, 0), Some(LineSpan { start: 0, end: 3 }));
    }

    #[test]
    fn test_generics_do_not_perturb_matching() {
        // Only literal ()/{} nesting is tracked, never <>.
        let lines = vec![
            "  Map<String, List<int>> data = const {};",
            "  MyClass(",
            "    this.data,",
            "  );",
        ];
        assert_eq!(locate_span(&lines, 1), Some(LineSpan { start: 1, end: 3 }));
    }

    #[test]
    fn test_comment_lines_skipped() {
        let lines = vec![
            "class A {",
            "  // stray } in a comment",
            "  final int a;",
            "}",
        ];
        assert_eq!(locate_span(&lines, 0), Some(LineSpan { start: 0, end: 3 }));
    }

    #[test]
    fn test_no_bracket_on_start_line() {
        let lines = vec!["final int a;"];
        assert_eq!(locate_span(&lines, 0), None);
    }
}
