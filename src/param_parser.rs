//! Parameter Parser: turns a parenthesized parameter-list substring into
//! parameter records with type, name, category, modifiers and defaults.
//!
//! Ambiguous tokens are never dropped silently; the record is emitted with
//! best-effort fields and a warning is logged, so generation degrades
//! rather than fails.

use regex::Regex;

use crate::bracket_utils::{extract_parenthesized, find_matching_bracket, split_respecting_brackets};
use crate::model::{ParamCategory, Parameter};

pub struct ParamParser {
    function_type_re: Regex,
    enum_literal_re: Regex,
    identifier_re: Regex,
}

impl ParamParser {
    pub fn new() -> Self {
        Self {
            // Type Function(args)? name — the whole prefix is the declared type.
            function_type_re: Regex::new(
                r"^(.*\bFunction\s*\([^)]*\)\s*\??)\s+([A-Za-z_$][\w$]*)$",
            )
            .unwrap(),

            // Identifier.identifier — the shape of an enum literal default.
            enum_literal_re: Regex::new(r"^[A-Z][\w$]*\.[a-z_$][\w$]*$").unwrap(),

            identifier_re: Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap(),
        }
    }

    /// Parse a parameter-list substring. The input may carry its outer
    /// parentheses (`(a, {b})`) or be the bare inner list.
    ///
    /// Required parameters are yielded before optional (named or
    /// positional) ones regardless of source order, matching how the
    /// generated constructor signature is laid out.
    pub fn parse(&self, raw: &str) -> Vec<Parameter> {
        let inner = match extract_parenthesized(raw) {
            Some((inner, _)) => inner,
            None => raw.to_string(),
        };

        let mut required_src = inner.clone();
        let mut named_src = None;
        let mut positional_src = None;

        if let Some(open) = find_top_level(&inner, '{') {
            if let Some(close) = find_matching_bracket(&inner, open, '{', '}') {
                named_src = Some(inner[open + 1..close].to_string());
                required_src = format!("{}{}", &inner[..open], &inner[close + 1..]);
            }
        }
        // A `[...]` group counts as positional only when no named block is
        // present, disambiguating it from default-value list literals.
        if named_src.is_none() {
            if let Some(open) = find_top_level(&inner, '[') {
                if let Some(close) = find_matching_bracket(&inner, open, '[', ']') {
                    positional_src = Some(inner[open + 1..close].to_string());
                    required_src = format!("{}{}", &inner[..open], &inner[close + 1..]);
                }
            }
        }

        let mut required = self.parse_group(&required_src, ParamCategory::Required);
        let mut optional = Vec::new();
        if let Some(src) = named_src {
            optional.extend(self.parse_group(&src, ParamCategory::Named));
        }
        if let Some(src) = positional_src {
            optional.extend(self.parse_group(&src, ParamCategory::Positional));
        }

        required.append(&mut optional);
        required
    }

    /// Parse one standalone declaration (`Type name [= default]`). Unlike
    /// [`parse`](Self::parse), parentheses in the input are part of the
    /// declared type (`void Function(int) onChanged`), never a parameter
    /// list to unwrap.
    pub fn parse_single(&self, raw: &str) -> Option<Parameter> {
        self.parse_one(raw, ParamCategory::Required)
    }

    fn parse_group(&self, src: &str, category: ParamCategory) -> Vec<Parameter> {
        split_respecting_brackets(src, ',')
            .iter()
            .filter_map(|piece| self.parse_one(piece, category))
            .collect()
    }

    /// Parse a single raw parameter string into a record.
    fn parse_one(&self, raw: &str, category: ParamCategory) -> Option<Parameter> {
        let mut text = raw.trim();
        if text.is_empty() {
            return None;
        }

        let mut param = Parameter::named("");
        param.category = category;
        param.required = category == ParamCategory::Required;

        if let Some(rest) = text.strip_prefix("required ") {
            // `required` implies named-block membership.
            param.required = true;
            param.category = ParamCategory::Named;
            text = rest.trim();
        }
        if let Some(rest) = text.strip_prefix("final ") {
            param.is_final = true;
            text = rest.trim();
        }

        // Split off a default-value expression at the first top-level `=`.
        let (decl, default) = match find_top_level(text, '=') {
            Some(i) => (text[..i].trim(), Some(text[i + 1..].trim())),
            None => (text, None),
        };
        if let Some(value) = default {
            param.default_value = Some(value.to_string());
            // A `const` prefix is preserved in the recorded default but the
            // bare literal is kept separately as the comparison value.
            let literal = value.strip_prefix("const ").unwrap_or(value).trim();
            param.default_literal = Some(literal.to_string());
            if self.enum_literal_re.is_match(literal) {
                param.is_enum = true;
            }
        }

        // Constructor-forwarding prefixes carry no type of their own; the
        // type is back-filled later from field data during model merge.
        if let Some(name) = decl.strip_prefix("this.") {
            param.name = name.trim().to_string();
            return Some(param);
        }
        if let Some(name) = decl.strip_prefix("super.") {
            param.name = name.trim().to_string();
            param.from_super = true;
            return Some(param);
        }

        if let Some(caps) = self.function_type_re.captures(decl) {
            let type_text = caps.get(1).unwrap().as_str().trim();
            param.name = caps.get(2).unwrap().as_str().to_string();
            self.apply_type(&mut param, type_text);
            return Some(param);
        }

        // Last whitespace-delimited token is the name, everything before it
        // the type. Splitting respects brackets so `Map<String, int> m`
        // stays one declaration.
        match decl.rsplit_once(' ') {
            Some((type_part, name)) if self.identifier_re.is_match(name) => {
                param.name = name.to_string();
                self.apply_type(&mut param, type_part.trim());
            }
            _ => {
                if self.identifier_re.is_match(decl) {
                    // Bare identifier: a name with an unresolved type.
                    param.name = decl.to_string();
                } else {
                    log::warn!("ambiguous parameter token: {:?}", raw);
                    param.name = decl.to_string();
                }
            }
        }

        // Optional parameter without a default and without an explicit `?`
        // is nullable by construction.
        if param.is_optional()
            && !param.required
            && param.default_value.is_none()
            && !param.nullable
            && !param.type_text.is_empty()
        {
            param.nullable = true;
        }

        Some(param)
    }

    fn apply_type(&self, param: &mut Parameter, type_text: &str) {
        match type_text.strip_suffix('?') {
            Some(base) => {
                param.type_text = base.trim().to_string();
                param.nullable = true;
                param.explicit_nullable = true;
            }
            None => param.type_text = type_text.to_string(),
        }
    }
}

impl Default for ParamParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the first occurrence of `target` outside any bracket nesting.
fn find_top_level(s: &str, target: char) -> Option<usize> {
    let mut angle: u32 = 0;
    let mut paren: u32 = 0;
    let mut square: u32 = 0;
    let mut curly: u32 = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => angle += 1,
            '>' => angle = angle.saturating_sub(1),
            '(' => paren += 1,
            ')' => paren = paren.saturating_sub(1),
            '[' if target != '[' => square += 1,
            ']' => square = square.saturating_sub(1),
            '{' if target != '{' => curly += 1,
            '}' => curly = curly.saturating_sub(1),
            _ => {}
        }
        if c == target && angle == 0 && paren == 0 && square == 0 && curly == 0 {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Vec<Parameter> {
        ParamParser::new().parse(raw)
    }

    #[test]
    fn test_required_positional_this() {
        let params = parse("(this.name, this.age)");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "name");
        assert!(params[0].type_text.is_empty());
        assert_eq!(params[0].category, ParamCategory::Required);
    }

    #[test]
    fn test_required_final_named() {
        let params = parse("({required final String password})");
        assert_eq!(params.len(), 1);
        let p = &params[0];
        assert_eq!(p.name, "password");
        assert_eq!(p.type_text, "String");
        assert!(p.required);
        assert!(p.is_final);
        assert_eq!(p.category, ParamCategory::Named);
        assert!(p.is_optional());
    }

    #[test]
    fn test_named_with_default() {
        let params = parse("({int age = 0})");
        let p = &params[0];
        assert_eq!(p.name, "age");
        assert_eq!(p.type_text, "int");
        assert_eq!(p.default_value.as_deref(), Some("0"));
        assert!(!p.nullable);
    }

    #[test]
    fn test_const_default_preserved() {
        let params = parse("({List<int> xs = const [1, 2]})");
        let p = &params[0];
        assert_eq!(p.default_value.as_deref(), Some("const [1, 2]"));
        assert_eq!(p.default_literal.as_deref(), Some("[1, 2]"));
    }

    #[test]
    fn test_positional_group() {
        let params = parse("(String a, [int b = 1, String c])");
        assert_eq!(params.len(), 3);
        assert_eq!(params[1].category, ParamCategory::Positional);
        assert_eq!(params[2].category, ParamCategory::Positional);
        // Optional without default is nullable by construction.
        assert!(params[2].nullable);
        assert!(!params[2].explicit_nullable);
    }

    #[test]
    fn test_default_list_not_positional_group() {
        // The `[...]` here is a default value, not a positional block,
        // because a named block is present.
        let params = parse("({List<int> xs = const [], required int n})");
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|p| p.category == ParamCategory::Named));
    }

    #[test]
    fn test_generic_type_not_split() {
        let params = parse("(Map<String, List<int>> data, int n)");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].type_text, "Map<String, List<int>>");
        assert_eq!(params[0].name, "data");
    }

    #[test]
    fn test_function_typed_parameter() {
        let params = parse("(void Function(int) onChanged, String Function()? builder)");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].type_text, "void Function(int)");
        assert_eq!(params[0].name, "onChanged");
        assert_eq!(params[1].type_text, "String Function()");
        assert!(params[1].nullable);
    }

    #[test]
    fn test_parse_single_function_typed_declaration() {
        // The parens belong to the type; nothing here is a parameter list.
        let p = ParamParser::new()
            .parse_single("void Function(int) onChanged")
            .unwrap();
        assert_eq!(p.type_text, "void Function(int)");
        assert_eq!(p.name, "onChanged");

        let p = ParamParser::new()
            .parse_single("String Function()? builder")
            .unwrap();
        assert_eq!(p.type_text, "String Function()");
        assert!(p.nullable);
    }

    #[test]
    fn test_explicit_nullable() {
        let params = parse("(String? nickname)");
        assert!(params[0].nullable);
        assert!(params[0].explicit_nullable);
        assert_eq!(params[0].type_text, "String");
    }

    #[test]
    fn test_super_forwarding() {
        let params = parse("(super.id, this.name)");
        assert!(params[0].from_super);
        assert_eq!(params[0].name, "id");
    }

    #[test]
    fn test_enum_literal_default_inference() {
        let params = parse("({Color color = Color.red})");
        assert!(params[0].is_enum);
    }

    #[test]
    fn test_required_before_optional_ordering() {
        // Named block written first in source; required still comes out first.
        let params = parse("({int b = 0}, String a)");
        assert_eq!(params[0].name, "a");
        assert_eq!(params[0].category, ParamCategory::Required);
        assert_eq!(params[1].name, "b");
    }
}
