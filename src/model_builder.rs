//! Structural Model Builder: assembles a Class Model from the normalized
//! statement list.
//!
//! Build order is strict: parameters are parsed standalone, fields are
//! built standalone, then constructor parameters are merged against the
//! already-built fields, so no back-reference cycle is ever materialized.

use regex::Regex;

use crate::bracket_utils::{extract_parenthesized, has_balanced_parens, split_respecting_brackets};
use crate::model::{
    ClassKind, ClassModel, Constructor, ConstructorKind, Field, FieldKind, GenericParam,
    ParamCategory, Parameter,
};
use crate::normalizer::{Normalizer, ENUM_SEPARATOR};
use crate::param_parser::ParamParser;
use crate::settings::Settings;

pub struct ModelBuilder {
    params: ParamParser,
    normalizer: Normalizer,
    class_head_re: Regex,
    enum_head_re: Regex,
    getter_re: Regex,
    control_re: Regex,
    identifier_re: Regex,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            params: ParamParser::new(),
            normalizer: Normalizer::new(),

            // abstract? class Name<T, E extends X>? extends/implements tail
            class_head_re: Regex::new(
                r"^(abstract\s+)?(?:base\s+|sealed\s+|final\s+|interface\s+|mixin\s+)?class\s+([A-Za-z_$][\w$]*)\s*(?:<(.+)>)?(?:\s+(?:extends|implements|with)\b.*)?$",
            )
            .unwrap(),

            enum_head_re: Regex::new(r"^enum\s+([A-Za-z_$][\w$]*)").unwrap(),

            // Type get name [=> expr | stripped body remainder]
            getter_re: Regex::new(
                r"^([A-Za-z_$][\w$<>, ?]*?\??)\s+get\s+([A-Za-z_$][\w$]*)(\s.*)?$",
            )
            .unwrap(),

            control_re: Regex::new(r"^(if|else|for|while|do|switch|case|assert|throw|try|catch)\b")
                .unwrap(),

            identifier_re: Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap(),
        }
    }

    /// Produce a Class Model, or None when the first statement is not a
    /// recognized class/enum head. Partial or ambiguous member statements
    /// are skipped individually rather than aborting the whole build.
    pub fn build(&self, statements: &[String], settings: &Settings) -> Option<ClassModel> {
        let head = statements.first()?;

        if head.starts_with("enum ") || head.contains(ENUM_SEPARATOR) {
            return self.build_enum(statements, settings);
        }

        let caps = self.class_head_re.captures(head)?;
        let is_abstract = caps.get(1).is_some();
        let name = caps.get(2).unwrap().as_str().to_string();
        let generics = caps
            .get(3)
            .map(|m| parse_generics(m.as_str()))
            .unwrap_or_default();

        let ctor_re = constructor_re(&name)?;
        let mut fields: Vec<Field> = Vec::new();
        let mut constructors: Vec<Constructor> = Vec::new();
        let mut pending_key: Option<String> = None;
        let mut pending_enum: Option<Vec<String>> = None;

        for statement in &statements[1..] {
            if let Some(key) = self.normalizer.parse_key_hint(statement) {
                pending_key = Some(key);
                continue;
            }
            if let Some(values) = self.normalizer.parse_enum_hint(statement) {
                pending_enum = Some(values);
                continue;
            }
            if self.control_re.is_match(statement) {
                continue;
            }
            // Forwarding factories (arrow body, no bracketed body of their
            // own) are excluded from variant generation.
            if statement.starts_with("factory") && statement.contains("=>") {
                continue;
            }

            if let Some(ctor) = self.parse_constructor(statement, &name, &ctor_re) {
                constructors.push(ctor);
            } else if let Some(field) = self.parse_getter(statement) {
                fields.push(self.apply_hints(field, &mut pending_key, &mut pending_enum));
            } else if let Some(new_fields) = self.parse_instance_fields(statement) {
                for field in new_fields {
                    fields.push(self.apply_hints(field, &mut pending_key, &mut pending_enum));
                }
            } else {
                log::warn!("skipping unclassified member statement: {:?}", statement);
            }
        }

        merge_constructor_params(&mut constructors, &fields);

        Some(ClassModel {
            name,
            generics,
            kind: if is_abstract {
                ClassKind::AbstractClass
            } else {
                ClassKind::Class
            },
            fields,
            constructors,
            settings: settings.clone(),
        })
    }

    fn build_enum(&self, statements: &[String], settings: &Settings) -> Option<ClassModel> {
        let head = statements.first()?;
        let (head_part, member_part) = match head.split_once(ENUM_SEPARATOR) {
            Some((h, m)) => (h, m),
            None => (head.as_str(), ""),
        };
        let name = self
            .enum_head_re
            .captures(head_part)?
            .get(1)
            .unwrap()
            .as_str()
            .to_string();

        let members = split_respecting_brackets(member_part, ',');
        // Enhanced iff every member carries a balanced constructor call.
        let enhanced = !members.is_empty() && members.iter().all(|m| has_balanced_parens(m));

        let mut fields: Vec<Field> = Vec::new();
        for member in &members {
            let member_name = match member.find('(') {
                Some(i) => member[..i].trim().to_string(),
                None => member.trim().to_string(),
            };
            if !self.identifier_re.is_match(&member_name) {
                log::warn!("skipping malformed enum member: {:?}", member);
                continue;
            }
            let mut param = Parameter::named(&member_name);
            param.type_text = name.clone();
            param.is_enum = true;
            fields.push(Field {
                name: member_name.clone(),
                kind: FieldKind::EnumMember,
                param,
                is_private: member_name.starts_with('_'),
                is_const: true,
            });
        }

        // Enhanced enum bodies carry fields and a const constructor.
        let ctor_re = constructor_re(&name)?;
        let mut constructors: Vec<Constructor> = Vec::new();
        for statement in &statements[1..] {
            if let Some(ctor) = self.parse_constructor(statement, &name, &ctor_re) {
                constructors.push(ctor);
            } else if let Some(new_fields) = self.parse_instance_fields(statement) {
                fields.extend(new_fields);
            }
        }
        merge_constructor_params(&mut constructors, &fields);

        Some(ClassModel {
            name,
            generics: Vec::new(),
            kind: if enhanced {
                ClassKind::EnhancedEnum
            } else {
                ClassKind::Enum
            },
            fields,
            constructors,
            settings: settings.clone(),
        })
    }

    /// Matched when the statement both contains the enclosing class's name
    /// and looks like a parameter list, or matches the named-constructor
    /// pattern. `ctor_re` is the per-class pattern compiled once per build.
    fn parse_constructor(
        &self,
        statement: &str,
        class_name: &str,
        ctor_re: &Regex,
    ) -> Option<Constructor> {
        let caps = ctor_re.captures(statement)?;

        let is_const = caps.get(1).is_some();
        let is_factory = caps.get(2).is_some();
        let variant = caps.get(4).map(|m| m.as_str().to_string());

        let (_, rest) = extract_parenthesized(statement)?;
        let params = self.params.parse(statement);

        // A factory without a body expression redirects to a subclass:
        // one branch of a sealed-hierarchy-style type.
        let subclass = if is_factory {
            rest.strip_prefix('=')
                .map(|s| s.trim().trim_end_matches(';').trim().to_string())
                .filter(|s| self.identifier_re.is_match(s))
        } else {
            None
        };

        let kind = match (is_factory, &variant) {
            (true, Some(_)) => ConstructorKind::Factory,
            (true, None) => ConstructorKind::UnnamedFactory,
            (false, Some(_)) => ConstructorKind::Named,
            (false, None) => ConstructorKind::Generative,
        };

        let display_name = match &variant {
            Some(v) => format!("{}.{}", class_name, v),
            None => class_name.to_string(),
        };
        let is_private = variant.as_deref().map(|v| v.starts_with('_')).unwrap_or(false);

        Some(Constructor {
            kind,
            display_name,
            class_name: class_name.to_string(),
            params,
            is_const,
            is_private,
            subclass,
        })
    }

    fn parse_getter(&self, statement: &str) -> Option<Field> {
        let caps = self.getter_re.captures(statement)?;
        let type_text = caps.get(1).unwrap().as_str().trim();
        let name = caps.get(2).unwrap().as_str();

        let mut param = Parameter::named(name);
        param.is_getter = true;
        match type_text.strip_suffix('?') {
            Some(base) => {
                param.type_text = base.trim().to_string();
                param.nullable = true;
                param.explicit_nullable = true;
            }
            None => param.type_text = type_text.to_string(),
        }

        Some(Field {
            name: name.to_string(),
            kind: FieldKind::Getter,
            param,
            is_private: name.starts_with('_'),
            is_const: false,
        })
    }

    /// Parse an instance-variable statement, splitting multi-declaration
    /// lines (`int a, b`) into independent entries sharing type and
    /// modifiers.
    fn parse_instance_fields(&self, statement: &str) -> Option<Vec<Field>> {
        let mut text = statement;
        let mut is_final = false;
        let mut is_const = false;

        loop {
            if let Some(rest) = text.strip_prefix("final ") {
                is_final = true;
                text = rest.trim_start();
            } else if let Some(rest) = text.strip_prefix("const ") {
                is_const = true;
                text = rest.trim_start();
            } else if let Some(rest) = text.strip_prefix("late ") {
                text = rest.trim_start();
            } else if text.starts_with("static ") {
                // Statics are not data members.
                return Some(Vec::new());
            } else {
                break;
            }
        }

        let pieces = split_respecting_brackets(text, ',');
        if pieces.is_empty() {
            return None;
        }

        // First piece must parse as `Type name [= default]`.
        let first = self.params.parse_single(&pieces[0])?;
        if first.name.is_empty() || first.type_text.is_empty() {
            return None;
        }

        let mut make_field = |param: Parameter| {
            let mut param = param;
            param.is_final = param.is_final || is_final;
            param.category = ParamCategory::Required;
            Field {
                name: param.name.clone(),
                kind: FieldKind::Instance,
                is_private: param.name.starts_with('_'),
                is_const,
                param,
            }
        };

        let shared_type = first.type_text.clone();
        let shared_nullable = first.nullable;
        let mut fields = vec![make_field(first)];

        for piece in &pieces[1..] {
            if self.identifier_re.is_match(piece) {
                let mut param = Parameter::named(piece);
                param.type_text = shared_type.clone();
                param.nullable = shared_nullable;
                fields.push(make_field(param));
            } else if let Some(extra) = self.params.parse_single(piece) {
                // `int a = 1, b = 2` — declarator with its own default.
                if extra.type_text.is_empty() && !extra.name.is_empty() {
                    let mut param = extra;
                    param.type_text = shared_type.clone();
                    param.nullable = shared_nullable;
                    fields.push(make_field(param));
                }
            }
        }

        Some(fields)
    }

    fn apply_hints(
        &self,
        mut field: Field,
        pending_key: &mut Option<String>,
        pending_enum: &mut Option<Vec<String>>,
    ) -> Field {
        if let Some(key) = pending_key.take() {
            if field.param.key.is_none() {
                field.param.key = Some(key);
            }
        }
        if let Some(values) = pending_enum.take() {
            field.param.is_enum = true;
            field.param.enum_values = values;
        }
        field
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Constructor-statement pattern for one class name. The name is only
/// known at build time, so this is the one pattern not owned by the
/// builder; it is compiled once per build and shared across statements.
fn constructor_re(class_name: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"^(const\s+)?(factory\s+)?{}(\.([A-Za-z_$][\w$]*))?\(",
        regex::escape(class_name)
    ))
    .ok()
}

/// Back-fill each constructor parameter from the owning class's field of
/// the same name. Attributes already explicitly set are never overwritten.
fn merge_constructor_params(constructors: &mut [Constructor], fields: &[Field]) {
    for ctor in constructors.iter_mut() {
        ctor.params = ctor
            .params
            .iter()
            .map(|p| match fields.iter().find(|f| f.name == p.name) {
                Some(field) => p.merged_with(&field.param),
                None => p.clone(),
            })
            .collect();
    }
}

fn parse_generics(src: &str) -> Vec<GenericParam> {
    split_respecting_brackets(src, ',')
        .iter()
        .map(|piece| match piece.split_once(" extends ") {
            Some((name, bound)) => GenericParam {
                name: name.trim().to_string(),
                bound: Some(bound.trim().to_string()),
            },
            None => GenericParam {
                name: piece.trim().to_string(),
                bound: None,
            },
        })
        .collect()
}

/// Convenience wrapper: normalize raw text and build a model in one step.
pub fn extract_model(raw: &str, settings: &Settings) -> Option<ClassModel> {
    let statements = Normalizer::new().split_statements(raw);
    ModelBuilder::new().build(&statements, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeIdentity;

    fn build(raw: &str) -> Option<ClassModel> {
        extract_model(raw, &Settings::default())
    }

    #[test]
    fn test_simple_class() {
        let model = build(
            "class Person {\n  final String name;\n  final int age;\n\n  Person(this.name, this.age);\n}\n",
        )
        .unwrap();
        assert_eq!(model.name, "Person");
        assert_eq!(model.kind, ClassKind::Class);
        assert_eq!(model.fields.len(), 2);
        let ctor = model.generative_constructor().unwrap();
        assert_eq!(ctor.params.len(), 2);
        // Types back-filled from field declarations.
        assert_eq!(ctor.params[0].type_text, "String");
        assert_eq!(ctor.params[1].type_text, "int");
        assert!(ctor.params[0].is_final);
    }

    #[test]
    fn test_merge_preserves_explicit_attributes() {
        let model = build(
            "class A {\n  final int n;\n  A({this.n = 3});\n}\n",
        )
        .unwrap();
        let p = &model.generative_constructor().unwrap().params[0];
        assert_eq!(p.default_value.as_deref(), Some("3"));
        assert_eq!(p.type_text, "int");
        assert_eq!(p.category, ParamCategory::Named);
    }

    #[test]
    fn test_abstract_class() {
        let model = build("abstract class Shape {\n  final int sides;\n}\n").unwrap();
        assert_eq!(model.kind, ClassKind::AbstractClass);
    }

    #[test]
    fn test_generics_with_bounds() {
        let model = build("class Box<T, E extends Object> {\n  final T value;\n}\n").unwrap();
        assert_eq!(model.generics.len(), 2);
        assert_eq!(model.generics[0].name, "T");
        assert_eq!(model.generics[1].bound.as_deref(), Some("Object"));
        assert_eq!(model.type_with_generics(), "Box<T, E>");
    }

    #[test]
    fn test_simple_enum() {
        let model = build("enum Color { red, green, blue }").unwrap();
        assert_eq!(model.kind, ClassKind::Enum);
        let members: Vec<&str> = model.enum_members().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(members, vec!["red", "green", "blue"]);
    }

    #[test]
    fn test_enhanced_enum() {
        let model = build(
            "enum Planet {\n  mercury(3.3),\n  venus(4.8);\n\n  const Planet(this.mass);\n  final double mass;\n}\n",
        )
        .unwrap();
        assert_eq!(model.kind, ClassKind::EnhancedEnum);
        assert_eq!(model.enum_members().len(), 2);
        let ctor = model.generative_constructor().unwrap();
        assert_eq!(ctor.params[0].type_text, "double");
    }

    #[test]
    fn test_mixed_enum_is_not_enhanced() {
        // Enhancement detection is false for ["a(1)", "b"].
        let model = build("enum E { a(1), b }").unwrap();
        assert_eq!(model.kind, ClassKind::Enum);
    }

    #[test]
    fn test_factory_variants_sealed() {
        let model = build(
            "abstract class Result {\n  const Result();\n\n  factory Result.ok(int value) = Ok;\n  factory Result.err(String message) = Err;\n}\n",
        )
        .unwrap();
        let variants = model.factory_variants();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].subclass.as_deref(), Some("Ok"));
        assert_eq!(variants[0].variant_name(), "ok");
        assert_eq!(variants[1].kind, ConstructorKind::Factory);
    }

    #[test]
    fn test_forwarding_factory_excluded() {
        let model = build(
            "class A {\n  final int n;\n  A(this.n);\n  factory A.from(String s) => A(int.parse(s));\n}\n",
        )
        .unwrap();
        assert_eq!(model.constructors.len(), 1);
    }

    #[test]
    fn test_multi_declaration_line() {
        let model = build("class P {\n  final int x, y;\n}\n").unwrap();
        assert_eq!(model.fields.len(), 2);
        assert_eq!(model.fields[0].param.type_text, "int");
        assert_eq!(model.fields[1].param.type_text, "int");
        assert_eq!(model.fields[1].name, "y");
        assert!(model.fields[1].param.is_final);
    }

    #[test]
    fn test_getter_field() {
        let model = build(
            "class N {\n  final String first;\n  final String last;\n  String get full => '$first $last';\n}\n",
        )
        .unwrap();
        let getter = model.fields.iter().find(|f| f.name == "full").unwrap();
        assert_eq!(getter.kind, FieldKind::Getter);
        assert!(getter.param.is_getter);
        assert_eq!(getter.param.type_text, "String");
    }

    #[test]
    fn test_hints_applied_to_next_field() {
        let model = build(
            "class U {\n  // @key: user_name\n  final String userName;\n  // enum <admin, guest>\n  final Role role;\n}\n",
        )
        .unwrap();
        assert_eq!(model.fields[0].param.map_key(), "user_name");
        let role = &model.fields[1].param;
        assert!(role.is_enum);
        assert_eq!(role.enum_values, vec!["admin", "guest"]);
        assert_eq!(role.type_identity(), TypeIdentity::Enum);
    }

    #[test]
    fn test_statics_ignored() {
        let model = build("class C {\n  static const int shared = 1;\n  final int own;\n}\n").unwrap();
        assert_eq!(model.fields.len(), 1);
        assert_eq!(model.fields[0].name, "own");
    }

    #[test]
    fn test_not_a_declaration_yields_none() {
        assert!(build("void main() {}").is_none());
        assert!(build("final int a = 1;").is_none());
    }

    #[test]
    fn test_function_typed_field() {
        let model = build(
            "class H {\n  final void Function(int) onChanged;\n  H(this.onChanged);\n}\n",
        )
        .unwrap();
        assert_eq!(model.fields.len(), 1);
        assert_eq!(model.fields[0].param.type_text, "void Function(int)");
        assert_eq!(model.fields[0].name, "onChanged");
        // Merge backfills the constructor parameter from the field.
        let ctor = model.generative_constructor().unwrap();
        assert_eq!(ctor.params[0].type_text, "void Function(int)");
    }
}
