//! Copy-mutation generation.
//!
//! The simple form is an in-class `copyWith` method whose `??` fallbacks
//! cannot reset a nullable member to null. The accurate form is a
//! post-class extension/interface/implementation triple using a private
//! sentinel to tell "argument not provided" apart from "explicit null".

use crate::generators::INDENT;
use crate::model::{ClassModel, ParamCategory, Parameter};
use crate::settings::Settings;

pub fn generate(model: &ClassModel, settings: &Settings) -> String {
    if settings.accurate_copy_with {
        generate_accurate(model, settings)
    } else {
        generate_simple(model)
    }
}

/// Constructor-call argument: named parameters keep their label, the rest
/// pass positionally.
fn call_arg(p: &Parameter, value: &str) -> String {
    if p.category == ParamCategory::Named {
        format!("{}: {}", p.name, value)
    } else {
        value.to_string()
    }
}

fn generate_simple(model: &ClassModel) -> String {
    let params = model.merged_params();
    let name = model.type_with_generics();

    if params.is_empty() {
        return format!("{INDENT}{name} copyWith() => {}();", model.name);
    }

    let mut lines = vec![format!("{INDENT}{name} copyWith({{")];
    for p in &params {
        // Nullability is what makes the override optional, so the
        // signature takes `Type?` regardless of the declared type.
        lines.push(format!("{INDENT}{INDENT}{}? {},", p.type_text, p.name));
    }
    lines.push(format!("{INDENT}}}) {{"));
    lines.push(format!("{INDENT}{INDENT}return {}(", model.name));
    for p in &params {
        let value = format!("{0} ?? this.{0}", p.name);
        lines.push(format!("{INDENT}{INDENT}{INDENT}{},", call_arg(p, &value)));
    }
    lines.push(format!("{INDENT}{INDENT});"));
    lines.push(format!("{INDENT}}}"));
    lines.join("\n")
}

fn generics_declaration(model: &ClassModel) -> String {
    if model.generics.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = model
        .generics
        .iter()
        .map(|g| match &g.bound {
            Some(bound) => format!("{} extends {}", g.name, bound),
            None => g.name.clone(),
        })
        .collect();
    format!("<{}>", parts.join(", "))
}

fn generate_accurate(model: &ClassModel, settings: &Settings) -> String {
    let params = model.merged_params();
    let name = &model.name;
    let full = model.type_with_generics();
    let decl = generics_declaration(model);

    let accessor = if settings.copy_with_getter {
        format!("{INDENT}{name}CopyWith{decl_args} get copyWith => _{name}CopyWithImpl{decl_args}(this);",
            decl_args = generics_args(model))
    } else {
        format!("{INDENT}{name}CopyWith{decl_args} copyWith() => _{name}CopyWithImpl{decl_args}(this);",
            decl_args = generics_args(model))
    };

    let mut out = Vec::new();
    out.push(format!("extension {name}CopyWithX{decl} on {full} {{"));
    out.push(accessor);
    out.push("}".to_string());
    out.push(String::new());

    // Interface: every override argument is optional, so the declared
    // types are nullable regardless of the member's own nullability.
    out.push(format!("abstract class {name}CopyWith{decl} {{"));
    let mut sig = vec![format!("{INDENT}{full} call({{")];
    for p in &params {
        sig.push(format!("{INDENT}{INDENT}{}? {},", p.type_text, p.name));
    }
    sig.push(format!("{INDENT}}});"));
    if params.is_empty() {
        out.push(format!("{INDENT}{full} call();"));
    } else {
        out.extend(sig);
    }
    out.push("}".to_string());
    out.push(String::new());

    out.push(format!(
        "class _{name}CopyWithImpl{decl} implements {name}CopyWith{decl_args} {{",
        decl_args = generics_args(model)
    ));
    out.push(format!("{INDENT}const _{name}CopyWithImpl(this._value);"));
    out.push(String::new());
    out.push(format!("{INDENT}final {full} _value;"));
    out.push(String::new());
    out.push(format!("{INDENT}static const Object _unset = Object();"));
    out.push(String::new());
    out.push(format!("{INDENT}@override"));
    if params.is_empty() {
        out.push(format!("{INDENT}{full} call() => {name}();"));
    } else {
        out.push(format!("{INDENT}{full} call({{"));
        for p in &params {
            out.push(format!("{INDENT}{INDENT}Object? {} = _unset,", p.name));
        }
        out.push(format!("{INDENT}}}) {{"));
        out.push(format!("{INDENT}{INDENT}return {name}("));
        for p in &params {
            let value = format!(
                "identical({0}, _unset) ? _value.{0} : {0} as {1}",
                p.name,
                p.full_type()
            );
            out.push(format!("{INDENT}{INDENT}{INDENT}{},", call_arg(p, &value)));
        }
        out.push(format!("{INDENT}{INDENT});"));
        out.push(format!("{INDENT}}}"));
    }
    out.push("}".to_string());
    out.join("\n")
}

fn generics_args(model: &ClassModel) -> String {
    if model.generics.is_empty() {
        return String::new();
    }
    let args: Vec<&str> = model.generics.iter().map(|g| g.name.as_str()).collect();
    format!("<{}>", args.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_builder::extract_model;

    fn gen(raw: &str, settings: &Settings) -> String {
        let model = extract_model(raw, settings).unwrap();
        generate(&model, settings)
    }

    const PERSON: &str =
        "class Person {\n  final String name;\n  final int? age;\n  Person({required this.name, this.age});\n}";

    #[test]
    fn test_simple_form() {
        let text = gen(PERSON, &Settings::default());
        assert_eq!(
            text,
            "  Person copyWith({\n    String? name,\n    int? age,\n  }) {\n    return Person(\n      name: name ?? this.name,\n      age: age ?? this.age,\n    );\n  }"
        );
    }

    #[test]
    fn test_simple_positional_args() {
        let text = gen(
            "class P {\n  final String a;\n  P(this.a);\n}",
            &Settings::default(),
        );
        assert!(text.contains("      a ?? this.a,"));
        assert!(!text.contains("a: a"));
    }

    #[test]
    fn test_accurate_form_sentinel() {
        let settings = Settings {
            accurate_copy_with: true,
            ..Settings::default()
        };
        let text = gen(PERSON, &settings);
        assert!(text.starts_with("extension PersonCopyWithX on Person {"));
        assert!(text.contains("PersonCopyWith get copyWith => _PersonCopyWithImpl(this);"));
        assert!(text.contains("abstract class PersonCopyWith {"));
        assert!(text.contains("static const Object _unset = Object();"));
        assert!(text.contains("Object? age = _unset,"));
        assert!(text.contains("age: identical(age, _unset) ? _value.age : age as int?,"));
        assert!(text.contains("name: identical(name, _unset) ? _value.name : name as String,"));
    }

    #[test]
    fn test_accurate_method_form() {
        let settings = Settings {
            accurate_copy_with: true,
            copy_with_getter: false,
            ..Settings::default()
        };
        let text = gen(PERSON, &settings);
        assert!(text.contains("PersonCopyWith copyWith() => _PersonCopyWithImpl(this);"));
        assert!(!text.contains("get copyWith"));
    }

    #[test]
    fn test_accurate_generic_class() {
        let settings = Settings {
            accurate_copy_with: true,
            ..Settings::default()
        };
        let text = gen(
            "class Box<T> {\n  final T value;\n  Box({required this.value});\n}",
            &settings,
        );
        assert!(text.contains("extension BoxCopyWithX<T> on Box<T> {"));
        assert!(text.contains("BoxCopyWith<T> get copyWith => _BoxCopyWithImpl<T>(this);"));
        assert!(text.contains("class _BoxCopyWithImpl<T> implements BoxCopyWith<T> {"));
    }
}
