//! Variant-dispatch extension generation.
//!
//! For enums the extension switches over `this`; for classes whose factory
//! constructors redirect to subclasses it dispatches on the runtime type.
//! Either way the surface is the same: `isX` checkers plus the
//! map/maybeMap/mapOrNull and when/maybeWhen/whenOrNull families.

use crate::generators::{capitalize, INDENT};
use crate::model::{ClassModel, Constructor, Parameter};
use crate::settings::Settings;

pub fn generate(model: &ClassModel, _settings: &Settings) -> String {
    if model.is_enum() {
        generate_enum(model)
    } else {
        generate_sealed(model)
    }
}

const I2: &str = "    ";
const I3: &str = "      ";
const I4: &str = "        ";

// --- enums -----------------------------------------------------------------

fn generate_enum(model: &ClassModel) -> String {
    let name = &model.name;
    let members: Vec<String> = model
        .enum_members()
        .iter()
        .map(|f| f.name.clone())
        .collect();

    let mut out = vec![format!("extension {name}X on {name} {{")];
    for m in &members {
        out.push(format!(
            "{INDENT}bool get is{} => this == {name}.{m};",
            capitalize(m)
        ));
    }

    // map family: callbacks receive the enum value.
    let typed = format!("T Function({name} value)");
    out.push(String::new());
    out.extend(enum_dispatch(name, &members, "map", &typed, DispatchMode::Total, "(this)"));
    out.push(String::new());
    out.extend(enum_dispatch(name, &members, "maybeMap", &typed, DispatchMode::OrElse, "(this)"));
    out.push(String::new());
    out.extend(enum_dispatch(name, &members, "mapOrNull", &typed, DispatchMode::Nullable, "(this)"));

    // when family: nullary callbacks.
    out.push(String::new());
    out.extend(enum_dispatch(name, &members, "when", "T Function()", DispatchMode::Total, "()"));
    out.push(String::new());
    out.extend(enum_dispatch(name, &members, "maybeWhen", "T Function()", DispatchMode::OrElse, "()"));
    out.push(String::new());
    out.extend(enum_dispatch(name, &members, "whenOrNull", "T Function()", DispatchMode::Nullable, "()"));

    out.push("}".to_string());
    out.join("\n")
}

#[derive(Clone, Copy, PartialEq)]
enum DispatchMode {
    /// Every callback required; the switch is exhaustive.
    Total,
    /// Callbacks optional, a required `orElse` fills the gaps.
    OrElse,
    /// Callbacks optional, unmatched cases yield null.
    Nullable,
}

fn enum_dispatch(
    name: &str,
    members: &[String],
    method: &str,
    callback_type: &str,
    mode: DispatchMode,
    call_args: &str,
) -> Vec<String> {
    let return_type = if mode == DispatchMode::Nullable { "T?" } else { "T" };
    let mut out = vec![format!("{INDENT}{return_type} {method}<T>({{")];
    for m in members {
        let line = match mode {
            DispatchMode::Total => format!("{I2}required {callback_type} {m},"),
            _ => format!("{I2}{callback_type}? {m},"),
        };
        out.push(line);
    }
    if mode == DispatchMode::OrElse {
        out.push(format!("{I2}required T Function() orElse,"));
    }
    out.push(format!("{INDENT}}}) {{"));
    out.push(format!("{I2}switch (this) {{"));
    for m in members {
        out.push(format!("{I3}case {name}.{m}:"));
        let body = match mode {
            DispatchMode::Total => format!("return {m}{call_args};"),
            DispatchMode::OrElse => {
                format!("return {m} != null ? {m}{call_args} : orElse();")
            }
            DispatchMode::Nullable => format!("return {m}?.call{call_args};"),
        };
        out.push(format!("{I4}{body}"));
    }
    out.push(format!("{I2}}}"));
    out.push(format!("{INDENT}}}"));
    out
}

// --- sealed-hierarchy-style classes ----------------------------------------

fn generate_sealed(model: &ClassModel) -> String {
    let name = &model.name;
    let variants = model.factory_variants();

    let mut out = vec![format!("extension {name}X on {name} {{")];
    for v in &variants {
        let sub = v.subclass.as_deref().unwrap_or_default();
        out.push(format!(
            "{INDENT}bool get is{} => this is {sub};",
            capitalize(v.variant_name())
        ));
    }

    out.push(String::new());
    out.extend(sealed_dispatch(name, &variants, "map", CallbackShape::Value, DispatchMode::Total));
    out.push(String::new());
    out.extend(sealed_dispatch(name, &variants, "maybeMap", CallbackShape::Value, DispatchMode::OrElse));
    out.push(String::new());
    out.extend(sealed_dispatch(name, &variants, "mapOrNull", CallbackShape::Value, DispatchMode::Nullable));
    out.push(String::new());
    out.extend(sealed_dispatch(name, &variants, "when", CallbackShape::Fields, DispatchMode::Total));
    out.push(String::new());
    out.extend(sealed_dispatch(name, &variants, "maybeWhen", CallbackShape::Fields, DispatchMode::OrElse));
    out.push(String::new());
    out.extend(sealed_dispatch(name, &variants, "whenOrNull", CallbackShape::Fields, DispatchMode::Nullable));
    out.push("}".to_string());
    out.join("\n")
}

#[derive(Clone, Copy, PartialEq)]
enum CallbackShape {
    /// The callback receives the typed subclass instance.
    Value,
    /// The callback receives the factory's parameters positionally.
    Fields,
}

fn callback_signature(v: &Constructor, shape: CallbackShape) -> String {
    match shape {
        CallbackShape::Value => {
            let sub = v.subclass.as_deref().unwrap_or_default();
            format!("T Function({sub} value)")
        }
        CallbackShape::Fields => {
            let params: Vec<String> = v
                .params
                .iter()
                .map(|p: &Parameter| format!("{} {}", p.full_type(), p.name))
                .collect();
            format!("T Function({})", params.join(", "))
        }
    }
}

fn callback_invocation(v: &Constructor, shape: CallbackShape, receiver: &str) -> String {
    match shape {
        CallbackShape::Value => format!("({receiver})"),
        CallbackShape::Fields => {
            let args: Vec<String> = v
                .params
                .iter()
                .map(|p| format!("{receiver}.{}", p.name))
                .collect();
            format!("({})", args.join(", "))
        }
    }
}

fn sealed_dispatch(
    name: &str,
    variants: &[&Constructor],
    method: &str,
    shape: CallbackShape,
    mode: DispatchMode,
) -> Vec<String> {
    let return_type = if mode == DispatchMode::Nullable { "T?" } else { "T" };
    let mut out = vec![format!("{INDENT}{return_type} {method}<T>({{")];
    for v in variants {
        let sig = callback_signature(v, shape);
        let line = match mode {
            DispatchMode::Total => format!("{I2}required {sig} {},", v.variant_name()),
            _ => format!("{I2}{sig}? {},", v.variant_name()),
        };
        out.push(line);
    }
    if mode == DispatchMode::OrElse {
        out.push(format!("{I2}required T Function() orElse,"));
    }
    out.push(format!("{INDENT}}}) {{"));
    out.push(format!("{I2}final value = this;"));
    for v in variants {
        let sub = v.subclass.as_deref().unwrap_or_default();
        let variant = v.variant_name();
        let call = callback_invocation(v, shape, "value");
        out.push(format!("{I2}if (value is {sub}) {{"));
        let body = match mode {
            DispatchMode::Total => format!("return {variant}{call};"),
            DispatchMode::OrElse => format!("return {variant} != null ? {variant}{call} : orElse();"),
            DispatchMode::Nullable => format!("return {variant}?.call{call};"),
        };
        out.push(format!("{I3}{body}"));
        out.push(format!("{I2}}}"));
    }
    let fallthrough = match mode {
        DispatchMode::Total => format!("{I2}throw StateError('Unhandled {name} subtype: $runtimeType');"),
        DispatchMode::OrElse => format!("{I2}return orElse();"),
        DispatchMode::Nullable => format!("{I2}return null;"),
    };
    out.push(fallthrough);
    out.push(format!("{INDENT}}}"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_builder::extract_model;

    fn gen(raw: &str) -> String {
        let settings = Settings::default();
        let model = extract_model(raw, &settings).unwrap();
        generate(&model, &settings)
    }

    #[test]
    fn test_enum_checkers() {
        let text = gen("enum Color { red, green, blue }");
        assert!(text.starts_with("extension ColorX on Color {"));
        assert!(text.contains("bool get isRed => this == Color.red;"));
        assert!(text.contains("bool get isBlue => this == Color.blue;"));
    }

    #[test]
    fn test_enum_map_is_total() {
        let text = gen("enum Color { red, green }");
        assert!(text.contains("T map<T>({"));
        assert!(text.contains("required T Function(Color value) red,"));
        assert!(text.contains("case Color.red:"));
        assert!(text.contains("return red(this);"));
    }

    #[test]
    fn test_enum_maybe_map_or_else() {
        let text = gen("enum Color { red, green }");
        assert!(text.contains("T maybeMap<T>({"));
        assert!(text.contains("T Function(Color value)? red,"));
        assert!(text.contains("required T Function() orElse,"));
        assert!(text.contains("return red != null ? red(this) : orElse();"));
    }

    #[test]
    fn test_enum_when_family_nullary() {
        let text = gen("enum Color { red, green }");
        assert!(text.contains("T when<T>({"));
        assert!(text.contains("required T Function() red,"));
        assert!(text.contains("return red();"));
        assert!(text.contains("T? whenOrNull<T>({"));
        assert!(text.contains("return red?.call();"));
    }

    #[test]
    fn test_sealed_checkers_and_map() {
        let text = gen(
            "abstract class Result {\n  const Result();\n  factory Result.ok(int value) = Ok;\n  factory Result.err(String message) = Err;\n}",
        );
        assert!(text.starts_with("extension ResultX on Result {"));
        assert!(text.contains("bool get isOk => this is Ok;"));
        assert!(text.contains("bool get isErr => this is Err;"));
        assert!(text.contains("required T Function(Ok value) ok,"));
        assert!(text.contains("if (value is Ok) {"));
        assert!(text.contains("return ok(value);"));
        assert!(text.contains("throw StateError('Unhandled Result subtype: $runtimeType');"));
    }

    #[test]
    fn test_sealed_when_receives_fields() {
        let text = gen(
            "abstract class Result {\n  const Result();\n  factory Result.ok(int value, String label) = Ok;\n}",
        );
        assert!(text.contains("required T Function(int value, String label) ok,"));
        assert!(text.contains("return ok(value.value, value.label);"));
    }

    #[test]
    fn test_sealed_or_else_fallthrough() {
        let text = gen(
            "abstract class Result {\n  const Result();\n  factory Result.ok(int value) = Ok;\n}",
        );
        assert!(text.contains("T maybeMap<T>({"));
        assert!(text.contains("return ok != null ? ok(value) : orElse();"));
        assert!(text.contains("return orElse();"));
        assert!(text.contains("T? mapOrNull<T>({"));
        assert!(text.contains("return ok?.call(value);"));
        assert!(text.contains("return null;"));
    }
}
