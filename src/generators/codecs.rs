//! Map and JSON codec generation.
//!
//! `toMap`/`fromMap` do the real per-type work, driven by each parameter's
//! resolved type identity; the JSON pair is a thin `json.encode`/
//! `json.decode` wrapper around them. Collection codecs recurse through the
//! element type, one closure variable per nesting level.

use crate::generators::INDENT;
use crate::model::{ClassModel, ParamCategory, Parameter, TypeIdentity};
use crate::settings::Settings;

/// Closure variable names by nesting depth. Three levels cover any
/// collection shape seen in practice; deeper ones reuse the last name.
const DEPTH_VARS: &[&str] = &["x", "y", "z"];

fn depth_var(depth: usize) -> &'static str {
    DEPTH_VARS[depth.min(DEPTH_VARS.len() - 1)]
}

/// Identity of a type text alone, without a parameter context.
fn identity_of(type_text: &str) -> TypeIdentity {
    let mut probe = Parameter::named("_");
    probe.type_text = type_text.trim_end_matches('?').to_string();
    probe.type_identity()
}

fn is_nullable_text(type_text: &str) -> bool {
    type_text.ends_with('?')
}

fn base_of(type_text: &str) -> &str {
    type_text.trim_end_matches('?')
}

fn first_type_argument(type_text: &str) -> String {
    let mut probe = Parameter::named("_");
    probe.type_text = base_of(type_text).to_string();
    probe
        .type_arguments()
        .into_iter()
        .next()
        .unwrap_or_else(|| "dynamic".to_string())
}

fn map_value_argument(type_text: &str) -> String {
    let mut probe = Parameter::named("_");
    probe.type_text = base_of(type_text).to_string();
    let mut args = probe.type_arguments();
    if args.len() >= 2 {
        args.swap_remove(1)
    } else {
        "dynamic".to_string()
    }
}

// --- serialization (model -> map) ------------------------------------------

/// Whether serializing this type is the identity transform.
fn serializes_as_identity(type_text: &str) -> bool {
    matches!(identity_of(type_text), TypeIdentity::Primitive)
}

fn serialize_expr(expr: &str, type_text: &str, settings: &Settings, depth: usize) -> String {
    let nullable = is_nullable_text(type_text);
    let dot = if nullable { "?." } else { "." };
    match identity_of(type_text) {
        TypeIdentity::Primitive => expr.to_string(),
        TypeIdentity::DateTime => format!("{expr}{dot}toIso8601String()"),
        TypeIdentity::BigInt | TypeIdentity::Uri => format!("{expr}{dot}toString()"),
        TypeIdentity::Enum => {
            if settings.supports_enum_by_name() {
                format!("{expr}{dot}name")
            } else {
                format!("{expr}{dot}index")
            }
        }
        TypeIdentity::Unknown => format!("{expr}{dot}toMap()"),
        TypeIdentity::List | TypeIdentity::Set => {
            let elem = first_type_argument(type_text);
            if serializes_as_identity(&elem) {
                if identity_of(type_text) == TypeIdentity::Set {
                    format!("{expr}{dot}toList()")
                } else {
                    expr.to_string()
                }
            } else {
                let var = depth_var(depth);
                let inner = serialize_expr(var, &elem, settings, depth + 1);
                format!("{expr}{dot}map(({var}) => {inner}){dot}toList()")
            }
        }
        TypeIdentity::Map => {
            let value = map_value_argument(type_text);
            if serializes_as_identity(&value) {
                expr.to_string()
            } else {
                let var = depth_var(depth);
                let inner = serialize_expr(var, &value, settings, depth + 1);
                format!("{expr}{dot}map((k, {var}) => MapEntry(k, {inner}))")
            }
        }
    }
}

fn serialize_param(p: &Parameter, settings: &Settings) -> String {
    if p.is_enum {
        let dot = if p.nullable { "?." } else { "." };
        return if settings.supports_enum_by_name() {
            format!("{}{dot}name", p.name)
        } else {
            format!("{}{dot}index", p.name)
        };
    }
    let mut type_text = p.type_text.clone();
    if p.nullable {
        type_text.push('?');
    }
    serialize_expr(&p.name, &type_text, settings, 0)
}

pub fn generate_to_map(model: &ClassModel, settings: &Settings) -> String {
    let params = model.merged_params();
    let mut lines = vec![format!(
        "{INDENT}Map<String, dynamic> toMap() {{\n{INDENT}{INDENT}return {{"
    )];
    for p in &params {
        lines.push(format!(
            "{INDENT}{INDENT}{INDENT}'{}': {},",
            p.map_key(),
            serialize_param(p, settings)
        ));
    }
    lines.push(format!("{INDENT}{INDENT}}};\n{INDENT}}}"));
    lines.join("\n")
}

// --- deserialization (map -> model) ----------------------------------------

fn deserialize_expr(src: &str, type_text: &str, settings: &Settings, depth: usize) -> String {
    let base = base_of(type_text);
    match identity_of(type_text) {
        TypeIdentity::Primitive => format!("{src} as {base}"),
        TypeIdentity::DateTime => format!("DateTime.parse({src} as String)"),
        TypeIdentity::BigInt => format!("BigInt.parse({src} as String)"),
        TypeIdentity::Uri => format!("Uri.parse({src} as String)"),
        TypeIdentity::Enum => deserialize_enum(src, base, settings),
        TypeIdentity::Unknown => format!("{base}.fromMap({src} as Map<String, dynamic>)"),
        TypeIdentity::List => {
            let elem = first_type_argument(type_text);
            if serializes_as_identity(&elem) {
                format!("List<{elem}>.from({src} as List)")
            } else {
                let var = depth_var(depth);
                let inner = deserialize_expr(var, &elem, settings, depth + 1);
                format!("({src} as List).map(({var}) => {inner}).toList()")
            }
        }
        TypeIdentity::Set => {
            let elem = first_type_argument(type_text);
            if serializes_as_identity(&elem) {
                format!("Set<{elem}>.from({src} as List)")
            } else {
                let var = depth_var(depth);
                let inner = deserialize_expr(var, &elem, settings, depth + 1);
                format!("({src} as List).map(({var}) => {inner}).toSet()")
            }
        }
        TypeIdentity::Map => {
            let value = map_value_argument(type_text);
            let key = {
                let mut probe = Parameter::named("_");
                probe.type_text = base.to_string();
                probe
                    .type_arguments()
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| "dynamic".to_string())
            };
            if serializes_as_identity(&value) {
                format!("Map<{key}, {value}>.from({src} as Map)")
            } else {
                let var = depth_var(depth);
                let inner = deserialize_expr(var, &value, settings, depth + 1);
                format!("({src} as Map).map((k, {var}) => MapEntry(k as {key}, {inner}))")
            }
        }
    }
}

fn deserialize_enum(src: &str, enum_type: &str, settings: &Settings) -> String {
    if settings.supports_enum_by_name() {
        format!("{enum_type}.values.byName({src} as String)")
    } else {
        format!("{enum_type}.values[{src} as int]")
    }
}

fn deserialize_param(p: &Parameter, settings: &Settings) -> String {
    let src = format!("map['{}']", p.map_key());
    if p.is_enum {
        let inner = deserialize_enum(&src, &p.type_text, settings);
        if p.nullable {
            return format!("{src} != null ? {inner} : null");
        }
        return inner;
    }

    if p.type_identity() == TypeIdentity::Primitive {
        let mut expr = format!("{src} as {}", p.type_text);
        if p.nullable || p.default_literal.is_some() {
            expr.push('?');
        }
        if let Some(default) = &p.default_literal {
            expr = format!("{expr} ?? {default}");
        }
        return expr;
    }

    let inner = deserialize_expr(&src, &p.type_text, settings, 0);
    if p.nullable {
        format!("{src} != null ? {inner} : null")
    } else {
        inner
    }
}

pub fn generate_from_map(model: &ClassModel, settings: &Settings) -> String {
    let params = model.merged_params();
    let name = &model.name;
    let mut lines = vec![format!(
        "{INDENT}factory {name}.fromMap(Map<String, dynamic> map) {{\n{INDENT}{INDENT}return {name}("
    )];
    for p in &params {
        let value = deserialize_param(p, settings);
        let arg = if p.category == ParamCategory::Named {
            format!("{}: {}", p.name, value)
        } else {
            value
        };
        lines.push(format!("{INDENT}{INDENT}{INDENT}{arg},"));
    }
    lines.push(format!("{INDENT}{INDENT});\n{INDENT}}}"));
    lines.join("\n")
}

// --- JSON wrappers ---------------------------------------------------------

pub fn generate_to_json(_model: &ClassModel) -> String {
    format!("{INDENT}String toJson() => json.encode(toMap());")
}

pub fn generate_from_json(model: &ClassModel) -> String {
    let name = &model.name;
    format!(
        "{INDENT}factory {name}.fromJson(String source) =>\n\
         {INDENT}{INDENT}{INDENT}{name}.fromMap(json.decode(source) as Map<String, dynamic>);"
    )
}
