//! Equality/hash generation.
//!
//! Default mode emits a type-check-and-field-compare `operator ==` plus a
//! hash combinator. Equatable mode emits a `props` list getter instead.
//! Deep mode compares collection-typed members structurally.

use crate::generators::INDENT;
use crate::model::{ClassModel, Parameter, TypeIdentity};
use crate::settings::{EqualityMode, Settings};

pub fn generate(model: &ClassModel, settings: &Settings) -> String {
    match settings.equality_mode {
        EqualityMode::Equatable => generate_props(model),
        EqualityMode::Default => {
            format!("{}\n\n{}", generate_operator(model, settings), generate_hash(model))
        }
    }
}

fn compare_expr(p: &Parameter, deep: bool) -> String {
    if deep {
        let helper = match p.type_identity() {
            TypeIdentity::List => Some("listEquals"),
            TypeIdentity::Set => Some("setEquals"),
            TypeIdentity::Map => Some("mapEquals"),
            _ => None,
        };
        if let Some(helper) = helper {
            return format!("{helper}(other.{0}, {0})", p.name);
        }
    }
    format!("other.{0} == {0}", p.name)
}

fn generate_operator(model: &ClassModel, settings: &Settings) -> String {
    let params = model.merged_params();
    let name = model.type_with_generics();
    let comparisons: Vec<String> = params
        .iter()
        .map(|p| compare_expr(p, settings.deep_equality))
        .collect();

    let one_line_tail = if comparisons.is_empty() {
        format!("other is {name}")
    } else {
        format!("other is {name} && {}", comparisons.join(" && "))
    };

    let return_line = format!("{INDENT}{INDENT}return {one_line_tail};");
    let return_block = if return_line.len() <= settings.line_width {
        return_line
    } else {
        let mut lines = vec![format!("{INDENT}{INDENT}return other is {name} &&")];
        for (i, cmp) in comparisons.iter().enumerate() {
            let tail = if i + 1 == comparisons.len() { ";" } else { " &&" };
            lines.push(format!("{INDENT}{INDENT}{INDENT}{INDENT}{cmp}{tail}"));
        }
        lines.join("\n")
    };

    format!(
        "{INDENT}@override\n\
         {INDENT}bool operator ==(Object other) {{\n\
         {INDENT}{INDENT}if (identical(this, other)) return true;\n\
         \n\
         {return_block}\n\
         {INDENT}}}"
    )
}

fn generate_hash(model: &ClassModel) -> String {
    let params = model.merged_params();
    let expr = match params.len() {
        0 => "runtimeType.hashCode".to_string(),
        1 => format!("{}.hashCode", params[0].name),
        _ => {
            let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
            format!("Object.hash({})", names.join(", "))
        }
    };
    format!("{INDENT}@override\n{INDENT}int get hashCode => {expr};")
}

/// Properties-list getter for an external equality-trait mixin.
fn generate_props(model: &ClassModel) -> String {
    let params = model.merged_params();
    let any_nullable = params.iter().any(|p| p.nullable);
    let element = if any_nullable { "Object?" } else { "Object" };
    let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
    format!(
        "{INDENT}@override\n{INDENT}List<{element}> get props => [{}];",
        names.join(", ")
    )
}
