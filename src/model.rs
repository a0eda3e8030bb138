//! Structured representation of one parsed class/enum declaration.
//!
//! A model is derived fresh from the current text snapshot on every
//! extraction request and discarded after one use. It is never mutated
//! incrementally; merge steps go through explicit copy-with-override
//! builders instead.

use serde::{Deserialize, Serialize};

use crate::bracket_utils::split_respecting_brackets;
use crate::settings::Settings;

/// Declaration kind of the parsed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassKind {
    Class,
    AbstractClass,
    /// Bare identifier member list.
    Enum,
    /// Every member supplies constructor-call arguments.
    EnhancedEnum,
}

/// Category of a constructor/field parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamCategory {
    Required,
    /// Optional, inside a `{...}` block.
    Named,
    /// Optional, inside a `[...]` block.
    Positional,
}

/// Resolved category of a declared type, driving codec generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeIdentity {
    Primitive,
    DateTime,
    BigInt,
    Uri,
    List,
    Set,
    Map,
    Enum,
    /// Not resolvable from the declaration alone; codecs treat it as a
    /// nested model with its own fromMap/toMap.
    Unknown,
}

const PRIMITIVES: &[&str] = &["int", "double", "num", "bool", "String", "dynamic", "Object"];

/// One parsed constructor/field parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Declared type text, including generic arguments, without a trailing `?`.
    /// Empty when the declaration carries no type (e.g. a bare `this.id`).
    pub type_text: String,
    pub nullable: bool,
    /// Nullability was written explicitly (`Type?`) rather than inferred
    /// from the presence of a default value.
    pub explicit_nullable: bool,
    pub required: bool,
    pub category: ParamCategory,
    /// Default value expression as written, `const` prefix preserved.
    pub default_value: Option<String>,
    /// Default literal without any `const` prefix, used for comparisons.
    pub default_literal: Option<String>,
    pub is_final: bool,
    /// Forwarded from the superclass (`super.name`).
    pub from_super: bool,
    /// Backed by a computed getter rather than an instance variable.
    pub is_getter: bool,
    pub is_enum: bool,
    /// Known variant names when `is_enum` is set.
    pub enum_values: Vec<String>,
    /// External serialization key. Falls back to the parameter name.
    pub key: Option<String>,
}

impl Parameter {
    /// A parameter with only a name; everything else starts unset.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_text: String::new(),
            nullable: false,
            explicit_nullable: false,
            required: false,
            category: ParamCategory::Required,
            default_value: None,
            default_literal: None,
            is_final: false,
            from_super: false,
            is_getter: false,
            is_enum: false,
            enum_values: Vec::new(),
            key: None,
        }
    }

    /// The external serialization key, defaulting to the parameter name.
    pub fn map_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// Declared type with the nullability suffix re-applied.
    pub fn full_type(&self) -> String {
        if self.nullable {
            format!("{}?", self.type_text)
        } else {
            self.type_text.clone()
        }
    }

    /// Generic argument list of the declared type, split at top level.
    /// `Map<String, List<int>>` yields `["String", "List<int>"]`.
    pub fn type_arguments(&self) -> Vec<String> {
        let t = &self.type_text;
        let open = match t.find('<') {
            Some(i) => i,
            None => return Vec::new(),
        };
        let close = match t.rfind('>') {
            Some(i) if i > open => i,
            _ => return Vec::new(),
        };
        split_respecting_brackets(&t[open + 1..close], ',')
    }

    /// Base type name without generic arguments: `List<int>` -> `List`.
    pub fn base_type(&self) -> &str {
        match self.type_text.find('<') {
            Some(i) => &self.type_text[..i],
            None => &self.type_text,
        }
    }

    /// Resolve the type identity from the declared type text.
    pub fn type_identity(&self) -> TypeIdentity {
        if self.is_enum {
            return TypeIdentity::Enum;
        }
        match self.base_type() {
            t if PRIMITIVES.contains(&t) => TypeIdentity::Primitive,
            "DateTime" => TypeIdentity::DateTime,
            "BigInt" => TypeIdentity::BigInt,
            "Uri" => TypeIdentity::Uri,
            "List" => TypeIdentity::List,
            "Set" => TypeIdentity::Set,
            "Map" => TypeIdentity::Map,
            _ => TypeIdentity::Unknown,
        }
    }

    /// Whether the declared type is a collection (list, set or map).
    pub fn is_collection(&self) -> bool {
        matches!(
            self.type_identity(),
            TypeIdentity::List | TypeIdentity::Set | TypeIdentity::Map
        )
    }

    pub fn is_optional(&self) -> bool {
        matches!(self.category, ParamCategory::Named | ParamCategory::Positional)
    }

    /// Copy-with-override merge: attributes already set on `self` are never
    /// overwritten; only genuinely missing ones are filled from `source`.
    pub fn merged_with(&self, source: &Parameter) -> Parameter {
        let mut out = self.clone();
        if out.type_text.is_empty() {
            out.type_text = source.type_text.clone();
            out.nullable = out.nullable || source.nullable;
            out.explicit_nullable = out.explicit_nullable || source.explicit_nullable;
        }
        if out.default_value.is_none() {
            out.default_value = source.default_value.clone();
            out.default_literal = source.default_literal.clone();
        }
        out.is_final = out.is_final || source.is_final;
        out.is_getter = out.is_getter || source.is_getter;
        if !out.is_enum && source.is_enum {
            out.is_enum = true;
            out.enum_values = source.enum_values.clone();
        }
        // Once set, merges never clear the external key.
        if out.key.is_none() {
            out.key = source.key.clone();
        }
        out
    }
}

/// Member kind of a field entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Instance variable declaration.
    Instance,
    /// Computed getter.
    Getter,
    /// Member of an enum declaration.
    EnumMember,
    /// Hint-only entry marking the next member as enum-typed.
    EnumHint,
}

/// One declared member of the class or enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub param: Parameter,
    pub is_private: bool,
    pub is_const: bool,
}

/// Constructor/variant kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructorKind {
    /// The canonical, body-defining constructor.
    Generative,
    /// `ClassName.name(...)` with a generative body.
    Named,
    /// `factory ClassName.name(...)`.
    Factory,
    /// `factory ClassName(...)`.
    UnnamedFactory,
}

/// A constructor or factory variant of the owning class.
///
/// Holds the owning class by name only; constructors never reference the
/// model back, so no cycle is materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    pub kind: ConstructorKind,
    /// Display name as written: `ClassName` or `ClassName.variant`.
    pub display_name: String,
    pub class_name: String,
    pub params: Vec<Parameter>,
    pub is_const: bool,
    pub is_private: bool,
    /// For factory variants without a body expression: the subclass
    /// representing one branch of a sealed-hierarchy-style type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subclass: Option<String>,
}

impl Constructor {
    /// Variant name after the dot, or the class name for unnamed constructors.
    pub fn variant_name(&self) -> &str {
        match self.display_name.split_once('.') {
            Some((_, v)) => v,
            None => &self.display_name,
        }
    }
}

/// A generic type parameter with an optional bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericParam {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound: Option<String>,
}

/// The structured representation of one parsed class/enum declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassModel {
    pub name: String,
    pub generics: Vec<GenericParam>,
    pub kind: ClassKind,
    pub fields: Vec<Field>,
    pub constructors: Vec<Constructor>,
    pub settings: Settings,
}

impl ClassModel {
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, ClassKind::Enum | ClassKind::EnhancedEnum)
    }

    pub fn is_abstract(&self) -> bool {
        self.kind == ClassKind::AbstractClass
    }

    /// Type name with generic arguments re-applied: `Result<T, E>`.
    pub fn type_with_generics(&self) -> String {
        if self.generics.is_empty() {
            return self.name.clone();
        }
        let args: Vec<&str> = self.generics.iter().map(|g| g.name.as_str()).collect();
        format!("{}<{}>", self.name, args.join(", "))
    }

    /// The canonical generative constructor. Exactly one is canonical per
    /// class; the first one found wins.
    pub fn generative_constructor(&self) -> Option<&Constructor> {
        self.constructors
            .iter()
            .find(|c| c.kind == ConstructorKind::Generative)
    }

    /// Factory variants representing branches of a sealed-hierarchy-style type.
    pub fn factory_variants(&self) -> Vec<&Constructor> {
        self.constructors
            .iter()
            .filter(|c| c.subclass.is_some())
            .collect()
    }

    /// Fields that are enum members (for enum declarations).
    pub fn enum_members(&self) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::EnumMember)
            .collect()
    }

    /// Instance fields and getters that participate in generation.
    pub fn data_fields(&self) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Instance | FieldKind::Getter))
            .collect()
    }

    /// The authoritative parameter list: the generative constructor's
    /// parameters merged with field data, falling back to the fields
    /// themselves when no generative constructor exists.
    pub fn merged_params(&self) -> Vec<Parameter> {
        match self.generative_constructor() {
            Some(ctor) => ctor.params.clone(),
            None => self
                .data_fields()
                .iter()
                .map(|f| f.param.clone())
                .collect(),
        }
    }

    /// Whether every merged parameter is final (drives the `const` prefix).
    pub fn all_params_final(&self) -> bool {
        let params = self.merged_params();
        !params.is_empty() && params.iter().all(|p| p.is_final)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, type_text: &str) -> Parameter {
        let mut p = Parameter::named(name);
        p.type_text = type_text.to_string();
        p
    }

    #[test]
    fn test_map_key_falls_back_to_name() {
        let p = param("password", "String");
        assert_eq!(p.map_key(), "password");
    }

    #[test]
    fn test_map_key_explicit() {
        let mut p = param("userName", "String");
        p.key = Some("user_name".to_string());
        assert_eq!(p.map_key(), "user_name");
    }

    #[test]
    fn test_type_identity_resolution() {
        assert_eq!(param("a", "int").type_identity(), TypeIdentity::Primitive);
        assert_eq!(param("a", "String").type_identity(), TypeIdentity::Primitive);
        assert_eq!(param("a", "DateTime").type_identity(), TypeIdentity::DateTime);
        assert_eq!(param("a", "BigInt").type_identity(), TypeIdentity::BigInt);
        assert_eq!(param("a", "Uri").type_identity(), TypeIdentity::Uri);
        assert_eq!(param("a", "List<int>").type_identity(), TypeIdentity::List);
        assert_eq!(param("a", "Set<String>").type_identity(), TypeIdentity::Set);
        assert_eq!(
            param("a", "Map<String, List<int>>").type_identity(),
            TypeIdentity::Map
        );
        assert_eq!(param("a", "Address").type_identity(), TypeIdentity::Unknown);
    }

    #[test]
    fn test_type_arguments_nested() {
        let p = param("data", "Map<String, List<int>>");
        assert_eq!(p.type_arguments(), vec!["String", "List<int>"]);
    }

    #[test]
    fn test_merge_never_overwrites_explicit() {
        let mut own = param("id", "int");
        own.key = Some("user_id".to_string());
        let mut source = param("id", "String");
        source.key = Some("other".to_string());
        source.default_value = Some("''".to_string());

        let merged = own.merged_with(&source);
        assert_eq!(merged.type_text, "int");
        assert_eq!(merged.key.as_deref(), Some("user_id"));
        assert_eq!(merged.default_value.as_deref(), Some("''"));
    }

    #[test]
    fn test_merge_backfills_type() {
        let own = Parameter::named("id");
        let mut source = param("id", "int");
        source.is_final = true;
        let merged = own.merged_with(&source);
        assert_eq!(merged.type_text, "int");
        assert!(merged.is_final);
    }

    #[test]
    fn test_type_with_generics() {
        let model = ClassModel {
            name: "Result".to_string(),
            generics: vec![
                GenericParam { name: "T".to_string(), bound: None },
                GenericParam {
                    name: "E".to_string(),
                    bound: Some("Object".to_string()),
                },
            ],
            kind: ClassKind::Class,
            fields: vec![],
            constructors: vec![],
            settings: Settings::default(),
        };
        assert_eq!(model.type_with_generics(), "Result<T, E>");
    }
}
