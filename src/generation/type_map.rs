//! Translation of OpenAPI schemas into Rust types
//!
//! `TypeMap` is the only place that decides what Rust type a schema becomes.
//! It also remembers which `$ref` produced which generated class, so the same
//! reference resolves to the same class for the whole run.

use indexmap::{IndexMap, IndexSet};
use openapiv3::{
    IntegerFormat, NumberFormat, OpenAPI, ReferenceOr, Schema, SchemaKind as OpenApiSchemaKind,
    Type, VariantOrUnknownOrEmpty,
};
use serde::Serialize;
use std::fmt;

use super::errors::GenerationError;
use super::sanitizers::Sanitize;
use super::types::{ClassName, Namespace};

/// Prefix of references that name a reusable schema
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Scalar and untyped container types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    String,
    I32,
    I64,
    F32,
    F64,
    Boolean,
    /// Free-form object
    Object,
    /// Array items without a schema
    Any,
}

impl Primitive {
    pub fn rust_type(&self) -> &'static str {
        match self {
            Primitive::String => "String",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Boolean => "bool",
            Primitive::Object => "serde_json::Map<String, serde_json::Value>",
            Primitive::Any => "serde_json::Value",
        }
    }
}

/// The Rust type a schema resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum ResolvedType {
    Primitive(Primitive),
    Array(Box<ResolvedType>),
    Class(ClassName),
}

impl ResolvedType {
    pub fn array_of(inner: ResolvedType) -> Self {
        Self::Array(Box::new(inner))
    }

    /// Short Rust spelling with classes by short name, for messages and docs.
    pub fn rust_type(&self) -> String {
        match self {
            ResolvedType::Primitive(p) => p.rust_type().to_string(),
            ResolvedType::Array(inner) => format!("Vec<{}>", inner.rust_type()),
            ResolvedType::Class(class) => class.short_name.clone(),
        }
    }

    /// Rust spelling for generated source, with classes by crate path so they
    /// can never clash with the names declared in the file using them.
    pub fn crate_type(&self) -> String {
        match self {
            ResolvedType::Primitive(p) => p.rust_type().to_string(),
            ResolvedType::Array(inner) => format!("Vec<{}>", inner.crate_type()),
            ResolvedType::Class(class) => class.crate_path(),
        }
    }

    /// Element type of an array
    pub fn element(&self) -> Option<&ResolvedType> {
        match self {
            ResolvedType::Array(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn class(&self) -> Option<&ClassName> {
        match self {
            ResolvedType::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Every generated class mentioned anywhere in this type
    pub fn classes(&self) -> Vec<&ClassName> {
        match self {
            ResolvedType::Primitive(_) => Vec::new(),
            ResolvedType::Array(inner) => inner.classes(),
            ResolvedType::Class(class) => vec![class],
        }
    }
}

impl fmt::Display for ResolvedType {
    /// Fully-qualified spelling, the key used by `TypeMap::class_from_type`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Primitive(p) => f.write_str(p.rust_type()),
            ResolvedType::Array(inner) => write!(f, "Vec<{inner}>"),
            ResolvedType::Class(class) => write!(f, "{class}"),
        }
    }
}

/// The schema kinds the engine understands, as a closed set
#[derive(Debug, Clone)]
pub enum SchemaKind<'s> {
    String,
    Integer { int32: bool },
    Number { float: bool },
    Boolean,
    Array(Option<&'s ReferenceOr<Box<Schema>>>),
    Object(ObjectShape<'s>),
}

/// Properties of an object schema in declaration order
#[derive(Debug, Clone)]
pub struct ObjectShape<'s> {
    pub properties: Vec<(&'s str, &'s ReferenceOr<Box<Schema>>)>,
    pub required: &'s [String],
}

impl ObjectShape<'_> {
    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }
}

impl<'s> SchemaKind<'s> {
    /// Classifies a parsed schema, rejecting composites and untyped schemas.
    pub fn of(schema: &'s Schema) -> Result<Self, GenerationError> {
        match &schema.schema_kind {
            OpenApiSchemaKind::Type(Type::String(_)) => Ok(SchemaKind::String),
            OpenApiSchemaKind::Type(Type::Integer(i)) => Ok(SchemaKind::Integer {
                int32: matches!(i.format, VariantOrUnknownOrEmpty::Item(IntegerFormat::Int32)),
            }),
            OpenApiSchemaKind::Type(Type::Number(n)) => Ok(SchemaKind::Number {
                float: matches!(n.format, VariantOrUnknownOrEmpty::Item(NumberFormat::Float)),
            }),
            OpenApiSchemaKind::Type(Type::Boolean(_)) => Ok(SchemaKind::Boolean),
            OpenApiSchemaKind::Type(Type::Array(a)) => Ok(SchemaKind::Array(a.items.as_ref())),
            OpenApiSchemaKind::Type(Type::Object(o)) => Ok(SchemaKind::Object(ObjectShape {
                properties: o.properties.iter().map(|(k, v)| (k.as_str(), v)).collect(),
                required: &o.required,
            })),
            OpenApiSchemaKind::Any(any) => match any.typ.as_deref() {
                Some("string") => Ok(SchemaKind::String),
                Some("integer") => Ok(SchemaKind::Integer {
                    int32: any.format.as_deref() == Some("int32"),
                }),
                Some("number") => Ok(SchemaKind::Number {
                    float: any.format.as_deref() == Some("float"),
                }),
                Some("boolean") => Ok(SchemaKind::Boolean),
                Some("array") => Ok(SchemaKind::Array(any.items.as_ref())),
                Some("object") => Ok(SchemaKind::Object(ObjectShape {
                    properties: any.properties.iter().map(|(k, v)| (k.as_str(), v)).collect(),
                    required: &any.required,
                })),
                None if !any.properties.is_empty() => Ok(SchemaKind::Object(ObjectShape {
                    properties: any.properties.iter().map(|(k, v)| (k.as_str(), v)).collect(),
                    required: &any.required,
                })),
                Some(other) => Err(GenerationError::generator(format!(
                    "unsupported schema type `{other}`"
                ))),
                None => Err(GenerationError::generator("schema declares no type")),
            },
            OpenApiSchemaKind::OneOf { .. } => Err(unsupported("oneOf")),
            OpenApiSchemaKind::AllOf { .. } => Err(unsupported("allOf")),
            OpenApiSchemaKind::AnyOf { .. } => Err(unsupported("anyOf")),
            OpenApiSchemaKind::Not { .. } => Err(unsupported("not")),
        }
    }
}

fn unsupported(kind: &str) -> GenerationError {
    GenerationError::generator(format!("unsupported schema kind `{kind}`"))
}

/// Registry of schema-to-type bindings for one generation run
#[derive(Debug, Clone)]
pub struct TypeMap {
    sanitize: Sanitize,
    models: Namespace,
    schema_names: IndexSet<String>,
    by_reference: IndexMap<String, ClassName>,
    by_type: IndexMap<String, ClassName>,
}

impl TypeMap {
    /// Creates a map whose classes live in `models` and which accepts
    /// references to the given component schema names.
    pub fn new(
        sanitize: Sanitize,
        models: Namespace,
        schema_names: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            sanitize,
            models,
            schema_names: schema_names.into_iter().collect(),
            by_reference: IndexMap::new(),
            by_type: IndexMap::new(),
        }
    }

    /// Creates a map that knows every schema under `components.schemas`.
    pub fn for_spec(spec: &OpenAPI, sanitize: Sanitize, models: Namespace) -> Self {
        let names = spec
            .components
            .iter()
            .flat_map(|c| c.schemas.keys().cloned())
            .collect::<Vec<_>>();
        Self::new(sanitize, models, names)
    }

    pub fn models_namespace(&self) -> &Namespace {
        &self.models
    }

    /// Resolves a schema or reference.
    pub fn type_from_schema(
        &mut self,
        schema: &ReferenceOr<Schema>,
    ) -> Result<ResolvedType, GenerationError> {
        match schema {
            ReferenceOr::Reference { reference } => self.type_from_reference(reference),
            ReferenceOr::Item(schema) => self.type_from_inline(schema),
        }
    }

    /// Resolves the boxed form used for properties and array items.
    pub fn type_from_boxed_schema(
        &mut self,
        schema: &ReferenceOr<Box<Schema>>,
    ) -> Result<ResolvedType, GenerationError> {
        match schema {
            ReferenceOr::Reference { reference } => self.type_from_reference(reference),
            ReferenceOr::Item(schema) => self.type_from_inline(schema),
        }
    }

    /// Resolves `#/components/schemas/Name` to the class generated for `Name`.
    pub fn type_from_reference(&mut self, reference: &str) -> Result<ResolvedType, GenerationError> {
        if let Some(class) = self.by_reference.get(reference) {
            return Ok(ResolvedType::Class(class.clone()));
        }

        let name = reference.strip_prefix(SCHEMA_REF_PREFIX).ok_or_else(|| {
            GenerationError::generator(format!("unsupported reference `{reference}`"))
        })?;
        if !self.schema_names.contains(name) {
            return Err(GenerationError::generator(format!(
                "could not resolve type for reference `{reference}`"
            )));
        }

        let class = self.class_for_schema(name)?;
        Ok(ResolvedType::Class(class))
    }

    /// Registers (or looks up) the class generated for component schema `name`.
    pub fn class_for_schema(&mut self, name: &str) -> Result<ClassName, GenerationError> {
        let reference = format!("{SCHEMA_REF_PREFIX}{name}");
        if let Some(class) = self.by_reference.get(&reference) {
            return Ok(class.clone());
        }

        let short_name = self.sanitize.clean(name);
        if short_name.is_empty() {
            return Err(GenerationError::generator(format!(
                "schema name `{name}` does not produce an identifier"
            )));
        }
        let class = ClassName::new(self.models.clone(), short_name);
        let key = class.to_string();

        if self.by_type.contains_key(&key) {
            let other = self
                .by_reference
                .iter()
                .find(|(_, c)| **c == class)
                .map(|(r, _)| r.as_str())
                .unwrap_or("another schema");
            return Err(GenerationError::generator(format!(
                "`{reference}` and `{other}` both map to class `{key}`"
            )));
        }

        tracing::debug!(reference = %reference, class = %key, "Registered schema class");
        self.by_type.insert(key, class.clone());
        self.by_reference.insert(reference, class.clone());
        Ok(class)
    }

    /// Resolves an inline schema through the kind dispatch table.
    pub fn type_from_inline(&mut self, schema: &Schema) -> Result<ResolvedType, GenerationError> {
        match SchemaKind::of(schema)? {
            SchemaKind::String => Ok(ResolvedType::Primitive(Primitive::String)),
            SchemaKind::Integer { int32: true } => Ok(ResolvedType::Primitive(Primitive::I32)),
            SchemaKind::Integer { int32: false } => Ok(ResolvedType::Primitive(Primitive::I64)),
            SchemaKind::Number { float: true } => Ok(ResolvedType::Primitive(Primitive::F32)),
            SchemaKind::Number { float: false } => Ok(ResolvedType::Primitive(Primitive::F64)),
            SchemaKind::Boolean => Ok(ResolvedType::Primitive(Primitive::Boolean)),
            SchemaKind::Array(Some(items)) => {
                Ok(ResolvedType::array_of(self.type_from_boxed_schema(items)?))
            }
            SchemaKind::Array(None) => Ok(ResolvedType::array_of(ResolvedType::Primitive(
                Primitive::Any,
            ))),
            SchemaKind::Object(_) => Ok(ResolvedType::Primitive(Primitive::Object)),
        }
    }

    /// Reverse lookup: the generated class a fully-qualified type name denotes.
    pub fn class_from_type(&self, type_name: &str) -> Option<&ClassName> {
        self.by_type.get(type_name)
    }

    /// References resolved so far, in resolution order
    pub fn registered(&self) -> impl Iterator<Item = (&str, &ClassName)> {
        self.by_reference.iter().map(|(r, c)| (r.as_str(), c))
    }
}
