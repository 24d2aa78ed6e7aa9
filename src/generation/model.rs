//! Model class generation from `components.schemas`

use openapiv3::{ReferenceOr, Schema};

use super::errors::GenerationError;
use super::sanitizers::Sanitize;
use super::type_map::{ObjectShape, SchemaKind, TypeMap};
use super::types::{ClassKind, ClassProperty, GeneratedClass, ModelShape};

/// Builds model classes for reusable schemas
pub struct ModelGenerator<'a> {
    sanitize: &'a Sanitize,
}

impl<'a> ModelGenerator<'a> {
    pub fn new(sanitize: &'a Sanitize) -> Self {
        Self { sanitize }
    }

    /// Generates the class for component schema `name`.
    ///
    /// Object schemas become structs; anything else becomes a type alias.
    pub fn generate(
        &self,
        name: &str,
        schema: &ReferenceOr<Schema>,
        type_map: &mut TypeMap,
    ) -> Result<GeneratedClass, GenerationError> {
        let source = format!("#/components/schemas/{name}");
        let class_name = type_map.class_for_schema(name)?;

        let inline = match schema {
            ReferenceOr::Reference { .. } => {
                let target = type_map.type_from_schema(schema)?;
                if target.class() == Some(&class_name) {
                    return Err(GenerationError::generator("schema aliases itself"));
                }
                let mut class = GeneratedClass::new(
                    class_name,
                    ClassKind::Model(ModelShape::Alias(target.clone())),
                    source,
                );
                class.add_uses_of(&target);
                return Ok(class);
            }
            ReferenceOr::Item(inline) => inline,
        };

        let mut class = match SchemaKind::of(inline)? {
            SchemaKind::Object(shape) if !shape.properties.is_empty() => {
                let mut class = GeneratedClass::new(
                    class_name,
                    ClassKind::Model(ModelShape::Struct),
                    source,
                );
                class.properties = self.properties(&shape, &class, type_map)?;
                let property_types: Vec<_> = class.properties.iter().map(|p| p.ty.clone()).collect();
                for ty in &property_types {
                    class.add_uses_of(ty);
                }
                class
            }
            _ => {
                let target = type_map.type_from_inline(inline)?;
                if target.class() == Some(&class_name) {
                    return Err(GenerationError::generator("schema aliases itself"));
                }
                let mut class = GeneratedClass::new(
                    class_name,
                    ClassKind::Model(ModelShape::Alias(target.clone())),
                    source,
                );
                class.add_uses_of(&target);
                class
            }
        };

        class.description = self.sanitize.description(
            inline
                .schema_data
                .description
                .as_deref()
                .or(inline.schema_data.title.as_deref()),
        );
        Ok(class)
    }

    fn properties(
        &self,
        shape: &ObjectShape<'_>,
        class: &GeneratedClass,
        type_map: &mut TypeMap,
    ) -> Result<Vec<ClassProperty>, GenerationError> {
        let mut properties: Vec<ClassProperty> = Vec::with_capacity(shape.properties.len());
        for (wire_name, schema) in &shape.properties {
            let ty = type_map
                .type_from_boxed_schema(schema)
                .map_err(|e| e.at(&format!("property `{wire_name}`")))?;

            let name = self.sanitize.field_name(wire_name);
            if name.is_empty() {
                return Err(GenerationError::generator(format!(
                    "property `{wire_name}` does not produce an identifier"
                )));
            }
            if let Some(other) = properties.iter().find(|p| p.name == name) {
                return Err(GenerationError::generator(format!(
                    "properties `{}` and `{wire_name}` both map to field `{name}`",
                    other.wire_name
                )));
            }

            let description = match schema {
                ReferenceOr::Item(inline) => self
                    .sanitize
                    .description(inline.schema_data.description.as_deref()),
                ReferenceOr::Reference { .. } => None,
            };

            properties.push(ClassProperty {
                boxed: ty.class() == Some(&class.name),
                required: shape.is_required(wire_name),
                wire_name: wire_name.to_string(),
                name,
                ty,
                description,
            });
        }
        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::type_map::{Primitive, ResolvedType};
    use crate::generation::types::Namespace;
    use serde_json::json;

    fn generate(name: &str, schema: serde_json::Value) -> Result<GeneratedClass, GenerationError> {
        let sanitize = Sanitize::new();
        let mut type_map = TypeMap::new(
            sanitize,
            Namespace::parse("api::models"),
            ["Widget", "Node", "Tag", "Tags", "Loop"].map(String::from),
        );
        let schema: ReferenceOr<Schema> = serde_json::from_value(schema).unwrap();
        ModelGenerator::new(&sanitize).generate(name, &schema, &mut type_map)
    }

    #[test]
    fn test_object_schema_becomes_struct() {
        let class = generate(
            "Widget",
            json!({
                "type": "object",
                "description": "A <b>widget</b>",
                "required": ["id"],
                "properties": {
                    "id": {"type": "integer", "format": "int64"},
                    "displayName": {"type": "string", "description": "Shown to users"},
                    "type": {"type": "string"},
                    "tags": {"type": "array", "items": {"$ref": "#/components/schemas/Tag"}}
                }
            }),
        )
        .unwrap();

        assert_eq!(class.qualified_name(), "api::models::Widget");
        assert_eq!(class.kind, ClassKind::Model(ModelShape::Struct));
        assert_eq!(class.description.as_deref(), Some("A widget"));

        let names: Vec<_> = class.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["id", "display_name", "type_", "tags"]);
        assert!(class.properties[0].required);
        assert!(!class.properties[1].required);
        assert_eq!(class.properties[1].wire_name, "displayName");
        assert_eq!(
            class.properties[1].description.as_deref(),
            Some("Shown to users")
        );
        assert_eq!(class.properties[3].ty.rust_type(), "Vec<Tag>");
        assert_eq!(class.uses.len(), 1);
    }

    #[test]
    fn test_self_reference_is_boxed_and_not_imported() {
        let class = generate(
            "Node",
            json!({
                "type": "object",
                "properties": {
                    "next": {"$ref": "#/components/schemas/Node"},
                    "children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}}
                }
            }),
        )
        .unwrap();
        assert!(class.properties[0].boxed);
        assert!(!class.properties[1].boxed);
        assert!(class.uses.is_empty());
    }

    #[test]
    fn test_scalar_and_array_schemas_become_aliases() {
        let class = generate("Tag", json!({"type": "string"})).unwrap();
        assert_eq!(
            class.kind,
            ClassKind::Model(ModelShape::Alias(ResolvedType::Primitive(Primitive::String)))
        );

        let class = generate(
            "Tags",
            json!({"type": "array", "items": {"$ref": "#/components/schemas/Tag"}}),
        )
        .unwrap();
        assert!(matches!(
            &class.kind,
            ClassKind::Model(ModelShape::Alias(ResolvedType::Array(_)))
        ));
        assert_eq!(class.uses.len(), 1);
    }

    #[test]
    fn test_reference_schema_becomes_alias() {
        let class = generate("Widget", json!({"$ref": "#/components/schemas/Node"})).unwrap();
        assert!(matches!(
            &class.kind,
            ClassKind::Model(ModelShape::Alias(ResolvedType::Class(c))) if c.short_name == "Node"
        ));
    }

    #[test]
    fn test_empty_object_becomes_map_alias() {
        let class = generate("Widget", json!({"type": "object"})).unwrap();
        assert_eq!(
            class.kind,
            ClassKind::Model(ModelShape::Alias(ResolvedType::Primitive(Primitive::Object)))
        );
    }

    #[test]
    fn test_composites_and_field_collisions_fail() {
        let err = generate("Widget", json!({"allOf": [{"type": "object"}]})).unwrap_err();
        assert!(err.to_string().contains("allOf"));

        let err = generate(
            "Widget",
            json!({
                "type": "object",
                "properties": {"userId": {"type": "string"}, "user_id": {"type": "string"}}
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("both map to field `user_id`"));

        let err = generate("Loop", json!({"$ref": "#/components/schemas/Missing"})).unwrap_err();
        assert!(matches!(err, GenerationError::GeneratorError(_)));

        let err = generate("Loop", json!({"$ref": "#/components/schemas/Loop"})).unwrap_err();
        assert!(err.to_string().contains("aliases itself"));
    }
}
