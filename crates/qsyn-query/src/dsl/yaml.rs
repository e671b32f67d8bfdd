//! Minimal YAML → `Shape` parser.
//!
//! Example:
//! ```yaml
//! fields:
//!   - { name: name,   type: string }
//!   - { name: age,    type: number, nullable: true }
//!   - { name: tags,   type: "string[]", optional: true }
//!   - { name: userId, type: objectId }
//! extensions:
//!   name: { $ilike: string }
//!   age:  { $notNull: boolean }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use qsyn_core::id::object_id;
use qsyn_core::schema::{any, boolean, integer, number, object, string, ObjectSchema};
use qsyn_core::{IntoSchema, SchemaExt, SchemaRef};

use crate::shape::{Extensions, Shape};

#[derive(Debug, thiserror::Error)]
pub enum DslError {
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("field `{field}`: unknown type `{ty}`")]
    UnknownType { field: String, ty: String },

    #[error("field `{0}` declared more than once")]
    DuplicateField(String),

    #[error("field `{field}`: operator `{op}` must start with `$`")]
    InvalidOperator { field: String, op: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeDoc {
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub extensions: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct ParsedShape {
    pub shape: Shape,
    pub extensions: Extensions,
    fields: Vec<FieldDef>,
}

impl ParsedShape {
    /// Record schema for the same fields, honoring `optional`; used for `data`.
    pub fn record_schema(&self) -> ObjectSchema {
        self.fields
            .iter()
            .zip(self.shape.fields())
            .fold(object(), |record, (def, (name, schema))| {
                if def.optional {
                    record.field(name.clone(), schema.clone().optional())
                } else {
                    record.field(name.clone(), schema.clone())
                }
            })
    }

    pub fn field_defs(&self) -> &[FieldDef] {
        &self.fields
    }
}

fn parse_type(field: &str, ty: &str) -> Result<SchemaRef, DslError> {
    if let Some(item) = ty.strip_suffix("[]") {
        return Ok(parse_type(field, item)?.array().into_schema());
    }
    let schema = match ty {
        "string" => string().into_schema(),
        "number" => number().into_schema(),
        "integer" => integer().into_schema(),
        "boolean" => boolean().into_schema(),
        "objectId" => object_id().into_schema(),
        "any" => any().into_schema(),
        other => {
            return Err(DslError::UnknownType {
                field: field.to_string(),
                ty: other.to_string(),
            })
        }
    };
    Ok(schema)
}

/// Parse a YAML shape document.
pub fn parse_yaml_shape(yaml_src: &str) -> Result<ParsedShape, DslError> {
    let doc: ShapeDoc = serde_yaml::from_str(yaml_src)?;

    let mut shape = Shape::new();
    for def in &doc.fields {
        if shape.contains(&def.name) {
            return Err(DslError::DuplicateField(def.name.clone()));
        }
        let base = parse_type(&def.name, &def.data_type)?;
        let schema = if def.nullable {
            base.nullable().into_schema()
        } else {
            base
        };
        shape = shape.field(def.name.clone(), schema);
    }

    let mut extensions = Extensions::new();
    for (field, ops) in &doc.extensions {
        for (op, ty) in ops {
            if !op.starts_with('$') {
                return Err(DslError::InvalidOperator {
                    field: field.clone(),
                    op: op.clone(),
                });
            }
            let schema = parse_type(&format!("{field}.{op}"), ty)?;
            extensions = extensions.operator(field.clone(), op.clone(), schema);
        }
    }

    Ok(ParsedShape {
        shape,
        extensions,
        fields: doc.fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsyn_core::Validator;
    use serde_json::json;

    const PEOPLE: &str = r#"
fields:
  - { name: name, type: string }
  - { name: age, type: number, nullable: true }
  - { name: tags, type: "string[]", optional: true }
extensions:
  age: { $notNull: boolean }
"#;

    #[test]
    fn parses_fields_in_order() {
        let parsed = parse_yaml_shape(PEOPLE).unwrap();
        assert_eq!(
            parsed.shape.keys().collect::<Vec<_>>(),
            vec!["name", "age", "tags"]
        );
        assert!(parsed.extensions.for_field("age").is_some());
    }

    #[test]
    fn record_schema_honors_optional_and_nullable() {
        let record = parse_yaml_shape(PEOPLE).unwrap().record_schema();
        assert!(record.validate(&json!({ "name": "Ann", "age": null })).is_ok());
        let err = record.validate(&json!({ "age": 3 })).unwrap_err();
        assert_eq!(err.issues[0].path_string(), "name");
        assert_eq!(err.issues[0].message, "Required");
    }

    #[test]
    fn unknown_type_and_duplicates_are_errors() {
        let err = parse_yaml_shape("fields: [{ name: a, type: date }]").unwrap_err();
        assert!(matches!(err, DslError::UnknownType { ref ty, .. } if ty == "date"));

        let err = parse_yaml_shape(
            "fields: [{ name: a, type: string }, { name: a, type: number }]",
        )
        .unwrap_err();
        assert!(matches!(err, DslError::DuplicateField(ref f) if f == "a"));
    }

    #[test]
    fn extension_operators_need_a_dollar() {
        let err = parse_yaml_shape(
            "fields: [{ name: a, type: string }]\nextensions: { a: { like: string } }",
        )
        .unwrap_err();
        assert!(matches!(err, DslError::InvalidOperator { .. }));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        assert!(matches!(
            parse_yaml_shape("fields: {"),
            Err(DslError::Yaml(_))
        ));
    }
}
