//! Record shapes and per-field operator extensions: the build-time inputs of
//! query-schema composition.

use qsyn_core::schema::ObjectSchema;
use qsyn_core::{IntoSchema, SchemaRef};

/// Ordered mapping of field name to field validator.
///
/// Names are unique; declaring a name twice replaces the validator but keeps
/// the original position.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    fields: Vec<(String, SchemaRef)>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, schema: impl IntoSchema) -> Self {
        let name = name.into();
        let schema = schema.into_schema();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = schema,
            None => self.fields.push((name, schema)),
        }
        self
    }

    pub fn fields(&self) -> &[(String, SchemaRef)] {
        &self.fields
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<&ObjectSchema> for Shape {
    fn from(schema: &ObjectSchema) -> Self {
        Self {
            fields: schema.fields().to_vec(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, SchemaRef)> for Shape {
    fn from_iter<I: IntoIterator<Item = (K, SchemaRef)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Shape::new(), |shape, (name, schema)| shape.field(name, schema))
    }
}

/// Sparse field name → (operator name → operand validator) map.
#[derive(Debug, Clone, Default)]
pub struct Extensions {
    by_field: Vec<(String, Vec<(String, SchemaRef)>)>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `op` (e.g. `$ilike`) on `field`, with operands checked by `schema`.
    pub fn operator(
        mut self,
        field: impl Into<String>,
        op: impl Into<String>,
        schema: impl IntoSchema,
    ) -> Self {
        let field = field.into();
        let op = op.into();
        let schema = schema.into_schema();

        let idx = match self.by_field.iter().position(|(f, _)| *f == field) {
            Some(idx) => idx,
            None => {
                self.by_field.push((field, Vec::new()));
                self.by_field.len() - 1
            }
        };
        let ops = &mut self.by_field[idx].1;
        match ops.iter_mut().find(|(o, _)| *o == op) {
            Some(slot) => slot.1 = schema,
            None => ops.push((op, schema)),
        }
        self
    }

    /// Extra operators declared for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&[(String, SchemaRef)]> {
        self.by_field
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, ops)| ops.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.by_field.iter().map(|(f, _)| f.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }
}
