//! Primitive validators used to describe record shapes and configuration.
//!
//! The wording of issue messages follows what Feathers/zod clients already
//! display (`Expected string, received number`, `Required`, ...).

use serde_json::{json, Map, Value};

use crate::issue::{type_name, Ctx, IssueCode};
use crate::validator::{IntoSchema, SchemaKind, SchemaRef, Validator};

fn with_description(mut desc: Value, description: &Option<String>) -> Value {
    if let (Some(text), Some(obj)) = (description, desc.as_object_mut()) {
        obj.insert("description".into(), Value::String(text.clone()));
    }
    desc
}

fn flag(mut desc: Value, key: &str) -> Value {
    if let Some(obj) = desc.as_object_mut() {
        obj.insert(key.into(), Value::Bool(true));
    }
    desc
}

/// Render a bound the way users wrote it (`-1`, not `-1.0`).
fn fmt_num(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Integral JSON number for an accepted whole `f64` (`10.0` becomes `10`).
fn whole(n: f64) -> Value {
    if n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

// ----- any -----

#[derive(Debug, Clone, Default)]
pub struct AnySchema;

pub fn any() -> AnySchema {
    AnySchema
}

impl Validator for AnySchema {
    fn check(&self, value: &Value, _ctx: &mut Ctx) -> Option<Value> {
        Some(value.clone())
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Any
    }

    fn describe(&self) -> Value {
        json!({ "type": "any" })
    }
}

// ----- string -----

#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    description: Option<String>,
}

pub fn string() -> StringSchema {
    StringSchema::default()
}

impl StringSchema {
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl Validator for StringSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        if value.is_string() {
            Some(value.clone())
        } else {
            ctx.invalid_type("string", value);
            None
        }
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::String
    }

    fn describe(&self) -> Value {
        with_description(json!({ "type": "string" }), &self.description)
    }
}

// ----- number -----

#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    integer: bool,
    min: Option<f64>,
    max: Option<f64>,
    description: Option<String>,
}

pub fn number() -> NumberSchema {
    NumberSchema::default()
}

/// Whole numbers only.
pub fn integer() -> NumberSchema {
    NumberSchema::default().int()
}

impl NumberSchema {
    pub fn int(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Inclusive lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl Validator for NumberSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        let Some(n) = value.as_f64() else {
            ctx.invalid_type("number", value);
            return None;
        };

        let before = ctx.issue_count();
        if self.integer && n.fract() != 0.0 {
            ctx.report(
                IssueCode::InvalidType {
                    expected: "integer".into(),
                    received: "float".into(),
                },
                "Expected integer, received float",
            );
        }
        if let Some(min) = self.min {
            if n < min {
                ctx.report(
                    IssueCode::TooSmall {
                        minimum: min,
                        inclusive: true,
                    },
                    format!("Number must be greater than or equal to {}", fmt_num(min)),
                );
            }
        }
        if let Some(max) = self.max {
            if n > max {
                ctx.report(
                    IssueCode::TooBig {
                        maximum: max,
                        inclusive: true,
                    },
                    format!("Number must be less than or equal to {}", fmt_num(max)),
                );
            }
        }

        if ctx.issue_count() != before {
            return None;
        }
        Some(if self.integer && value.is_f64() {
            whole(n)
        } else {
            value.clone()
        })
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Number
    }

    fn describe(&self) -> Value {
        let mut desc = json!({ "type": if self.integer { "integer" } else { "number" } });
        if let Some(obj) = desc.as_object_mut() {
            if let Some(min) = self.min {
                obj.insert("minimum".into(), json!(min));
            }
            if let Some(max) = self.max {
                obj.insert("maximum".into(), json!(max));
            }
        }
        with_description(desc, &self.description)
    }
}

// ----- boolean -----

#[derive(Debug, Clone, Default)]
pub struct BooleanSchema;

pub fn boolean() -> BooleanSchema {
    BooleanSchema
}

impl Validator for BooleanSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        if value.is_boolean() {
            Some(value.clone())
        } else {
            ctx.invalid_type("boolean", value);
            None
        }
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Boolean
    }

    fn describe(&self) -> Value {
        json!({ "type": "boolean" })
    }
}

// ----- literal -----

/// Accepts exactly one of a fixed set of scalar values.
#[derive(Debug, Clone)]
pub struct LiteralSchema {
    values: Vec<Value>,
}

pub fn literal(value: impl Into<Value>) -> LiteralSchema {
    LiteralSchema {
        values: vec![value.into()],
    }
}

pub fn one_of_literals<I, V>(values: I) -> LiteralSchema
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    LiteralSchema {
        values: values.into_iter().map(Into::into).collect(),
    }
}

fn literal_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

impl Validator for LiteralSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        // Hand back the declared literal so `1.0` comes out as `1`.
        if let Some(matched) = self.values.iter().find(|v| literal_eq(v, value)) {
            return Some(matched.clone());
        }
        let expected: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        let message = match expected.as_slice() {
            [one] => format!("Invalid literal value, expected {one}"),
            many => format!("Invalid literal value, expected one of {}", many.join(" | ")),
        };
        ctx.report(
            IssueCode::InvalidLiteral {
                expected: self.values.clone(),
            },
            message,
        );
        None
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Literal
    }

    fn describe(&self) -> Value {
        json!({ "enum": self.values })
    }
}

// ----- enum -----

/// Accepts one of a fixed set of strings.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    options: Vec<String>,
}

pub fn enumeration<I, S>(options: I) -> EnumSchema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    EnumSchema {
        options: options.into_iter().map(Into::into).collect(),
    }
}

impl EnumSchema {
    pub fn options(&self) -> &[String] {
        &self.options
    }

    fn expected(&self) -> String {
        self.options
            .iter()
            .map(|o| format!("'{o}'"))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Validator for EnumSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        let Some(s) = value.as_str() else {
            let expected = self.expected();
            let received = type_name(value);
            ctx.report(
                IssueCode::InvalidType {
                    expected: expected.clone(),
                    received: received.into(),
                },
                format!("Expected {expected}, received {received}"),
            );
            return None;
        };
        if self.options.iter().any(|o| o == s) {
            return Some(value.clone());
        }
        ctx.report(
            IssueCode::InvalidEnumValue {
                options: self.options.clone(),
                received: s.to_string(),
            },
            format!("Invalid enum value. Expected {}, received '{s}'", self.expected()),
        );
        None
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Enum
    }

    fn describe(&self) -> Value {
        json!({ "type": "string", "enum": self.options })
    }
}

// ----- array -----

#[derive(Debug, Clone)]
pub struct ArraySchema {
    item: SchemaRef,
    description: Option<String>,
}

pub fn array(item: impl IntoSchema) -> ArraySchema {
    ArraySchema::new(item.into_schema())
}

impl ArraySchema {
    pub fn new(item: SchemaRef) -> Self {
        Self {
            item,
            description: None,
        }
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl Validator for ArraySchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        let Some(items) = value.as_array() else {
            ctx.invalid_type("array", value);
            return None;
        };

        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            match ctx.at(i, |ctx| self.item.check(item, ctx)) {
                Some(v) => out.push(v),
                None => ok = false,
            }
        }
        ok.then_some(Value::Array(out))
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Array
    }

    fn describe(&self) -> Value {
        with_description(
            json!({ "type": "array", "items": self.item.describe() }),
            &self.description,
        )
    }
}

// ----- object -----

/// What an object does with keys it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Reject with an `UnrecognizedKey` issue per key.
    Strict,
    /// Drop silently.
    #[default]
    Strip,
    /// Copy through untouched.
    Passthrough,
}

/// Object with ordered, uniquely named fields.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, SchemaRef)>,
    unknown_keys: UnknownKeys,
    description: Option<String>,
}

pub fn object() -> ObjectSchema {
    ObjectSchema::default()
}

impl ObjectSchema {
    /// Declare `name`; re-declaring replaces the validator in place.
    pub fn field(mut self, name: impl Into<String>, schema: impl IntoSchema) -> Self {
        self.insert(name.into(), schema.into_schema());
        self
    }

    fn insert(&mut self, name: String, schema: SchemaRef) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = schema,
            None => self.fields.push((name, schema)),
        }
    }

    pub fn strict(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Strict;
        self
    }

    pub fn strip(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Strip;
        self
    }

    pub fn passthrough(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Passthrough;
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Fields of `other` are appended or override ours; its unknown-key policy wins.
    pub fn merge(mut self, other: ObjectSchema) -> Self {
        for (name, schema) in other.fields {
            self.insert(name, schema);
        }
        self.unknown_keys = other.unknown_keys;
        self
    }

    /// Every field becomes optional.
    pub fn partial(mut self) -> Self {
        for (_, schema) in &mut self.fields {
            if !schema.is_optional() {
                *schema = std::sync::Arc::new(OptionalSchema::new(schema.clone()));
            }
        }
        self
    }

    pub fn fields(&self) -> &[(String, SchemaRef)] {
        &self.fields
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&SchemaRef> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.unknown_keys
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Validator for ObjectSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        let Some(map) = value.as_object() else {
            ctx.invalid_type("object", value);
            return None;
        };

        let before = ctx.issue_count();
        let mut out = Map::new();

        for (name, schema) in &self.fields {
            match map.get(name) {
                Some(v) => {
                    if let Some(accepted) = ctx.at(name.as_str(), |ctx| schema.check(v, ctx)) {
                        out.insert(name.clone(), accepted);
                    }
                }
                None => {
                    if let Some(default) = schema.default_value() {
                        out.insert(name.clone(), default);
                    } else if !schema.is_optional() {
                        ctx.at(name.as_str(), |ctx| ctx.required(schema.kind().name()));
                    }
                }
            }
        }

        for (key, v) in map {
            if self.get(key).is_some() {
                continue;
            }
            match self.unknown_keys {
                UnknownKeys::Strict => ctx.at(key.as_str(), |ctx| {
                    ctx.report(
                        IssueCode::UnrecognizedKey { key: key.clone() },
                        format!("Unrecognized key: '{key}'"),
                    )
                }),
                UnknownKeys::Strip => {}
                UnknownKeys::Passthrough => {
                    out.insert(key.clone(), v.clone());
                }
            }
        }

        (ctx.issue_count() == before).then_some(Value::Object(out))
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Object
    }

    fn describe(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, schema) in &self.fields {
            properties.insert(name.clone(), schema.describe());
            if !schema.is_optional() {
                required.push(Value::String(name.clone()));
            }
        }
        with_description(
            json!({
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": self.unknown_keys != UnknownKeys::Strict,
            }),
            &self.description,
        )
    }
}

// ----- modifiers -----

#[derive(Debug, Clone)]
pub struct OptionalSchema {
    inner: SchemaRef,
}

impl OptionalSchema {
    pub fn new(inner: SchemaRef) -> Self {
        Self { inner }
    }
}

impl Validator for OptionalSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        self.inner.check(value, ctx)
    }

    fn kind(&self) -> SchemaKind {
        self.inner.kind()
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn describe(&self) -> Value {
        flag(self.inner.describe(), "optional")
    }
}

#[derive(Debug, Clone)]
pub struct NullableSchema {
    inner: SchemaRef,
}

impl NullableSchema {
    pub fn new(inner: SchemaRef) -> Self {
        Self { inner }
    }
}

impl Validator for NullableSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        if value.is_null() {
            Some(Value::Null)
        } else {
            self.inner.check(value, ctx)
        }
    }

    fn kind(&self) -> SchemaKind {
        self.inner.kind()
    }

    fn is_optional(&self) -> bool {
        self.inner.is_optional()
    }

    fn default_value(&self) -> Option<Value> {
        self.inner.default_value()
    }

    fn describe(&self) -> Value {
        flag(self.inner.describe(), "nullable")
    }
}

#[derive(Debug, Clone)]
pub struct DefaultSchema {
    inner: SchemaRef,
    default: Value,
}

impl DefaultSchema {
    pub fn new(inner: SchemaRef, default: Value) -> Self {
        Self { inner, default }
    }
}

impl Validator for DefaultSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        self.inner.check(value, ctx)
    }

    fn kind(&self) -> SchemaKind {
        self.inner.kind()
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn default_value(&self) -> Option<Value> {
        Some(self.default.clone())
    }

    fn describe(&self) -> Value {
        let mut desc = self.inner.describe();
        if let Some(obj) = desc.as_object_mut() {
            obj.insert("default".into(), self.default.clone());
        }
        desc
    }
}

// ----- union -----

/// First passing option wins. When none pass, the issues of the option whose
/// kind matches the value's JSON type are reported (the first option otherwise).
#[derive(Debug, Clone)]
pub struct UnionSchema {
    options: Vec<SchemaRef>,
}

pub fn union<I, S>(options: I) -> UnionSchema
where
    I: IntoIterator<Item = S>,
    S: IntoSchema,
{
    UnionSchema {
        options: options.into_iter().map(IntoSchema::into_schema).collect(),
    }
}

impl Validator for UnionSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        let mut attempts = Vec::with_capacity(self.options.len());
        for option in &self.options {
            let mut scratch = ctx.fork();
            match option.check(value, &mut scratch) {
                Some(v) if !scratch.has_issues() => return Some(v),
                _ => attempts.push((option.kind(), scratch)),
            }
        }

        let pick = attempts
            .iter()
            .position(|(kind, _)| kind.matches_json(value))
            .unwrap_or(0);
        match attempts.into_iter().nth(pick) {
            Some((_, scratch)) => ctx.absorb(scratch),
            None => ctx.invalid_type("never", value),
        }
        None
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Union
    }

    fn is_optional(&self) -> bool {
        self.options.iter().any(|o| o.is_optional())
    }

    fn describe(&self) -> Value {
        json!({ "anyOf": self.options.iter().map(|o| o.describe()).collect::<Vec<_>>() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueKind;
    use crate::validator::SchemaExt;
    use serde_json::json;

    #[test]
    fn strict_object_reports_every_problem() {
        let schema = object()
            .field("name", string())
            .field("age", number())
            .strict();
        let err = schema
            .validate(&json!({ "name": 1, "age": "x", "extra": true }))
            .unwrap_err();
        let paths: Vec<String> = err.issues.iter().map(|i| i.path_string()).collect();
        assert_eq!(paths, vec!["name", "age", "extra"]);
        assert_eq!(err.issues[2].kind(), IssueKind::UnknownKey);
    }

    #[test]
    fn missing_required_field_is_reported() {
        let schema = object().field("secret", string());
        let err = schema.validate(&json!({})).unwrap_err();
        assert_eq!(err.issues[0].message, "Required");
        assert_eq!(err.issues[0].path_string(), "secret");
    }

    #[test]
    fn strip_drops_unknown_keys_and_passthrough_keeps_them() {
        let stripped = object().field("a", number()).validate(&json!({ "a": 1, "b": 2 }));
        assert_eq!(stripped.unwrap(), json!({ "a": 1 }));

        let kept = object()
            .field("a", number())
            .passthrough()
            .validate(&json!({ "a": 1, "b": 2 }));
        assert_eq!(kept.unwrap(), json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn default_fills_missing_key() {
        let schema = object().field("header", string().default_to(json!("Authorization")));
        assert_eq!(
            schema.validate(&json!({})).unwrap(),
            json!({ "header": "Authorization" })
        );
    }

    #[test]
    fn optional_rejects_null_but_nullish_accepts_it() {
        let opt = object().field("a", string().optional());
        assert!(opt.validate(&json!({})).is_ok());
        assert!(opt.validate(&json!({ "a": null })).is_err());

        let nullish = object().field("a", string().nullish());
        assert!(nullish.validate(&json!({ "a": null })).is_ok());
    }

    #[test]
    fn integer_bounds_are_range_violations() {
        let limit = integer().min(-1.0);
        assert!(limit.validate(&json!(-1)).is_ok());
        let err = limit.validate(&json!(-2)).unwrap_err();
        assert_eq!(err.issues[0].kind(), IssueKind::RangeViolation);
        assert_eq!(
            err.issues[0].message,
            "Number must be greater than or equal to -1"
        );

        let err = limit.validate(&json!(1.5)).unwrap_err();
        assert_eq!(err.issues[0].message, "Expected integer, received float");
    }

    #[test]
    fn enum_lists_options_in_message() {
        let err = enumeration(["age", "name"])
            .validate(&json!("nope"))
            .unwrap_err();
        assert_eq!(
            err.issues[0].message,
            "Invalid enum value. Expected 'age' | 'name', received 'nope'"
        );
    }

    #[test]
    fn literal_compares_numbers_by_value() {
        let dir = one_of_literals([1, -1]);
        assert!(dir.validate(&json!(1.0)).is_ok());
        assert!(dir.validate(&json!(-1)).is_ok());
        assert!(dir.validate(&json!(2)).is_err());
    }

    #[test]
    fn union_reports_the_branch_matching_the_value_type() {
        let schema = union([string().into_schema(), object().field("host", string()).into_schema()]);
        assert!(schema.validate(&json!("postgres://")).is_ok());
        let err = schema.validate(&json!({ "host": 1 })).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path_string(), "host");
    }

    #[test]
    fn array_reports_each_bad_index() {
        let err = string().array().validate(&json!(["a", 1, "b", 2])).unwrap_err();
        let paths: Vec<String> = err.issues.iter().map(|i| i.path_string()).collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);
    }

    #[test]
    fn merge_overrides_and_partial_relaxes() {
        let base = object().field("a", string()).field("b", string());
        let merged = base.merge(object().field("b", number()).field("c", boolean()));
        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(merged.validate(&json!({ "a": "x", "b": 1, "c": true })).is_ok());
        assert!(merged.clone().partial().validate(&json!({})).is_ok());
    }

    #[test]
    fn whole_floats_come_out_integral() {
        assert_eq!(integer().validate(&json!(10.0)).unwrap(), json!(10));
        assert!(integer().validate(&json!(10.0)).unwrap().is_i64());
        assert!(number().validate(&json!(2.5)).unwrap().is_f64());

        let dir = one_of_literals([1, -1]);
        assert!(dir.validate(&json!(-1.0)).unwrap().is_i64());
    }
}
