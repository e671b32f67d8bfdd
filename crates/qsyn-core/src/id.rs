//! MongoDB-style object identifiers and the coercing validator for them.
//!
//! Accepted inputs are a 24-character hex string or an already built
//! identifier in extended-JSON form (`{"$oid": "<hex>"}`). Both are normalised
//! to the extended-JSON form with lowercase hex.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use thiserror::Error;

use crate::issue::{Ctx, IssueCode};
use crate::validator::{SchemaKind, Validator};

const OID_KEY: &str = "$oid";

static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(rand::random);
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random::<u32>() & 0x00ff_ffff));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectIdError {
    #[error("input must be a 24 character hex string, got {0} characters")]
    Length(usize),
    #[error("input must be a 24 character hex string: {0}")]
    Hex(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Fresh id: 4-byte big-endian seconds, 5 process-random bytes, 3-byte counter.
    pub fn new() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != 24 {
            return Err(ObjectIdError::Length(s.len()));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| ObjectIdError::Hex(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Seconds since the Unix epoch encoded in the first four bytes.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Extended-JSON form, the canonical value produced by [`ObjectIdSchema`].
    pub fn to_value(&self) -> Value {
        json!({ OID_KEY: self.to_hex() })
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

#[derive(Serialize, Deserialize)]
struct ExtendedJson {
    #[serde(rename = "$oid")]
    oid: String,
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ExtendedJson { oid: self.to_hex() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ext = ExtendedJson::deserialize(deserializer)?;
        ObjectId::parse_str(&ext.oid).map_err(serde::de::Error::custom)
    }
}

/// Validator coercing external identifier representations into an [`ObjectId`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIdSchema;

pub fn object_id() -> ObjectIdSchema {
    ObjectIdSchema
}

impl ObjectIdSchema {
    fn coerce(value: &Value) -> Option<Result<ObjectId, ObjectIdError>> {
        match value {
            Value::String(s) => Some(ObjectId::parse_str(s)),
            Value::Object(map) if map.len() == 1 => map
                .get(OID_KEY)
                .and_then(Value::as_str)
                .map(ObjectId::parse_str),
            _ => None,
        }
    }
}

impl Validator for ObjectIdSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        match Self::coerce(value) {
            Some(Ok(id)) => Some(id.to_value()),
            Some(Err(e)) => {
                ctx.report(
                    IssueCode::Custom {
                        params: Some(json!({ "input": value })),
                    },
                    e.to_string(),
                );
                None
            }
            None => {
                ctx.invalid_type("objectId", value);
                None
            }
        }
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::ObjectId
    }

    fn describe(&self) -> Value {
        json!({ "type": "objectId" })
    }
}
