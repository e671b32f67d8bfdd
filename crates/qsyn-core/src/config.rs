//! Application configuration schemas (authentication, pagination, SQL clients).
//!
//! These are plain validators built on the same contract as query schemas.
//! Applications merge their own keys into [`default_app_configuration`] and
//! validate the loaded configuration document once at startup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::schema::{array, number, object, string, union, ObjectSchema};
use crate::validator::{IntoSchema, SchemaExt, Validator, ValidatorExt};

pub fn authentication_settings_schema() -> ObjectSchema {
    object()
        .field("secret", string().with_description("The JWT signing secret"))
        .field(
            "entity",
            string()
                .with_description("The name of the authentication entity (e.g. user)")
                .optional(),
        )
        .field(
            "entityId",
            string()
                .with_description("The name of the authentication entity id property")
                .optional(),
        )
        .field(
            "service",
            string()
                .with_description("The path of the entity service")
                .optional(),
        )
        .field(
            "authStrategies",
            array(string()).with_description(
                "A list of authentication strategy names that are allowed to create JWT access tokens",
            ),
        )
        .field(
            "parseStrategies",
            array(string())
                .with_description(
                    "A list of authentication strategy names that should parse HTTP headers for authentication information (defaults to `authStrategies`)",
                )
                .optional(),
        )
        .field("jwtOptions", object().optional())
        .field(
            "jwt",
            object()
                .field(
                    "header",
                    string()
                        .with_description("The HTTP header containing the JWT")
                        .default_to(Value::String("Authorization".into())),
                )
                .field(
                    "schemes",
                    string().with_description("An array of schemes to support"),
                )
                .optional(),
        )
        .field("local", local_strategy_schema().optional())
        .field(
            "oauth",
            object()
                .field("redirect", string().optional())
                .field("origins", array(string()).optional())
                .field(
                    "defaults",
                    object()
                        .field("key", string().optional())
                        .field("secret", string().optional())
                        .optional(),
                )
                .optional(),
        )
}

fn local_strategy_schema() -> ObjectSchema {
    object()
        .field(
            "usernameField",
            string().with_description("Name of the username field (e.g. `email`)"),
        )
        .field(
            "passwordField",
            string().with_description("Name of the password field (e.g. `password`)"),
        )
        .field(
            "hashSize",
            number().with_description("The BCrypt salt length").optional(),
        )
        .field(
            "errorMessage",
            string()
                .with_description("The error message to return on errors")
                .optional(),
        )
        .field(
            "entityUsernameField",
            string()
                .with_description(
                    "Name of the username field on the entity if authentication request data and entity field names are different",
                )
                .optional(),
        )
        .field(
            "entityPasswordField",
            string()
                .with_description(
                    "Name of the password field on the entity if authentication request data and entity field names are different",
                )
                .optional(),
        )
}

/// Settings for one SQL client; the whole block is optional.
pub fn sql_settings_schema() -> crate::schema::OptionalSchema {
    let connection_object = object()
        .field("host", string())
        .field("port", number())
        .field("user", string())
        .field("password", string())
        .field("database", string())
        .partial();

    object()
        .field("client", string())
        .field(
            "connection",
            union([string().into_schema(), connection_object.into_schema()]),
        )
        .field(
            "pool",
            object()
                .field("min", number())
                .field("max", number())
                .optional(),
        )
        .optional()
}

pub fn default_app_configuration() -> ObjectSchema {
    object()
        .field("authentication", authentication_settings_schema().optional())
        .field(
            "paginate",
            object()
                .field("default", number())
                .field("max", number())
                .optional(),
        )
        .field("origins", array(string()).optional())
        .field("mongodb", string().optional())
        .field("mysql", sql_settings_schema())
        .field("postgresql", sql_settings_schema())
        .field("sqlite", sql_settings_schema())
        .field("mssql", sql_settings_schema())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtSettings {
    pub header: String,
    pub schemes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSettings {
    pub username_field: String,
    pub password_field: String,
    pub hash_size: Option<f64>,
    pub error_message: Option<String>,
    pub entity_username_field: Option<String>,
    pub entity_password_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationSettings {
    pub secret: String,
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub service: Option<String>,
    pub auth_strategies: Vec<String>,
    pub parse_strategies: Option<Vec<String>>,
    pub jwt_options: Option<Value>,
    pub jwt: Option<JwtSettings>,
    pub local: Option<LocalSettings>,
    pub oauth: Option<Value>,
}

impl AuthenticationSettings {
    /// Strategies that parse HTTP headers; falls back to `auth_strategies`.
    pub fn effective_parse_strategies(&self) -> &[String] {
        self.parse_strategies
            .as_deref()
            .unwrap_or(self.auth_strategies.as_slice())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paginate {
    pub default: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSettings {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlConnection {
    Url(String),
    Params {
        host: Option<String>,
        port: Option<f64>,
        user: Option<String>,
        password: Option<String>,
        database: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlSettings {
    pub client: String,
    pub connection: SqlConnection,
    pub pool: Option<PoolSettings>,
}

/// Typed view of a validated default configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultAppConfiguration {
    pub authentication: Option<AuthenticationSettings>,
    pub paginate: Option<Paginate>,
    pub origins: Option<Vec<String>>,
    pub mongodb: Option<String>,
    pub mysql: Option<SqlSettings>,
    pub postgresql: Option<SqlSettings>,
    pub sqlite: Option<SqlSettings>,
    pub mssql: Option<SqlSettings>,
}

/// Validate `doc` against the default schema extended with `extra`, then
/// return the accepted document and its typed default part.
pub fn load_app_configuration(
    doc: &Value,
    extra: Option<ObjectSchema>,
) -> Result<(Value, DefaultAppConfiguration)> {
    let schema = match extra {
        Some(extra) => default_app_configuration().merge(extra),
        None => default_app_configuration(),
    };
    let accepted = schema.validate(doc)?;
    let typed: DefaultAppConfiguration = default_app_configuration().parse(&accepted)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        authentication = typed.authentication.is_some(),
        paginate = typed.paginate.is_some(),
        "loaded app configuration"
    );

    Ok((accepted, typed))
}
