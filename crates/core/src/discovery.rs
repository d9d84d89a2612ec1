//! Discovery document structs for serde deserialization.
//!
//! Only the subset of the discovery format the generator consumes is
//! modelled. Maps are decoded into `BTreeMap`s so every enumeration over
//! schemas, resources, methods, parameters and scopes is sorted by its
//! native key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::error::{Error, Result};

/// Root of the public API directory, also the base that relative
/// `basePath` and `discoveryLink` values are resolved against.
pub const DISCOVERY_ROOT: &str = "https://www.googleapis.com/discovery/v1/apis";

/// Feature flag that wraps request bodies as `{"data": ...}`.
pub const DATA_WRAPPER_FEATURE: &str = "dataWrapper";

/// Root of a discovery document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestDescription {
    /// `name:version`, e.g. `tasks:v1`.
    #[serde(default)]
    pub id: String,
    /// API name, e.g. `tasks`.
    #[serde(default)]
    pub name: String,
    /// API version, e.g. `v1`.
    #[serde(default)]
    pub version: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Link to human documentation.
    pub documentation_link: Option<String>,
    /// Base path, relative to the discovery root.
    pub base_path: Option<String>,
    /// Absolute root URL, paired with `service_path`.
    pub root_url: Option<String>,
    /// Path of the service under `root_url`.
    pub service_path: Option<String>,
    /// Authentication section.
    pub auth: Option<Auth>,
    /// Named schemas.
    #[serde(default)]
    pub schemas: BTreeMap<String, JsonSchema>,
    /// Top-level resources.
    #[serde(default)]
    pub resources: BTreeMap<String, RestResource>,
    /// Methods outside any resource.
    #[serde(default)]
    pub methods: BTreeMap<String, RestMethod>,
    /// Feature flags such as `dataWrapper`.
    #[serde(default)]
    pub features: Vec<String>,
}

/// `auth` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    /// OAuth2 settings.
    pub oauth2: Option<OAuth2>,
}

/// `auth.oauth2` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuth2 {
    /// Scope URL -> scope details.
    #[serde(default)]
    pub scopes: BTreeMap<String, ScopeInfo>,
}

/// Details of one OAuth2 scope.
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeInfo {
    /// What the scope grants.
    pub description: Option<String>,
}

/// A schema object: a type, a reference, or an inline struct/array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct JsonSchema {
    /// The `type` keyword.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,

    /// Name of another schema in the document's `schemas` map.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Refines `type`, e.g. `int64` on a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Object properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, JsonSchema>,

    /// Array element schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,
}

/// The `type` keyword values of the discovery dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// A struct with named properties.
    Object,
    /// A sequence of `items`.
    Array,
    /// Text, or an integer when `format` says so.
    String,
    /// Floating point.
    Number,
    /// Integer.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// Untyped JSON.
    Any,
}

impl SchemaKind {
    /// The keyword as written in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Any => "any",
        }
    }
}

/// A resource: a named group of methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestResource {
    /// Methods of the resource.
    #[serde(default)]
    pub methods: BTreeMap<String, RestMethod>,
}

/// A single API operation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestMethod {
    /// Dotted method id, e.g. `tasks.tasks.insert`.
    #[serde(default)]
    pub id: String,
    /// HTTP verb, `GET` when absent.
    #[serde(default = "default_http_method")]
    pub http_method: String,
    /// Path template relative to the base URL.
    #[serde(default)]
    pub path: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared parameters by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, RestParameter>,
    /// Ordered list of required parameters, most significant first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_order: Option<Vec<String>>,
    /// Request body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<SchemaRef>,
    /// Response body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<SchemaRef>,
    /// Present when the method accepts uploads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_upload: Option<MediaUpload>,
}

fn default_http_method() -> String {
    "GET".to_string()
}

/// `{"$ref": "Name"}` used by `request` and `response`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchemaRef {
    /// Name of the referenced schema.
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// `mediaUpload` section of a method.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaUpload {
    /// Accepted MIME ranges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accept: Vec<String>,
    /// Upload protocols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocols: Option<MediaProtocols>,
}

/// Upload protocols of a method.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaProtocols {
    /// Simple (single request) upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple: Option<MediaProtocol>,
}

/// One upload protocol.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaProtocol {
    /// Upload endpoint path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Whether metadata and media may share a multipart request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multipart: Option<bool>,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RestParameter {
    /// The `type` keyword.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,
    /// Refines `type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Must be supplied by the caller.
    #[serde(default)]
    pub required: bool,
    /// May appear more than once.
    #[serde(default)]
    pub repeated: bool,
    /// Where the value goes.
    pub location: Location,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Substituted into the path template.
    Path,
    /// Sent as a query parameter.
    Query,
    /// The request body.
    Body,
}

impl Location {
    /// The keyword as written in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Body => "body",
        }
    }
}

/// Response of the directory endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryList {
    /// Listed APIs.
    #[serde(default)]
    pub items: Vec<DirectoryItem>,
}

/// One API listed in the directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryItem {
    /// `name:version`.
    pub id: String,
    /// API name.
    #[serde(default)]
    pub name: String,
    /// API version.
    #[serde(default)]
    pub version: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Relative to [`DISCOVERY_ROOT`].
    pub discovery_link: Option<String>,
    /// Absolute URL of the discovery document.
    pub discovery_rest_url: Option<String>,
    /// The preferred version of its API.
    #[serde(default)]
    pub preferred: bool,
}

impl DirectoryItem {
    /// Absolute URL of this API's discovery document.
    pub fn discovery_url(&self) -> Result<String> {
        if let Some(url) = &self.discovery_rest_url {
            return Ok(url.clone());
        }
        let Some(link) = &self.discovery_link else {
            return Err(Error::MissingDiscoveryLink {
                api: self.id.clone(),
            });
        };
        resolve_relative(DISCOVERY_ROOT, link).map_err(|source| Error::InvalidBaseUrl {
            api: self.id.clone(),
            value: link.clone(),
            source,
        })
    }
}

impl DirectoryList {
    /// Parse the directory listing from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl RestDescription {
    /// Parse a discovery document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lower-cased API name, used as the generated package name.
    pub fn package(&self) -> String {
        self.name.to_lowercase()
    }

    /// Whether request bodies must be wrapped in a `data` envelope.
    pub fn needs_data_wrapper(&self) -> bool {
        self.features.iter().any(|f| f == DATA_WRAPPER_FEATURE)
    }

    /// Scope URL -> scope details, empty when the API declares none.
    pub fn scopes(&self) -> BTreeMap<String, ScopeInfo> {
        self.auth
            .as_ref()
            .and_then(|auth| auth.oauth2.as_ref())
            .map(|oauth2| oauth2.scopes.clone())
            .unwrap_or_default()
    }

    /// The URL every method path is resolved against.
    ///
    /// `rootUrl + servicePath` wins when both are present; otherwise
    /// `basePath` is resolved against the discovery root.
    pub fn base_url(&self) -> Result<String> {
        let invalid = |value: String| {
            move |source| Error::InvalidBaseUrl {
                api: self.id.clone(),
                value,
                source,
            }
        };
        if let (Some(root), Some(service)) = (&self.root_url, &self.service_path) {
            return resolve_relative(root, service).map_err(invalid(format!("{root}{service}")));
        }
        let base = self.base_path.as_deref().unwrap_or_default();
        resolve_relative(DISCOVERY_ROOT, base).map_err(invalid(base.to_string()))
    }
}

/// Resolve `rel` against `base` the way a browser resolves a link.
pub fn resolve_relative(base: &str, rel: &str) -> std::result::Result<String, url::ParseError> {
    Ok(Url::parse(base)?.join(rel)?.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_sorts_and_defaults() {
        let doc = RestDescription::from_json(
            r#"{
                "id": "zoo:v1", "name": "Zoo", "version": "v1",
                "basePath": "/zoo/v1/",
                "features": ["dataWrapper"],
                "schemas": {
                    "b": { "type": "string" },
                    "a": { "type": "object", "properties": { "x": { "$ref": "b" } } }
                },
                "methods": {
                    "ping": { "id": "zoo.ping", "path": "ping",
                              "parameters": { "q": { "type": "string", "location": "query" } } }
                }
            }"#,
        )
        .unwrap();

        let names: Vec<_> = doc.schemas.keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(doc.package(), "zoo");
        assert!(doc.needs_data_wrapper());
        let ping = &doc.methods["ping"];
        assert_eq!(ping.http_method, "GET");
        assert!(!ping.parameters["q"].required);
        assert_eq!(ping.parameters["q"].location, Location::Query);
        assert_eq!(
            doc.schemas["a"].properties["x"].reference.as_deref(),
            Some("b")
        );
    }

    #[test]
    fn test_decode_rejects_unknown_type_keyword() {
        let err = RestDescription::from_json(
            r#"{ "schemas": { "a": { "type": "tuple" } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_rejects_wrongly_typed_field() {
        let err = RestDescription::from_json(
            r#"{ "methods": { "m": { "parameters": { "p": { "type": "string", "location": "query", "required": "yes" } } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_base_url_from_base_path() {
        let doc = RestDescription::from_json(r#"{ "basePath": "/tasks/v1/" }"#).unwrap();
        assert_eq!(doc.base_url().unwrap(), "https://www.googleapis.com/tasks/v1/");
    }

    #[test]
    fn test_base_url_prefers_root_and_service_path() {
        let doc = RestDescription::from_json(
            r#"{ "basePath": "/ignored/", "rootUrl": "https://tasks.example.com/", "servicePath": "tasks/v1/" }"#,
        )
        .unwrap();
        assert_eq!(doc.base_url().unwrap(), "https://tasks.example.com/tasks/v1/");
    }

    #[test]
    fn test_discovery_url_resolution() {
        let item: DirectoryItem = serde_json::from_str(
            r#"{ "id": "tasks:v1", "discoveryLink": "./apis/tasks/v1/rest" }"#,
        )
        .unwrap();
        assert_eq!(
            item.discovery_url().unwrap(),
            "https://www.googleapis.com/discovery/v1/apis/tasks/v1/rest"
        );

        let missing: DirectoryItem = serde_json::from_str(r#"{ "id": "nolink:v1" }"#).unwrap();
        let err = missing.discovery_url().unwrap_err();
        assert!(matches!(err, Error::MissingDiscoveryLink { ref api } if api == "nolink:v1"));
    }
}
