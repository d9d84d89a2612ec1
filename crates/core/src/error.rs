//! Errors raised while turning a discovery document into declarations.
//!
//! Every variant describes a problem with the *document*, not with the
//! generator: the pass for that API stops at the first one and no partial
//! declarations are produced.

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A malformed or unsupported discovery document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The JSON did not match the discovery document shape.
    #[error("failed to decode discovery document: {0}")]
    Decode(#[from] serde_json::Error),

    /// A directory entry has neither `discoveryLink` nor `discoveryRestUrl`.
    #[error("API {api} has no discovery link")]
    MissingDiscoveryLink {
        /// API id.
        api: String,
    },

    /// The API's base URL (or a discovery link) could not be resolved.
    #[error("API {api} has bogus URL {value:?}: {source}")]
    InvalidBaseUrl {
        /// API id.
        api: String,
        /// The URL text that failed.
        value: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// An OAuth2 scope URL without the required prefix.
    #[error("unexpected oauth2 scope {url:?} doesn't start with {prefix:?}")]
    BadScope {
        /// The scope URL.
        url: String,
        /// Required prefix.
        prefix: &'static str,
    },

    /// A top-level schema that is neither a struct, an array nor a reference.
    #[error("unsupported type for schema {schema:?}: {fragment}")]
    UnsupportedSchema {
        /// Schema name.
        schema: String,
        /// The offending JSON, pretty-printed.
        fragment: String,
    },

    /// A property whose shape the type graph cannot express.
    #[error("unknown type for {path:?}: {fragment}")]
    UnsupportedProperty {
        /// `Schema.property` path.
        path: String,
        /// The offending JSON, pretty-printed.
        fragment: String,
    },

    /// An array schema without `items`.
    #[error("can't handle array type missing its 'items' key at {path:?}")]
    MissingItems {
        /// Schema or property path.
        path: String,
    },

    /// Sub-schema synthesis produced a key that is already registered.
    #[error("dup schema apiName: {api_name}")]
    DuplicateSchema {
        /// The duplicated key.
        api_name: String,
    },

    /// A `$ref` naming a schema absent from the graph.
    #[error("failed to find referenced schema {reference:?} (from {context})")]
    UnresolvedReference {
        /// The missing schema name.
        reference: String,
        /// Where the reference appears.
        context: String,
    },

    /// A struct type without an associated registered schema.
    #[error("struct type has no registered schema (id {id})")]
    UnregisteredStruct {
        /// Arena index.
        id: usize,
    },

    /// A chain of reference-only schemas that loops back on itself.
    #[error("reference cycle through schema {schema:?}")]
    ReferenceCycle {
        /// A schema on the cycle.
        schema: String,
    },

    /// A method parameter whose type is not a primitive.
    #[error("failed to convert parameter {method}.{param} type (type={kind:?}, format={format:?})")]
    UnsupportedParamType {
        /// Method id.
        method: String,
        /// Parameter name.
        param: String,
        /// Declared `type`.
        kind: String,
        /// Declared `format`.
        format: String,
    },

    /// `parameterOrder` names a parameter the method doesn't declare.
    #[error("method {method} lists unknown parameter {param:?} in parameterOrder")]
    UnknownParameter {
        /// Method id.
        method: String,
        /// Parameter name.
        param: String,
    },

    /// A path parameter that cannot be substituted into the URL template.
    #[error("method {method} has repeated path parameter {param:?}")]
    UnsupportedPathParam {
        /// Method id.
        method: String,
        /// Parameter name.
        param: String,
    },
}
