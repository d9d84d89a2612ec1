//! API-level IR types.
//!
//! These types represent a fully resolved API: every name is allocated,
//! every type reference is resolved, and every call's argument list is
//! final. Codegen only has to spell them out.

use crate::discovery::Location;
use crate::typegraph::TargetType;

/// Complete IR for one discovery document
#[derive(Debug, Clone, PartialEq)]
pub struct ApiModel {
    pub id: String,
    pub name: String,
    pub version: String,
    pub title: String,
    pub description: Option<String>,
    pub documentation_link: Option<String>,
    /// Lower-cased API name
    pub package: String,
    pub base_url: String,
    pub data_wrapper: bool,
    pub scopes: Vec<ScopeIR>,
    /// Name of the root service type (normally `Service`)
    pub root_service: String,
    /// Name of the root service constructor (normally `new`)
    pub constructor: String,
    pub records: Vec<RecordIR>,
    pub resources: Vec<ResourceIR>,
    pub top_level_calls: Vec<CallIR>,
}

/// OAuth2 scope constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeIR {
    /// SCREAMING_SNAKE constant name
    pub const_name: String,
    pub url: String,
    pub description: Option<String>,
}

/// A generated data type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordIR {
    pub name: String,
    pub api_name: String,
    pub description: Option<String>,
    pub kind: RecordKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordKind {
    /// Struct schema: one optional field per property
    Struct { fields: Vec<FieldIR> },
    /// Array or reference schema
    Alias { target: TargetType },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldIR {
    /// snake_case Rust identifier, unique within the record
    pub ident: String,
    /// JSON key
    pub api_name: String,
    pub description: Option<String>,
    pub ty: TargetType,
}

/// Sub-service grouping a resource's calls
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceIR {
    pub api_name: String,
    /// Field on the root service
    pub field: String,
    pub type_name: String,
    pub calls: Vec<CallIR>,
}

/// A constructor argument after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ArgIR {
    pub api_name: String,
    pub ident: String,
    pub ty: TargetType,
    pub location: Location,
}

/// Optional (or unbound required) parameter exposed as a setter
#[derive(Debug, Clone, PartialEq)]
pub struct SetterIR {
    pub api_name: String,
    /// Setter method name, unique within the call builder
    pub ident: String,
    pub description: Option<String>,
    pub ty: TargetType,
}

/// One call builder
#[derive(Debug, Clone, PartialEq)]
pub struct CallIR {
    pub type_name: String,
    /// Constructor method on the owning service
    pub method_ident: String,
    pub method_id: String,
    pub http_method: String,
    pub path: String,
    pub description: Option<String>,
    /// Constructor arguments in order, body last
    pub args: Vec<ArgIR>,
    /// Idents of required non-repeated query arguments, with their keys
    pub required_query: Vec<(String, String)>,
    /// Idents of required repeated query arguments, with their keys
    pub required_repeated_query: Vec<(String, String)>,
    /// Path placeholder name -> argument ident
    pub path_bindings: Vec<(String, String)>,
    /// Ident of the body argument
    pub body: Option<String>,
    pub setters: Vec<SetterIR>,
    pub response: Option<TargetType>,
    pub supports_media: bool,
    pub upload_path: Option<String>,
}
