//! Schema resolution: turns the document's `schemas` map into a flat,
//! uniquely named set of record definitions.
//!
//! Anonymous nested objects get synthesized keys:
//! - `Parent.prop` for an inline object property, or for an array property
//!   whose element (or element's element) is an inline object
//! - `Parent.Item` for an array schema whose element is an inline object
//!
//! Display names are issued lazily through the graph's [`NameAllocator`]
//! and never reassigned, so the order in which callers ask for names is
//! the order in which collisions are resolved.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::discovery::{JsonSchema, SchemaKind};
use crate::error::{Error, Result};
use crate::names::{NameAllocator, type_ident};

/// Index of a schema in its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub usize);

/// Shape of a value as written in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveType),
    Array(Box<Type>),
    /// `$ref` to a schema by its API name.
    Reference(String),
    /// The shape of a registered struct schema.
    Struct(SchemaId),
}

/// A primitive `type` with its optional `format`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveType {
    pub kind: SchemaKind,
    pub format: Option<String>,
}

impl PrimitiveType {
    /// `None` for `object` and `array`.
    pub fn new(kind: SchemaKind, format: Option<&str>) -> Option<Self> {
        match kind {
            SchemaKind::Object | SchemaKind::Array => None,
            _ => Some(Self {
                kind,
                format: format.map(str::to_string),
            }),
        }
    }

    pub fn target(&self) -> TargetType {
        let (scalar, string_encoded) = match (self.kind, self.format.as_deref()) {
            (SchemaKind::Boolean, _) => (Scalar::Bool, false),
            (SchemaKind::String, Some("int64")) => (Scalar::Int64, true),
            (SchemaKind::String, Some("uint64")) => (Scalar::Uint64, true),
            (SchemaKind::String, Some("int32")) => (Scalar::Int32, true),
            (SchemaKind::String, Some("uint32")) => (Scalar::Uint32, true),
            (SchemaKind::String, _) => (Scalar::String, false),
            (SchemaKind::Number, _) => (Scalar::Float64, false),
            (SchemaKind::Integer, _) => (Scalar::Int64, false),
            (SchemaKind::Any | SchemaKind::Object | SchemaKind::Array, _) => (Scalar::Any, false),
        };
        TargetType::Scalar {
            scalar,
            string_encoded,
        }
    }
}

/// Scalar representations in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Bool,
    String,
    Float64,
    Int64,
    Uint64,
    Int32,
    Uint32,
    /// Untyped JSON value.
    Any,
}

impl Scalar {
    pub fn rust_type(self) -> &'static str {
        match self {
            Scalar::Bool => "bool",
            Scalar::String => "String",
            Scalar::Float64 => "f64",
            Scalar::Int64 => "i64",
            Scalar::Uint64 => "u64",
            Scalar::Int32 => "i32",
            Scalar::Uint32 => "u32",
            Scalar::Any => "serde_json::Value",
        }
    }
}

/// A fully resolved representation, ready to be spelled in Rust.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    Scalar {
        scalar: Scalar,
        /// Integers carried as JSON strings on the wire.
        string_encoded: bool,
    },
    Seq(Box<TargetType>),
    /// A generated record type.
    Named(String),
}

impl TargetType {
    pub fn to_rust(&self) -> String {
        match self {
            TargetType::Scalar { scalar, .. } => scalar.rust_type().to_string(),
            TargetType::Seq(elem) => format!("Vec<{}>", elem.to_rust()),
            TargetType::Named(name) => name.clone(),
        }
    }

    /// True when integers anywhere in the shape, at any sequence depth,
    /// travel as JSON strings. Named records handle their own fields.
    pub fn is_string_encoded(&self) -> bool {
        match self {
            TargetType::Scalar { string_encoded, .. } => *string_encoded,
            TargetType::Seq(elem) => elem.is_string_encoded(),
            TargetType::Named(_) => false,
        }
    }
}

/// A field of a struct schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub api_name: String,
    pub description: Option<String>,
    pub ty: Type,
}

/// A named type definition, explicit or synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub api_name: String,
    pub description: Option<String>,
    pub ty: Type,
    /// Non-empty only for struct schemas, sorted by API name.
    pub properties: Vec<Property>,
}

impl Schema {
    pub fn is_struct(&self) -> bool {
        matches!(self.ty, Type::Struct(_))
    }
}

/// All schemas of one API plus the memo tables used to name and resolve
/// them.
#[derive(Debug, Default)]
pub struct TypeGraph {
    schemas: Vec<Schema>,
    by_name: BTreeMap<String, SchemaId>,
    names: NameAllocator,
    display_names: HashMap<SchemaId, String>,
    shapes: HashMap<SchemaId, TargetType>,
    resolving: HashSet<SchemaId>,
}

impl TypeGraph {
    /// A graph issuing display names from `names`.
    pub fn with_names(names: NameAllocator) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    /// The API-wide allocator, shared with service and call-builder names.
    pub fn names_mut(&mut self) -> &mut NameAllocator {
        &mut self.names
    }

    /// Register every top-level schema and discover its nested sub-schemas.
    pub fn resolve(&mut self, defs: &BTreeMap<String, JsonSchema>) -> Result<()> {
        let mut top_level = Vec::with_capacity(defs.len());
        for (name, def) in defs {
            top_level.push((self.add_schema(name, def)?, def));
        }
        for (id, def) in top_level {
            self.populate(id, def)?;
        }
        self.check_references()
    }

    /// Schemas sorted by API name.
    pub fn schemas(&self) -> impl Iterator<Item = (SchemaId, &Schema)> {
        self.by_name.values().map(|id| (*id, &self.schemas[id.0]))
    }

    pub fn schema(&self, id: SchemaId) -> Result<&Schema> {
        self.schemas
            .get(id.0)
            .ok_or(Error::UnregisteredStruct { id: id.0 })
    }

    pub fn lookup(&self, api_name: &str) -> Option<SchemaId> {
        self.by_name.get(api_name).copied()
    }

    /// Display name of a schema, issued on first request and memoized.
    pub fn name_of(&mut self, id: SchemaId) -> Result<String> {
        if let Some(name) = self.display_names.get(&id) {
            return Ok(name.clone());
        }
        let preferred = type_ident(&self.schema(id)?.api_name);
        let name = self.names.get(&preferred);
        self.display_names.insert(id, name.clone());
        Ok(name)
    }

    /// Resolve a type to its generated representation.
    pub fn target_type_of(&mut self, ty: &Type) -> Result<TargetType> {
        match ty {
            Type::Primitive(p) => Ok(p.target()),
            Type::Array(elem) => Ok(TargetType::Seq(Box::new(self.target_type_of(elem)?))),
            Type::Struct(id) => Ok(TargetType::Named(self.name_of(*id)?)),
            Type::Reference(name) => self.reference_target(name, "type reference"),
        }
    }

    /// Resolve `$ref: name`. References to struct schemas yield the
    /// schema's name without looking at its properties.
    pub fn reference_target(&mut self, name: &str, context: &str) -> Result<TargetType> {
        let id = self
            .lookup(name)
            .ok_or_else(|| Error::UnresolvedReference {
                reference: name.to_string(),
                context: context.to_string(),
            })?;
        if let Some(shape) = self.shapes.get(&id) {
            return Ok(shape.clone());
        }
        let ty = self.schemas[id.0].ty.clone();
        if !self.resolving.insert(id) {
            return Err(Error::ReferenceCycle {
                schema: name.to_string(),
            });
        }
        let shape = self.target_type_of(&ty);
        self.resolving.remove(&id);
        let shape = shape?;
        self.shapes.insert(id, shape.clone());
        Ok(shape)
    }

    fn add_schema(&mut self, api_name: &str, def: &JsonSchema) -> Result<SchemaId> {
        if self.by_name.contains_key(api_name) {
            return Err(Error::DuplicateSchema {
                api_name: api_name.to_string(),
            });
        }
        let id = SchemaId(self.schemas.len());
        self.schemas.push(Schema {
            api_name: api_name.to_string(),
            description: def.description.clone(),
            // Placeholder until `populate` classifies the definition.
            ty: Type::Struct(id),
            properties: Vec::new(),
        });
        self.by_name.insert(api_name.to_string(), id);
        Ok(id)
    }

    fn add_sub_schema(&mut self, api_name: String, def: &JsonSchema) -> Result<SchemaId> {
        let id = self.add_schema(&api_name, def)?;
        debug!(schema = %api_name, "synthesized sub-schema");
        self.populate(id, def)?;
        Ok(id)
    }

    fn populate(&mut self, id: SchemaId, def: &JsonSchema) -> Result<()> {
        let api_name = self.schemas[id.0].api_name.clone();
        let ty = match (def.kind, &def.reference) {
            (Some(SchemaKind::Object), _) => {
                let mut properties = Vec::with_capacity(def.properties.len());
                for (prop_name, prop) in &def.properties {
                    properties.push(Property {
                        api_name: prop_name.clone(),
                        description: prop.description.clone(),
                        ty: self.property_type(&api_name, prop_name, prop)?,
                    });
                }
                self.schemas[id.0].properties = properties;
                Type::Struct(id)
            }
            (Some(SchemaKind::Array), _) => {
                let items = def.items.as_deref().ok_or_else(|| Error::MissingItems {
                    path: api_name.clone(),
                })?;
                let elem = if let Some(leaf) = leaf_type(items) {
                    leaf
                } else if items.kind == Some(SchemaKind::Object) {
                    Type::Struct(self.add_sub_schema(format!("{api_name}.Item"), items)?)
                } else {
                    return Err(Error::UnsupportedProperty {
                        path: format!("{api_name}.Item"),
                        fragment: fragment(items),
                    });
                };
                Type::Array(Box::new(elem))
            }
            (None, Some(reference)) => Type::Reference(reference.clone()),
            _ => {
                return Err(Error::UnsupportedSchema {
                    schema: api_name,
                    fragment: fragment(def),
                });
            }
        };
        self.schemas[id.0].ty = ty;
        Ok(())
    }

    fn property_type(&mut self, parent: &str, prop_name: &str, prop: &JsonSchema) -> Result<Type> {
        if let Some(kind) = prop.kind
            && let Some(p) = PrimitiveType::new(kind, prop.format.as_deref())
        {
            return Ok(Type::Primitive(p));
        }
        let path = format!("{parent}.{prop_name}");
        match (prop.kind, &prop.reference) {
            (Some(SchemaKind::Array), _) => {
                let items = prop
                    .items
                    .as_deref()
                    .ok_or_else(|| Error::MissingItems { path: path.clone() })?;
                if let Some(leaf) = leaf_type(items) {
                    return Ok(Type::Array(Box::new(leaf)));
                }
                match items.kind {
                    Some(SchemaKind::Object) => {
                        let id = self.add_sub_schema(path, items)?;
                        Ok(Type::Array(Box::new(Type::Struct(id))))
                    }
                    Some(SchemaKind::Array) => {
                        let inner = items
                            .items
                            .as_deref()
                            .ok_or_else(|| Error::MissingItems { path: path.clone() })?;
                        let elem = if let Some(leaf) = leaf_type(inner) {
                            leaf
                        } else if inner.kind == Some(SchemaKind::Object) {
                            // The inner array gets no name of its own.
                            Type::Struct(self.add_sub_schema(path, inner)?)
                        } else {
                            return Err(Error::UnsupportedProperty {
                                path,
                                fragment: fragment(items),
                            });
                        };
                        Ok(Type::Array(Box::new(Type::Array(Box::new(elem)))))
                    }
                    _ => Err(Error::UnsupportedProperty {
                        path,
                        fragment: fragment(items),
                    }),
                }
            }
            (Some(SchemaKind::Object), _) => Ok(Type::Struct(self.add_sub_schema(path, prop)?)),
            (None, Some(reference)) => Ok(Type::Reference(reference.clone())),
            _ => Err(Error::UnsupportedProperty {
                path,
                fragment: fragment(prop),
            }),
        }
    }

    fn check_references(&self) -> Result<()> {
        for schema in &self.schemas {
            check_type(self, &schema.ty, &schema.api_name)?;
            for prop in &schema.properties {
                let context = format!("{}.{}", schema.api_name, prop.api_name);
                check_type(self, &prop.ty, &context)?;
            }
        }
        Ok(())
    }
}

fn check_type(graph: &TypeGraph, ty: &Type, context: &str) -> Result<()> {
    match ty {
        Type::Primitive(_) => Ok(()),
        Type::Array(elem) => check_type(graph, elem, context),
        Type::Struct(id) => graph.schema(*id).map(|_| ()),
        Type::Reference(name) if graph.lookup(name).is_some() => Ok(()),
        Type::Reference(name) => Err(Error::UnresolvedReference {
            reference: name.clone(),
            context: context.to_string(),
        }),
    }
}

/// A primitive or a bare `$ref`: element shapes that need no sub-schema.
fn leaf_type(def: &JsonSchema) -> Option<Type> {
    match def.kind {
        Some(kind) => PrimitiveType::new(kind, def.format.as_deref()).map(Type::Primitive),
        None => def.reference.clone().map(Type::Reference),
    }
}

fn fragment(def: &JsonSchema) -> String {
    serde_json::to_string_pretty(def).unwrap_or_default()
}
