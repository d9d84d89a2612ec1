//! Per-operation call contracts: which parameters become constructor
//! arguments, which become setters, and what the call returns.

use std::collections::HashSet;

use crate::discovery::{Location, RestDescription, RestMethod, RestParameter, RestResource, ScopeInfo};
use crate::error::{Error, Result};
use crate::ir::utils::sanitize_rust_identifier;
use crate::names::type_ident;
use crate::typegraph::{PrimitiveType, TargetType, TypeGraph};

/// Every OAuth2 scope URL must start with this.
pub const SCOPE_PREFIX: &str = "https://www.googleapis.com/auth/";

/// API name of the synthetic request-body argument.
pub const REQUEST_ARG: &str = "REQUEST";

/// One declared parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub primitive: PrimitiveType,
    pub required: bool,
    pub repeated: bool,
    pub location: Location,
    pub description: Option<String>,
}

impl Param {
    pub fn from_doc(method: &str, name: &str, doc: &RestParameter) -> Result<Self> {
        let primitive = doc
            .kind
            .and_then(|kind| PrimitiveType::new(kind, doc.format.as_deref()))
            .ok_or_else(|| Error::UnsupportedParamType {
                method: method.to_string(),
                param: name.to_string(),
                kind: doc.kind.map(|k| k.as_str()).unwrap_or_default().to_string(),
                format: doc.format.clone().unwrap_or_default(),
            })?;
        Ok(Self {
            name: name.to_string(),
            primitive,
            required: doc.required,
            repeated: doc.repeated,
            location: doc.location,
            description: doc.description.clone(),
        })
    }

    pub fn target_type(&self) -> TargetType {
        let scalar = self.primitive.target();
        if self.repeated {
            TargetType::Seq(Box::new(scalar))
        } else {
            scalar
        }
    }
}

/// A constructor argument of a call builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Parameter name, or [`REQUEST_ARG`] for the body.
    pub api_name: String,
    /// Deduplicated Rust identifier.
    pub ident: String,
    pub target: TargetType,
    pub location: Location,
}

/// Ordered constructor arguments: `parameterOrder`, then the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    list: Vec<Argument>,
}

impl Arguments {
    /// Append `arg`, renaming it `<ident>2`, `<ident>3`, ... on collision.
    pub fn push(&mut self, mut arg: Argument) {
        let original = arg.ident.clone();
        let mut n = 1;
        while self.list.iter().any(|a| a.ident == arg.ident) {
            n += 1;
            arg.ident = format!("{original}{n}");
        }
        self.list.push(arg);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.list.iter()
    }

    pub fn for_location(&self, location: Location) -> impl Iterator<Item = &Argument> {
        self.list.iter().filter(move |a| a.location == location)
    }

    pub fn get(&self, api_name: &str) -> Option<&Argument> {
        self.list.iter().find(|a| a.api_name == api_name)
    }

    pub fn body(&self) -> Option<&Argument> {
        self.for_location(Location::Body).next()
    }
}

/// One API operation.
#[derive(Debug, Clone)]
pub struct Method {
    /// Key in the containing `methods` map.
    pub name: String,
    pub id: String,
    pub http_method: String,
    pub path: String,
    pub description: Option<String>,
    /// Declared parameters sorted by name.
    pub params: Vec<Param>,
    pub parameter_order: Vec<String>,
    pub request: Option<String>,
    pub response: Option<String>,
    /// `Some` when the method accepts a media upload; holds the simple
    /// upload path if the document gives one.
    pub media_upload: Option<Option<String>>,
    /// Containing resource, `None` for top-level methods.
    pub resource: Option<String>,
}

impl Method {
    pub fn from_doc(name: &str, resource: Option<&str>, doc: &RestMethod) -> Result<Self> {
        let id = if doc.id.is_empty() {
            name.to_string()
        } else {
            doc.id.clone()
        };
        let params = doc
            .parameters
            .iter()
            .map(|(pname, p)| Param::from_doc(&id, pname, p))
            .collect::<Result<Vec<_>>>()?;
        let parameter_order = doc.parameter_order.clone().unwrap_or_default();
        if let Some(unknown) = parameter_order
            .iter()
            .find(|pname| !doc.parameters.contains_key(*pname))
        {
            return Err(Error::UnknownParameter {
                method: id,
                param: unknown.clone(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            id,
            http_method: doc.http_method.to_uppercase(),
            path: doc.path.clone(),
            description: doc.description.clone(),
            params,
            parameter_order,
            request: doc.request.as_ref().map(|r| r.reference.clone()),
            response: doc.response.as_ref().map(|r| r.reference.clone()),
            media_upload: doc.media_upload.as_ref().map(|m| {
                m.protocols
                    .as_ref()
                    .and_then(|p| p.simple.as_ref())
                    .and_then(|s| s.path.clone())
            }),
            resource: resource.map(str::to_string),
        })
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Constructor arguments in `parameterOrder` order, body last.
    pub fn arguments(&self, graph: &mut TypeGraph) -> Result<Arguments> {
        let mut args = Arguments::default();
        for pname in &self.parameter_order {
            let param = self.param(pname).ok_or_else(|| Error::UnknownParameter {
                method: self.id.clone(),
                param: pname.clone(),
            })?;
            if param.location == Location::Path && param.repeated {
                return Err(Error::UnsupportedPathParam {
                    method: self.id.clone(),
                    param: pname.clone(),
                });
            }
            args.push(Argument {
                api_name: pname.clone(),
                ident: sanitize_rust_identifier(pname),
                target: param.target_type(),
                location: param.location,
            });
        }
        if let Some(reference) = &self.request {
            args.push(Argument {
                api_name: REQUEST_ARG.to_string(),
                ident: sanitize_rust_identifier(&reference.to_lowercase()),
                target: graph.reference_target(reference, &self.id)?,
                location: Location::Body,
            });
        }
        Ok(args)
    }

    /// Every parameter not marked required.
    pub fn optional_params(&self) -> Vec<&Param> {
        self.params.iter().filter(|p| !p.required).collect()
    }

    pub fn required_query_params(&self) -> Vec<&Param> {
        self.params
            .iter()
            .filter(|p| p.required && !p.repeated && p.location == Location::Query)
            .collect()
    }

    pub fn required_repeated_query_params(&self) -> Vec<&Param> {
        self.params
            .iter()
            .filter(|p| p.required && p.repeated && p.location == Location::Query)
            .collect()
    }

    /// Required parameters missing from `parameterOrder`.
    pub fn unbound_required_params(&self) -> Vec<&Param> {
        let bound: HashSet<&str> = self.parameter_order.iter().map(String::as_str).collect();
        self.params
            .iter()
            .filter(|p| p.required && !bound.contains(p.name.as_str()))
            .collect()
    }

    pub fn response_type(&self, graph: &mut TypeGraph) -> Result<Option<TargetType>> {
        self.response
            .as_deref()
            .map(|reference| graph.reference_target(reference, &self.id))
            .transpose()
    }

    pub fn supports_media(&self) -> bool {
        self.media_upload.is_some()
    }

    pub fn media_path(&self) -> Option<&str> {
        self.media_upload.as_ref().and_then(|p| p.as_deref())
    }
}

/// A named group of methods.
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    methods: Vec<Method>,
}

impl Resource {
    pub fn from_doc(name: &str, doc: &RestResource) -> Result<Self> {
        let methods = doc
            .methods
            .iter()
            .map(|(mname, m)| Method::from_doc(mname, Some(name), m))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            methods,
        })
    }

    /// Methods sorted by name.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

/// Resources sorted by name.
pub fn resources(doc: &RestDescription) -> Result<Vec<Resource>> {
    doc.resources
        .iter()
        .map(|(name, r)| Resource::from_doc(name, r))
        .collect()
}

/// Methods declared directly on the API, sorted by name.
pub fn top_level_methods(doc: &RestDescription) -> Result<Vec<Method>> {
    doc.methods
        .iter()
        .map(|(name, m)| Method::from_doc(name, None, m))
        .collect()
}

/// An OAuth2 scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub url: String,
    /// `DriveReadonlyScope` for `.../auth/drive.readonly`.
    pub ident: String,
    pub description: Option<String>,
}

impl Scope {
    pub fn from_doc(url: &str, info: &ScopeInfo) -> Result<Self> {
        Ok(Self {
            url: url.to_string(),
            ident: scope_identifier(url)?,
            description: info.description.clone(),
        })
    }
}

/// Scopes sorted by URL.
pub fn scopes(doc: &RestDescription) -> Result<Vec<Scope>> {
    doc.scopes()
        .iter()
        .map(|(url, info)| Scope::from_doc(url, info))
        .collect()
}

pub fn scope_identifier(url: &str) -> Result<String> {
    let rest = url.strip_prefix(SCOPE_PREFIX).ok_or_else(|| Error::BadScope {
        url: url.to_string(),
        prefix: SCOPE_PREFIX,
    })?;
    Ok(format!("{}Scope", type_ident(rest)))
}
