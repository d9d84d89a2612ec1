//! Normalization from a discovery document to API IR.
//!
//! This module owns all discovery-specific decisions:
//! - Name allocation order (services, schemas, call builders)
//! - Schema resolution through the [`TypeGraph`]
//! - Per-method argument and setter classification

use tracing::{debug, warn};

use crate::callmodel::{self, Method, Resource};
use crate::discovery::{Location, RestDescription};
use crate::error::Result;
use crate::names::{NameAllocator, type_ident};
use crate::typegraph::{SchemaId, TypeGraph};

use super::api::{
    ApiModel, ArgIR, CallIR, FieldIR, RecordIR, RecordKind, ResourceIR, ScopeIR, SetterIR,
};
use super::utils::{sanitize_rust_identifier, to_screaming_snake};

/// Names a schema must never take because generated code refers to them.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "New",
    "Option",
    "Some",
    "None",
    "Result",
    "Ok",
    "Err",
    "String",
    "Vec",
    "Box",
    "Default",
    "Clone",
    "Debug",
    "PartialEq",
    "Serialize",
    "Deserialize",
];

/// Constants emitted for every API.
const FIXED_CONSTANTS: &[&str] = &["API_ID", "API_NAME", "API_VERSION", "BASE_PATH"];

/// Identifiers every call builder already uses.
const CALL_BUILDER_METHODS: &[&str] = &["self", "execute", "media"];

/// State of one API's generation: the API-wide name allocator (inside the
/// type graph) and everything resolved so far.
#[derive(Debug)]
pub struct GenerationPass<'a> {
    doc: &'a RestDescription,
    graph: TypeGraph,
}

impl<'a> GenerationPass<'a> {
    pub fn new(doc: &'a RestDescription) -> Self {
        Self {
            doc,
            graph: TypeGraph::with_names(NameAllocator::seeded(RESERVED_TYPE_NAMES.iter().copied())),
        }
    }

    /// Resolve the whole document. Fails on the first problem found.
    pub fn run(mut self) -> Result<ApiModel> {
        let doc = self.doc;
        let scopes = self.scopes()?;
        let base_url = doc.base_url()?;

        let root_service = self.graph.names_mut().get("Service");
        let resources = callmodel::resources(doc)?;
        let mut fields = NameAllocator::seeded(["client_"]);
        let services: Vec<(String, String)> = resources
            .iter()
            .map(|r| {
                let field = fields.get(&sanitize_rust_identifier(&r.name));
                let type_name = self
                    .graph
                    .names_mut()
                    .get(&format!("{}Service", type_ident(&r.name)));
                (field, type_name)
            })
            .collect();

        self.graph.resolve(&doc.schemas)?;
        let ids: Vec<SchemaId> = self.graph.schemas().map(|(id, _)| id).collect();
        for id in &ids {
            self.graph.name_of(*id)?;
        }
        let records = ids
            .into_iter()
            .map(|id| self.record(id))
            .collect::<Result<Vec<_>>>()?;

        let mut root_methods = NameAllocator::seeded(["new"]);
        let top_level_calls = callmodel::top_level_methods(doc)?
            .iter()
            .map(|m| self.call(m, &mut root_methods))
            .collect::<Result<Vec<_>>>()?;

        let resources = resources
            .iter()
            .zip(services)
            .map(|(resource, (field, type_name))| self.resource(resource, field, type_name))
            .collect::<Result<Vec<_>>>()?;

        Ok(ApiModel {
            id: doc.id.clone(),
            name: doc.name.clone(),
            version: doc.version.clone(),
            title: doc.title.clone(),
            description: doc.description.clone(),
            documentation_link: doc.documentation_link.clone(),
            package: doc.package(),
            base_url,
            data_wrapper: doc.needs_data_wrapper(),
            scopes,
            root_service,
            constructor: "new".to_string(),
            records,
            resources,
            top_level_calls,
        })
    }

    fn scopes(&self) -> Result<Vec<ScopeIR>> {
        let mut consts = NameAllocator::seeded(FIXED_CONSTANTS.iter().copied());
        Ok(callmodel::scopes(self.doc)?
            .into_iter()
            .map(|scope| ScopeIR {
                const_name: consts.get(&to_screaming_snake(&scope.ident)),
                url: scope.url,
                description: scope.description,
            })
            .collect())
    }

    fn record(&mut self, id: SchemaId) -> Result<RecordIR> {
        let schema = self.graph.schema(id)?.clone();
        let name = self.graph.name_of(id)?;
        let kind = if schema.is_struct() {
            let mut idents = NameAllocator::new();
            let fields = schema
                .properties
                .iter()
                .map(|prop| -> Result<FieldIR> {
                    Ok(FieldIR {
                        ident: idents.get(&sanitize_rust_identifier(&prop.api_name)),
                        api_name: prop.api_name.clone(),
                        description: prop.description.clone(),
                        ty: self.graph.target_type_of(&prop.ty)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            RecordKind::Struct { fields }
        } else {
            RecordKind::Alias {
                target: self.graph.target_type_of(&schema.ty)?,
            }
        };
        Ok(RecordIR {
            name,
            api_name: schema.api_name,
            description: schema.description,
            kind,
        })
    }

    fn resource(&mut self, resource: &Resource, field: String, type_name: String) -> Result<ResourceIR> {
        let mut methods = NameAllocator::new();
        let calls = resource
            .methods()
            .iter()
            .map(|m| self.call(m, &mut methods))
            .collect::<Result<Vec<_>>>()?;
        Ok(ResourceIR {
            api_name: resource.name.clone(),
            field,
            type_name,
            calls,
        })
    }

    fn call(&mut self, method: &Method, service_methods: &mut NameAllocator) -> Result<CallIR> {
        let prefix = method.resource.as_deref().map(type_ident).unwrap_or_default();
        let type_name = self
            .graph
            .names_mut()
            .get(&format!("{prefix}{}Call", type_ident(&method.name)));

        let args = method.arguments(&mut self.graph)?;
        let bound = |params: Vec<&callmodel::Param>| -> Vec<(String, String)> {
            params
                .into_iter()
                .filter_map(|p| args.get(&p.name).map(|a| (p.name.clone(), a.ident.clone())))
                .collect()
        };
        let required_query = bound(method.required_query_params());
        let required_repeated_query = bound(method.required_repeated_query_params());
        let path_bindings = args
            .for_location(Location::Path)
            .map(|a| (a.api_name.clone(), a.ident.clone()))
            .collect();

        let mut setter_names = NameAllocator::seeded(CALL_BUILDER_METHODS.iter().copied());
        let mut setters: Vec<SetterIR> = method
            .optional_params()
            .into_iter()
            .map(|p| SetterIR {
                api_name: p.name.clone(),
                ident: setter_names.get(&sanitize_rust_identifier(&p.name)),
                description: p.description.clone(),
                ty: p.target_type(),
            })
            .collect();
        for p in method.unbound_required_params() {
            warn!(
                method = %method.id,
                param = %p.name,
                "required parameter missing from parameterOrder, exposing it as a setter"
            );
            setters.push(SetterIR {
                api_name: p.name.clone(),
                ident: setter_names.get(&sanitize_rust_identifier(&p.name)),
                description: p.description.clone(),
                ty: p.target_type(),
            });
        }

        let response = method.response_type(&mut self.graph)?;
        debug!(call = %type_name, method = %method.id, args = args.iter().count(), "built call builder");

        Ok(CallIR {
            method_ident: service_methods.get(&sanitize_rust_identifier(&method.name)),
            type_name,
            method_id: method.id.clone(),
            http_method: method.http_method.clone(),
            path: method.path.clone(),
            description: method.description.clone(),
            body: args.body().map(|a| a.ident.clone()),
            args: args
                .iter()
                .map(|a| ArgIR {
                    api_name: a.api_name.clone(),
                    ident: a.ident.clone(),
                    ty: a.target.clone(),
                    location: a.location,
                })
                .collect(),
            required_query,
            required_repeated_query,
            path_bindings,
            setters,
            response,
            supports_media: method.supports_media(),
            upload_path: method.media_path().map(str::to_string),
        })
    }
}

/// Normalize a discovery document into API IR.
pub fn normalize_spec(doc: &RestDescription) -> Result<ApiModel> {
    GenerationPass::new(doc).run()
}
