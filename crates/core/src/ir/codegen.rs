//! Code generation from API IR to Rust AST.
//!
//! This module transforms the resolved API IR (records, services, calls)
//! into Rust AST nodes. The generated module links against
//! `discogen_runtime`, imported as `runtime`.
//!
//! The generated AST can then be emitted to strings via the `Emit` trait.

use crate::typegraph::TargetType;

use super::api::{ApiModel, CallIR, FieldIR, RecordIR, RecordKind, ResourceIR, SetterIR};
use super::types::{
    Receiver, RsConst, RsExpr, RsField, RsFn, RsImpl, RsItem, RsModule, RsParam, RsStmt, RsStruct,
    RsType, RsTypeAlias,
};
use super::utils::{capitalize_first, doc_lines};

const RECORD_DERIVES: &str = "#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]";
const SERVICE_DERIVES: &str = "#[derive(Debug, Clone)]";

/// Generate a complete Rust module from API IR.
pub fn codegen_module(api: &ApiModel) -> RsModule {
    let mut items = codegen_constants(api);
    items.extend(codegen_services(api));
    items.extend(api.records.iter().map(codegen_record));
    for call in &api.top_level_calls {
        items.extend(codegen_call(call));
    }
    for resource in &api.resources {
        for call in &resource.calls {
            items.extend(codegen_call(call));
        }
    }

    RsModule {
        inner_doc: codegen_module_doc(api),
        attrs: vec!["#![allow(dead_code, unused_imports, clippy::all)]".to_string()],
        uses: vec![
            "discogen_runtime as runtime".to_string(),
            "serde::{Deserialize, Serialize}".to_string(),
        ],
        items,
    }
}

fn codegen_module_doc(api: &ApiModel) -> Vec<String> {
    let title = if api.title.is_empty() {
        api.name.as_str()
    } else {
        api.title.as_str()
    };
    let mut lines = vec![format!("Client for the {title} (`{}`).", api.id)];
    if let Some(link) = &api.documentation_link {
        lines.push(String::new());
        lines.push(format!("See <{link}>"));
    }
    lines.push(String::new());
    lines.push(format!(
        "Usage: `let service = {}::{}::{}(reqwest::Client::new());`",
        api.package, api.root_service, api.constructor
    ));
    lines.push(String::new());
    lines.push("Generated by discogen. Do not edit.".to_string());
    lines
}

/// Map a resolved type to its Rust spelling.
pub fn rs_type(ty: &TargetType) -> RsType {
    match ty {
        TargetType::Scalar { scalar, .. } => RsType::path(scalar.rust_type()),
        TargetType::Seq(elem) => RsType::Vec(Box::new(rs_type(elem))),
        TargetType::Named(name) => RsType::path(name.clone()),
    }
}

fn doc_or_empty(text: Option<&str>) -> Vec<String> {
    text.filter(|t| !t.trim().is_empty())
        .map(doc_lines)
        .unwrap_or_default()
}

// =============================================================================
// Constants
// =============================================================================

fn codegen_constants(api: &ApiModel) -> Vec<RsItem> {
    let fixed = [
        ("API_ID", &api.id),
        ("API_NAME", &api.name),
        ("API_VERSION", &api.version),
        ("BASE_PATH", &api.base_url),
    ];
    let mut items: Vec<RsItem> = fixed
        .into_iter()
        .map(|(name, value)| {
            RsItem::Const(RsConst {
                doc: vec![],
                name: name.to_string(),
                value: value.clone(),
            })
        })
        .collect();
    for scope in &api.scopes {
        items.push(RsItem::Const(RsConst {
            doc: doc_or_empty(scope.description.as_deref()),
            name: scope.const_name.clone(),
            value: scope.url.clone(),
        }));
    }
    items
}

// =============================================================================
// Services
// =============================================================================

fn client_field() -> RsField {
    RsField {
        doc: vec![],
        attrs: vec![],
        public: false,
        name: "client_".to_string(),
        ty: RsType::path("runtime::Client"),
    }
}

fn codegen_services(api: &ApiModel) -> Vec<RsItem> {
    let mut fields = vec![client_field()];
    fields.extend(api.resources.iter().map(|r| RsField {
        doc: vec![],
        attrs: vec![],
        public: true,
        name: r.field.clone(),
        ty: RsType::path(r.type_name.clone()),
    }));

    let mut client = RsExpr::call(
        "runtime::Client::new",
        vec![RsExpr::ident("http"), RsExpr::ident("BASE_PATH")],
    );
    if api.data_wrapper {
        client = client.method("with_data_wrapper", vec![RsExpr::ident("true")]);
    }
    let mut init: Vec<(String, RsExpr)> = api
        .resources
        .iter()
        .map(|r| {
            (
                r.field.clone(),
                RsExpr::Struct {
                    name: r.type_name.clone(),
                    fields: vec![(
                        "client_".to_string(),
                        RsExpr::ident("client_").method("clone", vec![]),
                    )],
                },
            )
        })
        .collect();
    init.push(("client_".to_string(), RsExpr::ident("client_")));

    let constructor = RsFn {
        doc: vec!["/// Create a service that sends requests through `http`.".to_string()],
        public: true,
        is_async: false,
        name: api.constructor.clone(),
        receiver: Receiver::None,
        params: vec![RsParam {
            name: "http".to_string(),
            ty: RsType::path("runtime::reqwest::Client"),
        }],
        ret: Some(RsType::path("Self")),
        body: vec![
            RsStmt::Let {
                name: "client_".to_string(),
                mutable: false,
                value: client,
            },
            RsStmt::Tail(RsExpr::Struct {
                name: "Self".to_string(),
                fields: init,
            }),
        ],
    };

    let mut root_fns = vec![constructor];
    root_fns.extend(api.top_level_calls.iter().map(codegen_call_constructor));

    let mut items = vec![
        RsItem::Struct(RsStruct {
            doc: vec![format!("/// Entry point for the {} API.", api.name)],
            attrs: vec![SERVICE_DERIVES.to_string()],
            name: api.root_service.clone(),
            fields,
        }),
        RsItem::Impl(RsImpl {
            target: api.root_service.clone(),
            fns: root_fns,
        }),
    ];
    for resource in &api.resources {
        items.extend(codegen_resource_service(resource));
    }
    items
}

fn codegen_resource_service(resource: &ResourceIR) -> Vec<RsItem> {
    vec![
        RsItem::Struct(RsStruct {
            doc: vec![format!("/// Calls of the `{}` resource.", resource.api_name)],
            attrs: vec![SERVICE_DERIVES.to_string()],
            name: resource.type_name.clone(),
            fields: vec![client_field()],
        }),
        RsItem::Impl(RsImpl {
            target: resource.type_name.clone(),
            fns: resource.calls.iter().map(codegen_call_constructor).collect(),
        }),
    ]
}

// =============================================================================
// Records
// =============================================================================

fn codegen_record(record: &RecordIR) -> RsItem {
    let doc = doc_or_empty(record.description.as_deref());
    match &record.kind {
        RecordKind::Struct { fields } => RsItem::Struct(RsStruct {
            doc,
            attrs: vec![RECORD_DERIVES.to_string()],
            name: record.name.clone(),
            fields: fields.iter().map(codegen_record_field).collect(),
        }),
        RecordKind::Alias { target } => RsItem::TypeAlias(RsTypeAlias {
            doc,
            name: record.name.clone(),
            ty: rs_type(target),
        }),
    }
}

fn codegen_record_field(field: &FieldIR) -> RsField {
    let inner = match &field.ty {
        TargetType::Named(_) => RsType::Box(Box::new(rs_type(&field.ty))),
        other => rs_type(other),
    };
    let mut serde = format!(
        "rename = \"{}\", default, skip_serializing_if = \"Option::is_none\"",
        super::utils::escape_rust_string(&field.api_name)
    );
    if field.ty.is_string_encoded() {
        serde.push_str(", with = \"runtime::wire::string\"");
    }
    RsField {
        doc: doc_or_empty(field.description.as_deref()),
        attrs: vec![format!("#[serde({serde})]")],
        public: true,
        name: field.ident.clone(),
        ty: RsType::option(inner),
    }
}

// =============================================================================
// Call builders
// =============================================================================

fn self_field(name: &str) -> RsExpr {
    RsExpr::ident("self").field(name)
}

/// The service method that creates a call builder from its arguments.
fn codegen_call_constructor(call: &CallIR) -> RsFn {
    let mut fields = vec![(
        "client_".to_string(),
        self_field("client_").method("clone", vec![]),
    )];
    fields.extend(
        call.args
            .iter()
            .map(|a| (a.ident.clone(), RsExpr::ident(a.ident.clone()))),
    );
    fields.push(("opts_".to_string(), RsExpr::Raw("runtime::Options::default()".into())));
    if call.supports_media {
        fields.push(("media_".to_string(), RsExpr::Raw("None".into())));
    }

    let description = call.description.as_deref().unwrap_or_default();
    let mut doc = doc_lines(&format!(
        "{}: {}",
        capitalize_first(&call.method_ident),
        description
    ));
    doc.push("///".to_string());
    doc.push(format!("/// Method id: `{}`.", call.method_id));

    RsFn {
        doc,
        public: true,
        is_async: false,
        name: call.method_ident.clone(),
        receiver: Receiver::Ref,
        params: call
            .args
            .iter()
            .map(|a| RsParam {
                name: a.ident.clone(),
                ty: rs_type(&a.ty),
            })
            .collect(),
        ret: Some(RsType::path(call.type_name.clone())),
        body: vec![RsStmt::Tail(RsExpr::Struct {
            name: call.type_name.clone(),
            fields,
        })],
    }
}

fn codegen_call(call: &CallIR) -> Vec<RsItem> {
    let mut fields = vec![client_field()];
    fields.extend(call.args.iter().map(|a| RsField {
        doc: vec![],
        attrs: vec![],
        public: false,
        name: a.ident.clone(),
        ty: rs_type(&a.ty),
    }));
    fields.push(RsField {
        doc: vec![],
        attrs: vec![],
        public: false,
        name: "opts_".to_string(),
        ty: RsType::path("runtime::Options"),
    });
    if call.supports_media {
        fields.push(RsField {
            doc: vec![],
            attrs: vec![],
            public: false,
            name: "media_".to_string(),
            ty: RsType::option(RsType::path("runtime::Media")),
        });
    }

    let mut fns: Vec<RsFn> = call.setters.iter().map(codegen_setter).collect();
    if call.supports_media {
        fns.push(codegen_media_setter());
    }
    fns.push(codegen_execute(call));

    vec![
        RsItem::Struct(RsStruct {
            doc: vec![format!("/// Builder for the `{}` call.", call.method_id)],
            attrs: vec![SERVICE_DERIVES.to_string()],
            name: call.type_name.clone(),
            fields,
        }),
        RsItem::Impl(RsImpl {
            target: call.type_name.clone(),
            fns,
        }),
    ]
}

fn codegen_setter(setter: &SetterIR) -> RsFn {
    let description = setter
        .description
        .as_deref()
        .unwrap_or_default()
        .replacen("Optional.", "", 1);
    let doc = doc_lines(&format!(
        "Sets the optional parameter \"{}\": {}",
        setter.api_name,
        description.trim()
    ));
    let store = match &setter.ty {
        TargetType::Seq(_) => "set_all",
        _ => "set",
    };
    RsFn {
        doc,
        public: true,
        is_async: false,
        name: setter.ident.clone(),
        receiver: Receiver::OwnedMut,
        params: vec![RsParam {
            name: setter.ident.clone(),
            ty: rs_type(&setter.ty),
        }],
        ret: Some(RsType::path("Self")),
        body: vec![
            RsStmt::Expr(self_field("opts_").method(
                store,
                vec![
                    RsExpr::str(setter.api_name.clone()),
                    RsExpr::ident(setter.ident.clone()),
                ],
            )),
            RsStmt::Tail(RsExpr::ident("self")),
        ],
    }
}

fn codegen_media_setter() -> RsFn {
    RsFn {
        doc: vec!["/// Attach content to upload with the call.".to_string()],
        public: true,
        is_async: false,
        name: "media".to_string(),
        receiver: Receiver::OwnedMut,
        params: vec![RsParam {
            name: "media".to_string(),
            ty: RsType::path("runtime::Media"),
        }],
        ret: Some(RsType::path("Self")),
        body: vec![
            RsStmt::Assign {
                target: self_field("media_"),
                value: RsExpr::Some(Box::new(RsExpr::ident("media"))),
            },
            RsStmt::Tail(RsExpr::ident("self")),
        ],
    }
}

fn req_call(method: &str, args: Vec<RsExpr>) -> RsStmt {
    RsStmt::Expr(RsExpr::ident("req").method(method, args))
}

fn codegen_execute(call: &CallIR) -> RsFn {
    let mut body = vec![RsStmt::Let {
        name: "req".to_string(),
        mutable: true,
        value: RsExpr::call(
            "runtime::Request::new",
            vec![
                RsExpr::str(call.http_method.clone()),
                RsExpr::str(call.path.clone()),
            ],
        ),
    }];
    for (name, ident) in &call.path_bindings {
        body.push(req_call(
            "path_param",
            vec![RsExpr::str(name.clone()), self_field(ident).reference()],
        ));
    }
    for (name, ident) in &call.required_query {
        body.push(req_call(
            "set_query",
            vec![RsExpr::str(name.clone()), self_field(ident).reference()],
        ));
    }
    for (name, ident) in &call.required_repeated_query {
        body.push(RsStmt::For {
            pattern: "v".to_string(),
            iter: self_field(ident).reference(),
            body: vec![req_call("add_query", vec![RsExpr::str(name.clone()), RsExpr::ident("v")])],
        });
    }
    body.push(req_call("apply_options", vec![self_field("opts_").reference()]));
    if let Some(ident) = &call.body {
        let string_encoded = call
            .args
            .iter()
            .any(|a| &a.ident == ident && a.ty.is_string_encoded());
        let encode = if string_encoded { "wire_body" } else { "json_body" };
        body.push(RsStmt::Expr(
            RsExpr::ident("req")
                .method(encode, vec![self_field(ident).reference()])
                .try_(),
        ));
    }
    if call.supports_media {
        if let Some(path) = &call.upload_path {
            body.push(req_call("upload_path", vec![RsExpr::str(path.clone())]));
        }
        body.push(RsStmt::IfLet {
            pattern: "Some(media)".to_string(),
            value: self_field("media_").reference(),
            body: vec![req_call(
                "media",
                vec![RsExpr::ident("media").method("clone", vec![])],
            )],
        });
    }

    let (exec, ok) = match &call.response {
        Some(ty) if ty.is_string_encoded() => ("execute_wire", rs_type(ty)),
        Some(ty) => ("execute_json", rs_type(ty)),
        None => ("execute_empty", RsType::Unit),
    };
    body.push(RsStmt::Tail(
        self_field("client_")
            .method(exec, vec![RsExpr::ident("req")])
            .await_(),
    ));

    RsFn {
        doc: vec!["/// Send the request.".to_string()],
        public: true,
        is_async: true,
        name: "execute".to_string(),
        receiver: Receiver::Ref,
        params: vec![],
        ret: Some(RsType::Result {
            ok: Box::new(ok),
            err: Box::new(RsType::path("runtime::Error")),
        }),
        body,
    }
}
