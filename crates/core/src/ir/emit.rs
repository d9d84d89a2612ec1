//! Rust code emission via the Emit trait.
//!
//! Each AST type implements `Emit`; nested blocks are indented with
//! [`indent`] so every node can emit itself at column zero.

use super::types::{
    Receiver, RsConst, RsExpr, RsField, RsFn, RsImpl, RsItem, RsModule, RsParam, RsStmt, RsStruct,
    RsType, RsTypeAlias,
};
use super::utils::{escape_rust_string, indent};

/// Trait for emitting Rust code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its Rust source representation.
    fn emit(&self) -> String;
}

fn emit_list<T: Emit>(items: &[T]) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(", ")
}

fn emit_block(body: &[RsStmt]) -> String {
    if body.is_empty() {
        return "{}".to_string();
    }
    let inner = body.iter().map(Emit::emit).collect::<Vec<_>>().join("\n");
    format!("{{\n{}\n}}", indent(&inner, 1))
}

fn push_lines(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}

// =============================================================================
// Types and expressions
// =============================================================================

impl Emit for RsType {
    fn emit(&self) -> String {
        match self {
            RsType::Path(p) => p.clone(),
            RsType::Option(inner) => format!("Option<{}>", inner.emit()),
            RsType::Vec(inner) => format!("Vec<{}>", inner.emit()),
            RsType::Box(inner) => format!("Box<{}>", inner.emit()),
            RsType::Result { ok, err } => format!("Result<{}, {}>", ok.emit(), err.emit()),
            RsType::Unit => "()".to_string(),
        }
    }
}

impl Emit for RsExpr {
    fn emit(&self) -> String {
        match self {
            RsExpr::Ident(name) => name.clone(),
            RsExpr::Str(s) => format!("\"{}\"", escape_rust_string(s)),
            RsExpr::Call { callee, args } => format!("{}({})", callee.emit(), emit_list(args)),
            RsExpr::MethodCall {
                receiver,
                method,
                args,
            } => format!("{}.{}({})", receiver.emit(), method, emit_list(args)),
            RsExpr::Field { base, name } => format!("{}.{}", base.emit(), name),
            RsExpr::Ref(inner) => format!("&{}", inner.emit()),
            RsExpr::Struct { name, fields } => {
                if fields.is_empty() {
                    return format!("{name} {{}}");
                }
                let lines: Vec<String> = fields
                    .iter()
                    .map(|(field, value)| match value {
                        RsExpr::Ident(v) if v == field => format!("{field},"),
                        _ => format!("{field}: {},", value.emit()),
                    })
                    .collect();
                format!("{name} {{\n{}\n}}", indent(&lines.join("\n"), 1))
            }
            RsExpr::Try(inner) => format!("{}?", inner.emit()),
            RsExpr::Await(inner) => format!("{}.await", inner.emit()),
            RsExpr::Some(inner) => format!("Some({})", inner.emit()),
            RsExpr::Raw(code) => code.clone(),
        }
    }
}

// =============================================================================
// Statements and functions
// =============================================================================

impl Emit for RsStmt {
    fn emit(&self) -> String {
        match self {
            RsStmt::Let {
                name,
                mutable,
                value,
            } => {
                let kw = if *mutable { "let mut" } else { "let" };
                format!("{kw} {name} = {};", value.emit())
            }
            RsStmt::Expr(expr) => format!("{};", expr.emit()),
            RsStmt::Assign { target, value } => format!("{} = {};", target.emit(), value.emit()),
            RsStmt::Tail(expr) => expr.emit(),
            RsStmt::IfLet {
                pattern,
                value,
                body,
            } => format!("if let {pattern} = {} {}", value.emit(), emit_block(body)),
            RsStmt::For {
                pattern,
                iter,
                body,
            } => format!("for {pattern} in {} {}", iter.emit(), emit_block(body)),
        }
    }
}

impl Emit for RsParam {
    fn emit(&self) -> String {
        format!("{}: {}", self.name, self.ty.emit())
    }
}

impl Emit for RsFn {
    fn emit(&self) -> String {
        let mut out = String::new();
        push_lines(&mut out, &self.doc);
        if self.public {
            out.push_str("pub ");
        }
        if self.is_async {
            out.push_str("async ");
        }
        let mut params: Vec<String> = match self.receiver {
            Receiver::None => Vec::new(),
            Receiver::Ref => vec!["&self".to_string()],
            Receiver::OwnedMut => vec!["mut self".to_string()],
        };
        params.extend(self.params.iter().map(Emit::emit));
        out.push_str(&format!("fn {}({})", self.name, params.join(", ")));
        if let Some(ret) = &self.ret {
            out.push_str(&format!(" -> {}", ret.emit()));
        }
        out.push(' ');
        out.push_str(&emit_block(&self.body));
        out
    }
}

// =============================================================================
// Items
// =============================================================================

impl Emit for RsField {
    fn emit(&self) -> String {
        let mut out = String::new();
        push_lines(&mut out, &self.doc);
        push_lines(&mut out, &self.attrs);
        let vis = if self.public { "pub " } else { "" };
        out.push_str(&format!("{vis}{}: {},", self.name, self.ty.emit()));
        out
    }
}

impl Emit for RsStruct {
    fn emit(&self) -> String {
        let mut out = String::new();
        push_lines(&mut out, &self.doc);
        push_lines(&mut out, &self.attrs);
        if self.fields.is_empty() {
            out.push_str(&format!("pub struct {} {{}}", self.name));
            return out;
        }
        let fields = self
            .fields
            .iter()
            .map(Emit::emit)
            .collect::<Vec<_>>()
            .join("\n");
        out.push_str(&format!("pub struct {} {{\n{}\n}}", self.name, indent(&fields, 1)));
        out
    }
}

impl Emit for RsTypeAlias {
    fn emit(&self) -> String {
        let mut out = String::new();
        push_lines(&mut out, &self.doc);
        out.push_str(&format!("pub type {} = {};", self.name, self.ty.emit()));
        out
    }
}

impl Emit for RsConst {
    fn emit(&self) -> String {
        let mut out = String::new();
        push_lines(&mut out, &self.doc);
        out.push_str(&format!(
            "pub const {}: &str = \"{}\";",
            self.name,
            escape_rust_string(&self.value)
        ));
        out
    }
}

impl Emit for RsImpl {
    fn emit(&self) -> String {
        if self.fns.is_empty() {
            return format!("impl {} {{}}", self.target);
        }
        let fns = self
            .fns
            .iter()
            .map(Emit::emit)
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("impl {} {{\n{}\n}}", self.target, indent(&fns, 1))
    }
}

impl Emit for RsItem {
    fn emit(&self) -> String {
        match self {
            RsItem::Const(c) => c.emit(),
            RsItem::Struct(s) => s.emit(),
            RsItem::TypeAlias(t) => t.emit(),
            RsItem::Impl(i) => i.emit(),
        }
    }
}

impl Emit for RsModule {
    fn emit(&self) -> String {
        let mut out = String::new();
        for line in &self.inner_doc {
            if line.is_empty() {
                out.push_str("//!\n");
            } else {
                out.push_str(&format!("//! {line}\n"));
            }
        }
        if !self.inner_doc.is_empty() {
            out.push('\n');
        }
        for attr in &self.attrs {
            out.push_str(attr);
            out.push('\n');
        }
        if !self.attrs.is_empty() {
            out.push('\n');
        }
        for u in &self.uses {
            out.push_str(&format!("use {u};\n"));
        }
        for item in &self.items {
            out.push('\n');
            out.push_str(&item.emit());
            out.push('\n');
        }
        out
    }
}
