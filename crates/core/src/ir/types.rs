//! Rust IR types for code generation.
//!
//! This module defines the subset of Rust syntax the generator produces:
//! - RsType: type expressions (paths, `Option`, `Vec`, `Box`, `Result`)
//! - RsExpr / RsStmt: expressions and statements inside function bodies
//! - RsItem: module-level items (structs, aliases, consts, impls)

/// Rust type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsType {
    /// A path: `String`, `runtime::Client`, `Vec<i64>`
    Path(String),
    Option(Box<RsType>),
    Vec(Box<RsType>),
    Box(Box<RsType>),
    /// `Result<T, E>`
    Result { ok: Box<RsType>, err: Box<RsType> },
    /// `()`
    Unit,
}

impl RsType {
    pub fn path(p: impl Into<String>) -> Self {
        RsType::Path(p.into())
    }

    pub fn option(inner: RsType) -> Self {
        RsType::Option(Box::new(inner))
    }
}

/// Rust expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsExpr {
    /// Identifier or path: `self`, `runtime::Media::new`
    Ident(String),
    /// String literal (unescaped content)
    Str(String),
    /// Function call: `f(a, b)`
    Call { callee: Box<RsExpr>, args: Vec<RsExpr> },
    /// Method call: `recv.method(a, b)`
    MethodCall {
        receiver: Box<RsExpr>,
        method: String,
        args: Vec<RsExpr>,
    },
    /// Field access: `base.name`
    Field { base: Box<RsExpr>, name: String },
    /// `&expr`
    Ref(Box<RsExpr>),
    /// Struct literal: `Name { a: x, b }`
    Struct {
        name: String,
        fields: Vec<(String, RsExpr)>,
    },
    /// `expr?`
    Try(Box<RsExpr>),
    /// `expr.await`
    Await(Box<RsExpr>),
    /// `Some(expr)`
    Some(Box<RsExpr>),
    /// Verbatim expression text
    Raw(String),
}

impl RsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        RsExpr::Ident(name.into())
    }

    pub fn str(s: impl Into<String>) -> Self {
        RsExpr::Str(s.into())
    }

    pub fn call(callee: impl Into<String>, args: Vec<RsExpr>) -> Self {
        RsExpr::Call {
            callee: Box::new(RsExpr::Ident(callee.into())),
            args,
        }
    }

    pub fn method(self, method: impl Into<String>, args: Vec<RsExpr>) -> Self {
        RsExpr::MethodCall {
            receiver: Box::new(self),
            method: method.into(),
            args,
        }
    }

    pub fn field(self, name: impl Into<String>) -> Self {
        RsExpr::Field {
            base: Box::new(self),
            name: name.into(),
        }
    }

    pub fn reference(self) -> Self {
        RsExpr::Ref(Box::new(self))
    }

    pub fn try_(self) -> Self {
        RsExpr::Try(Box::new(self))
    }

    pub fn await_(self) -> Self {
        RsExpr::Await(Box::new(self))
    }
}

/// Rust statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsStmt {
    /// `let [mut] name = value;`
    Let {
        name: String,
        mutable: bool,
        value: RsExpr,
    },
    /// `expr;`
    Expr(RsExpr),
    /// `target = value;`
    Assign { target: RsExpr, value: RsExpr },
    /// Trailing expression without semicolon
    Tail(RsExpr),
    /// `if let pattern = value { body }`
    IfLet {
        pattern: String,
        value: RsExpr,
        body: Vec<RsStmt>,
    },
    /// `for pattern in iter { body }`
    For {
        pattern: String,
        iter: RsExpr,
        body: Vec<RsStmt>,
    },
}

/// `self` receiver kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Associated function
    None,
    /// `&self`
    Ref,
    /// `mut self`
    OwnedMut,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsParam {
    pub name: String,
    pub ty: RsType,
}

/// Function or method definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsFn {
    pub doc: Vec<String>,
    pub public: bool,
    pub is_async: bool,
    pub name: String,
    pub receiver: Receiver,
    pub params: Vec<RsParam>,
    pub ret: Option<RsType>,
    pub body: Vec<RsStmt>,
}

/// Struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsField {
    pub doc: Vec<String>,
    pub attrs: Vec<String>,
    pub public: bool,
    pub name: String,
    pub ty: RsType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsStruct {
    pub doc: Vec<String>,
    pub attrs: Vec<String>,
    pub name: String,
    pub fields: Vec<RsField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsTypeAlias {
    pub doc: Vec<String>,
    pub name: String,
    pub ty: RsType,
}

/// `pub const NAME: &str = "value";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsConst {
    pub doc: Vec<String>,
    pub name: String,
    pub value: String,
}

/// Inherent impl block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsImpl {
    pub target: String,
    pub fns: Vec<RsFn>,
}

/// Module-level item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsItem {
    Const(RsConst),
    Struct(RsStruct),
    TypeAlias(RsTypeAlias),
    Impl(RsImpl),
}

/// A complete generated module (one file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsModule {
    /// `//!` lines, text only
    pub inner_doc: Vec<String>,
    pub attrs: Vec<String>,
    pub uses: Vec<String>,
    pub items: Vec<RsItem>,
}
