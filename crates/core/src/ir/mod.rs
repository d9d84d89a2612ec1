//! Intermediate Representation for discovery document to Rust code generation.
//!
//! This module defines a three-layer architecture:
//! 1. API-level IR: resolved records, services and call builders
//! 2. Rust AST IR: types, expressions, statements, items
//! 3. Emission: AST to Rust source via the `Emit` trait
//!
//! ## Module Structure
//!
//! - `types`: Rust AST IR (RsType, RsExpr, RsStmt, RsFn, RsModule)
//! - `api`: API-level IR (ApiModel, RecordIR, ResourceIR, CallIR)
//! - `normalize`: discovery document -> API IR (the generation pass)
//! - `codegen`: API IR -> Rust AST
//! - `emit`: Rust AST -> code strings (via Emit trait)
//! - `utils`: identifier and doc-comment helpers shared across modules

pub mod api;
mod codegen;
mod emit;
mod normalize;
pub mod types;
pub mod utils;

// Re-export the main entry points
pub use codegen::codegen_module;
pub use emit::Emit;
pub use normalize::normalize_spec;
