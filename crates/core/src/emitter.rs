//! Rust code emitter for discovery documents.
//!
//! This module is a thin wrapper around the IR-based code generation.
//! The pipeline is:
//! 1. Parse: discovery JSON -> RestDescription
//! 2. Normalize: RestDescription -> ApiModel (all discovery logic resolved)
//! 3. Codegen: ApiModel -> RsModule (Rust AST)
//! 4. Emit: RsModule -> String (via Emit trait)

use crate::discovery::RestDescription;
use crate::error::Result;
use crate::ir::{Emit, codegen_module, normalize_spec};

/// Generate Rust client source from a discovery JSON string.
pub fn generate(discovery_json: &str) -> Result<String> {
    let doc = RestDescription::from_json(discovery_json)?;
    generate_from(&doc)
}

/// Generate Rust client source from an already decoded document.
pub fn generate_from(doc: &RestDescription) -> Result<String> {
    let api = normalize_spec(doc)?;
    Ok(codegen_module(&api).emit())
}
