//! Discovery document to Rust client generator.
//!
//! [`generate`] turns one discovery document into the source of a client
//! module. [`discovery`] holds the decoded document model, including the
//! directory listing; schema resolution, the call model and code emission
//! stay internal to the pipeline.

mod callmodel;
pub mod discovery;
mod emitter;
pub mod error;
mod ir;
mod names;
mod typegraph;

pub use discovery::{DirectoryItem, DirectoryList, RestDescription};
pub use emitter::{generate, generate_from};
pub use error::{Error, Result};
