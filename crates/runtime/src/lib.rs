//! Support library for clients generated by discogen.
//!
//! Generated code builds a [`Request`] per call, fills it from the call
//! builder's arguments and [`Options`], and hands it to a [`Client`].

mod client;
mod error;
mod media;
mod options;
mod request;
pub mod wire;

pub use client::{Client, DEFAULT_USER_AGENT, check_response};
pub use error::{Error, Result};
pub use media::Media;
pub use options::Options;
pub use request::{Prepared, Request, clean_path_string, resolve_relative};

pub use reqwest;
pub use serde_json;
