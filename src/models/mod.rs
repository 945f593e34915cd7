//! Data models for the trending catalog.
//!
//! `TokenRecord` mirrors the upstream payload; the remote types mirror the GitHub contents API.

mod document;
mod remote;
mod token;

pub use document::*;
pub use remote::*;
pub use token::*;
