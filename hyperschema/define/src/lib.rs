//! Hyperschema Definition Library
//!
//! This crate provides the types used to describe a web API declaratively.
//! Definitions are consumed by the `hyperschema-gen` binary, which derives a
//! JSON Hyper-Schema document from them and emits a small Rust stub serving
//! that document over HTTP.
//!
//! ## Core Types
//!
//! - [`ApiDefinition`] - A complete API with its resources and shared types
//! - [`Resource`] - A group of actions sharing a base path and media type
//! - [`Action`] - A single operation (method + path template)
//! - [`HttpMethod`] - HTTP methods (GET, POST, PUT, etc.)
//! - [`TypeDefinition`] - A named object type used by payloads and responses
//! - [`Attribute`] / [`AttributeKind`] - Fields of a type or action parameters
//!
//! ## Examples
//!
//! ```
//! use hyperschema_define::{Action, ApiDefinition, HttpMethod, Resource};
//!
//! let api = ApiDefinition::new("Bottles").with_resource(
//!     Resource::new("bottle", "/bottles")
//!         .with_action(Action::new("list", HttpMethod::Get, "")),
//! );
//!
//! assert_eq!(api.display_name(), "Bottles");
//! assert_eq!(api.resources.len(), 1);
//! ```
//!
//! Definitions are serde-serializable, so they can also be kept in JSON files
//! and loaded at generation time.

pub mod apis;
pub mod attribute;
pub mod prelude;
pub mod types;

// Re-export main types at crate root
pub use attribute::{Attribute, AttributeKind, TypeDefinition};
pub use types::{Action, ApiDefinition, HttpMethod, Resource};
