//! Convenient re-exports for writing API definitions.
//!
//! ```
//! use hyperschema_define::prelude::*;
//!
//! let api = ApiDefinition::new("Bottles")
//!     .with_resource(Resource::new("bottle", "/bottles"));
//! assert_eq!(api.resources[0].name, "bottle");
//! ```

pub use crate::apis::define_cellar_api;
pub use crate::attribute::{Attribute, AttributeKind, TypeDefinition};
pub use crate::types::{Action, ApiDefinition, HttpMethod, Resource};
