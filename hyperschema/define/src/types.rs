//! Core types for API definitions.
//!
//! - [`ApiDefinition`] - The top-level API definition
//! - [`Resource`] - A named collection of actions
//! - [`Action`] - An individual operation on a resource
//! - [`HttpMethod`] - HTTP method enumeration

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::attribute::{Attribute, TypeDefinition};

/// HTTP methods an action can be exposed through.
///
/// ## Examples
///
/// Parse from string:
///
/// ```
/// use std::str::FromStr;
/// use hyperschema_define::HttpMethod;
///
/// let method = HttpMethod::from_str("GET").unwrap();
/// assert_eq!(method, HttpMethod::Get);
/// ```
///
/// Display as uppercase:
///
/// ```
/// use hyperschema_define::HttpMethod;
///
/// assert_eq!(HttpMethod::Post.to_string(), "POST");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET - Retrieve a resource
    Get,
    /// HTTP POST - Create a new resource
    Post,
    /// HTTP PUT - Replace a resource entirely
    Put,
    /// HTTP PATCH - Partially update a resource
    Patch,
    /// HTTP DELETE - Remove a resource
    Delete,
    /// HTTP HEAD - Get headers only (no body)
    Head,
    /// HTTP OPTIONS - Get allowed methods for a resource
    Options,
}

/// A complete API definition.
///
/// This is the input of a generation run. The generator never mutates it.
///
/// ## Examples
///
/// ```
/// use hyperschema_define::ApiDefinition;
///
/// let api = ApiDefinition::new("cellar")
///     .with_title("The virtual wine cellar")
///     .with_host("cellar.example.com");
///
/// assert_eq!(api.display_name(), "The virtual wine cellar");
/// assert_eq!(api.host.as_deref(), Some("cellar.example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDefinition {
    /// Short identifier of the API.
    pub name: String,
    /// Human-readable title. Falls back to `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description of the API.
    #[serde(default)]
    pub description: String,
    /// API version string (e.g., "1.0").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Host the API is served from (e.g., `api.example.com`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Path prefix shared by every resource (e.g., "/api").
    #[serde(default)]
    pub base_path: String,
    /// Supported URL schemes. The first one is used for absolute links.
    #[serde(default)]
    pub schemes: Vec<String>,
    /// Resources exposed by the API.
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Named types referenced by media types, payloads and responses.
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

impl ApiDefinition {
    /// Creates an empty definition with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: String::new(),
            version: None,
            host: None,
            base_path: String::new(),
            schemes: vec![],
            resources: vec![],
            types: vec![],
        }
    }

    /// Returns the name to show to humans: the title if set, else the name.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Looks up a type definition by name.
    pub fn find_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.schemes.push(scheme.into());
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_type(mut self, ty: TypeDefinition) -> Self {
        self.types.push(ty);
        self
    }
}

/// A resource groups actions under a common base path.
///
/// When `media_type` is set, it names the [`TypeDefinition`] describing the
/// resource representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource name (e.g., "bottle").
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Path prefix for all actions of this resource (e.g., "/bottles").
    #[serde(default)]
    pub base_path: String,
    /// Name of the type describing this resource's representation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Actions available on this resource.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Resource {
    pub fn new(name: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            base_path: base_path.into(),
            media_type: None,
            actions: vec![],
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// A single operation on a resource.
///
/// ## Path Parameters
///
/// Paths support template parameters using curly braces: `/{bottleID}`.
/// Every placeholder must be declared in `params`.
///
/// ## Examples
///
/// ```
/// use hyperschema_define::{Action, Attribute, AttributeKind, HttpMethod};
///
/// let show = Action::new("show", HttpMethod::Get, "/{bottleID}")
///     .with_param(Attribute::new("bottleID", AttributeKind::Integer).required())
///     .with_response("Bottle");
///
/// assert!(show.path.contains("{bottleID}"));
/// assert_eq!(show.response.as_deref(), Some("Bottle"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action name (e.g., "show"). Becomes the link relation.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template relative to the resource base path.
    #[serde(default)]
    pub path: String,
    /// Path and query parameters.
    #[serde(default)]
    pub params: Vec<Attribute>,
    /// Name of the request body type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Name of the response body type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl Action {
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            method,
            path: path.into(),
            params: vec![],
            payload: None,
            response: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_param(mut self, param: Attribute) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }
}
