//! Attributes and named types.
//!
//! Attributes describe the fields of a [`TypeDefinition`] as well as the
//! parameters of an [`Action`](crate::Action).

use serde::{Deserialize, Serialize};

/// The data type of an attribute.
///
/// Serialized in snake_case; composite kinds use the externally tagged form
/// (`{"array": "string"}`, `{"ref": "Bottle"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    Integer,
    Number,
    Boolean,
    /// RFC 3339 timestamp, represented as a string.
    DateTime,
    /// Homogeneous list of the inner kind.
    Array(Box<AttributeKind>),
    /// Reference to a named [`TypeDefinition`].
    Ref(String),
}

/// A named, typed field.
///
/// ## Examples
///
/// ```
/// use hyperschema_define::{Attribute, AttributeKind};
///
/// let attr = Attribute::new("vintage", AttributeKind::Integer)
///     .describe("Year the wine was bottled")
///     .required();
///
/// assert!(attr.required);
/// assert_eq!(attr.description, "Year the wine was bottled");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: AttributeKind,
    #[serde(default)]
    pub required: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            required: false,
        }
    }

    /// Marks the attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A named object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            attributes: vec![],
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_kind_serde_forms() {
        assert_eq!(
            serde_json::to_string(&AttributeKind::DateTime).unwrap(),
            "\"date_time\""
        );
        let array = AttributeKind::Array(Box::new(AttributeKind::String));
        assert_eq!(
            serde_json::to_value(&array).unwrap(),
            serde_json::json!({ "array": "string" })
        );
        let parsed: AttributeKind = serde_json::from_str(r#"{"ref":"Bottle"}"#).unwrap();
        assert_eq!(parsed, AttributeKind::Ref("Bottle".to_string()));
    }

    #[test]
    fn type_keeps_attribute_order() {
        let ty = TypeDefinition::new("Bottle")
            .with_attribute(Attribute::new("id", AttributeKind::Integer).required())
            .with_attribute(Attribute::new("color", AttributeKind::String))
            .with_attribute(Attribute::new("name", AttributeKind::String).required());

        let names: Vec<_> = ty.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "color", "name"]);
        assert!(!ty.attributes[1].required);
    }
}
