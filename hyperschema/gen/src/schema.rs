//! Schema derivation.
//!
//! The generator only depends on the [`SchemaBuilder`] trait: give it an API
//! definition, get back a [`SchemaDocument`] or a [`SchemaBuildError`].
//! [`HyperSchemaBuilder`] is the implementation used by default. It produces
//! a draft-04 JSON Hyper-Schema with one definition per type and per
//! resource, and one link per action.
//!
//! Closures with the right signature implement [`SchemaBuilder`] too.

use std::collections::HashSet;

use hyperschema_define::{Action, ApiDefinition, Attribute, AttributeKind, Resource};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::config::JsonStyle;
use crate::errors::SchemaBuildError;
use crate::parser::{extract_path_params, join_paths};

/// Meta-schema URI of JSON Hyper-Schema draft 04.
pub const HYPER_SCHEMA_URI: &str = "http://json-schema.org/draft-04/hyper-schema";

/// URL path the generated stub serves the schema from.
pub const SCHEMA_ROUTE: &str = "/schema.json";

/// A derived schema document.
///
/// Immutable once built; the generator serializes it exactly once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument(Value);

impl SchemaDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Serializes the document to its wire form.
    ///
    /// ## Examples
    ///
    /// ```
    /// use hyperschema_gen::config::JsonStyle;
    /// use hyperschema_gen::schema::SchemaDocument;
    ///
    /// let doc = SchemaDocument::new(serde_json::json!({ "type": "object" }));
    /// assert_eq!(doc.to_json(JsonStyle::Compact).unwrap(), br#"{"type":"object"}"#);
    /// ```
    pub fn to_json(&self, style: JsonStyle) -> Result<Vec<u8>, serde_json::Error> {
        match style {
            JsonStyle::Pretty => {
                let mut bytes = serde_json::to_vec_pretty(&self.0)?;
                bytes.push(b'\n');
                Ok(bytes)
            }
            JsonStyle::Compact => serde_json::to_vec(&self.0),
        }
    }
}

/// Derives a schema document from an API definition.
pub trait SchemaBuilder {
    /// ## Errors
    ///
    /// Returns a [`SchemaBuildError`] when the definition cannot be expressed
    /// as a schema document.
    fn build(&self, api: &ApiDefinition) -> Result<SchemaDocument, SchemaBuildError>;
}

impl<F> SchemaBuilder for F
where
    F: Fn(&ApiDefinition) -> Result<SchemaDocument, SchemaBuildError>,
{
    fn build(&self, api: &ApiDefinition) -> Result<SchemaDocument, SchemaBuildError> {
        self(api)
    }
}

/// Builds draft-04 JSON Hyper-Schema documents.
///
/// ## Examples
///
/// ```
/// use hyperschema_define::apis::define_cellar_api;
/// use hyperschema_gen::schema::{HyperSchemaBuilder, SchemaBuilder};
///
/// let doc = HyperSchemaBuilder.build(&define_cellar_api()).unwrap();
/// assert_eq!(doc.as_value()["type"], "object");
/// assert!(doc.as_value()["definitions"]["bottle"]["links"].is_array());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperSchemaBuilder;

impl SchemaBuilder for HyperSchemaBuilder {
    fn build(&self, api: &ApiDefinition) -> Result<SchemaDocument, SchemaBuildError> {
        if api.name.trim().is_empty() {
            return Err(SchemaBuildError::EmptyName);
        }
        debug!(
            api = %api.name,
            resources = api.resources.len(),
            types = api.types.len(),
            "building hyper-schema"
        );

        let mut names = HashSet::new();
        for ty in &api.types {
            if !names.insert(ty.name.as_str()) {
                return Err(SchemaBuildError::DuplicateType(ty.name.clone()));
            }
        }
        for resource in &api.resources {
            if !names.insert(resource.name.as_str()) {
                return Err(SchemaBuildError::DuplicateResource(resource.name.clone()));
            }
        }

        let mut definitions = Map::new();
        for ty in &api.types {
            let context = format!("type {}", ty.name);
            let mut schema = object_schema(api, &ty.attributes, &context)?;
            insert_text(&mut schema, "title", &ty.name);
            insert_text(&mut schema, "description", &ty.description);
            definitions.insert(ty.name.clone(), Value::Object(schema));
        }

        let mut properties = Map::new();
        for resource in &api.resources {
            definitions.insert(
                resource.name.clone(),
                Value::Object(resource_schema(api, resource)?),
            );
            properties.insert(
                resource.name.clone(),
                json!({ "$ref": definition_ref(&resource.name) }),
            );
        }

        let mut root = Map::new();
        root.insert("$schema".into(), json!(HYPER_SCHEMA_URI));
        if let Some(host) = &api.host {
            root.insert("id".into(), json!(format!("http://{}/schema", host)));
        }
        root.insert("title".into(), json!(api.display_name()));
        insert_text(&mut root, "description", &api.description);
        root.insert("type".into(), json!("object"));
        root.insert("definitions".into(), Value::Object(definitions));
        root.insert("properties".into(), Value::Object(properties));
        root.insert("links".into(), Value::Array(api_links(api)));

        Ok(SchemaDocument::new(Value::Object(root)))
    }
}

fn definition_ref(name: &str) -> String {
    format!("#/definitions/{}", name)
}

fn insert_text(map: &mut Map<String, Value>, key: &str, text: &str) {
    if !text.is_empty() {
        map.insert(key.to_string(), json!(text));
    }
}

/// Links describing the API itself and the schema route.
fn api_links(api: &ApiDefinition) -> Vec<Value> {
    let mut links = Vec::new();
    if let Some(host) = &api.host {
        let scheme = api.schemes.first().map(String::as_str).unwrap_or("http");
        let base = if api.base_path.is_empty() {
            String::new()
        } else {
            join_paths(&[api.base_path.as_str()])
        };
        links.push(json!({
            "href": format!("{}://{}{}", scheme, host, base),
            "rel": "self",
        }));
    }
    links.push(json!({
        "href": SCHEMA_ROUTE,
        "method": "GET",
        "rel": "self",
        "targetSchema": {
            "$schema": HYPER_SCHEMA_URI,
            "additionalProperties": true,
        },
    }));
    links
}

fn resource_schema(
    api: &ApiDefinition,
    resource: &Resource,
) -> Result<Map<String, Value>, SchemaBuildError> {
    let mut schema = Map::new();
    schema.insert("title".into(), json!(resource.name));
    insert_text(&mut schema, "description", &resource.description);
    schema.insert("type".into(), json!("object"));

    if let Some(media_type) = &resource.media_type {
        let ty = api
            .find_type(media_type)
            .ok_or_else(|| SchemaBuildError::UndefinedType {
                context: format!("resource {} media type", resource.name),
                name: media_type.clone(),
            })?;
        let context = format!("type {}", ty.name);
        let object = object_schema(api, &ty.attributes, &context)?;
        for key in ["properties", "required"] {
            if let Some(value) = object.get(key) {
                schema.insert(key.to_string(), value.clone());
            }
        }
    }

    let links = resource
        .actions
        .iter()
        .map(|action| action_link(api, resource, action))
        .collect::<Result<Vec<_>, _>>()?;
    schema.insert("links".into(), Value::Array(links));

    Ok(schema)
}

fn action_link(
    api: &ApiDefinition,
    resource: &Resource,
    action: &Action,
) -> Result<Value, SchemaBuildError> {
    let href = join_paths(&[
        api.base_path.as_str(),
        resource.base_path.as_str(),
        action.path.as_str(),
    ]);
    let path_params = extract_path_params(&href);
    for param in &path_params {
        if !action.params.iter().any(|p| p.name == *param) {
            return Err(SchemaBuildError::UndeclaredPathParam {
                resource: resource.name.clone(),
                action: action.name.clone(),
                param: param.to_string(),
            });
        }
    }

    let mut link = Map::new();
    link.insert("title".into(), json!(action.name));
    insert_text(&mut link, "description", &action.description);
    link.insert("rel".into(), json!(action.name));
    link.insert("href".into(), json!(href));
    link.insert("method".into(), json!(action.method.to_string()));

    let context = format!("action {}.{}", resource.name, action.name);
    if let Some(payload) = &action.payload {
        require_type(api, payload, &format!("{} payload", context))?;
        link.insert("schema".into(), json!({ "$ref": definition_ref(payload) }));
    } else {
        let query: Vec<Attribute> = action
            .params
            .iter()
            .filter(|p| !path_params.contains(&p.name.as_str()))
            .cloned()
            .collect();
        if !query.is_empty() {
            let schema = object_schema(api, &query, &format!("{} params", context))?;
            link.insert("schema".into(), Value::Object(schema));
        }
    }

    if let Some(response) = &action.response {
        require_type(api, response, &format!("{} response", context))?;
        link.insert(
            "targetSchema".into(),
            json!({ "$ref": definition_ref(response) }),
        );
    }

    Ok(Value::Object(link))
}

fn require_type(api: &ApiDefinition, name: &str, context: &str) -> Result<(), SchemaBuildError> {
    match api.find_type(name) {
        Some(_) => Ok(()),
        None => Err(SchemaBuildError::UndefinedType {
            context: context.to_string(),
            name: name.to_string(),
        }),
    }
}

fn object_schema(
    api: &ApiDefinition,
    attributes: &[Attribute],
    context: &str,
) -> Result<Map<String, Value>, SchemaBuildError> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for attr in attributes {
        let mut schema = kind_schema(api, &attr.kind, &format!("{} attribute {}", context, attr.name))?;
        if let Value::Object(map) = &mut schema {
            insert_text(map, "description", &attr.description);
        }
        properties.insert(attr.name.clone(), schema);
        if attr.required {
            required.push(json!(attr.name));
        }
    }

    let mut object = Map::new();
    object.insert("type".into(), json!("object"));
    object.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        object.insert("required".into(), Value::Array(required));
    }
    Ok(object)
}

fn kind_schema(
    api: &ApiDefinition,
    kind: &AttributeKind,
    context: &str,
) -> Result<Value, SchemaBuildError> {
    let schema = match kind {
        AttributeKind::String => json!({ "type": "string" }),
        AttributeKind::Integer => json!({ "type": "integer" }),
        AttributeKind::Number => json!({ "type": "number" }),
        AttributeKind::Boolean => json!({ "type": "boolean" }),
        AttributeKind::DateTime => json!({ "type": "string", "format": "date-time" }),
        AttributeKind::Array(inner) => {
            json!({ "type": "array", "items": kind_schema(api, inner, context)? })
        }
        AttributeKind::Ref(name) => {
            require_type(api, name, context)?;
            json!({ "$ref": definition_ref(name) })
        }
    };
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperschema_define::apis::define_cellar_api;
    use hyperschema_define::{HttpMethod, TypeDefinition};

    fn bottles_api() -> ApiDefinition {
        ApiDefinition::new("Bottles")
            .with_type(
                TypeDefinition::new("Bottle")
                    .with_attribute(Attribute::new("id", AttributeKind::Integer).required())
                    .with_attribute(Attribute::new("name", AttributeKind::String)),
            )
            .with_resource(
                Resource::new("bottle", "/bottles")
                    .with_media_type("Bottle")
                    .with_action(
                        Action::new("show", HttpMethod::Get, "/{id}")
                            .with_param(Attribute::new("id", AttributeKind::Integer).required())
                            .with_response("Bottle"),
                    ),
            )
    }

    #[test]
    fn document_has_hyper_schema_shape() {
        let doc = HyperSchemaBuilder.build(&bottles_api()).unwrap();
        let value = doc.as_value();

        assert_eq!(value["$schema"], HYPER_SCHEMA_URI);
        assert_eq!(value["title"], "Bottles");
        assert_eq!(value["type"], "object");
        assert_eq!(value["properties"]["bottle"]["$ref"], "#/definitions/bottle");
        assert!(value.get("id").is_none(), "no host means no id");
    }

    #[test]
    fn resource_definition_carries_media_type_and_links() {
        let doc = HyperSchemaBuilder.build(&bottles_api()).unwrap();
        let bottle = &doc.as_value()["definitions"]["bottle"];

        assert_eq!(bottle["properties"]["id"]["type"], "integer");
        assert_eq!(bottle["required"], json!(["id"]));

        let link = &bottle["links"][0];
        assert_eq!(link["rel"], "show");
        assert_eq!(link["href"], "/bottles/{id}");
        assert_eq!(link["method"], "GET");
        assert_eq!(link["targetSchema"]["$ref"], "#/definitions/Bottle");
        assert!(link.get("schema").is_none(), "path params are not a body");
    }

    #[test]
    fn schema_route_link_is_always_present() {
        let doc = HyperSchemaBuilder.build(&ApiDefinition::new("Empty")).unwrap();
        let links = doc.as_value()["links"].as_array().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0]["href"], SCHEMA_ROUTE);
    }

    #[test]
    fn host_adds_id_and_self_link() {
        let doc = HyperSchemaBuilder.build(&define_cellar_api()).unwrap();
        let value = doc.as_value();

        assert_eq!(value["id"], "http://localhost:8080/schema");
        assert_eq!(value["links"][0]["href"], "http://localhost:8080/cellar");
        assert_eq!(value["title"], "The virtual wine cellar");
    }

    #[test]
    fn query_params_become_link_schema() {
        let doc = HyperSchemaBuilder.build(&define_cellar_api()).unwrap();
        let list = &doc.as_value()["definitions"]["bottle"]["links"][0];

        assert_eq!(list["href"], "/cellar/accounts/{accountID}/bottles");
        assert_eq!(list["schema"]["properties"]["years"]["type"], "array");
        assert!(list["schema"]["properties"].get("accountID").is_none());
    }

    #[test]
    fn payload_becomes_link_schema_ref() {
        let doc = HyperSchemaBuilder.build(&define_cellar_api()).unwrap();
        let create = &doc.as_value()["definitions"]["bottle"]["links"][2];
        assert_eq!(create["schema"]["$ref"], "#/definitions/BottlePayload");
    }

    #[test]
    fn date_time_and_refs_map_to_json_schema() {
        let doc = HyperSchemaBuilder.build(&define_cellar_api()).unwrap();
        let defs = &doc.as_value()["definitions"];

        assert_eq!(defs["Account"]["properties"]["created_at"]["format"], "date-time");
        assert_eq!(defs["Bottle"]["properties"]["account"]["$ref"], "#/definitions/Account");
        assert_eq!(defs["Bottle"]["properties"]["ratings"]["items"]["type"], "number");
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = HyperSchemaBuilder.build(&ApiDefinition::new("  ")).unwrap_err();
        assert_eq!(err, SchemaBuildError::EmptyName);
    }

    #[test]
    fn duplicate_resources_are_rejected() {
        let api = ApiDefinition::new("Dupes")
            .with_resource(Resource::new("bottle", "/a"))
            .with_resource(Resource::new("bottle", "/b"));
        assert_eq!(
            HyperSchemaBuilder.build(&api).unwrap_err(),
            SchemaBuildError::DuplicateResource("bottle".into())
        );
    }

    #[test]
    fn undefined_response_type_is_rejected() {
        let api = ApiDefinition::new("Broken").with_resource(
            Resource::new("bottle", "/bottles")
                .with_action(Action::new("list", HttpMethod::Get, "").with_response("Missing")),
        );
        match HyperSchemaBuilder.build(&api).unwrap_err() {
            SchemaBuildError::UndefinedType { name, context } => {
                assert_eq!(name, "Missing");
                assert_eq!(context, "action bottle.list response");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn undeclared_path_param_is_rejected() {
        let api = ApiDefinition::new("Broken").with_resource(
            Resource::new("bottle", "/bottles")
                .with_action(Action::new("show", HttpMethod::Get, "/{id}")),
        );
        assert!(matches!(
            HyperSchemaBuilder.build(&api).unwrap_err(),
            SchemaBuildError::UndeclaredPathParam { ref param, .. } if param == "id"
        ));
    }

    #[test]
    fn closures_are_builders() {
        let builder = |api: &ApiDefinition| -> Result<SchemaDocument, SchemaBuildError> {
            Ok(SchemaDocument::new(json!({ "title": api.name })))
        };
        let doc = builder.build(&ApiDefinition::new("X")).unwrap();
        assert_eq!(doc.as_value()["title"], "X");
    }

    #[test]
    fn pretty_output_ends_with_newline() {
        let doc = SchemaDocument::new(json!({ "type": "object" }));
        let bytes = doc.to_json(JsonStyle::Pretty).unwrap();
        assert!(bytes.ends_with(b"}\n"));
        assert!(bytes.contains(&b'\n'));
    }
}
