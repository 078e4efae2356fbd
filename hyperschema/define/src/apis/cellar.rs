//! The "cellar" API definition.
//!
//! A small wine cellar service with accounts and bottles, used as the
//! reference definition for the generator.

use crate::{Action, ApiDefinition, Attribute, AttributeKind, HttpMethod, Resource, TypeDefinition};

/// Creates the cellar API definition.
///
/// ## Resources
///
/// - `account` - `GET /cellar/accounts/{accountID}`, `POST /cellar/accounts`
/// - `bottle` - list, show and create bottles of an account
///
/// ## Example
///
/// ```rust
/// use hyperschema_define::apis::define_cellar_api;
///
/// let api = define_cellar_api();
/// assert_eq!(api.name, "cellar");
/// assert_eq!(api.resources.len(), 2);
/// ```
pub fn define_cellar_api() -> ApiDefinition {
    ApiDefinition::new("cellar")
        .with_title("The virtual wine cellar")
        .with_description("A basic example of an API serving a wine cellar")
        .with_version("1.0")
        .with_host("localhost:8080")
        .with_scheme("http")
        .with_base_path("/cellar")
        .with_type(account_type())
        .with_type(bottle_type())
        .with_type(bottle_payload_type())
        .with_resource(account_resource())
        .with_resource(bottle_resource())
}

fn account_type() -> TypeDefinition {
    TypeDefinition::new("Account")
        .with_description("A tenant account")
        .with_attribute(
            Attribute::new("id", AttributeKind::Integer)
                .describe("ID of account")
                .required(),
        )
        .with_attribute(
            Attribute::new("name", AttributeKind::String)
                .describe("Name of account")
                .required(),
        )
        .with_attribute(
            Attribute::new("created_at", AttributeKind::DateTime).describe("Date of creation"),
        )
}

fn bottle_type() -> TypeDefinition {
    TypeDefinition::new("Bottle")
        .with_description("A bottle of wine")
        .with_attribute(
            Attribute::new("id", AttributeKind::Integer)
                .describe("ID of bottle")
                .required(),
        )
        .with_attribute(Attribute::new("name", AttributeKind::String).required())
        .with_attribute(Attribute::new("vintage", AttributeKind::Integer).required())
        .with_attribute(
            Attribute::new("account", AttributeKind::Ref("Account".to_string()))
                .describe("Account that owns the bottle"),
        )
        .with_attribute(Attribute::new(
            "ratings",
            AttributeKind::Array(Box::new(AttributeKind::Number)),
        ))
}

fn bottle_payload_type() -> TypeDefinition {
    TypeDefinition::new("BottlePayload")
        .with_description("Fields accepted when creating a bottle")
        .with_attribute(Attribute::new("name", AttributeKind::String).required())
        .with_attribute(Attribute::new("vintage", AttributeKind::Integer).required())
}

fn account_resource() -> Resource {
    let account_id = Attribute::new("accountID", AttributeKind::Integer)
        .describe("Account ID")
        .required();

    Resource::new("account", "/accounts")
        .with_description("A wine cellar account")
        .with_media_type("Account")
        .with_action(
            Action::new("show", HttpMethod::Get, "/{accountID}")
                .with_description("Retrieve account with given id")
                .with_param(account_id)
                .with_response("Account"),
        )
        .with_action(
            Action::new("create", HttpMethod::Post, "")
                .with_description("Create new account")
                .with_payload("Account"),
        )
}

fn bottle_resource() -> Resource {
    let account_id = Attribute::new("accountID", AttributeKind::Integer).required();
    let bottle_id = Attribute::new("bottleID", AttributeKind::Integer).required();

    Resource::new("bottle", "/accounts/{accountID}/bottles")
        .with_description("A wine bottle")
        .with_media_type("Bottle")
        .with_action(
            Action::new("list", HttpMethod::Get, "")
                .with_description("List all bottles in account optionally filtering by year")
                .with_param(account_id.clone())
                .with_param(
                    Attribute::new("years", AttributeKind::Array(Box::new(AttributeKind::Integer)))
                        .describe("Filter by years"),
                ),
        )
        .with_action(
            Action::new("show", HttpMethod::Get, "/{bottleID}")
                .with_description("Retrieve bottle with given id")
                .with_param(account_id.clone())
                .with_param(bottle_id)
                .with_response("Bottle"),
        )
        .with_action(
            Action::new("create", HttpMethod::Post, "")
                .with_description("Record new bottle")
                .with_param(account_id)
                .with_payload("BottlePayload")
                .with_response("Bottle"),
        )
}
