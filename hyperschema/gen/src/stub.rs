//! The schema controller stub.
//!
//! The generated module exposes a single `mount_controller` function that
//! registers a static-file route serving `schema.json` under
//! [`SCHEMA_ROUTE`](crate::schema::SCHEMA_ROUTE). It targets actix-web.

use hyperschema_define::ApiDefinition;
use quote::quote;

use crate::schema::SCHEMA_ROUTE;
use crate::source::{ImportSpec, SourceFile};

/// Name of the directory, under the output root, receiving the artifacts.
pub const SCHEMA_DIR: &str = "schema";

/// File name of the serialized schema document.
pub const SCHEMA_FILE: &str = "schema.json";

/// Title of the header comment block for `api`.
///
/// ## Examples
///
/// ```
/// use hyperschema_define::ApiDefinition;
/// use hyperschema_gen::stub::header_title;
///
/// assert_eq!(header_title(&ApiDefinition::new("Bottles")), "Bottles JSON Hyper-schema");
/// ```
pub fn header_title(api: &ApiDefinition) -> String {
    format!("{} JSON Hyper-schema", api.display_name())
}

/// Imports required by the controller body.
pub fn controller_imports() -> Vec<ImportSpec> {
    vec![
        ImportSpec::simple("actix_web::web"),
        ImportSpec::simple("actix_files::NamedFile"),
    ]
}

/// Builds the controller source file for `api`, to be written as `<package>.rs`.
pub fn schema_controller(api: &ApiDefinition, package: &str) -> SourceFile {
    let served_file = format!("{}/{}", SCHEMA_DIR, SCHEMA_FILE);
    let route = SCHEMA_ROUTE;

    let body = quote! {
        /// Mounts the API JSON schema controller under "/schema.json".
        pub fn mount_controller(cfg: &mut web::ServiceConfig) {
            cfg.route(#route, web::get().to(serve_schema));
        }

        async fn serve_schema() -> actix_web::Result<NamedFile> {
            Ok(NamedFile::open(#served_file)?)
        }
    };

    let mut file = SourceFile::new(header_title(api), package)
        .with_doc(format!("JSON Hyper-schema controller for the {} API.", api.display_name()));
    if !api.description.is_empty() {
        file = file.with_doc("");
        for line in api.description.lines() {
            file = file.with_doc(line);
        }
    }
    for import in controller_imports() {
        file = file.with_import(import);
    }
    file.with_body(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RustSourceWriter;

    #[test]
    fn controller_renders_route_and_header() {
        let api = ApiDefinition::new("Bottles").with_description("Bottles of wine");
        let text = RustSourceWriter
            .render(&schema_controller(&api, "schema"))
            .unwrap();

        assert!(text.starts_with("// Bottles JSON Hyper-schema\n"));
        assert!(text.contains("//! JSON Hyper-schema controller for the Bottles API."));
        assert!(text.contains("//! Bottles of wine"));
        assert!(text.contains("pub fn mount_controller(cfg: &mut web::ServiceConfig)"));
        assert!(text.contains("cfg.route(\"/schema.json\", web::get().to(serve_schema));"));
        assert!(text.contains("NamedFile::open(\"schema/schema.json\")"));
    }

    #[test]
    fn imports_are_sorted_in_output() {
        let text = RustSourceWriter
            .render(&schema_controller(&ApiDefinition::new("Bottles"), "schema"))
            .unwrap();

        let files = text.find("use actix_files::NamedFile;").unwrap();
        let web = text.find("use actix_web::web;").unwrap();
        assert!(files < web);
    }

    #[test]
    fn title_uses_display_name() {
        let api = ApiDefinition::new("cellar").with_title("Cellar");
        assert_eq!(header_title(&api), "Cellar JSON Hyper-schema");
        assert_eq!(schema_controller(&api, "cellar_schema").package, "cellar_schema");
    }
}
