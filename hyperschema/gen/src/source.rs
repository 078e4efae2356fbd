//! Source artifact rendering.
//!
//! A [`SourceFile`] describes a generated Rust module: header title, module
//! documentation, imports and a body. A [`SourceWriter`] turns it into
//! validated, formatted text on disk. The generator only relies on the trait.

use std::collections::BTreeMap;
use std::path::Path;

use proc_macro2::TokenStream;
use quote::quote;
use tracing::debug;

use crate::errors::GeneratorError;
use crate::output::{format_code, validate_code, write_atomic};

/// A single `use` declaration.
///
/// ## Examples
///
/// ```
/// use hyperschema_gen::source::ImportSpec;
///
/// let import = ImportSpec::simple("actix_web::web");
/// assert!(import.to_tokens().unwrap().to_string().starts_with("use actix_web"));
///
/// let aliased = ImportSpec::aliased("actix_files::NamedFile", "File");
/// assert!(aliased.to_tokens().unwrap().to_string().contains("as File"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportSpec {
    pub path: String,
    pub alias: Option<String>,
}

impl ImportSpec {
    pub fn simple(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: None,
        }
    }

    pub fn aliased(path: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: Some(alias.into()),
        }
    }

    /// Renders the declaration.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::Format` if the path or alias is not valid Rust.
    pub fn to_tokens(&self) -> Result<TokenStream, GeneratorError> {
        let path: syn::Path = syn::parse_str(&self.path).map_err(|e| {
            GeneratorError::Format(format!("invalid import path '{}': {}", self.path, e))
        })?;
        match &self.alias {
            None => Ok(quote! { use #path; }),
            Some(alias) => {
                let alias: syn::Ident = syn::parse_str(alias).map_err(|e| {
                    GeneratorError::Format(format!("invalid import alias '{}': {}", alias, e))
                })?;
                Ok(quote! { use #path as #alias; })
            }
        }
    }
}

/// A generated source module, before rendering.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// First line of the header comment block.
    pub title: String,
    /// Module name, shown in the header block.
    pub package: String,
    /// Module documentation lines (`//!`).
    pub docs: Vec<String>,
    /// `use` declarations. Duplicates are dropped and the rest sorted on render.
    pub imports: Vec<ImportSpec>,
    /// Items following the imports.
    pub body: TokenStream,
}

impl SourceFile {
    pub fn new(title: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            package: package.into(),
            docs: vec![],
            imports: vec![],
            body: TokenStream::new(),
        }
    }

    pub fn with_doc(mut self, line: impl Into<String>) -> Self {
        self.docs.push(line.into());
        self
    }

    pub fn with_import(mut self, import: ImportSpec) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_body(mut self, body: TokenStream) -> Self {
        self.body = body;
        self
    }

    /// Imports deduplicated by path and sorted. A later alias for the same
    /// path wins.
    pub fn normalized_imports(&self) -> Vec<ImportSpec> {
        let mut by_path = BTreeMap::new();
        for import in &self.imports {
            by_path.insert(import.path.clone(), import.clone());
        }
        by_path.into_values().collect()
    }

    /// Assembles the module tokens: docs, imports, body.
    pub fn to_tokens(&self) -> Result<TokenStream, GeneratorError> {
        let docs = self.docs.iter().map(|line| {
            let line = format!(" {}", line);
            quote! { #![doc = #line] }
        });
        let imports = self
            .normalized_imports()
            .iter()
            .map(ImportSpec::to_tokens)
            .collect::<Result<Vec<_>, _>>()?;
        let body = &self.body;

        Ok(quote! {
            #(#docs)*

            #(#imports)*

            #body
        })
    }
}

/// Renders and writes source artifacts.
pub trait SourceWriter {
    /// Renders `file` and writes it to `path`.
    ///
    /// ## Errors
    ///
    /// Must return `GeneratorError::Format` without touching `path` when the
    /// rendered code is invalid, and `GeneratorError::Write` when the file
    /// cannot be written.
    fn write(&self, path: &Path, file: &SourceFile) -> Result<(), GeneratorError>;
}

impl<F> SourceWriter for F
where
    F: Fn(&Path, &SourceFile) -> Result<(), GeneratorError>,
{
    fn write(&self, path: &Path, file: &SourceFile) -> Result<(), GeneratorError> {
        self(path, file)
    }
}

/// Writes Rust source validated with `syn` and formatted with `prettyplease`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustSourceWriter;

impl RustSourceWriter {
    /// Renders `file` to formatted text without writing it.
    ///
    /// ## Examples
    ///
    /// ```
    /// use hyperschema_gen::source::{RustSourceWriter, SourceFile};
    /// use quote::quote;
    ///
    /// let file = SourceFile::new("Bottles JSON Hyper-schema", "schema")
    ///     .with_body(quote! { pub fn noop() {} });
    /// let text = RustSourceWriter.render(&file).unwrap();
    /// assert!(text.starts_with("// Bottles JSON Hyper-schema\n"));
    /// ```
    pub fn render(&self, file: &SourceFile) -> Result<String, GeneratorError> {
        let tokens = file.to_tokens()?;
        let parsed = validate_code(&tokens)?;
        let package_line = format!("Package: {}", file.package);
        Ok(format_code(&parsed, &[file.title.as_str(), "", package_line.as_str()]))
    }
}

impl SourceWriter for RustSourceWriter {
    fn write(&self, path: &Path, file: &SourceFile) -> Result<(), GeneratorError> {
        let rendered = self.render(file)?;
        write_atomic(path, rendered.as_bytes())?;
        debug!(path = %path.display(), bytes = rendered.len(), "wrote source artifact");
        Ok(())
    }
}
