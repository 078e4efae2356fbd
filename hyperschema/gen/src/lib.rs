//! Hyperschema generator library.
//!
//! This crate turns an API definition created with `hyperschema-define` into
//! two artifacts under `<output_root>/schema/`:
//!
//! - `schema.json` - a JSON Hyper-Schema document describing the API
//! - `<package>.rs` - a Rust module mounting a route that serves that document
//!
//! Generation is all-or-nothing. Every artifact is recorded as it is created
//! and removed again if any later step fails, or if a collaborator panics
//! mid-run, or a fatal signal arrives.
//!
//! ## Modules
//!
//! - [`config`] - Command line parsing and [`GeneratorConfig`]
//! - [`generator`] - The [`Generator`] state machine, rollback and crash trap
//! - [`schema`] - The [`SchemaBuilder`] seam and the default Hyper-Schema builder
//! - [`source`] - The [`SourceWriter`] seam and the `syn`/`prettyplease` writer
//! - [`stub`] - The schema controller template
//! - [`pipeline`] - Running several generators as one transaction
//! - `signals` - SIGINT/SIGTERM trap rolling back an interrupted run (unix)
//! - [`tracker`] - Ordered record of created artifacts
//! - [`output`] - Validation, formatting and file-system primitives
//! - [`parser`] - Path template utilities
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use hyperschema_define::apis::define_cellar_api;
//! use hyperschema_gen::{GeneratorConfig, generate};
//!
//! let artifacts = generate(&define_cellar_api(), GeneratorConfig::new("gen")).unwrap();
//! for path in artifacts {
//!     println!("{}", path.display());
//! }
//! ```
//!
//! ## Generated Layout
//!
//! ```text
//! gen/
//! └── schema/
//!     ├── schema.json
//!     └── schema.rs    // pub fn mount_controller(cfg: &mut web::ServiceConfig)
//! ```

pub mod config;
pub mod errors;
pub mod generator;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod schema;
#[cfg(unix)]
pub mod signals;
pub mod source;
pub mod stub;
pub mod tracker;

pub use config::{GeneratorConfig, JsonStyle};
pub use errors::{GeneratorError, SchemaBuildError, Stage};
pub use generator::{Generator, GeneratorState, generate, run_with_crash_trap};
pub use pipeline::{ArtifactGenerator, Pipeline};
pub use schema::{HyperSchemaBuilder, SchemaBuilder, SchemaDocument};
pub use source::{RustSourceWriter, SourceWriter};
pub use tracker::RunHandle;
