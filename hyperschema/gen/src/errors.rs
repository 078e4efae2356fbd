//! Error types for the hyperschema generator.

use std::fmt;

use thiserror::Error;

/// The stage of a generation run an error originated from.
///
/// Used to prefix user-facing error messages so a failure always names
/// where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Command line parsing and configuration validation.
    Arguments,
    /// Preparing the output directory.
    Staging,
    /// Deriving the schema document from the API definition.
    Building,
    /// Serializing, formatting and writing artifacts.
    Writing,
    /// A panic trapped at the top level.
    Crash,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Arguments => "argument validation",
            Stage::Staging => "staging",
            Stage::Building => "schema building",
            Stage::Writing => "writing",
            Stage::Crash => "crash during generation",
        };
        f.write_str(label)
    }
}

/// Reasons the schema builder can reject an API definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaBuildError {
    /// The API has no name to title the document with.
    #[error("API definition has an empty name")]
    EmptyName,

    /// Two resources share a name, so their definitions would collide.
    #[error("duplicate resource '{0}'")]
    DuplicateResource(String),

    /// Two types share a name.
    #[error("duplicate type '{0}'")]
    DuplicateType(String),

    /// A media type, payload, response or attribute names a type that is
    /// not defined.
    #[error("{context} references undefined type '{name}'")]
    UndefinedType {
        /// Where the reference was found (e.g., "action bottle.show response").
        context: String,
        /// The missing type name.
        name: String,
    },

    /// A path template placeholder has no matching action parameter.
    #[error("action '{resource}.{action}' uses path parameter '{param}' without declaring it")]
    UndeclaredPathParam {
        resource: String,
        action: String,
        param: String,
    },

    /// Any other builder-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Errors that can occur during generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A command line flag is unknown or its value failed to parse.
    #[error("invalid argument '{flag}': {reason}")]
    InvalidArgument {
        /// The offending flag as typed by the user (e.g., "--out").
        flag: String,
        /// The parse error.
        reason: String,
    },

    /// The parsed configuration is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An API definition file could not be loaded.
    #[error("failed to load API definition '{path}': {reason}")]
    Definition { path: String, reason: String },

    /// The output directory could not be prepared.
    #[error("failed to stage output directory '{path}': {source}")]
    Staging {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The schema builder rejected the API definition.
    #[error(transparent)]
    SchemaBuild(#[from] SchemaBuildError),

    /// The schema document could not be serialized.
    #[error("failed to serialize schema document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to write an artifact.
    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Generated source failed validation or formatting.
    #[error("generated source is invalid: {0}")]
    Format(String),

    /// A collaborator panicked mid-run. The staged output was rolled back
    /// before this error was produced.
    #[error("generation aborted: {message}")]
    CrashDuringGeneration { message: String },

    /// A trapped signal stopped the run. The staged output was rolled back.
    #[error("generation interrupted by a signal")]
    Interrupted,

    /// A generator inside a pipeline failed.
    #[error("generator '{generator}' failed: {source}")]
    Pipeline {
        generator: String,
        #[source]
        source: Box<GeneratorError>,
    },
}

impl GeneratorError {
    /// Returns the stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            GeneratorError::InvalidArgument { .. }
            | GeneratorError::InvalidConfig(_)
            | GeneratorError::Definition { .. } => Stage::Arguments,
            GeneratorError::Staging { .. } => Stage::Staging,
            GeneratorError::SchemaBuild(_) => Stage::Building,
            GeneratorError::Serialize(_)
            | GeneratorError::Write { .. }
            | GeneratorError::Format(_) => Stage::Writing,
            GeneratorError::CrashDuringGeneration { .. } | GeneratorError::Interrupted => {
                Stage::Crash
            }
            GeneratorError::Pipeline { source, .. } => source.stage(),
        }
    }

    /// Renders the error prefixed with its stage, as shown to users.
    pub fn report(&self) -> String {
        format!("{} failed: {}", self.stage(), self)
    }

    /// Whether the error happened before anything was staged on disk.
    pub fn is_configuration_error(&self) -> bool {
        self.stage() == Stage::Arguments
    }
}
