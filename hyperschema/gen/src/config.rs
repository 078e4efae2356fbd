//! Command line parsing and generator configuration.
//!
//! [`parse_args`] turns raw process arguments into an immutable
//! [`GeneratorConfig`] plus the remaining invocation settings. Parsing never
//! touches the filesystem; loading a `--design` file happens later, in the
//! binary, once the arguments are known to be valid.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, ArgGroup, Parser};
use hyperschema_define::{ApiDefinition, apis};
use tracing::debug;

use crate::errors::GeneratorError;

/// Wire form of the serialized schema document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonStyle {
    /// Indented, one key per line.
    #[default]
    Pretty,
    /// Single line, no insignificant whitespace.
    Compact,
}

/// Configuration of a generation run.
///
/// Built once at startup and handed to [`Generator::new`](crate::Generator::new).
///
/// ## Examples
///
/// ```
/// use hyperschema_gen::config::{GeneratorConfig, JsonStyle};
///
/// let config = GeneratorConfig::new("gen")
///     .with_package("cellar_schema")
///     .with_json_style(JsonStyle::Compact);
///
/// assert_eq!(config.package, "cellar_schema");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Root directory; artifacts are written to `<output_root>/schema`.
    pub output_root: PathBuf,
    /// Module name of the generated source stub (`<package>.rs`).
    pub package: String,
    /// Serialization policy for `schema.json`.
    pub json_style: JsonStyle,
}

impl GeneratorConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            package: DEFAULT_PACKAGE.to_string(),
            json_style: JsonStyle::default(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_json_style(mut self, json_style: JsonStyle) -> Self {
        self.json_style = json_style;
        self
    }

    /// Checks the configuration and resolves the output root to an absolute
    /// path without touching the disk.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::InvalidConfig` if the output root is empty or
    /// cannot be made absolute, or if the package is not a Rust identifier.
    pub fn validated(&self) -> Result<GeneratorConfig, GeneratorError> {
        if self.output_root.as_os_str().is_empty() {
            return Err(GeneratorError::InvalidConfig(
                "output root must not be empty".to_string(),
            ));
        }
        parse_package(&self.package).map_err(GeneratorError::InvalidConfig)?;

        let output_root = std::path::absolute(&self.output_root).map_err(|e| {
            GeneratorError::InvalidConfig(format!(
                "cannot resolve output root '{}': {}",
                self.output_root.display(),
                e
            ))
        })?;

        Ok(GeneratorConfig {
            output_root,
            package: self.package.clone(),
            json_style: self.json_style,
        })
    }
}

/// Default module name of the generated stub.
pub const DEFAULT_PACKAGE: &str = "schema";

/// Where the API definition comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionSource {
    /// A definition bundled with `hyperschema-define` (see [`apis::AVAILABLE`]).
    Bundled(String),
    /// A JSON file holding a serialized `ApiDefinition`.
    File(PathBuf),
}

impl DefinitionSource {
    /// Resolves the source into an API definition.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::Definition` if the bundled name is unknown, or
    /// if the file cannot be read or does not hold a valid definition.
    pub fn load(&self) -> Result<ApiDefinition, GeneratorError> {
        match self {
            DefinitionSource::Bundled(name) => {
                apis::lookup(name).ok_or_else(|| GeneratorError::Definition {
                    path: name.clone(),
                    reason: format!(
                        "unknown bundled API (available: {})",
                        apis::AVAILABLE.join(", ")
                    ),
                })
            }
            DefinitionSource::File(path) => {
                let definition_error = |reason: String| GeneratorError::Definition {
                    path: path.display().to_string(),
                    reason,
                };
                let content =
                    std::fs::read_to_string(path).map_err(|e| definition_error(e.to_string()))?;
                let api: ApiDefinition =
                    serde_json::from_str(&content).map_err(|e| definition_error(e.to_string()))?;
                debug!(path = %path.display(), api = %api.name, "loaded API definition");
                Ok(api)
            }
        }
    }
}

/// A validated invocation of the generator binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config: GeneratorConfig,
    pub definition: DefinitionSource,
    /// Number of `-v` flags.
    pub verbosity: u8,
    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Invocation {
    /// Returns the `tracing` filter directive matching the verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info,hyperschema_gen=info",
            2 => "info,hyperschema_gen=debug",
            _ => "debug,hyperschema_gen=trace",
        }
    }
}

/// Outcome of argument parsing.
#[derive(Debug)]
pub enum ParsedArgs {
    /// Arguments are valid; run the generator.
    Run(Invocation),
    /// `--help` or `--version` was requested; print the text and exit.
    Exit(String),
}

/// JSON Hyper-Schema generator - derives schema.json and a serving stub from an API definition
#[derive(Parser, Debug)]
#[command(name = "hyperschema-gen")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("definition").required(true).args(["api", "design"])))]
struct Cli {
    /// Output root; artifacts are written to <OUT>/schema
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Module name of the generated source stub
    #[arg(long, default_value = DEFAULT_PACKAGE, value_parser = parse_package)]
    package: String,

    /// Bundled API definition to generate from
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(apis::AVAILABLE.iter().copied()))]
    api: Option<String>,

    /// JSON file containing the API definition
    #[arg(long)]
    design: Option<PathBuf>,

    /// Write schema.json without indentation
    #[arg(long)]
    compact: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

/// Parses process arguments (program name first) into a [`ParsedArgs`].
///
/// ## Errors
///
/// Returns `GeneratorError::InvalidArgument` naming the offending flag when a
/// flag is unknown, a value does not parse, or a required flag is missing.
///
/// ## Examples
///
/// ```
/// use hyperschema_gen::config::{parse_args, ParsedArgs};
///
/// let parsed = parse_args(["hyperschema-gen", "--api", "cellar", "--out", "gen"]).unwrap();
/// assert!(matches!(parsed, ParsedArgs::Run(_)));
///
/// let err = parse_args(["hyperschema-gen", "--api", "cellar", "--ouput", "gen"]).unwrap_err();
/// assert!(err.to_string().contains("--ouput"));
/// ```
pub fn parse_args<I, T>(args: I) -> Result<ParsedArgs, GeneratorError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    Ok(ParsedArgs::Exit(err.render().to_string()))
                }
                _ => Err(invalid_argument(&err)),
            };
        }
    };

    let definition = match (cli.api, cli.design) {
        (Some(name), _) => DefinitionSource::Bundled(name),
        (None, Some(path)) => DefinitionSource::File(path),
        // The argument group makes one of the two mandatory.
        (None, None) => {
            return Err(GeneratorError::InvalidArgument {
                flag: "--api".to_string(),
                reason: "one of --api or --design is required".to_string(),
            });
        }
    };

    let json_style = if cli.compact {
        JsonStyle::Compact
    } else {
        JsonStyle::Pretty
    };

    Ok(ParsedArgs::Run(Invocation {
        config: GeneratorConfig {
            output_root: cli.out,
            package: cli.package,
            json_style,
        },
        definition,
        verbosity: cli.verbose,
        json_logs: cli.json_logs,
    }))
}

/// Accepts a package name only if it is a valid, non-keyword Rust identifier.
fn parse_package(value: &str) -> Result<String, String> {
    syn::parse_str::<syn::Ident>(value)
        .map(|ident| ident.to_string())
        .map_err(|_| format!("'{}' is not a valid Rust identifier", value))
}

/// Converts a clap error into `InvalidArgument`, extracting the flag clap
/// blamed.
fn invalid_argument(err: &clap::Error) -> GeneratorError {
    let flag = match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => arg.clone(),
        Some(ContextValue::Strings(args)) => args.join(", "),
        _ => "<arguments>".to_string(),
    };

    let rendered = err.render().to_string();
    let reason = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string();

    GeneratorError::InvalidArgument { flag, reason }
}
