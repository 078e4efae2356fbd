//! Bundled API definitions.
//!
//! These are selectable from the command line with `--api <name>`.

pub mod cellar;

pub use cellar::define_cellar_api;

/// Names accepted by [`lookup`].
pub const AVAILABLE: &[&str] = &["cellar"];

/// Returns the bundled definition registered under `name`.
///
/// ## Examples
///
/// ```
/// use hyperschema_define::apis::lookup;
///
/// assert!(lookup("cellar").is_some());
/// assert!(lookup("unknown").is_none());
/// ```
pub fn lookup(name: &str) -> Option<crate::ApiDefinition> {
    match name {
        "cellar" => Some(define_cellar_api()),
        _ => None,
    }
}
