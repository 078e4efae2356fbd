//! Validation, formatting and file-system primitives for generated output.
//!
//! ## Safety Guarantees
//!
//! - **Validation**: generated source is parsed with `syn` before anything is written
//! - **Formatting**: output is formatted with `prettyplease` for consistent style
//! - **Atomic writes**: temp file + rename, so a crash never leaves a half-written artifact
//! - **Tolerant removal**: removing a path that is already gone succeeds

use std::fs;
use std::io;
use std::path::Path;

use proc_macro2::TokenStream;

use crate::errors::GeneratorError;

/// Permissions of the staged output directory.
pub const DIR_MODE: u32 = 0o755;

/// Permissions of written artifacts.
pub const FILE_MODE: u32 = 0o644;

/// Validates generated code using syn.
///
/// ## Errors
///
/// Returns `GeneratorError::Format` if the tokens do not parse as a Rust file.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone()).map_err(|e| GeneratorError::Format(e.to_string()))
}

/// Formats a parsed file with prettyplease, prefixed by a header comment block.
///
/// Each header line becomes a `// ` comment, followed by the auto-generated
/// notice.
pub fn format_code(file: &syn::File, header: &[&str]) -> String {
    let mut out = String::new();
    for line in header {
        if line.is_empty() {
            out.push_str("//\n");
        } else {
            out.push_str("// ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str("//\n");
    out.push_str("// This code was automatically generated by hyperschema-gen. Do not edit manually.\n\n");
    out.push_str(&prettyplease::unparse(file));
    out
}

/// Writes content to a file atomically using temp file + rename.
///
/// The parent directory must already exist; staging is the generator's job.
///
/// ## Errors
///
/// Returns `GeneratorError::Write` naming the path that failed. A leftover
/// temp file is removed on a failed rename.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), GeneratorError> {
    let temp_path = path.with_extension("tmp");
    write_with_mode(&temp_path, content).map_err(|e| GeneratorError::Write {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(GeneratorError::Write {
            path: path.display().to_string(),
            source: e,
        });
    }

    Ok(())
}

#[cfg(unix)]
fn write_with_mode(path: &Path, content: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_with_mode(path: &Path, content: &[u8]) -> io::Result<()> {
    fs::write(path, content)
}

/// Creates a directory (and missing parents) with [`DIR_MODE`].
pub fn create_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)
}

/// Removes a file or a directory tree. A missing path counts as removed.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };

    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
