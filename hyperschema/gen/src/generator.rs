//! Generation orchestration.
//!
//! A [`Generator`] runs one generation at a time:
//!
//! ```text
//! Idle -> Staging -> Building -> Writing -> Done
//!   \________\__________\__________\-----> RollingBack -> Failed
//! ```
//!
//! 1. **Staging** - `<output_root>/schema` is removed if present, recreated,
//!    and recorded as the first artifact.
//! 2. **Building** - the [`SchemaBuilder`] derives the schema document.
//! 3. **Writing** - `schema.json` is written, then the controller stub is
//!    handed to the [`SourceWriter`].
//!
//! A path is recorded only after its write succeeded. Every exit other than
//! a completed run rolls back what was recorded:
//!
//! - error returns, and panics raised by a collaborator while the run is in
//!   progress, through a [`RollbackGuard`] armed before staging whose `Drop`
//!   runs during unwinding. [`run_with_crash_trap`] is the top-level handler
//!   that turns such a panic into [`GeneratorError::CrashDuringGeneration`];
//! - fatal signals, which do not unwind, through the signal trap (see
//!   `signals`), which shares the artifact record via [`Generator::handle`].
//!   Each artifact is created and recorded under the record's lock, and the
//!   run stops with [`GeneratorError::Interrupted`] once the trap fired.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use hyperschema_define::ApiDefinition;
use tracing::{debug, error, info, warn};

use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;
use crate::output::{create_dir, remove_path, write_atomic};
use crate::schema::{HyperSchemaBuilder, SchemaBuilder};
use crate::source::{RustSourceWriter, SourceWriter};
use crate::stub::{SCHEMA_DIR, SCHEMA_FILE, schema_controller};
use crate::tracker::{ArtifactTracker, RunHandle};

/// Lifecycle state of a [`Generator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    Staging,
    Building,
    Writing,
    Done,
    RollingBack,
    Failed,
}

/// The JSON Hyper-Schema generator.
///
/// Owns the configuration, its two collaborators and the artifact record of
/// the current run. The record is shared only with the signal trap. A generator must not share its output root with another
/// generator running at the same time.
///
/// ## Examples
///
/// ```no_run
/// use hyperschema_define::apis::define_cellar_api;
/// use hyperschema_gen::{Generator, GeneratorConfig};
///
/// let mut generator = Generator::with_defaults(GeneratorConfig::new("gen")).unwrap();
/// let artifacts = generator.generate(&define_cellar_api()).unwrap();
/// assert_eq!(artifacts.len(), 3);
/// ```
#[derive(Debug)]
pub struct Generator<B = HyperSchemaBuilder, W = RustSourceWriter> {
    config: GeneratorConfig,
    builder: B,
    writer: W,
    run: RunHandle,
    state: GeneratorState,
}

impl Generator {
    /// Creates a generator using [`HyperSchemaBuilder`] and [`RustSourceWriter`].
    ///
    /// ## Errors
    ///
    /// See [`Generator::new`].
    pub fn with_defaults(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        Self::new(config, HyperSchemaBuilder, RustSourceWriter)
    }
}

impl<B, W> Generator<B, W>
where
    B: SchemaBuilder,
    W: SourceWriter,
{
    /// Creates an idle generator. Does not touch the disk.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::InvalidConfig` if the configuration does not
    /// validate (see [`GeneratorConfig::validated`]).
    pub fn new(config: GeneratorConfig, builder: B, writer: W) -> Result<Self, GeneratorError> {
        Ok(Self {
            config: config.validated()?,
            builder,
            writer,
            run: RunHandle::new(),
            state: GeneratorState::Idle,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Artifacts recorded so far for the current run.
    pub fn artifacts(&self) -> Vec<PathBuf> {
        self.run.lock().all().to_vec()
    }

    /// Handle on the artifact record, for installing a signal trap.
    pub fn handle(&self) -> RunHandle {
        self.run.clone()
    }

    /// Directory receiving the artifacts: `<output_root>/schema`.
    pub fn schema_dir(&self) -> PathBuf {
        self.config.output_root.join(SCHEMA_DIR)
    }

    /// Path of the generated controller stub: `<schema_dir>/<package>.rs`.
    pub fn source_path(&self) -> PathBuf {
        self.schema_dir().join(format!("{}.rs", self.config.package))
    }

    /// Runs a full generation for `api`.
    ///
    /// Returns the absolute paths of every artifact, in creation order: the
    /// staged directory, `schema.json`, then the controller stub.
    ///
    /// ## Errors
    ///
    /// Any failure rolls the run back before the error is returned, so the
    /// schema directory does not exist afterwards.
    pub fn generate(&mut self, api: &ApiDefinition) -> Result<Vec<PathBuf>, GeneratorError> {
        info!(api = %api.name, dir = %self.schema_dir().display(), "generating JSON hyper-schema");
        self.run.reset();
        self.run.lock().begin();

        let mut guard = RollbackGuard::arm(self);
        match guard.generator.run(api) {
            Ok(artifacts) => {
                guard.disarm();
                info!(api = %api.name, artifacts = artifacts.len(), "generation complete");
                Ok(artifacts)
            }
            Err(err) => {
                warn!(stage = %err.stage(), error = %err, "generation failed, rolling back");
                drop(guard);
                Err(err)
            }
        }
    }

    fn run(&mut self, api: &ApiDefinition) -> Result<Vec<PathBuf>, GeneratorError> {
        self.state = GeneratorState::Staging;
        let dir = self.schema_dir();
        self.record(dir.clone(), || stage_dir(&dir))?;

        self.state = GeneratorState::Building;
        let document = self.builder.build(api)?;

        self.state = GeneratorState::Writing;
        let json = document
            .to_json(self.config.json_style)
            .map_err(GeneratorError::Serialize)?;
        let schema_path = dir.join(SCHEMA_FILE);
        self.record(schema_path.clone(), || write_atomic(&schema_path, &json))?;

        let source_path = self.source_path();
        let file = schema_controller(api, &self.config.package);
        self.record(source_path.clone(), || self.writer.write(&source_path, &file))?;

        let mut tracker = self.run.lock();
        self.ensure_running(&tracker)?;
        tracker.commit();
        self.state = GeneratorState::Done;
        Ok(tracker.all().to_vec())
    }

    /// Runs `create`, then records `path`, both under the record's lock.
    fn record(
        &self,
        path: PathBuf,
        create: impl FnOnce() -> Result<(), GeneratorError>,
    ) -> Result<(), GeneratorError> {
        let mut tracker = self.run.lock();
        self.ensure_running(&tracker)?;
        create()?;
        debug!(path = %path.display(), "artifact created");
        tracker.add(path);
        Ok(())
    }

    fn ensure_running(&self, tracker: &ArtifactTracker) -> Result<(), GeneratorError> {
        if self.run.is_interrupted() || !tracker.is_open() {
            return Err(GeneratorError::Interrupted);
        }
        Ok(())
    }
}

impl<B, W> Generator<B, W> {
    /// Removes every recorded artifact, forgets them, and returns to `Idle`.
    ///
    /// Paths that no longer exist count as removed, so calling this any
    /// number of times, after a successful or a failed run, is safe. Other
    /// removal failures are logged and do not stop the remaining removals.
    pub fn cleanup(&mut self) {
        self.run.lock().remove_all();
        self.state = GeneratorState::Idle;
    }

    fn rollback(&mut self) {
        self.state = GeneratorState::RollingBack;
        self.run.lock().remove_all();
        self.state = GeneratorState::Failed;
    }
}

/// Rolls the run back on drop unless disarmed.
struct RollbackGuard<'a, B, W> {
    generator: &'a mut Generator<B, W>,
    armed: bool,
}

impl<'a, B, W> RollbackGuard<'a, B, W> {
    fn arm(generator: &'a mut Generator<B, W>) -> Self {
        Self {
            generator,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<B, W> Drop for RollbackGuard<'_, B, W> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if std::thread::panicking() {
            error!(
                state = ?self.generator.state,
                artifacts = self.generator.run.lock().len(),
                "generation aborted by a panic, rolling back"
            );
        }
        self.generator.rollback();
    }
}

/// Removes whatever sits at `dir` and recreates it empty.
fn stage_dir(dir: &Path) -> Result<(), GeneratorError> {
    let staging_error = |source| GeneratorError::Staging {
        path: dir.display().to_string(),
        source,
    };
    remove_path(dir).map_err(staging_error)?;
    create_dir(dir).map_err(staging_error)
}

/// Runs `f`, converting a panic into [`GeneratorError::CrashDuringGeneration`].
///
/// A generator that panics mid-run has already rolled back by the time the
/// panic reaches this function.
///
/// ## Examples
///
/// ```
/// use hyperschema_gen::{GeneratorError, run_with_crash_trap};
///
/// let result: Result<(), _> = run_with_crash_trap(|| panic!("boom"));
/// assert!(matches!(result, Err(GeneratorError::CrashDuringGeneration { .. })));
/// ```
pub fn run_with_crash_trap<T, F>(f: F) -> Result<T, GeneratorError>
where
    F: FnOnce() -> Result<T, GeneratorError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(%message, "generation crashed");
            Err(GeneratorError::CrashDuringGeneration { message })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Generates artifacts for `api` with the default collaborators.
///
/// Entry point for callers composing several generators.
///
/// ## Errors
///
/// See [`Generator::generate`].
pub fn generate(
    api: &ApiDefinition,
    config: GeneratorConfig,
) -> Result<Vec<PathBuf>, GeneratorError> {
    Generator::with_defaults(config)?.generate(api)
}
