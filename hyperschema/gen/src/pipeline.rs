//! Composition of several generators into one all-or-nothing run.
//!
//! Generators run in registration order. When one fails, it has already
//! rolled back its own output; the pipeline then cleans up every generator
//! that completed before it, most recent first. The same cleanup runs when a
//! generator panics, while the panic unwinds.

use std::path::PathBuf;

use hyperschema_define::ApiDefinition;
use tracing::{error, info, warn};

use crate::errors::GeneratorError;
use crate::generator::Generator;
use crate::schema::SchemaBuilder;
use crate::source::SourceWriter;

/// A unit of generation that can undo its own output.
pub trait ArtifactGenerator {
    /// Name used in logs and in [`GeneratorError::Pipeline`].
    fn name(&self) -> &str;

    /// Generates artifacts, returning their paths in creation order.
    ///
    /// ## Errors
    ///
    /// On error, nothing this generator created may remain on disk.
    fn generate(&mut self, api: &ApiDefinition) -> Result<Vec<PathBuf>, GeneratorError>;

    /// Removes everything the last successful `generate` created. Idempotent.
    fn cleanup(&mut self);
}

impl<B, W> ArtifactGenerator for Generator<B, W>
where
    B: SchemaBuilder,
    W: SourceWriter,
{
    fn name(&self) -> &str {
        "hyperschema"
    }

    fn generate(&mut self, api: &ApiDefinition) -> Result<Vec<PathBuf>, GeneratorError> {
        Generator::generate(self, api)
    }

    fn cleanup(&mut self) {
        Generator::cleanup(self);
    }
}

/// An ordered list of generators run as one transaction.
#[derive(Default)]
pub struct Pipeline {
    generators: Vec<Box<dyn ArtifactGenerator>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(mut self, generator: impl ArtifactGenerator + 'static) -> Self {
        self.generators.push(Box::new(generator));
        self
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Runs every generator and returns all artifacts, in order.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::Pipeline` wrapping the first failure, after
    /// the generators that had completed were cleaned up.
    pub fn run(&mut self, api: &ApiDefinition) -> Result<Vec<PathBuf>, GeneratorError> {
        let mut artifacts = Vec::new();
        let mut guard = CompletedGuard::arm(&mut self.generators);

        for index in 0..guard.generators.len() {
            let generator = &mut guard.generators[index];
            info!(generator = generator.name(), "running generator");

            match generator.generate(api) {
                Ok(paths) => {
                    artifacts.extend(paths);
                    guard.completed += 1;
                }
                Err(source) => {
                    let name = generator.name().to_string();
                    warn!(generator = %name, error = %source, "generator failed, cleaning up pipeline");
                    drop(guard);
                    return Err(GeneratorError::Pipeline {
                        generator: name,
                        source: Box::new(source),
                    });
                }
            }
        }

        guard.disarm();
        Ok(artifacts)
    }

    /// Cleans up every generator, most recent first.
    pub fn cleanup(&mut self) {
        for generator in self.generators.iter_mut().rev() {
            generator.cleanup();
        }
    }
}

/// Cleans up the completed prefix of a run on drop unless disarmed.
struct CompletedGuard<'a> {
    generators: &'a mut [Box<dyn ArtifactGenerator>],
    completed: usize,
    armed: bool,
}

impl<'a> CompletedGuard<'a> {
    fn arm(generators: &'a mut [Box<dyn ArtifactGenerator>]) -> Self {
        Self {
            generators,
            completed: 0,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CompletedGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if std::thread::panicking() {
            error!(
                completed = self.completed,
                "generator panicked, cleaning up pipeline"
            );
        }
        for done in self.generators[..self.completed].iter_mut().rev() {
            done.cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::{Arc, Mutex};

    type Journal = Arc<Mutex<Vec<String>>>;

    #[derive(Clone, Copy)]
    enum Outcome {
        Succeed,
        Fail,
        Panic,
    }

    struct Recording {
        name: &'static str,
        outcome: Outcome,
        journal: Journal,
    }

    impl Recording {
        fn new(name: &'static str, outcome: Outcome, journal: &Journal) -> Self {
            Self {
                name,
                outcome,
                journal: Arc::clone(journal),
            }
        }
    }

    impl ArtifactGenerator for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn generate(&mut self, _: &ApiDefinition) -> Result<Vec<PathBuf>, GeneratorError> {
            self.journal.lock().unwrap().push(format!("generate {}", self.name));
            match self.outcome {
                Outcome::Succeed => Ok(vec![PathBuf::from(self.name)]),
                Outcome::Fail => Err(GeneratorError::Format("broken template".into())),
                Outcome::Panic => panic!("{} exploded", self.name),
            }
        }

        fn cleanup(&mut self) {
            self.journal.lock().unwrap().push(format!("cleanup {}", self.name));
        }
    }

    #[test]
    fn run_collects_artifacts_in_order() {
        let journal = Journal::default();
        let mut pipeline = Pipeline::new()
            .with_generator(Recording::new("a", Outcome::Succeed, &journal))
            .with_generator(Recording::new("b", Outcome::Succeed, &journal));

        let artifacts = pipeline.run(&ApiDefinition::new("Bottles")).unwrap();

        assert_eq!(artifacts, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn failure_cleans_up_earlier_generators_in_reverse() {
        let journal = Journal::default();
        let mut pipeline = Pipeline::new()
            .with_generator(Recording::new("a", Outcome::Succeed, &journal))
            .with_generator(Recording::new("b", Outcome::Succeed, &journal))
            .with_generator(Recording::new("c", Outcome::Fail, &journal))
            .with_generator(Recording::new("d", Outcome::Succeed, &journal));

        let err = pipeline.run(&ApiDefinition::new("Bottles")).unwrap_err();

        match err {
            GeneratorError::Pipeline { generator, source } => {
                assert_eq!(generator, "c");
                assert!(matches!(*source, GeneratorError::Format(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "generate a",
                "generate b",
                "generate c",
                "cleanup b",
                "cleanup a"
            ]
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn panic_cleans_up_earlier_generators_in_reverse() {
        let journal = Journal::default();
        let mut pipeline = Pipeline::new()
            .with_generator(Recording::new("a", Outcome::Succeed, &journal))
            .with_generator(Recording::new("b", Outcome::Succeed, &journal))
            .with_generator(Recording::new("c", Outcome::Panic, &journal))
            .with_generator(Recording::new("d", Outcome::Succeed, &journal));

        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| pipeline.run(&ApiDefinition::new("Bottles"))));

        assert!(outcome.is_err());
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "generate a",
                "generate b",
                "generate c",
                "cleanup b",
                "cleanup a"
            ]
        );
        assert!(logs_contain("generator panicked, cleaning up pipeline"));
    }

    #[test]
    fn success_leaves_output_in_place() {
        let journal = Journal::default();
        let mut pipeline = Pipeline::new()
            .with_generator(Recording::new("a", Outcome::Succeed, &journal))
            .with_generator(Recording::new("b", Outcome::Succeed, &journal));

        pipeline.run(&ApiDefinition::new("Bottles")).unwrap();

        assert_eq!(*journal.lock().unwrap(), vec!["generate a", "generate b"]);
    }

    #[test]
    fn empty_pipeline_succeeds() {
        let mut pipeline = Pipeline::new();
        assert!(pipeline.is_empty());
        assert!(pipeline.run(&ApiDefinition::new("Bottles")).unwrap().is_empty());
    }
}
