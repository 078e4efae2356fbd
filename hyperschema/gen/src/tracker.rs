//! Ordered record of the artifacts a run created.
//!
//! The tracker is the basis for rollback: whatever it holds is exactly what
//! [`Generator::cleanup`](crate::Generator::cleanup) and the signal trap
//! remove. Paths must only be added once the corresponding write has
//! succeeded.
//!
//! The record lives behind a [`RunHandle`] so the signal trap thread can roll
//! back a run the main thread is still executing.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::output::remove_path;

/// Run state shared between a generator and its signal trap.
///
/// The generator creates and records each artifact while holding the lock,
/// so whoever takes the lock next never sees a created but unrecorded path.
/// The trap raises the interrupt flag before taking the lock; the generator
/// checks it under the lock before every step and before committing.
#[derive(Debug, Clone, Default)]
pub struct RunHandle {
    tracker: Arc<Mutex<ArtifactTracker>>,
    interrupted: Arc<AtomicBool>,
}

impl RunHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the artifact record.
    ///
    /// A panic while the lock was held leaves the record intact, so poisoning
    /// is ignored: rollback must still be able to read it.
    pub fn lock(&self) -> MutexGuard<'_, ArtifactTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Asks the current run to stop.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.interrupted.store(false, Ordering::SeqCst);
    }
}

/// Filesystem paths created during a single generation run, in creation order.
///
/// Duplicates are kept; removing the same path twice is harmless because
/// removal treats a missing path as already removed.
///
/// ## Examples
///
/// ```
/// use hyperschema_gen::tracker::ArtifactTracker;
///
/// let mut tracker = ArtifactTracker::new();
/// tracker.begin();
/// tracker.add("out/schema");
/// tracker.add("out/schema/schema.json");
/// assert_eq!(tracker.len(), 2);
/// assert!(tracker.is_open());
///
/// tracker.commit();
/// assert!(!tracker.is_open());
/// assert_eq!(tracker.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactTracker {
    paths: Vec<PathBuf>,
    open: bool,
}

impl ArtifactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new run: forgets previous paths and marks the run in progress.
    pub fn begin(&mut self) {
        self.paths.clear();
        self.open = true;
    }

    /// Marks the run as completed. The paths are kept.
    pub fn commit(&mut self) {
        self.open = false;
    }

    /// Whether a run is in progress.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Records a created path.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Returns the recorded paths in creation order.
    pub fn all(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Forgets every recorded path and closes the run.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.open = false;
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Removes every recorded path from disk, then clears the record.
    ///
    /// A path that is already gone counts as removed. Other failures are
    /// logged and the remaining paths are still attempted.
    pub fn remove_all(&mut self) {
        for path in &self.paths {
            match remove_path(path) {
                Ok(()) => debug!(path = %path.display(), "artifact removed"),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove artifact"),
            }
        }
        self.clear();
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn preserves_insertion_order() {
        let mut tracker = ArtifactTracker::new();
        tracker.add("c");
        tracker.add("a");
        tracker.add("b");

        let names: Vec<_> = tracker.all().iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut tracker = ArtifactTracker::new();
        tracker.add("out/schema");
        tracker.add("out/schema");
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn into_paths_keeps_order() {
        let mut tracker = ArtifactTracker::new();
        tracker.add("out/schema");
        tracker.add("out/schema/schema.json");
        assert_eq!(
            tracker.into_paths(),
            vec![PathBuf::from("out/schema"), PathBuf::from("out/schema/schema.json")]
        );
    }

    #[test]
    fn begin_forgets_previous_run() {
        let mut tracker = ArtifactTracker::new();
        tracker.begin();
        tracker.add("first");
        tracker.commit();

        tracker.begin();
        assert!(tracker.is_empty());
        assert!(tracker.is_open());
    }

    #[test]
    fn clear_is_repeatable() {
        let mut tracker = ArtifactTracker::new();
        tracker.begin();
        tracker.add("x");
        tracker.clear();
        tracker.clear();
        assert!(tracker.all().is_empty());
        assert!(!tracker.is_open());
    }

    #[test]
    fn remove_all_deletes_recorded_paths_only() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("schema");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("schema.json"), "{}").unwrap();
        let bystander = temp_dir.path().join("keep.txt");
        fs::write(&bystander, "keep").unwrap();

        let mut tracker = ArtifactTracker::new();
        tracker.begin();
        tracker.add(&dir);
        tracker.add(dir.join("schema.json"));
        tracker.remove_all();
        tracker.remove_all();

        assert!(!dir.exists());
        assert!(bystander.exists());
        assert!(tracker.is_empty());
    }

    #[test]
    fn lock_survives_poisoning() {
        let handle = RunHandle::new();
        let shared = handle.clone();
        let _ = std::thread::spawn(move || {
            let mut guard = shared.lock();
            guard.add("out/schema");
            panic!("writer bug");
        })
        .join();

        assert!(handle.tracker.is_poisoned());
        assert_eq!(handle.lock().len(), 1);
    }

    #[test]
    fn interrupt_is_visible_to_clones() {
        let handle = RunHandle::new();
        let trap_side = handle.clone();
        assert!(!handle.is_interrupted());

        trap_side.interrupt();
        assert!(handle.is_interrupted());

        handle.reset();
        assert!(!trap_side.is_interrupted());
    }
}
