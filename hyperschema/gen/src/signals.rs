//! Signal trap.
//!
//! SIGINT and SIGTERM end the process without unwinding, so the generator's
//! rollback guard never runs for them. [`SignalTrap`] listens for both on a
//! background thread. On delivery it flags the run as interrupted, waits for
//! the artifact being written to be recorded, removes everything recorded,
//! and then hands over to the exit action (by default, exit with
//! `128 + signal`).
//!
//! The trap is scoped: dropping it stops the listener thread.

use std::io;
use std::thread::{self, JoinHandle};

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use tracing::{error, warn};

use crate::tracker::RunHandle;

/// Signals that roll back a run in progress.
pub const TRAPPED_SIGNALS: [i32; 2] = [SIGINT, SIGTERM];

/// Conventional shell exit status for a process ended by `signal`.
pub fn exit_code(signal: i32) -> i32 {
    128 + signal
}

/// Installed SIGINT/SIGTERM listener.
///
/// ## Examples
///
/// ```no_run
/// use hyperschema_define::apis::define_cellar_api;
/// use hyperschema_gen::signals::SignalTrap;
/// use hyperschema_gen::{Generator, GeneratorConfig};
///
/// let mut generator = Generator::with_defaults(GeneratorConfig::new("gen")).unwrap();
/// let _trap = SignalTrap::install(generator.handle()).unwrap();
/// generator.generate(&define_cellar_api()).unwrap();
/// ```
pub struct SignalTrap {
    handle: Handle,
    listener: Option<JoinHandle<()>>,
}

impl SignalTrap {
    /// Installs the trap for the run behind `run`. A trapped signal rolls the
    /// run back and exits the process with [`exit_code`].
    ///
    /// ## Errors
    ///
    /// Fails if the signal handlers or the listener thread cannot be set up.
    pub fn install(run: RunHandle) -> io::Result<Self> {
        Self::install_with(run, |signal| std::process::exit(exit_code(signal)))
    }

    /// Like [`SignalTrap::install`], with a custom action run after rollback.
    ///
    /// The action runs while the artifact record is still locked, so the
    /// generator cannot record anything new before it returns.
    pub fn install_with<F>(run: RunHandle, on_signal: F) -> io::Result<Self>
    where
        F: Fn(i32) + Send + 'static,
    {
        let mut signals = Signals::new(TRAPPED_SIGNALS)?;
        let handle = signals.handle();
        let listener = thread::Builder::new()
            .name("hyperschema-signals".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    roll_back(&run, signal, &on_signal);
                }
            })?;

        Ok(Self {
            handle,
            listener: Some(listener),
        })
    }
}

impl Drop for SignalTrap {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(listener) = self.listener.take() {
            let _ = listener.join();
        }
    }
}

fn roll_back(run: &RunHandle, signal: i32, on_signal: &dyn Fn(i32)) {
    run.interrupt();
    let mut tracker = run.lock();
    if tracker.is_open() {
        error!(
            signal,
            artifacts = tracker.len(),
            "generation interrupted by a signal, rolling back"
        );
        tracker.remove_all();
    } else {
        warn!(signal, "signal received outside a generation run");
    }
    on_signal(signal);
}
