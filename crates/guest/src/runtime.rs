use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// A one shot flag for loading an embedded runtime.
///
/// The first [`RuntimeGuard::initialize`] runs its closure, every later request is a silent
/// no-op. Guests are single threaded so there is never a second initializer racing the first.
#[derive(Debug, Default)]
pub struct RuntimeGuard {
    initialized: AtomicBool,
}

impl RuntimeGuard {
    pub const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
        }
    }

    /// Run `f` if nothing has been initialized yet, returns whether `f` ran.
    pub fn initialize(&self, f: impl FnOnce()) -> bool {
        if self.initialized.swap(true, Ordering::AcqRel) {
            tracing::trace!("runtime already initialized");
            return false;
        }
        f();
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
}

/// the guard for this guest instance
pub static RUNTIME: RuntimeGuard = RuntimeGuard::new();

/// Bring up the guest's runtime state before its first entry point runs.
///
/// Every export generated by [`crate::plugin_fn`] calls this first, only the first call does
/// any work. On wasm32 that is building the internal call table for the imported host.
pub fn initialize() -> bool {
    RUNTIME.initialize(load)
}

fn load() {
    #[cfg(target_arch = "wasm32")]
    {
        let calls = crate::bridge::bridge();
        tracing::debug!(calls = calls.len(), "internal calls registered");
    }
    tracing::debug!("runtime initialized");
}
