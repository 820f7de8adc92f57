//! Scoped, thread-local switch for processing-log recording.
//!
//! Each thread keeps a stack of scopes. Opening a scope pushes its state and the
//! returned guard pops it on drop, so the previous state is restored on every
//! exit path, unwinding included. Guards are `!Send`; work fanned out to other
//! threads must be handed the flag explicitly.
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static SCOPES: RefCell<Vec<bool>> = const { RefCell::new(Vec::new()) };
}

/// Restores the previous logging state when dropped.
#[must_use = "processing logging is only switched while the guard is alive"]
#[derive(Debug)]
pub struct ProcessingLogGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ProcessingLogGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown.
        let _ = SCOPES.try_with(|scopes| scopes.borrow_mut().truncate(self.depth));
    }
}

fn push_scope(enabled: bool) -> ProcessingLogGuard {
    let depth = SCOPES.with(|scopes| {
        let mut scopes = scopes.borrow_mut();
        scopes.push(enabled);
        scopes.len() - 1
    });
    ProcessingLogGuard { depth, _not_send: PhantomData }
}

/// Enables processing logging on this thread until the guard is dropped.
pub fn enable_processing_log() -> ProcessingLogGuard {
    push_scope(true)
}

/// Disables processing logging on this thread until the guard is dropped.
pub fn disable_processing_log() -> ProcessingLogGuard {
    push_scope(false)
}

pub fn is_processing_log_enabled() -> bool {
    SCOPES.with(|scopes| scopes.borrow().last().copied().unwrap_or(false))
}

/// Runs `f` with processing logging enabled.
pub fn with_processing_log<T>(f: impl FnOnce() -> T) -> T {
    let _guard = enable_processing_log();
    f()
}
