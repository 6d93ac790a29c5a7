//! Owner preview resolution pipeline.

mod debounce;
mod publisher;
mod resolver;
mod session;

pub use debounce::DebounceGate;
pub use publisher::PreviewSubscription;
pub use resolver::{BatchResolver, ResolverOptions};
pub use session::OwnerPreviewSession;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// State guarded here is only touched in short synchronous sections, so a
/// poisoned lock still holds consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
