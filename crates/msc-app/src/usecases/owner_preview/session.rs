use std::sync::{Arc, Mutex};

use msc_core::ports::IdentityLookupPort;
use msc_core::{Generation, IdentifierExtractor, OwnerPreviewConfig, PublishedState};
use tracing::debug;

use super::debounce::DebounceGate;
use super::lock;
use super::publisher::PreviewSubscription;
use super::resolver::{BatchResolver, ResolverOptions};

/// Live owner preview for one input field.
///
/// Feeds raw operator input through extraction, debouncing and batch
/// resolution, and exposes the resulting [`PublishedState`] stream.
///
/// ## Behavior
/// - An input that yields no identifiers clears the preview immediately.
/// - Any other input change retires in-flight results and publishes the new
///   list as loading at once; its lookups start after the quiet period. Only
///   the last change within a quiet period is looked up.
/// - `teardown` (also run on drop) cancels the pending timer, retires the live
///   generation and ends every subscription. It is idempotent.
///
/// Input methods spawn timers, so they must be called within a Tokio runtime.
pub struct OwnerPreviewSession {
    extractor: IdentifierExtractor,
    gate: DebounceGate<Generation>,
    resolver: Arc<BatchResolver>,
    input: Mutex<InputState>,
}

#[derive(Default)]
struct InputState {
    last_raw: Option<String>,
    torn_down: bool,
}

impl OwnerPreviewSession {
    pub fn new(lookup: Arc<dyn IdentityLookupPort>, config: &OwnerPreviewConfig) -> Self {
        let resolver = Arc::new(BatchResolver::new(
            lookup,
            ResolverOptions::from_config(config),
        ));
        let run_target = Arc::clone(&resolver);
        let gate = DebounceGate::new(config.quiet_period, move |generation: Generation| {
            run_target.dispatch(generation);
        });

        Self {
            extractor: config.extractor(),
            gate,
            resolver,
            input: Mutex::new(InputState::default()),
        }
    }

    pub fn subscribe(&self) -> PreviewSubscription {
        self.resolver.subscribe()
    }

    pub fn snapshot(&self) -> PublishedState {
        self.resolver.snapshot()
    }

    /// Accept the current raw input. Identical consecutive input is ignored;
    /// use [`force_input`](Self::force_input) to re-run a resolution anyway.
    pub fn update_input(&self, raw: &str) {
        let mut input = lock(&self.input);
        if input.last_raw.as_deref() == Some(raw) {
            return;
        }
        self.apply_input(&mut input, raw);
    }

    /// Accept the current raw input as a fresh change, even if unchanged.
    pub fn force_input(&self, raw: &str) {
        let mut input = lock(&self.input);
        self.apply_input(&mut input, raw);
    }

    fn apply_input(&self, input: &mut InputState, raw: &str) {
        if input.torn_down {
            return;
        }
        input.last_raw = Some(raw.to_string());

        let list = self.extractor.extract(raw);
        // Cancel first: no timer may fire between retiring and rescheduling.
        self.gate.cancel();
        if list.is_empty() {
            debug!("owner input empty, clearing preview");
            self.resolver.clear();
            return;
        }

        debug!(owners = list.len(), "owner input changed");
        let generation = self.resolver.begin(list);
        self.gate.schedule(generation);
    }

    /// Cancel pending work and end every subscription. Safe to call repeatedly.
    pub fn teardown(&self) {
        let mut input = lock(&self.input);
        let first = !input.torn_down;
        input.torn_down = true;
        self.gate.close();
        self.resolver.shutdown();
        if first {
            debug!("owner preview session torn down");
        }
    }

    pub fn is_torn_down(&self) -> bool {
        lock(&self.input).torn_down
    }

    pub fn has_pending_timer(&self) -> bool {
        self.gate.is_pending()
    }

    pub fn live_generation(&self) -> Option<Generation> {
        self.resolver.live_generation()
    }

    /// Whether a resolution run is scheduled or in flight.
    pub fn is_busy(&self) -> bool {
        self.gate.is_pending() || self.resolver.is_resolving()
    }
}

impl Drop for OwnerPreviewSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
