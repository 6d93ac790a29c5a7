use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use msc_core::ports::{IdentityLookupError, IdentityLookupPort};
use msc_core::{
    Generation, IdentifierList, OwnerId, OwnerPreviewConfig, PreviewEntry, PublishedState,
};
use tokio::task::AbortHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use super::lock;
use super::publisher::{PreviewSubscription, Publisher};

/// Knobs of the batch resolver that do not belong to the debounce gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Message for failures that carry no reason.
    pub default_error_message: String,
    /// Per-lookup timeout; `None` waits indefinitely.
    pub lookup_timeout: Option<Duration>,
}

impl ResolverOptions {
    pub fn from_config(config: &OwnerPreviewConfig) -> Self {
        Self {
            default_error_message: config.default_error_message.clone(),
            lookup_timeout: config.lookup_timeout,
        }
    }
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self::from_config(&OwnerPreviewConfig::defaults())
    }
}

/// Resolves one identifier list at a time into preview entries.
///
/// ## Behavior
/// - `begin` retires the live generation and publishes an all-loading
///   snapshot for the new list before returning. No lookup starts yet.
/// - `dispatch` looks every owner of a begun generation up concurrently,
///   provided that generation is still live. `resolve` does both at once.
/// - Each settled lookup is published as soon as it lands; the final snapshot
///   (`loading == false`) follows once every lookup settled.
/// - Every publication passes the generation gate: it happens under the
///   resolver lock and only if the publishing generation is still live. A
///   retired generation can never publish again, whenever its lookups finish.
///
/// Lookup failures become error entries; `resolve` itself cannot fail. A
/// batch that stops without settling (a panicking adapter) turns its
/// remaining entries into error entries.
pub struct BatchResolver {
    lookup: Arc<dyn IdentityLookupPort>,
    options: Arc<ResolverOptions>,
    shared: Arc<ResolverShared>,
}

struct ResolverShared {
    state: Mutex<ResolverState>,
}

struct ResolverState {
    last_generation: Generation,
    live: Option<LiveGeneration>,
    publisher: Publisher,
}

struct LiveGeneration {
    generation: Generation,
    entries: Vec<PreviewEntry>,
    task: Option<AbortHandle>,
}

/// Lookup context created at dispatch time and owned by its pending future.
struct PendingLookup {
    index: usize,
    owner_id: OwnerId,
}

struct SettledLookup {
    index: usize,
    entry: PreviewEntry,
}

impl ResolverState {
    fn retire(&mut self) -> Option<Generation> {
        let live = self.live.take()?;
        if let Some(task) = live.task {
            // Advisory: requests already on the wire may still complete.
            task.abort();
        }
        Some(live.generation)
    }

    fn live_mut(&mut self, generation: Generation) -> Option<(&mut LiveGeneration, &mut Publisher)> {
        let ResolverState {
            live, publisher, ..
        } = self;
        live.as_mut()
            .filter(|live| live.generation == generation)
            .map(|live| (live, publisher))
    }
}

impl ResolverShared {
    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        lock(&self.state)
    }

    /// Returns `false` when `generation` is no longer live.
    fn publish_settled(&self, generation: Generation, settled: SettledLookup) -> bool {
        let mut state = self.lock();
        let Some((live, publisher)) = state.live_mut(generation) else {
            return false;
        };
        if let Some(slot) = live.entries.get_mut(settled.index) {
            *slot = settled.entry;
        }
        publisher.publish(PublishedState {
            entries: live.entries.clone(),
            loading: true,
        });
        true
    }

    /// Settle a batch that ended early: every entry still loading becomes
    /// an error entry and the final state is published.
    fn publish_abandoned(&self, generation: Generation, message: &str) -> bool {
        let mut state = self.lock();
        let Some((live, publisher)) = state.live_mut(generation) else {
            return false;
        };
        if live.task.take().is_none() {
            return false;
        }
        for entry in live.entries.iter_mut().filter(|e| e.status.is_loading()) {
            *entry = PreviewEntry::error(entry.owner_id.clone(), message);
        }
        publisher.publish(PublishedState {
            entries: live.entries.clone(),
            loading: false,
        });
        true
    }

    fn publish_complete(&self, generation: Generation) -> bool {
        let mut state = self.lock();
        let Some((live, publisher)) = state.live_mut(generation) else {
            return false;
        };
        live.task = None;
        publisher.publish(PublishedState {
            entries: live.entries.clone(),
            loading: false,
        });
        true
    }
}

impl BatchResolver {
    pub fn new(lookup: Arc<dyn IdentityLookupPort>, options: ResolverOptions) -> Self {
        Self {
            lookup,
            options: Arc::new(options),
            shared: Arc::new(ResolverShared {
                state: Mutex::new(ResolverState {
                    last_generation: Generation::new(0),
                    live: None,
                    publisher: Publisher::new(),
                }),
            }),
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Start a new generation for `list` and look it up right away. Must be
    /// called within a Tokio runtime.
    pub fn resolve(&self, list: IdentifierList) -> Generation {
        let generation = self.begin(list);
        self.dispatch(generation);
        generation
    }

    /// Retire the live generation, make a new one live for `list` and
    /// publish its all-loading snapshot. An empty list publishes the cleared
    /// state.
    pub fn begin(&self, list: IdentifierList) -> Generation {
        let mut state = self.shared.lock();
        state.retire();

        let generation = state.last_generation.next();
        state.last_generation = generation;

        let entries: Vec<PreviewEntry> = list
            .into_vec()
            .into_iter()
            .map(PreviewEntry::loading)
            .collect();
        state.publisher.publish(PublishedState {
            entries: entries.clone(),
            loading: !entries.is_empty(),
        });
        state.live = Some(LiveGeneration {
            generation,
            entries,
            task: None,
        });

        generation
    }

    /// Spawn the lookups of a begun generation. Returns `false`, spawning
    /// nothing, when `generation` is no longer live, was already dispatched
    /// or has no owners. Must be called within a Tokio runtime.
    pub fn dispatch(&self, generation: Generation) -> bool {
        let mut state = self.shared.lock();
        let Some(live) = state
            .live
            .as_mut()
            .filter(|live| live.generation == generation && live.task.is_none())
        else {
            return false;
        };
        if live.entries.is_empty() {
            return false;
        }

        let pending: Vec<PendingLookup> = live
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| PendingLookup {
                index,
                owner_id: entry.owner_id.clone(),
            })
            .collect();

        let span = info_span!(
            "usecase.owner_preview.resolve",
            generation = %generation,
            owners = pending.len(),
        );
        // The lock is still held, so the batch cannot publish before its
        // abort handle is recorded.
        let task = tokio::spawn(
            run_batch(
                Arc::clone(&self.shared),
                Arc::clone(&self.lookup),
                Arc::clone(&self.options),
                generation,
                pending,
            )
            .instrument(span),
        );
        live.task = Some(task.abort_handle());

        true
    }

    /// Write-disable the live generation without publishing anything.
    pub fn retire(&self) -> Option<Generation> {
        self.shared.lock().retire()
    }

    /// Retire the live generation and publish an empty, non-loading state.
    pub fn clear(&self) {
        let mut state = self.shared.lock();
        state.retire();
        state.publisher.publish(PublishedState::cleared());
    }

    /// Retire the live generation and end every subscription. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.shared.lock();
        state.retire();
        state.publisher.close();
    }

    pub fn live_generation(&self) -> Option<Generation> {
        self.shared
            .lock()
            .live
            .as_ref()
            .map(|live| live.generation)
    }

    /// Whether the live generation still has lookups in flight.
    pub fn is_resolving(&self) -> bool {
        self.shared
            .lock()
            .live
            .as_ref()
            .is_some_and(|live| live.task.is_some())
    }

    pub fn snapshot(&self) -> PublishedState {
        self.shared.lock().publisher.current().clone()
    }

    pub fn subscribe(&self) -> PreviewSubscription {
        self.shared.lock().publisher.subscribe()
    }
}

impl Drop for BatchResolver {
    fn drop(&mut self) {
        self.shared.lock().retire();
    }
}

async fn run_batch(
    shared: Arc<ResolverShared>,
    lookup: Arc<dyn IdentityLookupPort>,
    options: Arc<ResolverOptions>,
    generation: Generation,
    pending: Vec<PendingLookup>,
) {
    let owners = pending.len();
    let _exit = BatchExit {
        shared: Arc::clone(&shared),
        options: Arc::clone(&options),
        generation,
    };
    let mut in_flight: FuturesUnordered<_> = pending
        .into_iter()
        .map(|item| item.run(lookup.as_ref(), &options))
        .collect();

    let mut failed = 0usize;
    while let Some(settled) = in_flight.next().await {
        if settled.entry.error_message().is_some() {
            failed += 1;
        }
        if !shared.publish_settled(generation, settled) {
            return;
        }
    }

    if shared.publish_complete(generation) {
        info!(owners, failed, "owner preview resolved");
    }
}

/// Settles the generation if its batch task stops before publishing the
/// final state. A retired or completed generation is left alone.
struct BatchExit {
    shared: Arc<ResolverShared>,
    options: Arc<ResolverOptions>,
    generation: Generation,
}

impl Drop for BatchExit {
    fn drop(&mut self) {
        if self
            .shared
            .publish_abandoned(self.generation, &self.options.default_error_message)
        {
            warn!(generation = %self.generation, "owner preview batch ended early");
        }
    }
}

impl PendingLookup {
    async fn run(self, lookup: &dyn IdentityLookupPort, options: &ResolverOptions) -> SettledLookup {
        let outcome = match options.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, lookup.lookup_identity(&self.owner_id))
                .await
                .unwrap_or(Err(IdentityLookupError::Timeout)),
            None => lookup.lookup_identity(&self.owner_id).await,
        };

        let entry = match outcome {
            Ok(profile) => PreviewEntry::success(self.owner_id, profile),
            Err(err) => {
                debug!(owner_id = %self.owner_id, error = %err, "owner lookup failed");
                let message = err
                    .reason()
                    .unwrap_or_else(|| options.default_error_message.clone());
                PreviewEntry::error(self.owner_id, message)
            }
        };

        SettledLookup {
            index: self.index,
            entry,
        }
    }
}
