//! Fan-out of every probe onto a bounded pool of tasks, and collection of
//! their verdicts into a [`ResultSet`].
//!
//! A run moves through `Idle → Dispatched → Collecting → Reported → Done`.
//! All probes are spawned at once; a semaphore caps how many are in flight.
//! Results are taken in completion order. A probe that panics is logged and
//! left absent in the set; it never aborts its siblings.

pub mod report;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::Semaphore;

use crate::probe::{ProbeContext, ProbeResult, Service};

/// Verdicts keyed by service. Every dispatched service has a key; the value
/// is `None` when its probe crashed.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: BTreeMap<Service, Option<ProbeResult>>,
}

impl ResultSet {
    /// A set with every service in `services` present and absent.
    pub fn new(services: &[Service]) -> Self {
        Self {
            entries: services.iter().map(|&s| (s, None)).collect(),
        }
    }

    /// Record the verdict for `service`. A service already holding a
    /// verdict keeps it.
    pub fn insert(&mut self, service: Service, result: ProbeResult) {
        let slot = self.entries.entry(service).or_default();
        if slot.is_some() {
            log::warn!("[scheduler] duplicate result for {service} ignored");
            return;
        }
        *slot = Some(result);
    }

    pub fn get(&self, service: Service) -> Option<&ProbeResult> {
        self.entries.get(&service).and_then(Option::as_ref)
    }

    /// True when `service` was dispatched but produced no verdict, or was
    /// never dispatched at all.
    pub fn is_absent(&self, service: Service) -> bool {
        self.get(service).is_none()
    }

    pub fn contains(&self, service: Service) -> bool {
        self.entries.contains_key(&service)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in service order.
    pub fn iter(&self) -> impl Iterator<Item = (Service, Option<&ProbeResult>)> {
        self.entries.iter().map(|(s, r)| (*s, r.as_ref()))
    }
}

/// Run `probe` for every service on at most `workers` concurrent tasks.
pub async fn run_with<F, Fut>(services: &[Service], workers: usize, probe: F) -> ResultSet
where
    F: Fn(Service) -> Fut,
    Fut: Future<Output = ProbeResult> + Send + 'static,
{
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let mut pending = FuturesUnordered::new();

    for &service in services {
        let permits = permits.clone();
        let work = probe(service);
        let handle = tokio::spawn(async move {
            // a closed semaphore only lifts the cap
            let _permit = permits.acquire_owned().await.ok();
            log::debug!("[scheduler] {service} started");
            work.await
        });
        pending.push(async move { (service, handle.await) });
    }
    log::info!(
        "[scheduler] dispatched {} probes on {} workers",
        services.len(),
        workers.max(1)
    );

    let mut results = ResultSet::new(services);
    while let Some((service, joined)) = pending.next().await {
        match joined {
            Ok(result) => {
                log::debug!("[scheduler] {service} finished: {}", result.status());
                results.insert(service, result);
            }
            Err(e) => log::error!("[scheduler] {service} probe crashed: {e}"),
        }
    }
    log::info!(
        "[scheduler] collected {} of {} results",
        results.iter().filter(|(_, r)| r.is_some()).count(),
        results.len()
    );
    results
}

/// Probe every service with the shared context.
pub async fn run_all(ctx: Arc<ProbeContext>, workers: usize) -> ResultSet {
    run_with(&Service::ALL, workers, move |service| {
        let ctx = ctx.clone();
        async move { service.run(&ctx).await }
    })
    .await
}
