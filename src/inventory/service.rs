//! Inventory service: scan, aggregate, publish, query
//!
//! # Scan pipeline
//!
//! 1. Take a generation ticket (the initiation order of scans)
//! 2. Enumerate candidates; an [`EnumerationError`] ends the scan with an
//!    empty, error-carrying snapshot
//! 3. Resolve icons on a bounded rayon pool; results are collected by
//!    original index, never by completion order
//! 4. Stable-partition: records with an icon first, each group in listing order
//! 5. Publish the snapshot if no later scan has been initiated
//!
//! # Concurrency
//!
//! The published snapshot is an `Arc<Snapshot>` behind a `parking_lot`
//! `RwLock`. Readers clone the `Arc` under a short read lock and then work on
//! immutable data. A scan whose ticket is no longer the latest one initiated
//! finishes its work but its snapshot is discarded, so a superseded scan can
//! never overwrite a later one.

use super::enumerator::AppEnumerator;
use crate::error::{EnumerationError, Result};
use crate::icon::{AppIcon, IconResolver};
use crate::platform::Candidate;
use crate::session::Session;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use tracing::{debug, error, info};

/// One discovered application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRecord {
    /// Display name, never empty
    pub name: String,
    /// Launch path, unique within a snapshot
    pub path: String,
    /// Resolved icon, `None` when absent or degraded
    pub icon: Option<AppIcon>,
    /// Human-readable description
    pub description: String,
}

impl AppRecord {
    /// Whether the record carries an icon
    pub fn has_icon(&self) -> bool {
        self.icon.is_some()
    }
}

/// Immutable result of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Ticket of the scan that produced this snapshot, 0 before any scan
    pub generation: u64,
    /// Records in display order
    pub records: Vec<AppRecord>,
    /// Set when enumeration failed; `records` is then empty
    pub error: Option<EnumerationError>,
}

/// Outcome of a single scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Snapshot this scan produced
    pub snapshot: Arc<Snapshot>,
    /// Whether the snapshot was published, `false` when superseded
    pub published: bool,
}

impl ScanReport {
    /// Records this scan produced
    pub fn records(&self) -> &[AppRecord] {
        &self.snapshot.records
    }

    /// Enumeration failure, if any
    pub fn error(&self) -> Option<&EnumerationError> {
        self.snapshot.error.as_ref()
    }
}

/// Orchestrates scans and serves queries over the published snapshot
pub struct InventoryService {
    session: Arc<Session>,
    enumerator: AppEnumerator,
    resolver: IconResolver,
    pool: rayon::ThreadPool,
    initiated: AtomicU64,
    published: RwLock<Arc<Snapshot>>,
}

impl std::fmt::Debug for InventoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryService")
            .field("session", &self.session)
            .field("initiated", &self.initiated)
            .finish_non_exhaustive()
    }
}

impl InventoryService {
    /// Create a service with an icon pool sized by the session's worker limit
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GotoAppError::WorkerPool`] if the pool threads
    /// cannot be spawned.
    pub fn new(session: Arc<Session>) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(session.worker_limit())
            .thread_name(|i| format!("gotoapp-icon-{i}"))
            .build()?;
        let enumerator = AppEnumerator::new(
            Arc::clone(&session.policy),
            Arc::clone(&session.runner),
            session.enumeration_timeout(),
        );
        let resolver = IconResolver::new(Arc::clone(&session.files));

        Ok(Self {
            session,
            enumerator,
            resolver,
            pool,
            initiated: AtomicU64::new(0),
            published: RwLock::new(Arc::new(Snapshot::default())),
        })
    }

    /// Run a scan on the calling thread
    pub fn scan(&self) -> ScanReport {
        let generation = self.begin_scan();
        self.run_scan(generation)
    }

    /// Start a scan on a background thread
    ///
    /// The generation ticket is taken before this returns, so scans are
    /// ordered by call order even if their threads start late.
    pub fn spawn_scan(self: &Arc<Self>) -> JoinHandle<ScanReport> {
        let generation = self.begin_scan();
        let service = Arc::clone(self);
        std::thread::spawn(move || service.run_scan(generation))
    }

    /// The currently published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.published.read())
    }

    /// Records of the published snapshot whose name contains `term`
    pub fn filter(&self, term: &str) -> Vec<AppRecord> {
        filter_records(&self.snapshot().records, term)
    }

    fn begin_scan(&self) -> u64 {
        self.initiated.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn run_scan(&self, generation: u64) -> ScanReport {
        info!("Scan #{} started", generation);

        let snapshot = match self.enumerator.enumerate() {
            Ok(candidates) => Snapshot {
                generation,
                records: self.resolve_all(candidates),
                error: None,
            },
            Err(e) => {
                error!("Scan #{} failed: {}", generation, e);
                Snapshot {
                    generation,
                    records: Vec::new(),
                    error: Some(e),
                }
            }
        };

        let snapshot = Arc::new(snapshot);
        let published = self.publish(&snapshot);
        if published {
            info!(
                "Scan #{} published {} record(s)",
                generation,
                snapshot.records.len()
            );
        }
        ScanReport {
            snapshot,
            published,
        }
    }

    fn resolve_all(&self, candidates: Vec<Candidate>) -> Vec<AppRecord> {
        let policy = &self.session.policy;
        let resolver = &self.resolver;

        let records: Vec<AppRecord> = self.pool.install(|| {
            candidates
                .into_par_iter()
                .map(|candidate| {
                    let icon = resolver.resolve(&policy.icon_source(&candidate));
                    AppRecord {
                        description: policy.describe(&candidate),
                        name: candidate.name,
                        path: candidate.path,
                        icon,
                    }
                })
                .collect()
        });

        order_records(records)
    }

    fn publish(&self, snapshot: &Arc<Snapshot>) -> bool {
        let mut current = self.published.write();
        let latest = self.initiated.load(Ordering::SeqCst);
        if snapshot.generation != latest || snapshot.generation <= current.generation {
            debug!(
                "Discarding scan #{} (latest initiated #{}, published #{})",
                snapshot.generation, latest, current.generation
            );
            return false;
        }
        *current = Arc::clone(snapshot);
        true
    }
}

/// Stable partition: records with an icon first, listing order kept within
/// each group
pub fn order_records(records: Vec<AppRecord>) -> Vec<AppRecord> {
    let (mut with_icon, without_icon): (Vec<_>, Vec<_>) =
        records.into_iter().partition(AppRecord::has_icon);
    with_icon.extend(without_icon);
    with_icon
}

/// Case-insensitive substring filter preserving order
///
/// An empty term matches every record.
pub fn filter_records(records: &[AppRecord], term: &str) -> Vec<AppRecord> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
