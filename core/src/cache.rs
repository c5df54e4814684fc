//! Query cache: keys, per-key state and mutation-driven invalidation.
//!
//! # State machine
//! ```text
//! Idle -> Fetching -> Fresh -(stale_time elapsed | invalidate)-> Stale -> Fetching -> Fresh | Error
//! ```
//! `Error` keeps the last error (and any earlier data) and is left alone
//! until a caller asks for the key again.
//!
//! An invalidation that lands while a fetch is in flight wins: the fetch
//! still stores its payload, but the entry stays stale.
//!
//! Entries that have settled and gone unused for `stale_time + gc_time`
//! are dropped by `prune`.
//!
//! # Invalidation
//! `Mutation::invalidates` is an explicit table from each mutation to the
//! query families it makes stale. Families are whole resources, so one
//! entry covers every parameterization (all list filters, all ids).

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::client::Payload;
use crate::error::ApiError;

/// A resource family. Every cached query belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFamily {
    Addresses,
    Address,
    Users,
    User,
    Tenants,
    Tenant,
    References,
    Reference,
    Contracts,
    Contract,
    ContractVersions,
    Statistics,
}

impl QueryFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryFamily::Addresses => "addresses",
            QueryFamily::Address => "address",
            QueryFamily::Users => "users",
            QueryFamily::User => "user",
            QueryFamily::Tenants => "tenants",
            QueryFamily::Tenant => "tenant",
            QueryFamily::References => "references",
            QueryFamily::Reference => "reference",
            QueryFamily::Contracts => "contracts",
            QueryFamily::Contract => "contract",
            QueryFamily::ContractVersions => "contract-versions",
            QueryFamily::Statistics => "statistics",
        }
    }
}

/// Stable identity of a cached query: its family plus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub family: QueryFamily,
    pub params: Vec<String>,
}

impl QueryKey {
    pub fn new(family: QueryFamily) -> Self {
        Self {
            family,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family.as_str())?;
        for p in &self.params {
            write!(f, "/{p}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    CreateAddress,
    UpdateAddress,
    DeleteAddress,
    CreateUser,
    UpdateUser,
    DeleteUser,
    CreateTenant,
    UpdateTenant,
    DeleteTenant,
    CreateReference,
    UpdateReference,
    DeleteReference,
    CreateContract,
    UpdateContract,
    DeleteContract,
    CreateContractVersion,
}

const ADDRESS_FAMILIES: &[QueryFamily] = &[QueryFamily::Addresses, QueryFamily::Address, QueryFamily::Statistics];

// Tenants and references are role-filtered views of users.
const USER_FAMILIES: &[QueryFamily] = &[
    QueryFamily::Users,
    QueryFamily::User,
    QueryFamily::Tenants,
    QueryFamily::Tenant,
    QueryFamily::References,
    QueryFamily::Reference,
    QueryFamily::Statistics,
];

const CONTRACT_FAMILIES: &[QueryFamily] = &[
    QueryFamily::Contracts,
    QueryFamily::Contract,
    QueryFamily::ContractVersions,
    QueryFamily::Statistics,
];

impl Mutation {
    /// Query families made stale when this mutation succeeds.
    pub fn invalidates(self) -> &'static [QueryFamily] {
        match self {
            Mutation::CreateAddress | Mutation::UpdateAddress | Mutation::DeleteAddress => ADDRESS_FAMILIES,
            Mutation::CreateUser
            | Mutation::UpdateUser
            | Mutation::DeleteUser
            | Mutation::CreateTenant
            | Mutation::UpdateTenant
            | Mutation::DeleteTenant
            | Mutation::CreateReference
            | Mutation::UpdateReference
            | Mutation::DeleteReference => USER_FAMILIES,
            Mutation::CreateContract
            | Mutation::UpdateContract
            | Mutation::DeleteContract
            | Mutation::CreateContractVersion => CONTRACT_FAMILIES,
        }
    }
}

/// Observable state of one query key.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    Idle,
    Fetching,
    Fresh,
    Stale,
    Error(ApiError),
}

/// Time source for staleness decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|p| p.into_inner());
        *offset += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[derive(Debug, Default)]
struct CacheEntry {
    data: Option<Payload>,
    fetched_at: Option<Instant>,
    settled_at: Option<Instant>,
    invalidated: bool,
    // Bumped by every invalidation.
    generation: u64,
    fetching: bool,
    error: Option<ApiError>,
}

/// Ticket returned by `begin_fetch` and handed back to `complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Per-key cached payloads with a freshness window.
#[derive(Debug)]
pub struct QueryCache {
    stale_time: Duration,
    gc_time: Duration,
    entries: HashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self::with_gc_time(stale_time, stale_time)
    }

    pub fn with_gc_time(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            stale_time,
            gc_time,
            entries: HashMap::new(),
        }
    }

    pub fn state(&self, key: &QueryKey, now: Instant) -> QueryState {
        let Some(entry) = self.entries.get(key) else {
            return QueryState::Idle;
        };
        if entry.fetching {
            return QueryState::Fetching;
        }
        if let Some(err) = &entry.error {
            return QueryState::Error(err.clone());
        }
        match (&entry.data, entry.fetched_at) {
            (Some(_), Some(at)) if !entry.invalidated && now.saturating_duration_since(at) < self.stale_time => {
                QueryState::Fresh
            }
            (Some(_), _) => QueryState::Stale,
            (None, _) => QueryState::Idle,
        }
    }

    /// Cached payload if the key is currently fresh.
    pub fn fresh(&self, key: &QueryKey, now: Instant) -> Option<Payload> {
        match self.state(key, now) {
            QueryState::Fresh => self.entries.get(key).and_then(|e| e.data.clone()),
            _ => None,
        }
    }

    /// Last successful payload regardless of freshness.
    pub fn data(&self, key: &QueryKey) -> Option<Payload> {
        self.entries.get(key).and_then(|e| e.data.clone())
    }

    pub fn begin_fetch(&mut self, key: &QueryKey) -> FetchTicket {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.fetching = true;
        FetchTicket {
            generation: entry.generation,
        }
    }

    /// Store the outcome of the fetch started with `ticket`.
    ///
    /// A payload fetched across an invalidation is kept as data but stays
    /// stale, so the next read goes back to the network.
    pub fn complete(&mut self, key: &QueryKey, ticket: FetchTicket, result: &Result<Payload, ApiError>, now: Instant) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.fetching = false;
        entry.settled_at = Some(now);
        match result {
            Ok(payload) => {
                entry.data = Some(payload.clone());
                entry.fetched_at = Some(now);
                entry.invalidated = entry.generation != ticket.generation;
                entry.error = None;
            }
            Err(err) => entry.error = Some(err.clone()),
        }
    }

    /// Mark every entry of `family` stale. Returns how many were touched.
    pub fn invalidate(&mut self, family: QueryFamily) -> usize {
        let mut touched = 0;
        for (key, entry) in self.entries.iter_mut() {
            if key.family == family {
                entry.invalidated = true;
                entry.generation = entry.generation.wrapping_add(1);
                touched += 1;
            }
        }
        touched
    }

    /// Drop settled entries untouched for `stale_time + gc_time`.
    /// Returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let horizon = self.stale_time + self.gc_time;
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry.fetching
                || entry
                    .settled_at
                    .is_none_or(|at| now.saturating_duration_since(at) < horizon)
        });
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
