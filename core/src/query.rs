//! Cached queries and invalidating mutations over a `Transport`.
//!
//! # Design
//! `QueryClient` pairs a stateless `RentalClient` with a transport and a
//! shared `QueryCache`. Reads go through `fetch`: callers for the same key
//! are serialized on a per-key gate, so a caller that arrives while another
//! is fetching waits and then takes the fresh result instead of issuing a
//! second request. Gates are dropped once no caller holds them. Writes go
//! through `mutate`: one request, no retry, and on success the families
//! listed in `Mutation::invalidates` go stale, including keys whose fetch
//! is still in flight.
//!
//! Queries that need an id do not run while the id is empty; they return
//! `Ok(None)` and leave the key idle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::cache::{Clock, Mutation, QueryCache, QueryFamily, QueryKey, QueryState, SystemClock};
use crate::client::{Payload, RentalClient};
use crate::config::ClientConfig;
use crate::document::ContractDocument;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::transport::Transport;
use crate::types::{
    Address, AddressType, Contract, ContractVersion, CreateAddress, CreateContract, CreateContractVersion,
    CreateUser, OverallStatistics, UpdateAddress, UpdateContract, UpdateUser, User, UserType,
};
use crate::validation::{validate_address, validate_contract, validate_contract_version, validate_user};

pub struct QueryClient<T: Transport> {
    client: RentalClient,
    transport: T,
    cache: Mutex<QueryCache>,
    inflight: Mutex<HashMap<QueryKey, Arc<Mutex<()>>>>,
    clock: Arc<dyn Clock>,
}

impl<T: Transport> QueryClient<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self::with_clock(config, transport, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &ClientConfig, transport: T, clock: Arc<dyn Clock>) -> Self {
        Self {
            client: RentalClient::from_config(config),
            transport,
            cache: Mutex::new(QueryCache::with_gc_time(config.stale_time, config.gc_time)),
            inflight: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn client(&self) -> &RentalClient {
        &self.client
    }

    pub fn state(&self, key: &QueryKey) -> QueryState {
        self.cache().state(key, self.clock.now())
    }

    /// Mark every cached query of `family` stale.
    pub fn invalidate(&self, family: QueryFamily) -> usize {
        self.cache().invalidate(family)
    }

    /// Run `request` for `key` unless a fresh result is cached.
    pub fn fetch(&self, key: &QueryKey, request: HttpRequest) -> Result<Payload, ApiError> {
        let gate = self.gate(key);
        let result = {
            let _turn = gate.lock().unwrap_or_else(|p| p.into_inner());
            self.fetch_gated(key, &request)
        };
        self.release_gate(key, &gate);
        result
    }

    fn fetch_gated(&self, key: &QueryKey, request: &HttpRequest) -> Result<Payload, ApiError> {
        let ticket = {
            let mut cache = self.cache();
            let now = self.clock.now();
            if let Some(hit) = cache.fresh(key, now) {
                debug!(key = %key, "query cache hit");
                return Ok(hit);
            }
            let pruned = cache.prune(now);
            if pruned > 0 {
                debug!(pruned, "evicted unused cache entries");
            }
            cache.begin_fetch(key)
        };
        let result = self.execute(request);
        self.cache().complete(key, ticket, &result, self.clock.now());
        result
    }

    /// Run a write once and invalidate its dependent families on success.
    pub fn mutate(&self, mutation: Mutation, request: HttpRequest) -> Result<Payload, ApiError> {
        let payload = self.execute(&request)?;
        let mut cache = self.cache();
        for family in mutation.invalidates() {
            let touched = cache.invalidate(*family);
            if touched > 0 {
                info!(?mutation, family = family.as_str(), touched, "invalidated cached queries");
            }
        }
        Ok(payload)
    }

    fn execute(&self, request: &HttpRequest) -> Result<Payload, ApiError> {
        let response = self.transport.execute(request)?;
        self.client.parse_payload(response)
    }

    fn cache(&self) -> MutexGuard<'_, QueryCache> {
        self.cache.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn gate(&self, key: &QueryKey) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(inflight.entry(key.clone()).or_default())
    }

    // Clones are only handed out under the `inflight` lock, so a count of
    // two (map + ours) means no other caller is waiting on this gate.
    fn release_gate(&self, key: &QueryKey, gate: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|p| p.into_inner());
        if Arc::strong_count(gate) == 2 {
            inflight.remove(key);
        }
    }

    fn query_list<M: DeserializeOwned>(&self, key: QueryKey, request: HttpRequest) -> Result<Vec<M>, ApiError> {
        self.fetch(&key, request)?.decode_list()
    }

    fn query_by_id<M: DeserializeOwned>(
        &self,
        family: QueryFamily,
        id: &str,
        build: impl FnOnce(&RentalClient, &str) -> HttpRequest,
    ) -> Result<Option<M>, ApiError> {
        if id.is_empty() {
            return Ok(None);
        }
        let request = build(&self.client, id);
        self.fetch(&QueryKey::new(family).with_param(id), request)?.decode()
    }

    fn mutate_one<M: DeserializeOwned>(&self, mutation: Mutation, request: HttpRequest) -> Result<Option<M>, ApiError> {
        self.mutate(mutation, request)?.decode()
    }

    // --- addresses -------------------------------------------------------

    pub fn addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.query_list(QueryKey::new(QueryFamily::Addresses), self.client.build_list_addresses(None))
    }

    pub fn addresses_by_type(&self, address_type: AddressType) -> Result<Vec<Address>, ApiError> {
        let key = QueryKey::new(QueryFamily::Addresses).with_param(address_type.as_str());
        self.query_list(key, self.client.build_list_addresses(Some(address_type)))
    }

    pub fn tenant_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.addresses_by_type(AddressType::Tenant)
    }

    pub fn property_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.addresses_by_type(AddressType::Property)
    }

    pub fn reference_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.addresses_by_type(AddressType::Reference)
    }

    pub fn address(&self, id: &str) -> Result<Option<Address>, ApiError> {
        self.query_by_id(QueryFamily::Address, id, RentalClient::build_get_address)
    }

    pub fn create_address(&self, input: &CreateAddress) -> Result<Option<Address>, ApiError> {
        validate_address(input)?;
        self.mutate_one(Mutation::CreateAddress, self.client.build_create_address(input)?)
    }

    pub fn update_address(&self, input: &UpdateAddress) -> Result<Option<Address>, ApiError> {
        self.mutate_one(Mutation::UpdateAddress, self.client.build_update_address(input)?)
    }

    pub fn delete_address(&self, id: &str) -> Result<(), ApiError> {
        self.mutate(Mutation::DeleteAddress, self.client.build_delete_address(id))
            .map(|_| ())
    }

    // --- users -----------------------------------------------------------

    pub fn users(&self, filter: Option<UserType>) -> Result<Vec<User>, ApiError> {
        let mut key = QueryKey::new(QueryFamily::Users);
        if let Some(t) = filter {
            key = key.with_param(t.as_str());
        }
        self.query_list(key, self.client.build_list_users(filter))
    }

    pub fn user(&self, id: &str) -> Result<Option<User>, ApiError> {
        self.query_by_id(QueryFamily::User, id, RentalClient::build_get_user)
    }

    pub fn create_user(&self, input: &CreateUser) -> Result<Option<User>, ApiError> {
        validate_user(input)?;
        self.mutate_one(Mutation::CreateUser, self.client.build_create_user(input)?)
    }

    pub fn update_user(&self, input: &UpdateUser) -> Result<Option<User>, ApiError> {
        self.mutate_one(Mutation::UpdateUser, self.client.build_update_user(input)?)
    }

    pub fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.mutate(Mutation::DeleteUser, self.client.build_delete_user(id))
            .map(|_| ())
    }

    // --- tenants and references (role-filtered user views) -----------------

    pub fn tenants(&self) -> Result<Vec<User>, ApiError> {
        self.query_list(
            QueryKey::new(QueryFamily::Tenants),
            self.client.build_list_users(Some(UserType::Tenant)),
        )
    }

    pub fn tenant(&self, id: &str) -> Result<Option<User>, ApiError> {
        self.query_by_id(QueryFamily::Tenant, id, RentalClient::build_get_user)
    }

    /// Creates a user with the tenant role regardless of `input.user_type`.
    pub fn create_tenant(&self, input: &CreateUser) -> Result<Option<User>, ApiError> {
        let input = CreateUser {
            user_type: UserType::Tenant,
            ..input.clone()
        };
        validate_user(&input)?;
        self.mutate_one(Mutation::CreateTenant, self.client.build_create_user(&input)?)
    }

    pub fn update_tenant(&self, input: &UpdateUser) -> Result<Option<User>, ApiError> {
        self.mutate_one(Mutation::UpdateTenant, self.client.build_update_user(input)?)
    }

    pub fn delete_tenant(&self, id: &str) -> Result<(), ApiError> {
        self.mutate(Mutation::DeleteTenant, self.client.build_delete_user(id))
            .map(|_| ())
    }

    pub fn references(&self) -> Result<Vec<User>, ApiError> {
        self.query_list(
            QueryKey::new(QueryFamily::References),
            self.client.build_list_users(Some(UserType::Reference)),
        )
    }

    pub fn reference(&self, id: &str) -> Result<Option<User>, ApiError> {
        self.query_by_id(QueryFamily::Reference, id, RentalClient::build_get_user)
    }

    /// Creates a user with the reference role regardless of `input.user_type`.
    pub fn create_reference(&self, input: &CreateUser) -> Result<Option<User>, ApiError> {
        let input = CreateUser {
            user_type: UserType::Reference,
            ..input.clone()
        };
        validate_user(&input)?;
        self.mutate_one(Mutation::CreateReference, self.client.build_create_user(&input)?)
    }

    pub fn update_reference(&self, input: &UpdateUser) -> Result<Option<User>, ApiError> {
        self.mutate_one(Mutation::UpdateReference, self.client.build_update_user(input)?)
    }

    pub fn delete_reference(&self, id: &str) -> Result<(), ApiError> {
        self.mutate(Mutation::DeleteReference, self.client.build_delete_user(id))
            .map(|_| ())
    }

    // --- contracts -------------------------------------------------------

    pub fn contracts(&self, tenant_id: Option<&str>) -> Result<Vec<Contract>, ApiError> {
        let key = QueryKey::new(QueryFamily::Contracts).with_param(tenant_id.unwrap_or_default());
        self.query_list(key, self.client.build_list_contracts(tenant_id))
    }

    pub fn contract(&self, id: &str) -> Result<Option<Contract>, ApiError> {
        self.query_by_id(QueryFamily::Contract, id, RentalClient::build_get_contract)
    }

    pub fn create_contract(&self, input: &CreateContract) -> Result<Option<Contract>, ApiError> {
        validate_contract(input)?;
        self.mutate_one(Mutation::CreateContract, self.client.build_create_contract(input)?)
    }

    pub fn update_contract(&self, input: &UpdateContract) -> Result<Option<Contract>, ApiError> {
        self.mutate_one(Mutation::UpdateContract, self.client.build_update_contract(input)?)
    }

    pub fn delete_contract(&self, id: &str) -> Result<(), ApiError> {
        self.mutate(Mutation::DeleteContract, self.client.build_delete_contract(id))
            .map(|_| ())
    }

    pub fn create_contract_version(&self, input: &CreateContractVersion) -> Result<Option<ContractVersion>, ApiError> {
        validate_contract_version(input)?;
        self.mutate_one(
            Mutation::CreateContractVersion,
            self.client.build_create_contract_version(input)?,
        )
    }

    pub fn contract_versions(&self, contract_id: &str) -> Result<Vec<ContractVersion>, ApiError> {
        if contract_id.is_empty() {
            return Ok(Vec::new());
        }
        let key = QueryKey::new(QueryFamily::ContractVersions).with_param(contract_id);
        self.query_list(key, self.client.build_list_contract_versions(contract_id))
    }

    /// Uncached binary download; never touches the query cache.
    pub fn contract_document(&self, contract_id: &str, version_id: Option<&str>) -> Result<ContractDocument, ApiError> {
        let request = self.client.build_get_contract_document(contract_id, version_id);
        let response = self.transport.execute(&request)?;
        self.client.parse_document(response)
    }

    // --- statistics ------------------------------------------------------

    pub fn overall_statistics(&self) -> Result<Option<OverallStatistics>, ApiError> {
        let key = QueryKey::new(QueryFamily::Statistics).with_param("overall");
        self.fetch(&key, self.client.build_get_overall_statistics())?.decode()
    }
}
