//! In-memory tables and the derived statistics.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    Address, AddressType, ContractRecord, ContractResponse, ContractStatus, ContractVersion, CreateContractVersion,
    OverallStatistics, User, UserType,
};

/// Rows are kept in insertion order so list endpoints are stable.
#[derive(Default)]
pub struct Store {
    pub addresses: Vec<Address>,
    pub users: Vec<User>,
    pub contracts: Vec<ContractRecord>,
    pub versions: Vec<ContractVersion>,
}

impl Store {
    pub fn address(&self, id: Uuid) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn contract(&self, id: Uuid) -> Option<&ContractRecord> {
        self.contracts.iter().find(|c| c.id == id)
    }

    pub fn version(&self, id: Uuid) -> Option<&ContractVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Versions of one contract, newest first.
    pub fn versions_of(&self, contract_id: Uuid) -> Vec<ContractVersion> {
        let mut versions: Vec<ContractVersion> = self
            .versions
            .iter()
            .filter(|v| v.contract_id == contract_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        versions
    }

    /// Append a version numbered one past the contract's highest and point
    /// the contract at it. `None` when the contract does not exist.
    pub fn append_version(&mut self, input: CreateContractVersion) -> Option<ContractVersion> {
        let contract = self.contracts.iter_mut().find(|c| c.id == input.contract_id)?;
        let next = self
            .versions
            .iter()
            .filter(|v| v.contract_id == input.contract_id)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1;

        let now = Utc::now();
        let version = ContractVersion {
            id: Uuid::new_v4(),
            contract_id: input.contract_id,
            version_number: next,
            deposit: input.deposit,
            rent: input.rent,
            rent_increase_percentage: input.rent_increase_percentage,
            business: input.business,
            status: input.status,
            contract_type: input.contract_type,
            start_date: input.start_date,
            end_date: input.end_date,
            renewal_date: input.renewal_date,
            special_terms: input.special_terms,
            created_at: now,
        };
        contract.current_version_id = Some(version.id);
        contract.updated_at = Some(now);
        self.versions.push(version.clone());
        Some(version)
    }

    pub fn remove_contract(&mut self, id: Uuid) -> bool {
        let before = self.contracts.len();
        self.contracts.retain(|c| c.id != id);
        if self.contracts.len() == before {
            return false;
        }
        self.versions.retain(|v| v.contract_id != id);
        true
    }

    /// Resolve relations. `with_history` embeds the full version list.
    pub fn contract_response(&self, record: &ContractRecord, with_history: bool) -> ContractResponse {
        ContractResponse {
            id: record.id,
            current_version_id: record.current_version_id,
            landlord_id: record.landlord_id,
            tenant_id: record.tenant_id,
            address_id: record.address_id,
            deposit: record.deposit,
            created_at: record.created_at,
            updated_at: record.updated_at,
            current_version: record.current_version_id.and_then(|id| self.version(id)).cloned(),
            landlord: self.user(record.landlord_id).cloned(),
            tenant: self.user(record.tenant_id).cloned(),
            address: self.address(record.address_id).cloned(),
            versions: if with_history {
                self.versions_of(record.id)
            } else {
                Vec::new()
            },
            references: record
                .reference_ids
                .iter()
                .filter_map(|id| self.user(*id).cloned())
                .collect(),
        }
    }

    fn current_status(&self, record: &ContractRecord) -> Option<ContractStatus> {
        record
            .current_version_id
            .and_then(|id| self.version(id))
            .map(|v| v.status)
    }

    pub fn statistics(&self) -> OverallStatistics {
        let mut stats = OverallStatistics {
            total_contracts: self.contracts.len() as i64,
            ..Default::default()
        };

        let mut occupied = HashSet::new();
        let mut active_tenants = HashSet::new();
        for contract in &self.contracts {
            match self.current_status(contract) {
                Some(ContractStatus::Active) => {
                    stats.active_contracts += 1;
                    if let Some(v) = contract.current_version_id.and_then(|id| self.version(id)) {
                        stats.monthly_revenue += v.rent;
                    }
                    if self
                        .address(contract.address_id)
                        .is_some_and(|a| a.address_type == AddressType::Property)
                    {
                        occupied.insert(contract.address_id);
                    }
                    if self
                        .user(contract.tenant_id)
                        .is_some_and(|u| u.user_type == UserType::Tenant)
                    {
                        active_tenants.insert(contract.tenant_id);
                    }
                }
                Some(ContractStatus::Expired) => stats.expired_contracts += 1,
                _ => {}
            }
        }

        stats.total_properties = self
            .addresses
            .iter()
            .filter(|a| a.address_type == AddressType::Property)
            .count() as i64;
        stats.occupied_properties = occupied.len() as i64;
        stats.vacant_properties = stats.total_properties - stats.occupied_properties;
        stats.total_tenants = self.users.iter().filter(|u| u.user_type == UserType::Tenant).count() as i64;
        stats.total_references = self
            .users
            .iter()
            .filter(|u| u.user_type == UserType::Reference)
            .count() as i64;
        stats.active_tenants = active_tenants.len() as i64;

        if stats.active_contracts > 0 {
            stats.average_rent = stats.monthly_revenue / stats.active_contracts as f64;
        }
        stats.total_revenue = stats.monthly_revenue * 12.0;
        if stats.total_properties > 0 {
            stats.occupancy_rate = stats.occupied_properties as f64 / stats.total_properties as f64 * 100.0;
        }
        if !self.versions.is_empty() {
            let days: i64 = self
                .versions
                .iter()
                .map(|v| (v.end_date - v.start_date).num_days())
                .sum();
            stats.average_contract_duration = days / self.versions.len() as i64;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContractType;
    use chrono::TimeZone;

    fn address(kind: AddressType) -> Address {
        Address {
            id: Uuid::new_v4(),
            address_type: kind,
            street: "Main".to_string(),
            number: "1".to_string(),
            neighborhood: "Centro".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            country: "US".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn user(kind: UserType, address_id: Uuid) -> User {
        User {
            id: Uuid::new_v4(),
            user_type: kind,
            address_id,
            first_name: "Ana".to_string(),
            middle_name: None,
            last_name: "Diaz".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555".to_string(),
            created_at: Utc::now(),
            updated_at: None,
            address: None,
        }
    }

    fn version_input(contract_id: Uuid, status: ContractStatus, rent: f64) -> CreateContractVersion {
        CreateContractVersion {
            contract_id,
            deposit: 500.0,
            rent,
            rent_increase_percentage: 5.0,
            business: "Bakery".to_string(),
            status,
            contract_type: ContractType::Yearly,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap(),
            renewal_date: None,
            special_terms: None,
        }
    }

    fn seeded() -> (Store, Uuid) {
        let mut store = Store::default();
        let property = address(AddressType::Property);
        let tenant = user(UserType::Tenant, property.id);
        let landlord = user(UserType::Admin, property.id);
        let contract = ContractRecord {
            id: Uuid::new_v4(),
            current_version_id: None,
            landlord_id: landlord.id,
            tenant_id: tenant.id,
            address_id: property.id,
            deposit: 500.0,
            reference_ids: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let id = contract.id;
        store.addresses.push(property);
        store.addresses.push(address(AddressType::Property));
        store.users.push(tenant);
        store.users.push(landlord);
        store.contracts.push(contract);
        (store, id)
    }

    #[test]
    fn versions_are_numbered_and_current_moves() {
        let (mut store, id) = seeded();
        let v1 = store
            .append_version(version_input(id, ContractStatus::Active, 1000.0))
            .unwrap();
        let v2 = store
            .append_version(version_input(id, ContractStatus::Active, 1100.0))
            .unwrap();
        assert_eq!((v1.version_number, v2.version_number), (1, 2));
        assert_eq!(store.contract(id).unwrap().current_version_id, Some(v2.id));

        let history: Vec<u32> = store.versions_of(id).iter().map(|v| v.version_number).collect();
        assert_eq!(history, vec![2, 1]);
    }

    #[test]
    fn append_to_unknown_contract_fails() {
        let (mut store, _) = seeded();
        assert!(store
            .append_version(version_input(Uuid::new_v4(), ContractStatus::Active, 1.0))
            .is_none());
    }

    #[test]
    fn statistics_follow_current_versions() {
        let (mut store, id) = seeded();
        store.append_version(version_input(id, ContractStatus::Expired, 900.0));
        store.append_version(version_input(id, ContractStatus::Active, 1200.0));

        let stats = store.statistics();
        assert_eq!(stats.total_contracts, 1);
        assert_eq!(stats.active_contracts, 1);
        assert_eq!(stats.expired_contracts, 0);
        assert_eq!(stats.total_properties, 2);
        assert_eq!(stats.occupied_properties, 1);
        assert_eq!(stats.vacant_properties, 1);
        assert_eq!(stats.total_tenants, 1);
        assert_eq!(stats.active_tenants, 1);
        assert_eq!(stats.monthly_revenue, 1200.0);
        assert_eq!(stats.average_rent, 1200.0);
        assert_eq!(stats.total_revenue, 14400.0);
        assert_eq!(stats.occupancy_rate, 50.0);
        assert_eq!(stats.average_contract_duration, 365);
    }

    #[test]
    fn removing_a_contract_drops_its_versions() {
        let (mut store, id) = seeded();
        store.append_version(version_input(id, ContractStatus::Active, 1.0));
        assert!(store.remove_contract(id));
        assert!(store.versions.is_empty());
        assert!(!store.remove_contract(id));
    }
}
