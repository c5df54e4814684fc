//! Wire records. Keys are snake_case and timestamps RFC 3339, as the real
//! backend emits them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    Tenant,
    Reference,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Tenant,
    Property,
    Reference,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    Expired,
    Terminated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Yearly,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub address_id: Uuid,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Embedded on single-user reads only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractVersion {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub version_number: u32,
    pub deposit: f64,
    pub rent: f64,
    pub rent_increase_percentage: f64,
    pub business: String,
    pub status: ContractStatus,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_terms: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored contract row. Relations are resolved into `ContractResponse`.
#[derive(Clone, Debug)]
pub struct ContractRecord {
    pub id: Uuid,
    pub current_version_id: Option<Uuid>,
    pub landlord_id: Uuid,
    pub tenant_id: Uuid,
    pub address_id: Uuid,
    pub deposit: f64,
    pub reference_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractResponse {
    pub id: Uuid,
    #[serde(default)]
    pub current_version_id: Option<Uuid>,
    pub landlord_id: Uuid,
    pub tenant_id: Uuid,
    pub address_id: Uuid,
    pub deposit: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<ContractVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landlord: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default)]
    pub versions: Vec<ContractVersion>,
    #[serde(default)]
    pub references: Vec<User>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStatistics {
    pub total_contracts: i64,
    pub active_contracts: i64,
    pub expired_contracts: i64,
    pub total_properties: i64,
    pub occupied_properties: i64,
    pub vacant_properties: i64,
    pub total_tenants: i64,
    pub total_references: i64,
    pub active_tenants: i64,
    pub monthly_revenue: f64,
    pub average_rent: f64,
    pub total_revenue: f64,
    pub occupancy_rate: f64,
    pub average_contract_duration: i64,
}

// --- request bodies ------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateAddress {
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Deserialize)]
pub struct UpdateAddress {
    #[serde(rename = "type")]
    pub address_type: Option<AddressType>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub address_id: Uuid,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    #[serde(rename = "type")]
    pub user_type: Option<UserType>,
    pub address_id: Option<Uuid>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateContract {
    pub landlord_id: Uuid,
    pub tenant_id: Uuid,
    pub address_id: Uuid,
    #[serde(default)]
    pub deposit: f64,
    #[serde(default)]
    pub reference_ids: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateContract {
    pub landlord_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub address_id: Option<Uuid>,
    pub deposit: Option<f64>,
    pub reference_ids: Option<Vec<Uuid>>,
}

#[derive(Deserialize)]
pub struct CreateContractVersion {
    pub contract_id: Uuid,
    #[serde(default)]
    pub deposit: f64,
    pub rent: f64,
    #[serde(default)]
    pub rent_increase_percentage: f64,
    pub business: String,
    pub status: ContractStatus,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub renewal_date: Option<String>,
    #[serde(default)]
    pub special_terms: Option<String>,
}

// --- query strings -------------------------------------------------------

#[derive(Deserialize)]
pub struct AddressFilter {
    #[serde(rename = "type")]
    pub address_type: Option<AddressType>,
}

#[derive(Deserialize)]
pub struct UserFilter {
    #[serde(rename = "type")]
    pub user_type: Option<UserType>,
}

#[derive(Deserialize)]
pub struct ContractFilter {
    #[serde(rename = "tenantId")]
    pub tenant_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct DocumentQuery {
    #[serde(rename = "versionId")]
    pub version_id: Option<Uuid>,
}
