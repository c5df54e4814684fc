//! Domain records and request payloads for the rental API.
//!
//! # Design
//! All types use the UI convention (camelCase) through serde. The wire
//! convention never appears here: `RentalClient` translates keys and
//! normalizes values on the `serde_json::Value` tree before these types see
//! the data. Dates are kept as plain `YYYY-MM-DD` strings and ids as opaque
//! strings, mirroring what the UI works with.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    Tenant,
    Reference,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::Tenant => "tenant",
            UserType::Reference => "reference",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Tenant,
    Property,
    Reference,
}

impl AddressType {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressType::Tenant => "tenant",
            AddressType::Property => "property",
            AddressType::Reference => "reference",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    Expired,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Yearly,
}

/// A postal location. The type tag only drives list filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// An administrator, tenant or reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub address_id: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl User {
    /// "First [Middle] Last", as shown in selection lists and file names.
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().filter(|m| !m.is_empty()) {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    pub fn display_phone(&self) -> String {
        format_phone(&self.phone)
    }
}

/// Format a phone number for display.
///
/// Ten digits, or eleven with a leading `1`, read as a US number:
/// `+1 (555) 123 4567`. Longer numbers put the extra leading digits in the
/// country code; eight or nine digits use a two-digit code. Anything with
/// seven digits or fewer comes back unchanged.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let d = digits.as_str();
    match d.len() {
        10 => format!("+1 ({}) {} {}", &d[..3], &d[3..6], &d[6..]),
        11 if d.starts_with('1') => format!("+1 ({}) {} {}", &d[1..4], &d[4..7], &d[7..]),
        n if n > 10 => {
            let local = n - 10;
            format!(
                "+{} ({}) {} {}",
                &d[..local],
                &d[local..local + 3],
                &d[local + 3..local + 6],
                &d[local + 6..]
            )
        }
        8 | 9 => format!("+{} ({}) {} {}", &d[..2], &d[2..5], &d[5..8], &d[8..]),
        _ => phone.to_string(),
    }
}

/// An immutable, numbered snapshot of lease terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractVersion {
    pub id: String,
    pub contract_id: String,
    pub version_number: u32,
    #[serde(default)]
    pub deposit: f64,
    pub rent: f64,
    pub rent_increase_percentage: f64,
    pub business: String,
    pub status: ContractStatus,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub renewal_date: Option<String>,
    #[serde(default)]
    pub special_terms: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A rental agreement with its append-only version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    #[serde(default)]
    pub current_version_id: Option<String>,
    #[serde(default)]
    pub landlord_id: Option<String>,
    pub tenant_id: String,
    pub address_id: String,
    #[serde(default)]
    pub deposit: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub current_version: Option<ContractVersion>,
    #[serde(default)]
    pub landlord: Option<User>,
    #[serde(default)]
    pub tenant: Option<User>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub versions: Vec<ContractVersion>,
    #[serde(default)]
    pub references: Vec<User>,
}

impl Contract {
    /// Whether the current-version pointer, when set, names a version of
    /// this contract. Embedded versions are checked when present.
    pub fn current_version_is_consistent(&self) -> bool {
        let Some(current_id) = self.current_version_id.as_deref() else {
            return true;
        };
        if let Some(current) = &self.current_version {
            if current.id != current_id || current.contract_id != self.id {
                return false;
            }
        }
        if self.versions.is_empty() {
            return true;
        }
        self.versions
            .iter()
            .any(|v| v.id == current_id && v.contract_id == self.id)
    }

    /// Highest version number in the embedded history.
    pub fn latest_version_number(&self) -> Option<u32> {
        self.versions.iter().map(|v| v.version_number).max()
    }
}

/// Server-computed aggregate. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
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
    /// In days.
    pub average_contract_duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
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

/// Partial update. `id` selects the target and is not part of the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddress {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub address_id: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContract {
    pub landlord_id: String,
    pub tenant_id: String,
    pub address_id: String,
    pub deposit: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContract {
    #[serde(skip)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landlord_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_ids: Option<Vec<String>>,
}

/// Appends a new version to a contract and moves its current pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractVersion {
    pub contract_id: String,
    pub deposit: f64,
    pub rent: f64,
    pub rent_increase_percentage: f64,
    pub business: String,
    pub status: ContractStatus,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_terms: Option<String>,
}
