//! Local form validation.
//!
//! Each field has a list of `Rule`s; `check` is a pure `(value) -> Result`
//! function so the same rules serve any front end. Form validators collect
//! every failing field instead of stopping at the first one. None of this
//! touches the network.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::expand_date;
use crate::types::{CreateAddress, CreateContract, CreateContractVersion, CreateUser};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern"));

/// A declarative constraint on one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Required,
    Min(f64),
    Max(f64),
    Email,
    /// A plain `YYYY-MM-DD` calendar date.
    Date,
}

/// Field value as entered in a form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(s: &'a str) -> Self {
        FieldValue::Text(s)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(s: &'a String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl<'a, T: Into<FieldValue<'a>>> From<Option<T>> for FieldValue<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Missing, Into::into)
    }
}

/// Check one value against `rules`, returning the first failure.
pub fn check(value: FieldValue<'_>, rules: &[Rule]) -> Result<(), String> {
    for rule in rules {
        match (rule, value) {
            (Rule::Required, FieldValue::Missing) => return Err("is required".to_string()),
            (Rule::Required, FieldValue::Text(s)) if s.trim().is_empty() => return Err("is required".to_string()),
            (Rule::Required, FieldValue::Number(n)) if n.is_nan() => return Err("is required".to_string()),
            (Rule::Min(min), FieldValue::Number(n)) if n < *min => return Err(format!("must be at least {min}")),
            (Rule::Max(max), FieldValue::Number(n)) if n > *max => return Err(format!("must be at most {max}")),
            (Rule::Email, FieldValue::Text(s)) if !s.is_empty() && !EMAIL.is_match(s) => {
                return Err("is not a valid email address".to_string())
            }
            (Rule::Date, FieldValue::Text(s)) if !s.is_empty() && expand_date(s).is_none() => {
                return Err("must be a date in YYYY-MM-DD format".to_string())
            }
            _ => {}
        }
    }
    Ok(())
}

/// Field name → message for every field that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn field<'a>(&mut self, name: &str, value: impl Into<FieldValue<'a>>, rules: &[Rule]) -> &mut Self {
        if let Err(msg) = check(value.into(), rules) {
            self.fields.insert(name.to_string(), msg);
        }
        self
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.fields.iter().map(|(k, v)| format!("{k} {v}")).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate_address(input: &CreateAddress) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors
        .field("street", &input.street, &[Rule::Required])
        .field("number", &input.number, &[Rule::Required])
        .field("neighborhood", &input.neighborhood, &[Rule::Required])
        .field("city", &input.city, &[Rule::Required])
        .field("state", &input.state, &[Rule::Required])
        .field("zipCode", &input.zip_code, &[Rule::Required])
        .field("country", &input.country, &[Rule::Required]);
    errors.finish()
}

/// Rules shared by the tenant and reference forms.
pub fn validate_user(input: &CreateUser) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors
        .field("firstName", &input.first_name, &[Rule::Required])
        .field("lastName", &input.last_name, &[Rule::Required])
        .field("email", &input.email, &[Rule::Required, Rule::Email])
        .field("phone", &input.phone, &[Rule::Required])
        .field("addressId", &input.address_id, &[Rule::Required]);
    errors.finish()
}

pub fn validate_contract(input: &CreateContract) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors
        .field("landlordId", &input.landlord_id, &[Rule::Required])
        .field("tenantId", &input.tenant_id, &[Rule::Required])
        .field("addressId", &input.address_id, &[Rule::Required])
        .field("deposit", input.deposit, &[Rule::Required, Rule::Min(0.0)]);
    errors.finish()
}

pub fn validate_contract_version(input: &CreateContractVersion) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors
        .field("contractId", &input.contract_id, &[Rule::Required])
        .field("rent", input.rent, &[Rule::Required, Rule::Min(0.0)])
        .field("deposit", input.deposit, &[Rule::Required, Rule::Min(0.0)])
        .field(
            "rentIncreasePercentage",
            input.rent_increase_percentage,
            &[Rule::Required, Rule::Min(0.0), Rule::Max(100.0)],
        )
        .field("business", &input.business, &[Rule::Required])
        .field("startDate", &input.start_date, &[Rule::Required, Rule::Date])
        .field("endDate", &input.end_date, &[Rule::Required, Rule::Date])
        .field("renewalDate", input.renewal_date.as_ref(), &[Rule::Date]);
    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContractStatus, ContractType, UserType};

    fn user() -> CreateUser {
        CreateUser {
            user_type: UserType::Tenant,
            address_id: "a1".to_string(),
            first_name: "Ana".to_string(),
            middle_name: None,
            last_name: "Diaz".to_string(),
            email: "ana.diaz@example.com".to_string(),
            phone: "5551234567".to_string(),
        }
    }

    fn version() -> CreateContractVersion {
        CreateContractVersion {
            contract_id: "c1".to_string(),
            deposit: 500.0,
            rent: 1200.0,
            rent_increase_percentage: 5.0,
            business: "Bakery".to_string(),
            status: ContractStatus::Active,
            contract_type: ContractType::Yearly,
            start_date: "2024-01-01".to_string(),
            end_date: "2025-01-01".to_string(),
            renewal_date: None,
            special_terms: None,
        }
    }

    #[test]
    fn single_rules() {
        assert!(check("x".into(), &[Rule::Required]).is_ok());
        assert!(check("  ".into(), &[Rule::Required]).is_err());
        assert!(check(FieldValue::Missing, &[Rule::Required]).is_err());
        assert!(check(FieldValue::Missing, &[Rule::Email, Rule::Date]).is_ok());
        assert!(check(5.0.into(), &[Rule::Min(0.0), Rule::Max(100.0)]).is_ok());
        assert_eq!(check((-1.0).into(), &[Rule::Min(0.0)]), Err("must be at least 0".to_string()));
        assert_eq!(check(101.0.into(), &[Rule::Max(100.0)]), Err("must be at most 100".to_string()));
        assert!(check("A.B@Example.ORG".into(), &[Rule::Email]).is_ok());
        assert!(check("ana@localhost".into(), &[Rule::Email]).is_err());
        assert!(check("2024-13-01".into(), &[Rule::Date]).is_err());
    }

    #[test]
    fn valid_user_passes() {
        assert!(validate_user(&user()).is_ok());
    }

    #[test]
    fn user_errors_are_collected() {
        let mut input = user();
        input.first_name.clear();
        input.email = "not-an-email".to_string();
        input.address_id.clear();
        let errors = validate_user(&input).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("firstName"), Some("is required"));
        assert_eq!(errors.get("email"), Some("is not a valid email address"));
        assert!(errors.get("addressId").is_some());
        assert!(errors.to_string().contains("firstName is required"));
    }

    #[test]
    fn contract_version_bounds() {
        assert!(validate_contract_version(&version()).is_ok());

        let mut input = version();
        input.rent_increase_percentage = 120.0;
        input.rent = -5.0;
        input.start_date = "01/01/2024".to_string();
        input.renewal_date = Some("soon".to_string());
        let errors = validate_contract_version(&input).unwrap_err();
        assert_eq!(errors.get("rentIncreasePercentage"), Some("must be at most 100"));
        assert_eq!(errors.get("rent"), Some("must be at least 0"));
        assert!(errors.get("startDate").is_some());
        assert!(errors.get("renewalDate").is_some());
        assert!(errors.get("endDate").is_none());
    }

    #[test]
    fn contract_requires_parties() {
        let input = CreateContract {
            landlord_id: String::new(),
            tenant_id: "t1".to_string(),
            address_id: String::new(),
            deposit: 0.0,
            reference_ids: Vec::new(),
        };
        let errors = validate_contract(&input).unwrap_err();
        let names: Vec<&str> = errors.fields().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["addressId", "landlordId"]);
    }

    #[test]
    fn address_requires_every_field() {
        let input = CreateAddress {
            address_type: crate::types::AddressType::Property,
            street: "Main".to_string(),
            number: "1".to_string(),
            neighborhood: String::new(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: String::new(),
            country: "US".to_string(),
        };
        let errors = validate_address(&input).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.get("zipCode").is_some());
    }
}
