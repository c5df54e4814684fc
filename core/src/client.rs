//! Stateless HTTP request builder and response parser for the rental API.
//!
//! # Design
//! `RentalClient` holds only the API root and carries no mutable state
//! between calls. Each operation has a `build_*` method that produces an
//! `HttpRequest`; responses go through `parse_payload`, which checks the
//! status, decodes JSON and converts the tree back to the UI convention.
//! Typed `parse_*` helpers sit on top of it.
//!
//! Outgoing bodies: model → `Value` → value normalization → wire keys.
//! Incoming bodies: wire JSON → value normalization → UI keys → model.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::case::{keys_to_ui, keys_to_wire};
use crate::config::ClientConfig;
use crate::document::ContractDocument;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::{normalize_incoming, normalize_outgoing};
use crate::types::{
    Address, AddressType, Contract, ContractVersion, CreateAddress, CreateContract, CreateContractVersion,
    CreateUser, OverallStatistics, UpdateAddress, UpdateContract, UpdateUser, User, UserType,
};

/// A decoded success response.
///
/// `Empty` is the explicit "no value" result for 204s, zero-length bodies,
/// non-JSON bodies and JSON that fails to parse. It is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Empty,
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            Payload::Empty => None,
        }
    }

    /// Decode into a single model; `Empty` yields `None`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>, ApiError> {
        match self {
            Payload::Json(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| ApiError::Deserialization(e.to_string())),
            Payload::Empty => Ok(None),
        }
    }

    /// Decode into a list; `Empty` yields an empty list.
    pub fn decode_list<T: DeserializeOwned>(&self) -> Result<Vec<T>, ApiError> {
        Ok(self.decode::<Vec<T>>()?.unwrap_or_default())
    }
}

/// Synchronous, stateless client for the rental API.
#[derive(Debug, Clone)]
pub struct RentalClient {
    api_root: String,
}

impl RentalClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            api_root: config.api_root(),
        }
    }

    // --- addresses -------------------------------------------------------

    pub fn build_list_addresses(&self, filter: Option<AddressType>) -> HttpRequest {
        let path = match filter {
            Some(t) => format!("/addresses?type={}", t.as_str()),
            None => "/addresses".to_string(),
        };
        self.request(HttpMethod::Get, &path)
    }

    pub fn build_get_address(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/addresses/{}", encode(id)))
    }

    pub fn build_create_address(&self, input: &CreateAddress) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/addresses", input)
    }

    pub fn build_update_address(&self, input: &UpdateAddress) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/addresses/{}", encode(&input.id)), input)
    }

    pub fn build_delete_address(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/addresses/{}", encode(id)))
    }

    // --- users -----------------------------------------------------------

    pub fn build_list_users(&self, filter: Option<UserType>) -> HttpRequest {
        let path = match filter {
            Some(t) => format!("/users?type={}", t.as_str()),
            None => "/users".to_string(),
        };
        self.request(HttpMethod::Get, &path)
    }

    pub fn build_get_user(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/users/{}", encode(id)))
    }

    pub fn build_create_user(&self, input: &CreateUser) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/users", input)
    }

    pub fn build_update_user(&self, input: &UpdateUser) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/users/{}", encode(&input.id)), input)
    }

    pub fn build_delete_user(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/users/{}", encode(id)))
    }

    // --- contracts -------------------------------------------------------

    pub fn build_list_contracts(&self, tenant_id: Option<&str>) -> HttpRequest {
        let path = match tenant_id.filter(|id| !id.is_empty()) {
            Some(id) => format!("/contracts?tenantId={}", encode(id)),
            None => "/contracts".to_string(),
        };
        self.request(HttpMethod::Get, &path)
    }

    pub fn build_get_contract(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/contracts/{}", encode(id)))
    }

    pub fn build_create_contract(&self, input: &CreateContract) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/contracts", input)
    }

    pub fn build_update_contract(&self, input: &UpdateContract) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/contracts/{}", encode(&input.id)), input)
    }

    pub fn build_delete_contract(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/contracts/{}", encode(id)))
    }

    pub fn build_create_contract_version(&self, input: &CreateContractVersion) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/contracts/versions", input)
    }

    pub fn build_list_contract_versions(&self, contract_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/contracts/{}/versions", encode(contract_id)))
    }

    pub fn build_get_contract_document(&self, contract_id: &str, version_id: Option<&str>) -> HttpRequest {
        let path = match version_id.filter(|id| !id.is_empty()) {
            Some(v) => format!("/contracts/{}/document?versionId={}", encode(contract_id), encode(v)),
            None => format!("/contracts/{}/document", encode(contract_id)),
        };
        self.request(HttpMethod::Get, &path)
    }

    // --- statistics ------------------------------------------------------

    pub fn build_get_overall_statistics(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/statistics/overall")
    }

    // --- parsing ---------------------------------------------------------

    /// Check the status and decode a JSON response into the UI convention.
    pub fn parse_payload(&self, response: HttpResponse) -> Result<Payload, ApiError> {
        check_status(&response)?;
        if !response.declares_json() || response.is_empty() {
            return Ok(Payload::Empty);
        }
        match serde_json::from_slice::<Value>(&response.body) {
            Ok(Value::Null) => Ok(Payload::Empty),
            Ok(wire) => Ok(Payload::Json(keys_to_ui(normalize_incoming(wire)))),
            Err(e) => {
                warn!(status = response.status, error = %e, "response declared JSON but did not parse");
                Ok(Payload::Empty)
            }
        }
    }

    pub fn parse_one<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<Option<T>, ApiError> {
        self.parse_payload(response)?.decode()
    }

    pub fn parse_list<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<Vec<T>, ApiError> {
        self.parse_payload(response)?.decode_list()
    }

    pub fn parse_addresses(&self, response: HttpResponse) -> Result<Vec<Address>, ApiError> {
        self.parse_list(response)
    }

    pub fn parse_address(&self, response: HttpResponse) -> Result<Option<Address>, ApiError> {
        self.parse_one(response)
    }

    pub fn parse_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        self.parse_list(response)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<Option<User>, ApiError> {
        self.parse_one(response)
    }

    pub fn parse_contracts(&self, response: HttpResponse) -> Result<Vec<Contract>, ApiError> {
        self.parse_list(response)
    }

    pub fn parse_contract(&self, response: HttpResponse) -> Result<Option<Contract>, ApiError> {
        self.parse_one(response)
    }

    pub fn parse_contract_versions(&self, response: HttpResponse) -> Result<Vec<ContractVersion>, ApiError> {
        self.parse_list(response)
    }

    pub fn parse_contract_version(&self, response: HttpResponse) -> Result<Option<ContractVersion>, ApiError> {
        self.parse_one(response)
    }

    pub fn parse_overall_statistics(&self, response: HttpResponse) -> Result<Option<OverallStatistics>, ApiError> {
        self.parse_one(response)
    }

    /// Deletes succeed on any 2xx; the body is ignored.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    /// Binary responses bypass JSON decoding entirely.
    pub fn parse_document(&self, response: HttpResponse) -> Result<ContractDocument, ApiError> {
        check_status(&response)?;
        let content_type = response.header("content-type").map(str::to_string);
        Ok(ContractDocument {
            bytes: response.body,
            content_type,
        })
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.api_root),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(&self, method: HttpMethod, path: &str, input: &T) -> Result<HttpRequest, ApiError> {
        let ui = serde_json::to_value(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let wire = keys_to_wire(normalize_outgoing(ui));
        let body = serde_json::to_string(&wire).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers.push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

/// Map non-2xx responses to `ApiError::Http` carrying the raw body text.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let body = response.text();
    debug!(status = response.status, body = %body, "API error");
    Err(ApiError::Http {
        status: response.status,
        body,
    })
}

/// Percent-encode an id or query value so it stays one path segment or
/// one query parameter. Spaces become `%20`, never `+`.
fn encode(component: &str) -> String {
    url::form_urlencoded::byte_serialize(component.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
