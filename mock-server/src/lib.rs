//! In-memory stand-in for the rental management backend.
//!
//! Serves the `/api/v1` resources the client talks to: addresses, users,
//! contracts with versions and documents, and overall statistics. Errors
//! are plain-text bodies such as `contract not found`.

pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Address, AddressFilter, ContractFilter, ContractRecord, ContractResponse, ContractVersion, CreateAddress,
    CreateContract, CreateContractVersion, CreateUser, DocumentQuery, OverallStatistics, UpdateAddress,
    UpdateContract, UpdateUser, User, UserFilter,
};
use crate::store::Store;

pub type Db = Arc<RwLock<Store>>;

/// A status with a plain-text message body.
#[derive(Debug)]
pub struct AppError(StatusCode, &'static str);

impl AppError {
    fn not_found(what: &'static str) -> Self {
        AppError(StatusCode::NOT_FOUND, what)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

type ApiResult<T> = Result<T, AppError>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/addresses", get(list_addresses).post(create_address))
        .route(
            "/addresses/{id}",
            get(get_address).put(update_address).delete(delete_address),
        )
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/contracts", get(list_contracts).post(create_contract))
        .route("/contracts/versions", post(create_contract_version))
        .route(
            "/contracts/{id}",
            get(get_contract).put(update_contract).delete(delete_contract),
        )
        .route("/contracts/{id}/versions", get(list_contract_versions))
        .route("/contracts/{id}/document", get(get_contract_document))
        .route("/statistics/overall", get(overall_statistics));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<Value> {
    Json(json!({ "healthy": true }))
}

// --- addresses -----------------------------------------------------------

async fn list_addresses(State(db): State<Db>, Query(filter): Query<AddressFilter>) -> Json<Vec<Address>> {
    let store = db.read().await;
    Json(
        store
            .addresses
            .iter()
            .filter(|a| filter.address_type.is_none_or(|t| a.address_type == t))
            .cloned()
            .collect(),
    )
}

async fn create_address(State(db): State<Db>, Json(input): Json<CreateAddress>) -> (StatusCode, Json<Address>) {
    let address = Address {
        id: Uuid::new_v4(),
        address_type: input.address_type,
        street: input.street,
        number: input.number,
        neighborhood: input.neighborhood,
        city: input.city,
        state: input.state,
        zip_code: input.zip_code,
        country: input.country,
        created_at: Utc::now(),
        updated_at: None,
    };
    db.write().await.addresses.push(address.clone());
    info!(id = %address.id, "address created");
    (StatusCode::CREATED, Json(address))
}

async fn get_address(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Address>> {
    let store = db.read().await;
    store
        .address(id)
        .cloned()
        .map(Json)
        .ok_or(AppError::not_found("address not found"))
}

async fn update_address(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAddress>,
) -> ApiResult<Json<Address>> {
    let mut store = db.write().await;
    let address = store
        .addresses
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or(AppError::not_found("address not found"))?;
    if let Some(v) = input.address_type {
        address.address_type = v;
    }
    if let Some(v) = input.street {
        address.street = v;
    }
    if let Some(v) = input.number {
        address.number = v;
    }
    if let Some(v) = input.neighborhood {
        address.neighborhood = v;
    }
    if let Some(v) = input.city {
        address.city = v;
    }
    if let Some(v) = input.state {
        address.state = v;
    }
    if let Some(v) = input.zip_code {
        address.zip_code = v;
    }
    if let Some(v) = input.country {
        address.country = v;
    }
    address.updated_at = Some(Utc::now());
    Ok(Json(address.clone()))
}

async fn delete_address(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let before = store.addresses.len();
    store.addresses.retain(|a| a.id != id);
    if store.addresses.len() == before {
        return Err(AppError::not_found("address not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- users ---------------------------------------------------------------

async fn list_users(State(db): State<Db>, Query(filter): Query<UserFilter>) -> Json<Vec<User>> {
    let store = db.read().await;
    Json(
        store
            .users
            .iter()
            .filter(|u| filter.user_type.is_none_or(|t| u.user_type == t))
            .cloned()
            .collect(),
    )
}

async fn create_user(State(db): State<Db>, Json(input): Json<CreateUser>) -> (StatusCode, Json<User>) {
    let user = User {
        id: Uuid::new_v4(),
        user_type: input.user_type,
        address_id: input.address_id,
        first_name: input.first_name,
        middle_name: input.middle_name,
        last_name: input.last_name,
        email: input.email,
        phone: input.phone,
        created_at: Utc::now(),
        updated_at: None,
        address: None,
    };
    db.write().await.users.push(user.clone());
    info!(id = %user.id, user_type = ?user.user_type, "user created");
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<User>> {
    let store = db.read().await;
    let mut user = store.user(id).cloned().ok_or(AppError::not_found("user not found"))?;
    user.address = store.address(user.address_id).cloned();
    Ok(Json(user))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> ApiResult<Json<User>> {
    let mut store = db.write().await;
    let user = store
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or(AppError::not_found("user not found"))?;
    if let Some(v) = input.user_type {
        user.user_type = v;
    }
    if let Some(v) = input.address_id {
        user.address_id = v;
    }
    if let Some(v) = input.first_name {
        user.first_name = v;
    }
    if input.middle_name.is_some() {
        user.middle_name = input.middle_name;
    }
    if let Some(v) = input.last_name {
        user.last_name = v;
    }
    if let Some(v) = input.email {
        user.email = v;
    }
    if let Some(v) = input.phone {
        user.phone = v;
    }
    user.updated_at = Some(Utc::now());
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let before = store.users.len();
    store.users.retain(|u| u.id != id);
    if store.users.len() == before {
        return Err(AppError::not_found("user not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- contracts -----------------------------------------------------------

async fn list_contracts(State(db): State<Db>, Query(filter): Query<ContractFilter>) -> Json<Vec<ContractResponse>> {
    let store = db.read().await;
    Json(
        store
            .contracts
            .iter()
            .filter(|c| filter.tenant_id.is_none_or(|t| c.tenant_id == t))
            .map(|c| store.contract_response(c, false))
            .collect(),
    )
}

async fn create_contract(
    State(db): State<Db>,
    Json(input): Json<CreateContract>,
) -> (StatusCode, Json<ContractResponse>) {
    let record = ContractRecord {
        id: Uuid::new_v4(),
        current_version_id: None,
        landlord_id: input.landlord_id,
        tenant_id: input.tenant_id,
        address_id: input.address_id,
        deposit: input.deposit,
        reference_ids: input.reference_ids,
        created_at: Utc::now(),
        updated_at: None,
    };
    let mut store = db.write().await;
    store.contracts.push(record.clone());
    info!(id = %record.id, tenant_id = %record.tenant_id, "contract created");
    (StatusCode::CREATED, Json(store.contract_response(&record, true)))
}

async fn get_contract(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<ContractResponse>> {
    let store = db.read().await;
    let record = store.contract(id).ok_or(AppError::not_found("contract not found"))?;
    Ok(Json(store.contract_response(record, true)))
}

async fn update_contract(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateContract>,
) -> ApiResult<Json<ContractResponse>> {
    let mut store = db.write().await;
    let record = store
        .contracts
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(AppError::not_found("contract not found"))?;
    if let Some(v) = input.landlord_id {
        record.landlord_id = v;
    }
    if let Some(v) = input.tenant_id {
        record.tenant_id = v;
    }
    if let Some(v) = input.address_id {
        record.address_id = v;
    }
    if let Some(v) = input.deposit {
        record.deposit = v;
    }
    if let Some(v) = input.reference_ids {
        record.reference_ids = v;
    }
    record.updated_at = Some(Utc::now());
    let record = record.clone();
    Ok(Json(store.contract_response(&record, true)))
}

async fn delete_contract(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !db.write().await.remove_contract(id) {
        return Err(AppError::not_found("contract not found"));
    }
    info!(%id, "contract deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn create_contract_version(
    State(db): State<Db>,
    Json(input): Json<CreateContractVersion>,
) -> ApiResult<(StatusCode, Json<ContractVersion>)> {
    let version = db
        .write()
        .await
        .append_version(input)
        .ok_or(AppError::not_found("contract not found"))?;
    info!(contract_id = %version.contract_id, version = version.version_number, "contract version created");
    Ok((StatusCode::CREATED, Json(version)))
}

async fn list_contract_versions(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Vec<ContractVersion>>> {
    let store = db.read().await;
    store.contract(id).ok_or(AppError::not_found("contract not found"))?;
    Ok(Json(store.versions_of(id)))
}

async fn get_contract_document(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<Response> {
    let store = db.read().await;
    let record = store.contract(id).ok_or(AppError::not_found("contract not found"))?;
    let version_id = query
        .version_id
        .or(record.current_version_id)
        .ok_or(AppError::not_found("contract version not found"))?;
    let version = store
        .version(version_id)
        .filter(|v| v.contract_id == id)
        .ok_or(AppError::not_found("contract version not found"))?;

    let tenant = store
        .user(record.tenant_id)
        .map(|u| format!("{} {}", u.first_name, u.last_name))
        .unwrap_or_default();
    let body = render_document(record, version, &tenant);
    Ok(([(header::CONTENT_TYPE, "application/pdf")], body).into_response())
}

/// Minimal single-page PDF naming the contract, version and tenant.
fn render_document(record: &ContractRecord, version: &ContractVersion, tenant: &str) -> Vec<u8> {
    format!(
        "%PDF-1.4\n% contract {} version {}\n% tenant {}\n% rent {} from {} to {}\n%%EOF\n",
        record.id,
        version.version_number,
        tenant,
        version.rent,
        version.start_date.format("%Y-%m-%d"),
        version.end_date.format("%Y-%m-%d"),
    )
    .into_bytes()
}

// --- statistics ----------------------------------------------------------

async fn overall_statistics(State(db): State<Db>) -> Json<OverallStatistics> {
    Json(db.read().await.statistics())
}
