//! Client core for the rental management API.
//!
//! # Overview
//! Addresses, users (administrators, tenants, references), contracts with
//! their version history, and overall statistics, spoken to over a JSON
//! REST API rooted at `{base_url}/api/v1`.
//!
//! # Design
//! - `RentalClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. It never performs I/O.
//! - The wire uses snake_case keys and RFC 3339 timestamps; models use
//!   camelCase keys and plain `YYYY-MM-DD` dates. `case` and `normalize`
//!   convert at the boundary in both directions.
//! - `Transport` executes requests; `UreqTransport` is the blocking one.
//! - `QueryClient` adds the cache: five-minute freshness, coalescing of
//!   identical in-flight reads, and invalidation driven by mutations.
//! - Form validation runs locally before any create is sent.

pub mod cache;
pub mod case;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod http;
pub mod logging;
pub mod normalize;
pub mod query;
pub mod transport;
pub mod types;
pub mod validation;

pub use cache::{Clock, ManualClock, Mutation, QueryFamily, QueryKey, QueryState, SystemClock};
pub use client::{Payload, RentalClient};
pub use config::ClientConfig;
pub use document::{document_filename, version_document_filename, ContractDocument};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::QueryClient;
pub use transport::{Transport, UreqTransport};
pub use types::{
    format_phone, Address, AddressType, Contract, ContractStatus, ContractType, ContractVersion, CreateAddress, CreateContract,
    CreateContractVersion, CreateUser, OverallStatistics, UpdateAddress, UpdateContract, UpdateUser, User, UserType,
};
pub use validation::ValidationErrors;
