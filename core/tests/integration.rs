//! End-to-end run against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `QueryClient` over
//! real HTTP through `UreqTransport`. Covers the wire conventions (key case,
//! date shapes), caching with invalidation, error propagation and the
//! document download in one lifecycle.

use std::net::SocketAddr;

use rental_core::{
    version_document_filename, AddressType, ApiError, ClientConfig, ContractStatus, ContractType, CreateAddress,
    CreateContract, CreateContractVersion, CreateUser, Payload, QueryClient, QueryFamily, QueryKey, QueryState,
    RentalClient, Transport, UpdateUser, UreqTransport, UserType,
};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn address(kind: AddressType) -> CreateAddress {
    CreateAddress {
        address_type: kind,
        street: "Main".to_string(),
        number: "12".to_string(),
        neighborhood: "Centro".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
        country: "US".to_string(),
    }
}

fn person(kind: UserType, address_id: &str, first: &str) -> CreateUser {
    CreateUser {
        user_type: kind,
        address_id: address_id.to_string(),
        first_name: first.to_string(),
        middle_name: None,
        last_name: "Diaz".to_string(),
        email: format!("{}@example.com", first.to_lowercase()),
        phone: "5551234567".to_string(),
    }
}

fn version(contract_id: &str, rent: f64) -> CreateContractVersion {
    CreateContractVersion {
        contract_id: contract_id.to_string(),
        deposit: 500.0,
        rent,
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
fn rental_lifecycle() {
    let addr = start_server();
    let config = ClientConfig::new(&format!("http://{addr}"));
    let api = QueryClient::new(&config, UreqTransport::new());

    // Empty system.
    assert!(api.addresses().unwrap().is_empty());
    assert!(api.tenants().unwrap().is_empty());

    // Addresses and people.
    let home = api.create_address(&address(AddressType::Tenant)).unwrap().unwrap();
    let property = api.create_address(&address(AddressType::Property)).unwrap().unwrap();
    assert_eq!(api.property_addresses().unwrap(), vec![property.clone()]);
    assert_eq!(api.tenant_addresses().unwrap().len(), 1);

    // A tenant created through the generic form is still forced to the tenant role.
    let ana = api
        .create_tenant(&person(UserType::Admin, &home.id, "Ana"))
        .unwrap()
        .unwrap();
    assert_eq!(ana.user_type, UserType::Tenant);
    let landlord = api
        .create_user(&person(UserType::Admin, &home.id, "Luis"))
        .unwrap()
        .unwrap();
    let reference = api
        .create_reference(&person(UserType::Tenant, &home.id, "Rosa"))
        .unwrap()
        .unwrap();

    // The tenant list was invalidated by the creates and refetches.
    let tenants = api.tenants().unwrap();
    assert_eq!(tenants.len(), 1);
    assert_eq!(tenants[0].first_name, "Ana");
    assert_eq!(tenants[0].address_id, home.id);
    assert_eq!(api.references().unwrap()[0].id, reference.id);
    assert_eq!(api.state(&QueryKey::new(QueryFamily::Tenants)), QueryState::Fresh);

    let fetched = api.tenant(&ana.id).unwrap().unwrap();
    assert_eq!(fetched.address.unwrap().id, home.id);

    // Contract with two versions.
    let contract = api
        .create_contract(&CreateContract {
            landlord_id: landlord.id.clone(),
            tenant_id: ana.id.clone(),
            address_id: property.id.clone(),
            deposit: 500.0,
            reference_ids: vec![reference.id.clone()],
        })
        .unwrap()
        .unwrap();
    assert_eq!(contract.references.len(), 1);
    assert_eq!(api.contracts(Some(ana.id.as_str())).unwrap().len(), 1);
    assert!(api.contracts(Some(landlord.id.as_str())).unwrap().is_empty());

    let v1 = api.create_contract_version(&version(&contract.id, 1000.0)).unwrap().unwrap();
    assert_eq!(v1.version_number, 1);
    assert_eq!(v1.start_date, "2024-01-01");
    assert_eq!(v1.end_date, "2025-01-01");
    let v2 = api.create_contract_version(&version(&contract.id, 1100.0)).unwrap().unwrap();
    assert_eq!(v2.version_number, 2);

    let history = api.contract_versions(&contract.id).unwrap();
    let numbers: Vec<u32> = history.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![2, 1]);

    let full = api.contract(&contract.id).unwrap().unwrap();
    assert_eq!(full.current_version_id.as_deref(), Some(v2.id.as_str()));
    assert!(full.current_version_is_consistent());
    assert_eq!(full.latest_version_number(), Some(2));
    assert_eq!(full.current_version.unwrap().start_date, "2024-01-01");

    // Statistics reflect the active version.
    let stats = api.overall_statistics().unwrap().unwrap();
    assert_eq!(stats.total_contracts, 1);
    assert_eq!(stats.active_contracts, 1);
    assert_eq!(stats.monthly_revenue, 1100.0);
    assert_eq!(stats.total_tenants, 1);
    assert_eq!(stats.total_references, 1);
    assert_eq!(stats.occupancy_rate, 100.0);

    // Document download for a specific version.
    let doc = api.contract_document(&contract.id, Some(v1.id.as_str())).unwrap();
    assert!(doc.bytes.starts_with(b"%PDF"));
    assert_eq!(doc.content_type.as_deref(), Some("application/pdf"));
    let dir = tempfile::tempdir().unwrap();
    let path = doc
        .save(dir.path(), &version_document_filename(&contract.id, v1.version_number))
        .unwrap();
    assert_eq!(std::fs::read(path).unwrap(), doc.bytes);

    // Updates flow through and invalidate the user views.
    let renamed = api
        .update_tenant(&UpdateUser {
            id: ana.id.clone(),
            phone: Some("5550000000".to_string()),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
    assert_eq!(renamed.phone, "5550000000");
    assert_eq!(api.state(&QueryKey::new(QueryFamily::Tenants)), QueryState::Stale);
    assert_eq!(api.tenants().unwrap()[0].phone, "5550000000");

    // Delete, then delete again.
    api.delete_contract(&contract.id).unwrap();
    let err = api.delete_contract(&contract.id).unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("contract not found"));
    assert!(api.contracts(None).unwrap().is_empty());
}

#[test]
fn validation_and_bad_ids_never_hit_the_server() {
    let addr = start_server();
    let api = QueryClient::new(&ClientConfig::new(&format!("http://{addr}")), UreqTransport::new());

    let mut bad = address(AddressType::Property);
    bad.street.clear();
    let err = api.create_address(&bad).unwrap_err();
    match err {
        ApiError::Validation(errors) => assert_eq!(errors.get("street"), Some("is required")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(api.addresses().unwrap().is_empty());
    assert_eq!(api.user("").unwrap(), None);
}

#[test]
fn delete_resolves_to_no_value() {
    let addr = start_server();
    let client = RentalClient::new(&format!("http://{addr}"));
    let transport = UreqTransport::new();

    let created = transport
        .execute(&client.build_create_address(&address(AddressType::Reference)).unwrap())
        .unwrap();
    let created = client.parse_address(created).unwrap().unwrap();

    let response = transport.execute(&client.build_delete_address(&created.id)).unwrap();
    assert_eq!(response.status, 204);
    assert_eq!(client.parse_payload(response).unwrap(), Payload::Empty);
}
