mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use stockroom_api::{
    errors::ServiceError,
    services::{
        products::CreateProductInput,
        suppliers::{CreateSupplierInput, SupplierFilter, UpdateSupplierInput},
        PageParams,
    },
};

fn acme() -> CreateSupplierInput {
    CreateSupplierInput {
        name: "Acme Foods".to_string(),
        contact_person: Some("Jane Smith".to_string()),
        phone: Some("+66-2-123-4567".to_string()),
        email: Some("sales@acme.example".to_string()),
        address: Some("123 Supplier Rd".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_supplier_round_trips_contact_fields() {
    let app = TestApp::new().await;

    let supplier = app.services().suppliers.create(acme()).await.unwrap();

    assert_eq!(supplier.name, "Acme Foods");
    assert_eq!(supplier.contact_person.as_deref(), Some("Jane Smith"));
    assert_eq!(supplier.product_count, 0);
    assert!(supplier.is_active);
}

#[tokio::test]
async fn duplicate_supplier_name_conflicts() {
    let app = TestApp::new().await;
    let suppliers = &app.services().suppliers;

    suppliers.create(acme()).await.unwrap();

    let err = suppliers.create(acme()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.to_string(), "Supplier name already exists");
}

#[tokio::test]
async fn renaming_supplier_to_its_own_name_is_allowed() {
    let app = TestApp::new().await;
    let suppliers = &app.services().suppliers;

    let created = suppliers.create(acme()).await.unwrap();
    let updated = suppliers
        .update(
            created.id,
            UpdateSupplierInput {
                name: Some("Acme Foods".to_string()),
                phone: Some("+66-2-765-4321".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("no-op rename should succeed");

    assert_eq!(updated.phone.as_deref(), Some("+66-2-765-4321"));
}

#[tokio::test]
async fn detail_view_embeds_recent_products_and_count() {
    let app = TestApp::new().await;

    let supplier = app.services().suppliers.create(acme()).await.unwrap();

    for i in 0..3 {
        app.services()
            .products
            .create(
                CreateProductInput {
                    name: format!("Widget {}", i),
                    sku: format!("WID-{}", i),
                    price: dec!(4.50),
                    stock: 10,
                    supplier_id: Some(supplier.id),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
    }

    let detail = app.services().suppliers.find_one(supplier.id).await.unwrap();
    assert_eq!(detail.product_count, 3);

    let products = detail.products.expect("detail view should embed products");
    assert_eq!(products.len(), 3);
    assert_eq!(products[0].name, "Widget 2", "newest product first");
}

#[tokio::test]
async fn listing_counts_products_per_supplier() {
    let app = TestApp::new().await;
    let suppliers = &app.services().suppliers;

    let first = suppliers.create(acme()).await.unwrap();
    suppliers
        .create(CreateSupplierInput {
            name: "Beta Goods".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    app.services()
        .products
        .create(
            CreateProductInput {
                name: "Solo".to_string(),
                sku: "SOLO-1".to_string(),
                price: dec!(1.00),
                stock: 1,
                supplier_id: Some(first.id),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    let listing = suppliers
        .find_all(PageParams::default(), SupplierFilter::default())
        .await
        .unwrap();

    assert_eq!(listing.meta.total, 2);
    let by_name = |name: &str| {
        listing
            .data
            .iter()
            .find(|s| s.name == name)
            .expect("supplier missing from listing")
    };
    assert_eq!(by_name("Acme Foods").product_count, 1);
    assert_eq!(by_name("Beta Goods").product_count, 0);
}
