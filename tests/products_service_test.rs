mod common;

use bytes::Bytes;
use common::TestApp;
use rust_decimal_macros::dec;
use stockroom_api::{
    errors::ServiceError,
    services::{
        categories::CreateCategoryInput,
        products::{CreateProductInput, ImageUpload, ProductFilter, UpdateProductInput},
        suppliers::CreateSupplierInput,
        PageParams,
    },
    storage::object_path_from_url,
};
use uuid::Uuid;

fn product(sku: &str) -> CreateProductInput {
    CreateProductInput {
        name: format!("Product {}", sku),
        sku: sku.to_string(),
        price: dec!(10.00),
        stock: 5,
        ..Default::default()
    }
}

fn png(name: &str) -> ImageUpload {
    ImageUpload {
        bytes: Bytes::from_static(b"not really a png"),
        filename: format!("{}.png", name),
        content_type: "image/png".to_string(),
    }
}

#[tokio::test]
async fn create_and_round_trip_minimal_product() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    let created = products.create(product("SKU1"), None).await.unwrap();
    let fetched = products.find_one(created.id).await.unwrap();

    assert_eq!(fetched.sku, "SKU1");
    assert_eq!(fetched.price, dec!(10.00));
    assert_eq!(fetched.stock, 5);
    assert!(fetched.is_active);

    // Unset fields come back as None, not defaulted strings
    assert_eq!(fetched.description, None);
    assert_eq!(fetched.barcode, None);
    assert_eq!(fetched.weight, None);
    assert_eq!(fetched.unit, None);
    assert_eq!(fetched.expiry_date, None);
    assert_eq!(fetched.image_url, None);
    assert_eq!(fetched.category_id, None);
    assert_eq!(fetched.supplier_id, None);
    assert!(fetched.category.is_none());
    assert!(fetched.supplier.is_none());
}

#[tokio::test]
async fn create_resolves_category_and_supplier_summaries() {
    let app = TestApp::new().await;

    let category = app
        .services()
        .categories
        .create(CreateCategoryInput {
            name: "Beverages".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let supplier = app
        .services()
        .suppliers
        .create(CreateSupplierInput {
            name: "Acme Foods".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut input = product("SKU2");
    input.category_id = Some(category.id);
    input.supplier_id = Some(supplier.id);

    let created = app.services().products.create(input, None).await.unwrap();

    let cat = created.category.expect("category summary missing");
    assert_eq!(cat.id, category.id);
    assert_eq!(cat.name, "Beverages");

    let sup = created.supplier.expect("supplier summary missing");
    assert_eq!(sup.id, supplier.id);
    assert_eq!(sup.name, "Acme Foods");

    let fetched = app.services().products.find_one(created.id).await.unwrap();
    assert_eq!(fetched.category.unwrap().name, "Beverages");
    assert_eq!(fetched.supplier.unwrap().name, "Acme Foods");
}

#[tokio::test]
async fn duplicate_sku_yields_exactly_one_success() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    products.create(product("DUP"), None).await.unwrap();

    let mut second = product("DUP");
    second.name = "Different name".to_string();
    let err = products.create(second, None).await.unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.to_string(), "Product SKU already exists");

    let listing = products
        .find_all(PageParams::default(), ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(listing.meta.total, 1);
}

#[tokio::test]
async fn duplicate_barcode_conflicts() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    let mut first = product("BC1");
    first.barcode = Some("4011200296908".to_string());
    products.create(first, None).await.unwrap();

    let mut second = product("BC2");
    second.barcode = Some("4011200296908".to_string());
    let err = products.create(second, None).await.unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.to_string(), "Product barcode already exists");
}

#[tokio::test]
async fn update_to_own_sku_is_idempotent_but_taken_sku_conflicts() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    let first = products.create(product("KEEP"), None).await.unwrap();
    products.create(product("TAKEN"), None).await.unwrap();

    // Updating to the SKU the row already holds never conflicts
    let updated = products
        .update(
            first.id,
            UpdateProductInput {
                sku: Some("KEEP".to_string()),
                price: Some(dec!(12.50)),
                ..Default::default()
            },
            None,
        )
        .await
        .expect("update to own SKU should succeed");
    assert_eq!(updated.price, dec!(12.50));

    // Updating to another row's SKU does
    let err = products
        .update(
            first.id,
            UpdateProductInput {
                sku: Some("TAKEN".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn negative_price_and_stock_are_rejected() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    let mut bad_price = product("NEG1");
    bad_price.price = dec!(-1.00);
    assert!(matches!(
        products.create(bad_price, None).await.unwrap_err(),
        ServiceError::ValidationError(_)
    ));

    let mut bad_stock = product("NEG2");
    bad_stock.stock = -3;
    assert!(matches!(
        products.create(bad_stock, None).await.unwrap_err(),
        ServiceError::ValidationError(_)
    ));

    let ok = products.create(product("NEG3"), None).await.unwrap();
    let err = products
        .update(
            ok.id,
            UpdateProductInput {
                stock: Some(-1),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn invalid_expiry_date_is_rejected() {
    let app = TestApp::new().await;

    let mut input = product("EXP1");
    input.expiry_date = Some("soon".to_string());

    let err = app
        .services()
        .products
        .create(input, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let mut input = product("EXP2");
    input.expiry_date = Some("2026-12-31".to_string());
    let created = app.services().products.create(input, None).await.unwrap();
    assert_eq!(
        created.expiry_date.unwrap().to_rfc3339(),
        "2026-12-31T00:00:00+00:00"
    );
}

#[tokio::test]
async fn image_upload_on_create_stores_object_and_url() {
    let app = TestApp::new().await;

    let created = app
        .services()
        .products
        .create(product("IMG1"), Some(png("front")))
        .await
        .unwrap();

    let url = created.image_url.expect("image_url should be set");
    let path = object_path_from_url(&url).expect("URL should contain the object path");

    assert!(path.starts_with("products/IMG1-"));
    assert!(path.ends_with(".png"));
    assert!(app.storage.contains(&path));
    assert_eq!(
        app.storage.content_type_of(&path).as_deref(),
        Some("image/png")
    );
}

#[tokio::test]
async fn replacing_image_deletes_the_old_object() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    let created = products
        .create(product("IMG2"), Some(png("old")))
        .await
        .unwrap();
    let old_path = object_path_from_url(created.image_url.as_ref().unwrap()).unwrap();

    // Paths derive from SKU + upload millisecond; step past the millisecond
    // the create landed on so the replacement cannot collide.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let updated = products
        .update(created.id, UpdateProductInput::default(), Some(png("new")))
        .await
        .unwrap();
    let new_path = object_path_from_url(updated.image_url.as_ref().unwrap()).unwrap();

    assert_ne!(old_path, new_path);
    assert!(!app.storage.contains(&old_path), "old object must be gone");
    assert!(app.storage.contains(&new_path));
    assert_eq!(app.storage.deleted_paths(), vec![old_path]);
}

#[tokio::test]
async fn image_path_follows_sku_change_on_update() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    let created = products
        .create(product("OLD-SKU"), Some(png("first")))
        .await
        .unwrap();

    let updated = products
        .update(
            created.id,
            UpdateProductInput {
                sku: Some("NEW-SKU".to_string()),
                ..Default::default()
            },
            Some(png("second")),
        )
        .await
        .unwrap();

    let path = object_path_from_url(updated.image_url.as_ref().unwrap()).unwrap();
    assert!(path.starts_with("products/NEW-SKU-"));
}

#[tokio::test]
async fn remove_deletes_image_exactly_once_then_row() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    let created = products
        .create(product("IMG3"), Some(png("only")))
        .await
        .unwrap();
    let path = object_path_from_url(created.image_url.as_ref().unwrap()).unwrap();

    let confirmation = products.remove(created.id).await.unwrap();
    assert_eq!(
        confirmation.message,
        format!("Product with ID {} deleted successfully", created.id)
    );

    assert_eq!(app.storage.deleted_paths(), vec![path.clone()]);
    assert!(!app.storage.contains(&path));
    assert!(matches!(
        products.find_one(created.id).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[tokio::test]
async fn remove_still_deletes_row_when_storage_delete_fails() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    let created = products
        .create(product("IMG4"), Some(png("stuck")))
        .await
        .unwrap();
    let path = object_path_from_url(created.image_url.as_ref().unwrap()).unwrap();

    app.storage.set_fail_deletes(true);

    // Cleanup failure is non-fatal: the row still goes away
    products.remove(created.id).await.unwrap();

    assert!(matches!(
        products.find_one(created.id).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
    // The orphaned object is still there
    assert!(app.storage.contains(&path));
}

#[tokio::test]
async fn products_without_images_touch_storage_not_at_all() {
    let app = TestApp::new().await;
    let products = &app.services().products;

    let created = products.create(product("PLAIN"), None).await.unwrap();
    products
        .update(
            created.id,
            UpdateProductInput {
                stock: Some(9),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    products.remove(created.id).await.unwrap();

    assert_eq!(app.storage.object_count(), 0);
    assert!(app.storage.deleted_paths().is_empty());
}

#[tokio::test]
async fn listing_is_windowed_filtered_and_newest_first() {
    let app = TestApp::new().await;

    let category = app
        .services()
        .categories
        .create(CreateCategoryInput {
            name: "Windowed".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let products = &app.services().products;
    for (i, sku) in ["L1", "L2", "L3"].iter().enumerate() {
        let mut input = product(sku);
        // Put the middle product in the category
        if i == 1 {
            input.category_id = Some(category.id);
        }
        products.create(input, None).await.unwrap();
    }

    let page = products
        .find_all(PageParams::new(0, 2), ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.take, 2);
    assert_eq!(page.data[0].sku, "L3");
    assert_eq!(page.data[1].sku, "L2");

    let in_category = products
        .find_by_category(category.id, PageParams::default())
        .await
        .unwrap();
    assert_eq!(in_category.meta.total, 1);
    assert_eq!(in_category.data[0].sku, "L2");
    assert_eq!(
        in_category.data[0].category.as_ref().unwrap().name,
        "Windowed"
    );
}

#[tokio::test]
async fn missing_product_is_not_found_for_every_operation() {
    let app = TestApp::new().await;
    let products = &app.services().products;
    let missing = Uuid::new_v4();

    assert!(matches!(
        products.find_one(missing).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
    assert!(matches!(
        products
            .update(missing, UpdateProductInput::default(), None)
            .await
            .unwrap_err(),
        ServiceError::NotFound(_)
    ));
    assert!(matches!(
        products.remove(missing).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
}
