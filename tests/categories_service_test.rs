mod common;

use common::TestApp;
use stockroom_api::{
    errors::ServiceError,
    services::{
        categories::{CategoryFilter, CreateCategoryInput, UpdateCategoryInput},
        PageParams,
    },
};
use uuid::Uuid;

fn beverages() -> CreateCategoryInput {
    CreateCategoryInput {
        name: "Beverages".to_string(),
        description: Some("Drinks of all kinds".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_category_starts_with_zero_products() {
    let app = TestApp::new().await;

    let category = app
        .services()
        .categories
        .create(beverages())
        .await
        .expect("failed to create category");

    assert_eq!(category.name, "Beverages");
    assert_eq!(category.product_count, 0);
    assert!(category.is_active);
    assert!(category.products.is_none());
}

#[tokio::test]
async fn duplicate_category_name_conflicts() {
    let app = TestApp::new().await;
    let categories = &app.services().categories;

    categories.create(beverages()).await.unwrap();

    let err = categories.create(beverages()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.to_string(), "Category name already exists");

    // Exactly one survived
    let listing = categories
        .find_all(PageParams::default(), CategoryFilter::default())
        .await
        .unwrap();
    assert_eq!(listing.meta.total, 1);
}

#[tokio::test]
async fn renaming_category_to_its_own_name_is_allowed() {
    let app = TestApp::new().await;
    let categories = &app.services().categories;

    let created = categories.create(beverages()).await.unwrap();

    // No-op rename must not trip the uniqueness check
    let updated = categories
        .update(
            created.id,
            UpdateCategoryInput {
                name: Some("Beverages".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("no-op rename should succeed");

    assert_eq!(updated.name, "Beverages");
}

#[tokio::test]
async fn renaming_category_to_taken_name_conflicts() {
    let app = TestApp::new().await;
    let categories = &app.services().categories;

    categories.create(beverages()).await.unwrap();
    let snacks = categories
        .create(CreateCategoryInput {
            name: "Snacks".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let err = categories
        .update(
            snacks.id,
            UpdateCategoryInput {
                name: Some("Beverages".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn missing_category_is_not_found_for_every_operation() {
    let app = TestApp::new().await;
    let categories = &app.services().categories;
    let missing = Uuid::new_v4();

    let err = categories.find_one(missing).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(err.to_string().contains(&missing.to_string()));

    let err = categories
        .update(missing, UpdateCategoryInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = categories.remove(missing).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn remove_category_confirms_and_deletes() {
    let app = TestApp::new().await;
    let categories = &app.services().categories;

    let created = categories.create(beverages()).await.unwrap();
    let confirmation = categories.remove(created.id).await.unwrap();

    assert_eq!(
        confirmation.message,
        format!("Category with ID {} deleted successfully", created.id)
    );
    assert!(matches!(
        categories.find_one(created.id).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[tokio::test]
async fn listing_is_windowed_and_newest_first() {
    let app = TestApp::new().await;
    let categories = &app.services().categories;

    for name in ["First", "Second", "Third"] {
        categories
            .create(CreateCategoryInput {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let page = categories
        .find_all(PageParams::new(0, 2), CategoryFilter::default())
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.skip, 0);
    assert_eq!(page.meta.take, 2);
    assert_eq!(page.data[0].name, "Third");
    assert_eq!(page.data[1].name, "Second");

    let rest = categories
        .find_all(PageParams::new(2, 2), CategoryFilter::default())
        .await
        .unwrap();
    assert_eq!(rest.data.len(), 1);
    assert_eq!(rest.data[0].name, "First");
}

#[tokio::test]
async fn listing_take_defaults_to_returned_rows() {
    let app = TestApp::new().await;
    let categories = &app.services().categories;

    for name in ["One", "Two"] {
        categories
            .create(CreateCategoryInput {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    // No window supplied at the service level
    let listing = categories
        .find_all(PageParams::default(), CategoryFilter::default())
        .await
        .unwrap();

    assert_eq!(listing.meta.total, 2);
    assert_eq!(listing.meta.skip, 0);
    assert_eq!(listing.meta.take, listing.data.len() as u64);
}

#[tokio::test]
async fn listing_filters_by_is_active() {
    let app = TestApp::new().await;
    let categories = &app.services().categories;

    categories
        .create(CreateCategoryInput {
            name: "Active".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    categories
        .create(CreateCategoryInput {
            name: "Dormant".to_string(),
            is_active: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    let active_only = categories
        .find_all(
            PageParams::default(),
            CategoryFilter {
                is_active: Some(true),
            },
        )
        .await
        .unwrap();

    assert_eq!(active_only.meta.total, 1);
    assert_eq!(active_only.data[0].name, "Active");
}
