//! Back-office operations against the mock store: dashboard totals, product
//! and category management.
//!
//! Run with: cargo test -p tienda-integration-tests --test admin_operations

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use tienda_admin::{
    AdminConsole, AdminError, CategoryForm, DashboardStats, FormError, ImageUpload, ProductForm,
};
use tienda_core::{CategoryId, ProductId, Visibility};
use tienda_integration_tests::{ADMIN_EMAIL, MockStore, SEEDED_IMAGE, admin_password};
use tienda_storefront::navigation::AdminSection;
use tienda_storefront::session::MemoryStorage;
use tienda_storefront::{ApiError, Route, Shop};

async fn store() -> MockStore {
    MockStore::start().await.expect("mock store failed to start")
}

async fn logged_in(store: &MockStore) -> Shop<MemoryStorage> {
    let mut shop = store.shop();
    shop.login(ADMIN_EMAIL, &admin_password()).await.unwrap();
    shop
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_totals() {
    let store = store().await;
    let mut shop = logged_in(&store).await;

    let stats = AdminConsole::open(&mut shop)
        .unwrap()
        .dashboard()
        .await
        .unwrap();
    assert_eq!(
        stats,
        DashboardStats {
            total_products: 10,
            total_categories: 2,
            total_pages: 2,
            active_products: 9,
        }
    );
    assert_eq!(shop.route(), &Route::Admin(AdminSection::Dashboard));
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_create_product_with_image() {
    let store = store().await;
    let mut shop = logged_in(&store).await;

    let mut form = ProductForm::for_new();
    form.name = "Mochila".to_string();
    form.short_description = "Resistente al agua".to_string();
    form.price = "45.00".to_string();
    form.categories = vec![CategoryId::new(1), CategoryId::new(2)];
    form.image = Some(ImageUpload {
        filename: "mochila.png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    });

    let products = {
        let mut console = AdminConsole::open(&mut shop).unwrap();
        console.save_product(&form).await.unwrap();
        console.products().await.unwrap()
    };

    let sent = store.last_form().await.expect("multipart body");
    assert_eq!(sent.values("nombre"), ["Mochila"]);
    assert_eq!(sent.values("precio"), ["45.00"]);
    assert_eq!(sent.values("activo"), ["1"]);
    assert_eq!(sent.values("categorias"), ["1", "2"]);
    assert!(sent.values("imagen_actual").is_empty());
    assert_eq!(
        sent.files,
        [("imagen".to_string(), "mochila.png".to_string(), 4)]
    );

    let created = products.last().unwrap();
    assert_eq!(created.name, "Mochila");
    assert_eq!(created.categories, ["Ropa", "Hogar"]);

    // The stored image is served back under /uploads.
    let image = created.image.clone().expect("image filename");
    assert!(image.ends_with("-mochila.png"));
    let bytes = shop.api().fetch_asset(&image).await.unwrap();
    assert_eq!(bytes, [0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_update_product_keeps_image_and_resets_categories() {
    let store = store().await;
    let mut shop = logged_in(&store).await;
    let id = ProductId::new(1);

    let updated = {
        let mut console = AdminConsole::open(&mut shop).unwrap();
        let mut form = ProductForm::for_edit(&console.product(id).await.unwrap());
        form.price = "17.50".to_string();
        form.visibility = Visibility::Hidden;
        console.save_product(&form).await.unwrap();
        console.product(id).await.unwrap()
    };

    let sent = store.last_form().await.unwrap();
    assert_eq!(sent.values("nombre"), ["Camiseta"]);
    assert_eq!(sent.values("imagen_actual"), [SEEDED_IMAGE]);
    assert_eq!(sent.values("activo"), ["0"]);
    assert!(sent.values("categorias").is_empty());
    assert!(sent.files.is_empty());

    assert_eq!(updated.summary.image.as_deref(), Some(SEEDED_IMAGE));
    assert_eq!(updated.summary.price.to_string(), "$17.50");
    assert_eq!(updated.summary.visibility, Visibility::Hidden);
    assert!(updated.summary.categories.is_empty());
    assert_eq!(store.product_category_ids(1).await, Some(Vec::new()));

    let requests = store.requests().await;
    assert!(
        requests
            .iter()
            .any(|r| r.method == Method::PUT && r.path == "/api/productos/1")
    );
}

#[tokio::test]
async fn test_delete_product() {
    let store = store().await;
    let mut shop = logged_in(&store).await;

    let (remaining, missing) = {
        let mut console = AdminConsole::open(&mut shop).unwrap();
        console.delete_product(ProductId::new(3)).await.unwrap();
        let remaining = console.products().await.unwrap();
        let missing = console.delete_product(ProductId::new(3)).await.unwrap_err();
        (remaining, missing)
    };

    assert_eq!(remaining.len(), 9);
    assert!(remaining.iter().all(|p| p.id != ProductId::new(3)));
    assert!(matches!(
        missing,
        AdminError::Api(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn test_invalid_product_form_sends_nothing() {
    let store = store().await;
    let mut shop = logged_in(&store).await;
    let before = store.requests().await.len();

    let mut form = ProductForm::for_new();
    form.name = "Sin precio".to_string();
    form.price = "abc".to_string();

    let err = AdminConsole::open(&mut shop)
        .unwrap()
        .save_product(&form)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AdminError::Form(FormError::InvalidPrice(ref p)) if p == "abc"
    ));
    assert_eq!(store.requests().await.len(), before);
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_category_lifecycle() {
    let store = store().await;
    let mut shop = logged_in(&store).await;

    let mut console = AdminConsole::open(&mut shop).unwrap();

    let mut form = CategoryForm::for_new();
    form.set_name("Hogar y Cocina");
    assert_eq!(form.slug(), "hogar-y-cocina");
    console.save_category(&form).await.unwrap();

    let categories = console.categories().await.unwrap();
    let created = categories
        .iter()
        .find(|c| c.slug == "hogar-y-cocina")
        .expect("created category");
    assert_eq!(created.name, "Hogar y Cocina");

    let mut form = CategoryForm::for_edit(created);
    form.set_name("Cocina");
    assert_eq!(form.slug(), "hogar-y-cocina");
    console.save_category(&form).await.unwrap();

    let renamed = console.category(created.id).await.unwrap();
    assert_eq!(renamed.name, "Cocina");
    assert_eq!(renamed.slug, "hogar-y-cocina");

    console.delete_category(created.id).await.unwrap();
    assert_eq!(console.categories().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_slug_is_reported() {
    let store = store().await;
    let mut shop = logged_in(&store).await;

    let mut form = CategoryForm::for_new();
    form.set_name("Ropa");
    let err = AdminConsole::open(&mut shop)
        .unwrap()
        .save_category(&form)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AdminError::Api(ApiError::Status { status, ref message })
            if status == StatusCode::BAD_REQUEST && message == "El slug ya existe"
    ));
    assert!(shop.session().is_active());
}

#[tokio::test]
async fn test_blank_category_sends_nothing() {
    let store = store().await;
    let mut shop = logged_in(&store).await;
    let before = store.requests().await.len();

    let err = AdminConsole::open(&mut shop)
        .unwrap()
        .save_category(&CategoryForm::for_new())
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Form(FormError::MissingName)));
    assert_eq!(store.requests().await.len(), before);
}
