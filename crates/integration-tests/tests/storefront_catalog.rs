//! Public storefront flows: home page, catalog, product detail, content
//! pages, uploaded images and the cart.
//!
//! Run with: cargo test -p tienda-integration-tests --test storefront_catalog

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use tienda_core::{ProductId, QuantitySelector, Visibility};
use tienda_integration_tests::{MockStore, SEEDED_IMAGE, SEEDED_IMAGE_BYTES};
use tienda_storefront::{ApiError, Loadable, Route};

async fn store() -> MockStore {
    MockStore::start().await.expect("mock store failed to start")
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_home_shows_first_eight_products() {
    let store = store().await;
    let mut shop = store.shop();

    shop.visit("/");
    let screen = shop.load_featured().await;
    let featured = screen.state().ready().expect("featured products");

    assert_eq!(featured.len(), 8);
    assert_eq!(featured[0].name, "Camiseta");
    assert_eq!(featured[7].id, ProductId::new(8));
}

#[tokio::test]
async fn test_product_list_decodes_wire_format() {
    let store = store().await;
    let mut shop = store.shop();

    shop.visit("/productos");
    let products = shop
        .load_products()
        .await
        .into_state()
        .into_ready()
        .expect("product list");

    assert_eq!(products.len(), 10);
    let camiseta = &products[0];
    assert_eq!(camiseta.price.to_string(), "$19.99");
    assert_eq!(camiseta.image.as_deref(), Some(SEEDED_IMAGE));
    assert_eq!(camiseta.categories, ["Ropa"]);
    assert!(camiseta.visibility.is_active());

    let taza = &products[1];
    assert_eq!(taza.visibility, Visibility::Hidden);
    assert_eq!(taza.price.to_string(), "$7.50");
    assert!(taza.image.is_none());
}

#[tokio::test]
async fn test_product_detail() {
    let store = store().await;
    let mut shop = store.shop();

    assert_eq!(shop.visit("/producto/1"), &Route::Product(ProductId::new(1)));
    let product = shop
        .load_product(ProductId::new(1))
        .await
        .into_state()
        .into_ready()
        .expect("product detail");

    assert_eq!(product.summary.name, "Camiseta");
    assert_eq!(
        product.long_description.as_deref(),
        Some("Camiseta de algodón orgánico, corte clásico.")
    );
}

#[tokio::test]
async fn test_missing_product_renders_failed() {
    let store = store().await;
    let mut shop = store.shop();

    shop.visit("/producto/999");
    let screen = shop.load_product(ProductId::new(999)).await;
    assert!(matches!(
        screen.state(),
        Loadable::Failed(m) if m.contains("Producto no encontrado")
    ));
}

#[tokio::test]
async fn test_stale_result_is_dropped_after_navigating_away() {
    let store = store().await;
    let mut shop = store.shop();

    shop.visit("/productos");
    let mut screen = tienda_storefront::Screen::loading(shop.navigator());
    let result = shop.api().list_products(None).await;

    shop.visit("/carrito");
    assert!(!shop.complete(&mut screen, result));
    assert!(screen.state().is_loading());
}

#[tokio::test]
async fn test_categories() {
    let store = store().await;
    let mut shop = store.shop();

    let categories = shop
        .load_categories()
        .await
        .into_state()
        .into_ready()
        .unwrap();
    let slugs: Vec<_> = categories.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, ["ropa", "hogar"]);
}

// =============================================================================
// Content pages
// =============================================================================

#[tokio::test]
async fn test_pages_list_and_detail() {
    let store = store().await;
    let mut shop = store.shop();

    let pages = shop.load_pages().await.into_state().into_ready().unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| p.content.is_none()));

    assert_eq!(
        shop.visit("/paginas/sobre-nosotros"),
        &Route::Page("sobre-nosotros".to_string())
    );
    let page = shop
        .load_page("sobre-nosotros")
        .await
        .into_state()
        .into_ready()
        .unwrap();
    assert_eq!(page.title, "Sobre nosotros");
    assert_eq!(page.content.as_deref(), Some("Somos una tienda pequeña."));
}

#[tokio::test]
async fn test_missing_page_renders_failed() {
    let store = store().await;
    let mut shop = store.shop();

    let screen = shop.load_page("no-existe").await;
    assert!(matches!(screen.state(), Loadable::Failed(_)));
}

// =============================================================================
// Assets
// =============================================================================

#[tokio::test]
async fn test_fetch_uploaded_image() {
    let store = store().await;
    let shop = store.shop();

    let url = shop.api().asset_url(SEEDED_IMAGE).unwrap();
    assert!(url.as_str().ends_with("/uploads/1-camiseta.jpg"));

    let bytes = shop.api().fetch_asset(SEEDED_IMAGE).await.unwrap();
    assert_eq!(bytes, SEEDED_IMAGE_BYTES);
}

#[tokio::test]
async fn test_fetch_missing_image_is_404() {
    let store = store().await;
    let shop = store.shop();

    let err = shop.api().fetch_asset("nada.png").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Status { status, .. } if status == StatusCode::NOT_FOUND
    ));
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_from_catalog() {
    let store = store().await;
    let mut shop = store.shop();

    let products = shop
        .load_products()
        .await
        .into_state()
        .into_ready()
        .unwrap();
    let camiseta = &products[0];
    let taza = &products[1];

    let mut quantity = QuantitySelector::new();
    assert!(quantity.set(3));
    assert!(!quantity.set(100));

    let cart = shop.cart_mut();
    cart.add_item_times(
        camiseta.id,
        &camiseta.name,
        camiseta.price,
        camiseta.image.as_deref(),
        quantity.get(),
    );
    cart.add_product(taza);
    cart.add_product(taza);

    assert_eq!(shop.cart().total_items(), 5);
    assert_eq!(shop.cart().len(), 2);
    // 3 x 19.99 + 2 x 7.50
    assert_eq!(shop.cart().total_price().to_string(), "$74.97");

    shop.cart_mut().update_quantity(taza.id, 0);
    assert_eq!(shop.cart().len(), 1);
    assert_eq!(shop.cart().total_price().to_string(), "$59.97");
}
