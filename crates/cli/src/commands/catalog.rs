//! Public catalog browsing.

use tienda_core::ProductId;
use tienda_storefront::Route;

use super::{CliShop, CommandError, output, ready};

/// # Errors
///
/// Returns [`CommandError::Load`] if the products cannot be loaded.
pub async fn list_products(shop: &mut CliShop, featured: bool) -> Result<(), CommandError> {
    let products = if featured {
        shop.visit(&Route::Home.path());
        ready(shop.load_featured().await, "products")?
    } else {
        shop.visit(&Route::Products.path());
        ready(shop.load_products().await, "products")?
    };
    output::products(&products);
    Ok(())
}

/// # Errors
///
/// Returns [`CommandError::Load`] if the product cannot be loaded.
pub async fn show_product(shop: &mut CliShop, id: ProductId) -> Result<(), CommandError> {
    shop.visit(&Route::Product(id).path());
    let product = ready(shop.load_product(id).await, "product")?;
    let image = product
        .summary
        .image
        .as_deref()
        .and_then(|name| shop.api().asset_url(name).ok());
    output::product(&product, image.as_ref());
    Ok(())
}

/// # Errors
///
/// Returns [`CommandError::Load`] if the categories cannot be loaded.
pub async fn list_categories(shop: &mut CliShop) -> Result<(), CommandError> {
    let categories = ready(shop.load_categories().await, "categories")?;
    output::categories(&categories);
    Ok(())
}

/// # Errors
///
/// Returns [`CommandError::Load`] if the pages cannot be loaded.
pub async fn list_pages(shop: &mut CliShop) -> Result<(), CommandError> {
    let pages = ready(shop.load_pages().await, "pages")?;
    output::pages(&pages);
    Ok(())
}

/// # Errors
///
/// Returns [`CommandError::Load`] if the page cannot be loaded.
pub async fn show_page(shop: &mut CliShop, slug: &str) -> Result<(), CommandError> {
    shop.visit(&Route::Page(slug.to_string()).path());
    let page = ready(shop.load_page(slug).await, "page")?;
    output::page(&page);
    Ok(())
}
