//! Back-office commands.
//!
//! All of these need a session from `tienda login`. A rejected token ends
//! the session; the user is told to log in again.

use std::path::PathBuf;

use tienda_admin::{AdminConsole, CategoryForm, ImageUpload, ProductForm};
use tienda_core::{CategoryId, ProductId, Visibility};
use tracing::warn;

use super::{CliShop, CommandError, output};

/// Product fields given on the command line. `None` leaves a field as the
/// form has it.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub categories: Vec<CategoryId>,
    pub visibility: Option<Visibility>,
    pub image: Option<PathBuf>,
}

impl ProductChanges {
    async fn apply(self, form: &mut ProductForm) -> Result<(), CommandError> {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(short) = self.short_description {
            form.short_description = short;
        }
        if let Some(long) = self.long_description {
            form.long_description = long;
        }
        if let Some(visibility) = self.visibility {
            form.visibility = visibility;
        }
        form.categories = self.categories;
        if let Some(path) = self.image {
            form.image = Some(read_image(path).await?);
        }
        Ok(())
    }
}

async fn read_image(path: PathBuf) -> Result<ImageUpload, CommandError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CommandError::InvalidArgument(format!("{}: not a file", path.display())))?
        .to_string();
    let bytes = tokio::fs::read(&path).await?;
    Ok(ImageUpload { filename, bytes })
}

/// # Errors
///
/// Returns [`CommandError::Admin`] if not logged in or a list fails to load.
pub async fn stats(shop: &mut CliShop) -> Result<(), CommandError> {
    let stats = AdminConsole::open(shop)?.dashboard().await?;
    output::stats(&stats);
    Ok(())
}

/// # Errors
///
/// Returns [`CommandError`] if the form is invalid, the image cannot be read
/// or the request fails.
pub async fn create_product(shop: &mut CliShop, changes: ProductChanges) -> Result<(), CommandError> {
    let mut console = AdminConsole::open(shop)?;
    let mut form = ProductForm::for_new();
    changes.apply(&mut form).await?;
    console.save_product(&form).await?;
    output::message(&format!("Created product {:?}.", form.name));
    Ok(())
}

/// Update a product, starting from its current values.
///
/// # Errors
///
/// Returns [`CommandError`] if the product cannot be loaded, the form is
/// invalid or the request fails.
pub async fn update_product(
    shop: &mut CliShop,
    id: ProductId,
    changes: ProductChanges,
) -> Result<(), CommandError> {
    let mut console = AdminConsole::open(shop)?;
    let product = console.product(id).await?;
    let mut form = ProductForm::for_edit(&product);

    if changes.categories.is_empty() && !product.summary.categories.is_empty() {
        warn!(
            product_id = %id,
            categories = ?product.summary.categories,
            "no --category given; the product's categories will be cleared"
        );
    }
    changes.apply(&mut form).await?;
    console.save_product(&form).await?;
    output::message(&format!("Updated product {id}."));
    Ok(())
}

/// # Errors
///
/// Returns [`CommandError::Admin`] if the delete fails.
pub async fn delete_product(shop: &mut CliShop, id: ProductId) -> Result<(), CommandError> {
    AdminConsole::open(shop)?.delete_product(id).await?;
    output::message(&format!("Deleted product {id}."));
    Ok(())
}

/// # Errors
///
/// Returns [`CommandError::Admin`] if the form is invalid or the request
/// fails.
pub async fn create_category(
    shop: &mut CliShop,
    name: &str,
    slug: Option<String>,
) -> Result<(), CommandError> {
    let mut form = CategoryForm::for_new();
    form.set_name(name);
    if let Some(slug) = slug {
        form.set_slug(slug);
    }
    AdminConsole::open(shop)?.save_category(&form).await?;
    output::message(&format!("Created category /{}.", form.slug()));
    Ok(())
}

/// # Errors
///
/// Returns [`CommandError::Admin`] if the category cannot be loaded, the
/// form is invalid or the request fails.
pub async fn update_category(
    shop: &mut CliShop,
    id: CategoryId,
    name: Option<String>,
    slug: Option<String>,
) -> Result<(), CommandError> {
    let mut console = AdminConsole::open(shop)?;
    let mut form = CategoryForm::for_edit(&console.category(id).await?);
    if let Some(name) = name {
        form.set_name(name);
    }
    if let Some(slug) = slug {
        form.set_slug(slug);
    }
    console.save_category(&form).await?;
    output::message(&format!("Updated category {id}."));
    Ok(())
}

/// # Errors
///
/// Returns [`CommandError::Admin`] if the delete fails.
pub async fn delete_category(shop: &mut CliShop, id: CategoryId) -> Result<(), CommandError> {
    AdminConsole::open(shop)?.delete_category(id).await?;
    output::message(&format!("Deleted category {id}."));
    Ok(())
}
