//! Editor state for products and categories.
//!
//! Forms hold what the user typed, as typed. [`ProductForm::validate`] and
//! [`CategoryForm::validate`] run before anything is sent.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tienda_core::{Category, CategoryId, Price, Product, ProductId, Visibility};

use crate::error::FormError;
use crate::slug::slugify;

/// A new image chosen for a product.
#[derive(Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditTarget {
    id: ProductId,
    current_image: Option<String>,
}

/// The product editor.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    /// Price as typed.
    pub price: String,
    pub categories: Vec<CategoryId>,
    pub visibility: Visibility,
    /// A newly chosen image. When editing without one, the existing image is
    /// kept.
    pub image: Option<ImageUpload>,
    editing: Option<EditTarget>,
}

impl ProductForm {
    /// An empty editor for a new, active product.
    #[must_use]
    pub const fn for_new() -> Self {
        Self {
            name: String::new(),
            short_description: String::new(),
            long_description: String::new(),
            price: String::new(),
            categories: Vec::new(),
            visibility: Visibility::Active,
            image: None,
            editing: None,
        }
    }

    /// An editor pre-filled from an existing product.
    ///
    /// The category selection starts empty rather than showing the product's
    /// current categories, so saving without re-selecting them clears them.
    /// The product only carries category names, not ids.
    #[must_use]
    pub fn for_edit(product: &Product) -> Self {
        let summary = &product.summary;
        Self {
            name: summary.name.clone(),
            short_description: summary.short_description.clone().unwrap_or_default(),
            long_description: product.long_description.clone().unwrap_or_default(),
            price: summary.price.amount().normalize().to_string(),
            categories: Vec::new(),
            visibility: summary.visibility,
            image: None,
            editing: Some(EditTarget {
                id: summary.id,
                current_image: summary.image.clone(),
            }),
        }
    }

    /// The product being edited, or `None` for a new one.
    #[must_use]
    pub fn editing_id(&self) -> Option<ProductId> {
        self.editing.as_ref().map(|e| e.id)
    }

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] for a blank name or a price that is not a
    /// non-negative amount.
    pub fn validate(&self) -> Result<Price, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        match self.price.parse::<Price>() {
            Ok(price) if !price.amount().is_sign_negative() => Ok(price),
            _ => Err(FormError::InvalidPrice(self.price.clone())),
        }
    }

    /// Text fields in the order they are sent, categories repeated.
    ///
    /// When editing without a new image, `imagen_actual` carries the current
    /// filename (empty if the product has none).
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("nombre", self.name.clone()),
            ("descripcion_corta", self.short_description.clone()),
            ("descripcion_larga", self.long_description.clone()),
            ("precio", self.price.trim().to_string()),
            ("activo", self.visibility.as_form_value().to_string()),
        ];
        fields.extend(self.categories.iter().map(|id| ("categorias", id.to_string())));

        if self.image.is_none()
            && let Some(target) = &self.editing
        {
            fields.push((
                "imagen_actual",
                target.current_image.clone().unwrap_or_default(),
            ));
        }
        fields
    }

    /// Build the multipart body.
    #[must_use]
    pub fn to_multipart(&self) -> Form {
        let form = self
            .text_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        match &self.image {
            Some(image) => form.part(
                "imagen",
                Part::bytes(image.bytes.clone()).file_name(image.filename.clone()),
            ),
            None => form,
        }
    }
}

impl Default for ProductForm {
    fn default() -> Self {
        Self::for_new()
    }
}

/// JSON body for category create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBody<'a> {
    #[serde(rename = "nombre")]
    pub name: &'a str,
    pub slug: &'a str,
}

/// The category editor.
///
/// While creating, typing a name regenerates the slug. While editing, the
/// slug only changes when set directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForm {
    name: String,
    slug: String,
    editing: Option<CategoryId>,
}

impl CategoryForm {
    #[must_use]
    pub fn for_new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_edit(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            editing: Some(category.id),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        if self.editing.is_none() {
            self.slug = slugify(&self.name);
        }
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.slug = slug.into();
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub const fn editing_id(&self) -> Option<CategoryId> {
        self.editing
    }

    /// # Errors
    ///
    /// Returns [`FormError`] for a blank name or slug.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        if self.slug.trim().is_empty() {
            return Err(FormError::MissingSlug);
        }
        Ok(())
    }

    #[must_use]
    pub fn body(&self) -> CategoryBody<'_> {
        CategoryBody {
            name: &self.name,
            slug: &self.slug,
        }
    }
}
