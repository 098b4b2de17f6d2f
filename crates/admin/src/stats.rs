//! Dashboard totals.

use serde::Serialize;
use tienda_core::{Category, Page, ProductSummary};

/// Numbers shown on the back-office dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_categories: usize,
    pub total_pages: usize,
    pub active_products: usize,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(products: &[ProductSummary], categories: &[Category], pages: &[Page]) -> Self {
        Self {
            total_products: products.len(),
            total_categories: categories.len(),
            total_pages: pages.len(),
            active_products: products
                .iter()
                .filter(|p| p.visibility.is_active())
                .count(),
        }
    }
}
