//! The client-side cart.
//!
//! A cart is an insertion-ordered list of [`CartLine`]s with at most one line
//! per product. It is never persisted: it lives as long as the process that
//! owns it. Quantity bounds shown to shoppers (1..=99) are a UI convention and
//! are enforced by [`QuantitySelector`], not by the cart.

use serde::Serialize;

use crate::catalog::ProductSummary;
use crate::types::{Price, ProductId};

/// One product in the cart with its requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image: Option<String>,
    /// Always at least 1; a line that would drop to 0 is removed instead.
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The cart store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of a product.
    ///
    /// If the product already has a line its quantity goes up by one and the
    /// existing snapshot (name, price, image) is kept; otherwise a new line
    /// with quantity 1 is appended.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Price,
        image: Option<String>,
    ) {
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }
        self.lines.push(CartLine {
            product_id,
            name: name.into(),
            unit_price,
            image,
            quantity: 1,
        });
    }

    /// Add `times` units of a product, one [`Cart::add_item`] at a time.
    ///
    /// This is what the product page's "add to cart" button does with the
    /// selected quantity.
    pub fn add_item_times(
        &mut self,
        product_id: ProductId,
        name: &str,
        unit_price: Price,
        image: Option<&str>,
        times: u32,
    ) {
        for _ in 0..times {
            self.add_item(product_id, name, unit_price, image.map(str::to_owned));
        }
    }

    /// Add one unit of a catalog product, snapshotting its current fields.
    pub fn add_product(&mut self, product: &ProductSummary) {
        self.add_item(
            product.id,
            product.name.as_str(),
            product.price,
            product.image.clone(),
        );
    }

    /// Remove a product's line. No-op if the product is not in the cart.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line. Positive values are stored
    /// as given; there is no upper clamp here. Unknown products are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Exact sum of every line's subtotal.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Lines in the order products were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

/// The quantity picker on the product page and in the cart (1..=99).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantitySelector(u32);

impl QuantitySelector {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 99;

    #[must_use]
    pub const fn new() -> Self {
        Self(Self::MIN)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Set the quantity. Out-of-range values are ignored and `false` is
    /// returned, leaving the previous value in place.
    pub fn set(&mut self, quantity: i64) -> bool {
        match u32::try_from(quantity) {
            Ok(q) if (Self::MIN..=Self::MAX).contains(&q) => {
                self.0 = q;
                true
            }
            _ => false,
        }
    }

    pub fn increment(&mut self) {
        self.0 = (self.0 + 1).min(Self::MAX);
    }

    pub fn decrement(&mut self) {
        self.0 = self.0.saturating_sub(1).max(Self::MIN);
    }
}

impl Default for QuantitySelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp() -> (ProductId, &'static str, Price) {
        (ProductId::new(1), "Lámpara", Price::from_parts(1999, 2))
    }

    fn chair() -> (ProductId, &'static str, Price) {
        (ProductId::new(2), "Silla", Price::from_parts(5005, 3))
    }

    fn add(cart: &mut Cart, (id, name, price): (ProductId, &str, Price)) {
        cart.add_item(id, name, price, None);
    }

    #[test]
    fn test_repeated_add_keeps_one_line_with_call_count() {
        for calls in 1..=25_u32 {
            let mut cart = Cart::new();
            for _ in 0..calls {
                add(&mut cart, lamp());
            }
            assert_eq!(cart.len(), 1);
            assert_eq!(cart.line(lamp().0).map(|l| l.quantity), Some(calls));
        }
    }

    #[test]
    fn test_repeat_add_keeps_first_snapshot() {
        let mut cart = Cart::new();
        let (id, _, _) = lamp();
        cart.add_item(id, "Lámpara", Price::from_parts(1999, 2), Some("a.jpg".into()));
        cart.add_item(id, "Renamed", Price::from_parts(1, 0), None);

        let line = cart.line(id).cloned();
        assert_eq!(line.as_ref().map(|l| l.name.as_str()), Some("Lámpara"));
        assert_eq!(line.as_ref().and_then(|l| l.image.as_deref()), Some("a.jpg"));
        assert_eq!(line.map(|l| l.quantity), Some(2));
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        add(&mut cart, chair());
        add(&mut cart, lamp());
        add(&mut cart, chair());

        let ids: Vec<_> = cart.lines().iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![chair().0, lamp().0]);
    }

    #[test]
    fn test_update_to_zero_matches_remove() {
        let mut updated = Cart::new();
        add(&mut updated, lamp());
        add(&mut updated, chair());
        let mut removed = updated.clone();

        updated.update_quantity(lamp().0, 0);
        removed.remove_item(lamp().0);

        assert_eq!(updated, removed);
        assert!(updated.line(lamp().0).is_none());
    }

    #[test]
    fn test_update_negative_removes() {
        let mut cart = Cart::new();
        add(&mut cart, lamp());
        cart.update_quantity(lamp().0, -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_sets_without_clamping() {
        let mut cart = Cart::new();
        add(&mut cart, lamp());
        cart.update_quantity(lamp().0, 150);
        assert_eq!(cart.line(lamp().0).map(|l| l.quantity), Some(150));
    }

    #[test]
    fn test_update_unknown_product_is_noop() {
        let mut cart = Cart::new();
        add(&mut cart, lamp());
        let before = cart.clone();
        cart.update_quantity(ProductId::new(99), 4);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        add(&mut cart, lamp());
        cart.remove_item(ProductId::new(404));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_total_price_is_exact() {
        let mut cart = Cart::new();
        add(&mut cart, lamp());
        add(&mut cart, lamp());
        add(&mut cart, chair());

        // 19.99 * 2 + 5.005 * 1
        assert_eq!(cart.total_price(), Price::from_parts(44985, 3));
        assert_eq!(cart.total_price().to_string(), "$44.99");
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_total_price_matches_line_sum() {
        let mut cart = Cart::new();
        for (i, cents) in [1, 10, 333, 1999, 100_005].into_iter().enumerate() {
            let id = ProductId::new(i64::try_from(i).unwrap_or_default());
            cart.add_item_times(id, "p", Price::from_parts(cents, 2), None, 3);
        }
        let expected: Price = cart
            .lines()
            .iter()
            .map(|l| Price::new(l.unit_price.amount() * rust_decimal::Decimal::from(l.quantity)))
            .sum();
        assert_eq!(cart.total_price(), expected);
    }

    #[test]
    fn test_clear_resets_totals() {
        let mut cart = Cart::new();
        add(&mut cart, lamp());
        cart.update_quantity(lamp().0, 40);
        add(&mut cart, chair());

        cart.clear();

        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[test]
    fn test_add_item_times() {
        let mut cart = Cart::new();
        let (id, name, price) = lamp();
        cart.add_item_times(id, name, price, Some("l.jpg"), 4);
        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_quantity_selector_bounds() {
        let mut q = QuantitySelector::new();
        assert_eq!(q.get(), 1);
        q.decrement();
        assert_eq!(q.get(), 1);

        assert!(q.set(99));
        q.increment();
        assert_eq!(q.get(), 99);

        assert!(!q.set(100));
        assert!(!q.set(0));
        assert_eq!(q.get(), 99);
    }
}
