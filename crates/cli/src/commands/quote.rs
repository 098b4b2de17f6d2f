//! `quote`: build a cart from product ids and print its totals.

use tienda_core::{ProductId, QuantitySelector};

use super::{CliShop, CommandError, output};

/// Fetch each product and add it to the cart the way the product page does.
///
/// # Errors
///
/// Returns [`CommandError`] for a malformed item or a product that cannot be
/// fetched.
pub async fn quote(shop: &mut CliShop, items: &[String]) -> Result<(), CommandError> {
    let items = items
        .iter()
        .map(|item| parse_item(item))
        .collect::<Result<Vec<_>, _>>()?;

    for (id, quantity) in items {
        let result = shop.api().get_product(id, shop.credential()).await;
        let product = shop.settle(result)?;
        let p = &product.summary;
        shop.cart_mut().add_item_times(
            p.id,
            &p.name,
            p.price,
            p.image.as_deref(),
            quantity.get(),
        );
    }

    output::cart(shop.cart());
    Ok(())
}

/// Parse `ID` or `IDxQTY`. The quantity follows the product page's bounds.
fn parse_item(item: &str) -> Result<(ProductId, QuantitySelector), CommandError> {
    let invalid = || CommandError::InvalidArgument(format!("{item:?}: expected ID or IDxQTY"));

    let (id, quantity) = match item.split_once(['x', 'X']) {
        Some((id, quantity)) => (id, Some(quantity)),
        None => (item, None),
    };

    let id: ProductId = id.parse().map_err(|_| invalid())?;
    let mut selector = QuantitySelector::new();
    if let Some(quantity) = quantity {
        let quantity: i64 = quantity.trim().parse().map_err(|_| invalid())?;
        if !selector.set(quantity) {
            return Err(CommandError::InvalidArgument(format!(
                "{item:?}: quantity must be between {} and {}",
                QuantitySelector::MIN,
                QuantitySelector::MAX
            )));
        }
    }
    Ok((id, selector))
}
