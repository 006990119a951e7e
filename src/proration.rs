//! Order-level discount proration.
//!
//! Line items carry the pre-discount listed price; coupons and vouchers
//! only show up in the gap between the order's `subtotal` and the sum of
//! nominal line prices. The discount is spread back over the items in
//! proportion to each item's share of the nominal order total. The ratio
//! is computed once from the whole order and reused for every item in it;
//! scaling items one at a time would mis-attribute the savings.

use crate::client::{LineItem, Order};
use crate::models::NominalPriceSource;

/// Upstream monetary integers are fixed-point, scaled by 1e5.
pub const MONEY_SCALE: f64 = 100_000.0;

/// One line item with the order-level discount folded back in. All
/// amounts are in display units.
#[derive(Debug, Clone, PartialEq)]
pub struct ProratedLineItem {
    pub name: String,
    pub quantity: i64,
    pub is_gift: bool,
    pub nominal_unit: f64,
    pub effective_unit: f64,
    pub nominal_line: f64,
    pub effective_line: f64,
    pub saved: f64,
}

pub fn to_display_units(scaled: i64) -> f64 {
    scaled as f64 / MONEY_SCALE
}

/// Every line item of an order in insertion order: cards, then item
/// groups, then items.
pub fn line_items(order: &Order) -> impl Iterator<Item = &LineItem> {
    order
        .info_card
        .iter()
        .flat_map(|card| card.order_list_cards.iter().flatten())
        .flat_map(|card| card.product_info.iter())
        .flat_map(|info| info.item_groups.iter().flatten())
        .flat_map(|group| group.items.iter().flatten())
}

/// Sum of `unit price x quantity` over every item, in display units.
pub fn nominal_order_total(order: &Order, source: NominalPriceSource) -> f64 {
    line_items(order)
        .map(|item| to_display_units(item.nominal_unit_scaled(source)) * item.quantity() as f64)
        .sum()
}

/// Fraction of the nominal value actually charged. 1.0 when the order has
/// no priced items; an all-gift order has nothing to prorate.
///
/// A zero nominal total paired with a non-zero subtotal is inconsistent
/// upstream data; the ratio stays at 1.0 and that order's savings are
/// under-reported.
pub fn proration_ratio(subtotal: f64, nominal_total: f64) -> f64 {
    if nominal_total > 0.0 {
        subtotal / nominal_total
    } else {
        1.0
    }
}

/// Expand an order into prorated line items, in traversal order.
pub fn prorate_items(order: &Order, source: NominalPriceSource) -> Vec<ProratedLineItem> {
    let subtotal = to_display_units(order.subtotal_scaled());
    let ratio = proration_ratio(subtotal, nominal_order_total(order, source));

    line_items(order)
        .map(|item| {
            let nominal_unit = to_display_units(item.nominal_unit_scaled(source));
            let quantity = item.quantity();
            let effective_unit = nominal_unit * ratio;
            let nominal_line = nominal_unit * quantity as f64;
            let effective_line = effective_unit * quantity as f64;
            ProratedLineItem {
                name: item.display_name(),
                quantity,
                is_gift: nominal_unit == 0.0,
                nominal_unit,
                effective_unit,
                nominal_line,
                effective_line,
                saved: nominal_line - effective_line,
            }
        })
        .collect()
}
