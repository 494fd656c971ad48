//! Cart Models

use eatease::{
    cart::{CartLineItem, CartLineUuid, UserUuid},
    discounts::Discount,
    pricing::CartTotals,
    products::ProductUuid,
};
use rusty_money::{Money, iso::Currency};

/// New Cart Item Model
///
/// The line UUID is chosen by the caller so that optimistic client state
/// and the stored line share one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCartItem {
    pub uuid: CartLineUuid,
    pub product_uuid: ProductUuid,
}

/// Cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummaryLine {
    pub line: CartLineItem,
    pub name: String,
    pub base_price: Money<'static, Currency>,
    pub discount: Discount,
    pub unit_price: Money<'static, Currency>,
    pub total: Money<'static, Currency>,
}

/// Priced cart, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    pub owner: UserUuid,
    pub lines: Vec<CartSummaryLine>,
    pub totals: CartTotals<'static>,
}
