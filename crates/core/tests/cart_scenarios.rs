//! Integration tests for cart mutations and totals

use rusty_money::{Money, iso::VND};
use testresult::TestResult;

use eatease::prelude::*;

fn product(
    name: &str,
    price: i64,
    discount: u8,
) -> Result<Product<'static>, Box<dyn std::error::Error>> {
    Ok(Product::new(
        ProductUuid::new(),
        name,
        Money::from_minor(price, VND),
        Discount::new(discount)?,
        20,
    )?)
}

#[test]
fn discounted_line_total() -> TestResult {
    let bun_cha = product("Bun cha", 100_000, 20)?;
    let mut cart = Cart::new(UserUuid::new());
    let line = cart.add(CartLineUuid::new(), &bun_cha)?.line();

    cart.set_quantity(line, Quantity::new(3)?)?;

    let catalog = ProductCatalog::with_products([bun_cha], VND)?;
    let priced = cart.priced_lines(&catalog)?;
    let first = priced.first().ok_or("no priced line")?;

    assert_eq!(first.unit_price()?, Money::from_minor(80_000, VND));
    assert_eq!(first.total()?, Money::from_minor(240_000, VND));

    Ok(())
}

#[test]
fn two_line_cart_totals() -> TestResult {
    let goi_cuon = product("Goi cuon", 50_000, 0)?;
    let che = product("Che", 30_000, 0)?;
    let mut cart = Cart::new(UserUuid::new());

    let goi_cuon_line = cart.add(CartLineUuid::new(), &goi_cuon)?.line();
    cart.increment(goi_cuon_line)?;
    cart.add(CartLineUuid::new(), &che)?;

    let catalog = ProductCatalog::with_products([goi_cuon, che], VND)?;
    let totals = cart.totals(&catalog, VND)?;

    assert_eq!(totals.total_quantity, 3);
    assert_eq!(totals.total_price, Money::from_minor(130_000, VND));

    Ok(())
}

#[test]
fn decrement_of_single_unit_line_removes_it() -> TestResult {
    let banh_xeo = product("Banh xeo", 45_000, 10)?;
    let mut cart = Cart::new(UserUuid::new());
    let line = cart.add(CartLineUuid::new(), &banh_xeo)?.line();

    let catalog = ProductCatalog::with_products([banh_xeo], VND)?;
    let before = cart.totals(&catalog, VND)?;

    assert!(cart.decrement(line)?.is_none());

    let after = cart.totals(&catalog, VND)?;

    assert!(cart.line(line).is_none());
    assert_eq!(after.total_quantity, before.total_quantity - 1);
    assert_eq!(after, CartTotals::empty(VND));

    Ok(())
}

#[test]
fn reconciled_view_matches_server_after_round_trips() -> TestResult {
    let pho = product("Pho", 60_000, 0)?;
    let cao_lau = product("Cao lau", 55_000, 10)?;
    let catalog = ProductCatalog::with_products([pho.clone(), cao_lau.clone()], VND)?;

    let mut server = Cart::new(UserUuid::new());
    let mut client = Reconciler::from_cart(&server);

    let add_pho = client.add(&pho)?.ok_or("pho add was a no-op")?;
    let add_cao_lau = client.add(&cao_lau)?.ok_or("cao lau add was a no-op")?;
    let bump = client.increment(add_pho.line)?;

    // Responses arrive out of order.
    server.add(add_pho.line, &pho)?;
    server.add(add_cao_lau.line, &cao_lau)?;
    server.increment(add_pho.line)?;

    assert_eq!(
        client.confirm(bump.id, bump.line, server.line(bump.line).cloned()),
        Reconciliation::Applied
    );
    assert_eq!(
        client.confirm(add_pho.id, add_pho.line, server.line(add_pho.line).cloned()),
        Reconciliation::Stale
    );
    assert_eq!(
        client.confirm(
            add_cao_lau.id,
            add_cao_lau.line,
            server.line(add_cao_lau.line).cloned()
        ),
        Reconciliation::Applied
    );

    assert!(client.is_settled());
    assert_eq!(client.totals(&catalog, VND)?, server.totals(&catalog, VND)?);

    Ok(())
}
