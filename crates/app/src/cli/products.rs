use std::io::Write;

use tabled::builder::Builder;

use crate::domain::products::ProductsRepository;

use super::{table, write_failed};

pub(super) async fn list(
    products: &dyn ProductsRepository,
    out: &mut impl Write,
) -> Result<(), String> {
    let products = products
        .list_products()
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    if products.is_empty() {
        return writeln!(out, "catalog is empty").map_err(write_failed);
    }

    let mut builder = Builder::default();

    builder.push_record(["Product", "Name", "Stock", "Price", "Discount", "You Pay"]);

    for product in &products {
        let effective = product
            .effective_price()
            .map_err(|error| format!("failed to price {}: {error}", product.name()))?;

        builder.push_record([
            product.uuid().to_string(),
            product.name().to_string(),
            product.stock().to_string(),
            product.price().to_string(),
            product.discount().to_string(),
            effective.to_string(),
        ]);
    }

    writeln!(out, "{}", table::render(builder, 2)).map_err(write_failed)
}

#[cfg(test)]
mod tests {
    use eatease::{
        discounts::Discount,
        products::{Product, ProductUuid},
    };
    use rusty_money::{Money, iso::VND};
    use testresult::TestResult;

    use crate::domain::products::MockProductsRepository;

    use super::*;

    #[tokio::test]
    async fn lists_every_product() -> TestResult {
        let mut repository = MockProductsRepository::new();
        let product = Product::new(
            ProductUuid::new(),
            "Com tam",
            Money::from_minor(45_000, VND),
            Discount::new(10)?,
            4,
        )?;
        let uuid = product.uuid();

        repository
            .expect_list_products()
            .times(1)
            .returning(move || Ok(vec![product.clone()]));

        let mut out = Vec::new();
        list(&repository, &mut out).await?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Com tam"));
        assert!(rendered.contains(&uuid.to_string()));
        assert!(rendered.contains("10%"));

        Ok(())
    }

    #[tokio::test]
    async fn empty_catalog_says_so() -> TestResult {
        let mut repository = MockProductsRepository::new();

        repository.expect_list_products().returning(|| Ok(Vec::new()));

        let mut out = Vec::new();
        list(&repository, &mut out).await?;

        assert_eq!(String::from_utf8(out)?, "catalog is empty\n");

        Ok(())
    }
}
