//! Products service.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;

use crate::{
    database::Db,
    domain::products::{
        data::{NewProduct, ProductUpdate},
        errors::ProductsServiceError,
        records::{ProductRecord, ProductUuid},
        repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let products = self.repository.list_products(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        if product.price <= Decimal::ZERO {
            return Err(ProductsServiceError::InvalidData);
        }

        let mut tx = self.db.begin_transaction().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .repository
            .update_product(&mut tx, product, update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.repository.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves all live products, newest first.
    async fn list_products(&self) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid)
    -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new catalog product.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Updates the name, price and visibility of a product.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Soft-deletes a product.
    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::new_product};

    use super::*;

    #[tokio::test]
    async fn create_product_returns_stored_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let new = new_product(dec!(12.50), 4);

        let product = ctx.products.create_product(new.clone()).await?;

        assert_eq!(product.uuid, new.uuid);
        assert_eq!(product.price, dec!(12.50));
        assert_eq!(product.stock_quantity, 4);
        assert!(product.is_active);
        assert!(product.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn create_product_rejects_zero_price() {
        let ctx = TestContext::new().await;

        let result = ctx.products.create_product(new_product(dec!(0), 1)).await;

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_product_duplicate_sku_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let first = ctx.products.create_product(new_product(dec!(1.00), 1)).await?;

        let mut second = new_product(dec!(2.00), 1);
        second.sku = first.sku;

        let result = ctx.products.create_product(second).await;

        assert!(
            matches!(result, Err(ProductsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.products.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_products_returns_created_products() -> TestResult {
        let ctx = TestContext::new().await;

        let a = ctx.products.create_product(new_product(dec!(1.00), 1)).await?;
        let b = ctx.products.create_product(new_product(dec!(2.00), 1)).await?;

        let products = ctx.products.list_products().await?;
        let uuids: Vec<ProductUuid> = products.iter().map(|p| p.uuid).collect();

        assert_eq!(products.len(), 2);
        assert!(uuids.contains(&a.uuid));
        assert!(uuids.contains(&b.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn update_product_changes_price_and_visibility() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(new_product(dec!(5.00), 1)).await?;

        let updated = ctx
            .products
            .update_product(
                product.uuid,
                ProductUpdate {
                    name: "Renamed".to_string(),
                    price: dec!(7.25),
                    is_active: false,
                },
            )
            .await?;

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.price, dec!(7.25));
        assert!(!updated.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn delete_product_hides_product() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(new_product(dec!(5.00), 1)).await?;

        ctx.products.delete_product(product.uuid).await?;

        let result = ctx.products.get_product(product.uuid).await;

        assert!(matches!(result, Err(ProductsServiceError::NotFound)));

        let again = ctx.products.delete_product(product.uuid).await;

        assert!(matches!(again, Err(ProductsServiceError::NotFound)));

        Ok(())
    }
}
