use clap::Args;
use storefront_app::domain::products::{
    PgProductsService, PgStockLedger, ProductsService, StockLedger, records::ProductUuid,
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct RestockProductArgs {
    #[arg(long)]
    product_uuid: Uuid,

    /// Units to add
    #[arg(long)]
    quantity: u32,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: RestockProductArgs) -> Result<(), String> {
    if args.quantity == 0 {
        return Err("quantity must be positive".to_string());
    }

    let db = crate::cli::connect(&args.database_url).await?;
    let product = ProductUuid::from_uuid(args.product_uuid);

    PgStockLedger::new(db.clone())
        .increase(product, args.quantity)
        .await
        .map_err(|error| format!("failed to restock product: {error}"))?;

    let product = PgProductsService::new(db)
        .get_product(product)
        .await
        .map_err(|error| format!("failed to load product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("stock_quantity: {}", product.stock_quantity);

    Ok(())
}
