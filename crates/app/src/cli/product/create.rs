use clap::Args;
use rust_decimal::Decimal;
use storefront_app::domain::products::{
    PgProductsService, ProductsService, data::NewProduct, records::ProductUuid,
};

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    sku: String,

    /// Unit price, e.g. `12.50`
    #[arg(long)]
    price: Decimal,

    /// Units available for sale
    #[arg(long, default_value_t = 0)]
    stock: u32,

    /// Sell without counting stock
    #[arg(long)]
    untracked: bool,

    #[arg(long)]
    allow_backorder: bool,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateProductArgs) -> Result<(), String> {
    let service = PgProductsService::new(crate::cli::connect(&args.database_url).await?);

    let product = service
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: args.name,
            sku: args.sku,
            price: args.price,
            stock_quantity: args.stock,
            track_stock: !args.untracked,
            allow_backorder: args.allow_backorder,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("sku: {}", product.sku);
    println!("price: {}", product.price);
    println!("stock_quantity: {}", product.stock_quantity);

    Ok(())
}
