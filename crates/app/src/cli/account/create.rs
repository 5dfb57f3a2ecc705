use clap::Args;
use storefront_app::domain::accounts::{
    AccountsService, PgAccountsService, data::NewAccount, records::AccountUuid,
};

#[derive(Debug, Args)]
pub(crate) struct CreateAccountArgs {
    #[arg(long)]
    email: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// Optional phone number, digits with an optional leading `+`
    #[arg(long, default_value = "")]
    phone: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Also issue an email verification token
    #[arg(long)]
    verification_token: bool,
}

pub(crate) async fn run(args: CreateAccountArgs) -> Result<(), String> {
    let service = PgAccountsService::new(crate::cli::connect(&args.database_url).await?);

    let account = service
        .create_account(NewAccount {
            uuid: AccountUuid::new(),
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name,
            phone: args.phone,
        })
        .await
        .map_err(|error| format!("failed to create account: {error}"))?;

    println!("account_uuid: {}", account.uuid);
    println!("email: {}", account.email);
    println!("name: {}", account.full_name());

    if args.verification_token {
        let token = service
            .issue_verification_token(account.uuid)
            .await
            .map_err(|error| format!("failed to issue verification token: {error}"))?;

        println!("verification_token: {}", token.token);
    }

    Ok(())
}
