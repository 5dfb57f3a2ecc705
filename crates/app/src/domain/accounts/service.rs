//! Accounts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use uuid::Uuid;

use crate::{
    database::Db,
    domain::accounts::{
        data::{NewAccount, NewAddress},
        errors::AccountsServiceError,
        records::{
            AccountRecord, AccountUuid, AddressRecord, AddressUuid, VerificationTokenRecord,
        },
        repository::PgAccountsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgAccountsService {
    db: Db,
    repository: PgAccountsRepository,
}

impl PgAccountsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAccountsRepository::new(),
        }
    }
}

#[async_trait]
impl AccountsService for PgAccountsService {
    async fn create_account(
        &self,
        account: NewAccount,
    ) -> Result<AccountRecord, AccountsServiceError> {
        let account = normalize_account(account)?;

        let mut tx = self.db.begin_transaction().await?;

        let created = self.repository.create_account(&mut tx, account).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_account(
        &self,
        account: AccountUuid,
    ) -> Result<AccountRecord, AccountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let account = self.repository.get_account(&mut tx, account).await?;

        tx.commit().await?;

        Ok(account)
    }

    async fn list_addresses(
        &self,
        account: AccountUuid,
    ) -> Result<Vec<AddressRecord>, AccountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let addresses = self.repository.list_addresses(&mut tx, account).await?;

        tx.commit().await?;

        Ok(addresses)
    }

    async fn create_address(
        &self,
        account: AccountUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, AccountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        if address.is_default {
            self.repository
                .clear_default_address(&mut tx, account, address.uuid)
                .await?;
        }

        let created = self
            .repository
            .create_address(&mut tx, account, address)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn set_default_address(
        &self,
        account: AccountUuid,
        address: AddressUuid,
    ) -> Result<(), AccountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.repository
            .clear_default_address(&mut tx, account, address)
            .await?;

        let rows_affected = self
            .repository
            .set_default_address(&mut tx, account, address)
            .await?;

        if rows_affected == 0 {
            return Err(AccountsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn delete_address(
        &self,
        account: AccountUuid,
        address: AddressUuid,
    ) -> Result<(), AccountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self
            .repository
            .delete_address(&mut tx, account, address)
            .await?;

        if rows_affected == 0 {
            return Err(AccountsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn issue_verification_token(
        &self,
        account: AccountUuid,
    ) -> Result<VerificationTokenRecord, AccountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let token = self
            .repository
            .create_verification_token(&mut tx, account)
            .await?;

        tx.commit().await?;

        Ok(token)
    }

    async fn verify_email(&self, token: Uuid) -> Result<AccountRecord, AccountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.get_verification_token(&mut tx, token).await?;

        if record.is_used {
            return Err(AccountsServiceError::TokenUsed);
        }

        if record.is_expired(Timestamp::now()) {
            return Err(AccountsServiceError::TokenExpired);
        }

        self.repository.mark_token_used(&mut tx, token).await?;

        let account = self
            .repository
            .mark_account_verified(&mut tx, record.account_uuid)
            .await?;

        tx.commit().await?;

        Ok(account)
    }
}

#[automock]
#[async_trait]
pub trait AccountsService: Send + Sync {
    /// Register a new account. The email is stored lowercased.
    async fn create_account(
        &self,
        account: NewAccount,
    ) -> Result<AccountRecord, AccountsServiceError>;

    async fn get_account(&self, account: AccountUuid)
    -> Result<AccountRecord, AccountsServiceError>;

    /// Addresses with the default first, then newest first.
    async fn list_addresses(
        &self,
        account: AccountUuid,
    ) -> Result<Vec<AddressRecord>, AccountsServiceError>;

    /// Store an address; a default address demotes any previous default.
    async fn create_address(
        &self,
        account: AccountUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, AccountsServiceError>;

    /// Make `address` the only default address of `account`.
    async fn set_default_address(
        &self,
        account: AccountUuid,
        address: AddressUuid,
    ) -> Result<(), AccountsServiceError>;

    async fn delete_address(
        &self,
        account: AccountUuid,
        address: AddressUuid,
    ) -> Result<(), AccountsServiceError>;

    /// Create a single-use email verification token valid for 24 hours.
    async fn issue_verification_token(
        &self,
        account: AccountUuid,
    ) -> Result<VerificationTokenRecord, AccountsServiceError>;

    /// Consume a verification token and mark its account verified.
    async fn verify_email(&self, token: Uuid) -> Result<AccountRecord, AccountsServiceError>;
}

fn normalize_account(account: NewAccount) -> Result<NewAccount, AccountsServiceError> {
    let email = account.email.trim().to_lowercase();
    let first_name = account.first_name.trim().to_string();
    let last_name = account.last_name.trim().to_string();
    let phone = account.phone.trim().to_string();

    if email.is_empty() || first_name.is_empty() || last_name.is_empty() {
        return Err(AccountsServiceError::MissingRequiredData);
    }

    if !is_valid_email(&email) || !is_valid_phone(&phone) {
        return Err(AccountsServiceError::InvalidData);
    }

    Ok(NewAccount {
        uuid: account.uuid,
        email,
        first_name,
        last_name,
        phone,
    })
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Empty, or an optional `+` followed by 9 to 15 digits.
fn is_valid_phone(phone: &str) -> bool {
    if phone.is_empty() {
        return true;
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);

    (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
