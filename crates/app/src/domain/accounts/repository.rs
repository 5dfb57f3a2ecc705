//! Accounts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::accounts::{
    data::{NewAccount, NewAddress},
    records::{
        AccountRecord, AccountUuid, AddressKind, AddressRecord, AddressUuid,
        VerificationTokenRecord,
    },
};

const CREATE_ACCOUNT_SQL: &str = include_str!("sql/create_account.sql");
const GET_ACCOUNT_SQL: &str = include_str!("sql/get_account.sql");
const MARK_ACCOUNT_VERIFIED_SQL: &str = include_str!("sql/mark_account_verified.sql");
const LIST_ADDRESSES_SQL: &str = include_str!("sql/list_addresses.sql");
const CREATE_ADDRESS_SQL: &str = include_str!("sql/create_address.sql");
const CLEAR_DEFAULT_ADDRESS_SQL: &str = include_str!("sql/clear_default_address.sql");
const SET_DEFAULT_ADDRESS_SQL: &str = include_str!("sql/set_default_address.sql");
const DELETE_ADDRESS_SQL: &str = include_str!("sql/delete_address.sql");
const CREATE_VERIFICATION_TOKEN_SQL: &str = include_str!("sql/create_verification_token.sql");
const GET_VERIFICATION_TOKEN_SQL: &str = include_str!("sql/get_verification_token.sql");
const MARK_TOKEN_USED_SQL: &str = include_str!("sql/mark_token_used.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAccountsRepository;

impl PgAccountsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_account(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: NewAccount,
    ) -> Result<AccountRecord, sqlx::Error> {
        query_as::<Postgres, AccountRecord>(CREATE_ACCOUNT_SQL)
            .bind(account.uuid.into_uuid())
            .bind(account.email)
            .bind(account.first_name)
            .bind(account.last_name)
            .bind(account.phone)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_account(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<AccountRecord, sqlx::Error> {
        query_as::<Postgres, AccountRecord>(GET_ACCOUNT_SQL)
            .bind(account.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn mark_account_verified(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<AccountRecord, sqlx::Error> {
        query_as::<Postgres, AccountRecord>(MARK_ACCOUNT_VERIFIED_SQL)
            .bind(account.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_addresses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<Vec<AddressRecord>, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(LIST_ADDRESSES_SQL)
            .bind(account.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(CREATE_ADDRESS_SQL)
            .bind(address.uuid.into_uuid())
            .bind(account.into_uuid())
            .bind(address.kind.as_str())
            .bind(address.name)
            .bind(address.street)
            .bind(address.number)
            .bind(address.complement)
            .bind(address.neighborhood)
            .bind(address.city)
            .bind(address.state)
            .bind(address.zip_code)
            .bind(address.is_default)
            .fetch_one(&mut **tx)
            .await
    }

    /// Clear the default flag on every address of `account` except `keep`.
    pub(crate) async fn clear_default_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        keep: AddressUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_DEFAULT_ADDRESS_SQL)
            .bind(account.into_uuid())
            .bind(keep.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_default_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        address: AddressUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_DEFAULT_ADDRESS_SQL)
            .bind(account.into_uuid())
            .bind(address.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
        address: AddressUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ADDRESS_SQL)
            .bind(account.into_uuid())
            .bind(address.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn create_verification_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: AccountUuid,
    ) -> Result<VerificationTokenRecord, sqlx::Error> {
        query_as::<Postgres, VerificationTokenRecord>(CREATE_VERIFICATION_TOKEN_SQL)
            .bind(Uuid::new_v4())
            .bind(account.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch a token and lock it for the rest of the transaction.
    pub(crate) async fn get_verification_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: Uuid,
    ) -> Result<VerificationTokenRecord, sqlx::Error> {
        query_as::<Postgres, VerificationTokenRecord>(GET_VERIFICATION_TOKEN_SQL)
            .bind(token)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn mark_token_used(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: Uuid,
    ) -> Result<(), sqlx::Error> {
        query(MARK_TOKEN_USED_SQL)
            .bind(token)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for AccountRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AccountUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            phone: row.try_get("phone")?,
            is_verified: row.try_get("is_verified")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AddressRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("kind")?;
        let kind = kind
            .parse::<AddressKind>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "kind".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: AddressUuid::from_uuid(row.try_get("uuid")?),
            account_uuid: AccountUuid::from_uuid(row.try_get("account_uuid")?),
            kind,
            name: row.try_get("name")?,
            street: row.try_get("street")?,
            number: row.try_get("number")?,
            complement: row.try_get("complement")?,
            neighborhood: row.try_get("neighborhood")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            zip_code: row.try_get("zip_code")?,
            is_default: row.try_get("is_default")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for VerificationTokenRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            token: row.try_get("token")?,
            account_uuid: AccountUuid::from_uuid(row.try_get("account_uuid")?),
            is_used: row.try_get("is_used")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
