//! Products service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// Postgres `numeric_value_out_of_range`, raised when a stock update overflows the column.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product already exists")]
    AlreadyExists,

    /// Unknown or soft-deleted product, including stock ledger lookups.
    #[error("product not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid product data")]
    InvalidData,

    #[error("stock quantity out of range")]
    StockOutOfRange,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ProductsServiceError {
    fn from(error: Error) -> Self {
        match &error {
            Error::RowNotFound => return Self::NotFound,
            Error::ColumnDecode { index, .. } if index == "stock_quantity" => {
                return Self::StockOutOfRange;
            }
            _ => {}
        }

        let Some(database_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        if database_error.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return Self::StockOutOfRange;
        }

        match database_error.kind() {
            ErrorKind::UniqueViolation => Self::AlreadyExists,
            ErrorKind::ForeignKeyViolation => Self::InvalidReference,
            ErrorKind::NotNullViolation => Self::MissingRequiredData,
            ErrorKind::CheckViolation => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
