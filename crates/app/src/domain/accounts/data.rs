//! Accounts Data

use crate::domain::accounts::records::{AccountUuid, AddressKind, AddressUuid};

/// New Account Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub uuid: AccountUuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// New Address Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub uuid: AddressUuid,
    pub kind: AddressKind,
    pub name: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub is_default: bool,
}
