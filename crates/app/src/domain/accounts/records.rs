//! Account Records

use std::{fmt, str::FromStr};

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Account UUID
pub type AccountUuid = TypedUuid<AccountRecord>;

/// Address UUID
pub type AddressUuid = TypedUuid<AddressRecord>;

/// How long an email verification token stays valid.
pub const VERIFICATION_TOKEN_TTL: SignedDuration = SignedDuration::from_secs(24 * 60 * 60);

/// Account Record
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub uuid: AccountUuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AccountRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    #[default]
    Home,
    Work,
    Other,
}

impl AddressKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Work => "work",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAddressKind(pub String);

impl fmt::Display for UnknownAddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown address kind: {}", self.0)
    }
}

impl std::error::Error for UnknownAddressKind {}

impl FromStr for AddressKind {
    type Err = UnknownAddressKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "home" => Ok(Self::Home),
            "work" => Ok(Self::Work),
            "other" => Ok(Self::Other),
            other => Err(UnknownAddressKind(other.to_string())),
        }
    }
}

/// Address Record
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    pub uuid: AddressUuid,
    pub account_uuid: AccountUuid,
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
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AddressRecord {
    /// Single-line postal rendering, e.g. `Rua A, 10 - Centro - Recife/PE - CEP: 50000-000`.
    pub fn formatted(&self) -> String {
        let mut parts = vec![format!("{}, {}", self.street, self.number)];

        if !self.complement.is_empty() {
            parts.push(self.complement.clone());
        }

        parts.push(self.neighborhood.clone());
        parts.push(format!("{}/{}", self.city, self.state));
        parts.push(format!("CEP: {}", self.zip_code));

        parts.join(" - ")
    }
}

/// Email Verification Token Record
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationTokenRecord {
    pub token: Uuid,
    pub account_uuid: AccountUuid,
    pub is_used: bool,
    pub created_at: Timestamp,
}

impl VerificationTokenRecord {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.created_at + VERIFICATION_TOKEN_TTL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(complement: &str) -> AddressRecord {
        AddressRecord {
            uuid: AddressUuid::new(),
            account_uuid: AccountUuid::new(),
            kind: AddressKind::Home,
            name: "Casa".to_string(),
            street: "Rua das Flores".to_string(),
            number: "42".to_string(),
            complement: complement.to_string(),
            neighborhood: "Centro".to_string(),
            city: "Recife".to_string(),
            state: "PE".to_string(),
            zip_code: "50000-000".to_string(),
            is_default: false,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn formatted_address_skips_empty_complement() {
        assert_eq!(
            address("").formatted(),
            "Rua das Flores, 42 - Centro - Recife/PE - CEP: 50000-000"
        );
    }

    #[test]
    fn formatted_address_includes_complement() {
        assert_eq!(
            address("Apto 3").formatted(),
            "Rua das Flores, 42 - Apto 3 - Centro - Recife/PE - CEP: 50000-000"
        );
    }

    #[test]
    fn address_kind_round_trips_through_text() {
        for kind in [AddressKind::Home, AddressKind::Work, AddressKind::Other] {
            assert_eq!(kind.as_str().parse::<AddressKind>(), Ok(kind));
        }

        assert!("garage".parse::<AddressKind>().is_err());
    }

    #[test]
    fn verification_token_expires_after_a_day() {
        let token = VerificationTokenRecord {
            token: Uuid::new_v4(),
            account_uuid: AccountUuid::new(),
            is_used: false,
            created_at: Timestamp::UNIX_EPOCH,
        };

        let just_inside = Timestamp::UNIX_EPOCH + SignedDuration::from_hours(24);
        let just_after = just_inside + SignedDuration::from_secs(1);

        assert!(!token.is_expired(just_inside));
        assert!(token.is_expired(just_after));
    }

    #[test]
    fn full_name_trims_missing_parts() {
        let account = AccountRecord {
            uuid: AccountUuid::new(),
            email: "ana@example.com".to_string(),
            first_name: "Ana".to_string(),
            last_name: String::new(),
            phone: String::new(),
            is_verified: false,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        };

        assert_eq!(account.full_name(), "Ana");
    }
}
