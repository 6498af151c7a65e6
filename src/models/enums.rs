//! Shared domain status enums
//!
//! Statuses are stored as uppercase TEXT in the database, matching the values
//! the front end exchanges ("ACTIVE", "BORROWED", "PENDING", ...). Each enum
//! gets manual Display/FromStr plus sqlx Type/Decode/Encode impls so queries
//! can bind and decode them directly.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

macro_rules! text_enum_sqlx {
    ($name:ident) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// BookStatus
// ---------------------------------------------------------------------------

/// Administrative availability flag on a book, independent of copy counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookStatus {
    Available,
    Unavailable,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "AVAILABLE",
            BookStatus::Unavailable => "UNAVAILABLE",
        }
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AVAILABLE" => Ok(BookStatus::Available),
            "UNAVAILABLE" => Ok(BookStatus::Unavailable),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

text_enum_sqlx!(BookStatus);

// ---------------------------------------------------------------------------
// MemberStatus
// ---------------------------------------------------------------------------

/// Member account status; deletion flips to Inactive instead of removing rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "ACTIVE",
            MemberStatus::Inactive => "INACTIVE",
        }
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(MemberStatus::Active),
            "INACTIVE" => Ok(MemberStatus::Inactive),
            _ => Err(format!("Invalid member status: {}", s)),
        }
    }
}

text_enum_sqlx!(MemberStatus);

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Caller role carried in JWT claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Member,
    Librarian,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "MEMBER",
            Role::Librarian => "LIBRARIAN",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MEMBER" => Ok(Role::Member),
            "LIBRARIAN" => Ok(Role::Librarian),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

text_enum_sqlx!(Role);

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Persisted loan status; the only transition is Borrowed -> Returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Borrowed,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "BORROWED",
            LoanStatus::Returned => "RETURNED",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BORROWED" => Ok(LoanStatus::Borrowed),
            "RETURNED" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

text_enum_sqlx!(LoanStatus);

// ---------------------------------------------------------------------------
// LoanState
// ---------------------------------------------------------------------------

/// Derived loan state computed at read time, never stored. Carries the same
/// sqlx impls as the persisted enums so row structs that hold it stay
/// decodable even when the query omits the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanState {
    Borrowed,
    Overdue,
    Returned,
}

impl LoanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanState::Borrowed => "BORROWED",
            LoanState::Overdue => "OVERDUE",
            LoanState::Returned => "RETURNED",
        }
    }
}

impl std::str::FromStr for LoanState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BORROWED" => Ok(LoanState::Borrowed),
            "OVERDUE" => Ok(LoanState::Overdue),
            "RETURNED" => Ok(LoanState::Returned),
            _ => Err(format!("Invalid loan state: {}", s)),
        }
    }
}

text_enum_sqlx!(LoanState);

// ---------------------------------------------------------------------------
// FineStatus
// ---------------------------------------------------------------------------

/// Fine ledger status; Pending may transition to Paid or Waived, once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FineStatus {
    Pending,
    Paid,
    Waived,
}

impl FineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FineStatus::Pending => "PENDING",
            FineStatus::Paid => "PAID",
            FineStatus::Waived => "WAIVED",
        }
    }
}

impl std::str::FromStr for FineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(FineStatus::Pending),
            "PAID" => Ok(FineStatus::Paid),
            "WAIVED" => Ok(FineStatus::Waived),
            _ => Err(format!("Invalid fine status: {}", s)),
        }
    }
}

text_enum_sqlx!(FineStatus);

/// Allowed target statuses for a fine transition (PAID or WAIVED only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FineResolution {
    Paid,
    Waived,
}

impl From<FineResolution> for FineStatus {
    fn from(r: FineResolution) -> Self {
        match r {
            FineResolution::Paid => FineStatus::Paid,
            FineResolution::Waived => FineStatus::Waived,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_parse_case_insensitively() {
        assert_eq!("borrowed".parse::<LoanStatus>().unwrap(), LoanStatus::Borrowed);
        assert_eq!("ACTIVE".parse::<MemberStatus>().unwrap(), MemberStatus::Active);
        assert_eq!("Waived".parse::<FineStatus>().unwrap(), FineStatus::Waived);
        assert_eq!("overdue".parse::<LoanState>().unwrap(), LoanState::Overdue);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("LOST".parse::<LoanStatus>().is_err());
        assert!("SUSPENDED".parse::<MemberStatus>().is_err());
        assert!("CANCELLED".parse::<FineStatus>().is_err());
        assert!("LATE".parse::<LoanState>().is_err());
    }

    #[test]
    fn fine_resolution_maps_to_terminal_status() {
        assert_eq!(FineStatus::from(FineResolution::Paid), FineStatus::Paid);
        assert_eq!(FineStatus::from(FineResolution::Waived), FineStatus::Waived);
    }
}
