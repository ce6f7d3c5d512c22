//! Adapter metadata: the payload every ledger node carries.
//!
//! Identity, version and expiration date are validated value types, so a
//! record missing any of them cannot be built and never reaches the hasher.
//! Deserialization goes through the same constructors. The remaining fields
//! are free text and are hashed exactly as supplied.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, MetadataField};

macro_rules! non_empty_text {
    ($(#[$meta:meta])* $name:ident, $field:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, LedgerError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(LedgerError::malformed($field, "must not be empty"));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = LedgerError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

non_empty_text!(
    /// Unique name of the adapter lineage, e.g. `"Aladapter1"`.
    IdentityName,
    MetadataField::IdentityName
);
non_empty_text!(
    /// Version label, e.g. `"1.0"` or `"2.3.1"`.
    AdapterVersion,
    MetadataField::Version
);

macro_rules! free_text {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

free_text!(
    /// Reference to an external policy artifact. Never resolved by the ledger;
    /// empty when no policy was attached.
    PolicyFileRef
);
free_text!(
    /// Free-form tag naming the regulation that governs an adapter.
    /// An empty tag means no regulation was declared.
    RegulationTag
);
free_text!(
    /// Validity duration of an adapter, kept exactly as supplied
    /// (`"2 years"`, `"1 year 6 months"`, `"indefinite"`).
    ///
    /// The raw text is what gets hashed, so `"2 years"` and `"2 Years"` are
    /// different lifetimes. `approximate_days` interprets the text when it
    /// reads as `<count> <unit>` pairs.
    Lifetime
);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifetimeUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl LifetimeUnit {
    fn singular(&self) -> &'static str {
        match self {
            Self::Days => "day",
            Self::Weeks => "week",
            Self::Months => "month",
            Self::Years => "year",
        }
    }

    fn approximate_days(&self) -> u64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 7,
            Self::Months => 30,
            Self::Years => 365,
        }
    }
}

impl FromStr for LifetimeUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(Self::Days),
            "week" | "weeks" => Ok(Self::Weeks),
            "month" | "months" => Ok(Self::Months),
            "year" | "years" => Ok(Self::Years),
            _ => Err(()),
        }
    }
}

impl Lifetime {
    /// `"1 year"`, `"2 years"`, and so on.
    pub fn from_span(count: u32, unit: LifetimeUnit) -> Self {
        let plural = if count == 1 { "" } else { "s" };
        Self(format!("{} {}{}", count, unit.singular(), plural))
    }

    /// Rough length in days (month = 30, year = 365), for reporting only.
    ///
    /// `None` unless the text is one or more whole `<count> <unit>` pairs,
    /// optionally comma-separated.
    pub fn approximate_days(&self) -> Option<u64> {
        let tokens: Vec<&str> = self.0.split_whitespace().collect();
        if tokens.is_empty() || tokens.len() % 2 != 0 {
            return None;
        }
        tokens.chunks(2).try_fold(0u64, |total, pair| {
            let count: u64 = pair[0].parse().ok()?;
            let unit: LifetimeUnit = pair[1].trim_end_matches(',').parse().ok()?;
            total.checked_add(count.checked_mul(unit.approximate_days())?)
        })
    }
}

impl FromStr for Lifetime {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Versioned adapter record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdapterMetadata {
    identity_name: IdentityName,
    version: AdapterVersion,
    lifetime: Lifetime,
    expiration_date: NaiveDate,
    policy_file: PolicyFileRef,
    regulations: RegulationTag,
}

impl AdapterMetadata {
    pub fn new(
        identity_name: IdentityName,
        version: AdapterVersion,
        lifetime: Lifetime,
        expiration_date: NaiveDate,
        policy_file: PolicyFileRef,
        regulations: RegulationTag,
    ) -> Self {
        Self {
            identity_name,
            version,
            lifetime,
            expiration_date,
            policy_file,
            regulations,
        }
    }

    /// Build from raw text fields.
    ///
    /// `identity_name` and `version` must be non-blank and `expiration_date`
    /// must be `YYYY-MM-DD`; everything else is taken verbatim.
    pub fn parse(
        identity_name: &str,
        version: &str,
        lifetime: &str,
        expiration_date: &str,
        policy_file: &str,
        regulations: &str,
    ) -> Result<Self, LedgerError> {
        let expiration_date = NaiveDate::parse_from_str(expiration_date.trim(), "%Y-%m-%d")
            .map_err(|e| {
                LedgerError::malformed(
                    MetadataField::ExpirationDate,
                    format!("{:?}: {}", expiration_date, e),
                )
            })?;
        Ok(Self::new(
            IdentityName::new(identity_name)?,
            AdapterVersion::new(version)?,
            Lifetime::new(lifetime),
            expiration_date,
            PolicyFileRef::new(policy_file),
            RegulationTag::new(regulations),
        ))
    }

    pub fn identity_name(&self) -> &IdentityName {
        &self.identity_name
    }

    pub fn version(&self) -> &AdapterVersion {
        &self.version
    }

    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    pub fn expiration_date(&self) -> NaiveDate {
        self.expiration_date
    }

    pub fn policy_file(&self) -> &PolicyFileRef {
        &self.policy_file
    }

    pub fn regulations(&self) -> &RegulationTag {
        &self.regulations
    }

    /// True once `on` is past the expiration date.
    pub fn is_expired(&self, on: NaiveDate) -> bool {
        on > self.expiration_date
    }

    pub fn with_identity_name(mut self, identity_name: IdentityName) -> Self {
        self.identity_name = identity_name;
        self
    }

    pub fn with_version(mut self, version: AdapterVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_expiration_date(mut self, expiration_date: NaiveDate) -> Self {
        self.expiration_date = expiration_date;
        self
    }

    pub fn with_policy_file(mut self, policy_file: PolicyFileRef) -> Self {
        self.policy_file = policy_file;
        self
    }

    pub fn with_regulations(mut self, regulations: RegulationTag) -> Self {
        self.regulations = regulations;
        self
    }
}
