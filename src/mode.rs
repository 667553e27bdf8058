//! Lock modes of the `DBMS_LOCK` service and their compatibility matrix.

use crate::error::{MutexError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lock mode requested for a named lock.
///
/// The set is closed: these are the only modes the lock service defines, and
/// the store constant for a mode is only ever produced from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LockMode {
    /// Exclusive: compatible with null holders only.
    #[default]
    Exclusive,
    /// Null: compatible with every mode.
    Null,
    /// Share.
    Share,
    /// Sub-exclusive (row exclusive).
    SubExclusive,
    /// Sub-share (row share).
    SubShare,
    /// Share/sub-exclusive.
    ShareSubExclusive,
}

impl LockMode {
    /// All modes, in the order they are reported in error messages.
    pub const ALL: [LockMode; 6] = [
        LockMode::Exclusive,
        LockMode::Null,
        LockMode::Share,
        LockMode::SubExclusive,
        LockMode::SubShare,
        LockMode::ShareSubExclusive,
    ];

    /// Short name (`X`, `NL`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            LockMode::Exclusive => "X",
            LockMode::Null => "NL",
            LockMode::Share => "S",
            LockMode::SubExclusive => "SX",
            LockMode::SubShare => "SS",
            LockMode::ShareSubExclusive => "SSX",
        }
    }

    /// Name of the `DBMS_LOCK` package constant for this mode.
    pub fn store_constant(&self) -> &'static str {
        match self {
            LockMode::Exclusive => "X_MODE",
            LockMode::Null => "NL_MODE",
            LockMode::Share => "S_MODE",
            LockMode::SubExclusive => "SX_MODE",
            LockMode::SubShare => "SS_MODE",
            LockMode::ShareSubExclusive => "SSX_MODE",
        }
    }

    /// Numeric value of the store constant.
    pub fn store_id(&self) -> u8 {
        match self {
            LockMode::Null => 1,
            LockMode::SubShare => 2,
            LockMode::SubExclusive => 3,
            LockMode::Share => 4,
            LockMode::ShareSubExclusive => 5,
            LockMode::Exclusive => 6,
        }
    }

    /// Whether a holder in `self` mode can coexist with a holder in `other`.
    ///
    /// The matrix is symmetric.
    pub fn is_compatible_with(&self, other: LockMode) -> bool {
        use LockMode::*;

        match (*self, other) {
            (Null, _) | (_, Null) => true,
            (SubShare, m) | (m, SubShare) => m != Exclusive,
            (SubExclusive, SubExclusive) => true,
            (Share, Share) => true,
            _ => false,
        }
    }

    fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|m| format!("\"{}\"", m.store_constant()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockMode {
    type Err = MutexError;

    /// Accepts either the short name (`SX`) or the store constant (`SX_MODE`).
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s || m.store_constant() == s)
            .ok_or_else(|| MutexError::InvalidMode {
                value: s.to_string(),
                valid: Self::valid_values(),
            })
    }
}

impl TryFrom<String> for LockMode {
    type Error = MutexError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LockMode> for String {
    fn from(mode: LockMode) -> Self {
        mode.as_str().to_string()
    }
}
