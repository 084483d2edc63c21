//! Closed set of components whose version is tracked per release.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One tracked component/repository. Each variant maps to one column in
/// `releases`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AppSlot {
    #[serde(rename = "mysageone")]
    MySageOne,
    #[serde(rename = "accountant_edition")]
    AccountantEdition,
    #[serde(rename = "accounts")]
    Accounts,
    #[serde(rename = "accounts_extra")]
    AccountsExtra,
    #[serde(rename = "addons")]
    Addons,
    #[serde(rename = "payroll")]
    Payroll,
    #[serde(rename = "collaborate")]
    Collaborate,
    #[serde(rename = "accounts_production")]
    AccountsProduction,
    #[serde(rename = "sageone_corp_tax_uk")]
    SageOneCorpTaxUk,
    #[serde(rename = "help")]
    Help,
}

impl AppSlot {
    /// All slots, in display order.
    pub const ALL: [AppSlot; 10] = [
        AppSlot::MySageOne,
        AppSlot::AccountantEdition,
        AppSlot::Accounts,
        AppSlot::AccountsExtra,
        AppSlot::Addons,
        AppSlot::Payroll,
        AppSlot::Collaborate,
        AppSlot::AccountsProduction,
        AppSlot::SageOneCorpTaxUk,
        AppSlot::Help,
    ];

    /// Column name in `releases`; also the external name of the slot.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MySageOne => "mysageone",
            Self::AccountantEdition => "accountant_edition",
            Self::Accounts => "accounts",
            Self::AccountsExtra => "accounts_extra",
            Self::Addons => "addons",
            Self::Payroll => "payroll",
            Self::Collaborate => "collaborate",
            Self::AccountsProduction => "accounts_production",
            Self::SageOneCorpTaxUk => "sageone_corp_tax_uk",
            Self::Help => "help",
        }
    }
}

/// Returns every tracked repository slot in display order.
pub fn repositories() -> &'static [AppSlot] {
    &AppSlot::ALL
}

impl Display for AppSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for names outside the tracked repository set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAppSlot(pub String);

impl Display for UnknownAppSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown repository `{}`", self.0)
    }
}

impl Error for UnknownAppSlot {}

impl FromStr for AppSlot {
    type Err = UnknownAppSlot;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AppSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == value)
            .ok_or_else(|| UnknownAppSlot(value.to_string()))
    }
}
