//! Tax regimes and where their results live in the workbook.
//!
//! The workbook publishes one "global cost" per source regime in column B of
//! the `web` sheet. Eight regimes are displayed, but only four distinct rows
//! exist: both micro variants and both LMNP variants are read from the
//! `micro nu + meublé` row as an approximation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cell::CellAddress;

/// Sheet holding the per-regime results.
pub const RESULTS_SHEET: &str = "web";
/// Column of the global cost in [`RESULTS_SHEET`] (B).
pub const GLOBAL_COST_COLUMN: u32 = 2;
/// Row used for unknown regimes and approximated ones.
pub const DEFAULT_ROW: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regime {
    MicroBare,
    MicroFurnished,
    MicroClassified,
    SciCorporateTax,
    SciCorporateTaxWithLiquidationLevy,
    SciIncomeTax,
    Lmnp,
    LmnpWithAccountingApproval,
}

impl Regime {
    /// Display order of the comparison table.
    pub const ALL: [Regime; 8] = [
        Regime::MicroBare,
        Regime::MicroFurnished,
        Regime::MicroClassified,
        Regime::SciCorporateTax,
        Regime::SciCorporateTaxWithLiquidationLevy,
        Regime::SciIncomeTax,
        Regime::Lmnp,
        Regime::LmnpWithAccountingApproval,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Regime::MicroBare => "micro nu",
            Regime::MicroFurnished => "micro meublé",
            Regime::MicroClassified => "micro classé",
            Regime::SciCorporateTax => "SCI IS",
            Regime::SciCorporateTaxWithLiquidationLevy => "SCI IS PREL BONI",
            Regime::SciIncomeTax => "SCI IR",
            Regime::Lmnp => "LMNP",
            Regime::LmnpWithAccountingApproval => "LMNP CGA",
        }
    }

    /// Identifier of the regime, matched case-insensitively by [`FromStr`].
    pub fn id(&self) -> &'static str {
        match self {
            Regime::MicroBare => "micro-bare",
            Regime::MicroFurnished => "micro-furnished",
            Regime::MicroClassified => "micro-classified",
            Regime::SciCorporateTax => "SCI-corporate-tax",
            Regime::SciCorporateTaxWithLiquidationLevy => "SCI-corporate-tax-with-liquidation-levy",
            Regime::SciIncomeTax => "SCI-income-tax",
            Regime::Lmnp => "LMNP",
            Regime::LmnpWithAccountingApproval => "LMNP-with-accounting-approval",
        }
    }

    /// Row of this regime's global cost in the results sheet.
    pub fn source_row(&self) -> u32 {
        match self {
            Regime::SciCorporateTax => 3,
            Regime::SciCorporateTaxWithLiquidationLevy => 4,
            Regime::SciIncomeTax => 5,
            Regime::MicroBare
            | Regime::MicroFurnished
            | Regime::MicroClassified
            | Regime::Lmnp
            | Regime::LmnpWithAccountingApproval => DEFAULT_ROW,
        }
    }

    pub fn global_cost_address(&self) -> CellAddress {
        CellAddress::new(self.source_row(), GLOBAL_COST_COLUMN)
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Regime {
    type Err = ();

    /// Accepts the exact display name (`SCI IS PREL BONI`) or the id in any
    /// case (`SCI-corporate-tax-with-liquidation-levy`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Regime::ALL
            .into_iter()
            .find(|r| r.display_name() == s || r.id().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Row of the results sheet for a regime identifier.
///
/// Unknown identifiers fall back to [`DEFAULT_ROW`].
pub fn resolve_row(regime_id: &str) -> u32 {
    regime_id
        .parse::<Regime>()
        .map(|r| r.source_row())
        .unwrap_or(DEFAULT_ROW)
}

/// One distinct row of the results sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceRegime {
    pub name: &'static str,
    pub row: u32,
}

impl SourceRegime {
    pub fn global_cost_address(&self) -> CellAddress {
        CellAddress::new(self.row, GLOBAL_COST_COLUMN)
    }
}

/// The rows actually computed by the workbook, used for the optimum search
/// and the revenue table.
pub const SOURCE_REGIMES: [SourceRegime; 4] = [
    SourceRegime { name: "micro nu + meublé", row: 2 },
    SourceRegime { name: "SCI IS", row: 3 },
    SourceRegime { name: "SCI IS PREL BONI", row: 4 },
    SourceRegime { name: "SCI IR", row: 5 },
];
