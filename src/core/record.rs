//! Retailer records and the categorical values they carry.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Provider column value for retailers without any BNPL partner.
pub const NO_BNPL_PROVIDER: &str = "No BNPL";

/// How a retailer offers Buy Now, Pay Later at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum BnplType {
    OutsourcedOnly,
    InHouseAndOutsourced,
    InHouseOnly,
    NoBnpl,
}

impl BnplType {
    /// All variants in legend order, the column order of the adoption tables.
    pub const ALL: [BnplType; 4] = [
        BnplType::OutsourcedOnly,
        BnplType::InHouseAndOutsourced,
        BnplType::InHouseOnly,
        BnplType::NoBnpl,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BnplType::OutsourcedOnly => "Outsourced only BNPL",
            BnplType::InHouseAndOutsourced => "In-house + Outsourced BNPL",
            BnplType::InHouseOnly => "In-house only BNPL",
            BnplType::NoBnpl => "No BNPL",
        }
    }

    /// True for every type except `NoBnpl`.
    pub fn offers_bnpl(&self) -> bool {
        !matches!(self, BnplType::NoBnpl)
    }
}

impl Display for BnplType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for BnplType {
    type Err = anyhow::Error;

    // Matching is case-sensitive, the labels are the dataset's own spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BnplType::ALL
            .into_iter()
            .find(|t| t.label() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid BNPL type: {}", s))
    }
}

/// One row of the retailer dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailerRecord {
    pub country: String,
    pub annual_revenue: f64,
    pub product_category: String,
    pub bnpl_type: BnplType,
    pub bnpl_provider: String,
    pub retailer_rank: u32,
    pub year: i32,
}

impl RetailerRecord {
    /// Whether this retailer contributes to per-provider market share.
    pub fn has_provider(&self) -> bool {
        self.bnpl_provider != NO_BNPL_PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bnpl_type_parses_dataset_labels() {
        for t in BnplType::ALL {
            assert_eq!(t.label().parse::<BnplType>().unwrap(), t);
        }
        assert!("no bnpl".parse::<BnplType>().is_err());
        assert!("In-house BNPL".parse::<BnplType>().is_err());
    }

    #[test]
    fn test_only_no_bnpl_is_excluded_from_offering() {
        assert!(BnplType::OutsourcedOnly.offers_bnpl());
        assert!(BnplType::InHouseAndOutsourced.offers_bnpl());
        assert!(BnplType::InHouseOnly.offers_bnpl());
        assert!(!BnplType::NoBnpl.offers_bnpl());
    }
}
