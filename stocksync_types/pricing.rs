use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceRounding {
    #[default]
    None,
    Integer,
}

impl FromStr for PriceRounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(PriceRounding::None),
            "integer" | "int" => Ok(PriceRounding::Integer),
            other => Err(format!("unknown rounding mode '{other}'")),
        }
    }
}

/// Fixed additive delta plus optional rounding, applied to every imported
/// price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjust {
    pub amount: f64,
    pub round: PriceRounding,
}

impl PriceAdjust {
    pub fn new(amount: f64, round: PriceRounding) -> Self {
        Self { amount, round }
    }
}
