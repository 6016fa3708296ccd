use stocksync_types::pricing::{PriceAdjust, PriceRounding};

use crate::ingest::format_price;

/// Applies the adjustment to an imported price and renders it with two
/// decimals.
pub fn adjust_price(original: f64, adjust: &PriceAdjust) -> String {
    let sum = original + adjust.amount;
    let adjusted = match adjust.round {
        PriceRounding::None => sum,
        PriceRounding::Integer => sum.round(),
    };
    format_price(adjusted)
}

/// Picks the adjustment for one submission: each explicit override wins over
/// the saved default, which wins over the neutral adjustment.
pub fn resolve_price_adjust(
    amount: Option<f64>,
    round: Option<PriceRounding>,
    saved: Option<PriceAdjust>,
) -> PriceAdjust {
    let fallback = saved.unwrap_or_default();
    PriceAdjust::new(
        amount.unwrap_or(fallback.amount),
        round.unwrap_or(fallback.round),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_price() {
        let integer = PriceAdjust::new(50.0, PriceRounding::Integer);
        assert_eq!(adjust_price(100.0, &integer), "150.00");

        let plain = PriceAdjust::new(50.5, PriceRounding::None);
        assert_eq!(adjust_price(100.0, &plain), "150.50");

        let rounded = PriceAdjust::new(0.0, PriceRounding::Integer);
        assert_eq!(adjust_price(19.5, &rounded), "20.00");

        let discount = PriceAdjust::new(-10.0, PriceRounding::None);
        assert_eq!(adjust_price(59.0, &discount), "49.00");

        assert_eq!(adjust_price(199.9, &PriceAdjust::default()), "199.90");
    }

    #[test]
    fn test_resolve_price_adjust() {
        let saved = Some(PriceAdjust::new(5.0, PriceRounding::Integer));

        assert_eq!(resolve_price_adjust(None, None, None), PriceAdjust::default());
        assert_eq!(resolve_price_adjust(None, None, saved), saved.unwrap());
        assert_eq!(
            resolve_price_adjust(Some(2.0), None, saved),
            PriceAdjust::new(2.0, PriceRounding::Integer)
        );
        assert_eq!(
            resolve_price_adjust(Some(-1.5), Some(PriceRounding::None), saved),
            PriceAdjust::new(-1.5, PriceRounding::None)
        );
    }
}
