//! Monetary formatting for printed receipts
//!
//! Values arrive as `f64` from loosely typed callers. They are converted to
//! `Decimal` and rounded half away from zero, so float noise such as
//! `1234.500000001` never reaches the paper.

use rust_decimal::prelude::*;

/// Rounding precision for monetary values
const DECIMAL_PLACES: u32 = 2;

/// Decimal separator style of printed amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrencyLocale {
    /// `R$ 1234.50`, byte-compatible with existing receipts
    #[default]
    Legacy,
    /// `R$ 1234,50`
    PtBr,
}

impl std::str::FromStr for CurrencyLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "legacy" | "default" => Ok(CurrencyLocale::Legacy),
            "pt-br" | "pt_br" => Ok(CurrencyLocale::PtBr),
            other => Err(format!("Unknown currency locale: {}", other)),
        }
    }
}

/// Convert to `Decimal` rounded to cents; non-finite input becomes zero
pub fn to_cents_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Line amount: quantity × unit price
pub fn line_total(quantity: f64, price: f64) -> Decimal {
    let q = Decimal::from_f64(quantity).unwrap_or_default();
    let p = Decimal::from_f64(price).unwrap_or_default();
    (q * p).round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a `Decimal` amount as `R$ 0.00`
pub fn format_decimal(value: Decimal, locale: CurrencyLocale) -> String {
    let rounded = value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded);
    match locale {
        CurrencyLocale::Legacy => format!("R$ {}", text),
        CurrencyLocale::PtBr => format!("R$ {}", text.replace('.', ",")),
    }
}

/// Format an amount with the default (legacy) separator
pub fn format_currency(value: f64) -> String {
    format_currency_with(value, CurrencyLocale::Legacy)
}

pub fn format_currency_with(value: f64, locale: CurrencyLocale) -> String {
    format_decimal(to_cents_decimal(value), locale)
}

/// Quantities print without decimals when whole (`2x`), otherwise up to 3 places (`0.35x`)
pub fn format_quantity(quantity: f64) -> String {
    if quantity.is_finite() && quantity.fract() == 0.0 {
        return format!("{}", quantity as i64);
    }
    let q = Decimal::from_f64(quantity)
        .unwrap_or_default()
        .round_dp(3)
        .normalize();
    q.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_two_decimals() {
        assert_eq!(format_currency(1234.5), "R$ 1234.50");
        assert_eq!(format_currency(1234.500000001), "R$ 1234.50");
        assert_eq!(format_currency(0.0), "R$ 0.00");
        assert_eq!(format_currency(10.0), "R$ 10.00");
    }

    #[test]
    fn test_format_currency_pt_br() {
        assert_eq!(format_currency_with(1234.5, CurrencyLocale::PtBr), "R$ 1234,50");
        assert_eq!(format_currency_with(0.1 + 0.2, CurrencyLocale::PtBr), "R$ 0,30");
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(format_currency(2.125), "R$ 2.13");
        assert_eq!(format_currency(-2.125), "R$ -2.13");
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(format_currency(f64::NAN), "R$ 0.00");
        assert_eq!(format_currency(f64::INFINITY), "R$ 0.00");
    }

    #[test]
    fn test_line_total() {
        assert_eq!(format_decimal(line_total(2.0, 5.0), CurrencyLocale::Legacy), "R$ 10.00");
        assert_eq!(format_decimal(line_total(3.0, 0.1), CurrencyLocale::Legacy), "R$ 0.30");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(0.35), "0.35");
        assert_eq!(format_quantity(1.5), "1.5");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("pt-BR".parse::<CurrencyLocale>().unwrap(), CurrencyLocale::PtBr);
        assert_eq!("legacy".parse::<CurrencyLocale>().unwrap(), CurrencyLocale::Legacy);
        assert!("en-US".parse::<CurrencyLocale>().is_err());
    }
}
