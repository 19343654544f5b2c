use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};

use crate::domain::errors::LotError;

/// Fraction digits kept on an order volume.
pub const LOT_SCALE: i64 = 2;

/// Bounds on the decimal accepted before rounding. Larger exponents would
/// make rounding allocate huge integers.
const MAX_INTEGER_DIGITS: i64 = 6;
const MAX_FRACTION_DIGITS: i64 = 18;

/// Order volume in lots, non-negative and rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Lot(f64);

impl Lot {
    /// Parse a decimal string and round it half-to-even at two fraction digits.
    ///
    /// Rounding happens on the exact decimal, so `"1.005"` becomes `1.00` and
    /// `"1.015"` becomes `1.02` regardless of binary float representation.
    pub fn parse(raw: &str) -> Result<Self, LotError> {
        let trimmed = raw.trim();
        let decimal =
            BigDecimal::from_str(trimmed).map_err(|_| LotError::NotANumber(raw.to_string()))?;

        let (_, scale) = decimal.as_bigint_and_exponent();
        let integer_digits = decimal.digits() as i64 - scale;
        if scale > MAX_FRACTION_DIGITS || integer_digits > MAX_INTEGER_DIGITS {
            return Err(LotError::OutOfRange(trimmed.to_string()));
        }

        if decimal < BigDecimal::from(0) {
            return Err(LotError::Negative(trimmed.to_string()));
        }

        let rounded = decimal.with_scale_round(LOT_SCALE, RoundingMode::HalfEven);
        let value = rounded
            .to_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| LotError::OutOfRange(trimmed.to_string()))?;

        Ok(Lot(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
