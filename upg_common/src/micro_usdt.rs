use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const USDT_CURRENCY_CODE: &str = "USDT";
/// USDT on TRON carries 6 decimal places, so one micro-USDT is the smallest transferable unit.
pub const USDT_DECIMALS: usize = 6;
const MICRO_PER_USDT: i64 = 1_000_000;

//--------------------------------------     MicroUsdt       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct MicroUsdt(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented in micro-USDT: {0}")]
pub struct MicroUsdtConversionError(String);

impl From<i64> for MicroUsdt {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<f64> for MicroUsdt {
    type Error = MicroUsdtConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(MicroUsdtConversionError(format!("{value} is not a finite number")));
        }
        let scaled = value * MICRO_PER_USDT as f64;
        let micro = scaled.round();
        if micro.abs() >= i64::MAX as f64 {
            return Err(MicroUsdtConversionError(format!("{value} is too large")));
        }
        // Only the representation error of the float itself is tolerated, never a genuine 7th decimal place.
        let tolerance = (scaled.abs() * 4.0 * f64::EPSILON).max(1e-9);
        if (scaled - micro).abs() > tolerance {
            return Err(MicroUsdtConversionError(format!("{value} has more than {USDT_DECIMALS} decimal places")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(micro as i64))
    }
}

impl FromStr for MicroUsdt {
    type Err = MicroUsdtConversionError;

    /// Parses a plain decimal string such as `"100"`, `"12.5"` or `"-0.000001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MicroUsdtConversionError(format!("'{s}' is not a valid USDT amount"));
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let mut parts = digits.splitn(2, '.');
        let whole = parts.next().unwrap_or_default();
        let frac = parts.next().unwrap_or_default();
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > USDT_DECIMALS {
            return Err(MicroUsdtConversionError(format!("'{s}' has more than {USDT_DECIMALS} decimal places")));
        }
        let whole_units = if whole.is_empty() { 0 } else { whole.parse::<i64>().map_err(|_| invalid())? };
        let frac_units = if frac.is_empty() { 0 } else { format!("{frac:0<USDT_DECIMALS$}").parse::<i64>().map_err(|_| invalid())? };
        let value = whole_units.checked_mul(MICRO_PER_USDT).and_then(|v| v.checked_add(frac_units)).ok_or_else(invalid)?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Display for MicroUsdt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {USDT_CURRENCY_CODE}", self.to_decimal_string())
    }
}

impl MicroUsdt {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_usdt(usdt: i64) -> Self {
        Self(usdt * MICRO_PER_USDT)
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / MICRO_PER_USDT as f64
    }

    /// The amount as a decimal string with trailing zeros removed, e.g. `12.5` or `100`.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MICRO_PER_USDT as u64;
        let frac = abs % MICRO_PER_USDT as u64;
        if frac == 0 {
            format!("{sign}{whole}")
        } else {
            let frac = format!("{frac:0>USDT_DECIMALS$}");
            format!("{sign}{whole}.{}", frac.trim_end_matches('0'))
        }
    }
}
