use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::errors::ConversionError;

const NUM_DECIMALS_IN_FLOAT_BALANCE: i32 = 10;
const NUM_DECIMALS_IN_FLOAT_BALANCE_ESDT: i32 = 18;

/// Values wider than this many bytes are never converted to floats.
pub const MAX_ESDT_VALUE_LENGTH: usize = 100;

/// Turns arbitrary-precision balances into bounded floats usable for range queries.
///
/// Every float is scaled by `10^denomination`, rounded half-to-even at a fixed number of
/// decimals and never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceConverter {
    divider_for_denomination: f64,
    balance_precision: f64,
    balance_precision_esdt: f64,
}

impl BalanceConverter {
    pub fn new(denomination: i32) -> Result<Self, ConversionError> {
        if denomination < 0 {
            return Err(ConversionError::NegativeDenomination);
        }

        Ok(Self {
            divider_for_denomination: 10f64.powi(denomination),
            balance_precision: 10f64.powi(NUM_DECIMALS_IN_FLOAT_BALANCE),
            balance_precision_esdt: 10f64.powi(NUM_DECIMALS_IN_FLOAT_BALANCE_ESDT),
        })
    }

    /// Native currency balance, 10 decimals.
    pub fn compute_balance_as_float(&self, balance: &BigInt) -> Result<f64, ConversionError> {
        self.compute_as_float(balance, self.balance_precision)
    }

    /// Token value, 18 decimals.
    pub fn convert_big_value_to_float(&self, value: &BigInt) -> Result<f64, ConversionError> {
        self.compute_as_float(value, self.balance_precision_esdt)
    }

    /// Converts decimal strings in order. One bad element fails the whole batch.
    pub fn compute_slice_of_strings_as_float(
        &self,
        values: &[String],
    ) -> Result<Vec<f64>, ConversionError> {
        values
            .iter()
            .map(|value| {
                let value_big = parse_big_int(value)?;
                self.convert_big_value_to_float(&value_big)
            })
            .collect()
    }

    /// Native currency balance given as a decimal string.
    pub fn to_float_or_error(&self, value: &str) -> Result<f64, ConversionError> {
        let value_big = parse_big_int(value)?;
        self.compute_balance_as_float(&value_big)
    }

    fn compute_as_float(&self, balance: &BigInt, precision: f64) -> Result<f64, ConversionError> {
        if balance.is_zero() {
            return Ok(0.0);
        }
        if balance.magnitude().to_bytes_be().len() > MAX_ESDT_VALUE_LENGTH {
            return Err(ConversionError::ValueTooBig);
        }

        let balance_float = balance.to_f64().ok_or(ConversionError::ValueTooBig)?;
        let scaled = balance_float / self.divider_for_denomination;
        let value = round_half_even(scaled, precision).max(0.0);
        if value.is_infinite() {
            return Err(ConversionError::ValueTooBig);
        }

        Ok(value)
    }
}

fn round_half_even(value: f64, precision: f64) -> f64 {
    (value * precision).round_ties_even() / precision
}

pub fn parse_big_int(value: &str) -> Result<BigInt, ConversionError> {
    value
        .parse::<BigInt>()
        .map_err(|_| ConversionError::CastStringToBigInt)
}

/// Same as [`parse_big_int`] but lenient: anything unparsable is zero.
pub fn big_int_or_zero(value: &str) -> BigInt {
    parse_big_int(value).unwrap_or_default()
}

pub fn big_int_to_string(value: Option<&BigInt>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "0".to_string(),
    }
}

/// Unsigned big-endian bytes as a number, saturating at `u64::MAX`.
pub fn bytes_to_u64(bytes: &[u8]) -> u64 {
    BigInt::from_bytes_be(num_bigint::Sign::Plus, bytes)
        .to_u64()
        .unwrap_or(u64::MAX)
}

pub fn bytes_to_big_int(bytes: &[u8]) -> BigInt {
    BigInt::from_bytes_be(num_bigint::Sign::Plus, bytes)
}
