use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use num_bigint::BigInt;

use crate::config::EconomicsConfig;
use crate::errors;

/// Recomputes transaction fees from gas used, following the network economics.
#[derive(Debug, Clone)]
pub struct FeeComputer {
    min_gas_limit: u64,
    gas_per_data_byte: u64,
    gas_price_modifier: BigDecimal,
}

impl FeeComputer {
    pub fn new(config: &EconomicsConfig) -> crate::Result<Self> {
        let gas_price_modifier = BigDecimal::from_str(&config.gas_price_modifier).map_err(|err| {
            errors::ErrorKind::InvalidConfig(format!(
                "invalid gas price modifier {}: {}",
                config.gas_price_modifier, err
            ))
        })?;

        Ok(Self {
            min_gas_limit: config.min_gas_limit,
            gas_per_data_byte: config.gas_per_data_byte,
            gas_price_modifier,
        })
    }

    pub fn compute_gas_limit(&self, data: &[u8]) -> u64 {
        let data_gas = (data.len() as u64).saturating_mul(self.gas_per_data_byte);
        self.min_gas_limit.saturating_add(data_gas)
    }

    /// Move-balance gas at full price, the rest at the modified price.
    pub fn compute_tx_fee_based_on_gas_used(
        &self,
        gas_price: u64,
        gas_used: u64,
        data: &[u8],
    ) -> BigInt {
        let move_balance_gas = self.compute_gas_limit(data);
        if gas_used <= move_balance_gas {
            return BigInt::from(gas_price) * BigInt::from(gas_used);
        }

        let move_balance_fee = BigInt::from(gas_price) * BigInt::from(move_balance_gas);
        let processing_fee = BigInt::from(gas_used - move_balance_gas)
            * BigInt::from(self.processing_gas_price(gas_price));

        move_balance_fee + processing_fee
    }

    fn processing_gas_price(&self, gas_price: u64) -> u64 {
        (BigDecimal::from(gas_price) * &self.gas_price_modifier)
            .with_scale_round(0, RoundingMode::Floor)
            .to_u64()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computer() -> FeeComputer {
        FeeComputer::new(&EconomicsConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_modifier() {
        let config = EconomicsConfig {
            gas_price_modifier: "one percent".to_string(),
            ..EconomicsConfig::default()
        };
        let err = FeeComputer::new(&config).unwrap_err();
        assert_eq!(err.code, 412);
    }

    #[test]
    fn test_move_balance_only() {
        let fee = computer().compute_tx_fee_based_on_gas_used(1_000_000_000, 50_000, b"");
        assert_eq!(fee, BigInt::from(50_000_000_000_000u64));
    }

    #[test]
    fn test_processing_gas_is_discounted() {
        // 4 bytes of data: move balance gas = 50000 + 4 * 1500 = 56000
        let fee = computer().compute_tx_fee_based_on_gas_used(1_000_000_000, 156_000, b"test");
        let expected =
            BigInt::from(56_000u64 * 1_000_000_000) + BigInt::from(100_000u64 * 10_000_000);
        assert_eq!(fee, expected);
    }

    #[test]
    fn test_processing_price_is_floored() {
        let computer = computer();
        assert_eq!(computer.processing_gas_price(150), 1);
        assert_eq!(computer.processing_gas_price(99), 0);
    }
}
