use crate::errors;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Decimals of the native currency.
    pub denomination: i32,
    pub num_of_shards: u32,
    /// Only keep records whose receiver shard is the indexing shard.
    #[serde(default)]
    pub import_db: bool,
    #[serde(default)]
    pub address: AddressConfig,
    #[serde(default)]
    pub economics: EconomicsConfig,
    #[serde(default)]
    pub indices: IndicesConfig,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            denomination: 18,
            num_of_shards: 3,
            import_db: false,
            address: AddressConfig::default(),
            economics: EconomicsConfig::default(),
            indices: IndicesConfig::default(),
            log_filter: "info".to_owned(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AddressEncoding {
    Hex,
    Bech32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AddressConfig {
    pub encoding: AddressEncoding,
    pub hrp: String,
    pub length: usize,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            encoding: AddressEncoding::Bech32,
            hrp: "erd".to_owned(),
            length: 32,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EconomicsConfig {
    pub min_gas_limit: u64,
    pub gas_per_data_byte: u64,
    /// Decimal string, applied to the gas price of the processing part of a fee.
    pub gas_price_modifier: String,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            min_gas_limit: 50_000,
            gas_per_data_byte: 1_500,
            gas_price_modifier: "0.01".to_owned(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IndicesConfig {
    pub transactions: String,
    pub scresults: String,
    pub receipts: String,
    pub accounts: String,
    pub accounts_history: String,
    pub accounts_esdt: String,
    pub accounts_esdt_history: String,
    pub tokens: String,
    pub esdts: String,
    pub scdeploys: String,
    pub delegators: String,
    pub logs: String,
    pub events: String,
    pub tags: String,
    pub operations: String,
}

impl Default for IndicesConfig {
    fn default() -> Self {
        Self {
            transactions: "transactions".to_owned(),
            scresults: "scresults".to_owned(),
            receipts: "receipts".to_owned(),
            accounts: "accounts".to_owned(),
            accounts_history: "accountshistory".to_owned(),
            accounts_esdt: "accountsesdt".to_owned(),
            accounts_esdt_history: "accountsesdthistory".to_owned(),
            tokens: "tokens".to_owned(),
            esdts: "esdts".to_owned(),
            scdeploys: "scdeploys".to_owned(),
            delegators: "delegators".to_owned(),
            logs: "logs".to_owned(),
            events: "events".to_owned(),
            tags: "tags".to_owned(),
            operations: "operations".to_owned(),
        }
    }
}

impl Config {
    /// Defaults overridden by `INDEXER_*` variables, `.env` included.
    pub fn from_env() -> crate::Result<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::default();

        if let Some(value) = env_var("INDEXER_DENOMINATION") {
            config.denomination = parse_env("INDEXER_DENOMINATION", &value)?;
        }
        if let Some(value) = env_var("INDEXER_NUM_OF_SHARDS") {
            config.num_of_shards = parse_env("INDEXER_NUM_OF_SHARDS", &value)?;
        }
        if let Some(value) = env_var("INDEXER_IMPORT_DB") {
            config.import_db = parse_env("INDEXER_IMPORT_DB", &value)?;
        }
        if let Some(value) = env_var("INDEXER_ADDRESS_ENCODING") {
            config.address.encoding = parse_env("INDEXER_ADDRESS_ENCODING", &value)?;
        }
        if let Some(value) = env_var("INDEXER_ADDRESS_HRP") {
            config.address.hrp = value;
        }
        if let Some(value) = env_var("INDEXER_GAS_PRICE_MODIFIER") {
            config.economics.gas_price_modifier = value;
        }
        if let Some(value) = env_var("RUST_LOG") {
            config.log_filter = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.denomination < 0 {
            return Err(errors::ErrorKind::InvalidConfig(
                errors::ConversionError::NegativeDenomination.to_string(),
            )
            .into());
        }
        if self.num_of_shards == 0 {
            return Err(errors::ErrorKind::InvalidConfig(
                "num_of_shards should be greater than 0".to_string(),
            )
            .into());
        }
        if self.address.encoding == AddressEncoding::Bech32 && self.address.hrp.is_empty() {
            return Err(errors::ErrorKind::InvalidConfig(
                "bech32 addresses need a human readable part".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn parse_env<T>(key: &str, value: &str) -> crate::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err: T::Err| {
        errors::ErrorKind::InvalidConfig(format!("{} has invalid value {}: {}", key, value, err))
            .into()
    })
}
