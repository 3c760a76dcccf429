//! Configuration
//!
//! Command line flags with environment fallbacks. A `.env` file in the working
//! directory is loaded by the binary before parsing.

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Args;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    catalog::{CatalogError, StaticCatalog},
    pricing::{PricingError, PricingPolicy, currency_from_code},
    storage::{FileStore, SharedStore},
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid pricing settings
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Catalog prices are not in the configured currency
    #[error("Catalog is priced in {catalog}, but the store is configured for {configured}")]
    CurrencyMismatch {
        /// Catalog currency code
        catalog: String,

        /// Configured currency code
        configured: String,
    },
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "FRESHCART_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Storefront settings.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Directory holding the cart, last order and user marker
    #[arg(long, env = "FRESHCART_DATA_DIR", default_value = ".freshcart", global = true)]
    pub data_dir: PathBuf,

    /// Product catalog YAML; the bundled catalog is used when omitted
    #[arg(long, env = "FRESHCART_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Currency code (INR, GBP, USD, EUR)
    #[arg(long, env = "FRESHCART_CURRENCY", default_value = "INR", global = true)]
    pub currency: String,

    /// Subtotal at which delivery becomes free
    #[arg(
        long,
        env = "FRESHCART_FREE_DELIVERY_THRESHOLD",
        default_value = "150",
        global = true
    )]
    pub free_delivery_threshold: Decimal,

    /// Delivery fee below the free-delivery threshold
    #[arg(long, env = "FRESHCART_DELIVERY_FEE", default_value = "40", global = true)]
    pub delivery_fee: Decimal,

    /// Tax percentage shown on order confirmations
    #[arg(long, env = "FRESHCART_TAX_PERCENT", default_value = "18", global = true)]
    pub tax_percent: Decimal,

    /// Simulated order placement latency in milliseconds
    #[arg(
        long,
        env = "FRESHCART_CHECKOUT_LATENCY_MS",
        default_value_t = 1_000_u64,
        global = true
    )]
    pub checkout_latency_ms: u64,
}

impl StoreConfig {
    /// Delivery rules from the configured currency, threshold and fee.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is unknown or an amount is negative.
    pub fn pricing_policy(&self) -> Result<PricingPolicy, ConfigError> {
        let currency = currency_from_code(&self.currency)?;

        let policy = PricingPolicy::new(currency, self.free_delivery_threshold, self.delivery_fee)?
            .with_tax_rate(self.tax_percent / Decimal::ONE_HUNDRED)?;

        Ok(policy)
    }

    /// Simulated checkout round-trip.
    pub fn checkout_latency(&self) -> Duration {
        Duration::from_millis(self.checkout_latency_ms)
    }

    /// File store rooted at the data directory.
    pub fn open_store(&self) -> SharedStore {
        Arc::new(FileStore::new(self.data_dir.clone()))
    }

    /// Load the configured catalog, checking it is priced in `policy`'s currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or its currency differs.
    pub fn load_catalog(&self, policy: &PricingPolicy) -> Result<StaticCatalog, ConfigError> {
        let catalog = match &self.catalog {
            Some(path) => StaticCatalog::from_path(path)?,
            None => StaticCatalog::bundled()?,
        };

        if let Some(currency) = catalog
            .currency()
            .filter(|&currency| currency != policy.currency())
        {
            return Err(ConfigError::CurrencyMismatch {
                catalog: currency.iso_alpha_code.to_string(),
                configured: policy.currency().iso_alpha_code.to_string(),
            });
        }

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rusty_money::iso::{GBP, INR};
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        store: StoreConfig,
    }

    #[test]
    fn defaults_match_storefront_rules() -> TestResult {
        let cli = TestCli::try_parse_from(["freshcart"])?;
        let policy = cli.store.pricing_policy()?;

        assert_eq!(policy, PricingPolicy::default());
        assert_eq!(cli.store.checkout_latency(), Duration::from_secs(1));
        assert_eq!(cli.store.data_dir, PathBuf::from(".freshcart"));

        Ok(())
    }

    #[test]
    fn custom_rules_are_applied() -> TestResult {
        let cli = TestCli::try_parse_from([
            "freshcart",
            "--currency",
            "gbp",
            "--free-delivery-threshold",
            "30",
            "--delivery-fee",
            "3.99",
            "--tax-percent",
            "12.5",
        ])?;

        let policy = cli.store.pricing_policy()?;

        assert_eq!(policy.currency(), GBP);
        assert_eq!(*policy.free_delivery_threshold().amount(), Decimal::from(30));
        assert_eq!(*policy.standard_delivery_fee().amount(), Decimal::new(399, 2));
        assert_eq!(policy.tax_rate(), Decimal::new(125, 3));

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() -> TestResult {
        let cli = TestCli::try_parse_from(["freshcart", "--currency", "XYZ"])?;

        assert!(matches!(
            cli.store.pricing_policy(),
            Err(ConfigError::Pricing(PricingError::UnknownCurrency(_)))
        ));

        Ok(())
    }

    #[test]
    fn bundled_catalog_must_match_currency() -> TestResult {
        let cli = TestCli::try_parse_from(["freshcart"])?;
        let inr = PricingPolicy::default();
        let gbp = PricingPolicy::new(GBP, Decimal::from(30), Decimal::from(3))?;

        assert_eq!(cli.store.load_catalog(&inr)?.currency(), Some(INR));
        assert!(matches!(
            cli.store.load_catalog(&gbp),
            Err(ConfigError::CurrencyMismatch { .. })
        ));

        Ok(())
    }
}
