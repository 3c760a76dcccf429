use std::io;

use clap::{Parser, Subcommand};
use freshcart::{
    cart::CartStore,
    catalog::{Catalog, CatalogError, StaticCatalog},
    checkout::CheckoutError,
    config::{ConfigError, LoggingConfig, StoreConfig},
    pricing::PricingPolicy,
    products::{Product, ProductId},
    receipt::ReceiptError,
    session::SessionError,
    storage::SharedStore,
};
use thiserror::Error;

mod cart;
mod checkout;
mod products;
mod session;

#[derive(Debug, Parser)]
#[command(name = "freshcart", about = "Grocery storefront", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List products
    Products(products::ProductsArgs),

    /// List product categories
    Categories,

    /// Show or change the cart
    Cart(cart::CartCommand),

    /// Place an order for everything in the cart
    Checkout(checkout::CheckoutArgs),

    /// Show the last order
    Order,

    /// Sign in
    Login(session::LoginArgs),

    /// Create an account
    Signup(session::SignupArgs),

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,
}

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("No product with id {0}")]
    UnknownProduct(ProductId),

    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),
}

impl Cli {
    pub(crate) async fn run(self, out: &mut impl io::Write) -> Result<(), CliError> {
        let storefront = Storefront::new(self.store)?;

        match self.command {
            Commands::Products(args) => products::run(&storefront, &args, out),
            Commands::Categories => products::categories(&storefront, out),
            Commands::Cart(command) => cart::run(&storefront, command, out),
            Commands::Checkout(args) => checkout::run(&storefront, args, out).await,
            Commands::Order => checkout::last(&storefront, out),
            Commands::Login(args) => session::login(&storefront, &args, out),
            Commands::Signup(args) => session::signup(&storefront, &args, out),
            Commands::Logout => session::logout(&storefront, out),
            Commands::Whoami => session::whoami(&storefront, out),
        }
    }
}

/// Everything a command needs, resolved from configuration.
#[derive(Debug)]
pub(crate) struct Storefront {
    config: StoreConfig,
    store: SharedStore,
    policy: PricingPolicy,
}

impl Storefront {
    fn new(config: StoreConfig) -> Result<Self, ConfigError> {
        let policy = config.pricing_policy()?;
        let store = config.open_store();

        Ok(Self {
            config,
            store,
            policy,
        })
    }

    pub(crate) fn store(&self) -> &SharedStore {
        &self.store
    }

    pub(crate) fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn catalog(&self) -> Result<StaticCatalog, ConfigError> {
        self.config.load_catalog(&self.policy)
    }

    pub(crate) fn cart(&self) -> CartStore {
        CartStore::open(self.store.clone(), self.policy)
    }

    pub(crate) fn product(&self, id: &ProductId) -> Result<Product, CliError> {
        self.catalog()?
            .product(id)?
            .ok_or_else(|| CliError::UnknownProduct(id.clone()))
    }
}
