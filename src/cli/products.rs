use std::io;

use clap::Args;
use freshcart::{
    catalog::{ALL_CATEGORIES, CatalogState, ProductQuery, browse, category_labels},
    pricing::format_money,
};
use rusty_money::Money;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

use super::{CliError, Storefront};

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Only show this exact category label ("All" shows every category)
    #[arg(long)]
    category: Option<String>,

    /// Only show products whose name or category contains this text
    #[arg(long)]
    search: Option<String>,
}

impl ProductsArgs {
    fn query(&self) -> ProductQuery {
        ProductQuery {
            category: self.category.clone(),
            search: self.search.clone(),
        }
    }
}

pub(crate) fn run(
    storefront: &Storefront,
    args: &ProductsArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let catalog = storefront.catalog()?;
    let cart = storefront.cart();
    let currency = storefront.policy().currency();

    let products = match browse(&catalog, &args.query()) {
        CatalogState::Loaded(products) => products,
        CatalogState::Empty => {
            writeln!(out, "No products found.")?;

            return Ok(());
        }
        CatalogState::Unavailable { message } => {
            writeln!(out, "{message}\nPlease try again.")?;

            return Ok(());
        }
    };

    let mut builder = Builder::default();

    builder.push_record(["ID", "Product", "Unit", "Category", "Price", "In cart"]);

    for product in &products {
        let in_cart = match cart.quantity_of(&product.id) {
            0 => String::new(),
            quantity => quantity.to_string(),
        };

        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.unit.clone(),
            product.category.clone(),
            format_money(&Money::from_decimal(product.price, currency)),
            in_cart,
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(4..6), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

pub(crate) fn categories(storefront: &Storefront, out: &mut impl io::Write) -> Result<(), CliError> {
    let catalog = storefront.catalog()?;

    writeln!(out, "{ALL_CATEGORIES}")?;

    for category in category_labels(&catalog) {
        writeln!(out, "{category}")?;
    }

    Ok(())
}
