//! Product command - product pages and adding them to the cart.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use storefront_core::{NewCartLine, Product};

use super::{App, emit};
use crate::Cli;
use crate::output::{JsonFormatter, Pricing};

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub action: ProductAction,
}

/// Product subcommands.
#[derive(Subcommand)]
pub enum ProductAction {
    /// Show a product page.
    Show {
        /// Product slug.
        slug: String,
    },

    /// Fetch a product and add it to the cart.
    Add {
        /// Product slug.
        slug: String,

        /// Quantity.
        #[arg(long, default_value_t = 1)]
        qty: u32,

        /// Size id, as listed by `product show`.
        #[arg(long)]
        size_id: Option<u64>,

        /// Color id, as listed by `product show`.
        #[arg(long)]
        color_id: Option<u64>,
    },
}

/// Runs the product command.
pub async fn run(args: &ProductArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let api = app.api()?;

    match &args.action {
        ProductAction::Show { slug } => {
            let product = api
                .fetch_product(slug.trim())
                .await
                .with_context(|| format!("failed to load product {slug}"))?;
            let pricing = Pricing::from_store(&app.currency());
            emit(cli, &product, |f| f.format_product(&product, &pricing))
        }
        ProductAction::Add { slug, qty, size_id, color_id } => {
            let product = api
                .fetch_product(slug.trim())
                .await
                .with_context(|| format!("failed to load product {slug}"))?;
            let line = line_for(&product, *qty, *size_id, *color_id)?;

            let cart = app.cart();
            if cart.add(line).is_none() {
                bail!("Quantity must be at least 1");
            }

            let view = cart.read();
            let pricing = Pricing::from_store(&app.currency());
            let output = JsonFormatter::new(cli.pretty).cart_output(&view, &pricing);
            emit(cli, &output, |f| f.format_cart(&view, &pricing))
        }
    }
}

fn line_for(
    product: &Product,
    qty: u32,
    size_id: Option<u64>,
    color_id: Option<u64>,
) -> Result<NewCartLine> {
    if !product.summary.in_stock {
        bail!("{} is sold out", product.summary.name);
    }

    let mut line = NewCartLine::new(product.summary.to_ref(), qty);
    if let Some(id) = size_id {
        let Some(size) = product.size(id) else {
            bail!("{} has no size with id {id}", product.summary.name);
        };
        line = line.with_size(size.clone());
    } else if !product.sizes.is_empty() {
        bail!("{} needs a size, pass --size-id", product.summary.name);
    }
    if let Some(id) = color_id {
        let Some(color) = product.color(id) else {
            bail!("{} has no color with id {id}", product.summary.name);
        };
        line = line.with_color(color.clone());
    }
    Ok(line)
}
