//! Cart command - inspect and change the cart.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use storefront_core::{NewCartLine, ProductRef, VariantSelection, slugify};

use super::{App, emit};
use crate::Cli;
use crate::output::{JsonFormatter, Pricing};

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub action: CartAction,
}

/// Cart subcommands.
#[derive(Subcommand)]
pub enum CartAction {
    /// Show lines and totals.
    Show,

    /// Add a product.
    Add(AddArgs),

    /// Change a line's quantity.
    Update {
        /// Line id.
        line_id: String,
        /// New quantity (at least 1).
        quantity: u32,
    },

    /// Remove a line.
    Remove {
        /// Line id.
        line_id: String,
    },

    /// Empty the cart.
    Clear,

    /// Print the checkout hand-off lines.
    Export,
}

/// Arguments for `cart add`.
#[derive(Args)]
pub struct AddArgs {
    /// Product id.
    pub product_id: u64,

    /// Product name.
    #[arg(long)]
    pub name: String,

    /// Unit price in the base currency.
    #[arg(long)]
    pub price: Decimal,

    /// Product slug (derived from the name if omitted).
    #[arg(long)]
    pub slug: Option<String>,

    /// Image URL.
    #[arg(long)]
    pub image: Option<String>,

    /// Quantity.
    #[arg(long, default_value_t = 1)]
    pub qty: u32,

    /// Size id.
    #[arg(long, requires = "size")]
    pub size_id: Option<u64>,

    /// Size label.
    #[arg(long, requires = "size_id")]
    pub size: Option<String>,

    /// Color id.
    #[arg(long, requires = "color")]
    pub color_id: Option<u64>,

    /// Color label.
    #[arg(long, requires = "color_id")]
    pub color: Option<String>,
}

impl AddArgs {
    fn to_line(&self) -> Result<NewCartLine> {
        if self.price.is_sign_negative() {
            bail!("Price cannot be negative: {}", self.price);
        }

        let slug = self.slug.clone().unwrap_or_else(|| slugify(&self.name));
        let mut product = ProductRef::new(self.product_id, self.name.trim(), slug, self.price);
        if let Some(image) = &self.image {
            product = product.with_image(image);
        }

        let mut line = NewCartLine::new(product, self.qty);
        if let (Some(id), Some(label)) = (self.size_id, &self.size) {
            line = line.with_size(VariantSelection::new(id, label));
        }
        if let (Some(id), Some(label)) = (self.color_id, &self.color) {
            line = line.with_color(VariantSelection::new(id, label));
        }
        Ok(line)
    }
}

/// Runs the cart command.
pub async fn run(args: &CartArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let cart = app.cart();

    match &args.action {
        CartAction::Show => {}
        CartAction::Add(add) => {
            if cart.add(add.to_line()?).is_none() {
                bail!("Quantity must be at least 1");
            }
        }
        CartAction::Update { line_id, quantity } => {
            if *quantity < 1 {
                bail!("Quantity must be at least 1");
            }
            if cart.read().lines.iter().all(|l| &l.id != line_id) {
                bail!("No cart line with id {line_id}");
            }
            cart.update_quantity(line_id, *quantity);
        }
        CartAction::Remove { line_id } => {
            if !cart.remove(line_id) {
                bail!("No cart line with id {line_id}");
            }
        }
        CartAction::Clear => cart.clear(),
        CartAction::Export => {
            let items = cart.export_for_checkout();
            return emit(cli, &items, |f| f.format_checkout_lines(&items));
        }
    }

    let view = cart.read();
    let pricing = Pricing::from_store(&app.currency());
    let output = JsonFormatter::new(cli.pretty).cart_output(&view, &pricing);
    emit(cli, &output, |f| f.format_cart(&view, &pricing))
}
