//! Text output formatting with colors.

use chrono::{Duration, Local};
use storefront_core::{
    CartView, CheckoutLine, HomeListings, ListingSlot, OrderReceipt, OrderState, OrderStatus,
    Product, RateTable,
};
use storefront_store::{FeedSource, Referral};

use super::Pricing;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

const RULE_WIDTH: usize = 40;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the cart with totals.
    pub fn format_cart(&self, view: &CartView, pricing: &Pricing) -> String {
        if view.lines.is_empty() {
            return self.dim("Your cart is empty");
        }

        let mut lines = vec![self.bold("Cart"), "─".repeat(RULE_WIDTH)];
        for line in &view.lines {
            let variant = [line.size.as_ref(), line.color.as_ref()]
                .into_iter()
                .flatten()
                .map(|v| v.label.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let name = if variant.is_empty() {
                line.product.name.clone()
            } else {
                format!("{} ({variant})", line.product.name)
            };

            lines.push(format!(
                "{:>3} × {:<28} {}",
                line.quantity,
                name,
                pricing.price(line.subtotal())
            ));
            lines.push(self.dim(&format!("      id {}", line.id)));
        }
        lines.push("─".repeat(RULE_WIDTH));
        lines.push(format!(
            "{} items   Total: {}",
            view.total_quantity,
            self.bold(&pricing.price(view.total_price))
        ));

        lines.join("\n")
    }

    /// Formats the checkout hand-off lines.
    pub fn format_checkout_lines(&self, items: &[CheckoutLine]) -> String {
        if items.is_empty() {
            return self.dim("Nothing to check out");
        }
        items
            .iter()
            .map(|item| {
                let size = item.size_id.map(|id| format!(" size={id}")).unwrap_or_default();
                let color = item.color_id.map(|id| format!(" color={id}")).unwrap_or_default();
                format!(
                    "{} × {} {} @ {}{size}{color}",
                    item.quantity, item.product_id, item.name, item.unit_price
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats the selection and the known rates.
    pub fn format_currency(&self, pricing: &Pricing, rates: &RateTable) -> String {
        let selected = pricing.code();
        let mut lines = vec![format!(
            "Currency: {} ({})",
            self.bold(selected.as_str()),
            rates.symbol_for(selected)
        )];

        if rates.is_empty() {
            lines.push(self.dim("No rates loaded; prices show in the base currency"));
            return lines.join("\n");
        }

        lines.push(String::new());
        for entry in rates.entries() {
            let marker = if entry.code == selected { "●" } else { " " };
            let default = if entry.is_default { self.dim(" default") } else { String::new() };
            lines.push(format!(
                "{marker} {:<4} {:<3} {}{default}",
                entry.code.as_str(),
                entry.symbol,
                entry.rate
            ));
        }
        lines.join("\n")
    }

    /// Formats the home listings.
    pub fn format_listings(
        &self,
        listings: &HomeListings,
        source: FeedSource,
        age: Option<Duration>,
        pricing: &Pricing,
    ) -> String {
        let origin = match (source, age) {
            (FeedSource::Cache, Some(age)) => format!("cached {}s ago", age.num_seconds().max(0)),
            (FeedSource::Stale, _) => self.yellow("stale, refresh failed"),
            (other, _) => other.to_string(),
        };
        let mut lines = vec![format!("{} ({origin})", self.bold("Home"))];

        for slot in ListingSlot::all() {
            let payload = listings.get(*slot);
            lines.push(String::new());
            lines.push(format!("{} {}", self.cyan(slot.title()), self.dim(&format!("({})", payload.len()))));
            for banner in payload.banners() {
                lines.push(format!("  {}", banner.title));
            }
            for product in payload.products() {
                let stock = if product.in_stock { String::new() } else { self.red(" sold out") };
                lines.push(format!(
                    "  {:<30} {}{stock}",
                    product.name,
                    pricing.price(product.price)
                ));
            }
        }
        lines.join("\n")
    }

    /// Formats a product page with its variant ids.
    pub fn format_product(&self, product: &Product, pricing: &Pricing) -> String {
        let summary = &product.summary;
        let mut price = pricing.price(summary.price);
        if let Some(was) = summary.compare_at_price.filter(|was| *was > summary.price) {
            price = format!("{price} {}", self.dim(&format!("was {}", pricing.price(was))));
        }

        let mut lines = vec![
            format!("{} {}", self.bold(&summary.name), self.dim(&format!("#{}", summary.id))),
            format!("Price:   {price}"),
        ];
        if !summary.in_stock {
            lines.push(self.red("Sold out"));
        }
        if !product.sizes.is_empty() {
            let sizes: Vec<String> = product.sizes.iter().map(|s| format!("{}={}", s.id, s.label)).collect();
            lines.push(format!("Sizes:   {}", sizes.join("  ")));
        }
        if !product.colors.is_empty() {
            let colors: Vec<String> = product.colors.iter().map(|c| format!("{}={}", c.id, c.label)).collect();
            lines.push(format!("Colors:  {}", colors.join("  ")));
        }
        if !product.description.is_empty() {
            lines.push(String::new());
            lines.push(product.description.clone());
        }
        lines.join("\n")
    }

    /// Formats an order confirmation.
    pub fn format_receipt(&self, receipt: &OrderReceipt, pricing: &Pricing) -> String {
        let mut lines = vec![format!("{} {}", self.green("Order placed:"), self.bold(&receipt.reference))];
        if let Some(total) = receipt.total {
            lines.push(format!("Total:   {}", pricing.price(total)));
        }
        if let Some(url) = &receipt.payment_url {
            lines.push(format!("Pay at:  {url}"));
        }
        lines.join("\n")
    }

    /// Formats order tracking.
    pub fn format_order_status(&self, status: &OrderStatus, pricing: &Pricing) -> String {
        let state = status.state.to_string();
        let state = match status.state {
            OrderState::Delivered => self.green(&state),
            OrderState::Cancelled | OrderState::Unknown => self.red(&state),
            _ => self.yellow(&state),
        };

        let mut lines = vec![format!("Order {}: {state}", self.bold(&status.reference))];
        if let Some(placed) = status.placed_at {
            lines.push(format!("Placed:  {}", placed.with_timezone(&Local).format("%Y-%m-%d %H:%M")));
        }
        lines.push(format!("Items:   {}", status.item_count));
        if let Some(total) = status.total {
            lines.push(format!("Total:   {}", pricing.price(total)));
        }
        lines.join("\n")
    }

    /// Formats the captured referral.
    pub fn format_referral(&self, referral: Option<&Referral>) -> String {
        match referral {
            Some(r) => {
                let reported = if r.reported { "reported" } else { "not yet reported" };
                format!(
                    "Referral {} captured {} ({reported})",
                    self.bold(&r.code),
                    r.captured_at.with_timezone(&Local).format("%Y-%m-%d")
                )
            }
            None => self.dim("No active referral"),
        }
    }

    // ========================================================================
    // Color Helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

// ============================================================================
// Tests
// ============================================================================
