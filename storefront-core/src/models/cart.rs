//! Cart types.
//!
//! [`CartSnapshot`] holds the merge-on-add rules; stores wrap it with
//! persistence. Totals are always derived from the lines, never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::product::ProductRef;

// ============================================================================
// Line Types
// ============================================================================

/// A chosen variant option (size or color).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSelection {
    /// Option id.
    pub id: u64,
    /// Display label, e.g. "XL" or "Black".
    pub label: String,
}

impl VariantSelection {
    /// Creates a variant selection.
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// One row in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Locally generated line id (not the product id).
    pub id: String,
    /// Product data captured at insertion time.
    pub product: ProductRef,
    /// Quantity, always at least 1.
    pub quantity: u32,
    /// Selected size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<VariantSelection>,
    /// Selected color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<VariantSelection>,
}

impl CartLine {
    /// Returns the size id, if a size was selected.
    pub fn size_id(&self) -> Option<u64> {
        self.size.as_ref().map(|s| s.id)
    }

    /// Returns `price × quantity` for this line.
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    /// Returns true if this line holds the given product/size pair.
    ///
    /// Color is not part of line identity.
    fn matches(&self, product_id: u64, size_id: Option<u64>) -> bool {
        self.product.id == product_id && self.size_id() == size_id
    }
}

/// An add-to-cart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    /// Product to add.
    pub product: ProductRef,
    /// Quantity to add.
    pub quantity: u32,
    /// Selected size.
    pub size: Option<VariantSelection>,
    /// Selected color.
    pub color: Option<VariantSelection>,
}

impl NewCartLine {
    /// Creates a request for `quantity` units with no variant selection.
    pub fn new(product: ProductRef, quantity: u32) -> Self {
        Self {
            product,
            quantity,
            size: None,
            color: None,
        }
    }

    /// Sets the size selection.
    #[must_use]
    pub fn with_size(mut self, size: VariantSelection) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the color selection.
    #[must_use]
    pub fn with_color(mut self, color: VariantSelection) -> Self {
        self.color = Some(color);
        self
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// The persisted form of the cart: an ordered list of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Finds a line by id.
    pub fn line(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Adds an item, merging into an existing line with the same
    /// product and size.
    ///
    /// Returns the id of the line that was created or grown, or `None` if
    /// the request had a zero quantity and nothing changed.
    pub fn add(&mut self, item: NewCartLine) -> Option<String> {
        if item.quantity == 0 {
            return None;
        }

        let size_id = item.size.as_ref().map(|s| s.id);
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(item.product.id, size_id))
        {
            line.quantity = line.quantity.saturating_add(item.quantity);
            return Some(line.id.clone());
        }

        let id = self.fresh_id();
        self.lines.push(CartLine {
            id: id.clone(),
            product: item.product,
            quantity: item.quantity,
            size: item.size,
            color: item.color,
        });
        Some(id)
    }

    /// Sets a line's quantity. Quantities below 1 and unknown ids are
    /// ignored. Returns true if the cart changed.
    pub fn update_quantity(&mut self, id: &str, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }
        match self.lines.iter_mut().find(|l| l.id == id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Removes a line. Returns true if a line was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        self.lines.len() != before
    }

    /// Removes every line. Returns true if the cart was non-empty.
    pub fn clear(&mut self) -> bool {
        let changed = !self.lines.is_empty();
        self.lines.clear();
        changed
    }

    /// Sum of `price × quantity` over all lines.
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Sum of quantities over all lines.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Returns the lines together with derived totals.
    pub fn view(&self) -> CartView {
        CartView {
            lines: self.lines.clone(),
            total_price: self.total_price(),
            total_quantity: self.total_quantity(),
        }
    }

    /// Returns the lines in the shape the order API expects.
    pub fn checkout_lines(&self) -> Vec<CheckoutLine> {
        self.lines.iter().map(CheckoutLine::from).collect()
    }

    /// Checks the invariants a persisted snapshot must satisfy.
    ///
    /// A snapshot is well formed when every quantity is at least 1, line ids
    /// are unique and non-empty, and no two lines share a product/size pair.
    pub fn is_well_formed(&self) -> bool {
        let mut ids = HashSet::new();
        let mut pairs = HashSet::new();
        self.lines.iter().all(|l| {
            l.quantity >= 1
                && !l.id.is_empty()
                && ids.insert(l.id.as_str())
                && pairs.insert((l.product.id, l.size_id()))
        })
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.line(&id).is_none() {
                return id;
            }
        }
    }
}

// ============================================================================
// Read Models
// ============================================================================

/// The cart as presented: lines plus derived totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
    /// Sum of line subtotals in the base currency.
    pub total_price: Decimal,
    /// Sum of line quantities.
    pub total_quantity: u64,
}

/// One line as handed to the order-placement API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    /// Catalogue product id.
    pub product_id: u64,
    /// Product name at time of checkout.
    pub name: String,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price in the base currency.
    pub unit_price: Decimal,
    /// Selected size id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_id: Option<u64>,
    /// Selected color id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<u64>,
}

impl From<&CartLine> for CheckoutLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            name: line.product.name.clone(),
            quantity: line.quantity,
            unit_price: line.product.price,
            size_id: line.size_id(),
            color_id: line.color.as_ref().map(|c| c.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64, price: i64) -> ProductRef {
        ProductRef::new(id, format!("Product {id}"), format!("product-{id}"), Decimal::from(price))
    }

    #[test]
    fn test_add_merges_same_product_and_size() {
        let mut cart = CartSnapshot::new();
        let first = cart.add(NewCartLine::new(product(10, 500), 2)).unwrap();
        let second = cart.add(NewCartLine::new(product(10, 500), 3)).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.total_price(), Decimal::from(2500));
    }

    #[test]
    fn test_different_size_creates_new_line() {
        let mut cart = CartSnapshot::new();
        cart.add(NewCartLine::new(product(1, 100), 1).with_size(VariantSelection::new(1, "S")));
        cart.add(NewCartLine::new(product(1, 100), 1).with_size(VariantSelection::new(2, "M")));
        cart.add(NewCartLine::new(product(1, 100), 1));

        assert_eq!(cart.len(), 3);
        let ids: HashSet<_> = cart.lines().iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_color_does_not_split_lines() {
        let mut cart = CartSnapshot::new();
        cart.add(NewCartLine::new(product(1, 100), 1).with_color(VariantSelection::new(1, "Red")));
        cart.add(NewCartLine::new(product(1, 100), 1).with_color(VariantSelection::new(2, "Blue")));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        // The first color selection is kept.
        assert_eq!(cart.lines()[0].color.as_ref().map(|c| c.id), Some(1));
    }

    #[test]
    fn test_zero_quantity_add_is_ignored() {
        let mut cart = CartSnapshot::new();
        assert!(cart.add(NewCartLine::new(product(1, 100), 0)).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_rules() {
        let mut cart = CartSnapshot::new();
        let a = cart.add(NewCartLine::new(product(1, 100), 1)).unwrap();
        let b = cart.add(NewCartLine::new(product(2, 100), 4)).unwrap();
        let before = cart.clone();

        assert!(!cart.update_quantity(&a, 0));
        assert!(!cart.update_quantity("missing", 3));
        assert_eq!(cart, before);

        assert!(cart.update_quantity(&a, 7));
        assert_eq!(cart.line(&a).unwrap().quantity, 7);
        assert_eq!(cart.line(&b).unwrap().quantity, 4);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = CartSnapshot::new();
        let a = cart.add(NewCartLine::new(product(1, 100), 1)).unwrap();
        cart.add(NewCartLine::new(product(2, 50), 2));

        assert!(cart.remove(&a));
        assert!(!cart.remove(&a));
        assert_eq!(cart.len(), 1);

        assert!(cart.clear());
        assert!(!cart.clear());
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_checkout_lines_preserve_order() {
        let mut cart = CartSnapshot::new();
        cart.add(NewCartLine::new(product(3, 10), 1));
        cart.add(
            NewCartLine::new(product(1, 20), 2)
                .with_size(VariantSelection::new(9, "L"))
                .with_color(VariantSelection::new(4, "Green")),
        );

        let lines = cart.checkout_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id, 3);
        assert_eq!(lines[1].size_id, Some(9));
        assert_eq!(lines[1].color_id, Some(4));
        assert_eq!(lines[1].unit_price, Decimal::from(20));
    }

    #[test]
    fn test_well_formed_checks() {
        let mut cart = CartSnapshot::new();
        cart.add(NewCartLine::new(product(1, 10), 1));
        assert!(cart.is_well_formed());

        let mut dup = cart.clone();
        dup.lines.push(dup.lines[0].clone());
        assert!(!dup.is_well_formed());

        let mut zero = cart.clone();
        zero.lines[0].quantity = 0;
        assert!(!zero.is_well_formed());
    }
}
