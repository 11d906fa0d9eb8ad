//! Product and banner types.
//!
//! API product records are mapped into these strict types the moment they
//! are received; nothing downstream sees raw JSON.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::cart::VariantSelection;
use super::raw::{
    array_items, as_object, images, opt_bool, opt_image, opt_str, opt_u64, req_decimal, req_str,
    req_u64, unwrap_envelope, RawObject,
};
use crate::error::CoreError;

// ============================================================================
// Product Reference
// ============================================================================

/// The product data a cart line carries.
///
/// This is a frozen copy taken at add-to-cart time; the cart never
/// re-reads the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Catalogue product id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Unit price in the base currency.
    pub price: Decimal,
    /// Primary image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductRef {
    /// Creates a product reference with no image.
    pub fn new(id: u64, name: impl Into<String>, slug: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            price,
            image: None,
        }
    }

    /// Sets the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

// ============================================================================
// Product Summary (listing rows)
// ============================================================================

/// A product as shown in a listing grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Catalogue product id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Current price in the base currency.
    pub price: Decimal,
    /// Price before discount, when the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Decimal>,
    /// Primary image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Whether the product can currently be ordered.
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

fn default_true() -> bool {
    true
}

impl ProductSummary {
    /// Maps one raw API product record.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` when the record lacks an id, name or price.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let obj = as_object(value, "product")?;
        Self::from_object(obj)
    }

    fn from_object(obj: &RawObject) -> Result<Self, CoreError> {
        let id = req_u64(obj, &["id", "_id", "product_id"])?;
        let name = req_str(obj, &["name", "title"])?;
        let slug = opt_str(obj, &["slug"]).unwrap_or_else(|| slugify(&name));
        let price = req_decimal(obj, &["price", "selling_price", "amount"])?;
        let compare_at_price = super::raw::opt_decimal(obj, &["compare_at_price", "old_price"])
            .filter(|old| *old > price);
        let image = opt_image(obj, &["image", "thumbnail", "images"]);
        let in_stock = opt_bool(obj, &["in_stock", "available"])
            .or_else(|| opt_u64(obj, &["stock", "quantity"]).map(|q| q > 0))
            .unwrap_or(true);

        Ok(Self {
            id,
            name,
            slug,
            price,
            compare_at_price,
            image,
            in_stock,
        })
    }

    /// Maps an array payload, dropping malformed rows.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` only when the payload itself is not an array.
    pub fn list_from_json(value: Value) -> Result<Vec<Self>, CoreError> {
        Ok(array_items(value)?
            .iter()
            .filter_map(|item| match Self::from_json(item) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed product record");
                    None
                }
            })
            .collect())
    }

    /// Returns the reference a cart line stores for this product.
    pub fn to_ref(&self) -> ProductRef {
        ProductRef {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}

// ============================================================================
// Product Detail
// ============================================================================

/// A full product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Listing-level fields.
    #[serde(flatten)]
    pub summary: ProductSummary,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// All image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Selectable sizes.
    #[serde(default)]
    pub sizes: Vec<VariantSelection>,
    /// Selectable colors.
    #[serde(default)]
    pub colors: Vec<VariantSelection>,
}

impl Product {
    /// Maps a raw product detail payload.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` when required product fields are missing.
    pub fn from_json(value: Value) -> Result<Self, CoreError> {
        let value = unwrap_envelope(value);
        let obj = as_object(&value, "product")?;
        let summary = ProductSummary::from_object(obj)?;

        Ok(Self {
            description: opt_str(obj, &["description"]).unwrap_or_default(),
            images: images(obj, "images"),
            sizes: variants(obj, "sizes"),
            colors: variants(obj, "colors"),
            summary,
        })
    }

    /// Finds a size option by id.
    pub fn size(&self, id: u64) -> Option<&VariantSelection> {
        self.sizes.iter().find(|s| s.id == id)
    }

    /// Finds a color option by id.
    pub fn color(&self, id: u64) -> Option<&VariantSelection> {
        self.colors.iter().find(|c| c.id == id)
    }
}

fn variants(obj: &RawObject, key: &str) -> Vec<VariantSelection> {
    let Some(Value::Array(items)) = obj.get(key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|o| {
            Some(VariantSelection {
                id: opt_u64(o, &["id", "_id"])?,
                label: opt_str(o, &["label", "name", "value"])?,
            })
        })
        .collect()
}

// ============================================================================
// Banner
// ============================================================================

/// A home-page hero banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    /// Banner id.
    pub id: u64,
    /// Headline text.
    #[serde(default)]
    pub title: String,
    /// Image URL.
    pub image: String,
    /// Click-through target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Banner {
    /// Maps one raw banner record.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` when the record lacks an id or image.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let obj = as_object(value, "banner")?;
        Ok(Self {
            id: req_u64(obj, &["id", "_id"])?,
            title: opt_str(obj, &["title", "heading"]).unwrap_or_default(),
            image: opt_image(obj, &["image", "image_url", "images"])
                .ok_or(CoreError::MissingField("image"))?,
            link: opt_str(obj, &["link", "url", "href"]),
        })
    }

    /// Maps an array payload, dropping malformed rows.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` only when the payload itself is not an array.
    pub fn list_from_json(value: Value) -> Result<Vec<Self>, CoreError> {
        Ok(array_items(value)?
            .iter()
            .filter_map(|item| match Self::from_json(item) {
                Ok(banner) => Some(banner),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed banner record");
                    None
                }
            })
            .collect())
    }
}

/// Derives a URL slug from a product name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
