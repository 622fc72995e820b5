//! Product entity types and catalog ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::Price;

/// A catalog product.
///
/// The identifier and `created_at` are assigned by the persistence backend
/// when the product is first written; `updated_at` is absent until the first
/// update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend-assigned unique identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Price, assumed non-negative (not validated here).
    pub price: Price,
    /// Image URI.
    pub image: String,
    /// Optional long description.
    pub description: Option<String>,
    /// When the product was created (backend-assigned).
    pub created_at: DateTime<Utc>,
    /// When the product was last updated, if ever.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A product that has not been persisted yet.
///
/// No identifier and no timestamps; both are assigned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub image: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A partial update to a product.
///
/// Every field is optional; omitted fields keep their prior stored values
/// when the patch is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProductPatch {
    /// Merge this patch into a prior product state.
    ///
    /// Patch fields win; omitted fields fall back to the prior values. The
    /// `updated_at` timestamp is always refreshed to `now`, even for an
    /// empty patch.
    #[must_use]
    pub fn apply_to(&self, prior: &Product, now: DateTime<Utc>) -> Product {
        Product {
            id: prior.id.clone(),
            name: self.name.clone().unwrap_or_else(|| prior.name.clone()),
            price: self.price.unwrap_or(prior.price),
            image: self.image.clone().unwrap_or_else(|| prior.image.clone()),
            description: self
                .description
                .clone()
                .or_else(|| prior.description.clone()),
            created_at: prior.created_at,
            updated_at: Some(now),
        }
    }

    /// Whether the patch carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.image.is_none()
            && self.description.is_none()
    }
}

// =============================================================================
// Catalog Ordering
// =============================================================================

/// Sort options for the product listing.
///
/// [`SortOption::Newest`] (creation time descending) is the default and the
/// fallback for any unrecognized input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
}

impl SortOption {
    /// Parse a sort option from a query-string value.
    ///
    /// Unrecognized or missing values fall back to the default.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("name_asc") => Self::NameAsc,
            Some("name_desc") => Self::NameDesc,
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            _ => Self::Newest,
        }
    }

    /// The backend order-by clause for this sort option.
    #[must_use]
    pub const fn order_by(self) -> ProductOrder {
        match self {
            Self::NameAsc => ProductOrder::new(OrderField::Name, OrderDirection::Ascending),
            Self::NameDesc => ProductOrder::new(OrderField::Name, OrderDirection::Descending),
            Self::PriceAsc => ProductOrder::new(OrderField::Price, OrderDirection::Ascending),
            Self::PriceDesc => ProductOrder::new(OrderField::Price, OrderDirection::Descending),
            Self::Newest => ProductOrder::new(OrderField::CreatedAt, OrderDirection::Descending),
        }
    }
}

/// A product field the backend can order a collection query by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Name,
    Price,
    CreatedAt,
}

impl OrderField {
    /// The stored field path for this order field.
    #[must_use]
    pub const fn field_path(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::CreatedAt => "createdAt",
        }
    }
}

/// Direction of a backend order-by clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// An order-by clause for a product collection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductOrder {
    pub field: OrderField,
    pub direction: OrderDirection,
}

impl ProductOrder {
    /// Create a new order-by clause.
    #[must_use]
    pub const fn new(field: OrderField, direction: OrderDirection) -> Self {
        Self { field, direction }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new("p-1"),
            name: "Apple".to_owned(),
            price: Price::from(10),
            image: "https://example.com/apple.jpg".to_owned(),
            description: Some("Fresh red apples from the orchard.".to_owned()),
            created_at: "2026-01-01T00:00:00Z".parse().unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_sort_option_parse_known_values() {
        assert_eq!(SortOption::parse(Some("name_asc")), SortOption::NameAsc);
        assert_eq!(SortOption::parse(Some("name_desc")), SortOption::NameDesc);
        assert_eq!(SortOption::parse(Some("price_asc")), SortOption::PriceAsc);
        assert_eq!(SortOption::parse(Some("price_desc")), SortOption::PriceDesc);
        assert_eq!(SortOption::parse(Some("newest")), SortOption::Newest);
    }

    #[test]
    fn test_sort_option_parse_falls_back_to_default() {
        assert_eq!(SortOption::parse(None), SortOption::Newest);
        assert_eq!(SortOption::parse(Some("")), SortOption::Newest);
        assert_eq!(SortOption::parse(Some("by_color")), SortOption::Newest);
    }

    #[test]
    fn test_default_orders_by_creation_time_descending() {
        let order = SortOption::default().order_by();
        assert_eq!(order.field, OrderField::CreatedAt);
        assert_eq!(order.direction, OrderDirection::Descending);
    }

    #[test]
    fn test_patch_merges_over_prior_values() {
        let prior = sample_product();
        let patch = ProductPatch {
            price: Some(Price::from(12)),
            ..ProductPatch::default()
        };
        let now = "2026-02-01T00:00:00Z".parse().unwrap();

        let merged = patch.apply_to(&prior, now);
        assert_eq!(merged.price, Price::from(12));
        assert_eq!(merged.name, prior.name);
        assert_eq!(merged.image, prior.image);
        assert_eq!(merged.description, prior.description);
        assert_eq!(merged.created_at, prior.created_at);
        assert_eq!(merged.updated_at, Some(now));
    }

    #[test]
    fn test_empty_patch_still_refreshes_updated_at() {
        let prior = sample_product();
        let now = "2026-02-01T00:00:00Z".parse().unwrap();

        let merged = ProductPatch::default().apply_to(&prior, now);
        assert_eq!(merged.name, prior.name);
        assert_eq!(merged.updated_at, Some(now));
    }
}
