//! Product catalog store.
//!
//! Holds the most recent catalog listing in memory and delegates persistence
//! to the configured backend. Search filtering happens here rather than in
//! the backend so both backends behave identically.

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::instrument;

use orchard_core::{NewProduct, Product, ProductId, ProductPatch, SortOption};

use crate::backend::SharedBackend;

use super::StoreError;

pub struct ProductStore {
    backend: SharedBackend,
    /// The last listing fetched, kept for id lookups between refreshes.
    products: RwLock<Vec<Product>>,
}

impl ProductStore {
    #[must_use]
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            products: RwLock::new(Vec::new()),
        }
    }

    /// Fetch the catalog, ordered by `sort` and optionally filtered by a
    /// case-insensitive substring match on the product name.
    ///
    /// The unfiltered result replaces the cached listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BackendUnavailable`] if the backend cannot be
    /// reached or returns malformed data.
    #[instrument(skip(self))]
    pub async fn fetch_products(
        &self,
        search: Option<&str>,
        sort: SortOption,
    ) -> Result<Vec<Product>, StoreError> {
        let listing = self.backend.list_products(sort.order_by()).await?;

        *self.products.write().await = listing.clone();

        let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(listing);
        };
        let needle = needle.to_lowercase();

        Ok(listing
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Fetch a single product, consulting the cached listing before going to
    /// the backend.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no product has this id.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn fetch_product_by_id(&self, id: &ProductId) -> Result<Product, StoreError> {
        if let Some(product) = self
            .products
            .read()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned()
        {
            return Ok(product);
        }

        self.backend
            .get_product(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("no product with id {id}")))
    }

    /// Create a product. The backend assigns the id and creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] if the submission fails
    /// validation.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn add_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        validate_submission(&new.name, new.price.amount(), &new.image)?;

        let product = self.backend.create_product(new).await?;
        // Optimistic: newest entry goes to the front, no re-fetch
        self.products.write().await.insert(0, product.clone());

        Ok(product)
    }

    /// Apply a partial update to an existing product. Absent patch fields
    /// keep their prior values; the id and creation timestamp never change.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no product has this id, or
    /// [`StoreError::InvalidArgument`] if the merged product fails validation.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, StoreError> {
        let prior = self
            .backend
            .get_product(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("no product with id {id}")))?;

        let updated = patch.apply_to(&prior, chrono::Utc::now());
        validate_submission(&updated.name, updated.price.amount(), &updated.image)?;

        self.backend.set_product(&updated).await?;

        let mut products = self.products.write().await;
        if let Some(cached) = products.iter_mut().find(|p| &p.id == id) {
            *cached = updated.clone();
        }

        Ok(updated)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no product has this id. Deleting
    /// a missing product is an error, never a silent success.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        self.backend.delete_product(id).await.map_err(|e| {
            if matches!(e, crate::backend::BackendError::NotFound) {
                StoreError::NotFound(format!("no product with id {id}"))
            } else {
                e.into()
            }
        })?;

        self.products.write().await.retain(|p| &p.id != id);
        Ok(())
    }
}

fn validate_submission(name: &str, price: Decimal, image: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidArgument(
            "product name must not be empty".to_owned(),
        ));
    }
    // Zero is a valid price (free product); only negatives are rejected
    if price < Decimal::ZERO {
        return Err(StoreError::InvalidArgument(
            "product price must not be negative".to_owned(),
        ));
    }
    if image.trim().is_empty() {
        return Err(StoreError::InvalidArgument(
            "product image must not be empty".to_owned(),
        ));
    }
    Ok(())
}
