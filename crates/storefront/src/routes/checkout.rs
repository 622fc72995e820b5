//! Checkout route handlers.
//!
//! Checkout is a summary of a single product for the logged-in buyer; there
//! is no cart and no payment capture.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use orchard_core::{Price, Product, ProductId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// What the checkout page renders from.
#[derive(Debug, Serialize)]
pub struct CheckoutSummary {
    pub product: Product,
    /// Price for a single unit; quantity is chosen client-side.
    pub total: Price,
    /// Email the order confirmation would go to.
    pub buyer_email: String,
}

/// `GET /checkout/{id}` - checkout summary for one product.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<CheckoutSummary>> {
    let product = state.products().fetch_product_by_id(&id).await?;

    Ok(Json(CheckoutSummary {
        total: product.price,
        buyer_email: user.email.as_str().to_owned(),
        product,
    }))
}
