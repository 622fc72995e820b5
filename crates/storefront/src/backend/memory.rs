//! In-memory mock backend.
//!
//! Keeps every collection in a `RwLock<HashMap>` behind the same [`Backend`]
//! contract as the hosted variant. Passwords are argon2-hashed even here;
//! the mock exists to swap out the network, not the security model.

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use orchard_core::{
    Account, Email, NewProduct, OrderDirection, OrderField, Price, Product, ProductId,
    ProductOrder, UserId, UserProfile,
};

use super::{Backend, BackendError};

/// A mock auth-service account.
#[derive(Debug, Clone)]
struct MockAccount {
    id: UserId,
    email: Email,
    password_hash: String,
}

/// In-memory mock backend.
///
/// Document ids are UUID v4 strings, assigned at write time like the hosted
/// backend assigns document names.
#[derive(Default)]
pub struct MemoryBackend {
    products: RwLock<HashMap<ProductId, Product>>,
    accounts: RwLock<HashMap<String, MockAccount>>,
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl MemoryBackend {
    /// Create an empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock backend seeded with the sample catalog.
    #[must_use]
    pub fn seeded() -> Self {
        let now = Utc::now();

        let seed = [
            (
                "Apple",
                10,
                "https://images.orchard.dev/apple.jpg",
                "Fresh red apples from the orchard. Crisp and sweet, perfect for snacks and baking.",
                TimeDelta::minutes(2),
            ),
            (
                "Banana",
                8,
                "https://images.orchard.dev/banana.jpg",
                "Ripe bananas, high in potassium. Great for smoothies and quick energy.",
                TimeDelta::minutes(1),
            ),
        ];

        let mut products = HashMap::new();
        for (name, price, image, description, age) in seed {
            let id = ProductId::new(Uuid::new_v4().to_string());
            products.insert(
                id.clone(),
                Product {
                    id,
                    name: name.to_owned(),
                    price: Price::from(price),
                    image: image.to_owned(),
                    description: Some(description.to_owned()),
                    created_at: now - age,
                    updated_at: None,
                },
            );
        }

        Self {
            products: RwLock::new(products),
            ..Self::default()
        }
    }

    /// Mock-variant helper: pure lookup-and-compare, no side effects.
    pub async fn check_valid_credentials(&self, email: &Email, password: &str) -> bool {
        let accounts = self.accounts.read().await;
        accounts
            .get(email.as_str())
            .is_some_and(|account| verify_password(password, &account.password_hash).is_ok())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_products(&self, order_by: ProductOrder) -> Result<Vec<Product>, BackendError> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();

        products.sort_by(|a, b| {
            let ordering = match order_by.field {
                OrderField::Name => a.name.cmp(&b.name),
                OrderField::Price => a.price.cmp(&b.price),
                OrderField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match order_by.direction {
                OrderDirection::Ascending => ordering,
                OrderDirection::Descending => ordering.reverse(),
            }
        });

        Ok(products)
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, BackendError> {
        let product = Product {
            id: ProductId::new(Uuid::new_v4().to_string()),
            name: new.name,
            price: new.price,
            image: new.image,
            description: new.description,
            created_at: Utc::now(),
            updated_at: None,
        };

        self.products
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn set_product(&self, product: &Product) -> Result<(), BackendError> {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError> {
        self.products
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(BackendError::NotFound)
    }

    async fn create_account(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Account, BackendError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email.as_str()) {
            return Err(BackendError::EmailExists);
        }

        let account = MockAccount {
            id: UserId::new(Uuid::new_v4().to_string()),
            email: email.clone(),
            password_hash: hash_password(password)?,
        };
        let public = Account {
            id: account.id.clone(),
            email: account.email.clone(),
        };
        accounts.insert(email.as_str().to_owned(), account);
        Ok(public)
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<Account, BackendError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(email.as_str())
            .ok_or(BackendError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        Ok(Account {
            id: account.id.clone(),
            email: account.email.clone(),
        })
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        // The mock auth service holds no session state to invalidate.
        Ok(())
    }

    async fn get_profile(&self, id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn set_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, BackendError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BackendError::Unavailable(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), BackendError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| BackendError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| BackendError::InvalidCredentials)
}
