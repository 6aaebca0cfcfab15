//! Client for the remote store backend (`/inventory` and `/cart`).
//!
//! The server owns canonical state; every operation here round-trips. The
//! cart algorithms (merge-on-add, clamp-to-delete, sequential checkout) live
//! as provided methods on [`StoreService`] so fakes share them in tests.
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{clean_content, CartItem, InventoryItem};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server error {status}: {body}")]
    Server { status: StatusCode, body: String },
    #[error("invalid request URL: {0}")]
    Url(String),
    #[error("checkout stopped after removing {} item(s): {source}", .removed.len())]
    Checkout {
        /// Ids deleted before the failing round-trip, in deletion order.
        removed: Vec<i64>,
        #[source]
        source: Box<StoreError>,
    },
}

/// Remote cart/inventory operations. The five required methods map one-to-one
/// onto the backend endpoints; the provided methods carry the client-side
/// semantics and are what the controller calls.
#[async_trait]
pub trait StoreService: Send + Sync {
    async fn get_inventory(&self) -> Result<Vec<InventoryItem>, StoreError>;

    async fn get_cart(&self) -> Result<Vec<CartItem>, StoreError>;

    async fn create_cart_item(&self, item: &CartItem) -> Result<(), StoreError>;

    async fn set_cart_amount(&self, id: i64, amount: i64) -> Result<(), StoreError>;

    /// Deleting an id the server no longer has is tolerated; the server
    /// decides, the caller treats success as success.
    async fn delete_from_cart(&self, id: i64) -> Result<(), StoreError>;

    /// Stage `quantity` of an inventory item. Non-positive quantities are a
    /// silent no-op (no network call). An entry already in the cart has its
    /// amount increased instead of being duplicated; a new entry is created
    /// with cleaned content.
    async fn add_to_cart(&self, item: &InventoryItem, quantity: i64) -> Result<(), StoreError> {
        if quantity <= 0 {
            return Ok(());
        }
        let cart = self.get_cart().await?;
        match cart.iter().find(|entry| entry.id == item.id) {
            Some(existing) => self.update_cart(item.id, existing.amount + quantity).await,
            None => {
                self.create_cart_item(&CartItem {
                    id: item.id,
                    content: clean_content(&item.content),
                    amount: quantity,
                })
                .await
            }
        }
    }

    /// Persist a new amount. Amounts at or below zero clamp to deletion; a
    /// zero-amount record is never stored.
    async fn update_cart(&self, id: i64, new_amount: i64) -> Result<(), StoreError> {
        if new_amount <= 0 {
            self.delete_from_cart(id).await
        } else {
            self.set_cart_amount(id, new_amount).await
        }
    }

    /// Clear the cart, one delete per entry, sequentially. Best-effort, not
    /// transactional: the first failure stops the sequence and
    /// [`StoreError::Checkout`] names the ids already removed. On success
    /// returns the removed ids.
    async fn checkout(&self) -> Result<Vec<i64>, StoreError> {
        let cart = self.get_cart().await?;
        let mut removed = Vec::with_capacity(cart.len());
        for item in cart {
            if let Err(err) = self.delete_from_cart(item.id).await {
                return Err(StoreError::Checkout {
                    removed,
                    source: Box::new(err),
                });
            }
            removed.push(item.id);
        }
        Ok(removed)
    }
}

/// HTTP implementation over reqwest. No timeout, no retry: a hung call
/// suspends only the command that issued it.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: Client,
    base_url: Url,
}

impl StoreClient {
    pub fn new(base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("shopcart/0.1")
            .build()
            .expect("reqwest client");
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|err| StoreError::Url(err.to_string()))
    }

    fn build_create_request(&self, item: &CartItem) -> Result<reqwest::Request, StoreError> {
        Ok(self
            .http
            .post(self.endpoint("cart")?)
            .json(item)
            .build()?)
    }

    fn build_set_amount_request(
        &self,
        id: i64,
        amount: i64,
    ) -> Result<reqwest::Request, StoreError> {
        Ok(self
            .http
            .patch(self.endpoint(&format!("cart/{id}"))?)
            .json(&json!({ "amount": amount }))
            .build()?)
    }

    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, StoreError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "store request");
        let res = self.http.execute(request).await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%method, %url, %status, "store API error: {}", body);
            return Err(StoreError::Server { status, body });
        }
        Ok(res)
    }
}

#[async_trait]
impl StoreService for StoreClient {
    async fn get_inventory(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let request = self.http.get(self.endpoint("inventory")?).build()?;
        let res = self.execute(request).await?;
        Ok(res.json().await?)
    }

    async fn get_cart(&self) -> Result<Vec<CartItem>, StoreError> {
        let request = self.http.get(self.endpoint("cart")?).build()?;
        let res = self.execute(request).await?;
        Ok(res.json().await?)
    }

    async fn create_cart_item(&self, item: &CartItem) -> Result<(), StoreError> {
        let request = self.build_create_request(item)?;
        self.execute(request).await?;
        Ok(())
    }

    async fn set_cart_amount(&self, id: i64, amount: i64) -> Result<(), StoreError> {
        let request = self.build_set_amount_request(id, amount)?;
        self.execute(request).await?;
        Ok(())
    }

    async fn delete_from_cart(&self, id: i64) -> Result<(), StoreError> {
        let request = self
            .http
            .delete(self.endpoint(&format!("cart/{id}"))?)
            .build()?;
        self.execute(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StoreClient {
        StoreClient::new(Url::parse("http://localhost:3000").unwrap())
    }

    fn body_json(request: &reqwest::Request) -> serde_json::Value {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn endpoints_join_against_base() {
        let client = client();
        assert_eq!(
            client.endpoint("inventory").unwrap().as_str(),
            "http://localhost:3000/inventory"
        );
        assert_eq!(
            client.endpoint("cart/7").unwrap().as_str(),
            "http://localhost:3000/cart/7"
        );
    }

    #[test]
    fn create_request_posts_full_record() {
        let client = client();
        let request = client
            .build_create_request(&CartItem {
                id: 3,
                content: "Widget".into(),
                amount: 2,
            })
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().path(), "/cart");
        assert_eq!(
            body_json(&request),
            json!({"id": 3, "content": "Widget", "amount": 2})
        );
    }

    #[test]
    fn set_amount_request_patches_amount_only() {
        let client = client();
        let request = client.build_set_amount_request(9, 4).unwrap();
        assert_eq!(request.method(), reqwest::Method::PATCH);
        assert_eq!(request.url().path(), "/cart/9");
        assert_eq!(body_json(&request), json!({"amount": 4}));
    }

    #[test]
    fn checkout_error_names_removed_prefix() {
        let err = StoreError::Checkout {
            removed: vec![1, 2],
            source: Box::new(StoreError::Server {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".into(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("2 item(s)"), "unexpected message: {msg}");
    }
}
