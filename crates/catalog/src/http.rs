//! HTTP catalog source (`GET {base}/products`, `GET {base}/products/{id}`).

use async_trait::async_trait;
use reqwest::StatusCode;
use storefront_core::ProductId;

use crate::product::Product;
use crate::record::{ProductRecord, products_from_values};
use crate::source::{CatalogError, CatalogSource};

/// Catalog source backed by a REST products API.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "fetching from catalog");
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError> {
        let resp = self.get("/products").await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(CatalogError::Api(status, resp.text().await.unwrap_or_default()));
        }

        // Elements are decoded one by one; only a non-array body is fatal.
        let values: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(products_from_values(values))
    }

    async fn fetch_one(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let resp = self.get(&format!("/products/{id}")).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(CatalogError::Api(status, resp.text().await.unwrap_or_default()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        parse_single(&body)
    }
}

/// Some catalogs answer an unknown id with `200` and an empty or `null` body.
fn parse_single(body: &str) -> Result<Option<Product>, CatalogError> {
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Ok(None);
    }

    let record: ProductRecord =
        serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;
    record
        .into_product()
        .map(Some)
        .map_err(|e| CatalogError::Parse(e.to_string()))
}
