//! PostgREST client for the hosted store.
//!
//! Speaks the Supabase flavour of PostgREST: `{url}/rest/v1/{table}`,
//! `apikey` plus bearer auth, `Prefer: return=representation` so writes
//! answer with the affected rows, and `id=eq.{id}` row filters.

use crate::config::StoreConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::store::{RemoteStore, Table};
use async_trait::async_trait;
use netmap_core::NetmapResult;
use netmap_model::{
    ConnectionFields, ConnectionRow, DeviceFields, DeviceRow, GroupFields, GroupRow,
    MappingFields, MappingRow,
};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

/// Client for a PostgREST-style hosted store.
#[derive(Clone)]
pub struct RestStore {
    base_url: String,
    api_key: String,
    schema: Option<String>,
    client: reqwest::Client,
}

impl RestStore {
    /// Create a client from validated settings.
    pub fn new(config: &StoreConfig) -> NetmapResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| netmap_core::NetmapError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            base_url: config.rest_base(),
            api_key: config.api_key.clone(),
            schema: config.schema.clone(),
            client,
        })
    }

    /// Get the REST base URL (`{url}/rest/v1`).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a table endpoint.
    pub fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.base_url, table.name())
    }

    /// Helper to add auth and profile headers to a request builder
    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key));
        if let Some(ref schema) = self.schema {
            builder = builder
                .header("Accept-Profile", schema)
                .header("Content-Profile", schema);
        }
        builder
    }

    /// Send a request and decode a JSON array of rows.
    async fn send_rows<R: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> GatewayResult<Vec<R>> {
        let response = builder.send().await.map_err(|e| {
            error!("Network error during {}: {}", what, e);
            GatewayError::Network(e.to_string())
        })?;

        debug!("{} response status: {}", what, response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            error!("HTTP error {} during {}: {}", status, what, text);
            return Err(GatewayError::Http(status, text));
        }

        response.json::<Vec<R>>().await.map_err(|e| {
            error!("Failed to parse {} response: {}", what, e);
            GatewayError::Decode(e.to_string())
        })
    }

    async fn select_all<R: DeserializeOwned>(&self, table: Table) -> GatewayResult<Vec<R>> {
        let rows: Vec<R> = self
            .send_rows(
                self.request(Method::GET, table).query(&[("select", "*")]),
                &format!("select {}", table),
            )
            .await?;
        info!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    async fn insert_one<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        table: Table,
        body: &B,
    ) -> GatewayResult<R> {
        info!("Inserting into {}: POST {}", table, self.table_url(table));
        let rows: Vec<R> = self
            .send_rows(
                self.request(Method::POST, table)
                    .header("Prefer", "return=representation")
                    .json(body),
                &format!("insert {}", table),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn update_one<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        table: Table,
        id: &str,
        body: &B,
    ) -> GatewayResult<R> {
        info!("Updating {} row {}", table, id);
        let rows: Vec<R> = self
            .send_rows(
                self.request(Method::PATCH, table)
                    .query(&[("id", format!("eq.{}", id))])
                    .header("Prefer", "return=representation")
                    .json(body),
                &format!("update {}", table),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::not_found(table.name(), id))
    }

    async fn delete_one(&self, table: Table, id: &str) -> GatewayResult<()> {
        info!("Deleting {} row {}", table, id);
        let rows: Vec<serde_json::Value> = self
            .send_rows(
                self.request(Method::DELETE, table)
                    .query(&[("id", format!("eq.{}", id))])
                    .header("Prefer", "return=representation"),
                &format!("delete {}", table),
            )
            .await?;
        if rows.is_empty() {
            return Err(GatewayError::not_found(table.name(), id));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn insert_device(&self, fields: &DeviceFields) -> GatewayResult<DeviceRow> {
        self.insert_one(Table::Devices, fields).await
    }

    async fn list_devices(&self) -> GatewayResult<Vec<DeviceRow>> {
        self.select_all(Table::Devices).await
    }

    async fn update_device(&self, id: &str, fields: &DeviceFields) -> GatewayResult<DeviceRow> {
        self.update_one(Table::Devices, id, fields).await
    }

    async fn delete_device(&self, id: &str) -> GatewayResult<()> {
        self.delete_one(Table::Devices, id).await
    }

    async fn insert_group(&self, fields: &GroupFields) -> GatewayResult<GroupRow> {
        self.insert_one(Table::Groups, fields).await
    }

    async fn list_groups(&self) -> GatewayResult<Vec<GroupRow>> {
        self.select_all(Table::Groups).await
    }

    async fn update_group(&self, id: &str, fields: &GroupFields) -> GatewayResult<GroupRow> {
        self.update_one(Table::Groups, id, fields).await
    }

    async fn delete_group(&self, id: &str) -> GatewayResult<()> {
        self.delete_one(Table::Groups, id).await
    }

    async fn insert_connection(&self, fields: &ConnectionFields) -> GatewayResult<ConnectionRow> {
        self.insert_one(Table::Connections, fields).await
    }

    async fn list_connections(&self) -> GatewayResult<Vec<ConnectionRow>> {
        self.select_all(Table::Connections).await
    }

    async fn update_connection(
        &self,
        id: &str,
        fields: &ConnectionFields,
    ) -> GatewayResult<ConnectionRow> {
        self.update_one(Table::Connections, id, fields).await
    }

    async fn delete_connection(&self, id: &str) -> GatewayResult<()> {
        self.delete_one(Table::Connections, id).await
    }

    async fn insert_mapping(&self, fields: &MappingFields) -> GatewayResult<MappingRow> {
        self.insert_one(Table::Mappings, fields).await
    }

    async fn list_mappings(&self) -> GatewayResult<Vec<MappingRow>> {
        self.select_all(Table::Mappings).await
    }
}

// ============================================================================
// Tests
// ============================================================================
