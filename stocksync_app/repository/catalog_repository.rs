use std::collections::HashMap;

use stocksync_types::{
    catalog::{CatalogRecord, ResolvedSku},
    errors::ApplicationError,
};

/// The commerce catalog whose stock and prices get synced.
#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Resolves one batch of SKUs. Unknown SKUs are left out of the map; when
    /// several records share a SKU the lowest id wins.
    async fn resolve_skus(
        &self,
        skus: &[String],
    ) -> Result<HashMap<String, ResolvedSku>, ApplicationError>;

    async fn get_record(&self, id: i64) -> Result<Option<CatalogRecord>, ApplicationError>;

    async fn save_record(&self, record: &CatalogRecord) -> Result<(), ApplicationError>;

    /// Ids of products (never variations) in any of `category_ids`, ascending.
    async fn list_product_ids_in_categories(
        &self,
        category_ids: &[i64],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<i64>, ApplicationError>;

    /// Ids of the variations owned by a product, ascending. Empty for
    /// products without variations.
    async fn children_of(&self, id: i64) -> Result<Vec<i64>, ApplicationError>;
}
