use sqlx::PgPool;
use std::collections::HashMap;

use stocksync_app::repository::CatalogRepository;
use stocksync_types::{
    Result,
    catalog::{CatalogRecord, RecordKind, ResolvedSku},
    errors::{ApplicationError, CatalogError, DbError},
};

use crate::models as db_models;

/// Catalog access outside of the unit of work transaction: every record
/// save is committed on its own.
#[derive(Debug, Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn resolve_skus(
        &self,
        skus: &[String],
    ) -> Result<HashMap<String, ResolvedSku>, ApplicationError> {
        let rows = sqlx::query_as::<_, db_models::ResolvedSkuRow>(
            r#"
            SELECT DISTINCT ON (sku) id, sku, kind, parent_id
            FROM catalog_records
            WHERE sku = ANY($1)
            ORDER BY sku, id ASC
            "#,
        )
        .bind(skus)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        let mut resolved = HashMap::with_capacity(rows.len());
        for row in rows {
            let (sku, target): (String, ResolvedSku) = row.try_into()?;
            resolved.insert(sku, target);
        }
        Ok(resolved)
    }

    async fn get_record(&self, id: i64) -> Result<Option<CatalogRecord>, ApplicationError> {
        let row = sqlx::query_as::<_, db_models::CatalogRecordRow>(
            r#"
            SELECT id, sku, kind, parent_id, manage_stock, stock_quantity, stock_status, regular_price
            FROM catalog_records
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    async fn save_record(&self, record: &CatalogRecord) -> Result<(), ApplicationError> {
        let result = sqlx::query(
            r#"
            UPDATE catalog_records
            SET manage_stock = $2,
                stock_quantity = $3,
                stock_status = $4,
                regular_price = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(record.manage_stock())
        .bind(record.stock_quantity())
        .bind(record.stock_status().as_str())
        .bind(record.regular_price())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(record.id, e))?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::RecordNotFound(record.id).into());
        }
        Ok(())
    }

    async fn list_product_ids_in_categories(
        &self,
        category_ids: &[i64],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<i64>, ApplicationError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT r.id
            FROM catalog_records r
            WHERE r.kind = $1
              AND EXISTS (
                SELECT 1 FROM catalog_record_categories c
                WHERE c.record_id = r.id AND c.category_id = ANY($2)
              )
            ORDER BY r.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(RecordKind::Product.to_string())
        .bind(category_ids)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(ids)
    }

    async fn children_of(&self, id: i64) -> Result<Vec<i64>, ApplicationError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM catalog_records
            WHERE kind = $1 AND parent_id = $2
            ORDER BY id ASC
            "#,
        )
        .bind(RecordKind::Variation.to_string())
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(ids)
    }
}

/// Losing the connection fails the whole chunk; anything else only this record.
fn write_error(id: i64, e: sqlx::Error) -> ApplicationError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            DbError::Database(e).into()
        }
        e => CatalogError::WriteFailure {
            id,
            reason: e.to_string(),
        }
        .into(),
    }
}
