use sqlx::FromRow;
use uuid::Uuid;

use stocksync_app::jobs::SyncJob;
use stocksync_types::{
    catalog::{CatalogRecord, RecordKind, ResolvedSku, StockStatus},
    errors::DbError,
};

#[derive(Debug, FromRow, Clone)]
pub struct SyncJobRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub document: serde_json::Value,
}

impl TryFrom<SyncJobRow> for SyncJob {
    type Error = DbError;

    fn try_from(row: SyncJobRow) -> Result<Self, Self::Error> {
        let job: SyncJob = serde_json::from_value(row.document)?;
        if job.id != row.id || job.owner_id != row.owner_id {
            return Err(DbError::InvalidRow(format!(
                "sync job document {} does not match its row",
                row.id
            )));
        }
        Ok(job)
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct ResolvedSkuRow {
    pub id: i64,
    pub sku: String,
    pub kind: String,
    pub parent_id: i64,
}

impl TryFrom<ResolvedSkuRow> for (String, ResolvedSku) {
    type Error = DbError;

    fn try_from(row: ResolvedSkuRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<RecordKind>().map_err(DbError::InvalidRow)?;
        Ok((
            row.sku,
            ResolvedSku {
                record_id: row.id,
                kind,
                parent_id: row.parent_id,
            },
        ))
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct CatalogRecordRow {
    pub id: i64,
    pub sku: String,
    pub kind: String,
    pub parent_id: i64,
    pub manage_stock: bool,
    pub stock_quantity: Option<i64>,
    pub stock_status: String,
    pub regular_price: Option<String>,
}

impl TryFrom<CatalogRecordRow> for CatalogRecord {
    type Error = DbError;

    fn try_from(row: CatalogRecordRow) -> Result<Self, Self::Error> {
        Ok(CatalogRecord::from_parts(
            row.id,
            row.sku,
            row.kind.parse::<RecordKind>().map_err(DbError::InvalidRow)?,
            row.parent_id,
            row.manage_stock,
            row.stock_quantity,
            row.stock_status
                .parse::<StockStatus>()
                .map_err(DbError::InvalidRow)?,
            row.regular_price,
        ))
    }
}
