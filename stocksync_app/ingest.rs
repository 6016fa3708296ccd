use indexmap::IndexMap;

use stocksync_types::errors::IngestError;

mod values;

pub use values::{format_price, parse_price, parse_quantity};

pub const SKU_COLUMN: &str = "Sku";
pub const AVAILABLE_COLUMN: &str = "Available";
pub const PRICE_COLUMN: &str = "Price";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One usable line of a stock export.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRow {
    pub sku: String,
    pub available: i64,
    pub price: f64,
}

/// Reads a stock CSV and collapses duplicate SKUs, the last row winning.
///
/// Rows keep the position of the first occurrence of their SKU. Rows with a
/// blank SKU are skipped. Nothing is returned unless all of `Sku`,
/// `Available` and `Price` are present in the header.
pub fn read_stock_csv(bytes: &[u8]) -> Result<IndexMap<String, StockRow>, IngestError> {
    let data = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(IngestError::EmptyInput);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| IngestError::UnreadableInput(e.to_string()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
    };
    let sku_idx = column(SKU_COLUMN)?;
    let available_idx = column(AVAILABLE_COLUMN)?;
    let price_idx = column(PRICE_COLUMN)?;

    let mut rows: IndexMap<String, StockRow> = IndexMap::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::UnreadableInput(e.to_string()))?;

        let sku = record.get(sku_idx).unwrap_or_default().trim();
        if sku.is_empty() {
            continue;
        }

        let row = StockRow {
            sku: sku.to_string(),
            available: parse_quantity(record.get(available_idx).unwrap_or_default()),
            price: parse_price(record.get(price_idx).unwrap_or_default()),
        };
        rows.insert(row.sku.clone(), row);
    }

    if rows.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    tracing::debug!(rows = rows.len(), "Stock CSV read");
    Ok(rows)
}
