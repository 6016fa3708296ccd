use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Kind of a catalog record a SKU resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// A standalone product. It may own variations.
    Product,
    /// A variation belonging to a parent product.
    Variation,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Product => write!(f, "Product"),
            RecordKind::Variation => write!(f, "Variation"),
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Product" => Ok(RecordKind::Product),
            "Variation" => Ok(RecordKind::Variation),
            other => Err(format!("unknown record kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

impl StockStatus {
    /// In stock for any positive quantity.
    pub fn for_quantity(quantity: i64) -> Self {
        if quantity > 0 {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "instock",
            StockStatus::OutOfStock => "outofstock",
        }
    }
}

impl FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instock" => Ok(StockStatus::InStock),
            "outofstock" => Ok(StockStatus::OutOfStock),
            other => Err(format!("unknown stock status '{other}'")),
        }
    }
}

/// Outcome of resolving one SKU against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSku {
    pub record_id: i64,
    pub kind: RecordKind,
    /// Parent product id for variations, 0 otherwise.
    pub parent_id: i64,
}

/// A catalog record as loaded for a stock/price mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: i64,
    pub sku: String,
    pub kind: RecordKind,
    pub parent_id: i64,
    manage_stock: bool,
    stock_quantity: Option<i64>,
    stock_status: StockStatus,
    regular_price: Option<String>,
}

impl CatalogRecord {
    pub fn new(id: i64, sku: impl Into<String>, kind: RecordKind, parent_id: i64) -> Self {
        Self {
            id,
            sku: sku.into(),
            kind,
            parent_id,
            manage_stock: false,
            stock_quantity: None,
            stock_status: StockStatus::InStock,
            regular_price: None,
        }
    }

    /// Rebuilds a record from stored values.
    pub fn from_parts(
        id: i64,
        sku: String,
        kind: RecordKind,
        parent_id: i64,
        manage_stock: bool,
        stock_quantity: Option<i64>,
        stock_status: StockStatus,
        regular_price: Option<String>,
    ) -> Self {
        Self {
            id,
            sku,
            kind,
            parent_id,
            manage_stock,
            stock_quantity,
            stock_status,
            regular_price,
        }
    }

    pub fn manage_stock(&self) -> bool {
        self.manage_stock
    }

    pub fn stock_quantity(&self) -> Option<i64> {
        self.stock_quantity
    }

    pub fn stock_status(&self) -> StockStatus {
        self.stock_status
    }

    pub fn regular_price(&self) -> Option<&str> {
        self.regular_price.as_deref()
    }

    pub fn set_managed_stock(&mut self, manage: bool) {
        self.manage_stock = manage;
    }

    pub fn set_quantity(&mut self, quantity: i64) {
        self.stock_quantity = Some(quantity);
    }

    pub fn set_status(&mut self, status: StockStatus) {
        self.stock_status = status;
    }

    pub fn set_regular_price(&mut self, price: impl Into<String>) {
        self.regular_price = Some(price.into());
    }

    /// Managed stock, quantity 0, out of stock.
    pub fn zero_stock(&mut self) {
        self.set_managed_stock(true);
        self.set_quantity(0);
        self.set_status(StockStatus::OutOfStock);
    }
}
