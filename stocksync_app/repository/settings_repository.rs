use stocksync_types::{errors::ApplicationError, pricing::PriceAdjust};

#[async_trait::async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Saved price adjustment defaults, if any were ever saved.
    async fn load_price_adjust(&self) -> Result<Option<PriceAdjust>, ApplicationError>;

    async fn save_price_adjust(&self, adjust: &PriceAdjust) -> Result<(), ApplicationError>;
}
