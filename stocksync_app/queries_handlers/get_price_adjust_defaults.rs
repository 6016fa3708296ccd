use async_trait::async_trait;
use std::sync::Arc;

use stocksync_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{Query, QueryHandler, queries::GetPriceAdjustDefaults},
    uow::UnitOfWork,
};

pub struct GetPriceAdjustDefaultsHandler {}

impl GetPriceAdjustDefaultsHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl QueryHandler<GetPriceAdjustDefaults> for GetPriceAdjustDefaultsHandler {
    async fn handle(
        &self,
        _query: GetPriceAdjustDefaults,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<<GetPriceAdjustDefaults as Query>::Output, ApplicationError> {
        Ok(uow.settings().load_price_adjust().await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use stocksync_types::pricing::{PriceAdjust, PriceRounding};

    use super::*;
    use crate::test_utils::tests::MockUnitOfWork;

    #[tokio::test]
    async fn test_defaults_until_saved() -> Result<(), ApplicationError> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let config = Arc::new(Config::default());
        let handler = GetPriceAdjustDefaultsHandler::new();

        let adjust = handler
            .handle(GetPriceAdjustDefaults, &mock_uow, &config)
            .await?;
        assert_eq!(adjust, PriceAdjust::default());

        let saved = PriceAdjust::new(-2.5, PriceRounding::Integer);
        mock_uow.settings().save_price_adjust(&saved).await?;
        let adjust = handler
            .handle(GetPriceAdjustDefaults, &mock_uow, &config)
            .await?;
        assert_eq!(adjust, saved);
        Ok(())
    }
}
