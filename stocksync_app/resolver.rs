use std::collections::HashMap;

use stocksync_types::{catalog::ResolvedSku, errors::ApplicationError};

use crate::repository::CatalogRepository;

/// Resolves SKUs against the catalog, `batch_size` at a time.
///
/// Unknown SKUs are absent from the result. If two batches report the same
/// SKU the first answer is kept.
pub async fn resolve_skus(
    catalog: &dyn CatalogRepository,
    skus: &[String],
    batch_size: usize,
) -> Result<HashMap<String, ResolvedSku>, ApplicationError> {
    let mut resolved = HashMap::with_capacity(skus.len());

    for batch in skus.chunks(batch_size.max(1)) {
        for (sku, target) in catalog.resolve_skus(batch).await? {
            resolved.entry(sku).or_insert(target);
        }
    }

    tracing::debug!(
        requested = skus.len(),
        resolved = resolved.len(),
        "SKUs resolved"
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tests::MockCatalogRepository;

    #[tokio::test]
    async fn test_resolves_in_batches() {
        let catalog = MockCatalogRepository::new();
        for id in 1..=12 {
            catalog.add_product(id, &format!("SKU-{id}"), &[]);
        }
        let mut skus: Vec<String> = (1..=12).map(|id| format!("SKU-{id}")).collect();
        skus.push("NOPE".to_string());

        let resolved = resolve_skus(&catalog, &skus, 5).await.unwrap();

        assert_eq!(catalog.resolve_batches(), vec![5, 5, 3]);
        assert_eq!(resolved.len(), 12);
        assert_eq!(resolved["SKU-7"].record_id, 7);
        assert!(!resolved.contains_key("NOPE"));
    }

    #[tokio::test]
    async fn test_duplicate_catalog_skus_resolve_to_lowest_id() {
        let catalog = MockCatalogRepository::new();
        catalog.add_product(9, "DUP", &[]);
        catalog.add_variation(4, "DUP", 1);

        let resolved = resolve_skus(&catalog, &["DUP".to_string()], 500)
            .await
            .unwrap();

        assert_eq!(resolved["DUP"].record_id, 4);
        assert_eq!(resolved["DUP"].parent_id, 1);
    }
}
