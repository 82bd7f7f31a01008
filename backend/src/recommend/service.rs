use futures::future::join_all;
use shared::RecommendationResult;

use super::client::{PredictionClient, UpstreamError};
use super::models::{PartialPrediction, PredictionItem};
use super::normalize;
use super::upload::TempUpload;
use crate::catalog::{CatalogError, CatalogService};

#[derive(Clone)]
pub struct RecommendationService {
    client: PredictionClient,
    catalog: CatalogService,
}

impl RecommendationService {
    pub fn new(client: PredictionClient, catalog: CatalogService) -> Self {
        Self { client, catalog }
    }

    /// Ranked recommendations for an uploaded image, in upstream order.
    pub async fn for_upload(
        &self,
        upload: &TempUpload,
    ) -> Result<Vec<RecommendationResult>, UpstreamError> {
        let predictions = self
            .client
            .predict_image(upload.path(), upload.file_name(), upload.content_type())
            .await?;

        let lookups = predictions
            .iter()
            .map(PredictionItem::from_value)
            .map(|item| self.resolve(item));
        Ok(join_all(lookups).await)
    }

    pub async fn for_product(&self, product_id: &str) -> Result<Vec<RecommendationResult>, UpstreamError> {
        let records = self.client.ranked_by_product_id(product_id).await?;
        Ok(records.iter().map(normalize::from_ranked).collect())
    }

    pub async fn for_image_url(&self, image_url: &str) -> Result<Vec<RecommendationResult>, UpstreamError> {
        let records = self.client.ranked_by_image_url(image_url).await?;
        Ok(records.iter().map(normalize::from_ranked).collect())
    }

    async fn resolve(&self, item: PredictionItem) -> RecommendationResult {
        match item {
            PredictionItem::Enriched(enriched) => normalize::from_enriched(&enriched),
            PredictionItem::Partial(partial) => self.complete(partial).await,
        }
    }

    async fn complete(&self, partial: PartialPrediction) -> RecommendationResult {
        if partial.id.is_empty() {
            return normalize::not_found(&partial);
        }

        match self.catalog.get(&partial.id).await {
            Ok(product) => normalize::from_catalog(&product, partial.score.as_ref()),
            Err(CatalogError::NotFound) => {
                log::warn!("Predicted product {} is not in the catalog", partial.id);
                normalize::not_found(&partial)
            }
            Err(e) => {
                log::error!("Error fetching details for product {}: {}", partial.id, e);
                normalize::lookup_failed(&partial)
            }
        }
    }
}
