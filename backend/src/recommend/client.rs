use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, Response};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Prediction service responded with status {status}")]
    Status { status: u16, body: Value },
    #[error("Invalid response from API server")]
    InvalidResponse,
    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UpstreamError {
    /// Upstream body when the service answered, otherwise the error message.
    pub fn payload(&self) -> Value {
        match self {
            UpstreamError::Status { body, .. } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

/// HTTP client for the external prediction service.
#[derive(Clone)]
pub struct PredictionClient {
    http_client: HttpClient,
    prediction_url: Url,
    recommendation_url: Url,
    num_recommendations: u32,
}

impl PredictionClient {
    pub fn new(
        prediction_url: Url,
        recommendation_url: Url,
        num_recommendations: u32,
        timeout: Option<Duration>,
    ) -> Result<Self, UpstreamError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            prediction_url,
            recommendation_url,
            num_recommendations,
        })
    }

    /// Sends the image file as multipart field `file` and returns the `predictions` list.
    pub async fn predict_image(
        &self,
        path: &Path,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<Vec<Value>, UpstreamError> {
        let bytes = tokio::fs::read(path).await?;
        log::info!(
            "Sending {} ({} bytes) to prediction service at {}",
            file_name,
            bytes.len(),
            self.prediction_url
        );

        let mut part = Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(content_type) = content_type {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.prediction_url.clone())
            .multipart(form)
            .send()
            .await?;

        let predictions = list_field(checked_json(response).await?, "predictions")?;
        log::info!("Received {} predictions", predictions.len());
        Ok(predictions)
    }

    pub async fn ranked_by_product_id(&self, product_id: &str) -> Result<Vec<Value>, UpstreamError> {
        self.ranked(json!({
            "product_id": product_id,
            "num_recommendations": self.num_recommendations,
        }))
        .await
    }

    pub async fn ranked_by_image_url(&self, image_url: &str) -> Result<Vec<Value>, UpstreamError> {
        self.ranked(json!({
            "image_url": image_url,
            "num_recommendations": self.num_recommendations,
        }))
        .await
    }

    async fn ranked(&self, body: Value) -> Result<Vec<Value>, UpstreamError> {
        let response = self
            .http_client
            .post(self.recommendation_url.clone())
            .json(&body)
            .send()
            .await?;

        list_field(checked_json(response).await?, "recommendations")
    }
}

async fn checked_json(response: Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        log::error!("Prediction service returned {}: {}", status, body);
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response.json::<Value>().await.map_err(|e| {
        log::error!("Prediction service sent a non-JSON body: {}", e);
        UpstreamError::InvalidResponse
    })
}

fn list_field(mut body: Value, key: &str) -> Result<Vec<Value>, UpstreamError> {
    match body.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(UpstreamError::InvalidResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_prefers_upstream_body() {
        let err = UpstreamError::Status {
            status: 503,
            body: json!({ "detail": "model loading" }),
        };
        assert_eq!(err.payload(), json!({ "detail": "model loading" }));
        assert_eq!(
            UpstreamError::InvalidResponse.payload(),
            json!("Invalid response from API server")
        );
    }

    #[test]
    fn list_field_requires_an_array() {
        assert_eq!(list_field(json!({ "predictions": [1, 2] }), "predictions").unwrap().len(), 2);
        assert!(list_field(json!({ "predictions": null }), "predictions").is_err());
        assert!(list_field(json!({ "other": [] }), "predictions").is_err());
    }
}
