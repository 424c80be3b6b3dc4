use std::time::Duration;

use reqwest::Client;
use tracing::{error, info};
use url::Url;

use super::PointsApi;
use crate::error::ClientError;
use crate::form::PointSubmission;
use crate::models::Category;

/// HTTP client for the Ecoleta API, built once from the configured base URL
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        // Url::join drops the last segment unless the base ends with '/'
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url,
        })
    }
}

impl PointsApi for BackendClient {
    async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        let url = self.base_url.join("categories")?;
        let response = self.client.get(url).send().await?;
        let response = ClientError::check(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn submit_point(&self, submission: &PointSubmission) -> Result<(), ClientError> {
        let url = self.base_url.join("points")?;
        let form = submission.to_multipart()?;

        let response = self.client.post(url).multipart(form).send().await?;

        if let Err(e) = ClientError::check(response).await {
            error!("Point submission rejected: {}", e);
            return Err(e);
        }

        info!("Created collection point: {}", submission.summary);
        Ok(())
    }
}
