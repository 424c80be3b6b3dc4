use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{GeolocationError, PositionSource};
use crate::error::ClientError;
use crate::models::Coordinate;

/// Asks an HTTP endpoint answering `{"latitude": .., "longitude": ..}`
#[derive(Clone)]
pub struct HttpPositionSource {
    client: Client,
    endpoint: Url,
}

impl HttpPositionSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: Url::parse(endpoint)?,
        })
    }
}

impl PositionSource for HttpPositionSource {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        debug!("Requesting position from {}", self.endpoint);
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(ClientError::from)?;
        let response = ClientError::check(response).await?;
        let body = response.bytes().await.map_err(ClientError::from)?;
        let coord: Coordinate = serde_json::from_slice(&body).map_err(ClientError::from)?;

        if !coord.is_valid() {
            return Err(GeolocationError::OutOfRange(coord));
        }
        Ok(coord)
    }
}
