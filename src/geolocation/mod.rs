//! Best-effort device position, used only to center the map.

mod http;

use std::future::Future;

use thiserror::Error;

pub use http::HttpPositionSource;

use crate::error::ClientError;
use crate::models::Coordinate;

#[derive(Error, Debug)]
pub enum GeolocationError {
    #[error("Position unavailable")]
    Unavailable,

    #[error("Position lookup failed: {0}")]
    Lookup(#[from] ClientError),

    #[error("Position out of range: {0}")]
    OutOfRange(Coordinate),
}

pub trait PositionSource: Send + Sync {
    /// Single-shot position request. May fail; may also never resolve.
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, GeolocationError>> + Send;
}

/// Position known up front (from config or the command line)
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Ok(self.0)
    }
}

/// No positioning capability; every request fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosition;

impl PositionSource for NoPosition {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

/// Whichever source the configuration asked for
pub enum ConfiguredPosition {
    Fixed(FixedPosition),
    Http(HttpPositionSource),
    Unavailable(NoPosition),
}

impl PositionSource for ConfiguredPosition {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        match self {
            ConfiguredPosition::Fixed(source) => source.current_position().await,
            ConfiguredPosition::Http(source) => source.current_position().await,
            ConfiguredPosition::Unavailable(source) => source.current_position().await,
        }
    }
}
