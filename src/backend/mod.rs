//! Ecoleta backend: category listing and point submission.

mod client;

use std::future::Future;

pub use client::BackendClient;

use crate::error::ClientError;
use crate::form::PointSubmission;
use crate::models::Category;

pub trait PointsApi: Send + Sync {
    /// Categories a collection point may accept
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, ClientError>> + Send;

    /// Create a collection point. Any 2xx answer counts as success.
    fn submit_point(
        &self,
        submission: &PointSubmission,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}
