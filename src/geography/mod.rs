//! Read-only lookup of states and cities.

mod ibge;

use std::future::Future;

pub use ibge::{IbgeClient, IBGE_LOCALIDADES_URL};

use crate::error::ClientError;
use crate::models::{Division, SubDivision};

/// Source of the division → sub-division hierarchy.
///
/// Both lists come back in the service's own order; callers never re-sort.
pub trait GeographyLookup: Send + Sync {
    /// All first-level divisions, ordered by name
    fn divisions(&self) -> impl Future<Output = Result<Vec<Division>, ClientError>> + Send;

    /// Sub-divisions of `division_code`, ordered by name
    fn sub_divisions(
        &self,
        division_code: &str,
    ) -> impl Future<Output = Result<Vec<SubDivision>, ClientError>> + Send;
}
