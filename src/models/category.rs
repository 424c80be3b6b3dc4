use serde::{Deserialize, Serialize};

/// Collection category offered by the backend (batteries, paper, oil...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
}
