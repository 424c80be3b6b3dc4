//! Free-text part of the registration form and the optional photo.

use std::path::Path;

use anyhow::{Context, Result};

/// Text input of the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Establishment name
    Summary,
    Email,
    Phone,
}

impl std::str::FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(FormField::Summary),
            "email" => Ok(FormField::Email),
            "phone" => Ok(FormField::Phone),
            other => Err(format!("unknown form field: {}", other)),
        }
    }
}

/// Photo of the collection point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Read an image from disk, guessing its MIME type from the extension
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Contact data typed by the user plus the optional photo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointForm {
    pub summary: String,
    pub email: String,
    pub phone: String,
    pub image: Option<ImageFile>,
}

impl PointForm {
    /// Overwrite one text field
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Summary => self.summary = value,
            FormField::Email => self.email = value,
            FormField::Phone => self.phone = value,
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Summary => &self.summary,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
        }
    }
}
