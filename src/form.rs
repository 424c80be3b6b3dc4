//! Assembly of the multipart payload sent to `POST /points`.

use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::error::ClientError;
use crate::models::{Coordinate, ImageFile, PointForm};
use crate::picker::{CategorySelector, CurrentSelection};

/// Piece of the form still to be filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Summary,
    Email,
    State,
    City,
    /// No map click yet
    Point,
    Categories,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingField::Summary => write!(f, "establishment name"),
            MissingField::Email => write!(f, "e-mail"),
            MissingField::State => write!(f, "state"),
            MissingField::City => write!(f, "city"),
            MissingField::Point => write!(f, "map location"),
            MissingField::Categories => write!(f, "collection categories"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum FormError {
    #[error("Form incomplete, missing: {}", list(.0))]
    Incomplete(Vec<MissingField>),
}

fn list(missing: &[MissingField]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every item the form still lacks, in form order. Empty means ready.
pub fn missing_fields(
    form: &PointForm,
    selection: &CurrentSelection,
    categories: &CategorySelector,
) -> Vec<MissingField> {
    let mut missing = Vec::new();
    if form.summary.trim().is_empty() {
        missing.push(MissingField::Summary);
    }
    if form.email.trim().is_empty() {
        missing.push(MissingField::Email);
    }
    if selection.point.is_none() {
        missing.push(MissingField::Point);
    }
    if selection.division_code.is_empty() {
        missing.push(MissingField::State);
    }
    if selection.sub_division_code.is_empty() {
        missing.push(MissingField::City);
    }
    if categories.is_empty() {
        missing.push(MissingField::Categories);
    }
    missing
}

/// Validated registration, ready to be posted
#[derive(Debug, Clone, PartialEq)]
pub struct PointSubmission {
    pub summary: String,
    pub email: String,
    pub phone: String,
    pub location: Coordinate,
    /// State code, e.g. "SP"
    pub state: String,
    /// City id
    pub city: String,
    /// Comma-joined category ids
    pub categories: String,
    pub image: Option<ImageFile>,
}

impl PointSubmission {
    pub fn assemble(
        form: &PointForm,
        selection: &CurrentSelection,
        categories: &CategorySelector,
    ) -> Result<Self, FormError> {
        let missing = missing_fields(form, selection, categories);
        if !missing.is_empty() {
            return Err(FormError::Incomplete(missing));
        }

        Ok(Self {
            summary: form.summary.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            location: selection.coordinate(),
            state: selection.division_code.clone(),
            city: selection.sub_division_code.clone(),
            categories: categories.joined(),
            image: form.image.clone(),
        })
    }

    /// Text fields in wire order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("summary", self.summary.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
            ("latitude", self.location.latitude.to_string()),
            ("longitude", self.location.longitude.to_string()),
            ("state", self.state.clone()),
            ("city", self.city.clone()),
            ("categories", self.categories.clone()),
        ]
    }

    pub fn to_multipart(&self) -> Result<Form, ClientError> {
        let mut form = self
            .fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        if let Some(image) = &self.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime)?;
            form = form.part("image", part);
        }

        Ok(form)
    }
}
