//! The "create collection point" page.
//!
//! Wires the location picker, the category grid and the text fields
//! together, runs the start-up fetches and performs the submission.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::backend::PointsApi;
use crate::error::ClientError;
use crate::form::{missing_fields, FormError, MissingField, PointSubmission};
use crate::geography::GeographyLookup;
use crate::geolocation::PositionSource;
use crate::models::{Category, Coordinate, FormField, ImageFile, PointForm};
use crate::picker::{CategorySelector, LoadStatus, LocationPicker};
use crate::routes::{Navigator, Route};

pub const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Submission failed: {0}")]
    Backend(#[from] ClientError),
}

/// Outcome of the start-up fetches
#[derive(Debug, Clone, PartialEq)]
pub struct MountReport {
    /// Device position, if geolocation answered in time
    pub viewport_center: Option<Coordinate>,
    pub divisions: LoadStatus,
    pub categories: LoadStatus,
}

impl MountReport {
    /// Both lists the user must pick from are available
    pub fn is_usable(&self) -> bool {
        self.divisions == LoadStatus::Ready && self.categories == LoadStatus::Ready
    }
}

pub struct RegistrationPage<G, B> {
    picker: LocationPicker<G>,
    backend: Arc<B>,
    categories: Vec<Category>,
    categories_status: LoadStatus,
    selected_categories: CategorySelector,
    form: PointForm,
    navigator: Navigator,
    geolocation_timeout: Duration,
}

impl<G: GeographyLookup, B: PointsApi> RegistrationPage<G, B> {
    pub fn new(geography: Arc<G>, backend: Arc<B>) -> Self {
        let mut navigator = Navigator::new(Route::Home);
        navigator.navigate(Route::CreatePoint);

        Self {
            picker: LocationPicker::new(geography),
            backend,
            categories: Vec::new(),
            categories_status: LoadStatus::Idle,
            selected_categories: CategorySelector::new(),
            form: PointForm::default(),
            navigator,
            geolocation_timeout: DEFAULT_GEOLOCATION_TIMEOUT,
        }
    }

    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }

    /// Run geolocation, the state fetch and the category fetch concurrently.
    /// Failures are recorded in the report, never raised.
    pub async fn mount<P: PositionSource>(&mut self, source: &P) -> MountReport {
        self.categories_status = LoadStatus::Loading;

        let (viewport_center, _, categories) = tokio::join!(
            self.picker.initialize(source, self.geolocation_timeout),
            self.picker.load_divisions(),
            self.backend.categories(),
        );
        self.apply_categories(categories);

        MountReport {
            viewport_center,
            divisions: self.picker.divisions_status(),
            categories: self.categories_status.clone(),
        }
    }

    /// Retry the category fetch
    pub async fn reload_categories(&mut self) -> Result<usize, ClientError> {
        self.categories_status = LoadStatus::Loading;
        let result = self.backend.categories().await;
        let count = result.as_ref().map(Vec::len).unwrap_or(0);
        match self.apply_categories(result) {
            Some(e) => Err(e),
            None => Ok(count),
        }
    }

    fn apply_categories(&mut self, result: Result<Vec<Category>, ClientError>) -> Option<ClientError> {
        match result {
            Ok(categories) => {
                info!("Loaded {} categories", categories.len());
                self.categories = categories;
                self.categories_status = LoadStatus::Ready;
                None
            }
            Err(e) => {
                warn!("Unable to load categories: {}", e);
                self.categories.clear();
                self.categories_status = LoadStatus::Failed(e.to_string());
                Some(e)
            }
        }
    }

    pub fn picker(&self) -> &LocationPicker<G> {
        &self.picker
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn categories_status(&self) -> &LoadStatus {
        &self.categories_status
    }

    pub fn selected_categories(&self) -> &CategorySelector {
        &self.selected_categories
    }

    pub fn toggle_category(&mut self, id: u32) -> bool {
        if !self.categories.iter().any(|c| c.id == id) {
            warn!("Category {} is not offered by the backend", id);
        }
        self.selected_categories.toggle(id)
    }

    pub fn form(&self) -> &PointForm {
        &self.form
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    pub fn attach_image(&mut self, image: ImageFile) {
        info!("Attached image {} ({} bytes)", image.file_name, image.bytes.len());
        self.form.image = Some(image);
    }

    pub fn current_route(&self) -> Route {
        self.navigator.current()
    }

    pub fn missing_fields(&self) -> Vec<MissingField> {
        missing_fields(
            &self.form,
            &self.picker.current_selection(),
            &self.selected_categories,
        )
    }

    /// Build the payload without sending it
    pub fn assemble(&self) -> Result<PointSubmission, FormError> {
        PointSubmission::assemble(
            &self.form,
            &self.picker.current_selection(),
            &self.selected_categories,
        )
    }

    /// Post the point. Success navigates home; on failure the page and all
    /// entered data stay as they are.
    pub async fn submit(&mut self) -> Result<Route, SubmitError> {
        let submission = self.assemble()?;
        self.backend.submit_point(&submission).await?;

        info!("Collection point '{}' created", submission.summary);
        self.navigator.navigate(Route::Home);
        Ok(self.navigator.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::FixedPosition;
    use crate::models::{Division, SubDivision};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct StaticGeography;

    impl GeographyLookup for StaticGeography {
        async fn divisions(&self) -> Result<Vec<Division>, ClientError> {
            Ok(vec![
                Division::new("SP", "São Paulo"),
                Division::new("RJ", "Rio de Janeiro"),
            ])
        }

        async fn sub_divisions(&self, division_code: &str) -> Result<Vec<SubDivision>, ClientError> {
            match division_code {
                "SP" => Ok(vec![SubDivision::new(1, "Campinas")]),
                _ => Ok(vec![]),
            }
        }
    }

    #[derive(Default)]
    struct MockBackend {
        fail_categories: AtomicBool,
        fail_submit: AtomicBool,
        submitted: Mutex<Vec<PointSubmission>>,
    }

    fn rejected() -> ClientError {
        ClientError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        }
    }

    impl PointsApi for MockBackend {
        async fn categories(&self) -> Result<Vec<Category>, ClientError> {
            if self.fail_categories.load(Ordering::SeqCst) {
                return Err(rejected());
            }
            Ok(vec![
                Category {
                    id: 1,
                    name: "Lâmpadas".into(),
                    image_url: "http://localhost/uploads/lampadas.svg".into(),
                },
                Category {
                    id: 2,
                    name: "Pilhas e Baterias".into(),
                    image_url: "http://localhost/uploads/baterias.svg".into(),
                },
            ])
        }

        async fn submit_point(&self, submission: &PointSubmission) -> Result<(), ClientError> {
            if self.fail_submit.load(Ordering::SeqCst) {
                return Err(rejected());
            }
            self.submitted.lock().unwrap().push(submission.clone());
            Ok(())
        }
    }

    fn page(backend: Arc<MockBackend>) -> RegistrationPage<StaticGeography, MockBackend> {
        RegistrationPage::new(Arc::new(StaticGeography), backend)
    }

    async fn fill(page: &mut RegistrationPage<StaticGeography, MockBackend>) {
        page.picker().select_division("SP").await.unwrap();
        page.picker().select_sub_division("1");
        page.picker().record_point_selection(-22.9, -47.06);
        page.set_field(FormField::Summary, "Mercado Verde");
        page.set_field(FormField::Email, "contato@verde.com");
        page.toggle_category(2);
    }

    #[tokio::test]
    async fn test_mount_loads_lists_and_centers_map() {
        let mut page = page(Arc::default());
        let here = Coordinate::new(-23.55, -46.63);

        let report = page.mount(&FixedPosition(here)).await;
        assert!(report.is_usable());
        assert_eq!(report.viewport_center, Some(here));
        assert_eq!(page.picker().divisions().len(), 2);
        assert_eq!(page.categories().len(), 2);
        assert_eq!(page.current_route(), Route::CreatePoint);
    }

    #[tokio::test]
    async fn test_category_failure_is_recoverable() {
        let backend = Arc::new(MockBackend::default());
        backend.fail_categories.store(true, Ordering::SeqCst);
        let mut page = page(backend.clone());

        let report = page.mount(&FixedPosition(Coordinate::default())).await;
        assert!(!report.is_usable());
        assert_eq!(report.divisions, LoadStatus::Ready);
        assert!(report.categories.is_failed());
        assert!(page.categories().is_empty());

        backend.fail_categories.store(false, Ordering::SeqCst);
        assert_eq!(page.reload_categories().await.unwrap(), 2);
        assert_eq!(page.categories_status(), &LoadStatus::Ready);
    }

    #[tokio::test]
    async fn test_incomplete_form_is_not_sent() {
        let backend = Arc::new(MockBackend::default());
        let mut page = page(backend.clone());

        let err = page.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::Form(FormError::Incomplete(_))));
        assert!(backend.submitted.lock().unwrap().is_empty());
        assert_eq!(page.current_route(), Route::CreatePoint);
    }

    #[tokio::test]
    async fn test_submit_success_navigates_home() {
        let backend = Arc::new(MockBackend::default());
        let mut page = page(backend.clone());
        page.mount(&FixedPosition(Coordinate::default())).await;
        fill(&mut page).await;

        assert_eq!(page.submit().await.unwrap(), Route::Home);

        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].state, "SP");
        assert_eq!(submitted[0].city, "1");
        assert_eq!(submitted[0].categories, "2");
        assert_eq!(submitted[0].location, Coordinate::new(-22.9, -47.06));
    }

    #[tokio::test]
    async fn test_submit_failure_stays_on_page() {
        let backend = Arc::new(MockBackend::default());
        backend.fail_submit.store(true, Ordering::SeqCst);
        let mut page = page(backend.clone());
        fill(&mut page).await;

        let err = page.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::Backend(_)));
        assert_eq!(page.current_route(), Route::CreatePoint);
        assert_eq!(page.form().summary, "Mercado Verde");
        assert!(page.missing_fields().is_empty());
    }
}
