use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::state::{LoadStatus, SelectionState};
use crate::error::ClientError;
use crate::geography::GeographyLookup;
use crate::geolocation::PositionSource;
use crate::models::{Coordinate, Division, SubDivision};

/// What a city fetch did to the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubDivisionUpdate {
    /// Empty division code; the previous list is left as is
    Skipped,
    /// Same division selected again, nothing refetched
    Unchanged,
    /// List replaced with this many cities
    Applied(usize),
    /// The selection moved on before the answer arrived
    Discarded,
}

/// Snapshot read by the form assembler at submit time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentSelection {
    pub division_code: String,
    pub sub_division_code: String,
    /// `None` until the user clicks the map
    pub point: Option<Coordinate>,
}

impl CurrentSelection {
    /// The clicked point, or (0,0) when there was no click
    pub fn coordinate(&self) -> Coordinate {
        self.point.unwrap_or_default()
    }

    pub fn latitude(&self) -> f64 {
        self.coordinate().latitude
    }

    pub fn longitude(&self) -> f64 {
        self.coordinate().longitude
    }

    /// State, city and point all chosen
    pub fn is_complete(&self) -> bool {
        !self.division_code.is_empty() && !self.sub_division_code.is_empty() && self.point.is_some()
    }
}

#[derive(Debug, Default)]
struct PickerState {
    viewport_center: Coordinate,
    selected_point: Option<Coordinate>,
    divisions: Vec<Division>,
    divisions_status: LoadStatus,
    /// Bumped per state-list fetch; only the latest one is applied
    divisions_generation: u64,
    selection: SelectionState,
}

/// Map position and state → city selection.
///
/// Cloning yields another handle to the same state, so several operations
/// can be in flight at once (e.g. joined at mount time).
pub struct LocationPicker<G> {
    geography: Arc<G>,
    state: Arc<Mutex<PickerState>>,
}

impl<G> Clone for LocationPicker<G> {
    fn clone(&self) -> Self {
        Self {
            geography: Arc::clone(&self.geography),
            state: Arc::clone(&self.state),
        }
    }
}

impl<G: GeographyLookup> LocationPicker<G> {
    pub fn new(geography: Arc<G>) -> Self {
        Self {
            geography,
            state: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PickerState> {
        // The state holds plain values; a panic elsewhere cannot leave it half-written
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Center the viewport on the device position. Failure and timeout are
    /// ignored and leave the center at (0,0).
    pub async fn initialize<P: PositionSource>(
        &self,
        source: &P,
        timeout: Duration,
    ) -> Option<Coordinate> {
        match tokio::time::timeout(timeout, source.current_position()).await {
            Ok(Ok(position)) => {
                self.lock().viewport_center = position;
                info!("Map centered at {}", position);
                Some(position)
            }
            Ok(Err(e)) => {
                debug!("Geolocation unavailable: {}", e);
                None
            }
            Err(_) => {
                debug!("Geolocation timed out after {:?}", timeout);
                None
            }
        }
    }

    /// Fetch the state list. On failure the list is emptied and the status
    /// records the error; calling again retries. When calls overlap, only
    /// the latest one updates the list; older answers are returned but dropped.
    pub async fn load_divisions(&self) -> Result<usize, ClientError> {
        let generation = {
            let mut state = self.lock();
            state.divisions_generation += 1;
            state.divisions_status = LoadStatus::Loading;
            state.divisions_generation
        };

        let result = self.geography.divisions().await;

        let mut state = self.lock();
        if state.divisions_generation != generation {
            debug!("Dropped stale state list");
            return result.map(|divisions| divisions.len());
        }
        match result {
            Ok(divisions) => {
                let count = divisions.len();
                state.divisions = divisions;
                state.divisions_status = LoadStatus::Ready;
                debug!("Loaded {} states", count);
                Ok(count)
            }
            Err(e) => {
                warn!("Unable to load states: {}", e);
                state.divisions.clear();
                state.divisions_status = LoadStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Select a state and load its cities. Changing the state clears the city.
    pub async fn select_division(&self, code: &str) -> Result<SubDivisionUpdate, ClientError> {
        if !self.lock().selection.set_division(code) {
            return Ok(SubDivisionUpdate::Unchanged);
        }
        debug!("Selected state '{}'", code);
        self.load_sub_divisions(code).await
    }

    /// Fetch the cities of `code` and replace the options, unless the
    /// selection changed while the request was in flight.
    pub async fn load_sub_divisions(&self, code: &str) -> Result<SubDivisionUpdate, ClientError> {
        if code.is_empty() {
            return Ok(SubDivisionUpdate::Skipped);
        }

        let ticket = {
            let mut state = self.lock();
            if state.selection.selected_division_code != code {
                debug!("Ignoring city fetch for unselected state '{}'", code);
                return Ok(SubDivisionUpdate::Discarded);
            }
            state.selection.issue_ticket(code)
        };

        let result = self.geography.sub_divisions(code).await;

        let mut state = self.lock();
        match result {
            Ok(options) => {
                let count = options.len();
                if state.selection.apply(&ticket, Ok(options)) {
                    Ok(SubDivisionUpdate::Applied(count))
                } else {
                    debug!("Dropped stale city list for '{}'", code);
                    Ok(SubDivisionUpdate::Discarded)
                }
            }
            Err(e) => {
                if state.selection.apply(&ticket, Err(e.to_string())) {
                    warn!("Unable to load cities for '{}': {}", code, e);
                    Err(e)
                } else {
                    debug!("Dropped stale city error for '{}': {}", code, e);
                    Ok(SubDivisionUpdate::Discarded)
                }
            }
        }
    }

    pub fn select_sub_division(&self, code: &str) {
        self.lock().selection.selected_sub_division_code = code.to_string();
    }

    /// Map click. Last write wins.
    pub fn record_point_selection(&self, latitude: f64, longitude: f64) {
        self.lock().selected_point = Some(Coordinate::new(latitude, longitude));
    }

    pub fn current_selection(&self) -> CurrentSelection {
        let state = self.lock();
        CurrentSelection {
            division_code: state.selection.selected_division_code.clone(),
            sub_division_code: state.selection.selected_sub_division_code.clone(),
            point: state.selected_point,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.current_selection().is_complete()
    }

    pub fn viewport_center(&self) -> Coordinate {
        self.lock().viewport_center
    }

    pub fn selected_point(&self) -> Option<Coordinate> {
        self.lock().selected_point
    }

    pub fn divisions(&self) -> Vec<Division> {
        self.lock().divisions.clone()
    }

    pub fn divisions_status(&self) -> LoadStatus {
        self.lock().divisions_status.clone()
    }

    pub fn sub_division_options(&self) -> Vec<SubDivision> {
        self.lock().selection.sub_division_options.clone()
    }

    pub fn sub_divisions_status(&self) -> LoadStatus {
        self.lock().selection.sub_divisions_status.clone()
    }

    /// Look up a loaded state by code or name, ignoring case
    pub fn find_division(&self, query: &str) -> Option<Division> {
        let query = query.trim();
        self.lock()
            .divisions
            .iter()
            .find(|d| d.code.eq_ignore_ascii_case(query) || d.name.to_lowercase() == query.to_lowercase())
            .cloned()
    }

    /// Look up a loaded city by id or name, ignoring case
    pub fn find_sub_division(&self, query: &str) -> Option<SubDivision> {
        let query = query.trim();
        let id = query.parse::<u64>().ok();
        self.lock()
            .selection
            .sub_division_options
            .iter()
            .find(|c| Some(c.id) == id || c.name.to_lowercase() == query.to_lowercase())
            .cloned()
    }
}
