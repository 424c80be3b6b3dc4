//! Location and category selection for the registration form.
//!
//! The location picker owns the map viewport, the clicked point and the
//! cascading state → city selection. City lists are fetched per state and
//! guarded by tickets so that a late answer for an old state is dropped.

mod categories;
mod location;
mod state;

pub use categories::CategorySelector;
pub use location::{CurrentSelection, LocationPicker, SubDivisionUpdate};
pub use state::{LoadStatus, SelectionState};
