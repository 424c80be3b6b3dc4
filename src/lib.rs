//! Ecoleta - registration client for waste-collection points
//!
//! This library provides the location picker, category selection, form
//! assembly and HTTP clients shared by the `register` and `lookup` binaries.

pub mod backend;
pub mod config;
pub mod error;
pub mod form;
pub mod geography;
pub mod geolocation;
pub mod models;
pub mod page;
pub mod picker;
pub mod routes;

#[cfg(test)]
mod test_support;

pub use error::ClientError;
pub use models::{Category, Coordinate, Division, SubDivision};
pub use picker::{CategorySelector, CurrentSelection, LocationPicker};
