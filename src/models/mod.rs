//! Core data models for point registration.

pub mod category;
pub mod geo;
pub mod point;

pub use category::Category;
pub use geo::{Coordinate, Division, SubDivision};
pub use point::{FormField, ImageFile, PointForm};
