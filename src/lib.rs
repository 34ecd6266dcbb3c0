//! World Magnetic Model evaluation: spherical-harmonic computation of the
//! Earth's magnetic declination and related geomagnetic elements at a
//! geodetic position and epoch.

pub mod config;
pub mod coords;
pub mod dates;
pub mod elements;
pub mod ellipsoid;
pub mod error;
pub mod evaluator;
pub mod harmonics;
pub mod heading;
pub mod legendre;
pub mod model;

pub use coords::{GeodeticCoordinate, SphericalCoordinate};
pub use elements::{GeoMagneticElements, Uncertainty};
pub use ellipsoid::Ellipsoid;
pub use error::{MagError, Result};
pub use evaluator::{Declination, Evaluation, ModelEvaluator};
pub use model::MagneticModel;
