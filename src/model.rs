//! Data models for the carton search.
//!
//! This module defines the fundamental data structures:
//! - `Product`: One unit to be packed, with validated dimensions and weight
//! - `CartonCandidate`: Integer carton dimensions tried during the search
//! - `PackingConfiguration`: Grid counts of units along each carton axis
//! - `CartonSolution`: A feasible carton together with its packing

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Dimensional, Vec3, Weighted};

/// Validation error for product data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
}

fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_weight_value(value: f64) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidWeight(format!(
            "Weight must be positive, got: {}",
            value
        )));
    }
    Ok(())
}

/// One product unit: dimensions in inches, weight in pounds.
///
/// Fields are private so that every `Product` in circulation has passed
/// validation; the search relies on strictly positive, finite values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Product {
    dims: Vec3,
    weight: f64,
}

impl Product {
    /// Creates a new product with validation.
    ///
    /// # Parameters
    /// * `dims` - Dimensions (length, width, height) in inches
    /// * `weight` - Weight of one unit in pounds
    ///
    /// # Returns
    /// `Ok(Product)` for valid values, otherwise `Err(ValidationError)`
    pub fn new(dims: (f64, f64, f64), weight: f64) -> Result<Self, ValidationError> {
        validate_dimension(dims.0, "Length")?;
        validate_dimension(dims.1, "Width")?;
        validate_dimension(dims.2, "Height")?;
        validate_weight_value(weight)?;
        Ok(Self {
            dims: Vec3::from(dims),
            weight,
        })
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.dims.x
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.dims.y
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.dims.z
    }
}

impl Dimensional for Product {
    fn dimensions(&self) -> Vec3 {
        self.dims
    }
}

impl Weighted for Product {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Trial carton dimensions in whole inches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub struct CartonCandidate {
    pub length: u32,
    pub width: u32,
    pub height: u32,
}

impl CartonCandidate {
    pub const fn new(length: u32, width: u32, height: u32) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Converts to tuple format for display.
    pub const fn as_tuple(&self) -> (u32, u32, u32) {
        (self.length, self.width, self.height)
    }
}

impl Dimensional for CartonCandidate {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(
            f64::from(self.length),
            f64::from(self.width),
            f64::from(self.height),
        )
    }
}

/// Number of whole units of length `product_len` that fit into `carton_len`.
///
/// The quotient is taken from the exact remainder rather than from a rounded
/// division, so `1 / 0.1` yields 9 (ten units of the binary `0.1` are longer
/// than one inch). Saturates at `u64::MAX` for vanishingly small products.
pub fn units_along(carton_len: u32, product_len: f64) -> u64 {
    let carton = f64::from(carton_len);
    let remainder = carton % product_len;
    let quotient = ((carton - remainder) / product_len).round();
    // `as` saturates for out-of-range floats.
    quotient as u64
}

/// Units per carton axis in a plain grid (no rotation, no interlocking).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct PackingConfiguration {
    pub units_length: u64,
    pub units_width: u64,
    pub units_height: u64,
}

impl PackingConfiguration {
    /// Computes the grid counts of `product` inside `carton`.
    pub fn for_carton(carton: &CartonCandidate, product: &Product) -> Self {
        Self {
            units_length: units_along(carton.length, product.length()),
            units_width: units_along(carton.width, product.width()),
            units_height: units_along(carton.height, product.height()),
        }
    }

    /// Total units in the carton (product of the three axis counts).
    pub fn total_units(&self) -> u64 {
        self.units_length
            .saturating_mul(self.units_width)
            .saturating_mul(self.units_height)
    }

    /// Units in a single layer as seen from above.
    pub fn units_per_layer(&self) -> u64 {
        self.units_length.saturating_mul(self.units_width)
    }

    /// Converts to tuple format for display.
    pub const fn as_tuple(&self) -> (u64, u64, u64) {
        (self.units_length, self.units_width, self.units_height)
    }
}

/// A feasible carton: its dimensions, unit count, weight and packing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct CartonSolution {
    pub carton: CartonCandidate,
    pub total_units: u64,
    /// Total packed weight in pounds
    pub total_weight: f64,
    pub packing: PackingConfiguration,
}

impl CartonSolution {
    /// Share of the carton volume occupied by product units, in percent.
    pub fn utilization_percent(&self, product: &Product) -> f64 {
        let total = self.carton.volume();
        if total <= 0.0 {
            return 0.0;
        }
        (self.total_units as f64 * product.volume() / total) * 100.0
    }
}

impl Weighted for CartonSolution {
    fn weight(&self) -> f64 {
        self.total_weight
    }
}
