//! Ray/sector queries over a geometry: `locate`, `trace`, `column_density`,
//! `inverse_column`. The internal representation (stratified layers, a
//! topography heightmap, a box, or an external plug-in) is hidden behind
//! this interface; the transport engine never inspects sector geometry
//! otherwise (`spec.md` §3, §4.D).

pub mod external;
pub mod stratified;

use crate::density::{Density, DensityModel};
use crate::error::Result;
use enum_dispatch::enum_dispatch;
use std::ops::{Add, Mul, Sub};

/// A cartesian vector in cm (position) or a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector3 {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
    /// z component.
    pub z: f64,
}

impl Vector3 {
    /// Builds a vector from components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns `self` scaled to unit length.
    #[must_use]
    pub fn normalized(self) -> Self {
        self * (1.0 / self.norm())
    }

    /// `|self| == 1` within `tol`.
    #[must_use]
    pub fn is_unit(self, tol: f64) -> bool {
        (self.norm() - 1.0).abs() < tol
    }

    /// Cross product.
    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// A sector index, or the special "outside all sectors" marker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SectorLocation {
    /// Index into the geometry's sector list.
    Sector(usize),
    /// The ray is outside the outer geometry boundary.
    Outside,
}

/// A connected region of space with a single material and density model.
#[derive(Clone, Debug)]
pub struct Sector {
    /// Human-readable description, e.g. `"Atmosphere"`.
    pub description: String,
    /// Name of the [`crate::material::MaterialDefinition`] filling this sector.
    pub material: String,
    /// The sector's density field.
    pub density: DensityModel,
}

/// The result of [`Geometry::trace`]: the sector a ray currently occupies,
/// and the distance to the next sector change.
#[derive(Clone, Copy, Debug)]
pub struct TraceResult {
    /// Sector index at the ray's current position (after stepping an
    /// infinitesimal `epsilon` along `d`, per the boundary convention).
    pub sector: SectorLocation,
    /// Distance to the next sector change along `+d`, or `f64::INFINITY` if
    /// none occurs before the outer boundary.
    pub distance: f64,
}

/// The four operations every geometry implementation exposes, regardless of
/// internal representation.
#[enum_dispatch]
pub trait Geometry {
    /// The sector containing `x`, or [`SectorLocation::Outside`].
    fn locate(&self, x: Vector3) -> SectorLocation;

    /// The sector entered by stepping an infinitesimal `epsilon` from `x`
    /// along `d`, and the distance to the following sector change.
    fn trace(&self, x: Vector3, d: Vector3) -> TraceResult;

    /// `integral_0^t rho(x + s d) ds` within the sector containing `x`, g/cm^2.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Geometry`] if `x` is not inside a sector.
    fn column_density(&self, x: Vector3, d: Vector3, t: f64) -> Result<f64>;

    /// Smallest `t` such that `column_density(x, d, t) == lambda`, or `None`
    /// if `lambda` exceeds the integral available before the next boundary.
    ///
    /// # Errors
    ///
    /// As [`Geometry::column_density`].
    fn inverse_column(&self, x: Vector3, d: Vector3, lambda: f64) -> Result<Option<f64>>;

    /// The sectors making up this geometry, in index order.
    fn sectors(&self) -> &[Sector];
}

/// Tagged union of geometry implementations, dispatched once per engine step.
#[enum_dispatch(Geometry)]
#[derive(Clone, Debug)]
pub enum GeometryModel {
    /// An ordered stack of horizontal layers.
    Stratified(stratified::StratifiedGeometry),
    /// A plug-in implementing the four callbacks through a narrow ABI.
    External(external::ExternalGeometry),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_unit_check() {
        let d = Vector3::new(0.0, 0.0, 1.0);
        assert!(d.is_unit(1.0e-6));
        assert!(!Vector3::new(1.0, 1.0, 0.0).is_unit(1.0e-6));
    }

    #[test]
    fn normalized_has_unit_norm() {
        let v = Vector3::new(3.0, 4.0, 0.0).normalized();
        assert!(v.is_unit(1.0e-12));
    }
}
