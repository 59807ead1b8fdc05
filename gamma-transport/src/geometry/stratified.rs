//! A geometry made of horizontal layers separated by z-planes, e.g. an
//! atmosphere sitting over a ground half-space (`original_source`'s
//! `StratifiedGeometry` / `TopographyMap` examples, simplified to flat
//! planes).

use super::{Density, Geometry, Sector, SectorLocation, TraceResult, Vector3};
use crate::error::{Error, Result};

/// An ordered stack of sectors separated by horizontal planes. The topmost
/// sector is bounded above by `top_z` (above it is [`SectorLocation::Outside`]);
/// the bottommost sector is unbounded below.
#[derive(Clone, Debug)]
pub struct StratifiedGeometry {
    /// Sectors, ordered from top (index 0) to bottom.
    pub sectors: Vec<Sector>,
    /// Descending z-plane boundaries separating consecutive sectors;
    /// `boundaries.len() == sectors.len() - 1`.
    pub boundaries: Vec<f64>,
    /// Outer upper boundary; `z > top_z` is outside the geometry.
    pub top_z: f64,
}

impl StratifiedGeometry {
    /// Builds a stratified geometry. `boundaries` must be strictly
    /// descending and shorter than `sectors` by exactly one.
    #[must_use]
    pub fn new(top_z: f64, sectors: Vec<Sector>, boundaries: Vec<f64>) -> Self {
        debug_assert_eq!(boundaries.len() + 1, sectors.len());
        debug_assert!(boundaries.windows(2).all(|w| w[0] > w[1]));
        Self { sectors, boundaries, top_z }
    }

    fn index_at(&self, z: f64) -> Option<usize> {
        if z > self.top_z {
            return None;
        }
        Some(self.boundaries.iter().take_while(|&&b| z <= b).count())
    }

    /// The lower z-bound of sector `index` (`None` for the bottommost, which
    /// is unbounded below) and the upper z-bound (`None` for the topmost,
    /// which uses `top_z`).
    fn sector_bounds(&self, index: usize) -> (Option<f64>, Option<f64>) {
        let upper = if index == 0 { None } else { Some(self.boundaries[index - 1]) };
        let lower = self.boundaries.get(index).copied();
        (lower, upper)
    }
}

impl Geometry for StratifiedGeometry {
    fn locate(&self, x: Vector3) -> SectorLocation {
        self.index_at(x.z).map_or(SectorLocation::Outside, SectorLocation::Sector)
    }

    fn trace(&self, x: Vector3, d: Vector3) -> TraceResult {
        const EPSILON: f64 = 1.0e-9;
        let entry = x + d * EPSILON;
        let sector = self.locate(entry);

        let SectorLocation::Sector(index) = sector else {
            return TraceResult { sector, distance: f64::INFINITY };
        };

        if d.z.abs() < 1.0e-15 {
            return TraceResult { sector, distance: f64::INFINITY };
        }

        let (lower, upper) = self.sector_bounds(index);
        let target_z = if d.z > 0.0 { upper.unwrap_or(self.top_z) } else { lower };
        let distance = target_z.map_or(f64::INFINITY, |z| {
            let t = (z - entry.z) / d.z;
            if t.is_finite() && t > 0.0 { t } else { f64::INFINITY }
        });
        TraceResult { sector, distance }
    }

    fn column_density(&self, x: Vector3, d: Vector3, t: f64) -> Result<f64> {
        let SectorLocation::Sector(index) = self.locate(x) else {
            return Err(Error::Geometry("column_density called outside the geometry".into()));
        };
        Ok(self.sectors[index].density.column_density(x, d, t))
    }

    fn inverse_column(&self, x: Vector3, d: Vector3, lambda: f64) -> Result<Option<f64>> {
        let SectorLocation::Sector(index) = self.locate(x) else {
            return Err(Error::Geometry("inverse_column called outside the geometry".into()));
        };
        Ok(self.sectors[index].density.inverse_column_density(x, d, lambda))
    }

    fn sectors(&self) -> &[Sector] {
        &self.sectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::{DensityModel, Uniform};

    fn two_layer_geometry() -> StratifiedGeometry {
        let air = Sector {
            description: "Atmosphere".into(),
            material: "Air".into(),
            density: DensityModel::Uniform(Uniform { rho0: 1.225e-3 }),
        };
        let ground = Sector {
            description: "Ground".into(),
            material: "Rock".into(),
            density: DensityModel::Uniform(Uniform { rho0: 2.9 }),
        };
        StratifiedGeometry::new(1.0e3, vec![air, ground], vec![0.0])
    }

    #[test]
    fn locate_above_top_is_outside() {
        let geometry = two_layer_geometry();
        assert_eq!(
            geometry.locate(Vector3::new(0.0, 0.0, 2.0e3)),
            SectorLocation::Outside
        );
    }

    #[test]
    fn locate_picks_the_right_layer() {
        let geometry = two_layer_geometry();
        assert_eq!(geometry.locate(Vector3::new(0.0, 0.0, 500.0)), SectorLocation::Sector(0));
        assert_eq!(geometry.locate(Vector3::new(0.0, 0.0, -500.0)), SectorLocation::Sector(1));
    }

    #[test]
    fn trace_upward_from_ground_hits_interface_at_z_zero() {
        let geometry = two_layer_geometry();
        let result = geometry.trace(Vector3::new(0.0, 0.0, -10.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(result.sector, SectorLocation::Sector(1));
        assert!((result.distance - 10.0).abs() < 1.0e-6);
    }

    #[test]
    fn trace_upward_from_air_hits_outer_boundary() {
        let geometry = two_layer_geometry();
        let result = geometry.trace(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(result.sector, SectorLocation::Sector(0));
        assert!((result.distance - 990.0).abs() < 1.0e-6);
    }

    #[test]
    fn horizontal_ray_never_crosses() {
        let geometry = two_layer_geometry();
        let result = geometry.trace(Vector3::new(0.0, 0.0, 10.0), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(result.distance, f64::INFINITY);
    }
}
