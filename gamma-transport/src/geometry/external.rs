//! A geometry backed by a plug-in implementing the four callbacks through a
//! narrow ABI of integer sector indices and double-precision vectors
//! (`spec.md` §6). The plug-in owns its data; this type only borrows the
//! raw function pointers for the lifetime of the transport call.

use super::{DensityModel, Geometry, Sector, SectorLocation, TraceResult, Vector3};
use crate::density::Uniform;
use crate::error::{Error, Result};
use std::os::raw::{c_char, c_double, c_int};

/// Status codes returned by the plug-in callbacks. Anything other than `0`
/// is surfaced as [`Error::Geometry`].
pub const STATUS_OK: c_int = 0;

/// Raw callback table for an external geometry. Every function takes plain
/// pointers to doubles and returns an integer status code, mirroring
/// `pineappl_capi`'s `extern "C"` conventions.
#[derive(Clone, Copy)]
pub struct ExternalCallbacks {
    /// `locate(x[3]) -> sector index, or -1 if outside`.
    pub locate: unsafe extern "C" fn(*const c_double, *mut c_int) -> c_int,
    /// `trace(x[3], d[3], out_sector, out_distance) -> status`.
    pub trace: unsafe extern "C" fn(
        *const c_double,
        *const c_double,
        *mut c_int,
        *mut c_double,
    ) -> c_int,
    /// `column_density(x[3], d[3], t, out_lambda) -> status`.
    pub column_density:
        unsafe extern "C" fn(*const c_double, *const c_double, c_double, *mut c_double) -> c_int,
    /// `inverse_column(x[3], d[3], lambda, out_t, out_has_solution) -> status`.
    pub inverse_column: unsafe extern "C" fn(
        *const c_double,
        *const c_double,
        c_double,
        *mut c_double,
        *mut c_int,
    ) -> c_int,
    /// Number of sectors the plug-in exposes.
    pub sector_count: unsafe extern "C" fn() -> c_int,
    /// `sector_description(index, buffer, capacity) -> status`: writes a
    /// NUL-terminated material name for sector `index` into `buffer`.
    pub sector_description: unsafe extern "C" fn(c_int, *mut c_char, usize) -> c_int,
}

/// A geometry whose four queries are forwarded to an external plug-in.
#[derive(Clone)]
pub struct ExternalGeometry {
    callbacks: ExternalCallbacks,
    /// Sector metadata the host supplies alongside the plug-in: the
    /// material name per sector index (the ABI itself only exchanges
    /// integer indices, per `spec.md` §6).
    sectors: Vec<Sector>,
}

impl std::fmt::Debug for ExternalGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalGeometry")
            .field("sectors", &self.sectors)
            .finish_non_exhaustive()
    }
}

impl ExternalGeometry {
    /// Wraps a plug-in's callback table. `materials[i]` is the material
    /// filling sector `i`; its length must match `callbacks.sector_count()`.
    #[must_use]
    pub fn new(callbacks: ExternalCallbacks, materials: Vec<(String, String)>) -> Self {
        let sectors = materials
            .into_iter()
            .map(|(description, material)| Sector {
                description,
                material,
                // The plug-in owns the actual density field; this sector's
                // `density` is never consulted (column_density/inverse_column
                // are forwarded directly to the plug-in below).
                density: DensityModel::Uniform(Uniform { rho0: f64::NAN }),
            })
            .collect();
        Self { callbacks, sectors }
    }

    /// Builds a sector list by calling `sector_count` and then
    /// `sector_description` for each index, rather than relying on a
    /// host-supplied material list. The narrow ABI exchanges only the
    /// material name per sector; human-readable descriptions are the name
    /// itself (`spec.md` §6 names `sector_description` but does not split
    /// it from the material identity).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Geometry`] if any callback reports a non-`0` status,
    /// or if a description is not valid UTF-8.
    pub fn from_callbacks(callbacks: ExternalCallbacks) -> Result<Self> {
        // SAFETY: `sector_count` takes no arguments; the ABI guarantees a
        // well-defined return for a conforming plug-in.
        let count = unsafe { (callbacks.sector_count)() };
        if count < 0 {
            return Err(Error::Geometry(format!("plug-in reported a negative sector count {count}")));
        }
        let mut sectors = Vec::with_capacity(count as usize);
        let mut buffer = vec![0 as c_char; 256];
        for index in 0..count {
            // SAFETY: `buffer` is a valid, `buffer.len()`-byte buffer for the
            // duration of this call.
            let status =
                unsafe { (callbacks.sector_description)(index, buffer.as_mut_ptr(), buffer.len()) };
            Self::check(status, "sector_description")?;
            // SAFETY: the plug-in is required to NUL-terminate within `buffer`.
            let name = unsafe { std::ffi::CStr::from_ptr(buffer.as_ptr()) }
                .to_str()
                .map_err(|_| Error::Geometry("sector_description returned invalid UTF-8".into()))?
                .to_string();
            sectors.push(Sector {
                description: name.clone(),
                material: name,
                density: DensityModel::Uniform(Uniform { rho0: f64::NAN }),
            });
        }
        Ok(Self { callbacks, sectors })
    }

    fn check(status: c_int, what: &str) -> Result<()> {
        if status == STATUS_OK {
            Ok(())
        } else {
            Err(Error::Geometry(format!("plug-in `{what}` returned status {status}")))
        }
    }
}

impl Geometry for ExternalGeometry {
    fn locate(&self, x: Vector3) -> SectorLocation {
        let xs = [x.x, x.y, x.z];
        let mut sector: c_int = -1;
        // SAFETY: `xs` is a valid 3-element buffer and `sector` a valid
        // out-parameter for the duration of this call, per the plug-in ABI.
        let status = unsafe { (self.callbacks.locate)(xs.as_ptr(), &mut sector) };
        if status != STATUS_OK || sector < 0 {
            SectorLocation::Outside
        } else {
            SectorLocation::Sector(sector as usize)
        }
    }

    fn trace(&self, x: Vector3, d: Vector3) -> TraceResult {
        let xs = [x.x, x.y, x.z];
        let ds = [d.x, d.y, d.z];
        let mut sector: c_int = -1;
        let mut distance: c_double = f64::INFINITY;
        // SAFETY: all pointers are valid, non-aliased buffers for the
        // duration of this call.
        let status = unsafe {
            (self.callbacks.trace)(xs.as_ptr(), ds.as_ptr(), &mut sector, &mut distance)
        };
        let location = if status != STATUS_OK || sector < 0 {
            SectorLocation::Outside
        } else {
            SectorLocation::Sector(sector as usize)
        };
        TraceResult { sector: location, distance }
    }

    fn column_density(&self, x: Vector3, d: Vector3, t: f64) -> Result<f64> {
        let xs = [x.x, x.y, x.z];
        let ds = [d.x, d.y, d.z];
        let mut lambda: c_double = 0.0;
        // SAFETY: see `locate`.
        let status = unsafe {
            (self.callbacks.column_density)(xs.as_ptr(), ds.as_ptr(), t, &mut lambda)
        };
        Self::check(status, "column_density")?;
        Ok(lambda)
    }

    fn inverse_column(&self, x: Vector3, d: Vector3, lambda: f64) -> Result<Option<f64>> {
        let xs = [x.x, x.y, x.z];
        let ds = [d.x, d.y, d.z];
        let mut t: c_double = 0.0;
        let mut has_solution: c_int = 0;
        // SAFETY: see `locate`.
        let status = unsafe {
            (self.callbacks.inverse_column)(
                xs.as_ptr(),
                ds.as_ptr(),
                lambda,
                &mut t,
                &mut has_solution,
            )
        };
        Self::check(status, "inverse_column")?;
        Ok((has_solution != 0).then_some(t))
    }

    fn sectors(&self) -> &[Sector] {
        &self.sectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A half-space plug-in: sector 0 for z > 0, sector 1 for z < 0, matching
    // `spec.md` §8's scenario 6.
    unsafe extern "C" fn half_space_locate(x: *const c_double, out: *mut c_int) -> c_int {
        let z = unsafe { *x.add(2) };
        unsafe { *out = if z > 0.0 { 0 } else { 1 } };
        STATUS_OK
    }

    unsafe extern "C" fn half_space_trace(
        x: *const c_double,
        d: *const c_double,
        out_sector: *mut c_int,
        out_distance: *mut c_double,
    ) -> c_int {
        let z = unsafe { *x.add(2) };
        let dz = unsafe { *d.add(2) };
        unsafe { *out_sector = if z > 0.0 { 0 } else { 1 } };
        let distance = if dz.abs() < 1.0e-15 {
            f64::INFINITY
        } else {
            let t = -z / dz;
            if t > 0.0 { t } else { f64::INFINITY }
        };
        unsafe { *out_distance = distance };
        STATUS_OK
    }

    unsafe extern "C" fn stub_column_density(
        _x: *const c_double,
        _d: *const c_double,
        t: c_double,
        out: *mut c_double,
    ) -> c_int {
        unsafe { *out = t };
        STATUS_OK
    }

    unsafe extern "C" fn stub_inverse_column(
        _x: *const c_double,
        _d: *const c_double,
        lambda: c_double,
        out_t: *mut c_double,
        out_has_solution: *mut c_int,
    ) -> c_int {
        unsafe {
            *out_t = lambda;
            *out_has_solution = 1;
        }
        STATUS_OK
    }

    unsafe extern "C" fn two_sectors() -> c_int {
        2
    }

    unsafe extern "C" fn half_space_description(
        index: c_int,
        buffer: *mut c_char,
        capacity: usize,
    ) -> c_int {
        let name = if index == 0 { c"Air" } else { c"Rock" };
        let bytes = name.to_bytes_with_nul();
        if bytes.len() > capacity {
            return 1;
        }
        // SAFETY: `buffer` holds at least `capacity >= bytes.len()` bytes.
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr().cast(), buffer, bytes.len()) };
        STATUS_OK
    }

    fn half_space() -> ExternalGeometry {
        ExternalGeometry::new(
            ExternalCallbacks {
                locate: half_space_locate,
                trace: half_space_trace,
                column_density: stub_column_density,
                inverse_column: stub_inverse_column,
                sector_count: two_sectors,
                sector_description: half_space_description,
            },
            vec![
                ("upper".into(), "Air".into()),
                ("lower".into(), "Rock".into()),
            ],
        )
    }

    #[test]
    fn from_callbacks_discovers_both_sectors_by_name() {
        let geometry = ExternalGeometry::from_callbacks(ExternalCallbacks {
            locate: half_space_locate,
            trace: half_space_trace,
            column_density: stub_column_density,
            inverse_column: stub_inverse_column,
            sector_count: two_sectors,
            sector_description: half_space_description,
        })
        .unwrap();
        assert_eq!(geometry.sectors().len(), 2);
        assert_eq!(geometry.sectors()[0].material, "Air");
        assert_eq!(geometry.sectors()[1].material, "Rock");
    }

    #[test]
    fn locates_both_sides_of_the_half_space() {
        let geometry = half_space();
        assert_eq!(
            geometry.locate(Vector3::new(0.0, 0.0, 1.0)),
            SectorLocation::Sector(0)
        );
        assert_eq!(
            geometry.locate(Vector3::new(0.0, 0.0, -1.0)),
            SectorLocation::Sector(1)
        );
    }

    #[test]
    fn trace_reports_crossing_distance() {
        let geometry = half_space();
        let result = geometry.trace(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(result.sector, SectorLocation::Sector(1));
        assert!((result.distance - 5.0).abs() < 1.0e-9);
    }
}
