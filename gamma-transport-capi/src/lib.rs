#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! C-language interface for `gamma-transport`: opaque handles a host program
//! builds up (materials, a stratified geometry, a Compton process, an
//! engine) and the batch-state layout it reads results from, plus the
//! narrow external-geometry plug-in ABI a host can implement instead of
//! using the built-in stratified geometry.

use gamma_transport::density::{DensityModel, Gradient, Uniform};
use gamma_transport::engine::{Boundary, TransportEngine, TransportMode};
use gamma_transport::geometry::external::{ExternalCallbacks, ExternalGeometry};
use gamma_transport::geometry::stratified::StratifiedGeometry;
use gamma_transport::geometry::{Geometry, GeometryModel, Sector, Vector3};
use gamma_transport::material::{MaterialDefinition, MaterialRegistry};
use gamma_transport::process::{ComptonMethod, ComptonMode, ComptonModel, ComptonProcess};
use gamma_transport::random::Random;
use gamma_transport::state::BatchState;
use gamma_transport::xsection::XSectionConfig;
use std::ffi::CStr;
use std::os::raw::{c_char, c_double, c_int};
use std::slice;

/// Status codes returned by this library's own `extern "C"` functions, not
/// to be confused with [`gamma_transport::geometry::external::STATUS_OK`]
/// (the code a *host-supplied* plug-in returns to us).
pub const GT_OK: c_int = 0;
/// A material name, formula, or argument was rejected; see the library's
/// error text on stderr in debug builds.
pub const GT_ERROR: c_int = 1;

/// An owned, named registry of compiled materials.
pub struct MaterialRegistryHandle(MaterialRegistry);

/// Creates an empty, uncompiled material registry.
#[no_mangle]
#[must_use]
pub extern "C" fn gt_material_registry_new() -> Box<MaterialRegistryHandle> {
    Box::new(MaterialRegistryHandle(MaterialRegistry::new()))
}

/// Registers a material parsed from a Hill-notation chemical formula (e.g.
/// `"H2O"`) under `name`. Returns [`GT_ERROR`] if the formula or name is
/// invalid; the registry is left unchanged.
///
/// # Safety
///
/// `registry` must point to a live [`MaterialRegistryHandle`]. `name` and
/// `formula` must be valid, NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn gt_material_registry_add_formula(
    registry: *mut MaterialRegistryHandle,
    name: *const c_char,
    formula: *const c_char,
) -> c_int {
    // SAFETY: both pointers are valid C strings per the caller contract.
    let (name, formula) = unsafe { (CStr::from_ptr(name), CStr::from_ptr(formula)) };
    let (Ok(name), Ok(formula)) = (name.to_str(), formula.to_str()) else {
        return GT_ERROR;
    };
    match MaterialDefinition::from_formula(name, formula) {
        // SAFETY: `registry` is a live handle per the caller contract.
        Ok(material) => {
            unsafe { &mut *registry }.0.register(material);
            GT_OK
        }
        Err(_) => GT_ERROR,
    }
}

/// Compiles every material registered so far, using the default
/// cross-section table resolution. Idempotent until a new material is
/// registered.
///
/// # Safety
///
/// `registry` must point to a live [`MaterialRegistryHandle`].
#[no_mangle]
pub unsafe extern "C" fn gt_material_registry_compile(registry: *mut MaterialRegistryHandle) {
    // SAFETY: per the caller contract.
    unsafe { &mut *registry }.0.compile(&XSectionConfig::default());
}

/// Deletes a registry created by [`gt_material_registry_new`]. A null
/// pointer is a no-op.
#[no_mangle]
#[allow(unused_variables)]
pub extern "C" fn gt_material_registry_delete(registry: Option<Box<MaterialRegistryHandle>>) {}

/// A geometry, either the built-in stratified layering or a plug-in.
pub struct GeometryHandle(GeometryModel);

/// Builds a stratified (horizontally layered) geometry with `n_sectors`
/// uniform-density sectors. `densities[i]` (g/cm^3) and
/// `materials[i]` fill sector `i`, ordered top (index `0`) to bottom;
/// `boundaries` (length `n_sectors - 1`) gives the descending z-plane
/// boundaries between consecutive sectors, and `top_z` the outer upper
/// boundary.
///
/// # Safety
///
/// `materials` must point to `n_sectors` valid, NUL-terminated C strings.
/// `densities` must point to `n_sectors` doubles and `boundaries` to
/// `n_sectors - 1` doubles.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn gt_stratified_geometry_new(
    top_z: c_double,
    n_sectors: usize,
    materials: *const *const c_char,
    densities: *const c_double,
    boundaries: *const c_double,
) -> Box<GeometryHandle> {
    // SAFETY: buffer lengths per the caller contract.
    let materials = unsafe { slice::from_raw_parts(materials, n_sectors) };
    let densities = unsafe { slice::from_raw_parts(densities, n_sectors) };
    let boundaries = unsafe { slice::from_raw_parts(boundaries, n_sectors.saturating_sub(1)) };

    let sectors = materials
        .iter()
        .zip(densities)
        .map(|(&name, &rho0)| {
            // SAFETY: each entry is a valid C string per the caller contract.
            let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
            Sector {
                description: name.clone(),
                material: name,
                density: DensityModel::Uniform(Uniform { rho0 }),
            }
        })
        .collect();

    let geometry = StratifiedGeometry::new(top_z, sectors, boundaries.to_vec());
    Box::new(GeometryHandle(GeometryModel::Stratified(geometry)))
}

/// Overwrites sector `index`'s density with an exponential gradient,
/// `rho(z) = rho0 * exp(-z / h)`.
///
/// # Safety
///
/// `geometry` must point to a live, stratified [`GeometryHandle`], and
/// `index` must be a valid sector index within it.
#[no_mangle]
pub unsafe extern "C" fn gt_stratified_geometry_set_gradient(
    geometry: *mut GeometryHandle,
    index: usize,
    rho0: c_double,
    h: c_double,
) -> c_int {
    // SAFETY: per the caller contract.
    let GeometryModel::Stratified(stratified) = &mut unsafe { &mut *geometry }.0 else {
        return GT_ERROR;
    };
    let Some(sector) = stratified.sectors.get_mut(index) else {
        return GT_ERROR;
    };
    sector.density = DensityModel::Gradient(Gradient { rho0, h, axis: Vector3::new(0.0, 0.0, 1.0) });
    GT_OK
}

/// Builds a geometry backed by a host-supplied plug-in implementing the six
/// callbacks of the external-geometry ABI.
///
/// # Safety
///
/// Every function pointer in `callbacks` must point to a function that
/// upholds the contract documented on [`ExternalCallbacks`], for as long as
/// the returned handle (and any [`TransportEngineHandle`] built from it)
/// stays alive.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn gt_external_geometry_new(
    callbacks: ExternalCallbacks,
) -> Option<Box<GeometryHandle>> {
    ExternalGeometry::from_callbacks(callbacks)
        .ok()
        .map(|geometry| Box::new(GeometryHandle(GeometryModel::External(geometry))))
}

/// Deletes a geometry created by [`gt_stratified_geometry_new`] or
/// [`gt_external_geometry_new`]. A null pointer is a no-op.
#[no_mangle]
#[allow(unused_variables)]
pub extern "C" fn gt_geometry_delete(geometry: Option<Box<GeometryHandle>>) {}

/// The sector containing `x[3]`, written to `*out_sector`; `-1` if outside
/// the geometry. Returns [`GT_OK`] on success.
///
/// # Safety
///
/// `geometry` must point to a live [`GeometryHandle`]. `x` must point to 3
/// doubles and `out_sector` to one writable `c_int`.
#[no_mangle]
pub unsafe extern "C" fn gt_geometry_locate(
    geometry: *const GeometryHandle,
    x: *const c_double,
    out_sector: *mut c_int,
) -> c_int {
    // SAFETY: per the caller contract.
    let xs = unsafe { slice::from_raw_parts(x, 3) };
    let position = Vector3::new(xs[0], xs[1], xs[2]);
    let location = unsafe { &*geometry }.0.locate(position);
    let sector = match location {
        gamma_transport::geometry::SectorLocation::Sector(i) => i as c_int,
        gamma_transport::geometry::SectorLocation::Outside => -1,
    };
    // SAFETY: `out_sector` is a valid out-parameter per the caller contract.
    unsafe { *out_sector = sector };
    GT_OK
}

/// Builds a configured Compton process.
///
/// `method`, `mode` and `model` are the `0`-based discriminants of
/// [`ComptonMethod`], [`ComptonMode`] and [`ComptonModel`] in declaration
/// order. Returns null if the combination is rejected (`spec.md` §6).
#[no_mangle]
#[must_use]
pub extern "C" fn gt_compton_process_new(
    method: c_int,
    mode: c_int,
    model: c_int,
    precision: c_double,
) -> Option<Box<ComptonProcess>> {
    let method = match method {
        0 => ComptonMethod::InverseTransform,
        _ => ComptonMethod::RejectionSampling,
    };
    let mode = match mode {
        0 => ComptonMode::Direct,
        1 => ComptonMode::Adjoint,
        _ => ComptonMode::Inverse,
    };
    let model = match model {
        0 => ComptonModel::KleinNishina,
        1 => ComptonModel::ScatteringFunction,
        _ => ComptonModel::Penelope,
    };
    ComptonProcess::new(method, mode, model, precision).ok().map(Box::new)
}

/// Deletes a Compton process created by [`gt_compton_process_new`]. A null
/// pointer is a no-op.
#[no_mangle]
#[allow(unused_variables)]
pub extern "C" fn gt_compton_process_delete(process: Option<Box<ComptonProcess>>) {}

/// A bound transport engine: a geometry, a compiled material registry and a
/// Compton process, all borrowed for the engine's lifetime, plus its own
/// random stream.
pub struct TransportEngineHandle<'a>(TransportEngine<'a>);

/// Builds a forward or backward transport engine. `forward` is non-zero for
/// [`TransportMode::Forward`], zero for [`TransportMode::Backward`].
/// `compton` is consumed.
///
/// # Safety
///
/// `geometry` and `registry` must point to live handles that outlive the
/// returned engine; `compton` must point to a live, heap-allocated
/// [`ComptonProcess`] (as returned by [`gt_compton_process_new`]) that this
/// call takes ownership of.
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn gt_transport_engine_new<'a>(
    geometry: &'a GeometryHandle,
    registry: &'a MaterialRegistryHandle,
    compton: Box<ComptonProcess>,
    forward: c_int,
    e_min: c_double,
    step_max: u32,
    seed_lo: u64,
    seed_hi: u64,
) -> Option<Box<TransportEngineHandle<'a>>> {
    let mode = if forward != 0 { TransportMode::Forward } else { TransportMode::Backward };
    let seed = (u128::from(seed_hi) << 64) | u128::from(seed_lo);
    TransportEngine::new(&geometry.0, &registry.0, *compton, mode, e_min, step_max, Random::new(seed))
        .ok()
        .map(|engine| Box::new(TransportEngineHandle(engine)))
}

/// Sets the engine's explicit boundary to a single sector index. Entering
/// that sector terminates a trajectory with `TransportStatus::Boundary`.
///
/// # Safety
///
/// `engine` must point to a live [`TransportEngineHandle`].
#[no_mangle]
pub unsafe extern "C" fn gt_transport_engine_set_sector_boundary(
    engine: *mut TransportEngineHandle,
    sector: usize,
) {
    // SAFETY: per the caller contract.
    unsafe { &mut *engine }.0.set_boundary(Boundary::Sector(sector));
}

/// Deletes an engine created by [`gt_transport_engine_new`]. A null pointer
/// is a no-op.
#[no_mangle]
#[allow(unused_variables)]
pub extern "C" fn gt_transport_engine_delete(engine: Option<Box<TransportEngineHandle>>) {}

/// An owned, struct-of-arrays batch of particle states, laid out exactly as
/// [`gamma_transport::state::BatchState`].
pub struct BatchStateHandle(BatchState);

/// Allocates a batch of `n` zeroed states.
#[no_mangle]
#[must_use]
pub extern "C" fn gt_batch_state_new(n: usize) -> Box<BatchStateHandle> {
    Box::new(BatchStateHandle(BatchState::with_capacity(n)))
}

/// Deletes a batch created by [`gt_batch_state_new`]. A null pointer is a
/// no-op.
#[no_mangle]
#[allow(unused_variables)]
pub extern "C" fn gt_batch_state_delete(batch: Option<Box<BatchStateHandle>>) {}

/// Number of states in the batch.
///
/// # Safety
///
/// `batch` must point to a live [`BatchStateHandle`].
#[no_mangle]
#[must_use]
pub unsafe extern "C" fn gt_batch_state_len(batch: *const BatchStateHandle) -> usize {
    // SAFETY: per the caller contract.
    unsafe { &*batch }.0.len()
}

/// Sets state `i`'s energy (MeV), position and direction (cm, unit vector)
/// and weight. `position`/`direction` must each point to 3 doubles.
///
/// # Safety
///
/// `batch` must point to a live [`BatchStateHandle`] with `i < len`.
/// `position` and `direction` must each point to 3 readable doubles.
#[no_mangle]
pub unsafe extern "C" fn gt_batch_state_set(
    batch: *mut BatchStateHandle,
    i: usize,
    energy: c_double,
    position: *const c_double,
    direction: *const c_double,
    weight: c_double,
) {
    // SAFETY: per the caller contract.
    let position = unsafe { slice::from_raw_parts(position, 3) };
    let direction = unsafe { slice::from_raw_parts(direction, 3) };
    let state = gamma_transport::state::ParticleState::new(
        energy,
        Vector3::new(position[0], position[1], position[2]),
        Vector3::new(direction[0], direction[1], direction[2]),
        weight,
        i as u64,
    );
    // SAFETY: per the caller contract.
    unsafe { &mut *batch }.0.set(i, state);
}

/// Runs every state in `batch` to a terminal status, writing each state's
/// status code into `batch.status` (see
/// [`gamma_transport::state::TransportStatus`]'s `#[repr(i32)]`
/// discriminants). In backward mode, `source_energies` (length `len`, or
/// null in forward mode) gives each state's source-energy target.
///
/// # Safety
///
/// `engine` and `batch` must point to live handles. `source_energies`, if
/// non-null, must point to `batch.len()` doubles.
#[no_mangle]
pub unsafe extern "C" fn gt_transport_engine_run(
    engine: *const TransportEngineHandle,
    batch: *mut BatchStateHandle,
    source_energies: *const c_double,
) {
    // SAFETY: per the caller contract.
    let batch = unsafe { &mut *batch };
    let len = batch.0.len();
    let mut states: Vec<_> = (0..len).map(|i| batch.0.get(i)).collect();
    let mut statuses = vec![gamma_transport::state::TransportStatus::Error; len];

    let source_energies = if source_energies.is_null() {
        None
    } else {
        // SAFETY: per the caller contract.
        Some(unsafe { slice::from_raw_parts(source_energies, len) })
    };

    // SAFETY: `engine` is a live handle per the caller contract.
    unsafe { &*engine }.0.transport(&mut states, &mut statuses, source_energies);

    for (i, state) in states.into_iter().enumerate() {
        batch.0.set(i, state);
        batch.0.status[i] = statuses[i] as c_int;
    }
}
