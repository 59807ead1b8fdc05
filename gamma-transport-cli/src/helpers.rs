//! Scene-file loading and shared CLI plumbing: a YAML description of
//! materials, a stratified geometry, a configured Compton process and a
//! batch of initial states, resolved into the library types
//! [`gamma_transport::engine::TransportEngine`] operates on.

use anyhow::{bail, Context, Result};
use gamma_transport::density::{DensityModel, Gradient, Uniform};
use gamma_transport::engine::TransportMode;
use gamma_transport::geometry::stratified::StratifiedGeometry;
use gamma_transport::geometry::{GeometryModel, Sector, Vector3};
use gamma_transport::material::{MaterialDefinition, MaterialRegistry};
use gamma_transport::process::{ComptonMethod, ComptonMode, ComptonModel, ComptonProcess};
use gamma_transport::state::ParticleState;
use gamma_transport::xsection::XSectionConfig;
use prettytable::format::{FormatBuilder, LinePosition, LineSeparator};
use prettytable::Table;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

/// A material entry in a scene file: a name and a Hill-notation formula.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Registry key, e.g. `"water"`.
    pub name: String,
    /// Hill-notation chemical formula, e.g. `"H2O"`.
    pub formula: String,
}

/// A sector's density field, as written in a scene file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DensitySpec {
    /// A spatially uniform density.
    Uniform {
        /// Density, g/cm^3.
        rho0: f64,
    },
    /// An exponential gradient along the z axis.
    Gradient {
        /// Reference density at z = 0, g/cm^3.
        rho0: f64,
        /// Scale height, cm.
        h: f64,
    },
}

impl DensitySpec {
    fn resolve(&self) -> DensityModel {
        match *self {
            Self::Uniform { rho0 } => DensityModel::Uniform(Uniform { rho0 }),
            Self::Gradient { rho0, h } => {
                DensityModel::Gradient(Gradient { rho0, h, axis: Vector3::new(0.0, 0.0, 1.0) })
            }
        }
    }
}

/// One layer of a stratified scene geometry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectorSpec {
    /// Human-readable description.
    pub description: String,
    /// Name of a material defined in the scene's `materials` list.
    pub material: String,
    /// The sector's density field.
    pub density: DensitySpec,
}

/// A stratified (horizontally layered) geometry, top (index 0) to bottom.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeometrySpec {
    /// Outer upper boundary, cm.
    pub top_z: f64,
    /// Layers, ordered top to bottom.
    pub sectors: Vec<SectorSpec>,
    /// Descending z-plane boundaries between consecutive sectors;
    /// one shorter than `sectors`.
    pub boundaries: Vec<f64>,
}

/// A configured Compton process, as written in a scene file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComptonSpec {
    /// `"inverse_transform"` or `"rejection_sampling"`.
    pub method: String,
    /// `"direct"`, `"adjoint"` or `"inverse"`.
    pub mode: String,
    /// `"klein_nishina"`, `"scattering_function"` or `"penelope"`.
    pub model: String,
    /// Sampling-table resolution multiplier.
    pub precision: f64,
}

impl ComptonSpec {
    fn resolve(&self) -> Result<ComptonProcess> {
        let method = match self.method.as_str() {
            "inverse_transform" => ComptonMethod::InverseTransform,
            "rejection_sampling" => ComptonMethod::RejectionSampling,
            other => bail!("unknown compton method `{other}`"),
        };
        let mode = match self.mode.as_str() {
            "direct" => ComptonMode::Direct,
            "adjoint" => ComptonMode::Adjoint,
            "inverse" => ComptonMode::Inverse,
            other => bail!("unknown compton mode `{other}`"),
        };
        let model = match self.model.as_str() {
            "klein_nishina" => ComptonModel::KleinNishina,
            "scattering_function" => ComptonModel::ScatteringFunction,
            "penelope" => ComptonModel::Penelope,
            other => bail!("unknown compton model `{other}`"),
        };
        ComptonProcess::new(method, mode, model, self.precision)
            .context("scene `compton` block rejected")
    }
}

/// One initial photon, as written in a scene file.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StateSpec {
    /// Initial energy, MeV.
    pub energy: f64,
    /// Initial position, cm.
    pub position: [f64; 3],
    /// Initial direction (need not be pre-normalized).
    pub direction: [f64; 3],
    /// Initial Monte Carlo weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Backward-mode source-energy target; ignored in forward mode.
    pub source_energy: Option<f64>,
}

const fn default_weight() -> f64 {
    1.0
}

/// A complete run description: materials, geometry, the Compton
/// configuration, transport parameters and an explicit batch of states.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    /// Materials available to `geometry.sectors[..].material`.
    pub materials: Vec<MaterialSpec>,
    /// The stratified geometry photons travel through.
    pub geometry: GeometrySpec,
    /// The configured Compton process.
    pub compton: ComptonSpec,
    /// `"forward"` or `"backward"`.
    pub mode: String,
    /// Forward-mode energy cutoff, MeV.
    pub e_min: f64,
    /// Per-state step budget.
    pub step_max: u32,
    /// Root seed for the engine's random stream.
    pub seed: u64,
    /// The initial batch of photons.
    pub states: Vec<StateSpec>,
}

/// Loads and parses a YAML scene file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or does not parse as a
/// [`Scene`].
pub fn read_scene(path: &str) -> Result<Scene> {
    let file = File::open(path).with_context(|| format!("unable to open '{path}'"))?;
    serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("unable to parse '{path}' as a scene"))
}

/// Registers and compiles every material a scene names.
///
/// # Errors
///
/// Returns an error if a material's formula is invalid.
pub fn build_registry(scene: &Scene) -> Result<MaterialRegistry> {
    let mut registry = MaterialRegistry::new();
    for material in &scene.materials {
        let definition = MaterialDefinition::from_formula(&material.name, &material.formula)
            .with_context(|| format!("material `{}`", material.name))?;
        registry.register(definition);
    }
    registry.compile(&XSectionConfig::default());
    Ok(registry)
}

/// Builds the stratified geometry a scene describes.
///
/// # Errors
///
/// Returns an error if a sector names a material absent from
/// `scene.materials`.
pub fn build_geometry(scene: &Scene) -> Result<GeometryModel> {
    let known: std::collections::BTreeSet<&str> =
        scene.materials.iter().map(|m| m.name.as_str()).collect();
    let sectors = scene
        .geometry
        .sectors
        .iter()
        .map(|sector| {
            if !known.contains(sector.material.as_str()) {
                bail!("sector `{}` references undefined material `{}`", sector.description, sector.material);
            }
            Ok(Sector {
                description: sector.description.clone(),
                material: sector.material.clone(),
                density: sector.density.resolve(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(GeometryModel::Stratified(StratifiedGeometry::new(
        scene.geometry.top_z,
        sectors,
        scene.geometry.boundaries.clone(),
    )))
}

/// Resolves the scene's Compton configuration.
///
/// # Errors
///
/// Returns an error if `compton` names an unrecognized method/mode/model, or
/// if the configuration is physically inconsistent.
pub fn build_compton(scene: &Scene) -> Result<ComptonProcess> {
    scene.compton.resolve()
}

/// Resolves the scene's transport mode.
///
/// # Errors
///
/// Returns an error if `mode` is neither `"forward"` nor `"backward"`.
pub fn transport_mode(scene: &Scene) -> Result<TransportMode> {
    match scene.mode.as_str() {
        "forward" => Ok(TransportMode::Forward),
        "backward" => Ok(TransportMode::Backward),
        other => bail!("unknown transport mode `{other}`, expected \"forward\" or \"backward\""),
    }
}

/// Builds the initial batch of states and their source-energy targets
/// (`None` entries for any state without one, always present in forward
/// mode).
#[must_use]
pub fn initial_states(scene: &Scene) -> (Vec<ParticleState>, Vec<Option<f64>>) {
    scene
        .states
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let direction = Vector3::new(spec.direction[0], spec.direction[1], spec.direction[2]).normalized();
            let position = Vector3::new(spec.position[0], spec.position[1], spec.position[2]);
            let state = ParticleState::new(spec.energy, position, direction, spec.weight, i as u64);
            (state, spec.source_energy)
        })
        .unzip()
}

/// Builds an empty table with the same compact, borderless format the
/// teacher's CLI uses.
#[must_use]
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.set_format(
        FormatBuilder::new()
            .column_separator(' ')
            .separator(LinePosition::Title, LineSeparator::new('-', '+', ' ', ' '))
            .build(),
    );
    table
}
