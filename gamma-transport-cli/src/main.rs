//! Demo/ops CLI for `gamma-transport`: compile a scene's materials, dump a
//! material's cross-section table, or run a transport batch described by a
//! YAML scene file.

mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gamma_transport::engine::TransportEngine;
use gamma_transport::random::Random;
use gamma_transport::state::TransportStatus;
use helpers::{build_compton, build_geometry, build_registry, create_table, initial_states, read_scene, transport_mode};
use prettytable::row;
use rayon::prelude::*;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about)]
struct Opts {
    #[command(subcommand)]
    subcommand: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a scene's materials and print their bulk properties.
    Compile {
        /// Path to a YAML scene file.
        scene: String,
    },
    /// Dump a compiled material's cross-section table at a list of energies.
    Xsection {
        /// Path to a YAML scene file.
        scene: String,
        /// Name of a material defined in the scene.
        material: String,
        /// Energies to sample, MeV. Defaults to the material's own grid.
        #[arg(num_args = 0.., value_delimiter = ',')]
        energies: Vec<f64>,
    },
    /// Run the scene's batch of photons to completion and summarize the results.
    Run {
        /// Path to a YAML scene file.
        scene: String,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let opts = Opts::parse();
    match opts.subcommand {
        Command::Compile { scene } => compile(&scene),
        Command::Xsection { scene, material, energies } => xsection(&scene, &material, &energies),
        Command::Run { scene } => run_scene(&scene),
    }
}

fn compile(scene_path: &str) -> Result<()> {
    let scene = read_scene(scene_path)?;
    let registry = build_registry(&scene)?;

    let mut table = create_table();
    table.set_titles(row!["name", "molar mass [g/mol]", "Z_eff", "e- density [1/g]"]);
    for material in &scene.materials {
        let record = registry.get(&material.name)?;
        table.add_row(row![
            material.name,
            r->format!("{:.4}", record.definition.molar_mass),
            r->format!("{:.3}", record.definition.effective_z()),
            r->format!("{:.4e}", record.definition.electron_density_per_mass()),
        ]);
    }
    table.printstd();
    Ok(())
}

fn xsection(scene_path: &str, material: &str, energies: &[f64]) -> Result<()> {
    let scene = read_scene(scene_path)?;
    let registry = build_registry(&scene)?;
    let record = registry.get(material)?;

    let energies: Vec<f64> = if energies.is_empty() {
        record.table.energy_grid.clone()
    } else {
        energies.to_vec()
    };

    let mut table = create_table();
    table.set_titles(row!["E [MeV]", "absorption", "compton", "rayleigh", "total [cm^2/g]"]);
    for &e in &energies {
        table.add_row(row![
            r->format!("{e:.6}"),
            r->format!("{:.4e}", record.table.absorption.at(e)),
            r->format!("{:.4e}", record.table.compton.at(e)),
            r->format!("{:.4e}", record.table.rayleigh.at(e)),
            r->format!("{:.4e}", record.table.total(e)),
        ]);
    }
    table.printstd();
    Ok(())
}

fn run_scene(scene_path: &str) -> Result<()> {
    let scene = read_scene(scene_path)?;
    let registry = build_registry(&scene)?;
    let geometry = build_geometry(&scene)?;
    let compton = build_compton(&scene)?;
    let mode = transport_mode(&scene)?;
    let (mut states, source_energies) = initial_states(&scene);

    let engine = TransportEngine::new(
        &geometry,
        &registry,
        compton,
        mode,
        scene.e_min,
        scene.step_max,
        Random::new(u128::from(scene.seed)),
    )?;

    let source_energies: Option<Vec<f64>> = source_energies
        .iter()
        .all(Option::is_some)
        .then(|| source_energies.iter().map(|e| e.unwrap_or_default()).collect());
    let mut statuses = vec![TransportStatus::Error; states.len()];
    engine.transport(&mut states, &mut statuses, source_energies.as_deref());

    let mut table = create_table();
    table.set_titles(row!["#", "status", "energy [MeV]", "weight", "z [cm]", "length [cm]"]);
    for (i, (state, status)) in states.iter().zip(&statuses).enumerate() {
        table.add_row(row![
            i,
            format!("{status:?}"),
            r->format!("{:.6}", state.energy),
            r->format!("{:.6}", state.weight),
            r->format!("{:.3}", state.position.z),
            r->format!("{:.3}", state.length),
        ]);
    }
    table.printstd();

    let exits = statuses.par_iter().filter(|s| matches!(s, TransportStatus::Exit)).count();
    println!("\n{exits}/{} states exited the outer geometry", statuses.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_command() {
        use clap::CommandFactory;
        Opts::command().debug_assert();
    }
}
