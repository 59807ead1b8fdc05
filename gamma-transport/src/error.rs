//! Error types shared by every module in this crate.

use thiserror::Error;

/// Catch-all error for this crate.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// An element symbol or atomic number does not appear in the periodic table.
    #[error("unknown element `{0}`")]
    UnknownElement(String),
    /// An atomic number fell outside `[1, 118]`.
    #[error("bad atomic number {0}, expected 1..=118")]
    BadZ(i32),
    /// A composition had a non-positive fraction or a zero total.
    #[error("bad composition: {0}")]
    BadComposition(String),
    /// An unsupported `(method, mode, model)` triple was requested for a process.
    #[error("bad sampling configuration: {0}")]
    BadSampling(String),
    /// An energy was non-finite or not strictly positive.
    #[error("bad energy {0} MeV")]
    BadEnergy(f64),
    /// A geometry implementation (in particular an external plug-in) returned
    /// inconsistent sector or distance information.
    #[error("geometry error: {0}")]
    Geometry(String),
    /// A numerical guard triggered (log/exp overflow, negative column density
    /// beyond tolerance, ...).
    #[error("numerical error: {0}")]
    Numerical(String),
    /// Transport was requested before [`crate::material::MaterialRegistry::compile`].
    #[error("material registry has not been compiled")]
    NotCompiled,
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
