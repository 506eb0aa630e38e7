//! Generates service stubs from MAL (CCSDS Message Abstraction Layer) service definitions.
//!
//! Generation runs in two stages: [`lift`] parses the XML definition and resolves it into the
//! internal representation in [`repr`], then [`synthesize`] walks that representation and returns
//! one [`Artifact`] per generated unit of code. Writing artifacts anywhere is left to the caller.

mod codegen;
mod error;
mod lift;
pub mod repr;
pub mod schema;
pub mod templates;

pub use crate::{
    codegen::{
        wrap_comment, Artifact, ArtifactKind, SynthConfig, Synthesizer, MAX_WRAP_WIDTH,
        MIN_WRAP_WIDTH,
    },
    error::{Error, Result},
    lift::{resolve_pattern, LiftConfig, Strictness},
    repr::Model,
};

pub fn lift(data: &[u8]) -> Result<Model> {
    lift_with(data, &LiftConfig::default())
}

pub fn lift_with(data: &[u8], config: &LiftConfig) -> Result<Model> {
    let spec = schema::parse(data)?;
    lift::lift_specification(spec, config)
}

pub fn synthesize(model: &Model) -> Result<Vec<Artifact>> {
    synthesize_with(model, SynthConfig::default())
}

pub fn synthesize_with(model: &Model, config: SynthConfig) -> Result<Vec<Artifact>> {
    Synthesizer::new(config).synthesize(model)
}
