//! Steps concretos del pipeline.
//!
//! Cada step implementa `PipelineStep` y sigue el mismo patrón: cargar los
//! artifacts del step anterior vía stores (linaje incluido), computar y
//! escribir su propio `out.json` más los arrays por paciente. Los parámetros
//! llegan validados por nombre desde el executor; aquí solo se interpretan
//! valores.

mod gen_candidates;
mod gen_prob_maps;
mod gen_submission;
mod resample_lungs;

pub use gen_candidates::GenCandidates;
pub use gen_prob_maps::GenProbMaps;
pub use gen_submission::GenSubmission;
pub use resample_lungs::ResampleLungs;

use scan_core::{PipelineError, Record};
use serde_json::Value;

pub(crate) fn f64_param(params: &Record, key: &str, default: f64) -> f64 {
    params.get(key).and_then(Value::as_f64).unwrap_or(default)
}

pub(crate) fn usize_param(params: &Record, key: &str, default: usize) -> usize {
    params.get(key).and_then(Value::as_u64).map(|v| v as usize).unwrap_or(default)
}

pub(crate) fn required_str_param(step: &str, params: &Record, key: &str) -> Result<String, PipelineError> {
    params.get(key)
          .and_then(Value::as_str)
          .map(|s| s.to_string())
          .ok_or_else(|| PipelineError::StepFailed { step: step.to_string(),
                                                     detail: format!("required parameter '{key}' missing or not a string") })
}
