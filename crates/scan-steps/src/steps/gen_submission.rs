//! Step 7: submission final con probabilidad de cáncer por paciente.

use serde_json::json;

use scan_core::{PipelineContext, PipelineError, PipelineStep, Record, SaveMode};

use crate::steps::f64_param;

const NAME: &str = "gen_submission";
const ACCEPTED: &[&str] = &["cancer_prior"];

/// Colapsa los candidatos de cada paciente en una probabilidad escalar y
/// escribe `submission.json` (paciente → probabilidad, orden de inserción
/// preservado).
#[derive(Debug, Default, Clone, Copy)]
pub struct GenSubmission;

impl PipelineStep for GenSubmission {
    fn name(&self) -> &str {
        NAME
    }

    fn accepted_params(&self) -> &[&str] {
        ACCEPTED
    }

    fn run(&self, ctx: &mut PipelineContext, params: &Record) -> Result<(), PipelineError> {
        let prior = f64_param(params, "cancer_prior", 0.25);

        let candidates = ctx.load_record("out.json", Some("gen_candidates"))?;
        let mut submission = Record::new();
        for (patient, entry) in &candidates {
            let n = entry.get("n_candidates")
                         .and_then(serde_json::Value::as_u64)
                         .ok_or_else(|| PipelineError::StepFailed { step: NAME.to_string(),
                                                                    detail: format!("candidate record for '{patient}' has no n_candidates") })?;
            submission.insert(patient.clone(), json!(cancer_probability(prior, n as usize)));
        }
        ctx.save_record("submission.json", &submission, SaveMode::Overwrite, None)?;
        ctx.log().info(&format!("submission covers {} patients", submission.len()));
        Ok(())
    }
}

/// Prior más un término saturante en el número de candidatos; siempre dentro
/// de [prior, 1).
fn cancer_probability(prior: f64, n_candidates: usize) -> f64 {
    let n = n_candidates as f64;
    prior + (1.0 - prior) * (n / (n + 5.0))
}
