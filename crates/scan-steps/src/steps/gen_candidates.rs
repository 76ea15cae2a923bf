//! Step 3: extracción de candidatos por paciente, en lotes con merge.

use std::fs;

use serde_json::json;

use scan_core::{PipelineContext, PipelineError, PipelineStep, Record, SaveMode};

use crate::steps::{f64_param, usize_param};

const NAME: &str = "gen_candidates";
const ACCEPTED: &[&str] = &["threshold", "batch_size"];

/// Umbraliza los mapas de probabilidad y cuenta voxels candidatos por
/// paciente. Procesa en lotes y persiste `out.json` con `SaveMode::Merge`
/// tras cada lote, de modo que una corrida interrumpida conserva los lotes
/// completados. También emite una figura resumen, que dispara la compilación
/// del overview HTML al cierre del step.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenCandidates;

impl PipelineStep for GenCandidates {
    fn name(&self) -> &str {
        NAME
    }

    fn accepted_params(&self) -> &[&str] {
        ACCEPTED
    }

    fn run(&self, ctx: &mut PipelineContext, params: &Record) -> Result<(), PipelineError> {
        let threshold = f64_param(params, "threshold", 0.7);
        let batch_size = usize_param(params, "batch_size", 2).max(1);

        let prob_maps = ctx.load_record("out.json", Some("gen_prob_maps"))?;
        let patients: Vec<String> = prob_maps.keys().cloned().collect();
        ctx.log().info(&format!("extracting candidates for {} patients (threshold {threshold})",
                                patients.len()));

        let mut counts: Vec<(String, usize)> = Vec::with_capacity(patients.len());
        for batch in patients.chunks(batch_size) {
            let mut out = Record::new();
            for patient in batch {
                let prob_map = ctx.load_array(&format!("{patient}.json"), Some("gen_prob_maps"))?;
                let n_candidates = prob_map.data.iter().filter(|p| **p > threshold).count();
                let prob_max = prob_map.data.iter().cloned().fold(0.0_f64, f64::max);
                out.insert(patient.clone(),
                           json!({ "n_candidates": n_candidates,
                                   "prob_max": prob_max }));
                counts.push((patient.clone(), n_candidates));
            }
            ctx.save_record("out.json", &out, SaveMode::Merge, None)?;
            ctx.log().debug(&format!("batch of {} patients merged", batch.len()));
        }

        write_counts_figure(ctx, &counts)?;
        Ok(())
    }
}

/// Gráfico de barras SVG con el conteo de candidatos por paciente.
fn write_counts_figure(ctx: &mut PipelineContext, counts: &[(String, usize)]) -> Result<(), PipelineError> {
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1);
    let bar_w = 24;
    let height = 120;
    let width = counts.len() * (bar_w + 6) + 6;
    let mut svg = format!("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">\n");
    for (i, (patient, n)) in counts.iter().enumerate() {
        let h = n * (height - 20) / max;
        let x = 6 + i * (bar_w + 6);
        let y = height - h;
        svg.push_str(&format!("<rect x=\"{x}\" y=\"{y}\" width=\"{bar_w}\" height=\"{h}\"><title>{patient}: {n}</title></rect>\n"));
    }
    svg.push_str("</svg>\n");

    let figs = ctx.step_dir(None)?.join("figs");
    fs::write(figs.join("candidate_counts.svg"), svg)?;
    Ok(())
}
