//! Step 1: mapas de probabilidad de nódulo por voxel.

use serde_json::json;

use scan_core::{NdArray, PipelineContext, PipelineError, PipelineStep, Record, SaveMode};

use crate::steps::f64_param;

const NAME: &str = "gen_prob_maps";
const ACCEPTED: &[&str] = &["steepness", "midpoint"];

/// Convierte cada volumen resampleado en un mapa de probabilidad con una
/// sigmoide por voxel. Los volúmenes de entrada se resuelven vía linaje, de
/// modo que un run nuevo puede partir del resampleo de un run previo.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenProbMaps;

impl PipelineStep for GenProbMaps {
    fn name(&self) -> &str {
        NAME
    }

    fn accepted_params(&self) -> &[&str] {
        ACCEPTED
    }

    fn run(&self, ctx: &mut PipelineContext, params: &Record) -> Result<(), PipelineError> {
        let steepness = f64_param(params, "steepness", 8.0);
        let midpoint = f64_param(params, "midpoint", 0.5);

        let resampled = ctx.load_record("out.json", Some("resample_lungs"))?;
        ctx.log().info(&format!("generating prob maps for {} patients", resampled.len()));

        let mut out = Record::new();
        for patient in resampled.keys() {
            let volume = ctx.load_array(&format!("{patient}.json"), Some("resample_lungs"))?;
            let prob_map = sigmoid_map(&volume, steepness, midpoint);
            let prob_max = prob_map.data.iter().cloned().fold(0.0_f64, f64::max);
            let path = ctx.save_array(&format!("{patient}.json"), &prob_map, None)?;
            out.insert(patient.clone(),
                       json!({ "prob_map_path": path.to_string_lossy(),
                               "prob_max": prob_max }));
        }
        ctx.save_record("out.json", &out, SaveMode::Overwrite, None)?;
        Ok(())
    }
}

fn sigmoid_map(volume: &NdArray, steepness: f64, midpoint: f64) -> NdArray {
    let data = volume.data
                     .iter()
                     .map(|v| 1.0 / (1.0 + (-steepness * (v - midpoint)).exp()))
                     .collect();
    NdArray { shape: volume.shape.clone(), data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_map_is_monotone_and_bounded() {
        let volume = NdArray::from_vec(vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let probs = sigmoid_map(&volume, 8.0, 0.5);
        assert!(probs.data.windows(2).all(|w| w[0] < w[1]));
        assert!(probs.data.iter().all(|p| (0.0..=1.0).contains(p)));
        // el midpoint cae exactamente en 0.5
        assert!((probs.data[2] - 0.5).abs() < 1e-12);
    }
}
