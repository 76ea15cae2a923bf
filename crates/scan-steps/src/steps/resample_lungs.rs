//! Step 0: normaliza los volúmenes crudos por paciente a una grilla común.

use std::path::PathBuf;

use serde_json::json;

use scan_core::{NdArray, PipelineContext, PipelineError, PipelineStep, Record, SaveMode};

use crate::patients::{init_patients, PatientRestriction};
use crate::steps::{required_str_param, usize_param};

const NAME: &str = "resample_lungs";
const ACCEPTED: &[&str] = &["raw_data_dir", "n_patients", "from_patient", "to_patient", "volume_edge"];

/// Resampleo de pulmones: enumera pacientes, produce un volumen cúbico por
/// paciente (edge³ voxels, valores normalizados a [0, 1]) y registra en
/// `out.json` la ruta y shape de cada volumen.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResampleLungs;

impl PipelineStep for ResampleLungs {
    fn name(&self) -> &str {
        NAME
    }

    fn accepted_params(&self) -> &[&str] {
        ACCEPTED
    }

    fn run(&self, ctx: &mut PipelineContext, params: &Record) -> Result<(), PipelineError> {
        let raw_dir = PathBuf::from(required_str_param(NAME, params, "raw_data_dir")?);
        let edge = usize_param(params, "volume_edge", 4);
        let restriction = restriction_from(params);

        let (patients, _suffix) = init_patients(ctx, &raw_dir, &restriction)?;
        ctx.log().info(&format!("resampling {} patients to {edge}^3 voxels", patients.len()));

        let mut out = Record::new();
        for (idx, patient) in patients.iter().enumerate() {
            let volume = synthetic_volume(idx, edge);
            let path = ctx.save_array(&format!("{patient}.json"), &volume, None)?;
            out.insert(patient.clone(),
                       json!({ "volume_path": path.to_string_lossy(),
                               "shape": volume.shape }));
        }
        ctx.save_record("out.json", &out, SaveMode::Overwrite, None)?;
        ctx.log().info(&format!("wrote {} resampled volumes", out.len()));
        Ok(())
    }
}

fn restriction_from(params: &Record) -> PatientRestriction {
    if let (Some(from), Some(to)) = (params.get("from_patient").and_then(serde_json::Value::as_u64),
                                     params.get("to_patient").and_then(serde_json::Value::as_u64))
    {
        return PatientRestriction::FromTo(from as usize, to as usize);
    }
    match usize_param(params, "n_patients", 0) {
        0 => PatientRestriction::All,
        n => PatientRestriction::FirstN(n),
    }
}

/// Volumen determinista por índice de paciente; suficiente para enhebrar los
/// steps posteriores sin un lector DICOM real.
fn synthetic_volume(patient_idx: usize, edge: usize) -> NdArray {
    let mut volume = NdArray::zeros(vec![edge, edge, edge]);
    for (i, v) in volume.data.iter_mut().enumerate() {
        *v = ((patient_idx + i) % 7) as f64 / 7.0;
    }
    volume
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_volumes_differ_per_patient_and_stay_normalized() {
        let a = synthetic_volume(0, 3);
        let b = synthetic_volume(1, 3);
        assert_ne!(a.data, b.data);
        assert!(a.data.iter().all(|v| (0.0..1.0).contains(v)));
        assert!(a.is_consistent());
    }

    #[test]
    fn fromto_params_take_precedence_over_n_patients() {
        let mut params = Record::new();
        params.insert("from_patient".into(), json!(2));
        params.insert("to_patient".into(), json!(5));
        params.insert("n_patients".into(), json!(1));
        assert_eq!(restriction_from(&params), PatientRestriction::FromTo(2, 5));
    }
}
