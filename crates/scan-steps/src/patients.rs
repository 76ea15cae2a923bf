//! Enumeración de pacientes y restricciones de sub-ejecución.
//!
//! La lista de pacientes se materializa una vez por run en
//! `patients_raw_data_paths.json` (en la raíz del run, no en un step): mapa
//! ordenado id → ruta de datos crudos. Runs posteriores la releen tal cual,
//! de modo que el orden de enumeración queda congelado en el run que la creó.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use scan_core::{PipelineContext, PipelineError, Record};

/// Restricción del conjunto de pacientes para esta sesión.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientRestriction {
    /// Población completa.
    All,
    /// Primeros `n` pacientes del orden congelado.
    FirstN(usize),
    /// Un único paciente por id.
    Single(String),
    /// Rango semiabierto `[from, to)`; produce el suffix de directorio
    /// `_fromto<from>-<to>` para que ejecuciones paralelas por rango no
    /// colisionen.
    FromTo(usize, usize),
}

/// Carga (o crea) la lista de pacientes del run activo y aplica la
/// restricción. Devuelve los ids seleccionados y el suffix de directorio que
/// corresponde a la restricción (vacío salvo `FromTo`).
pub fn init_patients(ctx: &PipelineContext,
                     raw_data_dir: &Path,
                     restriction: &PatientRestriction)
                     -> Result<(Vec<String>, String), PipelineError> {
    let listing = ctx.paths().write_root(ctx.run()).join("patients_raw_data_paths.json");
    let all: Vec<(String, String)> = if listing.is_file() {
        let raw = fs::read_to_string(&listing)?;
        let map: Record = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Err(PipelineError::Corrupt { path: listing,
                                                    detail: "patient listing is not a JSON object".into() })
            }
        };
        map.into_iter()
           .map(|(id, path)| (id, path.as_str().unwrap_or_default().to_string()))
           .collect()
    } else {
        let enumerated = enumerate_raw_dir(raw_data_dir)?;
        let mut map = Record::new();
        for (id, path) in &enumerated {
            map.insert(id.clone(), json!(path));
        }
        fs::write(&listing, serde_json::to_string_pretty(&Value::Object(map)).expect("listing serializes"))?;
        enumerated
    };

    let ids: Vec<String> = all.iter().map(|(id, _)| id.clone()).collect();
    let (selected, suffix) = match restriction {
        PatientRestriction::All => (ids, String::new()),
        PatientRestriction::FirstN(n) => (ids.into_iter().take(*n).collect(), String::new()),
        PatientRestriction::Single(id) => {
            let hit: Vec<String> = ids.into_iter().filter(|p| p == id).collect();
            (hit, String::new())
        }
        PatientRestriction::FromTo(from, to) => {
            let slice: Vec<String> = ids.into_iter().skip(*from).take(to.saturating_sub(*from)).collect();
            (slice, format!("_fromto{from}-{to}"))
        }
    };
    Ok((selected, suffix))
}

/// Enumera subdirectorios de los datos crudos (un directorio por paciente),
/// en orden lexicográfico estable.
fn enumerate_raw_dir(raw_data_dir: &Path) -> Result<Vec<(String, String)>, PipelineError> {
    let mut patients = Vec::new();
    for entry in fs::read_dir(raw_data_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            let id = entry.file_name().to_string_lossy().to_string();
            patients.push((id, entry.path().to_string_lossy().to_string()));
        }
    }
    patients.sort();
    Ok(patients)
}
