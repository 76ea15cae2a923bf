//! Registros estructurados: mapas JSON ordenados con nombre, por step.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use super::write_atomic;
use crate::context::PipelineContext;
use crate::errors::PipelineError;

/// Mapa JSON que preserva orden de inserción (`serde_json` con
/// `preserve_order`): el orden de claves del archivo persistido es parte del
/// contrato, no un accidente.
pub type Record = serde_json::Map<String, Value>;

/// Política de escritura de un registro ya existente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Escribe incondicionalmente.
    Overwrite,
    /// Unión superficial de claves con el registro existente EN EL STEP DIR
    /// ACTUAL (ruta directa, nunca linaje); el valor nuevo gana. Permite a un
    /// step acumular salida por lotes de sub-invocaciones.
    Merge,
}

impl PipelineContext {
    /// Serializa `record` bajo `name` en el directorio del step (run activo).
    pub fn save_record(&self,
                       name: &str,
                       record: &Record,
                       mode: SaveMode,
                       step_name: Option<&str>)
                       -> Result<PathBuf, PipelineError> {
        let dir = self.step_dir(step_name)?;
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        let merged = match mode {
            SaveMode::Merge if path.exists() => {
                let mut old = read_record(&path)?;
                for (k, v) in record {
                    old.insert(k.clone(), v.clone());
                }
                old
            }
            _ => record.clone(),
        };
        let body = serde_json::to_vec_pretty(&Value::Object(merged))
            .expect("record serializes to JSON");
        write_atomic(&path, &body)?;
        Ok(path)
    }

    /// Carga un registro resolviendo el directorio dueño vía linaje.
    ///
    /// Falla con `NotFound` (agotamiento del linaje, propagado del resolver)
    /// o `Corrupt` si el archivo existe pero no parsea. Un archivo ausente en
    /// un directorio presente es un error io más específico, no `NotFound`.
    pub fn load_record(&self, name: &str, step_name: Option<&str>) -> Result<Record, PipelineError> {
        let dir = self.step_dir_for_load(step_name)?;
        read_record(&dir.join(name))
    }
}

fn read_record(path: &std::path::Path) -> Result<Record, PipelineError> {
    let raw = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(PipelineError::Corrupt { path: path.to_path_buf(),
                                                  detail: format!("expected a JSON object, found {other}") }),
        Err(e) => Err(PipelineError::Corrupt { path: path.to_path_buf(),
                                               detail: e.to_string() }),
    }
}
