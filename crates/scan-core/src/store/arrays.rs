//! Arrays numéricos con nombre, bajo `arrays/` de cada step.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::write_atomic;
use crate::context::PipelineContext;
use crate::errors::PipelineError;

/// Array n-dimensional plano (row-major). El codec concreto es neutro para
/// el core; aquí se persiste como JSON con shape explícito.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl NdArray {
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self { shape, data: vec![0.0; len] }
    }

    /// Array 1-D desde un vector.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self { shape: vec![data.len()], data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consistencia shape ↔ datos.
    pub fn is_consistent(&self) -> bool {
        self.shape.iter().product::<usize>() == self.data.len()
    }
}

impl PipelineContext {
    /// Escribe un array bajo `arrays/` del step (run activo) y devuelve la
    /// ruta completa, para referenciarla desde registros estructurados.
    pub fn save_array(&self,
                      name: &str,
                      array: &NdArray,
                      step_name: Option<&str>)
                      -> Result<PathBuf, PipelineError> {
        let dir = self.step_dir(step_name)?.join("arrays");
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        let body = serde_json::to_vec(array).expect("array serializes to JSON");
        write_atomic(&path, &body)?;
        Ok(path)
    }

    /// Carga un array resolviendo el directorio dueño vía linaje.
    pub fn load_array(&self, name: &str, step_name: Option<&str>) -> Result<NdArray, PipelineError> {
        let path = self.step_dir_for_load(step_name)?.join("arrays").join(name);
        let raw = fs::read_to_string(&path)?;
        let array: NdArray = serde_json::from_str(&raw).map_err(|e| PipelineError::Corrupt { path: path.clone(),
                                                                                            detail: e.to_string() })?;
        if !array.is_consistent() {
            return Err(PipelineError::Corrupt { path,
                                                detail: format!("shape {:?} does not match {} data elements",
                                                                array.shape,
                                                                array.data.len()) });
        }
        Ok(array)
    }
}
