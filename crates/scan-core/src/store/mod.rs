//! Stores de artifacts con alcance de step.
//!
//! Dos primitivas sobre el mismo directorio de step:
//! - registros estructurados (JSON ordenado por inserción), con modo merge;
//! - arrays numéricos bajo `arrays/`.
//!
//! Las cargas resuelven el directorio dueño vía linaje; las escrituras van
//! siempre al run activo. El reemplazo es atómico a granularidad de archivo
//! (escritura a temporal + rename), nunca parcial.

mod arrays;
mod records;

pub use arrays::NdArray;
pub use records::{Record, SaveMode};

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::errors::PipelineError;

/// Escritura con reemplazo atómico a nivel de archivo.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("artifact");
    let tmp = path.with_file_name(format!(".{name}.tmp"));
    let mut file = fs::File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
