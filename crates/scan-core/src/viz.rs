//! Seam del agregador de visualización (colaborador externo).
//!
//! El executor solo decide CUÁNDO invocarlo: tras un step exitoso y solo si
//! el directorio de figuras quedó no vacío. Un `figs/` vacío o ausente es un
//! resultado normal, nunca un error.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::PipelineError;

/// Produce un documento resumen a partir de un directorio de figuras.
pub trait OverviewWriter {
    /// Devuelve la ruta del documento generado.
    fn write_overview(&self, figs_dir: &Path) -> Result<PathBuf, PipelineError>;
}

/// Implementación nula para contextos sin rendering (tests, CLI headless).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOverview;

impl OverviewWriter for NullOverview {
    fn write_overview(&self, figs_dir: &Path) -> Result<PathBuf, PipelineError> {
        // convención: el resumen vive junto a figs/, no dentro
        Ok(figs_dir.with_extension("html"))
    }
}

pub(crate) fn dir_is_empty(dir: &Path) -> Result<bool, PipelineError> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
