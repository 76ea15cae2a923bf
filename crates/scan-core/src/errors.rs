//! Errores del core del pipeline.
//! Taxonomía cerrada: ningún error se traga ni se reintenta automáticamente;
//! todos suben al invocador y se duplican al canal pipeline en warning+.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// El nombre solicitado no existe en el catálogo estático de steps.
    #[error("unknown step '{0}': not registered in the step catalog")]
    UnknownStep(String),

    /// Agotamiento del linaje: ningún run de la cadena tiene el directorio
    /// del step. Lleva la cadena intentada para diagnóstico.
    #[error("step dir for '{step}' not found in runs {runs:?}")]
    NotFound { step: String, runs: Vec<u32> },

    /// El artifact existe en disco pero no se puede interpretar.
    #[error("corrupt artifact at {path}: {detail}")]
    Corrupt { path: PathBuf, detail: String },

    /// El step rechazó un parámetro por contrato. Se enriquece con la lista
    /// de parámetros aceptados antes de propagar.
    #[error("run() got an unexpected parameter '{name}'; valid parameters: {accepted:?}")]
    InvalidParameter { name: String, accepted: Vec<String> },

    /// No se pudo persistir el ledger de runs. Aborta antes de cualquier
    /// trabajo de step.
    #[error("failed to persist run registry at {path}: {source}")]
    RegistryWrite { path: PathBuf, source: std::io::Error },

    /// Fallo interno de un step (contenido opaco para el core).
    #[error("step '{step}' failed: {detail}")]
    StepFailed { step: String, detail: String },

    /// Operación con alcance de step invocada sin step activo en el contexto.
    #[error("no active step in pipeline context")]
    NoActiveStep,

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
