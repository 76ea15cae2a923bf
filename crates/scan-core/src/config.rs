//! Carga de configuración del pipeline desde variables de entorno.
//! Usa convención `SCANFLOW_*` y un `.env` opcional en el directorio de trabajo.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::errors::PipelineError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Parámetros fijos de proceso: dataset y directorio raíz de escritura.
/// Todo lo demás (run activo, step activo) vive en `PipelineContext`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Nombre del dataset; prefija directorios de runs y el ledger.
    pub dataset_name: String,
    /// Directorio raíz bajo el cual se escriben todos los runs.
    pub write_basedir: PathBuf,
    /// Hint para steps que paralelizan internamente. El core nunca lo usa.
    pub n_cpus: usize,
}

impl PipelineConfig {
    pub fn new(dataset_name: impl Into<String>, write_basedir: impl Into<PathBuf>) -> Self {
        Self { dataset_name: dataset_name.into(),
               write_basedir: write_basedir.into(),
               n_cpus: 1 }
    }

    /// Lee `SCANFLOW_DATASET`, `SCANFLOW_BASEDIR` y `SCANFLOW_N_CPUS`.
    pub fn from_env() -> Result<Self, PipelineError> {
        Lazy::force(&DOTENV_LOADED);
        let dataset_name = env::var("SCANFLOW_DATASET")
            .map_err(|_| PipelineError::Config("SCANFLOW_DATASET no definido".into()))?;
        let write_basedir = env::var("SCANFLOW_BASEDIR")
            .map_err(|_| PipelineError::Config("SCANFLOW_BASEDIR no definido".into()))?;
        let n_cpus = env::var("SCANFLOW_N_CPUS").ok().and_then(|v| v.parse().ok()).unwrap_or(1);
        Ok(Self { dataset_name,
                  write_basedir: PathBuf::from(write_basedir),
                  n_cpus })
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
