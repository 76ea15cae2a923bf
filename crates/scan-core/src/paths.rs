//! Resolución de rutas: funciones puras (run, step, suffix) → directorio.
//!
//! Sin estado más allá de la configuración y sin efectos: los llamadores
//! pueden pasar runs inexistentes y aun así obtienen una ruta sintácticamente
//! válida. La existencia en disco la deciden registry / lineage.

use std::path::PathBuf;

use crate::config::PipelineConfig;

/// Mapea identificadores lógicos a rutas canónicas bajo `write_basedir`.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base: PathBuf,
    dataset: String,
}

impl PathResolver {
    pub fn new(config: &PipelineConfig) -> Self {
        Self { base: config.write_basedir.clone(),
               dataset: config.dataset_name.clone() }
    }

    /// Raíz de escritura de un run: `<base>/<dataset>_<run>/`.
    pub fn write_root(&self, run: u32) -> PathBuf {
        self.base.join(format!("{}_{}", self.dataset, run))
    }

    /// Directorio de un step dentro de un run. El suffix se concatena tal
    /// cual al nombre del step, lo que permite sub-ejecuciones disjuntas
    /// (p.ej. rangos de pacientes) sin colisión de directorios.
    pub fn step_dir(&self, run: u32, step_name: &str, suffix: &str) -> PathBuf {
        self.write_root(run).join(format!("{step_name}{suffix}"))
    }

    /// Subdirectorio de arrays numéricos de un step.
    pub fn arrays_dir(&self, run: u32, step_name: &str, suffix: &str) -> PathBuf {
        self.step_dir(run, step_name, suffix).join("arrays")
    }

    /// Subdirectorio de figuras de un step.
    pub fn figs_dir(&self, run: u32, step_name: &str, suffix: &str) -> PathBuf {
        self.step_dir(run, step_name, suffix).join("figs")
    }

    /// Ledger durable de runs: `<base>/<dataset>_runs.json`.
    pub fn registry_path(&self) -> PathBuf {
        self.base.join(format!("{}_runs.json", self.dataset))
    }

    /// Log agregado de todo el pipeline para un run (append-only).
    pub fn pipe_log_path(&self, run: u32) -> PathBuf {
        self.write_root(run).join("log.txt")
    }

    /// Log local de un step (se trunca por invocación).
    pub fn step_log_path(&self, run: u32, step_name: &str, suffix: &str) -> PathBuf {
        self.step_dir(run, step_name, suffix).join("log.txt")
    }
}
