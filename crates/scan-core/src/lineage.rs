//! Resolución de linaje: búsqueda hacia atrás en la historia de runs.
//!
//! Cuando un step pide un artifact que el run activo no tiene, se consulta
//! una cadena de runs ancestros: `[run, init, init-1, …, 0]`, donde `init`
//! es `run - 1` salvo que esté fijado explícitamente. Así un step N consume
//! de forma transparente salidas del step N-1 aunque éste se haya ejecutado
//! por última vez varios runs atrás.
//!
//! Invariante (intencional y sorprendente): el criterio de parada es la
//! EXISTENCIA DEL DIRECTORIO del step, no del artifact puntual. Un step que
//! crasheó tras crear su directorio cuenta como "presente"; la ausencia del
//! artifact concreto es un fallo distinto y más específico (`Corrupt` /
//! io NotFound) que el agotamiento del linaje.

use std::path::PathBuf;

use crate::errors::PipelineError;
use crate::paths::PathResolver;

/// Cadena de runs a consultar, del más prioritario al menos.
pub fn trial_runs(run: u32, init_run: Option<u32>) -> Vec<u32> {
    let mut chain = vec![run];
    let init = match init_run {
        Some(pinned) => Some(pinned),
        None => run.checked_sub(1), // run 0 sin pin: no hay ancestros
    };
    if let Some(init) = init {
        chain.extend((0..=init).rev());
    }
    chain
}

/// Resuelve el directorio dueño de un step para operaciones de carga.
#[derive(Debug, Clone, Copy)]
pub struct LineageResolver<'a> {
    paths: &'a PathResolver,
    run: u32,
    init_run: Option<u32>,
}

impl<'a> LineageResolver<'a> {
    pub fn new(paths: &'a PathResolver, run: u32, init_run: Option<u32>) -> Self {
        Self { paths, run, init_run }
    }

    /// Primer run de la cadena cuyo directorio de step existe en disco.
    pub fn resolve_for_load(&self, step_name: &str, suffix: &str) -> Result<PathBuf, PipelineError> {
        let chain = trial_runs(self.run, self.init_run);
        for &run in &chain {
            let dir = self.paths.step_dir(run, step_name, suffix);
            if dir.is_dir() {
                return Ok(dir);
            }
        }
        Err(PipelineError::NotFound { step: step_name.to_string(),
                                      runs: chain })
    }
}
