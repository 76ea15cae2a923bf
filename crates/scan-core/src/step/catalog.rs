//! Catálogo estático de steps: clave corta ordinal → entry point.
//!
//! Poblado al arranque del proceso; la búsqueda es por NOMBRE de step (la
//! clave corta es el identificador estable que aparece en los logs). Un
//! nombre ausente es `UnknownStep`, surfaced de inmediato.

use indexmap::IndexMap;

use super::PipelineStep;
use crate::errors::PipelineError;

#[derive(Default)]
pub struct StepCatalog {
    entries: IndexMap<String, Box<dyn PipelineStep>>,
}

impl StepCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un step bajo su clave corta. El orden de registro se
    /// preserva (es el orden canónico del pipeline).
    pub fn register(mut self, key: &str, step: Box<dyn PipelineStep>) -> Self {
        self.entries.insert(key.to_string(), step);
        self
    }

    /// Busca por nombre de step; devuelve su clave corta y el entry point.
    pub fn by_name(&self, step_name: &str) -> Result<(&str, &dyn PipelineStep), PipelineError> {
        self.entries
            .iter()
            .find(|(_, s)| s.name() == step_name)
            .map(|(k, s)| (k.as_str(), s.as_ref()))
            .ok_or_else(|| PipelineError::UnknownStep(step_name.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&dyn PipelineStep> {
        self.entries.get(key).map(|s| s.as_ref())
    }

    /// (clave, nombre) en orden canónico.
    pub fn names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s.name()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
