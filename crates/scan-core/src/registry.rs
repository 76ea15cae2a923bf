//! Registro de runs: ledger durable y ordenado de todas las generaciones.
//!
//! El archivo `<base>/<dataset>_runs.json` es la única fuente de verdad sobre
//! qué runs existen; el estado en memoria es una cache de él. Cada mutación
//! persiste el mapa completo inmediatamente. Los identificadores son densos,
//! estrictamente crecientes desde 0 y nunca se reasignan ni borran.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::paths::PathResolver;

/// Descripción por defecto del primer run de un dataset.
pub const FIRST_RUN_DESCR: &str = "run zero";

/// Entrada del ledger: `[timestamp, description]`. Se serializa como array
/// de dos elementos para mantener el formato persistido diff-friendly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEntry(pub String, pub String);

impl RunEntry {
    pub fn timestamp(&self) -> &str {
        &self.0
    }
    pub fn description(&self) -> &str {
        &self.1
    }
}

/// Ledger ordenado por inserción (el orden es contrato observable del
/// archivo persistido, no un accidente de implementación).
#[derive(Debug)]
pub struct RunRegistry {
    path: PathBuf,
    entries: IndexMap<String, RunEntry>,
}

impl RunRegistry {
    /// Carga el ledger si existe. Un archivo presente pero no parseable se
    /// trata como ledger vacío (reescritura defensiva en la próxima
    /// mutación); las escrituras del ledger no son atómicas y un crash a
    /// mitad de escritura puede dejarlo corrupto.
    pub fn open(paths: &PathResolver) -> Result<Self, PipelineError> {
        let path = paths.registry_path();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<IndexMap<String, RunEntry>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!("run registry {} unparsable ({e}); starting from an empty ledger", path.display());
                    IndexMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    /// Reanuda el run más reciente o abre uno nuevo.
    ///
    /// - Ledger vacío: run 0, con descripción por defecto si no se da una.
    /// - `description` vacía: reutiliza el último id (reanudación
    ///   idempotente) conservando la descripción ya registrada.
    /// - `description` no vacía: asigna `last + 1`.
    pub fn resume(&mut self, description: &str) -> Result<u32, PipelineError> {
        let (run, descr) = match self.last() {
            None => {
                let d = if description.is_empty() { FIRST_RUN_DESCR } else { description };
                (0, d.to_string())
            }
            Some(last) => {
                if description.is_empty() {
                    let kept = self.description(last).unwrap_or_default().to_string();
                    (last, kept)
                } else {
                    (last + 1, description.to_string())
                }
            }
        };
        self.record(run, &descr)?;
        Ok(run)
    }

    /// Selecciona explícitamente `run` como activo. Si el ledger ya tiene
    /// descripción para ese run y no se provee una, se conserva la
    /// existente; de lo contrario se sobreescribe.
    pub fn pin(&mut self, run: u32, description: &str) -> Result<u32, PipelineError> {
        let descr = if description.is_empty() {
            self.description(run).unwrap_or_default().to_string()
        } else {
            description.to_string()
        };
        self.record(run, &descr)?;
        Ok(run)
    }

    /// Identificador más alto registrado, si hay alguno.
    pub fn last(&self) -> Option<u32> {
        self.entries.last().and_then(|(k, _)| k.parse().ok())
    }

    pub fn description(&self, run: u32) -> Option<&str> {
        self.entries.get(&run.to_string()).map(|e| e.description())
    }

    pub fn entries(&self) -> &IndexMap<String, RunEntry> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estampa el timestamp, actualiza el mapa y persiste el ledger entero.
    /// Fallo de persistencia es fatal para el step que llama.
    fn record(&mut self, run: u32, description: &str) -> Result<(), PipelineError> {
        let ts = Local::now().format("%Y-%m-%d %H:%M").to_string();
        self.entries.insert(run.to_string(), RunEntry(ts, description.to_string()));
        self.persist()
    }

    fn persist(&self) -> Result<(), PipelineError> {
        let body = serde_json::to_string_pretty(&self.entries)
            .expect("registry map serializes to JSON");
        fs::write(&self.path, body).map_err(|source| PipelineError::RegistryWrite { path: self.path.clone(),
                                                                                    source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    fn resolver(dir: &std::path::Path) -> PathResolver {
        PathResolver::new(&PipelineConfig::new("dsb3", dir))
    }

    #[test]
    fn fresh_resume_allocates_run_zero_with_default_descr() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = resolver(tmp.path());
        let mut reg = RunRegistry::open(&paths).unwrap();
        let run = reg.resume("").unwrap();
        assert_eq!(run, 0);
        assert_eq!(reg.description(0), Some(FIRST_RUN_DESCR));

        // el archivo contiene exactamente una entrada "0"
        let raw = std::fs::read_to_string(paths.registry_path()).unwrap();
        let map: IndexMap<String, RunEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("0").unwrap().description(), FIRST_RUN_DESCR);
    }

    #[test]
    fn empty_resume_is_idempotent_and_keeps_description() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = resolver(tmp.path());
        let mut reg = RunRegistry::open(&paths).unwrap();
        reg.resume("baseline").unwrap(); // primer run con descripción explícita
        drop(reg);

        let mut reg = RunRegistry::open(&paths).unwrap();
        let run = reg.resume("").unwrap();
        assert_eq!(run, 0);
        assert_eq!(reg.description(0), Some("baseline"));
    }

    #[test]
    fn nonempty_resume_allocates_next_run_and_preserves_prior_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = resolver(tmp.path());
        let mut reg = RunRegistry::open(&paths).unwrap();
        reg.resume("").unwrap();
        let ts0 = reg.entries().get("0").unwrap().timestamp().to_string();

        let run = reg.resume("new masks").unwrap();
        assert_eq!(run, 1);
        assert_eq!(reg.last(), Some(1));
        assert_eq!(reg.entries().get("0").unwrap().timestamp(), ts0);
        assert_eq!(reg.description(1), Some("new masks"));
    }

    #[test]
    fn pin_keeps_existing_description_when_none_supplied() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = resolver(tmp.path());
        let mut reg = RunRegistry::open(&paths).unwrap();
        reg.resume("labelled once").unwrap();
        reg.resume("second").unwrap();

        let run = reg.pin(0, "").unwrap();
        assert_eq!(run, 0);
        assert_eq!(reg.description(0), Some("labelled once"));

        reg.pin(0, "relabelled").unwrap();
        assert_eq!(reg.description(0), Some("relabelled"));
    }

    #[test]
    fn unparsable_ledger_restarts_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = resolver(tmp.path());
        std::fs::write(paths.registry_path(), "{ truncated").unwrap();
        let mut reg = RunRegistry::open(&paths).unwrap();
        assert!(reg.is_empty());
        assert_eq!(reg.resume("").unwrap(), 0);
    }

    #[test]
    fn insertion_order_is_preserved_in_the_persisted_file() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = resolver(tmp.path());
        let mut reg = RunRegistry::open(&paths).unwrap();
        reg.resume("").unwrap();
        reg.resume("a").unwrap();
        reg.resume("b").unwrap();

        let raw = std::fs::read_to_string(paths.registry_path()).unwrap();
        let keys: Vec<String> = serde_json::from_str::<IndexMap<String, RunEntry>>(&raw).unwrap()
                                                                                        .keys()
                                                                                        .cloned()
                                                                                        .collect();
        assert_eq!(keys, vec!["0", "1", "2"]);
    }
}
