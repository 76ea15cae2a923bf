//! Contexto explícito del pipeline.
//!
//! Todo el estado de sesión (run activo, step activo, handles de log) vive
//! aquí y se enhebra por cada llamada: registry, executor y stores reciben
//! el contexto. Nada de globals de proceso; varios contextos pueden coexistir
//! en un mismo proceso (clave para tests).

use std::fs;
use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::lineage::LineageResolver;
use crate::logging::ChannelLog;
use crate::paths::PathResolver;
use crate::registry::RunRegistry;

/// Step actualmente en ejecución dentro del contexto.
#[derive(Debug, Clone)]
pub struct ActiveStep {
    /// Clave corta y estable del catálogo (p.ej. "0", "3eval").
    pub key: String,
    pub name: String,
    /// Modificador de directorio para sub-ejecuciones disjuntas.
    pub suffix: String,
}

/// Contexto de un run activo. Construirlo ya implica: registry actualizado y
/// persistido, raíz del run creada en disco y canal pipeline abierto.
pub struct PipelineContext {
    pub config: PipelineConfig,
    paths: PathResolver,
    registry: RunRegistry,
    run: u32,
    init_run: Option<u32>,
    active_step: Option<ActiveStep>,
    log_pipe: ChannelLog,
    log_step: Option<ChannelLog>,
}

impl PipelineContext {
    /// Reanuda el run más reciente (o abre el run 0 / `last + 1` según la
    /// descripción). Ver `RunRegistry::resume`.
    pub fn resume(config: PipelineConfig, description: &str) -> Result<Self, PipelineError> {
        Self::activate(config, |reg| reg.resume(description))
    }

    /// Fija explícitamente un run como activo. Ver `RunRegistry::pin`.
    pub fn pin(config: PipelineConfig, run: u32, description: &str) -> Result<Self, PipelineError> {
        Self::activate(config, |reg| reg.pin(run, description))
    }

    fn activate(config: PipelineConfig,
                select: impl FnOnce(&mut RunRegistry) -> Result<u32, PipelineError>)
                -> Result<Self, PipelineError> {
        let paths = PathResolver::new(&config);
        fs::create_dir_all(&config.write_basedir)?;
        let mut registry = RunRegistry::open(&paths)?;
        let run = select(&mut registry)?;
        fs::create_dir_all(paths.write_root(run))?;
        let log_pipe = ChannelLog::pipeline(&paths.pipe_log_path(run))?;
        Ok(Self { config,
                  paths,
                  registry,
                  run,
                  init_run: None,
                  active_step: None,
                  log_pipe,
                  log_step: None })
    }

    /// Fija el run inicial de la cadena de linaje (por defecto `run - 1`).
    pub fn with_init_run(mut self, init_run: Option<u32>) -> Self {
        self.init_run = init_run;
        self
    }

    pub fn run(&self) -> u32 {
        self.run
    }

    pub fn init_run(&self) -> Option<u32> {
        self.init_run
    }

    pub fn run_description(&self) -> &str {
        self.registry.description(self.run).unwrap_or_default()
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn registry(&self) -> &RunRegistry {
        &self.registry
    }

    pub fn active_step(&self) -> Option<&ActiveStep> {
        self.active_step.as_ref()
    }

    /// Suffix activo; vacío fuera de un step.
    pub fn suffix(&self) -> &str {
        self.active_step.as_ref().map(|s| s.suffix.as_str()).unwrap_or("")
    }

    /// Entra en el alcance de un step: crea directorio de datos, `arrays/` y
    /// `figs/`, y abre el canal de log local (truncando salvo `append_log`).
    /// El suffix reemplaza al anterior; no se acumula.
    pub(crate) fn enter_step(&mut self,
                             key: &str,
                             name: &str,
                             suffix: &str,
                             append_log: bool)
                             -> Result<(), PipelineError> {
        let step_dir = self.paths.step_dir(self.run, name, suffix);
        fs::create_dir_all(self.paths.arrays_dir(self.run, name, suffix))?;
        fs::create_dir_all(self.paths.figs_dir(self.run, name, suffix))?;
        let log = ChannelLog::step(&step_dir.join("log.txt"),
                                   &self.paths.pipe_log_path(self.run),
                                   append_log)?;
        self.log_step = Some(log);
        self.active_step = Some(ActiveStep { key: key.to_string(),
                                             name: name.to_string(),
                                             suffix: suffix.to_string() });
        Ok(())
    }

    /// Directorio de escritura de un step en el run ACTIVO. Con `None` usa el
    /// step activo. El suffix activo aplica también a steps hermanos, de modo
    /// que una sub-ejecución forked lee y escribe dentro de su partición.
    pub fn step_dir(&self, step_name: Option<&str>) -> Result<PathBuf, PipelineError> {
        let name = self.resolve_step_name(step_name)?;
        Ok(self.paths.step_dir(self.run, name, self.suffix()))
    }

    /// Directorio dueño de un step para CARGA, buscando hacia atrás en la
    /// cadena de linaje si el run activo no lo tiene.
    pub fn step_dir_for_load(&self, step_name: Option<&str>) -> Result<PathBuf, PipelineError> {
        let name = self.resolve_step_name(step_name)?.to_string();
        self.lineage().resolve_for_load(&name, self.suffix())
    }

    pub(crate) fn lineage(&self) -> LineageResolver<'_> {
        LineageResolver::new(&self.paths, self.run, self.init_run)
    }

    fn resolve_step_name<'a>(&'a self, step_name: Option<&'a str>) -> Result<&'a str, PipelineError> {
        match step_name {
            Some(name) => Ok(name),
            None => self.active_step
                        .as_ref()
                        .map(|s| s.name.as_str())
                        .ok_or(PipelineError::NoActiveStep),
        }
    }

    /// Canal pipeline (agregado, append-only).
    pub fn log_pipe(&mut self) -> &mut ChannelLog {
        &mut self.log_pipe
    }

    /// Canal preferente para autores de steps: el local si hay step activo,
    /// el pipeline en caso contrario.
    pub fn log(&mut self) -> &mut ChannelLog {
        self.log_step.as_mut().unwrap_or(&mut self.log_pipe)
    }
}
