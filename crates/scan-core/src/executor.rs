//! Executor de steps: orquesta una invocación completa.
//!
//! Secuencia por invocación (ver `ExecPhase`):
//! 1. resolver el step en el catálogo y preparar directorios y logs;
//! 2. persistir el bundle de parámetros ANTES de cualquier cómputo — todo
//!    artifact del directorio debe poder explicarse por el `params.json`
//!    adyacente;
//! 3. validar nombres de parámetros por contrato en la frontera de llamada;
//! 4. despachar al entry point opaco;
//! 5. descubrimiento de visualización sobre `figs/`;
//! 6. marcador de finalización en ambos canales.
//!
//! Fallos durante la ejecución son fatales para la invocación (sin retry);
//! los artifacts parciales quedan en su lugar y el camino de recuperación es
//! re-ejecutar el step en modo overwrite.

use std::path::PathBuf;

use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::step::{ExecPhase, PipelineStep, StepCatalog};
use crate::store::{Record, SaveMode};
use crate::viz::{dir_is_empty, OverviewWriter};

pub struct StepExecutor<'a> {
    catalog: &'a StepCatalog,
    viz: &'a dyn OverviewWriter,
    phase: ExecPhase,
}

impl<'a> StepExecutor<'a> {
    pub fn new(catalog: &'a StepCatalog, viz: &'a dyn OverviewWriter) -> Self {
        Self { catalog,
               viz,
               phase: ExecPhase::Idle }
    }

    /// Fase de la última invocación (o `Idle`).
    pub fn phase(&self) -> ExecPhase {
        self.phase
    }

    /// Ejecuta una invocación completa de `step_name` con `params`.
    ///
    /// `suffix` particiona el directorio del step para sub-ejecuciones
    /// disjuntas; el log local trunca (un suffix de fork no reanuda logs de
    /// la ejecución completa).
    pub fn run_step(&mut self,
                    ctx: &mut PipelineContext,
                    step_name: &str,
                    params: &Record,
                    suffix: &str)
                    -> Result<(), PipelineError> {
        self.phase = ExecPhase::Idle;
        let (key, step) = self.catalog.by_name(step_name)?;

        self.phase = ExecPhase::Preparing;
        ctx.enter_step(key, step_name, suffix, false)?;

        let mut info = format!("run {} ({}) / step {} ({})", ctx.run(), ctx.run_description(), key, step_name);
        if let Some(init) = ctx.init_run() {
            info.push_str(&format!(" with init {init}"));
        }
        if !suffix.is_empty() {
            info.push_str(&format!(" / writing to {}", ctx.step_dir(None)?.display()));
        }
        ctx.log_pipe().info(&info);

        // volcado de params para inspección visual en el log del step
        let mut params_info = info;
        for (k, v) in params {
            params_info.push_str(&format!("\n    {k} = {v}"));
        }
        ctx.log().info(&params_info);

        // contrato de reproducibilidad: params a disco antes de computar
        ctx.save_record("params.json", params, SaveMode::Overwrite, None)?;
        self.phase = ExecPhase::ParamsPersisted;

        if let Err(e) = validate_params(step, params) {
            return Err(self.fail(ctx, e));
        }

        self.phase = ExecPhase::Running;
        if let Err(e) = step.run(ctx, params) {
            return Err(self.fail(ctx, e));
        }

        self.phase = ExecPhase::VisualizationCheck;
        if let Some(overview) = self.check_figs(ctx)? {
            ctx.log().info(&format!("... wrote {}", overview.display()));
        }

        let finish_msg = "... finished the step";
        ctx.log().info(finish_msg);
        ctx.log_pipe().info(finish_msg);
        self.phase = ExecPhase::Completed;
        Ok(())
    }

    /// Re-ejecuta solo el descubrimiento de visualización para un step ya
    /// presente en el run activo (log local en modo append).
    pub fn visualize_step(&mut self,
                          ctx: &mut PipelineContext,
                          step_name: &str)
                          -> Result<Option<PathBuf>, PipelineError> {
        let (key, _) = self.catalog.by_name(step_name)?;
        let suffix = ctx.suffix().to_string();
        ctx.enter_step(key, step_name, &suffix, true)?;
        let overview = self.check_figs(ctx)?;
        if let Some(path) = &overview {
            ctx.log().info(&format!("... wrote {}", path.display()));
        }
        Ok(overview)
    }

    fn check_figs(&self, ctx: &PipelineContext) -> Result<Option<PathBuf>, PipelineError> {
        let figs = ctx.step_dir(None)?.join("figs");
        if figs.is_dir() && !dir_is_empty(&figs)? {
            return self.viz.write_overview(&figs).map(Some);
        }
        Ok(None)
    }

    /// Marca la fase terminal y duplica el error al canal pipeline (vía el
    /// espejo warning+ del canal step) antes de propagarlo sin alterar.
    fn fail(&mut self, ctx: &mut PipelineContext, err: PipelineError) -> PipelineError {
        self.phase = ExecPhase::Failed;
        ctx.log().warn(&err.to_string());
        err
    }
}

/// Validación por contrato en la frontera: cada nombre del bundle debe estar
/// en `accepted_params()`. Nada de pattern-matching sobre mensajes de error.
fn validate_params(step: &dyn PipelineStep, params: &Record) -> Result<(), PipelineError> {
    let accepted = step.accepted_params();
    for name in params.keys() {
        if !accepted.contains(&name.as_str()) {
            return Err(PipelineError::InvalidParameter { name: name.clone(),
                                                         accepted: accepted.iter()
                                                                           .map(|s| s.to_string())
                                                                           .collect() });
        }
    }
    Ok(())
}
