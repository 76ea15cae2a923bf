use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::store::Record;

/// Entry point de un step. El contenido científico es opaco para el core:
/// el contrato es un `run` que recibe el contexto y un bundle de parámetros
/// con nombre, y no devuelve nada.
pub trait PipelineStep {
    /// Nombre estable del step; determina su directorio dentro del run.
    fn name(&self) -> &str;

    /// Parámetros que `run` reconoce. El executor valida el bundle contra
    /// esta lista ANTES de despachar; un nombre desconocido produce
    /// `InvalidParameter` enriquecido con esta lista.
    fn accepted_params(&self) -> &[&str];

    /// Ejecuta el step. Lee inputs vía stores (que resuelven linaje) y
    /// escribe sus artifacts en el directorio del run activo.
    fn run(&self, ctx: &mut PipelineContext, params: &Record) -> Result<(), PipelineError>;
}
