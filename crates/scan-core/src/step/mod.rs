//! Definiciones relacionadas a Steps.
//!
//! Un step es una unidad opaca de trabajo dentro de un run: lee artifacts de
//! steps anteriores (posiblemente de runs ancestros, vía linaje) y escribe
//! los suyos en el directorio del run activo. Este módulo define:
//! - `PipelineStep`: interfaz neutral que el executor invoca.
//! - `StepCatalog`: registro estático nombre → entry point, poblado al
//!   arranque del proceso.
//! - `ExecPhase`: máquina de estados de una invocación.

mod catalog;
mod definition;
mod status;

pub use catalog::StepCatalog;
pub use definition::PipelineStep;
pub use status::ExecPhase;
