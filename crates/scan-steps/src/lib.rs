//! scan-steps: steps concretos del pipeline CT y glue de dataset.
//!
//! Este crate es la capa de adaptación sobre scan-core:
//! - implementaciones de steps (unidades opacas para el core) con flujos de
//!   artifacts simplificados pero reales: registro `out.json` por step y
//!   arrays por paciente;
//! - el catálogo por defecto con las claves ordinales canónicas;
//! - enumeración de pacientes y restricciones de sub-ejecución;
//! - el escritor HTML de resumen de figuras (colaborador de visualización).
//!
//! El core solo conoce `PipelineStep` y los stores; toda la semántica de
//! dominio (pacientes, volúmenes, candidatos) vive aquí.

pub mod catalog;
pub mod overview;
pub mod patients;
pub mod steps;

pub use catalog::default_catalog;
pub use overview::HtmlOverview;
pub use patients::{init_patients, PatientRestriction};
