//! Catálogo por defecto del pipeline CT.

use scan_core::StepCatalog;

use crate::steps::{GenCandidates, GenProbMaps, GenSubmission, ResampleLungs};

/// Catálogo con las claves ordinales canónicas del pipeline. Las claves son
/// el nombre corto estable con el que el run banner y la CLI identifican cada
/// step; los huecos en la numeración son históricos y se preservan.
pub fn default_catalog() -> StepCatalog {
    StepCatalog::new().register("0", Box::new(ResampleLungs))
                      .register("1", Box::new(GenProbMaps))
                      .register("3", Box::new(GenCandidates))
                      .register("7", Box::new(GenSubmission))
}
