//! scan-core: motor de versionado run/step y resolución de artifacts.
//!
//! Coordina un pipeline batch multi-etapa sobre una población fija de
//! sujetos: las ejecuciones se versionan como "runs" inmutables y numerados,
//! los steps escriben artifacts en el directorio de su run, y las cargas
//! buscan hacia atrás en el linaje de runs cuando el run activo no tiene el
//! step pedido. Ejecución secuencial en un solo proceso; el filesystem bajo
//! `write_basedir` es el único estado compartido (sin locking — particionar
//! por suffix si hay varios procesos).

pub mod config;
pub mod context;
pub mod errors;
pub mod executor;
pub mod lineage;
pub mod logging;
pub mod paths;
pub mod registry;
pub mod step;
pub mod store;
pub mod viz;

pub use config::{init_dotenv, PipelineConfig};
pub use context::{ActiveStep, PipelineContext};
pub use errors::PipelineError;
pub use executor::StepExecutor;
pub use lineage::{trial_runs, LineageResolver};
pub use logging::ChannelLog;
pub use paths::PathResolver;
pub use registry::{RunEntry, RunRegistry, FIRST_RUN_DESCR};
pub use step::{ExecPhase, PipelineStep, StepCatalog};
pub use store::{NdArray, Record, SaveMode};
pub use viz::{NullOverview, OverviewWriter};
