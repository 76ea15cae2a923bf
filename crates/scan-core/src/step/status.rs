/// Fase de una invocación de step en el executor.
///
/// Las transiciones válidas son:
/// - `Idle` -> `Preparing` (step resuelto en el catálogo, directorios creados)
/// - `Preparing` -> `ParamsPersisted` (params escritos antes de computar)
/// - `ParamsPersisted` -> `Running`
/// - `Running` -> `VisualizationCheck`
/// - `VisualizationCheck` -> `Completed`
/// - `ParamsPersisted` | `Running` -> `Failed`
///
/// No se permiten reversiones ni saltos arbitrarios entre fases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecPhase {
    Idle,
    Preparing,
    ParamsPersisted,
    Running,
    VisualizationCheck,
    Completed,
    Failed,
}
