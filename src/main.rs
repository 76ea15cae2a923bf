//! Driver de demostración: dos runs encadenados sobre un dataset sintético.
//!
//! El run 0 ejecuta el catálogo completo; el run 1 solo re-ejecuta la
//! extracción de candidatos y la submission, resolviendo los artifacts
//! upstream del run 0 vía linaje. Al final imprime el ledger de runs.
//!
//! Respeta `SCANFLOW_DATASET` y `SCANFLOW_BASEDIR` si están definidos; si no,
//! escribe bajo `./scanflow_demo`.

use std::path::PathBuf;

use serde_json::json;

use scan_core::{PipelineConfig, PipelineContext, PipelineError, Record, StepExecutor};
use scan_steps::{default_catalog, HtmlOverview};

fn main() {
    if let Err(e) = run_demo() {
        eprintln!("[scanflow demo] {e}");
        std::process::exit(1);
    }
}

fn run_demo() -> Result<(), PipelineError> {
    scan_core::init_dotenv();
    let config = PipelineConfig::from_env().unwrap_or_else(|_| PipelineConfig::new("dsb3", "scanflow_demo"));

    let raw = seed_raw_data(&config.write_basedir.join("raw"), 4)?;
    let catalog = default_catalog();
    let viz = HtmlOverview;

    // run 0: pipeline completo
    let mut ctx = PipelineContext::resume(config.clone(), "demo baseline")?;
    let mut exec = StepExecutor::new(&catalog, &viz);
    let mut params = Record::new();
    params.insert("raw_data_dir".into(), json!(raw.to_string_lossy()));
    params.insert("volume_edge".into(), json!(3));
    exec.run_step(&mut ctx, "resample_lungs", &params, "")?;
    exec.run_step(&mut ctx, "gen_prob_maps", &Record::new(), "")?;
    exec.run_step(&mut ctx, "gen_candidates", &Record::new(), "")?;
    exec.run_step(&mut ctx, "gen_submission", &Record::new(), "")?;

    // run 1: umbral distinto, reutilizando los prob maps del run 0
    let mut ctx = PipelineContext::resume(config.clone(), "stricter threshold")?;
    let mut exec = StepExecutor::new(&catalog, &viz);
    let mut params = Record::new();
    params.insert("threshold".into(), json!(0.85));
    exec.run_step(&mut ctx, "gen_candidates", &params, "")?;
    exec.run_step(&mut ctx, "gen_submission", &Record::new(), "")?;

    println!("runs de {}:", config.dataset_name);
    for (run, entry) in ctx.registry().entries() {
        println!("  {run}  {}  {}", entry.timestamp(), entry.description());
    }
    let submission = ctx.load_record("submission.json", Some("gen_submission"))?;
    println!("submission del run {} cubre {} pacientes", ctx.run(), submission.len());
    Ok(())
}

fn seed_raw_data(raw: &PathBuf, n: usize) -> Result<PathBuf, PipelineError> {
    for i in 0..n {
        std::fs::create_dir_all(raw.join(format!("patient_{i:02}")))?;
    }
    Ok(raw.clone())
}
