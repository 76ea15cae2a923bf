//! Test end-to-end del pipeline: dos runs encadenados por linaje sobre un
//! dataset sintético, más layout de directorios y ledger.

use serde_json::{json, Value};

use scan_core::{trial_runs, PipelineConfig, PipelineContext, PipelineError, Record, StepExecutor};
use scan_steps::{default_catalog, HtmlOverview};

fn seed_raw_data(base: &std::path::Path, n: usize) -> std::path::PathBuf {
    let raw = base.join("raw");
    for i in 0..n {
        std::fs::create_dir_all(raw.join(format!("patient_{i:02}"))).unwrap();
    }
    raw
}

fn record(pairs: &[(&str, Value)]) -> Record {
    let mut r = Record::new();
    for (k, v) in pairs {
        r.insert(k.to_string(), v.clone());
    }
    r
}

#[test]
fn second_run_reuses_upstream_artifacts_through_lineage() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = seed_raw_data(tmp.path(), 4);
    let config = PipelineConfig::new("dsb3", tmp.path().join("runs"));
    let catalog = default_catalog();
    let viz = HtmlOverview;

    // run 0: pipeline completo
    let mut ctx = PipelineContext::resume(config.clone(), "baseline").unwrap();
    assert_eq!(ctx.run(), 0);
    let mut exec = StepExecutor::new(&catalog, &viz);
    exec.run_step(&mut ctx,
                  "resample_lungs",
                  &record(&[("raw_data_dir", json!(raw.to_string_lossy()))]),
                  "")
        .unwrap();
    exec.run_step(&mut ctx, "gen_prob_maps", &record(&[]), "").unwrap();
    exec.run_step(&mut ctx, "gen_candidates", &record(&[("threshold", json!(0.6))]), "").unwrap();
    exec.run_step(&mut ctx, "gen_submission", &record(&[]), "").unwrap();

    // run 1: solo el tramo final, con umbral más estricto
    let mut ctx = PipelineContext::resume(config.clone(), "stricter threshold").unwrap();
    assert_eq!(ctx.run(), 1);
    let mut exec = StepExecutor::new(&catalog, &viz);
    exec.run_step(&mut ctx, "gen_candidates", &record(&[("threshold", json!(0.95))]), "").unwrap();
    exec.run_step(&mut ctx, "gen_submission", &record(&[]), "").unwrap();

    // el run 1 no tiene prob maps propios: la cadena [1, 0] los resolvió en 0
    assert_eq!(trial_runs(1, None), vec![1, 0]);
    assert!(!ctx.paths().step_dir(1, "gen_prob_maps", "").exists());
    assert!(ctx.paths().step_dir(1, "gen_candidates", "").is_dir());

    let strict = ctx.load_record("submission.json", Some("gen_submission")).unwrap();
    assert_eq!(strict.len(), 4);

    // el umbral más estricto nunca sube la probabilidad de nadie
    let ctx0 = PipelineContext::pin(config.clone(), 0, "").unwrap();
    let baseline = ctx0.load_record("submission.json", Some("gen_submission")).unwrap();
    for (patient, p1) in &strict {
        let p0 = baseline.get(patient).and_then(Value::as_f64).unwrap();
        assert!(p1.as_f64().unwrap() <= p0, "{patient} grew under a stricter threshold");
    }

    // ledger: dos entradas, en orden, con las descripciones dadas
    let entries = ctx.registry().entries();
    let listed: Vec<(&str, &str)> = entries.iter().map(|(k, e)| (k.as_str(), e.description())).collect();
    assert_eq!(listed, vec![("0", "baseline"), ("1", "stricter threshold")]);

    // layout en disco: <base>/<dataset>_<run>/<step>/...
    let base = tmp.path().join("runs");
    assert!(base.join("dsb3_runs.json").is_file());
    assert!(base.join("dsb3_0").join("log.txt").is_file());
    assert!(base.join("dsb3_1").join("gen_candidates").join("params.json").is_file());
}

#[test]
fn pinned_init_run_skips_intermediate_runs() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = seed_raw_data(tmp.path(), 2);
    let config = PipelineConfig::new("dsb3", tmp.path().join("runs"));
    let catalog = default_catalog();
    let viz = HtmlOverview;

    // run 0 produce los prob maps
    let mut ctx = PipelineContext::resume(config.clone(), "base").unwrap();
    let mut exec = StepExecutor::new(&catalog, &viz);
    exec.run_step(&mut ctx,
                  "resample_lungs",
                  &record(&[("raw_data_dir", json!(raw.to_string_lossy()))]),
                  "")
        .unwrap();
    exec.run_step(&mut ctx, "gen_prob_maps", &record(&[]), "").unwrap();

    // runs 1 y 2 existen pero no aportan artifacts
    PipelineContext::resume(config.clone(), "dead end").unwrap();
    PipelineContext::resume(config.clone(), "another").unwrap();

    // run 3 con init 0: la cadena [3, 0] salta los runs muertos
    let mut ctx = PipelineContext::resume(config.clone(), "revival").unwrap().with_init_run(Some(0));
    assert_eq!(ctx.run(), 3);
    let mut exec = StepExecutor::new(&catalog, &viz);
    exec.run_step(&mut ctx, "gen_candidates", &record(&[]), "").unwrap();
    let out = ctx.load_record("out.json", Some("gen_candidates")).unwrap();
    assert_eq!(out.len(), 2);
}

#[test]
fn lineage_exhaustion_names_the_searched_runs() {
    let tmp = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new("dsb3", tmp.path().join("runs"));
    let catalog = default_catalog();
    let viz = HtmlOverview;

    let mut ctx = PipelineContext::resume(config, "no upstream").unwrap();
    let mut exec = StepExecutor::new(&catalog, &viz);
    // gen_prob_maps necesita resample_lungs, que ningún run tiene
    let err = exec.run_step(&mut ctx, "gen_prob_maps", &record(&[]), "").unwrap_err();
    match err {
        PipelineError::NotFound { step, runs } => {
            assert_eq!(step, "resample_lungs");
            assert_eq!(runs, vec![0]);
        }
        other => panic!("expected NotFound, got {other}"),
    }
}
