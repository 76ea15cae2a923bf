//! Flujo completo del catálogo por defecto dentro de un run.

use serde_json::{json, Value};

use scan_core::{PipelineConfig, PipelineContext, Record, StepExecutor};
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
fn full_catalog_produces_a_submission_for_every_patient() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = seed_raw_data(tmp.path(), 3);
    let mut ctx =
        PipelineContext::resume(PipelineConfig::new("dsb3", tmp.path().join("runs")), "first full pass").unwrap();

    let catalog = default_catalog();
    let viz = HtmlOverview;
    let mut exec = StepExecutor::new(&catalog, &viz);

    exec.run_step(&mut ctx,
                  "resample_lungs",
                  &record(&[("raw_data_dir", json!(raw.to_string_lossy())), ("volume_edge", json!(3))]),
                  "")
        .unwrap();
    exec.run_step(&mut ctx, "gen_prob_maps", &record(&[]), "").unwrap();
    exec.run_step(&mut ctx,
                  "gen_candidates",
                  &record(&[("threshold", json!(0.6)), ("batch_size", json!(2))]),
                  "")
        .unwrap();
    exec.run_step(&mut ctx, "gen_submission", &record(&[]), "").unwrap();

    let submission = ctx.load_record("submission.json", Some("gen_submission")).unwrap();
    assert_eq!(submission.len(), 3);
    for (patient, prob) in &submission {
        let p = prob.as_f64().unwrap();
        assert!((0.0..1.0).contains(&p), "{patient} got probability {p}");
    }

    // cada step deja su params.json junto a los artifacts
    for step in ["resample_lungs", "gen_prob_maps", "gen_candidates", "gen_submission"] {
        assert!(ctx.step_dir(Some(step)).unwrap().join("params.json").is_file());
    }

    // gen_candidates escribió una figura, así que el overview se compiló
    let candidates_dir = ctx.step_dir(Some("gen_candidates")).unwrap();
    assert!(candidates_dir.join("figs").join("candidate_counts.svg").is_file());
    assert!(candidates_dir.join("figs.html").is_file());
}

#[test]
fn candidate_batches_merge_into_one_record() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = seed_raw_data(tmp.path(), 5);
    let mut ctx = PipelineContext::resume(PipelineConfig::new("dsb3", tmp.path().join("runs")), "").unwrap();

    let catalog = default_catalog();
    let viz = HtmlOverview;
    let mut exec = StepExecutor::new(&catalog, &viz);

    exec.run_step(&mut ctx,
                  "resample_lungs",
                  &record(&[("raw_data_dir", json!(raw.to_string_lossy()))]),
                  "")
        .unwrap();
    exec.run_step(&mut ctx, "gen_prob_maps", &record(&[]), "").unwrap();
    // batch_size 2 sobre 5 pacientes: tres merges parciales
    exec.run_step(&mut ctx, "gen_candidates", &record(&[("batch_size", json!(2))]), "").unwrap();

    let out = ctx.load_record("out.json", Some("gen_candidates")).unwrap();
    assert_eq!(out.len(), 5);
    let keys: Vec<&String> = out.keys().collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted, "patient order follows the frozen listing");
}

#[test]
fn fromto_fork_partitions_the_step_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = seed_raw_data(tmp.path(), 4);
    let mut ctx = PipelineContext::resume(PipelineConfig::new("dsb3", tmp.path().join("runs")), "").unwrap();

    let catalog = default_catalog();
    let viz = HtmlOverview;
    let mut exec = StepExecutor::new(&catalog, &viz);

    exec.run_step(&mut ctx,
                  "resample_lungs",
                  &record(&[("raw_data_dir", json!(raw.to_string_lossy())),
                            ("from_patient", json!(0)),
                            ("to_patient", json!(2))]),
                  "_fromto0-2")
        .unwrap();

    let dir = ctx.step_dir(None).unwrap();
    assert!(dir.ends_with("resample_lungs_fromto0-2"));
    let out = ctx.load_record("out.json", None).unwrap();
    assert_eq!(out.len(), 2);
}
