//! Batch output tests: files land atomically, metadata matches the model text

use std::collections::BTreeSet;

use tpcm_synth::batch::{self, BatchPlan};
use tpcm_synth::output::{fingerprint, read_metadata};
use tpcm_synth::{catalog, GenerationConfig};

fn plan(dir: &std::path::Path, models: usize, vary_shape: bool) -> BatchPlan {
    BatchPlan {
        config: GenerationConfig {
            container_count: Some(3),
            ..Default::default()
        },
        models,
        jobs: 4,
        master_seed: 1_000,
        output_dir: dir.to_path_buf(),
        name_prefix: "model".into(),
        vary_shape,
    }
}

#[test]
fn test_batch_writes_model_and_sidecar_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(dir.path(), 6, false);
    let reports = batch::run_batch(&plan, catalog::standard()).unwrap();

    assert_eq!(reports.len(), 6);
    assert!(reports.iter().all(|r| r.succeeded()));

    let files: BTreeSet<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files.len(), 12, "unexpected files: {:?}", files);
    for index in 0..6 {
        assert!(files.contains(&format!("model_{:04}.tpcm", index)));
        assert!(files.contains(&format!("model_{:04}.metadata.json", index)));
    }
}

#[test]
fn test_metadata_matches_model_text() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(dir.path(), 3, false);
    let reports = batch::run_batch(&plan, catalog::standard()).unwrap();

    for report in reports {
        let written = report.outcome.unwrap();
        let text = std::fs::read_to_string(&written.model).unwrap();
        let metadata = read_metadata(&written.metadata).unwrap();
        assert_eq!(metadata.sha256, fingerprint(&text));
        assert_eq!(metadata.seed, 1_000 + report.index as u64);
        assert_eq!(metadata.config.random_seed, Some(metadata.seed));
        assert_eq!(metadata.name, report.name);
        assert_eq!(metadata.stats.components, 10);
    }
}

#[test]
fn test_batch_reproducible_across_job_counts() {
    let one = tempfile::tempdir().unwrap();
    let many = tempfile::tempdir().unwrap();
    let mut sequential = plan(one.path(), 4, true);
    sequential.jobs = 1;
    let parallel = plan(many.path(), 4, true);

    batch::run_batch(&sequential, catalog::standard()).unwrap();
    batch::run_batch(&parallel, catalog::standard()).unwrap();

    for index in 0..4 {
        let name = format!("model_{:04}.tpcm", index);
        let a = std::fs::read_to_string(one.path().join(&name)).unwrap();
        let b = std::fs::read_to_string(many.path().join(&name)).unwrap();
        assert_eq!(a, b, "{name} differs between job counts");
    }
}
