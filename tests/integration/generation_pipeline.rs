//! End-to-end pipeline runs against fake generators

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tarsgen::evict::Eviction;
use tarsgen::host::FilesystemHost;
use tarsgen::{ArtifactOutcome, SelectedArtifact, SourceLanguage};
use tempfile::TempDir;

use crate::integration::test_utils::{foo_generator, snapshot, write_artifact, write_generator, Harness};

const TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn test_foo_scenario_mirrors_exact_tree() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "module Foo {};");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let reports = harness.pipeline.process(&[artifact.clone()]);

    assert_eq!(reports.len(), 1);
    let container = artifact.container_path("_");
    match &reports[0].outcome {
        ArtifactOutcome::Generated {
            container: reported,
            sync,
            eviction,
            ..
        } => {
            assert_eq!(reported, &container);
            assert_eq!(sync.files, 2);
            assert_eq!(sync.folders, 1);
            assert_eq!(*eviction, Eviction::NothingToRemove);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let tree = snapshot(&container);
    let expected: Vec<PathBuf> = vec![
        PathBuf::from("Foo.cs"),
        PathBuf::from("sub"),
        Path::new("sub").join("Bar.cs"),
    ];
    assert_eq!(tree.keys().cloned().collect::<Vec<_>>(), expected);
    assert_eq!(tree[Path::new("Foo.cs")], Some(b"class Foo {}".to_vec()));
    assert_eq!(
        tree[&Path::new("sub").join("Bar.cs")],
        Some(b"class Bar {}".to_vec())
    );
    assert!(harness.staging_is_empty(), "staging must be torn down");
}

#[test]
fn test_generator_receives_staged_copy_in_cwd() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = write_generator(
        tools.path(),
        "tars2cs",
        "cp \"${1#--base-package=}\" Echo.tars\npwd > cwd.txt",
    );
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "struct Foo { 0 require int a; };");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let reports = harness.pipeline.process(&[artifact.clone()]);
    assert!(matches!(reports[0].outcome, ArtifactOutcome::Generated { .. }));

    let container = artifact.container_path("_");
    assert_eq!(
        fs::read_to_string(container.join("Echo.tars")).unwrap(),
        "struct Foo { 0 require int a; };"
    );
    let cwd = fs::read_to_string(container.join("cwd.txt")).unwrap();
    let staging_root = dunce::canonicalize(harness.staging.path()).unwrap();
    assert!(
        Path::new(cwd.trim()).starts_with(&staging_root),
        "generator should run inside the staging root, ran in {}",
        cwd.trim()
    );
    // Source artifact is never modified
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "struct Foo { 0 require int a; };"
    );
}

#[test]
fn test_empty_output_creates_empty_container() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = write_generator(tools.path(), "tars2cs", "exit 0");
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Empty.tars", "");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let reports = harness.pipeline.process(&[artifact.clone()]);

    assert!(matches!(reports[0].outcome, ArtifactOutcome::Generated { .. }));
    let container = artifact.container_path("_");
    assert!(container.is_dir());
    assert!(snapshot(&container).is_empty());
}

#[test]
fn test_previous_output_never_survives_regeneration() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let container = artifact.container_path("_");
    fs::create_dir_all(container.join("old")).unwrap();
    fs::write(container.join("old").join("Stale.cs"), "stale").unwrap();
    fs::write(container.join("Foo.cs"), "outdated").unwrap();

    let reports = harness.pipeline.process(&[artifact]);
    match &reports[0].outcome {
        ArtifactOutcome::Generated { eviction, .. } => assert_eq!(
            *eviction,
            Eviction::Removed {
                project_entry: false,
                directory: true
            }
        ),
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert!(!container.join("old").exists());
    assert_eq!(fs::read_to_string(container.join("Foo.cs")).unwrap(), "class Foo {}");
}

#[test]
fn test_regeneration_is_idempotent() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);

    harness.pipeline.process(&[artifact.clone()]);
    let first = snapshot(&artifact.container_path("_"));
    harness.pipeline.process(&[artifact.clone()]);
    let second = snapshot(&artifact.container_path("_"));

    assert_eq!(first, second);
    assert!(harness.staging_is_empty());
}

#[test]
fn test_unbound_language_has_no_side_effects() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::Cpp);
    let reports = harness.pipeline.process(&[artifact.clone()]);

    assert_eq!(reports[0].outcome, ArtifactOutcome::Skipped);
    assert!(!artifact.container_path("_").exists());
    assert!(harness.staging_is_empty());
    assert!(harness.sink.messages().is_empty());
    assert_eq!(fs::read_dir(project.path()).unwrap().count(), 1);
}

#[test]
fn test_stderr_is_surfaced_even_on_nonzero_exit() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = write_generator(
        tools.path(),
        "tars2cs",
        "printf 'class Foo {}' > Foo.cs\necho 'Foo.tars:3: deprecated type' >&2\nexit 1",
    );
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let reports = harness.pipeline.process(&[artifact.clone()]);

    match &reports[0].outcome {
        ArtifactOutcome::Generated {
            exit_code,
            diagnostics,
            ..
        } => {
            assert_eq!(*exit_code, Some(1));
            assert!(diagnostics.contains("deprecated type"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let messages = harness.sink.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].artifact, artifact.path);
    assert_eq!(messages[0].text.trim(), "Foo.tars:3: deprecated type");
    assert!(artifact.container_path("_").join("Foo.cs").is_file());
}

#[test]
fn test_symlinked_output_file_reaches_container() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = write_generator(
        tools.path(),
        "tars2cs",
        "mkdir -p sub\nprintf 'class Foo {}' > Foo.cs\nln -s ../Foo.cs sub/Alias.cs",
    );
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let reports = harness.pipeline.process(&[artifact.clone()]);

    match &reports[0].outcome {
        ArtifactOutcome::Generated { sync, .. } => assert_eq!(sync.files, 2),
        other => panic!("unexpected outcome: {:?}", other),
    }
    let alias = artifact.container_path("_").join("sub").join("Alias.cs");
    assert_eq!(fs::read_to_string(alias).unwrap(), "class Foo {}");
}

#[test]
fn test_diagnostics_kept_when_background_process_holds_stderr() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = write_generator(
        tools.path(),
        "tars2cs",
        "echo 'Foo.tars:1: error' >&2\nprintf x > Foo.cs\n( sleep 3 ) &\nexit 0",
    );
    let harness = Harness::new(Some(&generator), Duration::from_secs(1), Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let reports = harness.pipeline.process(&[artifact]);

    match &reports[0].outcome {
        ArtifactOutcome::Generated { diagnostics, .. } => {
            assert_eq!(diagnostics.trim(), "Foo.tars:1: error")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let messages = harness.sink.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text.trim(), "Foo.tars:1: error");
}

#[test]
fn test_silent_generator_emits_no_diagnostics() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "x");
    harness
        .pipeline
        .process(&[SelectedArtifact::new(&path, SourceLanguage::CSharp)]);
    assert!(harness.sink.messages().is_empty());
}

#[test]
fn test_failures_do_not_stop_later_artifacts() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let missing = SelectedArtifact::new(project.path().join("Missing.tars"), SourceLanguage::CSharp);
    let skipped = SelectedArtifact::new(
        write_artifact(project.path(), "Other.tars", "x"),
        SourceLanguage::Java,
    );
    let good = SelectedArtifact::new(
        write_artifact(project.path(), "Foo.tars", "x"),
        SourceLanguage::CSharp,
    );

    let reports = harness.pipeline.process(&[missing.clone(), skipped, good.clone()]);
    assert_eq!(reports.len(), 3);
    assert!(matches!(reports[0].outcome, ArtifactOutcome::Failed { .. }));
    assert!(reports[0].outcome.is_failure());
    assert_eq!(reports[1].outcome, ArtifactOutcome::Skipped);
    assert!(!reports[1].outcome.is_failure());
    assert!(matches!(reports[2].outcome, ArtifactOutcome::Generated { .. }));

    assert!(!missing.container_path("_").exists());
    assert!(good.container_path("_").join("Foo.cs").is_file());
    assert!(harness.staging_is_empty());
}

#[test]
fn test_missing_generator_binary_is_a_failure() {
    let project = TempDir::new().unwrap();
    let harness = Harness::new(
        Some(Path::new("/nonexistent/tars2cs/tars2cs")),
        TIMEOUT,
        Arc::new(FilesystemHost),
    );

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let reports = harness.pipeline.process(&[artifact.clone()]);

    assert!(matches!(reports[0].outcome, ArtifactOutcome::Failed { .. }));
    assert!(!artifact.container_path("_").exists());
    assert!(harness.staging_is_empty());
}

#[test]
fn test_report_carries_input_digest() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let harness = Harness::new(Some(&generator), TIMEOUT, Arc::new(FilesystemHost));

    let path = write_artifact(project.path(), "Foo.tars", "module Foo {};");
    let reports = harness
        .pipeline
        .process(&[SelectedArtifact::new(&path, SourceLanguage::CSharp)]);

    match &reports[0].outcome {
        ArtifactOutcome::Generated { input_digest, .. } => {
            assert_eq!(
                input_digest,
                &hex::encode(blake3::hash(b"module Foo {};").as_bytes())
            );
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
