//! Host project model receives eviction and registration calls

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tarsgen::evict::Eviction;
use tarsgen::{ArtifactOutcome, SelectedArtifact, SourceLanguage};
use tempfile::TempDir;

use crate::integration::test_utils::{foo_generator, write_artifact, HostCall, Harness, RecordingHost};

#[test]
fn test_host_sees_removal_then_registrations() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let host = Arc::new(RecordingHost::default());
    let harness = Harness::new(Some(&generator), Duration::from_secs(10), host.clone());

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let container = artifact.container_path("_");
    harness.pipeline.process(&[artifact]);

    let calls = host.calls();
    assert_eq!(
        calls,
        vec![
            HostCall::Remove(container.clone()),
            HostCall::Folder(container.clone()),
            HostCall::File(container.join("Foo.cs")),
            HostCall::Folder(container.join("sub")),
            HostCall::File(container.join("sub").join("Bar.cs")),
        ]
    );
}

#[test]
fn test_existing_project_entry_is_reported_as_removed() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let host = Arc::new(RecordingHost::default());
    let harness = Harness::new(Some(&generator), Duration::from_secs(10), host.clone());

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);

    // First run registers the container; the second run finds and removes it.
    harness.pipeline.process(&[artifact.clone()]);
    let reports = harness.pipeline.process(&[artifact]);

    match &reports[0].outcome {
        ArtifactOutcome::Generated { eviction, .. } => assert_eq!(
            *eviction,
            Eviction::Removed {
                project_entry: true,
                directory: true
            }
        ),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_skipped_artifact_never_reaches_host() {
    let host = Arc::new(RecordingHost::default());
    let harness = Harness::new(None, Duration::from_secs(10), host.clone());

    let artifact = SelectedArtifact::new(Path::new("/p/Foo.tars"), SourceLanguage::CSharp);
    let reports = harness.pipeline.process(&[artifact]);

    assert_eq!(reports[0].outcome, ArtifactOutcome::Skipped);
    assert!(host.calls().is_empty());
}

#[test]
fn test_failed_registration_leaves_no_partial_container() {
    let tools = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let generator = foo_generator(tools.path());
    let host = Arc::new(RecordingHost {
        fail_file_at: Some(2),
        ..RecordingHost::default()
    });
    let harness = Harness::new(Some(&generator), Duration::from_secs(10), host.clone());

    let path = write_artifact(project.path(), "Foo.tars", "x");
    let artifact = SelectedArtifact::new(&path, SourceLanguage::CSharp);
    let container = artifact.container_path("_");
    std::fs::create_dir_all(&container).unwrap();
    std::fs::write(container.join("Old.cs"), "old").unwrap();

    let reports = harness.pipeline.process(&[artifact]);

    assert!(matches!(reports[0].outcome, ArtifactOutcome::Failed { .. }));
    assert!(!container.exists());
    assert_eq!(std::fs::read_dir(project.path()).unwrap().count(), 1);
    assert_eq!(host.calls().last(), Some(&HostCall::Remove(container)));
    assert!(harness.staging_is_empty());
}
