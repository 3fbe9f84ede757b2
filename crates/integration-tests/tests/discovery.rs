//! Discovery against the checked-in fixture directories

use std::path::{Path, PathBuf};

use schemup_core::domain::Version;
use schemup_core::port::MigrationSource;
use schemup_infra_fs::DirectorySource;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

#[tokio::test]
async fn test_fixture_files_in_version_order() {
    let migrations = DirectorySource::new(fixture("files")).discover().await.unwrap();

    let versions: Vec<_> = migrations.iter().map(|m| m.version).collect();
    assert_eq!(
        versions,
        vec![
            Version::new(0, 0, 0),
            Version::new(0, 0, 1),
            Version::new(0, 2, 0),
            Version::new(3, 0, 0),
            Version::new(3, 1, 0),
        ]
    );

    let names: Vec<_> = migrations
        .iter()
        .map(|m| {
            Path::new(&m.source_name)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "00-00-0000-file.sql",
            "00-00-0001-file.sql",
            "00-02-0000-file.sql",
            "03-00-0000-file.sql",
            "03-01-0000-file.sql",
        ]
    );
}

#[tokio::test]
async fn test_missing_directory_fails() {
    let err = DirectorySource::new(fixture("nothing"))
        .discover()
        .await
        .unwrap_err();

    assert!(!err.is_no_migrations());
    assert!(err.to_string().contains("nothing"));
}
