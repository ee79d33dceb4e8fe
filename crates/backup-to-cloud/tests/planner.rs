//! Tests for planning backup entries
//!

use std::{io::Cursor, path::PathBuf};

use backup_to_cloud::{
    payload::{Content, UploadPayload},
    planner::{EntryPlan, PlanError, plan_entry},
};
use common::{config, toml_path, write_file};
use zip::ZipArchive;

mod common;

fn upload_plan(plan: EntryPlan) -> Vec<UploadPayload> {
    match plan {
        EntryPlan::Upload(payloads) => payloads,
        EntryPlan::Excluded => panic!("entry should not be excluded"),
    }
}

#[test]
fn excluded_entry() {
    let config = config(
        r#"
        [disabled]
        type = "single-file"
        root-path = false
        "#,
    );

    let plan = plan_entry(&config.entries[0]).unwrap();
    assert!(matches!(plan, EntryPlan::Excluded));
}

#[test]
fn single_file() {
    let directory = tempfile::tempdir().unwrap();
    write_file(directory.path(), "app.db", "Database");
    let path = directory.path().join("app.db");

    let config = config(&format!(
        r#"
        [database]
        type = "single-file"
        root-path = {}
        cloud-folder-id = "folder"
        "#,
        toml_path(&path)
    ));

    let payloads = upload_plan(plan_entry(&config.entries[0]).unwrap());
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].display_name, "app.db");
    assert_eq!(payloads[0].mime_type, "application/x-sqlite3");
    assert_eq!(payloads[0].destination_folder.as_deref(), Some("folder"));
    assert_eq!(payloads[0].content, Content::File(path));
}

#[test]
fn multiple_files_without_zip() {
    let directory = tempfile::tempdir().unwrap();
    write_file(directory.path(), "report.pdf", "Report");
    write_file(directory.path(), "notes.txt", "Notes");

    let config = config(&format!(
        r#"
        [data]
        type = "multiple-files"
        root-path = {}
        filter = "."
        zip = false
        "#,
        toml_path(directory.path())
    ));

    let payloads = upload_plan(plan_entry(&config.entries[0]).unwrap());
    let mut files: Vec<_> = payloads
        .iter()
        .map(|payload| (payload.display_name.as_str(), payload.mime_type.as_str()))
        .collect();
    files.sort();

    assert_eq!(
        files,
        vec![("notes.txt", "text/plain"), ("report.pdf", "application/pdf")]
    );
    assert!(payloads.iter().all(|payload| payload.destination_folder.is_none()));
}

#[test]
fn filter_is_case_insensitive() {
    let directory = tempfile::tempdir().unwrap();
    write_file(directory.path(), "report.pdf", "Report");
    write_file(directory.path(), "notes.txt", "Notes");

    let config = config(&format!(
        r#"
        [reports]
        type = "multiple-files"
        root-path = {}
        filter = '\.PDF$'
        "#,
        toml_path(directory.path())
    ));

    let payloads = upload_plan(plan_entry(&config.entries[0]).unwrap());
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].display_name, "report.pdf");
}

#[test]
fn filter_matches_full_path() {
    let directory = tempfile::tempdir().unwrap();
    write_file(directory.path(), "keep/a.txt", "A");
    write_file(directory.path(), "skip/b.txt", "B");

    let config = config(&format!(
        r#"
        [kept]
        type = "multiple-files"
        root-path = {}
        filter = "/keep/"
        "#,
        toml_path(directory.path())
    ));

    let payloads = upload_plan(plan_entry(&config.entries[0]).unwrap());
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].display_name, "a.txt");
}

#[test]
fn zipped_files() {
    let directory = tempfile::tempdir().unwrap();
    write_file(directory.path(), "report.pdf", "Report");
    write_file(directory.path(), "notes.txt", "Notes");

    let config = config(&format!(
        r#"
        [data]
        type = "multiple-files"
        root-path = {}
        cloud-folder-id = "folder"
        zip = true
        zipname = "backup.zip"
        "#,
        toml_path(directory.path())
    ));

    let payloads = upload_plan(plan_entry(&config.entries[0]).unwrap());
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].display_name, "backup.zip");
    assert_eq!(payloads[0].mime_type, "application/octet-stream");
    assert_eq!(payloads[0].destination_folder.as_deref(), Some("folder"));
}

#[test]
fn zip_entries_are_relative_to_common_folder() {
    let directory = tempfile::tempdir().unwrap();
    write_file(directory.path(), "a/b/c/x.txt", "X");
    write_file(directory.path(), "a/b/d/y.txt", "Y");

    let config = config(&format!(
        r#"
        [data]
        type = "multiple-files"
        root-path = {}
        zip = true
        zipname = "backup.zip"
        "#,
        toml_path(directory.path())
    ));

    let payloads = upload_plan(plan_entry(&config.entries[0]).unwrap());
    let Content::Archive { root, files } = &payloads[0].content else {
        panic!("expected an archive, got {:?}", payloads[0].content);
    };
    assert!(root.ends_with(PathBuf::from("a").join("b")), "{root:?}");
    assert_eq!(files.len(), 2);

    let bytes = payloads[0].content.read().unwrap();
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();

    assert_eq!(names, vec!["c/x.txt".to_string(), "d/y.txt".to_string()]);
}

#[test]
fn empty_folder_has_no_files() {
    let directory = tempfile::tempdir().unwrap();

    let config = config(&format!(
        r#"
        [empty]
        type = "multiple-files"
        root-path = {}
        filter = "."
        "#,
        toml_path(directory.path())
    ));

    let result = plan_entry(&config.entries[0]);
    assert!(matches!(result, Err(PlanError::NoFilesFound { .. })), "{result:?}");
}

#[test]
fn missing_folder_has_no_files() {
    let directory = tempfile::tempdir().unwrap();

    let config = config(&format!(
        r#"
        [missing]
        type = "multiple-files"
        root-path = {}
        "#,
        toml_path(&directory.path().join("missing"))
    ));

    let result = plan_entry(&config.entries[0]);
    assert!(matches!(result, Err(PlanError::NoFilesFound { .. })), "{result:?}");
}

#[test]
fn missing_single_file() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("missing.db");

    let config = config(&format!(
        r#"
        [database]
        type = "single-file"
        root-path = {}
        "#,
        toml_path(&path)
    ));

    let result = plan_entry(&config.entries[0]);
    assert!(
        matches!(&result, Err(PlanError::FileNotFound(missing)) if *missing == path),
        "{result:?}"
    );
}

#[cfg(unix)]
#[test]
fn symlinked_files_are_listed() {
    use std::os::unix::fs::symlink;

    let outside = tempfile::tempdir().unwrap();
    write_file(outside.path(), "target.txt", "Linked");
    write_file(outside.path(), "nested/inner.txt", "Inner");

    let directory = tempfile::tempdir().unwrap();
    write_file(directory.path(), "plain.txt", "Plain");
    symlink(outside.path().join("target.txt"), directory.path().join("link.txt")).unwrap();
    symlink(outside.path().join("nested"), directory.path().join("linked-folder")).unwrap();

    let config = config(&format!(
        r#"
        [data]
        type = "multiple-files"
        root-path = {}
        "#,
        toml_path(directory.path())
    ));

    let payloads = upload_plan(plan_entry(&config.entries[0]).unwrap());
    let names: Vec<_> = payloads
        .iter()
        .map(|payload| payload.display_name.as_str())
        .collect();

    assert_eq!(names, vec!["link.txt", "plain.txt"]);
}
