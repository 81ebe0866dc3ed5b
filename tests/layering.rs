use std::fs;
use std::io::{self, Read, Write};

use layini::{Document, Error};
use tempfile::TempDir;

const BASE: &str = "\
[MAGIC_LOGICAL_NAMES]
ROOT=C:\\App
DATA=%ROOT%\\data

[Install]
path=%DATA%
mode=*ro
";

const SITE: &str = "\
; site overrides
[MAGIC_LOGICAL_NAMES]
ROOT=D:\\Site
/[Extra] enabled=1
[Install]
mode=rw
";

#[test]
fn later_files_override_without_reordering() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let base = dir.path().join("base.ini");
    let site = dir.path().join("site.ini");
    fs::write(&base, BASE).expect("failed to write base.ini");
    fs::write(&site, SITE).expect("failed to write site.ini");

    let mut document = Document::from_path(&base).expect("failed to load base.ini");
    assert_eq!(document.get("Install", "mode"), "ro");
    assert_eq!(document.translate(document.get("Install", "path")), "C:\\App\\data");

    document
        .load_additional(&site)
        .expect("failed to load site.ini");

    assert_eq!(
        document.sections().collect::<Vec<_>>(),
        vec!["MAGIC_LOGICAL_NAMES", "Install", "Extra"]
    );
    assert_eq!(
        document.keys("MAGIC_LOGICAL_NAMES").collect::<Vec<_>>(),
        vec!["ROOT", "DATA"]
    );
    assert_eq!(document.get("Install", "mode"), "rw");
    assert_eq!(document.get("Extra", "enabled"), "1");
    assert_eq!(document.translate(document.get("Install", "path")), "D:\\Site\\data");
}

#[test]
fn save_then_load() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("out.ini");

    let mut document = Document::new();
    document.set("b", "x", "1");
    document.set("a", "y", "*2");
    document.save(&path).expect("failed to save");

    assert_eq!(
        fs::read_to_string(&path).expect("failed to read back"),
        "[b]\nx=1\n\n[a]\ny=**2\n\n"
    );
    assert_eq!(Document::from_path(&path).expect("failed to load"), document);
}

#[test]
fn missing_file_is_a_read_failure() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let result = Document::from_path(dir.path().join("absent.ini"));

    match result {
        Err(Error::ReadFailure { source }) => assert_eq!(source.kind(), io::ErrorKind::NotFound),
        other => panic!("expected a read failure, got {other:?}"),
    }
}

#[test]
fn save_into_missing_directory_is_a_write_failure() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let result = Document::new().save(dir.path().join("no").join("such.ini"));

    assert!(matches!(result, Err(Error::WriteFailure { .. })));
}

struct Broken;

impl Read for Broken {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("broken reader"))
    }
}

impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("broken writer"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn collaborator_failures_are_surfaced() {
    let mut document = Document::new();
    document.set("s", "k", "v");

    assert!(matches!(
        document.read_from(&mut Broken),
        Err(Error::ReadFailure { .. })
    ));
    assert!(matches!(
        document.write_to(&mut Broken),
        Err(Error::WriteFailure { .. })
    ));
    assert_eq!(document.get("s", "k"), "v");
}
