use std::fs;
use std::io::Write;

use anyhow::Result;
use callview::batch::{
    BatchProgress, BytesLoader, DirSource, FileListSource, ImageLoader, IndexOnlyLoader, LoadError,
    ZipSource,
    build_registry, entry_file_name, open_source,
};
use callview::model::ClusterK;
use callview::registry::ImageBytes;
use camino::Utf8PathBuf;
use tempfile::tempdir;

fn utf8(p: std::path::PathBuf) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(p).unwrap()
}

#[test]
fn folder_batch_builds_registry() {
    let tmp = tempdir().unwrap();
    for (name, body) in [
        ("rs7412-k1.png", "a"),
        ("rs7412-k2.PNG", "b"),
        ("rs429358.k3.png", "c"),
        ("bogus.png", "d"),
    ] {
        fs::write(tmp.path().join(name), body).unwrap();
    }

    let mut source = DirSource::new(utf8(tmp.path().to_path_buf()));
    let mut seen = Vec::new();
    let reg = build_registry(&mut source, &mut BytesLoader, &mut |p| seen.push(p)).unwrap();

    assert_eq!(reg.len(), 2);
    let rs7412 = reg.get("rs7412").unwrap();
    assert!(rs7412.has(ClusterK::K1) && rs7412.has(ClusterK::K2) && !rs7412.has(ClusterK::K3));
    assert_eq!(rs7412.file_name(ClusterK::K2), Some("rs7412-k2.PNG"));
    assert_eq!(
        rs7412.slot(ClusterK::K1).map(|s| &s.image),
        Some(&ImageBytes(b"a".to_vec()))
    );
    let rs429358 = reg.get("rs429358").unwrap();
    assert!(rs429358.has(ClusterK::K3) && !rs429358.has(ClusterK::K1));
    assert!(!reg.contains("bogus"));

    assert_eq!(reg.list_markers(ClusterK::K1), vec!["rs7412"]);

    // unrecognized files still count toward progress
    assert_eq!(seen.len(), 4);
    assert_eq!(seen.last(), Some(&BatchProgress { done: 4, total: 4 }));
}

#[test]
fn nested_folders_match_on_file_name_only() {
    let tmp = tempdir().unwrap();
    let sub = tmp.path().join("rs1_k1.png.d");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("rs2_k2.png"), "x").unwrap();

    let mut source = DirSource::new(utf8(tmp.path().to_path_buf()));
    let reg = build_registry(&mut source, &mut BytesLoader, &mut |_| {}).unwrap();
    assert_eq!(reg.list_markers(ClusterK::K2), vec!["rs2"]);
    assert!(!reg.contains("rs1"));
}

#[test]
fn later_duplicate_in_batch_wins() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    fs::write(a.join("rs1_k1.png"), "old").unwrap();
    fs::write(b.join("rs1-K1.png"), "new").unwrap();

    let mut source = FileListSource::new(vec![
        utf8(a.join("rs1_k1.png")),
        utf8(b.join("rs1-K1.png")),
    ]);
    let reg = build_registry(&mut source, &mut BytesLoader, &mut |_| {}).unwrap();
    let slot = reg.get("rs1").and_then(|e| e.slot(ClusterK::K1)).unwrap();
    assert_eq!(slot.file_name, "rs1-K1.png");
    assert_eq!(slot.image, ImageBytes(b"new".to_vec()));
}

#[test]
fn empty_selection_is_rejected() {
    let mut source = FileListSource::new(Vec::new());
    let err = build_registry(&mut source, &mut BytesLoader, &mut |_| {}).unwrap_err();
    assert_eq!(err.downcast_ref::<LoadError>(), Some(&LoadError::EmptySelection));
    assert_eq!(err.to_string(), "Select a folder or multiple PNG files first.");

    let tmp = tempdir().unwrap();
    let mut empty_dir = DirSource::new(utf8(tmp.path().to_path_buf()));
    let err = build_registry(&mut empty_dir, &mut BytesLoader, &mut |_| {}).unwrap_err();
    assert!(err.downcast_ref::<LoadError>().is_some());
}

struct FailOn(&'static str);

impl ImageLoader for FailOn {
    type Image = ImageBytes;
    fn load(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<ImageBytes> {
        if file_name == self.0 {
            anyhow::bail!("cannot decode {}", file_name);
        }
        Ok(ImageBytes(bytes))
    }
}

#[test]
fn undecodable_images_are_skipped() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("rs1_k1.png"), "ok").unwrap();
    fs::write(tmp.path().join("rs2_k1.png"), "broken").unwrap();

    let mut source = DirSource::new(utf8(tmp.path().to_path_buf()));
    let mut done = 0;
    let reg = build_registry(&mut source, &mut FailOn("rs2_k1.png"), &mut |p| done = p.done).unwrap();
    assert_eq!(reg.list_markers(ClusterK::K1), vec!["rs1"]);
    assert_eq!(done, 2);
}

#[test]
fn index_only_loader_never_reads_files() {
    let tmp = tempdir().unwrap();
    // listed but absent, so any read would fail and skip the entry
    let files = ["rs3_k1.png", "rs3_k2.png", "notes.txt"]
        .iter()
        .map(|n| utf8(tmp.path().join(n)))
        .collect();
    let mut source = FileListSource::new(files);

    let reg = build_registry(&mut source, &mut IndexOnlyLoader, &mut |_| {}).unwrap();
    assert_eq!(reg.get("rs3").unwrap().file_name(ClusterK::K2), Some("rs3_k2.png"));
    assert_eq!(reg.list_markers(ClusterK::K1), vec!["rs3"]);

    let mut source = FileListSource::new(vec![utf8(tmp.path().join("rs3_k1.png"))]);
    let reg = build_registry(&mut source, &mut BytesLoader, &mut |_| {}).unwrap();
    assert!(reg.is_empty());
}

#[test]
fn zip_archive_batch() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("clusters.zip");
    {
        let file = fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        zip.add_directory("plots/", options).unwrap();
        zip.start_file("plots/rs9_k3.png", options).unwrap();
        zip.write_all(b"png").unwrap();
        zip.start_file("readme.txt", options).unwrap();
        zip.write_all(b"hi").unwrap();
        zip.finish().unwrap();
    }

    let reader = std::io::BufReader::new(fs::File::open(&path).unwrap());
    let mut source = ZipSource::new(reader).unwrap();
    let mut total = 0;
    let reg = build_registry(&mut source, &mut BytesLoader, &mut |p| total = p.total).unwrap();
    assert_eq!(total, 2);
    assert_eq!(reg.list_markers(ClusterK::K3), vec!["rs9"]);

    let mut opened = open_source(&utf8(path)).unwrap();
    let reg = build_registry(opened.as_mut(), &mut BytesLoader, &mut |_| {}).unwrap();
    assert!(reg.contains("rs9"));
}

#[test]
fn open_source_rejects_plain_files() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("rs1_k1.png");
    fs::write(&path, "x").unwrap();
    assert!(open_source(&utf8(path)).is_err());
}

#[test]
fn entry_file_names() {
    assert_eq!(entry_file_name("a/b/rs1_k1.png"), "rs1_k1.png");
    assert_eq!(entry_file_name("C:\\plots\\rs1_k1.png"), "rs1_k1.png");
    assert_eq!(entry_file_name("rs1_k1.png"), "rs1_k1.png");
}

#[test]
fn progress_messages() {
    assert_eq!(
        BatchProgress { done: 1, total: 1 }.message(),
        "Loaded 1 / 1 image (100%)"
    );
    assert_eq!(
        BatchProgress { done: 1, total: 3 }.message(),
        "Loaded 1 / 3 images (33%)"
    );
}
