/*!
 * Tests for source archive detection and extraction
 */

use std::fs::File;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use ronyaku::archive::{self, ArchiveKind};

use crate::common::{create_temp_dir, create_test_file};

const TEX: &str = "\\documentclass{article}\\begin{document}Hello\\end{document}";

/// Test kind detection by file extension
#[test]
fn test_detect_kind_withKnownExtensions_shouldSkipSniffing() {
    let dir = create_temp_dir().unwrap();
    let base = dir.path().to_path_buf();
    // Contents are irrelevant when the extension is recognized
    let zip = create_test_file(&base, "a.zip", "x").unwrap();
    let gz = create_test_file(&base, "a.tar.gz", "x").unwrap();
    let tar = create_test_file(&base, "a.tar", "x").unwrap();
    assert_eq!(archive::detect_kind(&zip).unwrap(), ArchiveKind::Zip);
    assert_eq!(archive::detect_kind(&gz).unwrap(), ArchiveKind::Gzip);
    assert_eq!(archive::detect_kind(&tar).unwrap(), ArchiveKind::Tar);
}

/// Test magic-byte sniffing for extension-less downloads
#[test]
fn test_detect_kind_withoutExtension_shouldSniffMagicBytes() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("2005.14165");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(TEX.as_bytes()).unwrap();
    encoder.finish().unwrap();
    assert_eq!(archive::detect_kind(&path).unwrap(), ArchiveKind::Gzip);

    let plain = create_test_file(&dir.path().to_path_buf(), "notes", TEX).unwrap();
    assert_eq!(archive::detect_kind(&plain).unwrap(), ArchiveKind::Plain);
}

/// Test that a plain file is returned as-is
#[test]
fn test_extract_sources_withPlainFile_shouldReturnIt() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(&dir.path().to_path_buf(), "main", TEX).unwrap();
    let out = dir.path().join("out");
    let sources = archive::extract_sources(&path, &out, ".tex").unwrap();
    assert_eq!(sources, vec![path]);
}

/// Test that a bare gzip stream is inflated to a single file
#[test]
fn test_extract_sources_withBareGzip_shouldInflate() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("paper");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(TEX.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let out = dir.path().join("out");
    let sources = archive::extract_sources(&path, &out, ".tex").unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(std::fs::read_to_string(&sources[0]).unwrap(), TEX);
}

/// Test that a gzipped tarball yields only the wanted extension
#[test]
fn test_extract_sources_withTarGz_shouldFilterByExtension() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("source.tar.gz");

    let encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let add = |builder: &mut tar::Builder<_>, name: &str, content: &str| {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, content.as_bytes()).unwrap();
    };
    add(&mut builder, "main.tex", TEX);
    add(&mut builder, "refs.bib", "@article{x}");
    add(&mut builder, "figures/fig1.tex", "\\input{fig}");
    builder.into_inner().unwrap().finish().unwrap();

    let out = dir.path().join("out");
    let mut sources = archive::extract_sources(&path, &out, ".tex").unwrap();
    sources.sort();
    let names: Vec<_> = sources
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    // Nested paths are flattened; the .bib file is skipped
    assert_eq!(names, vec!["fig1.tex", "main.tex"]);
}

/// Test zip extraction with extension filtering
#[test]
fn test_extract_sources_withZip_shouldFilterByExtension() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("source.zip");

    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = zip::write::FileOptions::default();
    writer.start_file("main.tex", options).unwrap();
    writer.write_all(TEX.as_bytes()).unwrap();
    writer.start_file("paper.pdf", options).unwrap();
    writer.write_all(b"%PDF-1.4").unwrap();
    writer.finish().unwrap();

    let out = dir.path().join("out");
    let sources = archive::extract_sources(&path, &out, ".tex").unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(std::fs::read_to_string(&sources[0]).unwrap(), TEX);
}
