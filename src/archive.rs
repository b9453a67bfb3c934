/*!
 * Decompression of downloaded source archives.
 *
 * arXiv serves e-prints as gzipped tarballs, bare gzip streams, zip files or
 * occasionally plain text. The kind is detected from the file extension
 * first, with magic-byte sniffing as fallback for extension-less downloads.
 */

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::{debug, info};

use crate::errors::CrawlError;

/// Recognized archive container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Gzip,
    Tar,
    Zip,
    /// Not an archive; use the file as-is.
    Plain,
}

/// Detect the archive kind of `path`, extension first, magic bytes second.
pub fn detect_kind(path: &Path) -> Result<ArchiveKind, CrawlError> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.ends_with(".zip") {
        return Ok(ArchiveKind::Zip);
    }
    if name.ends_with(".gz") || name.ends_with(".tgz") {
        return Ok(ArchiveKind::Gzip);
    }
    if name.ends_with(".tar") {
        return Ok(ArchiveKind::Tar);
    }
    sniff_kind(path)
}

/// Identify an archive from its leading bytes (and the tar magic at 257).
fn sniff_kind(path: &Path) -> Result<ArchiveKind, CrawlError> {
    let mut head = [0u8; 265];
    let n = File::open(path)?.read(&mut head)?;
    let kind = if n >= 2 && head[..2] == [0x1f, 0x8b] {
        ArchiveKind::Gzip
    } else if n >= 4 && head[..4] == [b'P', b'K', 0x03, 0x04] {
        ArchiveKind::Zip
    } else if n >= 262 && &head[257..262] == b"ustar" {
        ArchiveKind::Tar
    } else {
        ArchiveKind::Plain
    };
    debug!("sniffed {} as {:?}", path.display(), kind);
    Ok(kind)
}

/// Extract all files with extension `want_ext` (e.g. `".tex"`) from the
/// archive at `path` into `out_dir`. A plain file is returned as-is when it
/// matches; a bare gzip stream is inflated and re-examined (it may wrap a
/// tarball or a single file).
pub fn extract_sources(
    path: &Path,
    out_dir: &Path,
    want_ext: &str,
) -> Result<Vec<PathBuf>, CrawlError> {
    std::fs::create_dir_all(out_dir)?;
    match detect_kind(path)? {
        // arXiv also ships bare single-file sources, often extension-less.
        ArchiveKind::Plain => Ok(vec![path.to_path_buf()]),
        ArchiveKind::Gzip => {
            let mut inner = Vec::new();
            GzDecoder::new(File::open(path)?).read_to_end(&mut inner).map_err(|e| {
                CrawlError::Archive(format!("gunzip {}: {}", path.display(), e))
            })?;
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("source");
            let inflated = out_dir.join(stem);
            std::fs::write(&inflated, &inner)?;
            match sniff_kind(&inflated)? {
                ArchiveKind::Tar => extract_tar(&inflated, out_dir, want_ext),
                _ => Ok(vec![inflated]),
            }
        }
        ArchiveKind::Tar => extract_tar(path, out_dir, want_ext),
        ArchiveKind::Zip => extract_zip(path, out_dir, want_ext),
    }
}

fn extract_tar(path: &Path, out_dir: &Path, want_ext: &str) -> Result<Vec<PathBuf>, CrawlError> {
    let mut archive = tar::Archive::new(File::open(path)?);
    let mut extracted = Vec::new();
    let entries = archive
        .entries()
        .map_err(|e| CrawlError::Archive(format!("tar {}: {}", path.display(), e)))?;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| CrawlError::Archive(format!("tar {}: {}", path.display(), e)))?;
        let name = entry
            .path()
            .map_err(|e| CrawlError::Archive(e.to_string()))?
            .to_string_lossy()
            .into_owned();
        if !name.ends_with(want_ext) {
            continue;
        }
        // Flatten nested paths; only the file itself matters.
        let file_name = Path::new(&name)
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| CrawlError::Archive(format!("bad entry name: {}", name)))?;
        let out_path = out_dir.join(file_name);
        let mut buf = Vec::new();
        entry
            .read_to_end(&mut buf)
            .map_err(|e| CrawlError::Archive(format!("tar entry {}: {}", name, e)))?;
        std::fs::write(&out_path, &buf)?;
        info!("extracted {} from {}", out_path.display(), path.display());
        extracted.push(out_path);
    }
    Ok(extracted)
}

fn extract_zip(path: &Path, out_dir: &Path, want_ext: &str) -> Result<Vec<PathBuf>, CrawlError> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)
        .map_err(|e| CrawlError::Archive(format!("zip {}: {}", path.display(), e)))?;
    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| CrawlError::Archive(format!("zip {}: {}", path.display(), e)))?;
        let name = entry.name().to_string();
        if !name.ends_with(want_ext) {
            continue;
        }
        let file_name = Path::new(&name)
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| CrawlError::Archive(format!("bad entry name: {}", name)))?;
        let out_path = out_dir.join(file_name);
        let mut buf = Vec::new();
        entry
            .read_to_end(&mut buf)
            .map_err(|e| CrawlError::Archive(format!("zip entry {}: {}", name, e)))?;
        std::fs::write(&out_path, &buf)?;
        info!("extracted {} from {}", out_path.display(), path.display());
        extracted.push(out_path);
    }
    Ok(extracted)
}
