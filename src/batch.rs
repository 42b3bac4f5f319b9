//! Image batch sources and registry building.
//!
//! A batch is a set of named files read from a folder, an explicit list of
//! files, or a ZIP archive. Only the file name (not its directory) is matched
//! against the cluster image naming scheme.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use std::fmt;
use std::io::{Read, Seek};

use crate::registry::{ImageBytes, ImageHandle, ImageRegistry, parse_cluster_file_name};

/// Input-validation failures reported to the user without touching state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No folder or files were selected, or the selection holds no files.
    EmptySelection,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::EmptySelection => f.write_str("Select a folder or multiple PNG files first."),
        }
    }
}

impl std::error::Error for LoadError {}

/// Trait for abstracting where batch files come from (folder, file list, ZIP).
pub trait BatchSource {
    /// List entry paths in iteration order.
    fn entries(&mut self) -> Result<Vec<String>>;
    /// Read the bytes of an entry returned by [`BatchSource::entries`].
    fn read(&mut self, entry: &str) -> Result<Vec<u8>>;
}

/// File name component of an entry path (`/` or `\` separated).
pub fn entry_file_name(entry: &str) -> &str {
    entry.rsplit(['/', '\\']).next().unwrap_or(entry)
}

/// All files below a folder, recursively, sorted by path.
pub struct DirSource {
    root: Utf8PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BatchSource for DirSource {
    fn entries(&mut self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(self.root.as_std_path()).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Read dir {}", self.root))?;
            if entry.file_type().is_file() {
                let p = Utf8PathBuf::from_path_buf(entry.into_path())
                    .map_err(|p| anyhow::anyhow!("Non-UTF8 path {}", p.display()))?;
                files.push(p.into_string());
            }
        }
        Ok(files)
    }

    fn read(&mut self, entry: &str) -> Result<Vec<u8>> {
        std::fs::read(entry).with_context(|| format!("Failed to read {}", entry))
    }
}

/// An explicit list of files, in the given order.
pub struct FileListSource {
    files: Vec<Utf8PathBuf>,
}

impl FileListSource {
    pub fn new(files: Vec<Utf8PathBuf>) -> Self {
        Self { files }
    }
}

impl BatchSource for FileListSource {
    fn entries(&mut self) -> Result<Vec<String>> {
        Ok(self.files.iter().map(|p| p.to_string()).collect())
    }

    fn read(&mut self, entry: &str) -> Result<Vec<u8>> {
        std::fs::read(entry).with_context(|| format!("Failed to read {}", entry))
    }
}

/// Files stored in a ZIP archive, in archive order.
pub struct ZipSource<R: Read + Seek> {
    zip: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let zip = zip::ZipArchive::new(reader).context("Failed to open zip archive")?;
        Ok(Self { zip })
    }
}

impl<R: Read + Seek> BatchSource for ZipSource<R> {
    fn entries(&mut self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for i in 0..self.zip.len() {
            let f = self.zip.by_index(i)?;
            if !f.is_dir() {
                files.push(f.name().to_string());
            }
        }
        Ok(files)
    }

    fn read(&mut self, entry: &str) -> Result<Vec<u8>> {
        let mut f = self
            .zip
            .by_name(entry)
            .with_context(|| format!("File {} not found in zip", entry))?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)
            .with_context(|| format!("Failed to read {} from zip", entry))?;
        Ok(buf)
    }
}

/// Open a folder or `.zip` archive as a batch source.
pub fn open_source(path: &Utf8Path) -> Result<Box<dyn BatchSource>> {
    if path.is_dir() {
        return Ok(Box::new(DirSource::new(path)));
    }
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("zip")) {
        let file = std::fs::File::open(path).with_context(|| format!("Open {}", path))?;
        let reader = std::io::BufReader::new(file);
        return Ok(Box::new(ZipSource::new(reader)?));
    }
    anyhow::bail!("Not a folder or .zip archive: {}", path)
}

// ────────────────────────────────────────────────────────────────────────────
// Loading
// ────────────────────────────────────────────────────────────────────────────

/// Turns encoded image bytes into a handle owned by the registry.
pub trait ImageLoader {
    type Image: ImageHandle;
    fn load(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<Self::Image>;

    /// Whether [`Self::load`] needs the file contents. When false the source
    /// is never read and `load` receives an empty buffer.
    fn needs_bytes(&self) -> bool {
        true
    }
}

/// Keeps the encoded bytes as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytesLoader;

impl ImageLoader for BytesLoader {
    type Image = ImageBytes;
    fn load(&mut self, _file_name: &str, bytes: Vec<u8>) -> Result<ImageBytes> {
        Ok(ImageBytes(bytes))
    }
}

/// Records file names only; nothing is read from the source.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexOnlyLoader;

impl ImageLoader for IndexOnlyLoader {
    type Image = ();
    fn load(&mut self, _file_name: &str, _bytes: Vec<u8>) -> Result<()> {
        Ok(())
    }

    fn needs_bytes(&self) -> bool {
        false
    }
}

/// Per-file progress of a batch load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub done: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.done as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn message(&self) -> String {
        format!(
            "Loaded {} / {} image{} ({}%)",
            self.done,
            self.total,
            if self.total == 1 { "" } else { "s" },
            self.percent()
        )
    }
}

/// Build a fresh registry from every entry of `source`.
///
/// Entries whose file name does not match `<marker>[_-.]k<1|2|3>.png`, or
/// whose bytes fail to load, are counted toward progress and skipped. An
/// empty source is rejected with [`LoadError::EmptySelection`].
pub fn build_registry<L: ImageLoader>(
    source: &mut dyn BatchSource,
    loader: &mut L,
    on_progress: &mut dyn FnMut(BatchProgress),
) -> Result<ImageRegistry<L::Image>> {
    let entries = source.entries()?;
    if entries.is_empty() {
        return Err(LoadError::EmptySelection.into());
    }
    let total = entries.len();
    let mut registry = ImageRegistry::new();
    let mut matched = 0usize;
    for (i, entry) in entries.iter().enumerate() {
        let name = entry_file_name(entry).trim();
        if let Some((marker, k)) = parse_cluster_file_name(name) {
            let bytes = if loader.needs_bytes() {
                source.read(entry)
            } else {
                Ok(Vec::new())
            };
            let image = bytes.and_then(|bytes| loader.load(name, bytes));
            match image {
                Ok(image) => {
                    debug!("{} -> marker '{}' {}", name, marker, k.label());
                    registry.insert(marker, k, image, name);
                    matched += 1;
                }
                Err(e) => warn!("Skipping {}: {:#}", entry, e),
            }
        } else {
            debug!("Ignoring {} (name does not match)", name);
        }
        on_progress(BatchProgress { done: i + 1, total });
    }
    info!(
        "Loaded {} of {} images for {} markers",
        matched,
        total,
        registry.len()
    );
    Ok(registry)
}
