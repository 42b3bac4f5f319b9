//! Registry of per-marker cluster diagnostic images.
//!
//! Images are keyed by marker id (usually an rsID) and cluster hypothesis
//! K=1/2/3. The registry exclusively owns every image handle it holds and
//! releases them when entries are overwritten, cleared, or when the registry
//! itself is dropped.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::ClusterK;

/// A loaded image resource with an explicit release step.
pub trait ImageHandle {
    /// Free the underlying resource.
    fn release(self);
}

/// Raw encoded image bytes, used when no decoding backend is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes(pub Vec<u8>);

impl ImageHandle for ImageBytes {
    fn release(self) {}
}

/// Index-only entries hold no resource.
impl ImageHandle for () {
    fn release(self) {}
}

/// Parse a cluster image file name of the form `<marker><sep>k<1|2|3>.png`.
///
/// `sep` is one of `_`, `-`, `.`; the `k` and the `.png` extension are
/// case-insensitive. The marker is everything before the separator, so
/// markers may themselves contain separator characters.
pub fn parse_cluster_file_name(name: &str) -> Option<(&str, ClusterK)> {
    let name = name.trim();
    let split = name.len().checked_sub(4)?;
    if !name.is_char_boundary(split) || !name[split..].eq_ignore_ascii_case(".png") {
        return None;
    }
    let stem = &name[..split];
    let bytes = stem.as_bytes();
    if bytes.len() < 4 {
        return None;
    }
    let n = bytes.len();
    let k = ClusterK::from_digit(bytes[n - 1] as char)?;
    if !bytes[n - 2].eq_ignore_ascii_case(&b'k') || !matches!(bytes[n - 3], b'_' | b'-' | b'.') {
        return None;
    }
    Some((&stem[..n - 3], k))
}

/// Compare marker ids case-insensitively, ordering digit runs by value
/// (`rs2` < `rs10`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let da = take_digits(&mut ai);
                let db = take_digits(&mut bi);
                let ord = cmp_digit_runs(&da, &db);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut s = String::new();
    while let Some(c) = it.peek().copied().filter(char::is_ascii_digit) {
        s.push(c);
        it.next();
    }
    s
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

// ────────────────────────────────────────────────────────────────────────────
// Entries
// ────────────────────────────────────────────────────────────────────────────

/// One K slot: the loaded image and the file it came from.
#[derive(Debug)]
pub struct ClusterSlot<H> {
    pub image: H,
    pub file_name: String,
}

/// Up to three independently set image slots for one marker.
#[derive(Debug)]
pub struct ClusterEntry<H> {
    slots: [Option<ClusterSlot<H>>; 3],
}

impl<H> Default for ClusterEntry<H> {
    fn default() -> Self {
        Self {
            slots: [None, None, None],
        }
    }
}

impl<H: ImageHandle> ClusterEntry<H> {
    pub fn slot(&self, k: ClusterK) -> Option<&ClusterSlot<H>> {
        self.slots[k.index()].as_ref()
    }

    pub fn has(&self, k: ClusterK) -> bool {
        self.slots[k.index()].is_some()
    }

    pub fn file_name(&self, k: ClusterK) -> Option<&str> {
        self.slot(k).map(|s| s.file_name.as_str())
    }

    /// Set a slot, releasing any image it previously held.
    pub fn set(&mut self, k: ClusterK, image: H, file_name: impl Into<String>) {
        let old = self.slots[k.index()].replace(ClusterSlot {
            image,
            file_name: file_name.into(),
        });
        if let Some(old) = old {
            old.image.release();
        }
    }

    fn release(self) {
        for slot in self.slots.into_iter().flatten() {
            slot.image.release();
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// Marker id to cluster entry.
#[derive(Debug)]
pub struct ImageRegistry<H: ImageHandle> {
    entries: BTreeMap<String, ClusterEntry<H>>,
}

impl<H: ImageHandle> Default for ImageRegistry<H> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<H: ImageHandle> ImageRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, marker: &str) -> Option<&ClusterEntry<H>> {
        self.entries.get(marker)
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.entries.contains_key(marker)
    }

    /// All entries keyed by marker id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClusterEntry<H>)> {
        self.entries.iter().map(|(m, e)| (m.as_str(), e))
    }

    /// Upsert the `k` slot of `marker`. A later insert for the same marker and
    /// K replaces (and releases) the earlier image.
    pub fn insert(&mut self, marker: &str, k: ClusterK, image: H, file_name: impl Into<String>) {
        self.entries
            .entry(marker.to_string())
            .or_default()
            .set(k, image, file_name);
    }

    /// Release every held image and empty the registry.
    pub fn clear(&mut self) {
        for (_, entry) in std::mem::take(&mut self.entries) {
            entry.release();
        }
    }

    /// Markers with an image for `k`, in natural case-insensitive order.
    pub fn list_markers(&self, k: ClusterK) -> Vec<String> {
        let mut list: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.has(k))
            .map(|(m, _)| m.clone())
            .collect();
        list.sort_by(|a, b| natural_cmp(a, b).then_with(|| a.cmp(b)));
        list
    }
}

impl<H: ImageHandle> Drop for ImageRegistry<H> {
    fn drop(&mut self) {
        self.clear();
    }
}
