//! Marker selection and per-K image resolution.

use crate::model::ClusterK;
use crate::registry::{ImageHandle, ImageRegistry, natural_cmp};

/// What the image panel for one K shows.
#[derive(Debug, PartialEq)]
pub enum PanelImage<'a, H> {
    Shown { image: &'a H, file_name: &'a str },
    /// No marker is selected.
    NoSelection,
    /// The selected marker has no image for this K.
    Missing,
}

impl<'a, H> PanelImage<'a, H> {
    pub fn image(&self) -> Option<&'a H> {
        match self {
            PanelImage::Shown { image, .. } => Some(*image),
            _ => None,
        }
    }

    pub fn file_name(&self) -> Option<&'a str> {
        match self {
            PanelImage::Shown { file_name, .. } => Some(*file_name),
            _ => None,
        }
    }
}

/// Resolve the image for `selected` at `k`.
pub fn resolve_selection<'a, H: ImageHandle>(
    registry: &'a ImageRegistry<H>,
    selected: Option<&str>,
    k: ClusterK,
) -> PanelImage<'a, H> {
    let Some(marker) = selected else {
        return PanelImage::NoSelection;
    };
    match registry.get(marker).and_then(|e| e.slot(k)) {
        Some(slot) => PanelImage::Shown {
            image: &slot.image,
            file_name: &slot.file_name,
        },
        None => PanelImage::Missing,
    }
}

/// Caption text shown under a panel image.
pub fn caption<H>(panel: &PanelImage<'_, H>, selected: Option<&str>, k: ClusterK) -> String {
    let marker = selected.unwrap_or("");
    match panel {
        PanelImage::Shown { file_name, .. } if file_name.is_empty() => {
            format!("{} • {}", marker, k.label())
        }
        PanelImage::Shown { file_name, .. } => format!("{} • {} • {}", marker, k.label(), file_name),
        PanelImage::Missing if selected.is_some() => {
            format!("No image found for {} • {}", marker, k.label())
        }
        PanelImage::Missing | PanelImage::NoSelection => "No image loaded".to_string(),
    }
}

/// Keep `current` if it is in `list`, otherwise fall back to the first marker
/// in natural order, or `None` for an empty list.
pub fn revalidate_selection(list: &[String], current: Option<&str>) -> Option<String> {
    if let Some(cur) = current {
        if list.iter().any(|m| m == cur) {
            return Some(cur.to_string());
        }
    }
    list.iter()
        .min_by(|a, b| natural_cmp(a, b).then_with(|| a.cmp(b)))
        .cloned()
}
