//! Icon registry: glyphs for navigation hotspots, keyed by bare file name.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::constants::IMAGE_EXTENSIONS;
use crate::loader::LoaderError;

/// A decoded icon glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    /// Bare name the icon is registered under
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// RGBA pixel data (width * height * 4 bytes)
    pub rgba: Vec<u8>,
}

impl Icon {
    /// Decode an icon from encoded image bytes.
    pub fn from_bytes(name: &str, data: &[u8]) -> Result<Self, LoaderError> {
        let img = image::load_from_memory(data)
            .map_err(|e| {
                LoaderError::new(format!("Failed to decode icon '{}': {}", name, e))
                    .with_loader("icon")
            })?
            .to_rgba8();
        Ok(Self {
            name: bare_icon_name(name).to_string(),
            width: img.width(),
            height: img.height(),
            rgba: img.into_raw(),
        })
    }
}

/// Reduce an icon reference (path, URL or file name) to its bare name.
///
/// `https://cdn/icons/arrow-left.png?v=3` becomes `arrow-left`.
pub fn bare_icon_name(icon_ref: &str) -> &str {
    let without_query = icon_ref.split(['?', '#']).next().unwrap_or(icon_ref);
    let file = without_query
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(without_query);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}

/// Mapping from bare icon name to glyph.
#[derive(Debug, Default, Clone)]
pub struct IconRegistry {
    icons: HashMap<String, Arc<Icon>>,
}

impl IconRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an icon under the bare form of `name`.
    pub fn insert(&mut self, name: &str, icon: Icon) {
        self.icons
            .insert(bare_icon_name(name).to_string(), Arc::new(icon));
    }

    /// Look up an icon by bare name.
    pub fn get(&self, name: &str) -> Option<Arc<Icon>> {
        self.icons.get(name).cloned()
    }

    /// Resolve a hotspot's icon reference (path/extension are ignored).
    pub fn resolve(&self, icon_ref: &str) -> Option<Arc<Icon>> {
        self.get(bare_icon_name(icon_ref))
    }

    /// Number of registered icons.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.icons.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Decode every image file in `folder` and register it by file stem.
    ///
    /// Files that fail to decode are skipped with a warning. Returns how many
    /// icons were added.
    pub fn load_dir(&mut self, folder: &Path) -> Result<usize, LoaderError> {
        let mut paths: Vec<std::path::PathBuf> = std::fs::read_dir(folder)
            .map_err(|e| {
                LoaderError::new(format!("Cannot read icon folder {:?}: {}", folder, e))
                    .with_loader("icon")
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();

        paths.sort();

        let mut added = 0;
        for path in paths {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let loaded = std::fs::read(&path)
                .map_err(|e| LoaderError::new(e.to_string()).with_loader("icon"))
                .and_then(|bytes| Icon::from_bytes(file_name, &bytes));
            match loaded {
                Ok(icon) => {
                    self.insert(file_name, icon);
                    added += 1;
                }
                Err(e) => log::warn!("Skipping icon {:?}: {}", path, e),
            }
        }

        log::info!("Loaded {} icons from {:?}", added, folder);
        Ok(added)
    }
}
