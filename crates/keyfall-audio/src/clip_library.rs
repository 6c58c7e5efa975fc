use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::backend::{AudioBackend, ClipId};

const CLIP_EXTENSIONS: [&str; 4] = ["wav", "ogg", "mp3", "flac"];

/// Loaded clips indexed by name (file stem).
///
/// Lookups are case-insensitive; [`ClipLibrary::names`] keeps the original
/// spelling so key matching can report what it found.
#[derive(Debug, Default, Clone)]
pub struct ClipLibrary {
    /// Lower-cased name -> (original name, clip).
    clips: HashMap<String, (String, ClipId)>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every supported audio file in `dir` through `backend`.
    ///
    /// Files that fail to load are logged and skipped; only an unreadable
    /// directory is an error.
    pub fn scan<A: AudioBackend>(dir: &Path, backend: &mut A) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read clip directory: {}", dir.display()))?;

        let mut library = Self::new();
        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| is_clip_file(p))
            .collect();
        // read_dir order is platform dependent; keep "first match wins" stable.
        paths.sort();

        for path in paths {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if library.get(&stem).is_some() {
                continue;
            }
            match backend.load_clip(&path) {
                Ok(clip) => library.insert(&stem, clip),
                Err(e) => warn!("Skipping clip {}: {e:#}", path.display()),
            }
        }

        info!("Loaded {} clips from {}", library.len(), dir.display());
        Ok(library)
    }

    /// Register a clip under `name`, replacing any clip with the same name.
    pub fn insert(&mut self, name: &str, clip: ClipId) {
        self.clips
            .insert(name.to_lowercase(), (name.to_string(), clip));
    }

    pub fn get(&self, name: &str) -> Option<ClipId> {
        self.clips.get(&name.to_lowercase()).map(|(_, clip)| *clip)
    }

    /// Clip names as originally spelled.
    pub fn names(&self) -> impl Iterator<Item = &str> + Clone {
        self.clips.values().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

fn is_clip_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| CLIP_EXTENSIONS.contains(&e.as_str()))
}
