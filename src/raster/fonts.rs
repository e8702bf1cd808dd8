use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use thiserror::Error;

use crate::tools::DEFAULT_FONT_FAMILY;

/// Well-known font files tried when no font is configured for a family.
pub const SYSTEM_FONT_CANDIDATES: &[(&str, &str)] = &[
    ("sans", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
    ("sans", "/usr/share/fonts/TTF/DejaVuSans.ttf"),
    ("sans", "/usr/share/fonts/dejavu/DejaVuSans.ttf"),
    ("sans", "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"),
    ("sans", "/usr/share/fonts/liberation/LiberationSans-Regular.ttf"),
    ("sans", "/usr/share/fonts/noto/NotoSans-Regular.ttf"),
    ("sans", "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf"),
    ("serif", "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf"),
    ("serif", "/usr/share/fonts/TTF/DejaVuSerif.ttf"),
    ("serif", "/usr/share/fonts/dejavu/DejaVuSerif.ttf"),
    ("serif", "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf"),
    ("monospace", "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf"),
    ("monospace", "/usr/share/fonts/TTF/DejaVuSansMono.ttf"),
    ("monospace", "/usr/share/fonts/dejavu/DejaVuSansMono.ttf"),
];

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font file {path} is not a usable TrueType/OpenType font")]
    Parse { path: PathBuf },
    #[error("no font registered for family '{family}' and no fallback available")]
    NotFound { family: String },
}

/// Family name to loaded font. Lookups are case-insensitive and fall back to
/// the default family, then to any registered font.
#[derive(Clone, Default)]
pub struct FontBook {
    fonts: BTreeMap<String, FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.fonts.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn family_key(family: &str) -> String {
    family.trim().to_lowercase()
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every configured font, then fills missing families from
    /// [`SYSTEM_FONT_CANDIDATES`]. Unreadable files are logged and skipped.
    pub fn from_paths<'a>(configured: impl IntoIterator<Item = (&'a String, &'a PathBuf)>) -> Self {
        let mut book = Self::new();
        for (family, path) in configured {
            if let Err(err) = book.load_file(family, path) {
                tracing::warn!(%family, error = %err, "skipping configured font");
            }
        }
        book.load_system_fallbacks();
        book
    }

    pub fn load_system_fallbacks(&mut self) {
        for (family, path) in SYSTEM_FONT_CANDIDATES {
            if self.contains(family) {
                continue;
            }
            let path = Path::new(path);
            if !path.is_file() {
                continue;
            }
            match self.load_file(family, path) {
                Ok(()) => tracing::debug!(family, path = %path.display(), "loaded system font"),
                Err(err) => tracing::debug!(family, error = %err, "system font candidate unusable"),
            }
        }
    }

    pub fn load_file(&mut self, family: &str, path: &Path) -> Result<(), FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontArc::try_from_vec(bytes).map_err(|_| FontError::Parse {
            path: path.to_path_buf(),
        })?;
        self.register(family, font);
        Ok(())
    }

    pub fn register(&mut self, family: &str, font: FontArc) {
        self.fonts.insert(family_key(family), font);
    }

    pub fn contains(&self, family: &str) -> bool {
        self.fonts.contains_key(&family_key(family))
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    pub fn resolve(&self, family: &str) -> Result<&FontArc, FontError> {
        let key = family_key(family);
        if let Some(font) = self.fonts.get(&key) {
            return Ok(font);
        }
        let fallback = self
            .fonts
            .get(DEFAULT_FONT_FAMILY)
            .or_else(|| self.fonts.values().next())
            .ok_or_else(|| FontError::NotFound {
                family: family.to_string(),
            })?;
        tracing::debug!(family, "font family not registered, using fallback");
        Ok(fallback)
    }
}
