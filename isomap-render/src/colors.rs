//! Block color table.
//!
//! Loaded once from JSON before rendering and shared read-only afterwards.
//! The file maps a block code to its sprite colors:
//!
//! ```json
//! { "2": { "alpha": 255, "full": true,
//!          "top": [89, 143, 47, 255], "left": [62, 100, 33, 255], "right": [71, 114, 38, 255] } }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Premultiplied RGBA color, serialized as `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba(0, 0, 0, 0);

    pub fn to_array(self) -> [u8; 4] {
        [self.0, self.1, self.2, self.3]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockColor {
    pub alpha: u8,
    /// Full cube sprite when set, flat sprite otherwise.
    pub full: bool,
    pub top: Rgba,
    pub left: Rgba,
    pub right: Rgba,
}

impl BlockColor {
    pub fn is_opaque(&self) -> bool {
        self.alpha == 0xFF
    }
}

/// Block code to color. Codes without an entry are not drawn.
#[derive(Debug, Clone, Default)]
pub struct BlockPalette {
    colors: HashMap<u8, BlockColor>,
}

impl BlockPalette {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open block color file {}", path.display()))?;
        let palette = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse block color file {}", path.display()))?;
        log::info!("Loaded {} block colors from {}", palette.len(), path.display());
        Ok(palette)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let colors: HashMap<u8, BlockColor> = serde_json::from_reader(reader)?;
        Ok(Self { colors })
    }

    #[inline]
    pub fn get(&self, code: u8) -> Option<&BlockColor> {
        self.colors.get(&code)
    }

    pub fn insert(&mut self, code: u8, color: BlockColor) {
        self.colors.insert(code, color);
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl FromIterator<(u8, BlockColor)> for BlockPalette {
    fn from_iter<I: IntoIterator<Item = (u8, BlockColor)>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}
