//! Chunk values decoded from legacy region records.
//!
//! The tag-tree layout is a root compound holding a `Level` compound. Only
//! the fields the renderer consumes are mapped; everything else is ignored
//! by serde.

use serde::{Deserialize, Serialize};

use crate::decode::DecodeError;

/// Block codes per section (16x16x16).
pub const SECTION_BLOCKS: usize = 4096;
pub const SECTION_HEIGHT: i32 = 16;

/// Largest chunk coordinate magnitude whose projected pixels fit in `i32`.
pub const MAX_CHUNK_COORD: i32 = 1 << 24;

/// A decoded chunk column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Level {
    /// Chunk coordinates (absolute, not relative to region)
    pub x: i32,
    pub z: i32,
    pub last_update: i64,
    pub terrain_populated: Option<i8>,
    pub height_map: Vec<i32>,
    /// Ordered by ascending `y`.
    pub sections: Vec<Section>,
}

impl Level {
    /// Only chunks whose populated flag is exactly 1 are rendered.
    pub fn is_populated(&self) -> bool {
        self.terrain_populated == Some(1)
    }

    /// Both coordinates lie within `±MAX_CHUNK_COORD`.
    pub fn in_range(&self) -> bool {
        self.x.unsigned_abs() <= MAX_CHUNK_COORD as u32 && self.z.unsigned_abs() <= MAX_CHUNK_COORD as u32
    }

    /// Highest block Y covered by a section, plus one section of slack.
    pub fn top_y(&self) -> i32 {
        let highest = self
            .sections
            .iter()
            .map(|s| (s.y as i32) << 4)
            .fold(0, i32::max);
        highest + SECTION_HEIGHT
    }
}

/// One 16-block vertical slice of a chunk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub y: i8,
    /// Either empty (no block array stored) or exactly 4096 codes.
    pub blocks: Vec<u8>,
    /// Block metadata nibbles, not used for rendering.
    pub data: Vec<u8>,
}

impl Section {
    /// Block code at section-local coordinates, `None` outside [0, 16).
    pub fn block(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        if x >= 16 || y >= 16 || z >= 16 {
            return None;
        }
        self.blocks.get((y * 16 + z) * 16 + x).copied()
    }
}

// --- NBT layout ---

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChunkRoot {
    #[serde(rename = "Level")]
    pub level: LevelTag,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LevelTag {
    #[serde(rename = "xPos")]
    pub x_pos: i32,
    #[serde(rename = "zPos")]
    pub z_pos: i32,

    #[serde(rename = "LastUpdate", default)]
    pub last_update: i64,

    #[serde(rename = "TerrainPopulated", default, skip_serializing_if = "Option::is_none")]
    pub terrain_populated: Option<i8>,

    #[serde(rename = "HeightMap", default, skip_serializing_if = "Option::is_none")]
    pub height_map: Option<fastnbt::IntArray>,

    #[serde(rename = "Sections", default)]
    pub sections: Vec<SectionTag>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SectionTag {
    #[serde(rename = "Y")]
    pub y: i8,

    #[serde(rename = "Blocks", default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<fastnbt::ByteArray>,

    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<fastnbt::ByteArray>,
}

fn unsigned(bytes: Option<fastnbt::ByteArray>) -> Vec<u8> {
    bytes
        .map(|b| b.iter().map(|&v| v as u8).collect())
        .unwrap_or_default()
}

fn signed(bytes: &[u8]) -> fastnbt::ByteArray {
    fastnbt::ByteArray::new(bytes.iter().map(|&v| v as i8).collect())
}

impl TryFrom<SectionTag> for Section {
    type Error = DecodeError;

    fn try_from(tag: SectionTag) -> Result<Self, Self::Error> {
        let blocks = unsigned(tag.blocks);
        if !blocks.is_empty() && blocks.len() != SECTION_BLOCKS {
            return Err(DecodeError::BadSection {
                y: tag.y,
                len: blocks.len(),
            });
        }
        Ok(Section {
            y: tag.y,
            blocks,
            data: unsigned(tag.data),
        })
    }
}

impl TryFrom<LevelTag> for Level {
    type Error = DecodeError;

    fn try_from(tag: LevelTag) -> Result<Self, Self::Error> {
        let mut sections = tag
            .sections
            .into_iter()
            .map(Section::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        sections.sort_by_key(|s| s.y);

        let level = Level {
            x: tag.x_pos,
            z: tag.z_pos,
            last_update: tag.last_update,
            terrain_populated: tag.terrain_populated,
            height_map: tag.height_map.map(|h| h.to_vec()).unwrap_or_default(),
            sections,
        };
        if !level.in_range() {
            return Err(DecodeError::PositionOutOfRange { x: level.x, z: level.z });
        }
        Ok(level)
    }
}

impl From<&Level> for ChunkRoot {
    fn from(level: &Level) -> Self {
        let sections = level
            .sections
            .iter()
            .map(|s| SectionTag {
                y: s.y,
                blocks: (!s.blocks.is_empty()).then(|| signed(&s.blocks)),
                data: (!s.data.is_empty()).then(|| signed(&s.data)),
            })
            .collect();

        ChunkRoot {
            level: LevelTag {
                x_pos: level.x,
                z_pos: level.z,
                last_update: level.last_update,
                terrain_populated: level.terrain_populated,
                height_map: (!level.height_map.is_empty())
                    .then(|| fastnbt::IntArray::new(level.height_map.clone())),
                sections,
            },
        }
    }
}
