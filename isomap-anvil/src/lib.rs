//! Reader for legacy region containers (`r.X.Z.mca`).
//!
//! - `region`: location table and bounded record views
//! - `decode`: record inflation and tag-tree decoding into [`Level`]
//! - `writer`: packs levels back into a container (fixtures, tooling)

pub mod chunk;
pub mod decode;
pub mod region;
pub mod writer;

pub use chunk::{Level, Section, MAX_CHUNK_COORD, SECTION_BLOCKS};
pub use decode::{decode_level, decode_record, inflate_record, DecodeError, Inflated};
pub use region::{Location, LocationTable, RecordView, Region, RegionInfo, MAX_REGION_COORD};
pub use writer::RegionWriter;
