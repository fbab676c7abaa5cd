//! Generation-record blob decoding
//!
//! History rows store their metadata as a positional table/vtable blob: a
//! 4-byte root offset leads to a table, each table points back at a vtable,
//! and the vtable maps fixed field slots to byte offsets inside the table
//! (0 = field absent). Optional fields and schema growth fall out of that
//! indirection for free: a slot past the end of a blob's vtable simply means
//! the field was added after that blob was written.
//!
//! The slot numbers below are an external format contract with the producing
//! application. The format carries no version tag or checksum, so a mismatch
//! here would silently yield plausible but wrong values; the round-trip tests
//! pin every slot on purpose.

use chrono::{DateTime, Utc};

use super::reader::BlobReader;
use crate::state::data::{GenerationRecord, Lora, Sampler, SeedMode};

/// Field slots in the root record table (`4 + 2 * field_index`).
mod slot {
    pub const START_WIDTH: u16 = 8;
    pub const START_HEIGHT: u16 = 10;
    pub const SEED: u16 = 12;
    pub const STEPS: u16 = 14;
    pub const GUIDANCE_SCALE: u16 = 16;
    pub const STRENGTH: u16 = 18;
    pub const MODEL: u16 = 20;
    pub const WALL_CLOCK: u16 = 26;
    pub const SAMPLER: u16 = 34;
    pub const SEED_MODE: u16 = 54;
    pub const LORAS: u16 = 64;
    pub const PREVIEW_ID: u16 = 86;
    pub const SHIFT: u16 = 136;
    pub const TEXT_PROMPT: u16 = 200;
    pub const NEGATIVE_TEXT_PROMPT: u16 = 202;
}

/// Field slots in a LoRA element table.
mod lora_slot {
    pub const FILE: u16 = 4;
    pub const WEIGHT: u16 = 6;
}

/// Stored dimensions are in units of 64 pixels
const SIZE_UNIT: u32 = 64;

/// Declared vector lengths at or above this are treated as garbage
const MAX_VECTOR_LEN: u32 = 100;

/// Weight applied to a LoRA entry whose weight field is absent
const DEFAULT_LORA_WEIGHT: f32 = 0.6;

/// One table inside a blob, addressed through its vtable.
#[derive(Debug, Clone, Copy)]
struct Table<'a> {
    buf: BlobReader<'a>,
    /// Absolute position of the table (its soffset word)
    pos: usize,
    /// Absolute position of the vtable
    vtable: usize,
    /// Declared vtable size in bytes
    vtable_len: u16,
}

impl<'a> Table<'a> {
    /// Resolve the table at `pos` by following its soffset to the vtable.
    /// Returns None when the vtable lands outside the buffer — that blob
    /// cannot be trusted at all.
    fn at(buf: BlobReader<'a>, pos: usize) -> Option<Table<'a>> {
        if pos.checked_add(4)? > buf.len() {
            return None;
        }
        let soffset = buf.i32(pos) as i64;
        let vtable = (pos as i64).checked_sub(soffset)?;
        if vtable < 0 || (vtable as usize).checked_add(4)? > buf.len() {
            return None;
        }
        let vtable = vtable as usize;
        let vtable_len = buf.u16(vtable);
        Some(Table { buf, pos, vtable, vtable_len })
    }

    /// Resolve the root table named by the leading 4-byte offset.
    fn root(buf: BlobReader<'a>) -> Option<Table<'a>> {
        if buf.len() < 4 {
            return None;
        }
        Table::at(buf, buf.u32(0) as usize)
    }

    /// Absolute position of a field's data, or None when the field is absent
    /// (slot beyond this blob's vtable, or a zero entry).
    fn field(&self, slot: u16) -> Option<usize> {
        if u32::from(slot) + 2 > u32::from(self.vtable_len) {
            return None;
        }
        let off = self.buf.u16(self.vtable + slot as usize);
        if off == 0 {
            return None;
        }
        self.pos.checked_add(off as usize)
    }

    fn u16_field(&self, slot: u16, default: u16) -> u16 {
        self.field(slot).map_or(default, |p| self.buf.u16(p))
    }

    fn u32_field(&self, slot: u16, default: u32) -> u32 {
        self.field(slot).map_or(default, |p| self.buf.u32(p))
    }

    fn i64_field(&self, slot: u16, default: i64) -> i64 {
        self.field(slot).map_or(default, |p| self.buf.i64(p))
    }

    fn f32_field(&self, slot: u16, default: f32) -> f32 {
        self.field(slot).map_or(default, |p| self.buf.f32(p))
    }

    fn byte_field(&self, slot: u16, default: u8) -> u8 {
        self.field(slot).map_or(default, |p| self.buf.u8(p))
    }

    /// Follow the indirection at a field position: a 4-byte relative offset
    /// to the payload (0 = absent).
    fn indirect(&self, slot: u16) -> Option<usize> {
        let field_pos = self.field(slot)?;
        let rel = self.buf.u32(field_pos);
        if rel == 0 {
            return None;
        }
        field_pos.checked_add(rel as usize)
    }

    /// Decode a string field: length-prefixed UTF-8 at the payload position.
    /// Absent or truncated strings come back empty.
    fn string_field(&self, slot: u16) -> String {
        let Some(payload) = self.indirect(slot) else {
            return String::new();
        };
        let len = self.buf.u32(payload) as usize;
        match payload.checked_add(4).and_then(|p| self.buf.slice(p, len)) {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => String::new(),
        }
    }

    /// Decode a vector-of-tables field: a length-prefixed array of relative
    /// offsets, each pointing at a nested table. Implausible declared lengths
    /// yield an empty vector instead of attempting the implied reads.
    fn table_vector_field(&self, slot: u16) -> Vec<Table<'a>> {
        let Some(payload) = self.indirect(slot) else {
            return Vec::new();
        };
        let count = self.buf.u32(payload);
        if count == 0 || count >= MAX_VECTOR_LEN {
            return Vec::new();
        }
        let mut tables = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let Some(entry) = payload.checked_add(4 + 4 * i) else {
                break;
            };
            let rel = self.buf.u32(entry);
            if rel == 0 {
                continue;
            }
            let Some(pos) = entry.checked_add(rel as usize) else {
                continue;
            };
            if let Some(table) = Table::at(self.buf, pos) {
                tables.push(table);
            }
        }
        tables
    }
}

/// Decode one LoRA element table; entries without a file name are dropped.
fn decode_lora(table: &Table) -> Option<Lora> {
    let file = table.string_field(lora_slot::FILE);
    if file.is_empty() {
        return None;
    }
    Some(Lora {
        file,
        weight: table.f32_field(lora_slot::WEIGHT, DEFAULT_LORA_WEIGHT),
    })
}

/// Decode a generation-history blob into a record.
///
/// `id`, `lineage` and `logical_time` come from the row's own columns; the
/// rest is pulled out of the blob. Returns None only when the root table or
/// its vtable cannot be located — individual absent fields resolve to their
/// documented defaults instead.
pub fn decode_generation(
    id: i64,
    lineage: i64,
    logical_time: i64,
    blob: &[u8],
) -> Option<GenerationRecord> {
    let buf = BlobReader::new(blob);
    let root = Table::root(buf)?;

    let wall_clock_secs = root.i64_field(slot::WALL_CLOCK, 0);
    let wall_clock = if wall_clock_secs > 0 {
        DateTime::from_timestamp(wall_clock_secs, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    } else {
        // zero or absent means "never recorded", not the epoch
        DateTime::<Utc>::MIN_UTC
    };

    let loras = root
        .table_vector_field(slot::LORAS)
        .iter()
        .filter_map(decode_lora)
        .collect();

    Some(GenerationRecord {
        id,
        lineage,
        logical_time,
        preview_id: root.i64_field(slot::PREVIEW_ID, 0),
        prompt: root.string_field(slot::TEXT_PROMPT),
        negative_prompt: root.string_field(slot::NEGATIVE_TEXT_PROMPT),
        model: root.string_field(slot::MODEL),
        width: u32::from(root.u16_field(slot::START_WIDTH, 0)) * SIZE_UNIT,
        height: u32::from(root.u16_field(slot::START_HEIGHT, 0)) * SIZE_UNIT,
        steps: root.u32_field(slot::STEPS, 0),
        guidance_scale: root.f32_field(slot::GUIDANCE_SCALE, 0.0),
        strength: root.f32_field(slot::STRENGTH, 0.0),
        shift: root.f32_field(slot::SHIFT, 1.0),
        seed: root.u32_field(slot::SEED, 0),
        sampler: Sampler::from_code(root.byte_field(slot::SAMPLER, 0)),
        seed_mode: SeedMode::from_code(root.byte_field(slot::SEED_MODE, 0)),
        wall_clock,
        loras,
        thumbnail: None,
    })
}
