//! Synthetic record blobs for tests
//!
//! Builds the same table/vtable layout the producing application writes:
//! a 4-byte root offset, a vtable sized to the highest present slot, the
//! table itself, then string/vector payloads reached through 4-byte
//! relative offsets. Fields left out of a build are genuinely absent
//! (zero vtable entry or a vtable too short to hold the slot).

#![allow(dead_code)]

/// Root-table field slots, mirroring the producer's schema.
pub mod slot {
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

/// A field value to place in the root table
pub enum Val {
    U16(u16),
    U32(u32),
    F32(f32),
    I64(i64),
    Byte(u8),
    Str(String),
    /// LoRA vector: (file, weight); None = weight field absent
    Loras(Vec<(String, Option<f32>)>),
    /// A vector payload that declares a count but carries no entries
    BareVecCount(u32),
}

fn inline_size(val: &Val) -> usize {
    match val {
        Val::U16(_) => 2,
        Val::Byte(_) => 1,
        Val::I64(_) => 8,
        // scalars of 4 bytes and all reference fields
        _ => 4,
    }
}

fn put_u16(buf: &mut [u8], pos: usize, v: u16) {
    buf[pos..pos + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], pos: usize, v: u32) {
    buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
}

fn put_i32(buf: &mut [u8], pos: usize, v: i32) {
    buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
}

fn append_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Append one LoRA element chunk (vtable then table then string payload) and
/// return the absolute position of its table.
fn append_lora_chunk(buf: &mut Vec<u8>, file: &str, weight: Option<f32>) -> usize {
    let chunk = buf.len();
    let table = chunk + 8;
    match weight {
        Some(w) => {
            // vtable: size 8, table size 12, file at +4, weight at +8
            buf.extend_from_slice(&8u16.to_le_bytes());
            buf.extend_from_slice(&12u16.to_le_bytes());
            buf.extend_from_slice(&4u16.to_le_bytes());
            buf.extend_from_slice(&8u16.to_le_bytes());
            buf.extend_from_slice(&8i32.to_le_bytes()); // soffset back to the vtable
            buf.extend_from_slice(&8u32.to_le_bytes()); // file string right after the table
            buf.extend_from_slice(&w.to_le_bytes());
        }
        None => {
            // weight slot present in the vtable but zeroed = absent
            buf.extend_from_slice(&8u16.to_le_bytes());
            buf.extend_from_slice(&8u16.to_le_bytes());
            buf.extend_from_slice(&4u16.to_le_bytes());
            buf.extend_from_slice(&0u16.to_le_bytes());
            buf.extend_from_slice(&8i32.to_le_bytes());
            buf.extend_from_slice(&4u32.to_le_bytes());
        }
    }
    append_str(buf, file);
    table
}

fn append_lora_vector(buf: &mut Vec<u8>, entries: &[(String, Option<f32>)]) {
    let base = buf.len();
    buf.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    // reserve the relative-offset array, fill it as chunks land
    buf.resize(base + 4 + 4 * entries.len(), 0);
    for (i, (file, weight)) in entries.iter().enumerate() {
        let entry_pos = base + 4 + 4 * i;
        let table_pos = append_lora_chunk(buf, file, *weight);
        let rel = (table_pos - entry_pos) as u32;
        put_u32(buf, entry_pos, rel);
    }
}

/// Build a complete record blob from `(slot, value)` pairs.
///
/// The vtable is sized to the highest slot present, so leaving high slots
/// out reproduces a blob written by an older producer schema.
pub fn build_record(fields: &[(u16, Val)]) -> Vec<u8> {
    let vtable_len: u16 = fields
        .iter()
        .map(|(slot, _)| slot + 2)
        .max()
        .unwrap_or(4)
        .max(4);
    let vtable_pos = 4usize;
    let table_pos = vtable_pos + vtable_len as usize;

    let mut offsets: Vec<u16> = Vec::with_capacity(fields.len());
    let mut inline = 4usize; // the table's soffset comes first
    for (_, val) in fields {
        offsets.push(inline as u16);
        inline += inline_size(val);
    }
    let table_size = inline;

    let mut buf = vec![0u8; table_pos + table_size];
    put_u32(&mut buf, 0, table_pos as u32);
    put_u16(&mut buf, vtable_pos, vtable_len);
    put_u16(&mut buf, vtable_pos + 2, table_size as u16);
    for ((slot, _), off) in fields.iter().zip(&offsets) {
        put_u16(&mut buf, vtable_pos + *slot as usize, *off);
    }
    put_i32(&mut buf, table_pos, (table_pos - vtable_pos) as i32);

    for ((_, val), off) in fields.iter().zip(&offsets) {
        let field_pos = table_pos + *off as usize;
        match val {
            Val::U16(x) => put_u16(&mut buf, field_pos, *x),
            Val::U32(x) => put_u32(&mut buf, field_pos, *x),
            Val::Byte(x) => buf[field_pos] = *x,
            Val::I64(x) => buf[field_pos..field_pos + 8].copy_from_slice(&x.to_le_bytes()),
            Val::F32(x) => buf[field_pos..field_pos + 4].copy_from_slice(&x.to_le_bytes()),
            Val::Str(s) => {
                let rel = (buf.len() - field_pos) as u32;
                put_u32(&mut buf, field_pos, rel);
                append_str(&mut buf, s);
            }
            Val::BareVecCount(n) => {
                let rel = (buf.len() - field_pos) as u32;
                put_u32(&mut buf, field_pos, rel);
                buf.extend_from_slice(&n.to_le_bytes());
            }
            Val::Loras(entries) => {
                let rel = (buf.len() - field_pos) as u32;
                put_u32(&mut buf, field_pos, rel);
                append_lora_vector(&mut buf, entries);
            }
        }
    }
    buf
}

/// A fully populated record blob with distinguishable values per field.
pub fn full_record_blob() -> Vec<u8> {
    build_record(&[
        (slot::START_WIDTH, Val::U16(8)),
        (slot::START_HEIGHT, Val::U16(12)),
        (slot::SEED, Val::U32(0xDEAD_BEEF)),
        (slot::STEPS, Val::U32(30)),
        (slot::GUIDANCE_SCALE, Val::F32(7.5)),
        (slot::STRENGTH, Val::F32(0.85)),
        (slot::MODEL, Val::Str("sd_v1.5_f16.ckpt".to_string())),
        (slot::WALL_CLOCK, Val::I64(1_700_000_000)),
        (slot::SAMPLER, Val::Byte(4)),
        (slot::SEED_MODE, Val::Byte(2)),
        (
            slot::LORAS,
            Val::Loras(vec![
                ("add_detail.safetensors".to_string(), Some(0.75)),
                ("flat_color.safetensors".to_string(), None),
            ]),
        ),
        (slot::PREVIEW_ID, Val::I64(4242)),
        (slot::SHIFT, Val::F32(3.16)),
        (slot::TEXT_PROMPT, Val::Str("a lighthouse at dusk".to_string())),
        (
            slot::NEGATIVE_TEXT_PROMPT,
            Val::Str("blurry, watermark".to_string()),
        ),
    ])
}
