//! Shared data structures for decoded history records
//!
//! These structs represent the data model that flows between
//! the database layer and whoever is browsing the catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One decoded generation from the history database.
///
/// Records are rebuilt from their blob on every query and discarded once
/// consumed; nothing here is cached or written back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRecord {
    /// Unique row ID, assigned in insertion order by the store
    pub id: i64,
    /// Grouping key tying related generations together
    pub lineage: i64,
    /// Ordering key within a lineage, independent of `id`
    pub logical_time: i64,
    /// Join key into the thumbnail tables
    pub preview_id: i64,
    /// Positive prompt text (empty when absent)
    pub prompt: String,
    /// Negative prompt text (empty when absent)
    pub negative_prompt: String,
    /// Model file the generation ran with (empty when absent)
    pub model: String,
    /// Output width in pixels (stored in units of 64)
    pub width: u32,
    /// Output height in pixels (stored in units of 64)
    pub height: u32,
    /// Sampling step count
    pub steps: u32,
    /// Classifier-free guidance scale
    pub guidance_scale: f32,
    /// Denoising strength for img2img runs
    pub strength: f32,
    /// Resolution-dependent timestep shift (1.0 when absent)
    pub shift: f32,
    /// RNG seed the generation was produced with
    pub seed: u32,
    /// Sampler the generation ran with
    pub sampler: Sampler,
    /// How the seed was turned into initial noise
    pub seed_mode: SeedMode,
    /// When the generation happened; MIN_UTC when never recorded
    pub wall_clock: DateTime<Utc>,
    /// LoRA adapters applied during the generation, in order
    pub loras: Vec<Lora>,
    /// JPEG bytes, populated by a separate thumbnail fetch (never by decode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<u8>>,
}

/// A LoRA adapter reference attached to a generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lora {
    /// Adapter file name
    pub file: String,
    /// Blend weight (0.6 when the record carries none)
    pub weight: f32,
}

/// Sampler identifiers as stored in record blobs.
///
/// The code table is part of the producer's format; codes it has grown since
/// this table was written come back as `Unknown` rather than failing, so a
/// newer database still lists cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sampler {
    DpmPp2mKarras,
    EulerA,
    Ddim,
    Plms,
    DpmPpSdeKarras,
    UniPc,
    Lcm,
    EulerASubstep,
    DpmPpSdeSubstep,
    Tcd,
    Unknown(u8),
}

impl Sampler {
    /// Total over all byte values; unrecognized codes are preserved, not dropped.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Sampler::DpmPp2mKarras,
            1 => Sampler::EulerA,
            2 => Sampler::Ddim,
            3 => Sampler::Plms,
            4 => Sampler::DpmPpSdeKarras,
            5 => Sampler::UniPc,
            6 => Sampler::Lcm,
            7 => Sampler::EulerASubstep,
            8 => Sampler::DpmPpSdeSubstep,
            9 => Sampler::Tcd,
            other => Sampler::Unknown(other),
        }
    }

    /// Human-readable label for display
    pub fn label(&self) -> String {
        match self {
            Sampler::DpmPp2mKarras => "DPM++ 2M Karras".to_string(),
            Sampler::EulerA => "Euler a".to_string(),
            Sampler::Ddim => "DDIM".to_string(),
            Sampler::Plms => "PLMS".to_string(),
            Sampler::DpmPpSdeKarras => "DPM++ SDE Karras".to_string(),
            Sampler::UniPc => "UniPC".to_string(),
            Sampler::Lcm => "LCM".to_string(),
            Sampler::EulerASubstep => "Euler a Substep".to_string(),
            Sampler::DpmPpSdeSubstep => "DPM++ SDE Substep".to_string(),
            Sampler::Tcd => "TCD".to_string(),
            Sampler::Unknown(code) => format!("Unknown({})", code),
        }
    }
}

/// Seed-to-noise strategies as stored in record blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeedMode {
    Legacy,
    TorchCpuCompatible,
    ScaleAlike,
    NvidiaGpuCompatible,
    Unknown(u8),
}

impl SeedMode {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => SeedMode::Legacy,
            1 => SeedMode::TorchCpuCompatible,
            2 => SeedMode::ScaleAlike,
            3 => SeedMode::NvidiaGpuCompatible,
            other => SeedMode::Unknown(other),
        }
    }

    pub fn label(&self) -> String {
        match self {
            SeedMode::Legacy => "Legacy".to_string(),
            SeedMode::TorchCpuCompatible => "Torch CPU Compatible".to_string(),
            SeedMode::ScaleAlike => "Scale Alike".to_string(),
            SeedMode::NvidiaGpuCompatible => "NVIDIA GPU Compatible".to_string(),
            SeedMode::Unknown(code) => format!("Unknown({})", code),
        }
    }
}
