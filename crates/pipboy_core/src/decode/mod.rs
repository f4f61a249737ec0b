mod fallout1;
mod fallout2;

use log::debug;

use crate::error::FormatError;
use crate::layout::{ByteRange, FileLayout, SectionId, SectionLayout};
use crate::model::Model;
use crate::object::GameObject;
use crate::reader::BigEndianReader;
use crate::sections::{CombatState, CritterProto, PcStats, SaveHeader};
use crate::tables::{TAGGED_SKILL_COUNT, TRAIT_SLOT_COUNT, TableSet};
use crate::variant::GameVariant;

/// Signature through thumbnail padding.
pub const HEADER_LEN: usize = 30_051;

/// Section ranges and their original bytes, in file order.
pub(crate) struct Capture<'a> {
    source: &'a [u8],
    pub(crate) sections: Vec<SectionLayout>,
    pub(crate) blobs: Vec<Vec<u8>>,
}

impl<'a> Capture<'a> {
    pub(crate) fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            sections: Vec::new(),
            blobs: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, id: SectionId, start: usize, end: usize, confidence: f32) {
        self.sections.push(SectionLayout {
            id,
            range: ByteRange { start, end },
            confidence,
        });
        self.blobs.push(self.source[start..end].to_vec());
    }

    pub(crate) fn lower_confidence(&mut self, id: SectionId, confidence: f32) {
        if let Some(section) = self.sections.iter_mut().find(|s| s.id == id) {
            section.confidence = section.confidence.min(confidence);
        }
    }

    pub(crate) fn mark(&self) -> usize {
        self.sections.len()
    }

    pub(crate) fn truncate(&mut self, mark: usize) {
        self.sections.truncate(mark);
        self.blobs.truncate(mark);
    }

    pub(crate) fn end(&self) -> usize {
        self.sections.last().map_or(0, |s| s.range.end)
    }
}

/// Everything the section walkers recover, before the derived view exists.
#[derive(Debug)]
pub(crate) struct RawSave {
    pub header: SaveHeader,
    pub player_combat_id: i32,
    pub global_var_count: usize,
    pub map_files: Vec<String>,
    pub automap_size: i32,
    pub player: GameObject,
    pub center_tile: i32,
    /// Bytes between the player object and the critter proto that no known
    /// record accounts for (Fallout 2 only).
    pub h5_trailer: Vec<u8>,
    pub proto: CritterProto,
    pub kill_counts: Vec<i32>,
    pub tagged_skills: [i32; TAGGED_SKILL_COUNT],
    pub perks: Vec<i32>,
    pub combat: CombatState,
    pub pc_stats: PcStats,
    pub traits: Option<[i32; TRAIT_SLOT_COUNT]>,
    pub party_member_count: Option<usize>,
    pub ai_packet_count: Option<usize>,
    pub game_difficulty: Option<i32>,
    pub tail_confidence: f32,
}

/// Reads one section, records its range, and tags read failures with the
/// section id.
pub(crate) fn section<'a, T>(
    r: &mut BigEndianReader<'a>,
    capture: &mut Capture<'_>,
    id: SectionId,
    confidence: f32,
    parse: impl FnOnce(&mut BigEndianReader<'a>) -> Result<T, FormatError>,
) -> Result<T, FormatError> {
    let start = r.position();
    let value = parse(r).map_err(|e| e.in_section(id))?;
    capture.record(id, start, r.position(), confidence);
    Ok(value)
}

/// Decodes a whole save. Without a hint Fallout 1 is tried first, then
/// Fallout 2; with a hint only the header length is enforced before the
/// section walk.
pub fn decode(bytes: &[u8], hint: Option<GameVariant>) -> Result<Model, FormatError> {
    detect(bytes, hint, |variant, check_header| {
        decode_as(bytes, variant, check_header)
    })
}

/// Section values without the derived view, for single-field queries.
pub(crate) fn decode_raw(
    bytes: &[u8],
    hint: Option<GameVariant>,
) -> Result<(&'static TableSet, RawSave), FormatError> {
    detect(bytes, hint, |variant, check_header| {
        let tables = variant.tables();
        let mut capture = Capture::new(bytes);
        let raw = decode_sections(bytes, tables, check_header, &mut capture)?;
        Ok((tables, raw))
    })
}

/// Runs `attempt` for the hinted variant, or for each variant in detection
/// order until one succeeds.
pub(crate) fn detect<T>(
    bytes: &[u8],
    hint: Option<GameVariant>,
    mut attempt: impl FnMut(GameVariant, bool) -> Result<T, FormatError>,
) -> Result<T, FormatError> {
    if bytes.len() < HEADER_LEN {
        return Err(FormatError::TooShort {
            required: HEADER_LEN,
            actual: bytes.len(),
        });
    }

    if let Some(variant) = hint {
        return attempt(variant, false);
    }

    let fallout1 = match attempt(GameVariant::Fallout1, true) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    debug!("not a Fallout 1 save: {fallout1}");
    let fallout2 = match attempt(GameVariant::Fallout2, true) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    debug!("not a Fallout 2 save: {fallout2}");

    if fallout1 == fallout2 {
        return Err(fallout1);
    }
    Err(FormatError::Undetected {
        fallout1: Box::new(fallout1),
        fallout2: Box::new(fallout2),
    })
}

fn decode_as(bytes: &[u8], variant: GameVariant, check_header: bool) -> Result<Model, FormatError> {
    let tables = variant.tables();
    let mut capture = Capture::new(bytes);
    let raw = decode_sections(bytes, tables, check_header, &mut capture)?;

    let layout = FileLayout {
        file_len: bytes.len(),
        sections: capture.sections,
    };
    layout
        .validate()
        .map_err(|e| FormatError::section(SectionId::Tail, e.to_string()))?;

    Ok(Model::from_decoded(tables, raw, layout, capture.blobs))
}

/// Walks every section of one variant, including the trailing opaque tail.
/// On failure `capture` holds the sections read so far.
pub(crate) fn decode_sections(
    bytes: &[u8],
    tables: &'static TableSet,
    check_header: bool,
    capture: &mut Capture<'_>,
) -> Result<RawSave, FormatError> {
    let mut r = BigEndianReader::new(bytes);
    let expected = check_header.then_some(tables);
    let header = section(&mut r, capture, SectionId::Header, 1.0, |r| {
        SaveHeader::parse(r, expected)
    })?;

    let raw = match tables.variant {
        GameVariant::Fallout1 => fallout1::decode_handlers(&mut r, capture, header)?,
        GameVariant::Fallout2 => fallout2::decode_handlers(&mut r, capture, header)?,
    };

    capture.record(SectionId::Tail, r.position(), bytes.len(), raw.tail_confidence);
    Ok(raw)
}
