use serde::Serialize;

use crate::decode::{Capture, RawSave, decode_sections};
use crate::layout::{SectionId, SectionLayout};
use crate::query::read_header;
use crate::tables::TableSet;
use crate::variant::GameVariant;

const UNPARSED: &str = "unparsed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub id: SectionId,
    pub name: String,
    pub offset: usize,
    pub len: usize,
    pub confidence: f32,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    pub variant: Option<GameVariant>,
    pub file_len: usize,
    pub sections: Vec<SectionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LayoutReport {
    pub fn min_confidence(&self) -> f32 {
        self.sections
            .iter()
            .map(|section| section.confidence)
            .fold(1.0, f32::min)
    }
}

/// Section map of `bytes`. When the walk fails part way, the sections read
/// so far are kept and the rest is reported as one unparsed block at zero
/// confidence.
pub fn layout(bytes: &[u8], hint: Option<GameVariant>) -> LayoutReport {
    let variant = match hint {
        Some(variant) => variant,
        None => match read_header(bytes, None) {
            Ok((variant, _)) => variant,
            Err(err) => {
                return LayoutReport {
                    variant: None,
                    file_len: bytes.len(),
                    sections: vec![SectionReport {
                        id: SectionId::Header,
                        name: "header".to_string(),
                        offset: 0,
                        len: bytes.len(),
                        confidence: 0.0,
                        summary: String::new(),
                    }],
                    error: Some(err.to_string()),
                };
            }
        },
    };

    let tables = variant.tables();
    let mut capture = Capture::new(bytes);
    let outcome = decode_sections(bytes, tables, hint.is_none(), &mut capture);

    let mut sections: Vec<SectionReport> = capture
        .sections
        .iter()
        .map(|section| report(tables, section, outcome.as_ref().ok()))
        .collect();

    let error = match outcome {
        Ok(_) => None,
        Err(err) => {
            let end = capture.end();
            if end < bytes.len() {
                sections.push(SectionReport {
                    id: SectionId::Tail,
                    name: UNPARSED.to_string(),
                    offset: end,
                    len: bytes.len() - end,
                    confidence: 0.0,
                    summary: format!("decode stopped: {err}"),
                });
            }
            Some(err.to_string())
        }
    };

    LayoutReport {
        variant: Some(variant),
        file_len: bytes.len(),
        sections,
        error,
    }
}

fn report(tables: &TableSet, section: &SectionLayout, raw: Option<&RawSave>) -> SectionReport {
    SectionReport {
        id: section.id,
        name: tables.section_name(section.id).to_string(),
        offset: section.range.start,
        len: section.range.len(),
        confidence: section.confidence,
        summary: raw.map_or_else(String::new, |raw| summarize(tables, section, raw)),
    }
}

fn summarize(tables: &TableSet, section: &SectionLayout, raw: &RawSave) -> String {
    let sections = &tables.sections;
    let id = section.id;

    if id == SectionId::Header {
        return format!(
            "{:?} on {} ({}), game date {}",
            raw.header.character_name,
            raw.header.map_filename,
            raw.header.map_id,
            raw.header.game_date
        );
    }
    if id == SectionId::Tail {
        return format!("{} opaque bytes", section.range.len());
    }
    if id == sections.player_object {
        let mut summary = format!(
            "pid {:#010x}, {} inventory lines",
            raw.player.pid,
            raw.player.inventory.len()
        );
        if let Some(hp) = raw.player.hit_points() {
            summary.push_str(&format!(", hp {hp}"));
        }
        if !raw.h5_trailer.is_empty() {
            summary.push_str(&format!(", {} trailing bytes", raw.h5_trailer.len()));
        }
        return summary;
    }
    if id == sections.critter_proto {
        let special: Vec<i32> = (0..7).map(|i| raw.proto.base_stats[i]).collect();
        return format!("SPECIAL {special:?}, xp {}", raw.proto.experience);
    }
    if id == sections.kill_counts {
        let total: i64 = raw.kill_counts.iter().map(|&c| i64::from(c)).sum();
        return format!("{} kill types, {total} kills", raw.kill_counts.len());
    }
    if id == sections.tagged_skills {
        return format!("tags {:?}", raw.tagged_skills);
    }
    if id == sections.perks {
        let taken = raw.perks.iter().filter(|&&rank| rank > 0).count();
        let mut summary = format!("{taken} perks taken");
        if let Some(party) = raw.party_member_count {
            summary.push_str(&format!(", {party} party records"));
        }
        return summary;
    }
    if id == sections.pc_stats {
        return format!(
            "level {}, xp {}, karma {}",
            raw.pc_stats.level, raw.pc_stats.experience, raw.pc_stats.karma
        );
    }
    if id == sections.traits {
        return match raw.traits {
            Some(traits) => format!("traits {traits:?}"),
            None => String::new(),
        };
    }
    if Some(id) == sections.preferences {
        return match raw.game_difficulty {
            Some(difficulty) => format!("game difficulty {difficulty}"),
            None => String::new(),
        };
    }

    match id {
        SectionId::Handler(1) => format!("combat id {}", raw.player_combat_id),
        SectionId::Handler(2) => format!("{} globals", raw.global_var_count),
        SectionId::Handler(3) => format!("{} maps", raw.map_files.len()),
        SectionId::Handler(11) => {
            if raw.combat.in_combat() {
                "in combat".to_string()
            } else {
                "not in combat".to_string()
            }
        }
        SectionId::Handler(12) => raw
            .ai_packet_count
            .map_or_else(String::new, |count| format!("{count} ai packets")),
        _ => String::new(),
    }
}
