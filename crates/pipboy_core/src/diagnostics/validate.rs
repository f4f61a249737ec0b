use log::debug;
use serde::Serialize;

use crate::decode::decode;
use crate::derive::formula_references;
use crate::model::Model;
use crate::query::read_header;
use crate::tables::{SPECIAL_COUNT, STAT_MAX_HP};
use crate::variant::GameVariant;

const LEVEL_RANGE: std::ops::RangeInclusive<i32> = 1..=99;
const SPECIAL_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub variant: Option<GameVariant>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub confidence: f32,
    pub strict: bool,
    pub status: Status,
}

impl ValidationReport {
    fn new(variant: Option<GameVariant>, strict: bool) -> Self {
        Self {
            variant,
            errors: Vec::new(),
            warnings: Vec::new(),
            confidence: 1.0,
            strict,
            status: Status::Ok,
        }
    }

    fn finish(mut self) -> Self {
        self.status = if !self.errors.is_empty() {
            Status::Error
        } else if !self.warnings.is_empty() {
            Status::Warning
        } else {
            Status::Ok
        };
        self
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Process exit status: strict mode fails on warnings too.
    pub fn exit_code(&self) -> i32 {
        if !self.errors.is_empty() || (self.strict && !self.warnings.is_empty()) {
            1
        } else {
            0
        }
    }
}

/// Decodes `bytes` and cross-checks the result. A decode failure becomes an
/// error entry, never an `Err`.
pub fn validate(bytes: &[u8], hint: Option<GameVariant>, strict: bool) -> ValidationReport {
    match decode(bytes, hint) {
        Ok(model) => validate_model(&model, strict),
        Err(err) => {
            debug!("validate: decode failed: {err}");
            let variant = hint.or_else(|| read_header(bytes, None).ok().map(|(v, _)| v));
            let mut report = ValidationReport::new(variant, strict);
            report.confidence = 0.0;
            report.errors.push(format!("decode failed: {err}"));
            report.finish()
        }
    }
}

pub fn validate_model(model: &Model, strict: bool) -> ValidationReport {
    let mut report = ValidationReport::new(Some(model.variant()), strict);
    let layout = model.layout();
    report.confidence = layout.min_confidence();

    if let Err(err) = layout.validate() {
        report.errors.push(format!("layout: {err}"));
    }
    for section in &layout.sections {
        if section.confidence < 1.0 {
            report.warnings.push(format!(
                "section {} located heuristically (confidence {:.2})",
                section.id, section.confidence
            ));
        }
    }

    let level = model.level();
    if !LEVEL_RANGE.contains(&level) {
        report.errors.push(format!("level {level} outside 1..=99"));
    }
    let xp = model.experience();
    if xp < 0 {
        report.errors.push(format!("negative experience {xp}"));
    }

    report
        .warnings
        .extend(model.warnings().iter().map(ToString::to_string));

    check_special(model, &mut report);
    check_progress(model, &mut report);

    let max_hp = model.proto().total_stat(STAT_MAX_HP);
    if let Some(hp) = model.hit_points()
        && hp > max_hp
    {
        report.warnings.push(format!("hit points {hp} exceed maximum {max_hp}"));
    }

    report.finish()
}

fn check_special(model: &Model, report: &mut ValidationReport) {
    let mut totals = [0; SPECIAL_COUNT];
    for attribute in model.special() {
        if !SPECIAL_RANGE.contains(&attribute.base) {
            report.warnings.push(format!(
                "{} base {} outside 1..=10",
                attribute.name, attribute.base
            ));
        }
        if let Some(slot) = totals.get_mut(attribute.index) {
            *slot = attribute.total;
        }
    }

    let proto = model.proto();
    let tables = model.tables();
    for reference in formula_references(&totals) {
        let stored = proto.base_stats[reference.stat];
        if i64::from(stored) != reference.expected {
            report.warnings.push(format!(
                "{} base {stored} differs from formula value {}",
                tables.stat_name(reference.stat).unwrap_or("stat"),
                reference.expected
            ));
        }
    }
}

fn check_progress(model: &Model, report: &mut ValidationReport) {
    let level = model.level();
    let xp = model.experience();
    if LEVEL_RANGE.contains(&level) {
        let threshold = i64::from(level) * i64::from(level - 1) / 2 * 1000;
        if i64::from(xp) < threshold {
            report.warnings.push(format!(
                "experience {xp} below the level {level} threshold {threshold}"
            ));
        }
    }

    let proto_xp = model.proto().experience;
    if proto_xp != xp {
        report.warnings.push(format!(
            "proto experience {proto_xp} differs from player experience {xp}"
        ));
    }
}
