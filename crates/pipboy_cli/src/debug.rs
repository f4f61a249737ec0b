//! `pipboy debug ...`: layout, raw section, validation and diff reports.
//! Each handler returns the process exit code.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use pipboy_core::decode;
use pipboy_core::diagnostics::{self, SectionReport};
use pipboy_core::layout::SectionId;
use serde_json::{Value as JsonValue, json};

use crate::{VariantArgs, print_json};

const DEFAULT_HEX_LIMIT: usize = 256;

#[derive(Debug, Subcommand)]
pub(crate) enum DebugCommand {
    /// Section map with offsets, lengths and confidence.
    Layout(LayoutArgs),
    /// Raw bytes of one section.
    Section(SectionArgs),
    /// Decode and cross-check; exits 1 on errors (or warnings with --strict).
    Validate(ValidateArgs),
    /// Field and section differences between two saves.
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
pub(crate) struct LayoutArgs {
    #[command(flatten)]
    variant: VariantArgs,
    #[arg(long)]
    json: bool,
    #[arg(value_name = "SAVE.DAT")]
    path: PathBuf,
}

#[derive(Debug, Args)]
pub(crate) struct SectionArgs {
    #[command(flatten)]
    variant: VariantArgs,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    hex: bool,
    #[arg(long, default_value_t = DEFAULT_HEX_LIMIT)]
    limit: usize,
    #[arg(long, value_name = "header|tail|handler:N", value_parser = parse_section_id)]
    id: SectionId,
    #[arg(value_name = "SAVE.DAT")]
    path: PathBuf,
}

#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    #[command(flatten)]
    variant: VariantArgs,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    strict: bool,
    #[arg(value_name = "SAVE.DAT")]
    path: PathBuf,
}

#[derive(Debug, Args)]
pub(crate) struct CompareArgs {
    #[command(flatten)]
    variant: VariantArgs,
    #[arg(long)]
    json: bool,
    #[arg(value_name = "SAVE_A.DAT")]
    path_a: PathBuf,
    #[arg(value_name = "SAVE_B.DAT")]
    path_b: PathBuf,
}

pub(crate) fn run(command: DebugCommand) -> Result<i32, String> {
    match command {
        DebugCommand::Layout(args) => layout(args),
        DebugCommand::Section(args) => section(args),
        DebugCommand::Validate(args) => validate(args),
        DebugCommand::Compare(args) => compare(args),
    }
}

fn layout(args: LayoutArgs) -> Result<i32, String> {
    let bytes = read(&args.path)?;
    let report = diagnostics::layout(&bytes, args.variant.hint());

    if args.json {
        print_json(&to_json(&report)?);
        return Ok(0);
    }

    match report.variant {
        Some(variant) => println!("game={variant}"),
        None => println!("game=unknown"),
    }
    println!("file_len={}", report.file_len);
    for section in &report.sections {
        println!("{}", format_section_row(section));
    }
    if let Some(error) = &report.error {
        println!("error={error}");
    }
    Ok(0)
}

fn section(args: SectionArgs) -> Result<i32, String> {
    let bytes = read(&args.path)?;
    let report = diagnostics::layout(&bytes, args.variant.hint());
    let section = report
        .sections
        .iter()
        .find(|s| s.id == args.id)
        .ok_or_else(|| format!("section {} not found in {}", args.id, args.path.display()))?;
    let raw = bytes
        .get(section.offset..section.offset + section.len)
        .ok_or_else(|| format!("section {} lies outside the file", section.id))?;

    if args.json {
        let mut out = json!({
            "id": section.id,
            "name": section.name,
            "offset": section.offset,
            "len": section.len,
            "confidence": section.confidence,
            "summary": section.summary,
        });
        if args.hex {
            out["hex"] = JsonValue::from(hex_dump(raw, section.offset, args.limit));
        }
        print_json(&out);
        return Ok(0);
    }

    println!("section={}", section.id);
    println!("name={}", section.name);
    println!("range={}..{}", section.offset, section.offset + section.len);
    println!("len={}", section.len);
    println!("confidence={:.2}", section.confidence);
    if !section.summary.is_empty() {
        println!("summary={}", section.summary);
    }
    if args.hex {
        print!("{}", hex_dump(raw, section.offset, args.limit));
    }
    Ok(0)
}

fn validate(args: ValidateArgs) -> Result<i32, String> {
    let bytes = read(&args.path)?;
    let report = diagnostics::validate(&bytes, args.variant.hint(), args.strict);

    if args.json {
        print_json(&to_json(&report)?);
    } else {
        println!("status={}", to_json(report.status)?.as_str().unwrap_or("?"));
        println!("confidence={:.2}", report.confidence);
        for error in &report.errors {
            println!("error: {error}");
        }
        for warning in &report.warnings {
            println!("warning: {warning}");
        }
    }
    Ok(report.exit_code())
}

fn compare(args: CompareArgs) -> Result<i32, String> {
    let hint = args.variant.hint();
    let a = decode(&read(&args.path_a)?, hint)
        .map_err(|e| format!("Error parsing {}: {e}", args.path_a.display()))?;
    let b = decode(&read(&args.path_b)?, hint)
        .map_err(|e| format!("Error parsing {}: {e}", args.path_b.display()))?;

    let fields = diagnostics::compare_models(&a, &b);
    let sections = diagnostics::compare_sections(&a, &b);

    if args.json {
        print_json(&json!({
            "fields": to_json(&fields)?,
            "sections": to_json(&sections)?,
        }));
        return Ok(0);
    }

    if fields.is_empty() && sections.is_empty() {
        println!("no differences");
    }
    for diff in &fields {
        println!("{}: {} -> {}", diff.path, diff.a, diff.b);
    }
    for diff in &sections {
        let len = |l: Option<usize>| l.map_or_else(|| "-".to_string(), |l| l.to_string());
        println!(
            "section {} ({}): {} bytes differ, len {} vs {}",
            diff.id,
            diff.name,
            diff.differing_bytes,
            len(diff.a_len),
            len(diff.b_len)
        );
    }
    Ok(0)
}

fn read(path: &Path) -> Result<Vec<u8>, String> {
    fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<JsonValue, String> {
    serde_json::to_value(value).map_err(|e| format!("Error rendering JSON output: {e}"))
}

fn format_section_row(section: &SectionReport) -> String {
    format!(
        "{:<11} {:>8} {:>8} {:.2}  {:<16} {}",
        section.id.to_string(),
        section.offset,
        section.len,
        section.confidence,
        section.name,
        section.summary
    )
}

fn parse_section_id(value: &str) -> Result<SectionId, String> {
    SectionId::parse(value)
        .ok_or_else(|| format!("invalid section id '{value}', expected header, tail or handler:N"))
}

/// Sixteen bytes per line, offsets relative to the file.
fn hex_dump(bytes: &[u8], base: usize, limit: usize) -> String {
    let shown = bytes.len().min(limit);
    let mut out = String::new();
    for (line, chunk) in bytes[..shown].chunks(16).enumerate() {
        let _ = write!(out, "{:08x}:", base + line * 16);
        for byte in chunk {
            let _ = write!(out, " {byte:02x}");
        }
        out.push('\n');
    }
    if bytes.len() > shown {
        let _ = writeln!(out, "... {} more bytes", bytes.len() - shown);
    }
    out
}
