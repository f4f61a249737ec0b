use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, info};
use pipboy_core::items::WellKnownItems;
use pipboy_core::projection::Projection;
use pipboy_core::{Gender, GameVariant, Model, apply_edits, decode, encode, output_name_hint};

mod debug;
mod edits;
mod fields;
mod output;

use edits::{ItemQuantity, PerkAssignment, RemoveItem, TraitAssignment};
use fields::FieldSelection;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(value: GenderArg) -> Self {
        match value {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub(crate) struct VariantArgs {
    #[arg(
        long,
        value_name = "1|2|fo1|fo2|fallout1|fallout2",
        value_parser = parse_variant
    )]
    game: Option<GameVariant>,
    #[arg(
        long,
        visible_alias = "fo1",
        conflicts_with = "game",
        conflicts_with = "fallout2"
    )]
    fallout1: bool,
    #[arg(long, visible_alias = "fo2", conflicts_with = "game")]
    fallout2: bool,
}

impl VariantArgs {
    pub(crate) fn hint(&self) -> Option<GameVariant> {
        if self.game.is_some() {
            self.game
        } else if self.fallout1 {
            Some(GameVariant::Fallout1)
        } else if self.fallout2 {
            Some(GameVariant::Fallout2)
        } else {
            None
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect how a save was parsed.
    Debug {
        #[command(subcommand)]
        command: debug::DebugCommand,
    },
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(value_name = "SAVE.DAT")]
    path: Option<PathBuf>,
    #[arg(long, global = true)]
    verbose: bool,
    #[command(flatten)]
    variant: VariantArgs,

    #[command(flatten)]
    fields: FieldSelection,
    #[arg(long)]
    json: bool,

    #[arg(long = "set-age")]
    set_age: Option<i32>,
    #[arg(long = "set-level")]
    set_level: Option<i32>,
    #[arg(long = "set-xp")]
    set_xp: Option<i32>,
    #[arg(long = "set-skill-points")]
    set_skill_points: Option<i32>,
    #[arg(long = "set-karma", allow_hyphen_values = true)]
    set_karma: Option<i32>,
    #[arg(long = "set-reputation", allow_hyphen_values = true)]
    set_reputation: Option<i32>,
    #[arg(long = "set-gender")]
    set_gender: Option<GenderArg>,
    #[arg(long = "set-hp")]
    set_hp: Option<i32>,
    #[arg(long = "set-strength")]
    set_strength: Option<i32>,
    #[arg(long = "set-perception")]
    set_perception: Option<i32>,
    #[arg(long = "set-endurance")]
    set_endurance: Option<i32>,
    #[arg(long = "set-charisma")]
    set_charisma: Option<i32>,
    #[arg(long = "set-intelligence")]
    set_intelligence: Option<i32>,
    #[arg(long = "set-agility")]
    set_agility: Option<i32>,
    #[arg(long = "set-luck")]
    set_luck: Option<i32>,
    #[arg(long = "set-trait", value_name = "SLOT:INDEX", value_parser = edits::parse_trait_assignment)]
    set_trait: Vec<TraitAssignment>,
    #[arg(long = "clear-trait", value_name = "SLOT")]
    clear_trait: Vec<usize>,
    #[arg(long = "set-perk", value_name = "INDEX:RANK", value_parser = edits::parse_perk_assignment)]
    set_perk: Vec<PerkAssignment>,
    #[arg(long = "clear-perk", value_name = "INDEX")]
    clear_perk: Vec<usize>,
    #[arg(long = "set-item-qty", value_name = "PID:QTY", value_parser = edits::parse_item_quantity)]
    set_item_qty: Vec<ItemQuantity>,
    #[arg(long = "add-item", value_name = "PID:QTY", value_parser = edits::parse_item_quantity)]
    add_item: Vec<ItemQuantity>,
    #[arg(long = "remove-item", value_name = "PID[:QTY]", value_parser = edits::parse_remove_item)]
    remove_item: Vec<RemoveItem>,
    /// Edited projection, as printed by `--json`.
    #[arg(long = "apply-json", value_name = "FILE")]
    apply_json: Option<PathBuf>,

    #[arg(long, conflicts_with = "output_auto")]
    output: Option<PathBuf>,
    /// Write next to the input as `<stem>_edited.<ext>`.
    #[arg(long = "output-auto")]
    output_auto: bool,
    #[arg(long = "force-overwrite")]
    force_overwrite: bool,
    #[arg(long)]
    backup: bool,
}

fn main() {
    let mut cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(Command::Debug { command }) = cli.command.take() {
        let code = debug::run(command).unwrap_or_else(|e| {
            eprintln!("{e}");
            1
        });
        process::exit(code);
    }

    let Some(path) = cli.path.clone() else {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "missing required argument <SAVE.DAT>",
            )
            .exit();
    };

    let flag_ops = edits::collect(&cli);
    let has_edits = !flag_ops.is_empty() || cli.apply_json.is_some();
    let wants_output = cli.output.is_some() || cli.output_auto;
    if has_edits && !wants_output {
        eprintln!("edit flags require --output <PATH> or --output-auto");
        process::exit(2);
    }
    if !has_edits && wants_output {
        eprintln!("--output requires at least one edit flag");
        process::exit(2);
    }

    let bytes = fs::read(&path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });
    let mut model = decode(&bytes, cli.variant.hint()).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", path.display());
        eprintln!("  {e}");
        process::exit(1);
    });
    log::debug!(
        "decoded {} ({} sections)",
        model.variant(),
        model.layout().sections.len()
    );

    let mut wrote = None;
    if has_edits {
        let mut ops = Vec::new();
        if let Some(json_path) = &cli.apply_json {
            ops.extend(plan_from_json(&model, json_path));
        }
        ops.extend(flag_ops);

        apply_edits(&mut model, &ops).unwrap_or_else(|e| {
            eprintln!("Error applying edits: {e}");
            process::exit(1);
        });
        let edited = encode(&model).unwrap_or_else(|e| {
            eprintln!("Error creating modified save bytes: {e}");
            process::exit(1);
        });

        let out_path = match &cli.output {
            Some(out) => out.clone(),
            None => auto_output_path(&path),
        };
        let backup = output::write_atomically(&out_path, &edited, cli.force_overwrite, cli.backup)
            .unwrap_or_else(|e| {
                eprintln!("Error writing {}: {e}", out_path.display());
                process::exit(1);
            });
        if let Some(backup) = backup {
            info!("backed up previous output to {}", backup.display());
        }
        info!("applied {} edits", ops.len());
        wrote = Some(out_path);
    }

    let items = WellKnownItems::new(model.variant());
    if cli.json {
        let json = if cli.fields.is_field_mode() {
            serde_json::Value::Object(cli.fields.selected_json(&model, &items))
        } else {
            serde_json::to_value(Projection::from_model(&model, &items)).unwrap_or_else(|e| {
                eprintln!("Error rendering JSON output: {e}");
                process::exit(1);
            })
        };
        print_json(&json);
        return;
    }

    if cli.fields.is_field_mode() {
        for (key, value) in cli.fields.selected_pairs(&model, &items) {
            println!("{key}={value}");
        }
        return;
    }

    if let Some(out_path) = wrote {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    for (key, value) in FieldSelection::summary().selected_pairs(&model, &items) {
        println!("{key}={value}");
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn plan_from_json(model: &Model, json_path: &Path) -> Vec<pipboy_core::EditOp> {
    let text = fs::read_to_string(json_path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", json_path.display());
        process::exit(1);
    });
    let submitted: Projection = serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing projection {}: {e}", json_path.display());
        process::exit(1);
    });
    let plan = pipboy_core::projection::plan_edits(model, &submitted).unwrap_or_else(|e| {
        eprintln!("Error planning edits from {}: {e}", json_path.display());
        process::exit(1);
    });
    // Ignored read-only changes are already logged by the planner.
    plan.ops
}

fn auto_output_path(input: &Path) -> PathBuf {
    let name = output_name_hint(&input.to_string_lossy());
    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

pub(crate) fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        }
    }
}

fn parse_variant(value: &str) -> Result<GameVariant, String> {
    GameVariant::parse(value).ok_or_else(|| {
        format!("invalid game value '{value}', expected one of: 1, 2, fo1, fo2, fallout1, fallout2")
    })
}
