use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use chargen_core::config::{ChargenConfig, DEFAULT_CONFIG_FILE};
use chargen_core::core_api::{CharacterIdentity, Engine, Session};
use chargen_core::fields::BackgroundFieldMode;
use chargen_core::ruleset::{Attribute, Skill};
use chargen_core::tables::ContentTables;
use chargen_render::{
    FillOptions, JsonSheetFiller, JsonStyle, SheetFiller, SheetTemplate, render_advisories,
    render_json, render_sheet,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// TOML config file; defaults apply when it does not exist.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Roll details, resolve the background bonus and emit a character sheet.
    Generate(GenerateArgs),
    /// List the fillable field names of a sheet template.
    Fields(FieldsArgs),
    /// List talents, drives and mannerisms from the content tables.
    Options(OptionsArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum BackgroundFieldArg {
    Full,
    Title,
    Redirected,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long, value_name = "DIR")]
    tables: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    player: Option<String>,
    #[arg(long)]
    pronouns: Option<String>,
    #[arg(long = "attr", value_name = "ATTR=N", value_parser = parse_attribute_assignment)]
    attributes: Vec<(Attribute, i32)>,
    #[arg(
        long = "skill",
        value_name = "SKILL=N",
        value_parser = parse_skill_assignment,
        allow_hyphen_values = true
    )]
    skills: Vec<(Skill, i32)>,
    #[arg(long)]
    talent: Option<String>,
    #[arg(long)]
    drive: Option<String>,
    #[arg(long = "mannerism", value_name = "CATEGORY=OPTION", value_parser = parse_pair)]
    mannerisms: Vec<(String, String)>,
    /// Background bonus skill; the first offered skill is used when omitted.
    #[arg(long)]
    bonus: Option<String>,
    #[arg(long = "background-field")]
    background_field: Option<BackgroundFieldArg>,
    #[arg(long, value_name = "TEMPLATE.json")]
    template: Option<PathBuf>,
    /// Write the filled sheet document here instead of printing the sheet.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    #[arg(long = "no-need-appearances")]
    no_need_appearances: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct FieldsArgs {
    #[arg(long, value_name = "TEMPLATE.json")]
    template: Option<PathBuf>,
    /// Case-insensitive substring filter.
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Debug, Args)]
struct OptionsArgs {
    #[arg(long, value_name = "DIR")]
    tables: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = ChargenConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config {}: {e}", config_path.display());
        process::exit(2);
    });

    match cli.command {
        Command::Generate(args) => run_generate(config, args),
        Command::Fields(args) => run_fields(&config, args),
        Command::Options(args) => run_options(config, args),
    }
}

fn run_generate(mut config: ChargenConfig, args: GenerateArgs) {
    if let Some(tables) = args.tables {
        config.tables_dir = tables;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(mode) = args.background_field {
        config.background_field = to_core_background_field(mode);
    }
    if let Some(template) = args.template {
        config.template = Some(template);
    }
    if args.no_need_appearances {
        config.need_appearances = false;
    }
    tracing::debug!(?config, "generating character");

    let engine = open_engine(&config);
    let mut session = engine.new_session();
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    session.set_identity(CharacterIdentity {
        name: args.name.unwrap_or_default(),
        player: args.player.unwrap_or_default(),
        pronouns: args.pronouns.unwrap_or_default(),
    });
    for (attr, value) in args.attributes {
        session
            .set_attribute(attr, value)
            .unwrap_or_else(|e| usage_error(&e));
    }
    for (skill, value) in args.skills {
        session
            .set_skill(skill, value)
            .unwrap_or_else(|e| usage_error(&e));
    }

    engine.roll_details(&mut session, &mut rng);
    if let Some(bonus) = args.bonus.as_deref() {
        session.select_bonus(bonus).unwrap_or_else(|e| usage_error(&e));
    }

    match args.talent.as_deref() {
        Some(talent) => engine
            .select_talent(&mut session, talent)
            .unwrap_or_else(|e| usage_error(&e)),
        None => engine.reroll_talent(&mut session, &mut rng),
    }
    if let Some(drive) = args.drive.as_deref() {
        engine
            .select_drive(&mut session, drive)
            .unwrap_or_else(|e| usage_error(&e));
    }
    for (category, option) in &args.mannerisms {
        engine
            .select_mannerism(&mut session, category, option)
            .unwrap_or_else(|e| usage_error(&e));
    }

    let generation = engine.generate(&mut session);
    eprint!("{}", render_advisories(&generation.advisories));

    if let Some(out_path) = args.output.as_ref() {
        let template = load_template(config.template.as_deref()).unwrap_or_else(|e| {
            eprintln!("Error filling character sheet: {e}");
            process::exit(1);
        });
        let options = FillOptions {
            need_appearances: config.need_appearances,
        };
        let bytes = JsonSheetFiller
            .fill(&generation.fields, &template, options)
            .unwrap_or_else(|e| {
                eprintln!("Error filling character sheet: {e}");
                process::exit(1);
            });
        fs::write(out_path, bytes).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        println!("Wrote character sheet to {}", out_path.display());
        return;
    }

    if args.json {
        print_json(&render_json(&generation, JsonStyle::CanonicalV1));
        return;
    }

    print!("{}", render_sheet(&generation.fields));
    print_bonus_summary(&session);
}

fn run_fields(config: &ChargenConfig, args: FieldsArgs) {
    let template_path = args.template.or_else(|| config.template.clone());
    let template = load_template(template_path.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error reading template: {e}");
        process::exit(1);
    });

    let names = match args.filter.as_deref() {
        Some(query) => template.filter_fields(query),
        None => template.sorted_field_names(),
    };
    println!(
        "Found {} form fields in '{}'",
        template.sorted_field_names().len(),
        template.name
    );
    for name in names {
        println!("{name}");
    }
}

fn run_options(mut config: ChargenConfig, args: OptionsArgs) {
    if let Some(tables) = args.tables {
        config.tables_dir = tables;
    }
    let engine = open_engine(&config);
    let tables = engine.tables();

    if args.json {
        print_json(&options_json(tables));
        return;
    }

    println!("Talents:");
    for talent in tables.talents() {
        println!("  {}: {}", talent.name, talent.description);
    }
    println!("Drives:");
    for drive in tables.drives() {
        println!("  {}: {}", drive.name, drive.description);
    }
    println!("Mannerisms:");
    for (category, options) in tables.mannerism_options() {
        println!("  {category}: {}", options.join(" | "));
    }
}

fn open_engine(config: &ChargenConfig) -> Engine {
    Engine::from_config(config).unwrap_or_else(|e| {
        eprintln!(
            "Error loading content tables from {}: {e}",
            config.tables_dir.display()
        );
        process::exit(1);
    })
}

fn load_template(path: Option<&Path>) -> Result<SheetTemplate, chargen_render::FillError> {
    match path {
        Some(path) => SheetTemplate::load(path),
        None => Ok(SheetTemplate::standard()),
    }
}

fn print_bonus_summary(session: &Session) {
    let bonus = session.bonus();
    if let (Some(opts), Some(choice)) = (bonus.opts(), bonus.choice()) {
        println!();
        println!(
            "  Background bonus: +1 {choice} (offered: {} or {})",
            opts.first, opts.second
        );
    }
}

fn options_json(tables: &ContentTables) -> serde_json::Value {
    serde_json::json!({
        "talents": tables.talents(),
        "drives": tables.drives(),
        "mannerisms": tables.mannerism_options(),
    })
}

fn print_json(value: &serde_json::Value) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn usage_error(e: &dyn std::fmt::Display) -> ! {
    eprintln!("Error: {e}");
    process::exit(2);
}

fn to_core_background_field(arg: BackgroundFieldArg) -> BackgroundFieldMode {
    match arg {
        BackgroundFieldArg::Full => BackgroundFieldMode::FullText,
        BackgroundFieldArg::Title => BackgroundFieldMode::Title,
        BackgroundFieldArg::Redirected => BackgroundFieldMode::Redirected,
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() {
        return Err(format!("missing name before '=' in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_number(raw: &str, value: &str) -> Result<i32, String> {
    value
        .parse::<i32>()
        .map_err(|_| format!("invalid number {value:?} in {raw:?}"))
}

fn parse_attribute_assignment(raw: &str) -> Result<(Attribute, i32), String> {
    let (name, value) = parse_pair(raw)?;
    let attr = Attribute::from_label(&name).ok_or_else(|| {
        format!("unknown attribute {name:?}; expected one of STR, DEX, CON, WIL, INT, CHA")
    })?;
    Ok((attr, parse_number(raw, &value)?))
}

fn parse_skill_assignment(raw: &str) -> Result<(Skill, i32), String> {
    let (name, value) = parse_pair(raw)?;
    let skill = Skill::from_name(&name).ok_or_else(|| format!("unknown skill {name:?}"))?;
    Ok((skill, parse_number(raw, &value)?))
}
