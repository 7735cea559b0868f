use std::fmt::Write as _;

use chargen_core::core_api::{Advisory, Generation};
use chargen_core::fields::{
    FIELD_BACKGROUND, FIELD_BACKGROUND_BONUS, FIELD_BACKGROUND_TITLE, FIELD_CHARACTER_NAME,
    FIELD_DRIVE, FIELD_DRIVE_DESCRIPTION, FIELD_EARNED_PLACE, FIELD_LIFE_EVENT,
    FIELD_NERVOUS_TIC, FIELD_PLAYER_NAME, FIELD_PRONOUNS, FIELD_STARTING_COINS, FIELD_TALENT,
    FIELD_TALENT_DESCRIPTION, FieldMap,
};
use chargen_core::mannerism::Mood;
use chargen_core::ruleset::{Attribute, Skill};
use serde_json::{Map as JsonMap, Value as JsonValue};

pub mod sheet;

pub use sheet::{FillError, FillOptions, JsonSheetFiller, SheetFiller, SheetTemplate};

const SHEET_WIDTH: usize = 72;
const LABEL_WIDTH: usize = 20;
const SKILL_COL_WIDTH: usize = 34;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    pub show_empty: bool,
}

pub fn render_json(generation: &Generation, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(canonical_json(generation)),
    }
}

pub fn render_sheet(fields: &FieldMap) -> String {
    render_sheet_with_options(fields, TextRenderOptions::default())
}

pub fn render_sheet_with_options(fields: &FieldMap, options: TextRenderOptions) -> String {
    let mut out = String::new();
    let get = |key: &str| fields.get(key).unwrap_or("");

    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing("ACROSS A THOUSAND DEAD WORLDS", SHEET_WIDTH)
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing("CREW MANIFEST", SHEET_WIDTH)
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    for key in [FIELD_CHARACTER_NAME, FIELD_PLAYER_NAME, FIELD_PRONOUNS] {
        write_labeled(&mut out, key, get(key), options);
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    write_section_header(&mut out, "Attributes");
    let attrs: Vec<String> = Attribute::ALL
        .iter()
        .map(|attr| format!("{}: {:>2}", attr.label(), get(attr.label())))
        .collect();
    writeln!(&mut out, "  {}", attrs.join("   ")).expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    write_section_header(&mut out, "Skills");
    let half = Skill::ALL.len().div_ceil(2);
    for row in 0..half {
        let left = skill_cell(fields, Skill::ALL[row]);
        let line = match Skill::ALL.get(row + half) {
            Some(&right) => format!(
                "  {}{}",
                pad_column(&left, SKILL_COL_WIDTH),
                skill_cell(fields, right)
            ),
            None => format!("  {left}"),
        };
        writeln!(&mut out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    write_section_header(&mut out, "Talent & Drive");
    for key in [
        FIELD_TALENT,
        FIELD_TALENT_DESCRIPTION,
        FIELD_DRIVE,
        FIELD_DRIVE_DESCRIPTION,
    ] {
        write_labeled(&mut out, key, get(key), options);
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    write_section_header(&mut out, "Mannerisms");
    for mood in Mood::ALL {
        write_labeled(&mut out, mood.as_str(), get(mood.field_name()), options);
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    write_section_header(&mut out, "Background");
    for key in [
        FIELD_BACKGROUND_TITLE,
        FIELD_BACKGROUND,
        FIELD_BACKGROUND_BONUS,
        FIELD_LIFE_EVENT,
        FIELD_EARNED_PLACE,
        FIELD_NERVOUS_TIC,
        FIELD_STARTING_COINS,
    ] {
        write_labeled(&mut out, key, get(key), options);
    }

    out
}

pub fn render_advisories(advisories: &[Advisory]) -> String {
    let mut out = String::new();
    for advisory in advisories {
        writeln!(&mut out, "warning: {advisory}").expect("writing to String cannot fail");
    }
    out
}

fn canonical_json(generation: &Generation) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert(
        "fields".to_string(),
        JsonValue::Object(fields_to_json(&generation.fields)),
    );
    out.insert(
        "advisories".to_string(),
        JsonValue::Array(
            generation
                .advisories
                .iter()
                .map(|a| serde_json::to_value(a).unwrap_or(JsonValue::Null))
                .collect(),
        ),
    );
    out
}

fn fields_to_json(fields: &FieldMap) -> JsonMap<String, JsonValue> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), JsonValue::String(v.to_string())))
        .collect()
}

fn skill_cell(fields: &FieldMap, skill: Skill) -> String {
    format!(
        "{:>20}: {}",
        skill.name(),
        fields.get(skill.name()).unwrap_or("")
    )
}

fn write_section_header(out: &mut String, title: &str) {
    writeln!(out, " ::: {title} :::").expect("writing to String cannot fail");
}

fn write_labeled(out: &mut String, label: &str, value: &str, options: TextRenderOptions) {
    if value.is_empty() && !options.show_empty {
        return;
    }
    let value = fit_column(value, SHEET_WIDTH - LABEL_WIDTH - 4);
    writeln!(out, "  {:>width$}: {value}", label, width = LABEL_WIDTH)
        .expect("writing to String cannot fail");
}

fn pad_column(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return format!("{value} ");
    }
    format!("{value}{}", " ".repeat(width - len))
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}
