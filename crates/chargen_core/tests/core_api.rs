use std::path::PathBuf;

use chargen_core::background::BonusOptions;
use chargen_core::config::ChargenConfig;
use chargen_core::core_api::{Advisory, CharacterIdentity, CoreErrorCode, Engine};
use chargen_core::fields::{BackgroundFieldMode, canonical_field_names};
use chargen_core::roller::DetailKind;
use chargen_core::ruleset::{Attribute, Skill};
use chargen_core::tables::{ContentTables, Row, Table, TableKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_dir(name: &str) -> PathBuf {
    workspace_root().join("tests/fixtures").join(name)
}

fn background_tables(texts: &[&str]) -> ContentTables {
    let rows = texts
        .iter()
        .map(|text| {
            let mut row = Row::new();
            row.insert("background".to_string(), text.to_string());
            row
        })
        .collect();
    let mut tables = ContentTables::empty();
    tables
        .insert(TableKind::Backgrounds, Table::new(rows))
        .expect("backgrounds should validate");
    tables
}

#[test]
fn loads_full_fixture_tables_without_advisories() {
    let tables = ContentTables::load_dir(&fixture_dir("tables")).expect("fixture tables load");
    assert!(tables.advisories().is_empty());
    assert_eq!(tables.table(TableKind::Backgrounds).map(Table::len), Some(4));
    assert_eq!(tables.talents().len(), 3);
    assert_eq!(tables.drives().len(), 2);

    let coins: Vec<&str> = tables
        .table(TableKind::StartingCoins)
        .expect("coins table")
        .column_values("coins")
        .collect();
    assert_eq!(coins, vec!["40", "60", "80"]);
}

#[test]
fn malformed_background_clause_fails_loudly_at_load() {
    let err = ContentTables::load_dir(&fixture_dir("bad_tables"))
        .expect_err("malformed clause must fail the load");
    assert_eq!(err.code, CoreErrorCode::InvalidContent);
}

#[test]
fn end_to_end_default_bonus_goes_to_first_option() {
    let engine = Engine::new(background_tables(&["Choose: +1 Pilot or +1 Stealth."]));
    let mut session = engine.new_session();
    for attr in Attribute::ALL {
        session.set_attribute(attr, 3).expect("3 is in range");
    }
    session
        .set_skill(Skill::ArsaidhTechnology, -5)
        .expect("-5 is the floor");

    let budget = engine.budget(&session);
    assert_eq!(budget.attribute_total, 18);
    assert_eq!(budget.skill_total, 0);
    assert!(!budget.attributes_over());
    assert!(!budget.skills_over());

    let mut rng = ChaCha8Rng::seed_from_u64(11);
    engine.roll_details(&mut session, &mut rng);
    assert_eq!(
        session.bonus().opts(),
        Some(&BonusOptions::new("Pilot", "Stealth"))
    );

    let generation = engine.generate(&mut session);
    assert_eq!(session.bonus().choice(), Some("Pilot"));
    assert!(session.bonus().applied());
    assert_eq!(generation.fields.get("Pilot"), Some("1"));
    assert_eq!(generation.fields.get("Stealth"), Some("0"));
    assert_eq!(generation.fields.get("Àrsaidh Technology"), Some("-5"));
    assert_eq!(generation.fields.get("Background Bonus"), Some("+1 Pilot"));
    assert!(
        !generation
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::AttributesOverBudget { .. } | Advisory::SkillsOverBudget { .. }))
    );
}

#[test]
fn repeated_generation_does_not_double_apply_bonus() {
    let engine = Engine::new(background_tables(&["Choose: +1 Pilot or +1 Stealth."]));
    let mut session = engine.new_session();
    session.set_skill(Skill::Stealth, 4).expect("in range");
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    engine.roll_details(&mut session, &mut rng);
    session.select_bonus("Stealth").expect("Stealth is offered");

    let first = engine.generate(&mut session);
    let second = engine.generate(&mut session);
    assert_eq!(first.fields.get("Stealth"), Some("5"));
    assert_eq!(first, second);
    assert_eq!(session.displayed_skill(Skill::Stealth), 5);
    assert_eq!(session.skills().get(Skill::Stealth), 4);
}

#[test]
fn rerolling_background_resets_applied_choice() {
    let engine = Engine::new(background_tables(&["Choose: +1 Medicine or +1 Science."]));
    let mut session = engine.new_session();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    engine.roll_details(&mut session, &mut rng);
    session.select_bonus("Science").expect("Science is offered");
    assert!(session.bonus().applied());

    engine.roll_details(&mut session, &mut rng);
    assert_eq!(
        session.bonus().opts(),
        Some(&BonusOptions::new("Medicine", "Science"))
    );
    assert_eq!(session.bonus().choice(), None);
    assert!(!session.bonus().applied());
}

#[test]
fn bonus_naming_no_skill_is_ignored_quietly() {
    let engine = Engine::new(background_tables(&["Choose: +1 Piloting or +1 Sneaking."]));
    let mut session = engine.new_session();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    engine.roll_details(&mut session, &mut rng);

    let generation = engine.generate(&mut session);
    assert_eq!(session.bonus().choice(), Some("Piloting"));
    for skill in Skill::ALL {
        assert_eq!(
            generation.fields.get(skill.name()),
            Some(session.skills().get(skill).to_string().as_str())
        );
    }
}

#[test]
fn background_without_clause_offers_no_bonus() {
    let engine = Engine::new(background_tables(&["Drifter - Belongs nowhere."]));
    let mut session = engine.new_session();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    engine.roll_details(&mut session, &mut rng);
    assert!(session.bonus().opts().is_none());
    assert!(session.select_bonus("Pilot").is_err());

    let generation = engine.generate(&mut session);
    assert_eq!(session.bonus().choice(), None);
    assert_eq!(generation.fields.get("Background Bonus"), Some(""));
    assert_eq!(generation.fields.get("Background Title"), Some("Drifter"));
}

#[test]
fn no_content_tables_gives_blank_details_and_no_crash() {
    let missing = std::env::temp_dir().join(format!(
        "atdw_chargen_absent_tables_{}",
        std::process::id()
    ));
    let engine = Engine::new(ContentTables::load_dir(&missing).expect("absent tables degrade"));
    let mut session = engine.new_session();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    engine.roll_details(&mut session, &mut rng);
    engine.reroll_talent(&mut session, &mut rng);

    for kind in DetailKind::ALL {
        assert_eq!(session.details().value(kind), "");
    }

    let generation = engine.generate(&mut session);
    for field in [
        "Background",
        "Background Title",
        "Life Event",
        "Earned Place",
        "Nervous Tic",
        "Starting Coins",
        "Talent",
        "Drive",
    ] {
        assert_eq!(generation.fields.get(field), Some(""), "{field} should be blank");
    }
    let missing_tables = generation
        .advisories
        .iter()
        .filter(|a| matches!(a, Advisory::MissingTable { .. }))
        .count();
    assert_eq!(missing_tables, TableKind::ALL.len());
}

#[test]
fn over_budget_is_advisory_and_still_generates() {
    let engine = Engine::new(ContentTables::empty());
    let mut session = engine.new_session();
    for attr in Attribute::ALL {
        session.set_attribute(attr, 18).expect("18 is in range");
    }
    for skill in Skill::ALL {
        session.set_skill(skill, 10).expect("10 is in range");
    }

    let generation = engine.generate(&mut session);
    assert!(generation.advisories.contains(&Advisory::AttributesOverBudget {
        total: 108,
        budget: 18,
    }));
    assert!(generation.advisories.contains(&Advisory::SkillsOverBudget {
        total: 125,
        budget: 70,
    }));
    assert_eq!(generation.fields.get("STR"), Some("18"));
    assert_eq!(generation.fields.get("Àrsaidh Technology"), Some("10"));
}

#[test]
fn selections_flow_into_fields() {
    let tables = ContentTables::load_dir(&fixture_dir("tables")).expect("fixture tables load");
    let engine = Engine::new(tables).with_background_field(BackgroundFieldMode::Redirected);
    let mut session = engine.new_session();
    session.set_identity(CharacterIdentity {
        name: "Ilse Varga".to_string(),
        player: "Sam".to_string(),
        pronouns: "they/them".to_string(),
    });
    engine
        .select_talent(&mut session, "Steady Hands")
        .expect("talent exists");
    engine.select_drive(&mut session, "Discovery").expect("drive exists");
    engine
        .select_mannerism(&mut session, "When Shy", "Avoids eye contact")
        .expect("mannerism exists");
    engine
        .select_mannerism(&mut session, "When Terrified", "Goes very still")
        .expect("mannerism exists");

    assert_eq!(
        engine
            .select_talent(&mut session, "Telepathy")
            .expect_err("unknown talent")
            .code,
        CoreErrorCode::UnknownOption
    );
    assert!(
        engine
            .select_mannerism(&mut session, "When Shy", "Sings loudly")
            .is_err()
    );

    let mut rng = ChaCha8Rng::seed_from_u64(99);
    engine.roll_details(&mut session, &mut rng);
    let generation = engine.generate(&mut session);
    let fields = &generation.fields;

    assert_eq!(fields.keys().collect::<Vec<_>>(), canonical_field_names());
    assert_eq!(fields.get("Character Name"), Some("Ilse Varga"));
    assert_eq!(fields.get("Pronouns"), Some("they/them"));
    assert_eq!(fields.get("Talent"), Some("Steady Hands"));
    assert_eq!(
        fields.get("Drive Description"),
        Some("Find what the Àrsaidh left behind.")
    );
    assert_eq!(fields.get("Mannerism Shy"), Some("Avoids eye contact"));
    assert_eq!(fields.get("Mannerism Happy"), Some(""));
    assert_eq!(fields.get("Background"), Some(""));
    assert!(!fields.get("Background Title").unwrap_or("").is_empty());
    assert!(!fields.get("Nervous Tic").unwrap_or("").is_empty());
    assert!(generation.advisories.contains(&Advisory::UnmappedMannerism {
        category: "When Terrified".to_string(),
        option: "Goes very still".to_string(),
    }));
}

#[test]
fn seeded_rolls_are_reproducible() {
    let tables = ContentTables::load_dir(&fixture_dir("tables")).expect("fixture tables load");
    let engine = Engine::new(tables);

    let mut a = engine.new_session();
    let mut b = engine.new_session();
    engine.roll_details(&mut a, &mut ChaCha8Rng::seed_from_u64(1234));
    engine.roll_details(&mut b, &mut ChaCha8Rng::seed_from_u64(1234));
    assert_eq!(a.details(), b.details());
}

#[test]
fn engine_from_config_uses_tables_dir_and_mode() {
    let config =
        ChargenConfig::load(&fixture_dir("chargen.toml")).expect("fixture config should load");
    assert_eq!(config.seed, Some(7));
    let engine = Engine::from_config(&config).expect("engine should open");
    assert_eq!(engine.background_field(), BackgroundFieldMode::Title);
    assert_eq!(engine.tables().talents().len(), 1);

    let mut session = engine.new_session();
    engine.roll_details(&mut session, &mut ChaCha8Rng::seed_from_u64(0));
    let generation = engine.generate(&mut session);
    assert_eq!(generation.fields.get("Background"), Some("Choose"));
    assert_eq!(generation.fields.get("Starting Coins"), Some("60"));
}

#[test]
fn misnamed_background_column_is_reported_at_generation() {
    let mut row = Row::new();
    row.insert(
        "Background".to_string(),
        "Choose: +1 Pilot or +1 Stealth.".to_string(),
    );
    let mut tables = ContentTables::empty();
    tables
        .insert(TableKind::Backgrounds, Table::new(vec![row]))
        .expect("misnamed column still inserts");
    let engine = Engine::new(tables);
    let mut session = engine.new_session();
    engine.roll_details(&mut session, &mut ChaCha8Rng::seed_from_u64(9));

    let generation = engine.generate(&mut session);
    assert_eq!(generation.fields.get("Background"), Some(""));
    assert!(session.bonus().opts().is_none());
    assert!(generation.advisories.contains(&Advisory::MissingColumn {
        table: "backgrounds".to_string(),
        column: "background".to_string(),
        rows: 1,
    }));
}
