use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::background::extract_title;
use crate::bonus::BonusState;
use crate::core_api::{Advisory, CharacterIdentity, Drive, Talent};
use crate::mannerism::Mood;
use crate::roller::{DetailKind, RolledDetails};
use crate::ruleset::{Attribute, AttributeSet, Skill, SkillSet};

pub const FIELD_CHARACTER_NAME: &str = "Character Name";
pub const FIELD_PLAYER_NAME: &str = "Player Name";
pub const FIELD_PRONOUNS: &str = "Pronouns";
pub const FIELD_TALENT: &str = "Talent";
pub const FIELD_TALENT_DESCRIPTION: &str = "Talent Description";
pub const FIELD_DRIVE: &str = "Drive";
pub const FIELD_DRIVE_DESCRIPTION: &str = "Drive Description";
pub const FIELD_BACKGROUND: &str = "Background";
pub const FIELD_BACKGROUND_TITLE: &str = "Background Title";
pub const FIELD_BACKGROUND_BONUS: &str = "Background Bonus";
pub const FIELD_LIFE_EVENT: &str = "Life Event";
pub const FIELD_EARNED_PLACE: &str = "Earned Place";
pub const FIELD_NERVOUS_TIC: &str = "Nervous Tic";
pub const FIELD_STARTING_COINS: &str = "Starting Coins";

/// Where the rolled background lands on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFieldMode {
    /// Full text in `Background`, short title in `Background Title`.
    #[default]
    FullText,
    /// Short title in `Background`, `Background Title` left blank.
    Title,
    /// `Background` left blank, short title in `Background Title`.
    Redirected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Everything the sheet is built from, borrowed from a session.
#[derive(Debug, Clone, Copy)]
pub struct SheetInput<'a> {
    pub identity: &'a CharacterIdentity,
    pub attributes: &'a AttributeSet,
    pub skills: &'a SkillSet,
    pub bonus: &'a BonusState,
    pub talent: Option<&'a Talent>,
    pub drive: Option<&'a Drive>,
    pub mannerisms: &'a BTreeMap<String, String>,
    pub details: &'a RolledDetails,
}

/// Canonical sheet field names in sheet order.
pub fn canonical_field_names() -> Vec<&'static str> {
    let mut out = vec![FIELD_CHARACTER_NAME, FIELD_PLAYER_NAME, FIELD_PRONOUNS];
    out.extend(Attribute::ALL.iter().map(Attribute::label));
    out.extend(Skill::ALL.iter().map(Skill::name));
    out.extend([
        FIELD_TALENT,
        FIELD_TALENT_DESCRIPTION,
        FIELD_DRIVE,
        FIELD_DRIVE_DESCRIPTION,
    ]);
    out.extend(Mood::ALL.iter().map(Mood::field_name));
    out.extend([
        FIELD_BACKGROUND,
        FIELD_BACKGROUND_TITLE,
        FIELD_BACKGROUND_BONUS,
        FIELD_LIFE_EVENT,
        FIELD_EARNED_PLACE,
        FIELD_NERVOUS_TIC,
        FIELD_STARTING_COINS,
    ]);
    out
}

pub fn assemble(input: &SheetInput<'_>, mode: BackgroundFieldMode) -> FieldMap {
    let mut out = FieldMap::new();

    out.insert(FIELD_CHARACTER_NAME, input.identity.name.as_str());
    out.insert(FIELD_PLAYER_NAME, input.identity.player.as_str());
    out.insert(FIELD_PRONOUNS, input.identity.pronouns.as_str());

    for (attr, value) in input.attributes.iter() {
        out.insert(attr.label(), value.to_string());
    }
    for (skill, value) in input.skills.iter() {
        out.insert(skill.name(), input.bonus.apply(skill.name(), value).to_string());
    }

    out.insert(
        FIELD_TALENT,
        input.talent.map(|t| t.name.as_str()).unwrap_or(""),
    );
    out.insert(
        FIELD_TALENT_DESCRIPTION,
        input.talent.map(|t| t.description.as_str()).unwrap_or(""),
    );
    out.insert(FIELD_DRIVE, input.drive.map(|d| d.name.as_str()).unwrap_or(""));
    out.insert(
        FIELD_DRIVE_DESCRIPTION,
        input.drive.map(|d| d.description.as_str()).unwrap_or(""),
    );

    for mood in Mood::ALL {
        out.insert(mood.field_name(), "");
    }
    for (category, option) in input.mannerisms {
        if let Some(mood) = Mood::classify(category) {
            out.insert(mood.field_name(), option.as_str());
        }
    }

    let text = input.details.background_text().unwrap_or("");
    let title = if text.is_empty() {
        String::new()
    } else {
        extract_title(text)
    };
    let (background, background_title) = match mode {
        BackgroundFieldMode::FullText => (text.to_string(), title),
        BackgroundFieldMode::Title => (title, String::new()),
        BackgroundFieldMode::Redirected => (String::new(), title),
    };
    out.insert(FIELD_BACKGROUND, background);
    out.insert(FIELD_BACKGROUND_TITLE, background_title);
    out.insert(FIELD_BACKGROUND_BONUS, bonus_label(input.bonus));

    out.insert(FIELD_LIFE_EVENT, input.details.value(DetailKind::LifeEvent));
    out.insert(FIELD_EARNED_PLACE, input.details.value(DetailKind::EarnedPlace));
    out.insert(FIELD_NERVOUS_TIC, input.details.value(DetailKind::NervousTic));
    out.insert(
        FIELD_STARTING_COINS,
        input.details.value(DetailKind::StartingCoins),
    );

    out
}

/// Reports selected categories that fill no mood field, and moods filled by
/// more than one category (the last in category order wins in `assemble`).
pub fn mannerism_advisories(mannerisms: &BTreeMap<String, String>) -> Vec<Advisory> {
    let mut out = Vec::new();
    let mut by_mood: BTreeMap<Mood, Vec<String>> = BTreeMap::new();
    for (category, option) in mannerisms {
        match Mood::classify(category) {
            Some(mood) => by_mood.entry(mood).or_default().push(category.clone()),
            None => out.push(Advisory::UnmappedMannerism {
                category: category.clone(),
                option: option.clone(),
            }),
        }
    }
    for (mood, categories) in by_mood {
        if categories.len() > 1 {
            out.push(Advisory::ConflictingMannerisms {
                field: mood.field_name().to_string(),
                categories,
            });
        }
    }
    out
}

fn bonus_label(bonus: &BonusState) -> String {
    match bonus.choice() {
        Some(choice) if bonus.applied() => format!("+1 {choice}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{
        BackgroundFieldMode, FIELD_BACKGROUND, FIELD_BACKGROUND_TITLE, FieldMap, SheetInput,
        assemble, canonical_field_names, mannerism_advisories,
    };
    use crate::bonus::BonusState;
    use crate::core_api::{Advisory, CharacterIdentity};
    use crate::roller::{DetailKind, RolledDetails};
    use crate::ruleset::{AttributeSet, SkillSet};
    use crate::tables::Row;

    fn details_with_background(text: &str) -> RolledDetails {
        let mut details = RolledDetails::new();
        let mut row = Row::new();
        row.insert("background".to_string(), text.to_string());
        details.set(DetailKind::Background, Some(row));
        details
    }

    fn assemble_with(details: &RolledDetails, mode: BackgroundFieldMode) -> FieldMap {
        let identity = CharacterIdentity::default();
        let attributes = AttributeSet::new();
        let skills = SkillSet::new();
        let bonus = BonusState::new();
        let mannerisms = BTreeMap::new();
        let input = SheetInput {
            identity: &identity,
            attributes: &attributes,
            skills: &skills,
            bonus: &bonus,
            talent: None,
            drive: None,
            mannerisms: &mannerisms,
            details,
        };
        assemble(&input, mode)
    }

    #[test]
    fn field_map_insert_replaces_in_place() {
        let mut map = FieldMap::new();
        map.insert("a", "1");
        map.insert("b", "2");
        map.insert("a", "3");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some("3"));
    }

    #[test]
    fn every_canonical_key_is_present_even_when_blank() {
        let map = assemble_with(&RolledDetails::new(), BackgroundFieldMode::FullText);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, canonical_field_names());
        assert_eq!(map.get("Àrsaidh Technology"), Some("-5"));
        assert_eq!(map.get("Life Event"), Some(""));
    }

    #[test]
    fn background_modes_place_text_and_title() {
        let details = details_with_background("Belt Miner - Cracked rocks for a living.");

        let full = assemble_with(&details, BackgroundFieldMode::FullText);
        assert_eq!(
            full.get(FIELD_BACKGROUND),
            Some("Belt Miner - Cracked rocks for a living.")
        );
        assert_eq!(full.get(FIELD_BACKGROUND_TITLE), Some("Belt Miner"));

        let title = assemble_with(&details, BackgroundFieldMode::Title);
        assert_eq!(title.get(FIELD_BACKGROUND), Some("Belt Miner"));
        assert_eq!(title.get(FIELD_BACKGROUND_TITLE), Some(""));

        let redirected = assemble_with(&details, BackgroundFieldMode::Redirected);
        assert_eq!(redirected.get(FIELD_BACKGROUND), Some(""));
        assert_eq!(redirected.get(FIELD_BACKGROUND_TITLE), Some("Belt Miner"));
    }

    #[test]
    fn unrecognized_mannerism_categories_are_reported() {
        let mut mannerisms = BTreeMap::new();
        mannerisms.insert("When Shy".to_string(), "Mumbles".to_string());
        mannerisms.insert("When Terrified".to_string(), "Freezes".to_string());
        let advisories = mannerism_advisories(&mannerisms);
        assert_eq!(advisories.len(), 1);
        assert!(advisories[0].to_string().contains("When Terrified"));
    }

    #[test]
    fn categories_sharing_a_mood_field_are_reported() {
        let mut mannerisms = BTreeMap::new();
        mannerisms.insert("When Happy".to_string(), "Whistles".to_string());
        mannerisms.insert("Happy moments".to_string(), "Hums".to_string());
        mannerisms.insert("When Shy".to_string(), "Mumbles".to_string());

        let advisories = mannerism_advisories(&mannerisms);
        assert_eq!(
            advisories,
            vec![Advisory::ConflictingMannerisms {
                field: "Mannerism Happy".to_string(),
                categories: vec!["Happy moments".to_string(), "When Happy".to_string()],
            }]
        );
        assert!(advisories[0].to_string().contains("only \"When Happy\" is kept"));
    }
}
