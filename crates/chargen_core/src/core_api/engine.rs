use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::background::parse_bonus_clause;
use crate::bonus::BonusState;
use crate::config::ChargenConfig;
use crate::fields::{BackgroundFieldMode, SheetInput, assemble, mannerism_advisories};
use crate::roller::RolledDetails;
use crate::ruleset::{Attribute, AttributeSet, BudgetReport, Skill, SkillSet};
use crate::tables::ContentTables;

use super::error::{CoreError, CoreErrorCode};
use super::types::{CharacterIdentity, Drive, Generation, Talent};

#[derive(Debug, Clone)]
pub struct Engine {
    tables: ContentTables,
    background_field: BackgroundFieldMode,
}

/// One character in progress. Lives for a single creation session and is
/// handed to every [`Engine`] handler by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: CharacterIdentity,
    attributes: AttributeSet,
    skills: SkillSet,
    bonus: BonusState,
    details: RolledDetails,
    talent: Option<Talent>,
    drive: Option<Drive>,
    mannerisms: BTreeMap<String, String>,
}

impl Engine {
    pub fn new(tables: ContentTables) -> Self {
        Self {
            tables,
            background_field: BackgroundFieldMode::default(),
        }
    }

    pub fn from_config(config: &ChargenConfig) -> Result<Self, CoreError> {
        let tables = ContentTables::load_dir(&config.tables_dir)?;
        Ok(Self::new(tables).with_background_field(config.background_field))
    }

    pub fn with_background_field(mut self, mode: BackgroundFieldMode) -> Self {
        self.background_field = mode;
        self
    }

    pub fn tables(&self) -> &ContentTables {
        &self.tables
    }

    pub fn background_field(&self) -> BackgroundFieldMode {
        self.background_field
    }

    pub fn new_session(&self) -> Session {
        Session::default()
    }

    /// Rolls all five detail tables together, re-parses the new background's
    /// bonus clause and discards any earlier bonus choice.
    pub fn roll_details<R: Rng + ?Sized>(&self, session: &mut Session, rng: &mut R) {
        session.details.roll_all(&self.tables, rng);
        let opts = session.details.background_text().and_then(parse_bonus_clause);
        tracing::debug!(bonus = ?opts, "background rolled");
        session.bonus.reset(opts);
    }

    pub fn reroll_talent<R: Rng + ?Sized>(&self, session: &mut Session, rng: &mut R) {
        session.talent = self.tables.talents().choose(rng).cloned();
    }

    pub fn select_talent(&self, session: &mut Session, name: &str) -> Result<(), CoreError> {
        let talent = self
            .tables
            .talents()
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| {
                CoreError::new(CoreErrorCode::UnknownOption, format!("unknown talent {name:?}"))
            })?;
        session.talent = Some(talent);
        Ok(())
    }

    pub fn select_drive(&self, session: &mut Session, name: &str) -> Result<(), CoreError> {
        let drive = self
            .tables
            .drives()
            .into_iter()
            .find(|d| d.name == name)
            .ok_or_else(|| {
                CoreError::new(CoreErrorCode::UnknownOption, format!("unknown drive {name:?}"))
            })?;
        session.drive = Some(drive);
        Ok(())
    }

    pub fn select_mannerism(
        &self,
        session: &mut Session,
        category: &str,
        option: &str,
    ) -> Result<(), CoreError> {
        let options = self.tables.mannerism_options();
        let Some(choices) = options.get(category) else {
            return Err(CoreError::new(
                CoreErrorCode::UnknownOption,
                format!("unknown mannerism category {category:?}"),
            ));
        };
        if !choices.iter().any(|c| c == option) {
            return Err(CoreError::new(
                CoreErrorCode::UnknownOption,
                format!("{option:?} is not an option for mannerism category {category:?}"),
            ));
        }
        session
            .mannerisms
            .insert(category.to_string(), option.to_string());
        Ok(())
    }

    pub fn budget(&self, session: &Session) -> BudgetReport {
        BudgetReport::check(&session.attributes, &session.skills)
    }

    /// Builds the sheet's field map. Budgets are advisory only and an
    /// unconfirmed background bonus falls back to its first option, so this
    /// always succeeds.
    pub fn generate(&self, session: &mut Session) -> Generation {
        if session.bonus.resolve_default() {
            tracing::debug!(choice = ?session.bonus.choice(), "background bonus defaulted");
        }
        if let Some(choice) = session.bonus.choice()
            && Skill::from_name(choice).is_none()
        {
            tracing::debug!(choice, "background bonus names no known skill; ignoring");
        }

        let mut advisories = self.tables.advisories().to_vec();
        advisories.extend(self.budget(session).advisories());
        advisories.extend(mannerism_advisories(&session.mannerisms));
        for advisory in &advisories {
            tracing::warn!(%advisory, "advisory");
        }

        let fields = assemble(&session.sheet_input(), self.background_field);
        Generation { fields, advisories }
    }
}

impl Session {
    pub fn identity(&self) -> &CharacterIdentity {
        &self.identity
    }

    pub fn set_identity(&mut self, identity: CharacterIdentity) {
        self.identity = identity;
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn set_attribute(&mut self, attr: Attribute, value: i32) -> Result<(), CoreError> {
        self.attributes.set(attr, value)
    }

    pub fn skills(&self) -> &SkillSet {
        &self.skills
    }

    pub fn set_skill(&mut self, skill: Skill, value: i32) -> Result<(), CoreError> {
        self.skills.set(skill, value)
    }

    pub fn bonus(&self) -> &BonusState {
        &self.bonus
    }

    pub fn select_bonus(&mut self, skill_name: &str) -> Result<(), CoreError> {
        self.bonus.select(skill_name)
    }

    pub fn details(&self) -> &RolledDetails {
        &self.details
    }

    pub fn talent(&self) -> Option<&Talent> {
        self.talent.as_ref()
    }

    pub fn drive(&self) -> Option<&Drive> {
        self.drive.as_ref()
    }

    pub fn mannerisms(&self) -> &BTreeMap<String, String> {
        &self.mannerisms
    }

    /// Skill value as shown on the sheet, background bonus included.
    pub fn displayed_skill(&self, skill: Skill) -> i32 {
        self.bonus.apply(skill.name(), self.skills.get(skill))
    }

    pub fn sheet_input(&self) -> SheetInput<'_> {
        SheetInput {
            identity: &self.identity,
            attributes: &self.attributes,
            skills: &self.skills,
            bonus: &self.bonus,
            talent: self.talent.as_ref(),
            drive: self.drive.as_ref(),
            mannerisms: &self.mannerisms,
            details: &self.details,
        }
    }
}
