use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_api::{Advisory, CoreError, CoreErrorCode};

pub const ATTRIBUTE_BUDGET: i32 = 18;
pub const SKILL_BUDGET: i32 = 70;
pub const ATTRIBUTE_MIN: i32 = 0;
pub const ATTRIBUTE_MAX: i32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Str,
    Dex,
    Con,
    Wil,
    Int,
    Cha,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Self::Str,
        Self::Dex,
        Self::Con,
        Self::Wil,
        Self::Int,
        Self::Cha,
    ];

    pub fn label(&self) -> &'static str {
        match *self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Con => "CON",
            Self::Wil => "WIL",
            Self::Int => "INT",
            Self::Cha => "CHA",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|attr| attr.label().eq_ignore_ascii_case(label))
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeSet {
    values: [i32; 6],
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(value: i32) -> Result<Self, CoreError> {
        let mut set = Self::new();
        for attr in Attribute::ALL {
            set.set(attr, value)?;
        }
        Ok(set)
    }

    pub fn get(&self, attr: Attribute) -> i32 {
        self.values[attr.index()]
    }

    pub fn set(&mut self, attr: Attribute, value: i32) -> Result<(), CoreError> {
        if !(ATTRIBUTE_MIN..=ATTRIBUTE_MAX).contains(&value) {
            return Err(CoreError::new(
                CoreErrorCode::InvalidValue,
                format!(
                    "{attr} must be between {ATTRIBUTE_MIN} and {ATTRIBUTE_MAX}, got {value}"
                ),
            ));
        }
        self.values[attr.index()] = value;
        Ok(())
    }

    pub fn total(&self) -> i32 {
        self.values.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, i32)> + '_ {
        Attribute::ALL.into_iter().map(|attr| (attr, self.get(attr)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skill {
    Athletics,
    CloseCombat,
    Demolitions,
    Engineering,
    Investigation,
    Medicine,
    Pilot,
    RangedCombat,
    Science,
    Stealth,
    Survival,
    ArsaidhTechnology,
}

impl Skill {
    pub const ALL: [Skill; 12] = [
        Self::Athletics,
        Self::CloseCombat,
        Self::Demolitions,
        Self::Engineering,
        Self::Investigation,
        Self::Medicine,
        Self::Pilot,
        Self::RangedCombat,
        Self::Science,
        Self::Stealth,
        Self::Survival,
        Self::ArsaidhTechnology,
    ];

    pub fn name(&self) -> &'static str {
        match *self {
            Self::Athletics => "Athletics",
            Self::CloseCombat => "Close Combat",
            Self::Demolitions => "Demolitions",
            Self::Engineering => "Engineering",
            Self::Investigation => "Investigation",
            Self::Medicine => "Medicine",
            Self::Pilot => "Pilot",
            Self::RangedCombat => "Ranged Combat",
            Self::Science => "Science",
            Self::Stealth => "Stealth",
            Self::Survival => "Survival",
            Self::ArsaidhTechnology => "Àrsaidh Technology",
        }
    }

    /// Exact display-name lookup. The unaccented "Arsaidh Technology" is
    /// accepted so the floor-shifted skill can be typed on a plain keyboard.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name == "Arsaidh Technology" {
            return Some(Self::ArsaidhTechnology);
        }
        Self::ALL.into_iter().find(|skill| skill.name() == name)
    }

    pub fn floor(self) -> i32 {
        match self {
            Self::ArsaidhTechnology => -5,
            _ => 0,
        }
    }

    pub fn ceiling(self) -> i32 {
        10
    }

    pub fn is_floor_shifted(&self) -> bool {
        self.floor() < 0
    }

    /// Point cost of holding `value` in this skill: the distance from the
    /// skill's floor, so -5 Àrsaidh Technology is free and 10 costs 15.
    pub fn cost(&self, value: i32) -> i32 {
        value - self.floor()
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    values: [i32; 12],
}

impl Default for SkillSet {
    fn default() -> Self {
        let mut values = [0; 12];
        for skill in Skill::ALL {
            values[skill.index()] = skill.floor();
        }
        Self { values }
    }
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, skill: Skill) -> i32 {
        self.values[skill.index()]
    }

    pub fn set(&mut self, skill: Skill, value: i32) -> Result<(), CoreError> {
        if !(skill.floor()..=skill.ceiling()).contains(&value) {
            return Err(CoreError::new(
                CoreErrorCode::InvalidValue,
                format!(
                    "{skill} must be between {} and {}, got {value}",
                    skill.floor(),
                    skill.ceiling()
                ),
            ));
        }
        self.values[skill.index()] = value;
        Ok(())
    }

    pub fn total_cost(&self) -> i32 {
        self.iter().map(|(skill, value)| skill.cost(value)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Skill, i32)> + '_ {
        Skill::ALL.into_iter().map(|skill| (skill, self.get(skill)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub attribute_total: i32,
    pub skill_total: i32,
}

impl BudgetReport {
    pub fn check(attributes: &AttributeSet, skills: &SkillSet) -> Self {
        Self {
            attribute_total: attributes.total(),
            skill_total: skills.total_cost(),
        }
    }

    pub fn attributes_over(&self) -> bool {
        self.attribute_total > ATTRIBUTE_BUDGET
    }

    pub fn skills_over(&self) -> bool {
        self.skill_total > SKILL_BUDGET
    }

    pub fn advisories(&self) -> Vec<Advisory> {
        let mut out = Vec::new();
        if self.attributes_over() {
            out.push(Advisory::AttributesOverBudget {
                total: self.attribute_total,
                budget: ATTRIBUTE_BUDGET,
            });
        }
        if self.skills_over() {
            out.push(Advisory::SkillsOverBudget {
                total: self.skill_total,
                budget: SKILL_BUDGET,
            });
        }
        out
    }
}
