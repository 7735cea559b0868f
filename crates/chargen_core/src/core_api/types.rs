use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fields::FieldMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CharacterIdentity {
    pub name: String,
    pub player: String,
    pub pronouns: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Talent {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Drive {
    pub name: String,
    pub description: String,
}

/// Non-fatal conditions surfaced to the user. None of these stop a sheet
/// from being generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    AttributesOverBudget { total: i32, budget: i32 },
    SkillsOverBudget { total: i32, budget: i32 },
    MissingTable { table: String },
    MissingColumn { table: String, column: String, rows: usize },
    UnmappedMannerism { category: String, option: String },
    ConflictingMannerisms { field: String, categories: Vec<String> },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributesOverBudget { total, budget } => write!(
                f,
                "attribute points total {total}, over the budget of {budget}"
            ),
            Self::SkillsOverBudget { total, budget } => {
                write!(f, "skill points total {total}, over the budget of {budget}")
            }
            Self::MissingTable { table } => {
                write!(f, "content table {table:?} is missing; its fields will be blank")
            }
            Self::MissingColumn {
                table,
                column,
                rows,
            } => write!(
                f,
                "content table {table:?} has {rows} row(s) without column {column:?}"
            ),
            Self::UnmappedMannerism { category, option } => write!(
                f,
                "mannerism category {category:?} ({option:?}) matches no sheet field"
            ),
            Self::ConflictingMannerisms { field, categories } => write!(
                f,
                "mannerism categories {} all fill {field:?}; only {:?} is kept",
                categories.join(", "),
                categories.last().map(String::as_str).unwrap_or("")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub fields: FieldMap,
    pub advisories: Vec<Advisory>,
}
