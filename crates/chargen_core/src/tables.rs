use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::background::validate_bonus_clause;
use crate::core_api::{Advisory, CoreError, CoreErrorCode, Drive, Talent};

pub type Row = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Backgrounds,
    LifeEvents,
    EarnPlace,
    NervousTics,
    StartingCoins,
    Talents,
    Drives,
    Mannerisms,
}

impl TableKind {
    pub const ALL: [TableKind; 8] = [
        Self::Backgrounds,
        Self::LifeEvents,
        Self::EarnPlace,
        Self::NervousTics,
        Self::StartingCoins,
        Self::Talents,
        Self::Drives,
        Self::Mannerisms,
    ];

    pub fn name(&self) -> &'static str {
        match *self {
            Self::Backgrounds => "backgrounds",
            Self::LifeEvents => "life_events",
            Self::EarnPlace => "earn_place",
            Self::NervousTics => "nervous_tics",
            Self::StartingCoins => "starting_coins",
            Self::Talents => "talents",
            Self::Drives => "drives",
            Self::Mannerisms => "mannerisms",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        match *self {
            Self::Backgrounds => &["background"],
            Self::LifeEvents => &["life_event"],
            Self::EarnPlace => &["earn_place"],
            Self::NervousTics => &["tic"],
            Self::StartingCoins => &["coins"],
            Self::Talents => &["talent_name", "talent_description"],
            Self::Drives => &["drive_name", "drive_description"],
            Self::Mannerisms => &["category", "option"],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column).map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTables {
    tables: BTreeMap<TableKind, Table>,
    advisories: Vec<Advisory>,
}

impl ContentTables {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads every table from `<dir>/<name>.json`. Absent files degrade to
    /// empty tables with a [`Advisory::MissingTable`]; files that exist but
    /// cannot be read or parsed are errors.
    pub fn load_dir(dir: &Path) -> Result<Self, CoreError> {
        let mut out = Self::empty();
        for kind in TableKind::ALL {
            let path = dir.join(kind.file_name());
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!(table = kind.name(), path = %path.display(), "content table missing; using empty table");
                    out.advisories.push(Advisory::MissingTable {
                        table: kind.name().to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    return Err(CoreError::new(
                        CoreErrorCode::Io,
                        format!("failed to read {}: {e}", path.display()),
                    ));
                }
            };
            let rows = parse_rows(&bytes).map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Parse,
                    format!("failed to parse {}: {}", path.display(), e.message),
                )
            })?;
            tracing::debug!(table = kind.name(), rows = rows.len(), "loaded content table");
            out.insert(kind, Table::new(rows))?;
        }
        Ok(out)
    }

    /// Adds or replaces one table. Backgrounds are checked for malformed
    /// bonus clauses here so bad content fails at load rather than mid-session.
    /// Rows lacking a required column are reported as
    /// [`Advisory::MissingColumn`].
    pub fn insert(&mut self, kind: TableKind, table: Table) -> Result<(), CoreError> {
        if kind == TableKind::Backgrounds {
            for text in table.column_values("background") {
                validate_bonus_clause(text)?;
            }
        }
        self.advisories.retain(|advisory| match advisory {
            Advisory::MissingTable { table } | Advisory::MissingColumn { table, .. } => {
                table != kind.name()
            }
            _ => true,
        });
        for &column in kind.required_columns() {
            let rows = table
                .rows()
                .iter()
                .filter(|row| !row.contains_key(column))
                .count();
            if rows > 0 {
                tracing::warn!(table = kind.name(), column, rows, "rows lack required column");
                self.advisories.push(Advisory::MissingColumn {
                    table: kind.name().to_string(),
                    column: column.to_string(),
                    rows,
                });
            }
        }
        self.tables.insert(kind, table);
        Ok(())
    }

    pub fn table(&self, kind: TableKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn talents(&self) -> Vec<Talent> {
        self.rows(TableKind::Talents)
            .filter_map(|row| {
                Some(Talent {
                    name: row.get("talent_name")?.clone(),
                    description: row.get("talent_description").cloned().unwrap_or_default(),
                })
            })
            .collect()
    }

    pub fn drives(&self) -> Vec<Drive> {
        self.rows(TableKind::Drives)
            .filter_map(|row| {
                Some(Drive {
                    name: row.get("drive_name")?.clone(),
                    description: row.get("drive_description").cloned().unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Mannerism options grouped by category, each list in table order.
    pub fn mannerism_options(&self) -> BTreeMap<String, Vec<String>> {
        let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in self.rows(TableKind::Mannerisms) {
            let (Some(category), Some(option)) = (row.get("category"), row.get("option")) else {
                continue;
            };
            out.entry(category.clone()).or_default().push(option.clone());
        }
        out
    }

    fn rows(&self, kind: TableKind) -> impl Iterator<Item = &Row> {
        self.tables
            .get(&kind)
            .map(Table::rows)
            .unwrap_or_default()
            .iter()
    }
}

pub fn parse_rows(bytes: &[u8]) -> Result<Vec<Row>, CoreError> {
    let value: JsonValue = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::new(CoreErrorCode::Parse, e.to_string()))?;
    let JsonValue::Array(items) = value else {
        return Err(CoreError::new(
            CoreErrorCode::Parse,
            "expected a JSON array of row objects",
        ));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let JsonValue::Object(object) = item else {
            return Err(CoreError::new(
                CoreErrorCode::Parse,
                format!("row {index} is not a JSON object"),
            ));
        };
        let mut row = Row::new();
        for (column, value) in object {
            let text = match value {
                JsonValue::Null => continue,
                JsonValue::String(s) => s,
                JsonValue::Bool(_) | JsonValue::Number(_) => value.to_string(),
                JsonValue::Array(_) | JsonValue::Object(_) => {
                    return Err(CoreError::new(
                        CoreErrorCode::Parse,
                        format!("row {index} column {column:?} is not a scalar"),
                    ));
                }
            };
            row.insert(column, text);
        }
        rows.push(row);
    }
    Ok(rows)
}
