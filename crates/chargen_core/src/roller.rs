use rand::Rng;
use rand::seq::SliceRandom;

use crate::tables::{ContentTables, Row, Table, TableKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetailKind {
    Background,
    LifeEvent,
    EarnedPlace,
    NervousTic,
    StartingCoins,
}

impl DetailKind {
    pub const ALL: [DetailKind; 5] = [
        Self::Background,
        Self::LifeEvent,
        Self::EarnedPlace,
        Self::NervousTic,
        Self::StartingCoins,
    ];

    pub fn table(&self) -> TableKind {
        match *self {
            Self::Background => TableKind::Backgrounds,
            Self::LifeEvent => TableKind::LifeEvents,
            Self::EarnedPlace => TableKind::EarnPlace,
            Self::NervousTic => TableKind::NervousTics,
            Self::StartingCoins => TableKind::StartingCoins,
        }
    }

    pub fn column(&self) -> &'static str {
        match *self {
            Self::Background => "background",
            Self::LifeEvent => "life_event",
            Self::EarnedPlace => "earn_place",
            Self::NervousTic => "tic",
            Self::StartingCoins => "coins",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Picks one row uniformly. An absent or empty table yields `None`, which
/// callers treat as a blank detail rather than a failure.
pub fn roll<'t, R: Rng + ?Sized>(table: Option<&'t Table>, rng: &mut R) -> Option<&'t Row> {
    table?.rows().choose(rng)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolledDetails {
    rows: [Option<Row>; 5],
}

impl RolledDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roll_all<R: Rng + ?Sized>(&mut self, tables: &ContentTables, rng: &mut R) {
        for kind in DetailKind::ALL {
            let row = roll(tables.table(kind.table()), rng).cloned();
            tracing::debug!(detail = ?kind, found = row.is_some(), "rolled detail");
            self.rows[kind.index()] = row;
        }
    }

    pub fn set(&mut self, kind: DetailKind, row: Option<Row>) {
        self.rows[kind.index()] = row;
    }

    pub fn get(&self, kind: DetailKind) -> Option<&Row> {
        self.rows[kind.index()].as_ref()
    }

    /// The detail's primary column, or "" when nothing was rolled.
    pub fn value(&self, kind: DetailKind) -> &str {
        self.get(kind)
            .and_then(|row| row.get(kind.column()))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn background_text(&self) -> Option<&str> {
        self.get(DetailKind::Background)
            .and_then(|row| row.get(DetailKind::Background.column()))
            .map(String::as_str)
    }
}
