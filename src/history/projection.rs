// src/history/projection.rs

use crate::domain::record::CollectionRecord;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Which slice of the history the screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Today,
    All,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Today => "Today",
            Tab::All => "All",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Tab::Today),
            "all" => Ok(Tab::All),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

/// Sorted, tab-filtered copy of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub tab: Tab,
    pub computed_at: NaiveDateTime,
    pub records: Vec<CollectionRecord>,
    /// Records in the source snapshot whose `dateAndTime` could not be parsed.
    pub undated: usize,
}

impl Projection {
    pub fn empty(tab: Tab, now: NaiveDateTime) -> Self {
        Self {
            tab,
            computed_at: now,
            records: Vec::new(),
            undated: 0,
        }
    }

    pub fn compute(records: &[CollectionRecord], tab: Tab, now: NaiveDateTime) -> Self {
        let undated = records
            .iter()
            .filter(|r| r.parsed_date_and_time().is_err())
            .count();

        Self {
            tab,
            computed_at: now,
            records: project(records, tab, now),
            undated,
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Newest first by parsed `dateAndTime`.
///
/// Equal timestamps keep their snapshot order. Records without a usable date
/// sort after every dated record and never qualify for `Today`. `now` is local
/// wall-clock time, the same clock the writer formats `dateAndTime` in.
pub fn project(records: &[CollectionRecord], tab: Tab, now: NaiveDateTime) -> Vec<CollectionRecord> {
    let today = now.date();

    let mut keyed: Vec<(Option<NaiveDateTime>, &CollectionRecord)> = records
        .iter()
        .map(|r| (r.parsed_date_and_time().ok(), r))
        .filter(|(when, _)| match tab {
            Tab::All => true,
            Tab::Today => when.map(|w| w.date() == today).unwrap_or(false),
        })
        .collect();

    // sort_by is stable, so ties keep input order.
    keyed.sort_by(|(a, _), (b, _)| newest_first(a, b));

    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}

fn newest_first(a: &Option<NaiveDateTime>, b: &Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
