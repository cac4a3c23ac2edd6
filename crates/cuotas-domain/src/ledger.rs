//! Dense payment grids produced by reconciliation.

use serde::{Deserialize, Serialize};

use crate::month::MonthKey;

pub const MONTHS_PER_YEAR: usize = 12;

/// One month cell of the payment grid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthSlot {
    pub paid: bool,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub payment_id: Option<i64>,
    /// The month lies inside the membership window. Slots of a boundary year
    /// outside the window stay `false` and render like unpaid months.
    #[serde(default)]
    pub due: bool,
}

impl MonthSlot {
    pub fn unpaid() -> Self {
        Self::default()
    }

    pub fn paid(amount: impl Into<String>, payment_id: i64) -> Self {
        Self {
            paid: true,
            amount: Some(amount.into()),
            payment_id: Some(payment_id),
            due: true,
        }
    }
}

/// Twelve slots for one calendar year, index 0 is January.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearLedger {
    pub year: i32,
    pub months: Vec<MonthSlot>,
}

impl YearLedger {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            months: vec![MonthSlot::unpaid(); MONTHS_PER_YEAR],
        }
    }

    pub fn slot(&self, month: MonthKey) -> Option<&MonthSlot> {
        if month.year() != self.year {
            return None;
        }
        self.months.get(month.index0())
    }

    pub fn paid_count(&self) -> usize {
        self.months.iter().filter(|slot| slot.paid).count()
    }
}

/// Year ledgers sorted by ascending year.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciledLedger {
    pub years: Vec<YearLedger>,
}

impl ReconciledLedger {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn year(&self, year: i32) -> Option<&YearLedger> {
        self.years.iter().find(|entry| entry.year == year)
    }

    pub fn slot(&self, month: MonthKey) -> Option<&MonthSlot> {
        self.year(month.year()).and_then(|entry| entry.slot(month))
    }

    /// Every slot paired with its month key, in calendar order.
    pub fn iter_slots(&self) -> impl Iterator<Item = (MonthKey, &MonthSlot)> + '_ {
        self.years.iter().flat_map(|entry| {
            entry
                .months
                .iter()
                .enumerate()
                .filter_map(move |(idx, slot)| {
                    MonthKey::new(entry.year, idx as u32 + 1).map(|key| (key, slot))
                })
        })
    }
}
