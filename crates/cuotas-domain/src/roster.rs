use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{member::Member, payment::Payment};

pub const ROSTER_SCHEMA_VERSION: u32 = 1;

/// Snapshot of every member and payment known locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default = "Roster::current_schema")]
    pub schema_version: u32,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default = "Roster::first_id")]
    pub next_member_id: i64,
    #[serde(default = "Roster::first_id")]
    pub next_payment_id: i64,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            schema_version: ROSTER_SCHEMA_VERSION,
            members: Vec::new(),
            payments: Vec::new(),
            next_member_id: Self::first_id(),
            next_payment_id: Self::first_id(),
            updated_at: Utc::now(),
        }
    }
}

impl Roster {
    fn current_schema() -> u32 {
        ROSTER_SCHEMA_VERSION
    }

    fn first_id() -> i64 {
        1
    }

    pub fn member(&self, id: i64) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn member_mut(&mut self, id: i64) -> Option<&mut Member> {
        self.members.iter_mut().find(|member| member.id == id)
    }

    pub fn payments_for(&self, member_id: i64) -> Vec<Payment> {
        self.payments
            .iter()
            .filter(|payment| payment.owner_id == member_id)
            .cloned()
            .collect()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
