use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-reported issue.
///
/// An `id` of zero marks a ticket that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    /// Short summary of the problem
    pub issue: String,
    /// Full description of the problem
    pub issue_details: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl Ticket {
    pub fn is_new(&self) -> bool {
        self.id == 0
    }
}

/// A remark attached to exactly one ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketComment {
    pub id: i64,
    pub comment: String,
    pub date_created: DateTime<Utc>,
    pub ticket_id: i64,
}

impl TicketComment {
    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    pub fn belongs_to(&self, ticket: &Ticket) -> bool {
        self.ticket_id == ticket.id
    }
}
