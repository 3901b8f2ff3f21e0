//! Submitted form shapes, their validation rules and the mapping onto entities.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{Ticket, TicketComment};

/// Counted in Unicode scalar values, not bytes or UTF-16 units.
pub const ISSUE_MAX_CHARS: usize = 255;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    /// Message key for the view layer
    pub code: &'static str,
}

impl FieldError {
    fn new(field: &'static str, code: &'static str) -> Self {
        FieldError { field, code }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketForm {
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub issue_details: Option<String>,
}

impl TicketForm {
    /// An empty list means the form may be mapped onto a ticket.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.issue.chars().count() > ISSUE_MAX_CHARS {
            errors.push(FieldError::new("issue", "ticketForm.issue.errors.tooLong"));
        }
        if is_blank(&self.issue) {
            errors.push(FieldError::new("issue", "ticketForm.issue.errors.blank"));
        }

        errors
    }

    /// A new, unsaved ticket stamped with the current time.
    pub fn to_ticket(&self) -> Ticket {
        self.apply_to(Ticket {
            id: 0,
            issue: String::new(),
            issue_details: None,
            date_created: Utc::now(),
        })
    }

    /// Overwrite the user-editable fields of `ticket`.
    pub fn apply_to(&self, ticket: Ticket) -> Ticket {
        Ticket {
            issue: self.issue.clone(),
            issue_details: self.issue_details.clone(),
            ..ticket
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCommentForm {
    #[serde(default)]
    pub comment: String,
}

impl TicketCommentForm {
    pub fn validate(&self) -> Vec<FieldError> {
        if is_blank(&self.comment) {
            vec![FieldError::new("comment", "ticketCommentForm.comment.errors.blank")]
        } else {
            Vec::new()
        }
    }

    /// A new, unsaved comment owned by `ticket`.
    pub fn to_ticket_comment(&self, ticket: &Ticket) -> TicketComment {
        TicketComment {
            id: 0,
            comment: self.comment.clone(),
            date_created: Utc::now(),
            ticket_id: ticket.id,
        }
    }
}
