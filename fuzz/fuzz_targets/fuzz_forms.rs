#![no_main]

//! Fuzz target for form validation and persistence.
//!
//! Any form that validates must survive a save and read back unchanged;
//! any form that does not must never reach the database.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tempfile::tempdir;

use helpdesk::db::Database;
use helpdesk::forms::{TicketCommentForm, TicketForm};
use helpdesk::paging::PageRequest;
use helpdesk::repository::{TicketCommentRepository, TicketRepository};

#[derive(Arbitrary, Debug)]
struct FormsInput {
    issue: String,
    issue_details: Option<String>,
    comments: Vec<String>,
}

fuzz_target!(|input: FormsInput| {
    let dir = match tempdir() {
        Ok(d) => d,
        Err(_) => return,
    };
    let db = match Database::open(&dir.path().join("helpdesk.db")) {
        Ok(d) => d,
        Err(_) => return,
    };

    let form = TicketForm {
        issue: input.issue,
        issue_details: input.issue_details,
    };

    if !form.validate().is_empty() {
        assert!(form.issue.trim().is_empty() || form.issue.chars().count() > 255);
        return;
    }

    let ticket = db.tickets().save(form.to_ticket()).expect("valid ticket saves");
    let found = db
        .tickets()
        .find_by_id(ticket.id)
        .expect("lookup succeeds")
        .expect("saved ticket exists");
    assert_eq!(found.issue, form.issue);
    assert_eq!(found.issue_details, form.issue_details);

    let mut saved = 0;
    for text in input.comments.into_iter().take(16) {
        let comment = TicketCommentForm { comment: text };
        if comment.validate().is_empty() {
            let stored = db
                .comments()
                .save(comment.to_ticket_comment(&ticket))
                .expect("valid comment saves");
            assert!(stored.belongs_to(&ticket));
            saved += 1;
        }
    }

    let page = db
        .comments()
        .find_by_ticket(ticket.id, &PageRequest::default())
        .expect("listing succeeds");
    assert_eq!(page.total_elements, saved);
});
