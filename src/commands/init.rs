use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use helpdesk::db::Database;
use helpdesk::forms::{TicketCommentForm, TicketForm};
use helpdesk::paging::PageRequest;
use helpdesk::repository::{TicketCommentRepository, TicketRepository};

const SAMPLE_TICKETS: &[(&str, Option<&str>, &[&str])] = &[
    (
        "Printer on the second floor is jammed",
        Some("Paper is stuck in tray 2 and the display shows error E-04."),
        &[
            "Opened the side panel, the jam is behind the fuser.",
            "Waiting for the vendor technician.",
        ],
    ),
    ("Cannot connect to the VPN", None, &[]),
];

/// Create the schema at `path`, optionally seeding sample data.
pub fn run(path: &Path, sample: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let db = Database::open(path)?;
    println!("Initialized {}", path.display());

    if sample {
        let created = seed(&db)?;
        if created == 0 {
            println!("Database already has tickets, skipping sample data");
        } else {
            println!("Added {} sample tickets", created);
        }
    }

    Ok(())
}

/// Insert the sample tickets into an empty database. Returns how many
/// tickets were added.
pub fn seed(db: &Database) -> Result<usize> {
    let existing = db.tickets().find_all(&PageRequest::new(0, 1))?;
    if existing.total_elements > 0 {
        return Ok(0);
    }

    for (issue, details, comments) in SAMPLE_TICKETS {
        let form = TicketForm {
            issue: issue.to_string(),
            issue_details: details.map(str::to_string),
        };
        let ticket = db.tickets().save(form.to_ticket())?;

        for text in comments.iter() {
            let form = TicketCommentForm {
                comment: text.to_string(),
            };
            db.comments().save(form.to_ticket_comment(&ticket))?;
        }
        info!(ticket = ticket.id, comments = comments.len(), "seeded ticket");
    }

    Ok(SAMPLE_TICKETS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_run_creates_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("helpdesk.db");

        run(&path, false).unwrap();

        assert!(path.exists());
        let db = Database::open(&path).unwrap();
        let page = db.tickets().find_all(&PageRequest::default()).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_seed_adds_tickets_and_comments() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();

        assert_eq!(seed(&db).unwrap(), 2);

        let tickets = db.tickets().find_all(&PageRequest::default()).unwrap();
        assert_eq!(tickets.total_elements, 2);

        let first = &tickets.content[0];
        let comments = db
            .comments()
            .find_by_ticket(first.id, &PageRequest::default())
            .unwrap();
        assert_eq!(comments.total_elements, 2);
        assert!(comments.content.iter().all(|c| c.belongs_to(first)));
    }

    #[test]
    fn test_seed_is_skipped_when_tickets_exist() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();

        seed(&db).unwrap();
        assert_eq!(seed(&db).unwrap(), 0);

        let tickets = db.tickets().find_all(&PageRequest::default()).unwrap();
        assert_eq!(tickets.total_elements, 2);
    }

    #[test]
    fn test_run_with_sample_twice() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("helpdesk.db");

        run(&path, true).unwrap();
        run(&path, true).unwrap();

        let db = Database::open(&path).unwrap();
        let tickets = db.tickets().find_all(&PageRequest::default()).unwrap();
        assert_eq!(tickets.total_elements, 2);
    }
}
