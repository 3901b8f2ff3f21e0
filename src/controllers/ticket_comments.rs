use axum::extract::State;
use axum::http::StatusCode;
use tracing::{debug, info};

use super::tickets::{find_ticket, ticket_url, VIEW_ONE_VIEW};
use crate::error::{AppError, Result, COMMENT_NOT_FOUND, TICKET_NOT_FOUND};
use crate::extract::{CommentPath, Paged, PathIds, Submitted, TicketPath};
use crate::forms::TicketCommentForm;
use crate::models::{Ticket, TicketComment};
use crate::paging::PageRequest;
use crate::repository::{TicketCommentRepository, TicketRepository};
use crate::view::Reply;
use crate::AppState;

pub const DELETE_VIEW: &str = "tickets/comments/delete";

/// Resolve a comment addressed under `ticket_id`.
///
/// A comment that exists but belongs to another ticket is reported the same
/// way as a missing ticket.
pub fn find_comment(
    tickets: &impl TicketRepository,
    comments: &impl TicketCommentRepository,
    ticket_id: i64,
    comment_id: i64,
) -> Result<(Ticket, TicketComment)> {
    let comment = match comments.find_by_id(comment_id)? {
        Some(comment) => comment,
        None => {
            debug!(comment = comment_id, "comment not found");
            return Err(AppError::NotFound(COMMENT_NOT_FOUND));
        }
    };

    match tickets.find_by_id(ticket_id)? {
        Some(ticket) if comment.belongs_to(&ticket) => Ok((ticket, comment)),
        _ => {
            debug!(
                ticket = ticket_id,
                comment = comment_id,
                owner = comment.ticket_id,
                "comment not addressable under ticket"
            );
            Err(AppError::NotFound(TICKET_NOT_FOUND))
        }
    }
}

/// Add a comment to a ticket. A blank comment re-renders the ticket page
/// with `page` selecting the comments shown alongside the errors.
pub fn create(
    tickets: &impl TicketRepository,
    comments: &impl TicketCommentRepository,
    ticket_id: i64,
    form: &TicketCommentForm,
    page: &PageRequest,
) -> Result<Reply> {
    let ticket = find_ticket(tickets, ticket_id)?;

    let errors = form.validate();
    if !errors.is_empty() {
        debug!(ticket = ticket.id, ?errors, "rejected comment");
        let existing = comments.find_by_ticket(ticket.id, page)?;
        return Ok(Reply::view(VIEW_ONE_VIEW)
            .with("ticketComment", form.to_ticket_comment(&ticket))
            .with("ticket", ticket)
            .with("comments", existing)
            .with("errors", errors)
            .with_status(StatusCode::BAD_REQUEST));
    }

    let comment = comments.save(form.to_ticket_comment(&ticket))?;
    info!(ticket = ticket.id, comment = comment.id, "added comment");

    Ok(Reply::redirect(ticket_url(ticket.id)))
}

pub fn show_delete_confirmation(
    tickets: &impl TicketRepository,
    comments: &impl TicketCommentRepository,
    ticket_id: i64,
    comment_id: i64,
) -> Result<Reply> {
    let (ticket, comment) = find_comment(tickets, comments, ticket_id, comment_id)?;
    Ok(Reply::view(DELETE_VIEW)
        .with("ticket", ticket)
        .with("comment", comment))
}

pub fn delete(
    tickets: &impl TicketRepository,
    comments: &impl TicketCommentRepository,
    ticket_id: i64,
    comment_id: i64,
) -> Result<Reply> {
    let (ticket, comment) = find_comment(tickets, comments, ticket_id, comment_id)?;

    comments.delete(comment.id)?;
    info!(ticket = ticket.id, comment = comment.id, "deleted comment");

    Ok(Reply::redirect(ticket_url(ticket.id)))
}

// HTTP handlers

pub async fn post_create(
    State(state): State<AppState>,
    PathIds(path): PathIds<TicketPath>,
    Paged(page): Paged,
    Submitted(form): Submitted<TicketCommentForm>,
) -> Result<Reply> {
    state
        .with_db(move |db| create(&db.tickets(), &db.comments(), path.ticket.0, &form, &page))
        .await
}

pub async fn get_delete(
    State(state): State<AppState>,
    PathIds(path): PathIds<CommentPath>,
) -> Result<Reply> {
    state
        .with_db(move |db| {
            show_delete_confirmation(&db.tickets(), &db.comments(), path.ticket.0, path.comment.0)
        })
        .await
}

pub async fn post_delete(
    State(state): State<AppState>,
    PathIds(path): PathIds<CommentPath>,
) -> Result<Reply> {
    state
        .with_db(move |db| delete(&db.tickets(), &db.comments(), path.ticket.0, path.comment.0))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::forms::TicketForm;
    use proptest::prelude::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    fn create_ticket(db: &Database, issue: &str) -> Ticket {
        let form = TicketForm {
            issue: issue.to_string(),
            issue_details: None,
        };
        db.tickets().save(form.to_ticket()).unwrap()
    }

    fn comment_form(text: &str) -> TicketCommentForm {
        TicketCommentForm {
            comment: text.to_string(),
        }
    }

    fn add_comment(db: &Database, ticket: &Ticket, text: &str) -> TicketComment {
        db.comments()
            .save(comment_form(text).to_ticket_comment(ticket))
            .unwrap()
    }

    fn comment_count(db: &Database, ticket: &Ticket) -> u64 {
        db.comments()
            .find_by_ticket(ticket.id, &PageRequest::default())
            .unwrap()
            .total_elements
    }

    // ==================== Unit Tests ====================

    #[test]
    fn test_create_comment_redirects_to_ticket() {
        let (db, _dir) = setup_test_db();
        let ticket = create_ticket(&db, "Ticket");

        let reply = create(
            &db.tickets(),
            &db.comments(),
            ticket.id,
            &comment_form("Sample comment"),
            &PageRequest::default(),
        )
        .unwrap();

        assert_eq!(reply.status(), StatusCode::FOUND);
        assert_eq!(reply.location(), Some(ticket_url(ticket.id).as_str()));

        let page = db
            .comments()
            .find_by_ticket(ticket.id, &PageRequest::default())
            .unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].comment, "Sample comment");
        assert_eq!(page.content[0].ticket_id, ticket.id);
    }

    #[test]
    fn test_create_blank_comment_rerenders_ticket() {
        let (db, _dir) = setup_test_db();
        let ticket = create_ticket(&db, "Ticket");
        add_comment(&db, &ticket, "Existing");

        let reply = create(
            &db.tickets(),
            &db.comments(),
            ticket.id,
            &comment_form("   "),
            &PageRequest::default(),
        )
        .unwrap();

        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
        assert_eq!(reply.view_name(), Some(VIEW_ONE_VIEW));
        assert_eq!(reply.model("ticket").unwrap()["id"], json!(ticket.id));
        assert_eq!(
            reply.model("ticketComment").unwrap()["ticketId"],
            json!(ticket.id)
        );
        assert_eq!(reply.model("comments").unwrap()["totalElements"], json!(1));
        assert_eq!(
            reply.model("errors").unwrap()[0]["field"],
            json!("comment")
        );
        assert_eq!(comment_count(&db, &ticket), 1);
    }

    #[test]
    fn test_create_comment_missing_ticket() {
        let (db, _dir) = setup_test_db();
        let result = create(
            &db.tickets(),
            &db.comments(),
            100500,
            &comment_form(""),
            &PageRequest::default(),
        );
        assert!(matches!(result, Err(AppError::NotFound(TICKET_NOT_FOUND))));
    }

    #[test]
    fn test_show_delete_confirmation() {
        let (db, _dir) = setup_test_db();
        let ticket = create_ticket(&db, "Ticket");
        let comment = add_comment(&db, &ticket, "Remove me");

        let reply =
            show_delete_confirmation(&db.tickets(), &db.comments(), ticket.id, comment.id).unwrap();

        assert_eq!(reply.view_name(), Some(DELETE_VIEW));
        assert_eq!(reply.model("comment").unwrap()["comment"], json!("Remove me"));
        assert_eq!(reply.model("ticket").unwrap()["id"], json!(ticket.id));
    }

    #[test]
    fn test_delete_comment() {
        let (db, _dir) = setup_test_db();
        let ticket = create_ticket(&db, "Ticket");
        let comment = add_comment(&db, &ticket, "Remove me");
        let kept = add_comment(&db, &ticket, "Keep me");

        let reply = delete(&db.tickets(), &db.comments(), ticket.id, comment.id).unwrap();

        assert_eq!(reply.location(), Some(ticket_url(ticket.id).as_str()));
        assert!(!db.comments().exists(comment.id).unwrap());
        assert!(db.comments().exists(kept.id).unwrap());
    }

    #[test]
    fn test_missing_comment() {
        let (db, _dir) = setup_test_db();
        let ticket = create_ticket(&db, "Ticket");

        let result = show_delete_confirmation(&db.tickets(), &db.comments(), ticket.id, 100500);
        assert!(matches!(result, Err(AppError::NotFound(COMMENT_NOT_FOUND))));

        let result = delete(&db.tickets(), &db.comments(), ticket.id, 100500);
        assert!(matches!(result, Err(AppError::NotFound(COMMENT_NOT_FOUND))));
    }

    #[test]
    fn test_comment_under_wrong_ticket() {
        let (db, _dir) = setup_test_db();
        let first = create_ticket(&db, "First");
        let second = create_ticket(&db, "Second");
        let comment = add_comment(&db, &first, "Belongs to first");

        let result = show_delete_confirmation(&db.tickets(), &db.comments(), second.id, comment.id);
        assert!(matches!(result, Err(AppError::NotFound(TICKET_NOT_FOUND))));

        let result = delete(&db.tickets(), &db.comments(), second.id, comment.id);
        assert!(matches!(result, Err(AppError::NotFound(TICKET_NOT_FOUND))));

        assert!(db.comments().exists(comment.id).unwrap());
    }

    #[test]
    fn test_comment_under_missing_ticket() {
        let (db, _dir) = setup_test_db();
        let ticket = create_ticket(&db, "Ticket");
        let comment = add_comment(&db, &ticket, "Hello");

        let result = delete(&db.tickets(), &db.comments(), 100500, comment.id);
        assert!(matches!(result, Err(AppError::NotFound(TICKET_NOT_FOUND))));
        assert!(db.comments().exists(comment.id).unwrap());
    }

    // ==================== Property-Based Tests ====================

    proptest! {
        #[test]
        fn prop_blank_comment_never_persists(text in "[ \\t\\n]{0,10}") {
            let (db, _dir) = setup_test_db();
            let ticket = create_ticket(&db, "Ticket");

            let reply = create(
                &db.tickets(),
                &db.comments(),
                ticket.id,
                &comment_form(&text),
                &PageRequest::default(),
            ).unwrap();

            prop_assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
            prop_assert_eq!(comment_count(&db, &ticket), 0);
        }

        #[test]
        fn prop_foreign_comment_is_not_found(count in 1usize..5) {
            let (db, _dir) = setup_test_db();
            let owner = create_ticket(&db, "Owner");
            let stranger = create_ticket(&db, "Stranger");

            for i in 0..count {
                let comment = add_comment(&db, &owner, &format!("Comment {}", i));
                prop_assert!(show_delete_confirmation(&db.tickets(), &db.comments(), stranger.id, comment.id).is_err());
                prop_assert!(delete(&db.tickets(), &db.comments(), stranger.id, comment.id).is_err());
            }

            prop_assert_eq!(comment_count(&db, &owner), count as u64);
        }
    }
}
