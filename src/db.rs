use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::models::{Ticket, TicketComment};
use crate::paging::{Page, PageRequest};
use crate::repository::{TicketCommentRepository, TicketRepository};

const SCHEMA_VERSION: i32 = 1;

const TICKET_COLUMNS: &str = "id, issue, issue_details, date_created";
const COMMENT_COLUMNS: &str = "id, comment, date_created, ticket_id";

/// Sortable ticket properties and the columns backing them.
const TICKET_SORT: &[(&str, &str)] = &[
    ("id", "id"),
    ("issue", "issue"),
    ("issueDetails", "issue_details"),
    ("dateCreated", "date_created"),
];

const COMMENT_SORT: &[(&str, &str)] = &[
    ("id", "id"),
    ("comment", "comment"),
    ("dateCreated", "date_created"),
];

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open database")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .context("Failed to read schema version")?;

        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS tickets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    issue TEXT NOT NULL,
                    issue_details TEXT,
                    date_created TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS ticket_comments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    ticket_id INTEGER NOT NULL,
                    comment TEXT NOT NULL,
                    date_created TEXT NOT NULL,
                    FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
                );

                CREATE INDEX IF NOT EXISTS idx_ticket_comments_ticket ON ticket_comments(ticket_id);
                "#,
            )?;

            self.conn
                .execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        }

        // Comment cleanup on ticket deletion relies on this
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;

        Ok(())
    }

    pub fn tickets(&self) -> TicketStore<'_> {
        TicketStore { conn: &self.conn }
    }

    pub fn comments(&self) -> CommentStore<'_> {
        CommentStore { conn: &self.conn }
    }
}

pub struct TicketStore<'a> {
    conn: &'a Connection,
}

impl TicketRepository for TicketStore<'_> {
    fn save(&self, ticket: Ticket) -> Result<Ticket> {
        if ticket.is_new() {
            self.conn
                .execute(
                    "INSERT INTO tickets (issue, issue_details, date_created) VALUES (?1, ?2, ?3)",
                    params![ticket.issue, ticket.issue_details, ticket.date_created],
                )
                .context("Failed to insert ticket")?;
            return Ok(Ticket {
                id: self.conn.last_insert_rowid(),
                ..ticket
            });
        }

        self.conn
            .execute(
                "UPDATE tickets SET issue = ?1, issue_details = ?2 WHERE id = ?3",
                params![ticket.issue, ticket.issue_details, ticket.id],
            )
            .with_context(|| format!("Failed to update ticket #{}", ticket.id))?;

        // A concurrent delete leaves nothing to reload; hand back what we were given.
        Ok(self.find_by_id(ticket.id)?.unwrap_or(ticket))
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Ticket>> {
        let ticket = self
            .conn
            .query_row(
                &format!("SELECT {} FROM tickets WHERE id = ?1", TICKET_COLUMNS),
                [id],
                ticket_from_row,
            )
            .optional()?;
        Ok(ticket)
    }

    fn find_all(&self, page: &PageRequest) -> Result<Page<Ticket>> {
        let page = &page.restricted_to(TICKET_SORT);
        let total = count(self.conn, "SELECT COUNT(*) FROM tickets", [])?;

        let sql = format!(
            "SELECT {} FROM tickets ORDER BY {} LIMIT ?1 OFFSET ?2",
            TICKET_COLUMNS,
            page.order_by(TICKET_SORT)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tickets = stmt
            .query_map(params![page.limit(), page.offset()], ticket_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(tickets, page, total))
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM tickets WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete ticket #{}", id))?;
        Ok(rows > 0)
    }

    fn exists(&self, id: i64) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tickets WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

pub struct CommentStore<'a> {
    conn: &'a Connection,
}

impl TicketCommentRepository for CommentStore<'_> {
    fn save(&self, comment: TicketComment) -> Result<TicketComment> {
        if comment.is_new() {
            self.conn
                .execute(
                    "INSERT INTO ticket_comments (ticket_id, comment, date_created) VALUES (?1, ?2, ?3)",
                    params![comment.ticket_id, comment.comment, comment.date_created],
                )
                .with_context(|| format!("Failed to add comment to ticket #{}", comment.ticket_id))?;
            return Ok(TicketComment {
                id: self.conn.last_insert_rowid(),
                ..comment
            });
        }

        // Comments never move between tickets, so only the text is writable.
        self.conn
            .execute(
                "UPDATE ticket_comments SET comment = ?1 WHERE id = ?2",
                params![comment.comment, comment.id],
            )
            .with_context(|| format!("Failed to update comment #{}", comment.id))?;

        Ok(self.find_by_id(comment.id)?.unwrap_or(comment))
    }

    fn find_by_id(&self, id: i64) -> Result<Option<TicketComment>> {
        let comment = self
            .conn
            .query_row(
                &format!("SELECT {} FROM ticket_comments WHERE id = ?1", COMMENT_COLUMNS),
                [id],
                comment_from_row,
            )
            .optional()?;
        Ok(comment)
    }

    fn find_all(&self, page: &PageRequest) -> Result<Page<TicketComment>> {
        let page = &page.restricted_to(COMMENT_SORT);
        let total = count(self.conn, "SELECT COUNT(*) FROM ticket_comments", [])?;

        let sql = format!(
            "SELECT {} FROM ticket_comments ORDER BY {} LIMIT ?1 OFFSET ?2",
            COMMENT_COLUMNS,
            page.order_by(COMMENT_SORT)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let comments = stmt
            .query_map(params![page.limit(), page.offset()], comment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(comments, page, total))
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM ticket_comments WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete comment #{}", id))?;
        Ok(rows > 0)
    }

    fn exists(&self, id: i64) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM ticket_comments WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn find_by_ticket(&self, ticket_id: i64, page: &PageRequest) -> Result<Page<TicketComment>> {
        let page = &page.restricted_to(COMMENT_SORT);
        let total = count(
            self.conn,
            "SELECT COUNT(*) FROM ticket_comments WHERE ticket_id = ?1",
            [ticket_id],
        )?;

        let sql = format!(
            "SELECT {} FROM ticket_comments WHERE ticket_id = ?1 ORDER BY {} LIMIT ?2 OFFSET ?3",
            COMMENT_COLUMNS,
            page.order_by(COMMENT_SORT)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let comments = stmt
            .query_map(
                params![ticket_id, page.limit(), page.offset()],
                comment_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(comments, page, total))
    }
}

fn count<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<u64> {
    let total: i64 = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(u64::try_from(total).unwrap_or_default())
}

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        issue: row.get(1)?,
        issue_details: row.get(2)?,
        date_created: row.get(3)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<TicketComment> {
    Ok(TicketComment {
        id: row.get(0)?,
        comment: row.get(1)?,
        date_created: row.get(2)?,
        ticket_id: row.get(3)?,
    })
}
