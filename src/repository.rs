//! Storage interfaces used by the controllers.
//!
//! One repository per entity type. Saving an entity whose `id` is zero
//! inserts it and assigns an id; saving any other entity updates the stored
//! row in place. Creation timestamps are written on insert only.

use anyhow::Result;

use crate::models::{Ticket, TicketComment};
use crate::paging::{Page, PageRequest};

pub trait TicketRepository {
    fn save(&self, ticket: Ticket) -> Result<Ticket>;

    fn find_by_id(&self, id: i64) -> Result<Option<Ticket>>;

    fn find_all(&self, page: &PageRequest) -> Result<Page<Ticket>>;

    /// Delete a ticket together with its comments. Returns `false` when
    /// nothing was stored under `id`.
    fn delete(&self, id: i64) -> Result<bool>;

    fn exists(&self, id: i64) -> Result<bool>;
}

pub trait TicketCommentRepository {
    fn save(&self, comment: TicketComment) -> Result<TicketComment>;

    fn find_by_id(&self, id: i64) -> Result<Option<TicketComment>>;

    fn find_all(&self, page: &PageRequest) -> Result<Page<TicketComment>>;

    fn delete(&self, id: i64) -> Result<bool>;

    fn exists(&self, id: i64) -> Result<bool>;

    /// Comments attached to `ticket_id`, paged and sorted per `page`.
    fn find_by_ticket(&self, ticket_id: i64, page: &PageRequest) -> Result<Page<TicketComment>>;
}
