use axum::extract::State;
use axum::http::StatusCode;
use tracing::{debug, info};

use crate::error::{AppError, Result, TICKET_NOT_FOUND};
use crate::extract::{Paged, PathIds, Submitted, TicketPath};
use crate::forms::TicketForm;
use crate::models::Ticket;
use crate::paging::PageRequest;
use crate::repository::{TicketCommentRepository, TicketRepository};
use crate::view::Reply;
use crate::AppState;

pub const INDEX_VIEW: &str = "tickets/index";
pub const VIEW_ONE_VIEW: &str = "tickets/viewOne";
pub const CREATE_VIEW: &str = "tickets/create";
pub const EDIT_VIEW: &str = "tickets/edit";
pub const DELETE_VIEW: &str = "tickets/delete";

pub const TICKETS_URL: &str = "/tickets";

pub fn ticket_url(id: i64) -> String {
    format!("{}/{}", TICKETS_URL, id)
}

/// Resolve a path-addressed ticket or fail with not found.
pub fn find_ticket(tickets: &impl TicketRepository, id: i64) -> Result<Ticket> {
    match tickets.find_by_id(id)? {
        Some(ticket) => Ok(ticket),
        None => {
            debug!(ticket = id, "ticket not found");
            Err(AppError::NotFound(TICKET_NOT_FOUND))
        }
    }
}

pub fn list(tickets: &impl TicketRepository, page: &PageRequest) -> Result<Reply> {
    let page = tickets.find_all(page)?;
    Ok(Reply::view(INDEX_VIEW).with("page", page))
}

pub fn view_one(
    tickets: &impl TicketRepository,
    comments: &impl TicketCommentRepository,
    id: i64,
    page: &PageRequest,
) -> Result<Reply> {
    let ticket = find_ticket(tickets, id)?;
    let comments = comments.find_by_ticket(ticket.id, page)?;

    Ok(Reply::view(VIEW_ONE_VIEW)
        .with("ticket", ticket)
        .with("comments", comments))
}

pub fn show_create_form() -> Reply {
    Reply::view(CREATE_VIEW)
}

pub fn create(tickets: &impl TicketRepository, form: &TicketForm) -> Result<Reply> {
    let errors = form.validate();
    if !errors.is_empty() {
        debug!(?errors, "rejected new ticket");
        return Ok(Reply::view(CREATE_VIEW)
            .with("ticket", form.to_ticket())
            .with("errors", errors)
            .with_status(StatusCode::BAD_REQUEST));
    }

    let ticket = tickets.save(form.to_ticket())?;
    info!(ticket = ticket.id, "created ticket");

    Ok(Reply::redirect(ticket_url(ticket.id)))
}

pub fn show_edit_form(tickets: &impl TicketRepository, id: i64) -> Result<Reply> {
    let ticket = find_ticket(tickets, id)?;
    Ok(Reply::view(EDIT_VIEW).with("ticket", ticket))
}

pub fn edit(tickets: &impl TicketRepository, id: i64, form: &TicketForm) -> Result<Reply> {
    let ticket = find_ticket(tickets, id)?;

    let errors = form.validate();
    if !errors.is_empty() {
        debug!(ticket = id, ?errors, "rejected ticket edit");
        return Ok(Reply::view(EDIT_VIEW)
            .with("ticket", form.apply_to(ticket))
            .with("errors", errors)
            .with_status(StatusCode::BAD_REQUEST));
    }

    let ticket = tickets.save(form.apply_to(ticket))?;
    info!(ticket = ticket.id, "updated ticket");

    Ok(Reply::redirect(ticket_url(ticket.id)))
}

pub fn show_delete_confirmation(tickets: &impl TicketRepository, id: i64) -> Result<Reply> {
    let ticket = find_ticket(tickets, id)?;
    Ok(Reply::view(DELETE_VIEW).with("ticket", ticket))
}

pub fn delete(tickets: &impl TicketRepository, id: i64) -> Result<Reply> {
    let ticket = find_ticket(tickets, id)?;

    tickets.delete(ticket.id)?;
    info!(ticket = ticket.id, "deleted ticket");

    Ok(Reply::redirect(TICKETS_URL))
}

// HTTP handlers

pub async fn get_index(State(state): State<AppState>, Paged(page): Paged) -> Result<Reply> {
    state
        .with_db(move |db| list(&db.tickets(), &page))
        .await
}

pub async fn get_view(
    State(state): State<AppState>,
    PathIds(path): PathIds<TicketPath>,
    Paged(page): Paged,
) -> Result<Reply> {
    state
        .with_db(move |db| view_one(&db.tickets(), &db.comments(), path.ticket.0, &page))
        .await
}

pub async fn get_create() -> Reply {
    show_create_form()
}

pub async fn post_create(
    State(state): State<AppState>,
    Submitted(form): Submitted<TicketForm>,
) -> Result<Reply> {
    state
        .with_db(move |db| create(&db.tickets(), &form))
        .await
}

pub async fn get_edit(
    State(state): State<AppState>,
    PathIds(path): PathIds<TicketPath>,
) -> Result<Reply> {
    state
        .with_db(move |db| show_edit_form(&db.tickets(), path.ticket.0))
        .await
}

pub async fn post_edit(
    State(state): State<AppState>,
    PathIds(path): PathIds<TicketPath>,
    Submitted(form): Submitted<TicketForm>,
) -> Result<Reply> {
    state
        .with_db(move |db| edit(&db.tickets(), path.ticket.0, &form))
        .await
}

pub async fn get_delete(
    State(state): State<AppState>,
    PathIds(path): PathIds<TicketPath>,
) -> Result<Reply> {
    state
        .with_db(move |db| show_delete_confirmation(&db.tickets(), path.ticket.0))
        .await
}

pub async fn post_delete(
    State(state): State<AppState>,
    PathIds(path): PathIds<TicketPath>,
) -> Result<Reply> {
    state
        .with_db(move |db| delete(&db.tickets(), path.ticket.0))
        .await
}
