//! Show lifecycle and listing.

use api_protocol::{CreateShowRequest, DeleteShowResponse, ShowsQuery, UpdateShowRequest};
use chrono::Utc;
use concert_store::{ConcertStore, ShowFilter};
use entities::{parse_show_date, Show, ShowDetail};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::services::catalog::{resolve_band, resolve_venue};
use crate::services::validation::max_length;

pub const MAX_NOTES_LEN: usize = 2000;
pub const MAX_SETLIST_ID_LEN: usize = 100;

fn clean_setlist_id(setlist_id: Option<String>) -> ServerResult<Option<String>> {
    let setlist_id = setlist_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    if let Some(id) = &setlist_id {
        max_length("setlist_id", id, MAX_SETLIST_ID_LEN)?;
    }
    Ok(setlist_id)
}

async fn ensure_unique_show<S: ConcertStore>(store: &S, show: &Show) -> ServerResult<()> {
    if let Some(existing) = store
        .find_show_on_date(show.band_id, show.venue_id, show.show_date())
        .await?
    {
        if existing.id != show.id {
            return Err(ServerError::Conflict(format!(
                "A show for this band at this venue on {} already exists",
                show.show_date()
            )));
        }
    }
    Ok(())
}

async fn load_detail<S: ConcertStore>(store: &S, id: Uuid) -> ServerResult<ShowDetail> {
    store
        .get_show_detail(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Show not found".to_string()))
}

/// Creates a show for an existing band and venue.
pub async fn create_show<S: ConcertStore>(
    store: &S,
    req: CreateShowRequest,
) -> ServerResult<ShowDetail> {
    let date = parse_show_date(&req.date)?;
    let notes = req.notes.unwrap_or_default();
    max_length("notes", &notes, MAX_NOTES_LEN)?;
    let setlist_id = clean_setlist_id(req.setlist_id)?;

    let band = resolve_band(store, &req.band_name).await?;
    let venue = resolve_venue(store, &req.venue_name).await?;

    let show = Show::new(band.id, venue.id, date)
        .with_notes(notes)
        .with_setlist_id(setlist_id);
    ensure_unique_show(store, &show).await?;

    let show = store.create_show(show).await?;
    tracing::info!(
        show_id = %show.id,
        band = %band.name,
        venue = %venue.name,
        date = %show.show_date(),
        "Created show"
    );

    Ok(ShowDetail { show, band, venue })
}

/// Fetches a show with its band and venue.
pub async fn get_show<S: ConcertStore>(store: &S, id: Uuid) -> ServerResult<ShowDetail> {
    load_detail(store, id).await
}

/// Lists shows matching the query, most recent first.
pub async fn list_shows<S: ConcertStore>(
    store: &S,
    query: ShowsQuery,
) -> ServerResult<Vec<ShowDetail>> {
    let filter = ShowFilter::new()
        .with_band(query.band.as_deref())
        .with_venue(query.venue.as_deref())
        .with_city(query.city.as_deref())
        .with_state(query.state.as_deref())
        .with_date_from(query.date_from.as_deref())
        .with_date_to(query.date_to.as_deref());

    Ok(store.list_shows(filter).await?)
}

/// Updates a show. Only provided fields change; the (band, venue, date)
/// uniqueness is re-checked against other shows.
pub async fn update_show<S: ConcertStore>(
    store: &S,
    id: Uuid,
    req: UpdateShowRequest,
) -> ServerResult<ShowDetail> {
    let date = req.date.as_deref().map(parse_show_date).transpose()?;
    if let Some(notes) = &req.notes {
        max_length("notes", notes, MAX_NOTES_LEN)?;
    }
    let setlist_id = match req.setlist_id {
        Some(setlist_id) => Some(clean_setlist_id(Some(setlist_id))?),
        None => None,
    };

    let ShowDetail {
        mut show,
        mut band,
        mut venue,
    } = load_detail(store, id).await?;

    if let Some(band_name) = &req.band_name {
        band = resolve_band(store, band_name).await?;
        show.band_id = band.id;
    }
    if let Some(venue_name) = &req.venue_name {
        venue = resolve_venue(store, venue_name).await?;
        show.venue_id = venue.id;
    }
    if let Some(date) = date {
        show.date = date;
    }
    if let Some(notes) = req.notes {
        show.notes = notes;
    }
    if let Some(setlist_id) = setlist_id {
        show.setlist_id = setlist_id;
    }

    ensure_unique_show(store, &show).await?;

    show.updated_at = Utc::now();
    let show = store.update_show(show).await?;
    tracing::info!(show_id = %show.id, "Updated show");

    Ok(ShowDetail { show, band, venue })
}

/// Deletes a show together with its attendance records.
pub async fn delete_show<S: ConcertStore>(store: &S, id: Uuid) -> ServerResult<DeleteShowResponse> {
    let attendances_removed = store.delete_show(id).await?;
    tracing::info!(show_id = %id, attendances_removed, "Deleted show");

    Ok(DeleteShowResponse {
        message: "Show deleted successfully".to_string(),
        attendances_removed,
    })
}
