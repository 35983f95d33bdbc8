//! Bands and venues: name resolution, validation and reference-guarded
//! deletion.
//!
//! Request bodies name bands and venues in "body style" (trimmed and
//! lower-cased). Path parameters are slugs, so `red-rocks` resolves to the
//! venue stored as `red rocks`; when a slug contains hyphens the literal
//! form is tried as well, keeping `blink-182` reachable.

use api_protocol::{
    CreateBandRequest, CreateVenueRequest, MessageResponse, UpdateBandRequest,
    UpdateVenueRequest, VenuesQuery,
};
use chrono::Utc;
use concert_store::{ConcertStore, VenueFilter};
use entities::{
    normalize::{normalize_name, slug_candidates},
    Band, Venue,
};

use crate::error::{ServerError, ServerResult};
use crate::services::validation::{max_length, require_length};

pub const MAX_BAND_NAME_LEN: usize = 100;
pub const MAX_VENUE_NAME_LEN: usize = 100;
pub const MAX_CITY_LEN: usize = 200;
pub const MAX_STATE_LEN: usize = 100;
pub const MAX_COUNTRY_LEN: usize = 100;
pub const MAX_ADDRESS_LEN: usize = 200;

// =============================================================================
// Resolution
// =============================================================================

/// Resolves a band named in a request body.
pub async fn resolve_band<S: ConcertStore>(store: &S, name: &str) -> ServerResult<Band> {
    let key = normalize_name(name);
    if key.is_empty() {
        return Err(ServerError::InvalidRequest("band_name is required".to_string()));
    }
    store
        .get_band_by_name(&key)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Band '{key}' not found")))
}

/// Resolves a band from a path slug.
pub async fn resolve_band_slug<S: ConcertStore>(store: &S, slug: &str) -> ServerResult<Band> {
    for key in slug_candidates(slug) {
        if let Some(band) = store.get_band_by_name(&key).await? {
            return Ok(band);
        }
    }
    Err(ServerError::NotFound(format!("Band '{slug}' not found")))
}

/// Resolves a venue named in a request body. Several venues may share a
/// name in different cities; the earliest created one wins.
pub async fn resolve_venue<S: ConcertStore>(store: &S, name: &str) -> ServerResult<Venue> {
    let key = normalize_name(name);
    if key.is_empty() {
        return Err(ServerError::InvalidRequest("venue_name is required".to_string()));
    }
    store
        .get_venue_by_name(&key)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Venue '{key}' not found")))
}

/// Resolves a venue from a path slug.
pub async fn resolve_venue_slug<S: ConcertStore>(store: &S, slug: &str) -> ServerResult<Venue> {
    for key in slug_candidates(slug) {
        if let Some(venue) = store.get_venue_by_name(&key).await? {
            return Ok(venue);
        }
    }
    Err(ServerError::NotFound(format!("Venue '{slug}' not found")))
}

// =============================================================================
// Bands
// =============================================================================

fn validate_band_name(name: &str) -> ServerResult<()> {
    require_length("band_name", name, 1, MAX_BAND_NAME_LEN)
}

/// Lists all bands ordered by name.
pub async fn list_bands<S: ConcertStore>(store: &S) -> ServerResult<Vec<Band>> {
    Ok(store.list_bands().await?)
}

/// Creates a band. Names are unique ignoring case.
pub async fn create_band<S: ConcertStore>(store: &S, req: CreateBandRequest) -> ServerResult<Band> {
    let name = normalize_name(&req.band_name);
    validate_band_name(&name)?;

    if store.get_band_by_name(&name).await?.is_some() {
        return Err(ServerError::Conflict(format!("Band '{name}' already exists")));
    }

    let band = Band::new(&name)
        .with_genre(req.genre.as_deref().unwrap_or_default().trim())
        .with_description(req.description.as_deref().unwrap_or_default().trim());
    let band = store.create_band(band).await?;

    tracing::info!(band_id = %band.id, name = %band.name, "Created band");
    Ok(band)
}

/// Updates a band. A rename is checked against other bands.
pub async fn update_band<S: ConcertStore>(
    store: &S,
    slug: &str,
    req: UpdateBandRequest,
) -> ServerResult<Band> {
    let new_name = req.band_name.as_deref().map(normalize_name);
    if let Some(name) = &new_name {
        validate_band_name(name)?;
    }

    let mut band = resolve_band_slug(store, slug).await?;

    if let Some(name) = new_name {
        if name != band.name {
            if let Some(existing) = store.get_band_by_name(&name).await? {
                if existing.id != band.id {
                    return Err(ServerError::Conflict(format!("Band '{name}' already exists")));
                }
            }
            band.name = name;
        }
    }
    if let Some(genre) = req.genre {
        band.genre = genre.trim().to_string();
    }
    if let Some(description) = req.description {
        band.description = description.trim().to_string();
    }
    band.updated_at = Utc::now();

    let band = store.update_band(band).await?;
    tracing::info!(band_id = %band.id, "Updated band");
    Ok(band)
}

/// Deletes a band that no show references.
pub async fn delete_band<S: ConcertStore>(store: &S, slug: &str) -> ServerResult<MessageResponse> {
    let band = resolve_band_slug(store, slug).await?;

    let shows_count = store.count_shows_for_band(band.id).await?;
    if shows_count > 0 {
        return Err(ServerError::InUse {
            message: format!(
                "Cannot delete band '{}': it is referenced by {shows_count} show(s)",
                band.name
            ),
            shows_count,
        });
    }

    store.delete_band(band.id).await?;
    tracing::info!(band_id = %band.id, "Deleted band");
    Ok(MessageResponse::new("Band deleted successfully"))
}

// =============================================================================
// Venues
// =============================================================================

fn validate_venue(venue: &Venue) -> ServerResult<()> {
    require_length("name", &venue.name, 1, MAX_VENUE_NAME_LEN)?;
    require_length("city", &venue.city, 1, MAX_CITY_LEN)?;
    require_length("state", &venue.state, 1, MAX_STATE_LEN)?;
    max_length("country", &venue.country, MAX_COUNTRY_LEN)?;
    max_length("address", &venue.address, MAX_ADDRESS_LEN)?;
    Ok(())
}

fn parse_capacity(capacity: Option<i64>) -> ServerResult<Option<u32>> {
    capacity
        .map(|value| {
            u32::try_from(value).map_err(|_| {
                ServerError::InvalidRequest(format!(
                    "capacity must be between 0 and {}",
                    u32::MAX
                ))
            })
        })
        .transpose()
}

async fn ensure_unique_venue<S: ConcertStore>(store: &S, venue: &Venue) -> ServerResult<()> {
    if let Some(existing) = store
        .find_venue(&venue.name, &venue.city, &venue.state)
        .await?
    {
        if existing.id != venue.id {
            return Err(ServerError::Conflict(format!(
                "Venue '{}' in {}, {} already exists",
                venue.name, venue.city, venue.state
            )));
        }
    }
    Ok(())
}

/// Lists venues matching the query.
pub async fn list_venues<S: ConcertStore>(store: &S, query: VenuesQuery) -> ServerResult<Vec<Venue>> {
    let filter = VenueFilter::new()
        .with_name(query.name.as_deref())
        .with_city(query.city.as_deref())
        .with_state(query.state.as_deref())
        .with_country(query.country.as_deref());

    Ok(store.list_venues(filter).await?)
}

/// Creates a venue. (name, city, state) is unique ignoring case.
pub async fn create_venue<S: ConcertStore>(
    store: &S,
    req: CreateVenueRequest,
) -> ServerResult<Venue> {
    let capacity = parse_capacity(req.capacity)?;
    let venue = Venue::new(&req.name, &req.city, &req.state)
        .with_country(req.country.as_deref().unwrap_or_default())
        .with_address(req.address.as_deref().unwrap_or_default())
        .with_capacity(capacity);
    validate_venue(&venue)?;

    ensure_unique_venue(store, &venue).await?;

    let venue = store.create_venue(venue).await?;
    tracing::info!(venue_id = %venue.id, name = %venue.name, city = %venue.city, "Created venue");
    Ok(venue)
}

/// Updates a venue and returns the stored record.
pub async fn update_venue<S: ConcertStore>(
    store: &S,
    slug: &str,
    req: UpdateVenueRequest,
) -> ServerResult<Venue> {
    let capacity = parse_capacity(req.capacity)?;
    let mut venue = resolve_venue_slug(store, slug).await?;

    if let Some(name) = req.name {
        venue.name = normalize_name(&name);
    }
    if let Some(city) = req.city {
        venue.city = normalize_name(&city);
    }
    if let Some(state) = req.state {
        venue.state = normalize_name(&state);
    }
    if let Some(country) = req.country {
        venue = venue.with_country(&country);
    }
    if let Some(address) = req.address {
        venue = venue.with_address(&address);
    }
    if capacity.is_some() {
        venue.capacity = capacity;
    }
    validate_venue(&venue)?;

    ensure_unique_venue(store, &venue).await?;

    venue.updated_at = Utc::now();
    let venue = store.update_venue(venue).await?;
    tracing::info!(venue_id = %venue.id, "Updated venue");
    Ok(venue)
}

/// Deletes a venue that no show references.
pub async fn delete_venue<S: ConcertStore>(store: &S, slug: &str) -> ServerResult<MessageResponse> {
    let venue = resolve_venue_slug(store, slug).await?;

    let shows_count = store.count_shows_for_venue(venue.id).await?;
    if shows_count > 0 {
        return Err(ServerError::InUse {
            message: format!(
                "Cannot delete venue '{}': it is referenced by {shows_count} show(s)",
                venue.name
            ),
            shows_count,
        });
    }

    store.delete_venue(venue.id).await?;
    tracing::info!(venue_id = %venue.id, "Deleted venue");
    Ok(MessageResponse::new("Venue deleted successfully"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use concert_store::MemoryConcertStore;
    use entities::Show;

    use super::*;

    fn band_request(name: &str) -> CreateBandRequest {
        CreateBandRequest {
            band_name: name.to_string(),
            genre: Some("Jam".to_string()),
            description: None,
        }
    }

    fn venue_request(name: &str, city: &str, state: &str) -> CreateVenueRequest {
        CreateVenueRequest {
            name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            country: None,
            address: None,
            capacity: Some(9525),
        }
    }

    #[tokio::test]
    async fn test_band_names_are_unique_ignoring_case() {
        let store = MemoryConcertStore::new();
        let band = create_band(&store, band_request("  Phish ")).await.unwrap();
        assert_eq!(band.name, "phish");

        let dup = create_band(&store, band_request("PHISH")).await;
        assert!(matches!(dup, Err(ServerError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_band_slug_resolution() {
        let store = MemoryConcertStore::new();
        create_band(&store, band_request("Umphrey's McGee")).await.unwrap();
        create_band(&store, band_request("Blink-182")).await.unwrap();

        assert_eq!(
            resolve_band_slug(&store, "umphrey's-mcgee").await.unwrap().name,
            "umphrey's mcgee"
        );
        assert_eq!(
            resolve_band_slug(&store, "Blink-182").await.unwrap().name,
            "blink-182"
        );
        assert!(matches!(
            resolve_band_slug(&store, "nobody").await,
            Err(ServerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_band_rename_conflict() {
        let store = MemoryConcertStore::new();
        create_band(&store, band_request("Goose")).await.unwrap();
        create_band(&store, band_request("Phish")).await.unwrap();

        let rename = update_band(
            &store,
            "goose",
            UpdateBandRequest {
                band_name: Some("phish".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(rename, Err(ServerError::Conflict(_))));

        let same_name = update_band(
            &store,
            "goose",
            UpdateBandRequest {
                band_name: Some("GOOSE".to_string()),
                genre: Some("Rock".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(same_name.genre, "Rock");
    }

    #[tokio::test]
    async fn test_venue_identity_conflict() {
        let store = MemoryConcertStore::new();
        let venue = create_venue(&store, venue_request("Red Rocks", "Morrison", "CO"))
            .await
            .unwrap();
        assert_eq!(venue.country, "usa");
        assert_eq!(venue.capacity, Some(9525));

        let dup = create_venue(&store, venue_request("red rocks ", "MORRISON", "co")).await;
        assert!(matches!(dup, Err(ServerError::Conflict(_))));

        let elsewhere = create_venue(&store, venue_request("Red Rocks", "Denver", "CO")).await;
        assert!(elsewhere.is_ok());
    }

    #[tokio::test]
    async fn test_venue_validation() {
        let store = MemoryConcertStore::new();

        let mut negative = venue_request("Red Rocks", "Morrison", "CO");
        negative.capacity = Some(-1);
        assert!(matches!(
            create_venue(&store, negative).await,
            Err(ServerError::InvalidRequest(_))
        ));

        let long_name = venue_request(&"x".repeat(101), "Morrison", "CO");
        assert!(matches!(
            create_venue(&store, long_name).await,
            Err(ServerError::InvalidRequest(_))
        ));

        let no_city = venue_request("Red Rocks", " ", "CO");
        assert!(matches!(
            create_venue(&store, no_city).await,
            Err(ServerError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_update_venue_returns_stored_record() {
        let store = MemoryConcertStore::new();
        create_venue(&store, venue_request("Red Rocks", "Morrison", "CO"))
            .await
            .unwrap();

        let updated = update_venue(
            &store,
            "red-rocks",
            UpdateVenueRequest {
                address: Some("18300 W Alameda Pkwy".to_string()),
                capacity: Some(9545),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.capacity, Some(9545));
        let stored = store.get_venue(updated.id).await.unwrap().unwrap();
        assert_eq!(stored.address, "18300 W Alameda Pkwy");
    }

    #[tokio::test]
    async fn test_delete_referenced_venue_reports_count() {
        let store = MemoryConcertStore::new();
        let band = create_band(&store, band_request("Goose")).await.unwrap();
        let venue = create_venue(&store, venue_request("Red Rocks", "Morrison", "CO"))
            .await
            .unwrap();
        let empty = create_venue(&store, venue_request("The Capitol", "Port Chester", "NY"))
            .await
            .unwrap();
        for day in [20, 21] {
            let date = Utc.with_ymd_and_hms(2024, 6, day, 19, 0, 0).unwrap();
            store
                .create_show(Show::new(band.id, venue.id, date))
                .await
                .unwrap();
        }

        match delete_venue(&store, "red-rocks").await {
            Err(ServerError::InUse { shows_count, .. }) => assert_eq!(shows_count, 2),
            other => panic!("expected InUse, got {other:?}"),
        }
        assert!(matches!(
            delete_band(&store, "goose").await,
            Err(ServerError::InUse { shows_count: 2, .. })
        ));

        delete_venue(&store, "the-capitol").await.unwrap();
        assert!(store.get_venue(empty.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_venues_filters() {
        let store = MemoryConcertStore::new();
        create_venue(&store, venue_request("Brooklyn Steel", "Brooklyn", "NY"))
            .await
            .unwrap();
        create_venue(&store, venue_request("Red Rocks", "Morrison", "CO"))
            .await
            .unwrap();

        let ny = list_venues(
            &store,
            VenuesQuery {
                state: Some("NY".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ny.len(), 1);
        assert_eq!(ny[0].city, "brooklyn");
    }
}
