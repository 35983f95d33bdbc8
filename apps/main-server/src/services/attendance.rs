//! Show attendance records. Only the owning user may read, change or delete
//! a record.

use api_protocol::{AttendShowRequest, MessageResponse, UpdateAttendanceRequest};
use chrono::Utc;
use concert_store::ConcertStore;
use entities::{is_valid_rating, AttendanceDetail, ShowAttendance, MAX_RATING, MIN_RATING};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::services::validation::max_length;

pub const MAX_FAVORITE_SONG_LEN: usize = 200;
pub const MAX_ATTENDANCE_NOTES_LEN: usize = 2000;

fn validate_fields(
    rating: Option<f64>,
    favorite_song: Option<&str>,
    notes: Option<&str>,
) -> ServerResult<()> {
    if let Some(rating) = rating {
        if !is_valid_rating(rating) {
            return Err(ServerError::InvalidRequest(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
    }
    if let Some(song) = favorite_song {
        max_length("favorite_song", song, MAX_FAVORITE_SONG_LEN)?;
    }
    if let Some(notes) = notes {
        max_length("notes", notes, MAX_ATTENDANCE_NOTES_LEN)?;
    }
    Ok(())
}

async fn load_detail<S: ConcertStore>(store: &S, id: Uuid) -> ServerResult<AttendanceDetail> {
    store
        .get_attendance_detail(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Attendance record not found".to_string()))
}

/// Loads an attendance record and checks that `user_id` owns it.
async fn load_owned<S: ConcertStore>(
    store: &S,
    user_id: Uuid,
    id: Uuid,
) -> ServerResult<ShowAttendance> {
    let attendance = store
        .get_attendance(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Attendance record not found".to_string()))?;

    if !attendance.is_owned_by(user_id) {
        tracing::warn!(
            attendance_id = %id,
            user_id = %user_id,
            "Rejected access to another user's attendance"
        );
        return Err(ServerError::PermissionDenied(
            "You can only modify your own attendance records".to_string(),
        ));
    }
    Ok(attendance)
}

/// Records that the user attended a show.
pub async fn attend_show<S: ConcertStore>(
    store: &S,
    user_id: Uuid,
    show_id: Uuid,
    req: AttendShowRequest,
) -> ServerResult<AttendanceDetail> {
    validate_fields(req.rating, req.favorite_song.as_deref(), req.notes.as_deref())?;

    // A token can outlive the account it was issued for.
    if store.get_user(user_id).await?.is_none() {
        return Err(ServerError::NotFound("User not found".to_string()));
    }
    if store.get_show(show_id).await?.is_none() {
        return Err(ServerError::NotFound("Show not found".to_string()));
    }
    if store.find_attendance(user_id, show_id).await?.is_some() {
        return Err(ServerError::Conflict(
            "You have already recorded attendance for this show".to_string(),
        ));
    }

    let mut attendance = ShowAttendance::new(user_id, show_id);
    attendance.attended = req.attended.unwrap_or(true);
    attendance.rating = req.rating;
    attendance.favorite_song = req.favorite_song.unwrap_or_default();
    attendance.notes = req.notes.unwrap_or_default();

    let attendance = store.create_attendance(attendance).await?;
    tracing::info!(
        attendance_id = %attendance.id,
        show_id = %show_id,
        user_id = %user_id,
        "Recorded attendance"
    );

    load_detail(store, attendance.id).await
}

/// Lists the user's attendance records, most recent show first.
pub async fn list_attendances<S: ConcertStore>(
    store: &S,
    user_id: Uuid,
) -> ServerResult<Vec<AttendanceDetail>> {
    Ok(store.list_attendances_for_user(user_id).await?)
}

/// Fetches one of the user's attendance records.
pub async fn get_attendance<S: ConcertStore>(
    store: &S,
    user_id: Uuid,
    id: Uuid,
) -> ServerResult<AttendanceDetail> {
    load_owned(store, user_id, id).await?;
    load_detail(store, id).await
}

/// Updates one of the user's attendance records. Only provided fields
/// change.
pub async fn update_attendance<S: ConcertStore>(
    store: &S,
    user_id: Uuid,
    id: Uuid,
    req: UpdateAttendanceRequest,
) -> ServerResult<AttendanceDetail> {
    let mut attendance = load_owned(store, user_id, id).await?;

    validate_fields(req.rating, req.favorite_song.as_deref(), req.notes.as_deref())?;

    if let Some(attended) = req.attended {
        attendance.attended = attended;
    }
    if let Some(rating) = req.rating {
        attendance.rating = Some(rating);
    }
    if let Some(song) = req.favorite_song {
        attendance.favorite_song = song;
    }
    if let Some(notes) = req.notes {
        attendance.notes = notes;
    }
    attendance.updated_at = Utc::now();

    store.update_attendance(attendance).await?;
    tracing::info!(attendance_id = %id, "Updated attendance");

    load_detail(store, id).await
}

/// Deletes one of the user's attendance records.
pub async fn delete_attendance<S: ConcertStore>(
    store: &S,
    user_id: Uuid,
    id: Uuid,
) -> ServerResult<MessageResponse> {
    load_owned(store, user_id, id).await?;

    store.delete_attendance(id).await?;
    tracing::info!(attendance_id = %id, "Deleted attendance");

    Ok(MessageResponse::new("Attendance record deleted successfully"))
}
