use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::warn;

use crate::state::AppState;


/// Transparent 1x1 GIF served for every pixel request.
pub const TRANSPARENT_GIF: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

#[derive(Debug, Default, Deserialize)]
pub struct TrackingQuery {
    pub id: Option<String>,
}

/// Serves the tracking pixel. Never fails towards the mail client.
pub async fn tracking_pixel_handler(
    State(state): State<AppState>,
    Query(query): Query<TrackingQuery>,
) -> Response {
    let pixel_id = query.id.unwrap_or_default();
    if let Err(error) = state.invitation_service.record_open(&pixel_id).await {
        warn!(%error, "failed to record invitation open");
    }

    (
        [
            (header::CONTENT_TYPE, "image/gif"),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, private",
            ),
            (header::PRAGMA, "no-cache"),
        ],
        TRANSPARENT_GIF,
    )
        .into_response()
}

/// Records the click and redirects; unknown ids land on the public site.
pub async fn tracking_click_handler(
    State(state): State<AppState>,
    Query(query): Query<TrackingQuery>,
) -> Redirect {
    let click_id = query.id.unwrap_or_default();
    match state.invitation_service.record_click(&click_id).await {
        Ok(resolution) => Redirect::temporary(&resolution.destination),
        Err(error) => {
            warn!(%error, "failed to record invitation click");
            Redirect::temporary(&state.frontend_url)
        }
    }
}
