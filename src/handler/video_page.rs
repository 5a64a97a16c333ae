//! Video player page handler
//!
//! `GET /emergency-videos/{video_id}` answers with a small HTML page whose
//! `<video>` element points at the static URL of the stored file. The
//! video bytes themselves are fetched by the browser from the static
//! prefix.

use crate::error::VideoError;
use crate::handler::router::{RequestContext, STATIC_PREFIX};
use crate::http::{self, HttpResponse};
use crate::logger;
use crate::storage::{decode_segment, VideoStore};

pub async fn serve_video_page(
    ctx: &RequestContext<'_>,
    raw_video_id: &str,
    store: &VideoStore,
) -> Result<HttpResponse, VideoError> {
    let video_id = decode_segment(raw_video_id).ok_or(VideoError::VideoNotFound)?;
    let file_name = VideoStore::normalize(&video_id);

    if !store.exists(&file_name).await {
        logger::log_video_not_found(&file_name);
        return Err(VideoError::VideoNotFound);
    }

    Ok(http::build_html_response(
        render_player_page(&file_name),
        ctx.is_head,
    ))
}

/// HTML page embedding the stored video
pub fn render_player_page(file_name: &str) -> String {
    format!(
        r#"
    <html>
        <video width="640" height="480" controls>
          <source src="{STATIC_PREFIX}{file_name}" type="video/mp4">
          Your browser does not support the video tag.
        </video>
    </html>
    "#
    )
}
