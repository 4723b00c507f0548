use crate::post::Post;
use crate::text_utils::format_post_date;

pub mod list_renderer;
pub mod post_renderer;
pub mod page_renderer;
pub mod schedule_renderer;
pub mod rss_renderer;

/// Normalized date for display; free-form text that never parsed is shown
/// as written.
pub(crate) fn display_date(post: &Post) -> String {
    match post.parsed_date() {
        Some(date) => format_post_date(&date),
        None => post.date.clone(),
    }
}
