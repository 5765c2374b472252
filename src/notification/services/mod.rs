//! Application services for notification composition and the feed.

pub mod compose;
mod feed;

pub use feed::{FeedError, FeedProjection, FeedResult, NotificationFeedService};
