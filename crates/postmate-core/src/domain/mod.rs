//! Domain entities - posts, their lifecycle, and classified conversation input.

mod intent;
mod lifecycle;
mod post;
mod schedule;

pub use intent::Intent;
pub use lifecycle::{TransitionError, Trigger};
pub use post::{MAX_TOPIC_LEN, Post, PostState, PostStatus, PostType, ReviewStep};
pub use schedule::{DEFAULT_PUBLISH_DELAY_MINUTES, SchedulingToken, default_publish_time};
