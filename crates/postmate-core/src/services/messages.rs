//! Outbound message bodies.

use chrono::{DateTime, Utc};

use crate::domain::{PostType, SchedulingToken};

pub fn draft_menu(topic: &str, draft: &str, post_type: PostType) -> String {
    format!(
        "📝 *New Post Created!*\n\n\
         *Topic:* {topic}\n\
         *Type:* {post_type}\n\n\
         *Draft:*\n{draft}\n\n\
         Reply with:\n\
         • *1* to approve and schedule\n\
         • *0* to reject\n\
         • *2* to regenerate draft\n\
         • *3* to submit with changes (type '3 [your modified draft]')"
    )
}

pub fn scheduling_menu(topic: &str) -> String {
    format!(
        "⏰ *When should this be published?*\n\n\
         *Topic:* {topic}\n\n\
         Reply with one of:\n\
         • *now* - within a minute\n\
         • *1h* - in 1 hour\n\
         • *4h* - in 4 hours\n\
         • *12h* - in 12 hours\n\
         • *1d* - tomorrow\n\
         • *2d* - in 2 days\n\
         • *1w* - next week"
    )
}

pub fn post_type_help() -> String {
    let types = PostType::ALL
        .iter()
        .map(|t| format!("• *{t}*"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "📚 *Post Types*\n\n\
         {types}\n\n\
         Send a topic to create an educational post, or prefix it with a type:\n\
         *listicle: 5 habits of productive teams*"
    )
}

pub fn scheduled(topic: &str, scheduled_at: DateTime<Utc>) -> String {
    format!(
        "✅ *Post Scheduled!*\n\n\
         *Topic:* {topic}\n\n\
         *Scheduled Time:* {} UTC\n\n\
         Your post will be published automatically at the scheduled time.",
        scheduled_at.format("%d/%m/%Y %H:%M")
    )
}

pub fn rejected(topic: &str) -> String {
    format!(
        "❌ *Post Rejected*\n\nTopic: {topic}\n\n\
         Your post has been rejected. You can create a new one anytime."
    )
}

pub fn published(topic: &str) -> String {
    format!(
        "🚀 *Post Published!*\n\nTopic: {topic}\n\n\
         Your post has been successfully published on LinkedIn!"
    )
}

pub fn edit_instructions() -> String {
    "📝 *Submit with Changes*\n\n\
     Please type your modified draft in the following format:\n\n\
     *3 [your modified draft here]*\n\n\
     Example:\n\
     *3 This is my modified version of the post with my own changes.*"
        .to_string()
}

pub fn empty_edit() -> String {
    "❌ Please provide your modified draft. Format: *3 [your modified draft here]*".to_string()
}

pub fn no_active_post() -> String {
    "❌ No pending posts found. Please create a new post first.".to_string()
}

pub fn invalid_schedule() -> String {
    let options = SchedulingToken::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("❌ Invalid scheduling option. Please use one of: {options}")
}

pub fn schedule_not_requested() -> String {
    "ℹ️ Reply *1* to approve the draft before choosing when to publish it.".to_string()
}

pub fn already_scheduled(topic: &str, scheduled_at: Option<DateTime<Utc>>) -> String {
    match scheduled_at {
        Some(at) => format!(
            "ℹ️ *{topic}* is already scheduled for {} UTC. Send a new topic to start another post.",
            at.format("%d/%m/%Y %H:%M")
        ),
        None => format!("ℹ️ *{topic}* can no longer be changed. Send a new topic to start another post."),
    }
}

pub fn generation_failed(topic: &str) -> String {
    format!(
        "❌ Sorry, I couldn't generate a draft for your topic: {topic}\n\n\
         Please try again with a different topic."
    )
}

pub fn regeneration_failed() -> String {
    "❌ Sorry, I couldn't regenerate the draft. Please try again.".to_string()
}

pub fn invalid_topic(reason: &str) -> String {
    format!("❌ {reason}. Please send a different topic.")
}

pub fn post_changed() -> String {
    "⚠️ This post was updated by another action. Please check the latest message and try again."
        .to_string()
}

pub fn internal_failure() -> String {
    "❌ Sorry, there was an error processing your request. Please try again.".to_string()
}
