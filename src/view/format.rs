//! Labels and grouping rules for the message list.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Message, Profile};

/// Divider text above a day group.
pub fn date_divider_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if Some(date) == today.pred_opt() {
        "Yesterday".to_string()
    } else {
        date.format("%B %-d, %Y").to_string()
    }
}

/// Timestamp shown next to an author name.
pub fn message_time_label(at: NaiveDateTime, today: NaiveDate) -> String {
    let date = at.date();
    if date == today {
        at.format("%-I:%M %p").to_string()
    } else if Some(date) == today.pred_opt() {
        format!("Yesterday at {}", at.format("%-I:%M %p"))
    } else {
        at.format("%b %-d, %-I:%M %p").to_string()
    }
}

/// Header of the thread panel, e.g. "3 replies".
pub fn reply_count_label(count: usize) -> String {
    if count == 1 {
        "1 reply".to_string()
    } else {
        format!("{} replies", count)
    }
}

/// The author header repeats only when the author changes within a group.
pub fn shows_author(previous: Option<&Message>, current: &Message) -> bool {
    previous.map_or(true, |prev| prev.user_id != current.user_id)
}

pub fn author_name(profile: Option<&Profile>) -> &str {
    profile.map_or("Unknown", |p| p.username.as_str())
}
