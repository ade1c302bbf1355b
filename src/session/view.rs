//! List-item projection of records
//!
//! While a record is being read its label and description carry the page
//! text; otherwise (or in hidden mode) it looks like a plain commit.

use serde::Serialize;

use super::types::{ReadingSession, Record, RecordId};

/// Label shown instead of the message while reading
pub const READING_LABEL: &str = "📖";

/// Icon hint for the list UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Commit,
    Book,
}

/// What the list UI renders for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    pub id: RecordId,
    pub label: String,
    pub description: String,
    pub icon: Icon,
}

impl RecordView {
    pub fn project(record: &Record, session: Option<&ReadingSession>, hidden: bool) -> Self {
        let reading = session.filter(|s| s.is_active && !hidden);

        match reading {
            Some(session) => Self {
                id: record.id.clone(),
                label: READING_LABEL.to_string(),
                description: format!(
                    "{} ({}/{})",
                    session.visible_text, session.current_page, session.total_pages
                ),
                icon: Icon::Book,
            },
            None => Self {
                id: record.id.clone(),
                label: record.message.clone(),
                description: format!("{} - {}", record.author, record.date.format("%Y-%m-%d")),
                icon: Icon::Commit,
            },
        }
    }
}
