use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

/// Tag row joined through `quiz_tags`, carrying the owning quiz for grouping.
#[derive(Debug, Clone, FromRow)]
pub struct QuizTagRow {
    pub quiz_id: i32,
    pub id: i32,
    pub name: String,
}

impl From<QuizTagRow> for Tag {
    fn from(row: QuizTagRow) -> Self {
        Tag {
            id: row.id,
            name: row.name,
        }
    }
}
