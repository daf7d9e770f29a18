use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ItemId);

/// Who assigned an item's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemOrigin {
    #[default]
    Remote,
    /// Synthesized on this client after the remote store could not (or would
    /// not) hand out a usable id. The remote store does not know these ids.
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub origin: ItemOrigin,
}

impl Item {
    pub fn new(
        id: ItemId,
        title: impl Into<String>,
        description: impl Into<String>,
        origin: ItemOrigin,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            origin,
        }
    }

    pub fn is_local(&self) -> bool {
        self.origin == ItemOrigin::Local
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("title is {len} characters, at most {max} allowed", max = MAX_TITLE_LEN)]
    TitleTooLong { len: usize },
    #[error(
        "description is {len} characters, at most {max} allowed",
        max = MAX_DESCRIPTION_LEN
    )]
    DescriptionTooLong { len: usize },
}

/// Title and description of an item that has no id yet, or the replacement
/// fields for an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    title: String,
    description: String,
}

impl ItemDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DraftError> {
        let title = title.into().trim().to_string();
        let description = description.into().trim().to_string();

        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if description.is_empty() {
            return Err(DraftError::EmptyDescription);
        }

        let title_len = title.chars().count();
        if title_len > MAX_TITLE_LEN {
            return Err(DraftError::TitleTooLong { len: title_len });
        }
        let description_len = description.chars().count();
        if description_len > MAX_DESCRIPTION_LEN {
            return Err(DraftError::DescriptionTooLong {
                len: description_len,
            });
        }

        Ok(Self { title, description })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn into_item(self, id: ItemId, origin: ItemOrigin) -> Item {
        Item {
            id,
            title: self.title,
            description: self.description,
            origin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Sorts by id in place. Ids are unique, so the result does not depend on
    /// the prior order.
    pub fn apply(self, items: &mut [Item]) {
        match self {
            SortOrder::Ascending => items.sort_by(|a, b| a.id.cmp(&b.id)),
            SortOrder::Descending => items.sort_by(|a, b| b.id.cmp(&a.id)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("asc"),
            SortOrder::Descending => f.write_str("desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order '{0}', expected asc or desc")]
pub struct SortOrderParseError(pub String);

impl FromStr for SortOrder {
    type Err = SortOrderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(SortOrderParseError(s.to_string())),
        }
    }
}
