use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Allowed values.

/// Ticket categories accepted on write, and offered to the classifier.
pub const CATEGORIES: [&str; 4] = ["billing", "technical", "account", "general"];

/// Ticket priorities accepted on write, and offered to the classifier.
pub const PRIORITIES: [&str; 4] = ["low", "medium", "high", "critical"];

/// Ticket lifecycle states accepted on write.
pub const STATUSES: [&str; 4] = ["open", "in_progress", "resolved", "closed"];

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_PRIORITY: &str = "medium";
pub const DEFAULT_STATUS: &str = "open";

/// The status counted by `open_tickets` in [`TicketStats`].
pub const OPEN_STATUS: &str = "open";

pub const TITLE_MAX_CHARS: usize = 200;

// Tickets.

/// A persisted support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Store-assigned identifier; never changes.
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    /// Assigned at creation; never changes.
    pub created_at: DateTime<Utc>,
}

/// A validated ticket that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
}

impl NewTicket {
    /// Create a ticket with the default category, priority, and status.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: DEFAULT_CATEGORY.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

/// A set of field replacements for an existing ticket.
///
/// Absent fields are left untouched, and are not serialized, so the patch can be
/// merged into a stored record as-is.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

impl TicketPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Filters and paging for listing tickets.
///
/// `category`, `priority`, and `status` are exact matches; `search` is a
/// case-insensitive substring match over title and description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TicketFilter {
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl TicketFilter {
    /// Drop empty filter values, which mean "no filter".
    pub fn normalized(self) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            category: non_empty(self.category),
            priority: non_empty(self.priority),
            status: non_empty(self.status),
            search: non_empty(self.search),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

// Aggregates.

/// Aggregate statistics over the whole ticket table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketStats {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub avg_tickets_per_day: f64,
    pub priority_breakdown: BTreeMap<String, u64>,
    pub category_breakdown: BTreeMap<String, u64>,
}

// Classification.

/// An advisory category/priority suggestion for a ticket description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggested_category: Option<String>,
    pub suggested_priority: Option<String>,
}
