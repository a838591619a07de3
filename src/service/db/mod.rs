use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::base::types::{NewTicket, Res, Ticket, TicketFilter, TicketPatch, TicketStats};

pub mod surreal;

// Traits.

/// Generic database client trait that clients must implement.
///
/// This trait defines the core functionality for storing, retrieving, and
/// aggregating tickets. Implementing this trait allows different database
/// backends to be used with support-desk.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Lists tickets matching the filter, newest first.
    async fn list_tickets(&self, filter: &TicketFilter) -> Res<Vec<Ticket>>;

    /// Gets a ticket by its ID.
    async fn get_ticket(&self, id: i64) -> Res<Option<Ticket>>;

    /// Persists a new ticket, assigning the next ID.
    ///
    /// `created_at` is recorded as given and never changes afterwards.
    async fn create_ticket(&self, ticket: &NewTicket, created_at: DateTime<Utc>) -> Res<Ticket>;

    /// Applies the fields present in `patch` to a ticket.
    ///
    /// Returns `None`, and changes nothing, if the ticket does not exist.
    async fn update_ticket(&self, id: i64, patch: &TicketPatch) -> Res<Option<Ticket>>;

    /// Computes aggregate statistics over all tickets.
    async fn get_ticket_stats(&self) -> Res<TicketStats>;
}

/// Database client for support-desk.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    /// The database client instance.
    pub inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}

// Helpers.

/// Mean of per-day ticket counts, rounded to two decimals; `0` with no days.
pub fn average_per_day(day_counts: &[u64]) -> f64 {
    if day_counts.is_empty() {
        return 0.0;
    }

    let total: u64 = day_counts.iter().sum();
    let mean = total as f64 / day_counts.len() as f64;

    (mean * 100.0).round() / 100.0
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_per_day_empty_is_zero() {
        assert_eq!(average_per_day(&[]), 0.0);
    }

    #[test]
    fn test_average_per_day_rounds_to_two_decimals() {
        assert_eq!(average_per_day(&[1, 1, 2]), 1.33);
        assert_eq!(average_per_day(&[2, 3, 3]), 2.67);
        assert_eq!(average_per_day(&[4]), 4.0);
    }
}
