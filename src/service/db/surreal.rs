//! SurrealDB implementation for support-desk ticket storage.
//!
//! Tickets live in the `ticket` table keyed by integer record IDs. IDs come from
//! the `counter:ticket` record, which is bumped by `UPSERT`. Bumps from one
//! client are serialized, since concurrent writes to the same record conflict.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    types::{NewTicket, OPEN_STATUS, Res, Ticket, TicketFilter, TicketPatch, TicketStats},
};

use super::{DbClient, GenericDbClient, average_per_day};

/// Projection that flattens the record ID into the integer ticket ID.
const TICKET_FIELDS: &str = "record::id(id) AS id, title, description, category, priority, status, created_at";

const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS ticket SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS counter SCHEMALESS;
"#;

const NEXT_ID_QUERY: &str = "UPSERT counter:ticket SET last_id = (last_id OR 0) + 1;";

const STATS_QUERY: &str = r#"
    SELECT count() AS total FROM ticket GROUP ALL;
    SELECT count() AS total FROM ticket WHERE status = $open GROUP ALL;
    SELECT string::slice(<string> created_at, 0, 10) AS day, count() AS total FROM ticket GROUP BY day;
    SELECT priority, count() AS total FROM ticket GROUP BY priority;
    SELECT category, count() AS total FROM ticket GROUP BY category;
"#;

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Connects to the SurrealDB instance described by the configuration.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let credentials = config.db_username.as_deref().zip(config.db_password.as_deref());
        let client = SurrealDbClient::connect(&config.db_endpoint, credentials, &config.db_namespace, &config.db_database).await?;

        Ok(Self::new(Arc::new(client)))
    }

    /// Creates a fresh, empty in-memory database.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::connect("mem://", None, "support", "desk").await?;

        Ok(Self::new(Arc::new(client)))
    }
}

// Records.

/// The stored shape of a ticket; the ID lives in the record key.
#[derive(Debug, Serialize)]
struct TicketRecord {
    title: String,
    description: String,
    category: String,
    priority: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TicketRecord {
    fn new(ticket: &NewTicket, created_at: DateTime<Utc>) -> Self {
        Self {
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            category: ticket.category.clone(),
            priority: ticket.priority.clone(),
            status: ticket.status.clone(),
            created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CounterRow {
    last_id: i64,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// One row of a `GROUP BY` count.
#[derive(Debug, Deserialize)]
struct GroupRow {
    #[serde(alias = "day", alias = "priority", alias = "category")]
    key: String,
    total: u64,
}

// Specific implementations.

/// SurrealDB client implementation.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
    create_lock: Arc<Mutex<()>>,
}

impl SurrealDbClient {
    /// Connect to `endpoint` (`mem://`, `ws://host:port`, ...) and prepare the schema.
    #[instrument(name = "SurrealDbClient::connect", skip(credentials))]
    pub async fn connect(endpoint: &str, credentials: Option<(&str, &str)>, namespace: &str, database: &str) -> Res<Self> {
        let db = any::connect(endpoint).await?;

        if let Some((username, password)) = credentials {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns(namespace).use_db(database).await?;
        db.query(SCHEMA).await?.check()?;

        info!("Database initialized successfully.");

        Ok(Self {
            db,
            create_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Allocate the next ticket ID; callers hold `create_lock`.
    async fn next_ticket_id(&self) -> Res<i64> {
        let mut response = self.db.query(NEXT_ID_QUERY).await?;
        let counter: Option<CounterRow> = response.take(0)?;

        counter.map(|c| c.last_id).ok_or_else(|| anyhow!("Failed to allocate a ticket ID."))
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(name = "SurrealDbClient::list_tickets", skip(self))]
    async fn list_tickets(&self, filter: &TicketFilter) -> Res<Vec<Ticket>> {
        let mut conditions = Vec::new();

        if filter.category.is_some() {
            conditions.push("category = $category");
        }
        if filter.priority.is_some() {
            conditions.push("priority = $priority");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.search.is_some() {
            conditions.push("(string::contains(string::lowercase(title), $search) OR string::contains(string::lowercase(description), $search))");
        }

        let mut sql = format!("SELECT {TICKET_FIELDS} FROM ticket");

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        // IDs are assigned in creation order.
        sql.push_str(" ORDER BY id DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = filter.offset {
            sql.push_str(&format!(" START {offset}"));
        }

        debug!("List query: {sql}");

        let mut query = self.db.query(sql);

        if let Some(category) = &filter.category {
            query = query.bind(("category", category.clone()));
        }
        if let Some(priority) = &filter.priority {
            query = query.bind(("priority", priority.clone()));
        }
        if let Some(status) = &filter.status {
            query = query.bind(("status", status.clone()));
        }
        if let Some(search) = &filter.search {
            query = query.bind(("search", search.to_lowercase()));
        }

        let mut response = query.await?;
        let tickets: Vec<Ticket> = response.take(0)?;

        info!("Listed {} tickets.", tickets.len());

        Ok(tickets)
    }

    #[instrument(name = "SurrealDbClient::get_ticket", skip(self))]
    async fn get_ticket(&self, id: i64) -> Res<Option<Ticket>> {
        let mut response = self
            .db
            .query(format!("SELECT {TICKET_FIELDS} FROM type::thing('ticket', $id);"))
            .bind(("id", id))
            .await?;

        Ok(response.take(0)?)
    }

    #[instrument(name = "SurrealDbClient::create_ticket", skip(self, ticket))]
    async fn create_ticket(&self, ticket: &NewTicket, created_at: DateTime<Utc>) -> Res<Ticket> {
        let guard = self.create_lock.lock().await;
        let id = self.next_ticket_id().await?;

        self.db
            .query("CREATE type::thing('ticket', $id) CONTENT $ticket RETURN NONE;")
            .bind(("id", id))
            .bind(("ticket", TicketRecord::new(ticket, created_at)))
            .await?
            .check()?;
        drop(guard);

        info!("Ticket `{id}` created.");

        self.get_ticket(id).await?.ok_or_else(|| anyhow!("Ticket `{id}` missing after creation."))
    }

    #[instrument(name = "SurrealDbClient::update_ticket", skip(self, patch))]
    async fn update_ticket(&self, id: i64, patch: &TicketPatch) -> Res<Option<Ticket>> {
        if self.get_ticket(id).await?.is_none() {
            info!("Ticket `{id}` not found.");
            return Ok(None);
        }

        if !patch.is_empty() {
            self.db
                .query("UPDATE type::thing('ticket', $id) MERGE $patch RETURN NONE;")
                .bind(("id", id))
                .bind(("patch", patch.clone()))
                .await?
                .check()?;

            info!("Ticket `{id}` updated.");
        }

        self.get_ticket(id).await
    }

    #[instrument(name = "SurrealDbClient::get_ticket_stats", skip(self))]
    async fn get_ticket_stats(&self) -> Res<TicketStats> {
        let mut response = self.db.query(STATS_QUERY).bind(("open", OPEN_STATUS)).await?;

        let total: Option<CountRow> = response.take(0)?;
        let open: Option<CountRow> = response.take(1)?;
        let days: Vec<GroupRow> = response.take(2)?;
        let priorities: Vec<GroupRow> = response.take(3)?;
        let categories: Vec<GroupRow> = response.take(4)?;

        let day_counts = days.iter().map(|row| row.total).collect::<Vec<_>>();

        Ok(TicketStats {
            total_tickets: total.map(|row| row.total).unwrap_or_default(),
            open_tickets: open.map(|row| row.total).unwrap_or_default(),
            avg_tickets_per_day: average_per_day(&day_counts),
            priority_breakdown: priorities.into_iter().map(|row| (row.key, row.total)).collect(),
            category_breakdown: categories.into_iter().map(|row| (row.key, row.total)).collect(),
        })
    }
}

// Tests.
