//! Last known whereabout per user.
//!
//! Writes are last-write-wins per key (user id, else user name). Name lookup
//! only scans the most recently updated `lookup_window` rows, so an old fact
//! can be unreachable even when it is the only match.

use super::{from_millis, to_millis, Store};
use chrono::Utc;
use tracing::debug;
use wheredunno_core::{error::WhereError, fact::WhereaboutFact};

type WhereaboutRow = (Option<String>, String, String, String, i64);

fn row_to_fact(
    (user_id, user_name, whereabout, raw_message, updated_at_ms): WhereaboutRow,
) -> Result<WhereaboutFact, WhereError> {
    Ok(WhereaboutFact {
        user_id,
        user_name,
        whereabout,
        raw_message,
        updated_at: Some(from_millis(updated_at_ms)?),
    })
}

impl Store {
    /// Write or overwrite a user's whereabout. Returns the stored fact.
    pub async fn upsert_whereabout(
        &self,
        user_id: Option<&str>,
        user_name: &str,
        whereabout: &str,
        raw_message: &str,
    ) -> Result<WhereaboutFact, WhereError> {
        let mut fact = WhereaboutFact {
            user_id: user_id.map(str::to_string),
            user_name: user_name.to_string(),
            whereabout: whereabout.to_string(),
            raw_message: raw_message.to_string(),
            updated_at: None,
        };
        let updated_at_ms = to_millis(Utc::now());

        sqlx::query(
            "INSERT INTO user_whereabouts (key, user_id, user_name, whereabout, raw_message, updated_at_ms) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET \
                 user_id = excluded.user_id, \
                 user_name = excluded.user_name, \
                 whereabout = excluded.whereabout, \
                 raw_message = excluded.raw_message, \
                 updated_at_ms = excluded.updated_at_ms",
        )
        .bind(fact.key())
        .bind(&fact.user_id)
        .bind(&fact.user_name)
        .bind(&fact.whereabout)
        .bind(&fact.raw_message)
        .bind(updated_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| WhereError::Memory(format!("upsert whereabout failed: {e}")))?;

        debug!("whereabout for {user_name}: {whereabout}");
        fact.updated_at = Some(from_millis(updated_at_ms)?);
        Ok(fact)
    }

    /// The most recently updated whereabouts, newest first.
    pub async fn recent_whereabouts(&self, limit: u32) -> Result<Vec<WhereaboutFact>, WhereError> {
        let rows: Vec<WhereaboutRow> = sqlx::query_as(
            "SELECT user_id, user_name, whereabout, raw_message, updated_at_ms \
             FROM user_whereabouts ORDER BY updated_at_ms DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WhereError::Memory(format!("query whereabouts failed: {e}")))?;

        rows.into_iter().map(row_to_fact).collect()
    }

    /// Find the most recent whereabout whose user name contains `query`
    /// (case-insensitive), within the lookup window.
    pub async fn find_whereabout_by_name(
        &self,
        query: &str,
    ) -> Result<Option<WhereaboutFact>, WhereError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }

        let window = self.recent_whereabouts(self.lookup_window).await?;
        Ok(window
            .into_iter()
            .find(|fact| fact.user_name.to_lowercase().contains(&needle)))
    }
}
