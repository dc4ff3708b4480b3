//! Whereabouts pipeline: every new room message is checked for a
//! self-report and for a "where is X?" question.

use super::responder::PendingQuestion;
use super::Gateway;
use crate::detect::{detect_query, detect_whereabout_in};
use tracing::{debug, warn};
use wheredunno_core::{fact::WhereaboutFact, message::ChatMessage};

/// The assistant's answer for a known whereabout.
pub fn render_response(fact: &WhereaboutFact) -> String {
    format!(
        "Berdasarkan maklumat yang saya ada, {} menyebut bahawa dia {}.",
        fact.user_name, fact.whereabout
    )
}

impl Gateway {
    /// Record self-reports and queue answers for known whereabouts.
    ///
    /// Never fails; store errors are logged and the message is left alone.
    pub(super) async fn track_whereabouts(&self, message: &ChatMessage) {
        if let Some(fact) = detect_whereabout_in(message) {
            match self
                .store
                .upsert_whereabout(
                    fact.user_id.as_deref(),
                    &fact.user_name,
                    &fact.whereabout,
                    &fact.raw_message,
                )
                .await
            {
                Ok(stored) => debug!("pipeline: {} is at {}", stored.user_name, stored.whereabout),
                Err(e) => warn!("pipeline: failed to store whereabout: {e}"),
            }
        }

        let Some(query) = detect_query(Some(&message.text), &message.user_id) else {
            return;
        };

        let fact = match self.store.find_whereabout_by_name(&query.target_user).await {
            Ok(Some(fact)) => fact,
            Ok(None) => {
                debug!("pipeline: nothing known about {}", query.target_user);
                return;
            }
            Err(e) => {
                warn!("pipeline: whereabout lookup failed: {e}");
                return;
            }
        };

        self.responder
            .enqueue(PendingQuestion {
                target_user: query.target_user,
                response_text: render_response(&fact),
                asked_at: message.created_at,
                questioner_id: query.questioner_id,
            })
            .await;
    }
}
