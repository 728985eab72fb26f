//! WebSocket handler for spot update clients
//!
//! Every committed change is pushed to connected clients as a
//! `SpotsUpdated` JSON message carrying the full collection.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, error, info, warn};

use crate::application::SharedSpotService;
use crate::domain::SpotsUpdated;

/// Query parameters for filtering updates
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFilter {
    /// Only changes touching this spot (optional)
    pub spot_id: Option<i64>,
    /// Comma-separated change types, e.g. `spot_created,spot_updated` (optional)
    pub event_types: Option<String>,
}

impl UpdateFilter {
    pub fn matches(&self, update: &SpotsUpdated) -> bool {
        if let Some(spot_id) = self.spot_id {
            if update.change.spot_id() != spot_id {
                return false;
            }
        }

        if let Some(ref types) = self.event_types {
            let allowed: Vec<&str> = types.split(',').map(|s| s.trim()).collect();
            if !allowed.contains(&update.change.event_type()) {
                return false;
            }
        }

        true
    }
}

/// State for the update WebSocket handler
#[derive(Clone)]
pub struct NotificationState {
    pub service: SharedSpotService,
}

/// WebSocket upgrade handler for spot updates
pub async fn ws_spot_updates_handler(
    ws: WebSocketUpgrade,
    State(state): State<NotificationState>,
    Query(filter): Query<UpdateFilter>,
) -> impl IntoResponse {
    info!(
        spot_id = ?filter.spot_id,
        event_types = ?filter.event_types,
        "New spot update WebSocket connection"
    );

    ws.on_upgrade(move |socket| handle_update_socket(socket, state, filter))
}

async fn handle_update_socket(socket: WebSocket, state: NotificationState, filter: UpdateFilter) {
    let (mut sender, mut receiver) = socket.split();
    // Subscribe before reading the snapshot so no commit falls in between
    let mut feed = state.service.updates();
    let spots = state.service.list().await;

    let welcome = serde_json::json!({
        "type": "connected",
        "spots": spots,
        "filter": {
            "spot_id": filter.spot_id,
            "event_types": filter.event_types,
        }
    });

    if let Err(e) = sender
        .send(Message::Text(welcome.to_string().into()))
        .await
    {
        error!(error = %e, "Failed to send welcome message");
        return;
    }

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        debug!(%text, "Ignoring client text message");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            error!(error = %e, "Failed to send pong");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client sent close");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }

            update = feed.recv() => {
                let Some(update) = update else {
                    warn!("Update broadcaster closed");
                    break;
                };
                if !filter.matches(&update) {
                    continue;
                }

                match serde_json::to_string(&update) {
                    Ok(json) => {
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            error!(error = %e, "Failed to send update");
                            break;
                        }
                        debug!(sequence = update.sequence, change = update.change.event_type(), "Update sent to client");
                    }
                    Err(e) => error!(error = %e, "Failed to serialize update"),
                }
            }
        }
    }

    info!("Spot update WebSocket client disconnected");
}
