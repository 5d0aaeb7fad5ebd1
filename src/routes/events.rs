// ABOUTME: Server-sent events endpoint streaming catalog mutations to clients
// ABOUTME: One broadcast subscription per connection with sequential event IDs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::resources::ServerResources;
use async_stream::stream;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Catalog event stream routes
pub struct EventsRoutes;

impl EventsRoutes {
    /// Create the event stream route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/events", get(Self::handle_stream))
            .with_state(resources)
    }

    /// Handle GET /api/events - Stream catalog mutations
    async fn handle_stream(State(resources): State<Arc<ServerResources>>) -> Response {
        let mut receiver = resources.events.subscribe();
        info!(
            subscribers = resources.events.subscriber_count(),
            "Catalog event stream opened"
        );

        let events = stream! {
            let mut event_id: u64 = 1;
            yield Ok::<_, Infallible>(Event::default()
                .id(event_id.to_string())
                .event("connected")
                .data("catalog event stream ready"));

            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let data = match serde_json::to_string(&event) {
                            Ok(data) => data,
                            Err(e) => {
                                warn!("Failed to serialize catalog event: {e}");
                                continue;
                            }
                        };
                        event_id += 1;
                        yield Ok(Event::default()
                            .id(event_id.to_string())
                            .event("catalog")
                            .data(data));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Catalog event stream lagged; clients should reload");
                        event_id += 1;
                        yield Ok(Event::default()
                            .id(event_id.to_string())
                            .event("lagged")
                            .data(skipped.to_string()));
                    }
                    Err(RecvError::Closed) => {
                        debug!("Catalog event bus closed");
                        break;
                    }
                }
            }
        };

        Sse::new(events)
            .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
            .into_response()
    }
}
