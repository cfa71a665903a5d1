#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Real-time invalidation client.
//!
//! Subscribes to the push channel and treats every incoming frame as a
//! pure invalidation signal: the payload is parsed only far enough to
//! classify the event, never trusted as a data delta. On any incident
//! change, every registered [`Refresh`] view re-fetches from the API.
//!
//! Connection failures are terminal: there is no reconnection logic.
//! The run loop ends, a disconnect notice is emitted, and the views keep
//! their last rendered state.

use std::sync::Arc;

use futures::StreamExt;
use incident_map_view::Refresh;
use tokio::sync::Mutex;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Errors raised by the realtime client.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// `WebSocket` connection or protocol failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Classified push events. All of them trigger the same refresh; the
/// distinction only feeds the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealtimeEvent {
    /// Generic broadcast frame.
    Message,
    /// A new incident was reported.
    IncidentAdded,
    /// An incident's status changed.
    IncidentUpdated,
    /// An incident was deleted.
    IncidentDeleted,
}

impl RealtimeEvent {
    /// Event name as broadcast on the wire.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::IncidentAdded => "incident_added",
            Self::IncidentUpdated => "incident_updated",
            Self::IncidentDeleted => "incident_deleted",
        }
    }
}

/// Classifies a text frame from the push channel.
///
/// The broker broadcasts either a bare event name (`"incident_added"`)
/// or a JSON envelope (`{"event": "incident_added", ...}`). Anything
/// unrecognized still counts as the generic message event — every frame
/// is an invalidation signal regardless of its contents.
#[must_use]
pub fn classify_frame(frame: &str) -> RealtimeEvent {
    let name = serde_json::from_str::<serde_json::Value>(frame)
        .ok()
        .and_then(|value| {
            value
                .get("event")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| frame.trim().to_string());

    match name.as_str() {
        "incident_added" => RealtimeEvent::IncidentAdded,
        "incident_updated" => RealtimeEvent::IncidentUpdated,
        "incident_deleted" => RealtimeEvent::IncidentDeleted,
        _ => RealtimeEvent::Message,
    }
}

/// Transient connection notices (the toasts of the original client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The push channel connected; real-time updates are active.
    Connected,
    /// The push channel dropped; real-time updates are disabled.
    Disconnected,
}

impl Notice {
    /// User-facing toast text.
    #[must_use]
    pub const fn text(&self) -> &'static str {
        match self {
            Self::Connected => "Mise à jour en temps réel ACTIVÉE",
            Self::Disconnected => {
                "Connexion perdue : la mise à jour en temps réel est désactivée."
            },
        }
    }
}

type Subscriber = Arc<Mutex<dyn Refresh>>;
type NoticeSink = Box<dyn Fn(&Notice) + Send + Sync>;

/// The push-channel client and its refresh subscribers.
pub struct RealtimeClient {
    url: String,
    subscribers: Vec<Subscriber>,
    notice_sink: Option<NoticeSink>,
}

impl RealtimeClient {
    /// Creates a client for the push channel at `url` (`ws://.../ws`).
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            subscribers: Vec::new(),
            notice_sink: None,
        }
    }

    /// Registers a view to re-fetch on every invalidation event.
    pub fn subscribe(&mut self, view: Subscriber) {
        self.subscribers.push(view);
    }

    /// Installs the toast callback for connection notices.
    pub fn on_notice(&mut self, sink: impl Fn(&Notice) + Send + Sync + 'static) {
        self.notice_sink = Some(Box::new(sink));
    }

    fn emit(&self, notice: &Notice) {
        log::info!("{}", notice.text());
        if let Some(sink) = &self.notice_sink {
            sink(notice);
        }
    }

    /// Re-invokes every subscriber's refresh. Refresh failures are
    /// logged and do not stop the fan-out: a slow or failing view never
    /// blocks the others from updating.
    pub async fn notify_subscribers(&self, event: RealtimeEvent) {
        log::debug!("Push event: {}", event.name());
        for subscriber in &self.subscribers {
            if let Err(e) = subscriber.lock().await.refresh().await {
                log::error!("Refresh after {} failed: {e}", event.name());
            }
        }
    }

    /// Connects and processes push frames until the channel closes.
    ///
    /// Emits [`Notice::Connected`] once the handshake completes and
    /// [`Notice::Disconnected`] when the channel ends, cleanly or not.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError`] if the connection cannot be
    /// established or drops with a protocol error.
    pub async fn run(&self) -> Result<(), RealtimeError> {
        let (stream, _response) = match connect_async(&self.url).await {
            Ok(ok) => ok,
            Err(e) => {
                self.emit(&Notice::Disconnected);
                return Err(e.into());
            },
        };
        self.emit(&Notice::Connected);

        let (_writer, mut reader) = stream.split();
        loop {
            match reader.next().await {
                Some(Ok(Message::Text(text))) => {
                    self.notify_subscribers(classify_frame(text.as_str())).await;
                },
                Some(Ok(Message::Close(_))) | None => {
                    self.emit(&Notice::Disconnected);
                    return Ok(());
                },
                Some(Ok(
                    Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_),
                )) => {
                    // Ping/pong handled by tungstenite; binary frames carry
                    // nothing we trust anyway.
                },
                Some(Err(e)) => {
                    self.emit(&Notice::Disconnected);
                    return Err(e.into());
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use incident_map_client::ClientError;

    use super::*;

    #[test]
    fn classifies_bare_event_names() {
        assert_eq!(classify_frame("incident_added"), RealtimeEvent::IncidentAdded);
        assert_eq!(
            classify_frame(" incident_updated\n"),
            RealtimeEvent::IncidentUpdated
        );
        assert_eq!(
            classify_frame("incident_deleted"),
            RealtimeEvent::IncidentDeleted
        );
    }

    #[test]
    fn classifies_json_envelopes() {
        assert_eq!(
            classify_frame(r#"{"event": "incident_added", "id": 3}"#),
            RealtimeEvent::IncidentAdded
        );
        assert_eq!(
            classify_frame(r#"{"event": "incident_deleted"}"#),
            RealtimeEvent::IncidentDeleted
        );
    }

    #[test]
    fn anything_else_is_the_generic_message() {
        assert_eq!(classify_frame("update"), RealtimeEvent::Message);
        assert_eq!(classify_frame(""), RealtimeEvent::Message);
        assert_eq!(classify_frame(r#"{"other": 1}"#), RealtimeEvent::Message);
        assert_eq!(classify_frame("Broadcast: hello"), RealtimeEvent::Message);
    }

    struct CountingView {
        refreshes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Refresh for CountingView {
        async fn refresh(&mut self) -> Result<(), ClientError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn every_event_fans_out_to_all_subscribers() {
        let map_refreshes = Arc::new(AtomicUsize::new(0));
        let table_refreshes = Arc::new(AtomicUsize::new(0));

        let mut client = RealtimeClient::new("ws://localhost:8001/ws");
        client.subscribe(Arc::new(Mutex::new(CountingView {
            refreshes: map_refreshes.clone(),
        })));
        client.subscribe(Arc::new(Mutex::new(CountingView {
            refreshes: table_refreshes.clone(),
        })));

        client.notify_subscribers(RealtimeEvent::Message).await;
        client.notify_subscribers(RealtimeEvent::IncidentAdded).await;

        assert_eq!(map_refreshes.load(Ordering::SeqCst), 2);
        assert_eq!(table_refreshes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refresh_does_not_stop_fan_out() {
        struct FailingView;

        #[async_trait]
        impl Refresh for FailingView {
            async fn refresh(&mut self) -> Result<(), ClientError> {
                Err(ClientError::Status {
                    status: 500,
                    method: "GET",
                    path: "/api/incidents".to_string(),
                })
            }
        }

        let refreshes = Arc::new(AtomicUsize::new(0));
        let mut client = RealtimeClient::new("ws://localhost:8001/ws");
        client.subscribe(Arc::new(Mutex::new(FailingView)));
        client.subscribe(Arc::new(Mutex::new(CountingView {
            refreshes: refreshes.clone(),
        })));

        client.notify_subscribers(RealtimeEvent::IncidentUpdated).await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn notice_texts_are_stable() {
        assert!(Notice::Connected.text().contains("temps réel"));
        assert!(Notice::Disconnected.text().contains("désactivée"));
    }
}
