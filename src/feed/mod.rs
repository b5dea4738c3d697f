use crate::api::ApiClient;
use crate::models::Bookmark;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, WebSocket};

/// One change to the owner-scoped bookmark collection, as delivered by the
/// service's realtime channel.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ChangeEvent {
    Insert(Bookmark),
    Delete { id: String },
}

const TOPIC: &str = "realtime:public:bookmarks";
const HEARTBEAT_MS: i32 = 30_000;

/// The realtime endpoint lives next to the REST one, ws-schemed.
pub(crate) fn websocket_url(service_url: &str, anon_key: &str) -> String {
    let base = if let Some(rest) = service_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = service_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        service_url.to_string()
    };

    format!(
        "{base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
        urlencoding::encode(anon_key)
    )
}

/// Channel join frame. The owner filter is applied server-side, so this
/// session only ever sees its own rows.
pub(crate) fn join_payload(owner_id: &str, access_token: &str) -> String {
    serde_json::json!({
        "topic": TOPIC,
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [{
                    "event": "*",
                    "schema": "public",
                    "table": "bookmarks",
                    "filter": format!("owner_id=eq.{owner_id}"),
                }],
            },
            "access_token": access_token,
        },
        "ref": "1",
    })
    .to_string()
}

fn heartbeat_payload() -> String {
    serde_json::json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": "hb",
    })
    .to_string()
}

fn leave_payload() -> String {
    serde_json::json!({
        "topic": TOPIC,
        "event": "phx_leave",
        "payload": {},
        "ref": "leave",
    })
    .to_string()
}

/// Decodes one realtime frame. Anything that is not an INSERT or DELETE on
/// the bookmark collection (join replies, heartbeats, malformed text) yields
/// `None` and is dropped by the subscription.
pub(crate) fn parse_feed_message(text: &str) -> Option<ChangeEvent> {
    let frame: serde_json::Value = serde_json::from_str(text).ok()?;

    if frame.get("event").and_then(|v| v.as_str()) != Some("postgres_changes") {
        return None;
    }

    let data = frame.get("payload")?.get("data")?;
    match data.get("type").and_then(|v| v.as_str()) {
        Some("INSERT") => {
            let record = data.get("record")?.clone();
            let record: Bookmark = serde_json::from_value(record).ok()?;
            Some(ChangeEvent::Insert(record))
        }
        Some("DELETE") => {
            // Replica identity is key-only: DELETE frames carry just the id.
            let id = data.get("old_record")?.get("id")?.as_str()?.to_string();
            Some(ChangeEvent::Delete { id })
        }
        _ => None,
    }
}

/// A live, owner-filtered change-feed subscription.
///
/// Holds the socket and the JS closures backing its callbacks; dropping the
/// handle without `unsubscribe` would detach the callbacks mid-flight, so
/// the owning view must call `unsubscribe` on teardown.
pub(crate) struct FeedSubscription {
    ws: WebSocket,
    heartbeat_id: i32,
    _on_open: Closure<dyn FnMut()>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _heartbeat: Closure<dyn FnMut()>,
}

impl FeedSubscription {
    pub fn open(
        client: &ApiClient,
        owner_id: &str,
        on_event: impl Fn(ChangeEvent) + 'static,
    ) -> Option<Self> {
        let url = websocket_url(&client.service_url, &client.anon_key);
        let ws = WebSocket::new(&url).ok()?;

        let join = join_payload(owner_id, &client.bearer_token());
        let ws_open = ws.clone();
        let on_open = Closure::wrap(Box::new(move || {
            let _ = ws_open.send_with_str(&join);
        }) as Box<dyn FnMut()>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let on_message = Closure::wrap(Box::new(move |ev: MessageEvent| {
            if let Some(text) = ev.data().as_string() {
                if let Some(change) = parse_feed_message(&text) {
                    on_event(change);
                }
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        // The channel drops silent clients; tick a heartbeat until teardown.
        let ws_beat = ws.clone();
        let heartbeat = Closure::wrap(Box::new(move || {
            if ws_beat.ready_state() == WebSocket::OPEN {
                let _ = ws_beat.send_with_str(&heartbeat_payload());
            }
        }) as Box<dyn FnMut()>);

        let heartbeat_id = web_sys::window()
            .and_then(|win| {
                win.set_interval_with_callback_and_timeout_and_arguments_0(
                    heartbeat.as_ref().unchecked_ref(),
                    HEARTBEAT_MS,
                )
                .ok()
            })
            .unwrap_or(0);

        Some(Self {
            ws,
            heartbeat_id,
            _on_open: on_open,
            _on_message: on_message,
            _heartbeat: heartbeat,
        })
    }

    /// Releases the subscription: heartbeat timer, socket callbacks and the
    /// socket itself. Consuming `self` makes a double-unsubscribe
    /// unrepresentable.
    pub fn unsubscribe(self) {
        if let Some(win) = web_sys::window() {
            win.clear_interval_with_handle(self.heartbeat_id);
        }

        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);

        if self.ws.ready_state() == WebSocket::OPEN {
            let _ = self.ws.send_with_str(&leave_payload());
        }
        let _ = self.ws.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_url_switches_scheme() {
        assert_eq!(
            websocket_url("https://svc.example.com", "anon"),
            "wss://svc.example.com/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
        assert!(websocket_url("http://localhost:54321", "anon").starts_with("ws://localhost"));
    }

    #[test]
    fn join_payload_is_owner_filtered() {
        let frame: serde_json::Value =
            serde_json::from_str(&join_payload("u1", "jwt")).expect("join frame is json");
        assert_eq!(frame["event"], "phx_join");
        let change = &frame["payload"]["config"]["postgres_changes"][0];
        assert_eq!(change["table"], "bookmarks");
        assert_eq!(change["filter"], "owner_id=eq.u1");
        assert_eq!(frame["payload"]["access_token"], "jwt");
    }

    #[test]
    fn parses_insert_frame() {
        let text = r#"{
            "topic": "realtime:public:bookmarks",
            "event": "postgres_changes",
            "payload": {
                "data": {
                    "type": "INSERT",
                    "record": {
                        "id": "b-1",
                        "url": "https://example.com",
                        "title": "Example",
                        "owner_id": "u1",
                        "created_at": "2026-03-05T12:00:00.000Z"
                    }
                }
            },
            "ref": null
        }"#;

        match parse_feed_message(text) {
            Some(ChangeEvent::Insert(record)) => {
                assert_eq!(record.id, "b-1");
                assert_eq!(record.owner_id, "u1");
            }
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[test]
    fn parses_delete_frame_with_key_only_old_record() {
        let text = r#"{
            "topic": "realtime:public:bookmarks",
            "event": "postgres_changes",
            "payload": {"data": {"type": "DELETE", "old_record": {"id": "b-2"}}},
            "ref": null
        }"#;

        assert_eq!(
            parse_feed_message(text),
            Some(ChangeEvent::Delete {
                id: "b-2".to_string()
            })
        );
    }

    #[test]
    fn ignores_system_frames() {
        let reply = r#"{"topic":"realtime:public:bookmarks","event":"phx_reply","payload":{"status":"ok"},"ref":"1"}"#;
        assert_eq!(parse_feed_message(reply), None);

        let heartbeat = r#"{"topic":"phoenix","event":"heartbeat","payload":{},"ref":"hb"}"#;
        assert_eq!(parse_feed_message(heartbeat), None);
    }

    #[test]
    fn ignores_update_and_malformed_frames() {
        let update = r#"{
            "event": "postgres_changes",
            "payload": {"data": {"type": "UPDATE", "record": {"id": "b-3"}}}
        }"#;
        assert_eq!(parse_feed_message(update), None);
        assert_eq!(parse_feed_message("not json"), None);
        assert_eq!(parse_feed_message("{}"), None);
    }
}
