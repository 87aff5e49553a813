// src/feed/sse.rs
//
// Server-sent event framing and the locally mirrored collection tree the
// realtime database stream patches into.

use crate::domain::record::CollectionRecord;
use crate::feed::FeedError;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Line-oriented SSE parser. Feed it one line at a time; a blank line ends an event.
#[derive(Debug, Default)]
pub struct SseParser {
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');

        if line.is_empty() {
            if self.event.is_none() && self.data.is_empty() {
                return None;
            }
            let event = SseEvent {
                event: self.event.take().unwrap_or_else(|| "message".to_string()),
                data: self.data.join("\n"),
            };
            self.data.clear();
            return Some(event);
        }

        // comment
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }
}

#[derive(Debug, Deserialize)]
struct StreamPayload {
    path: String,
    #[serde(default)]
    data: Value,
}

/// Local copy of the collection, kept current from `put`/`patch` events.
#[derive(Debug, Clone, Default)]
pub struct CollectionTree {
    root: Value,
}

impl CollectionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree from a full export of the collection (`{key: record, ...}`).
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Apply one stream event. `Ok(true)` means the collection may have changed
    /// and a fresh snapshot should be delivered.
    pub fn apply(&mut self, event: &SseEvent) -> Result<bool, FeedError> {
        match event.event.as_str() {
            "put" => {
                let payload = parse_payload(event)?;
                set_at(&mut self.root, &split_path(&payload.path), payload.data);
                Ok(true)
            }
            "patch" => {
                let payload = parse_payload(event)?;
                let Value::Object(children) = payload.data else {
                    return Err(FeedError::Protocol("patch data is not an object".into()));
                };
                let base = split_path(&payload.path);
                for (key, value) in children {
                    let mut path = base.clone();
                    path.extend(split_path(&key));
                    set_at(&mut self.root, &path, value);
                }
                Ok(true)
            }
            "keep-alive" => Ok(false),
            "cancel" => Err(FeedError::Cancelled(reason_or(&event.data, "permission denied"))),
            "auth_revoked" => Err(FeedError::Cancelled(reason_or(&event.data, "credential revoked"))),
            other => {
                log::debug!("ignoring stream event {other}");
                Ok(false)
            }
        }
    }

    pub fn records(&self) -> Vec<CollectionRecord> {
        match &self.root {
            Value::Object(children) => children
                .iter()
                .map(|(key, value)| CollectionRecord::from_json_lossy(key, value))
                .collect(),
            Value::Null => Vec::new(),
            other => {
                log::warn!("collection root is not an object: {other}");
                Vec::new()
            }
        }
    }
}

fn parse_payload(event: &SseEvent) -> Result<StreamPayload, FeedError> {
    serde_json::from_str(&event.data)
        .map_err(|e| FeedError::Protocol(format!("{} payload: {e}", event.event)))
}

fn reason_or(data: &str, fallback: &str) -> String {
    let data = data.trim().trim_matches('"');
    if data.is_empty() || data == "null" {
        fallback.to_string()
    } else {
        data.to_string()
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write `value` at `path`. A null value deletes, pruning parents left empty.
fn set_at(node: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };

    if value.is_null() {
        if let Value::Object(map) = node {
            if rest.is_empty() {
                map.remove(head);
            } else if let Some(child) = map.get_mut(head) {
                set_at(child, rest, Value::Null);
                let emptied = match child {
                    Value::Object(m) => m.is_empty(),
                    Value::Null => true,
                    _ => false,
                };
                if emptied {
                    map.remove(head);
                }
            }
        }
        return;
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        set_at(child, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed_lines(parser: &mut SseParser, text: &str) -> Vec<SseEvent> {
        text.lines().filter_map(|l| parser.push_line(l)).collect()
    }

    fn event(name: &str, data: Value) -> SseEvent {
        SseEvent {
            event: name.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn parser_frames_events_on_blank_lines() {
        let mut parser = SseParser::new();
        let text = "event: put\ndata: {\"path\":\"/\",\"data\":null}\n\n: comment\nevent: keep-alive\ndata: null\n\n";
        let events = feed_lines(&mut parser, text);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "put");
        assert_eq!(events[0].data, r#"{"path":"/","data":null}"#);
        assert_eq!(events[1].event, "keep-alive");
    }

    #[test]
    fn parser_joins_multiline_data() {
        let mut parser = SseParser::new();
        let events = feed_lines(&mut parser, "data: a\r\ndata: b\r\n\r\n");
        assert_eq!(
            events,
            vec![SseEvent {
                event: "message".into(),
                data: "a\nb".into()
            }]
        );
    }

    #[test]
    fn put_at_root_replaces_everything() {
        let mut tree = CollectionTree::new();
        let changed = tree
            .apply(&event(
                "put",
                json!({"path": "/", "data": {
                    "-Na": {"houseAddress": "1 Rizal Ave", "dateAndTime": "3/1/2024, 9:00:00 AM"},
                    "-Nb": {"houseAddress": "2 Rizal Ave"}
                }}),
            ))
            .unwrap();
        assert!(changed);

        let ids: Vec<_> = tree.records().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["-Na", "-Nb"]);

        tree.apply(&event("put", json!({"path": "/", "data": {"-Nc": {}}})))
            .unwrap();
        let ids: Vec<_> = tree.records().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["-Nc"]);
    }

    #[test]
    fn put_null_deletes_a_child() {
        let mut tree = CollectionTree::from_value(json!({"-Na": {"ownerName": "A"}, "-Nb": {"ownerName": "B"}}));
        tree.apply(&event("put", json!({"path": "/-Na", "data": null})))
            .unwrap();
        let ids: Vec<_> = tree.records().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["-Nb"]);
    }

    #[test]
    fn nested_put_and_patch_update_fields() {
        let mut tree = CollectionTree::from_value(json!({"-Na": {"ownerName": "A", "reviewStatus": "Pending"}}));
        tree.apply(&event("put", json!({"path": "/-Na/reviewStatus", "data": "Reviewed"})))
            .unwrap();
        tree.apply(&event(
            "patch",
            json!({"path": "/", "data": {"-Na/ownerName": "Ana", "-Nz": {"ownerName": "Zed"}}}),
        ))
        .unwrap();

        let records = tree.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].owner_name.as_deref(), Some("Ana"));
        assert_eq!(records[0].review_status.as_deref(), Some("Reviewed"));
        assert_eq!(records[1].id, "-Nz");
    }

    #[test]
    fn deleting_last_field_prunes_the_record() {
        let mut tree = CollectionTree::from_value(json!({"-Na": {"ownerName": "A"}}));
        tree.apply(&event("put", json!({"path": "/-Na/ownerName", "data": null})))
            .unwrap();
        assert!(tree.records().is_empty());
    }

    #[test]
    fn keep_alive_is_not_a_change() {
        let mut tree = CollectionTree::new();
        let changed = tree
            .apply(&SseEvent {
                event: "keep-alive".into(),
                data: "null".into(),
            })
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn cancel_and_revocation_end_the_feed() {
        let mut tree = CollectionTree::new();
        let err = tree
            .apply(&SseEvent {
                event: "cancel".into(),
                data: "null".into(),
            })
            .unwrap_err();
        assert_eq!(err, FeedError::Cancelled("permission denied".into()));

        let err = tree
            .apply(&SseEvent {
                event: "auth_revoked".into(),
                data: "\"token expired\"".into(),
            })
            .unwrap_err();
        assert_eq!(err, FeedError::Cancelled("token expired".into()));
    }

    #[test]
    fn malformed_payload_is_a_protocol_error() {
        let mut tree = CollectionTree::new();
        let err = tree
            .apply(&SseEvent {
                event: "put".into(),
                data: "{not json".into(),
            })
            .unwrap_err();
        assert!(matches!(err, FeedError::Protocol(_)));
    }
}
