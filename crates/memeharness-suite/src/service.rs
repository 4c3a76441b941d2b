//! In-process stand-in for the remote meme service.
//!
//! A wiremock server with a single stateful responder implementing the
//! service contract the suite was written against: token issuance and
//! liveness, CRUD on meme records, required-field and unknown-field
//! validation, the URL/body id-mismatch 403, and 404s for missing records.
//! Hermetic runs point the harness at this instead of the live endpoint.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Debug, Default)]
struct ServiceState {
    tokens: HashMap<String, String>,
    memes: BTreeMap<i64, Value>,
    next_token: u64,
    next_id: i64,
}

/// Mock meme service bound to a local port.
pub struct MockMemeService {
    server: MockServer,
    state: Arc<Mutex<ServiceState>>,
}

impl MockMemeService {
    /// Start the service on a random local port.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(ServiceState::default()));

        Mock::given(any())
            .respond_with(MemeServiceResponder {
                state: Arc::clone(&state),
            })
            // Low priority so failure injections mounted later win.
            .with_priority(200)
            .mount(&server)
            .await;

        Self { server, state }
    }

    /// Base URL of the running service.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Respond 500 to the next `times` requests hitting `endpoint`,
    /// regardless of method, then fall back to normal behavior.
    pub async fn inject_500(&self, endpoint: &str, times: u64) {
        Mock::given(path(endpoint))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Respond 503 to every request hitting `endpoint` with the given
    /// method, forever.
    pub async fn always_503(&self, verb: &str, endpoint: &str) {
        Mock::given(method(verb))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(503))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Number of meme records currently stored.
    pub fn meme_count(&self) -> usize {
        self.state.lock().memes.len()
    }
}

struct MemeServiceResponder {
    state: Arc<Mutex<ServiceState>>,
}

impl Respond for MemeServiceResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request
            .url
            .path()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let verb = request.method.as_str();

        match (verb, segments.as_slice()) {
            ("POST", ["authorize"]) => self.authorize(&request.body),
            (_, ["authorize", token]) => self.token_status(verb, token),
            (_, ["meme", ..]) => self.meme_route(request, verb, &segments),
            _ => ResponseTemplate::new(404),
        }
    }
}

impl MemeServiceResponder {
    fn authorize(&self, body: &[u8]) -> ResponseTemplate {
        let Ok(payload) = serde_json::from_slice::<Value>(body) else {
            return ResponseTemplate::new(400);
        };
        let Some(object) = payload.as_object() else {
            return ResponseTemplate::new(400);
        };
        // Exactly one field, "name", holding a string.
        if object.len() != 1 {
            return ResponseTemplate::new(400);
        }
        let Some(name) = object.get("name").and_then(Value::as_str) else {
            return ResponseTemplate::new(400);
        };

        let mut state = self.state.lock();
        state.next_token += 1;
        let token = format!("token-{}-{name}", state.next_token);
        state.tokens.insert(token.clone(), name.to_string());

        ResponseTemplate::new(200).set_body_json(json!({ "token": token, "user": name }))
    }

    fn token_status(&self, verb: &str, token: &str) -> ResponseTemplate {
        if verb != "GET" {
            return ResponseTemplate::new(405);
        }
        match self.state.lock().tokens.get(token) {
            Some(name) => ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string(format!("Token is alive. Username is {name}")),
            None => ResponseTemplate::new(404),
        }
    }

    fn meme_route(&self, request: &Request, verb: &str, segments: &[&str]) -> ResponseTemplate {
        let token = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let Some(username) = self.state.lock().tokens.get(token).cloned() else {
            return ResponseTemplate::new(401);
        };

        match (verb, segments) {
            ("GET", ["meme"]) => {
                let state = self.state.lock();
                let records: Vec<&Value> = state.memes.values().collect();
                ResponseTemplate::new(200).set_body_json(json!(records))
            }
            ("POST", ["meme"]) => self.create_meme(&request.body, &username),
            (_, ["meme", raw_id]) => {
                let Ok(id) = raw_id.parse::<i64>() else {
                    return ResponseTemplate::new(404);
                };
                match verb {
                    "GET" => self.get_meme(id),
                    "PUT" => self.update_meme(id, &request.body, &username),
                    "DELETE" => self.delete_meme(id),
                    _ => ResponseTemplate::new(405),
                }
            }
            _ => ResponseTemplate::new(404),
        }
    }

    fn create_meme(&self, body: &[u8], username: &str) -> ResponseTemplate {
        let Some(payload) = parse_meme_payload(body, false) else {
            return ResponseTemplate::new(400);
        };

        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        let mut record = payload;
        record["id"] = json!(id);
        record["updated_by"] = json!(username);
        state.memes.insert(id, record.clone());

        ResponseTemplate::new(200).set_body_json(record)
    }

    fn get_meme(&self, id: i64) -> ResponseTemplate {
        match self.state.lock().memes.get(&id) {
            Some(record) => ResponseTemplate::new(200).set_body_json(record),
            None => ResponseTemplate::new(404),
        }
    }

    fn update_meme(&self, id: i64, body: &[u8], username: &str) -> ResponseTemplate {
        let Some(payload) = parse_meme_payload(body, true) else {
            return ResponseTemplate::new(400);
        };

        let mut state = self.state.lock();
        if !state.memes.contains_key(&id) {
            return ResponseTemplate::new(404);
        }
        if payload["id"].as_i64() != Some(id) {
            return ResponseTemplate::new(403);
        }

        let mut record = payload;
        record["updated_by"] = json!(username);
        state.memes.insert(id, record.clone());

        ResponseTemplate::new(200).set_body_json(record)
    }

    fn delete_meme(&self, id: i64) -> ResponseTemplate {
        if self.state.lock().memes.remove(&id).is_some() {
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string(format!("Meme with id {id} successfully deleted"))
        } else {
            ResponseTemplate::new(404)
        }
    }
}

/// Validate a create/update payload: required fields with the right shapes,
/// no unknown fields. Returns the payload on success.
fn parse_meme_payload(body: &[u8], with_id: bool) -> Option<Value> {
    let payload = serde_json::from_slice::<Value>(body).ok()?;
    let object = payload.as_object()?;

    let mut expected = vec!["text", "url", "tags", "info"];
    if with_id {
        expected.push("id");
    }

    if object.len() != expected.len() {
        return None;
    }
    for key in &expected {
        if !object.contains_key(*key) {
            return None;
        }
    }

    object.get("text")?.as_str()?;
    object.get("url")?.as_str()?;
    object.get("tags")?.as_array()?;
    object.get("info")?.as_object()?;
    if with_id {
        object.get("id")?.as_i64()?;
    }

    Some(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_validation() {
        let valid = json!({
            "text": "t", "url": "u", "tags": [], "info": {}
        });
        assert!(parse_meme_payload(valid.to_string().as_bytes(), false).is_some());

        let missing = json!({"text": "t", "url": "u", "tags": []});
        assert!(parse_meme_payload(missing.to_string().as_bytes(), false).is_none());

        let unknown = json!({
            "text": "t", "url": "u", "tags": [], "info": {}, "extra": 1
        });
        assert!(parse_meme_payload(unknown.to_string().as_bytes(), false).is_none());

        assert!(parse_meme_payload(b"{}", false).is_none());
        assert!(parse_meme_payload(b"not json", false).is_none());
    }

    #[test]
    fn update_payload_requires_integer_id() {
        let valid = json!({
            "id": 3, "text": "t", "url": "u", "tags": [1, "a"], "info": {}
        });
        assert!(parse_meme_payload(valid.to_string().as_bytes(), true).is_some());

        let stringly = json!({
            "id": "3", "text": "t", "url": "u", "tags": [], "info": {}
        });
        assert!(parse_meme_payload(stringly.to_string().as_bytes(), true).is_none());
    }
}
