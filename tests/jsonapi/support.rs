//! Test doubles and fixtures: a recording transport and a small widget domain.

use std::fmt;
use std::sync::Mutex;

use jsonapi_store::{Config, Document, JsonApi, Transport};
use serde_json::{json, Value};

/// One request seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
    pub options: Option<Value>,
}

/// What the transport answers to every request.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    NoContent,
    Status(u16),
}

/// A non-success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    pub status: u16,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request failed with status code {}", self.status)
    }
}

impl std::error::Error for StatusError {}

/// In-memory transport that records requests and replays a canned reply.
///
/// Options are arbitrary JSON, recorded as given.
pub struct RecordingTransport {
    reply: Mutex<Reply>,
    requests: Mutex<Vec<Request>>,
}

impl RecordingTransport {
    pub fn replying(reply: Reply) -> Self {
        Self {
            reply: Mutex::new(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn json(body: Value) -> Self {
        Self::replying(Reply::Json(body))
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Request {
        self.requests().last().cloned().expect("no request was made")
    }

    fn respond(
        &self,
        method: &'static str,
        path: &str,
        body: Option<&Document>,
        options: Option<Value>,
    ) -> Result<Option<Value>, StatusError> {
        self.requests.lock().unwrap().push(Request {
            method,
            path: path.to_string(),
            body: body.map(|b| serde_json::to_value(b).unwrap()),
            options,
        });
        match self.reply.lock().unwrap().clone() {
            Reply::Json(value) => Ok(Some(value)),
            Reply::NoContent => Ok(None),
            Reply::Status(status) => Err(StatusError { status }),
        }
    }
}

impl Transport for RecordingTransport {
    type Options = Option<Value>;
    type Error = StatusError;

    async fn get(&self, path: &str, options: Option<Value>) -> Result<Option<Value>, StatusError> {
        self.respond("GET", path, None, options)
    }

    async fn post(
        &self,
        path: &str,
        body: &Document,
        options: Option<Value>,
    ) -> Result<Option<Value>, StatusError> {
        self.respond("POST", path, Some(body), options)
    }

    async fn patch(
        &self,
        path: &str,
        body: &Document,
        options: Option<Value>,
    ) -> Result<Option<Value>, StatusError> {
        self.respond("PATCH", path, Some(body), options)
    }

    async fn delete(&self, path: &str, options: Option<Value>) -> Result<Option<Value>, StatusError> {
        self.respond("DELETE", path, None, options)
    }
}

/// Client that does not embed raw JSON, so results compare against the
/// normalized fixtures directly.
pub fn api(reply: Reply) -> JsonApi<RecordingTransport> {
    api_with(reply, Config::default().preserve_json(false))
}

pub fn api_with(reply: Reply, config: Config) -> JsonApi<RecordingTransport> {
    JsonApi::new(RecordingTransport::replying(reply), config)
}

pub fn following() -> Config {
    Config::default()
        .preserve_json(false)
        .follow_relationships_data(true)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn json_widget_1() -> Value {
    json!({
        "id": "1",
        "type": "widget",
        "attributes": { "name": "sprocket", "color": "black" },
        "relationships": {
            "widgets": {
                "data": [{ "type": "widget", "id": "2" }],
                "links": { "related": "/widget/1/widgets" }
            }
        }
    })
}

pub fn json_widget_2() -> Value {
    json!({
        "id": "2",
        "type": "widget",
        "attributes": { "name": "cog", "color": "red" },
        "relationships": {
            "widgets": {
                "data": [{ "type": "widget", "id": "1" }]
            }
        }
    })
}

pub fn json_machine_1() -> Value {
    json!({
        "id": "1",
        "type": "machine",
        "attributes": { "foo": 1 }
    })
}

pub fn norm_widget_1() -> Value {
    json!({
        "name": "sprocket",
        "color": "black",
        "_jv": {
            "type": "widget",
            "id": "1",
            "relationships": {
                "widgets": {
                    "data": [{ "type": "widget", "id": "2" }],
                    "links": { "related": "/widget/1/widgets" }
                }
            }
        }
    })
}

pub fn norm_widget_2() -> Value {
    json!({
        "name": "cog",
        "color": "red",
        "_jv": {
            "type": "widget",
            "id": "2",
            "relationships": {
                "widgets": { "data": [{ "type": "widget", "id": "1" }] }
            }
        }
    })
}

pub fn norm_machine_1() -> Value {
    json!({
        "foo": 1,
        "_jv": { "type": "machine", "id": "1" }
    })
}

/// Deserialize a normalized fixture into a record.
pub fn record(value: Value) -> jsonapi_store::Record {
    serde_json::from_value(value).unwrap()
}

/// Serialize anything to a JSON value for comparison with fixtures.
pub fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}
