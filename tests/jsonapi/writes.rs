//! Writes and store reads: post, patch, delete, search, stored.

use jsonapi_store::{ClientError, Fetched, Record, JV_TAG};
use serde_json::json;

use crate::support::{
    api, api_with, following, json_widget_1, json_widget_2, norm_widget_1, norm_widget_2, record,
    to_json, Reply,
};

#[tokio::test]
async fn post_sends_denormalized_record_to_collection() {
    let api = api(Reply::Json(json!({ "data": json_widget_1() })));
    let mut widget = record(norm_widget_1());
    widget.jv.id = None;

    let created = api.post(&widget).await.unwrap();

    let request = api.transport().last();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/widget");
    assert_eq!(
        request.body,
        Some(json!({
            "data": {
                "type": "widget",
                "attributes": { "name": "sprocket", "color": "black" },
                "relationships": {
                    "widgets": {
                        "data": [{ "type": "widget", "id": "2" }],
                        "links": { "related": "/widget/1/widgets" }
                    }
                }
            }
        }))
    );
    assert_eq!(created.id(), Some("1"));
    assert!(api.store().get("widget", "1").unwrap().is_some());
}

#[tokio::test]
async fn post_without_response_body_stores_client_generated_record() {
    let api = api(Reply::NoContent);
    let widget = Record::new("widget")
        .with_id("client-1")
        .with_attribute("name", json!("washer"));

    let created = api.post(&widget).await.unwrap();

    assert_eq!(created, widget);
    let stored = api.store().get("widget", "client-1").unwrap().unwrap();
    assert_eq!(stored.as_ref(), &widget);
}

#[tokio::test]
async fn post_without_response_or_id_is_an_error() {
    let api = api(Reply::NoContent);

    let err = api.post(&Record::new("widget")).await.unwrap_err();

    assert!(matches!(err, ClientError::MissingId { .. }));
    assert!(api.store().is_empty().unwrap());
}

#[tokio::test]
async fn post_answered_with_a_collection_leaves_store_untouched() {
    let api = api(Reply::Json(json!({ "data": [json_widget_1(), json_widget_2()] })));

    let err = api
        .post(&Record::new("widget").with_id("9"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedCollection));
    assert!(api.store().is_empty().unwrap());
}

#[tokio::test]
async fn patch_answered_with_a_collection_leaves_store_untouched() {
    let api = api(Reply::Json(json!({ "data": json_widget_1() })));
    api.get("widget/1").await.unwrap();
    let before = api.store().snapshot().unwrap();

    api.transport()
        .set_reply(Reply::Json(json!({ "data": [json_widget_1(), json_widget_2()] })));
    let err = api.patch(&record(norm_widget_1())).await.unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedCollection));
    assert_eq!(api.store().snapshot().unwrap(), before);
}

#[tokio::test]
async fn patch_sends_record_to_item_path_and_merges_response() {
    let mut updated = json_widget_1();
    updated["attributes"]["color"] = json!("blue");
    let api = api(Reply::Json(json!({ "data": updated })));

    let mut widget = record(norm_widget_1());
    widget.set("color", json!("blue"));
    let saved = api.patch(&widget).await.unwrap();

    let request = api.transport().last();
    assert_eq!(request.method, "PATCH");
    assert_eq!(request.path, "/widget/1");
    assert_eq!(request.body.unwrap()["data"]["attributes"]["color"], json!("blue"));
    assert_eq!(saved.get("color"), Some(&json!("blue")));

    let stored = api.store().get("widget", "1").unwrap().unwrap();
    assert_eq!(stored.get("color"), Some(&json!("blue")));
}

#[tokio::test]
async fn patch_without_response_body_stores_local_record() {
    let api = api(Reply::NoContent);
    let widget = record(norm_widget_1()).with_attribute("color", json!("green"));

    api.patch(&widget).await.unwrap();

    let stored = api.store().get("widget", "1").unwrap().unwrap();
    assert_eq!(stored.get("color"), Some(&json!("green")));
}

#[tokio::test]
async fn patch_with_meta_only_response_stores_local_record() {
    let api = api(Reply::Json(json!({ "meta": { "accepted": true } })));
    let widget = record(norm_widget_1());

    let saved = api.patch(&widget).await.unwrap();

    assert_eq!(to_json(&saved), norm_widget_1());
    assert!(api.store().get("widget", "1").unwrap().is_some());
}

#[tokio::test]
async fn patch_requires_an_id() {
    let api = api(Reply::NoContent);

    let err = api.patch(&Record::new("widget")).await.unwrap_err();

    assert!(matches!(err, ClientError::MissingId { .. }));
    assert!(api.transport().requests().is_empty());
}

#[tokio::test]
async fn patch_strips_resolved_relationships_from_the_body() {
    let api = api_with(Reply::Json(json!({ "data": json_widget_1() })), following());
    api.store().insert(record(norm_widget_2())).unwrap();
    let fetched = api.get("widget/1").await.unwrap().into_record().unwrap();
    assert!(fetched.rel("widgets").is_some());

    api.transport().set_reply(Reply::NoContent);
    api.patch(&fetched).await.unwrap();

    let body = api.transport().last().body.unwrap();
    assert_eq!(
        body["data"]["relationships"]["widgets"]["data"],
        json!([{ "type": "widget", "id": "2" }])
    );
    assert!(body["data"].get(JV_TAG).is_none());
    assert!(body["data"]["attributes"].get(JV_TAG).is_none());
}

#[tokio::test]
async fn delete_removes_record_from_store() {
    let api = api(Reply::Json(json!({ "data": json_widget_1() })));
    api.get("widget/1").await.unwrap();

    api.transport().set_reply(Reply::NoContent);
    let removed = api.delete("widget/1").await.unwrap();

    let request = api.transport().last();
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.path, "/widget/1");
    assert_eq!(to_json(removed.unwrap().as_ref()), norm_widget_1());
    assert!(api.store().get("widget", "1").unwrap().is_none());
}

#[tokio::test]
async fn delete_failure_keeps_record() {
    let api = api(Reply::Json(json!({ "data": json_widget_1() })));
    api.get("widget/1").await.unwrap();

    api.transport().set_reply(Reply::Status(404));
    let err = api.delete(&record(norm_widget_1())).await.unwrap_err();

    assert_eq!(err.transport().unwrap().status, 404);
    assert!(api.store().get("widget", "1").unwrap().is_some());
}

#[tokio::test]
async fn delete_requires_an_id() {
    let api = api(Reply::NoContent);

    let err = api.delete("widget").await.unwrap_err();

    assert!(matches!(err, ClientError::MissingId { .. }));
    assert!(api.transport().requests().is_empty());
}

#[tokio::test]
async fn search_does_not_touch_the_store() {
    let api = api_with(
        Reply::Json(json!({ "data": [json_widget_1(), json_widget_2()] })),
        following(),
    );

    let result = api.search_with("widget", Some(json!({ "filter": "red" }))).await.unwrap();

    assert!(api.store().is_empty().unwrap());
    assert_eq!(api.transport().last().options, Some(json!({ "filter": "red" })));
    let widgets = result.as_collection().unwrap();
    assert_eq!(widgets.len(), 2);
    assert_eq!(widgets.get("1").unwrap().rel("widgets").unwrap().records().len(), 1);
}

#[tokio::test]
async fn stored_reads_back_with_resolution() {
    let api = api_with(
        Reply::Json(json!({ "data": json_widget_1(), "included": [json_widget_2()] })),
        following(),
    );
    api.get("widget/1").await.unwrap();
    let requests = api.transport().requests().len();

    let widget = api.stored("widget/1").unwrap().unwrap();
    let widgets = api.stored("widget").unwrap().unwrap();

    assert_eq!(api.transport().requests().len(), requests);
    let mut expected = norm_widget_1();
    expected[JV_TAG]["rels"] = json!({ "widgets": [norm_widget_2()] });
    assert_eq!(to_json(&widget), expected);
    assert!(matches!(widgets, Fetched::Collection(ref c) if c.len() == 2));
    assert!(api.stored("machine").unwrap().is_none());
    assert!(api.stored("widget/404").unwrap().is_none());
}

#[cfg(feature = "emitter")]
#[tokio::test]
async fn store_notifies_host_of_merged_and_deleted_records() {
    use std::sync::{Arc, Mutex};

    use jsonapi_store::{Config, JsonApi, ResourceIdentifier, SharedStore, StoreEmitter};

    use crate::support::{json_machine_1, RecordingTransport};

    let merged = Arc::new(Mutex::new(Vec::new()));
    let deleted = Arc::new(Mutex::new(Vec::new()));
    let mut emitter = StoreEmitter::new();
    let sink = Arc::clone(&merged);
    emitter.on_merged(move |identifiers| sink.lock().unwrap().extend(identifiers));
    let sink = Arc::clone(&deleted);
    emitter.on_deleted(move |identifiers| sink.lock().unwrap().extend(identifiers));

    let transport = RecordingTransport::json(json!({
        "data": json_widget_1(),
        "included": [json_widget_2(), json_machine_1()]
    }));
    let api = JsonApi::with_store(
        transport,
        SharedStore::new().with_emitter(emitter),
        Config::default(),
    );

    api.get("widget/1").await.unwrap();
    api.transport().set_reply(Reply::NoContent);
    api.delete("machine/1").await.unwrap();

    let mut merged = merged.lock().unwrap().clone();
    merged.sort();
    assert_eq!(
        merged,
        vec![
            ResourceIdentifier::new("machine", "1"),
            ResourceIdentifier::new("widget", "1"),
            ResourceIdentifier::new("widget", "2"),
        ]
    );
    assert_eq!(
        *deleted.lock().unwrap(),
        vec![ResourceIdentifier::new("machine", "1")]
    );
}
