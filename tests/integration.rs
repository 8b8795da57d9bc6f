use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use outlet_locator::api::rest::router;
use outlet_locator::config::LocatorSettings;
use outlet_locator::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(LocatorSettings::default()));
    (router(state.clone()), state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn radius_outlet(id: &str, lat: f64, lng: f64, radius_km: f64) -> Value {
    json!({
        "id": id,
        "name": format!("Outlet {id}"),
        "location": { "lat": lat, "lng": lng },
        "delivery_radius_km": radius_km,
        "estimated_delivery_minutes": 30.0
    })
}

async fn register(app: &axum::Router, outlet: Value) -> Value {
    let res = app
        .clone()
        .oneshot(json_request("POST", "/outlets", outlet))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _state) = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["outlets"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let (app, _state) = setup();
    register(&app, radius_outlet("vikhroli", 19.1568, 72.9940, 10.0)).await;

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("outlets_registered 1"));
}

#[tokio::test]
async fn register_outlet_defaults_to_active_radius() {
    let (app, state) = setup();
    let body = register(
        &app,
        json!({
            "name": "Ghatkopar",
            "location": { "lat": 19.0790, "lng": 72.9080 },
            "delivery_radius_km": 6.0
        }),
    )
    .await;

    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["is_active"], true);
    assert_eq!(body["service_area"]["type"], "radius");
    assert_eq!(body["fee_schedule"]["type"], "flat");
    assert_eq!(state.len(), 1);
}

#[tokio::test]
async fn register_outlet_rejects_bad_input() {
    let (app, _state) = setup();

    let empty_name = json!({
        "name": "  ",
        "location": { "lat": 19.0, "lng": 72.9 },
        "delivery_radius_km": 5.0
    });
    let negative_radius = json!({
        "name": "Kurla",
        "location": { "lat": 19.0, "lng": 72.9 },
        "delivery_radius_km": -1.0
    });
    let bad_latitude = json!({
        "name": "Kurla",
        "location": { "lat": 95.0, "lng": 72.9 },
        "delivery_radius_km": 5.0
    });

    for payload in [empty_name, negative_radius, bad_latitude] {
        let res = app
            .clone()
            .oneshot(json_request("POST", "/outlets", payload))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn get_unknown_outlet_returns_404() {
    let (app, _state) = setup();
    let res = app.oneshot(get_request("/outlets/nowhere")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = body_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("nowhere"));
}

#[tokio::test]
async fn status_toggle_and_delete() {
    let (app, _state) = setup();
    register(&app, radius_outlet("vikhroli", 19.1568, 72.9940, 10.0)).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/outlets/vikhroli/status",
            json!({ "is_active": false }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["is_active"], false);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/outlets/vikhroli")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.oneshot(get_request("/outlets")).await.unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn nearest_outlets_ranks_by_distance() {
    let (app, _state) = setup();
    // Roughly 1, 2 and 5 km north of the customer.
    register(&app, radius_outlet("two", 19.1748, 72.9940, 10.0)).await;
    register(&app, radius_outlet("five", 19.2018, 72.9940, 10.0)).await;
    register(&app, radius_outlet("one", 19.1658, 72.9940, 10.0)).await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/locate/nearest",
            json!({
                "customer": { "lat": 19.1568, "lng": 72.9940, "address": "Vikhroli East" },
                "limit": 2
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], "one");
    assert_eq!(list[1]["id"], "two");
    assert_eq!(list[0]["is_in_service_area"], true);
    assert_eq!(list[0]["eta_minutes"], 32.0);
    assert_eq!(list[0]["quoted_delivery_fee"], 0.0);
}

#[tokio::test]
async fn nearest_outlets_can_drop_out_of_area_results() {
    let (app, _state) = setup();
    register(&app, radius_outlet("tight", 19.1658, 72.9940, 0.5)).await;
    register(&app, radius_outlet("wide", 19.2018, 72.9940, 10.0)).await;

    let all = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/locate/nearest",
            json!({ "customer": { "lat": 19.1568, "lng": 72.9940 } }),
        ))
        .await
        .unwrap();
    let all = body_json(all).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["id"], "tight");
    assert_eq!(all[0]["is_in_service_area"], false);

    let strict = app
        .oneshot(json_request(
            "POST",
            "/locate/nearest",
            json!({
                "customer": { "lat": 19.1568, "lng": 72.9940 },
                "only_in_service_area": true
            }),
        ))
        .await
        .unwrap();
    let strict = body_json(strict).await;
    let list = strict.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "wide");
}

#[tokio::test]
async fn nearest_outlets_rejects_zero_limit() {
    let (app, _state) = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/locate/nearest",
            json!({ "customer": { "lat": 19.1568, "lng": 72.9940 }, "limit": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validate_order_inside_and_outside_radius() {
    let (app, _state) = setup();
    register(&app, radius_outlet("vikhroli", 19.1568, 72.9940, 10.0)).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/outlets/vikhroli/validate",
            json!({ "customer": { "lat": 19.20, "lng": 73.00 } }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let inside = body_json(res).await;
    assert_eq!(inside["can_order"], true);
    assert!(inside.get("reason").is_none());

    let res = app
        .oneshot(json_request(
            "POST",
            "/outlets/vikhroli/validate",
            json!({ "customer": { "lat": 19.40, "lng": 73.00 } }),
        ))
        .await
        .unwrap();
    let outside = body_json(res).await;
    assert_eq!(outside["can_order"], false);
    assert_eq!(outside["rejection"], "out_of_service_area");
    assert!(!outside["reason"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn validate_order_for_unknown_outlet_returns_404() {
    let (app, _state) = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/outlets/ghost/validate",
            json!({ "customer": { "lat": 19.20, "lng": 73.00 } }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directory_sync_accepts_flat_records() {
    let (app, state) = setup();
    register(&app, radius_outlet("stale", 19.0, 72.8, 5.0)).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/outlets/sync",
            json!([
                {
                    "id": "fenced",
                    "name": "Fenced",
                    "latitude": 19.1568,
                    "longitude": 72.9940,
                    "deliveryRadius": 50.0,
                    "serviceAreaType": "geofence",
                    "geofenceCoordinates": [
                        { "lat": 19.10, "lng": 73.00 },
                        { "lat": 19.10, "lng": 73.05 },
                        { "lat": 19.20, "lng": 73.05 },
                        { "lat": 19.20, "lng": 73.00 }
                    ],
                    "isActive": true,
                    "deliveryFeeType": "tiered",
                    "baseDeliveryDistanceKm": 5.0,
                    "baseDeliveryFee": 30.0,
                    "perKmDeliveryFee": 5.0
                },
                {
                    "id": "closed",
                    "name": "Closed",
                    "latitude": 19.1568,
                    "longitude": 72.9940,
                    "deliveryRadius": 10.0,
                    "isActive": false
                }
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["synced"], 2);
    assert_eq!(state.len(), 2);
    assert!(state.get("stale").is_none());

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/locate/nearest",
            json!({ "customer": { "lat": 19.15, "lng": 72.95 } }),
        ))
        .await
        .unwrap();
    let ranked = body_json(res).await;
    let list = ranked.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "fenced");
    assert_eq!(list[0]["is_in_service_area"], false);

    let res = app
        .oneshot(json_request(
            "POST",
            "/outlets/closed/validate",
            json!({ "customer": { "lat": 19.1568, "lng": 72.9940 } }),
        ))
        .await
        .unwrap();
    let closed = body_json(res).await;
    assert_eq!(closed["can_order"], false);
    assert_eq!(closed["reason"], "outlet currently closed");
}

fn flat_record(id: &str, name: &str, radius_km: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "latitude": 19.1568,
        "longitude": 72.9940,
        "deliveryRadius": radius_km,
        "isActive": true
    })
}

#[tokio::test]
async fn directory_sync_rejects_invalid_records_and_keeps_directory() {
    let (app, state) = setup();
    register(&app, radius_outlet("kept", 19.0, 72.8, 5.0)).await;

    let bad_batches = [
        json!([flat_record("ok", "Ok", 5.0), flat_record("neg", "Negative", -5.0)]),
        json!([flat_record("blank", "  ", 5.0)]),
        json!([flat_record("", "No id", 5.0)]),
        json!([flat_record("twin", "Twin A", 5.0), flat_record("twin", "Twin B", 8.0)]),
        json!([{
            "id": "fence",
            "name": "Fence",
            "latitude": 19.1568,
            "longitude": 72.9940,
            "serviceAreaType": "geofence",
            "geofenceCoordinates": [
                { "lat": 19.10, "lng": 73.00 },
                { "lat": 119.10, "lng": 73.05 },
                { "lat": 19.20, "lng": 73.05 }
            ],
            "isActive": true
        }]),
    ];

    for batch in bad_batches {
        let res = app
            .clone()
            .oneshot(json_request("PUT", "/outlets/sync", batch))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["error"].as_str().is_some());
    }

    assert_eq!(state.len(), 1);
    assert!(state.get("kept").is_some());
}

#[tokio::test]
async fn directory_sync_reports_stored_count() {
    let (app, state) = setup();
    let res = app
        .oneshot(json_request(
            "PUT",
            "/outlets/sync",
            json!([
                flat_record("andheri", "Andheri", 5.0),
                flat_record("powai", "Powai", 0.0),
                flat_record("worli", "Worli", 7.5)
            ]),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["synced"], 3);
    assert_eq!(state.len(), 3);
}
