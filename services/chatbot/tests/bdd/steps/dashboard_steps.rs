//! BDD step definitions for the dashboard feature

use axum::body::Body;
use axum::http::Request;
use cucumber::{then, when};
use tower::ServiceExt;

use chatbot::dashboard::{build_router, DashboardState};
use chatbot::updates::UpdateHub;

use crate::world::ChatbotWorld;

#[when(expr = "the dashboard requests {string}")]
async fn dashboard_request(world: &mut ChatbotWorld, uri: String) {
    let app = build_router(DashboardState::new(
        world.store().clone(),
        UpdateHub::default(),
    ));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    world.response_status = Some(response.status().as_u16());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.response_body = Some(String::from_utf8(body.to_vec()).unwrap());
}

#[then(expr = "the response status is {int}")]
fn response_status(world: &mut ChatbotWorld, expected: u16) {
    assert_eq!(world.response_status, Some(expected));
}

#[then(expr = "the response lists {int} command(s)")]
fn response_lists(world: &mut ChatbotWorld, expected: usize) {
    let body = world.response_body.as_ref().expect("no response body");
    let json: Vec<serde_json::Value> = serde_json::from_str(body).unwrap();
    assert_eq!(json.len(), expected);
    for record in &json {
        assert!(record["channel"].is_string());
        assert!(record["match_expr"].is_string());
        assert!(record["command"].is_string());
    }
}

#[then(expr = "the response should contain {string}")]
fn response_contains(world: &mut ChatbotWorld, expected: String) {
    let body = world.response_body.as_ref().expect("no response body");
    assert!(
        body.contains(&expected),
        "Expected response to contain '{}', but it didn't.\nResponse body:\n{}",
        expected,
        body
    );
}
