//! Command lines in, JSON responses out, exactly as the binary exchanges them.

use agrimarket::config::MarketConfig;
use agrimarket::headless::Driver;
use serde_json::{json, Value};

fn driver_at(path: &str) -> (Driver, Value) {
    let mut driver = Driver::new(MarketConfig::default());
    let ready = serde_json::to_value(driver.start(path)).unwrap();
    (driver, ready)
}

async fn send(driver: &mut Driver, command: Value) -> Value {
    let response = driver.handle_line(&command.to_string()).await;
    serde_json::to_value(response).unwrap()
}

fn farmer_doc(uid: &str) -> Value {
    json!({
        "uid": uid,
        "name": "Asha",
        "role": "farmer",
        "phoneNumber": "9876543210",
        "district": "Nashik",
        "state": "Maharashtra"
    })
}

#[tokio::test]
async fn test_e2e_ready_reports_loading_view() {
    let (_driver, ready) = driver_at("/farmer/dashboard");
    assert_eq!(ready["event"], "Ready");
    assert_eq!(ready["view"]["state"], "init");
    assert_eq!(ready["view"]["loading"], true);
    assert_eq!(ready["view"]["path"], "/farmer/dashboard");
}

#[tokio::test]
async fn test_e2e_login_then_profile_lands_on_dashboard() {
    let (mut driver, _) = driver_at("/login");

    let r = send(&mut driver, json!({ "cmd": "SetIdentity", "uid": "F1" })).await;
    assert_eq!(r["status"], "Ok");
    assert_eq!(r["view"]["loading"], true);
    assert_eq!(r["redirects"], json!([]));

    let r = send(
        &mut driver,
        json!({ "cmd": "ProfileValue", "uid": "F1", "data": farmer_doc("F1") }),
    )
    .await;
    assert_eq!(r["view"]["state"], "authenticated");
    assert_eq!(r["view"]["profile"]["role"], "farmer");
    assert_eq!(r["redirects"], json!(["/farmer/dashboard"]));

    // Only what the command caused is reported.
    let r = send(&mut driver, json!({ "cmd": "View" })).await;
    assert_eq!(r["redirects"], json!([]));
    assert_eq!(r["view"]["path"], "/farmer/dashboard");
}

#[tokio::test]
async fn test_e2e_profile_error_mid_session_keeps_dashboard() {
    let (mut driver, _) = driver_at("/farmer/dashboard");
    send(&mut driver, json!({ "cmd": "SetIdentity", "uid": "F1" })).await;
    send(
        &mut driver,
        json!({ "cmd": "ProfileValue", "uid": "F1", "data": farmer_doc("F1") }),
    )
    .await;

    let r = send(
        &mut driver,
        json!({ "cmd": "ProfileError", "uid": "F1", "message": "rules changed" }),
    )
    .await;
    assert_eq!(r["view"]["state"], "authenticated");
    assert_eq!(r["view"]["profile"]["uid"], "F1");
    assert_eq!(r["redirects"], json!([]));
    let notes = r["notifications"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "Permission Error");
    assert!(notes[0]["description"].as_str().unwrap().contains("users/F1"));
}

#[tokio::test]
async fn test_e2e_unavailable_backend_is_reported() {
    let (mut driver, _) = driver_at("/buyer/marketplace");
    send(&mut driver, json!({ "cmd": "SetIdentity", "uid": "B1" })).await;

    let r = send(
        &mut driver,
        json!({
            "cmd": "ProfileError",
            "uid": "B1",
            "message": "backend offline",
            "code": "unavailable"
        }),
    )
    .await;
    assert_eq!(r["view"]["state"], "profile-unavailable");
    assert_eq!(r["view"]["loading"], false);
    assert_eq!(r["redirects"], json!(["/login"]));
    let notes = r["notifications"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0]["description"]
        .as_str()
        .unwrap()
        .contains("backend offline"));
}

#[tokio::test]
async fn test_e2e_sign_up_writes_profile_and_routes() {
    let (mut driver, _) = driver_at("/signup");
    let r = send(
        &mut driver,
        json!({
            "cmd": "SignUp",
            "form": {
                "name": "Ravi",
                "email": "ravi@test.com",
                "phoneNumber": "9123456780",
                "password": "secret1",
                "district": "Guntur",
                "state": "Andhra Pradesh",
                "role": "owner"
            }
        }),
    )
    .await;
    assert_eq!(r["status"], "Ok");
    assert_eq!(r["view"]["profile"]["role"], "owner");
    assert_eq!(r["redirects"], json!(["/owner/dashboard"]));
}

#[tokio::test]
async fn test_e2e_failed_sign_in_is_an_error_response() {
    let (mut driver, _) = driver_at("/login");
    let r = send(
        &mut driver,
        json!({ "cmd": "SignIn", "email": "nobody@test.com", "password": "wrong1" }),
    )
    .await;
    assert_eq!(r["status"], "Err");
    assert!(r["message"].as_str().unwrap().contains("invalid credentials"));
}

#[tokio::test]
async fn test_e2e_bad_line_does_not_stop_driver() {
    let (mut driver, _) = driver_at("/");
    let r = serde_json::to_value(driver.handle_line("{not json").await).unwrap();
    assert_eq!(r["status"], "Err");
    assert!(r["message"].as_str().unwrap().starts_with("bad command"));

    let r = send(&mut driver, json!({ "cmd": "SetIdentity", "uid": null })).await;
    assert_eq!(r["view"]["state"], "unauthenticated");
}

#[tokio::test]
async fn test_e2e_shutdown_stops_driver() {
    let (mut driver, _) = driver_at("/");
    assert!(!driver.is_shut_down());
    let r = send(&mut driver, json!({ "cmd": "Shutdown" })).await;
    assert_eq!(r["status"], "Ok");
    assert!(driver.is_shut_down());
}
