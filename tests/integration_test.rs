use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};

fn callctl(server_url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("callctl"));
    cmd.env_remove("CALLCTL_BASE_URL")
        .env_remove("CALLCTL_API_KEY")
        .arg("--base-url")
        .arg(server_url)
        .arg("--api-key")
        .arg("k");
    cmd
}

fn status_query(request_id: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("api_key".into(), "k".into()),
        Matcher::UrlEncoded("request_id".into(), request_id.into()),
    ])
}

#[test]
fn test_call_prints_request_id() {
    let mut server = Server::new();

    let mock = server
        .mock("POST", "/api/make_call")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({
            "api_key": "k",
            "number": "+1555",
            "audio_url": "http://x/a.mp3"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"request_id": "abc123"}"#)
        .create();

    callctl(&server.url())
        .arg("call")
        .arg("+1555")
        .arg("--audio-url")
        .arg("http://x/a.mp3")
        .assert()
        .success()
        .stdout(predicates::str::contains("abc123"));

    mock.assert();
}

#[test]
fn test_status_not_found_fails() {
    let mut server = Server::new();

    let _mock = server
        .mock("GET", "/api/call_status")
        .match_query(status_query("missing"))
        .with_status(404)
        .with_body(r#"{"message": "not found"}"#)
        .create();

    callctl(&server.url())
        .arg("status")
        .arg("missing")
        .assert()
        .failure()
        .stderr(predicates::str::contains("not found"));
}

#[test]
fn test_dial_follows_call_to_completion() {
    let mut server = Server::new();

    let _mock_call = server
        .mock("POST", "/api/make_call")
        .with_status(200)
        .with_body(r#"{"request_id": "abc123"}"#)
        .expect(1)
        .create();

    let mock_status = server
        .mock("GET", "/api/call_status")
        .match_query(status_query("abc123"))
        .with_status(200)
        .with_body(r#"{"status": "completed", "duration": 12, "audio_played": true}"#)
        .expect(1)
        .create();

    callctl(&server.url())
        .arg("dial")
        .arg("+1555")
        .arg("--interval")
        .arg("0")
        .assert()
        .success()
        .stdout(predicates::str::contains("abc123"))
        .stdout(predicates::str::contains("finished: status=completed duration=12s"));

    mock_status.assert();
}

#[test]
fn test_poll_exhausted_exit_code() {
    let mut server = Server::new();

    let mock = server
        .mock("GET", "/api/call_status")
        .match_query(status_query("abc123"))
        .with_status(200)
        .with_body(r#"{"status": "ringing"}"#)
        .expect(3)
        .create();

    callctl(&server.url())
        .arg("poll")
        .arg("abc123")
        .arg("--interval")
        .arg("0")
        .arg("--max-attempts")
        .arg("3")
        .assert()
        .code(2)
        .stdout(predicates::str::contains("[3] status=ringing"))
        .stdout(predicates::str::contains("exhausted"));

    mock.assert();
}

#[test]
fn test_poll_survives_server_errors() {
    let mut server = Server::new();

    let _mock = server
        .mock("GET", "/api/call_status")
        .match_query(status_query("abc123"))
        .with_status(500)
        .with_body(r#"{"message": "database unavailable"}"#)
        .expect(2)
        .create();

    callctl(&server.url())
        .arg("poll")
        .arg("abc123")
        .arg("--interval")
        .arg("0")
        .arg("--max-attempts")
        .arg("2")
        .assert()
        .code(2)
        .stdout(predicates::str::contains("transient api fault"))
        .stdout(predicates::str::contains("database unavailable"));
}

#[test]
fn test_missing_api_key_fails() {
    Command::new(cargo::cargo_bin!("callctl"))
        .env_remove("CALLCTL_API_KEY")
        .arg("status")
        .arg("abc")
        .assert()
        .failure()
        .stderr(predicates::str::contains("API key"));
}

#[test]
fn test_api_key_from_environment() {
    let mut server = Server::new();

    let mock = server
        .mock("GET", "/api/call_status")
        .match_query(Matcher::UrlEncoded("api_key".into(), "from-env".into()))
        .with_status(200)
        .with_body(r#"{"status": "in_progress"}"#)
        .create();

    Command::new(cargo::cargo_bin!("callctl"))
        .env("CALLCTL_BASE_URL", server.url())
        .env("CALLCTL_API_KEY", "from-env")
        .arg("status")
        .arg("abc")
        .assert()
        .success()
        .stdout(predicates::str::contains("status=in_progress"));

    mock.assert();
}
