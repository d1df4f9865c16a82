use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::Duration;
use tempfile::TempDir;

const BIND: &str = "127.0.0.1:7462";

fn desk_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("desk");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/desk.sqlite"

[server]
bind = "{}"
"#,
        root.display(),
        BIND
    );

    let config_path = config_dir.join("desk.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_desk(config_path: &Path, args: &[&str]) -> bool {
    Command::new(desk_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap()
        .status
        .success()
}

/// Kills the server process when the test ends, pass or fail.
struct ServerGuard(Child);

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn spawn_server(config_path: &Path) -> ServerGuard {
    let child = Command::new(desk_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("serve")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .expect("failed to spawn desk serve");
    ServerGuard(child)
}

fn wait_until_ready(client: &reqwest::blocking::Client) {
    let url = format!("http://{}/health", BIND);
    for _ in 0..50 {
        if let Ok(resp) = client.get(&url).send() {
            if resp.status().is_success() {
                return;
            }
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    panic!("server did not become ready on {}", BIND);
}

fn url(path: &str) -> String {
    format!("http://{}{}", BIND, path)
}

#[test]
fn test_http_api_end_to_end() {
    let (_tmp, config_path) = setup_test_env();

    assert!(run_desk(&config_path, &["init"]), "init failed");

    let _server = spawn_server(&config_path);
    let client = reqwest::blocking::Client::new();
    wait_until_ready(&client);

    // Health check.
    let health: serde_json::Value = client
        .get(url("/health"))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(health["status"], "ok");

    // Create a customer.
    let resp = client
        .post(url("/api/customers"))
        .json(&serde_json::json!({
            "name": "Ana García",
            "email": "ana@x.com",
            "phone": "555-0001"
        }))
        .send()
        .unwrap();
    assert!(resp.status().is_success());
    let customer: serde_json::Value = resp.json().unwrap();
    assert_eq!(customer["id"], 1);
    assert!(customer["created_at"].as_str().unwrap().contains('T'));

    // Duplicate email is rejected.
    let resp = client
        .post(url("/api/customers"))
        .json(&serde_json::json!({
            "name": "Otra Ana",
            "email": "ana@x.com",
            "phone": "555-0009"
        }))
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let err: serde_json::Value = resp.json().unwrap();
    assert_eq!(err["error"]["code"], "duplicate_email");

    // Validation failure: empty name.
    let resp = client
        .post(url("/api/customers"))
        .json(&serde_json::json!({
            "name": "",
            "email": "otra@x.com",
            "phone": ""
        }))
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let err: serde_json::Value = resp.json().unwrap();
    assert_eq!(err["error"]["code"], "bad_request");

    // Create an incident; the date defaults and the description classifies
    // as CRITICAL with at least two markers matched.
    let resp = client
        .post(url("/api/incidents"))
        .json(&serde_json::json!({
            "customer_id": 1,
            "description": "servidor caído urgente",
            "status": "ABIERTA"
        }))
        .send()
        .unwrap();
    assert!(resp.status().is_success());
    let incident: serde_json::Value = resp.json().unwrap();
    assert_eq!(incident["priority_tier"], "CRITICAL");
    assert!(incident["priority_score"].as_f64().unwrap() >= 0.8);
    assert!(!incident["date"].as_str().unwrap().is_empty());

    // Unknown customer reference is rejected.
    let resp = client
        .post(url("/api/incidents"))
        .json(&serde_json::json!({
            "customer_id": 99,
            "description": "consulta",
            "status": "ABIERTA"
        }))
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let err: serde_json::Value = resp.json().unwrap();
    assert_eq!(err["error"]["code"], "unknown_customer");

    // Listings.
    let customers: serde_json::Value = client
        .get(url("/api/customers/sorted"))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(customers.as_array().unwrap().len(), 1);

    let incidents: serde_json::Value = client
        .get(url("/api/customers/1/incidents"))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(incidents.as_array().unwrap().len(), 1);
    assert_eq!(incidents[0]["description"], "servidor caído urgente");

    let resp = client
        .get(url("/api/customers/99/incidents"))
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    let err: serde_json::Value = resp.json().unwrap();
    assert_eq!(err["error"]["code"], "not_found");

    // Status update returns the full transition summary.
    let resp = client
        .put(url("/api/incidents/1/status"))
        .json(&serde_json::json!({ "status": "CERRADA" }))
        .send()
        .unwrap();
    assert!(resp.status().is_success());
    let transition: serde_json::Value = resp.json().unwrap();
    assert_eq!(transition["previous_status"], "ABIERTA");
    assert_eq!(transition["new_status"], "CERRADA");
    let message = transition["message"].as_str().unwrap();
    for needle in [
        "Ana García",
        "ana@x.com",
        "555-0001",
        "servidor caído urgente",
        "ABIERTA",
        "CERRADA",
    ] {
        assert!(message.contains(needle), "missing '{}' in: {}", needle, message);
    }

    // Bulk upload: 3 customer rows (1 duplicate email within the batch)
    // and 2 incident rows (1 unknown reference).
    let resp = client
        .post(url("/api/etl/upload"))
        .json(&serde_json::json!({
            "customers": "id;name;email;phone\n\
                          1;Bruno Díaz;bruno@y.com;555-0002\n\
                          2;Carla López;carla@y.com;555-0003\n\
                          3;Bruno Otra Vez;bruno@y.com;555-0004\n",
            "incidents": "id;customer_id;date;description;status\n\
                          1;1;05-02-2024;equipo lento;ABIERTA\n\
                          2;77;06-02-2024;consulta general;ABIERTA\n"
        }))
        .send()
        .unwrap();
    assert!(resp.status().is_success());
    let report: serde_json::Value = resp.json().unwrap();
    assert_eq!(report["lines_read"], 5);
    assert_eq!(report["rows_inserted"], 3);
    assert_eq!(report["skip_log"].as_array().unwrap().len(), 1);
    assert!(report["message"]
        .as_str()
        .unwrap()
        .contains("customer id 77 does not exist"));

    // Malformed upload fails the whole call.
    let resp = client
        .post(url("/api/etl/upload"))
        .json(&serde_json::json!({ "customers": "" }))
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let err: serde_json::Value = resp.json().unwrap();
    assert_eq!(err["error"]["code"], "malformed_input");

    // Statistics reflect everything above.
    let stats: serde_json::Value = client
        .get(url("/api/stats"))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(stats["total_customers"], 3);
    assert_eq!(stats["total_incidents"], 2);
    assert_eq!(stats["by_tier"]["critical"], 1);
    assert_eq!(stats["by_tier"]["high"], 1);
    assert_eq!(stats["by_status"]["closed"], 1);
    assert_eq!(stats["by_status"]["open"], 1);
}
