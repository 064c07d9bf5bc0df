use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use steady_day::models::{ReminderResponse, TodayResponse};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("steady_day_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_steady_day"))
        .env("PORT", port.to_string())
        .env("STEADYDAY_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn today(client: &Client, base_url: &str) -> TodayResponse {
    client
        .get(format!("{base_url}/api/today"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_today_has_default_schedule() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today = today(&client, &server.base_url).await;
    assert!(!today.record.date.is_empty());
    assert!(today.record.schedule.morning_target.is_some());
    assert!(!today.status.message.is_empty());
}

#[tokio::test]
async fn http_toggle_meds_round_trip() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server.base_url).await;

    let toggled: TodayResponse = client
        .post(format!("{}/api/meds/evening/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(toggled.record.meds.evening.taken, !before.record.meds.evening.taken);
    assert_eq!(
        toggled.record.meds.evening.time.is_some(),
        toggled.record.meds.evening.taken
    );

    let restored: TodayResponse = client
        .post(format!("{}/api/meds/evening/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(restored.record.meds.evening.taken, before.record.meds.evening.taken);
    assert_eq!(today(&client, &server.base_url).await.record.meds, restored.record.meds);
}

#[tokio::test]
async fn http_rejects_unknown_slot() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/meds/noon/toggle", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.unwrap(),
        "slot must be 'morning' or 'evening'"
    );
}

#[tokio::test]
async fn http_glucose_appends_and_validates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/api/glucose", server.base_url))
        .json(&serde_json::json!({ "value": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let added: TodayResponse = client
        .post(format!("{}/api/glucose", server.base_url))
        .json(&serde_json::json!({ "value": 112.5, "tag": "Fasting", "note": " pre-walk " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(added.record.glucose.len(), before.record.glucose.len() + 1);
    let last = added.record.glucose.last().unwrap();
    assert_eq!(last.value, 112.5);
    assert_eq!(last.tag, "Fasting");
    assert_eq!(last.note, "pre-walk");
}

#[tokio::test]
async fn http_schedule_validates_targets() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/api/schedule", server.base_url))
        .json(&serde_json::json!({ "morningTarget": "25:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.unwrap(),
        "Morning target must be HH:MM (ex: 08:00)"
    );

    let saved: TodayResponse = client
        .put(format!("{}/api/schedule", server.base_url))
        .json(&serde_json::json!({ "morningTarget": "7:30", "eveningTarget": "" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved.record.schedule.morning_target.as_deref(), Some("07:30"));
    assert!(saved.record.schedule.evening_target.is_some());
}

#[tokio::test]
async fn http_reminder_toggle_reports_delay() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let first: ReminderResponse = client
        .post(format!("{}/api/reminders/morning/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: ReminderResponse = client
        .post(format!("{}/api/reminders/morning/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_ne!(first.enabled, second.enabled);
    for reminder in [first, second] {
        assert_eq!(reminder.fires_in_minutes.is_some(), reminder.enabled);
        assert!(reminder.fires_in_minutes.unwrap_or(0) < 1440);
    }
}

#[tokio::test]
async fn http_history_and_export() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today = today(&client, &server.base_url).await;
    let history: serde_json::Value = client
        .get(format!("{}/api/history", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["days"][0]["date"], today.record.date.as_str());

    let export = client
        .get(format!("{}/export?days=3", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(export.status().is_success());
    let body = export.text().await.unwrap();
    assert!(body.contains("SteadyDay — Doctor Export"));
    assert!(body.contains("Last 3 days summary"));

    let index = client.get(&server.base_url).send().await.unwrap();
    assert!(index.status().is_success());
    assert!(index.text().await.unwrap().contains("id=\"lateStatus\""));
}
