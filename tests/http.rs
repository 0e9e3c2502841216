use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct PeriodResponse {
    id: String,
    week_number: u32,
    label: String,
}

#[derive(Debug, Deserialize)]
struct HabitView {
    habit_name: String,
    days: Vec<String>,
    days_display: String,
    time_slot: String,
    time_label: String,
}

#[derive(Debug, Deserialize)]
struct HabitsResponse {
    period: PeriodResponse,
    habits: Vec<HabitView>,
}

#[derive(Debug, Deserialize)]
struct FormatResponse {
    days_display: String,
}

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
    path.push(format!("habit_journey_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/period")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_habit_journey"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("HABIT_SESSION_ID", "session_http_test")
        .env_remove("POSTHOG_API_KEY")
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

async fn clear(client: &Client, server: &TestServer) {
    let response = client
        .delete(format!("{}/api/habits", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

async fn habits(client: &Client, server: &TestServer) -> HabitsResponse {
    client
        .get(format!("{}/api/habits", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_period_describes_current_week() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let period: PeriodResponse = client
        .get(format!("{}/api/period", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(period.id.contains("-W"));
    assert!((1..=53).contains(&period.week_number));
    assert!(period.label.contains(" - "));
}

#[tokio::test]
async fn http_inserted_records_are_grouped() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    clear(&client, &server).await;

    let response = client
        .post(format!("{}/api/records", server.base_url))
        .json(&serde_json::json!({
            "records": [
                { "habit_name": "Walk", "day_of_week": 1, "reminder_time": "07:00:00", "timezone": "America/Chicago" },
                { "habit_name": "Stretch", "day_of_week": 6, "reminder_time": "21:00:00", "timezone": "America/Chicago" },
                { "habit_name": "Walk", "day_of_week": 3, "reminder_time": "07:00:00", "timezone": "America/Chicago" },
                { "habit_name": "Stretch", "day_of_week": 0, "reminder_time": "21:00:00", "timezone": "America/Chicago" },
                { "habit_name": "Walk", "day_of_week": 9, "reminder_time": "07:00:00", "timezone": "America/Chicago" }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let listed = habits(&client, &server).await;
    let names: Vec<_> = listed.habits.iter().map(|h| h.habit_name.as_str()).collect();
    assert_eq!(names, vec!["Walk", "Stretch"]);

    let stretch = &listed.habits[1];
    assert_eq!(stretch.days, vec!["Saturday", "Sunday"]);
    assert_eq!(stretch.days_display, "Weekends");
    assert_eq!(stretch.time_slot, "bedtime");
    assert_eq!(stretch.time_label, "Before Bedtime (9-10pm)");

    let walk = &listed.habits[0];
    assert_eq!(walk.days_display, "Monday and Wednesday");
    assert_eq!(walk.time_slot, "early-morning");
    assert!(!listed.period.id.is_empty());
}

#[tokio::test]
async fn http_save_replaces_and_drops_empty_habits() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    clear(&client, &server).await;

    let response = client
        .put(format!("{}/api/habits", server.base_url))
        .json(&serde_json::json!({
            "habits": [
                { "habit_name": "Yoga", "days": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"], "time_slot": "lunch" },
                { "habit_name": "Nap", "days": [], "time_slot": "afternoon" }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let saved: HabitsResponse = response.json().await.unwrap();
    assert_eq!(saved.habits.len(), 1);
    assert_eq!(saved.habits[0].days_display, "Weekdays and Saturday");

    let response = client
        .put(format!("{}/api/habits", server.base_url))
        .json(&serde_json::json!({
            "habits": [
                { "habit_name": "Yoga", "days": ["Sat", "Sun", "Mon", "Wed"] }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let listed = habits(&client, &server).await;
    assert_eq!(listed.habits.len(), 1);
    let yoga = &listed.habits[0];
    assert_eq!(yoga.days_display, "Weekends and Monday and Wednesday");
    assert_eq!(yoga.time_slot, "mid-morning");
}

#[tokio::test]
async fn http_save_rejects_bad_input() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let duplicate = client
        .put(format!("{}/api/habits", server.base_url))
        .json(&serde_json::json!({
            "habits": [
                { "habit_name": "Walk", "days": ["Mon"] },
                { "habit_name": "Walk", "days": ["Tue"] }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let unknown_day = client
        .put(format!("{}/api/habits", server.base_url))
        .json(&serde_json::json!({
            "habits": [{ "habit_name": "Walk", "days": ["Someday"] }]
        }))
        .send()
        .await
        .unwrap();
    assert!(unknown_day.status().is_client_error());
}

#[tokio::test]
async fn http_format_days() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let cases = [
        ("", "Not set"),
        ("Mon,Tue,Wed,Thu,Fri", "Weekdays"),
        ("Sunday,Saturday", "Weekends"),
        ("Fri,Mon,Wed", "Monday, Wednesday, and Friday"),
    ];
    for (days, expected) in cases {
        let formatted: FormatResponse = client
            .get(format!("{}/api/format", server.base_url))
            .query(&[("days", days)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(formatted.days_display, expected, "days={days}");
    }
}

#[derive(Debug, Deserialize)]
struct JourneyResponse {
    session_id: String,
    form_data: serde_json::Value,
    current_step: String,
    completed: bool,
}

#[tokio::test]
async fn http_journey_lifecycle() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/journey", server.base_url);

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let empty: Option<JourneyResponse> = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert!(empty.is_none());

    let missing = client.post(format!("{url}/complete")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let saved: JourneyResponse = client
        .put(&url)
        .json(&serde_json::json!({ "form_data": { "goal": "move more" }, "current_step": "goals" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved.session_id, "session_http_test");
    assert_eq!(saved.current_step, "goals");
    assert!(!saved.completed);

    let blank_step = client
        .put(&url)
        .json(&serde_json::json!({ "form_data": {}, "current_step": " " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank_step.status(), StatusCode::BAD_REQUEST);

    let completed: JourneyResponse = client
        .post(format!("{url}/complete"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(completed.completed);
    assert_eq!(completed.form_data["goal"], "move more");

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let gone: Option<JourneyResponse> = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert!(gone.is_none());
}
