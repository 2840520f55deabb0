//! Check-in orchestration scenarios over an in-memory backend

use std::collections::HashMap;
use std::sync::Mutex;

use valoriza_client::{
    ApiError, Category, CheckInEngine, GameBackend, Mission, Notifier, Place, PlaceRef, Result,
    User, UserRef,
};

// ============================================================================
// Test doubles
// ============================================================================

/// In-memory game backend
struct MemoryBackend {
    authenticated: bool,
    places: HashMap<u64, Place>,
    user: Mutex<User>,
    missions: Mutex<Vec<Mission>>,
    /// Mission key whose completion call fails (for best-effort tests)
    fail_completion: Option<String>,
    /// Every point delta written, in order
    point_writes: Mutex<Vec<u64>>,
}

impl MemoryBackend {
    fn new(user: User, places: Vec<Place>, missions: Vec<Mission>) -> Self {
        Self {
            authenticated: true,
            places: places.into_iter().map(|p| (p.id, p)).collect(),
            user: Mutex::new(user),
            missions: Mutex::new(missions),
            fail_completion: None,
            point_writes: Mutex::new(Vec::new()),
        }
    }

    fn user(&self) -> User {
        self.user.lock().unwrap().clone()
    }

    fn point_writes(&self) -> Vec<u64> {
        self.point_writes.lock().unwrap().clone()
    }

    fn completions(&self, key: &str) -> usize {
        self.missions
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.key() == key)
            .map(|m| m.completed_by.len())
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl GameBackend for MemoryBackend {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn get_place(&self, place_id: u64) -> Result<Place> {
        self.places
            .get(&place_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("place {}", place_id)))
    }

    async fn me(&self) -> Result<User> {
        Ok(self.user())
    }

    async fn record_daily_scan(&self, _user_id: u64, place_id: u64) -> Result<()> {
        let mut user = self.user.lock().unwrap();
        if !user.daily_scans.iter().any(|p| p.id == place_id) {
            user.daily_scans.push(PlaceRef { id: place_id });
        }
        Ok(())
    }

    async fn add_points(&self, _user_id: u64, delta: u64) -> Result<User> {
        let mut user = self.user.lock().unwrap();
        user.points += delta;
        self.point_writes.lock().unwrap().push(delta);
        Ok(user.clone())
    }

    async fn list_missions(&self) -> Result<Vec<Mission>> {
        Ok(self.missions.lock().unwrap().clone())
    }

    async fn completed_missions(&self, user_id: u64) -> Result<Vec<Mission>> {
        Ok(self
            .missions
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.completed_by.iter().any(|u| u.id == user_id))
            .cloned()
            .collect())
    }

    async fn get_mission(&self, key: &str) -> Result<Mission> {
        self.missions
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.key() == key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("mission {}", key)))
    }

    async fn complete_mission(&self, key: &str, user_id: u64) -> Result<()> {
        if self.fail_completion.as_deref() == Some(key) {
            return Err(ApiError::Server {
                status: 500,
                message: "simulated failure".to_string(),
            });
        }
        let mut missions = self.missions.lock().unwrap();
        if let Some(mission) = missions.iter_mut().find(|m| m.key() == key) {
            mission.completed_by.push(UserRef { id: user_id });
        }
        Ok(())
    }
}

/// Notifier that records every emitted message
#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingNotifier {
    fn events(&self) -> Vec<(&'static str, String)> {
        self.events.lock().unwrap().clone()
    }

    fn has_level(&self, level: &str) -> bool {
        self.events().iter().any(|(l, _)| *l == level)
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.events.lock().unwrap().push(("success", message.to_string()));
    }

    fn info(&self, message: &str) {
        self.events.lock().unwrap().push(("info", message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.events.lock().unwrap().push(("warn", message.to_string()));
    }

    fn error(&self, message: &str) {
        self.events.lock().unwrap().push(("error", message.to_string()));
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn user(points: u64) -> User {
    serde_json::from_value(serde_json::json!({
        "id": 1,
        "username": "joao.silva",
        "pontos": points,
    }))
    .unwrap()
}

fn place(id: u64, category: Category, points: Option<u32>) -> Place {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "nome": format!("place-{}", id),
        "categoria": category.as_str(),
        "pontuacao": points,
    }))
    .unwrap()
}

fn mission(id: u64, key: &str, points: u32, rule: &str) -> Mission {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "documentId": key,
        "nome": format!("mission-{}", key),
        "pontos": points,
        "rule": rule,
    }))
    .unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn first_check_in_awards_place_points() {
    let backend = MemoryBackend::new(user(0), vec![place(10, Category::Tourism, Some(40))], vec![]);
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let outcome = engine.check_in(10).await.unwrap();

    assert_eq!(outcome.points_earned, 40);
    assert_eq!(outcome.place_points, 40);
    assert_eq!(outcome.mission_points, 0);

    let u = backend.user();
    assert_eq!(u.points, 40);
    assert_eq!(u.daily_scans.len(), 1);
    assert_eq!(u.daily_scans[0].id, 10);
    assert!(notifier.has_level("success"));
}

#[tokio::test]
async fn unset_place_award_defaults_to_ten() {
    let backend = MemoryBackend::new(user(0), vec![place(10, Category::Other, None)], vec![]);
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let outcome = engine.check_in(10).await.unwrap();
    assert_eq!(outcome.points_earned, 10);
}

#[tokio::test]
async fn duplicate_same_day_scan_earns_nothing() {
    let mut u = user(40);
    u.daily_scans.push(PlaceRef { id: 10 });
    let backend = MemoryBackend::new(u, vec![place(10, Category::Tourism, Some(40))], vec![]);
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let outcome = engine.check_in(10).await.unwrap();

    assert_eq!(outcome.points_earned, 0);
    let u = backend.user();
    assert_eq!(u.points, 40);
    assert_eq!(u.daily_scans.len(), 1);
    assert!(backend.point_writes().is_empty());
    assert!(notifier.has_level("warn"));
}

#[tokio::test]
async fn unauthenticated_check_in_makes_no_mutation() {
    let mut backend =
        MemoryBackend::new(user(0), vec![place(10, Category::Tourism, Some(40))], vec![]);
    backend.authenticated = false;
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let result = engine.check_in(10).await;

    assert!(matches!(result, Err(ApiError::Unauthenticated)));
    assert_eq!(backend.user().points, 0);
    assert!(backend.user().daily_scans.is_empty());
    assert!(notifier.has_level("warn"));
}

#[tokio::test]
async fn unknown_place_aborts_with_error_notification() {
    let backend = MemoryBackend::new(user(0), vec![], vec![]);
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let result = engine.check_in(404).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert!(notifier.has_level("error"));
    assert!(backend.point_writes().is_empty());
}

#[tokio::test]
async fn threshold_mission_completes_in_the_crossing_call() {
    // One place already scanned today; this check-in brings the count to 2.
    let mut u = user(40);
    u.daily_scans.push(PlaceRef { id: 100 });

    let backend = MemoryBackend::new(
        u,
        vec![place(10, Category::Tourism, Some(40))],
        vec![mission(1, "m-scans", 30, "daily_places_scanned>=2")],
    );
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let outcome = engine.check_in(10).await.unwrap();

    assert_eq!(outcome.place_points, 40);
    assert_eq!(outcome.mission_points, 30);
    assert_eq!(outcome.points_earned, 70);
    assert_eq!(backend.user().points, 40 + 70);
    assert_eq!(backend.completions("m-scans"), 1);
}

#[tokio::test]
async fn below_threshold_mission_stays_open() {
    let backend = MemoryBackend::new(
        user(0),
        vec![place(10, Category::Tourism, Some(40))],
        vec![mission(1, "m-scans", 50, "daily_places_scanned>=5")],
    );
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let outcome = engine.check_in(10).await.unwrap();

    assert_eq!(outcome.points_earned, 40);
    assert_eq!(backend.completions("m-scans"), 0);
}

#[tokio::test]
async fn completed_mission_is_never_reawarded() {
    let backend = MemoryBackend::new(
        user(0),
        vec![
            place(10, Category::Tourism, Some(40)),
            place(11, Category::History, Some(25)),
        ],
        vec![mission(1, "m-new", 20, "visit_new_place")],
    );
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let first = engine.check_in(10).await.unwrap();
    assert_eq!(first.points_earned, 60);
    assert_eq!(backend.completions("m-new"), 1);

    // Second sweep: the mission is absent from the available list
    let second = engine.check_in(11).await.unwrap();
    assert_eq!(second.points_earned, 25);
    assert_eq!(second.mission_points, 0);
    assert_eq!(backend.completions("m-new"), 1);
    assert_eq!(backend.user().points, 60 + 25);
}

#[tokio::test]
async fn category_mission_requires_gastronomy() {
    let backend = MemoryBackend::new(
        user(0),
        vec![
            place(10, Category::History, Some(40)),
            place(11, Category::Gastronomy, Some(60)),
        ],
        vec![mission(1, "m-gastro", 30, "checkin_category_gastronomia")],
    );
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let history = engine.check_in(10).await.unwrap();
    assert_eq!(history.mission_points, 0);
    assert_eq!(backend.completions("m-gastro"), 0);

    let gastronomy = engine.check_in(11).await.unwrap();
    assert_eq!(gastronomy.mission_points, 30);
    assert_eq!(backend.completions("m-gastro"), 1);
}

#[tokio::test]
async fn mission_failure_does_not_abort_the_sweep() {
    let mut backend = MemoryBackend::new(
        user(0),
        vec![place(10, Category::Gastronomy, Some(40))],
        vec![
            mission(1, "m-new", 20, "visit_new_place"),
            mission(2, "m-gastro", 30, "checkin_category_gastronomia"),
        ],
    );
    backend.fail_completion = Some("m-new".to_string());
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let outcome = engine.check_in(10).await.unwrap();

    // The failing mission is skipped; the other still completes and pays out
    assert_eq!(outcome.place_points, 40);
    assert_eq!(outcome.mission_points, 30);
    assert_eq!(outcome.completed_missions, vec!["mission-m-gastro".to_string()]);
    assert_eq!(backend.completions("m-new"), 0);
    assert_eq!(backend.completions("m-gastro"), 1);
}

#[tokio::test]
async fn end_to_end_first_visit_with_new_place_mission() {
    // User with 0 points scans a new 50-point place with a 20-point
    // visit_new_place mission available
    let backend = MemoryBackend::new(
        user(0),
        vec![place(10, Category::Culture, Some(50))],
        vec![mission(1, "m-new", 20, "visit_new_place")],
    );
    let notifier = RecordingNotifier::default();
    let engine = CheckInEngine::new(&backend, &notifier);

    let outcome = engine.check_in(10).await.unwrap();

    assert_eq!(outcome.points_earned, 70);
    assert_eq!(outcome.place_points, 50);
    assert_eq!(outcome.mission_points, 20);

    let u = backend.user();
    assert_eq!(u.points, 70);
    assert!(u.scanned_today(10));
    assert_eq!(backend.completions("m-new"), 1);

    // One per-mission success plus the final aggregate success
    let successes = notifier
        .events()
        .iter()
        .filter(|(l, _)| *l == "success")
        .count();
    assert_eq!(successes, 2);
}
