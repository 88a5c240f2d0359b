use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use dojo_common::calendar::{is_workday, next_workday};
use dojo_common::challenges::{select_daily_challenges, ChallengeType, Difficulty};
use dojo_common::ShareStatus;
use dojo_db::queries::{
    ChallengeQueries, EngagementQueries, ProgressQueries, ShareQueries, SubmissionQueries, UseCaseQueries,
    UserQueries,
};
use dojo_db::{Database, DatabaseConfig, NewShare, NewUseCase};
use dojo_engine::{ActivityStore, EngineConfig, GamificationService, Notification, NotificationManager, NotificationSink};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

async fn setup_service(config: EngineConfig) -> (GamificationService<Database>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_config = DatabaseConfig {
        path: dir.path().join("dojo.db").to_str().unwrap().to_string(),
        ..Default::default()
    };

    let db = Database::new(db_config).await.unwrap();
    db.run_migrations().await.unwrap();

    for user in ["alice", "bob", "carol", "dave"] {
        UserQueries::create(&db, user, user).await.unwrap();
    }

    (GamificationService::new(db, &config).unwrap(), dir)
}

async fn new_use_case(db: &Database, labels: &[&str]) -> String {
    UseCaseQueries::create(db, NewUseCase::new("Use case", labels)).await.unwrap().id
}

fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// First workday on or after `from` whose easy challenge matches.
fn workday_with_easy(from: NaiveDate, wanted: &[ChallengeType]) -> NaiveDate {
    let mut day = if is_workday(from) { from } else { next_workday(from) };
    for _ in 0..1000 {
        if wanted.contains(&select_daily_challenges(day)[0].challenge_type) {
            return day;
        }
        day = next_workday(day);
    }
    panic!("no workday found with easy challenge in {:?}", wanted);
}

/// Produces the activity behind `challenge_type` for alice at `when`.
async fn perform(db: &Database, challenge_type: ChallengeType, when: DateTime<Utc>) {
    match challenge_type {
        ChallengeType::Learn => {
            let uc = new_use_case(db, &[]).await;
            ProgressQueries::mark_seen(db, "alice", &uc, when).await.unwrap();
        }
        ChallengeType::Upvote => {
            let uc = new_use_case(db, &[]).await;
            assert!(EngagementQueries::upvote(db, "alice", &uc, when).await.unwrap());
        }
        ChallengeType::Comment => {
            let uc = new_use_case(db, &[]).await;
            EngagementQueries::comment(db, "alice", &uc, "Saved me an hour", when).await.unwrap();
        }
        ChallengeType::Apply => {
            let uc = new_use_case(db, &[]).await;
            ProgressQueries::mark_done(db, "alice", &uc, when).await.unwrap();
        }
        ChallengeType::Share => {
            let uc = new_use_case(db, &[]).await;
            ShareQueries::create(db, NewShare::new("alice", "bob", &uc).at(when)).await.unwrap();
        }
        ChallengeType::LearnThree => {
            for _ in 0..3 {
                let uc = new_use_case(db, &[]).await;
                ProgressQueries::mark_seen(db, "alice", &uc, when).await.unwrap();
            }
        }
        ChallengeType::Submit => {
            let uc = new_use_case(db, &[]).await;
            SubmissionQueries::create(db, "alice", &uc, when).await.unwrap();
        }
        ChallengeType::TeachTwo => {
            let uc = new_use_case(db, &[]).await;
            ShareQueries::create(db, NewShare::new("alice", "bob", &uc).at(when)).await.unwrap();
            ShareQueries::create(db, NewShare::new("alice", "carol", &uc).at(when)).await.unwrap();
        }
        ChallengeType::Complete => {
            let uc = new_use_case(db, &[]).await;
            ProgressQueries::mark_done(db, "alice", &uc, when).await.unwrap();
            ShareQueries::create(db, NewShare::new("alice", "bob", &uc).at(when)).await.unwrap();
            ShareQueries::create(db, NewShare::new("alice", "carol", &uc).at(when)).await.unwrap();
        }
    }
}

async fn completion_rows(db: &Database, user_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM daily_challenge_completions WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db.pool().unwrap())
        .await
        .unwrap()
}

struct RecordingSink {
    delivered: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

async fn wait_for(sink: &RecordingSink, count: usize) -> Vec<Notification> {
    for _ in 0..100 {
        if sink.delivered.lock().unwrap().len() >= count {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    sink.delivered.lock().unwrap().clone()
}

#[tokio::test]
async fn test_no_activity_means_no_completion() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let today = d(2026, 3, 2);

    let status = service.daily_challenge_status("alice", at(today, 15)).await.unwrap();

    assert!(status.is_workday);
    assert_eq!(status.completed_type, None);
    assert_eq!(status.streak, 0);
    assert_eq!(status.challenges.len(), 3);
    let difficulties: Vec<Difficulty> = status.challenges.iter().map(|c| c.difficulty).collect();
    assert_eq!(difficulties, Difficulty::ALL.to_vec());
    assert_eq!(completion_rows(service.store(), "alice").await, 0);
}

#[tokio::test]
async fn test_learning_completes_learn_challenge() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let today = workday_with_easy(d(2026, 3, 2), &[ChallengeType::Learn]);

    perform(service.store(), ChallengeType::Learn, at(today, 9)).await;

    let status = service.daily_challenge_status("alice", at(today, 15)).await.unwrap();
    assert_eq!(status.completed_type, Some(ChallengeType::Learn));
    assert_eq!(status.streak, 1);

    let row = ChallengeQueries::get_completion(service.store(), "alice", today).await.unwrap().unwrap();
    assert_eq!(row.challenge_type, "learn");
}

#[tokio::test]
async fn test_activity_on_another_day_does_not_count() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let today = workday_with_easy(d(2026, 3, 2), &[ChallengeType::Learn]);

    perform(service.store(), ChallengeType::Learn, at(today, 0) - Duration::seconds(1)).await;

    let status = service.daily_challenge_status("alice", at(today, 15)).await.unwrap();
    assert_eq!(status.completed_type, None);
}

#[tokio::test]
async fn test_earlier_difficulty_wins_when_several_are_satisfied() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let today = workday_with_easy(d(2026, 3, 2), &[ChallengeType::Upvote, ChallengeType::Comment]);
    let [_, medium, hard] = select_daily_challenges(today);

    perform(service.store(), hard.challenge_type, at(today, 9)).await;
    perform(service.store(), medium.challenge_type, at(today, 10)).await;

    let status = service.daily_challenge_status("alice", at(today, 15)).await.unwrap();
    assert_eq!(status.completed_type, Some(medium.challenge_type));
}

#[tokio::test]
async fn test_completion_is_recorded_once() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let today = workday_with_easy(d(2026, 3, 2), &[ChallengeType::Learn]);
    perform(service.store(), ChallengeType::Learn, at(today, 9)).await;

    let (first, second) = tokio::join!(
        service.daily_challenge_status("alice", at(today, 15)),
        service.daily_challenge_status("alice", at(today, 15)),
    );

    assert_eq!(first.unwrap().completed_type, Some(ChallengeType::Learn));
    assert_eq!(second.unwrap().completed_type, Some(ChallengeType::Learn));
    assert_eq!(completion_rows(service.store(), "alice").await, 1);

    // more activity later in the day does not replace the recorded type
    perform(service.store(), ChallengeType::LearnThree, at(today, 16)).await;
    let later = service.daily_challenge_status("alice", at(today, 17)).await.unwrap();
    assert_eq!(later.completed_type, Some(ChallengeType::Learn));
    assert_eq!(completion_rows(service.store(), "alice").await, 1);
}

#[tokio::test]
async fn test_no_challenge_on_weekends_and_holidays() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;

    for day in [d(2026, 3, 7), d(2026, 11, 26), d(2026, 12, 25)] {
        perform(service.store(), ChallengeType::Learn, at(day, 9)).await;

        let status = service.daily_challenge_status("alice", at(day, 15)).await.unwrap();
        assert!(!status.is_workday);
        assert!(status.challenges.is_empty());
        assert_eq!(status.completed_type, None);
    }

    assert_eq!(completion_rows(service.store(), "alice").await, 0);
}

#[tokio::test]
async fn test_streak_spans_thanksgiving() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let db = service.store();

    for day in [d(2026, 11, 23), d(2026, 11, 24), d(2026, 11, 25)] {
        assert!(ChallengeQueries::record_completion(db, "alice", day, ChallengeType::Learn, at(day, 12))
            .await
            .unwrap());
    }

    let monday = d(2026, 11, 30);
    assert_eq!(service.streak("alice", monday).await.unwrap(), 3);

    let easy = select_daily_challenges(monday)[0].challenge_type;
    perform(db, easy, at(monday, 9)).await;

    let status = service.daily_challenge_status("alice", at(monday, 15)).await.unwrap();
    assert_eq!(status.completed_type, Some(easy));
    assert_eq!(status.streak, 4);
}

#[tokio::test]
async fn test_missed_workday_breaks_streak() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let db = service.store();

    for day in [d(2026, 3, 2), d(2026, 3, 3), d(2026, 3, 5)] {
        ChallengeQueries::record_completion(db, "alice", day, ChallengeType::Upvote, at(day, 12))
            .await
            .unwrap();
    }

    assert_eq!(service.streak("alice", d(2026, 3, 5)).await.unwrap(), 1);
    // an unfinished today still shows the run ending yesterday
    assert_eq!(service.streak("alice", d(2026, 3, 6)).await.unwrap(), 1);
    assert_eq!(service.streak("alice", d(2026, 3, 4)).await.unwrap(), 2);
}

#[tokio::test]
async fn test_badges_are_awarded_once_and_notified() {
    let sink = Arc::new(RecordingSink { delivered: Mutex::new(Vec::new()) });
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let service = service.with_notifier(NotificationManager::new(sink.clone()));
    let now = at(d(2026, 3, 2), 15);

    let uc = new_use_case(service.store(), &["automation"]).await;
    ProgressQueries::mark_seen(service.store(), "alice", &uc, at(d(2026, 3, 2), 9)).await.unwrap();

    let awarded = service.evaluate_badges("alice", now).await.unwrap();
    assert_eq!(awarded, vec!["first_steps".to_string()]);
    assert!(service.evaluate_badges("alice", now).await.unwrap().is_empty());

    let delivered = wait_for(&sink, 1).await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0], Notification::badge_earned("alice", "first_steps", now));
}

#[tokio::test]
async fn test_concurrent_badge_evaluation_awards_each_badge_once() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let now = at(d(2026, 3, 2), 15);

    let uc = new_use_case(service.store(), &[]).await;
    ProgressQueries::mark_seen(service.store(), "alice", &uc, now).await.unwrap();
    ProgressQueries::mark_done(service.store(), "alice", &uc, now).await.unwrap();

    let (first, second) =
        tokio::join!(service.evaluate_badges("alice", now), service.evaluate_badges("alice", now));

    let mut awarded = first.unwrap();
    awarded.extend(second.unwrap());
    awarded.sort();
    assert_eq!(awarded, vec!["first_steps".to_string(), "hands_on".to_string()]);

    let mut earned = service.store().earned_badges("alice").await.unwrap();
    earned.sort();
    assert_eq!(earned, awarded);
}

#[tokio::test]
async fn test_points_and_rank_from_activity() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let db = service.store();
    let now = at(d(2026, 3, 2), 9);

    let first = new_use_case(db, &[]).await;
    let second = new_use_case(db, &[]).await;
    let shared = new_use_case(db, &[]).await;

    ProgressQueries::mark_seen(db, "alice", &first, now).await.unwrap();
    ProgressQueries::mark_seen(db, "alice", &second, now).await.unwrap();
    ProgressQueries::mark_done(db, "alice", &first, now).await.unwrap();

    let mut share_ids = Vec::new();
    for recipient in ["bob", "carol", "dave"] {
        let share = ShareQueries::create(db, NewShare::new("alice", recipient, &shared).at(now)).await.unwrap();
        share_ids.push(share.id);
    }
    ShareQueries::update_status(db, &share_ids[0], ShareStatus::Confirmed).await.unwrap();

    let points = service.points("alice").await.unwrap();
    assert_eq!(points.learned, 20);
    assert_eq!(points.applied, 25);
    assert_eq!(points.shared, 15);
    assert_eq!(points.bonuses, 5);
    assert_eq!(points.teaching, 20);
    assert_eq!(points.total, 85);

    let rank = service.rank("alice").await.unwrap();
    assert_eq!(rank.current.name, "Newcomer");
    let next = rank.next.unwrap();
    assert_eq!(next.rank.name, "Explorer");
    assert_eq!(next.remaining, 15);
    assert_eq!(rank.progress_percent, 85);
}

#[tokio::test]
async fn test_viral_submission_bonus() {
    let mut config = EngineConfig::default();
    config.points.viral_threshold = 2;
    let (service, _dir) = setup_service(config).await;
    let db = service.store();
    let now = at(d(2026, 3, 2), 9);

    let uc = new_use_case(db, &[]).await;
    SubmissionQueries::create(db, "alice", &uc, now).await.unwrap();
    assert_eq!(service.points("alice").await.unwrap().total, 50);

    ShareQueries::create(db, NewShare::new("bob", "dave", &uc).at(now)).await.unwrap();
    ShareQueries::create(db, NewShare::new("carol", "dave", &uc).at(now)).await.unwrap();

    let points = service.points("alice").await.unwrap();
    assert_eq!(points.viral_count, 1);
    assert_eq!(points.total, 150);
    assert_eq!(service.rank("alice").await.unwrap().current.name, "Explorer");
}

#[tokio::test]
async fn test_profile_combines_everything() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let today = workday_with_easy(d(2026, 3, 2), &[ChallengeType::Learn]);

    perform(service.store(), ChallengeType::Learn, at(today, 9)).await;

    let profile = service.profile("alice", at(today, 15)).await.unwrap();
    assert_eq!(profile.user_id, "alice");
    assert_eq!(profile.daily_challenge.completed_type, Some(ChallengeType::Learn));
    assert_eq!(profile.new_badges, vec!["first_steps".to_string()]);
    assert_eq!(profile.badges, vec!["first_steps".to_string()]);
    assert_eq!(profile.points.total, 10);
    assert_eq!(profile.rank.current.name, "Newcomer");

    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["daily_challenge"]["completed_type"], "learn");
}

#[tokio::test]
async fn test_unreadable_completion_does_not_fail_status() {
    let (service, _dir) = setup_service(EngineConfig::default()).await;
    let today = workday_with_easy(d(2026, 3, 2), &[ChallengeType::Learn]);
    perform(service.store(), ChallengeType::Learn, at(today, 9)).await;

    // a row written before the type column was constrained
    let mut conn = service.store().pool().unwrap().acquire().await.unwrap();
    sqlx::query("PRAGMA ignore_check_constraints = ON").execute(&mut *conn).await.unwrap();
    sqlx::query(
        "INSERT INTO daily_challenge_completions (user_id, challenge_date, challenge_type, completed_at) \
         VALUES ('alice', ?, 'Learn', ?)",
    )
    .bind(today)
    .bind(at(today, 10))
    .execute(&mut *conn)
    .await
    .unwrap();
    sqlx::query("PRAGMA ignore_check_constraints = OFF").execute(&mut *conn).await.unwrap();
    drop(conn);

    let status = service.daily_challenge_status("alice", at(today, 12)).await.unwrap();
    assert!(status.is_workday);
    assert_eq!(status.completed_type, None);
    assert_eq!(status.streak, 1);
    assert_eq!(completion_rows(service.store(), "alice").await, 1);

    let profile = service.profile("alice", at(today, 12)).await.unwrap();
    assert_eq!(profile.daily_challenge.streak, 1);
}

#[tokio::test]
async fn test_service_rejects_zero_viral_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let db_config = DatabaseConfig {
        path: dir.path().join("dojo.db").to_str().unwrap().to_string(),
        ..Default::default()
    };
    let db = Database::new(db_config).await.unwrap();

    let mut config = EngineConfig::default();
    config.points.viral_threshold = 0;

    assert!(GamificationService::new(db, &config).is_err());
}
