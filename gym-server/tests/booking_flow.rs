//! 预约流程集成测试
//!
//! 仓储层 + 营业时间校验，文件数据库用于并发场景

use chrono::{Datelike, Days, Weekday};
use gym_server::db::DbService;
use gym_server::db::repository::{RepoError, booking, gym_session, user};
use gym_server::schedule::ScheduleWindow;
use gym_server::utils::ErrorCode;
use gym_server::utils::time::{format_date, today as business_today};
use shared::models::{BookingStatus, GymSessionCreate, MembershipType};
use sqlx::SqlitePool;

const TZ: chrono_tz::Tz = chrono_tz::Asia::Singapore;

fn today() -> String {
    format_date(business_today(TZ))
}

fn next_monday() -> String {
    let mut day = business_today(TZ) + Days::new(1);
    while day.weekday() != Weekday::Mon {
        day = day + Days::new(1);
    }
    format_date(day)
}

fn slot(date: &str, start: &str, end: &str, capacity: i64) -> GymSessionCreate {
    GymSessionCreate {
        date: date.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        capacity,
        session_type: "general".to_string(),
        instructor: None,
        description: None,
        difficulty: None,
        price: None,
    }
}

/// Registered and approved student
async fn member(pool: &SqlitePool, n: usize) -> i64 {
    let created = user::create_student(
        pool,
        user::NewStudent {
            email: format!("student{n}@my.jcu.edu.au"),
            password_hash: "hash".to_string(),
            first_name: "Student".to_string(),
            last_name: format!("No{n}"),
            student_id: format!("{:07}", 1_000_000 + n),
            phone: None,
            membership_type: MembershipType::ThreeTrimester,
            payment_method: "bank_transfer".to_string(),
            payment_reference: format!("PAY_{n:08X}"),
            expiry_date: "2099-12-31".to_string(),
            emergency_contact_name: None,
            emergency_contact_phone: None,
            emergency_contact_relation: None,
            billing_address: None,
        },
        "SGD",
    )
    .await
    .unwrap();
    user::approve(pool, created.id).await.unwrap();
    created.id
}

fn business_code<T: std::fmt::Debug>(result: Result<T, RepoError>) -> ErrorCode {
    match result {
        Err(RepoError::Business(code, _)) => code,
        other => panic!("expected a business error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_single_spot_is_handed_over_after_cancel() {
    let db = DbService::in_memory().await.unwrap();
    let pool = &db.pool;
    let date = next_monday();
    let today = today();

    let window = ScheduleWindow::default();
    window.validate_slot(&date, "09:00", "10:00").unwrap();
    let session = gym_session::create(pool, &slot(&date, "09:00", "10:00", 1))
        .await
        .unwrap();

    let a = member(pool, 1).await;
    let b = member(pool, 2).await;

    let first = booking::create(pool, a, session.id, &today, true).await.unwrap();
    assert_eq!(first.status, BookingStatus::Confirmed);

    let full = booking::create(pool, b, session.id, &today, true).await;
    assert_eq!(business_code(full), ErrorCode::SessionFullyBooked);

    booking::cancel(pool, first.id).await.unwrap();
    let second = booking::create(pool, b, session.id, &today, true).await.unwrap();
    assert_eq!(second.user_id, b);

    let session = gym_session::find_by_id(pool, session.id).await.unwrap().unwrap();
    assert_eq!(session.current_bookings, 1);
    assert_eq!(session.available_spots, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_never_exceed_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gym.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();
    let pool = db.pool.clone();
    let date = next_monday();
    let today = today();

    const CAPACITY: i64 = 5;
    const MEMBERS: usize = 30;

    let session = gym_session::create(&pool, &slot(&date, "18:00", "19:00", CAPACITY))
        .await
        .unwrap();
    let mut members = Vec::with_capacity(MEMBERS);
    for n in 0..MEMBERS {
        members.push(member(&pool, n).await);
    }

    let tasks = members.into_iter().map(|user_id| {
        let pool = pool.clone();
        let today = today.clone();
        tokio::spawn(async move { booking::create(&pool, user_id, session.id, &today, true).await })
    });
    let results = futures::future::join_all(tasks).await;

    let mut confirmed = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => confirmed += 1,
            Err(e) => assert_eq!(business_code::<()>(Err(e)), ErrorCode::SessionFullyBooked),
        }
    }
    assert_eq!(confirmed, CAPACITY);

    let stored: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE session_id = ? AND status = 'confirmed'",
    )
    .bind(session.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(stored, CAPACITY);
}

#[tokio::test]
async fn test_double_booking_rejected() {
    let db = DbService::in_memory().await.unwrap();
    let pool = &db.pool;
    let date = next_monday();
    let today = today();
    let session = gym_session::create(pool, &slot(&date, "09:00", "10:00", 10))
        .await
        .unwrap();
    let a = member(pool, 1).await;

    booking::create(pool, a, session.id, &today, true).await.unwrap();
    let again = booking::create(pool, a, session.id, &today, true).await;
    assert_eq!(business_code(again), ErrorCode::DuplicateBooking);
}

#[tokio::test]
async fn test_overlapping_sessions_same_day() {
    let db = DbService::in_memory().await.unwrap();
    let pool = &db.pool;
    let date = next_monday();
    let today = today();
    let morning = gym_session::create(pool, &slot(&date, "09:00", "10:00", 10))
        .await
        .unwrap();
    let overlap = gym_session::create(pool, &slot(&date, "09:30", "10:30", 10))
        .await
        .unwrap();
    let adjacent = gym_session::create(pool, &slot(&date, "10:00", "11:00", 10))
        .await
        .unwrap();
    let a = member(pool, 1).await;

    booking::create(pool, a, morning.id, &today, true).await.unwrap();
    let conflict = booking::create(pool, a, overlap.id, &today, true).await;
    assert_eq!(business_code(conflict), ErrorCode::BookingTimeConflict);

    // Back-to-back is fine, and the check can be switched off
    booking::create(pool, a, adjacent.id, &today, true).await.unwrap();
    booking::create(pool, a, overlap.id, &today, false).await.unwrap();
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let db = DbService::in_memory().await.unwrap();
    let pool = &db.pool;
    let date = next_monday();
    let today = today();
    let session = gym_session::create(pool, &slot(&date, "09:00", "10:00", 3))
        .await
        .unwrap();
    let a = member(pool, 1).await;
    let b = booking::create(pool, a, session.id, &today, true).await.unwrap();

    let first = booking::cancel(pool, b.id).await.unwrap();
    let second = booking::cancel(pool, b.id).await.unwrap();
    assert_eq!(first.status, BookingStatus::Cancelled);
    assert_eq!(second.status, BookingStatus::Cancelled);
    assert_eq!(first.cancelled_at, second.cancelled_at);
}

#[tokio::test]
async fn test_delete_session_cascades_to_bookings() {
    let db = DbService::in_memory().await.unwrap();
    let pool = &db.pool;
    let date = next_monday();
    let today = today();
    let session = gym_session::create(pool, &slot(&date, "09:00", "10:00", 10))
        .await
        .unwrap();

    let mut ids = Vec::new();
    for n in 0..3 {
        let m = member(pool, n).await;
        ids.push(booking::create(pool, m, session.id, &today, true).await.unwrap().id);
    }

    let result = gym_session::soft_delete(pool, session.id).await.unwrap();
    assert_eq!(result.cancelled_bookings, 3);
    for id in ids {
        let b = booking::find_by_id(pool, id).await.unwrap().unwrap();
        assert_eq!(b.status, BookingStatus::Cancelled);
    }

    let late = member(pool, 10).await;
    let refused = booking::create(pool, late, session.id, &today, true).await;
    assert_eq!(business_code(refused), ErrorCode::SessionNotFound);

    // Deleting again reports nothing new
    let again = gym_session::soft_delete(pool, session.id).await.unwrap();
    assert_eq!(again.cancelled_bookings, 0);
}

#[tokio::test]
async fn test_capacity_cannot_shrink_below_bookings() {
    let db = DbService::in_memory().await.unwrap();
    let pool = &db.pool;
    let date = next_monday();
    let today = today();
    let session = gym_session::create(pool, &slot(&date, "09:00", "10:00", 5))
        .await
        .unwrap();
    for n in 0..3 {
        let m = member(pool, n).await;
        booking::create(pool, m, session.id, &today, true).await.unwrap();
    }

    let shrink = gym_session::update(pool, session.id, &slot(&date, "09:00", "10:00", 2)).await;
    assert_eq!(business_code(shrink), ErrorCode::CapacityBelowBookings);

    let exact = gym_session::update(pool, session.id, &slot(&date, "09:00", "10:00", 3))
        .await
        .unwrap();
    assert_eq!(exact.capacity, 3);
    assert_eq!(exact.available_spots, 0);
}

#[tokio::test]
async fn test_past_session_cannot_be_booked() {
    let db = DbService::in_memory().await.unwrap();
    let pool = &db.pool;
    let session = gym_session::create(pool, &slot("2020-03-02", "09:00", "10:00", 5))
        .await
        .unwrap();
    let a = member(pool, 1).await;

    let today = today();
    let refused = booking::create(pool, a, session.id, &today, true).await;
    assert_eq!(business_code(refused), ErrorCode::SessionAlreadyPast);
}
