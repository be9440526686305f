mod common;

use chrono::Timelike;
use common::*;
use shelter_booking::domain::models::service::{NewServiceParams, Service};
use shelter_booking::domain::ports::ServiceRepository;
use shelter_booking::error::AppError;

// Monday in the 0 = Sunday convention.
const MONDAY: u8 = 1;

#[tokio::test]
async fn test_legal_aid_example_slots() {
    let app = TestApp::new().await;
    // Monday 09:00-12:00 with a 10:30-10:45 break, 45-minute appointments.
    let service = app
        .seed_service(
            vec![window_with_break(MONDAY, "09:00", "12:00", "10:30", "10:45")],
            45,
            1,
        )
        .await;

    let date = next_date_for_weekday(MONDAY);
    let slots = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();

    // 09:00 and 09:45 precede the break; 10:30 would overlap it, so the
    // cursor resumes at 10:45; 11:30 would extend past the window end.
    let starts: Vec<(u32, u32)> = slots
        .iter()
        .map(|s| (s.start_time.hour(), s.start_time.minute()))
        .collect();
    assert_eq!(starts, vec![(9, 0), (9, 45), (10, 45)]);
    assert!(slots.iter().all(|s| s.available && s.booked_count == 0));
    assert!(slots.iter().all(|s| s.capacity == 1 && s.duration_min == 45));
}

#[tokio::test]
async fn test_no_partial_slot_at_window_end() {
    let app = TestApp::new().await;
    // 60 minutes of window, 45-minute slots: only one fits.
    let service = app
        .seed_service(vec![window(MONDAY, "09:00", "10:00")], 45, 1)
        .await;

    let date = next_date_for_weekday(MONDAY);
    let slots = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!((slots[0].start_time.hour(), slots[0].start_time.minute()), (9, 0));
}

#[tokio::test]
async fn test_slots_align_to_window_start_not_wall_clock() {
    let app = TestApp::new().await;
    let service = app
        .seed_service(vec![window(MONDAY, "09:10", "11:10")], 60, 1)
        .await;

    let date = next_date_for_weekday(MONDAY);
    let slots = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();

    let starts: Vec<(u32, u32)> = slots
        .iter()
        .map(|s| (s.start_time.hour(), s.start_time.minute()))
        .collect();
    assert_eq!(starts, vec![(9, 10), (10, 10)]);
}

#[tokio::test]
async fn test_split_shifts_produce_both_runs() {
    let app = TestApp::new().await;
    let service = app
        .seed_service(
            vec![window(MONDAY, "09:00", "11:00"), window(MONDAY, "17:00", "19:00")],
            60,
            2,
        )
        .await;

    let date = next_date_for_weekday(MONDAY);
    let slots = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();

    let starts: Vec<(u32, u32)> = slots
        .iter()
        .map(|s| (s.start_time.hour(), s.start_time.minute()))
        .collect();
    assert_eq!(starts, vec![(9, 0), (10, 0), (17, 0), (18, 0)]);
}

#[tokio::test]
async fn test_weekday_without_windows_yields_no_slots() {
    let app = TestApp::new().await;
    let service = app
        .seed_service(vec![window(MONDAY, "09:00", "12:00")], 45, 1)
        .await;

    // Wednesday has no window.
    let date = next_date_for_weekday(3);
    let slots = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();
    assert!(slots.is_empty());

    let result = app
        .availability
        .check_service(SHELTER, &service.id, at(date, 9, 0), None)
        .await;
    match result {
        Err(AppError::OutOfSchedule { capacity, booked, .. }) => {
            assert_eq!(capacity, 0);
            assert_eq!(booked, 0);
        }
        other => panic!("expected OutOfSchedule, got {:?}", other.map(|a| a.available)),
    }
}

#[tokio::test]
async fn test_check_availability_rejects_break_overlap() {
    let app = TestApp::new().await;
    let service = app
        .seed_service(
            vec![window_with_break(MONDAY, "09:00", "12:00", "10:30", "10:45")],
            45,
            1,
        )
        .await;

    let date = next_date_for_weekday(MONDAY);

    // 10:15-11:00 straddles the break.
    let result = app
        .availability
        .check_service(SHELTER, &service.id, at(date, 10, 15), None)
        .await;
    assert!(matches!(result, Err(AppError::OutOfSchedule { .. })));

    // 10:45-11:30 clears it.
    let ok = app
        .availability
        .check_service(SHELTER, &service.id, at(date, 10, 45), None)
        .await
        .unwrap();
    assert!(ok.available);
    assert_eq!(ok.capacity, 1);
    assert_eq!(ok.booked_count, 0);
}

#[tokio::test]
async fn test_occupancy_reflected_in_slots() {
    let app = TestApp::new().await;
    let service = app
        .seed_service(vec![window(MONDAY, "09:00", "12:00")], 60, 1)
        .await;

    let date = next_date_for_weekday(MONDAY);
    app.book_at(&service, at(date, 9, 0)).await.unwrap();

    let slots = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].booked_count, 1);
    assert!(!slots[0].available);
    assert!(slots[1].available && slots[2].available);
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let app = TestApp::new().await;
    let service = app
        .seed_service(
            vec![window_with_break(MONDAY, "09:00", "12:00", "10:30", "10:45")],
            45,
            2,
        )
        .await;

    let date = next_date_for_weekday(MONDAY);
    let first = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();
    let second = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_inactive_service_resolves_no_slots() {
    let app = TestApp::new().await;
    let service = app
        .seed_service(vec![window(MONDAY, "09:00", "12:00")], 60, 1)
        .await;

    app.service_repo.deactivate(SHELTER, &service.id).await.unwrap();

    let date = next_date_for_weekday(MONDAY);
    let slots = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_unknown_timezone_resolves_in_utc() {
    let app = TestApp::new().await;
    let category = app.seed_category().await;
    let service = Service::new(NewServiceParams {
        shelter_id: SHELTER.to_string(),
        category_id: category.id,
        name: "Legal Aid".to_string(),
        description: String::new(),
        duration_min: 60,
        capacity: 1,
        cost_cents: 0,
        timezone: "Mars/Olympus_Mons".to_string(),
        windows: vec![window(MONDAY, "09:00", "11:00")],
    })
    .unwrap();
    let service = app.service_repo.create(&service).await.unwrap();

    let date = next_date_for_weekday(MONDAY);
    let slots = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, None)
        .await
        .unwrap();

    let starts: Vec<(u32, u32)> = slots
        .iter()
        .map(|s| (s.start_time.hour(), s.start_time.minute()))
        .collect();
    assert_eq!(starts, vec![(9, 0), (10, 0)]);
}

#[tokio::test]
async fn test_explicit_slot_duration_overrides_service_duration() {
    let app = TestApp::new().await;
    let service = app
        .seed_service(vec![window(MONDAY, "09:00", "12:00")], 45, 1)
        .await;

    let date = next_date_for_weekday(MONDAY);
    let slots = app
        .availability
        .slots_for_date(SHELTER, &service.id, date, Some(90))
        .await
        .unwrap();

    let starts: Vec<(u32, u32)> = slots
        .iter()
        .map(|s| (s.start_time.hour(), s.start_time.minute()))
        .collect();
    assert_eq!(starts, vec![(9, 0), (10, 30)]);
}
