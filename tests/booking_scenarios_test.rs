mod common;

use booking_engine::core::{Catalog, ReservationStore};
use booking_engine::{
    Caller, CreateReservation, EngineError, EngineSettings, EventId, ProfessionalId,
    ReservationStatus, ServiceId, UpdateReservation,
};
use common::{at, salon_engine, salon_engine_with, seeded_settings, services};
use tokio_test::{assert_err, assert_ok};

fn request(event: &str, selection: &[&str], hour: u32, minute: u32) -> CreateReservation {
    CreateReservation {
        event_id: EventId::from(event),
        services: services(selection),
        timestamp: at(hour, minute),
    }
}

#[tokio::test]
async fn test_scenario_a_only_qualified_professional_is_assigned() {
    for seed in 0..20 {
        let engine = salon_engine(seed).await;
        let reservation = engine
            .create_reservation(&Caller::user("alice"), request("salon-day", &["manicure"], 11, 0))
            .await
            .unwrap();

        assert_eq!(reservation.professional, Some(ProfessionalId::from("p2")));
        assert_eq!(reservation.status, ReservationStatus::Confirmed);
        assert_eq!(reservation.version, 1);
    }
}

#[tokio::test]
async fn test_scenario_b_before_window_is_invalid_slot() {
    let engine = salon_engine(1).await;
    let err = engine
        .create_reservation(
            &Caller::user("alice"),
            request("salon-day", &["haircut", "manicure"], 9, 30),
        )
        .await
        .unwrap_err();

    match err {
        EngineError::InvalidSlot {
            timestamp,
            window_start,
            window_end,
        } => {
            assert_eq!(timestamp, at(9, 30));
            assert_eq!(window_start, at(10, 0));
            assert_eq!(window_end, at(14, 0));
        }
        other => panic!("expected InvalidSlot, got {other:?}"),
    }
    assert!(engine.store().is_empty().await);
}

#[tokio::test]
async fn test_scenario_c_service_outside_catalog() {
    let engine = salon_engine(1).await;
    let err = engine
        .create_reservation(&Caller::user("alice"), request("salon-day", &["pedicure"], 11, 0))
        .await
        .unwrap_err();

    match err {
        EngineError::ServiceNotOffered { service_id, .. } => {
            assert_eq!(service_id, ServiceId::from("pedicure"))
        }
        other => panic!("expected ServiceNotOffered, got {other:?}"),
    }
    assert!(engine.store().is_empty().await);
}

#[tokio::test]
async fn test_scenario_d_same_user_same_timestamp_is_duplicate() {
    let engine = salon_engine(1).await;
    let user = Caller::user("u");
    assert_ok!(
        engine
            .create_reservation(&user, request("salon-day", &["haircut"], 11, 0))
            .await
    );

    let err = engine
        .create_reservation(&user, request("salon-day", &["haircut"], 11, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateBooking { .. }));
    assert_eq!(engine.store().len().await, 1);
}

#[tokio::test]
async fn test_scenario_e_nobody_qualified() {
    let engine = salon_engine(1).await;
    let err = engine
        .create_reservation(&Caller::user("alice"), request("spa-day", &["facial"], 12, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NoEligibleProfessional));
    assert!(engine.store().is_empty().await);
}

#[tokio::test]
async fn test_unknown_event() {
    let engine = salon_engine(1).await;
    let err = engine
        .create_reservation(&Caller::user("alice"), request("winter-gala", &["haircut"], 11, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::EventNotFound { .. }));
}

#[tokio::test]
async fn test_overlapping_but_different_timestamps_do_not_collide() {
    let engine = salon_engine(1).await;
    let user = Caller::user("alice");
    assert_ok!(
        engine
            .create_reservation(&user, request("salon-day", &["haircut"], 11, 0))
            .await
    );
    assert_ok!(
        engine
            .create_reservation(&user, request("salon-day", &["haircut"], 11, 15))
            .await
    );
}

#[tokio::test]
async fn test_accepted_reservations_hold_invariants() {
    let engine = salon_engine(9).await;
    let users = ["a", "b", "c", "d", "e", "f"];
    let picks: [&[&str]; 3] = [&["haircut"], &["manicure"], &["haircut", "manicure"]];

    for (i, user) in users.iter().enumerate() {
        for hour in [10, 11, 12, 13, 14] {
            let _ = engine
                .create_reservation(
                    &Caller::user(*user),
                    request("salon-day", picks[(i + hour as usize) % 3], hour, 0),
                )
                .await;
        }
    }

    let all = engine.list_all_reservations(&Caller::admin("root")).await.unwrap();
    assert!(!all.is_empty());

    let event = engine
        .catalog()
        .get_event(&EventId::from("salon-day"))
        .await
        .unwrap()
        .unwrap();

    let mut user_slots = std::collections::HashSet::new();
    let mut professional_slots = std::collections::HashSet::new();
    for reservation in &all {
        assert!(event.start <= reservation.timestamp && reservation.timestamp <= event.end);
        assert!(reservation.service_selection.is_subset(&event.service_catalog));

        let professional_id = reservation.professional.clone().expect("confirmed without professional");
        let professional = engine
            .catalog()
            .get_professional(&professional_id)
            .await
            .unwrap()
            .unwrap();
        assert!(reservation.service_selection.is_subset(&professional.skillset));

        assert!(user_slots.insert((reservation.user.clone(), reservation.timestamp)));
        assert!(professional_slots.insert((professional_id, reservation.timestamp)));
    }
}

#[tokio::test]
async fn test_update_at_own_timestamp_is_not_a_duplicate() {
    let engine = salon_engine(3).await;
    let alice = Caller::user("alice");
    let original = engine
        .create_reservation(&alice, request("salon-day", &["haircut"], 11, 0))
        .await
        .unwrap();

    let updated = engine
        .update_reservation(
            &alice,
            original.id,
            UpdateReservation {
                event_id: EventId::from("salon-day"),
                services: services(&["haircut", "manicure"]),
                timestamp: at(11, 0),
                professional_override: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.version, 2);
    assert_eq!(updated.professional, Some(ProfessionalId::from("p2")));
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(engine.store().len().await, 1);
}

#[tokio::test]
async fn test_update_into_another_booking_is_duplicate() {
    let engine = salon_engine(3).await;
    let alice = Caller::user("alice");
    engine
        .create_reservation(&alice, request("salon-day", &["haircut"], 11, 0))
        .await
        .unwrap();
    let second = engine
        .create_reservation(&alice, request("salon-day", &["haircut"], 12, 0))
        .await
        .unwrap();

    let err = engine
        .update_reservation(
            &alice,
            second.id,
            UpdateReservation {
                event_id: EventId::from("salon-day"),
                services: services(&["haircut"]),
                timestamp: at(11, 0),
                professional_override: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateBooking { .. }));

    let unchanged = engine.get_reservation(&alice, second.id).await.unwrap();
    assert_eq!(unchanged, second);
}

#[tokio::test]
async fn test_professional_override_requires_privilege_and_skill() {
    let engine = salon_engine(3).await;
    let alice = Caller::user("alice");
    let admin = Caller::admin("root");
    let reservation = engine
        .create_reservation(&alice, request("salon-day", &["haircut"], 11, 0))
        .await
        .unwrap();

    let change = |professional: &str, selection: &[&str]| UpdateReservation {
        event_id: EventId::from("salon-day"),
        services: services(selection),
        timestamp: at(11, 0),
        professional_override: Some(ProfessionalId::from(professional)),
    };

    let err = engine
        .update_reservation(&alice, reservation.id, change("p1", &["haircut"]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotPermitted { .. }));

    let err = engine
        .update_reservation(&admin, reservation.id, change("p1", &["haircut", "manicure"]))
        .await
        .unwrap_err();
    match err {
        EngineError::ProfessionalNotQualified { service_id, .. } => {
            assert_eq!(service_id, ServiceId::from("manicure"))
        }
        other => panic!("expected ProfessionalNotQualified, got {other:?}"),
    }

    let err = engine
        .update_reservation(&admin, reservation.id, change("p9", &["haircut"]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ProfessionalNotFound { .. }));

    let updated = engine
        .update_reservation(&admin, reservation.id, change("p1", &["haircut"]))
        .await
        .unwrap();
    assert_eq!(updated.professional, Some(ProfessionalId::from("p1")));
    assert_eq!(updated.user, reservation.user);
}

#[tokio::test]
async fn test_override_respects_professional_availability() {
    let engine = salon_engine(3).await;
    let admin = Caller::admin("root");
    let bob = engine
        .create_reservation(&Caller::user("bob"), request("salon-day", &["manicure"], 11, 0))
        .await
        .unwrap();
    assert_eq!(bob.professional, Some(ProfessionalId::from("p2")));

    let alice = engine
        .create_reservation(&Caller::user("alice"), request("salon-day", &["haircut"], 11, 0))
        .await
        .unwrap();
    assert_eq!(alice.professional, Some(ProfessionalId::from("p1")));

    let err = engine
        .update_reservation(
            &admin,
            alice.id,
            UpdateReservation {
                event_id: EventId::from("salon-day"),
                services: services(&["haircut"]),
                timestamp: at(11, 0),
                professional_override: Some(ProfessionalId::from("p2")),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ProfessionalUnavailable { .. }));
}

#[tokio::test]
async fn test_busy_professional_is_not_eligible() {
    let engine = salon_engine(5).await;
    assert_ok!(
        engine
            .create_reservation(&Caller::user("bob"), request("salon-day", &["manicure"], 11, 0))
            .await
    );

    let err = engine
        .create_reservation(&Caller::user("carol"), request("salon-day", &["manicure"], 11, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NoEligibleProfessional));
}

#[tokio::test]
async fn test_shared_professional_allowed_when_availability_not_enforced() {
    let engine = salon_engine_with(EngineSettings {
        enforce_professional_availability: false,
        ..seeded_settings(5)
    })
    .await;

    let alice = engine
        .create_reservation(&Caller::user("alice"), request("salon-day", &["manicure"], 11, 0))
        .await
        .unwrap();
    let bob = engine
        .create_reservation(&Caller::user("bob"), request("salon-day", &["manicure"], 11, 0))
        .await
        .unwrap();

    assert_eq!(alice.professional, Some(ProfessionalId::from("p2")));
    assert_eq!(bob.professional, Some(ProfessionalId::from("p2")));
    assert_eq!(engine.store().len().await, 2);

    let err = engine
        .create_reservation(&Caller::user("alice"), request("salon-day", &["haircut"], 11, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateBooking { .. }));
}

#[tokio::test]
async fn test_cancel_frees_slot_and_keeps_history() {
    let engine = salon_engine(3).await;
    let alice = Caller::user("alice");
    let first = engine
        .create_reservation(&alice, request("salon-day", &["haircut"], 11, 0))
        .await
        .unwrap();

    let cancelled = engine.cancel_reservation(&alice, first.id).await.unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert_eq!(cancelled.version, 2);

    let again = engine
        .create_reservation(&alice, request("salon-day", &["haircut"], 11, 0))
        .await
        .unwrap();
    assert_ne!(again.id, first.id);

    let history = engine.list_user_reservations(&alice).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(
        history.iter().filter(|r| r.status == ReservationStatus::Cancelled).count(),
        1
    );

    let err = engine.cancel_reservation(&alice, first.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));

    let err = engine
        .update_reservation(
            &alice,
            first.id,
            UpdateReservation {
                event_id: EventId::from("salon-day"),
                services: services(&["haircut"]),
                timestamp: at(12, 0),
                professional_override: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_only_owner_or_admin_can_touch_a_reservation() {
    let engine = salon_engine(3).await;
    let alice = Caller::user("alice");
    let mallory = Caller::user("mallory");
    let reservation = engine
        .create_reservation(&alice, request("salon-day", &["haircut"], 11, 0))
        .await
        .unwrap();

    assert_err!(engine.get_reservation(&mallory, reservation.id).await);
    assert_err!(engine.cancel_reservation(&mallory, reservation.id).await);
    assert_err!(engine.list_all_reservations(&mallory).await);
    assert_ok!(engine.get_reservation(&Caller::admin("root"), reservation.id).await);

    assert!(engine.list_user_reservations(&mallory).await.unwrap().is_empty());
    let stored = engine.store().get(reservation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn test_missing_reservation() {
    let engine = salon_engine(3).await;
    let err = engine
        .cancel_reservation(&Caller::admin("root"), booking_engine::ReservationId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ReservationNotFound { .. }));
}
