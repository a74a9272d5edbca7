use gatekeeper_core::{AdmissionConfig, AdmissionController, AdmissionOutcome};
use gatekeeper_packets::{AdmissionDecision, Handshake, InboundEvent, Reason, SourceAddress};
use std::net::{IpAddr, Ipv4Addr};

fn source(last_octet: u8) -> SourceAddress {
    SourceAddress::new(IpAddr::V4(Ipv4Addr::new(203, 0, 113, last_octet)))
}

fn minimal_config() -> AdmissionConfig {
    let mut config = AdmissionConfig::default();
    config.collision.enabled = false;
    config.vehicle.enabled = false;
    config.map_captcha.enabled = false;
    config
}

fn gravity_and_collision_config() -> AdmissionConfig {
    let mut config = AdmissionConfig::default();
    config.vehicle.enabled = false;
    config.client_brand.enabled = false;
    config.map_captcha.enabled = false;
    config
}

fn captcha_only_config() -> AdmissionConfig {
    let mut config = AdmissionConfig::default();
    config.gravity.enabled = false;
    config.collision.enabled = false;
    config.vehicle.enabled = false;
    config.client_brand.enabled = false;
    config.map_captcha.alphabet = "A".to_string();
    config.map_captcha.code_length = 1;
    config.map_captcha.precompute = 1;
    config
}

#[tokio::test]
async fn a_well_behaved_client_is_admitted() {
    let controller = AdmissionController::new(minimal_config()).expect("valid config");
    controller.enable(&mut rand::rng()).await.expect("core enabled");

    let handshake = Handshake::new("Notch", source(1), 770);
    let session_id = match controller.begin_admission(handshake).await {
        AdmissionOutcome::Verifying { session_id, .. } => session_id,
        other => panic!("expected a verification session, got {other:?}"),
    };

    assert!(
        controller
            .on_inbound_event(
                session_id,
                InboundEvent::PlayerPosition {
                    x: 0.0,
                    y: 74.0,
                    z: 0.0,
                    on_ground: false,
                    has_rotation: false,
                },
            )
            .await
            .is_none()
    );

    assert!(
        controller
            .on_inbound_event(
                session_id,
                InboundEvent::PlayerPosition {
                    x: 0.0,
                    y: 65.0,
                    z: 0.0,
                    on_ground: true,
                    has_rotation: false,
                },
            )
            .await
            .is_none(),
        "gravity check passes, client brand check still pending"
    );

    let decision = controller
        .on_inbound_event(
            session_id,
            InboundEvent::PluginMessageBrand { brand: "vanilla".into() },
        )
        .await;
    assert_eq!(decision, Some(AdmissionDecision::Admit));
    assert_eq!(controller.live_session_count().await, 0);
}

#[tokio::test]
async fn a_bad_landing_height_fails_and_records_a_reputation_strike() {
    let controller = AdmissionController::new(minimal_config()).expect("valid config");
    controller.enable(&mut rand::rng()).await.expect("core enabled");

    let handshake = Handshake::new("Herobrine", source(2), 770);
    let session_id = match controller.begin_admission(handshake).await {
        AdmissionOutcome::Verifying { session_id, .. } => session_id,
        other => panic!("expected a verification session, got {other:?}"),
    };

    controller
        .on_inbound_event(
            session_id,
            InboundEvent::PlayerPosition {
                x: 0.0,
                y: 74.0,
                z: 0.0,
                on_ground: false,
                has_rotation: false,
            },
        )
        .await;

    let decision = controller
        .on_inbound_event(
            session_id,
            InboundEvent::PlayerPosition {
                x: 0.0,
                y: 70.0,
                z: 0.0,
                on_ground: true,
                has_rotation: false,
            },
        )
        .await;

    assert_eq!(
        decision,
        Some(AdmissionDecision::hard_deny(Reason::WrongLandingHeight))
    );
    assert_eq!(controller.reputation_size().await, 1);
}

#[tokio::test]
async fn an_invalid_username_is_denied_before_a_session_starts() {
    let controller = AdmissionController::new(minimal_config()).expect("valid config");
    controller.enable(&mut rand::rng()).await.expect("core enabled");

    let handshake = Handshake::new("x", source(3), 770);
    let outcome = controller.begin_admission(handshake).await;
    assert!(matches!(
        outcome,
        AdmissionOutcome::Decision(AdmissionDecision::HardDeny { reason: Reason::InvalidName })
    ));
    assert_eq!(controller.live_session_count().await, 0);
}

#[tokio::test]
async fn the_per_ip_cap_denies_a_connection_beyond_the_limit() {
    let mut config = minimal_config();
    config.max_online_per_ip = 1;
    let controller = AdmissionController::new(config).expect("valid config");
    controller.enable(&mut rand::rng()).await.expect("core enabled");

    let first = source(4);
    let outcome = controller.begin_admission(Handshake::new("Alex", first, 770)).await;
    assert!(matches!(outcome, AdmissionOutcome::Verifying { .. }));

    let outcome = controller.begin_admission(Handshake::new("Steve", first, 770)).await;
    assert!(matches!(
        outcome,
        AdmissionOutcome::Decision(AdmissionDecision::HardDeny { reason: Reason::IpLimit })
    ));
}

#[tokio::test]
async fn a_closed_connection_frees_its_ip_slot_without_a_reputation_strike() {
    let mut config = minimal_config();
    config.max_online_per_ip = 1;
    let controller = AdmissionController::new(config).expect("valid config");
    controller.enable(&mut rand::rng()).await.expect("core enabled");

    let addr = source(5);
    let session_id = match controller.begin_admission(Handshake::new("Alex", addr, 770)).await {
        AdmissionOutcome::Verifying { session_id, .. } => session_id,
        other => panic!("expected a verification session, got {other:?}"),
    };

    controller.on_client_close(session_id).await;
    assert_eq!(controller.reputation_size().await, 0);

    let outcome = controller.begin_admission(Handshake::new("Steve", addr, 770)).await;
    assert!(matches!(outcome, AdmissionOutcome::Verifying { .. }));
}

#[tokio::test]
async fn sustained_load_engages_the_attack_detector_and_queues_new_handshakes() {
    let mut config = minimal_config();
    config.attack_detector.min_players_for_attack = 5;
    config.attack_detector.min_attack_duration_secs = 0;
    let controller = AdmissionController::new(config).expect("valid config");
    controller.enable(&mut rand::rng()).await.expect("core enabled");

    for i in 0..5u8 {
        controller
            .begin_admission(Handshake::new(format!("Player{i}"), source(10 + i), 770))
            .await;
    }
    controller.tick_one_second().await;
    assert_eq!(controller.attack_mode(), gatekeeper_core::attack_detector::AttackMode::UnderAttack);

    let outcome = controller
        .begin_admission(Handshake::new("Overflow", source(20), 770))
        .await;
    assert!(matches!(
        outcome,
        AdmissionOutcome::Decision(AdmissionDecision::Queue)
    ));
    assert_eq!(controller.queue_depth().await, 1);
}

#[tokio::test]
async fn gravity_and_collision_together_admit_a_correct_landing() {
    let controller = AdmissionController::new(gravity_and_collision_config()).expect("valid config");
    controller.enable(&mut rand::rng()).await.expect("core enabled");

    let handshake = Handshake::new("Gilbert", source(6), 770);
    let session_id = match controller.begin_admission(handshake).await {
        AdmissionOutcome::Verifying { session_id, .. } => session_id,
        other => panic!("expected a verification session, got {other:?}"),
    };

    assert!(
        controller
            .on_inbound_event(
                session_id,
                InboundEvent::PlayerPosition {
                    x: 0.0,
                    y: 74.0,
                    z: 0.0,
                    on_ground: false,
                    has_rotation: false,
                },
            )
            .await
            .is_none(),
        "teleport acknowledgement alone must not resolve collision while still airborne"
    );

    let decision = controller
        .on_inbound_event(
            session_id,
            InboundEvent::PlayerPosition {
                x: 0.0,
                y: 65.0,
                z: 0.0,
                on_ground: true,
                has_rotation: false,
            },
        )
        .await;
    assert_eq!(decision, Some(AdmissionDecision::Admit));
}

#[tokio::test]
async fn a_correct_captcha_answer_admits_the_client() {
    let controller = AdmissionController::new(captcha_only_config()).expect("valid config");
    controller.enable(&mut rand::rng()).await.expect("core enabled");
    assert_eq!(controller.captcha_pool_size().await, 1);

    let handshake = Handshake::new("Harriet", source(7), 770);
    let session_id = match controller.begin_admission(handshake).await {
        AdmissionOutcome::Verifying { session_id, .. } => session_id,
        other => panic!("expected a verification session, got {other:?}"),
    };
    assert_eq!(controller.captcha_pool_size().await, 0);

    let decision = controller
        .on_inbound_event(session_id, InboundEvent::ChatLine { text: "a".into() })
        .await;
    assert_eq!(decision, Some(AdmissionDecision::Admit));
}
