//! End-to-end session tests against the in-process stub engine.
//!
//! These drive a [`SimulationSession`] the way the operator console does:
//! start a scenario, stage events, submit rounds, and browse history.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use relief_core::engine::{AllocationEngine, EngineError, EngineOperation, StubEngine};
use relief_core::{SimulationError, SimulationSession};
use relief_types::{
    DisasterType, EventKind, HospitalId, NextRoundResponse, Priority, Scenario, StagedEvent,
    StartRoundResponse, ZoneDemand, ZoneId,
};

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn earthquake() -> Scenario {
    Scenario {
        disaster_type: DisasterType::Earthquake,
        coordinates: Some([38.42, 27.13]),
        zones: vec![
            ZoneDemand {
                zone_id: ZoneId::from("Z1"),
                demand: 80.0,
                coordinates: None,
            },
            ZoneDemand {
                zone_id: ZoneId::from("Z2"),
                demand: 200.0,
                coordinates: None,
            },
        ],
        events: vec![StagedEvent {
            event_type: EventKind::RoadCollapse,
            params: params(&[("hospital_id", "H1"), ("zone_id", "Z2")]),
        }],
        use_agent: true,
    }
}

/// Starts fine, then fails every advance.
#[derive(Default)]
struct FlakyEngine {
    stub: StubEngine,
}

impl AllocationEngine for FlakyEngine {
    async fn start_simulation(
        &self,
        scenario: &Scenario,
    ) -> Result<StartRoundResponse, EngineError> {
        self.stub.start_simulation(scenario).await
    }

    async fn advance_round(

        &self,

        _events: &[StagedEvent],

    ) -> Result<NextRoundResponse, EngineError> {
        Err(EngineError::Status {
            operation: EngineOperation::AdvanceRound,
            status: 503,
            body: String::from("solver unavailable"),
        })
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

#[tokio::test]
async fn start_records_round_one() {
    let session = SimulationSession::new(StubEngine::new());
    let record = session.start(&earthquake()).await.unwrap().unwrap();

    assert_eq!(record.round_number, 1);
    assert_eq!(record.allocation_snapshot.len(), 2);
    assert_eq!(record.submitted_events.len(), 1);

    let state = session.state().await;
    assert_eq!(state.len(), 1);
    assert_eq!(state.current_step(), 1);
}

#[tokio::test]
async fn start_view_reflects_the_road_collapse() {
    let session = SimulationSession::new(StubEngine::new());
    let _ = session.start(&earthquake()).await.unwrap();

    let view = session.view().await.unwrap();
    assert_eq!(view.round_number, 1);
    assert!(view.is_latest);

    let first = view.zones.first().unwrap();
    assert_eq!(first.zone_id, ZoneId::from("Z2"));
    assert_eq!(first.priority, Priority::High);

    // H1 -> Z2 is closed, so Z2's ground units come from H2.
    let h1 = view.hospital_dispatch.get(&HospitalId::from("H1")).unwrap();
    assert!(h1.get(&ZoneId::from("Z2")).is_none());
    let h2 = view.hospital_dispatch.get(&HospitalId::from("H2")).unwrap();
    assert!(h2.get(&ZoneId::from("Z2")).is_some());
}

#[tokio::test]
async fn second_start_is_ignored() {
    let session = SimulationSession::new(StubEngine::new());
    assert!(session.start(&earthquake()).await.unwrap().is_some());
    assert!(session.start(&earthquake()).await.unwrap().is_none());
    assert_eq!(session.state().await.len(), 1);
}

#[tokio::test]
async fn staged_weather_event_advances_to_round_two() {
    let session = SimulationSession::new(StubEngine::new());
    let _ = session.start(&earthquake()).await.unwrap();

    let staged = session
        .stage_event("weather", params(&[("penalty", "5")]))
        .await
        .unwrap();
    assert_eq!(staged.event_type, EventKind::Weather);
    assert_eq!(session.staged_events().await.len(), 1);

    let record = session.submit_round().await.unwrap();
    assert_eq!(record.round_number, 2);
    assert_eq!(record.submitted_events, vec![staged]);

    let status = session.status().await;
    assert_eq!(status.rounds, 2);
    assert_eq!(status.current_step, 2);
    assert_eq!(status.staged_events, 0);
    assert!(status.started);
    assert!(!status.advance_in_flight);
}

#[tokio::test]
async fn missing_parameter_stages_nothing() {
    let session = SimulationSession::new(StubEngine::new());
    let result = session
        .stage_event("road_collapse", params(&[("hospital_id", "H1")]))
        .await;

    assert!(matches!(
        result,
        Err(SimulationError::MissingParameter {
            kind: EventKind::RoadCollapse,
            name: "zone_id"
        })
    ));
    assert!(session.staged_events().await.is_empty());
}

#[tokio::test]
async fn unknown_kind_is_rejected() {
    let session = SimulationSession::new(StubEngine::new());
    let result = session.stage_event("earthquake", BTreeMap::new()).await;
    assert!(matches!(result, Err(SimulationError::UnknownEventKind(_))));
}

#[tokio::test]
async fn invalid_scenario_event_leaves_start_available() {
    let session = SimulationSession::new(StubEngine::new());
    let mut scenario = earthquake();
    scenario.events = vec![StagedEvent {
        event_type: EventKind::Flood,
        params: params(&[("severity_factor", "  ")]),
    }];

    let result = session.start(&scenario).await;
    assert!(matches!(result, Err(SimulationError::MissingParameter { .. })));
    assert!(!session.status().await.started);

    assert!(session.start(&earthquake()).await.unwrap().is_some());
}

#[tokio::test]
async fn submit_before_start_keeps_staged_events() {
    let session = SimulationSession::new(StubEngine::new());
    let _ = session
        .stage_event("flood", params(&[("severity_factor", "1.5")]))
        .await
        .unwrap();

    let result = session.submit_round().await;
    assert!(matches!(result, Err(SimulationError::NotStarted)));
    assert_eq!(session.staged_events().await.len(), 1);
}

#[tokio::test]
async fn failed_advance_restores_events_and_history() {
    let session = SimulationSession::new(FlakyEngine::default());
    let _ = session.start(&earthquake()).await.unwrap();

    let _ = session
        .stage_event("weather", params(&[("penalty", "5")]))
        .await
        .unwrap();
    let _ = session
        .stage_event("bridge_out", params(&[("hospital_id", "H1"), ("zone_id", "Z1")]))
        .await
        .unwrap();

    let err = session.submit_round().await.unwrap_err();
    assert!(matches!(err, SimulationError::EngineFailure(_)));
    assert!(err.is_recoverable());
    assert_eq!(
        err.to_string(),
        "engine failure: Next round failed (503): solver unavailable"
    );

    let kinds: Vec<EventKind> = session
        .staged_events()
        .await
        .iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(kinds, vec![EventKind::Weather, EventKind::BridgeOut]);

    let state = session.state().await;
    assert_eq!(state.len(), 1);
    assert_eq!(state.current_step(), 1);
}

#[tokio::test]
async fn browsing_history_does_not_change_numbering() {
    let session = SimulationSession::new(StubEngine::new());
    let _ = session.start(&earthquake()).await.unwrap();
    let _ = session.submit_round().await.unwrap();
    let _ = session.submit_round().await.unwrap();

    session.select_round(1).await.unwrap();
    let view = session.view().await.unwrap();
    assert_eq!(view.round_number, 1);
    assert_eq!(view.latest_round, 3);
    assert!(!view.is_latest);

    let out_of_range = session.select_round(4).await;
    assert!(matches!(
        out_of_range,
        Err(SimulationError::RoundOutOfRange {
            requested: 4,
            rounds: 3
        })
    ));

    let next = session.submit_round().await.unwrap();
    assert_eq!(next.round_number, 4);
    assert_eq!(session.state().await.current_step(), 4);
}

#[tokio::test]
async fn discard_removes_one_staged_event() {
    let session = SimulationSession::new(StubEngine::new());
    let _ = session
        .stage_event("weather", params(&[("penalty", "5")]))
        .await
        .unwrap();
    let _ = session
        .stage_event("flood", params(&[("severity_factor", "2")]))
        .await
        .unwrap();

    let removed = session.discard_event(0).await.unwrap();
    assert_eq!(removed.event_type, EventKind::Weather);
    assert!(matches!(
        session.discard_event(5).await,
        Err(SimulationError::StagedEventNotFound { index: 5, staged: 1 })
    ));
}
