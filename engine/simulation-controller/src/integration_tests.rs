//! End-to-end runs through the controller in both execution modes

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glam::DVec3;
use simulation_clock::{ClockError, SettingsHandle, SimulationSettings};
use tempfile::TempDir;

use crate::aircraft::{Aircraft, Fleet};
use crate::controller::SimulationController;
use crate::error::ControllerError;
use crate::kinematic::KinematicAircraft;
use crate::termination::TerminationReason;
use crate::test_support::{
    head_on_pair, parallel_pair, FailingExporter, RecordingExporter, SettingsEditingAircraft,
};
use crate::ExecutionMode;

fn recording_controller() -> (SimulationController, Arc<RecordingExporter>) {
    let exporter = Arc::new(RecordingExporter::default());
    let controller = SimulationController::new().with_exporter(exporter.clone());
    (controller, exporter)
}

fn fast_settings() -> SettingsHandle {
    SettingsHandle::new(SimulationSettings {
        physics_period_ms: 5,
        surveillance_period_ms: 50,
        render_period_ms: 10,
        pacing_period_ms: 100,
        ..SimulationSettings::default()
    })
}

fn kinematic_head_on() -> Fleet {
    let aircraft: Vec<Box<dyn Aircraft>> = vec![
        Box::new(KinematicAircraft::new(0, DVec3::new(0.0, 0.0, 1000.0), DVec3::new(50.0, 0.0, 0.0))),
        Box::new(KinematicAircraft::new(1, DVec3::new(2000.0, 0.0, 1000.0), DVec3::new(-50.0, 0.0, 0.0))),
    ];
    Fleet::new(aircraft)
}

#[test]
fn test_batch_head_on_without_evasion_collides() {
    let (fleet, first_commands, second_commands) = head_on_pair(2000.0, 50.0);
    let (mut controller, exporter) = recording_controller();

    let outcome = controller
        .start_batch(fleet, SettingsHandle::default(), Duration::from_secs(60))
        .unwrap();

    assert_eq!(outcome.reason, TerminationReason::CollisionDetected);
    assert!(outcome.collision);
    assert!(outcome.conflict_first_caused);
    assert!(outcome.conflict_second_caused);
    assert_eq!(first_commands.load(Ordering::SeqCst), 1);
    assert_eq!(second_commands.load(Ordering::SeqCst), 0);

    // closest approach at 20s; registered once it is within two surveillance periods
    assert!(outcome.report.simulated_time >= Duration::from_secs(18));
    assert!(outcome.report.simulated_time < Duration::from_secs(20));
    assert!(!controller.is_running());
    assert_eq!(exporter.exports.lock().len(), 1);
}

#[test]
fn test_batch_evasion_avoids_collision() {
    let (mut controller, _exporter) = recording_controller();

    let outcome = controller
        .start_batch(kinematic_head_on(), SettingsHandle::default(), Duration::from_secs(60))
        .unwrap();

    assert_eq!(outcome.reason, TerminationReason::TimeExhausted);
    assert!(!outcome.collision);
    assert!(outcome.conflict_first_caused);
    assert_eq!(outcome.physics_cycle_count, 6_000);
}

#[test]
fn test_batch_parallel_tracks_run_to_budget() {
    let (mut controller, exporter) = recording_controller();

    let outcome = controller
        .start_batch(parallel_pair(250.0), SettingsHandle::default(), Duration::from_secs(120))
        .unwrap();

    assert_eq!(outcome.reason, TerminationReason::TimeExhausted);
    assert_eq!(outcome.physics_cycle_count, 12_000);
    assert_eq!(outcome.surveillance_cycle_count, 120);
    assert_eq!(outcome.report.simulated_time, Duration::from_secs(120));
    assert!(!outcome.collision);
    assert!(!outcome.conflict_first_caused);
    assert!(!outcome.conflict_second_caused);

    let exports = exporter.exports.lock();
    assert_eq!(exports[0].len(), 2);
    assert_eq!(exports[0][0].points.len(), 120);
}

#[test]
fn test_batch_runs_are_deterministic() {
    let run = || {
        let (mut controller, exporter) = recording_controller();
        let outcome = controller
            .start_batch(kinematic_head_on(), SettingsHandle::default(), Duration::from_secs(30))
            .unwrap();
        let tracks = exporter.exports.lock()[0].clone();
        let flags = (outcome.collision, outcome.conflict_first_caused, outcome.conflict_second_caused);
        (outcome.physics_cycle_count, outcome.surveillance_cycle_count, outcome.reason, flags, tracks)
    };

    assert_eq!(run(), run());
}

#[test]
fn test_batch_simulated_time_across_physics_period_change() {
    let settings = SettingsHandle::default();
    let first = KinematicAircraft::new(0, DVec3::new(0.0, 0.0, 1000.0), DVec3::new(80.0, 0.0, 0.0));
    let aircraft: Vec<Box<dyn Aircraft>> = vec![
        Box::new(SettingsEditingAircraft::new(first, settings.clone(), 50, 20)),
        Box::new(KinematicAircraft::new(1, DVec3::new(0.0, 250.0, 1000.0), DVec3::new(60.0, 0.0, 0.0))),
    ];
    let (mut controller, _exporter) = recording_controller();

    let outcome = controller
        .start_batch(Fleet::new(aircraft), settings, Duration::from_secs(10))
        .unwrap();

    // 101 steps of 10ms until the second surveillance cycle picks up the
    // new period, then 450 steps of 20ms
    assert_eq!(outcome.reason, TerminationReason::TimeExhausted);
    assert_eq!(outcome.physics_cycle_count, 551);
    assert_eq!(outcome.report.simulated_time, Duration::from_millis(10_010));
}

#[test]
fn test_toggle_adsb_report_on_active_run() {
    let (mut controller, _exporter) = recording_controller();
    assert!(controller.toggle_adsb_report().is_none());

    controller.start_realtime(parallel_pair(250.0), fast_settings()).unwrap();
    assert_eq!(controller.toggle_adsb_report(), Some(true));
    assert!(controller.state().unwrap().adsb_report());
    assert_eq!(controller.toggle_adsb_report(), Some(false));

    controller.stop();
    assert!(controller.toggle_adsb_report().is_none());
}

#[test]
fn test_batch_writes_csv_to_export_dir() {
    let dir = TempDir::new().unwrap();
    let settings = SettingsHandle::new(SimulationSettings {
        export_dir: dir.path().join("visited"),
        ..SimulationSettings::default()
    });
    let mut controller = SimulationController::new();

    controller.start_batch(parallel_pair(250.0), settings, Duration::from_secs(5)).unwrap();

    let files = std::fs::read_dir(dir.path().join("visited")).unwrap().count();
    assert_eq!(files, 2);
}

#[test]
fn test_rejects_small_fleet_and_invalid_settings() {
    let mut controller = SimulationController::new();
    let aircraft: Vec<Box<dyn Aircraft>> =
        vec![Box::new(KinematicAircraft::new(0, DVec3::ZERO, DVec3::X))];

    let result = controller.start_batch(Fleet::new(aircraft), SettingsHandle::default(), Duration::from_secs(1));
    assert!(matches!(result, Err(ControllerError::InsufficientAircraft { count: 1 })));

    let settings = SettingsHandle::new(SimulationSettings {
        physics_period_ms: 0,
        ..SimulationSettings::default()
    });
    let result = controller.start_realtime(parallel_pair(250.0), settings);
    assert!(matches!(result, Err(ControllerError::Clock(ClockError::InvalidConfig(_)))));
    assert!(!controller.is_running());
}

#[test]
fn test_single_active_run() {
    let (mut controller, _exporter) = recording_controller();
    controller.start_realtime(parallel_pair(250.0), fast_settings()).unwrap();
    assert_eq!(controller.mode(), Some(ExecutionMode::Realtime));

    let second = controller.start_realtime(parallel_pair(250.0), fast_settings());
    assert!(matches!(second, Err(ControllerError::AlreadyRunning)));

    let batch = controller.start_batch(parallel_pair(250.0), fast_settings(), Duration::from_secs(1));
    assert!(matches!(batch, Err(ControllerError::AlreadyRunning)));

    assert!(controller.stop().is_some());
    assert!(controller.stop().is_none());
    assert!(controller.toggle_pause().is_none());
}

#[test]
fn test_realtime_head_on_terminates_on_collision() {
    let (fleet, first_commands, _) = head_on_pair(200.0, 50.0);
    let (controller, exporter) = recording_controller();
    let mut controller = controller.with_time_budget(Duration::from_secs(10));

    controller.start_realtime(fleet, fast_settings()).unwrap();
    let reason = controller.wait_for_termination(Duration::from_millis(10));

    assert_eq!(reason, Some(TerminationReason::CollisionDetected));
    let state = controller.state().unwrap();
    assert!(state.collision());
    assert!(state.conflict_first_caused());
    assert_eq!(first_commands.load(Ordering::SeqCst), 1);

    let report = controller.stop().unwrap();
    assert!(report.simulated_time > Duration::ZERO);
    assert!(!state.is_running());
    assert_eq!(exporter.exports.lock().len(), 1);
}

#[test]
fn test_realtime_manual_stop() {
    let (mut controller, _exporter) = recording_controller();
    let signal = controller.stop_signal();
    controller.start_realtime(parallel_pair(250.0), fast_settings()).unwrap();

    let raiser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(120));
        signal.raise();
    });

    let reason = controller.wait_for_termination(Duration::from_millis(10));
    raiser.join().unwrap();

    assert_eq!(reason, Some(TerminationReason::ManualStop));
    controller.stop();
}

#[test]
fn test_realtime_pause_accounting() {
    let (mut controller, _exporter) = recording_controller();
    controller.start_realtime(parallel_pair(250.0), fast_settings()).unwrap();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(controller.toggle_pause(), Some(true));
    thread::sleep(Duration::from_millis(150));
    assert_eq!(controller.toggle_pause(), Some(false));
    thread::sleep(Duration::from_millis(50));

    let report = controller.stop().unwrap();
    assert!(report.paused_time >= Duration::from_millis(140));
    assert!(report.real_time_with_pauses >= report.paused_time);
    assert!(report.real_time() < report.real_time_with_pauses);
}

#[test]
fn test_reset_clears_collision() {
    let (fleet, _, _) = head_on_pair(200.0, 50.0);
    let (mut controller, _exporter) = recording_controller();

    controller.start_realtime(fleet, fast_settings()).unwrap();
    let reason = controller.wait_for_termination(Duration::from_millis(10));
    assert_eq!(reason, Some(TerminationReason::CollisionDetected));

    controller.reset().unwrap();
    let state = controller.state().unwrap();
    assert!(!state.collision());
    assert!(!state.is_paused());
    assert!(state.is_running());

    controller.stop();
    assert!(matches!(controller.reset(), Err(ControllerError::NotRunning)));
}

#[test]
fn test_failed_export_does_not_block_shutdown() {
    let mut controller = SimulationController::new().with_exporter(Arc::new(FailingExporter));

    let outcome = controller
        .start_batch(parallel_pair(250.0), SettingsHandle::default(), Duration::from_secs(2))
        .unwrap();

    assert_eq!(outcome.reason, TerminationReason::TimeExhausted);
    assert!(!controller.is_running());
}
