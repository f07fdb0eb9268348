//! Built-in scenarios

use glam::DVec3;
use simulation_controller::{Aircraft, Fleet, KinematicAircraft};

/// Two aircraft converging at 1000 m altitude with a 300 m miss distance
pub fn default_fleet() -> Fleet {
    let aircraft: Vec<Box<dyn Aircraft>> = vec![
        Box::new(KinematicAircraft::new(
            0,
            DVec3::new(100.0, 1000.0, 1000.0),
            DVec3::new(60.0, -70.0, 0.0),
        )),
        Box::new(KinematicAircraft::new(
            1,
            DVec3::new(900.0, 1300.0, 1000.0),
            DVec3::new(0.0, -70.0, 0.0),
        )),
    ];
    Fleet::new(aircraft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation_controller::ConflictDetector;

    #[test]
    fn test_default_fleet_is_conflict_free() {
        let fleet = default_fleet();
        let snapshots = fleet.snapshots();
        let result = ConflictDetector::default().evaluate(&snapshots[0], &snapshots[1]).unwrap();

        assert_eq!(fleet.len(), 2);
        assert!(result.is_converging());
        assert!((result.miss_distance - 300.0).abs() < 1e-9);
        assert!(!result.is_conflict);
    }
}
