//! Unit tests for bp-core primitives.

#[cfg(test)]
mod ids {
    use crate::{CategoryId, NodeId, OriginId, SegmentId};

    #[test]
    fn index_roundtrip() {
        let id = OriginId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(OriginId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(SegmentId(0) < SegmentId(1));
        assert!(NodeId(100) > NodeId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(SegmentId::INVALID.0, u64::MAX);
        assert_eq!(CategoryId::INVALID.0, u16::MAX);
        assert_eq!(SegmentId::default(), SegmentId::INVALID);
    }

    #[test]
    fn category_id_rejects_overflow() {
        assert!(CategoryId::try_from(70_000usize).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(SegmentId(7).to_string(), "SegmentId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Point;

    #[test]
    fn zero_distance() {
        let p = Point::new(674_032.0, 6_580_821.0);
        assert_eq!(p.distance_m(p), 0.0);
    }

    #[test]
    fn pythagorean_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(300.0, 400.0);
        assert_eq!(a.distance_m(b), 500.0);
        assert_eq!(a.distance_2(b), 250_000.0);
    }

    #[test]
    fn non_finite_detected() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
    }
}

#[cfg(test)]
mod mode {
    use crate::Mode;

    #[test]
    fn labels_and_indices() {
        assert_eq!(Mode::Bike.as_str(), "bike");
        assert_eq!(Mode::Ebike.to_string(), "ebike");
        assert_eq!(Mode::ALL.map(Mode::index), [0, 1]);
    }
}

#[cfg(test)]
mod config {
    use crate::{BpError, FlowConfig, Mode, ModeSplit, DEFAULT_MAX_DISTANCE_M};

    #[test]
    fn defaults() {
        let c = FlowConfig::default();
        assert_eq!(c.max_distance_m, 30_000.0);
        assert_eq!(c.max_candidates, 9_001);
        assert_eq!(c.mode_split, ModeSplit { bike: 0.8, ebike: 0.2 });
        assert_eq!(c.mode_split.share(Mode::Ebike), 0.2);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn non_positive_cutoff_disables() {
        let c = FlowConfig { max_distance_m: 0.0, ..FlowConfig::default() };
        assert_eq!(c.network_cutoff(), None);
        assert_eq!(c.search_radius(), f64::INFINITY);
        assert_eq!(c.mode_scale_m(), DEFAULT_MAX_DISTANCE_M);

        let c = FlowConfig { max_distance_m: -5.0, ..FlowConfig::default() };
        assert_eq!(c.network_cutoff(), None);
    }

    #[test]
    fn radius_defaults_to_cutoff() {
        let c = FlowConfig { max_distance_m: 1_000.0, ..FlowConfig::default() };
        assert_eq!(c.search_radius(), 1_000.0);
        assert_eq!(c.mode_scale_m(), 1_000.0);
    }

    #[test]
    fn radius_smaller_than_cutoff_rejected() {
        let c = FlowConfig {
            max_distance_m:  1_000.0,
            search_radius_m: Some(500.0),
            ..FlowConfig::default()
        };
        assert!(matches!(c.validate(), Err(BpError::Config(_))));
    }

    #[test]
    fn wider_radius_accepted() {
        let c = FlowConfig {
            max_distance_m:  1_000.0,
            search_radius_m: Some(2_000.0),
            ..FlowConfig::default()
        };
        assert!(c.validate().is_ok());
        assert_eq!(c.search_radius(), 2_000.0);
    }

    #[test]
    fn finite_radius_without_cutoff_rejected() {
        let c = FlowConfig {
            max_distance_m:  0.0,
            search_radius_m: Some(2_000.0),
            ..FlowConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn negative_share_rejected() {
        let c = FlowConfig {
            mode_split: ModeSplit { bike: -0.1, ebike: 0.2 },
            ..FlowConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_candidates_rejected() {
        let c = FlowConfig { max_candidates: 0, ..FlowConfig::default() };
        assert!(c.validate().is_err());
    }
}
