//! Unit tests for bp-demand.

// ── Origins ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod origin {
    use approx::assert_relative_eq;
    use bp_core::{OriginId, Point};

    use crate::{DemandError, OriginSet, SocioTable};

    fn three(weights: [Option<f64>; 3]) -> OriginSet {
        OriginSet::new(
            ["a", "b", "c"]
                .into_iter()
                .zip(weights)
                .enumerate()
                .map(|(i, (k, w))| (k.to_string(), Point::new(i as f64, 0.0), 10.0, w)),
        )
        .unwrap()
    }

    #[test]
    fn unweighted_origins_have_weight_one() {
        let set = three([None, None, None]);
        assert_eq!(set.len(), 3);
        assert!(set.iter().all(|o| o.weight == 1.0));
        assert_eq!(set.get(OriginId(1)).key, "b");
        assert_eq!(set.total_effective_size(), 30.0);
    }

    #[test]
    fn weights_normalized_to_mean_one() {
        let set = three([Some(2.0), Some(4.0), Some(6.0)]);
        let w: Vec<f64> = set.iter().map(|o| o.weight).collect();
        assert_relative_eq!(w[0], 0.5);
        assert_relative_eq!(w[1], 1.0);
        assert_relative_eq!(w[2], 1.5);
        assert_relative_eq!(set.get(OriginId(2)).effective_size(), 15.0);
    }

    #[test]
    fn socio_join_with_missing_key() {
        let mut set = three([None, None, None]);
        let table: SocioTable = [("a".to_string(), 1.0), ("c".to_string(), 3.0)].into_iter().collect();
        let missing = set.apply_socio(&table).unwrap();
        assert_eq!(missing, 1);
        assert_relative_eq!(set.get(OriginId(0)).weight, 0.5);
        assert_relative_eq!(set.get(OriginId(1)).weight, 1.0);
        assert_relative_eq!(set.get(OriginId(2)).weight, 1.5);
    }

    #[test]
    fn duplicate_key_rejected() {
        let err = OriginSet::new([
            ("x".to_string(), Point::new(0.0, 0.0), 1.0, None),
            ("x".to_string(), Point::new(1.0, 0.0), 1.0, None),
        ])
        .unwrap_err();
        assert!(matches!(err, DemandError::DuplicateOrigin(k) if k == "x"));
    }

    #[test]
    fn bad_values_rejected() {
        let nan_pos = OriginSet::new([("a".to_string(), Point::new(f64::NAN, 0.0), 1.0, None)]);
        assert!(matches!(nan_pos, Err(DemandError::InvalidOrigin { .. })));
        let neg_size = OriginSet::new([("a".to_string(), Point::new(0.0, 0.0), -1.0, None)]);
        assert!(neg_size.is_err());
        let neg_weight = OriginSet::new([("a".to_string(), Point::new(0.0, 0.0), 1.0, Some(-2.0))]);
        assert!(neg_weight.is_err());
        let all_zero = OriginSet::new([("a".to_string(), Point::new(0.0, 0.0), 1.0, Some(0.0))]);
        assert!(all_zero.is_err());
    }
}

// ── Socio-economic index ──────────────────────────────────────────────────────

#[cfg(test)]
mod socio {
    use approx::assert_relative_eq;

    use crate::{composite_index, points, quantile, SocioTable};

    #[test]
    fn quantile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(5.0));
        assert_relative_eq!(quantile(&v, 0.2).unwrap(), 1.8);
        assert_relative_eq!(quantile(&v, 0.8).unwrap(), 4.2);
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn points_by_quintile() {
        let col: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
        // 20th pct = 2.8, 80th pct = 8.2
        let p = points(&col);
        assert_eq!(p, vec![3, 3, 2, 2, 2, 2, 2, 2, 1, 1]);
    }

    #[test]
    fn coinciding_quantiles_score_high() {
        // 20th and 80th pct are both 1.
        let col = [1.0, 1.0, 1.0, 1.0, 1.0, 5.0].map(Some);
        assert_eq!(points(&col), vec![1; 6]);
    }

    #[test]
    fn missing_scores_neutral() {
        let p = points(&[Some(1.0), None, Some(10.0)]);
        assert_eq!(p[1], 2);
        assert_eq!(points(&[None, None]), vec![2, 2]);
    }

    #[test]
    fn composite_has_mean_one() {
        let a: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
        let b: Vec<Option<f64>> = (1..=10).rev().map(|v| Some(v as f64)).collect();
        let idx = composite_index(&[a.clone(), a, b]);
        let mean = idx.iter().sum::<f64>() / idx.len() as f64;
        assert_relative_eq!(mean, 1.0, epsilon = 1e-12);
        // Row 0 scores 3 + 3 + 1, row 9 scores 1 + 1 + 3.
        assert!(idx[0] > idx[9]);
        assert!(composite_index(&[]).is_empty());
    }

    #[test]
    fn table_from_indicators() {
        let keys: Vec<String> = ["z1", "z2"].iter().map(|s| s.to_string()).collect();
        let t = SocioTable::from_indicators(&keys, &[vec![Some(0.1), Some(0.9)]]);
        assert_eq!(t.len(), 2);
        // 3 and 1 points; mean 2.
        assert_relative_eq!(t.get("z1").unwrap(), 1.5);
        assert_relative_eq!(t.get(" z2 ").unwrap(), 0.5);
        assert!(t.get("z3").is_none());
    }
}

// ── Destinations ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod destination {
    use bp_catalog::Catalog;
    use bp_core::{DestinationId, Point};

    use crate::{DemandError, DestinationSet, DestinationSource, PoiRecord, SizedPoint};

    fn poi(x: f64, class: &str, size: Option<f64>) -> PoiRecord {
        PoiRecord { pos: Point::new(x, 0.0), class: class.into(), size }
    }

    #[test]
    fn pois_classified_and_ids_dense() {
        let cat = Catalog::default_calibration();
        let set = DestinationSet::build(&cat, [
            DestinationSource::pois(vec![
                poi(0.0, "supermarket", None),
                poi(1.0, "nightclub", None),
                poi(2.0, "cafe", Some(0.0)),
            ]),
            DestinationSource::workplaces(vec![SizedPoint { pos: Point::new(3.0, 0.0), size: 120.0 }]),
        ])
        .unwrap();

        assert_eq!(set.len(), 4);
        let shop = set.get(DestinationId(0));
        assert_eq!(shop.category, cat.category_id("shopping"));
        assert_eq!(shop.size, 1.0);
        assert!(shop.is_admissible());

        assert_eq!(set.get(DestinationId(1)).category, None);
        assert!(!set.get(DestinationId(2)).is_admissible());

        let work = set.get(DestinationId(3));
        assert_eq!(work.category, cat.category_id("work"));
        assert_eq!(work.size, 120.0);
        assert_eq!(set.admissible_count(), 2);
        assert_eq!(set.index_items().count(), 4);
    }

    #[test]
    fn school_layer_without_calibration_is_config_error() {
        let cat = Catalog::default_calibration();
        let err = DestinationSet::build(&cat, [DestinationSource::schools(vec![])]).unwrap_err();
        assert!(matches!(err, DemandError::MissingCategory { ref category, .. } if category == "school"));
    }

    #[test]
    fn non_finite_destination_rejected() {
        let cat = Catalog::default_calibration();
        let res = DestinationSet::build(&cat, [DestinationSource::pois(vec![poi(f64::INFINITY, "cafe", None)])]);
        assert!(matches!(res, Err(DemandError::InvalidDestination { .. })));
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use approx::assert_relative_eq;
    use bp_core::OriginId;

    use crate::{
        load_indicators_reader, load_origins_reader, load_pois_reader, load_sized_reader,
        load_socio_reader,
    };

    #[test]
    fn origins_with_optional_weight() {
        let csv = "id,x,y,size,weight\nA,0,0,100,1\nB,10,0,50,3\n";
        let set = load_origins_reader(Cursor::new(csv)).unwrap();
        assert_eq!(set.len(), 2);
        assert_relative_eq!(set.get(OriginId(0)).weight, 0.5);
        assert_relative_eq!(set.get(OriginId(1)).weight, 1.5);

        let plain = load_origins_reader(Cursor::new("id,x,y,size\nA,0,0,100\n")).unwrap();
        assert_eq!(plain.get(OriginId(0)).weight, 1.0);
    }

    #[test]
    fn pois_default_size() {
        let csv = "x,y,class,size\n1,2,cafe,\n3,4,park,5\n";
        let pois = load_pois_reader(Cursor::new(csv)).unwrap();
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].size, None);
        assert_eq!(pois[1].size, Some(5.0));
        assert_eq!(pois[1].class, "park");
    }

    #[test]
    fn sized_rows() {
        let pts = load_sized_reader(Cursor::new("x,y,size\n0,0,12.5\n")).unwrap();
        assert_eq!(pts[0].size, 12.5);
        assert!(load_sized_reader(Cursor::new("x,y\n0,0\n")).is_err());
    }

    #[test]
    fn socio_first_two_columns() {
        let csv = "deso,index,extra\n0180A,1.2,x\n0180B,0.8,y\n";
        let t = load_socio_reader(Cursor::new(csv)).unwrap();
        assert_eq!(t.get("0180A"), Some(1.2));
        assert!(load_socio_reader(Cursor::new("deso,index\n0180A,abc\n")).is_err());
    }

    #[test]
    fn indicators_scored_into_composite() {
        // five keys, two indicators; "e" lacks the second one
        let csv = "deso,income,education\na,1,10\nb,2,20\nc,3,30\nd,4,40\ne,5,\n";
        let t = load_indicators_reader(Cursor::new(csv)).unwrap();
        assert_eq!(t.len(), 5);
        let total: f64 = ["a", "b", "c", "d", "e"].iter().map(|k| t.get(k).unwrap()).sum();
        assert!((total - 5.0).abs() < 1e-9);
        assert!(t.get("a").unwrap() > t.get("c").unwrap());
        assert!(load_indicators_reader(Cursor::new("deso\na\n")).is_err());
        assert!(load_indicators_reader(Cursor::new("deso,x\na,oops\n")).is_err());
    }
}
