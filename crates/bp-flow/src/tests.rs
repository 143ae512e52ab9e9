//! Unit tests for bp-flow.
//!
//! Networks are hand-built straight lines in a metric plane so every
//! distance, and therefore every expected flow, is known in closed form.

#[cfg(test)]
mod helpers {
    use bp_catalog::{Catalog, CatalogBuilder, CategoryParams, ModeCoefficients};
    use bp_core::{Point, SegmentId};
    use bp_demand::{DestinationSet, DestinationSource, OriginSet, PoiRecord};
    use bp_spatial::{Direction, SegmentNetwork, SegmentNetworkBuilder};

    pub const BIKE: ModeCoefficients = ModeCoefficients([0.5, -2.0, 0.3, -0.1]);
    pub const EBIKE: ModeCoefficients = ModeCoefficients([0.2, -1.0, -0.5, 0.1]);

    /// `shopping` (β −0.0833, T 1.0) and `leisure` (β −0.0351, T 0.5).
    pub fn catalog() -> Catalog {
        let mut b = CatalogBuilder::new();
        b.add_category(CategoryParams::new("shopping", -0.0833, BIKE, EBIKE, 1.0)).unwrap();
        b.add_category(CategoryParams::new("leisure", -0.0351, BIKE, EBIKE, 0.5)).unwrap();
        b.map_class("supermarket", "shopping").unwrap();
        b.map_class("park", "leisure").unwrap();
        b.build()
    }

    /// Segments of `step` metres along the x-axis, ids 1..=n.
    pub fn line(n: usize, step: f64) -> SegmentNetwork {
        let mut b = SegmentNetworkBuilder::new();
        for i in 0..n {
            b.add_polyline(
                SegmentId(i as u64 + 1),
                &[Point::new(i as f64 * step, 0.0), Point::new((i + 1) as f64 * step, 0.0)],
                Direction::Both,
            )
            .unwrap();
        }
        b.build()
    }

    pub fn origins(items: &[(&str, f64, f64)]) -> OriginSet {
        OriginSet::new(
            items
                .iter()
                .map(|&(k, x, size)| (k.to_string(), Point::new(x, 0.0), size, None)),
        )
        .unwrap()
    }

    pub fn pois(catalog: &Catalog, items: &[(f64, &str)]) -> DestinationSet {
        let records = items
            .iter()
            .map(|&(x, class)| PoiRecord { pos: Point::new(x, 0.0), class: class.into(), size: None })
            .collect();
        DestinationSet::build(catalog, [DestinationSource::pois(records)]).unwrap()
    }
}

// ── Route building ────────────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use bp_core::{Point, SegmentId};
    use bp_demand::{DestinationSet, DestinationSource, PoiRecord};
    use bp_spatial::{Direction, SegmentNetworkBuilder};

    use crate::{dedup_segments, FlowEngineBuilder, FlowObserver, Route};

    #[derive(Default)]
    struct Collect(Vec<Route>);

    impl FlowObserver for Collect {
        fn on_routes(&mut self, _o: &bp_demand::Origin, routes: &[Route]) {
            self.0.extend_from_slice(routes);
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let s = |v: &[u64]| v.iter().map(|&i| SegmentId(i)).collect::<Vec<_>>();
        assert_eq!(dedup_segments(s(&[3, 3, 1, 2, 1, 3])), s(&[3, 1, 2]));
        assert_eq!(dedup_segments(s(&[])), s(&[]));
    }

    #[test]
    fn multi_edge_segment_counted_once() {
        let cat = super::helpers::catalog();
        let mut b = SegmentNetworkBuilder::new();
        // One segment digitised with five vertices.
        let pts: Vec<Point> = (0..5).map(|i| Point::new(i as f64 * 250.0, 0.0)).collect();
        b.add_polyline(SegmentId(42), &pts, Direction::Both).unwrap();
        let net = b.build();
        assert_eq!(net.edge_count(), 8);

        let origins = super::helpers::origins(&[("o", 0.0, 10.0)]);
        let dests = super::helpers::pois(&cat, &[(1_000.0, "supermarket")]);
        let engine = FlowEngineBuilder::new(cat, net, origins, dests).build().unwrap();

        let mut obs = Collect::default();
        assert!(engine.run(&mut obs).unwrap().is_complete());
        assert_eq!(obs.0.len(), 1);
        assert_eq!(obs.0[0].segments, vec![SegmentId(42)]);
        assert_eq!(obs.0[0].distance_m, 1_000.0);
    }

    #[test]
    fn unmapped_and_empty_destinations_excluded() {
        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("o", 0.0, 10.0)]);
        let dests = DestinationSet::build(&cat, [DestinationSource::pois(vec![
            PoiRecord { pos: Point::new(500.0, 0.0), class: "nightclub".into(), size: None },
            PoiRecord { pos: Point::new(1_000.0, 0.0), class: "supermarket".into(), size: Some(0.0) },
            PoiRecord { pos: Point::new(2_000.0, 0.0), class: "supermarket".into(), size: None },
        ])])
        .unwrap();
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(2, 1_000.0), origins, dests)
            .build()
            .unwrap();
        let mut obs = Collect::default();
        let flows = engine.run(&mut obs).unwrap().into_flows().unwrap();

        assert_eq!(obs.0.len(), 1);
        assert_eq!(obs.0[0].destination, bp_core::DestinationId(2));
        let shop = engine.catalog().category_id("shopping").unwrap();
        assert!(flows.get(shop, bp_core::Mode::Bike, SegmentId(1)).is_some());
        let leisure = engine.catalog().category_id("leisure").unwrap();
        assert!(flows.iter(leisure, bp_core::Mode::Bike).next().is_none());
    }

    #[test]
    fn destination_at_origin_vertex_is_not_routed() {
        let far_flow = |extra: &[(f64, &str)]| {
            let cat = super::helpers::catalog();
            let shop = cat.category_id("shopping").unwrap();
            let origins = super::helpers::origins(&[("o", 0.0, 10.0)]);
            let mut items = vec![(1_000.0, "supermarket")];
            items.extend_from_slice(extra);
            let dests = super::helpers::pois(&cat, &items);
            let engine = FlowEngineBuilder::new(cat, super::helpers::line(1, 1_000.0), origins, dests)
                .build()
                .unwrap();
            let mut obs = Collect::default();
            let flows = engine.run(&mut obs).unwrap().into_flows().unwrap();
            (obs.0, flows.get(shop, bp_core::Mode::Bike, SegmentId(1)))
        };

        let (routes_alone, alone) = far_flow(&[]);
        let (routes_with, with_root) = far_flow(&[(0.0, "supermarket")]);
        assert_eq!(routes_alone.len(), 1);
        assert_eq!(routes_with.len(), 1);
        assert!(routes_with.iter().all(|r| r.distance_m > 0.0));
        assert!(alone.is_some());
        assert_eq!(alone, with_root);
    }
}

// ── Distance cutoff ───────────────────────────────────────────────────────────

#[cfg(test)]
mod cutoff {
    use bp_core::{FlowConfig, Mode, SegmentId};

    use crate::{FlowEngineBuilder, NoopObserver};

    fn touched_with_cutoff(max: f64) -> bool {
        let cat = super::helpers::catalog();
        let shop = cat.category_id("shopping").unwrap();
        let origins = super::helpers::origins(&[("o", 0.0, 10.0)]);
        let dests = super::helpers::pois(&cat, &[(1_000.0, "supermarket")]);
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(1, 1_000.0), origins, dests)
            .config(FlowConfig { max_distance_m: max, search_radius_m: Some(5_000.0), ..Default::default() })
            .build()
            .unwrap();
        let flows = engine.run(&mut NoopObserver).unwrap().into_flows().unwrap();
        flows.get(shop, Mode::Bike, SegmentId(1)).is_some()
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(touched_with_cutoff(1_000.001));
        assert!(touched_with_cutoff(1_000.0));
        assert!(!touched_with_cutoff(999.999));
    }

    #[test]
    fn non_positive_disables_cutoff() {
        let cat = super::helpers::catalog();
        let shop = cat.category_id("shopping").unwrap();
        let origins = super::helpers::origins(&[("o", 0.0, 10.0)]);
        let dests = super::helpers::pois(&cat, &[(50_000.0, "supermarket")]);
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(50, 1_000.0), origins, dests)
            .config(FlowConfig { max_distance_m: 0.0, ..Default::default() })
            .build()
            .unwrap();
        let flows = engine.run(&mut NoopObserver).unwrap().into_flows().unwrap();
        assert!(flows.get(shop, Mode::Bike, SegmentId(50)).is_some());
    }

    #[test]
    fn euclidean_radius_below_cutoff_rejected() {
        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("o", 0.0, 10.0)]);
        let dests = super::helpers::pois(&cat, &[(1_000.0, "supermarket")]);
        let res = FlowEngineBuilder::new(cat, super::helpers::line(1, 1_000.0), origins, dests)
            .config(FlowConfig { max_distance_m: 2_000.0, search_radius_m: Some(1_000.0), ..Default::default() })
            .build();
        assert!(matches!(res, Err(crate::FlowError::Config(_))));
    }

    #[test]
    fn candidate_cap_limits_destinations() {
        let cat = super::helpers::catalog();
        let shop = cat.category_id("shopping").unwrap();
        let origins = super::helpers::origins(&[("o", 0.0, 10.0)]);
        let dests = super::helpers::pois(&cat, &[(1_000.0, "supermarket"), (2_000.0, "supermarket")]);
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(2, 1_000.0), origins, dests)
            .config(FlowConfig { max_candidates: 1, ..Default::default() })
            .build()
            .unwrap();
        let flows = engine.run(&mut NoopObserver).unwrap().into_flows().unwrap();
        assert!(flows.get(shop, Mode::Bike, SegmentId(1)).is_some());
        assert!(flows.get(shop, Mode::Bike, SegmentId(2)).is_none());
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod aggregate {
    use approx::assert_relative_eq;
    use bp_core::{CategoryId, DestinationId, Mode, ModeSplit, OriginId, SegmentId};

    use crate::{aggregate_routes, decay_sums, FlowAccumulator, Route};

    fn route(origin: u32, dest: u32, cat: u16, decay: f64, segs: &[u64]) -> Route {
        Route {
            origin:      OriginId(origin),
            destination: DestinationId(dest),
            category:    CategoryId(cat),
            distance_m:  1_000.0,
            decay,
            bike_prob:   0.5,
            ebike_prob:  0.25,
            segments:    segs.iter().map(|&s| SegmentId(s)).collect(),
        }
    }

    fn stream() -> Vec<Route> {
        vec![
            route(0, 0, 0, 2.0, &[1, 2]),
            route(0, 1, 0, 6.0, &[1, 3]),
            route(0, 2, 1, 1.0, &[4]),
            route(1, 0, 0, 3.0, &[2]),
        ]
    }

    #[test]
    fn decay_sums_positive_and_shares_sum_to_one() {
        let routes = stream();
        let sums = decay_sums(&routes);
        assert!(sums.values().all(|&s| s > 0.0));
        assert_eq!(sums[&(CategoryId(0), OriginId(0))], 8.0);

        let mut share_total = std::collections::HashMap::new();
        for r in &routes {
            *share_total.entry((r.category, r.origin)).or_insert(0.0) += r.decay / sums[&(r.category, r.origin)];
        }
        for total in share_total.values() {
            assert_relative_eq!(*total, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn flows_follow_formula() {
        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("a", 0.0, 10.0), ("b", 1.0, 4.0)]);
        let split = ModeSplit::default();
        let mut acc = FlowAccumulator::new(cat.len());
        aggregate_routes(&cat, &origins, &split, &stream(), &mut acc);

        // Segment 1 carries both shopping routes of origin a: shares 0.25 + 0.75.
        let s1 = acc.get(CategoryId(0), Mode::Bike, SegmentId(1)).unwrap();
        assert_relative_eq!(s1, 1.0 * 0.8 * 10.0 * 0.5, epsilon = 1e-12);
        // Segment 2: a's first route (share 0.25) + b's only route (share 1).
        let s2 = acc.get(CategoryId(0), Mode::Ebike, SegmentId(2)).unwrap();
        assert_relative_eq!(s2, 0.2 * 0.25 * (10.0 * 0.25 + 4.0), epsilon = 1e-12);
        // Leisure: T = 0.5.
        let s4 = acc.get(CategoryId(1), Mode::Bike, SegmentId(4)).unwrap();
        assert_relative_eq!(s4, 0.5 * 0.8 * 10.0 * 0.5, epsilon = 1e-12);
        assert_eq!(acc.get(CategoryId(1), Mode::Bike, SegmentId(1)), None);
    }

    #[test]
    fn aggregation_is_idempotent_over_same_stream() {
        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("a", 0.0, 10.0), ("b", 1.0, 4.0)]);
        let split = ModeSplit::default();
        let mut first = FlowAccumulator::new(cat.len());
        let mut second = FlowAccumulator::new(cat.len());
        aggregate_routes(&cat, &origins, &split, &stream(), &mut first);
        aggregate_routes(&cat, &origins, &split, &stream(), &mut second);
        for c in cat.ids() {
            for m in Mode::ALL {
                let mut a: Vec<_> = first.iter(c, m).collect();
                let mut b: Vec<_> = second.iter(c, m).collect();
                a.sort_by_key(|(s, _)| *s);
                b.sort_by_key(|(s, _)| *s);
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn merge_order_does_not_matter() {
        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("a", 0.0, 10.0), ("b", 1.0, 4.0)]);
        let split = ModeSplit::default();
        let routes = stream();
        let (ra, rb): (Vec<_>, Vec<_>) = routes.into_iter().partition(|r| r.origin == OriginId(0));

        let part = |rs: &[Route]| {
            let mut acc = FlowAccumulator::new(cat.len());
            aggregate_routes(&cat, &origins, &split, rs, &mut acc);
            acc
        };

        let mut ab = FlowAccumulator::new(cat.len());
        ab.merge(part(&ra));
        ab.merge(part(&rb));
        let mut ba = FlowAccumulator::new(cat.len());
        ba.merge(part(&rb));
        ba.merge(part(&ra));
        let mut whole = FlowAccumulator::new(cat.len());
        aggregate_routes(&cat, &origins, &split, &[ra, rb].concat(), &mut whole);

        assert_eq!(ab.cell_count(), ba.cell_count());
        assert_eq!(ab.cell_count(), whole.cell_count());
        for c in cat.ids() {
            for m in Mode::ALL {
                for (seg, f) in whole.iter(c, m) {
                    assert_relative_eq!(ab.get(c, m, seg).unwrap(), f, epsilon = 1e-12);
                    assert_relative_eq!(ba.get(c, m, seg).unwrap(), f, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn zero_decay_group_carries_no_flow() {
        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("a", 0.0, 10.0)]);
        let mut acc = FlowAccumulator::new(cat.len());
        aggregate_routes(&cat, &origins, &ModeSplit::default(), &[route(0, 0, 0, 0.0, &[1])], &mut acc);
        assert!(acc.is_empty());
    }

    #[test]
    fn accumulator_totals() {
        let mut acc = FlowAccumulator::new(2);
        acc.add(CategoryId(0), Mode::Bike, SegmentId(1), 1.5);
        acc.add(CategoryId(1), Mode::Ebike, SegmentId(1), 0.5);
        acc.add(CategoryId(1), Mode::Ebike, SegmentId(2), 0.0);
        assert_eq!(acc.total(SegmentId(1)), Some(2.0));
        assert_eq!(acc.total(SegmentId(2)), Some(0.0));
        assert_eq!(acc.total(SegmentId(3)), None);
        assert_eq!(acc.cell_count(), 3);
    }
}

// ── End to end ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod end_to_end {
    use approx::assert_relative_eq;
    use bp_core::{FlowConfig, Mode, SegmentId};

    use crate::{FlowEngineBuilder, FlowObserver, FlowOutcome, LogObserver, NoopObserver, RunSummary};

    #[test]
    fn single_segment_shopping_trip() {
        let cat = super::helpers::catalog();
        let shop = cat.category_id("shopping").unwrap();
        let origins = super::helpers::origins(&[("o", 0.0, 10.0)]);
        let dests = super::helpers::pois(&cat, &[(1_000.0, "supermarket")]);
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(1, 1_000.0), origins, dests)
            .build()
            .unwrap();

        let FlowOutcome::Complete { flows, summary } = engine.run(&mut LogObserver::default()).unwrap() else {
            panic!("run was cancelled");
        };
        assert_eq!(summary.routes, 1);
        assert_eq!(summary.origins, 1);

        let scale = FlowConfig::default().mode_scale_m();
        let bike_p = super::helpers::BIKE.probability(1_000.0, scale);
        let ebike_p = super::helpers::EBIKE.probability(1_000.0, scale);

        assert_relative_eq!(
            flows.get(shop, Mode::Bike, SegmentId(1)).unwrap(),
            1.0 * 0.8 * 10.0 * bike_p,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            flows.get(shop, Mode::Ebike, SegmentId(1)).unwrap(),
            1.0 * 0.2 * 10.0 * ebike_p,
            epsilon = 1e-12
        );
        // Share is 1 whatever the decay; the decay itself is size × exp(β).
        assert_relative_eq!(engine.catalog().decay_weight(shop, 1.0, 1_000.0), (-0.0833f64).exp());
    }

    #[test]
    fn runs_are_repeatable() {
        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("a", 0.0, 10.0), ("b", 3_000.0, 7.0)]);
        let dests = super::helpers::pois(&cat, &[(1_000.0, "supermarket"), (2_500.0, "park"), (4_000.0, "supermarket")]);
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(4, 1_000.0), origins, dests)
            .build()
            .unwrap();
        let a = engine.run(&mut NoopObserver).unwrap().into_flows().unwrap();
        let b = engine.run(&mut NoopObserver).unwrap().into_flows().unwrap();
        for seg in 1..=4 {
            assert_eq!(a.total(SegmentId(seg)), b.total(SegmentId(seg)));
        }
    }

    #[test]
    fn socio_weight_scales_flow() {
        let cat = super::helpers::catalog();
        let shop = cat.category_id("shopping").unwrap();
        let dests = super::helpers::pois(&cat, &[(1_000.0, "supermarket")]);
        let origins = bp_demand::OriginSet::new([
            ("a".to_string(), bp_core::Point::new(0.0, 0.0), 10.0, Some(3.0)),
            ("b".to_string(), bp_core::Point::new(2_000.0, 0.0), 10.0, Some(1.0)),
        ])
        .unwrap();
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(2, 1_000.0), origins, dests)
            .build()
            .unwrap();
        let flows = engine.run(&mut NoopObserver).unwrap().into_flows().unwrap();
        // a weighs 1.5, b weighs 0.5; equal distance to the shop.
        let s1 = flows.get(shop, Mode::Bike, SegmentId(1)).unwrap();
        let s2 = flows.get(shop, Mode::Bike, SegmentId(2)).unwrap();
        assert_relative_eq!(s1 / s2, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn progress_callbacks_in_order() {
        #[derive(Default)]
        struct Trace {
            ends:    Vec<(String, usize, usize)>,
            started: Option<usize>,
            summary: Option<RunSummary>,
        }
        impl FlowObserver for Trace {
            fn on_run_start(&mut self, n: usize) {
                self.started = Some(n);
            }
            fn on_origin_end(&mut self, o: &bp_demand::Origin, done: usize, total: usize) {
                self.ends.push((o.key.clone(), done, total));
            }
            fn on_run_end(&mut self, s: &RunSummary) {
                self.summary = Some(s.clone());
            }
        }

        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("a", 0.0, 1.0), ("b", 1_000.0, 1.0), ("c", 2_000.0, 1.0)]);
        let dests = super::helpers::pois(&cat, &[(1_000.0, "park")]);
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(2, 1_000.0), origins, dests)
            .build()
            .unwrap();
        let mut t = Trace::default();
        engine.run(&mut t).unwrap();
        assert_eq!(t.started, Some(3));
        let keys: Vec<_> = t.ends.iter().map(|(k, d, n)| (k.as_str(), *d, *n)).collect();
        assert_eq!(keys, vec![("a", 1, 3), ("b", 2, 3), ("c", 3, 3)]);
        // b sits on the park's vertex and gets no route.
        assert_eq!(t.summary.unwrap().routes, 2);
    }

    #[test]
    fn empty_network_rejected() {
        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("a", 0.0, 1.0)]);
        let dests = super::helpers::pois(&cat, &[]);
        let res = FlowEngineBuilder::new(cat, bp_spatial::SegmentNetwork::empty(), origins, dests).build();
        assert!(matches!(res, Err(crate::FlowError::Spatial(bp_spatial::SpatialError::EmptyNetwork))));
    }
}

// ── Cancellation ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod cancel {
    use crate::{CancelToken, FlowEngineBuilder, FlowObserver, FlowOutcome, NoopObserver};

    #[test]
    fn cancelled_before_start() {
        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("a", 0.0, 1.0)]);
        let dests = super::helpers::pois(&cat, &[(1_000.0, "park")]);
        let token = CancelToken::new();
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(1, 1_000.0), origins, dests)
            .cancel_token(token.clone())
            .build()
            .unwrap();
        token.cancel();
        let outcome = engine.run(&mut NoopObserver).unwrap();
        assert!(matches!(outcome, FlowOutcome::Cancelled { origins_done: 0 }));
        assert!(outcome.into_flows().is_none());
    }

    #[test]
    fn cancel_mid_run_discards_partial_output() {
        struct StopAfterFirst(CancelToken);
        impl FlowObserver for StopAfterFirst {
            fn on_origin_end(&mut self, _o: &bp_demand::Origin, _done: usize, _total: usize) {
                self.0.cancel();
            }
        }

        let cat = super::helpers::catalog();
        let origins = super::helpers::origins(&[("a", 0.0, 1.0), ("b", 1_000.0, 1.0)]);
        let dests = super::helpers::pois(&cat, &[(500.0, "park")]);
        let engine = FlowEngineBuilder::new(cat, super::helpers::line(1, 1_000.0), origins, dests)
            .build()
            .unwrap();
        let mut obs = StopAfterFirst(engine.cancel_token());
        let outcome = engine.run(&mut obs).unwrap();
        assert!(!outcome.is_complete());
    }
}
