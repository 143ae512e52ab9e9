//! Two-pass flow allocation.
//!
//! ```text
//! pass 1:  decay_sum[c][o] += route.decay
//! pass 2:  share     = route.decay / decay_sum[c][o]
//!          flow[m]   = T[c] × split[m] × effective_size[o] × p[m] × share
//!          for s in route.segments: acc[c][m][s] += flow[m]
//! ```
//!
//! The shares of all routes of one `(category, origin)` sum to 1, so each
//! origin distributes exactly `T × effective_size × split[m] × E[p[m]]` trips
//! per category across its reachable destinations.

use std::collections::HashMap;

use bp_catalog::Catalog;
use bp_core::{CategoryId, Mode, ModeSplit, OriginId};
use bp_demand::OriginSet;

use crate::{FlowAccumulator, Route};

/// Pass 1: total decay weight per `(category, origin)`.
pub fn decay_sums(routes: &[Route]) -> HashMap<(CategoryId, OriginId), f64> {
    let mut sums = HashMap::new();
    for r in routes {
        *sums.entry((r.category, r.origin)).or_insert(0.0) += r.decay;
    }
    sums
}

/// Run both passes over `routes` and add the result to `acc`.
///
/// `routes` may span several origins; normalization is always per
/// `(category, origin)`.  Groups whose decay sum underflowed to zero carry
/// no flow.
pub fn aggregate_routes(
    catalog: &Catalog,
    origins: &OriginSet,
    split:   &ModeSplit,
    routes:  &[Route],
    acc:     &mut FlowAccumulator,
) {
    let sums = decay_sums(routes);

    for r in routes {
        let sum = sums.get(&(r.category, r.origin)).copied().unwrap_or(0.0);
        if sum.is_nan() || sum <= 0.0 {
            log::trace!("{} / {}: zero decay sum, route carries no flow", r.category, r.origin);
            continue;
        }
        let share = r.decay / sum;
        let base = catalog.trip_rate(r.category) * origins.get(r.origin).effective_size() * share;

        for mode in Mode::ALL {
            let flow = base * split.share(mode) * r.probability(mode);
            for &segment in &r.segments {
                acc.add(r.category, mode, segment, flow);
            }
        }
    }
}
