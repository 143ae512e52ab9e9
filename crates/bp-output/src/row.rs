//! Plain data row types written by output backends.

/// Flow values for one network segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFlowRow {
    pub segment_id: u64,
    /// One value per entry of [`FlowTable::value_columns`]; `None` if no
    /// route of that category touched the segment.
    pub values:     Vec<Option<f64>>,
    /// Present when the table carries infrastructure columns.
    pub flow_total: Option<f64>,
    pub lts:        Option<u8>,
    /// Recommended facility class, 1 to 5.
    pub rec:        Option<u8>,
    pub ratio:      Option<f64>,
    /// `flow_total × ratio`.
    pub r:          Option<f64>,
}

/// Every segment's flows, in network input order, with the column layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTable {
    /// `{category}_bike_value`, `{category}_ebike_value` per category, in
    /// catalog order.
    pub value_columns:      Vec<String>,
    /// Whether `flow_total`, `lts`, `rec`, `ratio` and `R` columns are emitted.
    pub has_infrastructure: bool,
    pub rows:               Vec<SegmentFlowRow>,
}

impl FlowTable {
    /// Full header, in write order.
    pub fn header(&self) -> Vec<String> {
        let mut h = Vec::with_capacity(self.value_columns.len() + 6);
        h.push("segment_id".to_string());
        h.extend(self.value_columns.iter().cloned());
        if self.has_infrastructure {
            h.extend(["flow_total", "lts", "rec", "ratio", "R"].map(String::from));
        }
        h
    }
}

/// One exported origin → destination route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub origin:        String,
    /// Run-local destination index: position in the merged destination set,
    /// in source then row order.  Not stable across runs with different
    /// inputs.
    pub destination:   u32,
    /// `"{origin}-{destination}"`, with the same run-local destination index.
    pub od_key:        String,
    pub category:      String,
    pub distance_m:    f64,
    pub decay:         f64,
    pub bike_prob:     f64,
    pub ebike_prob:    f64,
    pub segment_count: u32,
}

pub(crate) const ROUTE_HEADER: [&str; 9] = [
    "origin", "destination", "od_key", "category", "distance_m", "decay",
    "bike_prob", "ebike_prob", "segment_count",
];
