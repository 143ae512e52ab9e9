//! Join accumulated flows back onto the network's segments.

use std::collections::HashMap;

use bp_catalog::Catalog;
use bp_core::{Mode, SegmentId};
use bp_flow::FlowAccumulator;
use bp_spatial::{Infrastructure, SegmentNetwork};

use crate::{FlowTable, SegmentFlowRow};

pub struct ResultMaterializer<'a> {
    catalog:        &'a Catalog,
    network:        &'a SegmentNetwork,
    infrastructure: Option<&'a HashMap<SegmentId, Infrastructure>>,
}

impl<'a> ResultMaterializer<'a> {
    pub fn new(catalog: &'a Catalog, network: &'a SegmentNetwork) -> Self {
        Self { catalog, network, infrastructure: None }
    }

    /// Emit `flow_total`, `lts`, `rec`, `ratio` and `R`.  An empty map is treated
    /// as no classification.
    pub fn with_infrastructure(mut self, infrastructure: &'a HashMap<SegmentId, Infrastructure>) -> Self {
        self.infrastructure = (!infrastructure.is_empty()).then_some(infrastructure);
        self
    }

    pub fn value_columns(&self) -> Vec<String> {
        self.catalog
            .iter()
            .flat_map(|(_, p)| Mode::ALL.map(|m| format!("{}_{}_value", p.name, m)))
            .collect()
    }

    /// One row per segment in network input order.
    ///
    /// `flow_total` sums every touched value and is 0 for an untouched
    /// segment; `lts`, `rec`, `ratio` and `R` stay empty for segments without a
    /// classification.
    pub fn materialize(&self, flows: &FlowAccumulator) -> FlowTable {
        let categories: Vec<_> = self.catalog.ids().collect();

        let rows = self
            .network
            .segments()
            .iter()
            .map(|&segment| {
                let values: Vec<Option<f64>> = categories
                    .iter()
                    .flat_map(|&c| Mode::ALL.map(|m| flows.get(c, m, segment)))
                    .collect();

                let mut row = SegmentFlowRow {
                    segment_id: segment.0,
                    values,
                    flow_total: None,
                    lts:        None,
                    rec:        None,
                    ratio:      None,
                    r:          None,
                };
                if let Some(infra) = self.infrastructure {
                    let total = row.values.iter().flatten().sum::<f64>();
                    row.flow_total = Some(total);
                    if let Some(i) = infra.get(&segment) {
                        row.lts   = Some(i.lts.level());
                        row.rec   = i.rec;
                        row.ratio = Some(i.ratio);
                        row.r     = Some(total * i.ratio);
                    }
                }
                row
            })
            .collect();

        FlowTable {
            value_columns:      self.value_columns(),
            has_infrastructure: self.infrastructure.is_some(),
            rows,
        }
    }
}
