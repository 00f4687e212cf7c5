//! Offline all-pairs routing table bake.
//!
//! One A* search per unordered waypoint pair fills next hops in both
//! directions for every waypoint on the resulting path. Pairs already covered
//! by earlier paths are skipped. Rows are processed on a rayon pool; the table
//! under construction sits behind a single mutex.

use crate::common::{NavError, NavResult};
use crate::domains::logger::DynLogger;
use super::astar::AStarPlanner;
use super::graph::NavGraph;
use super::routing_table::RoutingTable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Worker threads; 0 uses the global rayon pool.
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub lookup_count: usize,
    pub searches: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct BakedTable {
    pub table: RoutingTable,
    pub stats: BakeStats,
}

pub struct RoutingTableBaker {
    config: BakeConfig,
    logger: DynLogger,
    cancel: Option<Arc<AtomicBool>>,
}

impl RoutingTableBaker {
    pub fn new(config: BakeConfig, logger: DynLogger) -> Self {
        Self {
            config,
            logger,
            cancel: None,
        }
    }

    /// Setting the flag makes a running bake stop with `BakeCancelled`.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn bake(&self, graph: &NavGraph) -> NavResult<BakedTable> {
        let started = Instant::now();
        let n = graph.len();
        let shared = Mutex::new(RoutingTable::unfilled(n));
        let searches = AtomicUsize::new(0);

        let run = || {
            (0..n)
                .into_par_iter()
                .try_for_each(|i| self.bake_row(graph, i as u32, &shared, &searches))
        };
        if self.config.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .map_err(|e| NavError::Infrastructure(format!("bake thread pool: {}", e)))?;
            pool.install(run)?;
        } else {
            run()?;
        }

        let table = shared
            .into_inner()
            .map_err(|_| NavError::Infrastructure("routing table lock poisoned".to_string()))?;

        let expected = n * n.saturating_sub(1);
        let created = table.filled_count();
        if created != expected {
            self.logger.error(&format!(
                "BAKE REJECTED: expected {} lookups but created {} ({} missing, {} connected components across {} waypoints); no table published",
                expected,
                created,
                expected - created,
                graph.connected_components(),
                n
            ));
            return Err(NavError::BakeIncomplete { expected, created });
        }
        if let Err(e) = table.validate(graph) {
            self.logger.error(&format!("BAKE REJECTED: {}", e));
            return Err(e);
        }

        let stats = BakeStats {
            node_count: n,
            edge_count: graph.edge_count(),
            lookup_count: created,
            searches: searches.into_inner(),
            elapsed: started.elapsed(),
        };
        self.logger.info(&format!(
            "bake complete: {} nodes, {} edges, {} lookups, {} searches in {:.3}s",
            stats.node_count,
            stats.edge_count,
            stats.lookup_count,
            stats.searches,
            stats.elapsed.as_secs_f64()
        ));
        Ok(BakedTable { table, stats })
    }

    fn bake_row(
        &self,
        graph: &NavGraph,
        i: u32,
        shared: &Mutex<RoutingTable>,
        searches: &AtomicUsize,
    ) -> NavResult<()> {
        let planner = AStarPlanner::new(graph);
        for j in (i + 1)..graph.len() as u32 {
            if self.cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(NavError::BakeCancelled);
            }
            {
                let table = lock(shared)?;
                if table.next_hop(i, j).is_some() && table.next_hop(j, i).is_some() {
                    continue;
                }
            }

            let result = planner.search(i, j);
            searches.fetch_add(1, Ordering::Relaxed);
            if !result.reached {
                debug!("no route between {} and {}", i, j);
                continue;
            }

            let path = &result.path;
            let mut table = lock(shared)?;
            for step in path.windows(2) {
                table.fill(step[0], j, step[1]);
                table.fill(step[1], i, step[0]);
            }
        }
        Ok(())
    }
}

fn lock(shared: &Mutex<RoutingTable>) -> NavResult<std::sync::MutexGuard<'_, RoutingTable>> {
    shared
        .lock()
        .map_err(|_| NavError::Infrastructure("routing table lock poisoned".to_string()))
}
