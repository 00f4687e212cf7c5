// Navigation Service - bake orchestration and query front door
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::adapters::inbound::geojson_scene::Scene;
use crate::adapters::outbound::legacy_text::encode_legacy;
use crate::common::{ApplicationError, ApplicationResult, NavError, Point3};
use crate::config::Config;
use crate::domains::navigation::{
    LineOfSight, NavGraphBuilder, NavigationContext, NavigationEvent, PathQueryService,
    RoutingTableBaker, RoutingTableStore, SceneSource, SpatialSampler,
};
use crate::domains::DynLogger;

/// Outcome of a successful bake, as printed by the bake command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BakeReport {
    pub bake_id: Uuid,
    pub scene: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub lookup_count: usize,
    pub searches: usize,
    pub pruned_waypoints: usize,
    pub elapsed_ms: u128,
    pub baked_at: DateTime<Utc>,
}

struct Installed {
    context: Arc<NavigationContext>,
    scene: Arc<Scene>,
}

pub struct NavigationService {
    config: Config,
    scenes: Arc<dyn SceneSource>,
    store: Arc<dyn RoutingTableStore>,
    logger: DynLogger,
    active: RwLock<Option<Installed>>,
    cancel: Arc<AtomicBool>,
    events: Option<mpsc::Sender<NavigationEvent>>,
}

impl NavigationService {
    pub fn new(
        config: Config,
        scenes: Arc<dyn SceneSource>,
        store: Arc<dyn RoutingTableStore>,
        logger: DynLogger,
    ) -> Self {
        Self {
            config,
            scenes,
            store,
            logger,
            active: RwLock::new(None),
            cancel: Arc::new(AtomicBool::new(false)),
            events: None,
        }
    }

    /// Publishes navigation events to `sender`. Full or closed channels drop the event.
    pub fn with_events(mut self, sender: mpsc::Sender<NavigationEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Asks the running bake, or the next one if none is running, to stop.
    /// The request is cleared when that bake ends.
    pub fn cancel_bake(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn load_scene(&self, name: &str, source: &str) -> ApplicationResult<Scene> {
        let geojson = self.scenes.load_geojson(source)?;
        Ok(Scene::from_geojson(name, &geojson)?)
    }

    /// Bakes the scene named in the configuration.
    pub fn bake_configured(&self) -> ApplicationResult<BakeReport> {
        let scene = &self.config.scene;
        self.bake_scene(&scene.name, &scene.source_file())
    }

    pub fn bake_scene(&self, name: &str, source: &str) -> ApplicationResult<BakeReport> {
        let scene = self.load_scene(name, source)?;
        self.bake(scene)
    }

    /// Samples, builds, bakes, persists and installs `scene`. On any failure the
    /// previously installed context stays active.
    pub fn bake(&self, scene: Scene) -> ApplicationResult<BakeReport> {
        let name = scene.name.clone();
        self.logger.info(&format!("Baking navigation for scene {}", name));

        let result = self.bake_context(&scene);
        self.cancel.store(false, Ordering::Relaxed);
        let (context, report) = match result {
            Ok(baked) => baked,
            Err(e) => {
                self.emit(NavigationEvent::BakeRejected {
                    scene: name,
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e);
            }
        };

        self.store.save_asset(&name, &context.to_asset())?;
        if self.config.storage.write_legacy_text {
            self.store
                .save_legacy_text(&name, &encode_legacy(context.graph(), context.table()))?;
        }

        self.install(context, scene)?;
        self.emit(NavigationEvent::BakeCompleted {
            scene: name,
            bake_id: report.bake_id,
            node_count: report.node_count,
            edge_count: report.edge_count,
            lookup_count: report.lookup_count,
            elapsed_ms: report.elapsed_ms,
            timestamp: report.baked_at,
        });
        Ok(report)
    }

    fn bake_context(&self, scene: &Scene) -> ApplicationResult<(NavigationContext, BakeReport)> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(NavError::BakeCancelled.into());
        }
        let grid = SpatialSampler::new(scene, self.config.sampler.clone()).sample()?;
        let builder = NavGraphBuilder::new(scene, scene, self.config.graph.clone());
        let (graph, build_stats) = builder.build_with_stats(&grid, &scene.waypoints);
        if graph.is_empty() {
            self.logger
                .warn(&format!("Scene {} produced no waypoints; installing an empty context", scene.name));
        }

        let baked = RoutingTableBaker::new(self.config.bake.clone(), self.logger.clone())
            .with_cancel_flag(self.cancel.clone())
            .bake(&graph)?;

        let report = BakeReport {
            bake_id: Uuid::new_v4(),
            scene: scene.name.clone(),
            node_count: baked.stats.node_count,
            edge_count: baked.stats.edge_count,
            lookup_count: baked.stats.lookup_count,
            searches: baked.stats.searches,
            pruned_waypoints: build_stats.pruned_waypoints,
            elapsed_ms: baked.stats.elapsed.as_millis(),
            baked_at: Utc::now(),
        };
        let context = NavigationContext::new(scene.name.clone(), graph, baked.table)?;
        Ok((context, report))
    }

    /// Loads the persisted asset and scene named in the configuration.
    pub fn load_configured(&self) -> ApplicationResult<Arc<NavigationContext>> {
        let scene = &self.config.scene;
        self.load_context(&scene.name, &scene.source_file())
    }

    /// Reinstalls a previously baked context without baking.
    pub fn load_context(&self, name: &str, source: &str) -> ApplicationResult<Arc<NavigationContext>> {
        let scene = self.load_scene(name, source)?;
        let asset = self.store.load_asset(name)?;
        let context = NavigationContext::from_asset(name, asset)?;
        self.install(context, scene)
    }

    /// Replaces the active context wholesale.
    pub fn install(&self, context: NavigationContext, scene: Scene) -> ApplicationResult<Arc<NavigationContext>> {
        let context = Arc::new(context);
        let installed = Installed {
            context: context.clone(),
            scene: Arc::new(scene),
        };
        {
            let mut active = self
                .active
                .write()
                .map_err(|_| NavError::Infrastructure("navigation context lock poisoned".to_string()))?;
            *active = Some(installed);
        }
        self.logger.info(&format!(
            "Installed navigation context {} ({} waypoints, table: {})",
            context.scene(),
            context.graph().len(),
            context.has_table()
        ));
        self.emit(NavigationEvent::ContextInstalled {
            scene: context.scene().to_string(),
            node_count: context.graph().len(),
            has_table: context.has_table(),
            timestamp: Utc::now(),
        });
        Ok(context)
    }

    pub fn current(&self) -> Option<Arc<NavigationContext>> {
        self.active
            .read()
            .ok()
            .and_then(|a| a.as_ref().map(|i| i.context.clone()))
    }

    pub fn require_current(&self) -> ApplicationResult<Arc<NavigationContext>> {
        self.current().ok_or_else(|| ApplicationError::NoContext {
            scene: self.config.scene.name.clone(),
        })
    }

    /// Path from `start` to `goal` through the active context. Without one the
    /// agent is sent straight to the goal.
    pub fn query(&self, start: Point3, goal: Point3) -> Vec<Point3> {
        let active = match self.active.read() {
            Ok(guard) => guard
                .as_ref()
                .map(|i| (i.context.clone(), i.scene.clone())),
            Err(_) => None,
        };
        let Some((context, scene)) = active else {
            return vec![goal];
        };
        let los = move |a: Point3, b: Point3, clearance: f32| scene.line_of_sight(a, b, clearance);
        PathQueryService::new(context, los, self.config.query.clone()).query(start, goal)
    }

    fn emit(&self, event: NavigationEvent) {
        if let Some(sender) = &self.events {
            if let Err(e) = sender.try_send(event) {
                self.logger.warn(&format!("Dropped navigation event: {}", e));
            }
        }
    }
}
