//! Session-facing routing engine
//!
//! Ties the components together: on each route request the refresh policy
//! decides whether the congestion overlay is stale; a stale overlay is
//! rebuilt from the feed and persisted, a fresh one is loaded from its
//! snapshot; the request's coordinates are snapped to graph nodes and the
//! route is computed over adjusted travel times.

use std::sync::PoisonError;

use chrono::{DateTime, Duration, Utc};
use geo::Point;
use itertools::Itertools;
use log::{info, warn};
use petgraph::graph::NodeIndex;

use crate::algo::propagate_congestion;
use crate::loading::feed::CongestionFeed;
use crate::loading::{TopologyProvider, build_road_graph};
use crate::model::{CongestionBand, RoadGraph};
use crate::routing::{Weight, shortest_path};
use crate::snapshot::SnapshotStore;
use crate::{Error, REFRESH_INTERVAL_SECS};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Place name handed to the topology-acquisition collaborator.
    pub place: String,
    /// Snapshot name of the base topology.
    pub base_snapshot: String,
    /// Snapshot name of the congestion-augmented topology.
    pub live_snapshot: String,
    /// How long a congestion overlay stays fresh.
    pub refresh_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            place: "Barcelona, Catalonia".to_string(),
            base_snapshot: "barcelona.graph".to_string(),
            live_snapshot: "barcelona_i.graph".to_string(),
            refresh_interval: Duration::seconds(REFRESH_INTERVAL_SECS),
        }
    }
}

/// Per-session refresh state, owned by the caller and passed into every
/// route request. A new session has no refresh timestamp and therefore
/// forces an immediate overlay rebuild.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshSession {
    last_refresh: Option<DateTime<Utc>>,
}

impl RefreshSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    /// Whether the overlay must be rebuilt before serving a route.
    pub fn is_stale(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        match self.last_refresh {
            None => true,
            Some(at) => now - at > interval,
        }
    }

    fn mark_refreshed(&mut self, now: DateTime<Utc>) {
        self.last_refresh = Some(now);
    }
}

/// One edge of a computed route, with the congestion band the rendering
/// collaborator colors it by.
#[derive(Debug, Clone, Copy)]
pub struct RouteLeg {
    pub band: CongestionBand,
    pub itime: f64,
}

/// A computed route: the node sequence, its geometry, and per-edge
/// congestion classification.
#[derive(Debug, Clone)]
pub struct Route {
    pub nodes: Vec<NodeIndex>,
    pub points: Vec<Point<f64>>,
    pub legs: Vec<RouteLeg>,
    pub total_itime: f64,
}

/// Result of a route request. `Unreachable` is a normal outcome, not a
/// fault: the resolved endpoints lie in disconnected components.
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    Found(Route),
    Unreachable,
}

pub struct RoutingEngine {
    config: EngineConfig,
    store: SnapshotStore,
    topology: Box<dyn TopologyProvider>,
    feed: Box<dyn CongestionFeed>,
}

impl RoutingEngine {
    pub fn new(
        config: EngineConfig,
        store: SnapshotStore,
        topology: Box<dyn TopologyProvider>,
        feed: Box<dyn CongestionFeed>,
    ) -> Self {
        Self {
            config,
            store,
            topology,
            feed,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Base topology, downloaded and persisted on first use.
    ///
    /// # Errors
    ///
    /// Propagates topology download and snapshot store failures.
    pub fn ensure_base(&self) -> Result<RoadGraph, Error> {
        self.store.ensure(&self.config.base_snapshot, || {
            info!("Downloading base topology for '{}'", self.config.place);
            build_road_graph(self.topology.download(&self.config.place)?)
        })
    }

    /// Fastest adjusted-time route between two coordinates, using the
    /// current wall clock for the staleness check.
    ///
    /// # Errors
    ///
    /// See [`RoutingEngine::route_at`].
    pub fn route(
        &self,
        origin: Point<f64>,
        destination: Point<f64>,
        session: &mut RefreshSession,
    ) -> Result<RouteOutcome, Error> {
        self.route_at(origin, destination, session, Utc::now())
    }

    /// Fastest adjusted-time route between two coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvableCoordinate`] when an endpoint cannot be
    /// snapped to the graph, [`Error::NoRouteData`] when the feed is down
    /// and no previous overlay exists, and store errors otherwise.
    /// An unreachable destination is reported as
    /// [`RouteOutcome::Unreachable`], not as an error.
    pub fn route_at(
        &self,
        origin: Point<f64>,
        destination: Point<f64>,
        session: &mut RefreshSession,
        now: DateTime<Utc>,
    ) -> Result<RouteOutcome, Error> {
        let graph = self.current_graph(session, now)?;

        let origin_node = graph.nearest_node(origin)?;
        let destination_node = graph.nearest_node(destination)?;

        match shortest_path(&graph, origin_node, destination_node, Weight::Itime) {
            Some(nodes) => Ok(RouteOutcome::Found(assemble_route(&graph, nodes)?)),
            None => Ok(RouteOutcome::Unreachable),
        }
    }

    /// The congestion-augmented graph to route on: rebuilt when the session
    /// is stale (or the overlay snapshot is missing), loaded from its
    /// snapshot otherwise.
    fn current_graph(
        &self,
        session: &mut RefreshSession,
        now: DateTime<Utc>,
    ) -> Result<RoadGraph, Error> {
        let live = &self.config.live_snapshot;

        if !session.is_stale(now, self.config.refresh_interval) && self.store.exists(live) {
            return self.store.load(live);
        }

        match self.rebuild_live_graph() {
            Ok(graph) => {
                session.mark_refreshed(now);
                Ok(graph)
            }
            Err(Error::FeedUnavailable(reason)) => {
                if self.store.exists(live) {
                    warn!("Congestion feed unavailable ({reason}), serving previous overlay");
                    self.store.load(live)
                } else {
                    Err(Error::NoRouteData)
                }
            }
            Err(other) => Err(other),
        }
    }

    fn rebuild_live_graph(&self) -> Result<RoadGraph, Error> {
        let segments = self.feed.fetch_segments()?;
        let observations = self.feed.fetch_congestions()?;

        let mut graph = self.ensure_base()?;
        propagate_congestion(&mut graph, &segments, &observations);

        let lock = self.store.rebuild_lock(&self.config.live_snapshot);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.save(&graph, &self.config.live_snapshot)?;

        Ok(graph)
    }
}

fn assemble_route(graph: &RoadGraph, nodes: Vec<NodeIndex>) -> Result<Route, Error> {
    let mut points = Vec::with_capacity(nodes.len());
    for &node in &nodes {
        points.push(
            graph
                .node_point(node)
                .ok_or_else(|| Error::InvalidData("route node missing from graph".to_string()))?,
        );
    }

    let mut legs = Vec::with_capacity(nodes.len().saturating_sub(1));
    let mut total_itime = 0.0;
    for (from, to) in nodes.iter().copied().tuple_windows() {
        let edge = graph
            .edge_between(from, to)
            .ok_or_else(|| Error::InvalidData("route edge missing from graph".to_string()))?;
        total_itime += edge.itime;
        legs.push(RouteLeg {
            band: edge.congestion.band(),
            itime: edge.itime,
        });
    }

    Ok(Route {
        nodes,
        points,
        legs,
        total_itime,
    })
}
