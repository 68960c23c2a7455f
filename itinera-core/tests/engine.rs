//! End-to-end engine tests over in-memory topology and feed fixtures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use geo::Point;
use hashbrown::HashMap;

use itinera_core::prelude::*;

// ============================================================================
// Fixtures
// ============================================================================

/// Three nodes in a line, A -> B -> C, each edge 100 m at 10 km/h
/// (free-flow time 10).
struct FixtureTopology {
    downloads: Arc<AtomicUsize>,
}

impl TopologyProvider for FixtureTopology {
    fn download(&self, _place: &str) -> Result<RawTopology, Error> {
        self.downloads.fetch_add(1, Ordering::SeqCst);

        let node = |id: i64, lon: f64| RawNode {
            id,
            lon,
            lat: 41.40,
        };
        let edge = |from: i64, to: i64| RawEdge {
            from,
            to,
            length: 100.0,
            maxspeed: vec![10.0],
        };

        Ok(RawTopology {
            nodes: vec![node(1, 2.10), node(2, 2.11), node(3, 2.12)],
            edges: vec![edge(1, 2), edge(2, 3)],
        })
    }
}

/// One segment covering both edges, reporting a fixed congestion state.
struct FixtureFeed {
    state: CongestionLevel,
    fetches: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl CongestionFeed for FixtureFeed {
    fn fetch_segments(&self) -> Result<HashMap<SegmentId, Highway>, Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::FeedUnavailable("fixture outage".to_string()));
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);

        Ok(HashMap::from_iter([(
            1,
            Highway {
                description: "Fixture artery".to_string(),
                coordinates: vec![2.10, 41.40, 2.11, 41.40, 2.12, 41.40],
            },
        )]))
    }

    fn fetch_congestions(&self) -> Result<HashMap<SegmentId, Congestion>, Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::FeedUnavailable("fixture outage".to_string()));
        }

        Ok(HashMap::from_iter([(
            1,
            Congestion {
                state: self.state,
                next_state: self.state,
            },
        )]))
    }
}

struct Harness {
    engine: RoutingEngine,
    fetches: Arc<AtomicUsize>,
    downloads: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    _dir: tempfile::TempDir,
}

fn harness(state: CongestionLevel) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let fetches = Arc::new(AtomicUsize::new(0));
    let downloads = Arc::new(AtomicUsize::new(0));
    let failing = Arc::new(AtomicBool::new(false));

    let engine = RoutingEngine::new(
        EngineConfig::default(),
        SnapshotStore::open(dir.path()).unwrap(),
        Box::new(FixtureTopology {
            downloads: Arc::clone(&downloads),
        }),
        Box::new(FixtureFeed {
            state,
            fetches: Arc::clone(&fetches),
            failing: Arc::clone(&failing),
        }),
    );

    Harness {
        engine,
        fetches,
        downloads,
        failing,
        _dir: dir,
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn near_a() -> Point<f64> {
    Point::new(2.101, 41.401)
}

fn near_c() -> Point<f64> {
    Point::new(2.119, 41.399)
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn congested_route_end_to_end() {
    let h = harness(CongestionLevel::VeryDense);
    let mut session = RefreshSession::new();

    let outcome = h.engine.route_at(near_a(), near_c(), &mut session, at(0)).unwrap();
    let RouteOutcome::Found(route) = outcome else {
        panic!("expected a route");
    };

    assert_eq!(route.nodes.len(), 3);
    assert_eq!(route.points.len(), 3);
    assert_eq!(route.legs.len(), 2);
    // itime = 10 * sqrt(4) per edge
    for leg in &route.legs {
        assert!((leg.itime - 20.0).abs() < 1e-9);
        assert_eq!(leg.band, CongestionBand::Medium);
    }
    assert!((route.total_itime - 40.0).abs() < 1e-9);
}

#[test]
fn cut_segment_makes_destination_unreachable() {
    let h = harness(CongestionLevel::Cut);
    let mut session = RefreshSession::new();

    let outcome = h.engine.route_at(near_a(), near_c(), &mut session, at(0)).unwrap();
    assert!(matches!(outcome, RouteOutcome::Unreachable));
}

// ============================================================================
// Refresh policy
// ============================================================================

#[test]
fn overlay_is_reused_within_the_interval() {
    let h = harness(CongestionLevel::Fluid);
    let mut session = RefreshSession::new();

    h.engine.route_at(near_a(), near_c(), &mut session, at(0)).unwrap();
    h.engine.route_at(near_a(), near_c(), &mut session, at(60)).unwrap();
    h.engine.route_at(near_a(), near_c(), &mut session, at(299)).unwrap();

    assert_eq!(h.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(session.last_refresh(), Some(at(0)));
}

#[test]
fn overlay_is_rebuilt_once_stale() {
    let h = harness(CongestionLevel::Fluid);
    let mut session = RefreshSession::new();

    h.engine.route_at(near_a(), near_c(), &mut session, at(0)).unwrap();
    h.engine.route_at(near_a(), near_c(), &mut session, at(301)).unwrap();

    assert_eq!(h.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(session.last_refresh(), Some(at(301)));
}

#[test]
fn base_topology_is_downloaded_once() {
    let h = harness(CongestionLevel::Fluid);
    let mut session = RefreshSession::new();

    h.engine.route_at(near_a(), near_c(), &mut session, at(0)).unwrap();
    h.engine.route_at(near_a(), near_c(), &mut session, at(301)).unwrap();
    h.engine.route_at(near_a(), near_c(), &mut session, at(602)).unwrap();

    assert_eq!(h.downloads.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Feed failure
// ============================================================================

#[test]
fn feed_outage_serves_the_previous_overlay() {
    let h = harness(CongestionLevel::Fluid);
    let mut session = RefreshSession::new();

    h.engine.route_at(near_a(), near_c(), &mut session, at(0)).unwrap();
    h.failing.store(true, Ordering::SeqCst);

    let outcome = h
        .engine
        .route_at(near_a(), near_c(), &mut session, at(400))
        .unwrap();
    assert!(matches!(outcome, RouteOutcome::Found(_)));
    // The failed refresh must not count as one.
    assert_eq!(session.last_refresh(), Some(at(0)));
}

#[test]
fn feed_outage_without_an_overlay_is_no_route_data() {
    let h = harness(CongestionLevel::Fluid);
    let mut session = RefreshSession::new();
    h.failing.store(true, Ordering::SeqCst);

    let result = h.engine.route_at(near_a(), near_c(), &mut session, at(0));
    assert!(matches!(result, Err(Error::NoRouteData)));
}
