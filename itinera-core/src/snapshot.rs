//! Persisted road-graph snapshots
//!
//! Snapshots are opaque bincode blobs keyed by a canonical name inside the
//! store directory. The store treats them as a pure load/save cache and
//! never partially updates one: saves write to a temporary name and rename,
//! so a reader can never observe a half-written snapshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use hashbrown::HashMap;
use log::{debug, info};

use crate::Error;
use crate::model::RoadGraph;

pub struct SnapshotStore {
    dir: PathBuf,
    rebuild_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SnapshotStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoError`] when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            rebuild_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Load a snapshot and restore its spatial index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoError`] when the file cannot be read and
    /// [`Error::CorruptSnapshot`] when its bytes do not deserialize.
    pub fn load(&self, name: &str) -> Result<RoadGraph, Error> {
        let bytes = fs::read(self.path(name))?;
        let mut graph: RoadGraph = bincode::deserialize(&bytes)
            .map_err(|_| Error::CorruptSnapshot(name.to_string()))?;
        graph.restore_spatial_index();

        debug!(
            "Loaded snapshot '{name}': {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Atomically persist a snapshot under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] when the graph does not serialize and
    /// [`Error::IoError`] on write or rename failures.
    pub fn save(&self, graph: &RoadGraph, name: &str) -> Result<(), Error> {
        let bytes =
            bincode::serialize(graph).map_err(|e| Error::InvalidData(e.to_string()))?;

        let tmp = self.dir.join(format!("{name}.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.path(name))?;

        debug!("Saved snapshot '{name}'");
        Ok(())
    }

    /// Return the cached snapshot, or build, persist, and return it.
    ///
    /// # Errors
    ///
    /// Propagates builder, load, and save failures.
    pub fn ensure<F>(&self, name: &str, build: F) -> Result<RoadGraph, Error>
    where
        F: FnOnce() -> Result<RoadGraph, Error>,
    {
        if self.exists(name) {
            return self.load(name);
        }

        info!("Snapshot '{name}' not found, building it");
        let graph = build()?;
        self.save(&graph, name)?;
        Ok(graph)
    }

    /// Mutual-exclusion lock scoped to a snapshot name. Rebuild-and-persist
    /// sequences for the same name must hold it; plain readers need not.
    pub fn rebuild_lock(&self, name: &str) -> Arc<Mutex<()>> {
        self.rebuild_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RoadEdge, RoadNode};
    use geo::Point;
    use petgraph::stable_graph::StableDiGraph;

    fn sample_graph() -> RoadGraph {
        let mut graph = StableDiGraph::new();
        let a = graph.add_node(RoadNode {
            id: 1,
            geometry: Point::new(2.10, 41.40),
        });
        let b = graph.add_node(RoadNode {
            id: 2,
            geometry: Point::new(2.12, 41.41),
        });
        graph.add_edge(a, b, RoadEdge::new(100.0, 10.0));
        RoadGraph::new(graph)
    }

    #[test]
    fn save_and_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        let graph = sample_graph();

        store.save(&graph, "city.graph").unwrap();
        assert!(store.exists("city.graph"));

        let loaded = store.load("city.graph").unwrap();
        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.edge_count(), 1);

        let edge = loaded.graph.edge_weights().next().unwrap();
        assert!((edge.itime - graph.graph.edge_weights().next().unwrap().itime).abs() < 1e-12);
    }

    #[test]
    fn spatial_index_is_restored_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        store.save(&sample_graph(), "city.graph").unwrap();

        let loaded = store.load("city.graph").unwrap();
        let nearest = loaded.nearest_node(Point::new(2.119, 41.409)).unwrap();
        assert_eq!(loaded.graph[nearest].id, 2);
    }

    #[test]
    fn garbage_bytes_are_a_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("bad.graph"), b"not a graph").unwrap();

        assert!(matches!(
            store.load("bad.graph"),
            Err(Error::CorruptSnapshot(name)) if name == "bad.graph"
        ));
    }

    #[test]
    fn missing_snapshot_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        assert!(matches!(store.load("absent"), Err(Error::IoError(_))));
    }

    #[test]
    fn ensure_builds_once_then_caches() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        let mut builds = 0;

        store
            .ensure("city.graph", || {
                builds += 1;
                Ok(sample_graph())
            })
            .unwrap();
        store
            .ensure("city.graph", || {
                builds += 1;
                Ok(sample_graph())
            })
            .unwrap();

        assert_eq!(builds, 1);
    }

    #[test]
    fn save_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        store.save(&sample_graph(), "city.graph").unwrap();

        assert!(!dir.path().join("city.graph.tmp").exists());
    }

    #[test]
    fn rebuild_lock_is_shared_per_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        let first = store.rebuild_lock("city.graph");
        let second = store.rebuild_lock("city.graph");
        assert!(Arc::ptr_eq(&first, &second));

        let other = store.rebuild_lock("other.graph");
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
