//! Tile sheets and the registry that maps source ids to them.

pub mod loader;
mod tileset;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use tileset::{TileSource, UvRect};

/// A registry slot: either decoded and drawable, or reserved and waiting.
pub enum SourceSlot<I> {
    Pending { path: Option<PathBuf> },
    Ready(TileSource<I>),
}

/// Result of looking a source id up.
pub enum Lookup<'a, I> {
    Ready(&'a TileSource<I>),
    Pending,
    Unknown,
}

/// Tile sheets keyed by source id. Passed by reference into the renderer;
/// only the host adds entries.
pub struct AssetRegistry<I> {
    slots: BTreeMap<i32, SourceSlot<I>>,
    /// File each id was reserved or loaded from.
    paths: BTreeMap<i32, PathBuf>,
}

impl<I> Default for AssetRegistry<I> {
    fn default() -> Self {
        Self {
            slots: BTreeMap::new(),
            paths: BTreeMap::new(),
        }
    }
}

impl<I> AssetRegistry<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: i32, source: TileSource<I>) {
        log::info!(
            "tile source {id} ready: {} ({}x{} tiles)",
            source.name,
            source.cols(),
            source.rows()
        );
        self.slots.insert(id, SourceSlot::Ready(source));
    }

    /// Insert a sheet decoded from `path`.
    pub fn insert_from_file(&mut self, id: i32, source: TileSource<I>, path: PathBuf) {
        self.insert(id, source);
        self.paths.insert(id, path);
    }

    /// Reserve `id` for a sheet that will be decoded later. Does nothing if
    /// the id is already known.
    pub fn reserve(&mut self, id: i32, path: Option<PathBuf>) {
        if self.slots.contains_key(&id) {
            return;
        }
        if let Some(path) = &path {
            self.paths.insert(id, path.clone());
        }
        self.slots.insert(id, SourceSlot::Pending { path });
    }

    /// Bind `id` to the sheet at `path`. An unknown id, or one bound to a
    /// different file, is reserved again as pending. Returns true if so.
    pub fn require(&mut self, id: i32, path: PathBuf) -> bool {
        if self.paths.get(&id) == Some(&path) {
            return false;
        }
        if self.slots.contains_key(&id) {
            log::info!(
                "tile source {id} now points at {}, reloading",
                path.display()
            );
        }
        self.paths.insert(id, path.clone());
        self.slots.insert(id, SourceSlot::Pending { path: Some(path) });
        true
    }

    pub fn path(&self, id: i32) -> Option<&Path> {
        self.paths.get(&id).map(PathBuf::as_path)
    }

    pub fn lookup(&self, id: i32) -> Lookup<'_, I> {
        match self.slots.get(&id) {
            Some(SourceSlot::Ready(source)) => Lookup::Ready(source),
            Some(SourceSlot::Pending { .. }) => Lookup::Pending,
            None => Lookup::Unknown,
        }
    }

    pub fn get(&self, id: i32) -> Option<&TileSource<I>> {
        match self.slots.get(&id) {
            Some(SourceSlot::Ready(source)) => Some(source),
            _ => None,
        }
    }

    /// Lowest pending id and its path, if any.
    pub fn next_pending(&self) -> Option<(i32, Option<PathBuf>)> {
        self.slots.iter().find_map(|(id, slot)| match slot {
            SourceSlot::Pending { path } => Some((*id, path.clone())),
            SourceSlot::Ready(_) => None,
        })
    }

    pub fn remove(&mut self, id: i32) -> Option<SourceSlot<I>> {
        self.paths.remove(&id);
        self.slots.remove(&id)
    }

    /// Ready sources in id order.
    pub fn ready(&self) -> impl Iterator<Item = (i32, &TileSource<I>)> {
        self.slots.iter().filter_map(|(id, slot)| match slot {
            SourceSlot::Ready(source) => Some((*id, source)),
            SourceSlot::Pending { .. } => None,
        })
    }

    /// Smallest non-negative id not in use.
    pub fn next_free_id(&self) -> i32 {
        (0..).find(|id| !self.slots.contains_key(id)).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> TileSource<()> {
        TileSource {
            name: name.to_string(),
            image: (),
            image_width: 64,
            image_height: 64,
            tile_size: 32,
            colors: Vec::new(),
        }
    }

    #[test]
    fn test_lookup_states() {
        let mut reg = AssetRegistry::new();
        reg.insert(0, source("floors"));
        reg.reserve(3, Some(PathBuf::from("props.png")));
        assert!(matches!(reg.lookup(0), Lookup::Ready(s) if s.name == "floors"));
        assert!(matches!(reg.lookup(3), Lookup::Pending));
        assert!(matches!(reg.lookup(7), Lookup::Unknown));
        assert_eq!(reg.next_pending(), Some((3, Some(PathBuf::from("props.png")))));
    }

    #[test]
    fn test_reserve_does_not_clobber_ready() {
        let mut reg = AssetRegistry::new();
        reg.insert(1, source("walls"));
        reg.reserve(1, None);
        assert!(reg.get(1).is_some());
        assert!(reg.next_pending().is_none());
    }

    #[test]
    fn test_require_rebinds_changed_path() {
        let mut reg = AssetRegistry::new();
        reg.insert_from_file(0, source("hospital"), PathBuf::from("/maps/hospital.png"));

        assert!(!reg.require(0, PathBuf::from("/maps/hospital.png")));
        assert!(matches!(reg.lookup(0), Lookup::Ready(s) if s.name == "hospital"));

        assert!(reg.require(0, PathBuf::from("/maps/clinic.png")));
        assert!(matches!(reg.lookup(0), Lookup::Pending));
        assert_eq!(reg.next_pending(), Some((0, Some(PathBuf::from("/maps/clinic.png")))));
        assert_eq!(reg.path(0), Some(Path::new("/maps/clinic.png")));

        // Decoding the reserved sheet keeps the new binding.
        reg.insert(0, source("clinic"));
        assert!(!reg.require(0, PathBuf::from("/maps/clinic.png")));
        assert!(matches!(reg.lookup(0), Lookup::Ready(s) if s.name == "clinic"));
    }

    #[test]
    fn test_require_unknown_and_pathless_ids() {
        let mut reg = AssetRegistry::new();
        assert!(reg.require(2, PathBuf::from("props.png")));
        assert!(!reg.require(2, PathBuf::from("props.png")));

        reg.insert(5, source("scratch"));
        assert!(reg.require(5, PathBuf::from("walls.png")));
        assert!(matches!(reg.lookup(5), Lookup::Pending));

        reg.remove(2);
        assert_eq!(reg.path(2), None);
        assert!(reg.require(2, PathBuf::from("props.png")));
    }

    #[test]
    fn test_next_free_id() {
        let mut reg = AssetRegistry::new();
        assert_eq!(reg.next_free_id(), 0);
        reg.insert(0, source("a"));
        reg.reserve(1, None);
        reg.insert(3, source("c"));
        assert_eq!(reg.next_free_id(), 2);
        assert_eq!(reg.ready().map(|(id, _)| id).collect::<Vec<_>>(), [0, 3]);
    }
}
