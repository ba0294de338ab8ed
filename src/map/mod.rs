//! Map records: the on-disk form of a grid plus its metadata.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::grid::{CollisionLayer, GridError, Layer, LayerKind, TileGrid, TileRef};

/// Magic header bytes for the .wmap file format.
const MAGIC: &[u8; 4] = b"WMAP";
/// Current file format version.
const VERSION: u32 = 1;
/// How many recent files are remembered.
const MAX_RECENT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    pub kind: LayerKind,
    /// Row-major `[source, x, y]`.
    pub cells: Vec<[i32; 3]>,
}

/// Where a tile source's sheet lives, so a loaded map can find its images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: i32,
    pub path: String,
    pub tile_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub layers: Vec<LayerRecord>,
    #[serde(default)]
    pub collision: Option<Vec<bool>>,
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    Grid(GridError),
    /// A tile coordinate does not fit the sheet coordinate range.
    TileCoordinate { layer: String, index: usize },
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::Grid(e) => write!(f, "{e}"),
            MapError::TileCoordinate { layer, index } => {
                write!(f, "layer '{layer}' cell {index} has an invalid tile coordinate")
            }
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Grid(e) => Some(e),
            MapError::TileCoordinate { .. } => None,
        }
    }
}

impl From<GridError> for MapError {
    fn from(e: GridError) -> Self {
        MapError::Grid(e)
    }
}

pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl MapRecord {
    /// Snapshot a grid into a record. Timestamps are set to now.
    pub fn from_grid(id: impl Into<String>, name: impl Into<String>, grid: &TileGrid) -> Self {
        let now = now_secs();
        Self {
            id: id.into(),
            name: name.into(),
            width: grid.width(),
            height: grid.height(),
            layers: grid
                .layers()
                .iter()
                .map(|layer| LayerRecord {
                    name: layer.name.clone(),
                    kind: layer.kind,
                    cells: layer
                        .cells()
                        .map(|t| [t.source, t.x as i32, t.y as i32])
                        .collect(),
                })
                .collect(),
            collision: grid.collision().map(|c| c.cells().collect()),
            sources: Vec::new(),
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild the grid, checking shapes only. Negative sources read as
    /// `EMPTY`.
    pub fn to_grid(&self) -> Result<TileGrid, MapError> {
        let expected = self.width as usize * self.height as usize;
        let mut layers = Vec::with_capacity(self.layers.len());
        for record in &self.layers {
            let mut cells = Vec::with_capacity(record.cells.len());
            for (index, &[source, x, y]) in record.cells.iter().enumerate() {
                if source < 0 {
                    cells.push(TileRef::EMPTY);
                    continue;
                }
                let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
                    return Err(MapError::TileCoordinate {
                        layer: record.name.clone(),
                        index,
                    });
                };
                cells.push(TileRef::new(source, x, y));
            }
            let layer = Layer::from_cells(&record.name, record.kind, self.width, self.height, &cells)
                .ok_or_else(|| GridError::LayerShape {
                    layer: record.name.clone(),
                    expected,
                    found: cells.len(),
                })?;
            layers.push(layer);
        }
        let collision = match &self.collision {
            Some(cells) => Some(
                CollisionLayer::from_cells(self.width, self.height, cells).ok_or(
                    GridError::CollisionShape {
                        expected,
                        found: cells.len(),
                    },
                )?,
            ),
            None => None,
        };
        Ok(TileGrid::from_layers(self.width, self.height, layers, collision)?)
    }

    /// Distinct non-empty source ids used by any layer.
    pub fn referenced_sources(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self
            .layers
            .iter()
            .flat_map(|l| l.cells.iter().map(|c| c[0]))
            .filter(|&s| s >= 0)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Save a map as pretty JSON.
pub fn save_json(record: &MapRecord, path: &Path) -> Result<(), String> {
    let data = serde_json::to_string_pretty(record)
        .map_err(|e| format!("Serialization failed: {e}"))?;
    fs::write(path, data).map_err(|e| format!("Write failed: {e}"))
}

pub fn load_json(path: &Path) -> Result<MapRecord, String> {
    let data = fs::read_to_string(path).map_err(|e| format!("Read failed: {e}"))?;
    serde_json::from_str(&data).map_err(|e| format!("Invalid map JSON: {e}"))
}

/// Save a map to a .wmap file.
pub fn save_binary(record: &MapRecord, path: &Path) -> Result<(), String> {
    fs::write(path, encode_binary(record)?).map_err(|e| format!("Write failed: {e}"))
}

/// Load a map from a .wmap file.
pub fn load_binary(path: &Path) -> Result<MapRecord, String> {
    let data = fs::read(path).map_err(|e| format!("Read failed: {e}"))?;
    decode_binary(&data)
}

pub fn encode_binary(record: &MapRecord) -> Result<Vec<u8>, String> {
    let payload = bincode::serialize(record)
        .map_err(|e| format!("Serialization failed: {e}"))?;

    let mut data = Vec::with_capacity(MAGIC.len() + 4 + payload.len());
    data.extend_from_slice(MAGIC);
    data.extend_from_slice(&VERSION.to_le_bytes());
    data.extend_from_slice(&payload);
    Ok(data)
}

pub fn decode_binary(data: &[u8]) -> Result<MapRecord, String> {
    if data.len() < 8 {
        return Err("File too small".to_string());
    }
    if &data[0..4] != MAGIC {
        return Err("Not a wardmap file (bad magic)".to_string());
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version > VERSION {
        return Err(format!("File version {version} is newer than supported ({VERSION})"));
    }
    bincode::deserialize(&data[8..]).map_err(|e| format!("Deserialization failed: {e}"))
}

/// Pick the codec from the file extension: `.json` is JSON, anything else
/// is binary.
pub fn save(record: &MapRecord, path: &Path) -> Result<(), String> {
    if is_json(path) {
        save_json(record, path)
    } else {
        save_binary(record, path)
    }
}

pub fn load(path: &Path) -> Result<MapRecord, String> {
    if is_json(path) {
        load_json(path)
    } else {
        load_binary(path)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn recent_files_path() -> PathBuf {
    crate::settings::config_dir().join("recent.json")
}

/// Recently opened maps that still exist, newest first.
pub fn load_recent_files() -> Vec<PathBuf> {
    fs::read_to_string(recent_files_path())
        .ok()
        .and_then(|data| serde_json::from_str::<Vec<PathBuf>>(&data).ok())
        .unwrap_or_default()
        .into_iter()
        .filter(|p| p.exists())
        .collect()
}

pub fn save_recent_files(files: &[PathBuf]) {
    let path = recent_files_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(data) = serde_json::to_string_pretty(files) {
        let _ = fs::write(path, data);
    }
}

/// Move `path` to the front of `files`, dropping duplicates and the tail.
pub fn push_recent(files: &mut Vec<PathBuf>, path: PathBuf) {
    files.retain(|p| p != &path);
    files.insert(0, path);
    files.truncate(MAX_RECENT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::OBJECT_LAYER;

    fn sample_grid() -> TileGrid {
        TileGrid::new(3, 2, TileRef::new(0, 1, 33))
            .with_collision_layer()
            .with_cell(OBJECT_LAYER, 2, 1, TileRef::new(4, 5, 6))
            .with_collision(0, 1, true)
    }

    #[test]
    fn test_record_preserves_grid() {
        let grid = sample_grid();
        let record = MapRecord::from_grid("ward-a", "Ward A", &grid);
        assert_eq!(record.layers.len(), 2);
        assert_eq!(record.layers[0].cells[0], [0, 1, 33]);
        assert_eq!(record.layers[1].cells[5], [4, 5, 6]);
        assert_eq!(record.referenced_sources(), vec![0, 4]);
        assert_eq!(record.to_grid(), Ok(grid));
    }

    #[test]
    fn test_rejects_wrong_cell_count() {
        let mut record = MapRecord::from_grid("m", "m", &sample_grid());
        record.layers[1].cells.pop();
        assert!(matches!(
            record.to_grid(),
            Err(MapError::Grid(GridError::LayerShape { expected: 6, found: 5, .. }))
        ));
    }

    #[test]
    fn test_rejects_wrong_collision_shape() {
        let mut record = MapRecord::from_grid("m", "m", &sample_grid());
        record.collision = Some(vec![false; 4]);
        assert!(matches!(
            record.to_grid(),
            Err(MapError::Grid(GridError::CollisionShape { expected: 6, found: 4 }))
        ));
    }

    #[test]
    fn test_rejects_bad_tile_coordinate() {
        let mut record = MapRecord::from_grid("m", "m", &sample_grid());
        record.layers[1].cells[0] = [2, -1, 0];
        assert_eq!(
            record.to_grid(),
            Err(MapError::TileCoordinate {
                layer: "objects".to_string(),
                index: 0
            })
        );
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let mut record = MapRecord::from_grid("m", "m", &sample_grid());
        record.width = 0;
        assert!(record.to_grid().is_err());
    }

    #[test]
    fn test_json_and_binary_files() {
        let dir = std::env::temp_dir().join(format!("wardmap-map-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let mut record = MapRecord::from_grid("ward-b", "Ward B", &sample_grid());
        record.metadata.insert("floor".to_string(), "2".to_string());

        let json = dir.join("ward.json");
        save(&record, &json).unwrap();
        assert_eq!(load(&json).unwrap(), record);

        let bin = dir.join("ward.wmap");
        save(&record, &bin).unwrap();
        assert_eq!(&fs::read(&bin).unwrap()[0..4], b"WMAP");
        assert_eq!(load(&bin).unwrap(), record);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_binary_header_checks() {
        assert!(decode_binary(b"WMA").is_err());
        assert!(decode_binary(b"CT3D\x01\0\0\0").is_err());
        let mut data = encode_binary(&MapRecord::from_grid("m", "m", &sample_grid())).unwrap();
        data[4] = 9;
        assert!(decode_binary(&data).unwrap_err().contains("newer"));
    }

    #[test]
    fn test_json_missing_optional_fields() {
        let json = r#"{
            "id": "x", "name": "x", "width": 1, "height": 1,
            "layers": [{ "name": "objects", "kind": "Objects", "cells": [[-1, 0, 0]] }]
        }"#;
        let record: MapRecord = serde_json::from_str(json).unwrap();
        let grid = record.to_grid().unwrap();
        assert!(!grid.has_collision());
        assert!(grid.get(0, 0, 0).is_empty());
    }

    #[test]
    fn test_push_recent() {
        let mut files = vec![PathBuf::from("a"), PathBuf::from("b")];
        push_recent(&mut files, PathBuf::from("b"));
        assert_eq!(files, vec![PathBuf::from("b"), PathBuf::from("a")]);
        for i in 0..20 {
            push_recent(&mut files, PathBuf::from(format!("f{i}")));
        }
        assert_eq!(files.len(), MAX_RECENT);
        assert_eq!(files[0], PathBuf::from("f19"));
    }
}
