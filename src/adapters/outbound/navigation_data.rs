use crate::common::{NavError, NavResult};
use crate::domains::navigation::context::NavAsset;
use crate::domains::navigation::ports::{RoutingTableStore, SceneSource};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"NAVT";
const FORMAT: &str = "nav-bincode";
pub const ASSET_VERSION: u8 = 1;

/// JSON header written in front of every versioned asset payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHeader {
    pub format: String,
    pub version: u8,
    pub scene: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub lookup_count: usize,
    pub edge_digest: String,
    pub baked_at: String,
}

/// Resolve the navigation data directory.
/// Precedence: explicit value -> NAV_DATA_DIR env var -> ./resources/navigation -> /usr/share/nav-routing
pub fn resolve_data_dir(configured: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = configured {
        return dir;
    }
    if let Ok(v) = env::var("NAV_DATA_DIR") {
        return PathBuf::from(v);
    }
    let cwd_default = Path::new("resources/navigation");
    if cwd_default.exists() {
        return cwd_default.to_path_buf();
    }
    PathBuf::from("/usr/share/nav-routing")
}

/// md5 over the little-endian edge list; ties a table to the edge set it was baked for.
pub fn edge_digest(edges: &[(u32, u32)]) -> String {
    let mut bytes = Vec::with_capacity(edges.len() * 8);
    for (a, b) in edges {
        bytes.extend_from_slice(&a.to_le_bytes());
        bytes.extend_from_slice(&b.to_le_bytes());
    }
    format!("{:x}", md5::compute(&bytes))
}

/// magic + version + header length (u32 LE) + JSON header + bincode payload
pub fn encode_asset(scene: &str, asset: &NavAsset) -> NavResult<Vec<u8>> {
    let payload = bincode::serialize(asset)?;
    let header = AssetHeader {
        format: FORMAT.to_string(),
        version: ASSET_VERSION,
        scene: scene.to_string(),
        node_count: asset.waypoints.len(),
        edge_count: asset.edges.len(),
        lookup_count: asset.table.iter().map(Vec::len).sum(),
        edge_digest: edge_digest(&asset.edges),
        baked_at: Utc::now().to_rfc3339(),
    };
    let header = serde_json::to_vec(&header)?;

    let mut bytes = Vec::with_capacity(9 + header.len() + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(ASSET_VERSION);
    bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Parses an encoded asset. Version 0 files carry no header.
pub fn decode_asset(bytes: &[u8]) -> NavResult<(Option<AssetHeader>, NavAsset)> {
    if bytes.len() < 9 || &bytes[..4] != MAGIC {
        return Err(NavError::CorruptAsset("missing NAVT magic".to_string()));
    }
    let version = bytes[4];
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&bytes[5..9]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let body = &bytes[9..];
    if body.len() < header_len {
        return Err(NavError::CorruptAsset(format!(
            "header length {} exceeds {} remaining bytes",
            header_len,
            body.len()
        )));
    }
    let (header_bytes, payload) = body.split_at(header_len);

    match version {
        0 => Ok((None, bincode::deserialize(payload)?)),
        ASSET_VERSION => {
            let header: AssetHeader = serde_json::from_slice(header_bytes)?;
            let asset: NavAsset = bincode::deserialize(payload)?;
            if header.format != FORMAT {
                return Err(NavError::CorruptAsset(format!("unknown format {}", header.format)));
            }
            if header.node_count != asset.waypoints.len() || header.edge_count != asset.edges.len() {
                return Err(NavError::CorruptAsset(format!(
                    "header counts {}/{} do not match payload {}/{}",
                    header.node_count,
                    header.edge_count,
                    asset.waypoints.len(),
                    asset.edges.len()
                )));
            }
            if header.edge_digest != edge_digest(&asset.edges) {
                return Err(NavError::CorruptAsset(
                    "edge digest mismatch, table was baked for a different edge set".to_string(),
                ));
            }
            Ok((Some(header), asset))
        }
        v => Err(NavError::CorruptAsset(format!("unsupported asset version {}", v))),
    }
}

fn io_err(e: std::io::Error) -> NavError {
    NavError::Infrastructure(format!("{}", e))
}

fn checked_name(scene: &str) -> NavResult<&str> {
    if scene.is_empty() || scene.contains(&['/', '\\'][..]) || scene.contains("..") {
        return Err(NavError::Infrastructure(format!("invalid scene name {:?}", scene)));
    }
    Ok(scene)
}

pub struct FilesystemDataSource {
    base: PathBuf,
}

impl FilesystemDataSource {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self {
            base: resolve_data_dir(base),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn table_path(&self, scene: &str, extension: &str) -> NavResult<PathBuf> {
        let mut p = self.base.clone();
        p.push("tables");
        p.push(format!("{}.{}", checked_name(scene)?, extension));
        Ok(p)
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> NavResult<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(io_err)?;
            }
        }
        // Write beside the target and rename so readers never see a partial asset.
        let tmp = path.with_extension("tmp");
        let mut f = fs::File::create(&tmp).map_err(io_err)?;
        f.write_all(bytes).map_err(io_err)?;
        f.sync_all().map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Header of a stored asset without decoding the payload's table.
    pub fn read_header(&self, scene: &str) -> NavResult<Option<AssetHeader>> {
        let bytes = fs::read(self.table_path(scene, "nav")?).map_err(io_err)?;
        decode_asset(&bytes).map(|(header, _)| header)
    }

    pub fn load_legacy_text(&self, scene: &str) -> NavResult<String> {
        let path = self.table_path(scene, "lookup.txt")?;
        fs::read_to_string(path).map_err(io_err)
    }
}

impl SceneSource for FilesystemDataSource {
    fn load_geojson(&self, name: &str) -> NavResult<String> {
        let mut p = self.base.clone();
        p.push("scenes");
        p.push(checked_name(name)?);
        let mut s = String::new();
        let mut f = fs::File::open(&p).map_err(io_err)?;
        f.read_to_string(&mut s).map_err(io_err)?;
        Ok(s)
    }
}

impl RoutingTableStore for FilesystemDataSource {
    fn save_asset(&self, scene: &str, asset: &NavAsset) -> NavResult<()> {
        let bytes = encode_asset(scene, asset)?;
        let path = self.table_path(scene, "nav")?;
        self.write_file(&path, &bytes)
    }

    fn load_asset(&self, scene: &str) -> NavResult<NavAsset> {
        let bytes = fs::read(self.table_path(scene, "nav")?).map_err(io_err)?;
        decode_asset(&bytes).map(|(_, asset)| asset)
    }

    fn save_legacy_text(&self, scene: &str, text: &str) -> NavResult<()> {
        let path = self.table_path(scene, "lookup.txt")?;
        self.write_file(&path, text.as_bytes())
    }

    fn delete_asset(&self, scene: &str) -> NavResult<()> {
        for extension in ["nav", "lookup.txt"] {
            let path = self.table_path(scene, extension)?;
            if path.exists() {
                fs::remove_file(&path).map_err(io_err)?;
            }
        }
        Ok(())
    }
}
