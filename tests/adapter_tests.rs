use nav_routing::adapters::outbound::legacy_text::{decode_legacy, encode_legacy};
use nav_routing::adapters::outbound::loggers::init_noop_logger;
use nav_routing::adapters::outbound::navigation_data::{
    decode_asset, edge_digest, encode_asset, resolve_data_dir, AssetHeader, FilesystemDataSource,
    ASSET_VERSION,
};
use nav_routing::common::{NavError, Point3};
use nav_routing::domains::navigation::{
    BakeConfig, NavAsset, NavGraph, NavigationContext, RoutingTableBaker, RoutingTableStore,
    SceneSource,
};
use std::fs;
use tempfile::tempdir;

fn baked_square() -> NavigationContext {
    let graph = NavGraph::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.25, 5.5),
            Point3::new(5.5, 0.0, 5.5),
            Point3::new(5.5, 0.1, 0.0),
        ],
        [(0, 1), (1, 2), (2, 3), (3, 0)],
    )
    .unwrap();
    let baked = RoutingTableBaker::new(BakeConfig::default(), init_noop_logger())
        .bake(&graph)
        .unwrap();
    NavigationContext::new("square", graph, baked.table).unwrap()
}

fn frame(version: u8, header: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut bytes = b"NAVT".to_vec();
    bytes.push(version);
    bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
    bytes.extend_from_slice(header);
    bytes.extend_from_slice(payload);
    bytes
}

#[test]
fn test_filesystem_asset_save_and_load() {
    let dir = tempdir().unwrap();
    let ds = FilesystemDataSource::new(Some(dir.path().to_path_buf()));
    let context = baked_square();
    let asset = context.to_asset();

    ds.save_asset("square", &asset).unwrap();
    assert!(dir.path().join("tables").join("square.nav").exists());

    let loaded = ds.load_asset("square").unwrap();
    assert_eq!(loaded, asset);

    let restored = NavigationContext::from_asset("square", loaded).unwrap();
    assert_eq!(restored.graph(), context.graph());
    assert_eq!(restored.table(), context.table());

    let header = ds.read_header("square").unwrap().unwrap();
    assert_eq!(header.scene, "square");
    assert_eq!(header.version, ASSET_VERSION);
    assert_eq!(header.node_count, 4);
    assert_eq!(header.edge_count, 4);
    assert_eq!(header.lookup_count, 12);
    assert_eq!(header.edge_digest, edge_digest(&asset.edges));

    ds.delete_asset("square").unwrap();
    assert!(ds.load_asset("square").is_err());
}

#[test]
fn test_version_zero_asset_still_loads() {
    let asset = baked_square().to_asset();
    let payload = bincode::serialize(&asset).unwrap();

    let (header, decoded) = decode_asset(&frame(0, &[], &payload)).unwrap();
    assert!(header.is_none());
    assert_eq!(decoded, asset);
}

#[test]
fn test_edge_digest_mismatch_is_rejected() {
    let asset = baked_square().to_asset();
    let header = AssetHeader {
        format: "nav-bincode".to_string(),
        version: ASSET_VERSION,
        scene: "square".to_string(),
        node_count: asset.waypoints.len(),
        edge_count: asset.edges.len(),
        lookup_count: 12,
        edge_digest: edge_digest(&[(0, 2), (1, 3), (0, 1), (2, 3)]),
        baked_at: "2024-01-01T00:00:00+00:00".to_string(),
    };
    let bytes = frame(
        ASSET_VERSION,
        &serde_json::to_vec(&header).unwrap(),
        &bincode::serialize(&asset).unwrap(),
    );
    assert!(matches!(decode_asset(&bytes), Err(NavError::CorruptAsset(_))));
}

#[test]
fn test_corrupt_and_unknown_assets() {
    assert!(matches!(decode_asset(b"nope"), Err(NavError::CorruptAsset(_))));
    assert!(matches!(decode_asset(&frame(9, &[], &[])), Err(NavError::CorruptAsset(_))));

    let mut truncated = encode_asset("square", &baked_square().to_asset()).unwrap();
    truncated.truncate(12);
    assert!(decode_asset(&truncated).is_err());
}

#[test]
fn test_tampered_table_fails_revalidation() {
    let mut asset = baked_square().to_asset();
    // 0 and 2 are not neighbours.
    asset.table[0][0] = 2;
    assert!(matches!(
        NavigationContext::from_asset("square", asset),
        Err(NavError::InvalidTable(_))
    ));

    let short_rows = NavAsset {
        table: vec![vec![1], vec![0]],
        ..baked_square().to_asset()
    };
    assert!(NavigationContext::from_asset("square", short_rows).is_err());
}

#[test]
fn test_legacy_text_round_trip() {
    let context = baked_square();
    let text = encode_legacy(context.graph(), context.table());
    assert_eq!(text.lines().count(), 12);
    assert!(text.lines().all(|l| l.split_whitespace().count() == 9));

    let decoded = decode_legacy(&text, context.graph()).unwrap();
    assert_eq!(&decoded, context.table());

    let dir = tempdir().unwrap();
    let ds = FilesystemDataSource::new(Some(dir.path().to_path_buf()));
    ds.save_legacy_text("square", &text).unwrap();
    assert_eq!(ds.load_legacy_text("square").unwrap(), text);
}

#[test]
fn test_legacy_text_rejects_bad_lines() {
    let context = baked_square();
    let graph = context.graph();

    assert!(decode_legacy("0 0 0 0 0.25 5.5", graph).is_err());
    assert!(decode_legacy("1 1 1 0 0.25 5.5 0 0.25 5.5", graph).is_err());

    let duplicate = "0 0 0 0 0.25 5.5 0 0.25 5.5\n0 0 0 0 0.25 5.5 0 0.25 5.5\n";
    assert!(decode_legacy(duplicate, graph).is_err());

    let commented = "# header\n\n0 0 0 0 0.25 5.5 0 0.25 5.5\n";
    let partial = decode_legacy(commented, graph).unwrap();
    assert_eq!(partial.next_hop(0, 1), Some(1));
    assert_eq!(partial.filled_count(), 1);
}

#[test]
fn test_scene_source_and_name_checks() {
    let dir = tempdir().unwrap();
    let base = dir.path().to_path_buf();
    let ds = FilesystemDataSource::new(Some(base.clone()));

    fs::create_dir_all(base.join("scenes")).unwrap();
    fs::write(base.join("scenes").join("room.geojson"), r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
    assert!(ds.load_geojson("room.geojson").unwrap().contains("FeatureCollection"));
    assert!(ds.load_geojson("missing.geojson").is_err());

    assert!(ds.load_geojson("../room.geojson").is_err());
    assert!(ds.save_asset("a/b", &NavAsset::default()).is_err());
    assert!(ds.load_asset("").is_err());
}

#[test]
fn test_explicit_data_dir_wins() {
    let dir = tempdir().unwrap();
    assert_eq!(resolve_data_dir(Some(dir.path().to_path_buf())), dir.path());
    assert_eq!(FilesystemDataSource::new(Some(dir.path().to_path_buf())).base(), dir.path());
}
