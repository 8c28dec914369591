//! End-to-end coverage for dropped-file import.

use geo::Coord;
use serde_json::json;
use waymark_core::{CollectionError, FeatureId, Geometry, MapStore, MemoryMapStore};
use waymark_ingest::{DiskFile, ImportError, MemoryFile, import_file};

const WAYPOINTS: &str = "\
name:home,x:12,y:64,z:-7,red:1.0,green:0.5,blue:0.0,enabled:true
name:broken,x:abc,y:0,z:0,red:0,green:0,blue:0
name:farm,x:-3,y:70,z:210,red:0.0,green:1.0,blue:0.0
";

const SNITCHES: &str = "\
4,64,-20,world,jukealert,alpha,gate
-100,30,7,world,jukealert,beta,vault
";

#[tokio::test]
async fn waypoint_files_load_the_good_lines() {
    let file = MemoryFile::new("voxelMap.points", WAYPOINTS.as_bytes());
    let mut store = MemoryMapStore::new();

    let summary = import_file(&file, &mut store)
        .await
        .expect("import should succeed");

    assert_eq!(summary.label, "VoxelMap waypoints");
    assert_eq!(summary.features, 2);
    assert_eq!(summary.filters, 0);
    assert_eq!(store.len(), 2);
    assert!(
        store
            .get_feature(&FeatureId::new("dragdrop-voxelmap-waypoint-12,64,-7,home"))
            .is_some()
    );
}

#[tokio::test]
async fn reimporting_snitches_overwrites_rather_than_duplicates() {
    let file = MemoryFile::new("Snitches.csv", SNITCHES.as_bytes());
    let mut store = MemoryMapStore::new();

    import_file(&file, &mut store).await.expect("first import");
    import_file(&file, &mut store).await.expect("second import");

    assert_eq!(store.len(), 2);
    assert!(
        store
            .get_feature(&FeatureId::new("dragdrop-snitchmaster-4,64,-20,alpha"))
            .is_some()
    );
}

#[tokio::test]
async fn tiles_become_image_overlays_carrying_their_file_as_a_data_url() {
    let png = [0x89u8, b'P', b'N', b'G'];
    let file = MemoryFile::new("5,-2.png", png);
    let mut store = MemoryMapStore::new();

    let summary = import_file(&file, &mut store)
        .await
        .expect("import should succeed");
    assert_eq!(summary.label, "JourneyMap tile");

    let feature = store
        .get_feature(&FeatureId::new("dragdrop-journeymap-tile-5--2"))
        .expect("tile feature");
    let Geometry::Image { url, bounds } = feature.geometry else {
        panic!("tiles are image overlays");
    };
    assert_eq!(url, "data:image/png;base64,iVBORw==");
    assert_eq!(bounds.min(), Coord { x: 2560.0, y: -1024.0 });
    assert_eq!(bounds.max(), Coord { x: 3072.0, y: -512.0 });
}

#[tokio::test]
async fn collection_files_go_through_the_version_gate() {
    let document = json!({
        "info": { "version": "2.0.0" },
        "features": [{ "id": "abc", "geometry": { "type": "marker", "position": [20, 10] } }],
        "filters": [{ "name": "waypoints" }],
    })
    .to_string();
    let file = MemoryFile::new("base.waymark.json", document.into_bytes());
    let mut store = MemoryMapStore::new();

    let summary = import_file(&file, &mut store)
        .await
        .expect("import should succeed");

    assert_eq!(summary.label, "Waymark collection");
    assert_eq!(summary.features, 1);
    assert_eq!(summary.filters, 1);
    assert!(store.get_feature(&FeatureId::new("abc")).is_some());
}

#[tokio::test]
async fn collections_with_a_foreign_version_are_rejected_whole() {
    let document = json!({ "info": { "version": "1.0.0" }, "features": [] }).to_string();
    let file = MemoryFile::new("old.waymark.json", document.into_bytes());
    let mut store = MemoryMapStore::new();

    let error = import_file(&file, &mut store)
        .await
        .expect_err("the version gate must hold");

    assert!(matches!(
        error,
        ImportError::Collection(CollectionError::UnsupportedVersion { .. })
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn unknown_names_are_rejected_with_the_store_untouched() {
    let file = MemoryFile::new("notes.txt", b"hello".to_vec());
    let mut store = MemoryMapStore::new();

    let error = import_file(&file, &mut store)
        .await
        .expect_err("nothing recognises the name");

    assert!(matches!(error, ImportError::UnrecognisedFile { ref name } if name == "notes.txt"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn disk_files_import_by_their_file_name() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("voxelMap.points");
    std::fs::write(&path, "name:home,x:1,y:2,z:3,red:0,green:0,blue:0\n")
        .expect("write export");

    let path = camino::Utf8PathBuf::from_path_buf(path).expect("temp paths are UTF-8");
    let file = DiskFile::new(path);
    let mut store = MemoryMapStore::new();

    let summary = import_file(&file, &mut store)
        .await
        .expect("import should succeed");
    assert_eq!(summary.features, 1);
    assert_eq!(store.len(), 1);
}
