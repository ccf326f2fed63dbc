//! Command-level behaviour against real temporary trees.

use camino::{Utf8Path, Utf8PathBuf};
use placepack_core::{PlacementRecord, TileCoord, sort_canonical};
use rstest::{fixture, rstest};

use crate::batch::{BatchConfig, execute_batch};
use crate::compress::compress_file;
use crate::decompress::decompress_file;
use crate::jsonl::{read_document, read_records};
use crate::query::{QueryConfig, execute_query};
use crate::render::{RenderConfig, country_color, execute_render};
use crate::CliError;

#[fixture]
fn workspace() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

fn record(id: i64, number: i64, name: &str, x: i64, y: i64) -> PlacementRecord {
    PlacementRecord {
        id,
        city_id: 1,
        name: name.into(),
        number,
        country_id: 9,
        coord: TileCoord {
            tile_x: x,
            tile_y: y,
        },
    }
}

fn write_record_lines(path: &Utf8Path, records: &[PlacementRecord]) {
    let lines: Vec<String> = records
        .iter()
        .map(|r| serde_json::to_string(r).unwrap())
        .collect();
    std::fs::write(path, lines.join("\n")).unwrap();
}

fn query_config(target: &Utf8Path, x: i64, y: i64) -> QueryConfig {
    QueryConfig {
        target: target.to_path_buf(),
        x,
        y,
        jobs: Some(2),
    }
}

fn run_query_to_json(config: &QueryConfig) -> serde_json::Value {
    let mut out = Vec::new();
    execute_query(config, &mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
}

#[rstest]
fn compress_then_query_covers_and_misses(workspace: (tempfile::TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let input = root.join("tileY-5.jsonl");
    let records: Vec<_> = (0..4).map(|x| record(1, 1, "A", x, 5)).collect();
    write_record_lines(&input, &records);

    let output = root.join("tileY-5.pack.json");
    let stats = compress_file(&input, &output, 4).unwrap();
    assert_eq!(stats.records, 4);
    assert_eq!(stats.blobs, 1);

    let hit = run_query_to_json(&query_config(&output, 2, 5));
    assert_eq!(hit["match"], serde_json::json!(true));
    assert_eq!(hit["id"], serde_json::json!(1));
    assert_eq!(hit["number"], serde_json::json!(1));
    assert_eq!(hit["xs"], serde_json::json!(0));
    assert_eq!(hit["xe"], serde_json::json!(3));

    let miss = run_query_to_json(&query_config(&output, 4, 5));
    assert_eq!(miss["match"], serde_json::json!(false));
    assert!(miss.get("id").is_none());
}

#[rstest]
fn malformed_record_reports_its_line(workspace: (tempfile::TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let input = root.join("broken.jsonl");
    let good = serde_json::to_string(&record(1, 1, "A", 0, 0)).unwrap();
    std::fs::write(&input, format!("{good}\n{{\"id\": 2}}\n")).unwrap();

    let result = read_records(&input);
    assert!(matches!(
        result,
        Err(CliError::ParseRecord { line: 2, .. })
    ));
}

#[rstest]
fn decompress_restores_canonical_records(workspace: (tempfile::TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let input = root.join("mixed.jsonl");
    let mut records = vec![
        record(3, 3, "B", 7, 2),
        record(1, 1, "A", 1, 5),
        record(1, 1, "A", 0, 5),
    ];
    write_record_lines(&input, &records);

    let packed = root.join("mixed.pack.json");
    compress_file(&input, &packed, 4).unwrap();
    let restored_path = root.join("restored.jsonl");
    let count = decompress_file(&packed, &restored_path).unwrap();
    assert_eq!(count, 3);

    sort_canonical(&mut records);
    assert_eq!(read_records(&restored_path).unwrap(), records);
}

#[rstest]
fn unknown_document_shape_is_fatal(workspace: (tempfile::TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let path = root.join("bogus.pack.json");
    std::fs::write(&path, r#"{"c":1,"n":"A","id":9,"payload":[]}"#).unwrap();
    assert!(matches!(
        read_document(&path),
        Err(CliError::ParseDocument { .. })
    ));
}

#[rstest]
fn batch_attempts_every_file_and_reports_failures(
    workspace: (tempfile::TempDir, Utf8PathBuf),
) {
    let (_guard, root) = workspace;
    write_record_lines(&root.join("a.jsonl"), &[record(1, 1, "A", 0, 0)]);
    write_record_lines(&root.join("b.jsonl"), &[record(2, 2, "B", 1, 1)]);
    std::fs::write(root.join("c.jsonl"), "not json\n").unwrap();

    let out_dir = root.join("packed");
    let config = BatchConfig {
        dir: root.clone(),
        out_dir: Some(out_dir.clone()),
        stride: 4,
        jobs: Some(2),
    };
    let mut out = Vec::new();
    execute_batch(&config, &mut out).unwrap();

    let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(summary["attempted"], serde_json::json!(3));
    assert_eq!(summary["succeeded"], serde_json::json!(2));
    assert_eq!(summary["failed"], serde_json::json!(1));

    assert!(out_dir.join("a.pack.json").as_std_path().is_file());
    assert!(out_dir.join("b.pack.json").as_std_path().is_file());
    assert!(!out_dir.join("c.pack.json").as_std_path().exists());
}

#[rstest]
fn render_paints_rows_and_writes_the_legend(workspace: (tempfile::TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let rows = root.join("sorted");
    std::fs::create_dir(&rows).unwrap();
    // First row fixes the width at 3; the middle line is malformed and
    // must stay black. tileY-10 comes after tileY-2 despite sorting
    // before it lexicographically.
    std::fs::write(
        rows.join("tileY-2.jsonl"),
        concat!(
            r#"{"countryId":5}"#, "\n",
            "not json\n",
            r#"{"countryId":6}"#, "\n",
        ),
    )
    .unwrap();
    std::fs::write(rows.join("tileY-10.jsonl"), format!("{}\n", r#"{"countryId":5}"#)).unwrap();
    std::fs::write(rows.join("notes.txt"), "ignored\n").unwrap();

    let names = root.join("countries.csv");
    std::fs::write(&names, "countryId,countryName\n5,Atlantis\n").unwrap();

    let output = root.join("map.png");
    let legend = root.join("map.legend.txt");
    let config = RenderConfig {
        dir: rows,
        output: output.clone(),
        names,
        legend: legend.clone(),
    };
    let stats = execute_render(&config).unwrap();
    assert_eq!((stats.rows, stats.width, stats.countries), (2, 3, 2));

    let map = image::open(output.as_std_path()).unwrap().to_rgb8();
    assert_eq!(map.dimensions(), (3, 2));
    assert_eq!(*map.get_pixel(0, 0), country_color(5));
    assert_eq!(*map.get_pixel(1, 0), image::Rgb([0, 0, 0]));
    assert_eq!(*map.get_pixel(2, 0), country_color(6));
    assert_eq!(*map.get_pixel(0, 1), country_color(5));
    assert_eq!(*map.get_pixel(1, 1), image::Rgb([0, 0, 0]));

    assert_eq!(
        std::fs::read_to_string(legend.as_std_path()).unwrap(),
        "countryId,countryName,RGB\n5,Atlantis,(229, 29, 155)\n6,Unknown,(70, 86, 186)\n"
    );
}

#[rstest]
fn render_requires_matching_row_files(workspace: (tempfile::TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let config = RenderConfig {
        dir: root.clone(),
        output: root.join("map.png"),
        names: root.join("missing.csv"),
        legend: root.join("map.legend.txt"),
    };
    assert!(matches!(
        execute_render(&config),
        Err(CliError::NoRenderRows { .. })
    ));
}

#[rstest]
fn directory_query_finds_the_covering_file(workspace: (tempfile::TempDir, Utf8PathBuf)) {
    let (_guard, root) = workspace;
    let first = root.join("row0.jsonl");
    let second = root.join("row1.jsonl");
    write_record_lines(&first, &[record(1, 1, "A", 0, 0)]);
    write_record_lines(&second, &[record(2, 2, "B", 0, 1)]);
    compress_file(&first, &root.join("row0.pack.json"), 4).unwrap();
    compress_file(&second, &root.join("row1.pack.json"), 4).unwrap();

    let hit = run_query_to_json(&query_config(&root, 0, 1));
    assert_eq!(hit["match"], serde_json::json!(true));
    assert_eq!(hit["id"], serde_json::json!(2));
    assert_eq!(
        hit["file"],
        serde_json::json!(root.join("row1.pack.json").as_str())
    );

    let miss = run_query_to_json(&query_config(&root, 9, 9));
    assert_eq!(miss["match"], serde_json::json!(false));
    assert_eq!(miss["file"], serde_json::json!(root.as_str()));
}
