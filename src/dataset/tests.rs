use super::*;
use crate::expr::{ExprValues, MatrixType};
use crate::fields::FieldData;
use crate::table::Column;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const MATRIX: &str = "gene\tc1\tc2\tc3\nENSG1.2\t1\t0\t3\nENSG2\t0\t2\t0\nENSG9\t5\t5\t5\n";
const META: &str = "cellId\tcluster\tnGene\nc3\tB\t10\nc1\tA\t20\nc4\tA\t5\n";
const GENES: &str = "ENSG1\tCD3E\nENSG2\tMS4A1\n";
const COORDS: &str = "cellId\tx\ty\nc1\t0\t0\nc3\t10\t20\nc4\t5\t5\n";
const MARKERS: &str = "cluster\tgene\tscore\nA\tENSG1\t0.25\nB\tENSG2\t1\n";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn names(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn full_config(dir: &Path) -> DatasetConfig {
    let mut config = DatasetConfig::new(
        "pbmc",
        write(dir, "meta.tsv", META),
        write(dir, "exprMatrix.tsv", MATRIX),
    );
    config.gene_table = Some(write(dir, "genes.tab", GENES));
    config.coords.push(InputFile::with_label(write(dir, "umap.tsv", COORDS), "UMAP"));
    config.markers.push(InputFile::new(write(dir, "markers.tsv", MARKERS)));
    config.label_field = Some("cluster".to_string());
    config.enum_fields = names(&["cluster"]);
    config.use_two_bytes = true;
    config
}

// ==================== Reconciliation ====================

#[test]
fn test_reconcile_keeps_matrix_order() {
    let order = reconcile_samples(&names(&["a", "b", "c"]), &names(&["c", "a", "d"])).unwrap();
    assert_eq!(order.samples, names(&["a", "c"]));
    assert_eq!(order.meta_rows, vec![1, 0]);
    assert!(order.matrix_was_filtered);
    assert_eq!(order.meta_only, 1);
    assert_eq!(order.matrix_only, 1);
}

#[test]
fn test_reconcile_identical_samples() {
    let ids = names(&["a", "b"]);
    let order = reconcile_samples(&ids, &ids).unwrap();
    assert_eq!(order.meta_rows, vec![0, 1]);
    assert!(!order.matrix_was_filtered);
}

#[test]
fn test_reconcile_without_overlap() {
    let err = reconcile_samples(&names(&["a"]), &names(&["b"])).unwrap_err();
    match err {
        DatasetError::NoSampleOverlap {
            meta_example,
            matrix_example,
        } => {
            assert_eq!(meta_example, "b");
            assert_eq!(matrix_example, "a");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_meta_table_is_reordered() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("meta.tsv");
    let columns = vec![
        Column::new("id", names(&["x", "y", "z"])),
        Column::new("note", names(&["one", "two\tcells", "three"])),
    ];
    let columns = reconcile::reorder_columns(columns, &[2, 1]);
    reconcile::write_meta_table(&columns, &path).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "id\tnote\nz\tthree\ny\ttwo cells\n"
    );
}

// ==================== Configuration ====================

#[test]
fn test_config_validation() {
    let config = DatasetConfig::new("ok", "m.tsv", "e.tsv");
    assert!(config.validate().is_ok());
    assert_eq!(config.short_label(), "ok");

    for name in ["", "a/b", ".."] {
        let config = DatasetConfig::new(name, "m.tsv", "e.tsv");
        assert!(matches!(config.validate(), Err(DatasetError::InvalidConfig(_))));
    }

    let mut config = DatasetConfig::new("ok", "m.tsv", "e.tsv");
    config.expression.compression_level = 12;
    assert!(config.validate().is_err());
}

#[test]
fn test_resolve_paths() {
    let mut config = DatasetConfig::new("ok", "meta.tsv", "/data/matrix.tsv");
    config.colors = Some(PathBuf::from("colors.tsv"));
    config.coords.push(InputFile::new("tsne.tsv"));
    config.resolve_paths(Path::new("/project"));

    assert_eq!(config.meta, PathBuf::from("/project/meta.tsv"));
    assert_eq!(config.expr_matrix, PathBuf::from("/data/matrix.tsv"));
    assert_eq!(config.colors, Some(PathBuf::from("/project/colors.tsv")));
    assert_eq!(config.coords[0].file, PathBuf::from("/project/tsne.tsv"));
    assert_eq!(config.gene_table, None);
}

#[test]
fn test_input_label_defaults_to_file_stem() {
    assert_eq!(InputFile::new("dir/tsne.coords.tsv").label(), "tsne");
    assert_eq!(InputFile::with_label("umap.tsv", "UMAP").label(), "UMAP");
}

// ==================== Build ====================

#[test]
fn test_build_dataset() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let bundle_dir = out.path().join("pbmc");

    let stats = build_dataset(full_config(input.path()), &bundle_dir).unwrap();
    assert_eq!(stats.sample_count, 2);
    assert_eq!(stats.field_count, 3);
    assert_eq!(stats.expr_stats.genes_written, 2);
    assert_eq!(stats.expr_stats.unmapped, 1);
    assert_eq!(stats.coord_sets, 1);
    assert_eq!(stats.missing_coords, 0);
    assert_eq!(stats.marker_files, 2);
    assert!(stats.to_string().starts_with("Dataset: 2 samples, 3 fields"));

    assert_eq!(
        fs::read_to_string(bundle_dir.join("meta.tsv")).unwrap(),
        "cellId\tcluster\tnGene\nc1\tA\t20\nc3\tB\t10\n"
    );
    assert_eq!(fs::metadata(bundle_dir.join("meta.index")).unwrap().len(), 12);
    assert!(bundle_dir.join("metaFields/fields.json").exists());
    assert!(bundle_dir.join("coords/coords_0/clusterLabels.json").exists());
    assert!(bundle_dir.join("markers/markers_0/A.tsv").exists());

    let bundle = Bundle::open(&bundle_dir).unwrap();
    let descriptor = bundle.descriptor();
    assert_eq!(descriptor.name, "pbmc");
    assert_eq!(descriptor.sample_count, 2);
    assert!(descriptor.matrix_was_filtered);
    assert_eq!(descriptor.matrix_arr_type, MatrixType::Int32);
    assert_eq!(descriptor.coords[0].short_label, "UMAP");
    assert_eq!(descriptor.markers[0].short_label, "markers");
    assert!(descriptor.converter.starts_with("cellpack "));

    let cd3e = bundle.gene("CD3E").unwrap();
    assert_eq!(cd3e.values, ExprValues::Int32(vec![1, 3]));
    assert_eq!(bundle.meta_row(1).unwrap(), "c3\tB\t10");
    assert_eq!(bundle.coordinates(0).unwrap(), vec![(0.0, 0.0), (65535.0, 65535.0)]);

    match bundle.field("cluster").unwrap() {
        FieldData::Codes { codes, .. } => assert_eq!(codes, vec![0, 1]),
        other => panic!("cluster should be an enum field, got {:?}", other),
    }
}

#[test]
fn test_descriptor_keys() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    build_dataset(full_config(input.path()), out.path()).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("dataset.json")).unwrap()).unwrap();
    assert_eq!(json["shortLabel"], "pbmc");
    assert_eq!(json["sampleCount"], 2);
    assert_eq!(json["matrixArrType"], "Int32");
    assert_eq!(json["labelField"], "cluster");
    assert_eq!(json["coords"][0]["name"], "coords_0");
    assert_eq!(json["coords"][0]["type"], "Uint16");
    assert_eq!(json["coords"][0]["maxX"], 65535.0);
    assert_eq!(json["metaFields"][1]["type"], "enum");
    assert!(json.get("acronyms").is_none());
    assert!(json["created"].as_str().is_some());
}

#[test]
fn test_missing_label_field() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let mut config = full_config(input.path());
    config.label_field = Some("louvain".to_string());

    let err = build_dataset(config, out.path()).unwrap_err();
    assert!(matches!(err, DatasetError::MissingLabelField(field) if field == "louvain"));
    assert!(!out.path().join("dataset.json").exists());
}

#[test]
fn test_acronyms_and_quick_genes() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let mut config = full_config(input.path());
    config.acronyms = Some(write(input.path(), "acronyms.tsv", "NK\tNatural killer\n"));
    config.quick_genes = Some(write(input.path(), "quick.tsv", "symbol\nCD3E\nNOPE\n"));

    build_dataset(config, out.path()).unwrap();
    let bundle = Bundle::open(out.path()).unwrap();
    let descriptor = bundle.descriptor();
    assert_eq!(descriptor.acronyms["NK"], "Natural killer");
    assert_eq!(descriptor.quick_genes.len(), 1);
    assert_eq!(descriptor.quick_genes[0].symbol, "CD3E");
}

#[test]
fn test_missing_acronym_file_is_skipped() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let mut config = full_config(input.path());
    config.acronyms = Some(input.path().join("absent.tsv"));

    build_dataset(config, out.path()).unwrap();
    assert!(Bundle::open(out.path()).unwrap().descriptor().acronyms.is_empty());
}

#[test]
fn test_unknown_bundle_items() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    build_dataset(full_config(input.path()), out.path()).unwrap();
    let bundle = Bundle::open(out.path()).unwrap();

    assert!(matches!(bundle.field("nope"), Err(DatasetError::UnknownField(_))));
    assert!(matches!(
        bundle.coordinates(3),
        Err(DatasetError::UnknownCoords { index: 3, count: 1 })
    ));
    assert!(bundle.gene("NOPE").is_err());
    assert!(bundle.meta_row(2).is_err());
}

#[test]
fn test_failed_build_leaves_output_untouched() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let mut config = full_config(input.path());
    config.gene_table = Some(write(input.path(), "other.tab", "ENSMUSG1\tCd3e\n"));

    let err = build_dataset(config, out.path()).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::ExprError(crate::expr::ExprError::NoGenesMapped { .. })
    ));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_rebuild_replaces_bundle() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    build_dataset(full_config(input.path()), out.path()).unwrap();

    let mut config = full_config(input.path());
    config.markers.clear();
    config.coords.clear();
    let stats = build_dataset(config, out.path()).unwrap();
    assert_eq!(stats.sample_count, 2);

    let mut entries: Vec<String> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert!(entries.iter().all(|name| !name.starts_with(".cellpack-")));
    assert!(entries.contains(&"dataset.json".to_string()));
    assert!(Bundle::open(out.path()).unwrap().descriptor().coords.is_empty());
}
