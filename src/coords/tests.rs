use std::io::Cursor;

use super::*;
use proptest::prelude::*;
use tempfile::tempdir;

fn raw(points: &[(&str, f64, f64)]) -> RawCoords {
    let text: String = std::iter::once("cellId\tx\ty\n".to_string())
        .chain(points.iter().map(|(id, x, y)| format!("{}\t{}\t{}\n", id, x, y)))
        .collect();
    read_coords_from_reader(Cursor::new(text), b'\t', "test").unwrap()
}

fn names(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_parse_tracks_extrema() {
    let coords = raw(&[("a", -1.5, 2.0), ("b", 3.0, -4.0), ("c", 0.0, 0.0)]);
    assert_eq!(coords.points.len(), 3);
    assert_eq!(
        coords.bounds,
        Bounds {
            min_x: -1.5,
            max_x: 3.0,
            min_y: -4.0,
            max_y: 2.0
        }
    );
}

#[test]
fn test_parse_errors() {
    let err = read_coords_from_reader(Cursor::new("id\tx\ty\na\t1\n"), b'\t', "t.tsv").unwrap_err();
    assert!(matches!(err, CoordError::ColumnCount { line: 2, found: 2, .. }));

    let err = read_coords_from_reader(Cursor::new("id\tx\ty\na\t1\tfoo\n"), b'\t', "t.tsv").unwrap_err();
    assert!(matches!(err, CoordError::InvalidNumber { line: 2, .. }));

    let err = read_coords_from_reader(Cursor::new("id\tx\ty\n"), b'\t', "t.tsv").unwrap_err();
    assert!(matches!(err, CoordError::Empty(_)));
}

#[test]
fn test_scaled_extremes_and_flip() {
    let coords = raw(&[("lo", 10.0, -5.0), ("mid", 15.0, 0.0), ("hi", 20.0, 5.0)]);

    let set = quantize(
        &coords,
        CoordOptions {
            use_two_bytes: true,
            flip_y: false,
        },
    );
    assert_eq!(set.encoding, CoordEncoding::Uint16);
    assert_eq!(set.coords["lo"], (0.0, 0.0));
    assert_eq!(set.coords["mid"], (32768.0, 32768.0));
    assert_eq!(set.coords["hi"], (65535.0, 65535.0));

    let flipped = quantize(
        &coords,
        CoordOptions {
            use_two_bytes: true,
            flip_y: true,
        },
    );
    assert_eq!(flipped.coords["lo"], (0.0, 65535.0));
    assert_eq!(flipped.coords["hi"], (65535.0, 0.0));
}

#[test]
fn test_raw_flip_uses_max_y() {
    let coords = raw(&[("a", 1.0, 2.0), ("b", 3.0, 7.0)]);
    let set = quantize(
        &coords,
        CoordOptions {
            use_two_bytes: false,
            flip_y: true,
        },
    );
    assert_eq!(set.encoding, CoordEncoding::Float32);
    assert_eq!(set.coords["a"], (1.0, 5.0));
    assert_eq!(set.coords["b"], (3.0, 0.0));
}

#[test]
fn test_zero_span_axis() {
    let coords = raw(&[("a", 1.0, 4.0), ("b", 2.0, 4.0)]);
    let set = quantize(
        &coords,
        CoordOptions {
            use_two_bytes: true,
            flip_y: false,
        },
    );
    assert_eq!(set.coords["a"], (0.0, 0.0));
    assert_eq!(set.coords["b"], (65535.0, 0.0));
}

#[test]
fn test_write_in_sample_order_with_missing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("coords.bin");
    let coords = raw(&[("b", 0.0, 0.0), ("a", 10.0, 10.0)]);
    let set = quantize(
        &coords,
        CoordOptions {
            use_two_bytes: true,
            flip_y: false,
        },
    );

    let written = write_coords(&set, &names(&["a", "b", "ghost"]), &path).unwrap();
    assert_eq!(written.missing, 1);
    assert_eq!(written.xs, vec![65535.0, 0.0, 0.0]);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 3 * 4);
    assert_eq!(&bytes[..4], &[0xff, 0xff, 0xff, 0xff]);
    assert_eq!(&bytes[4..], &[0; 8]);

    assert_eq!(written.stats.max_x, 65535.0);
    assert_eq!(written.stats.min_y, 0.0);
    let json = serde_json::to_value(written.stats).unwrap();
    assert_eq!(json["type"], "Uint16");
    assert_eq!(json["maxX"], 65535.0);
}

#[test]
fn test_float_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("coords.bin");
    let coords = raw(&[("a", 1.5, -2.25)]);
    let set = quantize(&coords, CoordOptions::default());
    let written = write_coords(&set, &names(&["a"]), &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], &1.5f32.to_le_bytes());
    assert_eq!(&bytes[4..], &(-2.25f32).to_le_bytes());
    assert_eq!(written.stats.encoding, CoordEncoding::Float32);
}

#[test]
fn test_cluster_midpoints() {
    // cluster A: three points near the origin plus one far outlier
    let xs = vec![0.0, 1.0, 0.0, 100.0, 50.0];
    let ys = vec![0.0, 0.0, 1.0, 100.0, 50.0];
    let labels = names(&["A", "A", "A", "A", "B"]);

    let mids = cluster_midpoints(&xs, &ys, &labels).unwrap();
    assert_eq!(mids.len(), 2);
    assert_eq!(mids[0].label, "A");
    // 70% of 4 points keeps the 2 closest to the centroid (25.25, 25.25)
    assert!(mids[0].x < 1.0 && mids[0].y < 1.0);
    assert_eq!((mids[1].x, mids[1].y), (50.0, 50.0));

    let json = serde_json::to_string(&mids[1]).unwrap();
    assert_eq!(json, r#"[50.0,50.0,"B"]"#);
}

#[test]
fn test_label_count_mismatch() {
    let err = cluster_midpoints(&[0.0], &[0.0], &names(&["a", "b"])).unwrap_err();
    assert!(matches!(err, CoordError::LabelCount { labels: 2, points: 1 }));
}

proptest! {
    /// Quantized coordinates stay in range and hit both ends of each axis
    #[test]
    fn test_quantized_range(points in prop::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 2..60)) {
        let text: String = std::iter::once("id\tx\ty\n".to_string())
            .chain(points.iter().enumerate().map(|(i, (x, y))| format!("s{}\t{}\t{}\n", i, x, y)))
            .collect();
        let coords = read_coords_from_reader(Cursor::new(text), b'\t', "p").unwrap();
        let set = quantize(&coords, CoordOptions { use_two_bytes: true, flip_y: false });

        for &(x, y) in set.coords.values() {
            prop_assert!((0.0..=65535.0).contains(&x));
            prop_assert!((0.0..=65535.0).contains(&y));
            prop_assert_eq!(x.fract(), 0.0);
        }
        let b = coords.bounds;
        if b.max_x > b.min_x {
            prop_assert!(set.coords.values().any(|p| p.0 == 0.0));
            prop_assert!(set.coords.values().any(|p| p.0 == 65535.0));
        }
    }
}
