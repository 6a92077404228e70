use std::path::PathBuf;
use std::time::Duration;

use dirstat::config::settings::AnalyzerSettings;
use dirstat::config::size::parse_size;
use dirstat::core::analyzer::{find_large_files, AnalyzeError, DiskAnalyzer};
use dirstat::core::filter::PathFilter;
use dirstat::core::inspector;
use dirstat::core::sink::ErrorSink;
use dirstat::export::csv::export_csv;
use dirstat::export::json::export_json;
use dirstat::models::entry::{EntryRecord, NO_EXTENSION};
use dirstat::models::stats::{human_readable_size, DirectoryStats};
use dirstat::models::summary::SummaryView;
use dirstat::web::cache::{CacheKey, ResponseCache};
use dirstat::web::charts;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a unique temporary directory for a test.
fn make_test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dirstat_test_{}", name));
    let _ = std::fs::remove_dir_all(&dir); // clean up from previous runs
    std::fs::create_dir_all(&dir).expect("create test dir");
    dir
}

/// Remove a temporary test directory.
fn cleanup(dir: &PathBuf) {
    let _ = std::fs::remove_dir_all(dir);
}

fn settings() -> AnalyzerSettings {
    AnalyzerSettings {
        max_concurrent_io: 4,
        ..AnalyzerSettings::default()
    }
}

/// Lay out the reference fixture:
/// file1.txt (23 B), dir1/file2.py (21 B), dir1/subdir1/file3.log (25 B),
/// dir2/file4.md (27 B).
fn make_fixture(name: &str) -> PathBuf {
    let dir = make_test_dir(name);
    std::fs::write(dir.join("file1.txt"), "a".repeat(23)).unwrap();
    std::fs::create_dir_all(dir.join("dir1/subdir1")).unwrap();
    std::fs::write(dir.join("dir1/file2.py"), "b".repeat(21)).unwrap();
    std::fs::write(dir.join("dir1/subdir1/file3.log"), "c".repeat(25)).unwrap();
    std::fs::create_dir_all(dir.join("dir2")).unwrap();
    std::fs::write(dir.join("dir2/file4.md"), "d".repeat(27)).unwrap();
    dir
}

/// Build a file record without touching the filesystem.
fn make_record(path: &str, size: u64) -> EntryRecord {
    let path = PathBuf::from(path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    EntryRecord {
        file_type: EntryRecord::type_tag(&name),
        name,
        size,
        is_dir: false,
        modified: None,
        permissions: "-rw-r--r--".to_string(),
        owner: "0".to_string(),
        group: "0".to_string(),
        md5: None,
        path,
    }
}

fn sort_children(stats: &mut DirectoryStats) {
    stats.children.sort_by(|a, b| a.path.cmp(&b.path));
    for child in &mut stats.children {
        sort_children(child);
    }
}

// ---------------------------------------------------------------------------
// 1. test_end_to_end_scenario – the reference fixture, full aggregation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_end_to_end_scenario() {
    let dir = make_fixture("end_to_end");

    let analyzer = DiskAnalyzer::new(AnalyzerSettings {
        min_size: 0,
        max_depth: 5,
        include_hidden: true,
        ..settings()
    })
    .unwrap();

    let stats = analyzer.analyze(&dir).await.expect("analyze should succeed");

    assert_eq!(stats.file_count, 4);
    assert_eq!(stats.dir_count, 3);
    assert_eq!(stats.total_size, 96);

    assert_eq!(stats.file_types.len(), 4);
    assert_eq!(stats.file_types[".txt"], 1);
    assert_eq!(stats.file_types[".py"], 1);
    assert_eq!(stats.file_types[".log"], 1);
    assert_eq!(stats.file_types[".md"], 1);

    let largest = stats.largest_file.as_ref().expect("largest file");
    assert!(largest.path.ends_with("file4.md"));
    assert_eq!(largest.size, 27);

    // Per-node totals
    let dir1 = stats
        .children
        .iter()
        .find(|c| c.path.ends_with("dir1"))
        .expect("dir1 node");
    assert_eq!(dir1.total_size, 46);
    assert_eq!(dir1.file_count, 2);
    assert_eq!(dir1.dir_count, 1);
    let subdir1 = &dir1.children[0];
    assert_eq!(subdir1.total_size, 25);
    assert_eq!(subdir1.largest_file.as_ref().unwrap().size, 25);

    // Every entry passing filters is counted, directories included.
    let summary = analyzer.summary(&stats);
    assert_eq!(summary.files_scanned, 7);
    assert!(summary.bytes_scanned >= 96);
    assert_eq!(summary.error_count, 0);
    assert!(analyzer.errors().is_empty());

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 2. test_size_invariant – total_size = direct files + child totals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_size_invariant() {
    let dir = make_fixture("size_invariant");

    let analyzer = DiskAnalyzer::new(AnalyzerSettings {
        include_hidden: true,
        ..settings()
    })
    .unwrap();
    let stats = analyzer.analyze(&dir).await.unwrap();

    fn check(node: &DirectoryStats) {
        let child_sizes: u64 = node.children.iter().map(|c| c.total_size).sum();
        let child_files: usize = node.children.iter().map(|c| c.file_count).sum();
        assert!(node.total_size >= child_sizes);
        assert!(node.file_count >= child_files);
        // Type counts line up with the cumulative file count.
        let typed: usize = node.file_types.values().sum();
        assert_eq!(typed, node.file_count);
        for child in &node.children {
            check(child);
        }
    }
    check(&stats);

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 3. test_depth_cap – capped directories are counted, not descended
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_depth_cap() {
    let dir = make_fixture("depth_cap");

    let analyzer = DiskAnalyzer::new(AnalyzerSettings {
        max_depth: 0,
        include_hidden: true,
        ..settings()
    })
    .unwrap();
    let stats = analyzer.analyze(&dir).await.unwrap();

    assert!(stats.children.is_empty());
    assert_eq!(stats.dir_count, 2); // dir1, dir2 found but not entered
    assert_eq!(stats.file_count, 1); // only file1.txt
    assert_eq!(stats.total_size, 23);
    assert!(!stats.file_types.contains_key(".py"));

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 4. test_hidden_exclusion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_hidden_exclusion() {
    let dir = make_test_dir("hidden");
    std::fs::write(dir.join("visible.txt"), "visible").unwrap();
    std::fs::write(dir.join(".secret"), "hidden").unwrap();

    let analyzer = DiskAnalyzer::new(settings()).unwrap();
    let stats = analyzer.analyze(&dir).await.unwrap();
    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.total_size, 7);

    let analyzer = DiskAnalyzer::new(AnalyzerSettings {
        include_hidden: true,
        ..settings()
    })
    .unwrap();
    let stats = analyzer.analyze(&dir).await.unwrap();
    assert_eq!(stats.file_count, 2);
    assert_eq!(stats.file_types[NO_EXTENSION], 1); // .secret has no suffix

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 5. test_pattern_exclusion – *.tmp never contributes anywhere
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_pattern_exclusion() {
    let dir = make_test_dir("patterns");
    std::fs::write(dir.join("data.txt"), "a".repeat(100)).unwrap();
    std::fs::write(dir.join("junk.tmp"), "b".repeat(5000)).unwrap();
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    std::fs::write(dir.join("nested/more.tmp"), "c".repeat(4000)).unwrap();

    let analyzer = DiskAnalyzer::new(AnalyzerSettings {
        exclude_patterns: vec!["*.tmp".to_string()],
        ..settings()
    })
    .unwrap();
    let stats = analyzer.analyze(&dir).await.unwrap();

    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.total_size, 100);
    assert!(!stats.file_types.contains_key(".tmp"));
    let largest = stats.largest_file.as_ref().unwrap();
    assert!(largest.path.ends_with("data.txt"));

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 6. test_min_size_filter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_min_size_filter() {
    let dir = make_test_dir("min_size");
    std::fs::write(dir.join("small.txt"), "a".repeat(10)).unwrap();
    std::fs::write(dir.join("big.txt"), "b".repeat(200)).unwrap();

    let analyzer = DiskAnalyzer::new(AnalyzerSettings {
        min_size: 100,
        ..settings()
    })
    .unwrap();
    let stats = analyzer.analyze(&dir).await.unwrap();

    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.total_size, 200);
    assert_eq!(analyzer.counters().files_scanned(), 1);
    assert_eq!(analyzer.counters().bytes_scanned(), 200);

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 7. test_largest_file_tie_break – strict > keeps the first-seen holder
// ---------------------------------------------------------------------------

#[test]
fn test_largest_file_tie_break() {
    let mut stats = DirectoryStats::new(PathBuf::from("/data"));
    stats.fold_file(make_record("/data/first.bin", 500));
    stats.fold_file(make_record("/data/second.bin", 500));

    let largest = stats.largest_file.as_ref().unwrap();
    assert_eq!(largest.path, PathBuf::from("/data/first.bin"));

    // A strictly larger file does replace the holder.
    stats.fold_file(make_record("/data/third.bin", 501));
    let largest = stats.largest_file.as_ref().unwrap();
    assert_eq!(largest.path, PathBuf::from("/data/third.bin"));
}

// ---------------------------------------------------------------------------
// 8. test_invalid_roots – NotFound and NotADirectory are fatal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_invalid_roots() {
    let analyzer = DiskAnalyzer::new(settings()).unwrap();
    let err = analyzer
        .analyze("/does/not/exist")
        .await
        .expect_err("missing root must fail");
    assert!(matches!(
        err.downcast_ref::<AnalyzeError>(),
        Some(AnalyzeError::NotFound(_))
    ));

    let dir = make_test_dir("not_a_dir");
    let file_path = dir.join("plain.txt");
    std::fs::write(&file_path, "data").unwrap();

    let analyzer = DiskAnalyzer::new(settings()).unwrap();
    let err = analyzer
        .analyze(&file_path)
        .await
        .expect_err("file root must fail");
    assert!(matches!(
        err.downcast_ref::<AnalyzeError>(),
        Some(AnalyzeError::NotADirectory(_))
    ));

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 9. test_idempotence – identical config + unchanged tree = identical result
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_idempotence() {
    let dir = make_fixture("idempotence");

    let first = DiskAnalyzer::new(settings())
        .unwrap()
        .analyze(&dir)
        .await
        .unwrap();
    let second = DiskAnalyzer::new(settings())
        .unwrap()
        .analyze(&dir)
        .await
        .unwrap();

    let mut first = first;
    let mut second = second;
    sort_children(&mut first);
    sort_children(&mut second);

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 10. test_path_filter – pure filter semantics
// ---------------------------------------------------------------------------

#[test]
fn test_path_filter() {
    let filter = PathFilter::new(false, &["*.tmp".to_string(), ".git".to_string()]).unwrap();
    assert!(filter.is_excluded(std::path::Path::new("/work/.hidden")));
    assert!(filter.is_excluded(std::path::Path::new("/work/cache.tmp")));
    assert!(filter.is_excluded(std::path::Path::new("/work/.git")));
    assert!(!filter.is_excluded(std::path::Path::new("/work/report.txt")));

    let filter = PathFilter::new(true, &[]).unwrap();
    assert!(!filter.is_excluded(std::path::Path::new("/work/.hidden")));

    assert!(PathFilter::new(false, &["[invalid".to_string()]).is_err());
}

// ---------------------------------------------------------------------------
// 11. test_type_tag
// ---------------------------------------------------------------------------

#[test]
fn test_type_tag() {
    assert_eq!(EntryRecord::type_tag("report.TXT"), ".txt");
    assert_eq!(EntryRecord::type_tag("archive.tar.gz"), ".gz");
    assert_eq!(EntryRecord::type_tag("README"), NO_EXTENSION);
    assert_eq!(EntryRecord::type_tag(".secret"), NO_EXTENSION);
    assert_eq!(EntryRecord::type_tag("trailing."), NO_EXTENSION);
}

// ---------------------------------------------------------------------------
// 12. test_parse_size
// ---------------------------------------------------------------------------

#[test]
fn test_parse_size() {
    assert_eq!(parse_size("0").unwrap(), 0);
    assert_eq!(parse_size("0B").unwrap(), 0);
    assert_eq!(parse_size("1024").unwrap(), 1024);
    assert_eq!(parse_size("1KB").unwrap(), 1024);
    assert_eq!(parse_size("1kb").unwrap(), 1024);
    assert_eq!(parse_size("2.5KB").unwrap(), 2560);
    assert_eq!(parse_size("1MB").unwrap(), 1024 * 1024);
    assert_eq!(parse_size("1.5MB").unwrap(), 1572864);
    assert_eq!(parse_size("1GB").unwrap(), 1024u64.pow(3));
    assert_eq!(parse_size("1TB").unwrap(), 1024u64.pow(4));
    assert_eq!(parse_size(" 500 KB ").unwrap(), 512000);

    assert!(parse_size("abc").is_err());
    assert!(parse_size("12XY").is_err());
    assert!(parse_size("MB").is_err());
}

// ---------------------------------------------------------------------------
// 13. test_human_readable_size
// ---------------------------------------------------------------------------

#[test]
fn test_human_readable_size() {
    assert_eq!(human_readable_size(0), "0 B");
    assert_eq!(human_readable_size(512), "512 B");
    assert_eq!(human_readable_size(1023), "1023 B");
    assert_eq!(human_readable_size(1024), "1.00 KB");
    assert_eq!(human_readable_size(1536), "1.50 KB");
    assert_eq!(human_readable_size(1024 * 1024), "1.00 MB");
    assert_eq!(human_readable_size(1024 * 1024 * 1024), "1.00 GB");
    assert_eq!(human_readable_size(1024u64 * 1024 * 1024 * 1024), "1.00 TB");
}

// ---------------------------------------------------------------------------
// 14. test_inspector – records, permissions, hashing
// ---------------------------------------------------------------------------

#[test]
fn test_inspector() {
    let dir = make_test_dir("inspector");
    let file_path = dir.join("hello.txt");
    std::fs::write(&file_path, "hello world").unwrap();

    let sink = ErrorSink::new();

    let record = inspector::inspect(&file_path, false, &sink).expect("record");
    assert_eq!(record.size, 11);
    assert!(!record.is_dir);
    assert_eq!(record.file_type, ".txt");
    assert_eq!(record.permissions.len(), 10);
    assert!(record.permissions.starts_with('-'));
    assert!(record.modified.is_some());
    assert!(record.md5.is_none());

    // Hashing enabled: streaming MD5 of the content.
    let record = inspector::inspect(&file_path, true, &sink).expect("record");
    assert_eq!(
        record.md5.as_deref(),
        Some("5eb63bbbe01eeed093cb22bb8f5acdc3")
    );

    // Directories are inspected but never hashed.
    let record = inspector::inspect(&dir, true, &sink).expect("record");
    assert!(record.is_dir);
    assert!(record.md5.is_none());
    assert!(record.permissions.starts_with('d'));

    // A missing path is recorded, not raised.
    assert!(inspector::inspect(&dir.join("gone.txt"), false, &sink).is_none());
    assert_eq!(sink.len(), 1);

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 15. test_find_large_files – one candidate per node, sorted descending
// ---------------------------------------------------------------------------

#[test]
fn test_find_large_files() {
    let mut sub = DirectoryStats::new(PathBuf::from("/data/sub"));
    sub.fold_file(make_record("/data/sub/huge.bin", 9000));
    sub.fold_file(make_record("/data/sub/also_huge.bin", 8000));

    let mut root = DirectoryStats::new(PathBuf::from("/data"));
    root.fold_file(make_record("/data/medium.bin", 5000));
    root.fold_file(make_record("/data/tiny.bin", 10));
    root.dir_count += 1;
    root.fold_child(sub);

    let found = find_large_files(&root, 4000);
    // Root surfaces its adopted largest (huge.bin), the child surfaces
    // huge.bin again; also_huge is shadowed by its sibling.
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].size, 9000);
    assert_eq!(found[1].size, 9000);
    assert!(!found.iter().any(|f| f.path.ends_with("also_huge.bin")));

    // Threshold above everything yields nothing.
    assert!(find_large_files(&root, 10_000).is_empty());
}

// ---------------------------------------------------------------------------
// 16. test_summary_projection
// ---------------------------------------------------------------------------

#[test]
fn test_summary_projection() {
    let mut root = DirectoryStats::new(PathBuf::from("/data"));
    root.fold_file(make_record("/data/a.txt", 2048));
    root.fold_file(make_record("/data/b.txt", 1024));
    root.fold_file(make_record("/data/c.log", 512));

    let summary = SummaryView::build(&root, 3, 3584, 2);
    assert_eq!(summary.total_size, 3584);
    assert_eq!(summary.total_size_human, "3.50 KB");
    assert_eq!(summary.file_count, 3);
    assert_eq!(summary.dir_count, 0);
    assert_eq!(summary.files_scanned, 3);
    assert_eq!(summary.error_count, 2);

    let largest = summary.largest_file.as_ref().unwrap();
    assert_eq!(largest.size, 2048);
    assert_eq!(largest.size_human, "2.00 KB");

    let top = summary.top_file_types(10);
    assert_eq!(top[0], (".txt".to_string(), 2));
    assert_eq!(top[1], (".log".to_string(), 1));
}

// ---------------------------------------------------------------------------
// 17. test_export_json – structure round-trips through serde
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_export_json() {
    let dir = make_fixture("export_json");

    let analyzer = DiskAnalyzer::new(settings()).unwrap();
    let stats = analyzer.analyze(&dir).await.unwrap();
    let summary = analyzer.summary(&stats);

    let out_path = dir.join("report.json");
    export_json(&stats, &summary, &out_path).expect("export should succeed");

    let json_bytes = std::fs::read(&out_path).expect("read exported file");
    let value: serde_json::Value = serde_json::from_slice(&json_bytes).expect("deserialize");

    assert_eq!(value["summary"]["file_count"], 4);
    assert_eq!(value["summary"]["total_size"], 96);
    assert!(value["timestamp"].is_string());
    assert_eq!(value["directory_tree"]["total_size"], 96);
    assert_eq!(
        value["directory_tree"]["children"]
            .as_array()
            .unwrap()
            .len(),
        2
    );

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 18. test_export_csv – one flattened row per directory node
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_export_csv() {
    let dir = make_fixture("export_csv");

    let analyzer = DiskAnalyzer::new(settings()).unwrap();
    let stats = analyzer.analyze(&dir).await.unwrap();

    let out_path = dir.join("report.csv");
    export_csv(&stats, &out_path).expect("export should succeed");

    let text = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Path,Size_Bytes,Size_Human,Files,Directories");
    // Header + root + dir1 + subdir1 + dir2
    assert_eq!(lines.len(), 5);
    assert!(lines[1].contains("96"));
    assert!(lines[1].ends_with("4,3"));

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 19. test_chart_shaping – tree/pie/treemap projections
// ---------------------------------------------------------------------------

#[test]
fn test_chart_shaping() {
    let mut small = DirectoryStats::new(PathBuf::from("/data/small"));
    small.fold_file(make_record("/data/small/s.txt", 100));
    let mut big = DirectoryStats::new(PathBuf::from("/data/big"));
    big.fold_file(make_record("/data/big/b.txt", 9000));

    let mut root = DirectoryStats::new(PathBuf::from("/data"));
    root.dir_count += 1;
    root.fold_child(small);
    root.dir_count += 1;
    root.fold_child(big);

    let tree = charts::tree_data(&root);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].size, 9100);
    // Children are ordered largest-first.
    assert_eq!(tree[0].children[0].name, "big");
    assert_eq!(tree[0].children[1].name, "small");

    let pie = charts::pie_chart_data(&root);
    assert_eq!(pie.values, vec![9000, 100]);
    assert_eq!(pie.colors.len(), 2);
    assert!(pie.labels[0].starts_with("big\n"));

    let treemap = charts::treemap_data(&root);
    assert_eq!(treemap.labels[0], "data");
    assert_eq!(treemap.parents[0], "");
    assert!(treemap.labels.contains(&"data/big".to_string()));
    assert_eq!(treemap.values.len(), 3);

    let large = charts::large_files_data(&root, 5000);
    assert_eq!(large.len(), 2); // root's adopted largest + big's own
    assert_eq!(large[0].name, "b.txt");
}

// ---------------------------------------------------------------------------
// 20. test_response_cache – keying and expiry
// ---------------------------------------------------------------------------

#[test]
fn test_response_cache() {
    let cache: ResponseCache<String> = ResponseCache::new(Duration::from_millis(50));
    let key = CacheKey {
        path: "/data".to_string(),
        min_size: 0,
        max_depth: 5,
        include_hidden: false,
    };

    assert!(cache.get(&key).is_none());
    cache.insert(key.clone(), "payload".to_string());
    assert_eq!(cache.get(&key).as_deref(), Some("payload"));

    // A different request shape misses.
    let other = CacheKey {
        max_depth: 3,
        ..key.clone()
    };
    assert!(cache.get(&other).is_none());

    // Entries expire after the TTL and are dropped on lookup.
    std::thread::sleep(Duration::from_millis(60));
    assert!(cache.get(&key).is_none());
    assert!(cache.is_empty());
}
