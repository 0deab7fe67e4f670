//! End-to-end tests for the enrichment pipeline and the analytics that read
//! its output, using scratch files under a temp directory.

use std::fs;
use std::path::Path;

use reelstat_engine::{
    analyze_metric, read_table, run_pipeline, AccountFilter, Category, EngineError, Thresholds,
};

const HEADER: &str =
    "ownerUsername,timestamp,videoPlayCount,likesCount,commentsCount,videoDuration,caption,url,videoUrl";

fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut body = String::from(HEADER);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    fs::write(&path, body).expect("write fixture");
    path
}

fn numbers(column: Vec<&str>) -> Vec<f64> {
    column
        .iter()
        .map(|c| c.parse().expect("z is numeric"))
        .collect()
}

#[test]
fn three_reel_account_is_scored_and_labelled() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_csv(
        dir.path(),
        "reels.csv",
        &[
            "A,2025-01-01T10:00:00.000Z,100,10,1,15,first,https://x/1,https://v/1",
            "A,2025-01-02T10:00:00.000Z,100,20,2,15,second,https://x/2,https://v/2",
            "A,2025-01-03T10:00:00.000Z,100,30,3,15,third,https://x/3,https://v/3",
        ],
    );
    let output = dir.path().join("described_data.csv");

    let summary = run_pipeline(&input, &output).expect("pipeline should succeed");
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.accounts, 1);

    let out = read_table(&output).expect("read output");
    assert_eq!(
        numbers(out.column("zLikesCount").expect("z likes")),
        vec![-1.0, 0.0, 1.0]
    );
    assert_eq!(
        out.column("markLikesCount").expect("mark likes"),
        vec!["average", "average", "successful"]
    );

    // Rates land a rounding step either side of the strict 1.0 bound, and
    // each label follows the z-score that was actually written.
    let z_engagement = numbers(out.column("zEngagementRate").expect("z engagement"));
    assert!((z_engagement[0] + 1.0).abs() < 1e-9);
    assert!((z_engagement[2] - 1.0).abs() < 1e-9);
    for metric in ["EngagementRate", "CommentRate", "LikeRate", "CommentsCount"] {
        let z = numbers(out.column(&format!("z{metric}")).expect("z column"));
        let marks = out.column(&format!("mark{metric}")).expect("mark column");
        for (z, mark) in z.iter().zip(marks) {
            assert_eq!(Category::from_zscore(Some(*z)).label(), mark, "{metric} z={z}");
        }
    }
    assert_eq!(
        out.column("markEngagementRate").expect("mark engagement"),
        vec!["average", "average", "very successful"]
    );
    assert_eq!(
        out.column("markCommentRate").expect("mark comments"),
        vec!["average", "average", "successful"]
    );

    // Constant plays within the account: undefined, never zero.
    assert_eq!(out.column("zVideoPlayCount").expect("z plays"), vec!["", "", ""]);
    assert_eq!(
        out.column("markVideoPlayCount").expect("mark plays"),
        vec!["no data", "no data", "no data"]
    );
    assert_eq!(out.cell(0, "timestamp"), Some("2025-01-01 10:00:00"));
    assert_eq!(out.cell(2, "caption"), Some("third"));
}

#[test]
fn single_reel_account_gets_no_data_everywhere() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_csv(
        dir.path(),
        "reels.csv",
        &["B,2025-01-01,500,50,5,30,solo,https://x/1,https://v/1"],
    );
    let output = dir.path().join("out.csv");

    run_pipeline(&input, &output).expect("pipeline should succeed");
    let out = read_table(&output).expect("read output");

    for header in out.headers() {
        if let Some(rest) = header.strip_prefix("mark") {
            assert!(!rest.is_empty());
            assert_eq!(out.cell(0, header), Some("no data"), "{header}");
        }
        if header.starts_with('z') {
            assert_eq!(out.cell(0, header), Some(""), "{header}");
        }
    }
}

#[test]
fn rerunning_on_enriched_output_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_csv(
        dir.path(),
        "reels.csv",
        &[
            "a,2025-01-01 08:00:00,1200,40,3,20,one,u1,v1",
            "a,2025-01-02 08:00:00,300,7,0,45,two,u2,v2",
            "a,2025-01-03 08:00:00,0,0,0,12,three,u3,v3",
            "b,2025-01-01 09:00:00,90000,1500,80,60,four,u4,v4",
            "b,2025-01-05 09:00:00,45000,900,31,33,five,u5,v5",
            "c,2025-02-01 09:00:00,10,1,,7,six,u6,v6",
        ],
    );
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    run_pipeline(&input, &first).expect("first run");
    run_pipeline(&first, &second).expect("second run");

    let a = fs::read(&first).expect("read first");
    let b = fs::read(&second).expect("read second");
    assert_eq!(a, b);
}

#[test]
fn in_place_run_overwrites_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_csv(
        dir.path(),
        "reels.csv",
        &["a,2025-01-01,10,1,1,5,x,u,v", "a,2025-01-02,20,2,1,5,y,u,v"],
    );

    run_pipeline(&path, &path).expect("in-place run");
    let out = read_table(&path).expect("read back");
    assert!(out.has_column("performanceScore"));
    assert_eq!(out.len(), 2);
}

#[test]
fn zero_views_yield_finite_rates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_csv(
        dir.path(),
        "reels.csv",
        &["a,2025-01-01,0,5,2,10,x,u,v", "a,2025-01-02,0,0,0,10,y,u,v"],
    );
    let output = dir.path().join("out.csv");

    run_pipeline(&input, &output).expect("pipeline should succeed");
    let out = read_table(&output).expect("read output");
    for column in [
        "engagementRate",
        "commentRate",
        "likeRate",
        "likeCommentRate",
        "viralityIndex",
        "performanceScore",
    ] {
        for cell in out.column(column).expect("derived column") {
            let v: f64 = cell.parse().expect("derived value is numeric");
            assert!(v.is_finite(), "{column} = {cell}");
        }
    }
    assert_eq!(out.cell(0, "engagementRate"), Some("7"));
}

#[test]
fn missing_column_fails_without_writing_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("reels.csv");
    fs::write(&input, "ownerUsername,timestamp\na,2025-01-01\n").expect("write fixture");
    let output = dir.path().join("out.csv");

    let err = run_pipeline(&input, &output).unwrap_err();
    assert!(matches!(err, EngineError::MissingColumn { .. }));
    assert!(err.to_string().contains("videoPlayCount"));
    assert!(!output.exists());
}

#[test]
fn header_only_input_produces_header_only_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_csv(dir.path(), "reels.csv", &[]);
    let output = dir.path().join("out.csv");

    let summary = run_pipeline(&input, &output).expect("pipeline should succeed");
    assert_eq!(summary.rows, 0);

    let out = read_table(&output).expect("read output");
    assert!(out.is_empty());
    assert!(out.has_column("markPerformanceScore"));
}

#[test]
fn empty_json_export_produces_header_only_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("dataset.json");
    fs::write(&input, "[]").expect("write fixture");
    let output = dir.path().join("out.csv");

    let summary = run_pipeline(&input, &output).expect("pipeline should succeed");
    assert_eq!(summary.rows, 0);

    let out = read_table(&output).expect("read output");
    assert!(out.is_empty());
    assert!(out.has_column("ownerUsername"));
    assert!(out.has_column("accountName"));
    assert!(out.has_column("markPerformanceScore"));
}

#[test]
fn unwritable_output_dir_is_write_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_csv(dir.path(), "reels.csv", &["a,2025-01-01,10,1,1,5,x,u,v"]);
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "plain file").expect("write blocker");
    let output = blocker.join("out.csv");

    let err = run_pipeline(&input, &output).unwrap_err();
    match err {
        EngineError::Write { ref path, .. } => assert!(path.ends_with("out.csv"), "{path}"),
        other => panic!("expected write error, got {other:?}"),
    }
    assert_eq!(fs::read(&blocker).expect("read blocker"), b"plain file");
}

#[test]
fn failed_replace_leaves_existing_output_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_csv(dir.path(), "reels.csv", &["a,2025-01-01,10,1,1,5,x,u,v"]);
    // A non-empty directory at the output path cannot be replaced by a file.
    let output = dir.path().join("out.csv");
    fs::create_dir(&output).expect("create output dir");
    let kept = output.join("previous.csv");
    fs::write(&kept, "old,bytes\n").expect("write previous");

    let err = run_pipeline(&input, &output).unwrap_err();
    match err {
        EngineError::Write { ref path, .. } => {
            assert_eq!(path, &output.display().to_string());
        }
        other => panic!("expected write error, got {other:?}"),
    }
    assert_eq!(fs::read(&kept).expect("read previous"), b"old,bytes\n");

    // The temp file is cleaned up, so only the input and the output dir remain.
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .expect("list dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["out.csv".to_string(), "reels.csv".to_string()]);
}

#[test]
fn zero_byte_input_is_empty_input_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("reels.csv");
    fs::write(&input, "").expect("write fixture");

    let err = run_pipeline(&input, &dir.path().join("out.csv")).unwrap_err();
    assert!(matches!(err, EngineError::EmptyInput { .. }));
}

#[test]
fn json_export_is_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("dataset.json");
    let body = serde_json::json!([
        {
            "ownerUsername": "a",
            "timestamp": "2025-01-01T00:00:00.000Z",
            "videoPlayCount": 100,
            "likesCount": 10,
            "commentsCount": 1,
            "videoDuration": 12.5,
            "caption": "hello",
            "url": "u1",
            "videoUrl": "v1",
            "hashtags": ["x", "y"]
        },
        {
            "ownerUsername": "a",
            "timestamp": "2025-01-02T00:00:00.000Z",
            "videoPlayCount": 300,
            "likesCount": 30,
            "commentsCount": null,
            "videoDuration": 20,
            "caption": "world",
            "url": "u2",
            "videoUrl": "v2"
        }
    ]);
    fs::write(&input, body.to_string()).expect("write fixture");
    let output = dir.path().join("out.csv");

    run_pipeline(&input, &output).expect("pipeline should succeed");
    let out = read_table(&output).expect("read output");
    assert_eq!(out.len(), 2);
    assert_eq!(out.cell(0, "hashtags"), Some(r#"["x","y"]"#));
    assert_eq!(out.cell(1, "commentsCount"), Some(""));
    assert_eq!(out.cell(1, "markCommentsCount"), Some("no data"));
}

#[test]
fn bucket_sums_cover_the_column_total() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rows: Vec<String> = (1..=40)
        .map(|i| format!("acct,2025-01-01,{},{},1,10,c,u{i},v{i}", i * 100, i * i))
        .collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let input = write_csv(dir.path(), "reels.csv", &refs);
    let output = dir.path().join("out.csv");

    run_pipeline(&input, &output).expect("pipeline should succeed");
    let table = read_table(&output).expect("read output");
    let report = analyze_metric(
        &table,
        "likesCount",
        &AccountFilter::accounts(["acct"]),
        &Thresholds::default(),
    )
    .expect("analyze");

    let summary = report.summary.expect("summary");
    let covered: f64 = summary.buckets.iter().map(|b| b.sum).sum();
    assert!(covered >= summary.sum - 1e-6);
    assert_eq!(report.rows, 40);
    assert!(report.totals.views > 0.0);
}
