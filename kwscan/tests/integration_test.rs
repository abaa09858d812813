use anyhow::Result;
use kwscan::{
    scan, EncodingMode, KeywordSet, ScanConfig, ScanError, ScanMode, ThreadScanner,
};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

fn create_test_files(dir: &TempDir, files: &[(&str, &str)]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for (name, content) in files {
        let path = dir.path().join(name);
        let mut file = File::create(&path)?;
        write!(file, "{}", content)?;
        paths.push(path);
    }
    Ok(paths)
}

#[test]
fn test_end_to_end_example() -> Result<()> {
    let dir = tempdir()?;
    let files = create_test_files(&dir, &[("a.txt", "Python error here"), ("b.txt", "no match")])?;
    let keywords = KeywordSet::new(["python", "error"]);

    let result = ThreadScanner::new().scan(&files, &keywords, 2)?;

    assert_eq!(result.get("python"), Some(&files[..1]));
    assert_eq!(result.get("error"), Some(&files[..1]));
    assert!(result.pairs().iter().all(|(_, p)| p != &files[1]));
    Ok(())
}

#[test]
fn test_case_insensitive_both_sides() -> Result<()> {
    let dir = tempdir()?;
    let files = create_test_files(&dir, &[("log.txt", "FATAL ERROR")])?;
    let keywords = KeywordSet::new(["error", "Error"]);

    let result = ThreadScanner::new().scan(&files, &keywords, 1)?;

    assert_eq!(result.get("error"), Some(&files[..]));
    assert_eq!(result.get("Error"), Some(&files[..]));
    Ok(())
}

#[test]
fn test_missing_file_does_not_stop_run() -> Result<()> {
    let dir = tempdir()?;
    let mut files = create_test_files(
        &dir,
        &[("one.txt", "threading"), ("two.txt", "multiprocessing")],
    )?;
    files.insert(1, dir.path().join("does_not_exist.txt"));
    let keywords = KeywordSet::new(["threading", "multiprocessing"]);

    let result = ThreadScanner::new().scan(&files, &keywords, 3)?;

    assert_eq!(result.get("threading"), Some(&[files[0].clone()][..]));
    assert_eq!(result.get("multiprocessing"), Some(&[files[2].clone()][..]));
    assert_eq!(result.stats.files_scanned, 2);
    assert_eq!(result.stats.files_skipped, 1);
    Ok(())
}

#[test]
fn test_no_cross_keyword_leakage() -> Result<()> {
    let dir = tempdir()?;
    let files = create_test_files(&dir, &[("py.txt", "python only")])?;
    let keywords = KeywordSet::new(["python", "threading"]);

    let result = ThreadScanner::new().scan(&files, &keywords, 1)?;

    assert!(result.get("threading").is_none());
    assert_eq!(result.get("python"), Some(&files[..]));
    Ok(())
}

#[test]
fn test_results_independent_of_worker_count() -> Result<()> {
    let dir = tempdir()?;
    let contents: Vec<(String, String)> = (0..25)
        .map(|i| {
            let body = match i % 4 {
                0 => "python and threading",
                1 => "Multiprocessing ERROR",
                2 => "plain text",
                _ => "python Error",
            };
            (format!("file_{:02}.txt", i), body.to_string())
        })
        .collect();
    let refs: Vec<(&str, &str)> = contents
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    let files = create_test_files(&dir, &refs)?;
    let keywords = KeywordSet::new(["python", "threading", "multiprocessing", "Error"]);

    let baseline = ThreadScanner::new().scan(&files, &keywords, 1)?;
    for workers in [2, 3, 7, 25, 40] {
        let result = ThreadScanner::new().scan(&files, &keywords, workers)?;
        assert!(
            baseline.same_associations(&result),
            "worker count {} changed the associations",
            workers
        );
    }
    Ok(())
}

#[test]
fn test_lossy_encoding_scans_invalid_utf8() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("latin1.txt");
    std::fs::write(&path, b"r\xe9sum\xe9 with an error")?;
    let keywords = KeywordSet::new(["error"]);

    let strict = ThreadScanner::new().scan(&[path.clone()], &keywords, 1)?;
    assert!(strict.get("error").is_none());
    assert_eq!(strict.stats.files_skipped, 1);

    let lossy = ThreadScanner::new()
        .with_encoding(EncodingMode::Lossy)
        .scan(&[path.clone()], &keywords, 1)?;
    assert_eq!(lossy.get("error"), Some(&[path][..]));
    Ok(())
}

#[test]
fn test_config_driven_scan() -> Result<()> {
    let dir = tempdir()?;
    let files = create_test_files(&dir, &[("a.txt", "python"), ("b.txt", "ERROR")])?;

    let config = ScanConfig {
        files: files.clone(),
        keywords: vec!["python".to_string(), "error".to_string()],
        worker_count: 2,
        mode: ScanMode::Threads,
        ..ScanConfig::default()
    };

    let result = scan(&config)?;
    assert_eq!(result.get("python"), Some(&files[..1]));
    assert_eq!(result.get("error"), Some(&files[1..]));
    Ok(())
}

#[test]
fn test_zero_workers_is_invalid_argument() {
    let keywords = KeywordSet::new(["python"]);
    let result = ThreadScanner::new().scan(&[PathBuf::from("a.txt")], &keywords, 0);
    assert!(matches!(result, Err(ScanError::InvalidArgument(_))));
}

#[test]
fn test_empty_keyword_lists_every_readable_file() -> Result<()> {
    let dir = tempdir()?;
    let mut files = create_test_files(&dir, &[("a.txt", "python"), ("b.txt", "")])?;
    files.push(dir.path().join("missing.txt"));
    let keywords = KeywordSet::new(["python", ""]);

    let result = ThreadScanner::new().scan(&files, &keywords, 2)?;

    let mut everything = result.get("").unwrap_or_default().to_vec();
    everything.sort();
    assert_eq!(everything, files[..2]);
    assert_eq!(result.get("python"), Some(&files[..1]));
    assert_eq!(result.stats.files_skipped, 1);
    Ok(())
}
