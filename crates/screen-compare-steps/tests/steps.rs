//! End-to-end tests for the comparison steps.
//!
//! Screens are replayed from files and URL references are served by a
//! one-shot HTTP server on localhost.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::JoinHandle;

use image::{Rgb, RgbImage};

use screen_compare_steps::{
    ComparisonContext, FileScreenshot, HttpFetcher, ScratchDir, StepCommand, StepError,
};

// ─────────────────────── helpers ───────────────────────

const FAILURE_PREFIX: &str = "Error. The screen shot was different from the source file.";

const HOME_STEP: &str = r#"Then I compare the screen with "home.png""#;

const NOT_MATCH_MAP: &str = r#"the screen should not match with "map.png""#;

fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::DynamicImage::ImageRgb8(img.clone())
        .write_with_encoder(encoder)
        .unwrap();
    buf
}

/// 10x10 image whose first `changed` pixels (row-major) are white, the rest black.
fn partial(changed: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
    for i in 0..changed {
        img.put_pixel(i % 10, i / 10, Rgb([255, 255, 255]));
    }
    img
}

/// Scratch dir under a tempdir, with the device screen replayed from `screen`.
fn context(dir: &tempfile::TempDir, screen: &RgbImage) -> ComparisonContext {
    let scratch = ScratchDir::open(dir.path().join("screens")).unwrap();
    let screen_path = dir.path().join("device.png");
    screen.save(&screen_path).unwrap();
    ComparisonContext::new(
        scratch,
        Box::new(FileScreenshot::new(screen_path)),
        Box::new(HttpFetcher::new().unwrap()),
    )
}

fn save_reference(ctx: &ComparisonContext, name: &str, img: &RgbImage) {
    img.save(ctx.scratch().path_of(name)).unwrap();
}

fn scratch_entries(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root)
        .unwrap()
        .flatten()
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();
    names
}

/// Serve a single HTTP response on localhost and return its URL.
fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let header = format!(
            "HTTP/1.1 {status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(header.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();
    });
    (format!("http://{addr}/reference.png"), handle)
}

fn run(phrase: &str, ctx: &ComparisonContext) -> Result<i64, StepError> {
    StepCommand::parse(phrase)?.run(ctx).map(|o| o.difference)
}

// ═══════════════════════════════════════════════════════
// FILE REFERENCES
// ═══════════════════════════════════════════════════════

#[test]
fn test_exact_match_passes() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &partial(0));
    save_reference(&ctx, "home.png", &partial(0));

    let diff = run(HOME_STEP, &ctx).unwrap();
    assert_eq!(diff, 0);
    assert_eq!(scratch_entries(ctx.scratch().root()), vec!["home.png"]);
}

#[test]
fn test_exact_match_fails_with_percentage() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &partial(37));
    save_reference(&ctx, "home.png", &partial(0));

    let err = run(HOME_STEP, &ctx).unwrap_err();
    assert!(err.is_assertion());
    assert_eq!(err.to_string(), format!("{FAILURE_PREFIX} Difference: 37%"));
    assert_eq!(scratch_entries(ctx.scratch().root()), vec!["home.png"]);
}

#[test]
fn test_tolerance_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &partial(5));
    save_reference(&ctx, "map.png", &partial(0));

    let within = r#"I expect atmost "10" difference when comparing with "map.png""#;
    assert_eq!(run(within, &ctx).unwrap(), 5);

    let exact = r#"I expect atmost "5" difference when comparing with "map.png""#;
    assert_eq!(run(exact, &ctx).unwrap(), 5);

    let tight = r#"I expect atmost "4" difference when comparing with "map.png""#;
    let err = run(tight, &ctx).unwrap_err();
    assert_eq!(err.to_string(), format!("{FAILURE_PREFIX} Difference: 5%"));
}

#[test]
fn test_should_not_match() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &partial(100));
    save_reference(&ctx, "map.png", &partial(0));

    let diff = run(NOT_MATCH_MAP, &ctx).unwrap();
    assert_eq!(diff, 100);
}

#[test]
fn test_should_not_match_is_lenient_with_zero_tolerance() {
    // The negated step compares against a tolerance of 0, which no
    // difference falls below, so identical screens also pass.
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &partial(0));
    save_reference(&ctx, "map.png", &partial(0));

    assert_eq!(run(NOT_MATCH_MAP, &ctx).unwrap(), 0);
}

#[test]
fn test_size_mismatch_is_hard_failure() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &RgbImage::new(10, 9));
    save_reference(&ctx, "home.png", &partial(0));

    let err = run(HOME_STEP, &ctx).unwrap_err();
    assert!(!err.is_assertion());
    assert!(matches!(
        err,
        StepError::Diff(screen_compare::DiffError::DimensionMismatch { .. })
    ));
    assert_eq!(scratch_entries(ctx.scratch().root()), vec!["home.png"]);
}

#[test]
fn test_unknown_phrase() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &partial(0));
    let err = run("I swipe left", &ctx).unwrap_err();
    assert!(matches!(err, StepError::UnknownStep(_)));
    assert_eq!(err.exit_code(), 2);
}

// ═══════════════════════════════════════════════════════
// URL REFERENCES
// ═══════════════════════════════════════════════════════

#[test]
fn test_url_reference_matches_and_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &partial(0));
    let (url, server) = serve_once("200 OK", png_bytes(&partial(0)));

    let phrase = format!(r#"I compare the screen with url "{url}""#);
    let diff = run(&phrase, &ctx).unwrap();
    server.join().unwrap();

    assert_eq!(diff, 0);
    assert!(scratch_entries(ctx.scratch().root()).is_empty());
}

#[test]
fn test_url_reference_failure_still_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &partial(20));
    let (url, server) = serve_once("200 OK", png_bytes(&partial(0)));

    let phrase = format!(r#"I expect atmost "10" difference when comparing with url "{url}""#);
    let err = run(&phrase, &ctx).unwrap_err();
    server.join().unwrap();

    assert_eq!(err.to_string(), format!("{FAILURE_PREFIX} Difference: 20%"));
    assert!(scratch_entries(ctx.scratch().root()).is_empty());
}

#[test]
fn test_url_not_found_is_fetch_failure() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &partial(0));
    let (url, server) = serve_once("404 Not Found", Vec::new());

    let phrase = format!(r#"I compare the screen with url "{url}""#);
    let err = run(&phrase, &ctx).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, StepError::NetworkFetchFailure { .. }));
    assert!(scratch_entries(ctx.scratch().root()).is_empty());
}
