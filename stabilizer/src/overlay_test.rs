use super::*;

#[test]
fn default_frame_matches_design() {
    let frame = ScannerFrame::default();
    assert_eq!(frame.size_px, 280);
    assert_eq!(frame.corner_px, 32);
    assert_eq!(frame.accent, "#00ffcc");
    assert!((frame.scan_period_secs - 2.5).abs() < f64::EPSILON);
}

#[test]
fn stylesheet_sizes_frame_and_corners() {
    let css = ScannerFrame::default().stylesheet();
    assert!(css.contains("width: 280px; height: 280px;"));
    assert!(css.contains("width: 32px; height: 32px;"));
    assert!(css.contains("border: 4px solid #00ffcc;"));
}

#[test]
fn stylesheet_animates_scan_line() {
    let css = ScannerFrame::default().stylesheet();
    assert!(css.contains("animation: scan 2.5s linear infinite;"));
    assert!(css.contains("@keyframes scan"));
}

#[test]
fn stylesheet_hides_frame_until_revealed() {
    let css = ScannerFrame::default().stylesheet();
    assert!(css.contains(r#".scanner-frame[data-state="hidden"] { opacity: 0; pointer-events: none; }"#));
}

#[test]
fn stylesheet_follows_custom_accent() {
    let frame = ScannerFrame { accent: "#ff0066".to_owned(), ..ScannerFrame::default() };
    let css = frame.stylesheet();
    assert!(css.contains("transparent, #ff0066, transparent"));
    assert!(!css.contains("#00ffcc"));
}

#[test]
fn markup_has_four_corners_and_scan_line() {
    let html = ScannerFrame::default().markup();
    for corner in CORNERS {
        assert!(html.contains(&format!(r#"class="corner {corner}""#)), "missing corner {corner}");
    }
    assert!(html.contains(r#"<div class="scan-line"></div>"#));
}

#[test]
fn markup_starts_hidden() {
    let html = ScannerFrame::default().markup();
    assert!(html.starts_with(r#"<div class="scanner-frame" data-state="hidden">"#));
}

#[test]
fn frame_deserializes_partial_json() {
    let frame: ScannerFrame = serde_json::from_str(r#"{"sizePx":320}"#).unwrap();
    assert_eq!(frame.size_px, 320);
    assert_eq!(frame.corner_px, 32);
}
