use super::*;

fn size(w: u32, h: u32) -> Size {
    Size::new(w, h).unwrap()
}

// --- Size ---

#[test]
fn size_rejects_zero_width() {
    assert!(Size::new(0, 10).is_none());
}

#[test]
fn size_rejects_zero_height() {
    assert!(Size::new(10, 0).is_none());
}

#[test]
fn size_accessors() {
    let s = size(1280, 720);
    assert_eq!(s.width(), 1280);
    assert_eq!(s.height(), 720);
}

#[test]
fn size_display() {
    assert_eq!(size(390, 844).to_string(), "390x844");
}

// --- FitMode ---

#[test]
fn fit_mode_defaults_to_cover() {
    assert_eq!(FitMode::default(), FitMode::Cover);
}

#[test]
fn fit_mode_parses_case_insensitively() {
    assert_eq!("Cover".parse::<FitMode>(), Ok(FitMode::Cover));
    assert_eq!(" contain ".parse::<FitMode>(), Ok(FitMode::Contain));
    assert_eq!("NONE".parse::<FitMode>(), Ok(FitMode::None));
}

#[test]
fn fit_mode_rejects_unknown() {
    let err = "stretch".parse::<FitMode>().unwrap_err();
    assert!(err.to_string().contains("stretch"));
}

#[test]
fn fit_mode_css_values() {
    assert_eq!(FitMode::Cover.css_value(), "cover");
    assert_eq!(FitMode::Contain.css_value(), "contain");
    assert_eq!(FitMode::None.css_value(), "none");
}

#[test]
fn fit_mode_serde_lowercase() {
    let json = serde_json::to_string(&FitMode::Contain).unwrap();
    assert_eq!(json, "\"contain\"");
    let back: FitMode = serde_json::from_str("\"none\"").unwrap();
    assert_eq!(back, FitMode::None);
}

// --- compute_cover_transform ---

#[test]
fn cover_landscape_feed_in_portrait_phone() {
    let t = compute_cover_transform(size(1280, 720), size(390, 844));
    assert_eq!(t, Transform { width: 1500, height: 844, left: -555, top: 0 });
}

#[test]
fn cover_same_aspect_is_exact_fit() {
    let t = compute_cover_transform(size(640, 480), size(320, 240));
    assert_eq!(t, Transform { width: 320, height: 240, left: 0, top: 0 });
}

#[test]
fn cover_portrait_feed_in_landscape_container() {
    let t = compute_cover_transform(size(720, 1280), size(1920, 1080));
    // scale = max(1920/720, 1080/1280) = 2.6667
    assert_eq!(t.width, 1920);
    assert_eq!(t.height, 3413);
    assert_eq!(t.left, 0);
    assert_eq!(t.top, -1167);
}

#[test]
fn cover_upscales_small_feed() {
    let t = compute_cover_transform(size(160, 120), size(800, 600));
    assert_eq!(t, Transform { width: 800, height: 600, left: 0, top: 0 });
}

#[test]
fn cover_never_underfills_and_centers() {
    let dims = [1_u32, 2, 3, 7, 120, 240, 390, 480, 720, 844, 1080, 1280, 1920, 4096];
    for &nw in &dims {
        for &nh in &dims {
            for &cw in &dims {
                for &ch in &dims {
                    let t = compute_cover_transform(size(nw, nh), size(cw, ch));
                    let ctx = format!("natural {nw}x{nh} container {cw}x{ch}: {t:?}");
                    assert!(t.width >= cw, "width underfills, {ctx}");
                    assert!(t.height >= ch, "height underfills, {ctx}");
                    assert!(t.left <= 0 && t.top <= 0, "negative offset, {ctx}");
                    let slack_x = i64::from(t.width) + 2 * t.left - i64::from(cw);
                    let slack_y = i64::from(t.height) + 2 * t.top - i64::from(ch);
                    assert!(slack_x.abs() <= 1, "off-center x, {ctx}");
                    assert!(slack_y.abs() <= 1, "off-center y, {ctx}");
                }
            }
        }
    }
}

#[test]
fn cover_is_deterministic() {
    let a = compute_cover_transform(size(1280, 720), size(390, 844));
    let b = compute_cover_transform(size(1280, 720), size(390, 844));
    assert_eq!(a, b);
}

// --- compute_contain_transform ---

#[test]
fn contain_landscape_feed_in_portrait_phone_letterboxes() {
    let t = compute_contain_transform(size(1280, 720), size(390, 844));
    // scale = min(390/1280, 844/720) = 0.3047; 720 * 0.3047 = 219.375
    assert_eq!(t.width, 390);
    assert_eq!(t.height, 219);
    assert_eq!(t.left, 0);
    assert_eq!(t.top, 313);
}

#[test]
fn contain_never_overflows() {
    let dims = [3_u32, 90, 390, 720, 844, 1280, 1920];
    for &nw in &dims {
        for &nh in &dims {
            for &cw in &dims {
                for &ch in &dims {
                    let t = compute_contain_transform(size(nw, nh), size(cw, ch));
                    assert!(t.width <= cw && t.height <= ch, "{nw}x{nh} in {cw}x{ch}: {t:?}");
                    assert!(t.left >= 0 && t.top >= 0, "{nw}x{nh} in {cw}x{ch}: {t:?}");
                }
            }
        }
    }
}

// --- compute_transform ---

#[test]
fn transform_dispatches_cover() {
    let natural = size(1280, 720);
    let container = size(390, 844);
    assert_eq!(
        compute_transform(FitMode::Cover, natural, container),
        compute_cover_transform(natural, container)
    );
}

#[test]
fn transform_dispatches_contain() {
    let natural = size(1280, 720);
    let container = size(390, 844);
    assert_eq!(
        compute_transform(FitMode::Contain, natural, container),
        compute_contain_transform(natural, container)
    );
}

#[test]
fn transform_none_keeps_natural_size_centered() {
    let t = compute_transform(FitMode::None, size(640, 480), size(390, 844));
    assert_eq!(t, Transform { width: 640, height: 480, left: -125, top: 182 });
}

#[test]
fn tiny_contain_never_collapses_to_zero() {
    let t = compute_contain_transform(size(10_000, 1), size(1, 1));
    assert_eq!(t.width, 1);
    assert_eq!(t.height, 1);
}

#[test]
fn odd_difference_rounds_away_from_zero() {
    assert_eq!(centering_offset(11, 8), 2);
    assert_eq!(centering_offset(8, 11), -2);
    assert_eq!(centering_offset(10, 8), 1);
    assert_eq!(centering_offset(8, 8), 0);
}
