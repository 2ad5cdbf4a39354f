#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

//! End-to-end marker generation: parameters in, raster out.

use image::Rgba;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tessera_core::config::{AspectRatio, Axis, Border, MarkerParams, MarkerRequest, PatternKind};
use tessera_core::layout::Layout;
use tessera_core::palette::Palette;
use tessera_core::test_utils::RecordingSurface;
use tessera_core::{generate, paint_marker, MarkerError, Rgb};

fn params(aspect: AspectRatio, pattern: PatternKind, dimension: u32) -> MarkerParams {
    MarkerParams::builder()
        .aspect_ratio(aspect)
        .pattern(pattern)
        .dimension(dimension)
        .build()
}

#[test]
fn test_same_seed_same_marker() {
    for &pattern in PatternKind::all() {
        let p = params(AspectRatio::FourThree, pattern, 320);
        let a = generate(&p, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let b = generate(&p, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let c = generate(&p, &mut ChaCha8Rng::seed_from_u64(43)).unwrap();
        assert_eq!(a.image(), b.image(), "{pattern}");
        assert_ne!(a.image(), c.image(), "{pattern}");
    }
}

#[test]
fn test_canvas_size_follows_aspect_and_axis() {
    let cases = [
        (AspectRatio::FourThree, Axis::Width, 800, (800, 600)),
        (AspectRatio::SixteenNine, Axis::Height, 720, (1280, 720)),
        (AspectRatio::Square, Axis::Height, 333, (333, 333)),
    ];
    for (aspect, axis, dimension, expected) in cases {
        let p = MarkerParams::builder()
            .aspect_ratio(aspect)
            .axis(axis)
            .dimension(dimension)
            .pattern(PatternKind::DotMatrix)
            .build();
        let marker = generate(&p, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!((marker.width(), marker.height()), expected);
    }
}

#[test]
fn test_mosaic_draw_counts_with_real_rng() {
    for (aspect, blocks, circles) in [
        (AspectRatio::FourThree, 8 * 6, 288),
        (AspectRatio::SixteenNine, 10 * 6, 360),
        (AspectRatio::Square, 6 * 6, 216),
    ] {
        let p = params(aspect, PatternKind::Mosaic, 1024);
        let layout = Layout::new(p.aspect_ratio, p.axis, p.dimension).unwrap();
        let palette = Palette::from_bases(&p.colors);
        let mut surface = RecordingSurface::new(layout.width, layout.height);
        paint_marker(
            &p,
            &layout,
            &palette,
            &mut surface,
            &mut ChaCha8Rng::seed_from_u64(9),
        );
        assert_eq!(surface.triangle_count(), 8 * blocks, "{aspect}");
        assert_eq!(surface.ellipse_count(), circles, "{aspect}");
        assert_eq!(surface.rect_count(), 1, "{aspect}");
        assert_eq!(surface.stroke_count(), 0, "{aspect}");
    }
}

#[test]
fn test_dot_matrix_uses_only_palette_colors() {
    let p = params(AspectRatio::SixteenNine, PatternKind::DotMatrix, 640);
    let marker = generate(&p, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
    let layout = Layout::new(p.aspect_ratio, p.axis, p.dimension).unwrap();
    let (ix, iy) = (layout.increment_x(), layout.increment_y());
    for i in 0..layout.columns {
        for j in 0..layout.rows {
            let x = (f64::from(i) * ix + ix / 2.0) as u32;
            let y = (f64::from(j) * iy + iy / 2.0) as u32;
            let Rgba([r, g, b, _]) = *marker.image().get_pixel(x, y);
            assert!(marker.palette().contains(Rgb::new(r, g, b)), "cell ({i}, {j})");
        }
    }
}

#[test]
fn test_border_frames_every_pattern() {
    for &pattern in PatternKind::all() {
        let p = MarkerParams::builder()
            .aspect_ratio(AspectRatio::FourThree)
            .dimension(800)
            .pattern(pattern)
            .border(Border::Black)
            .build();
        let marker = generate(&p, &mut ChaCha8Rng::seed_from_u64(77)).unwrap();
        let img = marker.image();
        let black = Rgba([0, 0, 0, 255]);
        // Line width is 0.07 * 600 = 42.
        for &(x, y) in &[(0, 0), (41, 300), (400, 41), (758, 300), (799, 599), (400, 558)] {
            assert_eq!(*img.get_pixel(x, y), black, "{pattern} at ({x}, {y})");
        }
    }
}

#[test]
fn test_request_validation_precedes_drawing() {
    let bad_color = MarkerRequest {
        colors: ["#ff0000", "#00ff00", "blue"],
        ..MarkerRequest::default()
    };
    assert!(matches!(bad_color.validate(), Err(MarkerError::InvalidColor(_))));

    let bad_aspect = MarkerRequest {
        aspect_ratio: "21:9",
        ..MarkerRequest::default()
    };
    assert!(matches!(
        bad_aspect.validate(),
        Err(MarkerError::UnsupportedAspectRatio(_))
    ));

    let bad_pattern = MarkerRequest {
        pattern: Some("stripes"),
        ..MarkerRequest::default()
    };
    assert!(matches!(
        bad_pattern.validate(),
        Err(MarkerError::UnsupportedPatternKind(_))
    ));

    let bad_border = MarkerRequest {
        border: "gold",
        ..MarkerRequest::default()
    };
    assert!(matches!(
        bad_border.validate(),
        Err(MarkerError::UnsupportedBorder(_))
    ));
}

#[test]
fn test_request_round_trip_to_marker() {
    let request = MarkerRequest {
        aspect_ratio: "16:9",
        axis: "height",
        dimension: 180,
        pattern: Some("chaos"),
        background: "#123",
        border: "white",
        colors: ["#AA3311", "#22bb44", "#4455cc"],
    };
    let p = request.validate().unwrap();
    assert_eq!(p.background, Rgb::new(0x11, 0x22, 0x33));
    let marker = generate(&p, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    assert_eq!((marker.width(), marker.height()), (320, 180));
    assert_eq!(marker.palette().len(), 15);
    assert_eq!(*marker.image().get_pixel(0, 0), Rgba([255, 255, 255, 255]));
}
