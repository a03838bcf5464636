use pdf_cover::*;
use proptest::prelude::*;

fn dimension() -> impl Strategy<Value = f32> {
    100.0f32..2000.0
}

fn fraction() -> impl Strategy<Value = f32> {
    0.0f32..=1.0
}

fn layout() -> impl Strategy<Value = Rect> {
    (0.0f32..300.0, 0.0f32..300.0, dimension(), dimension())
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    /// Property: a clamped overlay that fits never leaves the padded page
    #[test]
    fn clamp_keeps_fitting_overlay_inside(
        layout in layout(),
        w_frac in 0.01f32..0.9,
        h_frac in 0.01f32..0.9,
        px in -5000.0f32..5000.0,
        py in -5000.0f32..5000.0,
    ) {
        let padding = 20.0;
        let padded = layout.inset(padding);
        let size = Size::new(padded.width * w_frac, padded.height * h_frac);

        let point = clamp_to_background(Point::new(px, py), size, &layout, padding);
        let rect = Rect::from_origin_size(point, size);
        prop_assert!(padded.contains_rect(&rect, 1e-2));
    }

    /// Property: export-space placement expressed as target fractions does not
    /// depend on the target size
    #[test]
    fn export_space_is_scale_invariant(
        layout in layout(),
        fx in fraction(),
        fy in fraction(),
        target_w in dimension(),
        target_h in dimension(),
        factor in 0.25f32..8.0,
    ) {
        let view = ViewGeometry::new(Size::new(2400.0, 2400.0), layout);
        let point = Point::new(layout.x + fx * layout.width, layout.y + fy * layout.height);

        let small = Size::new(target_w, target_h);
        let large = small.scaled(factor);
        let a = to_export_space(point, &view, small);
        let b = to_export_space(point, &view, large);

        prop_assert!((a.x / small.width - b.x / large.width).abs() < 1e-4);
        prop_assert!((a.y / small.height - b.y / large.height).abs() < 1e-4);
    }

    /// Property: any sequence of gestures keeps the overlay inside the padded page
    #[test]
    fn gestures_respect_bounds(
        layout in layout(),
        iw in 50.0f32..1200.0,
        ih in 50.0f32..1600.0,
        moves in prop::collection::vec((-800.0f32..800.0, -800.0f32..800.0, 0.5f32..2.0), 1..12),
    ) {
        let limits = TransformLimits::default();
        let mut transform = OverlayTransform::placed(Size::new(iw, ih), limits, &layout);

        for (dx, dy, zoom) in moves {
            transform.drag_by(dx, dy, &layout);
            transform.zoom_by(zoom, &layout);

            prop_assert!(transform.scale() >= limits.min_scale - 1e-6);
            prop_assert!(transform.scale() <= limits.max_scale + 1e-6);

            let padded = layout.inset(limits.padding);
            let fits = transform.display_size().width <= padded.width
                && transform.display_size().height <= padded.height;
            if fits {
                prop_assert!(padded.contains_rect(&transform.rect(), 1e-2));
            }
        }
    }

    /// Property: resizing the layout and back returns to the same placement
    #[test]
    fn layout_change_round_trips(
        layout in layout(),
        factor in 0.5f32..3.0,
        fx in fraction(),
        fy in fraction(),
    ) {
        let limits = TransformLimits::default();
        let mut transform = OverlayTransform::placed(Size::new(300.0, 420.0), limits, &layout);
        transform.set_position(
            layout.x + fx * layout.width,
            layout.y + fy * layout.height,
            &layout,
        );
        let before = fractional_rect(
            &transform.rect().translated(-layout.x, -layout.y),
            layout.size(),
        );

        let resized = Rect::new(layout.x, layout.y, layout.width * factor, layout.height * factor);
        transform.on_layout_changed(&layout, &resized);
        let after = fractional_rect(
            &transform.rect().translated(-resized.x, -resized.y),
            resized.size(),
        );

        // Clamping and the scale limits may both move a placement that sat on a
        // boundary, so only check unclamped cases
        let unclamped = (transform.scale() - limits.min_scale).abs() > 1e-4
            && (transform.scale() - limits.max_scale).abs() > 1e-4;
        if unclamped && resized.inset(limits.padding).contains_rect(&transform.rect(), -1e-2) {
            prop_assert!((before.x - after.x).abs() < 1e-3);
            prop_assert!((before.y - after.y).abs() < 1e-3);
        }
    }
}
