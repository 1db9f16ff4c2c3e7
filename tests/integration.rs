use image_toolbox::{
    detect_regions, inpaint, load_image, process_directory, process_file, remove_text_watermark,
    remove_watermark, save_image, upscale, DetectionMode, Error, FillOptions, InpaintOptions,
    Operation, PixelBuffer, ProcessOptions, Region, UpscaleOptions, WatermarkOptions,
};

/// Diagonal gradient with a fixed alpha.
fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let v = u8::try_from((x + y) * 255 / (width + height - 2)).unwrap();
            buf.put_pixel(x, y, [v, v / 2, 255 - v, 255]);
        }
    }
    buf
}

#[test]
fn black_image_with_white_corner_is_fully_repaired() {
    let mut buf = PixelBuffer::filled(100, 100, [0, 0, 0, 255]).unwrap();
    for y in 80..100 {
        for x in 80..100 {
            buf.put_pixel(x, y, [255, 255, 255, 255]);
        }
    }

    let opts = InpaintOptions {
        radius: 8,
        iterations: 3,
        ..InpaintOptions::default()
    };
    inpaint(&mut buf, Region::new(80, 80, 20, 20), &opts).unwrap();

    for y in 80..100 {
        for x in 80..100 {
            assert_eq!(buf.pixel(x, y), [0, 0, 0, 255], "pixel ({x},{y})");
        }
    }
    assert_eq!(buf, PixelBuffer::filled(100, 100, [0, 0, 0, 255]).unwrap());
}

#[test]
fn remove_watermark_changes_only_regions_before_smoothing() {
    let src = gradient(80, 60);
    let opts = WatermarkOptions {
        fill: FillOptions {
            smooth: false,
            ..FillOptions::default()
        },
        ..WatermarkOptions::default()
    };
    let out = remove_watermark(src.clone(), &opts).unwrap();

    let bounds: Vec<_> = detect_regions(80, 60, DetectionMode::Generic)
        .iter()
        .filter_map(|r| r.clip(80, 60))
        .collect();
    assert_eq!(bounds.len(), 4);

    for y in 0..60 {
        for x in 0..80 {
            let inside = bounds
                .iter()
                .any(|b| b.contains(i64::from(x), i64::from(y)));
            if !inside {
                assert_eq!(out.pixel(x, y), src.pixel(x, y), "pixel ({x},{y})");
            }
        }
    }
}

#[test]
fn smoothing_pass_change_is_bounded_by_neighbourhood_spread() {
    let src = gradient(80, 60);
    let unsmoothed = remove_watermark(
        src.clone(),
        &WatermarkOptions {
            fill: FillOptions {
                smooth: false,
                ..FillOptions::default()
            },
            ..WatermarkOptions::default()
        },
    )
    .unwrap();
    let smoothed = remove_watermark(src, &WatermarkOptions::default()).unwrap();

    for y in 1..59 {
        for x in 1..79 {
            for c in 0..3 {
                let around: Vec<u8> = (y - 1..=y + 1)
                    .flat_map(|ny| (x - 1..=x + 1).map(move |nx| (nx, ny)))
                    .map(|(nx, ny)| unsmoothed.pixel(nx, ny)[c])
                    .collect();
                let lo = *around.iter().min().unwrap();
                let hi = *around.iter().max().unwrap();
                let v = smoothed.pixel(x, y)[c];
                assert!(
                    (lo..=hi).contains(&v),
                    "({x},{y}) ch {c}: {v} outside {lo}..={hi}"
                );
            }
        }
    }
}

#[test]
fn repeated_removal_stays_in_range_but_need_not_be_identical() {
    let src = gradient(64, 64);
    let once = remove_watermark(src, &WatermarkOptions::default()).unwrap();
    let twice = remove_watermark(once.clone(), &WatermarkOptions::default()).unwrap();

    assert_eq!(twice.dimensions(), once.dimensions());
    // Every output is a mean of inputs, so each channel stays within the
    // range it had after the first pass; alpha never moves.
    for c in 0..4 {
        let channel = |b: &PixelBuffer| {
            b.as_raw()
                .chunks_exact(4)
                .map(|px| px[c])
                .collect::<Vec<_>>()
        };
        let first = channel(&once);
        let lo = *first.iter().min().unwrap();
        let hi = *first.iter().max().unwrap();
        assert!(channel(&twice).iter().all(|v| (lo..=hi).contains(v)), "channel {c}");
    }
    for (a, b) in once
        .as_raw()
        .chunks_exact(4)
        .zip(twice.as_raw().chunks_exact(4))
    {
        assert_eq!(a[3], b[3]);
    }
}

#[test]
fn text_removal_repairs_top_band() {
    let mut buf = PixelBuffer::filled(100, 100, [40, 80, 120, 255]).unwrap();
    // "text" in the top-centre band
    for x in 35..65 {
        for y in 2..8 {
            buf.put_pixel(x, y, [255, 255, 255, 255]);
        }
    }
    let out = remove_text_watermark(buf.clone(), &FillOptions::default()).unwrap();
    assert_eq!(out.pixel(50, 5), [40, 80, 120, 255]);

    // The generic heuristic has no top band, so the mark survives there.
    let generic = remove_watermark(buf, &WatermarkOptions::default()).unwrap();
    assert_ne!(generic.pixel(50, 5), [40, 80, 120, 255]);
}

#[test]
fn repeated_runs_are_byte_identical() {
    // Non-uniform input so any scheduling-dependent write order would show.
    let src = gradient(97, 61);
    let run = || {
        let cleaned = remove_watermark(src.clone(), &WatermarkOptions::default()).unwrap();
        let text = remove_text_watermark(src.clone(), &FillOptions::default()).unwrap();
        let scaled = upscale(&cleaned, 2.5, &UpscaleOptions::default()).unwrap();
        (cleaned, text, scaled)
    };

    let first = run();
    for _ in 0..3 {
        assert_eq!(run(), first);
    }
}

#[test]
fn upscale_output_dimensions_follow_scale() {
    let buf = gradient(13, 7);
    for scale in [2.0, 4.0, 8.0, 1.5, 3.0] {
        let out = upscale(&buf, scale, &UpscaleOptions::default()).unwrap();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = ((13.0 * scale) as u32, (7.0 * scale) as u32);
        assert_eq!(out.dimensions(), expected, "scale {scale}");
    }
}

#[test]
fn upscale_uniform_image_with_post_filters_stays_uniform() {
    let color = [90, 140, 210, 255];
    let buf = PixelBuffer::filled(6, 5, color).unwrap();
    let out = upscale(&buf, 4.0, &UpscaleOptions::default()).unwrap();
    assert!(out.as_raw().chunks_exact(4).all(|px| px == color));
}

#[test]
fn two_by_two_upscale_keeps_corner_colours() {
    let mut buf = PixelBuffer::new(2, 2).unwrap();
    buf.put_pixel(0, 0, [255, 0, 0, 255]);
    buf.put_pixel(1, 0, [0, 255, 0, 255]);
    buf.put_pixel(0, 1, [0, 0, 255, 255]);
    buf.put_pixel(1, 1, [255, 255, 255, 255]);

    let out = upscale(&buf, 2.0, &UpscaleOptions::resample_only()).unwrap();
    assert_eq!(out.dimensions(), (4, 4));
    assert_eq!(out.pixel(0, 0), buf.pixel(0, 0));
    assert_eq!(out.pixel(3, 0), buf.pixel(1, 0));
    assert_eq!(out.pixel(0, 3), buf.pixel(0, 1));
    assert_eq!(out.pixel(3, 3), buf.pixel(1, 1));
}

#[test]
fn invalid_scale_is_reported() {
    let buf = gradient(4, 4);
    assert!(matches!(
        upscale(&buf, -1.0, &UpscaleOptions::default()),
        Err(Error::InvalidScale(_))
    ));
}

#[test]
fn process_file_round_trips_through_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("nested/out.png");
    save_image(gradient(20, 10), &input).unwrap();

    let opts = ProcessOptions {
        operation: Operation::Upscale(2.0),
        ..ProcessOptions::default()
    };
    let result = process_file(&input, &output, &opts);
    assert!(result.success, "{}", result.message);
    assert_eq!(result.output_size, Some((40, 20)));

    let reloaded = load_image(&output).unwrap();
    assert_eq!(reloaded.dimensions(), (40, 20));
}

#[test]
fn process_file_reports_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.png");
    std::fs::write(&input, b"not a png").unwrap();

    let result = process_file(&input, &dir.path().join("out.png"), &ProcessOptions::default());
    assert!(!result.success);
    assert!(result.message.contains("Failed to load"));

    assert!(matches!(load_image(&input), Err(Error::Decode(_))));
}

#[test]
fn process_directory_handles_each_supported_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    save_image(gradient(30, 30), &dir.path().join("a.png")).unwrap();
    save_image(gradient(40, 20), &dir.path().join("b.bmp")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();

    let results = process_directory(dir.path(), &out_dir, &ProcessOptions::default());
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.success));
    assert!(out_dir.join("a.png").exists());
    assert!(out_dir.join("b.bmp").exists());
}
