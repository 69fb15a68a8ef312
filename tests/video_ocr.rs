use frame_ocr::core::ocr::{EngineCall, Script, ScriptedEngine, CONFIDENCE_KEY, TEXT_KEY};
use frame_ocr::{OcrError, Plane, PixelFormat, Region, VideoFrame, VideoOcr};

fn yuv_frame(width: u32, height: u32, frame_number: u64) -> VideoFrame {
    let chroma = (width as usize).div_ceil(2) * (height as usize).div_ceil(2);
    VideoFrame::yuv420p(
        width,
        height,
        vec![16u8; (width * height) as usize],
        vec![128u8; chroma],
        vec![128u8; chroma],
        frame_number * 40,
        frame_number,
    )
    .unwrap()
}

#[test]
fn subtitle_band_end_to_end() {
    let engine = ScriptedEngine::with_scripts(vec![
        Script::text("HELLO", &[91, 88]),
        Script::text("", &[]),
        Script::Fail("timeout".into()),
        Script::text("WORLD", &[77]),
    ]);
    let log = engine.call_log();

    let mut ocr = VideoOcr::create("language=eng:y=400:h=80", Box::new(engine)).unwrap();
    let frames = (0..4).map(|n| yuv_frame(640, 480, n)).collect();
    let results = ocr.process_batch(frames).unwrap();

    let texts: Vec<_> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["HELLO", "", "", "WORLD"]);
    assert_eq!(results[0].confidences, vec![91, 88]);
    assert!(results[2].confidences.is_empty());
    assert_eq!(results[3].timestamp_ms, 120);

    let stats = ocr.finish().unwrap();
    assert_eq!(stats.processed_frames, 4);
    assert_eq!(stats.frames_with_text, 2);

    let regions: Vec<_> = log
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            EngineCall::RecognizeRect { region, stride, .. } => Some((region, stride)),
            _ => None,
        })
        .collect();
    assert_eq!(regions.len(), 4);
    assert!(regions
        .iter()
        .all(|&(r, s)| r == Region::new(0, 400, 640, 80) && s == 640));
    assert_eq!(log.count(|c| *c == EngineCall::End), 1);
    assert_eq!(log.count(|c| *c == EngineCall::Destroy), 1);
}

#[test]
fn metadata_keys_on_frame() {
    let engine = ScriptedEngine::with_scripts(vec![Script::text("HELLO", &[91, 88])]);
    let mut ocr = VideoOcr::create("", Box::new(engine)).unwrap();

    let frame = ocr.process(yuv_frame(640, 480, 0)).unwrap();
    assert_eq!(frame.metadata.get(TEXT_KEY), Some("HELLO"));
    assert_eq!(frame.metadata.get(CONFIDENCE_KEY), Some("91 88 "));

    let json = frame.metadata.to_json().unwrap();
    assert!(json.contains("\"lavfi.ocr.confidence\":\"91 88 \""));
}

#[test]
fn construction_fails_all_or_nothing() {
    let err = VideoOcr::create("", Box::new(ScriptedEngine::failing_init()))
        .err()
        .unwrap();
    assert!(matches!(err, OcrError::EngineInit { .. }));

    let err = VideoOcr::create("x=-1", Box::new(ScriptedEngine::new()))
        .err()
        .unwrap();
    assert!(matches!(err, OcrError::InvalidOption(_)));
}

#[test]
fn json5_config_and_padded_planes() {
    let engine = ScriptedEngine::new();
    let log = engine.call_log();
    let mut ocr = VideoOcr::from_json5(
        r#"{ language: "deu", x: 700, y: 10, w: 100, h: 50 }"#,
        Box::new(engine),
    )
    .unwrap();
    assert_eq!(ocr.config().language, "deu");

    let stride = 704;
    let plane = Plane::new(vec![0u8; stride * 480], stride);
    let frame = VideoFrame::new(PixelFormat::Gray8, 640, 480, vec![plane], 0, 0).unwrap();
    ocr.process(frame).unwrap();

    assert!(log.calls().iter().any(|c| matches!(
        c,
        EngineCall::RecognizeRect { region, stride: 704, .. } if *region == Region::new(0, 10, 100, 50)
    )));
}

#[test]
fn packed_rgb_is_refused() {
    let mut ocr = VideoOcr::create("", Box::new(ScriptedEngine::new())).unwrap();
    let frame = VideoFrame::new(
        PixelFormat::Rgba,
        2,
        2,
        vec![Plane::packed(vec![0u8; 16], 8)],
        0,
        0,
    )
    .unwrap();
    assert!(matches!(
        ocr.process(frame),
        Err(OcrError::UnsupportedFormat(PixelFormat::Rgba))
    ));
    assert_eq!(ocr.stats().processed_frames, 0);
}

#[test]
fn mixed_batch_processes_nothing() {
    let engine = ScriptedEngine::with_scripts(vec![Script::text("HELLO", &[91])]);
    let log = engine.call_log();
    let mut ocr = VideoOcr::create("", Box::new(engine)).unwrap();

    let gray = VideoFrame::gray(8, 8, vec![0u8; 64]).unwrap();
    let rgba = VideoFrame::new(
        PixelFormat::Rgba,
        2,
        2,
        vec![Plane::packed(vec![0u8; 16], 8)],
        0,
        1,
    )
    .unwrap();

    assert!(matches!(
        ocr.process_batch(vec![gray, rgba]),
        Err(OcrError::UnsupportedFormat(PixelFormat::Rgba))
    ));
    assert_eq!(ocr.stats(), Default::default());
    assert_eq!(
        log.count(|c| matches!(c, EngineCall::RecognizeRect { .. })),
        0
    );

    let results = ocr
        .process_batch(vec![VideoFrame::gray(8, 8, vec![0u8; 64]).unwrap()])
        .unwrap();
    assert_eq!(results[0].text, "HELLO");
    assert_eq!(ocr.stats().processed_frames, 1);
}
