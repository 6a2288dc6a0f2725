//! End-to-end flow over the public API: a captured still goes through
//! the scene machine, the parsed analysis payload feeds the report
//! segmenter, and the pager's selection drives the overlay focus state.

use palm_read_core::analysis::AnalysisResult;
use palm_read_core::report::parse_report_cards;
use palm_read_core::scene::{CaptureMode, Gender, Hand, Profile, Scene, SceneController};
use palm_read_core::ui::overlay::{is_focused, mounts_visible, selected_line};
use palm_read_core::ui::pager::{ReportPager, SheetHeight};

const RESULT_PAYLOAD: &str = r#"{
    "lines": [
        {"name": "life", "label": "생명선 생명의 기운", "color": [220, 60, 60],
         "points": [[420.0, 180.0], [390.0, 360.0], [370.0, 540.0]]},
        {"name": "head", "label": "두뇌선 사고의 흐름", "color": [60, 60, 220],
         "points": [[400.0, 260.0], [700.0, 300.0]]},
        {"name": "heart", "label": "감정선 마음의 결", "color": [60, 220, 60],
         "points": [[380.0, 200.0], [760.0, 170.0]]}
    ],
    "mounts": {"목성": [500.0, 120.0], "태양": [820.0, 140.0]},
    "report": "<div class=\"palm-wrapper\"><div class=\"palm-scroll-area\"><div><div>생명선 생명의 기운</div><div>긴 생명선입니다.</div></div><div><div>두뇌선 사고의 흐름</div><div>또렷한 두뇌선입니다.</div></div><div><div>감정선 마음의 결</div><div>부드러운 감정선입니다.</div></div></div></div>",
    "image_size": {"width": 1280, "height": 720}
}"#;

fn controller_at_capture_hand() -> SceneController {
    let mut sc = SceneController::new();
    sc.start();
    *sc.profile_mut() = Profile {
        name: "홍길동".to_string(),
        birth: "19900101".to_string(),
        gender: Some(Gender::Female),
        dominant_hand: Some(Hand::Left),
    };
    assert!(sc.complete_profile());
    sc.choose_mode(CaptureMode::Hand);
    sc
}

#[test]
fn successful_analysis_reaches_the_result_scene_with_a_synced_report() {
    let mut sc = controller_at_capture_hand();

    // Fake 1280x720 still; the state machine only cares that one exists.
    sc.store_capture(vec![0u8; 64]);
    let token = sc.submit_photo().expect("photo submitted");
    assert_eq!(sc.scene(), Scene::Loading);

    let result: AnalysisResult = serde_json::from_str(RESULT_PAYLOAD).expect("valid payload");
    let cards = parse_report_cards(&result.report, &result.line_order());
    assert!(sc.analysis_succeeded(token, result));
    assert_eq!(sc.scene(), Scene::Result);

    let result = sc.session().analysis.as_ref().expect("result retained");

    // Three drawable polylines and two mounts, all inside the reported
    // image space; the overlay applies no per-point rescaling.
    assert_eq!(result.lines.len(), 3);
    assert_eq!(result.mounts.len(), 2);
    for line in &result.lines {
        assert!(line.points.len() >= 2);
        for p in &line.points {
            assert!(p[0] <= result.image_size.width as f32);
            assert!(p[1] <= result.image_size.height as f32);
        }
    }

    // Cards follow the line order and share its keys.
    let keys: Vec<&str> = cards.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, ["life", "head", "heart"]);

    // Selecting the "life" card focuses its line, dims the rest and
    // hides the mount markers.
    let mut pager = ReportPager::new(cards);
    pager.set_active(0);
    let selected = selected_line(result, pager.active_index());
    assert_eq!(selected, Some("life"));
    assert!(is_focused(selected, "life"));
    assert!(!is_focused(selected, "head"));
    assert!(!is_focused(selected, "heart"));
    assert!(!mounts_visible(selected));

    // Moving the pager moves the selection; nothing stays selected twice.
    pager.set_active(1);
    let selected = selected_line(result, pager.active_index());
    assert_eq!(selected, Some("head"));
    assert!(!is_focused(selected, "life"));
    assert_eq!(pager.sheet(), SheetHeight::Collapsed, "index changes leave the sheet alone");
}

#[test]
fn failed_analysis_returns_to_the_capture_scene_without_a_result() {
    let mut sc = controller_at_capture_hand();
    sc.store_capture(vec![0u8; 64]);
    let token = sc.submit_photo().expect("photo submitted");

    // Gateway reported e.g. "no hand detected": the controller falls
    // back to the originating capture scene and keeps nothing.
    assert!(sc.analysis_failed(token));
    assert_eq!(sc.scene(), Scene::CaptureHand);
    assert!(sc.session().analysis.is_none());
    assert!(sc.captured_image().is_none());
}
