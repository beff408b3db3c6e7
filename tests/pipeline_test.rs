//! End-to-end drift pipeline tests: raw captures + raw spec in, findings out.

use serde_json::json;

use uidrift::engine::{CaptureSet, DriftEngine};
use uidrift::model::{RequirementItem, Severity};
use uidrift::rules;

fn spec_with_buttons() -> &'static str {
    "# 로그인 화면\n\"로그인\"\n\"확인\"\n\"취소\"\n\"저장\"\n\"닫기\"\n"
}

#[tokio::test]
async fn matching_surfaces_produce_no_drift() {
    let captures = CaptureSet {
        design: Some(json!(["로그인", "확인", "취소", "저장", "닫기"])),
        ..Default::default()
    };
    let report = DriftEngine::default().run(&captures, spec_with_buttons()).await;

    assert_eq!(report.items.len(), 5);
    assert!(
        report.findings.is_empty(),
        "identical spec and design should be silent, got: {:?}",
        report.findings
    );
}

#[tokio::test]
async fn translated_label_reports_major_missing_text() {
    // The design export says "Login" where the spec requires "로그인".
    let captures = CaptureSet {
        design: Some(json!(["Login", "확인", "취소", "저장", "닫기"])),
        ..Default::default()
    };
    let report = DriftEngine::default().run(&captures, spec_with_buttons()).await;

    let drift = report
        .findings
        .iter()
        .find(|f| f.category == "TEXT_MISMATCH" && f.severity == Severity::Major)
        .expect("expected a MAJOR text drift finding");
    assert_eq!(
        drift.decision.as_ref().unwrap().reason,
        "confirmed_missing",
        "로그인 is absent from the capture entirely"
    );
    // The stray "Login" label surfaces through the reverse comparison too.
    assert!(report
        .findings
        .iter()
        .any(|f| f.category == "UNMAPPED_TEXT"));
}

#[tokio::test]
async fn keyed_requirement_missing_from_design() {
    let captures = CaptureSet {
        design: Some(json!(["확인", "취소", "저장", "닫기", "뒤로"])),
        ..Default::default()
    };
    let spec = "# 결제\n\"확인\"\n\"취소\"\n\"저장\"\n\"닫기\"\n결제하기 버튼 [key:pay.button]\n";
    let report = DriftEngine::default().run(&captures, spec).await;

    let missing = report
        .findings
        .iter()
        .find(|f| f.category == "MISSING_ELEMENT" && f.selector_key.as_deref() == Some("pay.button"))
        .expect("keyed requirement with no design counterpart must be flagged");
    assert_eq!(missing.severity, Severity::Major);
}

#[tokio::test]
async fn keyed_items_never_reach_fuzzy_text_rules() {
    // A keyed item whose text matches nothing would normally trip the
    // strict-text rule; carrying a key must route it to the keyed rule only.
    let captures = CaptureSet {
        design: Some(json!(["확인", "취소", "저장", "닫기", "뒤로"])),
        ..Default::default()
    };
    let spec = "# 결제\n\"확인\"\n\"취소\"\n\"저장\"\n\"닫기\"\n전혀 없는 텍스트 [key:ghost.label]\n";
    let report = DriftEngine::default().run(&captures, spec).await;

    let keyed_item: &RequirementItem = report
        .items
        .iter()
        .find(|i| i.selector_key.is_some())
        .expect("the keyed item must be extracted");
    for finding in &report.findings {
        if finding.requirement_id.as_deref() == Some(keyed_item.id.as_str()) {
            assert_eq!(
                finding.decision.as_ref().map(|d| d.rule.as_str()),
                Some("keyed_diff"),
                "only the keyed rule may report on a keyed item: {finding:?}"
            );
        }
    }
}

#[tokio::test]
async fn sparse_extraction_aborts_with_guardrail() {
    let captures = CaptureSet {
        design: Some(json!(["확인"])),
        ..Default::default()
    };
    let report = DriftEngine::default().run(&captures, "\"확인\"\n\"취소\"").await;

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].id, rules::GUARDRAIL_FINDING_ID);
    assert_eq!(report.findings[0].severity, Severity::Critical);
    assert_eq!(report.severity_counts.get("critical"), Some(&1));
}

#[tokio::test]
async fn empty_capture_payload_is_diagnosed_not_fatal() {
    let captures = CaptureSet {
        design: Some(json!("not a node tree")),
        ..Default::default()
    };
    let report = DriftEngine::default().run(&captures, spec_with_buttons()).await;

    // Rules still ran; the unparsable capture surfaces as an INFO structure
    // finding rather than an error.
    assert!(report
        .findings
        .iter()
        .any(|f| f.category == "STRUCTURE" && f.severity == Severity::Info));
}

#[tokio::test]
async fn spec_loaded_from_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("spec.md");
    std::fs::write(&path, spec_with_buttons()).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();

    let captures = CaptureSet {
        web: Some(json!([
            {"role": "button", "text": "로그인", "path": "/root/[0]"},
            {"role": "button", "text": "확인", "path": "/root/[1]"},
            {"role": "button", "text": "취소", "path": "/root/[2]"},
            {"role": "button", "text": "저장", "path": "/root/[3]"},
            {"role": "button", "text": "닫기", "path": "/root/[4]"}
        ])),
        ..Default::default()
    };
    let report = DriftEngine::default().run(&captures, &raw).await;
    assert!(report.findings.is_empty(), "got: {:?}", report.findings);
}
