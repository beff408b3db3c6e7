//! Requirement extractor tests over realistic spec exports: entity-encoded
//! HTML tables, mixed history/requirement documents, and plain-text specs.

use uidrift::extract::RequirementExtractor;
use uidrift::model::{RequirementKind, VisibilityRequirement};

fn extract(raw: &str) -> uidrift::extract::Extraction {
    RequirementExtractor::default().extract(raw, "spec")
}

#[test]
fn entity_encoded_export_is_decoded_before_table_recovery() {
    // Wiki exports frequently entity-encode the whole table.
    let raw = "&lt;table&gt;\
               &lt;tr&gt;&lt;th&gt;항목&lt;/th&gt;&lt;th&gt;내용&lt;/th&gt;&lt;/tr&gt;\
               &lt;tr&gt;&lt;td&gt;버튼&lt;/td&gt;&lt;td&gt;문구: 구매하기&lt;/td&gt;&lt;/tr&gt;\
               &lt;/table&gt;";
    let out = extract(raw);
    assert_eq!(out.items.len(), 1);
    assert_eq!(out.items[0].text.as_deref(), Some("구매하기"));
    assert!(out.items[0].provenance.table_sourced);
}

#[test]
fn nested_table_merges_into_parent_scan() {
    let raw = r#"
        <table>
          <tr><th>항목</th><th>내용</th></tr>
          <tr><td>팝업</td><td>
            문구: 계속하기
            <table><tr><td>inner</td></tr></table>
          </td></tr>
        </table>"#;
    let out = extract(raw);
    let texts: Vec<_> = out.items.iter().filter_map(|i| i.text.as_deref()).collect();
    assert!(texts.contains(&"계속하기"), "got: {texts:?}");
}

#[test]
fn korean_date_format_drives_staleness() {
    // 2024년 3월 5일 is the document's latest revision; the row stamped with
    // the January date is stale and must not produce items.
    let raw = r#"
        <table>
          <tr><th>날짜</th><th>버전</th><th>변경내용</th></tr>
          <tr><td>2024년 01월 10일</td><td>1.0</td><td>초안</td></tr>
          <tr><td>2024년 03월 05일</td><td>1.1</td><td>문구 개편</td></tr>
        </table>
        <table>
          <tr><th>항목</th><th>내용</th><th>업데이트</th></tr>
          <tr><td>a</td><td>문구: 이전 라벨</td><td>2024년 01월 10일</td></tr>
          <tr><td>b</td><td>문구: 최신 라벨</td><td>2024년 03월 05일</td></tr>
        </table>"#;
    let out = extract(raw);
    assert_eq!(
        out.latest_date,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
    );
    let texts: Vec<_> = out.items.iter().filter_map(|i| i.text.as_deref()).collect();
    assert_eq!(texts, vec!["최신 라벨"]);
}

#[test]
fn undated_rows_survive_the_staleness_filter() {
    let raw = r#"
        2024-03-05
        <table>
          <tr><th>항목</th><th>내용</th></tr>
          <tr><td>a</td><td>문구: 확인</td></tr>
        </table>"#;
    let out = extract(raw);
    assert_eq!(out.items.len(), 1, "rows with no date carry no staleness evidence");
}

#[test]
fn plain_text_spec_with_sections_and_strikethrough() {
    let raw = "# 마이페이지\n\
               ## 상단 영역\n\
               \"내 정보\"\n\
               ~~\"구버전 배너\"~~\n\
               로그아웃 버튼 must be shown\n";
    let out = extract(raw);

    let text_items: Vec<_> = out
        .items
        .iter()
        .filter(|i| i.kind == RequirementKind::Text)
        .collect();
    assert_eq!(text_items.len(), 1);
    assert_eq!(text_items[0].text.as_deref(), Some("내 정보"));
    assert_eq!(text_items[0].section_path, vec!["마이페이지", "상단 영역"]);

    let state_item = out
        .items
        .iter()
        .find(|i| i.kind == RequirementKind::State)
        .expect("must-show line becomes a STATE item");
    assert_eq!(state_item.visibility, Some(VisibilityRequirement::Show));
}

#[test]
fn labeled_phrases_survive_mangled_markup() {
    // Table recovery fails on this, but the labeled phrase is still there.
    let raw = "<table><tr><td broken\nto-be: 새 홈 화면 문구\n</table>";
    let out = extract(raw);
    assert!(!out.items.is_empty());
    assert!(out
        .items
        .iter()
        .any(|i| i.text.as_deref() == Some("새 홈 화면 문구")));
}

#[test]
fn asset_and_ticket_references_are_not_requirements() {
    let raw = "\"ic_arrow_back\"\n\
               \"PROJ-4821\"\n\
               \"https://example.com/page\"\n\
               \"#FF5733\"\n\
               \"common.button.confirm.title\"\n\
               \"확인\"\n";
    let out = extract(raw);
    let texts: Vec<_> = out.items.iter().filter_map(|i| i.text.as_deref()).collect();
    assert_eq!(texts, vec!["확인"], "only real display text survives the filter");
}

#[test]
fn selector_keys_flow_from_cells_to_items() {
    let raw = r#"
        <table>
          <tr><th>항목</th><th>내용</th></tr>
          <tr><td>버튼</td><td>문구: 확인 [key:ok.button]</td></tr>
        </table>"#;
    let out = extract(raw);
    assert_eq!(out.items.len(), 1);
    assert_eq!(out.items[0].selector_key.as_deref(), Some("ok.button"));
    assert_eq!(out.items[0].text.as_deref(), Some("확인"));
}
