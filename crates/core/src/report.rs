//! Report segmentation.
//!
//! The analysis service returns its narrative report as one HTML blob with
//! only a weak structural convention: a container holding sibling blocks,
//! each block a title element followed by a content element. This module
//! turns that blob into an ordered sequence of [`ReportCard`]s keyed to the
//! named palm lines. Parsing is lenient by design: malformed input yields
//! an empty sequence, never an error.

use scraper::{ElementRef, Html};

/// Known report titles mapped to line identifiers. Matched by substring,
/// in table order.
const TITLE_TO_LINE_KEY: &[(&str, &str)] = &[
    ("생명선", "life"),
    ("두뇌선", "head"),
    ("감정선", "heart"),
    ("운명선", "fate"),
];

/// One segment of the narrative report, associated with zero or one line
/// by key.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportCard {
    /// Line identifier from the title table, or a synthetic `extra_{n}`
    /// fallback for unrecognized titles.
    pub key: String,
    /// Display title.
    pub label: String,
    /// Inner markup of the block's content element.
    pub content_html: String,
    /// Raw markup of the whole block.
    pub full_html: String,
}

impl ReportCard {
    /// Plain-text rendition of [`content_html`](Self::content_html),
    /// for surfaces that cannot render markup.
    pub fn content_text(&self) -> String {
        let fragment = Html::parse_fragment(&self.content_html);
        fragment
            .root_element()
            .text()
            .collect::<String>()
            .trim()
            .to_string()
    }
}

/// Parses the report markup into cards ordered by `line_order`.
///
/// Cards whose key matches a name in `line_order` come first, in that
/// order; unmatched cards follow in discovery order. Empty or
/// unrecognizable input yields an empty vector.
pub fn parse_report_cards(html: &str, line_order: &[String]) -> Vec<ReportCard> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let wrapper = find_by_class(root, "palm-wrapper")
        .or_else(|| find_by_name(root, "body"))
        .unwrap_or(root);

    // Prefer the explicit scroll area, then a layout-styled child, then
    // the wrapper itself.
    let container = find_by_class(wrapper, "palm-scroll-area")
        .or_else(|| {
            element_children(wrapper).find(|el| {
                el.value().name() == "div"
                    && el
                        .value()
                        .attr("style")
                        .is_some_and(|s| s.contains("flex") || s.contains("overflow"))
            })
        })
        .unwrap_or(wrapper);

    let mut cards: Vec<ReportCard> = Vec::new();

    for block in element_children(container).filter(is_card_block) {
        let inner: Vec<ElementRef> = element_children(block)
            .filter(|c| c.value().name() == "div")
            .collect();
        let title_el = inner.first().copied();
        let content_el = if inner.len() > 1 {
            inner.get(1).copied()
        } else {
            inner.first().copied()
        };

        let title_text = match title_el {
            Some(el) => collect_text(el),
            None => collect_text(block).chars().take(50).collect(),
        };

        let mut key = String::new();
        for (title, line_key) in TITLE_TO_LINE_KEY {
            if title_text.contains(title) {
                key = (*line_key).to_string();
                break;
            }
        }
        if key.is_empty() && !title_text.is_empty() {
            key = format!("extra_{}", cards.len());
        }

        let content_html = match content_el {
            Some(el) => el.inner_html(),
            None => block.inner_html(),
        };

        // Display label is the title minus its leading token (the line
        // name), falling back to the raw title, then the key.
        let mut label = strip_leading_token(&title_text);
        if label.is_empty() {
            label = title_text.clone();
        }
        if label.is_empty() {
            label = key.clone();
        }

        cards.push(ReportCard {
            key,
            label,
            content_html,
            full_html: block.html(),
        });
    }

    reorder(cards, line_order)
}

/// Reorders cards to follow the canonical line-name order, appending
/// unmatched cards afterwards in discovery order.
fn reorder(cards: Vec<ReportCard>, line_order: &[String]) -> Vec<ReportCard> {
    let mut ordered: Vec<ReportCard> = Vec::new();
    for name in line_order {
        if let Some(card) = cards.iter().find(|c| c.key == *name) {
            ordered.push(card.clone());
        }
    }
    for card in &cards {
        if !ordered.iter().any(|o| o.key == card.key) {
            ordered.push(card.clone());
        }
    }

    if ordered.is_empty() { cards } else { ordered }
}

/// A block qualifies when it is a `div` with at least one element child
/// or a nested `div` anywhere below it.
fn is_card_block(el: &ElementRef) -> bool {
    if el.value().name() != "div" {
        return false;
    }
    element_children(*el).next().is_some() || has_nested_div(*el)
}

fn has_nested_div(el: ElementRef) -> bool {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|d| d.value().name() == "div")
}

fn element_children<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

fn find_by_class<'a>(root: ElementRef<'a>, class: &str) -> Option<ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().classes().any(|c| c == class))
}

fn find_by_name<'a>(root: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == name)
}

fn collect_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Strips the leading whitespace-delimited token and the whitespace
/// after it.
fn strip_leading_token(s: &str) -> String {
    s.trim_start_matches(|c: char| !c.is_whitespace())
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const FOUR_LINE_REPORT: &str = r#"
        <div class="palm-wrapper">
          <div class="palm-scroll-area">
            <div><div>생명선 생명의 기운</div><div><b>강한</b> 생명선입니다.</div></div>
            <div><div>두뇌선 사고의 흐름</div><div>명석한 두뇌선입니다.</div></div>
            <div><div>감정선 마음의 결</div><div>풍부한 감정선입니다.</div></div>
            <div><div>운명선 길의 방향</div><div>뚜렷한 운명선입니다.</div></div>
          </div>
        </div>"#;

    #[test]
    fn four_recognized_blocks_yield_four_keyed_cards() {
        let cards = parse_report_cards(
            FOUR_LINE_REPORT,
            &order(&["life", "head", "heart", "fate"]),
        );

        let keys: Vec<&str> = cards.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["life", "head", "heart", "fate"]);
        for card in &cards {
            assert!(!card.content_html.is_empty());
            assert!(!card.full_html.is_empty());
        }
        assert_eq!(cards[0].label, "생명의 기운");
        assert_eq!(cards[0].content_text(), "강한 생명선입니다.");
    }

    #[test]
    fn ordering_follows_line_order_not_discovery_order() {
        let html = r#"
            <div>
              <div><div>두뇌선</div><div>head text</div></div>
              <div><div>생명선</div><div>life text</div></div>
            </div>"#;

        // "fate" has no card; present keys are reordered, not alphabetized.
        let cards = parse_report_cards(html, &order(&["life", "head", "fate"]));
        let keys: Vec<&str> = cards.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["life", "head"]);
    }

    #[test]
    fn unmatched_cards_append_in_discovery_order() {
        let html = r#"
            <div>
              <div><div>특수 해설 하나</div><div>a</div></div>
              <div><div>생명선 해설</div><div>b</div></div>
              <div><div>특수 해설 둘</div><div>c</div></div>
            </div>"#;

        let cards = parse_report_cards(html, &order(&["life"]));
        let keys: Vec<&str> = cards.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["life", "extra_0", "extra_2"]);
    }

    #[test]
    fn falls_back_to_styled_container_when_no_scroll_area() {
        let html = r#"
            <div style="display:flex; overflow-x:auto">
              <div><div>감정선 요약</div><div>content</div></div>
            </div>"#;

        let cards = parse_report_cards(html, &order(&["heart"]));
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].key, "heart");
        assert_eq!(cards[0].label, "요약");
    }

    #[test]
    fn single_element_block_serves_as_title_and_content() {
        let html = "<div><div><div>운명선만 있는 블록</div></div></div>";
        let cards = parse_report_cards(html, &order(&["fate"]));
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].key, "fate");
        // Content falls back to the only nested element.
        assert!(cards[0].content_html.contains("운명선만"));
    }

    #[test]
    fn empty_and_malformed_input_yield_no_cards() {
        assert!(parse_report_cards("", &order(&["life"])).is_empty());
        assert!(parse_report_cards("plain text, no blocks", &order(&[])).is_empty());
        assert!(parse_report_cards("<p>not a div layout</p>", &order(&["life"])).is_empty());
    }

    #[test]
    fn unclosed_tags_are_tolerated() {
        let html = r#"<div><div><div>생명선 해설<div>내용이 계속"#;
        let cards = parse_report_cards(html, &order(&["life"]));
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].key, "life");
    }

    #[test]
    fn label_falls_back_to_raw_title_then_key() {
        // Title without whitespace: stripping the first token empties it.
        let html = "<div><div><div>생명선</div><div>x</div></div></div>";
        let cards = parse_report_cards(html, &order(&["life"]));
        assert_eq!(cards[0].label, "생명선");
    }
}
