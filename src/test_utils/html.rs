use scraper::{ElementRef, Html, Selector};

pub(crate) fn parse_html_document(text: &str) -> Html {
    Html::parse_document(text)
}

pub(crate) fn parse_html_fragment(text: &str) -> Html {
    Html::parse_fragment(text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// Select every element matching the CSS `selector`.
#[track_caller]
pub(crate) fn select_all<'a>(html: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    let selector = Selector::parse(selector).unwrap();

    html.select(&selector).collect()
}

/// Select the single element matching the CSS `selector`.
#[track_caller]
pub(crate) fn must_select_one<'a>(html: &'a Html, selector: &str) -> ElementRef<'a> {
    let elements = select_all(html, selector);
    assert_eq!(
        elements.len(),
        1,
        "want 1 element matching {selector}, got {}",
        elements.len()
    );

    elements[0]
}

/// The text content of `element` with surrounding whitespace removed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}
