use scraper::{ElementRef, Html, Selector};

// selectors
lazy_static::lazy_static! {
    static ref CSRF: Selector =
        Selector::parse(r#"[name="csrfmiddlewaretoken"]"#).expect("csrf selector");
    static ref ANCHOR: Selector = Selector::parse("a[href]").expect("anchor selector");
    static ref TBODY: Selector = Selector::parse("tbody").expect("tbody selector");
    static ref TR: Selector = Selector::parse("tr").expect("tr selector");
    static ref TD: Selector = Selector::parse("td").expect("td selector");
}

/// One `<td>`: its trimmed text, and the target of its first link, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub href: Option<String>,
}

impl Cell {
    fn from_element(td: ElementRef) -> Self {
        Cell {
            text: td.text().collect::<String>().trim().to_string(),
            href: td
                .select(&ANCHOR)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string),
        }
    }
}

/// The `value` of the form's `csrfmiddlewaretoken` input.
pub fn csrf_token(body: &str) -> Option<String> {
    Html::parse_document(body)
        .select(&CSRF)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

/// The first link target within an HTML fragment, e.g. `<a href="/x/">...</a>`.
pub fn first_href(fragment: &str) -> Option<String> {
    Html::parse_fragment(fragment)
        .select(&ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// The cells of every row in the document's first `<tbody>`.
///
/// `None` when the document has no `<tbody>` at all.
pub fn first_tbody(body: &str) -> Option<Vec<Vec<Cell>>> {
    let document = Html::parse_document(body);
    let tbody = document.select(&TBODY).next()?;
    let rows = tbody
        .select(&TR)
        .map(|tr| tr.select(&TD).map(Cell::from_element).collect())
        .collect();
    Some(rows)
}
