use lazy_static::lazy_static;
use scraper::{Html, Selector};

lazy_static! {
    static ref SEL_TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref SEL_H1: Selector = Selector::parse("h1").expect("valid selector");
    static ref SEL_H2: Selector = Selector::parse("h2").expect("valid selector");
    static ref SEL_MAIN: Selector = Selector::parse("main").expect("valid selector");
    static ref SEL_BODY: Selector = Selector::parse("body").expect("valid selector");
    static ref SEL_A: Selector = Selector::parse("a[href]").expect("valid selector");
    static ref SEL_SKIP: Selector =
        Selector::parse("script, style, noscript, template, nav, header, footer")
            .expect("valid selector");
}

/// Narrow parser interface over an HTML page. The rest of the system
/// only sees title/headings/main text/links, never the DOM.
pub struct Page {
    doc: Html,
}

impl Page {
    pub fn parse(html: &str) -> Page {
        Page {
            doc: Html::parse_document(html),
        }
    }

    /// Text of the document's `<title>` element, or empty.
    pub fn title(&self) -> String {
        self.doc
            .select(&SEL_TITLE)
            .next()
            .map(|n| collapse_whitespace(&n.text().collect::<String>()))
            .unwrap_or_default()
    }

    /// All `<h1>` texts joined with " | ", falling back to the first
    /// `<h2>`, else empty.
    pub fn headings(&self) -> String {
        let h1s: Vec<String> = self
            .doc
            .select(&SEL_H1)
            .map(|n| collapse_whitespace(&n.text().collect::<String>()))
            .filter(|s| !s.is_empty())
            .collect();
        if !h1s.is_empty() {
            return h1s.join(" | ");
        }
        self.doc
            .select(&SEL_H2)
            .next()
            .map(|n| collapse_whitespace(&n.text().collect::<String>()))
            .unwrap_or_default()
    }

    /// Plain text of the `<main>` region if present, else the whole
    /// `<body>`, with scripts/styles/structural chrome dropped and all
    /// whitespace runs collapsed.
    pub fn main_text(&self) -> String {
        let root = self
            .doc
            .select(&SEL_MAIN)
            .next()
            .or_else(|| self.doc.select(&SEL_BODY).next());
        let Some(root) = root else {
            return String::new();
        };
        let mut out = String::new();
        collect_visible_text(root, &mut out);
        collapse_whitespace(&out)
    }

    /// Raw `href` values of every anchor, unresolved.
    pub fn links(&self) -> Vec<String> {
        self.doc
            .select(&SEL_A)
            .filter_map(|a| a.value().attr("href"))
            .filter(|h| {
                !h.starts_with('#') && !h.starts_with("javascript:") && !h.starts_with("mailto:")
            })
            .map(|h| h.to_string())
            .collect()
    }
}

fn collect_visible_text(el: scraper::ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
            continue;
        }
        if let Some(child_el) = scraper::ElementRef::wrap(child) {
            if SEL_SKIP.matches(&child_el) {
                continue;
            }
            collect_visible_text(child_el, out);
        }
    }
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the (title, section, text) fields of a document from raw HTML.
pub fn extract_document(html: &str) -> (String, String, String) {
    let page = Page::parse(html);
    (page.title(), page.headings(), page.main_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<html>
        <head><title>  Front Desk   Hours </title><style>p{color:red}</style></head>
        <body>
            <nav><a href="/ignored-by-text">Nav</a></nav>
            <h1>Front Desk</h1>
            <h1>Hours</h1>
            <main>
                <script>var x = 1;</script>
                <p>We are open   Monday to Friday,
                   9am to 5pm.</p>
                <a href="/contact">Contact us</a>
                <a href="#top">Top</a>
                <a href="mailto:desk@example.edu">Mail</a>
            </main>
        </body></html>"##;

    #[test]
    fn title_is_trimmed_and_collapsed() {
        let page = Page::parse(SAMPLE);
        assert_eq!(page.title(), "Front Desk Hours");
    }

    #[test]
    fn headings_join_all_h1() {
        let page = Page::parse(SAMPLE);
        assert_eq!(page.headings(), "Front Desk | Hours");
    }

    #[test]
    fn headings_fall_back_to_h2() {
        let page = Page::parse("<html><body><h2>Second level</h2></body></html>");
        assert_eq!(page.headings(), "Second level");
    }

    #[test]
    fn main_text_drops_scripts_and_collapses() {
        let page = Page::parse(SAMPLE);
        let text = page.main_text();
        assert!(text.contains("open Monday to Friday, 9am to 5pm."));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn links_filter_anchors_and_mailto() {
        let page = Page::parse(SAMPLE);
        let links = page.links();
        assert!(links.contains(&"/contact".to_string()));
        assert!(!links.iter().any(|l| l.starts_with('#')));
        assert!(!links.iter().any(|l| l.starts_with("mailto:")));
    }
}
