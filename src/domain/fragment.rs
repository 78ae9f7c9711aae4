#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentSource {
    Selector(&'static str),
    FullPage,
}

/// Markup harvested from one page load.
#[derive(Debug, Clone)]
pub struct HtmlFragment {
    pub markup: String,
    pub source: FragmentSource,
}

impl HtmlFragment {
    pub fn from_selector(selector: &'static str, markup: String) -> Self {
        HtmlFragment {
            markup,
            source: FragmentSource::Selector(selector),
        }
    }

    pub fn full_page(markup: String) -> Self {
        HtmlFragment {
            markup,
            source: FragmentSource::FullPage,
        }
    }

    /// Wraps the markup into a loadable document.
    pub fn to_document(&self) -> String {
        format!("<html><body>{}</body></html>", self.markup)
    }
}
