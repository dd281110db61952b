//! Static HTML for the dashboard page.

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The calendar panel, or `None` when there is nothing to show.
pub fn calendar_panel(items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let mut html = String::from("<h2>Calendar</h2>\n<ul>\n");
    for item in items {
        html.push_str(&format!("<li>{}</li>\n", escape_html(item)));
    }
    html.push_str("</ul>");
    Some(html)
}

/// Page-level settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    pub title: String,
    pub stylesheet: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: "Morning Dashboard".to_string(),
            stylesheet: "style.css".to_string(),
        }
    }
}

/// Assemble a page from panels. Absent panels are left out.
pub fn render_page(options: &PageOptions, panels: &[Option<String>]) -> String {
    let mut html = format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{}</title>\
         <link rel=\"stylesheet\" href=\"{}\"></head><body>\n",
        escape_html(&options.title),
        escape_html(&options.stylesheet),
    );
    for panel in panels.iter().flatten() {
        html.push_str(&format!("<div class=\"panel\">\n{}\n</div>\n", panel));
    }
    html.push_str("</body></html>\n");
    html
}
