//! HTML templates
//!
//! Pages are assembled from fragments with `{{name}}` placeholders. Every
//! substituted value is HTML-escaped; fragments themselves are trusted.

/// Opening of every page
pub const PAGE_START: &str = "<html><head><title>Jenkins Status Light</title></head><body><h1>Jenkins Status Light</h1>";

/// Closing of every page
pub const PAGE_END: &str = "</body></html>";

pub const STATUS: Template = Template(
    "Host: {{host}}<br>Job name: {{job}}<br><br>Status: <p style=\"color:{{color}}\">{{status}}</p>",
);

pub const LAST_FAILURE: Template = Template("<p>Last poll failed: {{reason}}</p>");

pub const CONFIG_ERROR: Template = Template("<p style=\"color:red\">{{error}}</p>");

pub const CONFIG_FORM: Template = Template(concat!(
    "<form action=\"\" method=\"get\"><table>",
    "<colgroup><col width=\"200\"><col width=\"300\"></colgroup>",
    "<tr><td><label for=\"host\">Host:</label></td>",
    "<td><input name=\"host\" id=\"host\" value=\"{{host}}\"></td></tr>",
    "<tr><td><label for=\"jobname\">Jenkins job name:</label></td>",
    "<td><input name=\"jobname\" id=\"jobname\" value=\"{{jobname}}\"></td></tr>",
    "<tr><td><label for=\"updateinterval\">Update interval (seconds):</label></td>",
    "<td><input type=\"number\" min=\"1\" name=\"updateinterval\" id=\"updateinterval\" value=\"{{updateinterval}}\"></td></tr>",
    "</table><div><button>Update</button></div></form>",
));

pub const LINK_CONFIGURE: &str = "<a href=\"/configure\">Configuration</a>";

pub const LINK_MAIN_PAGE: &str = "<a href=\"/\">Main page</a>";

/// Template text with `{{name}}` placeholders
#[derive(Debug, Clone, Copy)]
pub struct Template(&'static str);

impl Template {
    /// Substitutes placeholders in a single pass
    ///
    /// Values are escaped and never rescanned, so a value containing
    /// `{{other}}` is rendered literally. Placeholders without a value are
    /// left untouched.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];

            let Some(close) = after.find("}}") else {
                rest = &rest[open..];
                break;
            };

            let name = &after[..close];
            match values.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => out.push_str(&escape_html(value)),
                None => out.push_str(&rest[open..open + close + 4]),
            }
            rest = &after[close + 2..];
        }

        out.push_str(rest);
        out
    }
}

/// Escapes text for use in HTML element content and quoted attributes
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Wraps fragments into a complete page
pub fn page(fragments: &[&str]) -> String {
    let mut html = String::from(PAGE_START);
    for fragment in fragments {
        html.push_str(fragment);
    }
    html.push_str(PAGE_END);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_substitutes_and_escapes() {
        let html = LAST_FAILURE.render(&[("reason", "<b>refused</b>")]);
        assert_eq!(html, "<p>Last poll failed: &lt;b&gt;refused&lt;/b&gt;</p>");
    }

    #[test]
    fn test_render_is_single_pass() {
        let template = Template("{{a}}-{{b}}");
        assert_eq!(template.render(&[("a", "{{b}}"), ("b", "x")]), "{{b}}-x");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let template = Template("{{a}} {{missing}} {{unterminated");
        assert_eq!(
            template.render(&[("a", "1")]),
            "1 {{missing}} {{unterminated"
        );
    }

    #[test]
    fn test_form_values_cannot_break_out_of_attributes() {
        let html = CONFIG_FORM.render(&[
            ("host", "\"><script>alert(1)</script>"),
            ("jobname", "job"),
            ("updateinterval", "30"),
        ]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;"));
        assert!(html.contains("value=\"job\""));
    }

    #[test]
    fn test_page_wraps_fragments() {
        let html = page(&["a", "b"]);
        assert!(html.starts_with(PAGE_START));
        assert!(html.ends_with(PAGE_END));
        assert!(html.contains("ab"));
    }
}
