use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STYLES: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
    margin: 0;
    background-color: #f4f4f4;
    color: #333;
    padding: 20px;
}
h1, h2 {
    color: #333;
    text-align: center;
}
.cards {
    display: flex;
    justify-content: center;
    gap: 16px;
    margin: 20px auto;
}
.card {
    background-color: white;
    box-shadow: 0 2px 15px rgba(0,0,0,0.1);
    padding: 12px 24px;
    text-align: center;
    min-width: 120px;
}
.card .value {
    font-size: 1.8em;
    font-weight: bold;
}
.card.bad .value {
    color: #c00;
}
.diagram {
    background-color: white;
    width: 90%;
    margin: 20px auto;
    padding: 10px;
    overflow-x: auto;
}
table {
    width: 90%;
    margin: 20px auto;
    border-collapse: collapse;
    box-shadow: 0 2px 15px rgba(0,0,0,0.1);
    background-color: white;
}
th, td {
    border: 1px solid #ddd;
    padding: 10px 12px;
    text-align: left;
}
th {
    background-color: #007bff;
    color: white;
    font-weight: bold;
}
tr:nth-child(even) {
    background-color: #f9f9f9;
}
caption {
    caption-side: top;
    font-size: 1.2em;
    font-weight: bold;
    padding: 10px;
    color: #007bff;
}
.sortable-header {
    cursor: pointer;
}
"#;

const TABLE_SORTING_JS: &str = r#"
document.querySelectorAll('.sortable-table .sortable-header').forEach(th => {
    th.addEventListener('click', () => {
        const tbody = th.closest('table').querySelector('tbody');
        if (!tbody) return;
        const idx = parseInt(th.dataset.columnIndex);
        const numeric = th.dataset.sortType === 'number';
        const asc = th.dataset.order !== 'asc';
        th.dataset.order = asc ? 'asc' : 'desc';
        const value = tr => {
            const text = tr.children[idx].textContent.trim();
            return numeric ? parseFloat(text) || 0 : text.toLowerCase();
        };
        Array.from(tbody.querySelectorAll('tr'))
            .sort((a, b) => {
                const [x, y] = [value(a), value(b)];
                const cmp = numeric ? x - y : x.localeCompare(y);
                return asc ? cmp : -cmp;
            })
            .forEach(tr => tbody.appendChild(tr));
    });
});
"#;

const MERMAID_JS: &str = r#"
import mermaid from 'https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs';
mermaid.initialize({ startOnLoad: true });
"#;

/// Renders a full HTML document with the given title and body markup.
///
/// The document loads mermaid, so any `pre.mermaid` block in the body is
/// drawn as a diagram.
pub fn render_html_doc(title_text: &str, body_content: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title_text) }
                style { (PreEscaped(CSS_STYLES)) }
                script type="module" { (PreEscaped(MERMAID_JS)) }
            }
            body {
                h1 { (title_text) }
                (body_content)
                script { (PreEscaped(TABLE_SORTING_JS)) }
            }
        }
    }
    .into_string()
}

/// Background colour for a metric where lower is better.
///
/// Green up to and including `warn_threshold`, yellow up to and including
/// `bad_threshold`, red above it.
pub fn get_cell_style(value: f64, warn_threshold: f64, bad_threshold: f64) -> String {
    let hue = if value > bad_threshold {
        0.0
    } else if value > warn_threshold {
        60.0
    } else {
        120.0
    };
    format!("background-color: hsl({}, 100%, 80%);", hue)
}

/// A titled summary number.
pub fn render_card(label: &str, value: usize, bad: bool) -> Markup {
    html! {
        div class=(if bad { "card bad" } else { "card" }) {
            div class="value" { (value) }
            div class="label" { (label) }
        }
    }
}

/// Renders a list of metric explanations.
pub fn render_metric_explanation_list(explanations: &[(&str, &str)]) -> Markup {
    html! {
        h2 { "Metric Explanations" }
        ul {
            @for (metric, explanation) in explanations {
                li {
                    strong { (metric) ": " } (explanation)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cell_style_buckets_are_strict() {
        assert!(get_cell_style(7.0, 7.0, 10.0).contains("hsl(120"));
        assert!(get_cell_style(8.0, 7.0, 10.0).contains("hsl(60"));
        assert!(get_cell_style(10.0, 7.0, 10.0).contains("hsl(60"));
        assert!(get_cell_style(11.0, 7.0, 10.0).contains("hsl(0"));
    }

    #[test]
    fn test_render_html_doc_escapes_title() {
        let doc = render_html_doc("a <b>", html! { p { "body" } });
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>a &lt;b&gt;</title>"));
        assert!(doc.contains("mermaid.initialize"));
    }

    #[test]
    fn test_render_card_marks_bad_values() {
        let markup = render_card("Violations", 3, true).into_string();
        assert!(markup.contains("card bad"));
        assert!(markup.contains(">3<"));
    }
}
