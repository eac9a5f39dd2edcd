//! Server-rendered HTML for the sqlpulse dashboard.
//!
//! The page is a pure function of the dashboard document and view state.
//! No scripts: tabs are links, forms post back to the server, and every
//! action ends in a redirect to `/`.

use std::fmt::Write as _;

use crate::dashboard::Dashboard;
use crate::dom::layout::{CONFIG_FORM, CONFIG_PANEL, CONFIG_REFRESH};
use crate::dom::{Field, FieldKind, Form, Panel};
use crate::http::Transport;

/// Stylesheet inlined into every page.
const STYLE: &str = r#"
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }
.app { max-width: 1100px; margin: 0 auto; padding: 24px; }
header { margin-bottom: 24px; padding-bottom: 16px; border-bottom: 1px solid var(--border); }
header h1 { font-size: 24px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }
nav { display: flex; gap: 4px; margin-bottom: 24px; background: var(--surface); border-radius: var(--radius); padding: 4px; border: 1px solid var(--border); }
nav a.tab { flex: 1; padding: 8px 16px; border-radius: 6px; color: var(--text-muted); font-weight: 500; text-align: center; text-decoration: none; }
nav a.tab:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav a.tab.active { background: var(--accent); color: #fff; }
.panel { display: none; }
.panel.active { display: block; }
.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 20px; margin-bottom: 16px; }
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
label { display: block; margin-bottom: 12px; color: var(--text-muted); font-size: 12px; }
label.check { display: flex; gap: 8px; align-items: center; }
input, select, textarea { display: block; width: 100%; margin-top: 4px; padding: 6px 10px; background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; font-family: var(--mono); }
label.check input { width: auto; margin: 0; }
textarea { min-height: 120px; }
button { padding: 8px 16px; border: none; border-radius: 6px; background: var(--accent); color: #fff; font-weight: 500; cursor: pointer; margin-right: 8px; }
button.secondary { background: transparent; border: 1px solid var(--border); color: var(--text); }
pre.output { margin-top: 16px; padding: 12px; background: var(--bg); border: 1px solid var(--border); border-radius: 6px; font-family: var(--mono); white-space: pre-wrap; min-height: 40px; }
.status { margin-top: 12px; font-size: 13px; color: var(--text-muted); }
.status[data-type="success"] { color: var(--green); }
.status[data-type="error"] { color: var(--red); }
"#;

/// Render the complete page.
pub fn render_page<T: Transport>(dashboard: &Dashboard<T>) -> String {
    let doc = dashboard.document();
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>sqlpulse Dashboard</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"app\">\n");
    let _ = write!(
        html,
        "<header><h1><span class=\"logo\">sqlpulse</span> SQL Server Observability</h1>\
         <div class=\"subtitle\">API: {}</div></header>\n",
        esc(dashboard.client().base_url())
    );

    html.push_str("<nav>\n");
    for tab in &doc.tabs {
        let _ = writeln!(
            html,
            "<a class=\"tab{}\" data-target=\"{target}\" href=\"/tabs/{target}\">{}</a>",
            if tab.active { " active" } else { "" },
            esc(&tab.label),
            target = esc(&tab.target),
        );
    }
    html.push_str("</nav>\n");

    for panel in &doc.panels {
        render_panel(&mut html, dashboard, panel);
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_panel<T: Transport>(html: &mut String, dashboard: &Dashboard<T>, panel: &Panel) {
    let _ = writeln!(
        html,
        "<section class=\"panel{}\" id=\"{}\">\n<div class=\"card\">",
        if panel.active { " active" } else { "" },
        esc(&panel.id)
    );
    let _ = writeln!(html, "<h2>{}</h2>", esc(&panel_title(&panel.id)));

    let form_id = format!("{}-form", panel.id);
    if let Some(form) = dashboard.document().form(&form_id) {
        render_form(html, form);
    }

    if panel.id == CONFIG_PANEL {
        let status = dashboard.config_status();
        let _ = writeln!(
            html,
            "<p class=\"status\" id=\"config-status\" data-type=\"{}\">{}</p>",
            status.kind.as_str(),
            esc(&status.message)
        );
    } else {
        let _ = writeln!(
            html,
            "<pre class=\"output\" id=\"{}-output\">{}</pre>",
            esc(&panel.id),
            esc(&dashboard.output_text(&panel.id))
        );
    }
    html.push_str("</div>\n</section>\n");
}

fn panel_title(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render_form(html: &mut String, form: &Form) {
    let _ = writeln!(
        html,
        "<form id=\"{id}\" method=\"post\" action=\"/forms/{id}\">",
        id = esc(&form.id)
    );
    for field in &form.fields {
        render_field(html, field);
    }

    let submit = if form.id == CONFIG_FORM { "Save" } else { "Run" };
    let _ = write!(html, "<button type=\"submit\">{submit}</button>");
    if form.id == CONFIG_FORM {
        let _ = write!(
            html,
            "<button type=\"submit\" class=\"secondary\" id=\"{CONFIG_REFRESH}\" \
             formaction=\"/click/{CONFIG_REFRESH}\">Refresh</button>"
        );
    }
    html.push_str("\n</form>\n");
}

fn render_field(html: &mut String, field: &Field) {
    let id = esc(&field.id);
    let name = esc(&field.name);
    let label = esc(&field.label);
    match field.kind {
        FieldKind::Checkbox => {
            let _ = writeln!(
                html,
                "<label class=\"check\"><input type=\"checkbox\" id=\"{id}\" name=\"{name}\" value=\"on\"{}> {label}</label>",
                if field.checked { " checked" } else { "" }
            );
        }
        FieldKind::Select => {
            let _ = write!(html, "<label>{label}<select id=\"{id}\" name=\"{name}\">");
            for option in &field.options {
                let _ = write!(
                    html,
                    "<option{}>{}</option>",
                    if *option == field.value { " selected" } else { "" },
                    esc(option)
                );
            }
            html.push_str("</select></label>\n");
        }
        FieldKind::TextArea => {
            let _ = writeln!(
                html,
                "<label>{label}<textarea id=\"{id}\" name=\"{name}\">{}</textarea></label>",
                esc(&field.value)
            );
        }
        FieldKind::Text | FieldKind::Number | FieldKind::Password => {
            let kind = match field.kind {
                FieldKind::Number => "number",
                FieldKind::Password => "password",
                _ => "text",
            };
            let _ = writeln!(
                html,
                "<label>{label}<input type=\"{kind}\" id=\"{id}\" name=\"{name}\" value=\"{}\"{}></label>",
                esc(&field.value),
                if kind == "number" { " step=\"any\"" } else { "" }
            );
        }
    }
}

/// Escape text for HTML content and attribute values.
pub(crate) fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esc_escapes_markup() {
        assert_eq!(esc(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn panel_title_capitalizes() {
        assert_eq!(panel_title("metrics"), "Metrics");
        assert_eq!(panel_title(""), "");
    }

    #[test]
    fn checkbox_renders_checked_state() {
        let mut html = String::new();
        let mut field = Field::checkbox("c", "sqlserver.encrypt");
        field.checked = true;
        render_field(&mut html, &field);
        assert!(html.contains("name=\"sqlserver.encrypt\""));
        assert!(html.contains(" checked"));
    }

    #[test]
    fn select_marks_current_option() {
        let mut html = String::new();
        let field = Field::select("e", "endpoint", &["waits", "blocking"]).with_value("blocking");
        render_field(&mut html, &field);
        assert!(html.contains("<option selected>blocking</option>"));
        assert!(html.contains("<option>waits</option>"));
    }
}
