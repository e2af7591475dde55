/// HTML views
///
/// All interpolated text is escaped with [`escape_html`].

const STYLESHEET: &str = "/assets/index.css";

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <link rel="stylesheet" href="{STYLESHEET}">
</head>
<body>
  <header><a href="/">jlinx</a></header>
  <main>
{body}
  </main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Landing page with a DID lookup form
pub fn index() -> String {
    layout(
        "jlinx",
        r#"    <h1>Resolve a DID</h1>
    <form method="get" action="/">
      <input type="text" name="did" placeholder="did:jlinx:..." size="60" autofocus>
      <button type="submit">Resolve</button>
    </form>"#,
    )
}

/// Resolved document, `json` already pretty-printed
pub fn did(did: &str, json: &str) -> String {
    layout(
        did,
        &format!(
            "    <h1>{}</h1>\n    <pre><code>{}</code></pre>",
            escape_html(did),
            escape_html(json)
        ),
    )
}

pub fn error(message: &str) -> String {
    layout(
        "Error",
        &format!(
            "    <h1>Error</h1>\n    <p class=\"error\">{}</p>",
            escape_html(message)
        ),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
