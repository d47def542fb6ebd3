//! Link-stub synthesis for responses the dispatcher routes away from
//! HTML extraction

use clipper_dom::serialize::{escape, escape_attribute};
use clipper_types::{FetchedResponse, MimeInfo};
use tracing::debug;

/// Build the substitute HTML for a `link`-dispatched response.
///
/// PDFs get their text appended below the download link, images render
/// inline, `text/plain` bodies are shown verbatim in a `<pre>` block, and
/// everything else becomes a bare download link.
pub fn attachment_html(info: &MimeInfo, response: &FetchedResponse) -> String {
    let url = escape_attribute(&response.effective_url);
    let name = info.name.as_deref().unwrap_or("file");

    if info.mime == "application/pdf" {
        let mut html = format!("<a href=\"{url}\">Download PDF</a>");
        if let Some(text) = pdf_text(&response.body) {
            html.push_str(&paragraphs(&text));
        }
        return html;
    }

    if info.kind == "image" {
        return format!("<a href=\"{url}\"><img src=\"{url}\" alt=\"{}\"/></a>", escape_attribute(name));
    }

    if info.mime == "text/plain" {
        return format!("<pre>{}</pre>", escape(&response.body_text()));
    }

    format!("<a href=\"{url}\">Download {}</a>", escape(name))
}

/// Extract text from the downloaded PDF bytes. Failures only cost the
/// preview text, never the link stub.
fn pdf_text(body: &[u8]) -> Option<String> {
    let document = match lopdf::Document::load_mem(body) {
        Ok(document) => document,
        Err(err) => {
            debug!(error = %err, "PDF body not parseable, emitting bare link");
            return None;
        }
    };

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    match document.extract_text(&pages) {
        Ok(text) => {
            let text = text.trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        Err(err) => {
            debug!(error = %err, "PDF text extraction failed");
            None
        }
    }
}

fn paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>", escape(line)))
        .collect()
}
