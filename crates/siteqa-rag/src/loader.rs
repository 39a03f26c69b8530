//! Single-page web document loader

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use siteqa_core::{Document, DocumentLoader, DocumentMetadata, Error, Result};

/// Elements whose text never reaches the document
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Elements followed by a separator so adjacent blocks don't run together
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

/// Loader that fetches one URL over HTTP and extracts its visible text
pub struct WebDocumentLoader {
    client: Client,
}

impl WebDocumentLoader {
    /// Create a loader whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("siteqa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client })
    }

    /// Turn a fetched body into documents.
    ///
    /// HTML (or an unlabelled body) is parsed; other `text/*` bodies are used
    /// verbatim. Returns an empty list when no text survives normalization.
    pub fn parse_page(url: &Url, body: &str, content_type: Option<&str>) -> Result<Vec<Document>> {
        let content_type = content_type.unwrap_or("").to_ascii_lowercase();
        let id = format!("{:x}", md5::compute(url.as_str().as_bytes()));

        let document = if content_type.is_empty() || content_type.contains("html") {
            let (text, metadata) = extract_html(url, body)?;
            Document::new(id, url.as_str(), &text, metadata)
        } else if content_type.starts_with("text/") {
            Document::new(id, url.as_str(), body, DocumentMetadata::default())
        } else {
            return Err(Error::Load(format!(
                "Unsupported content type: {}",
                content_type
            )));
        };

        if document.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![document])
    }
}

#[async_trait]
impl DocumentLoader for WebDocumentLoader {
    async fn load(&self, url: &str) -> Result<Vec<Document>> {
        let parsed = Url::parse(url.trim()).map_err(|e| Error::Load(format!("{url}: {e}")))?;

        debug!(url = %parsed, "fetching page");
        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| Error::Load(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Load(format!("{} returned status {}", parsed, status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| Error::Load(e.to_string()))?;

        let documents = Self::parse_page(&parsed, &body, content_type.as_deref())?;
        if documents.is_empty() {
            return Err(Error::Load(
                "No documents found from the URL. Please try a different URL.".to_string(),
            ));
        }

        info!(url = %parsed, documents = documents.len(), "page loaded");
        Ok(documents)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Load(format!("invalid selector {css}: {e}")))
}

/// Visible text plus page metadata
fn extract_html(url: &Url, body: &str) -> Result<(String, DocumentMetadata)> {
    let html = Html::parse_document(body);

    let title = html
        .select(&selector("title")?)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let description = meta_content(&html, r#"meta[name="description"]"#)?;

    let language = html
        .root_element()
        .value()
        .attr("lang")
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    let image_url = meta_content(&html, r#"meta[property="og:image"]"#)?
        .and_then(|raw| url.join(&raw).ok())
        .map(|u| u.to_string());

    let mut text = String::new();
    collect_text(html.root_element(), &mut text);

    Ok((
        text,
        DocumentMetadata {
            title,
            description,
            language,
            image_url,
        },
    ))
}

fn meta_content(html: &Html, css: &str) -> Result<Option<String>> {
    Ok(html
        .select(&selector(css)?)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string))
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if SKIPPED_TAGS.contains(&el.name()) => {}
            Node::Element(el) => {
                let is_block = BLOCK_TAGS.contains(&el.name());
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if is_block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
