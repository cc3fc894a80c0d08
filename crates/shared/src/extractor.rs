use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};

/// Container tags tried in order when looking for the main article body.
const CONTAINER_TAGS: [&str; 4] = ["article", "main", "div", "p"];

/// Class names that mark a container as article content.
const CONTENT_CLASSES: [&str; 4] = [
    "article-content",
    "post-content",
    "entry-content",
    "story-content",
];

/// Outcome of an extraction attempt. Failures are not raised; the reason
/// is carried so the shell can display it, and it must never be stored
/// as working article text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    Failed(String),
}

impl Extraction {
    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed(_))
    }
}

pub struct ArticleExtractor {
    client: Client,
}

impl ArticleExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; MakePodcast/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch a page and return its best-effort article text.
    pub async fn extract(&self, url: &str) -> Extraction {
        let html = match self.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => return Extraction::Failed(format!("Error fetching URL: {}", e)),
        };

        match extract_article_text(&html) {
            Ok(text) => Extraction::Text(text),
            Err(e) => Extraction::Failed(format!("Error parsing content: {}", e)),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let url = url::Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

/// Pull article text out of an HTML document.
///
/// Tries each container tag in order, filtered by the content-class
/// allow-list; the first match wins. Falls back to concatenating every
/// paragraph's text, which may legitimately be empty.
pub fn extract_article_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);

    for tag in CONTAINER_TAGS {
        // One grouped selector per tag so the first match in document
        // order wins, whichever allowed class it carries.
        let grouped = CONTENT_CLASSES
            .iter()
            .map(|class| format!("{}.{}", tag, class))
            .collect::<Vec<String>>()
            .join(", ");
        let selector = Selector::parse(&grouped)
            .map_err(|e| anyhow::anyhow!("Invalid selector for {}: {}", tag, e))?;

        if let Some(element) = document.select(&selector).next() {
            let text: Vec<&str> = element
                .text()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();
            return Ok(text.join("\n"));
        }
    }

    // Fallback: gather all paragraph text
    let paragraph = Selector::parse("p")
        .map_err(|e| anyhow::anyhow!("Invalid paragraph selector: {}", e))?;

    let paragraphs: Vec<String> = document
        .select(&paragraph)
        .map(|p| {
            p.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .collect();

    Ok(paragraphs.join("\n"))
}
