//! Image Inlining
//!
//! Scans rendered markup for `<img>` references, fetches every remote
//! resource concurrently, and substitutes each `src` with an embedded
//! base64 data URL so the exported document works offline. A failed fetch
//! is non-fatal: that image's alt text is annotated and the export
//! continues with the rest.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::future::join_all;
use tracing::warn;

use crate::client::ApiClient;

/// Marker appended to the alt text of an image that could not be embedded
pub const FAILED_EMBED_MARKER: &str = " (failed to embed)";

/// Outcome counts of one inlining pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedReport {
    pub embedded: usize,
    pub failed: usize,
    /// Sources skipped because they were empty or already data URLs
    pub skipped: usize,
}

struct ImgTag {
    /// Byte range of the whole tag in the source markup
    start: usize,
    end: usize,
    src: String,
}

/// Inline every remote image in `html`. Fetches run concurrently; the
/// rewritten markup and a tally are returned. The pass never fails as a
/// whole - one bad image must not abort the export.
pub async fn inline_images(client: &ApiClient, html: &str) -> (String, EmbedReport) {
    let tags = scan_img_tags(html);
    if tags.is_empty() {
        return (html.to_string(), EmbedReport::default());
    }

    // Deduplicated fetch set; several components can reference the same
    // rendered graph.
    let mut pending: Vec<&str> = Vec::new();
    for tag in &tags {
        if !tag.src.is_empty()
            && !tag.src.starts_with("data:")
            && !pending.contains(&tag.src.as_str())
        {
            pending.push(&tag.src);
        }
    }

    let fetched: HashMap<String, Option<String>> = join_all(pending.into_iter().map(|src| {
        let client = client.clone();
        async move {
            let data_url = fetch_data_url(&client, src).await;
            (src.to_string(), data_url)
        }
    }))
    .await
    .into_iter()
    .collect();

    let mut report = EmbedReport::default();
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;

    for tag in &tags {
        out.push_str(&html[cursor..tag.start]);
        let original = &html[tag.start..tag.end];

        if tag.src.is_empty() || tag.src.starts_with("data:") {
            report.skipped += 1;
            out.push_str(original);
        } else {
            match fetched.get(&tag.src).and_then(|r| r.as_deref()) {
                Some(data_url) => {
                    report.embedded += 1;
                    out.push_str(&replace_attr_value(original, "src", data_url));
                }
                None => {
                    report.failed += 1;
                    out.push_str(&annotate_alt(original));
                }
            }
        }
        cursor = tag.end;
    }
    out.push_str(&html[cursor..]);

    (out, report)
}

/// Undo attribute escaping before using an extracted URL on the wire
fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

async fn fetch_data_url(client: &ApiClient, src: &str) -> Option<String> {
    match client.fetch_bytes(&unescape_attr(src)).await {
        Ok((content_type, bytes)) => {
            let mime = content_type.unwrap_or_else(|| mime_for_url(src).to_string());
            Some(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
        }
        Err(e) => {
            warn!(%src, "could not embed image: {e}");
            None
        }
    }
}

fn mime_for_url(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    if lower.ends_with(".svg") {
        "image/svg+xml"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else {
        "image/png"
    }
}

/// Locate every `<img ...>` tag and its `src` value. Attribute values are
/// double-quoted with quotes escaped, so a plain scan is sufficient.
fn scan_img_tags(html: &str) -> Vec<ImgTag> {
    let mut tags = Vec::new();
    let mut offset = 0;

    while let Some(found) = html[offset..].find("<img") {
        let start = offset + found;
        let Some(close) = html[start..].find('>') else {
            break;
        };
        let end = start + close + 1;
        let tag = &html[start..end];
        let src = attr_value(tag, "src").unwrap_or_default().to_string();
        tags.push(ImgTag { start, end, src });
        offset = end;
    }

    tags
}

fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')? + start;
    Some(&tag[start..end])
}

fn replace_attr_value(tag: &str, name: &str, value: &str) -> String {
    let needle = format!("{name}=\"");
    let Some(start) = tag.find(&needle).map(|p| p + needle.len()) else {
        return tag.to_string();
    };
    let Some(end) = tag[start..].find('"').map(|p| p + start) else {
        return tag.to_string();
    };
    format!("{}{}{}", &tag[..start], value, &tag[end..])
}

/// Mark an image that failed to embed by annotating its alt text
fn annotate_alt(tag: &str) -> String {
    match attr_value(tag, "alt") {
        Some(alt) => replace_attr_value(tag, "alt", &format!("{alt}{FAILED_EMBED_MARKER}")),
        None => {
            // No alt attribute; add one right after "<img"
            let mut out = tag.to_string();
            out.insert_str(4, &format!(" alt=\"{}\"", FAILED_EMBED_MARKER.trim_start()));
            out
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn client_for(url: String) -> ApiClient {
        ApiClient::new(&BackendConfig {
            api_base_url: url,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_scan_finds_tags_and_src() {
        let html = r#"<p>x</p><img src="http://a/1.png" alt="one" /><img src="" />"#;
        let tags = scan_img_tags(html);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].src, "http://a/1.png");
        assert_eq!(tags[1].src, "");
    }

    #[test]
    fn test_unescape_attr() {
        assert_eq!(
            unescape_attr("http://g/x.png?a=1&amp;b=2"),
            "http://g/x.png?a=1&b=2"
        );
    }

    #[test]
    fn test_annotate_alt() {
        let tag = r#"<img src="x" alt="graph" />"#;
        assert_eq!(
            annotate_alt(tag),
            r#"<img src="x" alt="graph (failed to embed)" />"#
        );
        let bare = r#"<img src="x" />"#;
        assert!(annotate_alt(bare).contains("alt=\"(failed to embed)\""));
    }

    #[tokio::test]
    async fn test_embeds_and_degrades_per_image() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/good.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body([1u8, 2, 3].as_slice())
            .create_async()
            .await;
        server
            .mock("GET", "/bad.png")
            .with_status(404)
            .create_async()
            .await;

        let html = format!(
            r#"<img src="{base}/good.png" alt="good" /><img src="{base}/bad.png" alt="bad" />"#,
            base = server.url()
        );
        let client = client_for(server.url());
        let (out, report) = inline_images(&client, &html).await;

        assert_eq!(report, EmbedReport { embedded: 1, failed: 1, skipped: 0 });
        assert!(out.contains("data:image/png;base64,AQID"));
        assert!(out.contains(r#"alt="bad (failed to embed)""#));
        // The good image's alt is untouched.
        assert!(out.contains(r#"alt="good""#));
    }

    #[tokio::test]
    async fn test_data_urls_are_skipped() {
        let server = mockito::Server::new_async().await;
        let client = client_for(server.url());
        let html = r#"<img src="data:image/png;base64,AAAA" alt="x" />"#;
        let (out, report) = inline_images(&client, html).await;
        assert_eq!(out, html);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_duplicate_sources_fetched_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/g.png")
            .with_status(200)
            .with_body([9u8].as_slice())
            .expect(1)
            .create_async()
            .await;

        let html = format!(
            r#"<img src="{base}/g.png" alt="a" /><img src="{base}/g.png" alt="b" />"#,
            base = server.url()
        );
        let client = client_for(server.url());
        let (_, report) = inline_images(&client, &html).await;
        assert_eq!(report.embedded, 2);
        mock.assert_async().await;
    }
}
