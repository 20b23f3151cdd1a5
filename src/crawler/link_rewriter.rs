use crate::crawler::crawl_error::CrawlError;
use crate::crawler::crawl_scope::CrawlScope;
use crate::crawler::crawl_task::strip_url;
use crate::crawler::path_mapper::{map_to_local_path, relative_link};
use lol_html::{HtmlRewriter, Settings, element};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// An HTML page with its in-scope references pointed at the local mirror.
#[derive(Debug)]
pub struct RewrittenPage {
    pub html: Vec<u8>,
    /// In-scope targets in document order, fragment and query stripped.
    pub discovered: Vec<Url>,
}

/// Rewrites `href`/`src` references of a fetched page to relative local paths.
///
/// Only `a`/`link` (`href`) and `img`/`script`/`iframe` (`src`) are looked at.
/// References leaving the crawl scope are left untouched and not reported.
pub struct LinkRewriter {
    download_root: PathBuf,
    scope: CrawlScope,
}

impl LinkRewriter {
    pub fn new(download_root: impl Into<PathBuf>, scope: CrawlScope) -> Self {
        Self {
            download_root: download_root.into(),
            scope,
        }
    }

    pub fn rewrite(&self, html: &[u8], page_url: &Url) -> Result<RewrittenPage, CrawlError> {
        let page_path = map_to_local_path(&self.download_root, page_url);
        let mut output = Vec::with_capacity(html.len());
        let mut discovered = Vec::new();

        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("*", |el| {
                    let attribute = match reference_attribute(&el.tag_name()) {
                        Some(attribute) => attribute,
                        None => return Ok(()),
                    };
                    let Some(value) = el.get_attribute(attribute) else {
                        return Ok(());
                    };
                    // lol_html hands out and writes back attribute text still entity-encoded.
                    let value = html_escape::decode_html_entities(&value);
                    let Some(target) = self.resolve(&value, page_url) else {
                        return Ok(());
                    };

                    match self.local_reference(&page_path, &target) {
                        Some(relative) => el.set_attribute(
                            attribute,
                            &html_escape::encode_double_quoted_attribute(&relative),
                        )?,
                        None => debug!(url = %target, "no relative path to target, leaving reference"),
                    }
                    discovered.push(target);
                    Ok(())
                })],
                strict: false,
                ..Settings::default()
            },
            |chunk: &[u8]| output.extend_from_slice(chunk),
        );
        rewriter.write(html)?;
        rewriter.end()?;

        Ok(RewrittenPage {
            html: output,
            discovered,
        })
    }

    fn resolve(&self, value: &str, page_url: &Url) -> Option<Url> {
        if value.is_empty() || value.starts_with('#') {
            return None;
        }
        let absolute = match page_url.join(value) {
            Ok(absolute) => absolute,
            Err(e) => {
                warn!(page = %page_url, reference = value, error = %e, "skipping malformed reference");
                return None;
            }
        };
        let absolute = strip_url(&absolute);
        self.scope.contains(&absolute).then_some(absolute)
    }

    fn local_reference(&self, page_path: &Path, target: &Url) -> Option<String> {
        relative_link(page_path, &map_to_local_path(&self.download_root, target))
    }
}

fn reference_attribute(tag_name: &str) -> Option<&'static str> {
    match tag_name.to_ascii_lowercase().as_str() {
        "a" | "link" => Some("href"),
        "img" | "script" | "iframe" => Some("src"),
        _ => None,
    }
}
