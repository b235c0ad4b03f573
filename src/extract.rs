use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::norm::{host_of, normalize};

/// Absolute, normalized image URLs found on one page.
///
/// Looks at `img[src]` plus the first candidate of any `srcset` on
/// `img` and `source` elements. Non-http(s) results (data URIs and the
/// like) are dropped. The caller owns dedup across pages; within one
/// page the returned list is already duplicate-free.
pub fn extract_images(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);

    let mut out = Vec::new();
    collect_attr_urls(&doc, base, "img[src]", "src", false, &mut out);
    collect_attr_urls(&doc, base, "img[srcset]", "srcset", true, &mut out);
    collect_attr_urls(&doc, base, "source[srcset]", "srcset", true, &mut out);

    out.sort();
    out.dedup();
    out
}

/// Candidate same-host links from one page: every `a[href]` resolved
/// against `base`, normalized, with unparseable, hostless and cross-host
/// URLs dropped. Frontier admission (visited test-and-set, depth) is the
/// scheduler's job, not this function's.
pub fn extract_links(html: &str, base: &Url, allowed_host: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut out = Vec::new();
    for el in doc.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href.trim()) else {
            debug!(href, "dropping unresolvable link");
            continue;
        };
        let Ok(normalized) = normalize(resolved.as_str()) else {
            continue;
        };
        let Some(host) = host_of(&normalized) else {
            continue;
        };
        if !host.eq_ignore_ascii_case(allowed_host) {
            debug!(url = %normalized, "dropping cross-host link");
            continue;
        }
        out.push(normalized);
    }

    out
}

fn collect_attr_urls(
    doc: &Html,
    base: &Url,
    selector: &str,
    attr: &str,
    is_srcset: bool,
    out: &mut Vec<String>,
) {
    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(_) => return,
    };

    for el in doc.select(&selector) {
        let Some(value) = el.value().attr(attr) else {
            continue;
        };
        let candidate = if is_srcset {
            match first_srcset_candidate(value) {
                Some(c) => c,
                None => continue,
            }
        } else {
            value.trim()
        };
        if candidate.is_empty() {
            continue;
        }
        let Ok(resolved) = base.join(candidate) else {
            continue;
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        if let Ok(normalized) = normalize(resolved.as_str()) {
            out.push(normalized);
        }
    }
}

// srcset is "url [descriptor], url [descriptor], ..."; only the first
// candidate URL matters here.
fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()?
        .trim()
        .split_whitespace()
        .next()
}
