use std::sync::Arc;

use rouille::{Request, Response, post_input};
use tokio::runtime::Handle;
use tracing::info;

use crate::config::CrawlConfig;
use crate::crawl::Crawler;

/// `POST /main` with a form field `url`. Blank or missing input is a
/// 400 with an empty JSON array; every other outcome, including zero
/// images found, is a 200 with the JSON array of sorted image URLs.
pub struct Endpoint<F> {
    crawl: F,
}

impl<F> Endpoint<F>
where
    F: Fn(&str) -> Vec<String>,
{
    pub fn new(crawl: F) -> Self {
        Self { crawl }
    }

    pub fn handle(&self, request: &Request) -> Response {
        if request.method() != "POST" || request.url() != "/main" {
            return Response::empty_404();
        }

        let url = match post_input!(request, { url: String }) {
            Ok(input) => input.url,
            Err(_) => return json_array(&[]).with_status_code(400),
        };
        if url.trim().is_empty() {
            return json_array(&[]).with_status_code(400);
        }

        json_array(&(self.crawl)(&url))
    }
}

fn json_array(urls: &[String]) -> Response {
    let body = serde_json::to_string(urls).unwrap_or_else(|_| "[]".to_string());
    Response::from_data("application/json", body)
}

/// Blocks forever serving the crawl endpoint. rouille workers are plain
/// threads, so blocking them on the supplied tokio handle is fine.
pub fn run(addr: &str, config: CrawlConfig, handle: Handle) -> ! {
    let crawler = Arc::new(Crawler::new(config));
    let endpoint = Endpoint::new(move |seed: &str| handle.block_on(crawler.crawl_images(seed)));

    info!(addr, "serving crawl endpoint");
    rouille::start_server(addr, move |request| endpoint.handle(request))
}
