//! Search backend definitions
//!
//! The two image-search backends are a closed enum, each carrying its query
//! URL template, CSS selector, and a pure per-element extractor dispatched by
//! pattern match. Engine and query are sampled independently and uniformly
//! per crawl iteration.

use rand::seq::SliceRandom;
use scraper::ElementRef;

/// Fixed query pool sampled uniformly per crawl iteration
pub const PET_QUERIES: [&str; 20] = [
    "cute kittens",
    "puppies",
    "hamsters",
    "bunnies",
    "goldfish",
    "parrots",
    "turtles",
    "guinea pigs",
    "hedgehogs",
    "ferrets",
    "pet snakes",
    "pet lizards",
    "pet frogs",
    "pet spiders",
    "pet mice",
    "pet rats",
    "pet birds",
    "pet rabbits",
    "pet ducks",
    "pet chickens",
];

/// An image-search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    Bing,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 2] = [SearchEngine::Google, SearchEngine::Bing];

    /// Picks one backend uniformly at random
    pub fn random() -> SearchEngine {
        *Self::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&SearchEngine::Google)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchEngine::Google => "Google",
            SearchEngine::Bing => "Bing",
        }
    }

    /// Builds the query-escaped search URL for this backend
    pub fn search_url(&self, query: &str) -> String {
        let escaped: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        match self {
            SearchEngine::Google => {
                format!("https://www.google.com/search?tbm=isch&q={}", escaped)
            }
            SearchEngine::Bing => {
                format!("https://www.bing.com/images/search?q={}", escaped)
            }
        }
    }

    /// CSS selector matching candidate result elements for this backend
    pub fn selector(&self) -> &'static str {
        match self {
            SearchEngine::Google => "img",
            SearchEngine::Bing => "a.iusc",
        }
    }

    /// Extracts the image URL from one matched element
    ///
    /// Returns `None` when the element carries no usable URL.
    pub fn extract(&self, element: &ElementRef<'_>) -> Option<String> {
        let url = match self {
            SearchEngine::Google => element.value().attr("src")?.to_string(),
            SearchEngine::Bing => extract_bing_murl(element.value().attr("m")?)?,
        };
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }
}

/// Picks one query uniformly at random from the fixed pool
pub fn random_query() -> &'static str {
    PET_QUERIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("puppies")
}

/// Scans a Bing result's `m` attribute for the media URL
///
/// The attribute holds JSON-ish metadata; a raw string scan for `"murl":"` is
/// deliberately tolerant of malformed payloads.
fn extract_bing_murl(data: &str) -> Option<String> {
    let start = data.find(r#""murl":""#)? + r#""murl":""#.len();
    let end = data[start..].find('"')?;
    Some(data[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_search_url_escapes_query() {
        assert_eq!(
            SearchEngine::Google.search_url("cute kittens"),
            "https://www.google.com/search?tbm=isch&q=cute+kittens"
        );
        assert_eq!(
            SearchEngine::Bing.search_url("pet snakes"),
            "https://www.bing.com/images/search?q=pet+snakes"
        );
    }

    #[test]
    fn test_google_extracts_src_attribute() {
        let html = r#"<html><body><img src="https://example.com/cat.jpg"></body></html>"#;
        let document = Html::parse_document(html);
        let selector = Selector::parse(SearchEngine::Google.selector()).unwrap();
        let element = document.select(&selector).next().unwrap();

        assert_eq!(
            SearchEngine::Google.extract(&element),
            Some("https://example.com/cat.jpg".to_string())
        );
    }

    #[test]
    fn test_google_skips_img_without_src() {
        let html = r#"<html><body><img alt="no src"></body></html>"#;
        let document = Html::parse_document(html);
        let selector = Selector::parse("img").unwrap();
        let element = document.select(&selector).next().unwrap();

        assert_eq!(SearchEngine::Google.extract(&element), None);
    }

    #[test]
    fn test_bing_murl_extraction() {
        assert_eq!(
            extract_bing_murl(r#"{"murl":"https://example.com/dog.jpg","turl":"x"}"#),
            Some("https://example.com/dog.jpg".to_string())
        );
    }

    #[test]
    fn test_bing_murl_missing_key() {
        assert_eq!(extract_bing_murl(r#"{"turl":"x"}"#), None);
    }

    #[test]
    fn test_bing_murl_unterminated_value() {
        assert_eq!(extract_bing_murl(r#"{"murl":"https://example.com"#), None);
    }

    #[test]
    fn test_bing_extracts_from_m_attribute() {
        let html = r#"<html><body>
            <a class="iusc" m='{"murl":"https://example.com/bird.jpg"}'>x</a>
        </body></html>"#;
        let document = Html::parse_document(html);
        let selector = Selector::parse(SearchEngine::Bing.selector()).unwrap();
        let element = document.select(&selector).next().unwrap();

        assert_eq!(
            SearchEngine::Bing.extract(&element),
            Some("https://example.com/bird.jpg".to_string())
        );
    }

    #[test]
    fn test_random_sampling_stays_in_pools() {
        for _ in 0..50 {
            assert!(SearchEngine::ALL.contains(&SearchEngine::random()));
            assert!(PET_QUERIES.contains(&random_query()));
        }
    }
}
