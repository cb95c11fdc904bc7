//! Placement of generated images inside article markup.
//!
//! The first image (hero) goes right after the first closing `</p>`. Every
//! following image goes in front of the next `<h2>` that has not received a
//! figure yet. Placement is a fold over the URLs carrying the markup and a
//! search cursor, so each heading search runs on the already-mutated markup.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static PARAGRAPH_CLOSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p\s*>").unwrap());
static H2_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h2(?:\s[^>]*)?>").unwrap());

/// Figure markup for the image at 0-based `index`.
pub fn figure_block(url: &str, index: usize) -> String {
    let number = index + 1;
    format!(
        "\n<figure class=\"article-image\">\n  <img src=\"{}\" alt=\"Image {}\" loading=\"lazy\" />\n  <figcaption>Figure {}</figcaption>\n</figure>\n",
        escape_attr(url),
        number,
        number
    )
}

/// Insert one figure per image URL into `html`.
///
/// A hero image is dropped when the markup has no `</p>`; section images that
/// find no remaining `<h2>` are dropped as well.
pub fn place_images<S: AsRef<str>>(html: &str, urls: &[S]) -> String {
    let (markup, _cursor) = urls.iter().enumerate().fold(
        (html.to_string(), 0usize),
        |(markup, cursor), (index, url)| {
            let figure = figure_block(url.as_ref(), index);
            if index == 0 {
                place_hero(markup, cursor, &figure)
            } else {
                place_before_section(markup, cursor, &figure, index)
            }
        },
    );
    markup
}

fn place_hero(markup: String, cursor: usize, figure: &str) -> (String, usize) {
    match PARAGRAPH_CLOSE_REGEX.find(&markup) {
        Some(close) => {
            let at = close.end();
            let placed = splice(&markup, at, figure);
            // Headings before the hero position are still eligible.
            (placed, cursor)
        }
        None => {
            debug!("no closing paragraph tag; hero image dropped");
            (markup, cursor)
        }
    }
}

fn place_before_section(
    markup: String,
    cursor: usize,
    figure: &str,
    index: usize,
) -> (String, usize) {
    match H2_OPEN_REGEX.find_at(&markup, cursor) {
        Some(heading) => {
            let at = heading.start();
            let placed = splice(&markup, at, figure);
            // Continue after the heading tag that just received a figure.
            let next_cursor = at + figure.len() + heading.as_str().len();
            (placed, next_cursor)
        }
        None => {
            debug!(image = index + 1, "no remaining <h2>; section image dropped");
            (markup, cursor)
        }
    }
}

fn splice(markup: &str, at: usize, insert: &str) -> String {
    let mut out = String::with_capacity(markup.len() + insert.len());
    out.push_str(&markup[..at]);
    out.push_str(insert);
    out.push_str(&markup[at..]);
    out
}

// Only quotes would break the attribute. `&` stays literal so the URL reads
// back unchanged from the markup.
fn escape_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}
