#![no_main]

use libfuzzer_sys::fuzz_target;

use penman::markup::{calculate_stats, html_to_markdown, place_images};

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    // None of the markup transforms may panic, whatever the model returns.
    let markdown = html_to_markdown(&html);
    assert!(!markdown.contains("\n\n\n"));

    let stats = calculate_stats(&html);
    let placed = place_images(&html, &["https://img.example/a.png", "https://img.example/b.png"]);
    assert!(calculate_stats(&placed).image_count >= stats.image_count);
});
