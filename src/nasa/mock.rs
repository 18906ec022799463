use serde_json::{json, Value};

/// Returns up to `count` built-in APOD entries
///
/// Served in place of the real APOD feed when NASA is unreachable or returns
/// nothing, so the gallery is never empty.
pub fn mock_apod(count: u32) -> Value {
    let entries = [
        json!({
            "title": "Nebula in Deep Space",
            "explanation": "A stunning view of a cosmic nebula captured by advanced telescopes, showcasing the birth of new stars.",
            "url": "https://images.unsplash.com/photo-1462331940025-496dfbfc7564?w=1200",
            "media_type": "image",
            "date": "2024-11-01"
        }),
        json!({
            "title": "Galaxy Cluster",
            "explanation": "An incredible collection of galaxies spanning millions of light-years across the universe.",
            "url": "https://images.unsplash.com/photo-1419242902214-272b3f66ee7a?w=1200",
            "media_type": "image",
            "date": "2024-11-02"
        }),
        json!({
            "title": "Spiral Galaxy",
            "explanation": "A beautiful spiral galaxy with distinct arms of stars, gas, and dust.",
            "url": "https://images.unsplash.com/photo-1543722530-d2c3201371e7?w=1200",
            "media_type": "image",
            "date": "2024-11-03"
        }),
        json!({
            "title": "Star Formation Region",
            "explanation": "A region of active star formation where cosmic clouds collapse to create new stellar systems.",
            "url": "https://images.unsplash.com/photo-1506318137071-a8e063b4bec0?w=1200",
            "media_type": "image",
            "date": "2024-11-04"
        }),
        json!({
            "title": "Cosmic Pillars",
            "explanation": "Towering pillars of gas and dust in a star-forming region of space.",
            "url": "https://images.unsplash.com/photo-1444703686981-a3abbc4d4fe3?w=1200",
            "media_type": "image",
            "date": "2024-11-05"
        }),
    ];

    Value::Array(entries.into_iter().take(count as usize).collect())
}
