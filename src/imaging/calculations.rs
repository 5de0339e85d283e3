//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Dimensions that fit `original` inside a `max` x `max` square.
///
/// Aspect ratio is preserved and images already inside the box are returned
/// unchanged. Neither side rounds below 1px.
///
/// ```
/// # use geogal::imaging::fit_within_box;
/// assert_eq!(fit_within_box((1600, 1200), 1024), (1024, 768));
/// assert_eq!(fit_within_box((1200, 1600), 320), (240, 320));
/// assert_eq!(fit_within_box((300, 200), 640), (300, 200));
/// ```
pub fn fit_within_box(original: (u32, u32), max: u32) -> (u32, u32) {
    let (w, h) = original;
    let longer = w.max(h);
    if longer <= max || longer == 0 {
        return (w, h);
    }

    let scale = max as f64 / longer as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    if w >= h {
        (max, scaled(h))
    } else {
        (scaled(w), max)
    }
}

/// Select the thumbnail widths to generate for an image of `native_width`.
///
/// Keeps configured order, drops duplicates, and drops every width at or
/// above the native width: a thumbnail is only worth writing if it is
/// smaller than the original.
///
/// ```
/// # use geogal::imaging::thumbnail_widths;
/// assert_eq!(thumbnail_widths(600, &[1024, 320, 120]), vec![320, 120]);
/// assert_eq!(thumbnail_widths(1600, &[320, 1024, 320]), vec![320, 1024]);
/// ```
pub fn thumbnail_widths(native_width: u32, requested: &[u32]) -> Vec<u32> {
    let mut widths: Vec<u32> = Vec::with_capacity(requested.len());
    for &w in requested {
        if w > 0 && w < native_width && !widths.contains(&w) {
            widths.push(w);
        }
    }
    widths
}
