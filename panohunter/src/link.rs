//! Panorama viewer links
//!
//! Links open the panorama directly in the Maps viewer. Coordinates carry ten
//! decimal places so the link is reproducible byte for byte from a record.

/// Domain used when none is configured.
pub const DEFAULT_LINK_DOMAIN: &str = "google.de";

/// Builds a viewer link on [`DEFAULT_LINK_DOMAIN`].
pub fn panorama_link(panorama_id: &str, lat: f64, lng: f64) -> String {
    panorama_link_with_domain(DEFAULT_LINK_DOMAIN, panorama_id, lat, lng)
}

/// Builds a viewer link on the given Maps domain (`google.com`, `google.ru`, ...).
pub fn panorama_link_with_domain(domain: &str, panorama_id: &str, lat: f64, lng: f64) -> String {
    format!(
        "https://www.{domain}/maps/@{lat:.10},{lng:.10},3a,75y,2.85h,90t/data=!3m6!1e1!3m4!1s{panorama_id}!2e0!7i13312!8i6656"
    )
}
