//! Zenodo record file locations.
//!
//! Only URL construction lives here; fetching is left to the caller's HTTP
//! client.

/// Used when a source does not name a Zenodo instance.
pub const DEFAULT_ZENODO_URL: &str = "https://zenodo.org";

/// Download URL for `file_name` in record `zenodo_id`.
///
/// # Example
///
/// ```
/// use wcon_dialect::zenodo::file_download_url;
///
/// assert_eq!(
///     file_download_url(None, 4074963, "MWT.tar.gz"),
///     "https://zenodo.org/record/4074963/files/MWT.tar.gz?download=1"
/// );
/// assert_eq!(
///     file_download_url(Some("https://sandbox.zenodo.org/"), 1, "a.zip"),
///     "https://sandbox.zenodo.org/record/1/files/a.zip?download=1"
/// );
/// ```
pub fn file_download_url(base_url: Option<&str>, zenodo_id: u64, file_name: &str) -> String {
    let base = base_url
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_ZENODO_URL)
        .trim_end_matches('/');
    format!("{base}/record/{zenodo_id}/files/{file_name}?download=1")
}
