use crate::domain::release::Release;

use super::models::GhRelease;

/// Fills the gaps the API leaves: unnamed releases use their tag, releases
/// without a tarball link point at their release page. A present name is kept
/// byte for byte.
pub(crate) fn normalize_release(raw: GhRelease) -> Release {
    let name = raw
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(raw.tag_name);
    let download_url = raw
        .tarball_url
        .filter(|url| !url.is_empty())
        .unwrap_or(raw.html_url);

    Release {
        name,
        created_at: raw.created_at,
        download_url,
    }
}
