//! Image digest resolution from pod status

use crate::domain::{ContainerStatus, Pod};
use crate::error::Result;
use crate::error::bundle::digest_unresolved;

/// Resolved digest of `image` as reported by `pod`.
///
/// Init container statuses are searched before regular container statuses.
/// The first status running `image` with a non-empty image ID wins.
pub fn resolve_image_digest(pod: &Pod, image: &str) -> Result<String> {
    let statuses = pod
        .status
        .init_container_statuses
        .iter()
        .chain(pod.status.container_statuses.iter());

    find_image_id(statuses, image)
        .map(str::to_string)
        .ok_or_else(|| digest_unresolved(image, pod.metadata.key().to_string()))
}

fn find_image_id<'a>(
    mut statuses: impl Iterator<Item = &'a ContainerStatus>,
    image: &str,
) -> Option<&'a str> {
    statuses
        .find(|s| s.image == image && !s.image_id.is_empty())
        .map(|s| s.image_id.as_str())
}
