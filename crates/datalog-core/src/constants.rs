//! Well-known strings shared between the storage and host sides.

/// Image sub-type marking a purpose-made thumbnail.
pub const SUB_TYPE_THUMBNAIL: &str = "thumbnail";

/// Prefix of the synthetic name given to objects without a usable name.
pub const FALLBACK_NAME_PREFIX: &str = "Data Set";

/// Metadata schema version assumed when an object does not declare one.
pub const DEFAULT_METADATA_VERSION: u32 = 1;

/// Build the synthetic display name for the `n`-th unnamed object (1-based).
#[must_use]
pub fn fallback_name(n: usize) -> String {
    format!("{FALLBACK_NAME_PREFIX} {n}")
}
