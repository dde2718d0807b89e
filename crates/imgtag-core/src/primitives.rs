//! # Engine Primitives
//!
//! Fixed runtime constants for the imgtag engine.
//!
//! These values are compiled into the binary and are immutable at runtime.

/// Page size of the main image listing.
pub const LISTING_PAGE_SIZE: usize = 40;

/// Maximum number of records returned by one tag-based sample.
///
/// The sample route pages over the matched identifiers in windows of this size.
pub const TAG_SAMPLE_CAP: usize = 60;

// =============================================================================
// SEEDED SHUFFLE (LCG)
// =============================================================================

/// LCG modulus, `2^31`.
pub const LCG_MODULUS: u64 = 1 << 31;

/// LCG multiplier.
pub const LCG_MULTIPLIER: u64 = 1_103_515_245;

/// LCG increment.
pub const LCG_INCREMENT: u64 = 12_345;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of tags accepted in a single request.
pub const MAX_TAGS_PER_REQUEST: usize = 100;

/// Maximum length of a single tag, in bytes.
pub const MAX_TAG_LENGTH: usize = 128;
