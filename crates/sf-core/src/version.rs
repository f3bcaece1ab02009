//! Engine version, plus the legacy single-integer encoding exposed to
//! coupled models.

pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Encode a version triple as `major*10000 + minor*1000 + patch`.
pub const fn encode_version(major: u32, minor: u32, patch: u32) -> i32 {
    (major * 10_000 + minor * 1_000 + patch) as i32
}

/// The running engine's encoded version.
pub const ENGINE_VERSION: i32 = encode_version(VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH);

/// Human-readable `major.minor.patch`.
pub fn version_string() -> String {
    format!("{VERSION_MAJOR}.{VERSION_MINOR}.{VERSION_PATCH}")
}
