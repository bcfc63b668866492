//! Compile-time build information shown in the simulator banner.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// `<commit> (<date>)`
pub fn version_line() -> String {
    format!("{} ({})", BUILD_COMMIT, BUILD_DATE)
}
