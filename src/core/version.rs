//! Build metadata generated by the build script.
//! Includes the generated version.rs so the binary and library share one source of truth.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Per-topic capacity used when no capacity is configured
pub fn default_topic_capacity() -> usize {
    DEFAULT_TOPIC_CAPACITY
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// Long version string shown by `topicq --version`
pub fn long_version() -> String {
    format!(
        "{} (git {}, built {})",
        env!("CARGO_PKG_VERSION"),
        git_hash(),
        build_time()
    )
}
