pub mod client;
pub mod common;
pub mod pbs;

#[cfg(test)]
pub(crate) mod tests;

pub type Error = crate::common::error::PspaceError;
pub type Result<T> = std::result::Result<T, Error>;

pub type Map<K, V> = std::collections::BTreeMap<K, V>;
pub type Set<T> = std::collections::BTreeSet<T>;

/// Name of the configuration file that describes one parameter space.
pub const CONF_FILENAME: &str = "pspace.conf";

pub const PSPACE_VERSION: &str = {
    match option_env!("PSPACE_BUILD_VERSION") {
        Some(version) => version,
        None => const_format::concatcp!(env!("CARGO_PKG_VERSION"), "-dev"),
    }
};
