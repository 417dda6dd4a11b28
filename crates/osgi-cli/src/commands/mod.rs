//! Command implementations for osgi-cli

pub mod bundles;
pub mod check;
pub mod provides;
pub mod resolve;

pub use bundles::run_bundles;
pub use check::run_check;
pub use provides::run_provides;
pub use resolve::run_resolve;
