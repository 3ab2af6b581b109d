//! Historical price series for a single symbol.
//!
//! The crate exposes one seam, [`providers::DataProvider`], plus the
//! vendor-agnostic request and series models every provider speaks. Concrete
//! providers live under [`providers`] and are picked at runtime through
//! [`providers::registry::build_provider`].

pub mod models;
pub mod providers;
pub mod tz;
