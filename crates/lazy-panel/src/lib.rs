//! # lazy-panel
//!
//! Drives the licensing panel's admin pages with a headless Chromium to
//! mint keys and reset hardware bindings.
//!
//! The panel has no API, so every operation is a fixed script of page
//! steps against its current markup. Any failed step aborts the script and
//! the browser is always shut down afterwards.

pub mod driver;
pub mod parse;
pub mod selectors;
pub mod step;

pub use driver::BrowserKeyPanel;
pub use parse::extract_key;
pub use step::PanelStep;
