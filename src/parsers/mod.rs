//! Static HTML helpers used where pages are available as text rather than
//! through a live browser.

pub mod html;

pub use html::{has_match, select_hrefs};
