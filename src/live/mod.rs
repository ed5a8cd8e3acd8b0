//! Live-page integration over the Chrome DevTools Protocol.

pub mod page;
pub mod scripts;
pub mod watcher;

pub use page::{CdpPage, PageContext, PageError};
pub use watcher::LiveWatcher;
