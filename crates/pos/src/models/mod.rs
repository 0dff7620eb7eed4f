//! Session-stored model types.

pub mod session;

pub use session::{Flash, FlashLevel, OrderDraft, keys};
