//! Cross-references between annotations, outlines and pages.

mod outlines;
mod replies;

pub use outlines::{OutlineKey, OutlineLocator};
pub use replies::{object_index, resolve_replies, ReplyKind};
