//! Seam Scroll
//!
//! Coordinated nested scrolling for a container that stacks an embedded
//! content region above a list.
//!
//! # Features
//!
//! - **Coordinator**: Owns the container offset and arbitrates every drag and
//!   fling between the two children
//! - **Embedded Content**: Scroller for content whose height is only known by
//!   asking it, gated on the container sitting at the top
//! - **Fling Handoff**: Momentum that reaches a boundary continues in the peer
//!   on the other side, exactly once per fling
//! - **Headless Playback**: In-memory peers and scripted gestures driven by a
//!   virtual frame clock (`headless` feature)
//!
//! Everything is single-threaded: components share `Rc` handles and refer to
//! each other through `Weak` links, so dropping the host tears the graph down.

pub mod config;
pub mod content;
pub mod coordinator;
pub mod error;
pub mod nested;
pub mod peer;
pub mod session;

#[cfg(feature = "headless")]
pub mod headless;

pub use config::ScrollConfig;
pub use content::{EmbeddedContentScroller, ScrollSplit};
pub use coordinator::{ChildFrame, ChildSlot, LayoutPass, ScrollCallback, ScrollCoordinator};
pub use error::{ConfigError, Result};
pub use nested::{NestedScrollChildHelper, NestedScrollParentHelper};
pub use peer::{
    ContentRegion, ContentSource, NestedScrollParent, PeerRole, ScrollAxis, ScrollableRegion,
};
pub use session::{ContentGesture, FlingSession, GestureSession};
