//! Gesture-driven photo lightbox.
//!
//! [`LightboxState`] is the viewer: it holds the photo list, the animated
//! scale, pan, dismiss and closing progress, and interprets transform
//! gestures as zooming, dismissing or paging. [`LightboxHost`] connects a
//! state to a surface: layout, raw pointer input, frames and back
//! navigation go in, a [`LightboxFrame`] to render comes out.
//!
//! ```
//! use lightbox::{LightboxHost, LightboxState, PhotoItem, PhotoList};
//! use lightbox_core::{DefaultScheduler, Runtime};
//! use lightbox_ui_graphics::{LayoutDirection, Size};
//! use std::sync::Arc;
//!
//! let runtime = Runtime::new(Arc::new(DefaultScheduler));
//! let mut host = LightboxHost::mount(LightboxState::new(), runtime.handle());
//! host.on_layout(Size::new(1080.0, 1920.0), 2.0, LayoutDirection::Ltr);
//!
//! let photos: PhotoList = vec![
//!     PhotoItem::new("https://example.com/1.jpg").into_ref(),
//!     PhotoItem::new("https://example.com/2.jpg").into_ref(),
//! ]
//! .into();
//! host.state().open(&photos[0], photos.clone(), None);
//! host.state().go_next();
//! assert!(host.frame().open);
//! ```

mod config;
mod host;
mod motion;
mod photo;
mod saved_state;
mod state;

pub use config::LightboxConfig;
pub use host::{LightboxFrame, LightboxHost};
pub use motion::Motion;
pub use photo::{PhotoItem, PhotoRef};
pub use saved_state::{RestoreError, SavedLightboxState, SavedPhoto};
pub use state::{LightboxState, PhotoList};

pub mod prelude {
    pub use crate::host::{LightboxFrame, LightboxHost};
    pub use crate::photo::{PhotoItem, PhotoRef};
    pub use crate::state::{LightboxState, PhotoList};
    pub use crate::Motion;
}
