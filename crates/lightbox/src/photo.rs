//! Photo descriptors.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a photo. Lists of photos are `Rc<[PhotoRef]>`.
pub type PhotoRef = Rc<PhotoItem>;

/// One photo of a lightbox list.
///
/// Two items are the same photo when their URLs are equal; the other fields
/// are presentation hints.
pub struct PhotoItem {
    url: String,
    content_description: Option<String>,
    thumbnail: Option<String>,
    use_thumbnail_when_loading: bool,
    /// Width over height of the decoded full image, NaN until reported.
    aspect_ratio: Cell<f32>,
}

impl PhotoItem {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_description: None,
            thumbnail: None,
            use_thumbnail_when_loading: true,
            aspect_ratio: Cell::new(f32::NAN),
        }
    }

    pub fn with_content_description(mut self, description: impl Into<String>) -> Self {
        self.content_description = Some(description.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_thumbnail_when_loading(mut self, enabled: bool) -> Self {
        self.use_thumbnail_when_loading = enabled;
        self
    }

    pub fn into_ref(self) -> PhotoRef {
        Rc::new(self)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_description(&self) -> Option<&str> {
        self.content_description.as_deref()
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    pub fn use_thumbnail_when_loading(&self) -> bool {
        self.use_thumbnail_when_loading
    }

    /// Width over height of the full image, once its size has been reported.
    pub fn aspect_ratio(&self) -> Option<f32> {
        let ratio = self.aspect_ratio.get();
        ratio.is_finite().then_some(ratio)
    }

    /// Records the decoded image size. Returns false, leaving the cached
    /// ratio untouched, when the size is unusable (a failed load).
    pub fn report_intrinsic_size(&self, width: f32, height: f32) -> bool {
        let valid = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
        if !valid {
            log::warn!(
                "ignoring intrinsic size {width}x{height} reported for {}",
                self.url
            );
            return false;
        }
        self.aspect_ratio.set(width / height);
        true
    }
}

impl PartialEq for PhotoItem {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for PhotoItem {}

impl fmt::Debug for PhotoItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoItem")
            .field("url", &self.url)
            .field("aspect_ratio", &self.aspect_ratio())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_the_url() {
        let a = PhotoItem::new("https://example.com/a.jpg").with_content_description("a cat");
        let b = PhotoItem::new("https://example.com/a.jpg").with_thumbnail("thumb.jpg");
        assert_eq!(a, b);
        assert_ne!(a, PhotoItem::new("https://example.com/b.jpg"));
    }

    #[test]
    fn aspect_ratio_starts_unset_and_survives_failed_loads() {
        let photo = PhotoItem::new("p");
        assert_eq!(photo.aspect_ratio(), None);
        assert!(!photo.report_intrinsic_size(0.0, 100.0));
        assert_eq!(photo.aspect_ratio(), None);

        assert!(photo.report_intrinsic_size(400.0, 200.0));
        assert_eq!(photo.aspect_ratio(), Some(2.0));
        assert!(!photo.report_intrinsic_size(f32::NAN, 10.0));
        assert_eq!(photo.aspect_ratio(), Some(2.0));
    }
}
