//! Persisting the viewer across process restarts.
//!
//! Only the photo list and the current index are kept; zoom, pan and every
//! in-flight animation restart at rest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::LightboxConfig;
use crate::photo::{PhotoItem, PhotoRef};
use crate::state::{LightboxState, PhotoList};

/// Serialized form of a [`LightboxState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLightboxState {
    /// Index of the photo in view, or -1 when the viewer was closed.
    pub current_index: i64,
    pub photo_list: Option<Vec<SavedPhoto>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPhoto {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default = "default_use_thumbnail")]
    pub use_thumbnail_when_loading: bool,
}

fn default_use_thumbnail() -> bool {
    true
}

impl From<&PhotoItem> for SavedPhoto {
    fn from(photo: &PhotoItem) -> Self {
        Self {
            url: photo.url().to_owned(),
            alt_text: photo.content_description().map(str::to_owned),
            thumbnail_url: photo.thumbnail().map(str::to_owned),
            use_thumbnail_when_loading: photo.use_thumbnail_when_loading(),
        }
    }
}

impl From<SavedPhoto> for PhotoItem {
    fn from(saved: SavedPhoto) -> Self {
        let mut photo =
            PhotoItem::new(saved.url).with_thumbnail_when_loading(saved.use_thumbnail_when_loading);
        if let Some(alt_text) = saved.alt_text {
            photo = photo.with_content_description(alt_text);
        }
        if let Some(thumbnail) = saved.thumbnail_url {
            photo = photo.with_thumbnail(thumbnail);
        }
        photo
    }
}

#[derive(Debug)]
pub enum RestoreError {
    Json(serde_json::Error),
    /// The viewer was open but no photos were saved.
    MissingPhotoList { index: i64 },
    IndexOutOfRange { index: i64, len: usize },
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreError::Json(err) => write!(f, "malformed saved lightbox state: {err}"),
            RestoreError::MissingPhotoList { index } => {
                write!(f, "saved lightbox is open at photo {index} but has no photos")
            }
            RestoreError::IndexOutOfRange { index, len } => {
                write!(f, "saved photo index {index} is out of range for {len} photos")
            }
        }
    }
}

impl std::error::Error for RestoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RestoreError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RestoreError {
    fn from(err: serde_json::Error) -> Self {
        RestoreError::Json(err)
    }
}

impl LightboxState {
    /// Captures what survives a restart.
    pub fn save(&self) -> SavedLightboxState {
        let photo_list = self
            .photo_list()
            .map(|list| list.iter().map(|photo| SavedPhoto::from(&**photo)).collect());
        let current_index = if self.is_open() {
            i64::try_from(self.current_index()).unwrap_or(i64::MAX)
        } else {
            -1
        };
        SavedLightboxState {
            current_index,
            photo_list,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.save())
    }

    pub fn restore(saved: SavedLightboxState) -> Result<Self, RestoreError> {
        Self::restore_with_config(saved, LightboxConfig::default())
    }

    /// Rebuilds a viewer from `saved`. A negative index yields a closed
    /// viewer; otherwise the viewer is open on the saved photo, at rest.
    pub fn restore_with_config(
        saved: SavedLightboxState,
        config: LightboxConfig,
    ) -> Result<Self, RestoreError> {
        let state = LightboxState::with_config(config);
        let index = saved.current_index;
        if index < 0 {
            if saved.photo_list.is_some() {
                log::warn!("dropping photos saved with a closed lightbox");
            }
            return Ok(state);
        }

        let photos = match saved.photo_list {
            Some(photos) if !photos.is_empty() => photos,
            _ => return Err(RestoreError::MissingPhotoList { index }),
        };
        let len = photos.len();
        let position = usize::try_from(index)
            .ok()
            .filter(|position| *position < len)
            .ok_or(RestoreError::IndexOutOfRange { index, len })?;

        let list: PhotoList = photos
            .into_iter()
            .map(|saved| PhotoRef::new(saved.into()))
            .collect::<Vec<_>>()
            .into();
        state.restore_presented(list, position);
        Ok(state)
    }

    pub fn from_json(json: &str) -> Result<Self, RestoreError> {
        let saved: SavedLightboxState = serde_json::from_str(json)?;
        Self::restore(saved)
    }
}

impl From<&LightboxState> for SavedLightboxState {
    fn from(state: &LightboxState) -> Self {
        state.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(count: usize) -> PhotoList {
        (0..count)
            .map(|i| {
                PhotoItem::new(format!("https://example.com/{i}.jpg"))
                    .with_content_description(format!("photo {i}"))
                    .into_ref()
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn closed_viewer_saves_minus_one() {
        let state = LightboxState::new();
        let saved = state.save();
        assert_eq!(saved.current_index, -1);
        assert_eq!(saved.photo_list, None);
        assert_eq!(
            state.to_json().expect("serializable"),
            r#"{"current_index":-1,"photo_list":null}"#
        );
    }

    #[test]
    fn open_viewer_round_trips() {
        let state = LightboxState::new();
        let list = photos(3);
        state.open(&list[2], list.clone(), None);

        let json = state.to_json().expect("serializable");
        let restored = LightboxState::from_json(&json).expect("restorable");

        assert!(restored.is_open());
        assert_eq!(restored.current_index(), 2);
        assert_eq!(restored.photo_list().as_deref(), Some(&*list));
        assert_eq!(
            restored.current_photo().and_then(|p| p.content_description().map(str::to_owned)),
            Some("photo 2".to_owned())
        );
        assert_eq!(restored.scale(), 1.0);
        assert_eq!(restored.dismiss_progress(), 0.0);
    }

    #[test]
    fn optional_fields_may_be_missing() {
        let restored = LightboxState::from_json(
            r#"{"current_index":0,"photo_list":[{"url":"a.jpg"}]}"#,
        )
        .expect("restorable");
        let photo = restored.current_photo().expect("photo restored");
        assert_eq!(photo.url(), "a.jpg");
        assert_eq!(photo.thumbnail(), None);
        assert!(photo.use_thumbnail_when_loading());
    }

    #[test]
    fn inconsistent_saves_are_rejected() {
        let out_of_range = SavedLightboxState {
            current_index: 5,
            photo_list: Some(vec![SavedPhoto::from(&PhotoItem::new("a"))]),
        };
        assert!(matches!(
            LightboxState::restore(out_of_range),
            Err(RestoreError::IndexOutOfRange { index: 5, len: 1 })
        ));

        let missing = SavedLightboxState {
            current_index: 0,
            photo_list: None,
        };
        let err = LightboxState::restore(missing).expect_err("no photos");
        assert!(err.to_string().contains("no photos"), "{err}");

        let garbage = LightboxState::from_json("{").expect_err("malformed");
        assert!(matches!(garbage, RestoreError::Json(_)));
        assert!(std::error::Error::source(&garbage).is_some());
    }
}
