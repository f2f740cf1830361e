//! Document model holding the embedded plugin objects of one loaded page.
//!
//! A [`PageModel`] is created by a full load and mutated in place by
//! in-page navigations. Objects are addressed by their insertion index,
//! which equals document encounter order and never changes for the life
//! of the page.

use serde::Serialize;

/// URL of the placeholder document held before the first load.
pub const BLANK_URL: &str = "about:blank";

/// Errors from page object lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// The requested object index does not exist on the page.
    #[error("object index {index} out of range (page has {len} objects)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of objects currently on the page.
        len: usize,
    },
}

/// A plugin placeholder (`<embed>`/`<object>`) inserted into a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedObject {
    /// Insertion index within the owning page.
    pub index: usize,
    /// Origin the plugin content was loaded from.
    pub origin: String,
    /// Whether the plugin is running.
    pub activated: bool,
}

/// A single loaded document and its embedded objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageModel {
    url: String,
    objects: Vec<EmbeddedObject>,
}

impl PageModel {
    /// Create an empty page for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            objects: Vec::new(),
        }
    }

    /// Create the empty placeholder page used before the first load.
    pub fn blank() -> Self {
        Self::new(BLANK_URL)
    }

    /// Current document URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the document URL without touching objects.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Append a new, not yet activated object.
    pub fn add_object(&mut self, origin: impl Into<String>) -> &EmbeddedObject {
        self.add_object_with(origin, false)
    }

    /// Append a new object that starts in the given activation state.
    pub fn add_object_with(
        &mut self,
        origin: impl Into<String>,
        activated: bool,
    ) -> &EmbeddedObject {
        let index = self.objects.len();
        self.objects.push(EmbeddedObject {
            index,
            origin: origin.into(),
            activated,
        });
        &self.objects[index]
    }

    /// Look up an object by insertion index.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::IndexOutOfRange`] if no object has that index.
    pub fn object_at(&self, index: usize) -> Result<&EmbeddedObject, PageError> {
        self.objects
            .get(index)
            .ok_or(PageError::IndexOutOfRange {
                index,
                len: self.objects.len(),
            })
    }

    /// Mark an object as running. Activation is one-way.
    ///
    /// Returns `true` if the object was newly activated.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::IndexOutOfRange`] if no object has that index.
    pub fn activate(&mut self, index: usize) -> Result<bool, PageError> {
        let len = self.objects.len();
        let object = self
            .objects
            .get_mut(index)
            .ok_or(PageError::IndexOutOfRange { index, len })?;
        let newly = !object.activated;
        object.activated = true;
        Ok(newly)
    }

    /// Indices of objects from `origin` that are still waiting for consent.
    pub fn pending_for(&self, origin: &str) -> Vec<usize> {
        self.objects
            .iter()
            .filter(|o| !o.activated && o.origin == origin)
            .map(|o| o.index)
            .collect()
    }

    /// All objects in insertion order.
    pub fn objects(&self) -> &[EmbeddedObject] {
        &self.objects
    }

    /// Number of objects on the page.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the page has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drop every object. Only a full navigation does this.
    pub fn reset(&mut self) {
        self.objects.clear();
    }
}

impl Default for PageModel {
    fn default() -> Self {
        Self::blank()
    }
}
