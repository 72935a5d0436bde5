use std::sync::{Mutex, PoisonError};

/// The host document the client renders into.
///
/// Only the two attributes the client runtime drives are exposed:
/// the `<html lang>` attribute and the document title.
pub trait Document: Send + Sync + std::fmt::Debug {
    fn set_lang(&self, lang: &str);
    fn set_title(&self, title: &str);
}

/// A [`Document`] with nothing to render into.
///
/// It records the last value of each attribute so that it can be inspected,
/// e.g. in tests or by the CLI.
#[derive(Debug, Default)]
pub struct HeadlessDocument {
    state: Mutex<DocumentState>,
}

#[derive(Debug, Default, Clone)]
struct DocumentState {
    lang: Option<String>,
    title: Option<String>,
    title_changes: usize,
}

impl HeadlessDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current value of `<html lang>`, if it was ever set.
    pub fn lang(&self) -> Option<String> {
        self.state().lang
    }

    /// The current document title, if it was ever set.
    pub fn title(&self) -> Option<String> {
        self.state().title
    }

    /// How many times the title was set.
    pub fn title_changes(&self) -> usize {
        self.state().title_changes
    }

    fn state(&self) -> DocumentState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Document for HeadlessDocument {
    fn set_lang(&self, lang: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.lang = Some(lang.to_owned());
    }

    fn set_title(&self, title: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.title = Some(title.to_owned());
        state.title_changes += 1;
    }
}
