//! # Shared View
//!
//! Every operation on a view touches the page window, the line cache and the
//! cursors, so the whole view sits behind one lock and callers get exclusive
//! access for the length of a closure.

use crate::view::TextView;
use log::warn;
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle to a view shared between threads
#[derive(Clone)]
pub struct SharedTextView {
    view: Arc<Mutex<TextView>>,
}

impl SharedTextView {
    pub fn new(view: TextView) -> Self {
        Self {
            view: Arc::new(Mutex::new(view)),
        }
    }

    /// Runs `f` with exclusive access to the view.
    ///
    /// A panic inside an earlier call leaves the view usable: the pages are
    /// rebuilt from their cursors before `f` runs.
    pub fn with<R>(&self, f: impl FnOnce(&mut TextView) -> R) -> R {
        let mut guard = self.view.lock().unwrap_or_else(|poisoned| {
            warn!("view lock poisoned, rebuilding paint info");
            self.view.clear_poison();
            let mut guard = poisoned.into_inner();
            guard.rebuild_paint_info();
            guard
        });
        f(&mut guard)
    }

    /// Takes the view back when this is the last handle
    pub fn try_unwrap(self) -> Result<TextView, Self> {
        match Arc::try_unwrap(self.view) {
            Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(PoisonError::into_inner)),
            Err(view) => Err(Self { view }),
        }
    }
}

impl From<TextView> for SharedTextView {
    fn from(view: TextView) -> Self {
        Self::new(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::page::PageIndex;
    use crate::position::Position;
    use crate::text_model::PlainTextModel;
    use std::thread;

    fn shared() -> SharedTextView {
        let mut view = TextView::new(ViewConfig::with_size(200, 100)).unwrap();
        view.set_model(Some(Box::new(PlainTextModel::from_paragraphs(&["one two", "three"]))));
        SharedTextView::new(view)
    }

    #[test]
    fn test_handles_share_one_view() {
        let shared = shared();
        let other = shared.clone();
        let worker = thread::spawn(move || other.with(|view| view.search("three", false, true, false)));
        assert_eq!(worker.join().unwrap(), 1);
        assert!(!shared.with(|view| view.find_results_are_empty()));
    }

    #[test]
    fn test_poisoned_lock_recovers() {
        let shared = shared();
        let other = shared.clone();
        let _ = thread::spawn(move || {
            other.with(|view| {
                view.prepare_page(PageIndex::Current);
                panic!("renderer failed");
            })
        })
        .join();
        let start = shared.with(|view| view.start_cursor().position());
        assert_eq!(start, Some(Position::new(0, 0, 0)));
        assert!(shared.try_unwrap().is_ok());
    }
}
