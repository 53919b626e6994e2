//! Closure-backed and combined disposables.

use reclaim_core::{Disposable, DisposableTracker, Tracking, dispose_all};
use std::{cell::RefCell, fmt, rc::Rc};

/// A disposable that runs a closure the first time it is disposed.
pub struct DisposableFn {
    callback: RefCell<Option<Box<dyn FnOnce()>>>,
    tracking: Option<Tracking>,
}

impl DisposableFn {
    /// Kind reported to leak trackers.
    pub const KIND: &'static str = "DisposableFn";

    /// Wrap `callback`.
    pub fn new(callback: impl FnOnce() + 'static) -> Self {
        Self {
            callback: RefCell::new(Some(Box::new(callback))),
            tracking: None,
        }
    }

    /// Report this disposable to `tracker`.
    pub fn tracked_by(mut self, tracker: &Rc<dyn DisposableTracker>) -> Self {
        self.tracking = Some(Tracking::new(Rc::clone(tracker), Self::KIND));
        self
    }

    /// Whether the closure has already run.
    pub fn is_disposed(&self) -> bool {
        self.callback.borrow().is_none()
    }
}

impl Disposable for DisposableFn {
    fn dispose(&self) {
        // Taken before running so a re-entrant dispose finds nothing left.
        let callback = self.callback.borrow_mut().take();
        if let Some(callback) = callback {
            self.mark_tracked();
            callback();
        }
    }

    fn mark_tracked(&self) {
        if let Some(tracking) = &self.tracking {
            tracking.mark();
        }
    }
}

impl fmt::Debug for DisposableFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposableFn")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Wrap a closure as a shared disposable.
///
/// The closure runs at most once, on the first `dispose()`.
pub fn to_disposable(callback: impl FnOnce() + 'static) -> Rc<DisposableFn> {
    Rc::new(DisposableFn::new(callback))
}

/// Wrap a closure as a shared disposable reported to `tracker`, if any.
pub(crate) fn tracked_disposable(
    tracker: Option<&Rc<dyn DisposableTracker>>,
    callback: impl FnOnce() + 'static,
) -> Rc<DisposableFn> {
    let disposable = DisposableFn::new(callback);
    Rc::new(match tracker {
        Some(tracker) => disposable.tracked_by(tracker),
        None => disposable,
    })
}

/// A disposable releasing a fixed group of disposables together.
pub struct CombinedDisposable {
    items: RefCell<Vec<Box<dyn Disposable>>>,
    tracking: Option<Tracking>,
}

impl CombinedDisposable {
    /// Kind reported to leak trackers.
    pub const KIND: &'static str = "CombinedDisposable";

    /// Take ownership of `items`.
    pub fn new<I, D>(items: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Disposable + 'static,
    {
        let items: Vec<Box<dyn Disposable>> = items
            .into_iter()
            .map(|item| {
                item.mark_tracked();
                Box::new(item) as Box<dyn Disposable>
            })
            .collect();
        Self {
            items: RefCell::new(items),
            tracking: None,
        }
    }

    /// Report this disposable to `tracker`.
    pub fn tracked_by(mut self, tracker: &Rc<dyn DisposableTracker>) -> Self {
        self.tracking = Some(Tracking::new(Rc::clone(tracker), Self::KIND));
        self
    }

    /// Number of items still waiting to be disposed.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether nothing is left to dispose.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Disposable for CombinedDisposable {
    fn dispose(&self) {
        let items = std::mem::take(&mut *self.items.borrow_mut());
        self.mark_tracked();
        dispose_all(items);
    }

    fn mark_tracked(&self) {
        if let Some(tracking) = &self.tracking {
            tracking.mark();
        }
    }
}

impl fmt::Debug for CombinedDisposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedDisposable")
            .field("pending", &self.len())
            .finish()
    }
}

/// Combine several disposables into one.
pub fn combined_disposable<I, D>(items: I) -> Rc<CombinedDisposable>
where
    I: IntoIterator<Item = D>,
    D: Disposable + 'static,
{
    Rc::new(CombinedDisposable::new(items))
}
