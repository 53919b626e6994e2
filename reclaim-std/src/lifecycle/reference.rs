//! # Reference Collection
//!
//! A keyed cache of reference-counted objects. The first acquisition of a
//! key creates the object; every acquisition returns a handle; the object is
//! destroyed when the last handle is disposed.
//!
//! The map is never borrowed while the factory runs, so `create` and
//! `destroy` may themselves acquire or release references.

use reclaim_core::{Disposable, Reference};
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, hash_map::Entry},
    fmt,
    hash::Hash,
    ops::Deref,
    rc::Rc,
};

/// Creates and destroys the objects of a [`ReferenceCollection`].
pub trait ReferenceFactory<K, T> {
    /// Build the object for `key`.
    fn create(&self, key: &K) -> T;

    /// Release the object for `key` once nobody references it.
    fn destroy(&self, key: &K, object: &T);
}

/// A [`ReferenceFactory`] built from two closures.
pub struct FnFactory<C, D> {
    create: C,
    destroy: D,
}

impl<C, D> FnFactory<C, D> {
    /// Pair a `create` and a `destroy` closure.
    pub fn new(create: C, destroy: D) -> Self {
        Self { create, destroy }
    }
}

impl<K, T, C, D> ReferenceFactory<K, T> for FnFactory<C, D>
where
    C: Fn(&K) -> T,
    D: Fn(&K, &T),
{
    fn create(&self, key: &K) -> T {
        (self.create)(key)
    }

    fn destroy(&self, key: &K, object: &T) {
        (self.destroy)(key, object)
    }
}

struct Slot<T> {
    object: Rc<T>,
    counter: usize,
}

struct Shared<K, T, F> {
    factory: F,
    references: RefCell<HashMap<K, Slot<T>>>,
}

/// Lazily created, reference-counted objects keyed by `K`.
pub struct ReferenceCollection<K, T, F> {
    shared: Rc<Shared<K, T, F>>,
}

impl<K, T, F> ReferenceCollection<K, T, F>
where
    K: Eq + Hash + Clone,
    F: ReferenceFactory<K, T>,
{
    /// Create an empty collection backed by `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            shared: Rc::new(Shared {
                factory,
                references: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Acquire a reference to the object for `key`, creating it if needed.
    pub fn acquire(&self, key: K) -> CollectionReference<K, T, F> {
        let existing = self
            .shared
            .references
            .borrow_mut()
            .get_mut(&key)
            .map(|slot| {
                slot.counter += 1;
                Rc::clone(&slot.object)
            });

        let object = match existing {
            Some(object) => object,
            None => self.insert(&key),
        };

        CollectionReference {
            shared: Rc::clone(&self.shared),
            key,
            object,
            released: Cell::new(false),
        }
    }

    fn insert(&self, key: &K) -> Rc<T> {
        let created = Rc::new(self.shared.factory.create(key));
        let (object, spare) = match self.shared.references.borrow_mut().entry(key.clone()) {
            // The factory acquired this very key while it ran.
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                slot.counter += 1;
                (Rc::clone(&slot.object), Some(created))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Slot {
                    object: Rc::clone(&created),
                    counter: 1,
                });
                (created, None)
            }
        };
        if let Some(spare) = spare {
            self.shared.factory.destroy(key, &spare);
        }
        object
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.shared.references.borrow().len()
    }

    /// Whether no object is alive.
    pub fn is_empty(&self) -> bool {
        self.shared.references.borrow().is_empty()
    }

    /// Whether an object for `key` is alive.
    pub fn contains(&self, key: &K) -> bool {
        self.shared.references.borrow().contains_key(key)
    }

    /// Number of outstanding references for `key`.
    pub fn count(&self, key: &K) -> usize {
        self.shared
            .references
            .borrow()
            .get(key)
            .map_or(0, |slot| slot.counter)
    }
}

impl<K, T, F> fmt::Debug for ReferenceCollection<K, T, F>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let references = self.shared.references.borrow();
        f.debug_map()
            .entries(references.iter().map(|(key, slot)| (key, slot.counter)))
            .finish()
    }
}

/// A handle returned by [`ReferenceCollection::acquire`].
///
/// Disposing it releases this handle's claim; repeated disposal is a no-op.
pub struct CollectionReference<K, T, F>
where
    K: Eq + Hash + Clone,
    F: ReferenceFactory<K, T>,
{
    shared: Rc<Shared<K, T, F>>,
    key: K,
    object: Rc<T>,
    released: Cell<bool>,
}

impl<K, T, F> CollectionReference<K, T, F>
where
    K: Eq + Hash + Clone,
    F: ReferenceFactory<K, T>,
{
    /// The key this reference was acquired for.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Shared pointer to the referenced object.
    pub fn shared_object(&self) -> Rc<T> {
        Rc::clone(&self.object)
    }

    /// Whether this handle has been disposed.
    pub fn is_released(&self) -> bool {
        self.released.get()
    }
}

impl<K, T, F> Disposable for CollectionReference<K, T, F>
where
    K: Eq + Hash + Clone,
    F: ReferenceFactory<K, T>,
{
    fn dispose(&self) {
        if self.released.replace(true) {
            return;
        }

        let mut references = self.shared.references.borrow_mut();
        let remaining = references.get_mut(&self.key).map(|slot| {
            slot.counter -= 1;
            slot.counter
        });
        let destroyed = match remaining {
            Some(0) => references.remove(&self.key),
            _ => None,
        };
        drop(references);

        // The key is gone before `destroy` runs, so a re-entrant acquire
        // builds a fresh object instead of reviving this one.
        if let Some(slot) = destroyed {
            self.shared.factory.destroy(&self.key, &slot.object);
        }
    }
}

impl<K, T, F> Reference<T> for CollectionReference<K, T, F>
where
    K: Eq + Hash + Clone,
    F: ReferenceFactory<K, T>,
{
    fn object(&self) -> &T {
        &self.object
    }
}

impl<K, T, F> Deref for CollectionReference<K, T, F>
where
    K: Eq + Hash + Clone,
    F: ReferenceFactory<K, T>,
{
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl<K, T, F> fmt::Debug for CollectionReference<K, T, F>
where
    K: Eq + Hash + Clone + fmt::Debug,
    F: ReferenceFactory<K, T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionReference")
            .field("key", &self.key)
            .field("released", &self.is_released())
            .finish()
    }
}

/// A reference that never releases its object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmortalReference<T> {
    object: T,
}

impl<T> ImmortalReference<T> {
    /// Wrap `object`.
    pub fn new(object: T) -> Self {
        Self { object }
    }
}

impl<T> Disposable for ImmortalReference<T> {
    fn dispose(&self) {}
}

impl<T> Reference<T> for ImmortalReference<T> {
    fn object(&self) -> &T {
        &self.object
    }
}
