#![allow(dead_code)]

use reclaim::{
    DisposableFn, EventListener, FnFactory, ReferenceCollection, ReferenceFactory, to_disposable,
};
use reclaim::target::Event;
use reclaim::testing::CallLog;
use std::rc::Rc;

// ============================================================================
// Disposables
// ============================================================================

/// A disposable that appends `label` to `log` when released.
pub fn logging_disposable(log: &CallLog, label: &'static str) -> Rc<DisposableFn> {
    let log = log.clone();
    to_disposable(move || log.push(label))
}

// ============================================================================
// Listeners
// ============================================================================

/// A listener that appends `name:kind` to `log` on every event.
pub fn logging_listener(log: &CallLog, name: &'static str) -> EventListener<()> {
    let log = log.clone();
    EventListener::callback(move |event: &Event| log.push(format!("{name}:{}", event.kind())))
}

// ============================================================================
// Reference Collections
// ============================================================================

/// A collection whose objects are the key lengths; logs every create and destroy.
pub fn length_collection(
    log: &CallLog,
) -> ReferenceCollection<String, usize, impl ReferenceFactory<String, usize>> {
    let created = log.clone();
    let destroyed = log.clone();
    ReferenceCollection::new(FnFactory::new(
        move |key: &String| {
            created.push(format!("create {key}"));
            key.len()
        },
        move |key: &String, _: &usize| destroyed.push(format!("destroy {key}")),
    ))
}
