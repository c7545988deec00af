use std::sync::{Arc, Mutex};

use managed_handle::{Error, ManagedHandle};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn logged(log: &Log, name: &'static str) -> ManagedHandle<&'static str> {
    let log = Arc::clone(log);
    ManagedHandle::create(name, move |name| log.lock().unwrap().push(name))
}

fn entries(log: &Log) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}

#[test]
fn dependent_released_before_dependency() {
    let log = Log::default();
    let parent = logged(&log, "parent");
    parent.depend_on(logged(&log, "child")).unwrap();

    drop(parent);
    assert_eq!(entries(&log), ["parent", "child"]);
}

#[test]
fn dependency_with_other_owner_survives() {
    let log = Log::default();
    let parent = logged(&log, "parent");
    let child = logged(&log, "child");
    parent.depend_on(child.clone()).unwrap();
    assert_eq!(child.use_count(), 2);

    drop(parent);
    assert_eq!(entries(&log), ["parent"]);
    assert_eq!(child.get(), Ok("child"));

    drop(child);
    assert_eq!(entries(&log), ["parent", "child"]);
}

#[test]
fn dependencies_released_newest_first() {
    let log = Log::default();
    let owner = logged(&log, "owner");
    owner.depend_on(logged(&log, "first")).unwrap();
    owner.depend_on(logged(&log, "second")).unwrap();
    owner.depend_on(logged(&log, "third")).unwrap();
    assert_eq!(owner.dependency_count(), 3);

    drop(owner);
    assert_eq!(entries(&log), ["owner", "third", "second", "first"]);
}

#[test]
fn chains_release_from_the_top() {
    let log = Log::default();
    let device = logged(&log, "device");
    let pool = logged(&log, "pool");
    let buffer = logged(&log, "buffer");

    pool.depend_on(device).unwrap();
    buffer.depend_on(pool).unwrap();

    drop(buffer);
    assert_eq!(entries(&log), ["buffer", "pool", "device"]);
}

#[test]
fn shared_dependency_released_by_last_dependent() {
    let log = Log::default();
    let context = logged(&log, "context");
    let a = logged(&log, "a");
    let b = logged(&log, "b");
    a.depend_on(context.clone()).unwrap();
    b.depend_on(context).unwrap();

    drop(a);
    assert_eq!(entries(&log), ["a"]);
    drop(b);
    assert_eq!(entries(&log), ["a", "b", "context"]);
}

#[test]
fn dependency_added_through_a_copy_is_shared() {
    let log = Log::default();
    let owner = logged(&log, "owner");
    let copy = owner.clone();
    copy.depend_on(logged(&log, "child")).unwrap();
    assert_eq!(owner.dependency_count(), 1);

    drop(copy);
    assert!(entries(&log).is_empty());
    drop(owner);
    assert_eq!(entries(&log), ["owner", "child"]);
}

#[test]
fn heterogeneous_dependencies() {
    let log = Log::default();
    let allocator = Arc::new(String::from("allocator"));
    let owner = logged(&log, "owner");

    owner.depend_on(Arc::clone(&allocator)).unwrap();
    owner.depend_on(ManagedHandle::create(3u8, |_| {})).unwrap();
    owner.depend_on(vec![1, 2, 3]).unwrap();
    assert_eq!(Arc::strong_count(&allocator), 2);

    drop(owner);
    assert_eq!(Arc::strong_count(&allocator), 1);
}

#[test]
fn builder_seeds_dependencies() {
    let log = Log::default();
    let owner = ManagedHandle::builder("owner")
        .deleter({
            let log = Arc::clone(&log);
            move |name: &'static str| log.lock().unwrap().push(name)
        })
        .depend_on(logged(&log, "seeded"))
        .build();
    owner.depend_on(logged(&log, "added")).unwrap();

    drop(owner);
    assert_eq!(entries(&log), ["owner", "added", "seeded"]);
}

#[test]
fn builder_without_deleter_still_releases_dependencies() {
    let log = Log::default();
    let owner = ManagedHandle::builder(0)
        .depend_on(logged(&log, "child"))
        .build();

    drop(owner);
    assert_eq!(entries(&log), ["child"]);
}

#[test]
fn empty_handle_cannot_retain() {
    let log = Log::default();
    let empty = ManagedHandle::<u32>::empty();
    let err = empty.depend_on(logged(&log, "orphan")).unwrap_err();

    assert!(matches!(err, Error::InvalidHandle { .. }));
    // the rejected dependency is dropped right away
    assert_eq!(entries(&log), ["orphan"]);
}
