use keos::{KernelError, thread::ThreadBuilder};
use keos_synchprobs::{process::ProcessTable, sync::Semaphore};
use std::sync::Arc;

pub fn waitpid_returns_status() {
    let table = ProcessTable::new();
    let driver = table.spawn(None).unwrap();
    let children = [0, 1, -7, 255].map(|code| (table.spawn(Some(driver)).unwrap(), code));
    for (child, code) in children {
        assert!(table.is_alive(child));
        assert_eq!(table.exit(child, code), Ok(()));
        assert!(!table.is_alive(child));
    }
    // Collected in reverse order.
    for (child, code) in children.into_iter().rev() {
        assert_eq!(table.waitpid(driver, child, 0), Ok(code));
    }
    // Reaped.
    for (child, _) in children {
        assert_eq!(table.waitpid(driver, child, 0), Err(KernelError::NoSuchEntry));
    }
    assert_eq!(table.exit(driver, 0), Ok(()));
}

/// The parent sleeps until the child exits.
pub fn waitpid_blocks() {
    let table = Arc::new(ProcessTable::new());
    let driver = table.spawn(None).unwrap();
    let child = table.spawn(Some(driver)).unwrap();
    let collected = Arc::new(Semaphore::new(0, ()));

    let parent = {
        let (table, collected) = (table.clone(), collected.clone());
        ThreadBuilder::new("parent").spawn(move || {
            assert_eq!(table.waitpid(driver, child, 0), Ok(42));
            collected.signal();
        })
    };
    crate::wait_until_parked(parent.tid);
    assert!(collected.try_wait().is_err());

    assert_eq!(table.exit(child, 42), Ok(()));
    assert_eq!(parent.join(), 0);
    assert!(collected.try_wait().is_ok());
}

pub fn waitpid_errors() {
    let table = ProcessTable::new();
    let driver = table.spawn(None).unwrap();
    let child = table.spawn(Some(driver)).unwrap();
    let stranger = table.spawn(None).unwrap();

    assert_eq!(
        table.waitpid(driver, child, 1),
        Err(KernelError::InvalidArgument)
    );
    assert_eq!(
        table.waitpid(driver, 1000, 0),
        Err(KernelError::NoSuchEntry)
    );
    assert_eq!(
        table.waitpid(driver, stranger, 0),
        Err(KernelError::OperationNotPermitted)
    );
    assert_eq!(
        table.waitpid(stranger, child, 0),
        Err(KernelError::OperationNotPermitted)
    );
    assert_eq!(table.spawn(Some(1000)), Err(KernelError::NoSuchEntry));

    // A failed wait leaves the child in place.
    assert_eq!(table.exit(child, 3), Ok(()));
    assert_eq!(table.waitpid(driver, child, 0), Ok(3));
}

pub fn exit_twice() {
    let table = ProcessTable::default();
    let driver = table.spawn(None).unwrap();
    let child = table.spawn(Some(driver)).unwrap();
    assert_eq!(table.exit(child, 1), Ok(()));
    assert_eq!(table.exit(child, 2), Err(KernelError::NoSuchEntry));
    assert_eq!(table.waitpid(driver, child, 0), Ok(1));
    assert_eq!(table.exit(child, 3), Err(KernelError::NoSuchEntry));
}

/// Exited children of an exiting parent are reaped, live ones are orphaned
/// and vanish when they exit.
pub fn orphans() {
    let table = ProcessTable::new();
    let driver = table.spawn(None).unwrap();
    let parent = table.spawn(Some(driver)).unwrap();
    let zombie = table.spawn(Some(parent)).unwrap();
    let orphan = table.spawn(Some(parent)).unwrap();

    assert_eq!(table.exit(zombie, 5), Ok(()));
    assert_eq!(table.exit(parent, 0), Ok(()));
    assert_eq!(table.spawn(Some(parent)), Err(KernelError::NoSuchEntry));

    assert_eq!(table.waitpid(parent, zombie, 0), Err(KernelError::NoSuchEntry));
    assert!(table.is_alive(orphan));
    assert_eq!(
        table.waitpid(driver, orphan, 0),
        Err(KernelError::OperationNotPermitted)
    );
    assert_eq!(table.exit(orphan, 9), Ok(()));
    assert_eq!(table.waitpid(parent, orphan, 0), Err(KernelError::NoSuchEntry));

    // The parent itself is still a zombie of the driver.
    assert_eq!(table.waitpid(driver, parent, 0), Ok(0));
}
