pub mod mutex {
    use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use keos::thread::{Current, ThreadBuilder};
    use keos_synchprobs::sync::mutex::Mutex;
    use std::sync::Arc;

    pub fn smoke() {
        const LENGTH: usize = 64;
        let output = Arc::new(Mutex::new(Vec::new()));
        let counter = Arc::new(AtomicUsize::new(0));

        let handles = (0..LENGTH)
            .map(|i| {
                let counter = counter.clone();
                let output = output.clone();
                ThreadBuilder::new("smoker").spawn(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let mut d = output.lock();
                    while counter.load(Ordering::SeqCst) != LENGTH {
                        Current::yield_now();
                    }
                    d.push(i);
                    d.unlock();
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            assert_eq!(handle.join(), 0);
        }

        let mut output = output.lock();
        output.sort();
        assert_eq!(&*output, &(0..LENGTH).collect::<Vec<_>>());
        output.unlock();
    }

    pub fn smoke_many() {
        for i in 0..20 {
            keos::debug!("Iteration #{i:}");
            smoke()
        }
    }

    /// A thread waiting for a mutex sleeps instead of spinning.
    pub fn parking() {
        let mutex = Arc::new(Mutex::new(()));
        let guard = mutex.lock();
        let acquired = Arc::new(AtomicBool::new(false));

        let be_parked = {
            let (acquired, mutex) = (acquired.clone(), mutex.clone());
            ThreadBuilder::new("blockee").spawn(move || {
                let guard = mutex.lock();
                acquired.store(true, Ordering::SeqCst);
                guard.unlock();
            })
        };

        crate::wait_until_parked(be_parked.tid);
        assert!(
            !acquired.load(Ordering::SeqCst),
            "Blocked thread by Mutex should not hold the lock"
        );

        guard.unlock();
        assert_eq!(be_parked.join(), 0);
        assert!(acquired.load(Ordering::SeqCst));
    }
}

pub mod condition_variable {
    use core::sync::atomic::{AtomicUsize, Ordering};
    use keos::thread::{Current, ThreadBuilder};
    use keos_synchprobs::sync::{condition_variable::ConditionVariable, mutex::Mutex};
    use std::sync::Arc;

    const MAX: usize = 2;
    const CONSUMERS: usize = 10;

    struct BufferInner {
        item: [usize; MAX],
        front: usize,
        tail: usize,
    }
    impl BufferInner {
        fn is_full(&self) -> bool {
            self.tail.overflowing_sub(self.front).0 % MAX == MAX - 1
        }
        fn is_empty(&self) -> bool {
            self.front == self.tail
        }
    }
    struct Buffer {
        inner: Mutex<BufferInner>,
        full: ConditionVariable,
        empty: ConditionVariable,
    }

    impl Buffer {
        fn new() -> Self {
            Buffer {
                inner: Mutex::new(BufferInner {
                    item: [0; MAX],
                    front: 0,
                    tail: 0,
                }),
                full: ConditionVariable::new(),
                empty: ConditionVariable::new(),
            }
        }

        fn put(&self, val: usize) {
            let mut guard = self.full.wait_while(&self.inner, |b| b.is_full());
            let tail = (guard.tail + 1) % MAX;
            guard.tail = tail;
            guard.item[tail] = val;
            self.empty.signal(guard);
        }

        fn put_many(&self, val: &[usize]) {
            let mut idx = 0;
            while idx < val.len() {
                let mut guard = self.full.wait_while(&self.inner, |b| b.is_full());
                while !guard.is_full() && idx < val.len() {
                    let tail = (guard.tail + 1) % MAX;
                    guard.tail = tail;
                    guard.item[tail] = val[idx];
                    idx += 1;
                }
                self.empty.broadcast(guard);
            }
        }

        fn get(&self) -> usize {
            let mut guard = self.empty.wait_while(&self.inner, |b| b.is_empty());
            let front = (guard.front + 1) % MAX;
            let item = guard.item[front];
            guard.front = front;
            self.full.signal(guard);
            item
        }
    }

    fn run(produce: impl FnOnce(&Buffer) + Send + 'static) {
        let (buffer, waiters, output) = (
            Arc::new(Buffer::new()),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(Mutex::new(Vec::new())),
        );

        let consumers = [0; CONSUMERS].map(|_| {
            let (buffer, waiters, output) = (buffer.clone(), waiters.clone(), output.clone());
            ThreadBuilder::new("consumer").spawn(move || {
                waiters.fetch_add(1, Ordering::SeqCst);
                let d = buffer.get();
                let mut guard = output.lock();
                guard.push(d);
                guard.unlock();
            })
        });
        while waiters.load(Ordering::SeqCst) != CONSUMERS {
            Current::yield_now();
        }
        for consumer in consumers.iter() {
            crate::wait_until_parked(consumer.tid);
        }

        let producer = {
            let buffer = buffer.clone();
            ThreadBuilder::new("producer").spawn(move || produce(&*buffer))
        };

        for consumer in consumers {
            assert_eq!(consumer.join(), 0);
        }
        assert_eq!(producer.join(), 0);

        let mut output = output.lock();
        output.sort();
        assert_eq!(&*output, &(0..CONSUMERS).collect::<Vec<_>>());
        output.unlock();
    }

    /// Consumers sleep on an empty buffer and are woken one by one.
    pub fn bounded_buffer_1() {
        run(|buffer| {
            for i in 0..CONSUMERS {
                buffer.put(i);
            }
        });
    }

    /// Like `bounded_buffer_1`, but the producer broadcasts.
    pub fn bounded_buffer_2() {
        run(|buffer| {
            for chunk in (0..CONSUMERS).collect::<Vec<_>>().chunks(3) {
                buffer.put_many(chunk);
            }
        });
    }
}

pub mod semaphore {
    use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
    use keos::thread::{Current, ThreadBuilder};
    use keos_synchprobs::sync::{Mutex, Semaphore};
    use std::sync::Arc;

    pub fn sema_0() {
        let sema = Arc::new(Semaphore::new(0, ()));
        let is_woken_up = Arc::new(AtomicBool::new(false));

        let thread = {
            let (sema, is_woken_up) = (sema.clone(), is_woken_up.clone());

            ThreadBuilder::new("worker").spawn(move || {
                core::mem::forget(sema.wait());
                is_woken_up.store(true, Ordering::SeqCst);
            })
        };

        crate::wait_until_parked(thread.tid);
        assert!(!is_woken_up.load(Ordering::SeqCst));

        sema.signal();
        assert_eq!(thread.join(), 0);

        assert!(is_woken_up.load(Ordering::SeqCst));
        assert_eq!(sema.permits(), 0);
    }

    /// Each signal lets exactly one waiter through.
    pub fn sema_1() {
        const COUNT: u32 = 16;
        let sema = Arc::new(Semaphore::new(1, ()));
        let counter = Arc::new(AtomicU32::new(0));

        let handles = (0..COUNT)
            .map(|i| {
                let (sema, counter) = (sema.clone(), counter.clone());

                ThreadBuilder::new(format!("t{i}")).spawn(move || {
                    let sema_permit = sema.wait();
                    counter.fetch_add(1, Ordering::SeqCst);
                    core::mem::forget(sema_permit);
                })
            })
            .collect::<Vec<_>>();

        let mut expected_cnt = 1;
        loop {
            while counter.load(Ordering::SeqCst) < expected_cnt {
                Current::yield_now();
            }
            for _ in 0..100 {
                Current::yield_now();
            }
            assert_eq!(counter.load(Ordering::SeqCst), expected_cnt);
            assert_eq!(sema.permits(), 0);
            if expected_cnt == COUNT {
                break;
            }
            expected_cnt += 1;
            sema.signal();
        }

        for handle in handles {
            assert_eq!(handle.join(), 0);
        }
    }

    pub fn exec_order() {
        const COUNT: usize = 3;

        let counter = Arc::new(AtomicUsize::new(0));
        let sema = Arc::new(Semaphore::new(0, 0));

        let handles = (0..COUNT)
            .map(|i| {
                let counter = counter.clone();
                let sema = sema.clone();
                ThreadBuilder::new(format!("support_{}", i)).spawn(move || {
                    let _guard = sema.wait();
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect::<Vec<_>>();

        for handle in handles.iter() {
            crate::wait_until_parked(handle.tid);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        // The permit is handed from one thread to the next on drop.
        sema.signal();
        for handle in handles {
            assert_eq!(handle.join(), 0);
        }
        assert_eq!(counter.load(Ordering::SeqCst), COUNT);
        assert_eq!(sema.permits(), 1);
    }

    pub fn n_permits() {
        const COUNT: usize = 5;
        const PERMITS: usize = 3;

        let counter = Arc::new(AtomicUsize::new(0));
        let sema = Arc::new(Semaphore::new(PERMITS, 0));
        let lock = Arc::new(Mutex::new(0));

        let guard = lock.lock();

        let handles = (0..COUNT)
            .map(|i| {
                let counter = counter.clone();
                let sema = sema.clone();
                let lock = lock.clone();
                ThreadBuilder::new(format!("support_{}", i)).spawn(move || {
                    let _guard = sema.wait();
                    counter.fetch_add(1, Ordering::SeqCst);
                    let _lock = lock.lock();
                    _lock.unlock();
                })
            })
            .collect::<Vec<_>>();

        while counter.load(Ordering::SeqCst) != PERMITS {
            Current::yield_now();
        }
        for handle in handles.iter() {
            crate::wait_until_parked(handle.tid);
        }
        assert_eq!(counter.load(Ordering::SeqCst), PERMITS);
        assert!(sema.try_wait().is_err());
        guard.unlock();

        for handle in handles {
            assert_eq!(handle.join(), 0);
        }
        assert_eq!(counter.load(Ordering::SeqCst), COUNT);
        assert_eq!(sema.permits(), PERMITS);
    }
}

pub mod lock {
    use core::sync::atomic::{AtomicBool, Ordering};
    use keos::{KernelError, thread::ThreadBuilder};
    use keos_synchprobs::sync::Lock;
    use std::sync::Arc;

    /// Only the holder may release a lock.
    pub fn ownership() {
        let lock = Arc::new(Lock::new("owned"));
        assert_eq!(lock.name(), "owned");
        assert!(lock.is_idle());
        assert_eq!(lock.release(), Err(KernelError::OperationNotPermitted));

        lock.acquire();
        assert!(lock.do_i_hold());
        assert!(!lock.is_idle());
        assert!(lock.try_acquire().is_err());

        let stranger = {
            let lock = lock.clone();
            ThreadBuilder::new("stranger").spawn(move || {
                assert!(!lock.do_i_hold());
                assert_eq!(lock.release(), Err(KernelError::OperationNotPermitted));
                assert!(lock.try_acquire().is_err());
            })
        };
        assert_eq!(stranger.join(), 0);

        assert_eq!(lock.release(), Ok(()));
        assert!(!lock.do_i_hold());
        assert!(lock.is_idle());
        assert_eq!(lock.try_acquire(), Ok(()));
        assert_eq!(lock.release(), Ok(()));
    }

    /// A thread acquiring a held lock sleeps until the holder releases it.
    pub fn blocking() {
        let lock = Arc::new(Lock::new("blocking"));
        let acquired = Arc::new(AtomicBool::new(false));
        lock.acquire();

        let waiter = {
            let (lock, acquired) = (lock.clone(), acquired.clone());
            ThreadBuilder::new("waiter").spawn(move || {
                lock.acquire();
                acquired.store(true, Ordering::SeqCst);
                assert!(lock.do_i_hold());
                assert_eq!(lock.release(), Ok(()));
            })
        };

        crate::wait_until_parked(waiter.tid);
        assert!(!acquired.load(Ordering::SeqCst));
        assert!(!lock.is_idle());

        assert_eq!(lock.release(), Ok(()));
        assert_eq!(waiter.join(), 0);
        assert!(acquired.load(Ordering::SeqCst));
        assert!(lock.is_idle());
    }
}
