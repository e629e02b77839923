/// Concurrent access integration tests.
///
/// These verify the at-most-once construction guarantees under contention:
/// one singleton per root no matter how many threads race the first
/// resolution, one scoped instance per (scope, type) pair, and a close pass
/// that stays well-formed while resolutions are in flight.
use crossbeam_utils::thread;
use filament_di::{
    BindingMap, BoxError, CancellationToken, Closer, DiError, Lifetime, ResolverExt, Scoper,
    ServiceProvider,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier, Mutex};

struct Counted {
    serial: u32,
}

#[test]
fn concurrent_first_use_constructs_the_singleton_exactly_once() {
    let constructions = Arc::new(AtomicU32::new(0));
    let constructions_clone = constructions.clone();

    let mut bindings = BindingMap::new();
    bindings.bind::<Counted, _>(Lifetime::Singleton, move |_| {
        Ok(Counted {
            serial: constructions_clone.fetch_add(1, Ordering::SeqCst),
        })
    });

    let provider = ServiceProvider::new(Arc::new(bindings));
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    thread::scope(|s| {
        for _ in 0..threads {
            let provider = provider.clone();
            let barrier = barrier.clone();
            s.spawn(move |_| {
                barrier.wait();
                let instance = provider.get::<Counted>().unwrap();
                assert_eq!(instance.serial, 0);
            });
        }
    })
    .unwrap();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn singleton_stays_single_across_root_and_scopes() {
    let constructions = Arc::new(AtomicU32::new(0));
    let constructions_clone = constructions.clone();

    let mut bindings = BindingMap::new();
    bindings.bind::<Counted, _>(Lifetime::Singleton, move |_| {
        Ok(Counted {
            serial: constructions_clone.fetch_add(1, Ordering::SeqCst),
        })
    });

    let provider = ServiceProvider::new(Arc::new(bindings));
    let threads = 12;
    let barrier = Arc::new(Barrier::new(threads));

    thread::scope(|s| {
        for i in 0..threads {
            let provider = provider.clone();
            let barrier = barrier.clone();
            s.spawn(move |_| {
                barrier.wait();
                // Half resolve from the root, half through fresh scopes.
                let instance = if i % 2 == 0 {
                    provider.get::<Counted>().unwrap()
                } else {
                    provider.create_scope().get::<Counted>().unwrap()
                };
                assert_eq!(instance.serial, 0);
            });
        }
    })
    .unwrap();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_first_use_constructs_the_scoped_instance_once_per_scope() {
    let constructions = Arc::new(AtomicU32::new(0));
    let constructions_clone = constructions.clone();

    let mut bindings = BindingMap::new();
    bindings.bind::<Counted, _>(Lifetime::Scoped, move |_| {
        Ok(Counted {
            serial: constructions_clone.fetch_add(1, Ordering::SeqCst),
        })
    });

    let provider = ServiceProvider::new(Arc::new(bindings));
    let scope_a = provider.create_scope();
    let scope_b = provider.create_scope();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads * 2));

    thread::scope(|s| {
        for _ in 0..threads {
            let barrier_a = barrier.clone();
            let scope_a = &scope_a;
            s.spawn(move |_| {
                barrier_a.wait();
                let _ = scope_a.get::<Counted>().unwrap();
            });

            let barrier_b = barrier.clone();
            let scope_b = &scope_b;
            s.spawn(move |_| {
                barrier_b.wait();
                let _ = scope_b.get::<Counted>().unwrap();
            });
        }
    })
    .unwrap();

    // One construction per scope, two scopes.
    assert_eq!(constructions.load(Ordering::SeqCst), 2);

    let a = scope_a.get::<Counted>().unwrap();
    let b = scope_b.get::<Counted>().unwrap();
    assert_ne!(a.serial, b.serial);
}

#[test]
fn close_racing_resolutions_never_leaks_a_closer() {
    struct Tracked {
        closes: Arc<AtomicU32>,
    }

    impl Closer for Tracked {
        fn close(&self, _token: &CancellationToken) -> Result<(), BoxError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let built = Arc::new(AtomicU32::new(0));
    let closes = Arc::new(AtomicU32::new(0));

    let built_clone = built.clone();
    let closes_clone = closes.clone();
    let mut bindings = BindingMap::new();
    bindings.bind_closeable::<Tracked, _>(Lifetime::Transient, move |_| {
        built_clone.fetch_add(1, Ordering::SeqCst);
        Ok(Tracked {
            closes: closes_clone.clone(),
        })
    });

    let provider = ServiceProvider::new(Arc::new(bindings));
    let scope = provider.create_scope();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads + 1));
    let resolution_errors = Arc::new(Mutex::new(Vec::new()));

    thread::scope(|s| {
        for _ in 0..threads {
            let barrier = barrier.clone();
            let scope = &scope;
            let errors = resolution_errors.clone();
            s.spawn(move |_| {
                barrier.wait();
                for _ in 0..50 {
                    match scope.get::<Tracked>() {
                        Ok(_) => {}
                        Err(DiError::ScopeClosed(_)) => {
                            errors.lock().unwrap().push(());
                            break;
                        }
                        Err(other) => panic!("unexpected error: {:?}", other),
                    }
                }
            });
        }

        let barrier = barrier.clone();
        let scope = &scope;
        s.spawn(move |_| {
            barrier.wait();
            scope.close(&CancellationToken::new()).unwrap();
        });
    })
    .unwrap();

    // Whatever was built got closed: either by the close pass, or
    // immediately when its registration lost the race with close.
    assert_eq!(
        built.load(Ordering::SeqCst),
        closes.load(Ordering::SeqCst)
    );
    assert!(scope.is_closed());
}

#[test]
fn construction_finishing_after_close_is_released_immediately() {
    #[derive(Debug)]
    struct LateConn {
        closes: Arc<AtomicU32>,
    }

    impl Closer for LateConn {
        fn close(&self, _token: &CancellationToken) -> Result<(), BoxError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let closes = Arc::new(AtomicU32::new(0));
    let started = Arc::new(Barrier::new(2));
    let unblock = Arc::new(Barrier::new(2));

    let c = closes.clone();
    let s = started.clone();
    let u = unblock.clone();
    let mut bindings = BindingMap::new();
    bindings.bind_closeable::<LateConn, _>(Lifetime::Scoped, move |_| {
        s.wait();
        u.wait();
        Ok(LateConn { closes: c.clone() })
    });

    let provider = ServiceProvider::new(Arc::new(bindings));
    let scope = provider.create_scope();

    thread::scope(|ts| {
        let handle = ts.spawn(|_| scope.get::<LateConn>());

        // The factory is now mid-construction; close the scope under it.
        started.wait();
        scope.close(&CancellationToken::new()).unwrap();
        unblock.wait();

        let result = handle.join().unwrap();
        assert!(matches!(result.unwrap_err(), DiError::ScopeClosed(_)));
    })
    .unwrap();

    // The losing instance was still closed, exactly once.
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn async_only_construction_losing_the_close_race_is_rejected() {
    use async_trait::async_trait;

    #[derive(Debug)]
    struct LateChannel {
        closes: Arc<AtomicU32>,
    }

    #[async_trait]
    impl filament_di::AsyncCloser for LateChannel {
        async fn close(&self, _token: &CancellationToken) -> Result<(), BoxError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let closes = Arc::new(AtomicU32::new(0));
    let started = Arc::new(Barrier::new(2));
    let unblock = Arc::new(Barrier::new(2));

    let c = closes.clone();
    let s = started.clone();
    let u = unblock.clone();
    let mut bindings = BindingMap::new();
    bindings.bind_async_closeable::<LateChannel, _>(Lifetime::Scoped, move |_| {
        s.wait();
        u.wait();
        Ok(LateChannel { closes: c.clone() })
    });

    let provider = ServiceProvider::new(Arc::new(bindings));
    let scope = provider.create_scope();

    thread::scope(|ts| {
        let handle = ts.spawn(|_| scope.get::<LateChannel>());

        started.wait();
        scope.close(&CancellationToken::new()).unwrap();
        unblock.wait();

        let result = handle.join().unwrap();
        assert!(matches!(result.unwrap_err(), DiError::ScopeClosed(_)));
    })
    .unwrap();

    // A synchronous path cannot drive an async closer; the instance is
    // dropped unclosed and the rejection is the caller's signal.
    assert_eq!(closes.load(Ordering::SeqCst), 0);
}

#[test]
fn many_scopes_in_parallel_stay_isolated() {
    let mut bindings = BindingMap::new();
    bindings.bind::<AtomicU32, _>(Lifetime::Scoped, |_| Ok(AtomicU32::new(0)));

    let provider = ServiceProvider::new(Arc::new(bindings));

    thread::scope(|s| {
        for _ in 0..8 {
            let provider = provider.clone();
            s.spawn(move |_| {
                let scope = provider.create_scope();
                let counter = scope.get::<AtomicU32>().unwrap();
                for _ in 0..100 {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                // Only this scope's increments are visible here.
                assert_eq!(scope.get::<AtomicU32>().unwrap().load(Ordering::SeqCst), 100);
            });
        }
    })
    .unwrap();
}
