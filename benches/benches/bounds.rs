// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_bounds::{
    Bounds, BoundsObserver, Handle, LayoutNode, ListenOptions, SignalCallback, start_detecting,
};

struct Slot {
    bounds: Cell<Bounds>,
    parent: Option<Node>,
    listeners: RefCell<Vec<Option<SignalCallback>>>,
}

#[derive(Clone)]
struct Node(Rc<Slot>);

impl Node {
    fn chain(depth: usize) -> Self {
        let mut node = Self::new(None);
        for _ in 0..depth {
            node = Self::new(Some(node));
        }
        node
    }

    fn new(parent: Option<Self>) -> Self {
        Self(Rc::new(Slot {
            bounds: Cell::new(Bounds::new(0.0, 0.0, 100.0, 100.0)),
            parent,
            listeners: RefCell::new(Vec::new()),
        }))
    }

    fn root(&self) -> Self {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    fn fire(&self) {
        let callbacks: Vec<SignalCallback> =
            self.0.listeners.borrow().iter().flatten().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    fn subscribe(&self, callback: SignalCallback) -> Handle {
        let mut listeners = self.0.listeners.borrow_mut();
        let index = listeners.len();
        listeners.push(Some(callback));
        let slot = Rc::downgrade(&self.0);
        Handle::from_fn(move || {
            if let Some(slot) = slot.upgrade() {
                slot.listeners.borrow_mut()[index] = None;
            }
        })
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl LayoutNode for Node {
    fn parent(&self) -> Option<Self> {
        self.0.parent.clone()
    }

    fn measure(&self) -> Bounds {
        self.0.bounds.get()
    }

    fn watch_attributes(&self, _attributes: &[&'static str], callback: SignalCallback) -> Handle {
        self.subscribe(callback)
    }

    fn watch_size(&self, callback: SignalCallback) -> Handle {
        self.subscribe(callback)
    }

    fn listen_scroll(&self, callback: SignalCallback, _options: ListenOptions) -> Handle {
        self.subscribe(callback)
    }
}

fn bench_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_bounds");
    group.sample_size(50);

    for &depth in &[8_usize, 64, 512] {
        group.bench_function(format!("start_and_cancel(depth={depth})"), |b| {
            b.iter_batched(
                || Node::chain(depth),
                |leaf| {
                    let mut handle = start_detecting(&leaf, |_| {});
                    handle.cancel().unwrap();
                    black_box(leaf);
                },
                BatchSize::SmallInput,
            );
        });
    }

    // A root scroll reaches every observed leaf; nothing actually moves.
    for &(leaves, depth) in &[(16_usize, 8_usize), (256, 8), (64, 64)] {
        let parent = Node::chain(depth - 1);
        let observer = BoundsObserver::new(|entries, _| {
            black_box(entries);
        });
        for _ in 0..leaves {
            observer.observe(Node::new(Some(parent.clone())));
        }
        let top = parent.root();
        group.bench_function(
            format!("root_signal_no_change(leaves={leaves},depth={depth})"),
            |b| b.iter(|| top.fire()),
        );
        observer.disconnect().unwrap();
    }

    group.finish();
}

criterion_group!(benches, bench_bounds);
criterion_main!(benches);
