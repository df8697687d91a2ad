//! Integration tests for the typed `PoolBox` view

use std::cell::Cell;

use nebula_block_pool::{BlockPool, PoolBox, PoolConfig, PoolError};

#[derive(Debug, PartialEq)]
struct Node {
    value: i32,
    weight: u64,
}

struct DropCounter<'a> {
    drops: &'a Cell<usize>,
}

impl Drop for DropCounter<'_> {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[test]
fn test_pool_box_basic() {
    let pool = BlockPool::for_type::<Node>(4).unwrap();

    let mut node = PoolBox::new_in(Node { value: 1, weight: 10 }, &pool).unwrap();
    assert_eq!(pool.used_blocks(), 1);
    assert!(pool.contains(node.as_ptr().cast()));

    node.value = 2;
    assert_eq!(*node, Node { value: 2, weight: 10 });
    assert!(std::ptr::eq(node.pool(), &pool));

    drop(node);
    assert_eq!(pool.used_blocks(), 0);
}

#[test]
fn test_pool_box_runs_destructor_once() {
    let drops = Cell::new(0);
    let pool = BlockPool::for_type::<DropCounter<'_>>(2).unwrap();

    {
        let _a = PoolBox::new_in(DropCounter { drops: &drops }, &pool).unwrap();
        let _b = PoolBox::new_in(DropCounter { drops: &drops }, &pool).unwrap();
        assert_eq!(drops.get(), 0);
    }

    assert_eq!(drops.get(), 2);
    assert_eq!(pool.used_blocks(), 0);
}

#[test]
fn test_pool_box_into_inner() {
    let drops = Cell::new(0);
    let pool = BlockPool::for_type::<DropCounter<'_>>(1).unwrap();

    let boxed = PoolBox::new_in(DropCounter { drops: &drops }, &pool).unwrap();
    let value = boxed.into_inner();

    assert_eq!(drops.get(), 0, "into_inner must not drop the value");
    assert_eq!(pool.used_blocks(), 0);

    drop(value);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_pool_box_layout_mismatch() {
    let pool = BlockPool::new(8, 4, 8).unwrap();

    let err = PoolBox::new_in([0u64; 4], &pool).unwrap_err();
    assert_eq!(
        err,
        PoolError::LayoutMismatch {
            size: 32,
            align: 8,
            block_size: 8,
            alignment: 8,
        }
    );

    let pool = BlockPool::new(16, 4, 1).unwrap();
    let err = PoolBox::new_in(7u16, &pool).unwrap_err();
    assert!(matches!(err, PoolError::LayoutMismatch { align: 2, .. }));
    assert_eq!(pool.used_blocks(), 0);
}

#[test]
fn test_pool_box_exhausted() {
    let pool = BlockPool::with_config(16, 1, 8, PoolConfig::fixed()).unwrap();

    let first = PoolBox::new_in(1u64, &pool).unwrap();
    let err = PoolBox::new_in(2u64, &pool).unwrap_err();
    assert_eq!(err, PoolError::Exhausted { total_blocks: 1 });
    assert!(err.is_retryable());

    drop(first);
    let second = PoolBox::new_in(3u64, &pool).unwrap();
    assert_eq!(*second, 3);
}

#[test]
fn test_pool_box_send_between_threads() {
    let pool = BlockPool::for_type::<Vec<u32>>(2).unwrap();

    std::thread::scope(|scope| {
        let boxed = PoolBox::new_in(vec![1, 2, 3], &pool).unwrap();
        let handle = scope.spawn(move || boxed.iter().sum::<u32>());
        assert_eq!(handle.join().unwrap(), 6);
    });

    assert_eq!(pool.used_blocks(), 0);
}
