//! Singly linked list whose nodes live in pool blocks
//!
//! Run with `RUST_LOG=debug cargo run --example linked_list` to see the
//! pool's growth events.

use std::fmt;

use nebula_block_pool::{BlockPool, PoolBox, PoolConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Node<'p> {
    value: i32,
    next: Option<PoolBox<'p, Node<'p>>>,
}

/// Linked list backed by a block pool
struct PoolList<'p> {
    pool: &'p BlockPool,
    head: Option<PoolBox<'p, Node<'p>>>,
    len: usize,
}

impl<'p> PoolList<'p> {
    fn new(pool: &'p BlockPool) -> Self {
        Self {
            pool,
            head: None,
            len: 0,
        }
    }

    /// Appends `value`; declines and returns `false` when the pool is exhausted
    fn insert(&mut self, value: i32) -> bool {
        let node = match PoolBox::new_in(Node { value, next: None }, self.pool) {
            Ok(node) => node,
            Err(err) => {
                warn!(value, error = %err, "Insert declined");
                return false;
            }
        };

        let mut cursor = &mut self.head;
        while let Some(node) = cursor {
            cursor = &mut node.next;
        }
        *cursor = Some(node);
        self.len += 1;
        true
    }

    /// Unlinks the first node holding `value`, returning its block to the pool
    fn remove(&mut self, value: i32) -> bool {
        let mut cursor = &mut self.head;
        while cursor.as_ref().is_some_and(|node| node.value != value) {
            if let Some(node) = cursor {
                cursor = &mut node.next;
            }
        }

        let Some(mut removed) = cursor.take() else {
            return false;
        };
        *cursor = removed.next.take();
        self.len -= 1;
        true
    }

    fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        std::iter::successors(self.head.as_deref(), |node| node.next.as_deref())
            .map(|node| node.value)
    }
}

impl Drop for PoolList<'_> {
    fn drop(&mut self) {
        // Unlink iteratively; nested drops would recurse once per node
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

impl fmt::Display for PoolList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in self.iter() {
            if !first {
                write!(f, " -> ")?;
            }
            write!(f, "{value}")?;
            first = false;
        }
        if first { write!(f, "(empty)") } else { Ok(()) }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Ten nodes up front; inserting twenty forces the pool to grow
    let pool = BlockPool::for_type::<Node<'_>>(10)?;
    {
        let mut list = PoolList::new(&pool);
        for value in 1..=20 {
            list.insert(value);
        }
        info!(len = list.len, %list, "Inserted");

        list.remove(7);
        list.remove(20);
        info!(len = list.len, %list, "Removed 7 and 20");

        let stats = pool.stats();
        info!(
            total_blocks = stats.total_blocks,
            used_blocks = stats.used_blocks,
            regions = stats.region_count,
            "Pool state"
        );
    }
    info!(used_blocks = pool.used_blocks(), "List dropped");

    // A capped pool declines inserts once the cap is reached
    let capped = BlockPool::with_config(
        size_of::<Node<'_>>(),
        4,
        align_of::<Node<'_>>(),
        PoolConfig::production().with_max_blocks(6),
    )?;
    let mut list = PoolList::new(&capped);
    let accepted = (1..=10).filter(|&value| list.insert(value)).count();
    info!(accepted, %list, "Capped pool");

    Ok(())
}
