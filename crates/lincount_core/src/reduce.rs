//! Reducers: sum a function over a sequencer's walk
//!
//! [`SerialSum`] walks on the calling thread. [`ThreadedSum`] hands each
//! vector to a fixed pool of scoped worker threads through a bounded
//! channel. When the channel is full the producer evaluates the item
//! itself, so memory stays bounded and the producer never blocks on a slow
//! pool.
//!
//! Addition is commutative, so both reducers return the same total for the
//! same inputs regardless of scheduling.

use crate::cache::lock;
use crate::sequence::Sequencer;
use num_bigint::BigUint;
use num_traits::Zero;
use std::sync::mpsc::{sync_channel, TrySendError};
use std::sync::Mutex;
use std::thread;

/// Function summed by a reducer
pub type TermFn<'a> = dyn Fn(&[i64]) -> BigUint + Sync + 'a;

/// Sum `f(x)` over every `x` produced by a sequencer
pub trait Reducer: Send + Sync {
    fn reduce(&self, f: &TermFn<'_>, seq: &dyn Sequencer) -> BigUint;
}

/// Single-threaded reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialSum;

impl Reducer for SerialSum {
    fn reduce(&self, f: &TermFn<'_>, seq: &dyn Sequencer) -> BigUint {
        let mut sum = BigUint::zero();
        if let Some(mut x) = seq.first() {
            loop {
                let term = f(&x);
                if !term.is_zero() {
                    sum += term;
                }
                if !seq.advance(&mut x) {
                    break;
                }
            }
        }
        sum
    }
}

/// Thread-pool reducer with producer-side backpressure
#[derive(Debug, Clone, Copy)]
pub struct ThreadedSum {
    /// Worker threads
    pub threads: usize,
    /// Queued items allowed per worker before the producer runs items inline
    pub queue_depth: usize,
}

impl ThreadedSum {
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            queue_depth: 4,
        }
    }

    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth.max(1);
        self
    }
}

impl Default for ThreadedSum {
    fn default() -> Self {
        Self::new(thread::available_parallelism().map_or(4, |n| n.get()))
    }
}

impl Reducer for ThreadedSum {
    fn reduce(&self, f: &TermFn<'_>, seq: &dyn Sequencer) -> BigUint {
        let mut x = match seq.first() {
            Some(x) => x,
            None => return BigUint::zero(),
        };

        let total = Mutex::new(BigUint::zero());
        let add = |term: BigUint| {
            if !term.is_zero() {
                *lock(&total) += term;
            }
        };

        let (tx, rx) = sync_channel::<Vec<i64>>(self.threads * self.queue_depth);
        let rx = Mutex::new(rx);

        thread::scope(|s| {
            for _ in 0..self.threads {
                s.spawn(|| loop {
                    let next = lock(&rx).recv();
                    match next {
                        Ok(item) => add(f(&item)),
                        Err(_) => break,
                    }
                });
            }

            loop {
                match tx.try_send(x.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(item)) | Err(TrySendError::Disconnected(item)) => {
                        add(f(&item))
                    }
                }
                if !seq.advance(&mut x) {
                    break;
                }
            }
            // closing the channel lets idle workers exit
            drop(tx);
        });

        total.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{BoundedSeq, CubeSeq, RangeSeq};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn weight(x: &[i64]) -> BigUint {
        BigUint::from(x.iter().map(|&v| (v + 1) as u64).product::<u64>())
    }

    #[test]
    fn test_serial_sum() {
        let seq = RangeSeq::new(0, 101);
        let sum = SerialSum.reduce(&|x| BigUint::from(x[0] as u64), &seq);
        assert_eq!(sum, BigUint::from(5050u32));
        assert!(SerialSum.reduce(&weight, &RangeSeq::new(1, 1)).is_zero());
    }

    #[test]
    fn test_threaded_matches_serial() {
        let seq = CubeSeq::new(4, 5);
        let serial = SerialSum.reduce(&weight, &seq);
        for threads in [1, 2, 7] {
            let threaded = ThreadedSum::new(threads).reduce(&weight, &seq);
            assert_eq!(threaded, serial);
        }
        // (1 + 2 + 3 + 4 + 5)^4
        assert_eq!(serial, BigUint::from(50625u32));
    }

    #[test]
    fn test_threaded_visits_each_item_once() {
        let calls = AtomicUsize::new(0);
        let seq = BoundedSeq::up_to(vec![9, 9, 9]);
        let reducer = ThreadedSum::new(3).with_queue_depth(1);
        let sum = reducer.reduce(
            &|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                BigUint::from(1u32)
            },
            &seq,
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1000);
        assert_eq!(sum, BigUint::from(1000u32));
    }

    #[test]
    fn test_threaded_empty_walk() {
        let sum = ThreadedSum::default().reduce(&weight, &RangeSeq::new(5, 2));
        assert!(sum.is_zero());
    }
}
