//! # lrucache
//!
//! Fixed-capacity LRU cache over `i32` keys and values.
//!
//! ## Architecture
//! - **Frame pool**: preallocated value cells, handed out in order and reused on eviction
//! - **Hash index**: fixed bucket chains sized from capacity, key mixing picked per size (O(1))
//! - **Recency list**: intrusive circular list, most recently used at the head (O(1))
//! - **Engine**: [`LruCache`] ties the three together and evicts the tail when full
//!
//! ```
//! use lrucache::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.put(1, 1);
//! cache.put(2, 2);
//! assert_eq!(cache.get(1), Some(1));
//!
//! cache.put(3, 3); // evicts 2
//! assert_eq!(cache.get(2), None);
//! assert_eq!(cache.get(3), Some(3));
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod frames;
mod hmap;
mod lrul;
mod ring;
mod stats;

pub use cache::{LruCache, PutOutcome};
pub use error::{Error, Result};
pub use hmap::{HashTier, MAX_BUCKET_BITS};
pub use stats::CacheStats;
