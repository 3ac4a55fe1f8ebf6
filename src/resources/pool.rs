use crate::foundation::core::PixelFormat;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shape of an intermediate image; the pool's bucket key.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ImageDesc {
    /// Pixel format.
    pub format: PixelFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDesc {
    /// Build a descriptor.
    pub const fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
        }
    }

    /// Backing size in bytes.
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(self.format.bytes_per_pixel())
    }
}

/// Buffers to allocate up front.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourcePoolOpts {
    /// `(descriptor, count)` pairs retained at construction.
    pub prewarm: Vec<PrewarmEntry>,
}

/// One prewarm request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrewarmEntry {
    /// Buffer shape.
    pub desc: ImageDesc,
    /// Number of buffers.
    pub count: usize,
}

/// Allocation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PoolStats {
    /// Buffers allocated since construction (prewarm included).
    pub allocations: u64,
    /// Bytes allocated since construction.
    pub allocated_bytes: u64,
    /// Checkouts served from a bucket.
    pub reuses: u64,
    /// Buffers currently checked out.
    pub checked_out: usize,
    /// Buffers idle in buckets.
    pub retained: usize,
    /// Bytes idle in buckets.
    pub retained_bytes: usize,
}

#[derive(Debug, Default)]
struct Inner {
    stats: PoolStats,
    // Op-level lookup, never per pixel.
    buckets: HashMap<ImageDesc, Vec<Box<[u8]>>>,
}

impl Inner {
    fn take(&mut self, desc: ImageDesc) -> Box<[u8]> {
        self.stats.checked_out += 1;
        if let Some(bucket) = self.buckets.get_mut(&desc)
            && let Some(buf) = bucket.pop()
        {
            self.stats.reuses += 1;
            self.stats.retained = self.stats.retained.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(buf.len());
            return buf;
        }
        self.allocate(desc)
    }

    fn allocate(&mut self, desc: ImageDesc) -> Box<[u8]> {
        let len = desc.byte_len();
        self.stats.allocations += 1;
        self.stats.allocated_bytes += len as u64;
        tracing::debug!(
            format = ?desc.format,
            width = desc.width,
            height = desc.height,
            bytes = len,
            "pool allocation"
        );
        vec![0u8; len].into_boxed_slice()
    }

    fn put(&mut self, desc: ImageDesc, buf: Box<[u8]>) {
        self.stats.retained += 1;
        self.stats.retained_bytes += buf.len();
        self.buckets.entry(desc).or_default().push(buf);
    }
}

/// Shared pool of intermediate image buffers keyed by `(format, width, height)`.
///
/// Cloning yields another handle to the same pool. Buckets grow on demand and never shrink, so
/// once every shape a workload needs has been seen at its peak concurrency, further checkouts
/// allocate nothing.
#[derive(Clone, Debug, Default)]
pub struct ResourcePool {
    inner: Arc<Mutex<Inner>>,
}

impl ResourcePool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool with buffers allocated per `opts`.
    pub fn with_opts(opts: &ResourcePoolOpts) -> Self {
        let pool = Self::new();
        {
            let mut inner = pool.lock();
            for entry in &opts.prewarm {
                for _ in 0..entry.count {
                    let buf = inner.allocate(entry.desc);
                    inner.put(entry.desc, buf);
                }
            }
        }
        pool
    }

    // Every critical section leaves `Inner` consistent, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Check out a buffer for `format` at `width` x `height`.
    pub fn checkout(&self, format: PixelFormat, width: u32, height: u32) -> PooledImage {
        self.checkout_desc(ImageDesc::new(format, width, height))
    }

    /// Check out a buffer for `desc`.
    pub fn checkout_desc(&self, desc: ImageDesc) -> PooledImage {
        let buf = self.lock().take(desc);
        PooledImage {
            desc,
            buf: Some(buf),
            pool: self.clone(),
        }
    }

    /// Return a buffer explicitly. Equivalent to dropping it.
    pub fn release(&self, image: PooledImage) {
        drop(image);
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> PoolStats {
        self.lock().stats
    }

    fn give_back(&self, desc: ImageDesc, buf: Box<[u8]>) {
        let mut inner = self.lock();
        inner.stats.checked_out = inner.stats.checked_out.saturating_sub(1);
        inner.put(desc, buf);
    }
}

/// Exclusively owned pool buffer; returns itself to the pool on drop.
#[derive(Debug)]
pub struct PooledImage {
    desc: ImageDesc,
    buf: Option<Box<[u8]>>,
    pool: ResourcePool,
}

impl PooledImage {
    /// Buffer shape.
    pub fn desc(&self) -> ImageDesc {
        self.desc
    }

    /// Pixel bytes.
    pub fn bytes(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or(&[])
    }

    /// Mutable pixel bytes.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.buf.as_deref_mut().unwrap_or(&mut [])
    }

    /// Address of the backing storage; identifies the physical buffer.
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes().as_ptr()
    }
}

impl Drop for PooledImage {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.give_back(self.desc, buf);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resources/pool.rs"]
mod tests;
