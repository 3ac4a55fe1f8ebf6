use super::*;

const FMT: PixelFormat = PixelFormat::Rgba16Float;

#[test]
fn checkout_allocates_then_reuses() {
    let pool = ResourcePool::new();
    let a = pool.checkout(FMT, 8, 8);
    assert_eq!(a.bytes().len(), 8 * 8 * 8);
    assert_eq!(a.desc(), ImageDesc::new(FMT, 8, 8));
    let ptr = a.as_ptr();
    drop(a);

    let st = pool.stats();
    assert_eq!(st.allocations, 1);
    assert_eq!(st.checked_out, 0);
    assert_eq!(st.retained, 1);

    let b = pool.checkout(FMT, 8, 8);
    assert_eq!(b.as_ptr(), ptr);
    let st = pool.stats();
    assert_eq!(st.allocations, 1);
    assert_eq!(st.reuses, 1);
    assert_eq!(st.checked_out, 1);
    assert_eq!(st.retained, 0);
}

#[test]
fn buckets_are_keyed_by_format_and_size() {
    let pool = ResourcePool::new();
    pool.release(pool.checkout(FMT, 8, 8));
    let _other_size = pool.checkout(FMT, 8, 4);
    let _other_format = pool.checkout(PixelFormat::Rgba8Premul, 8, 8);
    let st = pool.stats();
    assert_eq!(st.allocations, 3);
    assert_eq!(st.reuses, 0);
    assert_eq!(st.retained, 1);
}

#[test]
fn live_handles_are_never_shared() {
    let pool = ResourcePool::new();
    let a = pool.checkout(FMT, 4, 4);
    let b = pool.checkout(FMT, 4, 4);
    assert_ne!(a.as_ptr(), b.as_ptr());
    assert_eq!(pool.stats().checked_out, 2);
}

#[test]
fn steady_state_allocates_nothing() {
    let pool = ResourcePool::new();
    let work = |pool: &ResourcePool| {
        let held: Vec<PooledImage> = (0..4)
            .map(|i| pool.checkout(FMT, 16 >> (i % 2), 16 >> (i % 2)))
            .collect();
        drop(held);
    };
    work(&pool);
    let warm = pool.stats();
    for _ in 0..10 {
        work(&pool);
    }
    let st = pool.stats();
    assert_eq!(st.allocations, warm.allocations);
    assert_eq!(st.allocated_bytes, warm.allocated_bytes);
    assert_eq!(st.reuses, warm.reuses + 40);
}

#[test]
fn prewarm_retains_requested_buffers() {
    let desc = ImageDesc::new(FMT, 32, 32);
    let pool = ResourcePool::with_opts(&ResourcePoolOpts {
        prewarm: vec![PrewarmEntry { desc, count: 2 }],
    });
    let st = pool.stats();
    assert_eq!(st.allocations, 2);
    assert_eq!(st.retained, 2);
    assert_eq!(st.retained_bytes, 2 * desc.byte_len());

    let _a = pool.checkout_desc(desc);
    let _b = pool.checkout_desc(desc);
    assert_eq!(pool.stats().allocations, 2);
}

#[test]
fn clones_share_one_pool_across_threads() {
    let pool = ResourcePool::new();
    std::thread::scope(|s| {
        for _ in 0..4 {
            let p = pool.clone();
            s.spawn(move || {
                for _ in 0..8 {
                    let mut img = p.checkout(FMT, 2, 2);
                    img.bytes_mut()[0] = 1;
                }
            });
        }
    });
    let st = pool.stats();
    assert_eq!(st.checked_out, 0);
    assert!(st.allocations <= 4);
    assert_eq!(st.retained as u64, st.allocations);
}

#[test]
fn opts_deserialize_with_defaults() {
    let opts: ResourcePoolOpts = serde_json::from_str("{}").unwrap();
    assert!(opts.prewarm.is_empty());
    let opts: ResourcePoolOpts = serde_json::from_value(serde_json::json!({
        "prewarm": [{ "desc": { "format": "rgba8Premul", "width": 4, "height": 2 }, "count": 3 }]
    }))
    .unwrap();
    assert_eq!(opts.prewarm[0].desc.byte_len(), 32);
}
