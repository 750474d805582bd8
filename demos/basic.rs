use mempool::{Handle, Pool};

fn log_alloc(pool: &Pool, label: &str, handle: Handle) {
    println!(
        "{label}: got a block of {} usable bytes at offset {handle:?}",
        pool.payload(handle).len(),
    );
}

fn dump_chain(pool: &Pool) {
    print!("chain:");
    for block in pool.blocks() {
        let state = if block.is_free { "free" } else { "used" };
        print!(" [{} {state}]", block.size);
    }
    println!();
}

fn main() {
    let mut pool = Pool::new(1024);
    println!("pool of {} bytes", pool.capacity());
    dump_chain(&pool);

    let a = pool.alloc(100).unwrap();
    log_alloc(&pool, "a", a);

    let b = pool.alloc(40).unwrap();
    log_alloc(&pool, "b", b);

    pool.payload_mut(a)[..13].copy_from_slice(b"hello, arena!");
    dump_chain(&pool);

    println!("releasing b");
    pool.free(Some(b));
    dump_chain(&pool);

    let a = pool.resize(Some(a), 200).unwrap();
    log_alloc(&pool, "a after resize", a);
    println!(
        "payload still starts with {:?}",
        std::str::from_utf8(&pool.payload(a)[..13]).unwrap(),
    );

    println!("releasing a");
    pool.free(Some(a));
    dump_chain(&pool);
}
