use managed_handle::ManagedHandle;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .init();

    let device = ManagedHandle::create(0x10u32, |id| println!("destroy device {id:#x}"));
    let pool = ManagedHandle::create(0x20u32, |id| println!("destroy pool {id:#x}"));
    let buffer = ManagedHandle::create(0x30u32, |id| println!("destroy buffer {id:#x}"));

    // A buffer is allocated from a pool, which belongs to a device.
    pool.depend_on(device).unwrap();
    buffer.depend_on(pool).unwrap();

    let copy = buffer.clone();
    drop(buffer);
    println!("buffer still alive: {:#x}", copy.get().unwrap());

    // Prints buffer, pool and device, in that order.
    drop(copy);
}
