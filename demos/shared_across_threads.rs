use std::thread;

use managed_handle::ManagedHandle;

fn main() {
    tracing_subscriber::fmt().init();

    let context = ManagedHandle::create(1u64, |id| println!("closing context {id}"));

    thread::scope(|s| {
        for worker in 0..4 {
            let context = context.clone();
            s.spawn(move || {
                let stream = ManagedHandle::create(100 + worker, move |id| {
                    println!("closing stream {id} of worker {worker}")
                });
                // The stream must not outlive the context it was opened on.
                stream.depend_on(context).unwrap();
                println!("worker {worker} using stream {}", stream.get().unwrap());
            });
        }
    });

    println!("workers done, dropping the last context owner");
    drop(context);
}
