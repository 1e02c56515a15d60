//! Example loading programs and textures through the headless backend.
//!
//! Run with: cargo run --example headless_library [resource-root]
//!
//! Without an argument the example serves resources from memory.

use rescache::metrics::{MetricsExporter, PrometheusTextExporter};
use rescache::prelude::*;
use rescache::resource::HeadlessBackend;

fn memory_resources() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert(
        "shaders/basic.prog",
        "# basic lit program\nbasic.vert\n/shared/light.frag\n",
    );
    store.insert("shaders/basic.vert", "void main() { gl_Position = vec4(0.0); }");
    store.insert("shared/light.frag", "out vec4 c; void main() { c = vec4(1.0); }");
    store.insert("shaders/broken.prog", "basic.vert\nmissing.frag\n");
    store
}

fn run<S: ResourceStore>(library: ResourceLibrary<S, HeadlessBackend>) {
    println!("=== Programs ===\n");

    match library.program("shaders/basic.prog") {
        Ok(program) => {
            let again = library.program("/shaders/basic.prog");
            let shared = again
                .as_ref()
                .is_ok_and(|again| ResourceHandle::ptr_eq(&program, again));
            println!("   linked {} from {} shader(s)", program.name, program.shaders.len());
            println!("   same instance on second get? {shared}");
            println!("   cached programs: {}", library.programs().len());
        },
        Err(err) => println!("   failed: {err}"),
    }
    println!("   cached programs after release: {}", library.programs().len());

    match library.program("shaders/broken.prog") {
        Ok(_) => println!("   broken.prog unexpectedly linked"),
        Err(err) => println!("   broken.prog: {err}"),
    }
    println!();

    println!("=== Metrics ===\n");
    let exporter = PrometheusTextExporter::new("rescache", Vec::new()).with_cache_label("programs");
    exporter.export(&library.programs().metrics_snapshot());
    print!("{}", String::from_utf8_lossy(&exporter.into_inner()));
}

fn main() {
    match std::env::args().nth(1) {
        Some(root) => match FileSystemStore::open(&root) {
            Ok(store) => run(ResourceLibrary::new(store, HeadlessBackend::new())),
            Err(err) => eprintln!("{err}"),
        },
        None => run(ResourceLibrary::new(memory_resources(), HeadlessBackend::new())),
    }
}
