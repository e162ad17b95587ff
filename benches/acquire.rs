use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prefab_pool::{Placement, PoolEntry, PoolRegistry, Poolable, TemplateCatalog, TemplateId};

struct Particle {
    position: [f32; 3],
}

impl Poolable for Particle {
    fn on_pool_init(&mut self, _template: &TemplateId) {}

    fn on_activate(&mut self, placement: &Placement) {
        self.position = placement.position;
    }
}

fn registry(entry: PoolEntry) -> PoolRegistry<TemplateCatalog<Particle>> {
    let mut catalog = TemplateCatalog::new();
    catalog.register("Particle", || Particle { position: [0.0; 3] });
    let mut registry = PoolRegistry::new(catalog);
    registry.initialize(vec![entry]);
    registry
}

fn acquire_release(c: &mut Criterion) {
    let template: TemplateId = "Particle".into();

    let mut grow = registry(PoolEntry::new("Particle", 256));
    c.bench_function("acquire_deactivate", |b| {
        b.iter(|| {
            let handle = grow.acquire(&template, Placement::default()).unwrap();
            grow.deactivate(black_box(&handle));
        })
    });

    let mut recycle = registry(PoolEntry::new("Particle", 256).recycling());
    for _ in 0..256 {
        recycle.acquire(&template, Placement::default());
    }
    c.bench_function("forced_reacquire", |b| {
        b.iter(|| black_box(recycle.acquire(&template, Placement::default())))
    });
}

criterion_group!(benches, acquire_release);
criterion_main!(benches);
