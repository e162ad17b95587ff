// prefab_pool demo
// Runs the Rock and Bullet pools through exhaustion and prints their metrics.
//
// Usage: prefab_pool [manifest.json]
// Set RUST_LOG=debug to see pool diagnostics.

use prefab_pool::{
    EntrySource, JsonFileSource, Placement, PoolDataSender, PoolEntry, PoolRegistry, PoolResult,
    Poolable, StaticEntries, TemplateCatalog, TemplateId,
};
use tracing_subscriber::EnvFilter;

struct Prop {
    name: TemplateId,
    position: [f32; 3],
}

impl Poolable for Prop {
    fn on_pool_init(&mut self, template: &TemplateId) {
        self.name = template.clone();
    }

    fn on_activate(&mut self, placement: &Placement) {
        self.position = placement.position;
    }
}

fn catalog() -> TemplateCatalog<Prop> {
    let mut catalog = TemplateCatalog::new();
    for name in ["Rock", "Bullet"] {
        catalog.register(name, || Prop {
            name: TemplateId::new(""),
            position: [0.0; 3],
        });
    }
    catalog
}

async fn load(registry: &mut PoolRegistry<TemplateCatalog<Prop>>) -> PoolResult<()> {
    async fn send<S: EntrySource>(
        source: S,
        registry: &mut PoolRegistry<TemplateCatalog<Prop>>,
    ) -> PoolResult<()> {
        let report = PoolDataSender::new(source).send(registry).await?;
        for skipped in &report.skipped {
            println!("  skipped: {}", skipped);
        }
        Ok(())
    }

    match std::env::args().nth(1) {
        Some(path) => send(JsonFileSource::new(path), registry).await,
        None => {
            let entries = vec![
                PoolEntry::new("Rock", 3),
                PoolEntry::new("Bullet", 2).recycling(),
            ];
            send(StaticEntries(entries), registry).await
        }
    }
}

#[tokio::main]
async fn main() -> PoolResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== prefab_pool demo ===");

    let mut registry = PoolRegistry::new(catalog());
    load(&mut registry).await?;

    let templates: Vec<TemplateId> = registry.pools().map(|p| p.template().clone()).collect();
    for template in &templates {
        let capacity = registry.pool(template).map_or(0, |p| p.entry().capacity);
        println!("\n{} (capacity {}):", template, capacity);

        for i in 0..=capacity {
            let placement = Placement::at([i as f32, 0.0, 0.0]);
            match registry.acquire(template, placement) {
                Some(handle) => {
                    let prop = registry.get(&handle);
                    println!(
                        "  acquire #{} -> slot {} of {} at {:?}",
                        i + 1,
                        handle.slot(),
                        prop.map_or("?", |p| p.name.as_str()),
                        prop.map(|p| p.position)
                    );
                }
                None => println!("  acquire #{} -> none", i + 1),
            }
        }

        if let Some(health) = registry.health(template) {
            println!("  healthy: {}", health.is_healthy());
            for warning in &health.warnings {
                println!("  warning: {}", warning);
            }
        }
        if let Some(metrics) = registry.metrics(template) {
            let mut exported: Vec<_> = metrics.export().into_iter().collect();
            exported.sort();
            for (key, value) in exported {
                println!("  {}: {}", key, value);
            }
        }
    }

    Ok(())
}
