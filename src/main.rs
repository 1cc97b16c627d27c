use std::path::Path;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;

use callmetrics::advice::{AsyncCallJoinPoint, Instrumented, MetricAdvice};
use callmetrics::config::{config_schema, load_config, ConfigV1};
use callmetrics::directives::{ExceptionMetered, FailureKind, Metered, Method, Timed};
use callmetrics::error::AdviceError;
use callmetrics::registry::{InMemoryRegistry, MetricRegistry};
use callmetrics::store::RegistryStore;
use callmetrics::utils::logger::init_logging;
use thiserror::Error;
use tracing::{debug, error, info};

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

// -- Sample service

#[derive(Debug, Error)]
#[error("not enough stock for {sku}")]
struct OutOfStock {
    sku: String,
}

#[derive(Debug, Error)]
enum InventoryError {
    #[error("reservation failed")]
    Reservation(#[source] OutOfStock),
}

struct Inventory {
    stock: u32,
    restock: Instrumented,
    reserve: Instrumented,
}

impl Inventory {
    fn new(advice: &MetricAdvice) -> Result<Self, AdviceError> {
        let restock = Method::of::<Inventory>("restock")
            .timed(Timed::new())
            .metered(Metered::new());
        let reserve = Method::of::<Inventory>("reserve")
            .metered(Metered::named("reservations"))
            .exception_metered(ExceptionMetered::new().cause(FailureKind::of::<OutOfStock>()));

        Ok(Inventory {
            stock: 0,
            restock: advice.instrument(&restock)?,
            reserve: advice.instrument(&reserve)?,
        })
    }

    fn restock(&mut self, amount: u32) -> Result<u32, InventoryError> {
        let restock = self.restock.clone();
        restock.call(|| {
            self.stock += amount;
            Ok(self.stock)
        })
    }

    fn reserve(&mut self, sku: &str, amount: u32) -> Result<u32, InventoryError> {
        let reserve = self.reserve.clone();
        reserve.call(|| {
            if amount > self.stock {
                return Err(InventoryError::Reservation(OutOfStock {
                    sku: sku.to_string(),
                }));
            }
            self.stock -= amount;
            Ok(self.stock)
        })
    }
}

async fn sync_catalog(round: u32) -> Result<u32, std::io::Error> {
    tokio::time::sleep(Duration::from_millis(2)).await;
    Ok(round)
}

async fn run_workload(
    advice: &MetricAdvice,
    registry: &InMemoryRegistry,
    iterations: u32,
) -> Result<(), AdviceError> {
    let mut inventory = Inventory::new(advice)?;
    let sync_method = Method::new("callmetrics.catalog", "sync").timed(Timed::new());

    for round in 0..iterations {
        match inventory.restock(1) {
            Ok(stock) => debug!(round, stock, "Restocked"),
            Err(e) => debug!(round, error = %e, "Restock failed"),
        }
        match inventory.reserve("sku-1", 2) {
            Ok(stock) => debug!(round, stock, "Reserved stock"),
            Err(e) => debug!(round, error = %e, "Reservation failed"),
        }
        if let Err(e) = advice
            .around_async(AsyncCallJoinPoint::new(
                sync_method.clone(),
                sync_catalog(round),
            ))
            .await?
        {
            debug!(round, error = %e, "Catalog sync failed");
        }
        metrics::with_local_recorder(registry, || {
            metrics::counter!("callmetrics.workload.rounds").increment(1)
        });
    }
    Ok(())
}

// -- Entrypoint

fn read_config(args: &[String]) -> ConfigV1 {
    let explicit = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1));

    let path = match explicit {
        Some(path) => path.as_str(),
        None if !Path::new(DEFAULT_CONFIG_PATH).exists() => return ConfigV1::default(),
        None => DEFAULT_CONFIG_PATH,
    };

    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--schema") {
        match config_schema() {
            Ok(schema) => println!("{}", schema),
            Err(e) => {
                eprintln!("Error rendering configuration schema: {}", e);
                exit(1);
            }
        }
        return;
    }

    let config = read_config(&args);
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initializing logging: {}", e);
        exit(1);
    }

    let registry = Arc::new(InMemoryRegistry::new());
    let store = RegistryStore::global();
    if let Err(e) = store.set(registry.clone()) {
        error!("Failed to install metric registry: {}", e);
        exit(1);
    }

    let advice = match MetricAdvice::from_store(store, &config.advice) {
        Ok(advice) => advice,
        Err(e) => {
            error!("Failed to create metric advice: {}", e);
            exit(1);
        }
    };

    info!(
        "Running sample workload with {} iterations",
        config.workload.iterations
    );
    if let Err(e) = run_workload(&advice, &registry, config.workload.iterations).await {
        error!("Sample workload failed: {}", e);
        exit(1);
    }

    match serde_json::to_string(&registry.snapshot()) {
        Ok(snapshot) => info!(
            event_name = "workload.finished",
            event_domain = "workload",
            snapshot = snapshot.as_str(),
            "Sample workload finished"
        ),
        Err(e) => error!("Failed to serialize registry snapshot: {}", e),
    }
}
