//! EatEase cart CLI

use std::{io, process, sync::Arc};

use eatease_app::{
    cli::CliContext,
    config::AppConfig,
    domain::{
        carts::{
            CartsRepository, InMemoryCartsRepository, JsonFileCartsRepository, StoreCartsService,
        },
        products::InMemoryProductsRepository,
    },
    logging,
};
use tracing::debug;

#[tokio::main]
pub async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    if let Err(error) = logging::init(&config.logging) {
        eprintln!("failed to initialise logging: {error}");
        process::exit(1);
    }

    if let Err(error) = run(config).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), String> {
    let products = InMemoryProductsRepository::from_path(&config.catalog).map_err(|error| {
        format!(
            "failed to load catalog {}: {error}",
            config.catalog.display()
        )
    })?;

    let carts: Arc<dyn CartsRepository> = match &config.state {
        Some(path) => {
            debug!(path = %path.display(), "using file cart storage");
            Arc::new(JsonFileCartsRepository::new(path))
        }
        None => Arc::new(InMemoryCartsRepository::new()),
    };

    let currency = products.currency();
    let products = Arc::new(products);

    let context = CliContext {
        carts: Arc::new(StoreCartsService::new(products.clone(), carts, currency)),
        products,
    };

    config.command.run(&context, &mut io::stdout().lock()).await
}
