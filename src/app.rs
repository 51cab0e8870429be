//! Application bootstrap: wire the pool, store, and modules together.

use std::sync::Arc;

use anyhow::Context;
use bookshelf_db::DatabaseModule;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use crate::modules::{self, books::store::BookStore};

/// Build the registry with the core database module and every project module.
pub fn build_registry(pool: SqlitePool, settings: &Settings) -> ModuleRegistry {
    let store = BookStore::new(pool.clone()).with_timeout(settings.database.operation_timeout());

    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(DatabaseModule::new(pool)));
    modules::register_all(&mut registry, store);
    registry
}

/// Apply pending migrations for every registered module.
pub async fn migrate(pool: &SqlitePool, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let applied = bookshelf_db::run_migrations(pool, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "migrations up to date");
    Ok(applied)
}

/// Connect, migrate, and serve HTTP until a shutdown signal arrives.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let pool = bookshelf_db::connect(&settings.database).await?;
    let registry = build_registry(pool.clone(), settings);
    migrate(&pool, &registry).await?;

    let ctx = InitCtx { settings };
    registry.init_core_modules(&ctx).await?;
    registry.init_custom_modules(&ctx).await?;
    registry.start_core_modules(&ctx).await?;
    registry.start_custom_modules(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, settings).await;

    registry.stop_custom_modules().await?;
    registry.stop_core_modules().await?;
    served
}

/// Connect and apply migrations without serving.
pub async fn migrate_only(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookshelf_db::connect(&settings.database).await?;
    let registry = build_registry(pool.clone(), settings);
    let applied = migrate(&pool, &registry).await?;
    pool.close().await;
    Ok(applied)
}
