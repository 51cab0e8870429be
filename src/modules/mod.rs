pub mod books;
pub mod urls;

use std::sync::Arc;

use bookshelf_kernel::ModuleRegistry;

use books::store::BookStore;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: BookStore) {
    registry.register_custom(Arc::new(books::BooksModule::new(store)));
    registry.register_custom(Arc::new(urls::UrlsModule::new()));
}
