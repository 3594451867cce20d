use std::sync::{Arc, RwLock};

use cyberday_core::{StoreError, StoreResult};

use crate::product::Product;

/// Read-only catalog store adapter.
///
/// One `snapshot()` call must reflect a single consistent point-in-time view
/// of the catalog; callers that need snapshot isolation (the reconciler)
/// take exactly one snapshot per computation and never re-read.
pub trait CatalogStore: Send + Sync {
    /// Take a full, consistent snapshot of the catalog.
    fn snapshot(&self) -> StoreResult<Vec<Product>>;
}

impl<S> CatalogStore for &S
where
    S: CatalogStore + ?Sized,
{
    fn snapshot(&self) -> StoreResult<Vec<Product>> {
        (**self).snapshot()
    }
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn snapshot(&self) -> StoreResult<Vec<Product>> {
        (**self).snapshot()
    }
}

/// In-memory catalog adapter.
///
/// Intended for tests and local runs. Snapshots clone the whole catalog, so
/// later upstream mutations never leak into a snapshot already taken.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<Vec<Product>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    /// Replace the catalog contents (stands in for the upstream load stage).
    pub fn load(&self, products: Vec<Product>) -> StoreResult<()> {
        let mut guard = self
            .products
            .write()
            .map_err(|_| StoreError::invalid("catalog lock poisoned"))?;
        *guard = products;
        Ok(())
    }

    /// Remove one product (simulates catalog churn between runs).
    pub fn remove(&self, id: &cyberday_core::ProductId) -> StoreResult<()> {
        let mut guard = self
            .products
            .write()
            .map_err(|_| StoreError::invalid("catalog lock poisoned"))?;
        guard.retain(|p| &p.id != id);
        Ok(())
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn snapshot(&self) -> StoreResult<Vec<Product>> {
        let guard = self
            .products
            .read()
            .map_err(|_| StoreError::invalid("catalog lock poisoned"))?;
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberday_core::ProductId;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Electronics".to_string(),
            unit_price: 500,
            rating: 4.0,
            stock: 10,
        }
    }

    #[test]
    fn snapshot_reflects_loaded_products() {
        let store = InMemoryCatalogStore::new();
        store.load(vec![product("P1"), product("P2")]).unwrap();
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let store = InMemoryCatalogStore::with_products(vec![product("P1")]);
        let snap = store.snapshot().unwrap();
        store.remove(&ProductId::new("P1")).unwrap();
        assert_eq!(snap.len(), 1);
        assert!(store.snapshot().unwrap().is_empty());
    }
}
