// src/services/product_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ProductRepository,
        product_repo::{NewProduct, ProductChanges},
    },
    models::{
        auth::Caller,
        product::{Kategori, Product, ProductFilter},
    },
    services::policy::{self, Action, Resource},
};

/// Sobe os itens Promo para o topo sem desfazer a ordem dentro de cada grupo.
pub fn float_promo(products: &mut [Product]) {
    // sort_by_key é estável: false (Promo) vem antes de true
    products.sort_by_key(|p| p.kategori != Some(Kategori::Promo));
}

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
}

impl ProductService {
    pub fn new(repo: ProductRepository) -> Self {
        Self { repo }
    }

    pub async fn list_products(&self, pool: &PgPool, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let mut products = self.repo.list_products(pool, filter).await?;
        if filter.promo_first {
            float_promo(&mut products);
        }
        Ok(products)
    }

    pub async fn get_product(&self, pool: &PgPool, id: Uuid) -> Result<Product, AppError> {
        self.repo
            .find_by_id(pool, id)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn list_lokasi(&self, pool: &PgPool) -> Result<Vec<String>, AppError> {
        self.repo.distinct_lokasi(pool).await
    }

    pub async fn create_product(&self, pool: &PgPool, caller: &Caller, input: &NewProduct<'_>) -> Result<Product, AppError> {
        policy::authorize(Action::ManageProducts, Resource::Global, caller)?;

        let product = self.repo.create_product(pool, input).await?;
        tracing::info!(product_id = %product.id, admin_id = %caller.user_id, "Produto criado");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        pool: &PgPool,
        caller: &Caller,
        id: Uuid,
        changes: &ProductChanges<'_>,
    ) -> Result<Product, AppError> {
        policy::authorize(Action::ManageProducts, Resource::Global, caller)?;

        let product = self
            .repo
            .update_product(pool, id, changes)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        tracing::info!(product_id = %id, admin_id = %caller.user_id, "Produto atualizado");
        Ok(product)
    }

    pub async fn delete_product(&self, pool: &PgPool, caller: &Caller, id: Uuid) -> Result<Product, AppError> {
        policy::authorize(Action::ManageProducts, Resource::Global, caller)?;

        let product = self
            .repo
            .delete(pool, id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        tracing::info!(product_id = %id, admin_id = %caller.user_id, "Produto excluído");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn product(title: &str, kategori: Option<Kategori>, fee: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            title: title.into(),
            detail: None,
            description: "Rumah siap huni".into(),
            kategori,
            lokasi: Some("Bekasi".into()),
            dp_akad: 5_000_000,
            fee,
            video_link: None,
            image_url: None,
            image_url2: None,
            created_at: Utc::now() - Duration::days(fee),
            updated_at: Utc::now(),
        }
    }

    fn titles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn promo_items_float_to_the_top() {
        // Já ordenados por fee desc, como o banco devolve
        let mut products = vec![
            product("a", Some(Kategori::Strategis), 9),
            product("b", Some(Kategori::Promo), 7),
            product("c", None, 5),
            product("d", Some(Kategori::Promo), 3),
            product("e", Some(Kategori::DpRendah), 1),
        ];

        float_promo(&mut products);

        assert_eq!(titles(&products), vec!["b", "d", "a", "c", "e"]);
    }

    #[test]
    fn promo_group_keeps_the_requested_fee_order() {
        let mut products = vec![
            product("x", Some(Kategori::Promo), 8),
            product("y", Some(Kategori::Promo), 4),
            product("z", Some(Kategori::Promo), 2),
        ];

        float_promo(&mut products);

        assert!(products.iter().all(|p| p.kategori == Some(Kategori::Promo)));
        assert!(products.windows(2).all(|w| w[0].fee >= w[1].fee));
    }
}
