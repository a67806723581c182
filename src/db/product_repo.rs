// src/db/product_repo.rs

use sqlx::{Encode, Executor, Postgres, QueryBuilder, Type};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::product::{Kategori, Product, ProductFilter, ProductSort, SortOrder},
};

// Campos de um produto novo
pub struct NewProduct<'a> {
    pub title: &'a str,
    pub detail: Option<&'a str>,
    pub description: &'a str,
    pub kategori: Option<Kategori>,
    pub lokasi: Option<&'a str>,
    pub dp_akad: i64,
    pub fee: i64,
    pub video_link: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub image_url2: Option<&'a str>,
}

// PATCH parcial: `None` mantém o valor atual, `Some(None)` grava NULL
#[derive(Debug, Default)]
pub struct ProductChanges<'a> {
    pub title: Option<&'a str>,
    pub detail: Option<Option<&'a str>>,
    pub description: Option<&'a str>,
    pub kategori: Option<Option<Kategori>>,
    pub lokasi: Option<Option<&'a str>>,
    pub dp_akad: Option<i64>,
    pub fee: Option<i64>,
    pub video_link: Option<Option<&'a str>>,
    pub image_url: Option<Option<&'a str>>,
    pub image_url2: Option<Option<&'a str>>,
}

// Escapa os curingas do LIKE para a busca ser por substring literal
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn order_clause(sort: ProductSort, order: SortOrder) -> &'static str {
    match (sort, order) {
        (ProductSort::CreatedAt, SortOrder::Desc) => "created_at DESC, id",
        (ProductSort::CreatedAt, SortOrder::Asc) => "created_at ASC, id",
        (ProductSort::Fee, SortOrder::Desc) => "fee DESC, created_at DESC, id",
        (ProductSort::Fee, SortOrder::Asc) => "fee ASC, created_at DESC, id",
        (ProductSort::Title, SortOrder::Desc) => "title DESC, created_at DESC, id",
        (ProductSort::Title, SortOrder::Asc) => "title ASC, created_at DESC, id",
    }
}

/// Monta o SELECT da listagem. A coluna de ordenação vem de uma lista fixa,
/// todo valor do usuário entra como bind.
pub fn build_list_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT * FROM products WHERE TRUE");

    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR detail ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(lokasi) = &filter.lokasi {
        qb.push(" AND lokasi = ").push_bind(lokasi.clone());
    }

    if let Some(kategori) = filter.kategori {
        qb.push(" AND kategori = ").push_bind(kategori);
    }

    qb.push(" ORDER BY ").push(order_clause(filter.sort, filter.order));
    qb
}

fn push_set<'a, T>(qb: &mut QueryBuilder<'a, Postgres>, column: &str, value: Option<T>)
where
    T: 'a + Encode<'a, Postgres> + Type<Postgres>,
{
    if let Some(value) = value {
        qb.push(", ").push(column).push(" = ").push_bind(value);
    }
}

/// Monta o UPDATE só com as colunas presentes no PATCH.
pub fn build_update_query<'a>(id: Uuid, changes: &ProductChanges<'a>) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE products SET updated_at = NOW()");

    push_set(&mut qb, "title", changes.title);
    push_set(&mut qb, "detail", changes.detail);
    push_set(&mut qb, "description", changes.description);
    push_set(&mut qb, "kategori", changes.kategori);
    push_set(&mut qb, "lokasi", changes.lokasi);
    push_set(&mut qb, "dp_akad", changes.dp_akad);
    push_set(&mut qb, "fee", changes.fee);
    push_set(&mut qb, "video_link", changes.video_link);
    push_set(&mut qb, "image_url", changes.image_url);
    push_set(&mut qb, "image_url2", changes.image_url2);

    qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
    qb
}

#[derive(Clone, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_product<'e, E>(&self, executor: E, input: &NewProduct<'_>) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                title, detail, description, kategori, lokasi,
                dp_akad, fee, video_link, image_url, image_url2
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(input.title)
        .bind(input.detail)
        .bind(input.description)
        .bind(input.kategori)
        .bind(input.lokasi)
        .bind(input.dp_akad)
        .bind(input.fee)
        .bind(input.video_link)
        .bind(input.image_url)
        .bind(input.image_url2)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn list_products<'e, E>(&self, executor: E, filter: &ProductFilter) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = build_list_query(filter);
        let products = qb.build_query_as::<Product>().fetch_all(executor).await?;
        Ok(products)
    }

    pub async fn update_product<'e, E>(&self, executor: E, id: Uuid, changes: &ProductChanges<'_>) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = build_update_query(id, changes);
        let product = qb.build_query_as::<Product>().fetch_optional(executor).await?;
        Ok(product)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("DELETE FROM products WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Localizações distintas, sem nulos, em ordem alfabética
    pub async fn distinct_lokasi<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lokasi = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT lokasi FROM products WHERE lokasi IS NOT NULL ORDER BY lokasi",
        )
        .fetch_all(executor)
        .await?;
        Ok(lokasi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ProductFilter {
        ProductFilter {
            search: None,
            lokasi: None,
            kategori: None,
            sort: ProductSort::CreatedAt,
            order: SortOrder::Desc,
            promo_first: false,
        }
    }

    #[test]
    fn unfiltered_listing_is_newest_first() {
        let qb = build_list_query(&filter());
        assert_eq!(qb.sql(), "SELECT * FROM products WHERE TRUE ORDER BY created_at DESC, id");
    }

    #[test]
    fn search_matches_title_description_and_detail() {
        let qb = build_list_query(&ProductFilter { search: Some("griya".into()), ..filter() });
        let sql = qb.sql();

        assert!(sql.contains("title ILIKE $1"));
        assert!(sql.contains("OR description ILIKE $2"));
        assert!(sql.contains("OR detail ILIKE $3"));
    }

    #[test]
    fn fee_descending_with_promo_filter() {
        let qb = build_list_query(&ProductFilter {
            kategori: Some(Kategori::Promo),
            sort: ProductSort::Fee,
            order: SortOrder::Desc,
            ..filter()
        });

        assert_eq!(
            qb.sql(),
            "SELECT * FROM products WHERE TRUE AND kategori = $1 ORDER BY fee DESC, created_at DESC, id"
        );
    }

    #[test]
    fn lokasi_and_kategori_bind_in_order() {
        let qb = build_list_query(&ProductFilter {
            lokasi: Some("Bekasi".into()),
            kategori: Some(Kategori::DpRendah),
            sort: ProductSort::Title,
            order: SortOrder::Asc,
            ..filter()
        });
        let sql = qb.sql();

        assert!(sql.contains("AND lokasi = $1 AND kategori = $2"));
        assert!(sql.ends_with("ORDER BY title ASC, created_at DESC, id"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("rumah"), "rumah");
    }

    #[test]
    fn empty_patch_only_touches_updated_at() {
        let qb = build_update_query(Uuid::nil(), &ProductChanges::default());
        assert_eq!(qb.sql(), "UPDATE products SET updated_at = NOW() WHERE id = $1 RETURNING *");
    }

    #[test]
    fn explicit_null_becomes_an_assignment() {
        let changes = ProductChanges { kategori: Some(None), video_link: Some(None), ..Default::default() };
        let qb = build_update_query(Uuid::nil(), &changes);

        assert_eq!(
            qb.sql(),
            "UPDATE products SET updated_at = NOW(), kategori = $1, video_link = $2 WHERE id = $3 RETURNING *"
        );
    }

    #[test]
    fn patch_sets_only_present_columns_in_order() {
        let changes = ProductChanges {
            title: Some("Griya Baru"),
            fee: Some(3_000_000),
            lokasi: Some(Some("Depok")),
            ..Default::default()
        };
        let sql = build_update_query(Uuid::nil(), &changes).sql().to_string();

        assert!(sql.contains("title = $1, lokasi = $2, fee = $3 WHERE id = $4"));
        assert!(!sql.contains("detail"));
    }
}
