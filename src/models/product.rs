// src/models/product.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::error::AppError;

/// Valor que o frontend manda nos selects para dizer "sem filtro".
pub const ALL_SENTINEL: &str = "__all__";

// Mapeia o CREATE TYPE product_kategori do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_kategori")]
pub enum Kategori {
    Strategis,
    Promo,
    #[sqlx(rename = "Dp_Rendah")]
    #[serde(rename = "Dp_Rendah")]
    DpRendah,
}

impl FromStr for Kategori {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Strategis" => Ok(Kategori::Strategis),
            "Promo" => Ok(Kategori::Promo),
            "Dp_Rendah" => Ok(Kategori::DpRendah),
            other => Err(AppError::InvalidKategori(other.to_string())),
        }
    }
}

// Unidade habitacional anunciada. Global, gerida só por admins.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Griya Asri Tipe 36")]
    pub title: String,
    pub detail: Option<String>,
    pub description: String,
    pub kategori: Option<Kategori>,
    #[schema(example = "Bekasi")]
    pub lokasi: Option<String>,
    #[schema(example = 5000000)]
    pub dp_akad: i64,
    #[schema(example = 2500000)]
    pub fee: i64,
    pub video_link: Option<String>,
    pub image_url: Option<String>,
    pub image_url2: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Parâmetros de listagem, exatamente como chegam na query string
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Busca (sem diferenciar maiúsculas) em título, descrição e detalhe
    pub search: Option<String>,
    pub lokasi: Option<String>,
    /// Strategis, Promo ou Dp_Rendah; `__all__` desliga o filtro
    pub kategori: Option<String>,
    /// createdAt (padrão), fee ou title
    pub sort_by: Option<String>,
    /// asc ou desc (padrão)
    pub sort_order: Option<String>,
    /// Joga os itens Promo para o topo depois da ordenação
    pub promo_first: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    CreatedAt,
    Fee,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filtro já validado e normalizado.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub lokasi: Option<String>,
    pub kategori: Option<Kategori>,
    pub sort: ProductSort,
    pub order: SortOrder,
    pub promo_first: bool,
}

// Vazio ou sentinela contam como "sem filtro"
fn active(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != ALL_SENTINEL)
}

impl TryFrom<ProductQuery> for ProductFilter {
    type Error = AppError;

    fn try_from(query: ProductQuery) -> Result<Self, Self::Error> {
        let sort = match active(query.sort_by).as_deref() {
            None | Some("createdAt") => ProductSort::CreatedAt,
            Some("fee") => ProductSort::Fee,
            Some("title") => ProductSort::Title,
            Some(other) => return Err(AppError::InvalidSort(other.to_string())),
        };

        let order = match active(query.sort_order).as_deref() {
            None | Some("desc") => SortOrder::Desc,
            Some("asc") => SortOrder::Asc,
            Some(other) => return Err(AppError::InvalidSort(other.to_string())),
        };

        let kategori = active(query.kategori)
            .map(|k| k.parse::<Kategori>())
            .transpose()?;

        Ok(Self {
            search: active(query.search),
            lokasi: active(query.lokasi),
            kategori,
            sort,
            order,
            promo_first: query.promo_first.unwrap_or(false),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LokasiResponse {
    pub lokasi: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_newest_first_without_filters() {
        let filter = ProductFilter::try_from(ProductQuery::default()).unwrap();

        assert_eq!(filter.sort, ProductSort::CreatedAt);
        assert_eq!(filter.order, SortOrder::Desc);
        assert!(filter.search.is_none());
        assert!(filter.lokasi.is_none());
        assert!(filter.kategori.is_none());
        assert!(!filter.promo_first);
    }

    #[test]
    fn sentinel_and_blank_values_disable_filters() {
        let query = ProductQuery {
            search: Some("   ".into()),
            lokasi: Some(ALL_SENTINEL.into()),
            kategori: Some(ALL_SENTINEL.into()),
            ..Default::default()
        };
        let filter = ProductFilter::try_from(query).unwrap();

        assert!(filter.search.is_none());
        assert!(filter.lokasi.is_none());
        assert!(filter.kategori.is_none());
    }

    #[test]
    fn parses_fee_descending_with_promo_category() {
        let query = ProductQuery {
            kategori: Some("Promo".into()),
            sort_by: Some("fee".into()),
            sort_order: Some("desc".into()),
            ..Default::default()
        };
        let filter = ProductFilter::try_from(query).unwrap();

        assert_eq!(filter.kategori, Some(Kategori::Promo));
        assert_eq!(filter.sort, ProductSort::Fee);
        assert_eq!(filter.order, SortOrder::Desc);
    }

    #[test]
    fn rejects_unknown_sort_key_and_category() {
        let bad_sort = ProductQuery { sort_by: Some("price".into()), ..Default::default() };
        assert!(matches!(ProductFilter::try_from(bad_sort), Err(AppError::InvalidSort(_))));

        let bad_order = ProductQuery { sort_order: Some("up".into()), ..Default::default() };
        assert!(matches!(ProductFilter::try_from(bad_order), Err(AppError::InvalidSort(_))));

        let bad_kategori = ProductQuery { kategori: Some("Mewah".into()), ..Default::default() };
        assert!(matches!(
            ProductFilter::try_from(bad_kategori),
            Err(AppError::InvalidKategori(_))
        ));
    }

    #[test]
    fn dp_rendah_keeps_its_wire_name() {
        assert_eq!(serde_json::to_string(&Kategori::DpRendah).unwrap(), "\"Dp_Rendah\"");
        assert_eq!("Dp_Rendah".parse::<Kategori>().unwrap(), Kategori::DpRendah);
    }
}
