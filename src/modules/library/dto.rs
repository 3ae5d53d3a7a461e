//! Wire shapes for the library API and their mapping to the domain.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::models::{Ebook, NewEbook};

/// Body of `POST /ebooks`.
///
/// Missing fields decode to empty values so that the validator, not the
/// decoder, reports them by name. Constraints are checked on the mapped
/// [`NewEbook`], after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEbookRequest {
    pub title: String,
    pub description: Option<String>,
    pub sales_description: Option<String>,
    pub price: i64,
    pub promotional_price: Option<i64>,
    pub cover_image: Option<String>,
    pub available: Option<String>,
    pub producer_id: String,
    pub file_ids: Vec<String>,
    pub show_sales_statistics: bool,
}

impl From<CreateEbookRequest> for NewEbook {
    fn from(request: CreateEbookRequest) -> Self {
        Self {
            title: request.title.trim().to_string(),
            description: non_blank(request.description),
            sales_description: non_blank(request.sales_description),
            price: request.price,
            promotional_price: request.promotional_price,
            cover_image: non_blank(request.cover_image),
            available: non_blank(request.available),
            producer_id: request.producer_id.trim().to_string(),
            file_ids: request.file_ids,
            show_sales_statistics: request.show_sales_statistics,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Representation of a stored ebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbookResponse {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_description: Option<String>,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotional_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<String>,
    pub producer_id: String,
    #[serde(default)]
    pub file_ids: Vec<String>,
    #[serde(default)]
    pub show_sales_statistics: bool,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl From<Ebook> for EbookResponse {
    fn from(ebook: Ebook) -> Self {
        Self {
            id: ebook.id,
            title: ebook.title,
            description: ebook.description,
            sales_description: ebook.sales_description,
            price: ebook.price,
            promotional_price: ebook.promotional_price,
            cover_image: ebook.cover_image,
            available: ebook.available,
            producer_id: ebook.producer_id,
            file_ids: ebook.file_ids,
            show_sales_statistics: ebook.show_sales_statistics,
            created_at: ebook.created_at,
            updated_at: ebook.updated_at,
        }
    }
}

impl From<EbookResponse> for Ebook {
    fn from(response: EbookResponse) -> Self {
        Self {
            id: response.id,
            title: response.title,
            description: response.description,
            sales_description: response.sales_description,
            price: response.price,
            promotional_price: response.promotional_price,
            cover_image: response.cover_image,
            available: response.available,
            producer_id: response.producer_id,
            file_ids: response.file_ids,
            show_sales_statistics: response.show_sales_statistics,
            created_at: response.created_at,
            updated_at: response.updated_at,
        }
    }
}
