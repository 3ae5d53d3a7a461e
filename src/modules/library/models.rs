use time::OffsetDateTime;

use super::validation::{Field, FieldValue, Validate};

/// Ebook aggregate.
///
/// Built transiently from a [`NewEbook`] once the creation service has
/// assigned an identifier; timestamps are stamped by the repository on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ebook {
    /// Server-assigned identifier, never supplied by callers
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub sales_description: Option<String>,
    /// List price in minor currency units
    pub price: i64,
    /// Discounted price in minor currency units, strictly below `price`
    pub promotional_price: Option<i64>,
    pub cover_image: Option<String>,
    /// Free-form availability note shown on the sales page
    pub available: Option<String>,
    /// Owning content producer
    pub producer_id: String,
    pub file_ids: Vec<String>,
    pub show_sales_statistics: bool,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

/// Creation input: an ebook without identity or timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEbook {
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

impl NewEbook {
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::new(&self.title, &self.producer_id)
    }

    /// Attach an identifier, producing an unsaved aggregate.
    pub fn into_ebook(self, id: String) -> Ebook {
        Ebook {
            id,
            title: self.title,
            description: self.description,
            sales_description: self.sales_description,
            price: self.price,
            promotional_price: self.promotional_price,
            cover_image: self.cover_image,
            available: self.available,
            producer_id: self.producer_id,
            file_ids: self.file_ids,
            show_sales_statistics: self.show_sales_statistics,
            created_at: None,
            updated_at: None,
        }
    }
}

/// The (title, producer) pair no two stored ebooks may share.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey {
    pub title: String,
    pub producer_id: String,
}

impl DuplicateKey {
    pub fn new(title: impl Into<String>, producer_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            producer_id: producer_id.into(),
        }
    }
}

impl Validate for NewEbook {
    fn value(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Id => FieldValue::Text(None),
            Field::Title => FieldValue::Text(Some(&self.title)),
            Field::Description => FieldValue::Text(self.description.as_deref()),
            Field::SalesDescription => FieldValue::Text(self.sales_description.as_deref()),
            Field::Price => FieldValue::Number(Some(self.price)),
            Field::PromotionalPrice => FieldValue::Number(self.promotional_price),
            Field::CoverImage => FieldValue::Text(self.cover_image.as_deref()),
            Field::ProducerId => FieldValue::Text(Some(&self.producer_id)),
            Field::FileIds => FieldValue::List(&self.file_ids),
        }
    }
}

impl Validate for Ebook {
    fn value(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Id => FieldValue::Text(Some(&self.id)),
            Field::Title => FieldValue::Text(Some(&self.title)),
            Field::Description => FieldValue::Text(self.description.as_deref()),
            Field::SalesDescription => FieldValue::Text(self.sales_description.as_deref()),
            Field::Price => FieldValue::Number(Some(self.price)),
            Field::PromotionalPrice => FieldValue::Number(self.promotional_price),
            Field::CoverImage => FieldValue::Text(self.cover_image.as_deref()),
            Field::ProducerId => FieldValue::Text(Some(&self.producer_id)),
            Field::FileIds => FieldValue::List(&self.file_ids),
        }
    }
}
