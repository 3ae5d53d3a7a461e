//! Declarative field constraints with wire-named error messages.
//!
//! A [`FieldValidator`] is a table of rules per [`Field`]. Every field is
//! checked on every call; within one field the first failing rule wins.
//! Messages and error keys always use the external (camelCase) field name.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub const TITLE_MAX_LEN: usize = 120;
pub const DESCRIPTION_MAX_LEN: usize = 120;
pub const SALES_DESCRIPTION_MAX_LEN: usize = 255;

/// Internal identity of an ebook field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Id,
    Title,
    Description,
    SalesDescription,
    Price,
    PromotionalPrice,
    CoverImage,
    ProducerId,
    FileIds,
}

impl Field {
    /// Name of the field in request and response payloads.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Description => "description",
            Self::SalesDescription => "salesDescription",
            Self::Price => "price",
            Self::PromotionalPrice => "promotionalPrice",
            Self::CoverImage => "coverImage",
            Self::ProducerId => "producerId",
            Self::FileIds => "fileIds",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A borrowed field value as seen by the rules.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Number(Option<i64>),
    List(&'a [String]),
}

impl FieldValue<'_> {
    fn is_absent(&self) -> bool {
        match self {
            Self::Text(text) => text.map_or(true, str::is_empty),
            Self::Number(number) => number.is_none(),
            Self::List(items) => items.is_empty(),
        }
    }
}

/// Anything whose fields can be looked up by [`Field`].
pub trait Validate {
    fn value(&self, field: Field) -> FieldValue<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-blank text, non-zero number or non-empty list.
    Required,
    MaxLen(usize),
    MinLen(usize),
    Gt(i64),
    Gte(i64),
    /// Parses as an absolute URL.
    Url,
    /// Every list element parses as a UUID.
    UuidEach,
    /// Strictly below the sibling field. Skipped unless both are non-zero.
    LessThan(Field),
}

impl Rule {
    fn check<T: Validate + ?Sized>(
        self,
        field: Field,
        value: FieldValue<'_>,
        target: &T,
    ) -> Option<String> {
        if self != Rule::Required && value.is_absent() {
            return None;
        }

        match (self, value) {
            (Rule::Required, FieldValue::Text(text)) => text
                .map_or(true, |text| text.trim().is_empty())
                .then(|| format!("field '{field}' is required.")),
            (Rule::Required, FieldValue::Number(number)) => number
                .map_or(true, |number| number == 0)
                .then(|| format!("field '{field}' is required.")),
            (Rule::Required, FieldValue::List(items)) => items
                .is_empty()
                .then(|| format!("field '{field}' is required.")),
            (Rule::MaxLen(max), FieldValue::Text(Some(text))) => (text.chars().count() > max)
                .then(|| format!("field '{field}' must be at most {max} characters long.")),
            (Rule::MinLen(min), FieldValue::Text(Some(text))) => (text.chars().count() < min)
                .then(|| format!("field '{field}' must be at least {min} characters long.")),
            (Rule::Gt(bound), FieldValue::Number(Some(number))) => (number <= bound)
                .then(|| format!("field '{field}' must be greater than {bound}.")),
            (Rule::Gte(bound), FieldValue::Number(Some(number))) => (number < bound)
                .then(|| format!("field '{field}' must be greater than or equal to {bound}.")),
            (Rule::Url, FieldValue::Text(Some(text))) => url::Url::parse(text)
                .is_err()
                .then(|| format!("field '{field}' must be a valid absolute URL.")),
            (Rule::UuidEach, FieldValue::List(items)) => items
                .iter()
                .position(|item| !is_hyphenated_uuid(item))
                .map(|index| {
                    format!(
                        "field '{field}' must contain only valid UUIDs \
                         (invalid entry at index {index})."
                    )
                }),
            (Rule::LessThan(other), FieldValue::Number(Some(number))) if number != 0 => {
                match target.value(other) {
                    FieldValue::Number(Some(limit)) if limit != 0 && number >= limit => {
                        Some(format!("field '{field}' must be less than field '{other}'."))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Only the 36 character hyphenated form; `parse_str` also takes the simple,
/// braced and URN renderings.
fn is_hyphenated_uuid(item: &str) -> bool {
    item.len() == 36 && uuid::Uuid::parse_str(item).is_ok()
}

/// Field name to message map, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("validation failed: {}", summary(.0))]
pub struct ValidationErrors(BTreeMap<String, String>);

fn summary(errors: &BTreeMap<String, String>) -> String {
    errors
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0
            .entry(field.wire_name().to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, wire_name: &str) -> Option<&str> {
        self.0.get(wire_name).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(field.wire_name())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

/// Rule table evaluated against any [`Validate`] target.
#[derive(Debug, Clone, Default)]
pub struct FieldValidator {
    constraints: Vec<(Field, Vec<Rule>)>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for `field`, evaluated in the given order.
    pub fn with(mut self, field: Field, rules: &[Rule]) -> Self {
        match self.constraints.iter_mut().find(|(existing, _)| *existing == field) {
            Some((_, existing_rules)) => existing_rules.extend_from_slice(rules),
            None => self.constraints.push((field, rules.to_vec())),
        }
        self
    }

    /// Constraints applied to incoming ebook payloads.
    pub fn ebook() -> Self {
        Self::new()
            .with(Field::Title, &[Rule::Required, Rule::MaxLen(TITLE_MAX_LEN)])
            .with(Field::Description, &[Rule::MaxLen(DESCRIPTION_MAX_LEN)])
            .with(
                Field::SalesDescription,
                &[Rule::MaxLen(SALES_DESCRIPTION_MAX_LEN)],
            )
            .with(Field::Price, &[Rule::Required, Rule::Gt(0)])
            .with(
                Field::PromotionalPrice,
                &[Rule::Gte(0), Rule::LessThan(Field::Price)],
            )
            .with(Field::CoverImage, &[Rule::Url])
            .with(Field::ProducerId, &[Rule::Required])
            .with(Field::FileIds, &[Rule::UuidEach])
    }

    /// Payload constraints plus those that only hold once an entity has
    /// been given its identity.
    pub fn ebook_entity() -> Self {
        Self::ebook().with(Field::Id, &[Rule::Required])
    }

    pub fn validate<T: Validate + ?Sized>(&self, target: &T) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (field, rules) in &self.constraints {
            let value = target.value(*field);
            if let Some(message) = rules
                .iter()
                .find_map(|rule| rule.check(*field, value, target))
            {
                errors.add(*field, message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
