//! Resource catalogue.
//!
//! Every admin panel and public listing is one instance of the same
//! list/form shape. A [`ResourceConfig`] captures what differs between
//! them: the REST path, which fields are searched, the default ordering,
//! which fields a form must fill in and which fields carry uploads.

use serde::Serialize;

use crate::format::is_blank;
use crate::listview::{Record, SortKey, DEFAULT_PAGE_SIZE};

/// Configuration of one REST collection and its panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    /// Path segment under `/api`.
    pub name: &'static str,
    pub label: &'static str,
    pub search_fields: &'static [&'static str],
    pub default_sort: SortKey,
    pub required_fields: &'static [&'static str],
    /// Fields filled from multipart file parts.
    pub file_fields: &'static [&'static str],
    pub page_size: usize,
}

impl ResourceConfig {
    pub fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            search_fields: &[],
            default_sort: SortKey::Newest("createdAt".to_string()),
            required_fields: &[],
            file_fields: &[],
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn search(mut self, fields: &'static [&'static str]) -> Self {
        self.search_fields = fields;
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.default_sort = key;
        self
    }

    pub fn required(mut self, fields: &'static [&'static str]) -> Self {
        self.required_fields = fields;
        self
    }

    pub fn files(mut self, fields: &'static [&'static str]) -> Self {
        self.file_fields = fields;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// First required field that is blank in `fields`.
    pub fn missing_field(&self, fields: &Record) -> Option<&'static str> {
        self.required_fields
            .iter()
            .copied()
            .find(|field| is_blank(fields.get(*field)))
    }

    pub fn is_file_field(&self, field: &str) -> bool {
        self.file_fields.contains(&field)
    }
}

/// Lookup table of all resources served by the backend.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    resources: Vec<ResourceConfig>,
}

impl ResourceRegistry {
    pub fn new(resources: Vec<ResourceConfig>) -> Self {
        Self { resources }
    }

    /// The dealership catalogue.
    pub fn builtin() -> Self {
        Self::new(vec![
            ResourceConfig::new("cars", "Cars")
                .search(&["car_name", "brand", "model", "fuel_type", "transmission"])
                .required(&["car_name", "brand", "price"])
                .files(&["thumbnail", "gallery"]),
            ResourceConfig::new("used-cars", "Pre-owned cars")
                .search(&["car_name", "brand", "registration_year", "kms_driven"])
                .required(&["car_name", "price"])
                .files(&["gallery"]),
            ResourceConfig::new("banners", "Banners")
                .search(&["title", "subtitle"])
                .required(&["title"])
                .files(&["image", "mobile_image"]),
            ResourceConfig::new("brochures", "Brochures")
                .search(&["car_name", "title"])
                .required(&["car_name"])
                .files(&["file"]),
            ResourceConfig::new("offers", "Offers")
                .search(&["title", "car_name", "description"])
                .required(&["title"])
                .files(&["image"]),
            ResourceConfig::new("testimonials", "Testimonials")
                .search(&["name", "car_name", "message"])
                .required(&["name", "message"])
                .files(&["photo"]),
            ResourceConfig::new("enquiries", "Enquiries")
                .search(&["name", "email", "phone", "car_name"])
                .required(&["name", "phone"]),
            ResourceConfig::new("test-drives", "Test drive bookings")
                .search(&["name", "phone", "car_name", "location"])
                .required(&["name", "phone", "car_name", "preferred_date"]),
            ResourceConfig::new("loan-enquiries", "Loan enquiries")
                .search(&["name", "phone", "car_name"])
                .required(&["name", "phone", "loan_amount"]),
            ResourceConfig::new("service-products", "Service products")
                .search(&["name", "category", "description"])
                .required(&["name"])
                .files(&["image"]),
            ResourceConfig::new("locations", "Locations")
                .search(&["name", "city", "address"])
                .sort(SortKey::Alphabetical("name".to_string()))
                .required(&["name", "city", "address"]),
            ResourceConfig::new("metadata", "Page metadata")
                .search(&["page", "title", "description"])
                .sort(SortKey::Alphabetical("page".to_string()))
                .required(&["page", "title"]),
            ResourceConfig::new("navbar", "Navbar links")
                .search(&["label", "link"])
                .sort(SortKey::NumberAsc("position".to_string()))
                .required(&["label", "link"])
                .page_size(25),
            ResourceConfig::new("faqs", "FAQs")
                .search(&["question", "answer"])
                .required(&["question", "answer"]),
        ])
    }

    /// Resources still on the default page size take `size` instead.
    pub fn with_page_size(mut self, size: usize) -> Self {
        for config in &mut self.resources {
            if config.page_size == DEFAULT_PAGE_SIZE {
                config.page_size = size.max(1);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
