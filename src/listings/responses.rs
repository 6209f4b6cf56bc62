//! Response DTOs for listing endpoints.

use serde::Serialize;

use crate::booking::Property;

/// One page of search results
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchPage {
    pub properties: Vec<Property>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// A single property
#[derive(Debug, Serialize)]
pub struct PropertyResponse {
    pub property: Property,
}
