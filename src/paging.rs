//! Page requests parsed from query strings, and the pages returned for them.
//!
//! Query parameters follow the common `page`/`size`/`sort` convention:
//! `?page=1&size=10&sort=dateCreated,desc&sort=issue`. Page numbers are
//! zero based.

use serde::Serialize;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 2000;

/// Limits applied when turning query parameters into a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        PagingConfig {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PagingConfig {
    pub fn new(default_size: u32, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        PagingConfig {
            default_size: default_size.clamp(1, max_size),
            max_size,
        }
    }

    /// Build a page request from raw query pairs.
    ///
    /// Malformed `page` falls back to the first page and malformed or zero
    /// `size` to the default size; oversized pages are clamped.
    pub fn page_request(&self, params: &[(String, String)]) -> PageRequest {
        let mut page = 0;
        let mut size = self.default_size;
        let mut sort = Vec::new();

        for (key, value) in params {
            match key.as_str() {
                "page" => page = value.trim().parse().unwrap_or(0),
                "size" => {
                    size = match value.trim().parse::<u32>() {
                        Ok(0) | Err(_) => self.default_size,
                        Ok(n) => n.min(self.max_size),
                    }
                }
                "sort" => sort.extend(SortOrder::parse(value)),
                _ => {}
            }
        }

        PageRequest { page, size, sort }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: &str) -> Self {
        SortOrder {
            property: property.to_string(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: &str) -> Self {
        SortOrder {
            property: property.to_string(),
            direction: Direction::Desc,
        }
    }

    /// Parse one `sort` parameter: `prop[,prop...][,asc|desc]`.
    ///
    /// A trailing direction applies to every property listed before it.
    pub fn parse(value: &str) -> Vec<SortOrder> {
        let mut parts: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let direction = match parts.last().and_then(|p| Direction::parse(p)) {
            Some(d) => {
                parts.pop();
                d
            }
            None => Direction::Asc,
        };

        parts
            .into_iter()
            .map(|property| SortOrder {
                property: property.to_string(),
                direction,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(0, DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        PageRequest {
            page,
            size: size.max(1),
            sort: Vec::new(),
        }
    }

    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Keep only the sort orders `columns` can satisfy, dropping unknown
    /// properties and later orders on a column already sorted by.
    ///
    /// `columns` maps public property names to column names.
    pub fn restricted_to(&self, columns: &[(&str, &str)]) -> PageRequest {
        let mut used: Vec<&str> = Vec::new();
        let mut sort = Vec::new();

        for order in &self.sort {
            match column_for(columns, &order.property) {
                Some(column) if !used.contains(&column) => {
                    used.push(column);
                    sort.push(order.clone());
                }
                Some(_) => {}
                None => debug!(property = %order.property, "ignoring unknown sort property"),
            }
        }

        PageRequest {
            page: self.page,
            size: self.size,
            sort,
        }
    }

    /// Render the requested sort as an SQL `ORDER BY` list.
    ///
    /// Only whitelisted properties reach the SQL text. The `id` column
    /// always ends the list to keep paging stable.
    pub fn order_by(&self, columns: &[(&str, &str)]) -> String {
        let mut clauses = Vec::new();
        let mut has_id = false;

        for order in &self.restricted_to(columns).sort {
            if let Some(column) = column_for(columns, &order.property) {
                has_id |= column == "id";
                clauses.push(format!("{} {}", column, order.direction.as_sql()));
            }
        }

        if !has_id {
            clauses.push("id ASC".to_string());
        }

        clauses.join(", ")
    }
}

fn column_for<'a>(columns: &[(&str, &'a str)], property: &str) -> Option<&'a str> {
    columns
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, column)| *column)
}

/// One page of results plus the metadata needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
    pub sort: Vec<SortOrder>,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        let total_pages = total_elements.div_ceil(size);
        Page {
            content,
            number: request.page,
            size: request.size,
            total_elements,
            total_pages,
            first: request.page == 0,
            last: u64::from(request.page) + 1 >= total_pages,
            sort: request.sort.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
