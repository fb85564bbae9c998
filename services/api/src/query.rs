//! Find options shared by the repositories
//!
//! A [`FindOptions`] carries ordering and paging for a list query. Sort
//! fields are closed enums per entity, so a caller can never inject a raw
//! column or direction into the SQL text.

use std::fmt;
use std::str::FromStr;

use sqlx::{QueryBuilder, Sqlite};
use thiserror::Error;

/// Maximum page size accepted from clients
pub const MAX_LIMIT: u32 = 500;

/// Value that is not in an allow-list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value `{0}`")]
pub struct UnknownValue(pub String);

/// A sortable field of one entity
pub trait SortField: Copy + fmt::Debug + FromStr<Err = UnknownValue> {
    /// Accepted external names, in declaration order
    const ALLOWED: &'static [&'static str];

    /// Identity column, used to break ties between equal sort keys
    const ID_COLUMN: &'static str;

    /// Column expression the field orders by
    fn column(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const ALLOWED: &'static [&'static str] = &["asc", "desc"];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

/// Ordering and paging of a list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions<F> {
    sort: Option<Sort<F>>,
    page: Option<Page>,
    count: bool,
}

impl<F: SortField> FindOptions<F> {
    pub fn new(sort: Option<Sort<F>>, page: Option<Page>) -> Self {
        Self {
            sort,
            page,
            count: false,
        }
    }

    /// No ordering, no paging
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// At most one row
    pub fn first() -> Self {
        Self::new(None, Some(Page { offset: 0, limit: 1 }))
    }

    /// Build options from already validated request parameters
    ///
    /// Ordering applies only when both `sort_by` and `sort_dir` are present.
    /// Paging is taken from the request only when both `offset` and `limit`
    /// are present, otherwise the first `default_limit` rows are returned.
    pub fn from_request(
        sort_by: Option<F>,
        sort_dir: Option<SortDirection>,
        offset: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Self {
        let sort = match (sort_by, sort_dir) {
            (Some(field), Some(direction)) => Some(Sort { field, direction }),
            _ => None,
        };
        let page = match (offset, limit) {
            (Some(offset), Some(limit)) => Page { offset, limit },
            _ => Page {
                offset: 0,
                limit: default_limit,
            },
        };
        Self::new(sort, Some(page))
    }

    pub fn sort(&self) -> Option<Sort<F>> {
        self.sort
    }

    pub fn page(&self) -> Option<Page> {
        self.page
    }

    pub fn is_count(&self) -> bool {
        self.count
    }

    /// Same filters, counting rows instead of listing them
    pub(crate) fn counting(&self) -> Self {
        Self {
            sort: self.sort,
            page: self.page,
            count: true,
        }
    }

    /// Append `ORDER BY` and `LIMIT`/`OFFSET`, skipped when counting
    ///
    /// Ordering by anything but the identity appends the identity as a
    /// tiebreaker so that pages over equal keys stay stable.
    pub(crate) fn push_tail(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if self.count {
            return;
        }

        if let Some(sort) = self.sort {
            qb.push(" ORDER BY ")
                .push(sort.field.column())
                .push(" ")
                .push(sort.direction.keyword());
            if sort.field.column() != F::ID_COLUMN {
                qb.push(", ").push(F::ID_COLUMN).push(" ASC");
            }
        }

        if let Some(page) = self.page {
            qb.push(" LIMIT ")
                .push_bind(i64::from(page.limit))
                .push(" OFFSET ")
                .push_bind(i64::from(page.offset));
        }
    }
}

/// Append `AND <column> = ?` when the filter value is set
pub(crate) fn push_eq(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, value: Option<&str>) {
    if let Some(value) = value {
        qb.push(" AND ")
            .push(column)
            .push(" = ")
            .push_bind(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Id,
        Name,
    }

    impl FromStr for Field {
        type Err = UnknownValue;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "id" => Ok(Self::Id),
                "name" => Ok(Self::Name),
                _ => Err(UnknownValue(s.to_string())),
            }
        }
    }

    impl SortField for Field {
        const ALLOWED: &'static [&'static str] = &["id", "name"];
        const ID_COLUMN: &'static str = "t.id";

        fn column(self) -> &'static str {
            match self {
                Self::Id => "t.id",
                Self::Name => "t.name",
            }
        }
    }

    fn tail(options: &FindOptions<Field>) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT 1 FROM t WHERE 1 = 1");
        options.push_tail(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_from_request_defaults_paging() {
        let options = FindOptions::<Field>::from_request(None, None, Some(10), None, 50);
        assert_eq!(options.page(), Some(Page { offset: 0, limit: 50 }));
        assert_eq!(options.sort(), None);

        let options = FindOptions::<Field>::from_request(None, None, Some(10), Some(5), 50);
        assert_eq!(options.page(), Some(Page { offset: 10, limit: 5 }));
    }

    #[test]
    fn test_from_request_sort_is_all_or_nothing() {
        let options =
            FindOptions::<Field>::from_request(None, Some(SortDirection::Desc), None, None, 50);
        assert_eq!(options.sort(), None);

        let options = FindOptions::from_request(Some(Field::Name), None, None, None, 50);
        assert_eq!(options.sort(), None);

        let options =
            FindOptions::from_request(Some(Field::Name), Some(SortDirection::Desc), None, None, 50);
        assert_eq!(
            options.sort(),
            Some(Sort {
                field: Field::Name,
                direction: SortDirection::Desc
            })
        );
    }

    #[test]
    fn test_push_tail_renders_order_and_paging() {
        let options = FindOptions::new(
            Some(Sort {
                field: Field::Name,
                direction: SortDirection::Desc,
            }),
            Some(Page { offset: 2, limit: 3 }),
        );

        assert_eq!(
            tail(&options),
            "SELECT 1 FROM t WHERE 1 = 1 ORDER BY t.name DESC, t.id ASC LIMIT ? OFFSET ?"
        );
    }

    #[test]
    fn test_sorting_by_identity_has_no_tiebreaker() {
        let options = FindOptions::new(
            Some(Sort {
                field: Field::Id,
                direction: SortDirection::Desc,
            }),
            None,
        );
        assert_eq!(tail(&options), "SELECT 1 FROM t WHERE 1 = 1 ORDER BY t.id DESC");
    }

    #[test]
    fn test_counting_drops_tail() {
        let options = FindOptions::<Field>::first().counting();
        assert!(options.is_count());
        assert_eq!(tail(&options), "SELECT 1 FROM t WHERE 1 = 1");
        assert_eq!(tail(&FindOptions::unbounded()), "SELECT 1 FROM t WHERE 1 = 1");
    }

    #[test]
    fn test_push_eq_only_when_set() {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT 1 FROM t WHERE 1 = 1");
        push_eq(&mut qb, "t.name", None);
        push_eq(&mut qb, "t.name", Some("admin"));
        assert_eq!(qb.sql(), "SELECT 1 FROM t WHERE 1 = 1 AND t.name = ?");
    }

    #[test]
    fn test_sort_direction_parses_case_insensitively() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
