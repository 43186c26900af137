//! Data tables consulted by the planner, validator, and categorizer.

pub mod company;
pub mod keywords;

pub use company::CompanyTable;
pub use keywords::KeywordTable;

/// The data tables one search runs against.
#[derive(Debug, Clone, PartialEq)]
pub struct Tables {
    /// Company identity data.
    pub companies: CompanyTable,
    /// Role keyword data.
    pub keywords: KeywordTable,
}

impl Tables {
    /// Built-in company and keyword tables.
    pub fn builtin() -> Self {
        Self {
            companies: CompanyTable::builtin(),
            keywords: KeywordTable::default(),
        }
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::builtin()
    }
}
