//! Table resolution for the production/isolated split.

/// Which users table an operation acts on.
///
/// Every entry point resolves its table from this value on each call; there is
/// no stored notion of a "current" table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableTarget {
    /// Live data, table `users`.
    Production,
    /// Test-only data, table `users_test`.
    Isolated,
}

const PRODUCTION_TABLE: &str = "users";
const ISOLATED_TABLE: &str = "users_test";

impl TableTarget {
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_TABLE,
            Self::Isolated => ISOLATED_TABLE,
        }
    }

    pub fn is_isolated(self) -> bool {
        matches!(self, Self::Isolated)
    }
}

/// Maps the isolation flag: `true` selects the isolated table.
impl From<bool> for TableTarget {
    fn from(isolated: bool) -> Self {
        if isolated {
            Self::Isolated
        } else {
            Self::Production
        }
    }
}
