use std::fmt::{Display, Formatter};

use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use strum::AsRefStr;

use crate::operator::{Join, Product, Projection, Selection, TableScan};
use crate::predicate::Predicate;

/// Logical relational operator.
#[derive(Clone, Debug, PartialEq, Eq, EnumAsInner, AsRefStr)]
pub enum LogicalOperator {
    #[strum(serialize = "SCAN")]
    Scan(TableScan),
    #[strum(serialize = "PROJECT")]
    Project(Projection),
    #[strum(serialize = "SELECT")]
    Select(Selection),
    #[strum(serialize = "PRODUCT")]
    Product(Product),
    #[strum(serialize = "JOIN")]
    Join(Join),
}

impl LogicalOperator {
    /// Number of inputs a node with this operator must have.
    pub fn arity(&self) -> usize {
        match self {
            Self::Scan(_) => 0,
            Self::Project(_) | Self::Select(_) => 1,
            Self::Product(_) | Self::Join(_) => 2,
        }
    }

    /// Predicate carried by selections and joins.
    pub fn predicate(&self) -> Option<&Predicate> {
        match self {
            Self::Select(select) => Some(select.predicate()),
            Self::Join(join) => Some(join.predicate()),
            _ => None,
        }
    }
}

impl Display for LogicalOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan(scan) => write!(f, "{} [{}]", self.as_ref(), scan.table_name()),
            Self::Project(project) => write!(
                f,
                "{} [{}]",
                self.as_ref(),
                project.attributes().iter().join(",")
            ),
            Self::Select(select) => write!(f, "{} [{}]", self.as_ref(), select.predicate()),
            Self::Product(_) => f.write_str(self.as_ref()),
            Self::Join(join) => write!(f, "{} [{}]", self.as_ref(), join.predicate()),
        }
    }
}
