//! WHERE clause evaluation
//!
//! A parsed `Condition` is compiled once per statement against the target
//! table (column positions resolved, LIKE patterns turned into regexes) and
//! then tested against each row.

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::catalog::Table;
use crate::error::{Error, Result};
use crate::sql::ast::{CompareOperator, Condition, LogicalOperator, Predicate};
use crate::storage::{Row, Value};

static NULL_VALUE: Value = Value::Null;

/// A condition bound to one table's column layout
#[derive(Debug)]
pub struct RowFilter {
    first: Check,
    rest: Vec<(LogicalOperator, Check)>,
}

#[derive(Debug)]
enum Check {
    Compare {
        column: Option<usize>,
        op: CompareOperator,
        value: Value,
    },
    InList {
        column: Option<usize>,
        values: Vec<Value>,
        negated: bool,
    },
    Like {
        column: Option<usize>,
        regex: Regex,
        negated: bool,
    },
    IsNull {
        column: Option<usize>,
        negated: bool,
    },
    Always,
}

impl RowFilter {
    /// Bind `condition` to `table`. Unknown columns read as NULL.
    pub fn new(condition: &Condition, table: &Table) -> Result<Self> {
        let first = Check::compile(&condition.first, table)?;
        let rest = condition
            .rest
            .iter()
            .map(|(op, predicate)| Ok((*op, Check::compile(predicate, table)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { first, rest })
    }

    /// Filter for an optional WHERE clause; `None` matches every row.
    pub fn for_clause(condition: Option<&Condition>, table: &Table) -> Result<Option<Self>> {
        condition.map(|c| Self::new(c, table)).transpose()
    }

    /// Left-to-right fold over the predicates, no precedence.
    pub fn matches(&self, row: &Row) -> bool {
        self.rest
            .iter()
            .fold(self.first.test(row), |acc, (op, check)| match op {
                LogicalOperator::And => acc && check.test(row),
                LogicalOperator::Or => acc || check.test(row),
            })
    }
}

impl Check {
    fn compile(predicate: &Predicate, table: &Table) -> Result<Self> {
        let check = match predicate {
            Predicate::Compare { column, op, value } => Check::Compare {
                column: resolve(table, column),
                op: *op,
                value: value.to_value(),
            },
            Predicate::InList {
                column,
                values,
                negated,
            } => Check::InList {
                column: resolve(table, column),
                values: values.iter().map(|v| v.to_value()).collect(),
                negated: *negated,
            },
            Predicate::Like {
                column,
                pattern,
                negated,
            } => Check::Like {
                column: resolve(table, column),
                regex: like_regex(pattern)?,
                negated: *negated,
            },
            Predicate::IsNull { column, negated } => Check::IsNull {
                column: resolve(table, column),
                negated: *negated,
            },
            Predicate::Unrecognized(_) => Check::Always,
        };
        Ok(check)
    }

    fn test(&self, row: &Row) -> bool {
        match self {
            Check::Compare { column, op, value } => {
                let left = cell(row, *column);
                match op {
                    CompareOperator::Eq => values_equal(left, value),
                    CompareOperator::Neq => !values_equal(left, value),
                    CompareOperator::Gt => greater_than(left, value),
                    CompareOperator::Lt => less_than(left, value),
                    CompareOperator::Gte => values_equal(left, value) || greater_than(left, value),
                    CompareOperator::Lte => values_equal(left, value) || less_than(left, value),
                }
            }
            Check::InList {
                column,
                values,
                negated,
            } => {
                let left = cell(row, *column);
                values.iter().any(|v| values_equal(left, v)) != *negated
            }
            Check::Like {
                column,
                regex,
                negated,
            } => {
                let matched = cell(row, *column)
                    .as_text()
                    .is_some_and(|text| regex.is_match(&text));
                matched != *negated
            }
            Check::IsNull { column, negated } => cell(row, *column).is_null() != *negated,
            Check::Always => true,
        }
    }
}

fn resolve(table: &Table, column: &str) -> Option<usize> {
    let idx = table.column_index(column);
    if idx.is_none() {
        warn!(table = %table.name, column, "unknown column in WHERE clause reads as NULL");
    }
    idx
}

fn cell(row: &Row, column: Option<usize>) -> &Value {
    column.and_then(|idx| row.get(idx)).unwrap_or(&NULL_VALUE)
}

/// Numeric reading for comparisons; booleans count as 1 and 0.
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64(),
    }
}

/// Numeric equality when both sides are numbers, else case-insensitive text
/// equality.
///
/// NULL equals only NULL, so `col = NULL` matches NULL rows. This is two-valued
/// logic, unlike SQL's `UNKNOWN`; `IS NULL` gives the same answer.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => match (numeric(left), numeric(right)) {
            (Some(a), Some(b)) => a == b,
            _ => lowercase_text(left) == lowercase_text(right),
        },
    }
}

/// Numeric `>` when both sides are numbers, else lower-cased lexicographic.
pub fn greater_than(left: &Value, right: &Value) -> bool {
    if left.is_null() || right.is_null() {
        return false;
    }
    match (numeric(left), numeric(right)) {
        (Some(a), Some(b)) => a > b,
        _ => lowercase_text(left) > lowercase_text(right),
    }
}

/// Numeric `<` when both sides are numbers, else lower-cased lexicographic.
pub fn less_than(left: &Value, right: &Value) -> bool {
    if left.is_null() || right.is_null() {
        return false;
    }
    match (numeric(left), numeric(right)) {
        (Some(a), Some(b)) => a < b,
        _ => lowercase_text(left) < lowercase_text(right),
    }
}

fn lowercase_text(value: &Value) -> String {
    value.as_text().unwrap_or_default().to_lowercase()
}

/// Translate a LIKE pattern: `%` is any run, `_` any one character. The
/// match is anchored and case-insensitive.
pub fn like_regex(pattern: &str) -> Result<Regex> {
    let mut source = String::from("^");
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            c => source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');

    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Internal(format!("invalid LIKE pattern '{}': {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};
    use crate::sql::ast::Statement;
    use crate::sql::{parse, StatementKind};

    fn people() -> Table {
        let mut table = Table::new(
            "people",
            vec![
                Column::new("id", DataType::Int),
                Column::new("name", DataType::Varchar),
                Column::new("age", DataType::Int),
                Column::new("active", DataType::Boolean),
            ],
        );
        let rows = [
            (1, Value::String("Ann".into()), Value::Integer(30), true),
            (2, Value::String("bob".into()), Value::Integer(25), false),
            (3, Value::String("Cara".into()), Value::Null, true),
        ];
        for (id, name, age, active) in rows {
            table
                .push_row(vec![Value::Integer(id), name, age, Value::Boolean(active)])
                .unwrap();
        }
        table
    }

    /// Ids of the rows matching a WHERE clause
    fn matching(where_sql: &str) -> Vec<i64> {
        let sql = format!("SELECT * FROM people WHERE {}", where_sql);
        let condition = match parse(&sql, StatementKind::Select).unwrap() {
            Statement::Select(s) => s.where_clause.unwrap(),
            other => panic!("Expected SELECT statement, got {:?}", other),
        };
        let table = people();
        let filter = RowFilter::new(&condition, &table).unwrap();
        table
            .rows()
            .iter()
            .filter(|row| filter.matches(row))
            .map(|row| match row.get(0) {
                Some(Value::Integer(id)) => *id,
                other => panic!("unexpected id {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(matching("age > 26"), vec![1]);
        assert_eq!(matching("age >= 25"), vec![1, 2]);
        assert_eq!(matching("age <= '25'"), vec![2]);
        assert_eq!(matching("name = 'ANN'"), vec![1]);
        assert_eq!(matching("name <> 'ann'"), vec![2, 3]);
        assert_eq!(matching("name > 'b'"), vec![2, 3]);
    }

    #[test]
    fn test_null_handling() {
        assert_eq!(matching("age IS NULL"), vec![3]);
        assert_eq!(matching("age IS NOT NULL"), vec![1, 2]);
        assert_eq!(matching("age < 100"), vec![1, 2]);
        assert_eq!(matching("age = NULL"), vec![3]);
        assert_eq!(matching("age != NULL"), vec![1, 2]);
    }

    #[test]
    fn test_in_and_like() {
        assert_eq!(matching("id IN (1, '3')"), vec![1, 3]);
        assert_eq!(matching("id NOT IN (1)"), vec![2, 3]);
        assert_eq!(matching("name LIKE 'a%'"), vec![1]);
        assert_eq!(matching("name LIKE '_o_'"), vec![2]);
        assert_eq!(matching("name NOT LIKE '%a'"), vec![1, 2]);
    }

    #[test]
    fn test_like_escapes_regex_characters() {
        let regex = like_regex("1+1=2.%").unwrap();
        assert!(regex.is_match("1+1=2. yes"));
        assert!(!regex.is_match("11=2x"));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(matching("active = TRUE"), vec![1, 3]);
        assert_eq!(matching("active = 0"), vec![2]);
    }

    #[test]
    fn test_left_to_right_fold() {
        // (id = 1 OR id = 2) AND age > 26
        assert_eq!(matching("id = 1 OR id = 2 AND age > 26"), vec![1]);
        // (id = 3 AND age > 1) OR name = 'bob'
        assert_eq!(matching("id = 3 AND age > 1 OR name = 'bob'"), vec![2]);
    }

    #[test]
    fn test_unrecognized_predicate_fails_open() {
        assert_eq!(matching("1 = 1"), vec![1, 2, 3]);
        assert_eq!(matching("missing = 'x'"), Vec::<i64>::new());
    }
}
