//! SELECT pipeline
//!
//! WHERE filter, GROUP BY (first row per group), ORDER BY, LIMIT and finally
//! the projection, always in that order.

use std::cmp::Ordering;
use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::condition::{numeric, RowFilter};
use super::executor::QueryResult;
use crate::catalog::Table;
use crate::error::Result;
use crate::sql::ast::{Projection, SelectStatement};
use crate::storage::{Row, Value};

/// Run a SELECT against a single table.
pub fn select(table: &Table, stmt: &SelectStatement) -> Result<QueryResult> {
    let projection = resolve_projection(table, &stmt.columns)?;

    let filter = RowFilter::for_clause(stmt.where_clause.as_ref(), table)?;
    let mut rows: Vec<&Row> = table
        .rows()
        .iter()
        .filter(|row| filter.as_ref().map_or(true, |f| f.matches(row)))
        .collect();

    if !stmt.group_by.is_empty() {
        let keys = resolve_optional(table, &stmt.group_by, "GROUP BY");
        let mut seen = HashSet::new();
        rows.retain(|row| seen.insert(group_key(row, &keys)));
    }

    if !stmt.order_by.is_empty() {
        let columns: Vec<String> = stmt.order_by.iter().map(|o| o.column.clone()).collect();
        let keys: Vec<(Option<usize>, bool)> = resolve_optional(table, &columns, "ORDER BY")
            .into_iter()
            .zip(stmt.order_by.iter().map(|o| o.ascending))
            .collect();

        // Stable, so ties keep their table order
        rows.sort_by(|a, b| {
            keys.iter()
                .map(|&(idx, ascending)| {
                    let ord = compare_for_sort(cell(a, idx), cell(b, idx));
                    if ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    let (offset, count) = stmt
        .limit
        .map_or((0, usize::MAX), |limit| (limit.offset, limit.count));

    let columns = table.columns();
    let result_rows: Vec<IndexMap<String, Value>> = rows
        .into_iter()
        .skip(offset)
        .take(count)
        .map(|row| {
            projection
                .iter()
                .map(|&idx| {
                    let value = row.get(idx).cloned().unwrap_or(Value::Null);
                    (columns[idx].name.clone(), value)
                })
                .collect()
        })
        .collect();

    debug!(table = %table.name, rows = result_rows.len(), "select complete");

    Ok(QueryResult {
        columns: projection.iter().map(|&idx| columns[idx].name.clone()).collect(),
        rows: result_rows,
        ..QueryResult::empty()
    })
}

/// Column positions to emit, in declaration order.
fn resolve_projection(table: &Table, projection: &Projection) -> Result<Vec<usize>> {
    let names = match projection {
        Projection::All => return Ok((0..table.columns().len()).collect()),
        Projection::Columns(names) => names,
    };

    for name in names {
        if table.column_index(name).is_none() {
            warn!(table = %table.name, column = %name, "unknown column dropped from projection");
        }
    }

    let selected: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| names.iter().any(|n| n.eq_ignore_ascii_case(&c.name)))
        .map(|(idx, _)| idx)
        .collect();

    if selected.is_empty() {
        return Err(table.invalid_column(&names.join(", ")));
    }
    Ok(selected)
}

/// Unknown names resolve to `None` and read as NULL.
fn resolve_optional(table: &Table, names: &[String], clause: &str) -> Vec<Option<usize>> {
    names
        .iter()
        .map(|name| {
            let idx = table.column_index(name);
            if idx.is_none() {
                warn!(table = %table.name, column = %name, clause, "unknown column reads as NULL");
            }
            idx
        })
        .collect()
}

fn cell(row: &Row, idx: Option<usize>) -> Option<&Value> {
    idx.and_then(|i| row.get(i)).filter(|v| !v.is_null())
}

fn group_key(row: &Row, keys: &[Option<usize>]) -> Vec<Option<String>> {
    keys.iter()
        .map(|&idx| cell(row, idx).and_then(Value::as_text))
        .collect()
}

/// Ascending order: NULL first, then numbers, then text.
///
/// Numbers compare with `total_cmp`; text compares case-insensitively with
/// the raw text as tie-breaker. Ranking the classes apart keeps the order
/// total when a column mixes numeric and non-numeric strings.
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => {
                let x = a.as_text().unwrap_or_default();
                let y = b.as_text().unwrap_or_default();
                x.to_lowercase()
                    .cmp(&y.to_lowercase())
                    .then_with(|| x.cmp(&y))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};
    use crate::error::Error;
    use crate::sql::ast::Statement;
    use crate::sql::{parse, StatementKind};

    fn staff() -> Table {
        let mut table = Table::new(
            "staff",
            vec![
                Column::new("id", DataType::Int),
                Column::new("name", DataType::Varchar),
                Column::new("dept", DataType::Varchar),
                Column::new("age", DataType::Int),
            ],
        );
        let rows = [
            (1, "Ann", "eng", Value::Integer(30)),
            (2, "bob", "ops", Value::Integer(25)),
            (3, "Cara", "eng", Value::Null),
            (4, "dan", "ops", Value::Integer(41)),
            (5, "Eve", "sales", Value::Integer(25)),
        ];
        for (id, name, dept, age) in rows {
            table
                .push_row(vec![
                    Value::Integer(id),
                    Value::String(name.into()),
                    Value::String(dept.into()),
                    age,
                ])
                .unwrap();
        }
        table
    }

    fn run(sql: &str) -> Result<QueryResult> {
        match parse(sql, StatementKind::Select)? {
            Statement::Select(stmt) => select(&staff(), &stmt),
            other => panic!("Expected SELECT statement, got {:?}", other),
        }
    }

    fn ids(result: &QueryResult) -> Vec<i64> {
        result
            .rows
            .iter()
            .map(|row| match row.get("id") {
                Some(Value::Integer(id)) => *id,
                other => panic!("unexpected id {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_select_all_in_declaration_order() {
        let result = run("SELECT * FROM staff").unwrap();
        assert_eq!(result.columns, vec!["id", "name", "dept", "age"]);
        assert_eq!(result.rows.len(), 5);
        let keys: Vec<&String> = result.rows[0].keys().collect();
        assert_eq!(keys, vec!["id", "name", "dept", "age"]);
    }

    #[test]
    fn test_projection_uses_declaration_order() {
        let result = run("SELECT age, ID, nope FROM staff").unwrap();
        assert_eq!(result.columns, vec!["id", "age"]);
    }

    #[test]
    fn test_projection_without_valid_columns() {
        let err = run("SELECT nope FROM staff").unwrap_err();
        match err {
            Error::InvalidColumn { column, valid } => {
                assert_eq!(column, "nope");
                assert_eq!(valid, "id, name, dept, age");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_order_by_nulls_and_direction() {
        let asc = run("SELECT id FROM staff ORDER BY age, id").unwrap();
        assert_eq!(ids(&asc), vec![3, 2, 5, 1, 4]);
        let desc = run("SELECT id FROM staff ORDER BY age DESC, id DESC").unwrap();
        assert_eq!(ids(&desc), vec![4, 1, 5, 2, 3]);
    }

    #[test]
    fn test_order_by_text_is_case_insensitive() {
        let result = run("SELECT id FROM staff ORDER BY name").unwrap();
        assert_eq!(ids(&result), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_order_by_mixed_numeric_and_text() {
        let mut table = Table::new("codes", vec![Column::new("c", DataType::Varchar)]);
        let codes = ["10", "9", "1a", "2", "b", "100", "05", "x1", "3z", "B", "a"];
        for code in codes.iter().cycle().take(codes.len() * 3) {
            table.push_row(vec![Value::String(code.to_string())]).unwrap();
        }

        let stmt = match parse("SELECT c FROM codes ORDER BY c", StatementKind::Select).unwrap() {
            Statement::Select(stmt) => stmt,
            other => panic!("Expected SELECT statement, got {:?}", other),
        };
        let result = select(&table, &stmt).unwrap();
        let sorted: Vec<String> = result
            .rows
            .iter()
            .map(|row| row["c"].as_text().unwrap())
            .collect();

        let expected: Vec<String> = ["2", "05", "9", "10", "100", "1a", "3z", "a", "B", "b", "x1"]
            .iter()
            .flat_map(|c| std::iter::repeat(c.to_string()).take(3))
            .collect();
        assert_eq!(sorted, expected);

        let desc = match parse("SELECT c FROM codes ORDER BY c DESC", StatementKind::Select).unwrap() {
            Statement::Select(stmt) => select(&table, &stmt).unwrap(),
            other => panic!("Expected SELECT statement, got {:?}", other),
        };
        assert_eq!(desc.rows[0]["c"], Value::String("x1".into()));
        assert_eq!(desc.rows[32]["c"], Value::String("2".into()));
    }

    #[test]
    fn test_group_by_keeps_first_row() {
        let result = run("SELECT id, dept FROM staff GROUP BY dept").unwrap();
        assert_eq!(ids(&result), vec![1, 2, 5]);
    }

    #[test]
    fn test_limit_forms() {
        let result = run("SELECT id FROM staff ORDER BY id LIMIT 1, 2").unwrap();
        assert_eq!(ids(&result), vec![2, 3]);
        let result = run("SELECT id FROM staff ORDER BY id LIMIT 2 OFFSET 3").unwrap();
        assert_eq!(ids(&result), vec![4, 5]);
        let result = run("SELECT id FROM staff LIMIT 10, 5").unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_pipeline_order() {
        let result =
            run("SELECT id FROM staff WHERE age >= 25 GROUP BY dept ORDER BY id DESC LIMIT 2").unwrap();
        assert_eq!(ids(&result), vec![5, 2]);
    }
}
