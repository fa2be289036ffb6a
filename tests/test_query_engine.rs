use tabula::{Engine, EngineConfig, ExecutionResult, MemoryStore, Value};

fn engine() -> Engine {
    Engine::new(EngineConfig::default(), Box::new(MemoryStore::new()))
}

fn run(engine: &mut Engine, sql: &str) -> ExecutionResult {
    let result = engine.execute("test", sql);
    assert!(result.success, "{} failed: {:?}", sql, result.error);
    result
}

fn ints(result: &ExecutionResult, column: &str) -> Vec<i64> {
    result
        .rows()
        .iter()
        .map(|row| match &row[column] {
            Value::Integer(n) => *n,
            other => panic!("expected integer in {}, got {:?}", column, other),
        })
        .collect()
}

#[test]
fn test_end_to_end_scenario() {
    let mut engine = engine();

    let result = run(
        &mut engine,
        "CREATE TABLE users (id INT PRIMARY KEY AUTO_INCREMENT, name VARCHAR(50) NOT NULL, age INT)",
    );
    assert_eq!(result.query_type, "CREATE TABLE");
    let users = engine
        .catalog()
        .get_database("test")
        .unwrap()
        .get_table("users")
        .unwrap();
    assert_eq!(users.columns().len(), 3);

    let result = run(&mut engine, "INSERT INTO users (name, age) VALUES ('Ann', 30)");
    assert_eq!(result.affected_rows, Some(1));
    run(&mut engine, "INSERT INTO users (name, age) VALUES ('Bo', 25)");

    let result = run(&mut engine, "SELECT * FROM users WHERE age > 26 ORDER BY id");
    assert_eq!(result.columns.as_deref(), Some(&["id".to_string(), "name".into(), "age".into()][..]));
    assert_eq!(result.rows().len(), 1);
    let row = &result.rows()[0];
    assert_eq!(row["id"], Value::Integer(1));
    assert_eq!(row["name"], Value::String("Ann".into()));
    assert_eq!(row["age"], Value::Integer(30));

    let result = run(&mut engine, "SELECT * FROM users WHERE name = 'Bo'");
    assert_eq!(ints(&result, "id"), vec![2]);

    let result = run(&mut engine, "UPDATE users SET age = 31 WHERE name = 'Ann'");
    assert_eq!(result.affected_rows, Some(1));
    let result = run(&mut engine, "SELECT age FROM users WHERE id = 1");
    assert_eq!(ints(&result, "age"), vec![31]);

    run(&mut engine, "DROP TABLE users");
    let result = engine.execute("test", "SELECT * FROM users");
    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("TABLE_NOT_FOUND"));
}

#[test]
fn test_table_names_are_unique_ignoring_case() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE Orders (id INT)");
    for name in ["Orders", "orders", "ORDERS"] {
        let result = engine.execute("test", &format!("CREATE TABLE {} (x INT)", name));
        assert!(!result.success);
        assert_eq!(result.error_code.as_deref(), Some("TABLE_ALREADY_EXISTS"));
    }
}

#[test]
fn test_insert_select_round_trip() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE t(id INT PRIMARY KEY AUTO_INCREMENT, v VARCHAR(10))");
    run(&mut engine, "INSERT INTO t (v) VALUES ('x')");

    let result = run(&mut engine, "SELECT * FROM t");
    assert_eq!(result.rows().len(), 1);
    let keys: Vec<&str> = result.rows()[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "v"]);
    assert_eq!(result.rows()[0]["id"], Value::Integer(1));
    assert_eq!(result.rows()[0]["v"], Value::String("x".into()));
}

#[test]
fn test_auto_increment_is_monotonic() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE t (id INT PRIMARY KEY AUTO_INCREMENT, v INT)");
    run(&mut engine, "INSERT INTO t (v) VALUES (1), (2), (3)");
    run(&mut engine, "DELETE FROM t WHERE id = 2");
    for v in 4..=6 {
        run(&mut engine, &format!("INSERT INTO t (v) VALUES ({})", v));
    }

    let result = run(&mut engine, "SELECT id FROM t");
    assert_eq!(ints(&result, "id"), vec![1, 3, 4, 5, 6]);
}

#[test]
fn test_delete_on_empty_table() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE t (id INT)");
    let result = run(&mut engine, "DELETE FROM t WHERE id = 5");
    assert_eq!(result.affected_rows, Some(0));
    let result = run(&mut engine, "DELETE FROM t");
    assert_eq!(result.affected_rows, Some(0));
}

#[test]
fn test_order_by_directions_are_reversed() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE people (id INT, age INT)");
    run(
        &mut engine,
        "INSERT INTO people VALUES (1, 40), (2, 18), (3, 33), (4, 27), (5, 51), (6, 22)",
    );

    let desc = run(&mut engine, "SELECT id FROM people WHERE age > 20 ORDER BY age DESC");
    let asc = run(&mut engine, "SELECT id FROM people WHERE age > 20 ORDER BY age ASC");
    let mut reversed = ints(&asc, "id");
    reversed.reverse();
    assert_eq!(ints(&desc, "id"), reversed);
    assert_eq!(ints(&asc, "id"), vec![6, 4, 3, 1, 5]);
}

#[test]
fn test_limit_with_offset() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE n (id INT)");
    let values: Vec<String> = (1..=10).rev().map(|i| format!("({})", i)).collect();
    run(&mut engine, &format!("INSERT INTO n VALUES {}", values.join(", ")));

    let result = run(&mut engine, "SELECT id FROM n ORDER BY id LIMIT 2,3");
    assert_eq!(ints(&result, "id"), vec![3, 4, 5]);
    let result = run(&mut engine, "SELECT id FROM n ORDER BY id LIMIT 3 OFFSET 8");
    assert_eq!(ints(&result, "id"), vec![9, 10]);
}

#[test]
fn test_unrecognized_statement_fails_gracefully() {
    let mut engine = engine();
    let result = engine.execute("test", "FOOBAR x");
    assert!(!result.success);
    assert_eq!(result.query_type, "UNKNOWN");
    assert!(result.error.unwrap().contains("Supported statements"));
}

#[test]
fn test_syntax_errors_are_results() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE t (id INT)");
    for sql in [
        "SELECT * t",
        "INSERT INTO t VALUES 1",
        "UPDATE t id = 1",
        "SELECT * FROM t WHERE id = 'open",
        "CREATE TABLE e ()",
    ] {
        let result = engine.execute("test", sql);
        assert!(!result.success, "{} should fail", sql);
        assert!(result.error.is_some());
    }
}

#[test]
fn test_where_features() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE p (id INT, name VARCHAR(20), city TEXT)");
    run(
        &mut engine,
        "INSERT INTO p VALUES (1, 'Alice', 'Oslo'), (2, 'bob', NULL), (3, 'Carol', 'Lima'), (4, 'alan', 'Oslo')",
    );

    let ids = |engine: &mut Engine, clause: &str| {
        let result = run(engine, &format!("SELECT id FROM p WHERE {} ORDER BY id", clause));
        ints(&result, "id")
    };

    assert_eq!(ids(&mut engine, "name LIKE 'al%'"), vec![1, 4]);
    assert_eq!(ids(&mut engine, "city IS NULL"), vec![2]);
    assert_eq!(ids(&mut engine, "city IN ('oslo', 'LIMA')"), vec![1, 3, 4]);
    assert_eq!(ids(&mut engine, "id NOT IN (1, 2)"), vec![3, 4]);
    assert_eq!(ids(&mut engine, "id >= 2 AND id <= 3"), vec![2, 3]);
    assert_eq!(ids(&mut engine, "id = 1 OR id = 4 AND city = 'Oslo'"), vec![1, 4]);
}

#[test]
fn test_group_by_keeps_first_row() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE sales (id INT, region TEXT)");
    run(
        &mut engine,
        "INSERT INTO sales VALUES (1, 'north'), (2, 'south'), (3, 'North'), (4, 'east'), (5, 'south')",
    );
    let result = run(&mut engine, "SELECT id, region FROM sales GROUP BY region");
    assert_eq!(ints(&result, "id"), vec![1, 2, 3, 4]);
}

#[test]
fn test_projection_errors() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE t (id INT, v TEXT)");
    let result = engine.execute("test", "SELECT nope FROM t");
    assert_eq!(result.error_code.as_deref(), Some("INVALID_COLUMN"));
    assert!(result.error.unwrap().contains("id, v"));
}

#[test]
fn test_create_table_defaults_and_types() {
    let mut engine = engine();
    run(
        &mut engine,
        "CREATE TABLE IF NOT EXISTS products (
            id BIGINT PRIMARY KEY AUTO_INCREMENT,
            name VARCHAR(100) NOT NULL,
            price DECIMAL(10,2) DEFAULT 9.50,
            active BOOLEAN DEFAULT TRUE,
            stock INT NOT NULL,
            added DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (id)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
    );
    run(&mut engine, "INSERT INTO products (name) VALUES ('pen')");

    let result = run(&mut engine, "SELECT * FROM products");
    let row = &result.rows()[0];
    assert_eq!(row["id"], Value::Integer(1));
    assert_eq!(row["price"], Value::Float(9.5));
    assert_eq!(row["active"], Value::Boolean(true));
    assert_eq!(row["stock"], Value::Integer(0));
    match &row["added"] {
        Value::String(ts) => assert_eq!(ts.len(), "2024-01-01 00:00:00".len()),
        other => panic!("expected timestamp, got {:?}", other),
    }

    let products = engine
        .catalog()
        .get_database("test")
        .unwrap()
        .get_table("products")
        .unwrap();
    assert_eq!(products.engine, "InnoDB");
    assert_eq!(products.charset, "utf8mb4");
    assert_eq!(products.constraints.len(), 1);
}

#[test]
fn test_introspection() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE a (id INT PRIMARY KEY, email VARCHAR(80) UNIQUE)");
    run(&mut engine, "CREATE TABLE b (id INT)");
    run(&mut engine, "INSERT INTO a VALUES (1, 'x@y')");

    let result = run(&mut engine, "SHOW TABLES");
    assert_eq!(result.row_count, Some(2));
    assert_eq!(result.rows()[0]["Rows"], Value::Integer(1));

    let result = run(&mut engine, "DESC a");
    assert_eq!(result.rows()[1]["Key"], Value::String("UNI".into()));

    let result = run(&mut engine, "SHOW DATABASES");
    assert_eq!(result.rows()[0]["Database"], Value::String("test".into()));
    assert_eq!(result.rows()[0]["Tables"], Value::Integer(2));

    let result = run(&mut engine, "EXPLAIN DELETE FROM b");
    assert_eq!(result.rows()[0]["select_type"], Value::String("DELETE".into()));
}

#[test]
fn test_simulated_statements_leave_data_alone() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE t (id INT)");
    run(&mut engine, "INSERT INTO t VALUES (1)");
    run(&mut engine, "ALTER TABLE t DROP COLUMN id");
    run(&mut engine, "CREATE UNIQUE INDEX idx_id ON t (id)");
    run(&mut engine, "DROP INDEX idx_id ON t");

    let result = run(&mut engine, "SELECT * FROM t");
    assert_eq!(ints(&result, "id"), vec![1]);
}

#[test]
fn test_truncate() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE t (id INT)");
    run(&mut engine, "INSERT INTO t VALUES (1), (2), (3)");
    let result = run(&mut engine, "TRUNCATE TABLE t");
    assert_eq!(result.affected_rows, Some(3));
    let result = run(&mut engine, "SELECT * FROM t");
    assert_eq!(result.row_count, Some(0));
    assert_eq!(result.columns.as_deref().map(<[String]>::len), Some(1));
}

#[test]
fn test_order_by_mixed_codes() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE codes (c VARCHAR(10))");
    let codes = ["10", "9", "1a", "2", "b", "100", "05", "x1", "3z"];
    let values: Vec<String> = (0..60).map(|i| format!("('{}')", codes[(i * 7) % codes.len()])).collect();
    run(&mut engine, &format!("INSERT INTO codes VALUES {}", values.join(", ")));

    let result = run(&mut engine, "SELECT * FROM codes ORDER BY c");
    assert_eq!(result.row_count, Some(60));
    assert_eq!(result.rows()[0]["c"], Value::String("2".into()));
    assert_eq!(result.rows()[59]["c"], Value::String("x1".into()));
}

#[test]
fn test_auto_increment_at_limit_fails_cleanly() {
    let mut engine = engine();
    run(&mut engine, "CREATE TABLE t (id BIGINT PRIMARY KEY AUTO_INCREMENT, v TEXT)");
    run(&mut engine, "INSERT INTO t (v) VALUES ('a')");
    run(&mut engine, "UPDATE t SET id = 9223372036854775807");

    let result = engine.execute("test", "INSERT INTO t (v) VALUES ('b')");
    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("AUTO_INCREMENT_OVERFLOW"));

    let result = run(&mut engine, "SELECT * FROM t");
    assert_eq!(ints(&result, "id"), vec![i64::MAX]);
}
