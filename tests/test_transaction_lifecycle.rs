use tabula::{Engine, EngineConfig, MemoryStore, Value};

fn engine() -> Engine {
    Engine::new(EngineConfig::default(), Box::new(MemoryStore::new()))
}

#[test]
fn test_transaction_lifecycle() {
    let mut engine = engine();

    // BEGIN
    let result = engine.execute("bank", "BEGIN");
    assert!(result.success);
    assert_eq!(result.query_type, "BEGIN");
    assert!(result.output.contains("started"));

    // START TRANSACTION is the same statement
    let result = engine.execute("bank", "START TRANSACTION");
    assert_eq!(result.query_type, "BEGIN");

    // COMMIT
    let result = engine.execute("bank", "COMMIT");
    assert!(result.success);
    assert!(result.output.contains("committed"));

    // BEGIN & ROLLBACK
    engine.execute("bank", "BEGIN");
    let result = engine.execute("bank", "ROLLBACK");
    assert!(result.success);
    assert!(result.output.contains("rolled back"));
}

#[test]
fn test_rollback_does_not_undo_changes() {
    let mut engine = engine();
    engine.execute("bank", "CREATE TABLE accounts (id INT PRIMARY KEY AUTO_INCREMENT, balance INT)");

    engine.execute("bank", "BEGIN");
    engine.execute("bank", "INSERT INTO accounts (balance) VALUES (100)");
    engine.execute("bank", "UPDATE accounts SET balance = 50");
    engine.execute("bank", "ROLLBACK");

    let result = engine.execute("bank", "SELECT balance FROM accounts");
    assert_eq!(result.rows().len(), 1);
    assert_eq!(result.rows()[0]["balance"], Value::Integer(50));
}

#[test]
fn test_batch_failure_keeps_earlier_statements() {
    let mut engine = engine();
    let results = engine.execute_batch(
        "bank",
        "BEGIN; CREATE TABLE t (id INT); INSERT INTO t VALUES (1); INSERT INTO t VALUES (1, 2); COMMIT;",
    );

    assert_eq!(results.len(), 4);
    assert!(results[..3].iter().all(|r| r.success));
    assert_eq!(results[3].error_code.as_deref(), Some("INVALID_SYNTAX"));

    let result = engine.execute("bank", "SELECT * FROM t");
    assert_eq!(result.row_count, Some(1));
}
