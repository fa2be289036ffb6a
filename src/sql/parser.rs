//! SQL Parser
//!
//! This module parses SQL tokens into an AST. The statement kind has already
//! been decided by the classifier, so each kind has exactly one entry point.

use tracing::warn;

use super::ast::*;
use super::classifier::{classify, StatementKind};
use super::lexer::Lexer;
use super::token::{join_tokens, Keyword, Token};
use crate::catalog::{Column, ColumnDefault, ConstraintKind, DataType, ForeignKeyRef, TableConstraint};
use crate::error::{Error, Result};

/// Parse a normalized statement of a known kind.
pub fn parse(sql: &str, kind: StatementKind) -> Result<Statement> {
    Parser::new(sql)?.parse(kind)
}

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a SQL string
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parser over a slice of an outer statement's tokens
    fn from_tokens(mut tokens: Vec<Token>) -> Self {
        tokens.push(Token::Eof);
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the whole input as a statement of the given kind
    pub fn parse(&mut self, kind: StatementKind) -> Result<Statement> {
        let stmt = match kind {
            StatementKind::Select => self.parse_select().map(Statement::Select)?,
            StatementKind::Insert => self.parse_insert().map(Statement::Insert)?,
            StatementKind::Update => self.parse_update().map(Statement::Update)?,
            StatementKind::Delete => self.parse_delete().map(Statement::Delete)?,
            StatementKind::CreateTable => self.parse_create_table().map(Statement::CreateTable)?,
            StatementKind::DropTable => self.parse_drop_table()?,
            StatementKind::AlterTable => self.parse_alter_table()?,
            StatementKind::TruncateTable => self.parse_truncate_table()?,
            StatementKind::CreateDatabase => self.parse_create_database()?,
            StatementKind::DropDatabase => self.parse_drop_database()?,
            StatementKind::CreateIndex => self.parse_create_index().map(Statement::CreateIndex)?,
            StatementKind::DropIndex => self.parse_drop_index()?,
            StatementKind::ShowTables => {
                self.expect_word("SHOW")?;
                self.expect_word("TABLES")?;
                Statement::ShowTables
            }
            StatementKind::ShowDatabases => {
                self.expect_word("SHOW")?;
                if !self.consume_word("DATABASES") {
                    self.expect_word("SCHEMAS")?;
                }
                Statement::ShowDatabases
            }
            StatementKind::Describe => {
                if !self.consume_keyword(Keyword::Desc) {
                    self.expect_word("DESCRIBE")?;
                }
                let table_name = self.parse_object_name()?;
                Statement::Describe { table_name }
            }
            StatementKind::Use => {
                self.expect_word("USE")?;
                let database = self.expect_identifier()?;
                Statement::Use { database }
            }
            StatementKind::Explain => self.parse_explain()?,
            StatementKind::Begin => {
                if self.consume_word("START") {
                    self.expect_word("TRANSACTION")?;
                } else {
                    self.expect_word("BEGIN")?;
                    let _ = self.consume_word("TRANSACTION") || self.consume_word("WORK");
                }
                Statement::BeginTransaction
            }
            StatementKind::Commit => {
                self.expect_word("COMMIT")?;
                self.consume_word("WORK");
                Statement::Commit
            }
            StatementKind::Rollback => {
                self.expect_word("ROLLBACK")?;
                self.consume_word("WORK");
                Statement::Rollback
            }
        };

        // Consume optional semicolon
        self.consume(&Token::Semicolon);

        if !self.is_at_end() {
            return Err(Error::syntax(format!(
                "unexpected '{}' in {} statement",
                self.current(),
                kind
            )));
        }

        Ok(stmt)
    }

    // ========== SELECT Statement ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect_keyword(Keyword::Select)?;

        let columns = if self.consume(&Token::Asterisk) {
            Projection::All
        } else {
            let mut names = Vec::new();
            loop {
                names.push(self.parse_column_ref()?);
                // Aliases are accepted and ignored
                if self.consume_keyword(Keyword::As) {
                    self.expect_identifier()?;
                }
                if !self.consume(&Token::Comma) {
                    break;
                }
            }
            Projection::Columns(names)
        };

        if !self.check_keyword(Keyword::From) {
            return Err(Error::syntax("SELECT requires a FROM clause"));
        }
        self.advance();
        let table_name = self.parse_object_name()?;

        let where_clause = if self.consume_keyword(Keyword::Where) {
            Some(self.parse_condition()?)
        } else {
            None
        };

        let mut group_by = Vec::new();
        if self.consume_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            loop {
                group_by.push(self.parse_column_ref()?);
                if !self.consume(&Token::Comma) {
                    break;
                }
            }
        }

        let mut order_by = Vec::new();
        if self.consume_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            loop {
                let column = self.parse_column_ref()?;
                let ascending = if self.consume_keyword(Keyword::Desc) {
                    false
                } else {
                    self.consume_keyword(Keyword::Asc);
                    true
                };
                order_by.push(OrderByItem { column, ascending });
                if !self.consume(&Token::Comma) {
                    break;
                }
            }
        }

        let limit = if self.consume_keyword(Keyword::Limit) {
            Some(self.parse_limit()?)
        } else {
            None
        };

        Ok(SelectStatement {
            columns,
            table_name,
            where_clause,
            group_by,
            order_by,
            limit,
        })
    }

    fn parse_limit(&mut self) -> Result<Limit> {
        let first = self.expect_count()?;
        if self.consume(&Token::Comma) {
            let count = self.expect_count()?;
            Ok(Limit {
                offset: first,
                count,
            })
        } else if self.consume_keyword(Keyword::Offset) {
            let offset = self.expect_count()?;
            Ok(Limit {
                offset,
                count: first,
            })
        } else {
            Ok(Limit {
                offset: 0,
                count: first,
            })
        }
    }

    // ========== INSERT Statement ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;

        let table_name = self.parse_object_name()?;

        // Optional column list
        let columns = if self.consume(&Token::LParen) {
            let mut cols = Vec::new();
            loop {
                cols.push(self.expect_identifier()?);
                if !self.consume(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        if !self.consume_keyword(Keyword::Values) {
            return Err(Error::syntax("INSERT requires a VALUES clause"));
        }

        // Parse value rows
        let mut values = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let row = self.parse_literal_list()?;
            self.expect(&Token::RParen)?;
            values.push(row);

            if !self.consume(&Token::Comma) {
                break;
            }
        }

        Ok(InsertStatement {
            table_name,
            columns,
            values,
        })
    }

    // ========== UPDATE Statement ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect_keyword(Keyword::Update)?;

        let table_name = self.parse_object_name()?;

        if !self.consume_keyword(Keyword::Set) {
            return Err(Error::syntax("UPDATE requires a SET clause"));
        }

        let mut assignments = Vec::new();
        loop {
            let column = self.parse_column_ref()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push(Assignment { column, value });

            if !self.consume(&Token::Comma) {
                break;
            }
        }

        let where_clause = if self.consume_keyword(Keyword::Where) {
            Some(self.parse_condition()?)
        } else {
            None
        };

        Ok(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        })
    }

    // ========== DELETE Statement ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;

        let table_name = self.parse_object_name()?;

        let where_clause = if self.consume_keyword(Keyword::Where) {
            Some(self.parse_condition()?)
        } else {
            None
        };

        Ok(DeleteStatement {
            table_name,
            where_clause,
        })
    }

    // ========== WHERE Clause ==========

    /// Collect predicates up to GROUP BY / ORDER BY / LIMIT, split on
    /// top-level AND/OR.
    fn parse_condition(&mut self) -> Result<Condition> {
        let mut segments = Vec::new();
        let mut operators = Vec::new();
        let mut current = Vec::new();
        let mut depth = 0usize;

        loop {
            let token = self.current().clone();
            match token {
                Token::Eof | Token::Semicolon => break,
                Token::Keyword(Keyword::Group | Keyword::Order | Keyword::Limit) if depth == 0 => {
                    break
                }
                Token::Keyword(Keyword::And) if depth == 0 => {
                    segments.push(std::mem::take(&mut current));
                    operators.push(LogicalOperator::And);
                }
                Token::Keyword(Keyword::Or) if depth == 0 => {
                    segments.push(std::mem::take(&mut current));
                    operators.push(LogicalOperator::Or);
                }
                Token::LParen => {
                    depth += 1;
                    current.push(token);
                }
                Token::RParen => {
                    depth = depth.saturating_sub(1);
                    current.push(token);
                }
                _ => current.push(token),
            }
            self.advance();
        }
        segments.push(current);

        if segments.iter().any(Vec::is_empty) {
            return Err(Error::syntax("incomplete WHERE clause"));
        }

        let mut predicates = segments.into_iter().map(predicate_from_tokens);
        let first = predicates
            .next()
            .ok_or_else(|| Error::syntax("empty WHERE clause"))?;
        let rest = operators.into_iter().zip(predicates).collect();

        Ok(Condition { first, rest })
    }

    fn parse_predicate(&mut self) -> Result<Predicate> {
        let column = self.parse_column_ref()?;

        let predicate = if self.consume_keyword(Keyword::Is) {
            let negated = self.consume_keyword(Keyword::Not);
            self.expect_keyword(Keyword::Null)?;
            Predicate::IsNull { column, negated }
        } else {
            let negated = self.consume_keyword(Keyword::Not);
            if self.consume_keyword(Keyword::In) {
                self.expect(&Token::LParen)?;
                let values = self.parse_literal_list()?;
                self.expect(&Token::RParen)?;
                Predicate::InList {
                    column,
                    values,
                    negated,
                }
            } else if self.consume_keyword(Keyword::Like) {
                let pattern = match self.parse_literal()? {
                    Literal::String(s) | Literal::Number(s) | Literal::Word(s) => s,
                    _ => return Err(Error::syntax("LIKE requires a pattern")),
                };
                Predicate::Like {
                    column,
                    pattern,
                    negated,
                }
            } else if negated {
                return Err(self.unexpected("IN or LIKE"));
            } else {
                let op = match self.current() {
                    Token::Eq => CompareOperator::Eq,
                    Token::Neq => CompareOperator::Neq,
                    Token::Lt => CompareOperator::Lt,
                    Token::Gt => CompareOperator::Gt,
                    Token::Lte => CompareOperator::Lte,
                    Token::Gte => CompareOperator::Gte,
                    _ => return Err(self.unexpected("a comparison operator")),
                };
                self.advance();
                let value = self.parse_literal()?;
                Predicate::Compare { column, op, value }
            }
        };

        if !self.is_at_end() {
            return Err(self.unexpected("end of condition"));
        }
        Ok(predicate)
    }

    // ========== CREATE TABLE Statement ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let table_name = self.parse_object_name()?;

        if !self.consume(&Token::LParen) {
            return Err(Error::syntax(format!(
                "expected column definitions for table '{}'",
                table_name
            )));
        }

        // Split the body on top-level commas
        let mut definitions = Vec::new();
        let mut current = Vec::new();
        let mut depth = 0usize;
        loop {
            let token = self.current().clone();
            match token {
                Token::Eof => {
                    return Err(Error::syntax(format!(
                        "unbalanced parentheses in definition of '{}'",
                        table_name
                    )))
                }
                Token::RParen if depth == 0 => {
                    self.advance();
                    break;
                }
                Token::Comma if depth == 0 => definitions.push(std::mem::take(&mut current)),
                Token::LParen => {
                    depth += 1;
                    current.push(token);
                }
                Token::RParen => {
                    depth -= 1;
                    current.push(token);
                }
                _ => current.push(token),
            }
            self.advance();
        }
        definitions.push(current);

        let mut columns: Vec<Column> = Vec::new();
        let mut constraints = Vec::new();
        for definition in definitions.into_iter().filter(|d| !d.is_empty()) {
            if let Some(constraint) = table_constraint(&definition) {
                constraints.push(constraint);
                continue;
            }

            let text = join_tokens(&definition);
            match Parser::from_tokens(definition).parse_column_def() {
                Ok(column) => {
                    if columns.iter().any(|c| c.name.eq_ignore_ascii_case(&column.name)) {
                        return Err(Error::syntax(format!(
                            "duplicate column '{}' in table '{}'",
                            column.name, table_name
                        )));
                    }
                    columns.push(column);
                }
                Err(e) => {
                    warn!(table = %table_name, definition = %text, error = %e, "skipping column definition")
                }
            }
        }

        if columns.is_empty() {
            return Err(Error::NoColumnsParsed(table_name));
        }

        let mut stmt = CreateTableStatement {
            table_name,
            columns,
            constraints,
            if_not_exists,
            engine: None,
            charset: None,
        };
        self.parse_table_options(&mut stmt)?;
        Ok(stmt)
    }

    fn parse_column_def(&mut self) -> Result<Column> {
        let name = self.expect_identifier()?;

        let type_name = match self.current() {
            Token::Identifier(word) => word.clone(),
            Token::Keyword(keyword) => keyword.as_str().to_string(),
            _ => return Err(self.unexpected("a data type")),
        };
        let data_type = DataType::from_name(&type_name).ok_or_else(|| {
            Error::syntax(format!("unknown data type '{}' for column '{}'", type_name, name))
        })?;
        self.advance();

        let mut column = Column::new(name, data_type);

        if self.consume(&Token::LParen) {
            if matches!(data_type, DataType::Enum | DataType::Set) {
                loop {
                    match self.parse_literal()? {
                        Literal::String(s) | Literal::Number(s) | Literal::Word(s) => {
                            column.members.push(s)
                        }
                        _ => return Err(Error::syntax("invalid ENUM/SET member")),
                    }
                    if !self.consume(&Token::Comma) {
                        break;
                    }
                }
            } else {
                column.length = Some(self.expect_size()?);
                if self.consume(&Token::Comma) {
                    column.scale = Some(self.expect_size()?);
                }
            }
            self.expect(&Token::RParen)?;
        }

        // Column constraints, in any order. Unknown modifiers are skipped.
        while !self.is_at_end() {
            if self.consume_keyword(Keyword::Not) {
                self.expect_keyword(Keyword::Null)?;
                column.nullable = false;
            } else if self.consume_keyword(Keyword::Null) {
                column.nullable = true;
            } else if self.consume_keyword(Keyword::Primary) {
                self.expect_word("KEY")?;
                column.primary_key = true;
            } else if self.consume_keyword(Keyword::Unique) {
                self.consume_word("KEY");
                column.unique = true;
            } else if self.consume_word("AUTO_INCREMENT") || self.consume_word("AUTOINCREMENT") {
                column.auto_increment = true;
            } else if self.consume_keyword(Keyword::Default) {
                let default = match self.parse_literal()? {
                    Literal::Null => ColumnDefault::Null,
                    Literal::CurrentTimestamp => ColumnDefault::CurrentTimestamp,
                    Literal::String(s) | Literal::Number(s) | Literal::Word(s) => {
                        ColumnDefault::Literal(s)
                    }
                    Literal::Default => return Err(Error::syntax("invalid DEFAULT value")),
                };
                column.default_value = Some(default);
            } else if self.consume_word("REFERENCES") {
                let table = self.parse_object_name()?;
                let referenced = if self.consume(&Token::LParen) {
                    let col = self.expect_identifier()?;
                    self.expect(&Token::RParen)?;
                    Some(col)
                } else {
                    None
                };
                column.foreign_key = Some(ForeignKeyRef {
                    table,
                    column: referenced,
                });
            } else {
                self.advance();
            }
        }

        Ok(column)
    }

    /// `ENGINE=...`, `[DEFAULT] CHARSET=...`, `CHARACTER SET ...`. Other
    /// options are skipped.
    fn parse_table_options(&mut self, stmt: &mut CreateTableStatement) -> Result<()> {
        while !self.is_at_end() && !self.check(&Token::Semicolon) {
            if self.consume_word("ENGINE") {
                self.consume(&Token::Eq);
                stmt.engine = Some(self.option_value()?);
            } else if self.consume_word("CHARSET") {
                self.consume(&Token::Eq);
                stmt.charset = Some(self.option_value()?);
            } else if self.consume_word("CHARACTER") {
                self.expect_keyword(Keyword::Set)?;
                self.consume(&Token::Eq);
                stmt.charset = Some(self.option_value()?);
            } else {
                self.advance();
            }
        }
        Ok(())
    }

    fn option_value(&mut self) -> Result<String> {
        let value = match self.current() {
            Token::Identifier(s) | Token::StringLiteral(s) | Token::Number(s) => s.clone(),
            _ => return Err(self.unexpected("an option value")),
        };
        self.advance();
        Ok(value)
    }

    // ========== Other DDL ==========

    fn parse_drop_table(&mut self) -> Result<Statement> {
        self.expect_keyword(Keyword::Drop)?;
        self.expect_keyword(Keyword::Table)?;
        let if_exists = self.parse_if_exists()?;
        let table_name = self.parse_object_name()?;
        Ok(Statement::DropTable {
            table_name,
            if_exists,
        })
    }

    /// Only the table name is read; the alteration itself has no effect.
    fn parse_alter_table(&mut self) -> Result<Statement> {
        self.expect_word("ALTER")?;
        self.expect_keyword(Keyword::Table)?;
        let table_name = self.parse_object_name()?;
        self.position = self.tokens.len().saturating_sub(1);
        Ok(Statement::AlterTable { table_name })
    }

    fn parse_truncate_table(&mut self) -> Result<Statement> {
        self.expect_word("TRUNCATE")?;
        self.expect_keyword(Keyword::Table)?;
        let table_name = self.parse_object_name()?;
        Ok(Statement::TruncateTable { table_name })
    }

    fn parse_create_database(&mut self) -> Result<Statement> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_database_word()?;
        let if_not_exists = self.parse_if_not_exists()?;
        let name = self.expect_identifier()?;
        // Character set / collation options are accepted and ignored
        while !self.is_at_end() && !self.check(&Token::Semicolon) {
            self.advance();
        }
        Ok(Statement::CreateDatabase {
            name,
            if_not_exists,
        })
    }

    fn parse_drop_database(&mut self) -> Result<Statement> {
        self.expect_keyword(Keyword::Drop)?;
        self.expect_database_word()?;
        let if_exists = self.parse_if_exists()?;
        let name = self.expect_identifier()?;
        Ok(Statement::DropDatabase { name, if_exists })
    }

    fn expect_database_word(&mut self) -> Result<()> {
        if self.consume_keyword(Keyword::Database) || self.consume_keyword(Keyword::Schema) {
            Ok(())
        } else {
            Err(self.unexpected("DATABASE or SCHEMA"))
        }
    }

    fn parse_create_index(&mut self) -> Result<CreateIndexStatement> {
        self.expect_keyword(Keyword::Create)?;
        let unique = self.consume_keyword(Keyword::Unique);
        self.expect_word("INDEX")?;
        let index_name = self.expect_identifier()?;
        self.expect_keyword(Keyword::On)?;
        let table_name = self.parse_object_name()?;

        self.expect(&Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.expect_identifier()?);
            // Prefix length and direction are accepted and ignored
            if self.consume(&Token::LParen) {
                self.expect_size()?;
                self.expect(&Token::RParen)?;
            }
            let _ = self.consume_keyword(Keyword::Asc) || self.consume_keyword(Keyword::Desc);
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;

        Ok(CreateIndexStatement {
            index_name,
            table_name,
            columns,
            unique,
        })
    }

    fn parse_drop_index(&mut self) -> Result<Statement> {
        self.expect_keyword(Keyword::Drop)?;
        self.expect_word("INDEX")?;
        let index_name = self.expect_identifier()?;
        let table_name = if self.consume_keyword(Keyword::On) {
            Some(self.parse_object_name()?)
        } else {
            None
        };
        Ok(Statement::DropIndex {
            index_name,
            table_name,
        })
    }

    fn parse_explain(&mut self) -> Result<Statement> {
        self.expect_word("EXPLAIN")?;
        let end = self.tokens.len().saturating_sub(1);
        let inner = join_tokens(&self.tokens[self.position..end]);
        let kind = match classify(&inner) {
            Ok(StatementKind::Explain) => return Err(Error::syntax("EXPLAIN cannot be nested")),
            Ok(kind) => kind,
            Err(Error::EmptyStatement) => return Err(Error::syntax("EXPLAIN requires a statement")),
            Err(e) => return Err(e),
        };
        let stmt = self.parse(kind)?;
        Ok(Statement::Explain(Box::new(stmt)))
    }

    // ========== Helper functions ==========

    fn parse_if_not_exists(&mut self) -> Result<bool> {
        if self.consume_word("IF") {
            self.expect_keyword(Keyword::Not)?;
            self.expect_word("EXISTS")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn parse_if_exists(&mut self) -> Result<bool> {
        if self.consume_word("IF") {
            self.expect_word("EXISTS")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// `name` or `db.name`; the qualifier is dropped.
    fn parse_object_name(&mut self) -> Result<String> {
        let mut name = self.expect_identifier()?;
        if self.consume(&Token::Dot) {
            name = self.expect_identifier()?;
        }
        Ok(name)
    }

    /// `col` or `table.col`
    fn parse_column_ref(&mut self) -> Result<String> {
        self.parse_object_name()
    }

    fn parse_literal_list(&mut self) -> Result<Vec<Literal>> {
        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        Ok(values)
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.current().clone() {
            Token::StringLiteral(s) => Literal::String(s),
            Token::Number(n) => Literal::Number(n),
            Token::Keyword(Keyword::Null) => Literal::Null,
            Token::Keyword(Keyword::Default) => Literal::Default,
            Token::Plus | Token::Minus => {
                let negative = self.check(&Token::Minus);
                self.advance();
                match self.current().clone() {
                    Token::Number(n) if negative => Literal::Number(format!("-{}", n)),
                    Token::Number(n) => Literal::Number(n),
                    _ => return Err(self.unexpected("a number")),
                }
            }
            Token::Identifier(word) if word.eq_ignore_ascii_case("CURRENT_TIMESTAMP") => {
                self.advance();
                if self.consume(&Token::LParen) {
                    self.expect(&Token::RParen)?;
                }
                return Ok(Literal::CurrentTimestamp);
            }
            Token::Identifier(word)
                if word.eq_ignore_ascii_case("NOW") && self.peek() == Some(&Token::LParen) =>
            {
                self.advance();
                self.expect(&Token::LParen)?;
                self.expect(&Token::RParen)?;
                return Ok(Literal::CurrentTimestamp);
            }
            Token::Identifier(word) => Literal::Word(word),
            _ => return Err(self.unexpected("a value")),
        };
        self.advance();
        Ok(literal)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position + 1)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        self.current() == token
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_word(&mut self, word: &str) -> bool {
        if self.current().is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.consume(token) {
            Ok(())
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.consume_word(word) {
            Ok(())
        } else {
            Err(self.unexpected(word))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Non-negative integer used by LIMIT / OFFSET
    fn expect_count(&mut self) -> Result<usize> {
        match self.current().clone() {
            Token::Number(n) => {
                let count = n
                    .parse::<usize>()
                    .map_err(|_| Error::syntax(format!("invalid row count '{}'", n)))?;
                self.advance();
                Ok(count)
            }
            _ => Err(self.unexpected("a row count")),
        }
    }

    /// Type length or scale, e.g. the 100 of `VARCHAR(100)`
    fn expect_size(&mut self) -> Result<u32> {
        match self.current().clone() {
            Token::Number(n) => {
                let size = n
                    .parse::<u32>()
                    .map_err(|_| Error::syntax(format!("invalid type size '{}'", n)))?;
                self.advance();
                Ok(size)
            }
            _ => Err(self.unexpected("a type size")),
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::syntax(format!("expected {} but found {}", expected, self.current()))
    }
}

/// A WHERE segment that doesn't parse is kept and evaluates to true.
fn predicate_from_tokens(segment: Vec<Token>) -> Predicate {
    let text = join_tokens(&segment);
    match Parser::from_tokens(segment).parse_predicate() {
        Ok(predicate) => predicate,
        Err(_) => {
            warn!(predicate = %text, "unrecognized WHERE predicate, treating as true");
            Predicate::Unrecognized(text)
        }
    }
}

fn constraint_kind(token: &Token) -> Option<ConstraintKind> {
    match token {
        Token::Keyword(Keyword::Primary) => Some(ConstraintKind::PrimaryKey),
        Token::Keyword(Keyword::Unique) => Some(ConstraintKind::UniqueKey),
        t if t.is_word("FOREIGN") => Some(ConstraintKind::ForeignKey),
        t if t.is_word("CHECK") => Some(ConstraintKind::Check),
        t if t.is_word("KEY") || t.is_word("INDEX") || t.is_word("FULLTEXT") => {
            Some(ConstraintKind::Index)
        }
        _ => None,
    }
}

/// Recognize a table-level constraint clause inside CREATE TABLE.
fn table_constraint(definition: &[Token]) -> Option<TableConstraint> {
    let first = definition.first()?;

    let kind = if first.is_word("CONSTRAINT") {
        definition
            .iter()
            .skip(1)
            .take(2)
            .find_map(constraint_kind)
            .unwrap_or(ConstraintKind::Check)
    } else {
        // A column may itself be called `key` or `index`
        let typed_column = matches!(
            definition.get(1),
            Some(Token::Identifier(word)) if DataType::from_name(word).is_some()
        );
        if typed_column {
            return None;
        }
        constraint_kind(first)?
    };

    Some(TableConstraint {
        kind,
        definition: join_tokens(definition),
    })
}
