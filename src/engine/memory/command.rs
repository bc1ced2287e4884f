//! Command dialect understood by the in-memory engine.
//!
//! Supported forms (keywords are case-insensitive, a trailing `;` is ignored):
//!
//! ```text
//! SELECT [* | field, ...] FROM Class [WHERE cond]
//! SELECT literal, ...
//! INSERT INTO Class (field, ...) VALUES (operand, ...)
//! INSERT INTO Class SET field = operand, ...
//! UPDATE Class SET field = operand, ... [WHERE cond]
//! DELETE FROM Class [WHERE cond]
//! CREATE CLASS Name [EXTENDS Super]
//! CREATE PROPERTY Class.field TYPE [LinkedClass]
//! CREATE INDEX Class.field KIND
//! CREATE INDEX name ON Class (field, ...) KIND
//! ```
//!
//! Conditions are comparisons joined by `AND` / `OR` (`AND` binds tighter).
//! Operands are literals or `?` placeholders bound positionally.

use crate::engine::schema::{EngineType, IndexKind};
use crate::engine::{EngineError, EngineResult};
use crate::types::Value;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Operand {
    Literal(Value),
    Param(usize),
}

impl Operand {
    pub(crate) fn resolve(&self, args: &[Value]) -> EngineResult<Value> {
        match self {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Param(idx) => args.get(*idx).cloned().ok_or_else(|| {
                EngineError::Execution(format!("no value bound for parameter {}", idx + 1))
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Comparison {
    pub field: String,
    pub op: CompareOp,
    pub operand: Operand,
}

/// Disjunction of conjunctions.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Filter {
    pub any_of: Vec<Vec<Comparison>>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Command {
    Select {
        fields: Vec<String>,
        target: Option<String>,
        filter: Option<Filter>,
    },
    SelectLiterals {
        items: Vec<(String, Operand)>,
    },
    Insert {
        class: String,
        assignments: Vec<(String, Operand)>,
    },
    Update {
        class: String,
        assignments: Vec<(String, Operand)>,
        filter: Option<Filter>,
    },
    Delete {
        class: String,
        filter: Option<Filter>,
    },
    CreateClass {
        name: String,
        super_class: Option<String>,
    },
    CreateProperty {
        class: String,
        name: String,
        ty: EngineType,
        linked_class: Option<String>,
    },
    CreateIndex {
        name: String,
        class: String,
        fields: Vec<String>,
        kind: IndexKind,
    },
}

impl Command {
    /// Explicit projection list of a `SELECT`, if any.
    pub(crate) fn projections(&self) -> Option<Vec<String>> {
        match self {
            Command::Select { fields, .. } if !fields.is_empty() => Some(fields.clone()),
            Command::SelectLiterals { items } => {
                Some(items.iter().map(|(label, _)| label.clone()).collect())
            }
            _ => None,
        }
    }
}

pub(crate) fn parse(text: &str) -> EngineResult<Command> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        params: 0,
    };
    let command = parser.command()?;
    parser.eat(";");
    if let Some(token) = parser.peek() {
        return Err(parse_error(format!("unexpected token '{token}'")));
    }
    Ok(command)
}

fn parse_error(message: impl Into<String>) -> EngineError {
    EngineError::Parse(message.into())
}

fn tokenize(text: &str) -> EngineResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            buf.push(ch);
            if ch == '\\' {
                if let Some(next) = chars.next() {
                    buf.push(next);
                }
                continue;
            }
            if ch == q {
                quote = None;
                tokens.push(std::mem::take(&mut buf));
            }
            continue;
        }

        match ch {
            '\'' | '"' => {
                if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
                quote = Some(ch);
                buf.push(ch);
            }
            c if c.is_whitespace() => {
                if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
            }
            '(' | ')' | ',' | ';' | '?' | '*' => {
                if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
                tokens.push(ch.to_string());
            }
            '=' | '!' | '<' | '>' => {
                if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
                let mut op = String::new();
                op.push(ch);
                if let Some(next) = chars.peek() {
                    if (*next == '=') || (ch == '<' && *next == '>') {
                        op.push(*next);
                        chars.next();
                    }
                }
                tokens.push(op);
            }
            _ => buf.push(ch),
        }
    }

    if quote.is_some() {
        return Err(parse_error("unterminated string literal"));
    }
    if !buf.is_empty() {
        tokens.push(buf);
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<String>,
    pos: usize,
    params: usize,
}

impl Parser {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn next(&mut self) -> EngineResult<String> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| parse_error("unexpected end of command"))?;
        self.pos += 1;
        Ok(token)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek()
            .is_some_and(|token| token.eq_ignore_ascii_case(keyword))
    }

    fn eat(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, keyword: &str) -> EngineResult<()> {
        if self.eat(keyword) {
            return Ok(());
        }
        match self.peek() {
            Some(token) => Err(parse_error(format!(
                "expected '{keyword}' but found '{token}'"
            ))),
            None => Err(parse_error(format!("expected '{keyword}'"))),
        }
    }

    fn ident(&mut self) -> EngineResult<String> {
        let token = self.next()?;
        let valid = token
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '@' | '.'));
        if token.is_empty() || !valid {
            return Err(parse_error(format!("expected identifier but found '{token}'")));
        }
        Ok(token)
    }

    fn command(&mut self) -> EngineResult<Command> {
        let head = self.next()?;
        match head.to_ascii_uppercase().as_str() {
            "SELECT" => self.select(),
            "INSERT" => self.insert(),
            "UPDATE" => self.update(),
            "DELETE" => self.delete(),
            "CREATE" => self.create(),
            _ => Err(parse_error(format!("unknown command '{head}'"))),
        }
    }

    fn select(&mut self) -> EngineResult<Command> {
        if self.eat("*") {
            self.expect("FROM")?;
            return self.select_from(Vec::new());
        }
        if self.eat("FROM") {
            return self.select_from(Vec::new());
        }
        let mut raw = Vec::new();
        loop {
            raw.push(self.next()?);
            if !self.eat(",") {
                break;
            }
        }
        if self.eat("FROM") {
            return self.select_from(raw);
        }
        let mut items = Vec::with_capacity(raw.len());
        for token in raw {
            let operand = self.literal(&token)?;
            items.push((token, operand));
        }
        Ok(Command::SelectLiterals { items })
    }

    fn select_from(&mut self, fields: Vec<String>) -> EngineResult<Command> {
        let target = self.ident()?;
        let filter = self.filter()?;
        Ok(Command::Select {
            fields,
            target: Some(target),
            filter,
        })
    }

    fn insert(&mut self) -> EngineResult<Command> {
        self.expect("INTO")?;
        let class = self.ident()?;
        if self.eat("SET") {
            let assignments = self.assignments()?;
            return Ok(Command::Insert { class, assignments });
        }
        let fields = self.ident_list()?;
        self.expect("VALUES")?;
        self.expect("(")?;
        let mut values = Vec::new();
        loop {
            values.push(self.operand()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        if fields.len() != values.len() {
            return Err(parse_error(format!(
                "{} fields but {} values",
                fields.len(),
                values.len()
            )));
        }
        Ok(Command::Insert {
            class,
            assignments: fields.into_iter().zip(values).collect(),
        })
    }

    fn update(&mut self) -> EngineResult<Command> {
        let class = self.ident()?;
        self.expect("SET")?;
        let assignments = self.assignments()?;
        let filter = self.filter()?;
        Ok(Command::Update {
            class,
            assignments,
            filter,
        })
    }

    fn delete(&mut self) -> EngineResult<Command> {
        self.expect("FROM")?;
        let class = self.ident()?;
        let filter = self.filter()?;
        Ok(Command::Delete { class, filter })
    }

    fn create(&mut self) -> EngineResult<Command> {
        let what = self.next()?;
        match what.to_ascii_uppercase().as_str() {
            "CLASS" => {
                let name = self.ident()?;
                let super_class = if self.eat("EXTENDS") {
                    Some(self.ident()?)
                } else {
                    None
                };
                Ok(Command::CreateClass { name, super_class })
            }
            "PROPERTY" => {
                let (class, name) = self.qualified()?;
                let raw_ty = self.next()?;
                let ty = EngineType::parse(&raw_ty)
                    .ok_or_else(|| parse_error(format!("unknown type '{raw_ty}'")))?;
                let linked_class = if matches!(self.peek(), Some(";") | None) {
                    None
                } else {
                    Some(self.ident()?)
                };
                Ok(Command::CreateProperty {
                    class,
                    name,
                    ty,
                    linked_class,
                })
            }
            "INDEX" => {
                let head = self.ident()?;
                let (name, class, fields) = if self.eat("ON") {
                    let class = self.ident()?;
                    let fields = self.ident_list()?;
                    (head, class, fields)
                } else {
                    let (class, field) = split_qualified(&head)?;
                    (head.clone(), class, vec![field])
                };
                let raw_kind = self.next()?;
                let kind = IndexKind::parse(&raw_kind)
                    .ok_or_else(|| parse_error(format!("unknown index type '{raw_kind}'")))?;
                Ok(Command::CreateIndex {
                    name,
                    class,
                    fields,
                    kind,
                })
            }
            _ => Err(parse_error(format!("cannot create '{what}'"))),
        }
    }

    fn qualified(&mut self) -> EngineResult<(String, String)> {
        let token = self.ident()?;
        split_qualified(&token)
    }

    fn ident_list(&mut self) -> EngineResult<Vec<String>> {
        self.expect("(")?;
        let mut idents = Vec::new();
        loop {
            idents.push(self.ident()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        Ok(idents)
    }

    fn assignments(&mut self) -> EngineResult<Vec<(String, Operand)>> {
        let mut assignments = Vec::new();
        loop {
            let field = self.ident()?;
            self.expect("=")?;
            assignments.push((field, self.operand()?));
            if !self.eat(",") {
                break;
            }
        }
        Ok(assignments)
    }

    fn filter(&mut self) -> EngineResult<Option<Filter>> {
        if !self.eat("WHERE") {
            return Ok(None);
        }
        let mut any_of = Vec::new();
        let mut all_of = vec![self.comparison()?];
        loop {
            if self.eat("AND") {
                all_of.push(self.comparison()?);
            } else if self.eat("OR") {
                any_of.push(std::mem::take(&mut all_of));
                all_of.push(self.comparison()?);
            } else {
                break;
            }
        }
        any_of.push(all_of);
        Ok(Some(Filter { any_of }))
    }

    fn comparison(&mut self) -> EngineResult<Comparison> {
        let field = self.ident()?;
        let raw_op = self.next()?;
        let op = match raw_op.as_str() {
            "=" => CompareOp::Eq,
            "!=" | "<>" => CompareOp::Ne,
            "<" => CompareOp::Lt,
            "<=" => CompareOp::Le,
            ">" => CompareOp::Gt,
            ">=" => CompareOp::Ge,
            _ => return Err(parse_error(format!("unknown operator '{raw_op}'"))),
        };
        let operand = self.operand()?;
        Ok(Comparison { field, op, operand })
    }

    fn operand(&mut self) -> EngineResult<Operand> {
        let token = self.next()?;
        self.literal(&token)
    }

    fn literal(&mut self, token: &str) -> EngineResult<Operand> {
        if token == "?" {
            let idx = self.params;
            self.params += 1;
            return Ok(Operand::Param(idx));
        }
        parse_literal(token).map(Operand::Literal)
    }
}

fn split_qualified(token: &str) -> EngineResult<(String, String)> {
    match token.split_once('.') {
        Some((class, field)) if !class.is_empty() && !field.is_empty() => {
            Ok((class.to_owned(), field.to_owned()))
        }
        _ => Err(parse_error(format!(
            "expected Class.field but found '{token}'"
        ))),
    }
}

fn parse_literal(raw: &str) -> EngineResult<Value> {
    if let Some(quote) = raw.chars().next().filter(|c| *c == '\'' || *c == '"') {
        let inner = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
            .ok_or_else(|| parse_error(format!("malformed string literal {raw}")))?;
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(ch);
            }
        }
        return Ok(Value::String(out));
    }
    if raw.eq_ignore_ascii_case("null") {
        return Ok(Value::Null);
    }
    if raw.eq_ignore_ascii_case("true") {
        return Ok(Value::Bool(true));
    }
    if raw.eq_ignore_ascii_case("false") {
        return Ok(Value::Bool(false));
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Value::Int(int));
    }
    if let Ok(float) = raw.parse::<f64>() {
        return Ok(Value::Float(float));
    }
    Err(parse_error(format!("unexpected token '{raw}'")))
}
