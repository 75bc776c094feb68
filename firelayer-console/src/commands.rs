//! Console command parsing.
//!
//! Raw commands address the store by path; model commands go through the models
//! registered with the console. Literal values are read as JSON, falling back to
//! a bare string.

use firelayer::{
    json::json_to_bson,
    query::{FieldOp, OrderCondition, OrderDirection, WhereCondition},
};

use crate::error::{ConsoleError, ConsoleResult};

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `.help`
    Help,
    /// `.exit`, `.quit`
    Exit,
    /// `.history`
    History,
    /// `.clear`
    Clear,
    /// `.models`
    Models,
    /// `get <doc-path>`
    Get { path: String },
    /// `ls <collection-path> [limit]`
    List {
        collection: String,
        limit: Option<usize>,
    },
    /// `where <collection-path> <field> <op> <value>`
    Where {
        collection: String,
        condition: WhereCondition,
    },
    /// `order <collection-path> <field> [direction]`
    Order {
        collection: String,
        order: OrderCondition,
    },
    /// `find <Model> <id-or-path>`
    Find { model: String, target: String },
    /// `all <Model> [limit]`
    All { model: String, limit: Option<usize> },
    /// `first <Model>`
    First { model: String },
    /// `count <Model>`
    Count { model: String },
    /// `filter <Model> <field> <op> <value>`
    Filter {
        model: String,
        condition: WhereCondition,
    },
    /// `sort <Model> <field> [direction]`
    Sort { model: String, order: OrderCondition },
    /// `rel <Model> <id-or-path> <accessor>`
    Related {
        model: String,
        target: String,
        accessor: String,
    },
}

/// Returns `true` for REPL dot-commands.
pub fn is_command(line: &str) -> bool {
    line.trim().starts_with('.')
}

/// Parses one console line.
pub fn parse(line: &str) -> ConsoleResult<Command> {
    let line = line.trim();
    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(head, rest)| (head, rest.trim()));

    match head.to_lowercase().as_str() {
        ".help" | ".h" | ".?" => Ok(Command::Help),
        ".exit" | ".quit" | ".q" => Ok(Command::Exit),
        ".history" => Ok(Command::History),
        ".clear" | ".cls" => Ok(Command::Clear),
        ".models" => Ok(Command::Models),
        "get" => {
            let [path] = words(rest, "get <doc-path>")?;
            Ok(Command::Get { path })
        }
        "ls" => {
            let (collection, limit) = target_and_limit(rest, "ls <collection-path> [limit]")?;
            Ok(Command::List { collection, limit })
        }
        "where" => {
            let (collection, condition) =
                target_and_condition(rest, "where <collection-path> <field> <op> <value>")?;
            Ok(Command::Where {
                collection,
                condition,
            })
        }
        "order" => {
            let (collection, order) =
                target_and_order(rest, "order <collection-path> <field> [direction]")?;
            Ok(Command::Order { collection, order })
        }
        "find" => {
            let [model, target] = words(rest, "find <Model> <id-or-path>")?;
            Ok(Command::Find { model, target })
        }
        "all" => {
            let (model, limit) = target_and_limit(rest, "all <Model> [limit]")?;
            Ok(Command::All { model, limit })
        }
        "first" => {
            let [model] = words(rest, "first <Model>")?;
            Ok(Command::First { model })
        }
        "count" => {
            let [model] = words(rest, "count <Model>")?;
            Ok(Command::Count { model })
        }
        "filter" => {
            let (model, condition) =
                target_and_condition(rest, "filter <Model> <field> <op> <value>")?;
            Ok(Command::Filter { model, condition })
        }
        "sort" => {
            let (model, order) = target_and_order(rest, "sort <Model> <field> [direction]")?;
            Ok(Command::Sort { model, order })
        }
        "rel" => {
            let [model, target, accessor] = words(rest, "rel <Model> <id-or-path> <accessor>")?;
            Ok(Command::Related {
                model,
                target,
                accessor,
            })
        }
        "" => Err(ConsoleError::Usage("empty command".to_string())),
        other => Err(ConsoleError::UnknownCommand(other.to_string())),
    }
}

/// Splits exactly `N` whitespace-separated words.
fn words<const N: usize>(rest: &str, usage: &str) -> ConsoleResult<[String; N]> {
    let parts: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
    parts
        .try_into()
        .map_err(|_| ConsoleError::Usage(usage.to_string()))
}

fn target_and_limit(rest: &str, usage: &str) -> ConsoleResult<(String, Option<usize>)> {
    let mut parts = rest.split_whitespace();
    let target = parts
        .next()
        .ok_or_else(|| ConsoleError::Usage(usage.to_string()))?;
    let limit = parts
        .next()
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| ConsoleError::Usage(format!("invalid limit '{raw}': {usage}")))
        })
        .transpose()?;

    if parts.next().is_some() {
        return Err(ConsoleError::Usage(usage.to_string()));
    }

    Ok((target.to_string(), limit))
}

fn target_and_condition(rest: &str, usage: &str) -> ConsoleResult<(String, WhereCondition)> {
    let Some(([target, field, op], value)) = leading_words::<3>(rest) else {
        return Err(ConsoleError::Usage(usage.to_string()));
    };
    if value.is_empty() {
        return Err(ConsoleError::Usage(usage.to_string()));
    }

    let op: FieldOp = op.parse()?;
    Ok((
        target.to_string(),
        WhereCondition::new(field, op, json_to_bson(parse_literal(value))),
    ))
}

/// Takes `N` leading words; the remainder is kept verbatim so values may contain spaces.
fn leading_words<const N: usize>(rest: &str) -> Option<([&str; N], &str)> {
    let mut words = [""; N];
    let mut remaining = rest.trim_start();

    for word in words.iter_mut() {
        let (head, tail) = remaining.split_once(char::is_whitespace)?;
        *word = head;
        remaining = tail.trim_start();
    }

    Some((words, remaining.trim_end()))
}

fn target_and_order(rest: &str, usage: &str) -> ConsoleResult<(String, OrderCondition)> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let (target, field, direction) = match parts.as_slice() {
        [target, field] => (*target, *field, OrderDirection::default()),
        [target, field, direction] => {
            (*target, *field, direction.to_ascii_uppercase().parse()?)
        }
        _ => return Err(ConsoleError::Usage(usage.to_string())),
    };

    Ok((target.to_string(), OrderCondition::new(field, direction)))
}

/// Reads a value literal: JSON when it parses, a bare string otherwise.
pub fn parse_literal(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Help text for the console.
pub fn help() -> &'static str {
    r#"Console Commands
================

.help                                    Show this help
.exit                                    Leave the console
.history                                 Show recent commands
.clear                                   Clear the screen
.models                                  List registered models and relationships

Store paths
-----------
get <doc-path>                           Read one document, e.g. get books/b1
ls <collection-path> [limit]             List a collection, e.g. ls books/b1/tags
where <collection-path> <field> <op> <value>
                                         Filter a collection
order <collection-path> <field> [dir]    Order a collection (ASCENDING|DESCENDING)

Models
------
find <Model> <id-or-path>                Load one entity
all <Model> [limit]                      List the top-level collection
first <Model>                            First entity of the collection
count <Model>                            Number of entities
filter <Model> <field> <op> <value>      Filter the collection
sort <Model> <field> [dir]               Order the collection
rel <Model> <id-or-path> <accessor>      Follow a relationship

Operators: == != < <= > >= array-contains array-contains-any in not-in
Values are JSON literals; anything else is read as a string."#
}
