//! Line-oriented catalog files (tile, prop and material inits).
//!
//! ```text
//! -["Walls", color(200, 40, 40)]
//! [#nm: "Brick", #sz: point(1, 1)]
//! [#nm: "Stone", #sz: point(2, 2)]
//! -Decor
//! [#nm: "Chain"]
//! ```
//!
//! A line starting with `-` opens a category; every other non-blank line is
//! an item belonging to the most recent category.
//!
//! Shipped catalogs carry stray tokens after an entry's closing bracket, so
//! lines are read with [`Trailing::Ignore`]. The nesting limit still applies.

use anyhow::{anyhow, bail, Context};
use either::Either;
use log::debug;

use crate::options::{Options, Trailing};
use crate::value::{Color, PropertyList, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub name: String,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// The `#nm` entry.
    pub name: String,
    pub data: PropertyList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub color: Option<Color>,
    pub items: Vec<Item>,
}

fn line_options() -> Options {
    Options::default().trailing(Trailing::Ignore)
}

fn parse_header(rest: &str) -> anyhow::Result<Header> {
    let rest = rest.trim();
    if !rest.starts_with('[') {
        if rest.is_empty() {
            bail!("category header has no name");
        }
        return Ok(Header {
            name: rest.to_string(),
            color: None,
        });
    }

    let value = crate::read_with(rest, &line_options())?;
    let fields = value
        .as_list()
        .ok_or_else(|| anyhow!("category header is a {}, not a linear list", value.type_name()))?;
    let name = fields
        .get(0)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("category header must start with a name string"))?;
    let color = match fields.get(1) {
        None => None,
        Some(Value::Color(color)) => Some(*color),
        Some(other) => bail!("category colour is a {}, not a Color", other.type_name()),
    };
    Ok(Header {
        name: name.to_string(),
        color,
    })
}

fn parse_item(line: &str) -> anyhow::Result<Item> {
    let value = crate::read_with(line, &line_options())?;
    let data = match value {
        Value::PropertyList(data) => data,
        other => bail!("item is a {}, not a property list", other.type_name()),
    };
    let name = data
        .get("nm")
        .ok_or_else(|| anyhow!("item has no #nm entry"))?
        .as_str()
        .ok_or_else(|| anyhow!("item #nm entry is not a string"))?
        .to_string();
    Ok(Item { name, data })
}

/// Classifies and reads a single line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<Either<Header, Item>>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let line = line.trim_start();
    let parsed = if let Some(rest) = line.strip_prefix('-') {
        Either::Left(parse_header(rest)?)
    } else {
        Either::Right(parse_item(line)?)
    };
    Ok(Some(parsed))
}

/// Reads a whole catalog, grouping items under their category headers.
pub fn read_init(text: &str) -> anyhow::Result<Vec<Category>> {
    let mut categories: Vec<Category> = vec![];
    for (i, line) in text.lines().enumerate() {
        let parsed = parse_line(line).with_context(|| format!("line {}", i + 1))?;
        match parsed {
            None => {}
            Some(Either::Left(header)) => {
                debug!("registered category {}", header.name);
                categories.push(Category {
                    name: header.name,
                    color: header.color,
                    items: vec![],
                });
            }
            Some(Either::Right(item)) => match categories.last_mut() {
                Some(category) => category.items.push(item),
                None => bail!("line {}: item '{}' appears before any category", i + 1, item.name),
            },
        }
    }
    Ok(categories)
}
