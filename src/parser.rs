//! Clause grammars using nom.
//!
//! The translator does not parse whole statements. These parsers recognise
//! the handful of multi-token clauses whose shape must be understood to be
//! rewritten, always on lowercased code:
//!
//! ```text
//! lateral view [outer] explode(<expr>) <table> as <col>[, <col>]
//! (cross | left [outer]) join unnest(<expr>) [as] <alias>[ (<col>, ...)][ on true]
//! over (<window>)
//! epoch from <expr>
//! <expr> using parameters percentile = <p>
//! ```

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, recognize, rest, value, verify},
    error::{Error, ErrorKind},
    multi::separated_list1,
    sequence::{delimited, preceded, terminated, tuple},
};

use crate::scan;

/// Words that end a FROM item and therefore can never be an alias.
const RESERVED: &[&str] = &[
    "as", "on", "where", "group", "order", "having", "limit", "union", "cross", "left", "right",
    "inner", "full", "join", "lateral", "window", "select", "from", "using",
];

/// `lateral view [outer] explode(source) table as columns`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LateralView<'a> {
    pub outer: bool,
    pub source: &'a str,
    pub table: &'a str,
    pub columns: Vec<&'a str>,
}

/// `cross join unnest(source) as alias (columns)`; `left` marks `left join ... on true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnnestJoin<'a> {
    pub left: bool,
    pub source: &'a str,
    pub alias: &'a str,
    pub columns: Vec<&'a str>,
}

pub fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn alias(input: &str) -> IResult<&str, &str> {
    verify(identifier, |name: &str| !RESERVED.contains(&name))(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0)(input)
}

/// A balanced `( ... )` group; yields the text between the parentheses.
pub fn parenthesized(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('(') {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Char)));
    }
    match scan::matching_close(input, 0) {
        Some(close) => Ok((&input[close + 1..], &input[1..close])),
        None => Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil))),
    }
}

/// Parse a Hive `LATERAL VIEW` clause.
pub fn lateral_view(input: &str) -> IResult<&str, LateralView<'_>> {
    let (input, _) = tag("lateral")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag("view")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, outer) = map(opt(terminated(tag("outer"), multispace1)), |o| o.is_some())(input)?;
    let (input, _) = tag("explode")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, source) = parenthesized(input)?;
    let (input, _) = multispace1(input)?;
    let (input, table) = alias(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag("as")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, columns) = separated_list1(comma, alias)(input)?;

    Ok((
        input,
        LateralView {
            outer,
            source,
            table,
            columns,
        },
    ))
}

/// Parse a Presto/Vertica `CROSS JOIN UNNEST` (or `LEFT JOIN UNNEST ... ON TRUE`) clause.
pub fn unnest_join(input: &str) -> IResult<&str, UnnestJoin<'_>> {
    let (input, left) = alt((value(false, tag("cross")), value(true, tag("left"))))(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = opt(terminated(tag("outer"), multispace1))(input)?;
    let (input, _) = tag("join")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag("unnest")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, source) = parenthesized(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = opt(terminated(tag("as"), multispace1))(input)?;
    let (input, alias_name) = alias(input)?;
    let (input, columns) = opt(preceded(
        multispace0,
        delimited(
            terminated(char('('), multispace0),
            separated_list1(comma, alias),
            preceded(multispace0, char(')')),
        ),
    ))(input)?;
    let (input, _) = if left {
        opt(tuple((multispace1, tag("on"), multispace1, tag("true"))))(input)?
    } else {
        (input, None)
    };

    Ok((
        input,
        UnnestJoin {
            left,
            source,
            alias: alias_name,
            columns: columns.unwrap_or_default(),
        },
    ))
}

/// Recognise a window clause ` over (...)` at the start of `input`.
pub fn over_clause(input: &str) -> IResult<&str, &str> {
    recognize(tuple((multispace0, tag("over"), multispace0, parenthesized)))(input)
}

/// The expression of `extract(epoch from <expr>)` arguments.
pub fn epoch_source(args: &str) -> Option<&str> {
    let parsed: IResult<&str, &str> = preceded(
        tuple((multispace0, tag("epoch"), multispace1, tag("from"), multispace1)),
        rest,
    )(args);
    parsed.ok().map(|(_, source)| source.trim())
}

/// The unit name inside a quoted literal such as `'day'`.
pub fn quoted_word(arg: &str) -> Option<&str> {
    let parsed: IResult<&str, &str> = all_consuming(delimited(
        char('\''),
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        char('\''),
    ))(arg.trim());
    parsed.ok().map(|(_, word)| word)
}

/// Split Vertica percentile arguments `x using parameters percentile = p`.
pub fn percentile_parameters(args: &str) -> Option<(&str, &str)> {
    let at = args.rfind("using")?;
    let parsed: IResult<&str, &str> = preceded(
        tuple((
            tag("using"),
            multispace1,
            tag("parameters"),
            multispace1,
            tag("percentile"),
            multispace0,
            char('='),
            multispace0,
        )),
        rest,
    )(&args[at..]);
    let (_, percentile) = parsed.ok()?;
    let expr = args[..at].trim();
    (!expr.is_empty()).then_some((expr, percentile.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lateral_view() {
        let (rest, view) = lateral_view("lateral view explode(split(a, ',')) t as col where x").unwrap();
        assert_eq!(rest, " where x");
        assert_eq!(
            view,
            LateralView {
                outer: false,
                source: "split(a, ',')",
                table: "t",
                columns: vec!["col"],
            }
        );
    }

    #[test]
    fn test_lateral_view_outer_map() {
        let (_, view) = lateral_view("lateral view outer explode(m) kv as k, v").unwrap();
        assert!(view.outer);
        assert_eq!(view.columns, vec!["k", "v"]);
    }

    #[test]
    fn test_lateral_view_requires_alias() {
        assert!(lateral_view("lateral view explode(m) where").is_err());
    }

    #[test]
    fn test_unnest_join() {
        let (rest, join) = unnest_join("cross join unnest(arr) as t (c)\nwhere").unwrap();
        assert_eq!(rest, "\nwhere");
        assert_eq!(join.alias, "t");
        assert_eq!(join.columns, vec!["c"]);

        let (_, join) = unnest_join("cross join unnest(m) as kv (k, v)").unwrap();
        assert_eq!(join.alias, "kv");
        assert_eq!(join.columns, vec!["k", "v"]);

        let (rest, join) = unnest_join("left join unnest(arr) x on true").unwrap();
        assert!(join.left);
        assert_eq!(join.alias, "x");
        assert!(join.columns.is_empty());
        assert_eq!(rest, "");
    }

    #[test]
    fn test_unnest_join_rejects_keyword_alias() {
        assert!(unnest_join("cross join unnest(arr) where x").is_err());
    }

    #[test]
    fn test_over_clause() {
        let (rest, window) = over_clause(" over (partition by a) as b").unwrap();
        assert_eq!(window, " over (partition by a)");
        assert_eq!(rest, " as b");
        assert!(over_clause(" overall(x)").is_err());
    }

    #[test]
    fn test_small_grammars() {
        assert_eq!(epoch_source(" epoch from ts "), Some("ts"));
        assert_eq!(epoch_source("year from ts"), None);
        assert_eq!(quoted_word(" 'day' "), Some("day"));
        assert_eq!(quoted_word("day"), None);
        assert_eq!(
            percentile_parameters("x using parameters percentile = 0.5"),
            Some(("x", "0.5"))
        );
    }
}
