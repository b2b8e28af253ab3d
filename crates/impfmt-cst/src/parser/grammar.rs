// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! PEG grammar over the token stream.
//!
//! Statements and expressions are validated in full, but the skeleton stays
//! flat: an expression becomes a run of leaves, bracketed atoms, attribute
//! chains and trailers. Operator precedence is not recorded since nothing
//! downstream evaluates expressions. Parameter lists, class bases and `case`
//! patterns are accepted as balanced token runs.
//!
//! Rules produce an owned [`Syn`] skeleton that references tokens by index.
//! Backtracking therefore never leaves garbage in the arena; the skeleton is
//! turned into a [`Tree`] once the parse has succeeded.

use std::fmt;

use peg::{Parse, ParseElem, RuleResult};

use crate::nodes::{Leaf, NodeId, SyntaxKind, Tree};
use crate::tokenizer::{TokType, Token};

/// The token vector the grammar runs over.
#[derive(Debug, Clone, Default)]
pub struct TokVec(Vec<Token>);

impl From<Vec<Token>> for TokVec {
    fn from(tokens: Vec<Token>) -> Self {
        TokVec(tokens)
    }
}

impl TokVec {
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }
}

/// A token reference as seen by grammar rules.
#[derive(Debug, Clone, Copy)]
pub struct Tok<'a> {
    pub index: usize,
    pub token: &'a Token,
}

/// Position reported in parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLoc {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for ParseLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Parse for TokVec {
    type PositionRepr = ParseLoc;

    fn start(&self) -> usize {
        0
    }

    fn is_eof(&self, pos: usize) -> bool {
        pos >= self.0.len()
    }

    fn position_repr(&self, pos: usize) -> Self::PositionRepr {
        match self.0.get(pos).or_else(|| self.0.last()) {
            Some(token) => ParseLoc {
                line: token.line,
                column: token.column,
            },
            None => ParseLoc { line: 1, column: 0 },
        }
    }
}

impl<'input> ParseElem<'input> for TokVec {
    type Element = Tok<'input>;

    fn parse_elem(&'input self, pos: usize) -> RuleResult<Self::Element> {
        match self.0.get(pos) {
            Some(token) => RuleResult::Matched(pos + 1, Tok { index: pos, token }),
            None => RuleResult::Failed,
        }
    }
}

/// Parse skeleton: token indices arranged into grammar productions.
#[derive(Debug, Clone)]
pub enum Syn {
    Leaf(usize),
    Node(SyntaxKind, Vec<Syn>),
}

fn leaf(tok: Tok<'_>) -> Syn {
    Syn::Leaf(tok.index)
}

fn node(kind: SyntaxKind, parts: Vec<Syn>) -> Syn {
    Syn::Node(kind, parts)
}

fn prepend(first: Syn, rest: Vec<Vec<Syn>>) -> Vec<Syn> {
    let mut parts = vec![first];
    parts.extend(rest.into_iter().flatten());
    parts
}

fn led_by(tok: Tok<'_>, rest: Vec<Syn>) -> Vec<Syn> {
    let mut parts = Vec::with_capacity(rest.len() + 1);
    parts.push(leaf(tok));
    parts.extend(rest);
    parts
}

fn join(parts: Vec<Vec<Syn>>) -> Vec<Syn> {
    parts.into_iter().flatten().collect()
}

fn listed(first: Vec<Syn>, rest: Vec<Vec<Syn>>, trailing: Option<Tok<'_>>) -> Vec<Syn> {
    let mut parts = first;
    parts.extend(rest.into_iter().flatten());
    parts.extend(trailing.map(leaf));
    parts
}

fn bracketed(kind: SyntaxKind, open: Tok<'_>, items: Vec<Syn>, close: Tok<'_>) -> Syn {
    let mut parts = Vec::with_capacity(items.len() + 2);
    parts.push(leaf(open));
    parts.extend(items);
    parts.push(leaf(close));
    node(kind, parts)
}

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const AUGMENTED_ASSIGN_OPS: &[&str] = &[
    "+=", "-=", "*=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=", "^=", "|=", "@=",
];

const COMPARISON_OPS: &[&str] = &["==", "!=", "<>", "<", ">", "<=", ">="];

const BINARY_OPS: &[&str] = &[
    "|", "^", "&", "<<", ">>", "+", "-", "*", "/", "//", "%", "@", "**",
];

const UNARY_OPS: &[&str] = &["+", "-", "~"];

fn is_keyword(value: &str) -> bool {
    KEYWORDS.contains(&value)
}

fn is_closing(value: &str) -> bool {
    matches!(value, ")" | "]" | "}")
}

fn is_opening(value: &str) -> bool {
    matches!(value, "(" | "[" | "{")
}

/// Tokens that may appear bare in a small statement.
fn is_plain(token: &Token) -> bool {
    match token.kind {
        TokType::Newline | TokType::Indent | TokType::Dedent | TokType::EndMarker => false,
        TokType::Op => {
            token.value != ";" && !is_opening(&token.value) && !is_closing(&token.value)
        }
        _ => true,
    }
}

/// Tokens that may appear bare inside brackets.
fn is_inner(token: &Token) -> bool {
    match token.kind {
        TokType::Newline | TokType::Indent | TokType::Dedent | TokType::EndMarker => false,
        TokType::Op => !is_opening(&token.value) && !is_closing(&token.value),
        _ => true,
    }
}

peg::parser! {
    pub grammar python() for TokVec {
        pub rule file() -> Syn
            = body:statement()* end:tok(TokType::EndMarker, "end of file")
            {
                let mut parts = body;
                parts.push(leaf(end));
                node(SyntaxKind::Module, parts)
            }

        #[cache]
        rule statement() -> Syn
            = compound_statement() / simple_statement()

        // --------------------------------------------------------------------
        // Simple statements
        // --------------------------------------------------------------------

        rule simple_statement() -> Syn
            = first:small_statement()
              rest:(sep:lit(";") s:small_statement() { vec![leaf(sep), s] })*
              trailing:lit(";")?
              nl:tok(TokType::Newline, "NEWLINE")
            {
                let mut parts = prepend(first, rest);
                if let Some(t) = trailing {
                    parts.push(leaf(t));
                }
                parts.push(leaf(nl));
                node(SyntaxKind::SimpleStatement, parts)
            }

        rule small_statement() -> Syn
            = import_from() / import_name() / expression_statement()

        rule import_name() -> Syn
            = kw:lit("import") names:dotted_as_names()
            { node(SyntaxKind::ImportName, vec![leaf(kw), names]) }

        rule dotted_as_names() -> Syn
            = first:dotted_as_name()
              rest:(c:lit(",") n:dotted_as_name() { vec![leaf(c), n] })*
            { node(SyntaxKind::DottedAsNames, prepend(first, rest)) }

        rule dotted_as_name() -> Syn
            = dotted:dotted_name()
              alias:(a:lit("as") n:name() { vec![leaf(a), leaf(n)] })?
            { node(SyntaxKind::DottedAsName, prepend(dotted, alias.into_iter().collect())) }

        rule dotted_name() -> Syn
            = first:name()
              rest:(d:lit(".") n:name() { vec![leaf(d), leaf(n)] })*
            { node(SyntaxKind::DottedName, prepend(leaf(first), rest)) }

        rule import_from() -> Syn
            = kw:lit("from") source:import_source() imp:lit("import") names:import_targets()
            { node(SyntaxKind::ImportFrom, vec![leaf(kw), source, leaf(imp), names]) }

        rule import_source() -> Syn
            = dots:dot()* dotted:dotted_name()
            {
                let mut parts: Vec<Syn> = dots.into_iter().map(leaf).collect();
                parts.push(dotted);
                node(SyntaxKind::ImportSource, parts)
            }
            / dots:dot()+
            { node(SyntaxKind::ImportSource, dots.into_iter().map(leaf).collect()) }

        rule dot() -> Tok<'input>
            = lit(".") / lit("...")

        rule import_targets() -> Syn
            = star:lit("*")
            { node(SyntaxKind::ImportAsNames, vec![leaf(star)]) }
            / open:lit("(") names:import_as_name_list() trailing:lit(",")? close:lit(")")
            {
                let mut parts = vec![leaf(open)];
                parts.extend(names);
                if let Some(t) = trailing {
                    parts.push(leaf(t));
                }
                parts.push(leaf(close));
                node(SyntaxKind::ImportAsNames, parts)
            }
            / names:import_as_name_list()
            { node(SyntaxKind::ImportAsNames, names) }

        rule import_as_name_list() -> Vec<Syn>
            = first:import_as_name()
              rest:(c:lit(",") n:import_as_name() { vec![leaf(c), n] })*
            { prepend(first, rest) }

        rule import_as_name() -> Syn
            = n:name() alias:(a:lit("as") m:name() { vec![leaf(a), leaf(m)] })?
            { node(SyntaxKind::ImportAsName, prepend(leaf(n), alias.into_iter().collect())) }

        rule expression_statement() -> Syn
            = parts:(keyword_statement() / type_alias() / expr_statement())
            { node(SyntaxKind::SmallStatement, parts) }

        rule keyword_statement() -> Vec<Syn>
            = kw:(lit("pass") / lit("break") / lit("continue"))
            { vec![leaf(kw)] }
            / kw:lit("return") value:star_expressions()?
            { led_by(kw, value.unwrap_or_default()) }
            / kw:lit("raise") value:raise_value()?
            { led_by(kw, value.unwrap_or_default()) }
            / kw:(lit("global") / lit("nonlocal")) first:name()
              rest:(c:lit(",") n:name() { vec![leaf(c), leaf(n)] })*
            { led_by(kw, prepend(leaf(first), rest)) }
            / kw:lit("del") value:targets()
            { led_by(kw, value) }
            / kw:lit("assert") test:expression()
              message:(c:lit(",") m:expression() { led_by(c, m) })?
            { join(vec![led_by(kw, test), message.unwrap_or_default()]) }
            / yield_expression()

        rule raise_value() -> Vec<Syn>
            = exc:expression() cause:(f:lit("from") c:expression() { led_by(f, c) })?
            { join(vec![exc, cause.unwrap_or_default()]) }

        rule type_alias() -> Vec<Syn>
            = kw:lit("type") n:name() tparams:type_params()? eq:lit("=") value:expression()
            {
                let mut parts = vec![leaf(kw), leaf(n)];
                parts.extend(tparams);
                parts.push(leaf(eq));
                parts.extend(value);
                parts
            }

        rule expr_statement() -> Vec<Syn>
            = target:star_expressions() tail:assignment_tail()
            { join(vec![target, tail]) }

        // An annotation needs a type after the colon, so a line can never end
        // in a bare `:` here.
        rule assignment_tail() -> Vec<Syn>
            = colon:lit(":") annotation:expression()
              value:(eq:lit("=") v:assigned_value() { led_by(eq, v) })?
            { join(vec![led_by(colon, annotation), value.unwrap_or_default()]) }
            / op:operator(AUGMENTED_ASSIGN_OPS) value:assigned_value()
            { led_by(op, value) }
            / values:(eq:lit("=") v:assigned_value() { led_by(eq, v) })*
            { join(values) }

        rule assigned_value() -> Vec<Syn>
            = yield_expression() / star_expressions()

        // --------------------------------------------------------------------
        // Expressions
        // --------------------------------------------------------------------

        rule yield_expression() -> Vec<Syn>
            = kw:lit("yield") f:lit("from") value:expression()
            { join(vec![vec![leaf(kw), leaf(f)], value]) }
            / kw:lit("yield") value:star_expressions()?
            { led_by(kw, value.unwrap_or_default()) }

        rule star_expressions() -> Vec<Syn>
            = first:star_expression()
              rest:(c:lit(",") e:star_expression() { led_by(c, e) })*
              trailing:lit(",")?
            { listed(first, rest, trailing) }

        rule star_expression() -> Vec<Syn>
            = star:lit("*") value:bitwise() { led_by(star, value) }
            / expression()

        rule named_expression() -> Vec<Syn>
            = n:name() op:lit(":=") value:expression()
            { join(vec![vec![leaf(n), leaf(op)], value]) }
            / expression()

        #[cache]
        rule expression() -> Vec<Syn>
            = lambda_def()
            / body:disjunction()
              cond:(i:lit("if") test:disjunction() e:lit("else") other:expression()
                    { join(vec![led_by(i, test), led_by(e, other)]) })?
            { join(vec![body, cond.unwrap_or_default()]) }

        rule lambda_def() -> Vec<Syn>
            = kw:lit("lambda") params:lambda_params()? colon:lit(":") body:expression()
            { join(vec![led_by(kw, params.unwrap_or_default()), led_by(colon, body)]) }

        rule lambda_params() -> Vec<Syn>
            = first:lambda_param()
              rest:(c:lit(",") p:lambda_param() { led_by(c, p) })*
              trailing:lit(",")?
            { listed(first, rest, trailing) }

        rule lambda_param() -> Vec<Syn>
            = op:lit("**") n:name() { vec![leaf(op), leaf(n)] }
            / op:lit("*") n:name()? { led_by(op, n.into_iter().map(leaf).collect()) }
            / op:lit("/") { vec![leaf(op)] }
            / n:name() default:(eq:lit("=") e:expression() { led_by(eq, e) })?
            { led_by(n, default.unwrap_or_default()) }

        rule disjunction() -> Vec<Syn>
            = first:conjunction() rest:(op:lit("or") e:conjunction() { led_by(op, e) })*
            { join(vec![first, join(rest)]) }

        rule conjunction() -> Vec<Syn>
            = first:inversion() rest:(op:lit("and") e:inversion() { led_by(op, e) })*
            { join(vec![first, join(rest)]) }

        rule inversion() -> Vec<Syn>
            = op:lit("not") value:inversion() { led_by(op, value) }
            / comparison()

        rule comparison() -> Vec<Syn>
            = first:bitwise() rest:(op:comparison_op() e:bitwise() { join(vec![op, e]) })*
            { join(vec![first, join(rest)]) }

        rule comparison_op() -> Vec<Syn>
            = n:lit("not") i:lit("in") { vec![leaf(n), leaf(i)] }
            / i:lit("is") n:lit("not") { vec![leaf(i), leaf(n)] }
            / op:(lit("in") / lit("is") / operator(COMPARISON_OPS)) { vec![leaf(op)] }

        // Arithmetic, shift and bitwise operators share one level: precedence
        // does not change which token sequences are valid.
        #[cache]
        rule bitwise() -> Vec<Syn>
            = first:unary() rest:(op:operator(BINARY_OPS) e:unary() { led_by(op, e) })*
            { join(vec![first, join(rest)]) }

        rule unary() -> Vec<Syn>
            = op:operator(UNARY_OPS) value:unary() { led_by(op, value) }
            / kw:lit("await") value:primary() { led_by(kw, value) }
            / primary()

        rule primary() -> Vec<Syn>
            = base:primary_base() post:postfix()*
            { join(vec![base, post]) }

        rule primary_base() -> Vec<Syn>
            = first:name() rest:(d:lit(".") n:name_token() { vec![leaf(d), leaf(n)] })+
            { vec![node(SyntaxKind::Attribute, prepend(leaf(first), rest))] }
            / t:(name() / constant() / tok(TokType::Number, "number")) { vec![leaf(t)] }
            / strings:tok(TokType::String, "string")+ { strings.into_iter().map(leaf).collect() }
            / a:atom() { vec![a] }

        rule constant() -> Tok<'input>
            = lit("True") / lit("False") / lit("None") / lit("...")

        rule postfix() -> Syn
            = trailer() / !lit("{") a:atom() { a }

        rule trailer() -> Syn
            = d:lit(".") n:name_token()
            { node(SyntaxKind::Trailer, vec![leaf(d), leaf(n)]) }

        rule atom() -> Syn
            = open:lit("(") items:bracket_contents() close:lit(")")
            { bracketed(SyntaxKind::Atom, open, items, close) }
            / open:lit("[") items:bracket_contents() close:lit("]")
            { bracketed(SyntaxKind::Atom, open, items, close) }
            / open:lit("{") items:bracket_contents() close:lit("}")
            { bracketed(SyntaxKind::Atom, open, items, close) }

        // Calls, subscripts, displays and comprehensions share one shape.
        rule bracket_contents() -> Vec<Syn>
            = yield_expression()
            / items:bracket_items()? { items.unwrap_or_default() }

        rule bracket_items() -> Vec<Syn>
            = first:bracket_item()
              rest:(c:lit(",") i:bracket_item() { led_by(c, i) })*
              trailing:lit(",")?
            { listed(first, rest, trailing) }

        rule bracket_item() -> Vec<Syn>
            = op:(lit("**") / lit("*")) value:bitwise() { led_by(op, value) }
            / n:name() eq:lit("=") value:expression()
            { join(vec![vec![leaf(n), leaf(eq)], value]) }
            / entry:bracket_entry() comps:comp_for()*
            { join(vec![entry, join(comps)]) }

        rule bracket_entry() -> Vec<Syn>
            = lower:named_expression() upper:slice_tail()?
            { join(vec![lower, upper.unwrap_or_default()]) }
            / slice_tail()

        rule slice_tail() -> Vec<Syn>
            = colon:lit(":") upper:expression()?
              step:(c:lit(":") s:expression()? { led_by(c, s.unwrap_or_default()) })?
            { join(vec![led_by(colon, upper.unwrap_or_default()), step.unwrap_or_default()]) }

        rule comp_for() -> Vec<Syn>
            = a:lit("async")? f:lit("for") t:targets() i:lit("in") source:disjunction()
              conds:(k:lit("if") c:disjunction() { led_by(k, c) })*
            {
                let mut parts: Vec<Syn> = a.into_iter().map(leaf).collect();
                parts.push(leaf(f));
                parts.extend(t);
                parts.push(leaf(i));
                parts.extend(source);
                parts.extend(conds.into_iter().flatten());
                parts
            }

        rule targets() -> Vec<Syn>
            = first:target()
              rest:(c:lit(",") t:target() { led_by(c, t) })*
              trailing:lit(",")?
            { listed(first, rest, trailing) }

        rule target() -> Vec<Syn>
            = star:lit("*") value:bitwise() { led_by(star, value) }
            / bitwise()

        // --------------------------------------------------------------------
        // Loose token runs: parameters, class bases and case patterns
        // --------------------------------------------------------------------

        rule pattern_item() -> Syn
            = loose_atom() / attribute() / trailer() / t:plain_token() { leaf(t) }

        rule header_item() -> Syn
            = !lit(":") item:pattern_item() { item }

        rule inner_item() -> Syn
            = loose_atom() / attribute() / trailer() / t:inner_token() { leaf(t) }

        rule attribute() -> Syn
            = first:name_token()
              rest:(d:lit(".") n:name_token() { vec![leaf(d), leaf(n)] })+
            { node(SyntaxKind::Attribute, prepend(leaf(first), rest)) }

        rule loose_atom() -> Syn
            = open:lit("(") items:inner_item()* close:lit(")")
            { bracketed(SyntaxKind::Atom, open, items, close) }
            / open:lit("[") items:inner_item()* close:lit("]")
            { bracketed(SyntaxKind::Atom, open, items, close) }
            / open:lit("{") items:inner_item()* close:lit("}")
            { bracketed(SyntaxKind::Atom, open, items, close) }

        // --------------------------------------------------------------------
        // Compound statements
        // --------------------------------------------------------------------

        rule compound_statement() -> Syn
            = decorated() / funcdef() / classdef() / async_statement() / block_statement()

        rule decorated() -> Syn
            = decorators:decorator()+ def:(classdef() / funcdef() / async_statement())
            {
                let mut parts = decorators;
                parts.push(def);
                node(SyntaxKind::Decorated, parts)
            }

        rule decorator() -> Syn
            = at:lit("@") value:named_expression() nl:tok(TokType::Newline, "NEWLINE")
            {
                let mut parts = led_by(at, value);
                parts.push(leaf(nl));
                node(SyntaxKind::Decorator, parts)
            }

        rule funcdef() -> Syn
            = kw:lit("def") n:name() tparams:type_params()? params:parameters()
              ret:(arrow:lit("->") value:expression() { led_by(arrow, value) })?
              colon:lit(":") body:suite()
            {
                let mut parts = vec![leaf(kw), leaf(n)];
                parts.extend(tparams);
                parts.push(params);
                parts.extend(ret.into_iter().flatten());
                parts.push(leaf(colon));
                parts.push(body);
                node(SyntaxKind::FuncDef, parts)
            }

        rule type_params() -> Syn
            = open:lit("[") items:inner_item()* close:lit("]")
            { bracketed(SyntaxKind::Atom, open, items, close) }

        rule parameters() -> Syn
            = open:lit("(") items:inner_item()* close:lit(")")
            { bracketed(SyntaxKind::Parameters, open, items, close) }

        rule classdef() -> Syn
            = kw:lit("class") n:name() tparams:type_params()?
              bases:(open:lit("(") items:inner_item()* close:lit(")")
                     { bracketed(SyntaxKind::Atom, open, items, close) })?
              colon:lit(":") body:suite()
            {
                let mut parts = vec![leaf(kw), leaf(n)];
                parts.extend(tparams);
                parts.extend(bases);
                parts.push(leaf(colon));
                parts.push(body);
                node(SyntaxKind::ClassDef, parts)
            }

        rule async_statement() -> Syn
            = kw:lit("async") inner:(funcdef() / block_statement())
            { node(SyntaxKind::AsyncStatement, vec![leaf(kw), inner]) }

        rule block_statement() -> Syn
            = header:block_header() colon:lit(":") body:suite()
            {
                let (kw, items) = header;
                block(kw, items, colon, body)
            }

        rule block_header() -> (Tok<'input>, Vec<Syn>)
            = kw:(lit("if") / lit("elif") / lit("while")) test:named_expression()
            { (kw, test) }
            / kw:(lit("else") / lit("try") / lit("finally"))
            { (kw, Vec::new()) }
            / kw:lit("for") t:targets() i:lit("in") source:star_expressions()
            { (kw, join(vec![t, led_by(i, source)])) }
            / kw:lit("except") clause:except_clause()?
            { (kw, clause.unwrap_or_default()) }
            / kw:lit("with") items:with_items()
            { (kw, items) }
            / kw:soft_keyword() items:header_item()+
            { (kw, items) }

        rule soft_keyword() -> Tok<'input>
            = lit("match") / lit("case")

        rule except_clause() -> Vec<Syn>
            = star:lit("*")? first:expression()
              rest:(c:lit(",") e:expression() { led_by(c, e) })*
              alias:(a:lit("as") n:name() { vec![leaf(a), leaf(n)] })?
            {
                let mut parts: Vec<Syn> = star.into_iter().map(leaf).collect();
                parts.extend(first);
                parts.extend(rest.into_iter().flatten());
                parts.extend(alias.into_iter().flatten());
                parts
            }

        rule with_items() -> Vec<Syn>
            = open:lit("(") items:with_item_list() trailing:lit(",")? close:lit(")") &lit(":")
            {
                let mut inner = items;
                inner.extend(trailing.map(leaf));
                vec![bracketed(SyntaxKind::Atom, open, inner, close)]
            }
            / with_item_list()

        rule with_item_list() -> Vec<Syn>
            = first:with_item() rest:(c:lit(",") w:with_item() { led_by(c, w) })*
            { join(vec![first, join(rest)]) }

        rule with_item() -> Vec<Syn>
            = value:expression() alias:(a:lit("as") t:target() { led_by(a, t) })?
            { join(vec![value, alias.unwrap_or_default()]) }

        // A block header is only complete with an indented or inline body.
        rule suite() -> Syn
            = nl:tok(TokType::Newline, "NEWLINE") ind:tok(TokType::Indent, "INDENT")
              body:statement()+ ded:tok(TokType::Dedent, "DEDENT")
            {
                let mut parts = vec![leaf(nl), leaf(ind)];
                parts.extend(body);
                parts.push(leaf(ded));
                node(SyntaxKind::Suite, parts)
            }
            / simple_statement()

        // --------------------------------------------------------------------
        // Tokens
        // --------------------------------------------------------------------

        rule tok(kind: TokType, expected: &'static str) -> Tok<'input>
            = [t] {? if t.token.kind == kind { Ok(t) } else { Err(expected) } }

        rule lit(value: &'static str) -> Tok<'input>
            = [t] {?
                if matches!(t.token.kind, TokType::Name | TokType::Op) && t.token.value == value {
                    Ok(t)
                } else {
                    Err(value)
                }
            }

        rule name() -> Tok<'input>
            = [t] {?
                if t.token.kind == TokType::Name && !is_keyword(&t.token.value) {
                    Ok(t)
                } else {
                    Err("NAME")
                }
            }

        rule operator(ops: &'static [&'static str]) -> Tok<'input>
            = [t] {?
                if t.token.kind == TokType::Op && ops.contains(&t.token.value.as_str()) {
                    Ok(t)
                } else {
                    Err("operator")
                }
            }

        rule name_token() -> Tok<'input>
            = [t] {? if t.token.kind == TokType::Name { Ok(t) } else { Err("NAME") } }

        rule plain_token() -> Tok<'input>
            = [t] {? if is_plain(t.token) { Ok(t) } else { Err("expression") } }

        rule inner_token() -> Tok<'input>
            = [t] {? if is_inner(t.token) { Ok(t) } else { Err("expression") } }
    }
}

fn block(kw: Tok<'_>, items: Vec<Syn>, colon: Tok<'_>, body: Syn) -> Syn {
    let mut parts = vec![leaf(kw)];
    parts.extend(items);
    parts.push(leaf(colon));
    parts.push(body);
    node(SyntaxKind::BlockStatement, parts)
}

const ASSIGN_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=", "^=", "|=", "@=",
];

/// Materialize a parse skeleton into an arena tree.
pub fn build_tree(tokens: &TokVec, syn: Syn) -> Tree {
    let mut tree = Tree::empty();
    let root = build_node(&mut tree, tokens.tokens(), syn);
    tree.set_root(root);
    tree
}

fn build_node(tree: &mut Tree, tokens: &[Token], syn: Syn) -> NodeId {
    match syn {
        Syn::Leaf(index) => tree.new_leaf(Leaf::from(tokens[index].clone())),
        Syn::Node(kind, parts) => {
            let children: Vec<NodeId> = parts
                .into_iter()
                .map(|part| build_node(tree, tokens, part))
                .collect();
            let kind = if kind == SyntaxKind::SmallStatement
                && children.iter().any(|&child| {
                    tree.leaf(child).is_some_and(|leaf| {
                        leaf.kind == TokType::Op && ASSIGN_OPS.contains(&leaf.value.as_str())
                    })
                }) {
                SyntaxKind::Assignment
            } else {
                kind
            };
            tree.new_branch(kind, children)
        }
    }
}
