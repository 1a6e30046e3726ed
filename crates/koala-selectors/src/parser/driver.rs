//! The shift-reduce loop and the semantic actions of the selector grammar.

use core::str::FromStr;

use super::tables::{self, Action, Rule};
use crate::error::SyntaxError;
use crate::selector::{
    AttributeOperator, AttributeSelector, ChainBuilder, Combinator, PseudoSelector,
    SelectorChain, SelectorGroup, SimpleSelector,
};
use crate::tokenizer::{Token, TokenKind};

/// An entry on the value stack, parallel to the state stack.
#[derive(Debug)]
enum Value {
    /// A shifted terminal.
    Token(Token),
    /// `G`
    Group(Vec<SelectorChain>),
    /// `C`
    Chain(ChainBuilder),
    /// `K`
    Combinator(Combinator),
    /// `Q`
    Sequence(Vec<SimpleSelector>),
    /// `T`, `X`, `A`, `P`, `N`, `R`
    Simple(SimpleSelector),
}

/// Parse a token stream into a selector group.
///
/// `source` is only used to render the caret context of a [`SyntaxError`].
///
/// # Errors
///
/// Returns a [`SyntaxError`] at the first token for which the current parser
/// state has no action, listing the token kinds that state would accept.
pub fn parse(tokens: Vec<Token>, source: &str) -> Result<SelectorGroup, SyntaxError> {
    let end_position = source.chars().count();
    let mut input = tokens.into_iter();
    let mut next_token =
        move || input.next().unwrap_or_else(|| Token::new(TokenKind::End, "", end_position));

    let mut states: Vec<u8> = vec![0];
    let mut values: Vec<Value> = Vec::new();
    let mut lookahead = next_token();

    loop {
        let state = states.last().copied().unwrap_or(0);
        let reject = |token: &Token| {
            SyntaxError::new(source, token.position, token.kind, tables::expected(state))
        };

        match tables::action(state, lookahead.kind) {
            Some(Action::Shift(target)) => {
                values.push(Value::Token(lookahead));
                states.push(target);
                lookahead = next_token();
            }
            Some(Action::Reduce(rule)) => {
                let arity = rule.arity();
                if values.len() < arity || states.len() <= arity {
                    return Err(reject(&lookahead));
                }
                let arguments = values.split_off(values.len() - arity);
                states.truncate(states.len() - arity);

                let exposed = states.last().copied().unwrap_or(0);
                let (Some(value), Some(target)) = (
                    reduce(rule, Arguments(arguments.into_iter())),
                    tables::goto(exposed, rule.lhs()),
                ) else {
                    return Err(reject(&lookahead));
                };
                log::trace!(target: "koala::selectors", "reduce {rule:?} -> state {target}");
                values.push(value);
                states.push(target);
            }
            Some(Action::Accept) => {
                return match values.pop() {
                    Some(Value::Group(chains)) => Ok(SelectorGroup { chains }),
                    _ => Err(reject(&lookahead)),
                };
            }
            None => return Err(reject(&lookahead)),
        }
    }
}

/// The popped right-hand side of a rule, consumed left to right.
///
/// Each accessor yields `None` if the next value has the wrong shape, which
/// the tables rule out.
struct Arguments(std::vec::IntoIter<Value>);

impl Arguments {
    fn token(&mut self) -> Option<Token> {
        match self.0.next()? {
            Value::Token(token) => Some(token),
            _ => None,
        }
    }

    fn text(&mut self) -> Option<String> {
        self.token().map(|token| token.text)
    }

    fn skip(&mut self) -> Option<()> {
        self.0.next().map(|_| ())
    }

    fn group(&mut self) -> Option<Vec<SelectorChain>> {
        match self.0.next()? {
            Value::Group(chains) => Some(chains),
            _ => None,
        }
    }

    fn chain(&mut self) -> Option<ChainBuilder> {
        match self.0.next()? {
            Value::Chain(chain) => Some(chain),
            _ => None,
        }
    }

    fn combinator(&mut self) -> Option<Combinator> {
        match self.0.next()? {
            Value::Combinator(combinator) => Some(combinator),
            _ => None,
        }
    }

    fn sequence(&mut self) -> Option<Vec<SimpleSelector>> {
        match self.0.next()? {
            Value::Sequence(selectors) => Some(selectors),
            _ => None,
        }
    }

    fn simple(&mut self) -> Option<SimpleSelector> {
        match self.0.next()? {
            Value::Simple(selector) => Some(selector),
            _ => None,
        }
    }
}

/// Run the semantic action of `rule`.
fn reduce(rule: Rule, mut args: Arguments) -> Option<Value> {
    let value = match rule {
        Rule::GroupFromChain => Value::Group(vec![args.chain()?.finish()]),
        Rule::GroupAppend => {
            let mut chains = args.group()?;
            args.skip()?; // ,
            chains.push(args.chain()?.finish());
            Value::Group(chains)
        }

        Rule::ChainFromSequence => Value::Chain(ChainBuilder::new(args.sequence()?)),
        Rule::ChainLink => {
            let mut chain = args.chain()?;
            let combinator = args.combinator()?;
            chain.link(combinator, args.sequence()?);
            Value::Chain(chain)
        }

        Rule::CombinatorExplicit => {
            Value::Combinator(Combinator::from_str(&args.text()?).ok()?)
        }
        Rule::CombinatorDescendant => Value::Combinator(Combinator::Descendant),

        Rule::SequenceFromType | Rule::SequenceFromSuffix => {
            Value::Sequence(vec![args.simple()?])
        }
        Rule::SequenceAppend => {
            let mut selectors = args.sequence()?;
            selectors.push(args.simple()?);
            Value::Sequence(selectors)
        }

        Rule::TypeName => Value::Simple(SimpleSelector::Type(args.text()?)),
        Rule::TypeUniversal => Value::Simple(SimpleSelector::Universal),
        Rule::SuffixId | Rule::NegatedId => Value::Simple(SimpleSelector::Id(args.text()?)),
        Rule::SuffixClass | Rule::NegatedClass => {
            Value::Simple(SimpleSelector::Class(args.text()?))
        }
        Rule::SuffixAttribute
        | Rule::SuffixPseudo
        | Rule::SuffixNegation
        | Rule::NegatedType
        | Rule::NegatedAttribute
        | Rule::NegatedPseudo => Value::Simple(args.simple()?),

        Rule::AttributeExists => {
            args.skip()?; // [
            let name = args.text()?;
            Value::Simple(SimpleSelector::Attribute(AttributeSelector::Exists(name)))
        }
        Rule::AttributeIdentValue | Rule::AttributeStringValue => {
            args.skip()?; // [
            let name = args.text()?;
            let operator = AttributeOperator::from_str(&args.text()?).ok()?;
            let value = args.text()?;
            Value::Simple(SimpleSelector::Attribute(AttributeSelector::with_operator(
                name, operator, value,
            )))
        }

        Rule::PseudoIdent => {
            args.skip()?; // :
            Value::Simple(SimpleSelector::Pseudo(PseudoSelector::from_ident(
                &args.text()?,
            )))
        }
        Rule::PseudoFunction => {
            args.skip()?; // :
            let name = args.text()?;
            let argument = args.text()?;
            Value::Simple(SimpleSelector::Pseudo(PseudoSelector::from_function(
                &name, &argument,
            )))
        }
        Rule::Negation => {
            args.skip()?; // :
            args.skip()?; // not(
            Value::Simple(SimpleSelector::Negation(Box::new(args.simple()?)))
        }
    };
    Some(value)
}
