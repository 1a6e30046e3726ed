//! SLR(1) action and goto tables for the selector grammar.
//!
//! ```text
//! G -> C | G COMMA C                           selector group
//! C -> Q | C K Q                               chain
//! K -> COMBINATOR | S                          combinator
//! Q -> T | X | Q X                             simple selector sequence
//! T -> IDENT | STAR                            type selector
//! X -> HASH | CLASS | A | P | N                suffix selector
//! A -> [ IDENT ] | [ IDENT OP IDENT ] | [ IDENT OP STRING ]
//! P -> : IDENT | : FUNCTION ARGUMENT )
//! N -> : NOT R )
//! R -> T | HASH | CLASS | A | P                negation argument
//! ```
//!
//! Each state lists its shift (and accept) actions explicitly. A state has at
//! most one reduction, taken when the lookahead is in FOLLOW of the rule's
//! left-hand side and no explicit action applies. The tests at the bottom
//! check that the two never overlap.

use crate::tokenizer::TokenKind;

use Action::{Accept, Shift};
use NonTerminal as Nt;
use TokenKind as Tk;

/// Non-terminal symbols of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerminal {
    /// `G`: comma-separated list of chains.
    Group,
    /// `C`: sequences joined by combinators.
    Chain,
    /// `K`: one combinator.
    Combinator,
    /// `Q`: simple selector sequence.
    Sequence,
    /// `T`: type or universal selector.
    Type,
    /// `X`: id, class, attribute, pseudo-class, or negation.
    Suffix,
    /// `A`: attribute selector.
    Attribute,
    /// `P`: pseudo-class.
    Pseudo,
    /// `N`: `:not(...)`.
    Negation,
    /// `R`: the single simple selector inside `:not(...)`.
    Negated,
}

/// Grammar productions. Each reduction runs the semantic action of its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `G -> C`
    GroupFromChain,
    /// `G -> G COMMA C`
    GroupAppend,
    /// `C -> Q`
    ChainFromSequence,
    /// `C -> C K Q`
    ChainLink,
    /// `K -> COMBINATOR`
    CombinatorExplicit,
    /// `K -> S`
    CombinatorDescendant,
    /// `Q -> T`
    SequenceFromType,
    /// `Q -> X`
    SequenceFromSuffix,
    /// `Q -> Q X`
    SequenceAppend,
    /// `T -> IDENT`
    TypeName,
    /// `T -> STAR`
    TypeUniversal,
    /// `X -> HASH`
    SuffixId,
    /// `X -> CLASS`
    SuffixClass,
    /// `X -> A`
    SuffixAttribute,
    /// `X -> P`
    SuffixPseudo,
    /// `X -> N`
    SuffixNegation,
    /// `A -> [ IDENT ]`
    AttributeExists,
    /// `A -> [ IDENT OP IDENT ]`
    AttributeIdentValue,
    /// `A -> [ IDENT OP STRING ]`
    AttributeStringValue,
    /// `P -> : IDENT`
    PseudoIdent,
    /// `P -> : FUNCTION ARGUMENT )`
    PseudoFunction,
    /// `N -> : NOT R )`
    Negation,
    /// `R -> T`
    NegatedType,
    /// `R -> HASH`
    NegatedId,
    /// `R -> CLASS`
    NegatedClass,
    /// `R -> A`
    NegatedAttribute,
    /// `R -> P`
    NegatedPseudo,
}

impl Rule {
    /// The left-hand side.
    #[must_use]
    pub const fn lhs(self) -> NonTerminal {
        match self {
            Self::GroupFromChain | Self::GroupAppend => NonTerminal::Group,
            Self::ChainFromSequence | Self::ChainLink => NonTerminal::Chain,
            Self::CombinatorExplicit | Self::CombinatorDescendant => NonTerminal::Combinator,
            Self::SequenceFromType | Self::SequenceFromSuffix | Self::SequenceAppend => {
                NonTerminal::Sequence
            }
            Self::TypeName | Self::TypeUniversal => NonTerminal::Type,
            Self::SuffixId
            | Self::SuffixClass
            | Self::SuffixAttribute
            | Self::SuffixPseudo
            | Self::SuffixNegation => NonTerminal::Suffix,
            Self::AttributeExists | Self::AttributeIdentValue | Self::AttributeStringValue => {
                NonTerminal::Attribute
            }
            Self::PseudoIdent | Self::PseudoFunction => NonTerminal::Pseudo,
            Self::Negation => NonTerminal::Negation,
            Self::NegatedType
            | Self::NegatedId
            | Self::NegatedClass
            | Self::NegatedAttribute
            | Self::NegatedPseudo => NonTerminal::Negated,
        }
    }

    /// Number of symbols on the right-hand side.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::GroupAppend | Self::ChainLink | Self::AttributeExists => 3,
            Self::SequenceAppend | Self::PseudoIdent => 2,
            Self::PseudoFunction | Self::Negation => 4,
            Self::AttributeIdentValue | Self::AttributeStringValue => 5,
            _ => 1,
        }
    }
}

/// A parser action for a (state, lookahead) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Push the lookahead and go to the given state.
    Shift(u8),
    /// Pop the rule's right-hand side and run its semantic action.
    Reduce(Rule),
    /// The input is a complete selector group.
    Accept,
}

/// One row of the action and goto tables.
#[derive(Debug)]
pub struct StateRow {
    /// Explicit actions by lookahead.
    pub actions: &'static [(TokenKind, Action)],
    /// The reduction taken on any lookahead in FOLLOW of its left-hand side.
    pub reduce: Option<Rule>,
    /// Goto transitions after a reduction exposes this state.
    pub gotos: &'static [(NonTerminal, u8)],
}

const fn row(
    actions: &'static [(TokenKind, Action)],
    reduce: Option<Rule>,
    gotos: &'static [(NonTerminal, u8)],
) -> StateRow {
    StateRow {
        actions,
        reduce,
        gotos,
    }
}

const fn reduce(rule: Rule) -> StateRow {
    row(&[], Some(rule), &[])
}

/// Shifts available wherever a simple selector sequence may begin.
const SEQUENCE_START: &[(TokenKind, Action)] = &[
    (Tk::Ident, Shift(9)),
    (Tk::Star, Shift(10)),
    (Tk::Hash, Shift(11)),
    (Tk::Class, Shift(12)),
    (Tk::LeftBracket, Shift(13)),
    (Tk::Colon, Shift(14)),
];

/// Shifts available after a sequence has started (suffix selectors only).
const SUFFIX_START: &[(TokenKind, Action)] = &[
    (Tk::Hash, Shift(11)),
    (Tk::Class, Shift(12)),
    (Tk::LeftBracket, Shift(13)),
    (Tk::Colon, Shift(14)),
];

const SUFFIX_GOTOS: &[(NonTerminal, u8)] = &[
    (Nt::Suffix, 19),
    (Nt::Attribute, 6),
    (Nt::Pseudo, 7),
    (Nt::Negation, 8),
];

const COMBINATOR_START: &[(TokenKind, Action)] =
    &[(Tk::Combinator, Shift(16)), (Tk::Whitespace, Shift(17))];

/// The parse table, indexed by state number.
pub static STATES: [StateRow; 42] = [
    // 0: start of input
    row(
        SEQUENCE_START,
        None,
        &[
            (Nt::Group, 1),
            (Nt::Chain, 2),
            (Nt::Sequence, 3),
            (Nt::Type, 4),
            (Nt::Suffix, 5),
            (Nt::Attribute, 6),
            (Nt::Pseudo, 7),
            (Nt::Negation, 8),
        ],
    ),
    // 1: G .
    row(&[(Tk::End, Accept), (Tk::Comma, Shift(15))], None, &[]),
    // 2: G -> C .  |  C -> C . K Q
    row(
        COMBINATOR_START,
        Some(Rule::GroupFromChain),
        &[(Nt::Combinator, 18)],
    ),
    // 3: C -> Q .  |  Q -> Q . X
    row(SUFFIX_START, Some(Rule::ChainFromSequence), SUFFIX_GOTOS),
    // 4..=12: single-symbol reductions
    reduce(Rule::SequenceFromType),
    reduce(Rule::SequenceFromSuffix),
    reduce(Rule::SuffixAttribute),
    reduce(Rule::SuffixPseudo),
    reduce(Rule::SuffixNegation),
    reduce(Rule::TypeName),
    reduce(Rule::TypeUniversal),
    reduce(Rule::SuffixId),
    reduce(Rule::SuffixClass),
    // 13: [ . IDENT
    row(&[(Tk::Ident, Shift(20))], None, &[]),
    // 14: : . IDENT  |  : . FUNCTION  |  : . NOT
    row(
        &[
            (Tk::Ident, Shift(21)),
            (Tk::Function, Shift(22)),
            (Tk::Not, Shift(23)),
        ],
        None,
        &[],
    ),
    // 15: G COMMA . C
    row(
        SEQUENCE_START,
        None,
        &[
            (Nt::Chain, 24),
            (Nt::Sequence, 3),
            (Nt::Type, 4),
            (Nt::Suffix, 5),
            (Nt::Attribute, 6),
            (Nt::Pseudo, 7),
            (Nt::Negation, 8),
        ],
    ),
    // 16, 17: combinators
    reduce(Rule::CombinatorExplicit),
    reduce(Rule::CombinatorDescendant),
    // 18: C K . Q
    row(
        SEQUENCE_START,
        None,
        &[
            (Nt::Sequence, 25),
            (Nt::Type, 4),
            (Nt::Suffix, 5),
            (Nt::Attribute, 6),
            (Nt::Pseudo, 7),
            (Nt::Negation, 8),
        ],
    ),
    // 19: Q X .
    reduce(Rule::SequenceAppend),
    // 20: [ IDENT . ]  |  [ IDENT . OP ...
    row(
        &[
            (Tk::RightBracket, Shift(26)),
            (Tk::AttributeOperator, Shift(27)),
        ],
        None,
        &[],
    ),
    // 21: : IDENT .
    reduce(Rule::PseudoIdent),
    // 22: : FUNCTION . ARGUMENT )
    row(&[(Tk::Argument, Shift(28))], None, &[]),
    // 23: : NOT . R )
    row(
        &[
            (Tk::Ident, Shift(9)),
            (Tk::Star, Shift(10)),
            (Tk::Hash, Shift(31)),
            (Tk::Class, Shift(32)),
            (Tk::LeftBracket, Shift(13)),
            (Tk::Colon, Shift(35)),
        ],
        None,
        &[
            (Nt::Negated, 29),
            (Nt::Type, 30),
            (Nt::Attribute, 33),
            (Nt::Pseudo, 34),
        ],
    ),
    // 24: G COMMA C .  |  C -> C . K Q
    row(
        COMBINATOR_START,
        Some(Rule::GroupAppend),
        &[(Nt::Combinator, 18)],
    ),
    // 25: C K Q .  |  Q -> Q . X
    row(SUFFIX_START, Some(Rule::ChainLink), SUFFIX_GOTOS),
    // 26: [ IDENT ] .
    reduce(Rule::AttributeExists),
    // 27: [ IDENT OP . value ]
    row(
        &[(Tk::Ident, Shift(36)), (Tk::String, Shift(37))],
        None,
        &[],
    ),
    // 28: : FUNCTION ARGUMENT . )
    row(&[(Tk::RightParen, Shift(38))], None, &[]),
    // 29: : NOT R . )
    row(&[(Tk::RightParen, Shift(39))], None, &[]),
    // 30..=34: negation arguments
    reduce(Rule::NegatedType),
    reduce(Rule::NegatedId),
    reduce(Rule::NegatedClass),
    reduce(Rule::NegatedAttribute),
    reduce(Rule::NegatedPseudo),
    // 35: : . IDENT  |  : . FUNCTION  (no nested negation)
    row(
        &[(Tk::Ident, Shift(21)), (Tk::Function, Shift(22))],
        None,
        &[],
    ),
    // 36, 37: [ IDENT OP value . ]
    row(&[(Tk::RightBracket, Shift(40))], None, &[]),
    row(&[(Tk::RightBracket, Shift(41))], None, &[]),
    // 38..=41: closing reductions
    reduce(Rule::PseudoFunction),
    reduce(Rule::Negation),
    reduce(Rule::AttributeIdentValue),
    reduce(Rule::AttributeStringValue),
];

const FOLLOW_GROUP: &[TokenKind] = &[Tk::End, Tk::Comma];

const FOLLOW_CHAIN: &[TokenKind] = &[Tk::End, Tk::Comma, Tk::Combinator, Tk::Whitespace];

const FOLLOW_COMBINATOR: &[TokenKind] = &[
    Tk::Ident,
    Tk::Star,
    Tk::Hash,
    Tk::Class,
    Tk::LeftBracket,
    Tk::Colon,
];

const FOLLOW_SEQUENCE: &[TokenKind] = &[
    Tk::End,
    Tk::Comma,
    Tk::Combinator,
    Tk::Whitespace,
    Tk::Hash,
    Tk::Class,
    Tk::LeftBracket,
    Tk::Colon,
];

/// `T`, `A`, and `P` also appear inside `:not(...)`.
const FOLLOW_NEGATABLE: &[TokenKind] = &[
    Tk::End,
    Tk::Comma,
    Tk::Combinator,
    Tk::Whitespace,
    Tk::Hash,
    Tk::Class,
    Tk::LeftBracket,
    Tk::Colon,
    Tk::RightParen,
];

const FOLLOW_NEGATED: &[TokenKind] = &[Tk::RightParen];

/// FOLLOW set of a non-terminal.
#[must_use]
pub const fn follow(symbol: NonTerminal) -> &'static [TokenKind] {
    match symbol {
        NonTerminal::Group => FOLLOW_GROUP,
        NonTerminal::Chain => FOLLOW_CHAIN,
        NonTerminal::Combinator => FOLLOW_COMBINATOR,
        NonTerminal::Sequence | NonTerminal::Suffix | NonTerminal::Negation => FOLLOW_SEQUENCE,
        NonTerminal::Type | NonTerminal::Attribute | NonTerminal::Pseudo => FOLLOW_NEGATABLE,
        NonTerminal::Negated => FOLLOW_NEGATED,
    }
}

/// Look up the action for `lookahead` in `state`.
#[must_use]
pub fn action(state: u8, lookahead: TokenKind) -> Option<Action> {
    let row = STATES.get(usize::from(state))?;
    if let Some(&(_, action)) = row.actions.iter().find(|(kind, _)| *kind == lookahead) {
        return Some(action);
    }
    row.reduce
        .filter(|rule| follow(rule.lhs()).contains(&lookahead))
        .map(Action::Reduce)
}

/// Look up the state to enter after reducing to `symbol` with `state` exposed.
#[must_use]
pub fn goto(state: u8, symbol: NonTerminal) -> Option<u8> {
    STATES
        .get(usize::from(state))?
        .gotos
        .iter()
        .find(|(nt, _)| *nt == symbol)
        .map(|&(_, target)| target)
}

/// Every token kind that has an action in `state`, for error reporting.
#[must_use]
pub fn expected(state: u8) -> Vec<TokenKind> {
    let Some(row) = STATES.get(usize::from(state)) else {
        return Vec::new();
    };
    let mut kinds: Vec<TokenKind> = row.actions.iter().map(|&(kind, _)| kind).collect();
    if let Some(rule) = row.reduce {
        for &kind in follow(rule.lhs()) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
    }
    kinds
}

#[cfg(test)]
#[allow(unused_qualifications)]
mod tests {
    use super::*;

    const ALL_RULES: [Rule; 27] = [
        Rule::GroupFromChain,
        Rule::GroupAppend,
        Rule::ChainFromSequence,
        Rule::ChainLink,
        Rule::CombinatorExplicit,
        Rule::CombinatorDescendant,
        Rule::SequenceFromType,
        Rule::SequenceFromSuffix,
        Rule::SequenceAppend,
        Rule::TypeName,
        Rule::TypeUniversal,
        Rule::SuffixId,
        Rule::SuffixClass,
        Rule::SuffixAttribute,
        Rule::SuffixPseudo,
        Rule::SuffixNegation,
        Rule::AttributeExists,
        Rule::AttributeIdentValue,
        Rule::AttributeStringValue,
        Rule::PseudoIdent,
        Rule::PseudoFunction,
        Rule::Negation,
        Rule::NegatedType,
        Rule::NegatedId,
        Rule::NegatedClass,
        Rule::NegatedAttribute,
        Rule::NegatedPseudo,
    ];

    #[test]
    fn test_no_shift_reduce_conflicts() {
        for (state, row) in STATES.iter().enumerate() {
            let Some(rule) = row.reduce else { continue };
            for (kind, _) in row.actions {
                assert!(
                    !follow(rule.lhs()).contains(kind),
                    "state {state}: {kind:?} both shifts and reduces {rule:?}"
                );
            }
        }
    }

    #[test]
    fn test_no_duplicate_actions_or_gotos() {
        for (state, row) in STATES.iter().enumerate() {
            for (i, (kind, _)) in row.actions.iter().enumerate() {
                assert!(
                    !row.actions[i + 1..].iter().any(|(k, _)| k == kind),
                    "state {state}: duplicate action on {kind:?}"
                );
            }
            for (i, (symbol, _)) in row.gotos.iter().enumerate() {
                assert!(
                    !row.gotos[i + 1..].iter().any(|(s, _)| s == symbol),
                    "state {state}: duplicate goto on {symbol:?}"
                );
            }
        }
    }

    #[test]
    fn test_targets_in_range() {
        for row in &STATES {
            for (_, action) in row.actions {
                if let Action::Shift(target) = action {
                    assert!(usize::from(*target) < STATES.len());
                }
            }
            for (_, target) in row.gotos {
                assert!(usize::from(*target) < STATES.len());
            }
        }
    }

    #[test]
    fn test_every_rule_is_reduced_somewhere() {
        for rule in ALL_RULES {
            assert!(
                STATES.iter().any(|row| row.reduce == Some(rule)),
                "{rule:?} is never reduced"
            );
        }
    }

    #[test]
    fn test_single_accept_on_end() {
        let accepting: Vec<usize> = STATES
            .iter()
            .enumerate()
            .filter(|(_, row)| row.actions.contains(&(TokenKind::End, Action::Accept)))
            .map(|(state, _)| state)
            .collect();
        assert_eq!(accepting, vec![1]);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(action(0, TokenKind::Ident), Some(Action::Shift(9)));
        assert_eq!(
            action(9, TokenKind::RightParen),
            Some(Action::Reduce(Rule::TypeName))
        );
        // `div)` is rejected once the type selector becomes a sequence.
        assert_eq!(action(4, TokenKind::RightParen), None);
        assert_eq!(goto(18, NonTerminal::Sequence), Some(25));
        assert_eq!(goto(18, NonTerminal::Group), None);
        assert_eq!(expected(13), vec![TokenKind::Ident]);
    }
}
