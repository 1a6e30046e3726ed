//! The compiled selector model.
//!
//! A [`SelectorGroup`] is the comma-separated list of a selector; each
//! alternative is a [`SelectorChain`] of [`SimpleSelectorSequence`]s joined by
//! [`Combinator`]s; each sequence is a conjunction of [`SimpleSelector`]s.
//!
//! Everything here is immutable once the parser hands it over, so one
//! [`CompiledSelector`] can be shared between concurrent queries.

/// The `an+b` microsyntax.
pub mod nth;

use core::fmt;
use core::str::FromStr;

use strum_macros::{Display, EnumString};

pub use nth::AnPlusB;

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    ///
    /// Compared ASCII case-insensitively. Examples: `div`, `p`, `h1`
    Type(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value, which is an identifier."
    Id(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    Class(String),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    Pseudo(PseudoSelector),

    /// [Selectors Level 3 § 6.6.7](https://www.w3.org/TR/selectors-3/#negation)
    /// "The negation pseudo-class, `:not(X)`, is a functional notation taking a
    /// simple selector (excluding the negation pseudo-class itself) as an
    /// argument. It represents an element that is not represented by its
    /// argument."
    Negation(Box<SimpleSelector>),
}

impl SimpleSelector {
    /// The type name this selector requires, if it is a concrete type selector.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Type(name) => Some(name),
            _ => None,
        }
    }
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors).
///
/// Each variant holds the attribute name, and the value when there is one.
/// Names are matched ASCII case-insensitively, values exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`: "Represents an element with the att attribute"
    Exists(String),

    /// `[attr=value]`: "whose value is exactly 'val'."
    Equals(String, String),

    /// `[attr~=value]`: "whose value is a whitespace-separated list of words,
    /// one of which is exactly 'val'."
    Includes(String, String),

    /// `[attr|=value]`: "its value either being exactly 'val' or beginning
    /// with 'val' immediately followed by '-'."
    DashMatch(String, String),

    /// `[attr^=value]`: "whose value begins with the prefix 'val'."
    PrefixMatch(String, String),

    /// `[attr$=value]`: "whose value ends with the suffix 'val'."
    SuffixMatch(String, String),

    /// `[attr*=value]`: "whose value contains at least one instance of the
    /// substring 'val'."
    SubstringMatch(String, String),
}

/// The six attribute value operators, by their glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AttributeOperator {
    /// `=`
    #[strum(serialize = "=")]
    Equals,
    /// `~=`
    #[strum(serialize = "~=")]
    Includes,
    /// `|=`
    #[strum(serialize = "|=")]
    DashMatch,
    /// `^=`
    #[strum(serialize = "^=")]
    PrefixMatch,
    /// `$=`
    #[strum(serialize = "$=")]
    SuffixMatch,
    /// `*=`
    #[strum(serialize = "*=")]
    SubstringMatch,
}

impl AttributeSelector {
    /// Build the selector for `[name <operator> value]`.
    #[must_use]
    pub fn with_operator(name: String, operator: AttributeOperator, value: String) -> Self {
        match operator {
            AttributeOperator::Equals => Self::Equals(name, value),
            AttributeOperator::Includes => Self::Includes(name, value),
            AttributeOperator::DashMatch => Self::DashMatch(name, value),
            AttributeOperator::PrefixMatch => Self::PrefixMatch(name, value),
            AttributeOperator::SuffixMatch => Self::SuffixMatch(name, value),
            AttributeOperator::SubstringMatch => Self::SubstringMatch(name, value),
        }
    }

    /// The attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Exists(name)
            | Self::Equals(name, _)
            | Self::Includes(name, _)
            | Self::DashMatch(name, _)
            | Self::PrefixMatch(name, _)
            | Self::SuffixMatch(name, _)
            | Self::SubstringMatch(name, _) => name,
        }
    }

    /// The operator and value, or `None` for `[attr]`.
    #[must_use]
    pub fn condition(&self) -> Option<(AttributeOperator, &str)> {
        match self {
            Self::Exists(_) => None,
            Self::Equals(_, value) => Some((AttributeOperator::Equals, value)),
            Self::Includes(_, value) => Some((AttributeOperator::Includes, value)),
            Self::DashMatch(_, value) => Some((AttributeOperator::DashMatch, value)),
            Self::PrefixMatch(_, value) => Some((AttributeOperator::PrefixMatch, value)),
            Self::SuffixMatch(_, value) => Some((AttributeOperator::SuffixMatch, value)),
            Self::SubstringMatch(_, value) => Some((AttributeOperator::SubstringMatch, value)),
        }
    }
}

/// Argument-less pseudo-classes per [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes).
///
/// Parsed from the name ASCII case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,
    /// [§ 14.3.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 14.3.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.4.1 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 14.4.2 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 14.3.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 14.4.3 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    Empty,
    /// [§ 8.2 :link](https://www.w3.org/TR/selectors-4/#the-link-pseudo)
    Link,
    /// [§ 13.1.1 :enabled](https://www.w3.org/TR/selectors-4/#enableddisabled)
    Enabled,
    /// [§ 13.1.1 :disabled](https://www.w3.org/TR/selectors-4/#enableddisabled)
    Disabled,
    /// [§ 13.3.1 :checked](https://www.w3.org/TR/selectors-4/#checked)
    Checked,
    /// [§ 8.4 :target](https://www.w3.org/TR/selectors-4/#the-target-pseudo)
    Target,
    /// [§ 9.5 :focus](https://www.w3.org/TR/selectors-4/#the-focus-pseudo)
    Focus,
    /// `:hover`. A static tree has no pointer, so this never matches.
    Hover,
    /// `:active`. Never matches.
    Active,
    /// `:visited`. Never matches; no history is available.
    Visited,
}

/// The four `:nth-*` pseudo-classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum NthKind {
    /// `:nth-child(an+b)`: position among all element siblings, counted from the start.
    NthChild,
    /// `:nth-last-child(an+b)`: counted from the end.
    NthLastChild,
    /// `:nth-of-type(an+b)`: position among same-type siblings, from the start.
    NthOfType,
    /// `:nth-last-of-type(an+b)`: among same-type siblings, from the end.
    NthLastOfType,
}

impl NthKind {
    /// Whether siblings are counted from the last one backwards.
    #[must_use]
    pub const fn from_end(self) -> bool {
        matches!(self, Self::NthLastChild | Self::NthLastOfType)
    }

    /// Whether only siblings with the same type name are counted.
    #[must_use]
    pub const fn of_type(self) -> bool {
        matches!(self, Self::NthOfType | Self::NthLastOfType)
    }
}

/// A pseudo-class in either its ident form (`:empty`) or functional form
/// (`:nth-child(2n+1)`).
///
/// Names the predicate library does not implement still compile, as
/// [`PseudoSelector::Unsupported`]; they fail only when matching reaches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoSelector {
    /// An argument-less pseudo-class.
    Class(PseudoClass),

    /// One of the `:nth-*` pseudo-classes.
    Nth {
        /// Which sibling set is counted, and from which end.
        kind: NthKind,
        /// The parsed formula; `None` if the argument is not valid `an+b`,
        /// in which case the pseudo-class never matches.
        formula: Option<AnPlusB>,
        /// The argument as written (trimmed).
        argument: String,
    },

    /// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
    Lang(String),

    /// A pseudo-class name with no predicate.
    Unsupported {
        /// The name as written, without the colon.
        name: String,
        /// The raw argument, for the functional form.
        argument: Option<String>,
    },
}

impl PseudoSelector {
    /// Classify an ident-form pseudo-class, `:name`.
    #[must_use]
    pub fn from_ident(name: &str) -> Self {
        PseudoClass::from_str(name).map_or_else(
            |_| Self::Unsupported {
                name: name.to_string(),
                argument: None,
            },
            Self::Class,
        )
    }

    /// Classify a functional pseudo-class, `:name(argument)`.
    #[must_use]
    pub fn from_function(name: &str, argument: &str) -> Self {
        if let Ok(kind) = NthKind::from_str(name) {
            return Self::Nth {
                kind,
                formula: AnPlusB::parse(argument),
                argument: argument.to_string(),
            };
        }
        if name.eq_ignore_ascii_case("lang") {
            return Self::Lang(unquote(argument).to_string());
        }
        Self::Unsupported {
            name: name.to_string(),
            argument: Some(argument.to_string()),
        }
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
///
/// `Display` and `FromStr` use the glyph (a single space for descendant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Combinator {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators) `A B`
    #[strum(serialize = " ")]
    Descendant,

    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators) `A > B`
    #[strum(serialize = ">")]
    Child,

    /// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators) `A + B`
    #[strum(serialize = "+")]
    NextSibling,

    /// [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators) `A ~ B`
    #[strum(serialize = "~")]
    SubsequentSibling,
}

impl Combinator {
    /// Whether matching across this combinator has more than one candidate
    /// position (and so needs backtracking).
    #[must_use]
    pub const fn is_branching(self) -> bool {
        matches!(self, Self::Descendant | Self::SubsequentSibling)
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleSelectorSequence {
    /// The conditions, in source order. Never empty.
    pub selectors: Vec<SimpleSelector>,
    /// Distance from the tail of the chain: 0 for the subject, increasing
    /// leftwards. Doubles as this sequence's index in [`SelectorChain::sequences`].
    pub order: usize,
    /// How this sequence relates to its predecessor (the sequence at
    /// `order + 1`, to its left). `None` for the head of the chain.
    pub combinator: Option<Combinator>,
}

impl SimpleSelectorSequence {
    /// The concrete type name this sequence requires, if any.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.selectors.iter().find_map(SimpleSelector::type_name)
    }

    /// The id this sequence requires, when it carries exactly one id selector.
    #[must_use]
    pub fn sole_id(&self) -> Option<&str> {
        let mut ids = self.selectors.iter().filter_map(|s| match s {
            SimpleSelector::Id(id) => Some(id.as_str()),
            _ => None,
        });
        let id = ids.next()?;
        ids.next().is_none().then_some(id)
    }
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// One comma-separated alternative. Stored tail first, because matching walks
/// from the subject leftwards:
///
/// ```text
/// div.container > ul li
/// sequences[0] = li              combinator: Descendant
/// sequences[1] = ul              combinator: Child
/// sequences[2] = div.container   combinator: None
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    /// The sequences, subject first. Never empty.
    pub sequences: Vec<SimpleSelectorSequence>,
}

impl SelectorChain {
    /// The subject sequence (the rightmost one in source text).
    #[must_use]
    pub fn tail(&self) -> Option<&SimpleSelectorSequence> {
        self.sequences.first()
    }

    /// The sequence to the left of `order`, if any.
    #[must_use]
    pub fn prev(&self, order: usize) -> Option<&SimpleSelectorSequence> {
        self.sequences.get(order + 1)
    }

    /// The sequence to the right of `order`, if any.
    #[must_use]
    pub fn next(&self, order: usize) -> Option<&SimpleSelectorSequence> {
        order.checked_sub(1).and_then(|i| self.sequences.get(i))
    }

    /// Number of sequences in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the chain has no sequences. Parsed chains never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Accumulates a chain head first, as the parser reduces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainBuilder {
    head_first: Vec<(Option<Combinator>, Vec<SimpleSelector>)>,
}

impl ChainBuilder {
    /// Start a chain with its head sequence.
    #[must_use]
    pub fn new(selectors: Vec<SimpleSelector>) -> Self {
        Self {
            head_first: vec![(None, selectors)],
        }
    }

    /// Append a sequence to the right, related to the current last one by `combinator`.
    pub fn link(&mut self, combinator: Combinator, selectors: Vec<SimpleSelector>) {
        self.head_first.push((Some(combinator), selectors));
    }

    /// Reverse into tail-first storage and number the sequences.
    #[must_use]
    pub fn finish(self) -> SelectorChain {
        let sequences = self
            .head_first
            .into_iter()
            .rev()
            .enumerate()
            .map(|(order, (combinator, selectors))| SimpleSelectorSequence {
                selectors,
                order,
                combinator,
            })
            .collect();
        SelectorChain { sequences }
    }
}

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
///
/// "A comma-separated list of selectors represents the union of all elements
/// selected by each of the individual selectors in the selector list."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorGroup {
    /// The alternatives in source order.
    pub chains: Vec<SelectorChain>,
}

/// A parsed selector together with the text it was compiled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSelector {
    /// The selector text exactly as given to the compiler.
    pub text: String,
    /// The parsed selector list.
    pub group: SelectorGroup,
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => f.write_str(&serialize_identifier(name)),
            Self::Universal => f.write_str("*"),
            Self::Id(id) => write!(f, "#{}", serialize_name(id)),
            Self::Class(class) => write!(f, ".{}", serialize_identifier(class)),
            Self::Attribute(attribute) => write!(f, "{attribute}"),
            Self::Pseudo(pseudo) => write!(f, "{pseudo}"),
            Self::Negation(inner) => write!(f, ":not({inner})"),
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = serialize_name(self.name());
        match self.condition() {
            None => write!(f, "[{name}]"),
            Some((operator, value)) => write!(f, "[{name}{operator}{}]", serialize_string(value)),
        }
    }
}

impl fmt::Display for PseudoSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => write!(f, ":{class}"),
            Self::Nth { kind, argument, .. } => write!(f, ":{kind}({argument})"),
            Self::Lang(lang) => write!(f, ":lang({lang})"),
            Self::Unsupported {
                name,
                argument: None,
            } => write!(f, ":{}", serialize_identifier(name)),
            Self::Unsupported {
                name,
                argument: Some(argument),
            } => write!(f, ":{}({argument})", serialize_identifier(name)),
        }
    }
}

impl fmt::Display for SimpleSelectorSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for selector in &self.selectors {
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sequence in self.sequences.iter().rev() {
            match sequence.combinator {
                None => {}
                Some(Combinator::Descendant) => f.write_str(" ")?,
                Some(combinator) => write!(f, " {combinator} ")?,
            }
            write!(f, "{sequence}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{chain}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CompiledSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.group)
    }
}

/// Strip one pair of matching quotes, for arguments such as `:lang("en")`.
fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// [CSSOM § 2.1 serialize an identifier](https://drafts.csswg.org/cssom/#serialize-an-identifier)
fn serialize_identifier(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let chars: Vec<char> = ident.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        let leading_digit = c.is_ascii_digit() && (i == 0 || (i == 1 && chars[0] == '-'));
        if c == '\0' {
            out.push('\u{FFFD}');
        } else if leading_digit || c.is_ascii_control() {
            // "the character escaped as code point"
            out.push_str(&format!("\\{:x} ", u32::from(c)));
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else {
            push_name_char(&mut out, c);
        }
    }
    out
}

/// Like [`serialize_identifier`], but a name may start with a digit (id
/// selectors and attribute names).
fn serialize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_control() {
            out.push_str(&format!("\\{:x} ", u32::from(c)));
        } else {
            push_name_char(&mut out, c);
        }
    }
    out
}

fn push_name_char(out: &mut String, c: char) {
    if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
        out.push(c);
    } else {
        // "the character escaped"
        out.push('\\');
        out.push(c);
    }
}

/// [CSSOM § 2.1 serialize a string](https://drafts.csswg.org/cssom/#serialize-a-string)
fn serialize_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii_control() => out.push_str(&format!("\\{:x} ", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
