//! Property tests for the statement printer and parser.

use proptest::prelude::*;
use truthtree::*;

fn term() -> impl Strategy<Value = Formula> {
    let leaf = "[a-e]".prop_map(Formula::symbol);
    leaf.prop_recursive(2, 6, 2, |inner| {
        ("[f-h]", prop::collection::vec(inner, 1..3))
            .prop_map(|(name, args)| Formula::function(name, args))
    })
}

fn atom() -> impl Strategy<Value = Statement> {
    (
        "[P-S]",
        prop::option::of(prop::collection::vec(term(), 1..3)),
    )
        .prop_map(|(name, args)| Statement::Atomic(Formula::predicate(name, args)))
}

fn propositional_atom() -> impl Strategy<Value = Statement> {
    "[A-K]".prop_map(|name| Statement::Atomic(Formula::predicate(name, None)))
}

fn vars() -> impl Strategy<Value = Vec<Formula>> {
    prop::collection::vec("[w-z]".prop_map(Formula::symbol), 1..3)
}

fn statement(leaf: BoxedStrategy<Statement>, quantifiers: bool) -> impl Strategy<Value = Statement> {
    let leaf = prop_oneof![
        8 => leaf,
        1 => Just(Statement::Tautology),
        1 => Just(Statement::Contradiction),
    ];
    leaf.prop_recursive(4, 24, 3, move |inner| {
        let connectives = prop_oneof![
            inner.clone().prop_map(|s| Statement::Not(Box::new(s))),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Statement::And),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Statement::Or),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Statement::Conditional(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Statement::Biconditional(Box::new(l), Box::new(r))),
        ];
        if quantifiers {
            prop_oneof![
                4 => connectives,
                1 => (vars(), inner.clone())
                    .prop_map(|(vs, body)| Statement::Universal(vs, Box::new(body))),
                1 => (vars(), inner)
                    .prop_map(|(vs, body)| Statement::Existential(vs, Box::new(body))),
            ]
            .boxed()
        } else {
            connectives.boxed()
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Printing a statement and parsing it back gives the flattened statement
    #[test]
    fn display_parses_back(s in statement(atom().boxed(), true)) {
        let text = s.to_string();
        let parsed = parse(&text);
        prop_assert!(parsed.is_ok(), "{:?} failed on {}", parsed, text);
        prop_assert_eq!(parsed.unwrap(), s.flattened());
    }

    /// Propositional statements print to text both dialects accept alike
    #[test]
    fn dialects_agree_on_propositional_text(s in statement(propositional_atom().boxed(), false)) {
        let text = s.to_string();
        let first_order = parse_with(Dialect::FirstOrder, &text);
        let propositional = parse_with(Dialect::Propositional, &text);
        prop_assert!(propositional.is_ok(), "{:?} failed on {}", propositional, text);
        prop_assert_eq!(first_order.unwrap(), propositional.unwrap());
    }

    /// A statement is always mapped-equal to itself with an empty substitution
    #[test]
    fn statements_equal_themselves(s in statement(atom().boxed(), true)) {
        prop_assert!(s.equals(&s));
        let substitution = s.equals_map(&s);
        prop_assert!(substitution.is_some());
    }

    /// Flattening twice changes nothing
    #[test]
    fn flattening_is_idempotent(s in statement(atom().boxed(), true)) {
        let once = s.flattened();
        prop_assert_eq!(once.clone().flattened(), once);
    }

    /// Whitespace around operators never changes the parse
    #[test]
    fn spacing_is_insignificant(s in statement(propositional_atom().boxed(), false)) {
        let text = s.to_string();
        let spaced = text.replace('(', "( ").replace(')', " )");
        prop_assert_eq!(parse(&spaced).ok(), parse(&text).ok());
    }
}
