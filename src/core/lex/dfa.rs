/// States of the identifier/number automaton.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum State {
    Start,
    Identifier,
    NumberInt,
    NumberFrac,
    AfterMinus,
    AfterDot,
    Error,
}

/// The classes a word can be recognised as by the automaton.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WordClass {
    Identifier,
    Number,
    Unknown,
}

/// Runs the identifier/number DFA over `word`.
///
/// Identifiers start with a letter or `_` and continue with letters, digits or `_`.
/// Numbers are an optional leading `-`, one or more digits, and at most one `.`
/// which must be followed by at least one digit.
pub fn classify(word: &str) -> WordClass {
    let mut state = State::Start;

    for c in word.chars() {
        state = transition(state, c);
        if state == State::Error {
            break;
        }
    }

    match state {
        State::Identifier => WordClass::Identifier,
        State::NumberInt | State::NumberFrac => WordClass::Number,
        _ => WordClass::Unknown,
    }
}

fn transition(state: State, c: char) -> State {
    match state {
        State::Start => {
            if c.is_alphabetic() || c == '_' {
                State::Identifier
            } else if c.is_ascii_digit() {
                State::NumberInt
            } else if c == '-' {
                State::AfterMinus
            } else {
                State::Error
            }
        }
        State::Identifier => {
            if c.is_alphanumeric() || c == '_' {
                State::Identifier
            } else {
                State::Error
            }
        }
        State::NumberInt => {
            if c.is_ascii_digit() {
                State::NumberInt
            } else if c == '.' {
                State::AfterDot
            } else {
                State::Error
            }
        }
        State::AfterMinus => {
            if c.is_ascii_digit() {
                State::NumberInt
            } else {
                State::Error
            }
        }
        State::AfterDot | State::NumberFrac => {
            if c.is_ascii_digit() {
                State::NumberFrac
            } else {
                State::Error
            }
        }
        State::Error => State::Error,
    }
}
