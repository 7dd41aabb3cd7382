//! Pattern matching for `match` arms

use crate::interpreter::value::Value;
use crate::parser::ast::Pattern;

/// Try to match a value against a pattern. `Some` carries the bindings the
/// pattern introduces (empty for literal and wildcard patterns); `None`
/// means the pattern does not match.
pub fn match_pattern(pattern: &Pattern, value: &Value) -> Option<Vec<(String, Value)>> {
    match pattern {
        Pattern::Wildcard { .. } => Some(Vec::new()),
        Pattern::Number { value: expected, .. } => match value {
            Value::Number(n) if n == expected => Some(Vec::new()),
            _ => None,
        },
        Pattern::Str { value: expected, .. } => match value {
            Value::Str(s) if s.as_ref() == expected => Some(Vec::new()),
            _ => None,
        },
        Pattern::Bool { value: expected, .. } => match value {
            Value::Bool(b) if b == expected => Some(Vec::new()),
            _ => None,
        },
        Pattern::Binding { name, .. } => Some(vec![(name.clone(), value.clone())]),
        Pattern::Ok { inner, .. } => match value {
            Value::Ok(v) => match_pattern(inner, v),
            _ => None,
        },
        Pattern::Err { inner, .. } => match value {
            Value::Err(v) => match_pattern(inner, v),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Span;
    use std::rc::Rc;

    fn span() -> Span {
        Span::start_of_input()
    }

    #[test]
    fn wildcard_matches_anything_with_no_bindings() {
        let bindings = match_pattern(&Pattern::Wildcard { span: span() }, &Value::Unit).unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn number_literal_matches_exactly() {
        let pattern = Pattern::Number {
            span: span(),
            value: 2.0,
        };
        assert!(match_pattern(&pattern, &Value::Number(2.0)).is_some());
        assert!(match_pattern(&pattern, &Value::Number(2.5)).is_none());
        assert!(match_pattern(&pattern, &Value::str("2")).is_none());
    }

    #[test]
    fn binding_captures_the_subject() {
        let pattern = Pattern::Binding {
            span: span(),
            name: "n".to_string(),
        };
        let bindings = match_pattern(&pattern, &Value::Number(7.0)).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].0, "n");
    }

    #[test]
    fn result_patterns_destructure() {
        let pattern = Pattern::Ok {
            span: span(),
            inner: Box::new(Pattern::Binding {
                span: span(),
                name: "v".to_string(),
            }),
        };
        let ok = Value::Ok(Rc::new(Value::Number(1.0)));
        let err = Value::Err(Rc::new(Value::Number(1.0)));
        assert_eq!(match_pattern(&pattern, &ok).unwrap().len(), 1);
        assert!(match_pattern(&pattern, &err).is_none());
    }
}
