//! Function and template signatures.
//!
//! The textual form is `Name(K1, K2, Klast...)Kret`: a trailing `...` on the
//! last parameter makes the signature variadic, and an omitted return kind
//! means `Any`.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::kind::Kind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: String,
    name_key: String,
    parameters: Vec<Kind>,
    is_variadic: bool,
    returns: Kind,
    description: String,
    example: String,
}

impl Signature {
    /// A signature with no parameters returning `Any`; refine it with the
    /// builder methods.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Signature {
            name_key: name.to_ascii_lowercase(),
            name,
            parameters: Vec::new(),
            is_variadic: false,
            returns: Kind::ANY,
            description: String::new(),
            example: String::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        text.parse()
    }

    #[must_use]
    pub fn params(mut self, parameters: impl IntoIterator<Item = Kind>) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }

    /// The last parameter's kind governs every trailing argument.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    #[must_use]
    pub fn returns(mut self, kind: Kind) -> Self {
        self.returns = kind;
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased name used for dispatch.
    pub fn name_key(&self) -> &str {
        &self.name_key
    }

    pub fn parameters(&self) -> &[Kind] {
        &self.parameters
    }

    pub fn is_variadic(&self) -> bool {
        self.is_variadic
    }

    pub fn return_kind(&self) -> Kind {
        self.returns
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn example_text(&self) -> &str {
        &self.example
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.is_variadic {
            count + 1 >= self.parameters.len()
        } else {
            count == self.parameters.len()
        }
    }

    /// Declared kind of the argument at `index`; trailing arguments of a
    /// variadic signature share the last parameter's kind.
    pub fn parameter_kind(&self, index: usize) -> Kind {
        match self.parameters.last() {
            Some(last) => self.parameters.get(index).copied().unwrap_or(*last),
            None => Kind::empty(),
        }
    }

    /// `true` when the argument at `index` is passed as raw AST.
    pub fn quotes(&self, index: usize) -> bool {
        self.parameter_kind(index).is_quoting()
    }

    /// Same name, parameters, variadicity and return kind. Documentation is
    /// not part of a signature's identity.
    pub fn same_as(&self, other: &Signature) -> bool {
        self.name_key == other.name_key
            && self.parameters == other.parameters
            && self.is_variadic == other.is_variadic
            && self.returns == other.returns
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, kind) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{kind}")?;
        }
        if self.is_variadic {
            write!(f, "...")?;
        }
        write!(f, "){}", self.returns)
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::InvalidSignature {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let open = text.find('(').ok_or_else(|| invalid("missing `(`"))?;
        let close = text.rfind(')').ok_or_else(|| invalid("missing `)`"))?;
        if close < open {
            return Err(invalid("`)` before `(`"));
        }

        let name = text[..open].trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(invalid("name must be a single non-empty word"));
        }

        let mut parameters = Vec::new();
        let mut is_variadic = false;
        let inner = text[open + 1..close].trim();
        if !inner.is_empty() {
            let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
            for (i, part) in parts.iter().enumerate() {
                let kind_text = match part.strip_suffix("...") {
                    Some(stripped) if i + 1 == parts.len() => {
                        is_variadic = true;
                        stripped
                    }
                    Some(_) => return Err(invalid("only the last parameter may be variadic")),
                    None => *part,
                };
                let kind: Kind = kind_text
                    .parse()
                    .map_err(|_| invalid(&format!("unknown kind `{kind_text}`")))?;
                parameters.push(kind);
            }
        }

        let return_text = text[close + 1..].trim();
        let returns = if return_text.is_empty() {
            Kind::ANY
        } else {
            return_text
                .parse()
                .map_err(|_| invalid(&format!("unknown return kind `{return_text}`")))?
        };

        let mut signature = Signature::new(name).params(parameters).returns(returns);
        if is_variadic {
            signature = signature.variadic();
        }
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variadic() {
        let sig: Signature = "Sum(Decimal, Decimal...)Decimal".parse().unwrap();
        assert_eq!(sig.name(), "Sum");
        assert_eq!(sig.name_key(), "sum");
        assert_eq!(sig.parameters(), &[Kind::DECIMAL, Kind::DECIMAL]);
        assert!(sig.is_variadic());
        assert_eq!(sig.return_kind(), Kind::DECIMAL);
        assert_eq!(sig.to_string(), "Sum(Decimal, Decimal...)Decimal");
    }

    #[test]
    fn test_parse_without_parameters_or_return() {
        let sig: Signature = "panic()".parse().unwrap();
        assert!(sig.parameters().is_empty());
        assert_eq!(sig.return_kind(), Kind::ANY);
        assert!(sig.accepts_arity(0));
        assert!(!sig.accepts_arity(1));
    }

    #[test]
    fn test_symbolic_names() {
        let sig: Signature = ".|(Value, Any)Value".parse().unwrap();
        assert_eq!(sig.name(), ".|");
        assert!(sig.quotes(1));
        assert!(!sig.quotes(0));
    }

    #[test]
    fn test_variadic_arity_and_trailing_kinds() {
        let sig: Signature = "f(String, Decimal...)Null".parse().unwrap();
        assert!(sig.accepts_arity(1));
        assert!(sig.accepts_arity(5));
        assert!(!sig.accepts_arity(0));
        assert_eq!(sig.parameter_kind(4), Kind::DECIMAL);
    }

    #[test]
    fn test_rejects_malformed() {
        for text in [
            "f",
            "(Decimal)",
            "f(Decimal...",
            "f(Decimal..., String)",
            "f(Integer)",
            "f()Nope",
        ] {
            assert!(text.parse::<Signature>().is_err(), "{text} should be rejected");
        }
    }
}
