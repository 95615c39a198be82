use std::fmt::Display;

/// A literal in the tree and a value at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum Atom {
    /// Declared without an initializer and not yet assigned
    Undefined,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Atom {
    /// Name of the value's type in the language's own vocabulary.
    pub fn type_name(&self) -> &'static str {
        match self {
            Atom::Undefined => "indefinido",
            Atom::Integer(_) => "inteiro",
            Atom::Float(_) => "real",
            Atom::Boolean(_) => "booleano",
            Atom::String(_) => "texto",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Atom::Integer(n) => Some(*n as f64),
            Atom::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Atom::Undefined => write!(f, "indefinido"),
            Atom::Integer(n) => write!(f, "{}", n),
            Atom::Float(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.1}", n),
            Atom::Float(n) => write!(f, "{}", n),
            Atom::String(s) => write!(f, "{}", s),
            Atom::Boolean(true) => write!(f, "verdadeiro"),
            Atom::Boolean(false) => write!(f, "falso"),
        }
    }
}
