use super::ast::{Atom, VarType};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub value: Atom,
    pub ty: Option<VarType>,
}

impl Binding {
    pub fn new(value: Atom, ty: Option<VarType>) -> Binding {
        Binding { value, ty }
    }
}

type Frame = HashMap<String, Binding>;

/// Stack of scope frames. The bottom frame holds the program's globals and
/// is never popped.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            frames: vec![Frame::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Frame::new());
    }

    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True if `name` is bound in the innermost frame.
    pub fn is_declared_locally(&self, name: &str) -> bool {
        self.frames
            .last()
            .map_or(false, |frame| frame.contains_key(name))
    }

    /// Locally insert new variable
    pub fn declare_var(&mut self, name: String, binding: Binding) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, binding);
        }
    }

    /// Searches frames from the innermost outwards
    pub fn get_var(&self, name: &str) -> Option<&Binding> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn get_var_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}
