use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::object::Object;

/// One frame of the lexical scope chain. Frames are shared: every closure
/// created while a frame was innermost holds a counted reference to it.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(self, outer: Rc<RefCell<Environment>>) -> Self {
        Self { outer: Some(outer), ..self }
    }

    pub fn as_rc(self) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(self))
    }

    /// Walk the chain outward until the name is found or the chain ends.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Bind in the local frame only; outer frames are never mutated.
    pub fn set(&mut self, name: &str, value: Object) {
        self.store.insert(name.to_owned(), value);
    }
}
