//! Typed access to resolved slash command options

use serenity::all::{ResolvedOption, ResolvedValue, User};

pub struct Options<'a> {
    options: Vec<ResolvedOption<'a>>,
}

impl<'a> Options<'a> {
    pub fn new(options: Vec<ResolvedOption<'a>>) -> Self {
        Self { options }
    }

    /// The invoked subcommand and its own options
    pub fn subcommand(self) -> Option<(&'a str, Options<'a>)> {
        self.options.into_iter().find_map(|option| match option.value {
            ResolvedValue::SubCommand(inner) => Some((option.name, Options::new(inner))),
            _ => None,
        })
    }

    fn find(&self, name: &str) -> Option<&ResolvedValue<'a>> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .map(|option| &option.value)
    }

    pub fn string(&self, name: &str) -> Option<&'a str> {
        match self.find(name)? {
            ResolvedValue::String(value) => Some(*value),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.find(name)? {
            ResolvedValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<&'a User> {
        match self.find(name)? {
            ResolvedValue::User(user, _) => Some(*user),
            _ => None,
        }
    }
}
