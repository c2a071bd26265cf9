use super::function::{Call, Function, UserFunction};
use crate::common::*;
use crate::config::Limits;
use crate::error::{Error, Result};
use crate::scope::{Resolver, Scope};

/// What an equation can see while it is evaluated: positional arguments,
/// named variables and callable functions.
///
/// Variables and functions both resolve static entries first, then any
/// resolvers pushed onto them, so values can be loaded lazily from storage.
#[derive(Debug)]
pub struct Context<'r> {
    pub args: Vec<Int>,
    pub variables: Scope<'r, Int>,
    pub functions: Scope<'r, Function>,
    pub limits: Limits,
}

impl<'r> Context<'r> {
    /// An empty context with every builtin function registered.
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            variables: Scope::new(),
            functions: Function::builtins()
                .into_iter()
                .map(|f| (f.name().to_owned(), f))
                .collect(),
            limits: Limits::default(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = Int>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: Int) -> Self {
        self.variables.insert(name, value);
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn resolve_variables_with(&mut self, resolver: impl Resolver<Int> + 'r) -> &mut Self {
        self.variables.push_resolver(resolver);
        self
    }

    pub fn resolve_functions_with(
        &mut self,
        resolver: impl Resolver<Function> + 'r,
    ) -> &mut Self {
        self.functions.push_resolver(resolver);
        self
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        Function::builtins().iter().any(|f| f.name() == name)
    }

    /// Registers a user function, replacing any previous one of that name.
    /// Builtins can't be redefined.
    pub fn define_function(&mut self, function: UserFunction) -> Result<()> {
        if self.is_builtin(function.name()) {
            return Err(Error::bad_equation(format!(
                "**{}** is a builtin function and can't be redefined",
                function.name()
            )));
        }
        self.functions
            .insert(function.name().to_owned(), function.into());
        Ok(())
    }

    /// Parses `body` and registers it as `name`.
    pub fn define(&mut self, name: &str, body: &str) -> Result<()> {
        self.define_function(UserFunction::parse(name, body)?)
    }
}

impl Default for Context<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let ctx = Context::new();
        for name in ["if", "and", "or", "not", "eq", "max", "min", "adv", "top", "bot"] {
            assert!(ctx.functions.get(name).unwrap().is_some(), "{}", name);
        }
        assert!(ctx.functions.get("foo").unwrap().is_none());
    }

    #[test]
    fn test_define() {
        let mut ctx = Context::new();
        ctx.define("bar", "5*5").unwrap();
        let bar = ctx.functions.get("bar").unwrap().unwrap();
        assert!(!bar.is_builtin());
        assert_eq!(bar.name(), "bar");
    }

    #[test]
    fn test_builtins_not_shadowed() {
        let mut ctx = Context::new();
        assert!(matches!(
            ctx.define("max", "1"),
            Err(Error::BadEquation(_))
        ));
        assert!(matches!(
            ctx.define("oops", "1 +"),
            Err(Error::InvalidToken(_))
        ));
    }
}
