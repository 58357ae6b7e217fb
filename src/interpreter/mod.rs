//! Tree-walking interpreter
//!
//! An [`Interpreter`] is one scope: a binding root, the functions and
//! templates registered in it, and an optional back-reference to the scope it
//! was opened from. Unresolved names (functions, templates, bindings) are
//! looked up along that parent chain, innermost first.

mod builder;
mod dispatch;
mod template;

use std::cell::Cell;
use std::rc::Rc;

use tracing::{Span, debug, trace};

pub use builder::{Config, InterpreterBuilder};
pub use template::Template;

use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::lexer::lex;
use crate::native::Function;
use crate::signature::Signature;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Block, Token, TokenMap, join_path};

// ============================================================================
// Runtime
// ============================================================================

/// State shared by every scope opened from one root.
struct Runtime {
    config: Config,
    depth: Cell<usize>,
}

impl Runtime {
    fn enter(self: &Rc<Self>) -> Result<DepthGuard> {
        let depth = self.depth.get() + 1;
        if depth > self.config.max_depth {
            return Err(Error::RecursionLimit(self.config.max_depth));
        }
        self.depth.set(depth);
        Ok(DepthGuard {
            runtime: Rc::clone(self),
        })
    }
}

/// Releases one level of evaluation depth on every exit path.
struct DepthGuard {
    runtime: Rc<Runtime>,
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        let depth = self.runtime.depth.get();
        self.runtime.depth.set(depth.saturating_sub(1));
    }
}

// ============================================================================
// Interpreter
// ============================================================================

pub struct Interpreter<'p> {
    parent: Option<&'p Interpreter<'p>>,
    binding: Token,
    functions: Vec<Rc<Function>>,
    templates: Vec<Rc<Template>>,
    runtime: Rc<Runtime>,
    span: Option<Span>,
}

impl Default for Interpreter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter<'static> {
    /// A root interpreter with the built-in catalogue registered.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    fn root(config: Config, binding: Token, span: Option<Span>) -> Self {
        Interpreter {
            parent: None,
            binding,
            functions: Vec::new(),
            templates: Vec::new(),
            runtime: Rc::new(Runtime {
                config,
                depth: Cell::new(0),
            }),
            span,
        }
    }
}

impl<'p> Interpreter<'p> {
    /// A child scope with an empty binding. It sees everything registered or
    /// bound in this scope, and nothing it registers or binds leaks back.
    pub fn new_scope(&self) -> Interpreter<'_> {
        Interpreter {
            parent: Some(self),
            binding: Token::Map(TokenMap::new()),
            functions: Vec::new(),
            templates: Vec::new(),
            runtime: Rc::clone(&self.runtime),
            span: self.span.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.runtime.config
    }

    /// This scope followed by its ancestors.
    fn chain(&self) -> impl Iterator<Item = &Interpreter<'_>> {
        std::iter::successors(Some(self), |scope| scope.parent)
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Evaluate `token` in this scope. In dry-run mode the tree is only
    /// type-checked and handed back unmodified.
    pub fn evaluate(&mut self, token: Token) -> Result<Token> {
        if self.runtime.config.dry_run {
            self.validate(&token)?;
            return Ok(token);
        }
        let span = self.span.clone();
        let _entered = span.as_ref().map(Span::enter);
        self.eval(token)
    }

    pub fn lex_and_evaluate(&mut self, source: &str) -> Result<Token> {
        let token = lex(source)?;
        self.evaluate(token)
    }

    /// Resolve every call in the tree without invoking anything. Quoted
    /// arguments are not checked; their meaning is up to the function that
    /// receives them.
    pub fn validate(&self, token: &Token) -> Result<()> {
        let Token::Block(block) = token else {
            return Ok(());
        };
        ensure_sufficient_stack(|| {
            if block.head.is_empty() {
                return block.children.iter().try_for_each(|child| self.validate(child));
            }
            let Some(function) = self.resolve(block)? else {
                return Ok(());
            };
            let signature = function.signature();
            for (i, child) in block.children.iter().enumerate() {
                if !signature.quotes(i) {
                    self.validate(child).map_err(|err| err.within(signature))?;
                }
            }
            Ok(())
        })
    }

    pub(crate) fn eval(&mut self, token: Token) -> Result<Token> {
        let Token::Block(block) = token else {
            return Ok(token);
        };
        let _depth = self.runtime.enter()?;
        ensure_sufficient_stack(|| self.eval_block(block))
    }

    fn eval_block(&mut self, block: Block) -> Result<Token> {
        if block.head.is_empty() {
            return self.eval_sequence(block);
        }

        let Some(function) = self.resolve(&block)? else {
            trace!(head = %block.head, "no matching signature");
            // A bare head with no arguments reads as the atom it spells
            if block.children.is_empty() {
                return Ok(Token::from_text(&block.head));
            }
            return Ok(Token::Block(block));
        };

        let (name, children) = block.into_parts();
        let mut args = Vec::with_capacity(children.len());
        for (i, child) in children.into_iter().enumerate() {
            if function.signature().quotes(i) {
                args.push(child);
            } else {
                let value = self
                    .eval(child)
                    .map_err(|err| err.within(function.signature()))?;
                args.push(value);
            }
        }

        let function = if self.accepts_values(function.signature(), &args) {
            function
        } else {
            self.redispatch(&name, &args)?
        };

        let signature = function.signature();
        trace!(
            signature = %signature,
            depth = self.runtime.depth.get(),
            "call"
        );
        let result = function
            .call(self, args)
            .map_err(|err| err.within(signature))?;

        // An unevaluated tree handed back by a quoting function continues in
        // this scope
        if signature.return_kind().is_quoting() && result.is_block() {
            return self.eval(result);
        }
        Ok(result)
    }

    /// `(expr)` evaluates `expr`; `(e1 e2 ...)` evaluates each in order and
    /// keeps the last result.
    fn eval_sequence(&mut self, block: Block) -> Result<Token> {
        if block.children.is_empty() {
            return Ok(Token::Block(block));
        }
        let mut last = Token::Null;
        for child in block.into_parts().1 {
            last = self.eval(child)?;
        }
        Ok(last)
    }

    // ------------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------------

    /// The binding root of this scope.
    pub fn binding(&self) -> &Token {
        &self.binding
    }

    pub fn set_binding(&mut self, binding: Token) {
        self.binding = binding;
    }

    /// Install a top-level binding in this scope.
    pub fn set(&mut self, key: impl Into<String>, value: Token) -> Result<()> {
        let key = key.into();
        self.binding.set_path(std::slice::from_ref(&key), value)
    }

    /// A top-level binding visible from this scope, or `Null` when absent.
    pub fn get(&self, key: &str) -> Token {
        self.lookup(key).cloned().unwrap_or(Token::Null)
    }

    fn lookup(&self, key: &str) -> Option<&Token> {
        self.chain().find_map(|scope| scope.binding.child(key))
    }

    /// Follow a dot path from the binding visible in this scope. An empty
    /// path reads the binding root of this scope.
    pub fn read_path<S: AsRef<str>>(&self, path: &[S]) -> Result<Token> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(self.binding.clone());
        };
        let first = first.as_ref();
        let mut current = self
            .lookup(first)
            .ok_or_else(|| Error::UnboundName(first.to_string()))?;
        for (depth, key) in rest.iter().enumerate() {
            if !matches!(current, Token::Map(_) | Token::List(_)) {
                return Err(Error::KindMismatch {
                    context: join_path(&path[..=depth]),
                    expected: Kind::COLLECTION,
                    found: current.kind(),
                });
            }
            current = current
                .child(key.as_ref())
                .ok_or_else(|| Error::UnboundName(join_path(&path[..depth + 2])))?;
        }
        Ok(current.clone())
    }

    /// Install `value` at `path` in this scope's binding. A subtree inherited
    /// from an enclosing scope is copied into this scope before it is
    /// modified.
    pub fn write_path<S: AsRef<str>>(&mut self, path: &[S], value: Token) -> Result<()> {
        let Some(first) = path.first() else {
            self.binding = value;
            return Ok(());
        };
        let first = first.as_ref();
        if self.binding.child(first).is_none()
            && let Some(inherited) = self.parent.and_then(|parent| parent.lookup(first))
        {
            let inherited = inherited.clone();
            self.binding
                .set_path(std::slice::from_ref(&first), inherited)?;
        }
        self.binding.set_path(path, value)
    }

    // ------------------------------------------------------------------------
    // Function registry
    // ------------------------------------------------------------------------

    /// Register `body` under `signature` in this scope. Registering the exact
    /// same signature twice in one scope is a conflict; overloads and
    /// shadowing registrations with a different return kind are not.
    pub fn register_function<F>(&mut self, signature: &str, body: F) -> Result<()>
    where
        F: Fn(&mut Interpreter<'_>, Vec<Token>) -> Result<Token> + 'static,
    {
        self.register(Function::new(signature.parse()?, body))
    }

    pub fn register(&mut self, function: Function) -> Result<()> {
        if self.function_index(function.signature()).is_some() {
            return Err(Error::RegistryConflict(format!(
                "function {} is already registered",
                function.signature()
            )));
        }
        debug!(signature = %function.signature(), "register function");
        self.functions.push(Rc::new(function));
        Ok(())
    }

    /// Register without the conflict check; used for the built-in catalogue.
    pub(crate) fn install(&mut self, function: Function) {
        self.functions.push(Rc::new(function));
    }

    pub fn update_function<F>(&mut self, signature: &str, body: F) -> Result<()>
    where
        F: Fn(&mut Interpreter<'_>, Vec<Token>) -> Result<Token> + 'static,
    {
        let signature: Signature = signature.parse()?;
        let index = self.function_index(&signature).ok_or_else(|| {
            Error::RegistryConflict(format!("function {signature} is not registered"))
        })?;
        debug!(signature = %signature, "update function");
        self.functions[index] = Rc::new(Function::new(signature, body));
        Ok(())
    }

    pub fn remove_function(&mut self, signature: &str) -> Result<()> {
        let signature: Signature = signature.parse()?;
        let index = self.function_index(&signature).ok_or_else(|| {
            Error::RegistryConflict(format!("function {signature} is not registered"))
        })?;
        debug!(signature = %signature, "remove function");
        self.functions.remove(index);
        Ok(())
    }

    fn function_index(&self, signature: &Signature) -> Option<usize> {
        self.functions
            .iter()
            .position(|f| f.signature().same_as(signature))
    }

    /// Signatures of every function visible from this scope, innermost scope
    /// first and newest registration first within a scope.
    pub fn functions(&self) -> Vec<&Signature> {
        self.chain()
            .flat_map(|scope| scope.functions.iter().rev().map(|f| f.signature()))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Template registry
    // ------------------------------------------------------------------------

    pub fn register_template(&mut self, signature: &str, body: Token) -> Result<()> {
        let signature: Signature = signature.parse()?;
        if self.template_index(&signature).is_some() {
            return Err(Error::RegistryConflict(format!(
                "template {signature} is already registered"
            )));
        }
        debug!(signature = %signature, "register template");
        self.templates.push(Rc::new(Template::new(signature, body)));
        Ok(())
    }

    pub fn update_template(&mut self, signature: &str, body: Token) -> Result<()> {
        let signature: Signature = signature.parse()?;
        let index = self.template_index(&signature).ok_or_else(|| {
            Error::RegistryConflict(format!("template {signature} is not registered"))
        })?;
        debug!(signature = %signature, "update template");
        self.templates[index] = Rc::new(Template::new(signature, body));
        Ok(())
    }

    pub fn remove_template(&mut self, signature: &str) -> Result<()> {
        let signature: Signature = signature.parse()?;
        let index = self.template_index(&signature).ok_or_else(|| {
            Error::RegistryConflict(format!("template {signature} is not registered"))
        })?;
        debug!(signature = %signature, "remove template");
        self.templates.remove(index);
        Ok(())
    }

    /// Register or replace a template in this scope.
    pub(crate) fn upsert_template(&mut self, template: Template) {
        debug!(signature = %template.signature(), "set template");
        match self.template_index(template.signature()) {
            Some(index) => self.templates[index] = Rc::new(template),
            None => self.templates.push(Rc::new(template)),
        }
    }

    fn template_index(&self, signature: &Signature) -> Option<usize> {
        self.templates
            .iter()
            .position(|t| t.signature().same_as(signature))
    }

    pub fn templates(&self) -> Vec<&Signature> {
        self.chain()
            .flat_map(|scope| scope.templates.iter().rev().map(|t| t.signature()))
            .collect()
    }
}
